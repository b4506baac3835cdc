/// Data layer: table model, file codecs, cleaning and the per-file pipeline.
///
/// Architecture:
/// ```text
///   .csv / .xlsx bytes
///        │
///        ▼
///   ┌──────────┐
///   │  codec    │  detect format, decode → Table
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  clean    │  drop duplicate rows, mean-fill numeric gaps
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  project  │  keep a subset of columns
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  codec    │  encode → .csv / .xlsx bytes
///   └──────────┘
/// ```
/// `pipeline` holds one table per uploaded file and drives the steps above.

pub mod clean;
pub mod codec;
pub mod model;
pub mod pipeline;
pub mod project;
