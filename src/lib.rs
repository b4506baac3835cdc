//! Core of the data sweeper: load CSV / Excel files, clean them, keep a
//! subset of columns and write them back out in either format.

pub mod config;
pub mod data;
pub mod error;

pub use config::SweeperConfig;
pub use data::codec::{CodecOptions, ConversionTarget, ExportArtifact, Format};
pub use data::model::{Column, ColumnKind, Table, Value};
pub use data::pipeline::{Batch, FileSession, NumericSeries, Stage, UploadedFile};
pub use error::{Result, SweeperError};
