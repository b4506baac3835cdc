use thiserror::Error;

/// Everything that can go wrong while processing one uploaded file.
///
/// None of these are fatal to a batch: each failure stays attached to the
/// file that produced it and sibling files keep going.
#[derive(Debug, Error)]
pub enum SweeperError {
    /// The file name does not end in `.csv` or `.xlsx`.
    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    /// The payload could not be parsed as its declared format.
    #[error("Could not read file: {0}")]
    Decode(String),

    #[error("Could not encode table: {0}")]
    Encode(String),

    #[error("Could not write workbook: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Column selected more than once: {0}")]
    DuplicateColumn(String),

    /// A table was assembled from columns of different lengths.
    #[error("Columns have different row counts")]
    RaggedColumns,

    /// The session never produced a table, so nothing downstream can run.
    #[error("{file_name} was not loaded: {reason}")]
    NotDecoded { file_name: String, reason: String },
}

pub type Result<T> = std::result::Result<T, SweeperError>;
