use thiserror::Error;

/// Statement-level failures that abort the whole upload. Row- and cell-level
/// problems never land here; they degrade to `0` amounts or absent dates so
/// one malformed field cannot discard an otherwise usable transaction.
#[derive(Error, Debug)]
pub enum FormatError {
    /// The buffer contained no data at all.
    #[error("file is empty")]
    EmptyInput,

    /// The file name carried an extension we do not parse.
    #[error("unsupported file type: {0}")]
    UnsupportedFileType(String),

    /// The delimited text had no usable header row.
    #[error("no header row found")]
    MissingHeader,

    /// No header matched any alias of the amount column.
    #[error("no recognizable amount column")]
    MissingAmountColumn,

    /// The workbook contained no sheets.
    #[error("workbook has no sheets")]
    NoSheets,

    /// The first sheet of the workbook was blank.
    #[error("first sheet is empty")]
    EmptySheet,

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("workbook error: {0}")]
    Workbook(#[from] calamine::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Alias used throughout the parser.
pub type Result<T> = std::result::Result<T, FormatError>;
