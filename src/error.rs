use thiserror::Error;

pub type ReefResult<T> = Result<T, ReefError>;

#[derive(Error, Debug)]
pub enum ReefError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("workbook error: {0}")]
    Workbook(String),

    #[error("sheet not found: {0}")]
    MissingSheet(String),

    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),
}

impl ReefError {
    /// Structural schema violations are the only fatal data condition;
    /// everything else degrades to row exclusion.
    pub fn is_schema_violation(&self) -> bool {
        matches!(self, ReefError::SchemaMismatch(_))
    }
}
