use std::io;
use thiserror::Error;

/// Error type for guessing operations.
#[derive(Error, Debug)]
pub enum GuessError {
    /// IO error while reading a sample.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A dialect configuration document could not be parsed.
    #[error("Invalid dialect configuration document: {0}")]
    Config(#[from] serde_json::Error),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for guessing operations.
pub type Result<T> = std::result::Result<T, GuessError>;

/// Recoverable faults raised by the tokenizer.
///
/// None of these destroy the tokenizer position: after any of them the caller
/// may call [`Tokenizer::skip_current_record`](crate::Tokenizer::skip_current_record)
/// and keep going with the next record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenizeError {
    /// A quoted value grew past `max_quoted_size_limit` bytes.
    #[error("line {line}: the size of the quoted value exceeds the limit size ({limit})")]
    QuotedSizeLimitExceeded { line: u64, limit: usize },

    /// A column was requested after the record already ended.
    #[error("line {line}: too few columns")]
    TooFewColumns { line: u64 },

    /// A new record was requested while the current one still had columns.
    #[error("line {line}: too many columns")]
    TooManyColumns { line: u64 },

    /// Malformed quoting or an unterminated quoted value.
    #[error("line {line}: {message}")]
    InvalidValue { line: u64, message: String },
}

impl TokenizeError {
    /// Physical line number the fault was raised on.
    pub fn line(&self) -> u64 {
        match self {
            TokenizeError::QuotedSizeLimitExceeded { line, .. }
            | TokenizeError::TooFewColumns { line }
            | TokenizeError::TooManyColumns { line }
            | TokenizeError::InvalidValue { line, .. } => *line,
        }
    }
}

/// Error returned by [`CsvReader`](crate::CsvReader) when it is told to stop on
/// invalid records.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid record at line {line} ({source}): {skipped}")]
pub struct ReadError {
    /// Physical line number of the invalid record.
    pub line: u64,
    /// Raw text of the rejected record.
    pub skipped: String,
    /// The tokenizer fault that made the record invalid.
    pub source: TokenizeError,
}
