use std::fmt;

use thiserror::Error;

// ---------------------------------------------------------------------------
// ParseError – every failure the core can report
// ---------------------------------------------------------------------------

/// Classified failure raised while turning a vendor file into a series.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// The filename matched none of the known vendor patterns.
    #[error("unknown format for '{0}'")]
    UnknownFormat(String),

    /// The bytes are not valid for the codepage the format assumes.
    #[error("cannot decode as {encoding}: {detail}")]
    DecodeFailure {
        encoding: &'static str,
        detail: String,
    },

    /// A structural expectation of the format was violated.
    #[error("malformed table: {0}")]
    MalformedTable(String),

    /// A conversion produced a division by zero or a non-finite value.
    #[error("arithmetic failure: {0}")]
    ArithmeticFailure(String),
}

/// Fieldless discriminant of [`ParseError`], handy for matching and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UnknownFormat,
    DecodeFailure,
    MalformedTable,
    ArithmeticFailure,
}

impl ParseError {
    pub fn malformed(detail: impl Into<String>) -> Self {
        ParseError::MalformedTable(detail.into())
    }

    pub fn arithmetic(detail: impl Into<String>) -> Self {
        ParseError::ArithmeticFailure(detail.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ParseError::UnknownFormat(_) => ErrorKind::UnknownFormat,
            ParseError::DecodeFailure { .. } => ErrorKind::DecodeFailure,
            ParseError::MalformedTable(_) => ErrorKind::MalformedTable,
            ParseError::ArithmeticFailure(_) => ErrorKind::ArithmeticFailure,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::UnknownFormat => "UnknownFormat",
            ErrorKind::DecodeFailure => "DecodeFailure",
            ErrorKind::MalformedTable => "MalformedTable",
            ErrorKind::ArithmeticFailure => "ArithmeticFailure",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Per-file and per-row reports
// ---------------------------------------------------------------------------

/// A file of a batch that could not be parsed.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{filename}: {error}")]
pub struct FileError {
    /// Position of the file in the caller's batch.
    pub index: usize,
    pub filename: String,
    #[source]
    pub error: ParseError,
}

impl FileError {
    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }
}

/// A row dropped from an otherwise usable file.
#[derive(Debug, Clone, PartialEq)]
pub struct RowRejection {
    /// 1-based line of the decoded source text, or 1-based sample index for
    /// channel-based formats.
    pub line: usize,
    pub error: ParseError,
}

impl fmt::Display for RowRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row at line {}: {}", self.line, self.error)
    }
}
