//! Error types for catalog loading.

use std::path::PathBuf;
use thiserror::Error;

/// What went wrong while reading a `.ts` document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatErrorKind {
    /// XML syntax error, including mismatched end tags.
    #[error("malformed markup: {0}")]
    Malformed(String),

    /// Input ended while an element was still open.
    #[error("unexpected end of input inside <{0}>")]
    UnexpectedEof(String),

    /// Input bytes are not valid UTF-8.
    #[error("input is not valid UTF-8")]
    InvalidEncoding,

    /// The XML declaration names an encoding other than UTF-8.
    #[error("unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    /// The root element declares a format version we cannot read.
    #[error("unsupported format version: {0}")]
    UnsupportedVersion(String),

    /// A required child element is absent.
    #[error("<{parent}> is missing <{child}>")]
    MissingElement { parent: String, child: String },

    /// A child element that may appear once appears again.
    #[error("<{parent}> has more than one <{child}>")]
    DuplicateElement { parent: String, child: String },

    /// An element appears where it is not allowed.
    #[error("unexpected <{found}> inside {inside}")]
    UnexpectedElement { found: String, inside: String },

    /// An attribute value cannot be interpreted.
    #[error("invalid value {value:?} for attribute {name}")]
    InvalidAttribute { name: String, value: String },
}

/// A load-time failure with the position it was detected at.
///
/// Lines and columns are 1-based; columns count characters, not bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{line}:{column}: {kind}")]
pub struct FormatError {
    pub line: usize,
    pub column: usize,
    #[source]
    pub kind: FormatErrorKind,
}

impl FormatError {
    pub(crate) fn at(input: &[u8], offset: usize, kind: FormatErrorKind) -> Self {
        let (line, column) = line_column(input, offset);
        Self { line, column, kind }
    }
}

/// Translate a byte offset into a 1-based (line, column) pair.
fn line_column(input: &[u8], offset: usize) -> (usize, usize) {
    let prefix = &input[..offset.min(input.len())];
    let line_start = prefix
        .iter()
        .rposition(|&b| b == b'\n')
        .map_or(0, |pos| pos + 1);
    let line = prefix.iter().filter(|&&b| b == b'\n').count() + 1;
    let column = String::from_utf8_lossy(&prefix[line_start..]).chars().count() + 1;
    (line, column)
}

/// i18n errors.
#[derive(Debug, Error)]
pub enum I18nError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid catalog{}: {source}", .path.as_ref().map(|p| format!(" {}", p.display())).unwrap_or_default())]
    Format {
        path: Option<PathBuf>,
        #[source]
        source: FormatError,
    },

    #[error("no catalog found for locale {locale} (searched {})", .searched.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(", "))]
    NotFound {
        locale: String,
        searched: Vec<PathBuf>,
    },

    #[error("invalid locale: {0}")]
    InvalidLocale(String),

    #[error("failed to write catalog: {0}")]
    Write(String),
}

impl From<FormatError> for I18nError {
    fn from(source: FormatError) -> Self {
        Self::Format { path: None, source }
    }
}
