use crate::summary::StatementKind;
use std::string::FromUtf8Error;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Resource not found")]
    NotFound,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("No {0} report found in the filing summary")]
    StatementNotFound(StatementKind),

    #[error("Malformed report document: {0}")]
    MalformedDocument(String),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Invalid year: must be 1994 or greater")]
    InvalidYear,

    #[error("Invalid year: must be 2005 or greater for XBRL indices")]
    InvalidXbrlYear,

    #[error("Invalid quarter: must be between 1 and 4")]
    InvalidQuarter,

    #[error("File error: {0}")]
    FileError(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("XML parsing error: {0}")]
    XmlError(String),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("UTF-8 conversion error: {0}")]
    Utf8Error(#[from] FromUtf8Error),
}

impl From<quick_xml::DeError> for ExtractError {
    fn from(error: quick_xml::DeError) -> Self {
        ExtractError::XmlError(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ExtractError>;

/// Kinds of recoverable defects found while extracting a single statement.
///
/// These are collected as data rather than returned as errors: a bad row or an
/// unresolvable concept must never abort the rest of the table, let alone a
/// multi-filing batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueKind {
    /// A data row's value-cell count disagreed with the date columns, or an
    /// expected header/anchor was missing. The offending row is dropped.
    StructuralMismatch,
    /// A concept tag had no resolvable definition block. The record is still
    /// emitted with empty metadata fields.
    ConceptNotFound,
    /// The statement could not be located or parsed at all; no records were
    /// produced for it. Only reported at the filing level.
    StatementUnavailable,
}

impl std::fmt::Display for IssueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IssueKind::StructuralMismatch => write!(f, "structural mismatch"),
            IssueKind::ConceptNotFound => write!(f, "concept not found"),
            IssueKind::StatementUnavailable => write!(f, "statement unavailable"),
        }
    }
}

/// One recoverable defect, scoped to a row or a concept tag.
#[derive(Debug, Clone)]
pub struct ParseIssue {
    pub kind: IssueKind,
    /// The row's concept tag or item label, whichever identifies it best.
    pub subject: String,
    pub detail: String,
}

impl ParseIssue {
    pub fn new(kind: IssueKind, subject: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            kind,
            subject: subject.into(),
            detail: detail.into(),
        }
    }
}

/// A [`ParseIssue`] annotated with the statement it occurred in, as surfaced
/// to callers alongside the extracted records.
#[derive(Debug, Clone)]
pub struct StatementIssue {
    pub statement: StatementKind,
    pub kind: IssueKind,
    pub subject: String,
    pub detail: String,
}

impl StatementIssue {
    pub fn from_parse(statement: StatementKind, issue: ParseIssue) -> Self {
        Self {
            statement,
            kind: issue.kind,
            subject: issue.subject,
            detail: issue.detail,
        }
    }
}
