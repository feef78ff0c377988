//! Codec error types.
//!
//! Decode failures are always `InvalidRecord`: the input is rejected as a
//! whole. Encode failures are lower-level writer problems and stay distinct.

use chrono::NaiveDateTime;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type DecodeResult<T> = Result<T, DecodeError>;
pub type EncodeResult<T> = Result<T, EncodeError>;

/// Input could not be turned into a consistent `Accounts` collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Malformed record/element, unknown type tag, dangling reference or
    /// duplicate name. `line` is 1-based and only known for delimited input.
    InvalidRecord { line: Option<u64>, reason: String },
}

impl DecodeError {
    pub fn invalid_record(reason: impl Into<String>) -> Self {
        Self::InvalidRecord {
            line: None,
            reason: reason.into(),
        }
    }

    pub fn invalid_record_at(line: Option<u64>, reason: impl Into<String>) -> Self {
        Self::InvalidRecord {
            line,
            reason: reason.into(),
        }
    }

    /// Human-readable reason without position information.
    pub fn reason(&self) -> &str {
        match self {
            Self::InvalidRecord { reason, .. } => reason,
        }
    }
}

impl Display for DecodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRecord {
                line: Some(line),
                reason,
            } => write!(f, "invalid record at line {line}: {reason}"),
            Self::InvalidRecord { line: None, reason } => write!(f, "invalid record: {reason}"),
        }
    }
}

impl Error for DecodeError {}

/// Serializer failure while producing an encoded document.
#[derive(Debug)]
pub enum EncodeError {
    Csv(csv::Error),
    Xml(quick_xml::Error),
    Io(std::io::Error),
    /// Due date has no valid rendering in the configured time zone.
    UnrepresentableDueDate(NaiveDateTime),
}

impl Display for EncodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Csv(err) => write!(f, "delimited writer failed: {err}"),
            Self::Xml(err) => write!(f, "markup writer failed: {err}"),
            Self::Io(err) => write!(f, "encoder buffer write failed: {err}"),
            Self::UnrepresentableDueDate(value) => {
                write!(f, "due date {value} cannot be represented in the target time zone")
            }
        }
    }
}

impl Error for EncodeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Csv(err) => Some(err),
            Self::Xml(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::UnrepresentableDueDate(_) => None,
        }
    }
}

impl From<csv::Error> for EncodeError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

impl From<quick_xml::Error> for EncodeError {
    fn from(value: quick_xml::Error) -> Self {
        Self::Xml(value)
    }
}

impl From<std::io::Error> for EncodeError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}
