//! JSON encoding of task collections for storage slots and export files.
//!
//! # Invariants
//! - Encoded documents are a JSON array of camelCase task records.
//! - `decode_tasks(encode_tasks(x)) == x`, timestamps included.

use crate::model::task::Task;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Encode/decode failure.
#[derive(Debug)]
pub enum CodecError {
    Encode(serde_json::Error),
    Decode(serde_json::Error),
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Encode(err) => write!(f, "failed to encode tasks: {err}"),
            Self::Decode(err) => write!(f, "invalid task document: {err}"),
        }
    }
}

impl Error for CodecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Encode(err) | Self::Decode(err) => Some(err),
        }
    }
}

/// Compact form written to the storage slot.
pub fn encode_tasks(tasks: &[Task]) -> Result<String, CodecError> {
    serde_json::to_string(tasks).map_err(CodecError::Encode)
}

/// Indented form used for export files.
pub fn encode_tasks_pretty(tasks: &[Task]) -> Result<String, CodecError> {
    serde_json::to_string_pretty(tasks).map_err(CodecError::Encode)
}

/// Parses a JSON array of task records. Content is taken verbatim.
pub fn decode_tasks(text: &str) -> Result<Vec<Task>, CodecError> {
    serde_json::from_str(text).map_err(CodecError::Decode)
}
