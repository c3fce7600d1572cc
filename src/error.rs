//! Crate-level error types.

use std::fmt;

use crate::analysis::AnalysisError;
use crate::structure::{FetchError, ParseError};

/// Errors produced by the bindview crate.
#[derive(Debug)]
pub enum BindviewError {
    /// Identifier is not a 4-character alphanumeric structure code.
    InvalidStructureId(String),
    /// Every structure source failed for this identifier.
    StructureUnavailable {
        /// The requested identifier.
        id: String,
        /// Underlying fetch failure (primary and fallback).
        reason: FetchError,
    },
    /// Structure text could not be turned into atoms.
    Parse(ParseError),
    /// Generic I/O failure.
    Io(std::io::Error),
    /// Failed to spawn a background thread.
    ThreadSpawn(std::io::Error),
    /// The background fetch worker is no longer running.
    WorkerStopped,
    /// TOML options parsing/serialization failure.
    OptionsParse(String),
    /// JSON input/output failure (binding sites, scene export).
    Json(serde_json::Error),
    /// Analysis provider configuration or call failure.
    Analysis(AnalysisError),
}

impl fmt::Display for BindviewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidStructureId(id) => {
                write!(f, "invalid structure id {id:?}")
            }
            Self::StructureUnavailable { id, reason } => {
                write!(f, "structure {id} unavailable: {reason}")
            }
            Self::Parse(e) => write!(f, "structure parse error: {e}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::ThreadSpawn(e) => {
                write!(f, "failed to spawn thread: {e}")
            }
            Self::WorkerStopped => f.write_str("structure fetch worker stopped"),
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
            Self::Json(e) => write!(f, "JSON error: {e}"),
            Self::Analysis(e) => write!(f, "analysis error: {e}"),
        }
    }
}

impl std::error::Error for BindviewError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::StructureUnavailable { reason, .. } => Some(reason),
            Self::Parse(e) => Some(e),
            Self::Io(e) | Self::ThreadSpawn(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Analysis(e) => Some(e),
            Self::InvalidStructureId(_)
            | Self::OptionsParse(_)
            | Self::WorkerStopped => None,
        }
    }
}

impl From<std::io::Error> for BindviewError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<ParseError> for BindviewError {
    fn from(e: ParseError) -> Self {
        Self::Parse(e)
    }
}

impl From<serde_json::Error> for BindviewError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl From<AnalysisError> for BindviewError {
    fn from(e: AnalysisError) -> Self {
        Self::Analysis(e)
    }
}
