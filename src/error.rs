use crate::edit::EditError;
use crate::workspace::ChangeOutcome;
use serde::Serialize;
use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Filesystem step that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Read,
    Write,
    Stat,
    Create,
    Delete,
    Rename,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Read => "read",
            Phase::Write => "write",
            Phase::Stat => "stat",
            Phase::Create => "create",
            Phase::Delete => "delete",
            Phase::Rename => "rename",
        };
        f.write_str(name)
    }
}

/// Broad category of an [`ApplyError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorClass {
    /// Input rejected before anything was touched
    Validation,
    /// The filesystem failed
    Io,
    /// A file operation was refused by its overwrite/recursion policy
    Precondition,
}

/// Error types for applying edits and file operations
#[derive(Debug, Error)]
pub enum ApplyError {
    #[error("failed to apply edits to {}: {source}", path.display())]
    Edit {
        path: PathBuf,
        #[source]
        source: EditError,
    },

    #[error("unsupported URI scheme: {uri}")]
    UnsupportedScheme { uri: String },

    #[error("invalid UTF-8 in file: {}", path.display())]
    InvalidUtf8 { path: PathBuf },

    #[error("failed to {phase} {}: {source}", path.display())]
    Io {
        phase: Phase,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("file already exists and neither overwrite nor ignoreIfExists is set: {}", path.display())]
    AlreadyExists { path: PathBuf },

    #[error("target file already exists and overwrite is not allowed: {}", path.display())]
    TargetExists { path: PathBuf },

    #[error("directory is not empty and recursive delete is not set: {}", path.display())]
    DirectoryNotEmpty { path: PathBuf },
}

impl ApplyError {
    pub(crate) fn io(phase: Phase, path: impl Into<PathBuf>, source: io::Error) -> Self {
        ApplyError::Io {
            phase,
            path: path.into(),
            source,
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            ApplyError::Edit { .. }
            | ApplyError::UnsupportedScheme { .. }
            | ApplyError::InvalidUtf8 { .. } => ErrorClass::Validation,
            ApplyError::Io { .. } => ErrorClass::Io,
            ApplyError::AlreadyExists { .. }
            | ApplyError::TargetExists { .. }
            | ApplyError::DirectoryNotEmpty { .. } => ErrorClass::Precondition,
        }
    }
}

/// Which part of a workspace edit an operation came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", rename_all = "camelCase")]
pub enum OperationRef {
    /// Entry of `changes`, keyed by document URI
    Changes { uri: String },
    /// Entry of `documentChanges`, by position
    DocumentChanges { index: usize },
}

impl fmt::Display for OperationRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationRef::Changes { uri } => write!(f, "changes[{uri}]"),
            OperationRef::DocumentChanges { index } => write!(f, "documentChanges[{index}]"),
        }
    }
}

/// First failure of a workspace edit
///
/// Operations that completed before the failure stay applied; `completed`
/// holds their outcomes in application order.
#[derive(Debug, Error)]
#[error("failed to apply {operation} after {} completed operation(s): {source}", .completed.len())]
pub struct WorkspaceError {
    pub operation: OperationRef,
    pub completed: Vec<ChangeOutcome>,
    #[source]
    pub source: ApplyError,
}

impl WorkspaceError {
    pub fn class(&self) -> ErrorClass {
        self.source.class()
    }
}
