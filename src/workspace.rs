//! Applying text edits and workspace edits to files.
//!
//! Each call reads current file state, transforms it in memory and writes the
//! result back. Nothing is cached between calls. Within one file an edit
//! batch is all-or-nothing; across a workspace edit, operations that already
//! completed are not rolled back when a later one fails.

use crate::config::ApplyConfig;
use crate::document::Document;
use crate::edit::validate_edits;
use crate::error::{ApplyError, OperationRef, Phase, WorkspaceError};
use crate::fs::{EntryKind, FileSystem, OsFileSystem, read_file};
use crate::protocol::{
    CreateFile, DeleteFile, DocumentChange, RenameFile, TextDocumentEdit, TextEdit, WorkspaceEdit,
    normalize_edits,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Resolve a document URI to a local path
///
/// The `file://` prefix is stripped and the remainder used verbatim (no
/// percent-decoding). Plain paths pass through; other schemes are rejected.
pub fn uri_to_path(uri: &str) -> Result<PathBuf, ApplyError> {
    if let Some(path) = uri.strip_prefix("file://") {
        return Ok(PathBuf::from(path));
    }
    if uri.contains("://") {
        return Err(ApplyError::UnsupportedScheme {
            uri: uri.to_string(),
        });
    }
    Ok(PathBuf::from(uri))
}

/// Result of one applied operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChangeOutcome {
    /// Text edits were written to the file
    Edited {
        path: PathBuf,
        edit_count: usize,
        /// BLAKE3 of the content before the edits
        checksum_before: String,
        /// BLAKE3 of the content written back
        checksum_after: String,
    },
    Created {
        path: PathBuf,
        overwritten: bool,
    },
    Deleted {
        path: PathBuf,
        recursive: bool,
    },
    Renamed {
        from: PathBuf,
        to: PathBuf,
    },
    /// Operation was a no-op under its options
    Skipped {
        path: PathBuf,
        reason: String,
    },
}

impl ChangeOutcome {
    pub fn is_skipped(&self) -> bool {
        matches!(self, ChangeOutcome::Skipped { .. })
    }
}

/// Result of applying a whole workspace edit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkspaceReport {
    /// Outcomes in application order: `changes` first, then `documentChanges`
    pub outcomes: Vec<ChangeOutcome>,
    pub applied_count: usize,
    pub skipped_count: usize,
}

impl WorkspaceReport {
    pub fn new(outcomes: Vec<ChangeOutcome>) -> Self {
        let skipped_count = outcomes.iter().filter(|o| o.is_skipped()).count();
        let applied_count = outcomes.len() - skipped_count;

        Self {
            outcomes,
            applied_count,
            skipped_count,
        }
    }
}

/// Applies edits and file operations through a [`FileSystem`]
#[derive(Debug, Clone)]
pub struct WorkspaceApplier<F = OsFileSystem> {
    fs: F,
    config: ApplyConfig,
}

impl WorkspaceApplier<OsFileSystem> {
    /// Applier over the local filesystem
    pub fn new(config: ApplyConfig) -> Self {
        Self {
            fs: OsFileSystem {
                file_mode: config.file_mode,
            },
            config,
        }
    }
}

impl Default for WorkspaceApplier<OsFileSystem> {
    fn default() -> Self {
        Self::new(ApplyConfig::default())
    }
}

impl<F: FileSystem> WorkspaceApplier<F> {
    pub fn with_filesystem(fs: F, config: ApplyConfig) -> Self {
        Self { fs, config }
    }

    pub fn config(&self) -> &ApplyConfig {
        &self.config
    }

    pub fn filesystem(&self) -> &F {
        &self.fs
    }

    /// Apply a batch of text edits to the document at `uri`
    ///
    /// The file is read once, every edit is applied against that snapshot
    /// and the result written back. If any edit is rejected the file is not
    /// written.
    pub fn apply_text_edits(&self, uri: &str, edits: &[TextEdit]) -> Result<ChangeOutcome, ApplyError> {
        let path = uri_to_path(uri)?;
        let file = read_file(&self.fs, &path)?;
        let document = Document::parse(&file.content);

        debug!(
            path = %path.display(),
            edits = edits.len(),
            line_ending = %document.line_ending(),
            "applying text edits"
        );

        let edited = document
            .apply_edits(edits, self.config.encoding)
            .map_err(|source| ApplyError::Edit {
                path: path.clone(),
                source,
            })?;
        let dropped = edited.dropped_trailing_endings();
        if dropped > 0 {
            warn!(
                path = %path.display(),
                dropped,
                "file had no trailing newline; dropping line endings the edits added at the end"
            );
        }
        let content = edited.render();

        self.fs
            .write(&path, content.as_bytes())
            .map_err(|e| ApplyError::io(Phase::Write, &path, e))?;

        Ok(ChangeOutcome::Edited {
            path,
            edit_count: edits.len(),
            checksum_before: file.checksum,
            checksum_after: crate::fs::checksum(&content),
        })
    }

    /// Apply one create, delete, rename or text document edit
    pub fn apply_document_change(&self, change: &DocumentChange) -> Result<ChangeOutcome, ApplyError> {
        debug!(?change, "applying document change");
        match change {
            DocumentChange::CreateFile(op) => self.create_file(op),
            DocumentChange::DeleteFile(op) => self.delete_file(op),
            DocumentChange::RenameFile(op) => self.rename_file(op),
            DocumentChange::TextDocumentEdit(op) => self.text_document_edit(op),
        }
    }

    /// Apply a workspace edit: every `changes` entry, then every
    /// `documentChanges` entry, in input order
    ///
    /// Every URI and text edit batch is validated before the first operation
    /// runs, so malformed or overlapping edits anywhere abort with nothing
    /// touched. After that the first failure stops the sequence; earlier
    /// operations stay applied and their outcomes travel in the error.
    pub fn apply_workspace_edit(&self, edit: &WorkspaceEdit) -> Result<WorkspaceReport, WorkspaceError> {
        preflight(edit)?;

        let mut outcomes = Vec::with_capacity(edit.operation_count());

        for (uri, edits) in &edit.changes {
            let outcome = self
                .apply_text_edits(uri, edits)
                .map_err(|source| WorkspaceError {
                    operation: OperationRef::Changes { uri: uri.clone() },
                    completed: std::mem::take(&mut outcomes),
                    source,
                })?;
            outcomes.push(outcome);
        }

        for (index, change) in edit.document_changes.iter().enumerate() {
            let outcome = self
                .apply_document_change(change)
                .map_err(|source| WorkspaceError {
                    operation: OperationRef::DocumentChanges { index },
                    completed: std::mem::take(&mut outcomes),
                    source,
                })?;
            outcomes.push(outcome);
        }

        let report = WorkspaceReport::new(outcomes);
        info!(
            applied = report.applied_count,
            skipped = report.skipped_count,
            "workspace edit applied"
        );
        Ok(report)
    }

    fn stat(&self, path: &Path) -> Result<Option<EntryKind>, ApplyError> {
        self.fs
            .stat(path)
            .map_err(|e| ApplyError::io(Phase::Stat, path, e))
    }

    fn create_file(&self, op: &CreateFile) -> Result<ChangeOutcome, ApplyError> {
        let path = uri_to_path(&op.uri)?;
        let options = op.options.unwrap_or_default();
        let exists = self.stat(&path)?.is_some();

        if exists && !options.overwrite {
            if options.ignore_if_exists {
                warn!(path = %path.display(), "create skipped, file already exists");
                return Ok(ChangeOutcome::Skipped {
                    path,
                    reason: "file already exists".to_string(),
                });
            }
            return Err(ApplyError::AlreadyExists { path });
        }

        self.fs
            .write(&path, b"")
            .map_err(|e| ApplyError::io(Phase::Create, &path, e))?;

        Ok(ChangeOutcome::Created {
            path,
            overwritten: exists,
        })
    }

    fn delete_file(&self, op: &DeleteFile) -> Result<ChangeOutcome, ApplyError> {
        let path = uri_to_path(&op.uri)?;
        let options = op.options.unwrap_or_default();
        let existing = self.stat(&path)?;

        match existing {
            None if options.ignore_if_not_exists => {
                warn!(path = %path.display(), "delete skipped, path does not exist");
                return Ok(ChangeOutcome::Skipped {
                    path,
                    reason: "path does not exist".to_string(),
                });
            }
            Some(EntryKind::Directory { empty: false }) if !options.recursive => {
                return Err(ApplyError::DirectoryNotEmpty { path });
            }
            _ => {}
        }

        let recursive = options.recursive && existing.is_some();
        let removed = if recursive {
            self.fs.remove_all(&path)
        } else {
            self.fs.remove(&path)
        };
        removed.map_err(|e| ApplyError::io(Phase::Delete, &path, e))?;

        Ok(ChangeOutcome::Deleted { path, recursive })
    }

    fn rename_file(&self, op: &RenameFile) -> Result<ChangeOutcome, ApplyError> {
        let from = uri_to_path(&op.old_uri)?;
        let to = uri_to_path(&op.new_uri)?;
        let options = op.options.unwrap_or_default();

        if !options.overwrite && self.stat(&to)?.is_some() {
            if options.ignore_if_exists {
                warn!(path = %to.display(), "rename skipped, target already exists");
                return Ok(ChangeOutcome::Skipped {
                    path: to,
                    reason: "target already exists".to_string(),
                });
            }
            return Err(ApplyError::TargetExists { path: to });
        }

        self.fs
            .rename(&from, &to)
            .map_err(|e| ApplyError::io(Phase::Rename, &from, e))?;

        Ok(ChangeOutcome::Renamed { from, to })
    }

    fn text_document_edit(&self, op: &TextDocumentEdit) -> Result<ChangeOutcome, ApplyError> {
        let uri = &op.text_document.uri;
        let edits = normalize_edits(&op.edits).map_err(|source| -> ApplyError {
            match uri_to_path(uri) {
                Ok(path) => ApplyError::Edit { path, source },
                Err(e) => e,
            }
        })?;

        if let Some(version) = op.text_document.version {
            debug!(uri = %uri, version, "document version is not checked against disk");
        }

        self.apply_text_edits(uri, &edits)
    }
}

/// Validate every URI and text edit batch of a workspace edit without I/O
fn preflight(edit: &WorkspaceEdit) -> Result<(), WorkspaceError> {
    let reject = |operation: OperationRef, source: ApplyError| WorkspaceError {
        operation,
        completed: Vec::new(),
        source,
    };

    for (uri, edits) in &edit.changes {
        check_text_edits(uri, edits)
            .map_err(|source| reject(OperationRef::Changes { uri: uri.clone() }, source))?;
    }

    for (index, change) in edit.document_changes.iter().enumerate() {
        check_document_change(change)
            .map_err(|source| reject(OperationRef::DocumentChanges { index }, source))?;
    }

    Ok(())
}

fn check_text_edits(uri: &str, edits: &[TextEdit]) -> Result<(), ApplyError> {
    let path = uri_to_path(uri)?;
    validate_edits(edits).map_err(|source| ApplyError::Edit { path, source })
}

fn check_document_change(change: &DocumentChange) -> Result<(), ApplyError> {
    match change {
        DocumentChange::CreateFile(op) => uri_to_path(&op.uri).map(drop),
        DocumentChange::DeleteFile(op) => uri_to_path(&op.uri).map(drop),
        DocumentChange::RenameFile(op) => {
            uri_to_path(&op.old_uri)?;
            uri_to_path(&op.new_uri).map(drop)
        }
        DocumentChange::TextDocumentEdit(op) => {
            let path = uri_to_path(&op.text_document.uri)?;
            normalize_edits(&op.edits)
                .and_then(|edits| validate_edits(&edits))
                .map_err(|source| ApplyError::Edit { path, source })
        }
    }
}
