// Position and range model
pub mod position;

// Protocol wire types
pub mod protocol;

// Edit engine module
pub mod edit;

// Document snapshot module
pub mod document;

// Error types
pub mod error;

// Filesystem access
pub mod fs;

// Runtime configuration
pub mod config;

// Workspace edit application
pub mod workspace;

// JSON request/response module
pub mod json;

// Re-exports
pub use config::ApplyConfig;
pub use document::{Document, LineEnding};
pub use edit::{
    EditError, apply_edits, apply_text_edit, find_overlap, sort_edits_descending, validate_edits,
};
pub use error::{ApplyError, ErrorClass, OperationRef, Phase, WorkspaceError};
pub use fs::{EntryKind, FileContent, FileSystem, OsFileSystem, read_file};
pub use json::{ApplyRequest, ApplyResponse, generate_execution_id};
pub use position::{OffsetEncoding, Position, Range};
pub use protocol::{
    CreateFile, CreateFileOptions, DeleteFile, DeleteFileOptions, DocumentChange,
    DocumentEditEntry, RenameFile, RenameFileOptions, TextDocumentEdit, TextEdit, WorkspaceEdit,
};
pub use workspace::{ChangeOutcome, WorkspaceApplier, WorkspaceReport, uri_to_path};
