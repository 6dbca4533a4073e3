//! Wire types for the subset of the Language Server Protocol this crate applies.
//!
//! Field names follow the protocol's camelCase JSON. Only the shapes needed
//! to describe edits and file operations are modelled.

use crate::edit::EditError;
use crate::position::Range;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Document identifier as sent on the wire, normally a `file://` URI
pub type DocumentUri = String;

/// Replace the content spanned by `range` with `new_text`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextEdit {
    pub range: Range,
    pub new_text: String,
}

impl TextEdit {
    pub fn new(range: Range, new_text: impl Into<String>) -> Self {
        Self {
            range,
            new_text: new_text.into(),
        }
    }
}

/// Text edit tagged with a change annotation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotatedTextEdit {
    pub range: Range,
    pub new_text: String,
    pub annotation_id: String,
}

/// Snippet body of a [`SnippetTextEdit`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringValue {
    pub kind: String,
    pub value: String,
}

/// Interactive snippet insertion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnippetTextEdit {
    pub range: Range,
    pub snippet: StringValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation_id: Option<String>,
}

/// One entry of `TextDocumentEdit::edits`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocumentEditEntry {
    Annotated(AnnotatedTextEdit),
    Snippet(SnippetTextEdit),
    Plain(TextEdit),
}

impl DocumentEditEntry {
    pub fn kind(&self) -> &'static str {
        match self {
            DocumentEditEntry::Annotated(_) => "annotated",
            DocumentEditEntry::Snippet(_) => "snippet",
            DocumentEditEntry::Plain(_) => "plain",
        }
    }

    /// Reduce the entry to a plain [`TextEdit`]
    ///
    /// Annotations are dropped. Snippets have no literal replacement text
    /// and are rejected.
    pub fn to_text_edit(&self, index: usize) -> Result<TextEdit, EditError> {
        match self {
            DocumentEditEntry::Plain(edit) => Ok(edit.clone()),
            DocumentEditEntry::Annotated(edit) => Ok(TextEdit::new(edit.range, edit.new_text.clone())),
            DocumentEditEntry::Snippet(_) => Err(EditError::UnsupportedEditKind {
                index,
                kind: self.kind(),
            }),
        }
    }
}

impl From<TextEdit> for DocumentEditEntry {
    fn from(edit: TextEdit) -> Self {
        DocumentEditEntry::Plain(edit)
    }
}

/// Normalize every entry of a text document edit, failing on the first bad one
pub fn normalize_edits(entries: &[DocumentEditEntry]) -> Result<Vec<TextEdit>, EditError> {
    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| entry.to_text_edit(index))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionalVersionedTextDocumentIdentifier {
    pub uri: DocumentUri,
    #[serde(default)]
    pub version: Option<i32>,
}

/// Edits to one document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextDocumentEdit {
    pub text_document: OptionalVersionedTextDocumentIdentifier,
    pub edits: Vec<DocumentEditEntry>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateFileOptions {
    /// Overwrite an existing file. Wins over `ignore_if_exists`
    pub overwrite: bool,
    pub ignore_if_exists: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFile {
    pub uri: DocumentUri,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<CreateFileOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation_id: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenameFileOptions {
    /// Overwrite an existing target. Wins over `ignore_if_exists`
    pub overwrite: bool,
    pub ignore_if_exists: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameFile {
    pub old_uri: DocumentUri,
    pub new_uri: DocumentUri,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<RenameFileOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation_id: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeleteFileOptions {
    /// Delete directory content recursively
    pub recursive: bool,
    pub ignore_if_not_exists: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteFile {
    pub uri: DocumentUri,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<DeleteFileOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation_id: Option<String>,
}

/// One structured operation of a workspace edit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "WireDocumentChange", into = "WireDocumentChange")]
pub enum DocumentChange {
    CreateFile(CreateFile),
    DeleteFile(DeleteFile),
    RenameFile(RenameFile),
    TextDocumentEdit(TextDocumentEdit),
}

// File operations carry a `kind` discriminator; text document edits carry none.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum ResourceOperation {
    Create(CreateFile),
    Rename(RenameFile),
    Delete(DeleteFile),
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum WireDocumentChange {
    Resource(ResourceOperation),
    Edit(TextDocumentEdit),
}

impl From<WireDocumentChange> for DocumentChange {
    fn from(wire: WireDocumentChange) -> Self {
        match wire {
            WireDocumentChange::Resource(ResourceOperation::Create(op)) => {
                DocumentChange::CreateFile(op)
            }
            WireDocumentChange::Resource(ResourceOperation::Rename(op)) => {
                DocumentChange::RenameFile(op)
            }
            WireDocumentChange::Resource(ResourceOperation::Delete(op)) => {
                DocumentChange::DeleteFile(op)
            }
            WireDocumentChange::Edit(edit) => DocumentChange::TextDocumentEdit(edit),
        }
    }
}

impl From<DocumentChange> for WireDocumentChange {
    fn from(change: DocumentChange) -> Self {
        match change {
            DocumentChange::CreateFile(op) => {
                WireDocumentChange::Resource(ResourceOperation::Create(op))
            }
            DocumentChange::RenameFile(op) => {
                WireDocumentChange::Resource(ResourceOperation::Rename(op))
            }
            DocumentChange::DeleteFile(op) => {
                WireDocumentChange::Resource(ResourceOperation::Delete(op))
            }
            DocumentChange::TextDocumentEdit(edit) => WireDocumentChange::Edit(edit),
        }
    }
}

/// Batch of edits and file operations spanning one or more documents
///
/// `changes` keeps the order in which documents appear in the input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceEdit {
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub changes: IndexMap<DocumentUri, Vec<TextEdit>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub document_changes: Vec<DocumentChange>,
}

impl WorkspaceEdit {
    /// Total number of operations: one per `changes` document plus one per document change
    pub fn operation_count(&self) -> usize {
        self.changes.len() + self.document_changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operation_count() == 0
    }
}
