use crate::error::{ErrorClass, WorkspaceError};
use crate::protocol::WorkspaceEdit;
use crate::workspace::{ChangeOutcome, WorkspaceReport};
use serde::{Deserialize, Serialize};

/// Placeholder execution id replaced by a generated one
pub const AUTO_EXECUTION_ID: &str = "auto";

/// Workspace edit to apply, as read by the command-line tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyRequest {
    /// Caller-chosen id echoed in the response; `"auto"` generates one
    #[serde(default = "auto_execution_id")]
    pub execution_id: String,
    #[serde(alias = "workspaceEdit")]
    pub workspace_edit: WorkspaceEdit,
}

fn auto_execution_id() -> String {
    AUTO_EXECUTION_ID.to_string()
}

impl ApplyRequest {
    /// The request's execution id, generating one for `"auto"`
    pub fn resolved_execution_id(&self) -> String {
        if self.execution_id == AUTO_EXECUTION_ID {
            generate_execution_id()
        } else {
            self.execution_id.clone()
        }
    }
}

/// Generate a fresh execution id (UUID v4)
pub fn generate_execution_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Outcome of a request, serialized for `--json` output
///
/// On failure `outcomes` and the counts cover the operations that completed
/// before the failing one; they are not rolled back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplyResponse {
    pub execution_id: String,
    pub success: bool,
    pub applied_count: usize,
    pub skipped_count: usize,
    /// Per-operation results, in application order
    pub outcomes: Vec<ChangeOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_class: Option<ErrorClass>,
    /// Operation that failed, e.g. `documentChanges[2]`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_operation: Option<String>,
}

impl ApplyResponse {
    pub fn success(execution_id: String, report: &WorkspaceReport) -> Self {
        Self {
            execution_id,
            success: true,
            applied_count: report.applied_count,
            skipped_count: report.skipped_count,
            outcomes: report.outcomes.clone(),
            error: None,
            error_class: None,
            failed_operation: None,
        }
    }

    /// Failure before any operation ran (unreadable request and the like)
    pub fn failure(execution_id: String, error: String) -> Self {
        Self {
            execution_id,
            success: false,
            applied_count: 0,
            skipped_count: 0,
            outcomes: Vec::new(),
            error: Some(error),
            error_class: None,
            failed_operation: None,
        }
    }

    pub fn from_workspace_error(execution_id: String, err: &WorkspaceError) -> Self {
        let partial = WorkspaceReport::new(err.completed.clone());
        Self {
            execution_id,
            success: false,
            applied_count: partial.applied_count,
            skipped_count: partial.skipped_count,
            outcomes: partial.outcomes,
            error: Some(err.to_string()),
            error_class: Some(err.class()),
            failed_operation: Some(err.operation.to_string()),
        }
    }
}
