//! HTTP API data models.
//!
//! Request and response bodies use camelCase field names.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use taskdeps::constraints::{TransitionReport, Violation, Warning, WarningKind};
use taskdeps::domain::{
    ChainDirection, Dependency, DependencyType, DependencyUpdate, EdgeDirection, Metadata,
    NewDependency, Task, TaskStatus,
};

// ============= Requests =============

/// Body of `POST /api/dependencies`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDependencyRequest {
    pub predecessor_task_id: u64,
    pub successor_task_id: u64,
    #[serde(default)]
    pub dependency_type: DependencyType,
    #[serde(default)]
    pub lag_time: i32,
    #[serde(default)]
    pub metadata: Option<Metadata>,
}

impl CreateDependencyRequest {
    /// Convert into a storage request, recording the acting user.
    pub fn into_new_dependency(self, actor: Option<String>) -> NewDependency {
        let mut new = NewDependency::new(
            self.predecessor_task_id,
            self.successor_task_id,
            self.dependency_type,
        )
        .with_lag(self.lag_time);
        new.metadata = self.metadata.unwrap_or_default();
        new.created_by = actor;
        new
    }
}

/// Body of `PUT /api/dependencies/:id`; every field is optional
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDependencyRequest {
    pub dependency_type: Option<DependencyType>,
    pub lag_time: Option<i32>,
    pub is_active: Option<bool>,
    pub metadata: Option<Metadata>,
}

impl UpdateDependencyRequest {
    /// Whether the body names no change at all.
    pub fn is_empty(&self) -> bool {
        self.dependency_type.is_none()
            && self.lag_time.is_none()
            && self.is_active.is_none()
            && self.metadata.is_none()
    }

    /// Convert into a storage update, recording the acting user.
    pub fn into_update(self, actor: Option<String>) -> DependencyUpdate {
        DependencyUpdate {
            dep_type: self.dependency_type,
            lag_hours: self.lag_time,
            is_active: self.is_active,
            metadata: self.metadata,
            updated_by: actor,
        }
    }
}

/// `?direction=both|predecessor|successor`
#[derive(Debug, Default, Deserialize)]
pub struct EdgeDirectionQuery {
    #[serde(default)]
    pub direction: EdgeDirection,
}

/// `?direction=forward|backward`
#[derive(Debug, Default, Deserialize)]
pub struct ChainDirectionQuery {
    #[serde(default)]
    pub direction: ChainDirection,
}

/// `?includeInactive=true`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectQuery {
    #[serde(default)]
    pub include_inactive: bool,
}

/// Body of `POST /api/dependencies/tasks/:taskId/validate`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateTransitionRequest {
    pub new_status: TaskStatus,
}

/// Body of `POST /api/dependencies/check-circular`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckCircularRequest {
    pub predecessor_task_id: u64,
    pub successor_task_id: u64,
}

/// Body of `PUT /api/tasks/:id`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertTaskRequest {
    pub title: String,
    #[serde(default = "default_status")]
    pub status: TaskStatus,
    #[serde(default)]
    pub project_id: Option<u64>,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
}

fn default_status() -> TaskStatus {
    TaskStatus::Todo
}

impl UpsertTaskRequest {
    /// Build the snapshot for task `id`.
    pub fn into_task(self, id: u64) -> Task {
        let mut task = Task::new(id, self.title, self.status);
        task.project_id = self.project_id.map(Into::into);
        task.start_date = self.start_date;
        task.due_date = self.due_date;
        task
    }
}

/// Body of `POST /api/tasks/:id/status`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetStatusRequest {
    pub status: TaskStatus,
    #[serde(default)]
    pub force: bool,
}

// ============= Views =============

/// A dependency as returned by the API
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyView {
    pub id: u64,
    pub predecessor_task_id: u64,
    pub successor_task_id: u64,
    pub dependency_type: DependencyType,
    pub dependency_description: &'static str,
    pub lag_time: i32,
    pub is_active: bool,
    pub metadata: Metadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Dependency> for DependencyView {
    fn from(dep: Dependency) -> Self {
        Self {
            id: dep.id.get(),
            predecessor_task_id: dep.predecessor_id.get(),
            successor_task_id: dep.successor_id.get(),
            dependency_type: dep.dep_type,
            dependency_description: dep.dep_type.description(),
            lag_time: dep.lag_hours,
            is_active: dep.is_active,
            metadata: dep.metadata,
            created_by: dep.created_by,
            updated_by: dep.updated_by,
            created_at: dep.created_at,
            updated_at: dep.updated_at,
        }
    }
}

/// A task snapshot as returned by the API
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskView {
    pub id: u64,
    pub title: String,
    pub status: TaskStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl From<Task> for TaskView {
    fn from(task: Task) -> Self {
        Self {
            id: task.id.get(),
            title: task.title,
            status: task.status,
            project_id: task.project_id.map(|p| p.get()),
            start_date: task.start_date,
            due_date: task.due_date,
            updated_at: task.updated_at,
        }
    }
}

/// One blocking condition
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViolationView {
    pub dependency_id: u64,
    pub predecessor_task_id: u64,
    pub successor_task_id: u64,
    pub dependency_type: DependencyType,
    pub reason: String,
}

impl From<Violation> for ViolationView {
    fn from(v: Violation) -> Self {
        Self {
            dependency_id: v.dependency_id.get(),
            predecessor_task_id: v.predecessor_id.get(),
            successor_task_id: v.successor_id.get(),
            dependency_type: v.dep_type,
            reason: v.reason,
        }
    }
}

/// One non-blocking finding
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WarningView {
    pub dependency_id: u64,
    pub kind: WarningKind,
    pub message: String,
}

impl From<Warning> for WarningView {
    fn from(w: Warning) -> Self {
        Self {
            dependency_id: w.dependency_id.get(),
            kind: w.kind,
            message: w.message,
        }
    }
}

// ============= Responses =============

/// Generic success envelope
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            count: None,
            message: None,
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl<T> ApiResponse<Vec<T>> {
    pub fn list(data: Vec<T>) -> Self {
        Self {
            success: true,
            count: Some(data.len()),
            data: Some(data),
            message: None,
        }
    }
}

/// Response of the chain walk
#[derive(Debug, Serialize)]
pub struct ChainResponse {
    pub success: bool,
    pub direction: ChainDirection,
    pub count: usize,
    pub data: Vec<DependencyView>,
}

/// Response of the transition check
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateTransitionResponse {
    pub success: bool,
    pub valid: bool,
    pub current_status: TaskStatus,
    pub proposed_status: TaskStatus,
    pub violations: Vec<ViolationView>,
    pub warnings: Vec<WarningView>,
}

impl From<TransitionReport> for ValidateTransitionResponse {
    fn from(report: TransitionReport) -> Self {
        Self {
            success: true,
            valid: report.allowed,
            current_status: report.current_status,
            proposed_status: report.proposed_status,
            violations: report.violations.into_iter().map(Into::into).collect(),
            warnings: report.warnings.into_iter().map(Into::into).collect(),
        }
    }
}

/// Response of an applied status change
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChangeResponse {
    pub success: bool,
    pub data: TaskView,
    pub previous_status: TaskStatus,
    pub overridden: bool,
    pub violations: Vec<ViolationView>,
    pub warnings: Vec<WarningView>,
}

/// Response of the cycle check
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckCircularResponse {
    pub success: bool,
    pub has_circular: bool,
    pub message: String,
}

/// Response of `GET /health`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_seconds: i64,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_defaults() {
        let json = r#"{"predecessorTaskId":1,"successorTaskId":2}"#;
        let req: CreateDependencyRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.dependency_type, DependencyType::FinishToStart);
        assert_eq!(req.lag_time, 0);
        assert!(req.metadata.is_none());
    }

    #[test]
    fn test_create_request_full() {
        let json = r#"{"predecessorTaskId":1,"successorTaskId":2,"dependencyType":"SS","lagTime":-3,"metadata":{"note":"x"}}"#;
        let req: CreateDependencyRequest = serde_json::from_str(json).unwrap();
        let new = req.into_new_dependency(Some("bob".into()));
        assert_eq!(new.dep_type, DependencyType::StartToStart);
        assert_eq!(new.lag_hours, -3);
        assert_eq!(new.metadata["note"], "x");
        assert_eq!(new.created_by.as_deref(), Some("bob"));
    }

    #[test]
    fn test_create_request_rejects_unknown_type() {
        let json = r#"{"predecessorTaskId":1,"successorTaskId":2,"dependencyType":"XY"}"#;
        assert!(serde_json::from_str::<CreateDependencyRequest>(json).is_err());
    }

    #[test]
    fn test_update_request_is_empty() {
        let req: UpdateDependencyRequest = serde_json::from_str("{}").unwrap();
        assert!(req.is_empty());

        let req: UpdateDependencyRequest = serde_json::from_str(r#"{"isActive":false}"#).unwrap();
        assert!(!req.is_empty());
        assert_eq!(req.into_update(None).is_active, Some(false));
    }

    #[test]
    fn test_dependency_view_uses_camel_case() {
        let now = Utc::now();
        let view = DependencyView::from(Dependency {
            id: 3.into(),
            predecessor_id: 1.into(),
            successor_id: 2.into(),
            dep_type: DependencyType::FinishToFinish,
            lag_hours: 2,
            is_active: true,
            metadata: Metadata::new(),
            created_by: None,
            updated_by: None,
            created_at: now,
            updated_at: now,
        });

        let value = serde_json::to_value(view).unwrap();
        assert_eq!(value["predecessorTaskId"], 1);
        assert_eq!(value["dependencyType"], "FF");
        assert_eq!(value["dependencyDescription"], "Finish-to-Finish");
        assert_eq!(value["lagTime"], 2);
        assert!(value.get("createdBy").is_none());
    }

    #[test]
    fn test_list_response_counts() {
        let value = serde_json::to_value(ApiResponse::list(vec![1, 2, 3])).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["count"], 3);
        assert!(value.get("message").is_none());
    }
}
