/// Task lifecycle endpoints
///
/// All routes here sit behind the JWT middleware; the acting user comes
/// from the token's claims, never from the request body.
///
/// # Endpoints
///
/// - `POST /api/v1/tasks/` - Create a task
/// - `GET /api/v1/tasks/` - List all tasks (paginated)
/// - `GET /api/v1/tasks/my` - Tasks assigned to the caller
/// - `GET /api/v1/tasks/:id` - Fetch one task
/// - `PUT /api/v1/tasks/:id` - Partial update
/// - `DELETE /api/v1/tasks/:id` - Soft delete
///
/// Every mutating operation runs its write inside a transaction scoped to
/// that operation and then re-reads the committed row (assignee joined) to
/// build the response, so responses always reflect store-side defaults and
/// timestamps.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use taskboard_shared::{
    auth::middleware::AuthContext,
    models::{
        task::{CreateTask, Task, TaskStatus, TaskWithAssignee},
        user::User,
    },
};
use validator::Validate;

/// Create task request
///
/// Any `status` field in the body is ignored: new tasks always start as
/// `TODO`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    /// Task title
    #[validate(length(min = 1, max = 255, message = "Title must be 1 to 255 characters"))]
    pub title: String,

    /// Optional description
    #[serde(default)]
    pub description: String,

    /// User the task is assigned to
    pub assigned_to_id: i64,

    /// Optional due date
    pub due_date: Option<DateTime<Utc>>,
}

/// Update task request
///
/// Partial-update semantics: only fields present in the body are changed.
/// `status` arrives as a string and is parsed through the validated enum,
/// so unrecognized values fail with a 400 instead of being stored.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTaskRequest {
    /// New title
    pub title: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New status (`TODO`, `IN_PROGRESS`, or `DONE`)
    pub status: Option<String>,

    /// New assignee
    pub assigned_to_id: Option<i64>,

    /// New due date
    pub due_date: Option<DateTime<Utc>>,
}

/// Pagination query parameters
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    /// 1-based page number
    #[serde(default = "default_page")]
    pub page: i64,

    /// Items per page
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    10
}

/// Converts a page query into a (limit, offset) window
///
/// Pages below 1 and non-positive page sizes clamp to their defaults.
fn page_window(query: &PageQuery) -> (i64, i64) {
    let page = query.page.max(1);
    let page_size = if query.page_size > 0 {
        query.page_size
    } else {
        default_page_size()
    };

    (page_size, (page - 1) * page_size)
}

/// Task view returned by every task endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct TaskResponse {
    /// Task ID
    pub id: i64,

    /// Title
    pub title: String,

    /// Description
    pub description: String,

    /// Current status
    pub status: TaskStatus,

    /// Assignee's user ID
    pub assigned_to_id: i64,

    /// Assignee's username, when resolvable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,

    /// Due date, if set
    pub due_date: Option<DateTime<Utc>>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl From<TaskWithAssignee> for TaskResponse {
    fn from(task: TaskWithAssignee) -> Self {
        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            status: task.status,
            assigned_to_id: task.assigned_to_id,
            assigned_to: task.assigned_to,
            due_date: task.due_date,
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}

/// Paginated task list response
#[derive(Debug, Serialize, Deserialize)]
pub struct TaskListResponse {
    /// Tasks in the requested page window
    pub tasks: Vec<TaskResponse>,

    /// Total number of live tasks, independent of the page window
    pub total: i64,
}

/// Confirmation message response
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Human-readable confirmation
    pub message: String,
}

/// Creates a new task
///
/// The assignee must exist; status is forced to `TODO`; the creator is the
/// acting user from the token. The insert runs in a transaction and the
/// committed row is re-read with the assignee joined.
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed or assigned user not found
/// - `401 Unauthorized`: Missing or invalid token
/// - `500 Internal Server Error`: Store failure
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<TaskResponse>)> {
    req.validate()?;

    if User::find_by_id(&state.db, req.assigned_to_id)
        .await?
        .is_none()
    {
        return Err(ApiError::BadRequest("Assigned user not found".to_string()));
    }

    let mut tx = state.db.begin().await?;
    let task = Task::create(
        &mut *tx,
        CreateTask {
            title: req.title,
            description: req.description,
            assigned_to_id: req.assigned_to_id,
            created_by: auth.user_id,
            due_date: req.due_date,
        },
    )
    .await?;
    tx.commit().await?;

    let created = Task::find_by_id(&state.db, task.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    tracing::info!(task_id = created.id, created_by = auth.user_id, "Task created");

    Ok((StatusCode::CREATED, Json(created.into())))
}

/// Lists all tasks with pagination
///
/// The item page and the total count are two separate queries; they are
/// not transactionally consistent with each other.
pub async fn list_tasks(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<TaskListResponse>> {
    let (limit, offset) = page_window(&query);

    let total = Task::count(&state.db).await?;
    let tasks = Task::list(&state.db, limit, offset).await?;

    Ok(Json(TaskListResponse {
        tasks: tasks.into_iter().map(TaskResponse::from).collect(),
        total,
    }))
}

/// Lists tasks assigned to the calling user, with pagination
pub async fn my_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<TaskListResponse>> {
    let (limit, offset) = page_window(&query);

    let total = Task::count_by_assignee(&state.db, auth.user_id).await?;
    let tasks = Task::list_by_assignee(&state.db, auth.user_id, limit, offset).await?;

    Ok(Json(TaskListResponse {
        tasks: tasks.into_iter().map(TaskResponse::from).collect(),
        total,
    }))
}

/// Fetches one task by ID
///
/// # Errors
///
/// - `404 Not Found`: No such task, or it was soft-deleted
pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<TaskResponse>> {
    let task = Task::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(task.into()))
}

/// Updates a task with partial-update semantics
///
/// Only the fields present in the body change. A new assignee is validated
/// the same way as at creation. `created_by` is never touched. The write
/// runs in a transaction and the committed row is re-read for the
/// response.
///
/// # Errors
///
/// - `400 Bad Request`: Unknown status value or assigned user not found
/// - `403 Forbidden`: Ownership enforcement is enabled and the caller is
///   not the creator
/// - `404 Not Found`: No such task, or it was soft-deleted
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<TaskResponse>> {
    let existing = Task::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    check_ownership(&state, &auth, existing.created_by)?;

    let mut task = existing.into_task();

    if let Some(title) = req.title {
        if title.is_empty() || title.len() > 255 {
            return Err(ApiError::ValidationError(vec![ValidationErrorDetail {
                field: "title".to_string(),
                message: "Title must be 1 to 255 characters".to_string(),
            }]));
        }
        task.title = title;
    }
    if let Some(description) = req.description {
        task.description = description;
    }
    if let Some(status) = req.status.as_deref() {
        task.status = status.parse::<TaskStatus>().map_err(|e| {
            ApiError::ValidationError(vec![ValidationErrorDetail {
                field: "status".to_string(),
                message: e.to_string(),
            }])
        })?;
    }
    if let Some(assigned_to_id) = req.assigned_to_id {
        if User::find_by_id(&state.db, assigned_to_id).await?.is_none() {
            return Err(ApiError::BadRequest("Assigned user not found".to_string()));
        }
        task.assigned_to_id = assigned_to_id;
    }
    if let Some(due_date) = req.due_date {
        task.due_date = Some(due_date);
    }

    let mut tx = state.db.begin().await?;
    let updated = Task::update(&mut *tx, &task).await?;
    tx.commit().await?;

    // A concurrent delete between the load and the write leaves nothing to
    // update.
    if updated.is_none() {
        return Err(ApiError::NotFound("Task not found".to_string()));
    }

    let refreshed = Task::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(refreshed.into()))
}

/// Soft-deletes a task
///
/// The row keeps its data; the delete marker excludes it from all reads.
/// Deleting an already-deleted task is a 404.
///
/// # Errors
///
/// - `403 Forbidden`: Ownership enforcement is enabled and the caller is
///   not the creator
/// - `404 Not Found`: No such task, or it was already deleted
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    let existing = Task::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    check_ownership(&state, &auth, existing.created_by)?;

    let mut tx = state.db.begin().await?;
    let deleted = Task::soft_delete(&mut *tx, id).await?;
    tx.commit().await?;

    if !deleted {
        return Err(ApiError::NotFound("Task not found".to_string()));
    }

    tracing::info!(task_id = id, deleted_by = auth.user_id, "Task deleted");

    Ok(Json(MessageResponse {
        message: "Task deleted successfully".to_string(),
    }))
}

/// Applies the configurable ownership policy
///
/// With enforcement off (the default) any authenticated user may mutate
/// any task; with it on, only the creator may.
fn check_ownership(state: &AppState, auth: &AuthContext, created_by: i64) -> ApiResult<()> {
    if state.config.tasks.enforce_ownership && created_by != auth.user_id {
        return Err(ApiError::Forbidden(
            "Only the task's creator may modify it".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(page: i64, page_size: i64) -> PageQuery {
        PageQuery { page, page_size }
    }

    #[test]
    fn test_page_window_basic() {
        assert_eq!(page_window(&query(1, 10)), (10, 0));
        assert_eq!(page_window(&query(2, 10)), (10, 10));
        assert_eq!(page_window(&query(3, 10)), (10, 20));
        assert_eq!(page_window(&query(2, 25)), (25, 25));
    }

    #[test]
    fn test_page_window_clamps_bad_input() {
        assert_eq!(page_window(&query(0, 10)), (10, 0));
        assert_eq!(page_window(&query(-5, 10)), (10, 0));
        assert_eq!(page_window(&query(1, 0)), (10, 0));
        assert_eq!(page_window(&query(1, -1)), (10, 0));
    }

    #[test]
    fn test_create_request_ignores_status_field() {
        // A status in the create body is not even deserialized; new tasks
        // always start as TODO.
        let req: CreateTaskRequest = serde_json::from_value(serde_json::json!({
            "title": "Write report",
            "assigned_to_id": 2,
            "status": "DONE"
        }))
        .unwrap();

        assert_eq!(req.title, "Write report");
        assert_eq!(req.description, "");
    }

    #[test]
    fn test_update_request_partial_fields() {
        let req: UpdateTaskRequest =
            serde_json::from_value(serde_json::json!({ "status": "DONE" })).unwrap();

        assert!(req.title.is_none());
        assert!(req.description.is_none());
        assert_eq!(req.status.as_deref(), Some("DONE"));
        assert!(req.assigned_to_id.is_none());
        assert!(req.due_date.is_none());
    }

    #[test]
    fn test_create_request_title_validation() {
        let empty = CreateTaskRequest {
            title: String::new(),
            description: String::new(),
            assigned_to_id: 1,
            due_date: None,
        };
        assert!(empty.validate().is_err());

        let too_long = CreateTaskRequest {
            title: "a".repeat(256),
            description: String::new(),
            assigned_to_id: 1,
            due_date: None,
        };
        assert!(too_long.validate().is_err());

        let ok = CreateTaskRequest {
            title: "Write report".to_string(),
            description: String::new(),
            assigned_to_id: 1,
            due_date: None,
        };
        assert!(ok.validate().is_ok());
    }
}
