//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{HeaderMap, StatusCode},
    routing::{get, post, put},
};
use chrono::Utc;
use taskdeps::domain::{DependencyId, ProjectId, TaskId};

use crate::error::ApiError;
use crate::events::DependencyEvent;
use crate::middleware::ACTOR_HEADER;
use crate::models::{
    ApiResponse, ChainDirectionQuery, ChainResponse, CheckCircularRequest, CheckCircularResponse,
    CreateDependencyRequest, DependencyView, EdgeDirectionQuery, HealthResponse, ProjectQuery,
    SetStatusRequest, StatusChangeResponse, TaskView, UpdateDependencyRequest, UpsertTaskRequest,
    ValidateTransitionRequest, ValidateTransitionResponse,
};
use crate::state::AppState;

type ApiResult<T> = Result<T, ApiError>;

/// Build every route.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/dependencies", post(create_dependency_handler))
        .route(
            "/api/dependencies/check-circular",
            post(check_circular_handler),
        )
        .route(
            "/api/dependencies/:id",
            get(get_dependency_handler)
                .put(update_dependency_handler)
                .delete(delete_dependency_handler),
        )
        .route(
            "/api/dependencies/tasks/:task_id",
            get(task_dependencies_handler),
        )
        .route(
            "/api/dependencies/tasks/:task_id/chain",
            get(chain_handler),
        )
        .route(
            "/api/dependencies/tasks/:task_id/validate",
            post(validate_transition_handler),
        )
        .route(
            "/api/dependencies/projects/:project_id",
            get(project_dependencies_handler),
        )
        .route("/api/tasks/:id", put(upsert_task_handler).get(get_task_handler))
        .route("/api/tasks/:id/status", post(set_status_handler))
        .route("/api/shutdown", post(shutdown_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

/// Acting user from the `x-actor` header, if present and non-empty.
fn actor(headers: &HeaderMap) -> Option<String> {
    headers
        .get(ACTOR_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToString::to_string)
}

/// Persist after a mutation; on failure restore the on-disk state.
///
/// Callers hold `state.write_lock` across the mutation and this call.
async fn persist(state: &AppState) -> ApiResult<()> {
    if let Err(err) = state.storage.save().await {
        tracing::error!(error = %err, "Failed to save; reloading last saved state");
        if let Err(reload_err) = state.storage.reload().await {
            tracing::error!(error = %reload_err, "Failed to reload after save failure");
        }
        return Err(ApiError::Internal(format!("Failed to save changes: {err}")));
    }
    Ok(())
}

// ============= Dependencies =============

/// POST /api/dependencies
async fn create_dependency_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<CreateDependencyRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ApiResponse<DependencyView>>)> {
    let Json(req) = payload?;
    let new = req.into_new_dependency(actor(&headers));

    let _write = state.write_lock.lock().await;

    let dep = state.storage.insert(new).await?;
    persist(&state).await?;

    state.publish(DependencyEvent::DependencyCreated {
        dependency: dep.clone(),
    });

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::data(dep.into()).with_message("Dependency created successfully")),
    ))
}

/// GET /api/dependencies/:id
async fn get_dependency_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<Json<ApiResponse<DependencyView>>> {
    let id = DependencyId(id);
    let dep = state
        .storage
        .get_dependency(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Dependency not found: {id}")))?;
    Ok(Json(ApiResponse::data(dep.into())))
}

/// PUT /api/dependencies/:id
async fn update_dependency_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    headers: HeaderMap,
    payload: Result<Json<UpdateDependencyRequest>, JsonRejection>,
) -> ApiResult<Json<ApiResponse<DependencyView>>> {
    let Json(req) = payload?;
    if req.is_empty() {
        return Err(ApiError::InvalidRequest(
            "No changes given; expected dependencyType, lagTime, isActive or metadata".into(),
        ));
    }

    let _write = state.write_lock.lock().await;
    let dep = state
        .storage
        .update(DependencyId(id), req.into_update(actor(&headers)))
        .await?;
    persist(&state).await?;

    state.publish(DependencyEvent::DependencyUpdated {
        dependency: dep.clone(),
    });

    Ok(Json(
        ApiResponse::data(dep.into()).with_message("Dependency updated successfully"),
    ))
}

/// DELETE /api/dependencies/:id (soft delete)
async fn delete_dependency_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    headers: HeaderMap,
) -> ApiResult<Json<ApiResponse<DependencyView>>> {
    let _write = state.write_lock.lock().await;
    let dep = state
        .storage
        .deactivate(DependencyId(id), actor(&headers))
        .await?;
    persist(&state).await?;

    state.publish(DependencyEvent::DependencyRemoved {
        dependency_id: dep.id,
        predecessor: dep.predecessor_id,
        successor: dep.successor_id,
    });

    Ok(Json(
        ApiResponse::data(dep.into()).with_message("Dependency removed successfully"),
    ))
}

/// GET /api/dependencies/tasks/:task_id?direction=
async fn task_dependencies_handler(
    State(state): State<AppState>,
    Path(task_id): Path<u64>,
    query: Result<Query<EdgeDirectionQuery>, QueryRejection>,
) -> ApiResult<Json<ApiResponse<Vec<DependencyView>>>> {
    let Query(query) = query?;
    let deps = state
        .storage
        .dependencies_for(TaskId(task_id), query.direction)
        .await?;
    Ok(Json(ApiResponse::list(
        deps.into_iter().map(Into::into).collect(),
    )))
}

/// GET /api/dependencies/tasks/:task_id/chain?direction=
async fn chain_handler(
    State(state): State<AppState>,
    Path(task_id): Path<u64>,
    query: Result<Query<ChainDirectionQuery>, QueryRejection>,
) -> ApiResult<Json<ChainResponse>> {
    let Query(query) = query?;
    let deps = state.storage.walk(TaskId(task_id), query.direction).await?;
    let data: Vec<DependencyView> = deps.into_iter().map(Into::into).collect();

    Ok(Json(ChainResponse {
        success: true,
        direction: query.direction,
        count: data.len(),
        data,
    }))
}

/// POST /api/dependencies/tasks/:task_id/validate
async fn validate_transition_handler(
    State(state): State<AppState>,
    Path(task_id): Path<u64>,
    payload: Result<Json<ValidateTransitionRequest>, JsonRejection>,
) -> ApiResult<Json<ValidateTransitionResponse>> {
    let Json(req) = payload?;
    let report = state
        .storage
        .can_transition(TaskId(task_id), req.new_status)
        .await?;
    Ok(Json(report.into()))
}

/// GET /api/dependencies/projects/:project_id?includeInactive=
async fn project_dependencies_handler(
    State(state): State<AppState>,
    Path(project_id): Path<u64>,
    query: Result<Query<ProjectQuery>, QueryRejection>,
) -> ApiResult<Json<ApiResponse<Vec<DependencyView>>>> {
    let Query(query) = query?;
    let deps = state
        .storage
        .project_dependencies(ProjectId(project_id), query.include_inactive)
        .await?;
    Ok(Json(ApiResponse::list(
        deps.into_iter().map(Into::into).collect(),
    )))
}

/// POST /api/dependencies/check-circular
async fn check_circular_handler(
    State(state): State<AppState>,
    payload: Result<Json<CheckCircularRequest>, JsonRejection>,
) -> ApiResult<Json<CheckCircularResponse>> {
    let Json(req) = payload?;
    let has_circular = state
        .storage
        .would_create_cycle(
            TaskId(req.predecessor_task_id),
            TaskId(req.successor_task_id),
        )
        .await?;

    let message = if has_circular {
        "This dependency would create a circular dependency"
    } else {
        "No circular dependency detected"
    };
    Ok(Json(CheckCircularResponse {
        success: true,
        has_circular,
        message: message.to_string(),
    }))
}

// ============= Tasks =============

/// PUT /api/tasks/:id
async fn upsert_task_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    payload: Result<Json<UpsertTaskRequest>, JsonRejection>,
) -> ApiResult<Json<ApiResponse<TaskView>>> {
    let Json(req) = payload?;
    let _write = state.write_lock.lock().await;
    let task = state.storage.upsert_task(req.into_task(id)).await?;
    persist(&state).await?;
    Ok(Json(ApiResponse::data(task.into())))
}

/// GET /api/tasks/:id
async fn get_task_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<Json<ApiResponse<TaskView>>> {
    let id = TaskId(id);
    let task = state
        .storage
        .get_task(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Task not found: {id}")))?;
    Ok(Json(ApiResponse::data(task.into())))
}

/// POST /api/tasks/:id/status
async fn set_status_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    payload: Result<Json<SetStatusRequest>, JsonRejection>,
) -> ApiResult<Json<StatusChangeResponse>> {
    let Json(req) = payload?;
    let _write = state.write_lock.lock().await;
    let outcome = state
        .storage
        .set_task_status(TaskId(id), req.status, req.force)
        .await?;
    persist(&state).await?;

    state.publish(DependencyEvent::TaskStatusChanged {
        task: outcome.task.id,
        previous: outcome.report.current_status,
        current: outcome.task.status,
        overridden: outcome.overridden,
    });

    Ok(Json(StatusChangeResponse {
        success: true,
        previous_status: outcome.report.current_status,
        overridden: outcome.overridden,
        violations: outcome
            .report
            .violations
            .into_iter()
            .map(Into::into)
            .collect(),
        warnings: outcome
            .report
            .warnings
            .into_iter()
            .map(Into::into)
            .collect(),
        data: outcome.task.into(),
    }))
}

// ============= Service =============

/// GET /health
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let now = Utc::now();
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: (now - state.started_at).num_seconds(),
        timestamp: now,
    })
}

/// POST /api/shutdown
async fn shutdown_handler(State(state): State<AppState>) -> Json<ApiResponse<()>> {
    if state.shutdown_tx.send(()).is_err() {
        tracing::warn!("Shutdown requested but no server is listening for it");
    }
    Json(ApiResponse {
        success: true,
        data: None,
        count: None,
        message: Some("Shutdown signal sent".into()),
    })
}
