// rest/routes/tasks.rs — task CRUD, history, and the filtered listing with
// its statistics block.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;

use super::{error_response, ErrorResponse};
use crate::stats::{apply_filters, compute_stats, TaskFilters};
use crate::tasks::{history, store, AddTaskRequest, EditTaskRequest, TaskError};
use crate::AppContext;

/// `GET /api/v1/tasks` — filtered listing plus the statistics block the
/// dashboard displays, computed over the filtered set.
pub async fn list_tasks(
    State(ctx): State<Arc<AppContext>>,
    Query(filters): Query<TaskFilters>,
) -> Result<Json<Value>, ErrorResponse> {
    let tasks = store::list_all(&ctx.storage.pool())
        .await
        .map_err(error_response)?;
    let tasks = apply_filters(tasks, &filters);
    let stats = compute_stats(&tasks);
    Ok(Json(json!({ "tasks": tasks, "stats": stats })))
}

pub async fn add_task(
    State(ctx): State<Arc<AppContext>>,
    Json(req): Json<AddTaskRequest>,
) -> Result<(StatusCode, Json<Value>), ErrorResponse> {
    let task_id = ctx
        .coordinator
        .add_task(&req)
        .await
        .map_err(error_response)?;
    Ok((StatusCode::CREATED, Json(json!({ "task_id": task_id }))))
}

pub async fn get_task(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ErrorResponse> {
    match store::get(&ctx.storage.pool(), id).await.map_err(error_response)? {
        Some(task) => Ok(Json(json!({ "task": task }))),
        None => Err(error_response(TaskError::NotFound(id))),
    }
}

pub async fn edit_task(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<i64>,
    Json(req): Json<EditTaskRequest>,
) -> Result<Json<Value>, ErrorResponse> {
    ctx.coordinator
        .edit_task(id, &req)
        .await
        .map_err(error_response)?;
    Ok(Json(json!({ "task_id": id, "edited": true })))
}

pub async fn delete_task(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ErrorResponse> {
    ctx.coordinator
        .delete_task(id)
        .await
        .map_err(error_response)?;
    Ok(Json(json!({ "task_id": id, "deleted": true })))
}

/// `GET /api/v1/tasks/{id}/history` — snapshots newest first. 404 when the
/// task itself is gone (its history went with it).
pub async fn task_history(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ErrorResponse> {
    let pool = ctx.storage.pool();
    if store::get(&pool, id).await.map_err(error_response)?.is_none() {
        return Err(error_response(TaskError::NotFound(id)));
    }
    let entries = history::list_for_task(&pool, id)
        .await
        .map_err(error_response)?;
    Ok(Json(json!({ "task_id": id, "history": entries })))
}
