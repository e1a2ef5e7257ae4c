pub mod classifications;
pub mod health;
pub mod tasks;

use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use crate::tasks::TaskError;

/// JSON error body + status for one failed operation.
pub type ErrorResponse = (StatusCode, Json<Value>);

/// Map a task error to its HTTP contract. Conflicts get 409 so clients can
/// distinguish "retry the same request" from a request that can never succeed.
pub fn error_response(err: TaskError) -> ErrorResponse {
    let status = match &err {
        TaskError::Validation { .. } | TaskError::Reference(_) => StatusCode::UNPROCESSABLE_ENTITY,
        TaskError::NotFound(_) => StatusCode::NOT_FOUND,
        TaskError::Conflict(_) => StatusCode::CONFLICT,
        TaskError::Timeout(_) | TaskError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let kind = match &err {
        TaskError::Validation { .. } => "validation",
        TaskError::Reference(_) => "reference",
        TaskError::NotFound(_) => "not_found",
        TaskError::Conflict(_) => "conflict",
        TaskError::Timeout(_) => "timeout",
        TaskError::Storage(_) => "storage",
    };
    (status, Json(json!({ "error": err.to_string(), "kind": kind })))
}
