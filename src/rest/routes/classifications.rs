use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use super::{error_response, ErrorResponse};
use crate::tasks::classification;
use crate::AppContext;

pub async fn list_classifications(
    State(ctx): State<Arc<AppContext>>,
) -> Result<Json<Value>, ErrorResponse> {
    let rows = classification::list_all(&ctx.storage.pool())
        .await
        .map_err(error_response)?;
    Ok(Json(json!({ "classifications": rows })))
}
