// rest/mod.rs — HTTP API server.
//
// Axum HTTP server, local only by default. Thin presentation glue: handlers
// validate nothing themselves — they hand requests to the mutation
// coordinator / store and translate TaskError into status codes.
//
// Endpoints:
//   GET    /api/v1/health
//   GET    /api/v1/tasks                (filters + stats block)
//   POST   /api/v1/tasks
//   GET    /api/v1/tasks/{id}
//   PUT    /api/v1/tasks/{id}
//   DELETE /api/v1/tasks/{id}
//   GET    /api/v1/tasks/{id}/history
//   GET    /api/v1/classifications

pub mod routes;

use anyhow::Result;
use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::AppContext;

pub async fn start_rest_server(ctx: Arc<AppContext>) -> Result<()> {
    let bind = format!("{}:{}", ctx.config.bind_address, ctx.config.port);
    let addr: SocketAddr = bind.parse()?;

    let router = build_router(ctx);

    info!("REST API listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}

pub fn build_router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/api/v1/health", get(routes::health::health))
        .route(
            "/api/v1/tasks",
            get(routes::tasks::list_tasks).post(routes::tasks::add_task),
        )
        .route(
            "/api/v1/tasks/{id}",
            get(routes::tasks::get_task)
                .put(routes::tasks::edit_task)
                .delete(routes::tasks::delete_task),
        )
        .route("/api/v1/tasks/{id}/history", get(routes::tasks::task_history))
        .route(
            "/api/v1/classifications",
            get(routes::classifications::list_classifications),
        )
        .layer(CorsLayer::permissive())
        .with_state(ctx)
}
