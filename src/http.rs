//! Robot API surface: `/robot/ping` and `/robot/control`

use crate::command::CommandExecutor;
use arena_shared::{Command, ErrorBody, PingResponse};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn create_router(executor: Arc<CommandExecutor>) -> Router {
    Router::new()
        .route("/robot/ping", get(ping))
        .route("/robot/control", post(control))
        .layer(TraceLayer::new_for_http())
        .with_state(executor)
}

async fn ping() -> Json<PingResponse> {
    Json(PingResponse { pong: true })
}

async fn control(
    State(executor): State<Arc<CommandExecutor>>,
    body: Result<Json<Command>, JsonRejection>,
) -> Response {
    let command = match body {
        Ok(Json(command)) => command,
        Err(rejection) => {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ErrorBody::new(rejection.body_text())),
            )
                .into_response();
        }
    };

    let execution = executor.execute(&command).await;
    let status = StatusCode::from_u16(execution.status.code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(execution.body)).into_response()
}
