//! HTTP surface of the dispatcher

use crate::error::DispatchError;
use crate::service::Dispatcher;
use arena_shared::{
    AuthParams, BonusParams, BonusResponse, Command, ErrorBody, PenaltyResponse,
    PlayerListResponse, PlayerNameResponse, RegisterParams, RobotEndpoint,
};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde_json::Value;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::warn;

/// Shared state of all handlers
#[derive(Clone)]
pub struct ApiState {
    pub dispatcher: Arc<Dispatcher>,
}

/// Build the dispatcher router
pub fn create_router(dispatcher: Arc<Dispatcher>) -> Router {
    let state = ApiState { dispatcher };

    Router::new()
        .route("/player/list", get(list_players))
        .route("/player/control/:player_name", post(control_robot))
        .route("/player/:player_name", put(register_player).delete(delete_player))
        .route("/player/:player_name/bonus", get(get_bonus).post(add_bonus))
        .route("/player/:player_name/penalty", post(apply_penalty))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Error response rendered as `{"error": ...}`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody::new(message),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message)
    }
}

impl From<DispatchError> for ApiError {
    fn from(error: DispatchError) -> Self {
        let message = error.to_string();
        match error {
            DispatchError::NotFound(_) => Self::new(StatusCode::NOT_FOUND, message),
            DispatchError::AuthFailed(_) => Self::new(StatusCode::FORBIDDEN, message),
            DispatchError::Unreachable { .. } => Self::new(StatusCode::SERVICE_UNAVAILABLE, message),
            DispatchError::Penalized { remaining_ms, .. } => Self {
                status: StatusCode::TOO_MANY_REQUESTS,
                body: ErrorBody {
                    error: message,
                    retry_after_ms: Some(remaining_ms),
                },
            },
            DispatchError::NotImplemented(_) => Self::new(StatusCode::NOT_IMPLEMENTED, message),
            DispatchError::RobotInternalError(_) => Self::new(StatusCode::INTERNAL_SERVER_ERROR, message),
            DispatchError::ValidationError(_) => Self::validation(message),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        warn!(status = %self.status, message = %self.body.error, "request failed");

        let retry_after = self
            .body
            .retry_after_ms
            .map(|ms| ms.div_ceil(1000).max(1));
        let mut response = (self.status, Json(self.body)).into_response();
        if let Some(secs) = retry_after {
            if let Ok(value) = HeaderValue::from_str(&secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }
        response
    }
}

fn require_auth(auth: &str) -> Result<(), ApiError> {
    if auth.is_empty() {
        return Err(ApiError::validation("auth must not be empty"));
    }
    Ok(())
}

/// `PUT /player/{player_name}`: register or update a player
async fn register_player(
    State(state): State<ApiState>,
    Path(player_name): Path<String>,
    query: Result<Query<RegisterParams>, QueryRejection>,
) -> Result<Json<PlayerNameResponse>, ApiError> {
    let Query(params) = query?;
    require_auth(&params.auth)?;
    if params.robot_address.trim().is_empty() {
        return Err(ApiError::validation("robot_address must not be empty"));
    }

    let endpoint = RobotEndpoint::new(params.robot_address.trim(), params.robot_port);
    state
        .dispatcher
        .registry()
        .register(&player_name, endpoint, &params.auth)
        .await
        .map_err(|e| match e {
            // An unreachable robot means the player could not be registered
            DispatchError::Unreachable { .. } => ApiError::new(StatusCode::NOT_FOUND, e.to_string()),
            other => other.into(),
        })?;

    Ok(Json(PlayerNameResponse { player_name }))
}

/// `DELETE /player/{player_name}`
async fn delete_player(
    State(state): State<ApiState>,
    Path(player_name): Path<String>,
    query: Result<Query<AuthParams>, QueryRejection>,
) -> Result<Json<PlayerNameResponse>, ApiError> {
    let Query(params) = query?;
    require_auth(&params.auth)?;

    state
        .dispatcher
        .registry()
        .delete(&player_name, &params.auth)
        .await?;

    Ok(Json(PlayerNameResponse { player_name }))
}

/// `POST /player/control/{player_name}`: relay a command to the player's robot
async fn control_robot(
    State(state): State<ApiState>,
    Path(player_name): Path<String>,
    body: Result<Json<Command>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(command) = body?;

    let result = state
        .dispatcher
        .relay()
        .send_command(&player_name, &command)
        .await?;

    Ok(Json(result))
}

/// `GET /player/{player_name}/bonus`
async fn get_bonus(
    State(state): State<ApiState>,
    Path(player_name): Path<String>,
    query: Result<Query<AuthParams>, QueryRejection>,
) -> Result<Json<BonusResponse>, ApiError> {
    let Query(params) = query?;

    let dispatcher = &state.dispatcher;
    dispatcher.registry().authenticate(&player_name, &params.auth).await?;
    let bonus = dispatcher.bonuses().get_bonus(&player_name).await?;

    Ok(Json(BonusResponse { bonus }))
}

/// `POST /player/{player_name}/bonus`: grant bonuses (game logic)
async fn add_bonus(
    State(state): State<ApiState>,
    Path(player_name): Path<String>,
    query: Result<Query<BonusParams>, QueryRejection>,
) -> Result<Json<BonusResponse>, ApiError> {
    let Query(params) = query?;
    let count = params.count.unwrap_or(1);

    let bonus = state
        .dispatcher
        .bonuses()
        .add_bonus(&player_name, count)
        .await?;

    Ok(Json(BonusResponse { bonus }))
}

/// `POST /player/{player_name}/penalty`: penalize a player (game logic)
async fn apply_penalty(
    State(state): State<ApiState>,
    Path(player_name): Path<String>,
) -> Result<Json<PenaltyResponse>, ApiError> {
    let report = state
        .dispatcher
        .penalties()
        .apply_penalty(&player_name)
        .await?;

    Ok(Json(PenaltyResponse {
        outcome: report.outcome,
        bonus: report.bonus,
    }))
}

/// `GET /player/list`
async fn list_players(State(state): State<ApiState>) -> Json<PlayerListResponse> {
    let player_list = state.dispatcher.registry().list();
    Json(PlayerListResponse { player_list })
}
