use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use rulecraft_core::RuleCraftConfig;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::oneshot;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    evaluate_all, explain, EditCommand, EditingSession, EvaluationTrace, RuleNode,
    SessionRegistry, SessionSnapshot,
};

#[derive(Debug, Clone, Deserialize)]
pub struct EvaluateRequest {
    pub rule: Value,
    #[serde(default)]
    pub documents: Vec<Value>,
    #[serde(default)]
    pub explain: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvaluateResponse {
    pub results: Vec<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub traces: Option<Vec<EvaluationTrace>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpenSessionRequest {
    #[serde(default)]
    pub rule: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionEvaluateRequest {
    pub document: Value,
    #[serde(default)]
    pub explain: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionEvaluateResponse {
    pub matched: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<EvaluationTrace>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryStepResponse {
    /// Whether the undo/redo actually moved the session.
    pub changed: bool,
    #[serde(flatten)]
    pub session: SessionSnapshot,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    code: String,
    message: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

#[derive(Clone)]
struct RuleServiceState {
    registry: SessionRegistry,
}

/// Configuration for the rule API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleServiceConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

fn default_bind_address() -> String {
    "127.0.0.1:8090".to_string()
}

impl Default for RuleServiceConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
        }
    }
}

impl From<&RuleCraftConfig> for RuleServiceConfig {
    fn from(config: &RuleCraftConfig) -> Self {
        Self {
            bind_address: config.http_bind.clone(),
        }
    }
}

/// Helper used by binaries and tests to compose the REST API router.
#[derive(Clone)]
pub struct RuleApiBuilder {
    state: RuleServiceState,
}

impl RuleApiBuilder {
    pub fn new(registry: SessionRegistry) -> Self {
        Self {
            state: RuleServiceState { registry },
        }
    }

    pub fn into_router(self) -> Router {
        Router::new()
            .route("/health", get(health))
            .route("/evaluate", post(evaluate_documents))
            .route("/options/:field", get(field_options))
            .route("/sessions", post(open_session))
            .route("/sessions/:id", get(get_session).delete(close_session))
            .route("/sessions/:id/edits", post(apply_edit))
            .route("/sessions/:id/undo", post(undo))
            .route("/sessions/:id/redo", post(redo))
            .route("/sessions/:id/evaluate", post(evaluate_in_session))
            .with_state(self.state)
    }

    /// Spawns an HTTP server binding to the configured address.
    pub async fn serve(self, config: RuleServiceConfig) -> anyhow::Result<oneshot::Sender<()>> {
        let (tx, rx) = oneshot::channel();
        let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
        let app = self.into_router();

        tokio::spawn(async move {
            info!(address = %config.bind_address, "starting rule service");
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = rx.await;
                })
                .await
                .ok();
        });

        Ok(tx)
    }
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn evaluate_documents(
    Json(payload): Json<EvaluateRequest>,
) -> Result<Json<EvaluateResponse>, ApiError> {
    let rule = decode_rule(payload.rule)?;
    let results = evaluate_all(&rule, &payload.documents);
    let traces = payload.explain.then(|| {
        payload
            .documents
            .iter()
            .map(|document| explain(&rule, document))
            .collect()
    });
    Ok(Json(EvaluateResponse { results, traces }))
}

async fn field_options(
    State(state): State<RuleServiceState>,
    Path(field): Path<String>,
) -> Result<Json<Vec<String>>, ApiError> {
    state
        .registry
        .catalog()
        .options_for(&field)
        .map(|options| Json(options.to_vec()))
        .ok_or_else(|| {
            api_error(
                StatusCode::NOT_FOUND,
                "not_found",
                format!("no options registered for field {field}"),
            )
        })
}

async fn open_session(
    State(state): State<RuleServiceState>,
    Json(payload): Json<OpenSessionRequest>,
) -> Result<(StatusCode, Json<SessionSnapshot>), ApiError> {
    let rule = payload.rule.map(decode_rule).transpose()?;
    let snapshot = state.registry.open(rule);
    info!(session = %snapshot.id, "opened editing session");
    Ok((StatusCode::CREATED, Json(snapshot)))
}

async fn get_session(
    State(state): State<RuleServiceState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    state
        .registry
        .snapshot(&id)
        .map(Json)
        .ok_or_else(|| session_not_found(&id))
}

async fn close_session(
    State(state): State<RuleServiceState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if state.registry.close(&id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(session_not_found(&id))
    }
}

async fn apply_edit(
    State(state): State<RuleServiceState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<Value>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let command: EditCommand = serde_json::from_value(payload).map_err(|err| {
        api_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "malformed_command",
            err.to_string(),
        )
    })?;

    let (result, snapshot) = state
        .registry
        .with_session_mut(&id, |session| session.apply(&command).map(|_| ()))
        .ok_or_else(|| session_not_found(&id))?;

    result.map_err(|err| {
        let code = if err.is_invalid_operation() {
            "invalid_operation"
        } else {
            "malformed_rule"
        };
        api_error(StatusCode::BAD_REQUEST, code, err.to_string())
    })?;
    Ok(Json(snapshot))
}

async fn undo(
    State(state): State<RuleServiceState>,
    Path(id): Path<Uuid>,
) -> Result<Json<HistoryStepResponse>, ApiError> {
    step_history(&state, &id, |session| session.undo())
}

async fn redo(
    State(state): State<RuleServiceState>,
    Path(id): Path<Uuid>,
) -> Result<Json<HistoryStepResponse>, ApiError> {
    step_history(&state, &id, |session| session.redo())
}

fn step_history(
    state: &RuleServiceState,
    id: &Uuid,
    step: impl FnOnce(&mut EditingSession) -> bool,
) -> Result<Json<HistoryStepResponse>, ApiError> {
    let (changed, session) = state
        .registry
        .with_session_mut(id, step)
        .ok_or_else(|| session_not_found(id))?;
    Ok(Json(HistoryStepResponse { changed, session }))
}

async fn evaluate_in_session(
    State(state): State<RuleServiceState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SessionEvaluateRequest>,
) -> Result<Json<SessionEvaluateResponse>, ApiError> {
    state
        .registry
        .with_session(&id, |session| {
            let trace = payload.explain.then(|| session.explain(&payload.document));
            SessionEvaluateResponse {
                matched: session.evaluate(&payload.document),
                trace,
            }
        })
        .map(Json)
        .ok_or_else(|| session_not_found(&id))
}

fn decode_rule(raw: Value) -> Result<RuleNode, ApiError> {
    serde_json::from_value(raw).map_err(|err| {
        warn!(%err, "rejected malformed rule");
        api_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "malformed_rule",
            err.to_string(),
        )
    })
}

fn session_not_found(id: &Uuid) -> ApiError {
    api_error(
        StatusCode::NOT_FOUND,
        "not_found",
        format!("session {} not found", id),
    )
}

fn api_error(status: StatusCode, code: &str, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            code: code.into(),
            message: message.into(),
        }),
    )
}
