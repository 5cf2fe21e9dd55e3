//! Request router
//!
//! Functions are addressed by path suffix so the same binary answers under
//! `/api/*`, `/.netlify/functions/*` or any other mount prefix:
//!   `.../health`          any method → liveness probe
//!   `.../trade-analysis`  GET → summary, POST → coach chat

use crate::error::ApiError;
use crate::APP_VERSION;
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{Method, Uri},
    response::{IntoResponse, Json, Response},
    Router,
};
use chrono::Utc;
use engine::{TradeAnalyzer, UserId};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<TradeAnalyzer>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Health,
    TradeAnalysis,
}

impl Endpoint {
    /// Match on the last path segment; one trailing slash is ignored
    pub fn from_path(path: &str) -> Option<Self> {
        let path = path.strip_suffix('/').unwrap_or(path);
        if path.ends_with("/health") {
            Some(Self::Health)
        } else if path.ends_with("/trade-analysis") {
            Some(Self::TradeAnalysis)
        } else {
            None
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .fallback(dispatch)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Single entry point for every request
async fn dispatch(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    Query(params): Query<HashMap<String, String>>,
    body: Bytes,
) -> Response {
    match handle(&state, &method, uri.path(), &params, &body).await {
        Ok(response) => response,
        Err(e) => e.into_response(),
    }
}

async fn handle(
    state: &AppState,
    method: &Method,
    path: &str,
    params: &HashMap<String, String>,
    body: &[u8],
) -> Result<Response, ApiError> {
    let endpoint =
        Endpoint::from_path(path).ok_or_else(|| ApiError::NotFound(path.to_string()))?;

    match endpoint {
        Endpoint::Health => Ok(api_health().into_response()),
        Endpoint::TradeAnalysis if method == Method::GET => {
            let user_id = require_user_id(params.get("user_id").map(String::as_str))?;
            let analysis = state.analyzer.summary(&user_id).await?;
            Ok(Json(analysis).into_response())
        }
        Endpoint::TradeAnalysis if method == Method::POST => {
            let chat = ChatBody::parse(body)?;
            let raw_user_id = params
                .get("user_id")
                .map(String::as_str)
                .filter(|id| !id.trim().is_empty())
                .or(chat.user_id.as_deref());
            let user_id = require_user_id(raw_user_id)?;
            let message = chat
                .user_message()
                .ok_or_else(|| ApiError::Validation("Missing message in request body".to_string()))?;
            let reply = state.analyzer.chat(&user_id, message).await?;
            Ok(Json(reply).into_response())
        }
        Endpoint::TradeAnalysis => Err(ApiError::MethodNotAllowed(method.to_string())),
    }
}

fn require_user_id(raw: Option<&str>) -> Result<UserId, ApiError> {
    match raw {
        Some(raw) if !raw.trim().is_empty() => Ok(UserId::parse(raw)?),
        _ => Err(ApiError::Validation("Missing user_id parameter".to_string())),
    }
}

/// GET /api/health
fn api_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
        "message": "Trade Analysis API is running",
        "version": APP_VERSION,
    }))
}

// ============================================================================
// Chat request body
// ============================================================================

#[derive(Debug, Deserialize)]
struct ChatTurn {
    role: String,
    content: String,
}

/// Accepts `{message}` or the chat-widget shape `{messages: [{role, content}]}`
#[derive(Debug, Default, Deserialize)]
struct ChatBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    messages: Vec<ChatTurn>,
    #[serde(default)]
    user_id: Option<String>,
}

impl ChatBody {
    fn parse(body: &[u8]) -> Result<Self, ApiError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body)
            .map_err(|e| ApiError::Validation(format!("Invalid JSON body: {}", e)))
    }

    /// `message`, else the last turn with role `user`; blank counts as missing
    fn user_message(&self) -> Option<&str> {
        self.message
            .as_deref()
            .or_else(|| {
                self.messages
                    .iter()
                    .rev()
                    .find(|t| t.role == "user")
                    .map(|t| t.content.as_str())
            })
            .filter(|m| !m.trim().is_empty())
    }
}
