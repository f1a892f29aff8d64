//! HTTP adapter between the webhook host and the solver registry
//!
//! ```text
//! POST /apis/{group}/v1alpha1/{solver}   ChallengePayload in, ChallengePayload out
//! GET  /healthz                          "ok"
//! ```
//!
//! Solver failures are not HTTP errors: they come back as `200` with
//! `response.success = false` and the error text in `response.status.message`,
//! so the host can record the reason and retry the challenge later.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use dns01_core::{ChallengeAction, ChallengeRequest, Error, SolverRegistry};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// `apiVersion` of the challenge envelope
pub const PAYLOAD_API_VERSION: &str = "webhook.acme.cert-manager.io/v1alpha1";

/// `kind` of the challenge envelope
pub const PAYLOAD_KIND: &str = "ChallengePayload";

/// Request/response envelope exchanged with the host
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengePayload {
    #[serde(default)]
    pub api_version: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<ChallengeRequest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<ChallengeResponse>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChallengeResponse {
    pub uid: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ResponseStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseStatus {
    pub message: String,
}

/// Shared handler state
pub struct AppState {
    /// API group the solvers are served under
    pub group: String,
    pub registry: Arc<SolverRegistry>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/apis/:group/v1alpha1/:solver", post(solve))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

async fn healthz() -> &'static str {
    "ok"
}

async fn solve(
    State(state): State<Arc<AppState>>,
    Path((group, solver_name)): Path<(String, String)>,
    Json(payload): Json<ChallengePayload>,
) -> Response {
    if group != state.group {
        return (StatusCode::NOT_FOUND, format!("unknown API group: {}", group)).into_response();
    }

    let solver = match state.registry.get(&solver_name) {
        Ok(solver) => solver,
        Err(e) => return (StatusCode::NOT_FOUND, e.to_string()).into_response(),
    };

    let Some(request) = payload.request else {
        return (StatusCode::BAD_REQUEST, "payload has no request").into_response();
    };

    let result = match &request.action {
        ChallengeAction::Present => solver.present(&request).await,
        ChallengeAction::CleanUp => solver.cleanup(&request).await,
        ChallengeAction::Other(action) => Err(Error::unsupported_action(action.clone())),
    };

    let response = match result {
        Ok(()) => {
            info!(
                "{} {} for {} succeeded (uid {})",
                solver_name, request.action, request.resolved_fqdn, request.uid
            );
            ChallengeResponse {
                uid: request.uid.clone(),
                success: true,
                status: None,
            }
        }
        Err(e) => {
            error!(
                "{} {} for {} failed (uid {}): {}",
                solver_name, request.action, request.resolved_fqdn, request.uid, e
            );
            ChallengeResponse {
                uid: request.uid.clone(),
                success: false,
                status: Some(ResponseStatus {
                    message: e.to_string(),
                }),
            }
        }
    };

    Json(ChallengePayload {
        api_version: if payload.api_version.is_empty() {
            PAYLOAD_API_VERSION.to_string()
        } else {
            payload.api_version
        },
        kind: if payload.kind.is_empty() {
            PAYLOAD_KIND.to_string()
        } else {
            payload.kind
        },
        request: Some(request),
        response: Some(response),
    })
    .into_response()
}
