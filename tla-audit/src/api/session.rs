//! Session snapshot for client polling

use axum::{extract::State, response::Response, routing::get, Json, Router};
use serde::Serialize;
use tla_common::score::{AuditScore, ReadinessBand};

use super::Visitor;
use crate::error::ApiError;
use crate::models::{FunnelState, Step};
use crate::AppState;

/// GET /api/session response
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub state: FunnelState,
    /// Page mirroring the state
    pub path: &'static str,
    pub variant: String,
    /// Questionnaire step (1-4) while in the audit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress_percent: Option<u8>,
    pub analysis_pending: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<AuditScore>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub readiness_band: Option<ReadinessBand>,
}

/// GET /api/session
///
/// Current funnel state of the calling visitor.
pub async fn get_session(State(state): State<AppState>, visitor: Visitor) -> Response {
    let Some(funnel) = state.sessions.get(visitor.session_id).await else {
        return visitor.respond(ApiError::NotFound("session expired".to_string()));
    };

    let in_audit = funnel.state() == FunnelState::Audit;
    let step: Option<Step> = in_audit.then(|| funnel.questionnaire().step());
    let score = funnel.inputs().map(AuditScore::calculate);

    let view = SessionView {
        state: funnel.state(),
        path: funnel.state().path(),
        variant: funnel.variant().name(),
        step: step.map(Step::number),
        progress_percent: in_audit.then(|| funnel.questionnaire().progress_percent()),
        analysis_pending: funnel.is_analysis_pending(),
        score,
        readiness_band: score.map(|s| s.readiness_band()),
    };

    visitor.respond(Json(view))
}

/// Build JSON API routes
pub fn session_routes() -> Router<AppState> {
    Router::new().route("/api/session", get(get_session))
}
