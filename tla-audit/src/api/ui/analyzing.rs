//! Analyzing page handler
//!
//! The page refreshes itself; once the analysis settles the funnel is no longer
//! ANALYZING and the refresh is redirected to results (or back to landing).

use axum::{
    extract::State,
    response::{Html, Response},
};

use super::enter;
use super::layout::page_shell;
use crate::api::Visitor;
use crate::models::FunnelState;
use crate::AppState;

const REFRESH_SECONDS: u32 = 1;

/// GET /analyzing
pub async fn analyzing_page(State(state): State<AppState>, visitor: Visitor) -> Response {
    match enter(&state, visitor, FunnelState::Analyzing).await {
        Ok(_) => visitor.page(Html(render())),
        Err(redirect) => redirect,
    }
}

fn render() -> String {
    let head = format!(
        r#"<meta http-equiv="refresh" content="{}; url={}">"#,
        REFRESH_SECONDS,
        FunnelState::Analyzing.path()
    );

    let body = r#"<main class="analyzing">
    <div class="spinner" aria-hidden="true"></div>
    <h2>Analyzing Your Operations...</h2>
    <p style="color: #94a3b8; max-width: 28rem;">Our AI is identifying time leaks and calculating your potential savings.</p>
</main>"#;

    page_shell("Analyzing - AI Time Leak Audit", "dark", &head, body)
}
