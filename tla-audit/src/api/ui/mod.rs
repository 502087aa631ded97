//! UI Routes - server-rendered funnel pages
//!
//! # Structure
//! - **Layout** (`layout`): page shell, stylesheet, escaping
//! - **Landing** (`landing`): variant hero with the audit call-to-action
//! - **Assessment** (`assessment`): one questionnaire step per page
//! - **Analyzing** (`analyzing`): self-refreshing wait screen
//! - **Results** (`results`): score, capacity chart, recommendations
//! - **Booking** (`booking`): embedded scheduling widget
//!
//! A page request for a path other than the visitor's current state is a history
//! navigation: the funnel maps it onto a state, and the visitor is redirected when
//! the guarded state lives at a different path.

use axum::{response::Response, routing::get, Router};

use super::Visitor;
use crate::models::{Funnel, FunnelState};
use crate::AppState;

mod analyzing;
mod assessment;
mod booking;
mod landing;
pub mod layout;
mod results;

use analyzing::analyzing_page;
use assessment::assessment_page;
use booking::booking_page;
use landing::landing_page;
use layout::serve_tla_css;
use results::results_page;

/// Navigate the visitor's funnel to `wanted`
///
/// Returns a copy of the funnel when the visitor may view that page, or the
/// redirect to the page they resolved to instead.
pub(crate) async fn enter(
    state: &AppState,
    visitor: Visitor,
    wanted: FunnelState,
) -> Result<Funnel, Response> {
    let funnel = state
        .sessions
        .update(visitor.session_id, |funnel| {
            funnel.navigate(wanted.path());
            funnel.clone()
        })
        .await;

    match funnel {
        Some(funnel) if funnel.state() == wanted => Ok(funnel),
        Some(funnel) => Err(visitor.redirect(funnel.state())),
        None => Err(visitor.redirect(FunnelState::Landing)),
    }
}

/// Build UI routes
pub fn ui_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(landing_page))
        .route("/assessment", get(assessment_page))
        .route("/analyzing", get(analyzing_page))
        .route("/results", get(results_page))
        .route("/booking", get(booking_page))
        .route("/static/tla.css", get(serve_tla_css))
}
