//! Visitor actions
//!
//! Every action mutates the visitor's funnel under the session lock and redirects
//! to the page of the resulting state. Actions not permitted in the current state
//! are ignored; the visitor simply lands back on the current page.

use axum::{
    extract::{rejection::FormRejection, State},
    response::Response,
    routing::post,
    Form, Router,
};
use tracing::{debug, info, warn};

use super::Visitor;
use crate::models::{AnswerUpdate, FunnelState, InvalidTransition, QuestionnaireOutcome};
use crate::AppState;

/// POST /start
///
/// Landing call-to-action
pub async fn start_audit(State(state): State<AppState>, visitor: Visitor) -> Response {
    let outcome = state
        .sessions
        .update(visitor.session_id, |funnel| (funnel.start(), funnel.state()))
        .await;

    let Some((result, current)) = outcome else {
        return visitor.redirect(FunnelState::Landing);
    };

    match result {
        Ok(event) => {
            info!(session = %visitor.session_id, "Assessment started");
            state.reporter.report(event);
        }
        Err(e) => ignored(&visitor, &e),
    }
    visitor.redirect(current)
}

/// POST /assessment/next
///
/// Records the step's answers and advances; finishing the last step starts the
/// analysis pipeline.
pub async fn questionnaire_next(
    State(state): State<AppState>,
    visitor: Visitor,
    form: Result<Form<AnswerUpdate>, FormRejection>,
) -> Response {
    let update = answers(form);

    let outcome = state
        .sessions
        .update(visitor.session_id, |funnel| {
            let result = funnel
                .update_answers(update)
                .and_then(|()| funnel.questionnaire_next());
            (result, funnel.state())
        })
        .await;

    let Some((result, current)) = outcome else {
        return visitor.redirect(FunnelState::Landing);
    };

    match result {
        Ok(QuestionnaireOutcome::Submitted(ticket)) => {
            state.pipeline.spawn(visitor.session_id, ticket);
        }
        Ok(QuestionnaireOutcome::Stayed) => {}
        Err(e) => ignored(&visitor, &e),
    }
    visitor.redirect(current)
}

/// POST /assessment/back
pub async fn questionnaire_back(
    State(state): State<AppState>,
    visitor: Visitor,
    form: Result<Form<AnswerUpdate>, FormRejection>,
) -> Response {
    let update = answers(form);

    let outcome = state
        .sessions
        .update(visitor.session_id, |funnel| {
            let result = funnel
                .update_answers(update)
                .and_then(|()| funnel.questionnaire_back());
            (result, funnel.state())
        })
        .await;

    match outcome {
        Some((result, current)) => {
            if let Err(e) = result {
                ignored(&visitor, &e);
            }
            visitor.redirect(current)
        }
        None => visitor.redirect(FunnelState::Landing),
    }
}

/// POST /book
pub async fn book_call(State(state): State<AppState>, visitor: Visitor) -> Response {
    transition(&state, visitor, |funnel| funnel.book_call()).await
}

/// POST /booking/back
pub async fn back_to_results(State(state): State<AppState>, visitor: Visitor) -> Response {
    transition(&state, visitor, |funnel| funnel.back_to_results()).await
}

/// POST /restart
pub async fn restart(State(state): State<AppState>, visitor: Visitor) -> Response {
    let transition = state
        .sessions
        .update(visitor.session_id, |funnel| funnel.restart())
        .await;

    if let Some(t) = transition {
        info!(session = %visitor.session_id, from = ?t.old_state, "Funnel restarted");
    }
    visitor.redirect(FunnelState::Landing)
}

async fn transition(
    state: &AppState,
    visitor: Visitor,
    action: impl FnOnce(&mut crate::models::Funnel) -> Result<(), InvalidTransition>,
) -> Response {
    let outcome = state
        .sessions
        .update(visitor.session_id, |funnel| (action(funnel), funnel.state()))
        .await;

    match outcome {
        Some((result, current)) => {
            if let Err(e) = result {
                ignored(&visitor, &e);
            }
            visitor.redirect(current)
        }
        None => visitor.redirect(FunnelState::Landing),
    }
}

/// Unparseable form data counts as no answers; the step stays incomplete
fn answers(form: Result<Form<AnswerUpdate>, FormRejection>) -> AnswerUpdate {
    match form {
        Ok(Form(update)) => update,
        Err(e) => {
            warn!(error = %e, "Ignoring malformed questionnaire form");
            AnswerUpdate::default()
        }
    }
}

fn ignored(visitor: &Visitor, e: &InvalidTransition) {
    debug!(session = %visitor.session_id, "Action ignored: {}", e);
}

/// Build visitor action routes
pub fn funnel_routes() -> Router<AppState> {
    Router::new()
        .route("/start", post(start_audit))
        .route("/assessment/next", post(questionnaire_next))
        .route("/assessment/back", post(questionnaire_back))
        .route("/book", post(book_call))
        .route("/booking/back", post(back_to_results))
        .route("/restart", post(restart))
}
