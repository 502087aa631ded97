//! Booking page handler

use axum::{
    extract::State,
    response::{Html, Response},
};

use super::enter;
use super::layout::{escape_html, page_shell};
use crate::api::Visitor;
use crate::models::FunnelState;
use crate::AppState;

/// GET /booking
///
/// Embeds the configured scheduling widget
pub async fn booking_page(State(state): State<AppState>, visitor: Visitor) -> Response {
    match enter(&state, visitor, FunnelState::Booking).await {
        Ok(_) => visitor.page(Html(render(&state.settings.booking_url))),
        Err(redirect) => redirect,
    }
}

fn render(booking_url: &str) -> String {
    let body = format!(
        r#"<main class="container">
    <form method="post" action="/booking/back" style="margin-bottom: 24px;">
        <button class="link-button" type="submit">← Back to Results</button>
    </form>
    <div class="card booking">
        <div class="booking-header">
            <h1>Book Your Implementation Call</h1>
            <p>Select a time below to speak with our team.</p>
        </div>
        <iframe id="booking-calendar" src="{url}" scrolling="no" title="Booking calendar"></iframe>
    </div>
</main>"#,
        url = escape_html(booking_url),
    );

    page_shell("Book Your Call - AI Time Leak Audit", "app", "", &body)
}
