//! HTTP handlers for tla-audit
//!
//! Pages are plain `GET`s, visitor actions are `POST` forms answered with
//! `303 See Other`, so the browser history holds one entry per state change and
//! back/forward arrive here as page requests.

pub mod funnel;
pub mod health;
pub mod session;
pub mod sse;
pub mod ui;

pub use funnel::funnel_routes;
pub use health::health_routes;
pub use session::session_routes;
pub use sse::analytics_event_stream;
pub use ui::ui_routes;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderValue},
    response::{IntoResponse, Redirect, Response},
};
use std::convert::Infallible;
use uuid::Uuid;

use crate::models::FunnelState;
use crate::session::{session_cookie, session_id_from_headers};
use crate::AppState;

/// The visitor behind a request, resolved to a live session
#[derive(Debug, Clone, Copy)]
pub struct Visitor {
    pub session_id: Uuid,
    /// Session created by this request; the cookie must be set
    pub is_new: bool,
}

#[async_trait]
impl FromRequestParts<AppState> for Visitor {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let presented = session_id_from_headers(&parts.headers);
        let (session_id, is_new) = state.sessions.resolve(presented).await;
        Ok(Visitor { session_id, is_new })
    }
}

impl Visitor {
    /// Attach the session cookie when needed
    pub fn respond(self, response: impl IntoResponse) -> Response {
        let mut response = response.into_response();
        if self.is_new {
            response
                .headers_mut()
                .append(header::SET_COOKIE, session_cookie(self.session_id));
        }
        response
    }

    /// Page response; never cached so history navigation always reaches the server
    pub fn page(self, response: impl IntoResponse) -> Response {
        let mut response = self.respond(response);
        response.headers_mut().insert(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store, must-revalidate"),
        );
        response
    }

    /// 303 to the page mirroring `state`
    pub fn redirect(self, state: FunnelState) -> Response {
        self.respond(Redirect::to(state.path()))
    }
}
