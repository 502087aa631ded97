//! tla-audit library interface for testing
//!
//! Exposes public APIs for integration testing

pub mod api;
pub mod error;
pub mod models;
pub mod services;
pub mod session;

pub use crate::error::ApiError;

use axum::{routing::get, Router};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tla_common::config::Settings;
use tla_common::events::{AnalyticsReporter, EventBus, NoopReporter};
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::services::{
    AnalysisPipeline, GeminiNarrativeGenerator, NarrativeGenerator, WebhookNotifier,
};
use crate::session::SessionStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Resolved service settings
    pub settings: Arc<Settings>,
    /// Per-visitor funnels keyed by session cookie
    pub sessions: SessionStore,
    /// Narrative generation, webhooks and analytics for submitted audits
    pub pipeline: AnalysisPipeline,
    /// Marketing pixel sink
    pub reporter: Arc<dyn AnalyticsReporter>,
    /// Event bus for the analytics SSE stream
    pub event_bus: EventBus,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Last error for diagnostic purposes
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
    /// State backed by the Gemini narrative generator
    pub fn new(settings: Settings) -> Self {
        let generator = Arc::new(GeminiNarrativeGenerator::new(&settings.gemini));
        Self::with_generator(settings, generator)
    }

    pub fn with_generator(settings: Settings, generator: Arc<dyn NarrativeGenerator>) -> Self {
        let event_bus = EventBus::new(settings.event_capacity);
        let reporter: Arc<dyn AnalyticsReporter> = if settings.analytics_enabled {
            Arc::new(event_bus.clone())
        } else {
            Arc::new(NoopReporter)
        };

        let sessions = SessionStore::new();
        let last_error = Arc::new(RwLock::new(None));
        let pipeline = AnalysisPipeline::new(
            generator,
            WebhookNotifier::new(&settings.webhooks),
            Arc::clone(&reporter),
            sessions.clone(),
            settings.analyzing_min_delay,
            Arc::clone(&last_error),
        );

        Self {
            settings: Arc::new(settings),
            sessions,
            pipeline,
            reporter,
            event_bus,
            startup_time: Utc::now(),
            last_error,
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    let analytics = Router::new()
        .route("/analytics/events", get(api::analytics_event_stream))
        .layer(CorsLayer::permissive());

    Router::new()
        // Funnel pages
        .merge(api::ui_routes())
        // Visitor actions
        .merge(api::funnel_routes())
        // JSON API
        .merge(api::session_routes())
        .merge(api::health_routes())
        .merge(analytics)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
