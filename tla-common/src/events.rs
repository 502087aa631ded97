//! Analytics events and reporters
//!
//! Funnel milestones are reported through an injected [`AnalyticsReporter`].
//! The default reporter does nothing; [`EventBus`] broadcasts events to any number
//! of subscribers (e.g. the server-sent-events stream consumed by external trackers).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::score::ReadinessBand;

/// Funnel step tag attached to the conversion pixel event
pub const FUNNEL_STEP_ASSESSMENT_COMPLETE: &str = "assessment_complete";

/// Analytics event types
///
/// Serialized with an `event` tag carrying the tracker-facing event name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum AnalyticsEvent {
    /// Visitor pressed the landing call-to-action
    #[serde(rename = "assessment_started")]
    AssessmentStarted {
        variant_name: String,
        timestamp: DateTime<Utc>,
    },

    /// Results were computed and shown
    #[serde(rename = "assessment_completed")]
    AssessmentCompleted {
        variant_name: String,
        score: u8,
        readiness_band: ReadinessBand,
        timestamp: DateTime<Utc>,
    },

    /// Conversion pixel "Lead" event, fired when the questionnaire is submitted
    #[serde(rename = "Lead")]
    Lead {
        funnel_step: String,
        variant_name: String,
        timestamp: DateTime<Utc>,
    },
}

impl AnalyticsEvent {
    pub fn assessment_started(variant_name: impl Into<String>) -> Self {
        AnalyticsEvent::AssessmentStarted {
            variant_name: variant_name.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn assessment_completed(variant_name: impl Into<String>, score: u8) -> Self {
        AnalyticsEvent::AssessmentCompleted {
            variant_name: variant_name.into(),
            score,
            readiness_band: ReadinessBand::from_visual(score),
            timestamp: Utc::now(),
        }
    }

    pub fn lead(variant_name: impl Into<String>) -> Self {
        AnalyticsEvent::Lead {
            funnel_step: FUNNEL_STEP_ASSESSMENT_COMPLETE.to_string(),
            variant_name: variant_name.into(),
            timestamp: Utc::now(),
        }
    }

    /// Tracker-facing event name
    pub fn event_name(&self) -> &'static str {
        match self {
            AnalyticsEvent::AssessmentStarted { .. } => "assessment_started",
            AnalyticsEvent::AssessmentCompleted { .. } => "assessment_completed",
            AnalyticsEvent::Lead { .. } => "Lead",
        }
    }
}

/// Sink for analytics events
///
/// Implementations must not block and must not fail visibly: reporting is
/// best-effort and never influences the funnel.
pub trait AnalyticsReporter: Send + Sync {
    fn report(&self, event: AnalyticsEvent);
}

/// Reporter used when no tracker is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopReporter;

impl AnalyticsReporter for NoopReporter {
    fn report(&self, event: AnalyticsEvent) {
        debug!(event = event.event_name(), "Analytics disabled, event dropped");
    }
}

/// Broadcast bus for analytics events
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<AnalyticsEvent>,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// Slow subscribers lose the oldest events once `capacity` is exceeded.
    /// `capacity` must be non-zero; `Settings::resolve` never yields 0.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<AnalyticsEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns the number of subscribers that received it (0 when nobody listens).
    pub fn emit(&self, event: AnalyticsEvent) -> usize {
        let name = event.event_name();
        match self.tx.send(event) {
            Ok(count) => {
                debug!(event = name, subscribers = count, "Analytics event broadcast");
                count
            }
            Err(_) => {
                debug!(event = name, "Analytics event emitted with no subscribers");
                0
            }
        }
    }
}

impl AnalyticsReporter for EventBus {
    fn report(&self, event: AnalyticsEvent) {
        info!(event = event.event_name(), "Analytics event");
        self.emit(event);
    }
}
