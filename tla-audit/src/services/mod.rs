//! Service modules for the audit funnel
//!
//! - Gemini REST client and narrative generation (with fallback)
//! - Lead capture webhooks
//! - Analysis pipeline tying generation, webhooks and analytics to a session

pub mod analysis;
pub mod gemini_client;
pub mod narrative;
pub mod webhook;

pub use analysis::{AnalysisError, AnalysisOutcome, AnalysisPipeline};
pub use gemini_client::{GeminiClient, GeminiError, NarrativePayload};
pub use narrative::{fallback_result, GeminiNarrativeGenerator, NarrativeGenerator};
pub use webhook::{WebhookError, WebhookNotifier};
