//! Narrative generation
//!
//! Turns an answer set plus its local score into an [`AuditResult`]. The score in
//! the result is always the locally computed visual score. Any failure of the
//! external service yields the fixed fallback narrative, so generation never fails.

use async_trait::async_trait;
use tla_common::audit::AuditInputs;
use tla_common::config::GeminiSettings;
use tla_common::score::AuditScore;
use tla_common::{AuditResult, Impact, Recommendation};

use super::gemini_client::{GeminiClient, GeminiError, NarrativePayload};

pub const FALLBACK_SUMMARY: &str = "Based on your inputs, your business shows clear signs of operational drag. You are likely losing significant time to manual workflows.";
pub const FALLBACK_HOURS_WASTED: f64 = 40.0;
pub const FALLBACK_COST_SAVINGS: &str = "$100,000+";

/// Produces the narrative part of an audit
#[async_trait]
pub trait NarrativeGenerator: Send + Sync {
    /// Generator identifier for logs
    fn source_id(&self) -> &'static str;

    async fn generate(&self, inputs: &AuditInputs, score: AuditScore) -> AuditResult;
}

/// Fixed narrative used whenever the model cannot be reached or understood
pub fn fallback_result(score: AuditScore) -> AuditResult {
    AuditResult {
        score: score.visual,
        summary: FALLBACK_SUMMARY.to_string(),
        total_hours_wasted_per_week: FALLBACK_HOURS_WASTED,
        potential_cost_savings: FALLBACK_COST_SAVINGS.to_string(),
        recommendations: vec![
            Recommendation {
                title: "Systemize Core Ops".to_string(),
                description: "Document and automate your primary workflows.".to_string(),
                impact: Impact::High,
                tool_suggestion: "Notion/Zapier".to_string(),
            },
            Recommendation {
                title: "Delegate Admin".to_string(),
                description: "Use AI to handle scheduling and data entry.".to_string(),
                impact: Impact::High,
                tool_suggestion: "Motion/Reclaim".to_string(),
            },
        ],
    }
}

fn with_score(payload: NarrativePayload, score: AuditScore) -> AuditResult {
    AuditResult {
        score: score.visual,
        summary: payload.summary,
        total_hours_wasted_per_week: payload.total_hours_wasted_per_week,
        potential_cost_savings: payload.potential_cost_savings,
        recommendations: payload.recommendations,
    }
}

/// Narrative from the Gemini API with the fixed fallback
pub struct GeminiNarrativeGenerator {
    client: Option<GeminiClient>,
}

impl GeminiNarrativeGenerator {
    /// Build the generator; a client that cannot be constructed means every
    /// request takes the fallback path
    pub fn new(settings: &GeminiSettings) -> Self {
        let client = match GeminiClient::new(settings) {
            Ok(client) => {
                tracing::info!(endpoint = client.endpoint(), "Gemini narrative generator ready");
                Some(client)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to build Gemini client, narratives will use fallback");
                None
            }
        };
        Self { client }
    }

    async fn request(&self, inputs: &AuditInputs, score: &AuditScore) -> Result<NarrativePayload, GeminiError> {
        match &self.client {
            Some(client) => client.generate(inputs, score).await,
            None => Err(GeminiError::NetworkError("client unavailable".to_string())),
        }
    }
}

#[async_trait]
impl NarrativeGenerator for GeminiNarrativeGenerator {
    fn source_id(&self) -> &'static str {
        "gemini"
    }

    async fn generate(&self, inputs: &AuditInputs, score: AuditScore) -> AuditResult {
        match self.request(inputs, &score).await {
            Ok(payload) => with_score(payload, score),
            Err(e) => {
                tracing::error!(error = %e, score = score.visual, "Gemini analysis failed, using fallback narrative");
                fallback_result(score)
            }
        }
    }
}
