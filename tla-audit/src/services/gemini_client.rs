//! Gemini `generateContent` REST client
//!
//! One structured-output request per audit: the response schema forces a JSON
//! payload which is parsed into [`NarrativePayload`].

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;
use tla_common::audit::AuditInputs;
use tla_common::config::GeminiSettings;
use tla_common::score::AuditScore;
use tla_common::Recommendation;

const USER_AGENT: &str = concat!("tla-audit/", env!("CARGO_PKG_VERSION"));
const API_KEY_HEADER: &str = "x-goog-api-key";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Gemini client errors
#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("No content returned by model")]
    EmptyResponse,
}

/// Narrative fields requested from the model (the score is always local)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrativePayload {
    pub summary: String,
    pub total_hours_wasted_per_week: f64,
    pub potential_cost_savings: String,
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub system_instruction: Content,
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_mime_type: String,
    pub response_schema: Value,
}

#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<Content>,
}

impl GenerateContentResponse {
    /// Text of the first part of the first candidate
    pub fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .first()?
            .text
            .as_deref()
    }
}

/// Schema the model must answer with; every field required
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "summary": { "type": "STRING" },
            "totalHoursWastedPerWeek": { "type": "NUMBER" },
            "potentialCostSavings": { "type": "STRING" },
            "recommendations": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "title": { "type": "STRING" },
                        "description": { "type": "STRING" },
                        "impact": { "type": "STRING", "enum": ["High", "Medium", "Low"] },
                        "toolSuggestion": { "type": "STRING" }
                    },
                    "required": ["title", "description", "impact", "toolSuggestion"]
                }
            }
        },
        "required": ["summary", "totalHoursWastedPerWeek", "potentialCostSavings", "recommendations"]
    })
}

/// Persona and scoring context for the model
pub fn system_instruction(inputs: &AuditInputs, score: &AuditScore) -> String {
    format!(
        "You are an expert AI Operations Consultant.\n\
         Analyze the user's audit responses and provide a strategic summary.\n\
         \n\
         Scoring Context:\n\
         - User Score: {raw} / 12\n\
         - Level: {level}\n\
         - Role: {role}\n\
         - Focus: {focus}\n\
         - Obstacle: {obstacle}\n\
         \n\
         Be direct. If they are an \"Advanced\" lead (score 8+), emphasize that they are \
         bleeding money and need immediate systems.\n\
         If \"Foundational\", focus on getting basics right.",
        raw = score.raw,
        level = score.level().prompt_label(),
        role = inputs.role,
        focus = inputs.main_focus,
        obstacle = inputs.biggest_obstacle,
    )
}

/// Business profile and requested outputs
pub fn prompt(inputs: &AuditInputs) -> String {
    format!(
        "Business Profile:\n\
         - Name: {name}\n\
         - Role: {role}\n\
         - Team: {team}\n\
         - Focus: {focus}\n\
         - Worked >50hrs: {worked}\n\
         - Bottleneck: {bottleneck}\n\
         - Biggest Obstacle: {obstacle}\n\
         - Investment Timeline: {timeline}\n\
         \n\
         Generate:\n\
         1. A punchy summary of their situation.\n\
         2. Estimated hours wasted (make a logical estimate based on team size '{team}' - \
         assume 10-20% waste per person if not specified).\n\
         3. Potential savings (assume $50/hr avg cost).\n\
         4. 3 high-impact recommendations.",
        name = inputs.name,
        role = inputs.role,
        team = inputs.team_size,
        focus = inputs.main_focus,
        worked = inputs.worked_more_than_50_hours,
        bottleneck = inputs.is_bottleneck,
        obstacle = inputs.biggest_obstacle,
        timeline = inputs.investment_timeline,
    )
}

pub fn build_request(inputs: &AuditInputs, score: &AuditScore) -> GenerateContentRequest {
    GenerateContentRequest {
        system_instruction: Content {
            role: None,
            parts: vec![Part {
                text: Some(system_instruction(inputs, score)),
            }],
        },
        contents: vec![Content {
            role: Some("user".to_string()),
            parts: vec![Part {
                text: Some(prompt(inputs)),
            }],
        }],
        generation_config: GenerationConfig {
            response_mime_type: "application/json".to_string(),
            response_schema: response_schema(),
        },
    }
}

/// Gemini API client
pub struct GeminiClient {
    http_client: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl GeminiClient {
    pub fn new(settings: &GeminiSettings) -> Result<Self, GeminiError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| GeminiError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            api_key: settings.api_key.clone(),
            endpoint: generate_content_url(&settings.base_url, &settings.model),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Request a narrative for one answer set
    pub async fn generate(
        &self,
        inputs: &AuditInputs,
        score: &AuditScore,
    ) -> Result<NarrativePayload, GeminiError> {
        let request = build_request(inputs, score);

        tracing::debug!(endpoint = %self.endpoint, raw_score = score.raw, "Requesting Gemini narrative");

        let response = self
            .http_client
            .post(&self.endpoint)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| GeminiError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(GeminiError::ApiError(status.as_u16(), error_text));
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| GeminiError::ParseError(e.to_string()))?;

        let text = body.first_text().ok_or(GeminiError::EmptyResponse)?;
        let payload = parse_payload(text)?;

        tracing::info!(
            hours_wasted = payload.total_hours_wasted_per_week,
            recommendations = payload.recommendations.len(),
            "Gemini narrative received"
        );

        Ok(payload)
    }
}

/// `{base_url}/v1beta/models/{model}:generateContent`
pub fn generate_content_url(base_url: &str, model: &str) -> String {
    format!(
        "{}/v1beta/models/{}:generateContent",
        base_url.trim_end_matches('/'),
        model
    )
}

/// Parse the model's JSON text; any extra fields (including a `score`) are ignored
pub fn parse_payload(text: &str) -> Result<NarrativePayload, GeminiError> {
    serde_json::from_str(text).map_err(|e| GeminiError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tla_common::audit::{
        BiggestObstacle, ConfidenceRating, InvestmentTimeline, MainFocus, Role, TeamSize,
    };
    use tla_common::Impact;

    fn inputs() -> AuditInputs {
        AuditInputs {
            name: "Riley".to_string(),
            email: "riley@example.com".to_string(),
            phone: String::new(),
            role: Role::ManagingDirector,
            team_size: TeamSize::TwentySixToFifty,
            main_focus: MainFocus::ImprovingTeamOutput,
            losing_money_on_repetitive_tasks: true,
            tracking_senior_team_hours: true,
            clarity_on_ai_tasks: true,
            team_delivering_less_output: true,
            invested_in_automation_but_underutilized: false,
            worked_more_than_50_hours: true,
            is_bottleneck: false,
            can_scale_without_hiring: true,
            confidence_in_capturing_costs: ConfidenceRating::new(3).unwrap(),
            biggest_obstacle: BiggestObstacle::UnclearRoles,
            investment_timeline: InvestmentTimeline::WithinSixToTwelveMonths,
        }
    }

    #[test]
    fn test_system_instruction_embeds_score_context() {
        let inputs = inputs();
        let score = AuditScore::calculate(&inputs);
        assert_eq!(score.raw, 8);

        let text = system_instruction(&inputs, &score);
        assert!(text.contains("User Score: 8 / 12"));
        assert!(text.contains("Level: Advanced (Ready for Core Offer)"));
        assert!(text.contains("Role: Managing Director"));
        assert!(text.contains("Obstacle: unclear roles & tasks"));
    }

    #[test]
    fn test_prompt_embeds_profile() {
        let text = prompt(&inputs());
        assert!(text.contains("- Name: Riley"));
        assert!(text.contains("- Team: 26-50"));
        assert!(text.contains("- Worked >50hrs: true"));
        assert!(text.contains("- Bottleneck: false"));
        assert!(text.contains("- Investment Timeline: Within 6-12 months"));
        assert!(text.contains("team size '26-50'"));
        assert!(text.contains("$50/hr"));
    }

    #[test]
    fn test_request_wire_shape() {
        let inputs = inputs();
        let request = build_request(&inputs, &AuditScore::calculate(&inputs));
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(value["contents"][0]["role"], "user");
        assert!(value["systemInstruction"]["parts"][0]["text"].is_string());
        assert!(value["systemInstruction"].get("role").is_none());
        assert_eq!(
            value["generationConfig"]["responseSchema"]["properties"]["recommendations"]["items"]
                ["properties"]["impact"]["enum"],
            json!(["High", "Medium", "Low"])
        );
    }

    #[test]
    fn test_endpoint_url() {
        assert_eq!(
            generate_content_url("http://127.0.0.1:9999/", "gemini-2.0-flash"),
            "http://127.0.0.1:9999/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[test]
    fn test_parse_payload_ignores_external_score() {
        let payload = parse_payload(
            r#"{"score": 3, "summary": "s", "totalHoursWastedPerWeek": 55,
                "potentialCostSavings": "$143,000",
                "recommendations": [{"title": "t", "description": "d", "impact": "Low", "toolSuggestion": "Make"}]}"#,
        )
        .unwrap();
        assert_eq!(payload.total_hours_wasted_per_week, 55.0);
        assert_eq!(payload.recommendations[0].impact, Impact::Low);
    }

    #[test]
    fn test_parse_payload_rejects_missing_fields_and_bad_impact() {
        assert!(matches!(
            parse_payload(r#"{"summary": "s"}"#),
            Err(GeminiError::ParseError(_))
        ));
        assert!(parse_payload(
            r#"{"summary": "s", "totalHoursWastedPerWeek": 1, "potentialCostSavings": "$1",
                "recommendations": [{"title": "t", "description": "d", "impact": "Huge", "toolSuggestion": "x"}]}"#
        )
        .is_err());
    }

    #[test]
    fn test_first_text_handles_empty_candidates() {
        let response: GenerateContentResponse = serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        assert!(response.first_text().is_none());

        let response: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates": [{"content": {"parts": [{}]}}]}"#).unwrap();
        assert!(response.first_text().is_none());

        let response: GenerateContentResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert!(response.first_text().is_none());
    }
}
