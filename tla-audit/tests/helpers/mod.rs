//! Test Helper Utilities
//!
//! Shared utilities for testing tla-audit: app state with stub narrative
//! generators, request builders and session cookie handling

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tokio::sync::Notify;
use tower::ServiceExt;

use tla_audit::models::{AnalysisTicket, AnswerUpdate, QuestionnaireOutcome};
use tla_audit::services::NarrativeGenerator;
use tla_audit::{build_router, AppState};
use tla_common::audit::{
    AuditInputs, BiggestObstacle, ConfidenceRating, InvestmentTimeline, MainFocus, Role, TeamSize,
};
use uuid::Uuid;
use tla_common::config::{Settings, WebhookSettings};
use tla_common::score::AuditScore;
use tla_common::{AuditResult, Impact, Recommendation};

pub const MOCK_SUMMARY: &str = "Mock narrative: owner time is the main leak.";

/// Settings with webhooks off, no API key and a short analyzing delay
pub fn test_settings() -> Settings {
    Settings {
        webhooks: WebhookSettings {
            submission_url: None,
            results_url: None,
        },
        analyzing_min_delay: Duration::from_millis(20),
        ..Settings::default()
    }
}

/// Generator answering immediately with a fixed narrative
#[derive(Default)]
pub struct MockGenerator {
    pub calls: AtomicUsize,
}

impl MockGenerator {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

pub fn mock_result(score: AuditScore) -> AuditResult {
    AuditResult {
        score: score.visual,
        summary: MOCK_SUMMARY.to_string(),
        total_hours_wasted_per_week: 32.0,
        potential_cost_savings: "$83,200".to_string(),
        recommendations: vec![Recommendation {
            title: "Automate client onboarding".to_string(),
            description: "Replace the intake email chain with a form and a CRM workflow.".to_string(),
            impact: Impact::High,
            tool_suggestion: "HubSpot".to_string(),
        }],
    }
}

#[async_trait]
impl NarrativeGenerator for MockGenerator {
    fn source_id(&self) -> &'static str {
        "mock"
    }

    async fn generate(&self, _inputs: &AuditInputs, score: AuditScore) -> AuditResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        mock_result(score)
    }
}

/// Generator that holds its answer until released
#[derive(Default)]
pub struct GatedGenerator {
    pub release: Notify,
}

#[async_trait]
impl NarrativeGenerator for GatedGenerator {
    fn source_id(&self) -> &'static str {
        "gated"
    }

    async fn generate(&self, _inputs: &AuditInputs, score: AuditScore) -> AuditResult {
        self.release.notified().await;
        mock_result(score)
    }
}

/// Generator whose task dies
pub struct PanickingGenerator;

#[async_trait]
impl NarrativeGenerator for PanickingGenerator {
    fn source_id(&self) -> &'static str {
        "panicking"
    }

    async fn generate(&self, _inputs: &AuditInputs, _score: AuditScore) -> AuditResult {
        panic!("narrative backend exploded");
    }
}

pub fn test_state(generator: Arc<dyn NarrativeGenerator>) -> AppState {
    AppState::with_generator(test_settings(), generator)
}

pub fn test_app(generator: Arc<dyn NarrativeGenerator>) -> (AppState, Router) {
    let state = test_state(generator);
    let app = build_router(state.clone());
    (state, app)
}

/// Session driven straight to ANALYZING without going through HTTP
///
/// Returns the session id and the ticket a submission would have spawned.
pub async fn submitted_session(state: &AppState) -> (Uuid, AnalysisTicket) {
    let (id, _) = state.sessions.resolve(None).await;
    let steps = [
        AnswerUpdate {
            name: Some("Jordan Lee".to_string()),
            email: Some("jordan@example.com".to_string()),
            role: Some(Role::Owner),
            team_size: Some(TeamSize::ElevenToTwentyFive),
            main_focus: Some(MainFocus::ScalingWithoutStaff),
            ..Default::default()
        },
        AnswerUpdate {
            losing_money_on_repetitive_tasks: Some(true),
            tracking_senior_team_hours: Some(false),
            clarity_on_ai_tasks: Some(false),
            team_delivering_less_output: Some(true),
            invested_in_automation_but_underutilized: Some(false),
            ..Default::default()
        },
        AnswerUpdate {
            worked_more_than_50_hours: Some(true),
            is_bottleneck: Some(true),
            can_scale_without_hiring: Some(false),
            confidence_in_capturing_costs: ConfidenceRating::new(2).ok(),
            biggest_obstacle: Some(BiggestObstacle::TeamNotTrained),
            ..Default::default()
        },
        AnswerUpdate {
            investment_timeline: Some(InvestmentTimeline::Immediately),
            ..Default::default()
        },
    ];

    let ticket = state
        .sessions
        .update(id, move |funnel| {
            funnel.start().unwrap();
            let mut outcome = None;
            for step in steps {
                funnel.update_answers(step).unwrap();
                outcome = Some(funnel.questionnaire_next().unwrap());
            }
            match outcome {
                Some(QuestionnaireOutcome::Submitted(ticket)) => ticket,
                _ => panic!("questionnaire should have completed"),
            }
        })
        .await
        .unwrap();
    (id, ticket)
}

/// Form bodies answering each questionnaire step
pub const STEP_FORMS: [&str; 4] = [
    "name=Jordan+Lee&email=jordan%40example.com&phone=&role=CEO&teamSize=11-25&mainFocus=Reducing+owner+time",
    "losingMoneyOnRepetitiveTasks=true&trackingSeniorTeamHours=false&clarityOnAiTasks=false\
     &teamDeliveringLessOutput=true&investedInAutomationButUnderutilized=false",
    "workedMoreThan50Hours=true&isBottleneck=true&canScaleWithoutHiring=false\
     &confidenceInCapturingCosts=2&biggestObstacle=unclear+roles+%26+tasks",
    "investmentTimeline=Immediately",
];

pub async fn get(app: &Router, uri: &str, cookie: Option<&str>) -> Response<Body> {
    let mut request = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        request = request.header(header::COOKIE, cookie);
    }
    app.clone()
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn post_form(app: &Router, uri: &str, cookie: Option<&str>, body: &str) -> Response<Body> {
    let mut request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        request = request.header(header::COOKIE, cookie);
    }
    app.clone()
        .oneshot(request.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap()
}

/// `name=value` pair from the response's Set-Cookie header
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|pair| pair.trim().to_string())
}

/// Open a session on the landing page and return its cookie
pub async fn new_visitor(app: &Router) -> String {
    let response = get(app, "/", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    session_cookie(&response).expect("landing page sets the session cookie")
}

pub fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn session_json(app: &Router, cookie: &str) -> Value {
    let response = get(app, "/api/session", Some(cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

/// Start the audit and answer every step; the last POST submits
pub async fn complete_questionnaire(app: &Router, cookie: &str) {
    let response = post_form(app, "/start", Some(cookie), "").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/assessment");

    for (i, form) in STEP_FORMS.iter().enumerate() {
        let response = post_form(app, "/assessment/next", Some(cookie), form).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let expected = if i + 1 == STEP_FORMS.len() { "/analyzing" } else { "/assessment" };
        assert_eq!(location(&response), expected, "after step {}", i + 1);
    }
}

/// Poll the session until it reaches `state` (e.g. "RESULTS")
pub async fn wait_for_state(app: &Router, cookie: &str, state: &str) -> Value {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        let session = session_json(app, cookie).await;
        if session["state"] == state {
            return session;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "session never reached {}: {}",
            state,
            session
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
