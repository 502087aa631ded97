//! Funnel Flow Integration Tests
//!
//! Full visitor journeys through the router: questionnaire submission, the
//! analysis pipeline with stub generators, results, booking and restart.

mod helpers;

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::StatusCode;
use helpers::*;
use tla_audit::{build_router, AppState};
use tla_common::events::AnalyticsEvent;

#[tokio::test]
async fn test_full_journey_to_booking_and_restart() {
    let generator = Arc::new(MockGenerator::default());
    let (state, app) = test_app(generator.clone());

    let response = get(&app, "/?variant=wage", None).await;
    let cookie = session_cookie(&response).unwrap();

    complete_questionnaire(&app, &cookie).await;

    let session = wait_for_state(&app, &cookie, "RESULTS").await;
    assert_eq!(generator.calls(), 1);
    assert_eq!(session["analysis_pending"], false);
    // 4 yes answers plus confidence 2: raw 5 of 12
    assert_eq!(session["score"]["raw"], 5);
    assert_eq!(session["score"]["visual"], 42);
    assert_eq!(session["readiness_band"], "medium");

    // analyzing is over; its page forwards to the results
    let response = get(&app, "/analyzing", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/results");

    let response = get(&app, "/results", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Jordan Lee's Business"));
    assert!(html.contains(MOCK_SUMMARY));
    assert!(html.contains(r#"<div class="score score-moderate">42/100</div>"#));
    assert!(html.contains("Moderate Leaks"));
    assert!(html.contains("Automate client onboarding"));
    assert!(html.contains("High Impact"));
    assert!(html.contains("$83,200"));
    // 11-25 band: 18 people * 40h = 720h, 32h wasted
    assert!(html.contains("Productive Time: 688 hrs"));
    assert!(html.contains("Wasted / Automatable: 32 hrs"));
    assert!(!html.contains("HubSpot"));

    let response = post_form(&app, "/book", Some(&cookie), "").await;
    assert_eq!(location(&response), "/booking");
    let html = body_text(get(&app, "/booking", Some(&cookie)).await).await;
    assert!(html.contains(&state.settings.booking_url));

    let response = post_form(&app, "/booking/back", Some(&cookie), "").await;
    assert_eq!(location(&response), "/results");

    let response = post_form(&app, "/restart", Some(&cookie), "").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    let session = session_json(&app, &cookie).await;
    assert_eq!(session["state"], "LANDING");
    assert!(session.get("score").is_none());
    assert_eq!(session["variant"], "wage");

    // results are gone after restart
    let response = get(&app, "/results", Some(&cookie)).await;
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn test_history_back_from_booking_to_results() {
    let (_state, app) = test_app(Arc::new(MockGenerator::default()));
    let cookie = new_visitor(&app).await;
    complete_questionnaire(&app, &cookie).await;
    wait_for_state(&app, &cookie, "RESULTS").await;
    post_form(&app, "/book", Some(&cookie), "").await;

    let response = get(&app, "/results", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let session = session_json(&app, &cookie).await;
    assert_eq!(session["state"], "RESULTS");
}

#[tokio::test]
async fn test_analyzing_page_refreshes_while_pending() {
    let generator = Arc::new(GatedGenerator::default());
    let (_state, app) = test_app(generator.clone());
    let cookie = new_visitor(&app).await;
    complete_questionnaire(&app, &cookie).await;

    let session = session_json(&app, &cookie).await;
    assert_eq!(session["state"], "ANALYZING");
    assert_eq!(session["analysis_pending"], true);

    let response = get(&app, "/analyzing", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains(r#"http-equiv="refresh""#));

    generator.release.notify_one();
    wait_for_state(&app, &cookie, "RESULTS").await;
}

#[tokio::test]
async fn test_minimum_analyzing_delay_is_enforced() {
    let mut settings = test_settings();
    settings.analyzing_min_delay = Duration::from_millis(300);
    let state = AppState::with_generator(settings, Arc::new(MockGenerator::default()));
    let app = build_router(state);

    let cookie = new_visitor(&app).await;
    let started = Instant::now();
    complete_questionnaire(&app, &cookie).await;

    let session = session_json(&app, &cookie).await;
    assert_eq!(session["state"], "ANALYZING");

    wait_for_state(&app, &cookie, "RESULTS").await;
    assert!(started.elapsed() >= Duration::from_millis(300));
}

#[tokio::test]
async fn test_restart_discards_late_result() {
    let generator = Arc::new(GatedGenerator::default());
    let (_state, app) = test_app(generator.clone());
    let cookie = new_visitor(&app).await;
    complete_questionnaire(&app, &cookie).await;

    let response = post_form(&app, "/restart", Some(&cookie), "").await;
    assert_eq!(location(&response), "/");

    generator.release.notify_one();
    tokio::time::sleep(Duration::from_millis(150)).await;

    let session = session_json(&app, &cookie).await;
    assert_eq!(session["state"], "LANDING");
    assert_eq!(session["analysis_pending"], false);
    assert!(session.get("score").is_none());

    let response = get(&app, "/results", Some(&cookie)).await;
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn test_generation_failure_returns_to_landing_with_notice() {
    let (state, app) = test_app(Arc::new(PanickingGenerator));
    let cookie = new_visitor(&app).await;
    complete_questionnaire(&app, &cookie).await;

    let session = wait_for_state(&app, &cookie, "LANDING").await;
    assert_eq!(session["analysis_pending"], false);
    assert!(session.get("score").is_none());

    let html = body_text(get(&app, "/", Some(&cookie)).await).await;
    assert!(html.contains(r#"<div class="notice" role="alert">"#));

    // shown once
    let html = body_text(get(&app, "/", Some(&cookie)).await).await;
    assert!(!html.contains(r#"<div class="notice" role="alert">"#));

    assert!(state.last_error.read().await.is_some());
    let health = body_json(get(&app, "/health", None).await).await;
    assert!(health["last_error"].is_string());
}

#[tokio::test]
async fn test_analytics_events_follow_the_journey() {
    let (state, app) = test_app(Arc::new(MockGenerator::default()));
    let mut events = state.event_bus.subscribe();

    let response = get(&app, "/?v=scale-light", None).await;
    let cookie = session_cookie(&response).unwrap();
    complete_questionnaire(&app, &cookie).await;
    let session = wait_for_state(&app, &cookie, "RESULTS").await;

    let mut received = Vec::new();
    for _ in 0..3 {
        let event = tokio::time::timeout(Duration::from_secs(2), events.recv())
            .await
            .expect("event in time")
            .expect("bus open");
        received.push(event);
    }

    let names: Vec<&str> = received.iter().map(|e| e.event_name()).collect();
    assert_eq!(names, ["assessment_started", "Lead", "assessment_completed"]);

    match &received[0] {
        AnalyticsEvent::AssessmentStarted { variant_name, .. } => {
            assert_eq!(variant_name, "scale-light")
        }
        other => panic!("unexpected event {:?}", other),
    }
    match &received[2] {
        AnalyticsEvent::AssessmentCompleted {
            variant_name,
            score,
            ..
        } => {
            assert_eq!(variant_name, "scale-light");
            assert_eq!(u64::from(*score), session["score"]["visual"].as_u64().unwrap());
        }
        other => panic!("unexpected event {:?}", other),
    }
}

#[tokio::test]
async fn test_history_reentry_to_assessment_reports_no_new_start() {
    let (state, app) = test_app(Arc::new(MockGenerator::default()));
    let mut events = state.event_bus.subscribe();
    let cookie = new_visitor(&app).await;

    post_form(&app, "/start", Some(&cookie), "").await;
    let response = get(&app, "/", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = get(&app, "/assessment", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(session_json(&app, &cookie).await["state"], "AUDIT");

    let first = events.try_recv().expect("start reported");
    assert_eq!(first.event_name(), "assessment_started");
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn test_analytics_disabled_reports_nothing() {
    let mut settings = test_settings();
    settings.analytics_enabled = false;
    let state = AppState::with_generator(settings, Arc::new(MockGenerator::default()));
    let mut events = state.event_bus.subscribe();
    let app = build_router(state);

    let cookie = new_visitor(&app).await;
    complete_questionnaire(&app, &cookie).await;
    wait_for_state(&app, &cookie, "RESULTS").await;

    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn test_visitors_are_isolated() {
    let generator = Arc::new(GatedGenerator::default());
    let (state, app) = test_app(generator.clone());

    let first = new_visitor(&app).await;
    let second = new_visitor(&app).await;
    assert_ne!(first, second);

    complete_questionnaire(&app, &first).await;
    post_form(&app, "/start", Some(&second), "").await;

    assert_eq!(session_json(&app, &first).await["state"], "ANALYZING");
    assert_eq!(session_json(&app, &second).await["state"], "AUDIT");
    assert_eq!(state.sessions.len().await, 2);

    generator.release.notify_one();
    wait_for_state(&app, &first, "RESULTS").await;
    assert_eq!(session_json(&app, &second).await["state"], "AUDIT");
}
