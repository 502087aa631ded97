//! Lead capture webhooks
//!
//! Two fire-and-forget JSON POSTs: the raw answers when the questionnaire is
//! submitted, and the answers merged with the narrative once results exist.
//! Failures are logged and never reach the visitor.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tla_common::audit::AuditInputs;
use tla_common::config::WebhookSettings;
use tla_common::AuditResult;
use tracing::{debug, error, info, warn};

pub const SUBMISSION_SOURCE: &str = "AI Time Leak Audit App";
pub const RESULTS_SOURCE: &str = "AI Time Leak Audit App - Results";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Error, Debug)]
pub enum WebhookError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("endpoint returned {status}: {body}")]
    Endpoint { status: u16, body: String },
}

/// Submission webhook body: the answers plus provenance
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload<'a> {
    #[serde(flatten)]
    pub inputs: &'a AuditInputs,
    pub submitted_at: String,
    pub source: &'static str,
}

/// Results webhook body: answers and narrative merged into one object
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsPayload<'a> {
    #[serde(flatten)]
    pub inputs: &'a AuditInputs,
    #[serde(flatten)]
    pub results: &'a AuditResult,
    pub submitted_at: String,
    pub source: &'static str,
}

fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl<'a> SubmissionPayload<'a> {
    pub fn new(inputs: &'a AuditInputs, at: DateTime<Utc>) -> Self {
        Self {
            inputs,
            submitted_at: iso_timestamp(at),
            source: SUBMISSION_SOURCE,
        }
    }
}

impl<'a> ResultsPayload<'a> {
    pub fn new(inputs: &'a AuditInputs, results: &'a AuditResult, at: DateTime<Utc>) -> Self {
        Self {
            inputs,
            results,
            submitted_at: iso_timestamp(at),
            source: RESULTS_SOURCE,
        }
    }
}

/// Webhook client
#[derive(Clone)]
pub struct WebhookNotifier {
    inner: Arc<Inner>,
}

struct Inner {
    client: reqwest::Client,
    submission_url: Option<String>,
    results_url: Option<String>,
}

impl WebhookNotifier {
    pub fn new(settings: &WebhookSettings) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "Falling back to default webhook HTTP client");
                reqwest::Client::new()
            });

        Self {
            inner: Arc::new(Inner {
                client,
                submission_url: settings.submission_url.clone(),
                results_url: settings.results_url.clone(),
            }),
        }
    }

    /// Post the submitted answers in a detached task
    pub fn notify_submission(&self, inputs: &AuditInputs) {
        let notifier = self.clone();
        let inputs = inputs.clone();
        tokio::spawn(async move {
            notifier.log_outcome("submission", notifier.send_submission(&inputs).await);
        });
    }

    /// Post answers and results in a detached task
    pub fn notify_results(&self, inputs: &AuditInputs, results: &AuditResult) {
        let notifier = self.clone();
        let inputs = inputs.clone();
        let results = results.clone();
        tokio::spawn(async move {
            notifier.log_outcome("results", notifier.send_results(&inputs, &results).await);
        });
    }

    /// Post the submission payload and wait for the outcome
    ///
    /// Returns `Ok(false)` when the submission webhook is disabled.
    pub async fn send_submission(&self, inputs: &AuditInputs) -> Result<bool, WebhookError> {
        let Some(url) = self.inner.submission_url.as_deref() else {
            debug!("Submission webhook disabled");
            return Ok(false);
        };
        self.post(url, &SubmissionPayload::new(inputs, Utc::now())).await?;
        Ok(true)
    }

    /// Post the results payload and wait for the outcome
    ///
    /// Returns `Ok(false)` when the results webhook is disabled.
    pub async fn send_results(
        &self,
        inputs: &AuditInputs,
        results: &AuditResult,
    ) -> Result<bool, WebhookError> {
        let Some(url) = self.inner.results_url.as_deref() else {
            debug!("Results webhook disabled");
            return Ok(false);
        };
        self.post(url, &ResultsPayload::new(inputs, results, Utc::now())).await?;
        Ok(true)
    }

    async fn post<T: Serialize + ?Sized>(&self, url: &str, payload: &T) -> Result<(), WebhookError> {
        let resp = self.inner.client.post(url).json(payload).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(WebhookError::Endpoint {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }

    fn log_outcome(&self, kind: &'static str, outcome: Result<bool, WebhookError>) {
        match outcome {
            Ok(true) => info!(webhook = kind, "Webhook submitted successfully"),
            Ok(false) => {}
            Err(WebhookError::Endpoint { status, body }) => {
                warn!(webhook = kind, status, body = %body, "Webhook submission failed")
            }
            Err(e) => error!(webhook = kind, error = %e, "Error sending webhook"),
        }
    }
}
