//! Analysis pipeline
//!
//! Drives one session from ANALYZING to RESULTS (or back to LANDING):
//! 1. Submission webhook and `Lead` pixel event, both detached
//! 2. Narrative generation in its own task, joined with the minimum analyzing delay
//! 3. Outcome applied to the session under its lock; stale runs are discarded

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;
use tokio::task::JoinError;
use tla_common::events::{AnalyticsEvent, AnalyticsReporter};
use tracing::{debug, error, info};
use uuid::Uuid;

use super::narrative::NarrativeGenerator;
use super::webhook::WebhookNotifier;
use crate::models::AnalysisTicket;
use crate::session::SessionStore;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("narrative task failed: {0}")]
    Task(#[from] JoinError),
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisOutcome {
    /// Results stored; session now on RESULTS
    Completed,
    /// Generation failed; session returned to LANDING
    Failed,
    /// Session restarted, navigated away or expired before the run finished
    Discarded,
}

/// Shared pipeline dependencies
#[derive(Clone)]
pub struct AnalysisPipeline {
    generator: Arc<dyn NarrativeGenerator>,
    webhooks: WebhookNotifier,
    reporter: Arc<dyn AnalyticsReporter>,
    sessions: SessionStore,
    min_delay: Duration,
    last_error: Arc<RwLock<Option<String>>>,
}

impl AnalysisPipeline {
    pub fn new(
        generator: Arc<dyn NarrativeGenerator>,
        webhooks: WebhookNotifier,
        reporter: Arc<dyn AnalyticsReporter>,
        sessions: SessionStore,
        min_delay: Duration,
        last_error: Arc<RwLock<Option<String>>>,
    ) -> Self {
        Self {
            generator,
            webhooks,
            reporter,
            sessions,
            min_delay,
            last_error,
        }
    }

    pub fn min_delay(&self) -> Duration {
        self.min_delay
    }

    /// Run the pipeline for one ticket in a detached task
    pub fn spawn(&self, session_id: Uuid, ticket: AnalysisTicket) -> tokio::task::JoinHandle<AnalysisOutcome> {
        let pipeline = self.clone();
        tokio::spawn(async move { pipeline.run(session_id, ticket).await })
    }

    pub async fn run(&self, session_id: Uuid, ticket: AnalysisTicket) -> AnalysisOutcome {
        let epoch = ticket.epoch;
        info!(
            session = %session_id,
            epoch,
            raw_score = ticket.score.raw,
            score = ticket.score.visual,
            variant = %ticket.variant,
            "Analysis started"
        );

        self.webhooks.notify_submission(&ticket.inputs);
        self.reporter.report(AnalyticsEvent::lead(ticket.variant.name()));

        match self.generate(&ticket).await {
            Ok(result) => {
                let applied = self
                    .sessions
                    .update(session_id, |funnel| funnel.complete_analysis(epoch, result.clone()))
                    .await
                    .flatten();

                match applied {
                    Some(event) => {
                        self.reporter.report(event);
                        self.webhooks.notify_results(&ticket.inputs, &result);
                        info!(session = %session_id, epoch, score = result.score, "Analysis completed");
                        AnalysisOutcome::Completed
                    }
                    None => {
                        debug!(session = %session_id, epoch, "Stale analysis result discarded");
                        AnalysisOutcome::Discarded
                    }
                }
            }
            Err(e) => {
                error!(session = %session_id, epoch, error = %e, "Analysis failed");
                *self.last_error.write().await = Some(e.to_string());

                let reverted = self
                    .sessions
                    .update(session_id, |funnel| funnel.fail_analysis(epoch))
                    .await
                    .unwrap_or(false);
                if reverted {
                    AnalysisOutcome::Failed
                } else {
                    AnalysisOutcome::Discarded
                }
            }
        }
    }

    /// Generation joined with the minimum delay; both must finish
    async fn generate(&self, ticket: &AnalysisTicket) -> Result<tla_common::AuditResult, AnalysisError> {
        let generator = Arc::clone(&self.generator);
        let inputs = ticket.inputs.clone();
        let score = ticket.score;
        let source = generator.source_id();

        let generation = tokio::spawn(async move { generator.generate(&inputs, score).await });
        let (result, ()) = tokio::join!(generation, tokio::time::sleep(self.min_delay));

        debug!(generator = source, "Narrative generation finished");
        Ok(result?)
    }
}
