//! Application state machine
//!
//! Per-visitor view state:
//! LANDING → AUDIT → ANALYZING → RESULTS ⇄ BOOKING, with RESTART from anywhere.
//!
//! Every state change is mirrored as a history entry keyed by the page path, so a
//! browser back/forward navigation (which arrives as a plain page request) can be
//! mapped back onto a state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tla_common::events::AnalyticsEvent;
use tla_common::variant::ContentVariant;
use tla_common::{AuditInputs, AuditResult, AuditScore};

use super::questionnaire::{Advance, AnswerUpdate, Questionnaire, Step};

/// History entries kept per session
const MAX_HISTORY: usize = 50;

/// Notice shown on the landing page after an analysis failed
pub const ANALYSIS_FAILED_NOTICE: &str =
    "We couldn't finish analysing your answers. Please try the audit again.";

/// Top-level view state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FunnelState {
    Landing,
    Audit,
    Analyzing,
    Results,
    Booking,
}

impl FunnelState {
    /// Navigable path mirroring this state
    pub fn path(self) -> &'static str {
        match self {
            FunnelState::Landing => "/",
            FunnelState::Audit => "/assessment",
            FunnelState::Analyzing => "/analyzing",
            FunnelState::Results => "/results",
            FunnelState::Booking => "/booking",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        match path.trim_end_matches('/') {
            "" => Some(FunnelState::Landing),
            "/assessment" => Some(FunnelState::Audit),
            "/analyzing" => Some(FunnelState::Analyzing),
            "/results" => Some(FunnelState::Results),
            "/booking" => Some(FunnelState::Booking),
            _ => None,
        }
    }
}

/// State captured alongside a history entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FunnelSnapshot {
    pub state: FunnelState,
    /// Questionnaire step at the time (Audit only)
    pub step: Option<Step>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub path: &'static str,
    pub snapshot: FunnelSnapshot,
}

/// Record of one state change
#[derive(Debug, Clone, Serialize)]
pub struct StateTransition {
    pub old_state: FunnelState,
    pub new_state: FunnelState,
    pub transitioned_at: DateTime<Utc>,
}

/// Action not permitted in the current state
#[derive(Debug, Clone, Error, PartialEq)]
#[error("cannot {action} while in {state:?}")]
pub struct InvalidTransition {
    pub state: FunnelState,
    pub action: &'static str,
}

/// Work order for one analysis run
#[derive(Debug, Clone)]
pub struct AnalysisTicket {
    pub epoch: u64,
    pub inputs: AuditInputs,
    pub score: AuditScore,
    pub variant: ContentVariant,
}

/// Outcome of a questionnaire "next" action
#[derive(Debug, Clone)]
pub enum QuestionnaireOutcome {
    /// Moved to another step, or blocked on an incomplete step
    Stayed,
    /// Answers submitted; the session is now analyzing
    Submitted(AnalysisTicket),
}

/// One visitor's funnel
#[derive(Debug, Clone)]
pub struct Funnel {
    state: FunnelState,
    variant: ContentVariant,
    questionnaire: Questionnaire,
    inputs: Option<AuditInputs>,
    results: Option<AuditResult>,
    /// Incremented for every analysis run and every restart
    epoch: u64,
    /// Epoch of the analysis currently in flight
    pending_epoch: Option<u64>,
    history: Vec<HistoryEntry>,
    notice: Option<String>,
}

impl Default for Funnel {
    fn default() -> Self {
        Self::new()
    }
}

impl Funnel {
    pub fn new() -> Self {
        let mut funnel = Self {
            state: FunnelState::Landing,
            variant: ContentVariant::default(),
            questionnaire: Questionnaire::new(),
            inputs: None,
            results: None,
            epoch: 0,
            pending_epoch: None,
            history: Vec::new(),
            notice: None,
        };
        funnel.push_history();
        funnel
    }

    pub fn state(&self) -> FunnelState {
        self.state
    }

    pub fn variant(&self) -> ContentVariant {
        self.variant
    }

    pub fn questionnaire(&self) -> &Questionnaire {
        &self.questionnaire
    }

    pub fn inputs(&self) -> Option<&AuditInputs> {
        self.inputs.as_ref()
    }

    pub fn results(&self) -> Option<&AuditResult> {
        self.results.as_ref()
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn is_analysis_pending(&self) -> bool {
        self.pending_epoch.is_some()
    }

    /// Remember the landing variant for later analytics
    pub fn set_variant(&mut self, variant: ContentVariant) {
        self.variant = variant;
    }

    /// One-shot notice for the landing page
    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }

    /// LANDING → AUDIT
    pub fn start(&mut self) -> Result<AnalyticsEvent, InvalidTransition> {
        self.require(FunnelState::Landing, "start the audit")?;
        self.questionnaire = Questionnaire::new();
        self.notice = None;
        self.transition_to(FunnelState::Audit);
        Ok(AnalyticsEvent::assessment_started(self.variant.name()))
    }

    /// Record answers for the current questionnaire step
    pub fn update_answers(&mut self, update: AnswerUpdate) -> Result<(), InvalidTransition> {
        self.require(FunnelState::Audit, "answer questions")?;
        self.questionnaire.update(update);
        Ok(())
    }

    /// Advance the questionnaire; finishing it moves AUDIT → ANALYZING
    pub fn questionnaire_next(&mut self) -> Result<QuestionnaireOutcome, InvalidTransition> {
        self.require(FunnelState::Audit, "advance the questionnaire")?;
        match self.questionnaire.advance() {
            Advance::Moved(_) | Advance::Blocked => Ok(QuestionnaireOutcome::Stayed),
            Advance::Completed(inputs) => Ok(QuestionnaireOutcome::Submitted(self.begin_analysis(inputs))),
        }
    }

    pub fn questionnaire_back(&mut self) -> Result<Step, InvalidTransition> {
        self.require(FunnelState::Audit, "go back in the questionnaire")?;
        Ok(self.questionnaire.back())
    }

    fn begin_analysis(&mut self, inputs: AuditInputs) -> AnalysisTicket {
        self.epoch += 1;
        self.pending_epoch = Some(self.epoch);
        self.results = None;
        self.inputs = Some(inputs.clone());
        self.transition_to(FunnelState::Analyzing);

        AnalysisTicket {
            epoch: self.epoch,
            score: AuditScore::calculate(&inputs),
            inputs,
            variant: self.variant,
        }
    }

    /// ANALYZING → RESULTS
    ///
    /// Returns the completion event, or `None` when the run was abandoned (stale
    /// epoch, or the visitor navigated away from the analyzing screen). Abandoned
    /// results are discarded.
    pub fn complete_analysis(&mut self, epoch: u64, result: AuditResult) -> Option<AnalyticsEvent> {
        if !self.settle(epoch) {
            return None;
        }

        let event = AnalyticsEvent::assessment_completed(self.variant.name(), result.score);
        self.results = Some(result);
        self.transition_to(FunnelState::Results);
        Some(event)
    }

    /// ANALYZING → LANDING, answers discarded
    ///
    /// Returns false when the run was already abandoned.
    pub fn fail_analysis(&mut self, epoch: u64) -> bool {
        if !self.settle(epoch) {
            return false;
        }

        self.inputs = None;
        self.results = None;
        self.questionnaire = Questionnaire::new();
        self.notice = Some(ANALYSIS_FAILED_NOTICE.to_string());
        self.transition_to(FunnelState::Landing);
        true
    }

    /// RESULTS → BOOKING
    pub fn book_call(&mut self) -> Result<(), InvalidTransition> {
        self.require(FunnelState::Results, "book a call")?;
        self.transition_to(FunnelState::Booking);
        Ok(())
    }

    /// BOOKING → RESULTS
    pub fn back_to_results(&mut self) -> Result<(), InvalidTransition> {
        self.require(FunnelState::Booking, "return to results")?;
        let target = self.guard(FunnelState::Results);
        self.transition_to(target);
        Ok(())
    }

    /// Any → LANDING, clearing answers and results
    ///
    /// An analysis still in flight is abandoned; its eventual result is ignored.
    pub fn restart(&mut self) -> StateTransition {
        self.epoch += 1;
        self.pending_epoch = None;
        self.inputs = None;
        self.results = None;
        self.questionnaire = Questionnaire::new();
        self.transition_to(FunnelState::Landing)
    }

    /// Map a history navigation onto a state
    ///
    /// Restores from the most recent history entry for `path` when present, else
    /// reconstructs the state the path names. Either way RESULTS and BOOKING are never entered
    /// without results in memory and ANALYZING only while an analysis is pending.
    /// Unknown paths leave the state unchanged. History is not pushed.
    pub fn navigate(&mut self, path: &str) -> FunnelState {
        let Some(target) = FunnelState::from_path(path) else {
            return self.state;
        };
        if target == self.state {
            return self.state;
        }

        let snapshot = self
            .history
            .iter()
            .rev()
            .find(|entry| entry.path == target.path())
            .map(|entry| entry.snapshot);

        let restored = snapshot.map(|s| s.state).unwrap_or(target);
        let guarded = self.guard(restored);

        if guarded == FunnelState::Audit {
            if let Some(step) = snapshot.and_then(|s| s.step) {
                self.questionnaire.restore_step(step);
            }
        }

        self.state = guarded;
        guarded
    }

    /// Clear the pending run; true if `epoch` is current and still on screen
    fn settle(&mut self, epoch: u64) -> bool {
        if self.pending_epoch != Some(epoch) {
            return false;
        }
        self.pending_epoch = None;
        self.state == FunnelState::Analyzing
    }

    fn guard(&self, wanted: FunnelState) -> FunnelState {
        match wanted {
            FunnelState::Results | FunnelState::Booking if self.results.is_none() => {
                FunnelState::Landing
            }
            FunnelState::Analyzing if self.pending_epoch.is_none() => {
                if self.results.is_some() {
                    FunnelState::Results
                } else {
                    FunnelState::Landing
                }
            }
            other => other,
        }
    }

    fn require(&self, expected: FunnelState, action: &'static str) -> Result<(), InvalidTransition> {
        if self.state == expected {
            Ok(())
        } else {
            Err(InvalidTransition {
                state: self.state,
                action,
            })
        }
    }

    fn transition_to(&mut self, new_state: FunnelState) -> StateTransition {
        let transition = StateTransition {
            old_state: self.state,
            new_state,
            transitioned_at: Utc::now(),
        };
        self.state = new_state;
        self.push_history();
        transition
    }

    fn push_history(&mut self) {
        let step = (self.state == FunnelState::Audit).then(|| self.questionnaire.step());
        self.history.push(HistoryEntry {
            path: self.state.path(),
            snapshot: FunnelSnapshot {
                state: self.state,
                step,
            },
        });
        if self.history.len() > MAX_HISTORY {
            let excess = self.history.len() - MAX_HISTORY;
            self.history.drain(..excess);
        }
    }
}
