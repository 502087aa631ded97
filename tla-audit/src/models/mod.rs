//! Data models for tla-audit
//!
//! - Questionnaire step state machine
//! - Per-visitor funnel (application) state machine
//! - Results dashboard figures

pub mod dashboard;
pub mod funnel;
pub mod questionnaire;

pub use dashboard::{CapacityBreakdown, Dashboard};
pub use funnel::{
    AnalysisTicket, Funnel, FunnelSnapshot, FunnelState, HistoryEntry, InvalidTransition,
    QuestionnaireOutcome, StateTransition,
};
pub use questionnaire::{Advance, AnswerUpdate, AuditDraft, Questionnaire, Step};
