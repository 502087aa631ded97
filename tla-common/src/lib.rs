//! # Time Leak Audit Common Library
//!
//! Shared code for the audit service including:
//! - Questionnaire answer and result models
//! - Deterministic Time Leak Score calculation
//! - Landing page content variants
//! - Analytics event types, reporters and the EventBus
//! - Configuration loading

pub mod audit;
pub mod config;
pub mod error;
pub mod events;
pub mod score;
pub mod variant;

pub use audit::{AuditInputs, AuditResult, Impact, Recommendation};
pub use error::{Error, Result};
pub use score::{AuditScore, ReadinessBand};
pub use variant::ContentVariant;
