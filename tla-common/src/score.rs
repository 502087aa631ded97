//! Deterministic Time Leak Score
//!
//! One point per "yes" on the eight business-practice flags plus
//! `confidence - 1` (0-4), giving a raw score in 0..=12 that is rescaled to 0..=100
//! for the results gauge.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::audit::AuditInputs;

/// Highest attainable raw score (8 flags + 4 confidence points)
pub const MAX_RAW_SCORE: u8 = 12;

/// Visual score at or above which leaks are considered moderate
pub const MODERATE_THRESHOLD: u8 = 30;
/// Visual score at or above which leaks are considered critical
pub const CRITICAL_THRESHOLD: u8 = 60;

/// Raw score thresholds for the narrative level tier
const INTERMEDIATE_MIN_RAW: u8 = 4;
const ADVANCED_MIN_RAW: u8 = 8;

/// Computed score pair for one answer set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditScore {
    /// Unscaled score, 0..=12
    pub raw: u8,
    /// Rescaled score, 0..=100
    pub visual: u8,
}

impl AuditScore {
    pub fn calculate(inputs: &AuditInputs) -> Self {
        let raw = raw_score(inputs);
        Self {
            raw,
            visual: visual_score(raw),
        }
    }

    pub fn level(&self) -> LevelTier {
        LevelTier::from_raw(self.raw)
    }

    pub fn label(&self) -> ScoreLabel {
        ScoreLabel::from_visual(self.visual)
    }

    pub fn readiness_band(&self) -> ReadinessBand {
        ReadinessBand::from_visual(self.visual)
    }
}

/// Sum of "yes" flags plus the confidence offset
pub fn raw_score(inputs: &AuditInputs) -> u8 {
    let flags = inputs
        .core_flags()
        .into_iter()
        .chain(inputs.owner_flags())
        .filter(|&flag| flag)
        .count() as u8;

    flags + (inputs.confidence_in_capturing_costs.value() - 1)
}

/// `round(min(raw / 12 * 100, 100))`
pub fn visual_score(raw: u8) -> u8 {
    let scaled = (f64::from(raw) / f64::from(MAX_RAW_SCORE)) * 100.0;
    scaled.min(100.0).round() as u8
}

/// Qualitative tier used to steer the narrative prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelTier {
    Foundational,
    Intermediate,
    Advanced,
}

impl LevelTier {
    pub fn from_raw(raw: u8) -> Self {
        if raw >= ADVANCED_MIN_RAW {
            LevelTier::Advanced
        } else if raw >= INTERMEDIATE_MIN_RAW {
            LevelTier::Intermediate
        } else {
            LevelTier::Foundational
        }
    }

    /// Wording used inside the system instruction
    pub fn prompt_label(self) -> &'static str {
        match self {
            LevelTier::Advanced => "Advanced (Ready for Core Offer)",
            LevelTier::Intermediate => "Intermediate",
            LevelTier::Foundational => "Foundational",
        }
    }
}

/// Dashboard label for the visual score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreLabel {
    Optimized,
    Moderate,
    Critical,
}

impl ScoreLabel {
    pub fn from_visual(visual: u8) -> Self {
        if visual < MODERATE_THRESHOLD {
            ScoreLabel::Optimized
        } else if visual < CRITICAL_THRESHOLD {
            ScoreLabel::Moderate
        } else {
            ScoreLabel::Critical
        }
    }

    pub fn display_text(self) -> &'static str {
        match self {
            ScoreLabel::Optimized => "Optimized",
            ScoreLabel::Moderate => "Moderate Leaks",
            ScoreLabel::Critical => "Critical Leak Alert",
        }
    }
}

/// Analytics segmentation of the visual score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadinessBand {
    Low,
    Medium,
    High,
}

impl ReadinessBand {
    pub fn from_visual(visual: u8) -> Self {
        if visual < MODERATE_THRESHOLD {
            ReadinessBand::Low
        } else if visual < CRITICAL_THRESHOLD {
            ReadinessBand::Medium
        } else {
            ReadinessBand::High
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ReadinessBand::Low => "low",
            ReadinessBand::Medium => "medium",
            ReadinessBand::High => "high",
        }
    }
}

impl fmt::Display for ReadinessBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
