//! Results dashboard figures derived from inputs and narrative results

use serde::Serialize;
use tla_common::audit::TeamSize;
use tla_common::score::ScoreLabel;
use tla_common::AuditResult;

/// Working hours per person per week
pub const HOURS_PER_PERSON: f64 = 40.0;

/// Team capacity split shown in the capacity chart
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CapacityBreakdown {
    pub headcount: u32,
    pub total_hours: f64,
    pub wasted_hours: f64,
    pub productive_hours: f64,
}

impl CapacityBreakdown {
    pub fn new(team_size: TeamSize, wasted_hours: f64) -> Self {
        let headcount = team_size.average_headcount();
        let total_hours = f64::from(headcount) * HOURS_PER_PERSON;
        let wasted_hours = wasted_hours.max(0.0);
        Self {
            headcount,
            total_hours,
            wasted_hours,
            productive_hours: (total_hours - wasted_hours).max(0.0),
        }
    }

    /// Rounded productive hours for display
    pub fn productive_display(&self) -> u64 {
        self.productive_hours.round() as u64
    }

    /// Rounded wasted hours for display
    pub fn wasted_display(&self) -> u64 {
        self.wasted_hours.round() as u64
    }

    /// Share of capacity lost, 0.0..=1.0
    pub fn wasted_fraction(&self) -> f64 {
        let shown = self.productive_hours + self.wasted_hours;
        if shown <= 0.0 {
            0.0
        } else {
            self.wasted_hours / shown
        }
    }
}

/// Everything the results page needs besides the raw result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub score: u8,
    pub label: ScoreLabel,
    pub capacity: CapacityBreakdown,
}

impl Dashboard {
    pub fn new(team_size: TeamSize, result: &AuditResult) -> Self {
        Self {
            score: result.score,
            label: ScoreLabel::from_visual(result.score),
            capacity: CapacityBreakdown::new(team_size, result.total_hours_wasted_per_week),
        }
    }
}
