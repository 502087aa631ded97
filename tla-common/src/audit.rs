//! Questionnaire answer model and audit result types
//!
//! Wire format follows the lead-capture webhooks: camelCase field names and the
//! literal option labels shown to the visitor (e.g. `"Managing Director"`, `"11-25"`).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Error, Result};

/// Generates a closed option set with its display label and serde mapping.
macro_rules! option_set {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $label:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            /// Every option, in the order the questionnaire presents them
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Label shown to the visitor and sent over the wire
            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }

            /// Parse a wire label back into the option
            pub fn from_label(label: &str) -> Result<Self> {
                match label {
                    $($label => Ok($name::$variant),)+
                    other => Err(Error::InvalidInput(format!(
                        "unknown {} option: {:?}",
                        stringify!($name),
                        other
                    ))),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

option_set! {
    /// Visitor's role in the business
    Role {
        Owner => "Owner",
        Ceo => "CEO",
        ManagingDirector => "Managing Director",
        Other => "Other",
    }
}

option_set! {
    /// Full-time headcount band
    TeamSize {
        FiveToTen => "5-10",
        ElevenToTwentyFive => "11-25",
        TwentySixToFifty => "26-50",
        FiftyOnePlus => "51+",
    }
}

option_set! {
    /// Main business focus right now
    MainFocus {
        IncreasingProfits => "Increasing profits",
        ReducingOwnerTime => "Reducing owner time",
        ImprovingTeamOutput => "Improving team output",
        ScalingWithoutStaff => "Scaling without more staff",
        Other => "Other",
    }
}

option_set! {
    /// Biggest obstacle blocking the business from running without the owner
    BiggestObstacle {
        LackOfSystems => "lack of systems",
        TeamNotTrained => "team not trained",
        LowAutomation => "low automation",
        UnclearRoles => "unclear roles & tasks",
        Other => "other",
    }
}

option_set! {
    /// How soon the visitor plans to invest in a solution
    InvestmentTimeline {
        Immediately => "Immediately",
        WithinThreeMonths => "Within next 3 months",
        WithinSixToTwelveMonths => "Within 6-12 months",
        NotSure => "Not sure",
    }
}

impl TeamSize {
    /// Representative headcount used for capacity estimates
    pub fn average_headcount(self) -> u32 {
        match self {
            TeamSize::FiveToTen => 7,
            TeamSize::ElevenToTwentyFive => 18,
            TeamSize::TwentySixToFifty => 38,
            TeamSize::FiftyOnePlus => 60,
        }
    }
}

/// Self-reported confidence (1 = not confident, 5 = very confident) that the cost
/// of manual workflows is fully captured
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct ConfidenceRating(u8);

impl ConfidenceRating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: u8) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(Error::InvalidInput(format!(
                "confidence rating must be between {} and {}, got {}",
                Self::MIN,
                Self::MAX,
                value
            )))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for ConfidenceRating {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value)
    }
}

impl From<ConfidenceRating> for u8 {
    fn from(rating: ConfidenceRating) -> u8 {
        rating.0
    }
}

/// Complete questionnaire answer set
///
/// Only produced by a finished questionnaire (or by deserialising a complete record),
/// so every field is present by construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditInputs {
    // Contact & basics
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub role: Role,
    pub team_size: TeamSize,
    pub main_focus: MainFocus,

    // Core business / systems
    pub losing_money_on_repetitive_tasks: bool,
    pub tracking_senior_team_hours: bool,
    pub clarity_on_ai_tasks: bool,
    pub team_delivering_less_output: bool,
    pub invested_in_automation_but_underutilized: bool,

    // Owner / CEO
    pub worked_more_than_50_hours: bool,
    pub is_bottleneck: bool,
    pub can_scale_without_hiring: bool,
    pub confidence_in_capturing_costs: ConfidenceRating,
    pub biggest_obstacle: BiggestObstacle,

    // Qualification
    pub investment_timeline: InvestmentTimeline,
}

impl AuditInputs {
    /// The five core-business flags, in questionnaire order
    pub fn core_flags(&self) -> [bool; 5] {
        [
            self.losing_money_on_repetitive_tasks,
            self.tracking_senior_team_hours,
            self.clarity_on_ai_tasks,
            self.team_delivering_less_output,
            self.invested_in_automation_but_underutilized,
        ]
    }

    /// The three owner/CEO flags, in questionnaire order
    pub fn owner_flags(&self) -> [bool; 3] {
        [
            self.worked_more_than_50_hours,
            self.is_bottleneck,
            self.can_scale_without_hiring,
        ]
    }
}

/// Expected impact of a recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Impact {
    High,
    Medium,
    Low,
}

impl Impact {
    pub const ALL: &'static [Impact] = &[Impact::High, Impact::Medium, Impact::Low];

    pub fn label(self) -> &'static str {
        match self {
            Impact::High => "High",
            Impact::Medium => "Medium",
            Impact::Low => "Low",
        }
    }
}

impl fmt::Display for Impact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub title: String,
    pub description: String,
    pub impact: Impact,
    pub tool_suggestion: String,
}

/// Narrative audit outcome shown on the results dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditResult {
    /// 0-100 Time Leak Score (always the locally computed value)
    pub score: u8,
    pub summary: String,
    pub total_hours_wasted_per_week: f64,
    pub potential_cost_savings: String,
    pub recommendations: Vec<Recommendation>,
}
