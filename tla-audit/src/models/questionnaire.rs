//! Questionnaire state machine
//!
//! Four steps, each owning a fixed set of required fields:
//! CONTACT → CORE BUSINESS → OWNER → TIMELINE
//!
//! Forward moves require the current step to be complete; backward moves are
//! unconditional (no-op on the first step). Finishing the last step yields the
//! full [`AuditInputs`].

use serde::{Deserialize, Serialize};
use tla_common::audit::{
    AuditInputs, BiggestObstacle, ConfidenceRating, InvestmentTimeline, MainFocus, Role, TeamSize,
};

pub const TOTAL_STEPS: u8 = 4;

/// Questionnaire step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Contact & basics
    Contact,
    /// Core business & systems flags
    CoreBusiness,
    /// Owner / CEO perspective
    Owner,
    /// Investment timeline
    Timeline,
}

impl Step {
    /// 1-based position
    pub fn number(self) -> u8 {
        match self {
            Step::Contact => 1,
            Step::CoreBusiness => 2,
            Step::Owner => 3,
            Step::Timeline => 4,
        }
    }

    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Step::Contact),
            2 => Some(Step::CoreBusiness),
            3 => Some(Step::Owner),
            4 => Some(Step::Timeline),
            _ => None,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Step::Contact => "Contact & Basics",
            Step::CoreBusiness => "Core Business & Systems",
            Step::Owner => "Owner / CEO Perspective",
            Step::Timeline => "Final Step",
        }
    }

    fn next(self) -> Option<Self> {
        Step::from_number(self.number() + 1)
    }

    fn previous(self) -> Option<Self> {
        Step::from_number(self.number().saturating_sub(1))
    }
}

/// Partial answer set submitted from one step's form
///
/// Absent fields leave the draft unchanged.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<Role>,
    pub team_size: Option<TeamSize>,
    pub main_focus: Option<MainFocus>,

    pub losing_money_on_repetitive_tasks: Option<bool>,
    pub tracking_senior_team_hours: Option<bool>,
    pub clarity_on_ai_tasks: Option<bool>,
    pub team_delivering_less_output: Option<bool>,
    pub invested_in_automation_but_underutilized: Option<bool>,

    pub worked_more_than_50_hours: Option<bool>,
    pub is_bottleneck: Option<bool>,
    pub can_scale_without_hiring: Option<bool>,
    pub confidence_in_capturing_costs: Option<ConfidenceRating>,
    pub biggest_obstacle: Option<BiggestObstacle>,

    pub investment_timeline: Option<InvestmentTimeline>,
}

/// In-progress answers; every field may still be unset
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: Option<Role>,
    pub team_size: Option<TeamSize>,
    pub main_focus: Option<MainFocus>,

    pub losing_money_on_repetitive_tasks: Option<bool>,
    pub tracking_senior_team_hours: Option<bool>,
    pub clarity_on_ai_tasks: Option<bool>,
    pub team_delivering_less_output: Option<bool>,
    pub invested_in_automation_but_underutilized: Option<bool>,

    pub worked_more_than_50_hours: Option<bool>,
    pub is_bottleneck: Option<bool>,
    pub can_scale_without_hiring: Option<bool>,
    pub confidence_in_capturing_costs: Option<ConfidenceRating>,
    pub biggest_obstacle: Option<BiggestObstacle>,

    pub investment_timeline: Option<InvestmentTimeline>,
}

impl AuditDraft {
    /// Whether every field owned by `step` is filled
    pub fn is_step_complete(&self, step: Step) -> bool {
        match step {
            Step::Contact => {
                !self.name.trim().is_empty()
                    && !self.email.trim().is_empty()
                    && self.role.is_some()
                    && self.team_size.is_some()
                    && self.main_focus.is_some()
            }
            Step::CoreBusiness => {
                self.losing_money_on_repetitive_tasks.is_some()
                    && self.tracking_senior_team_hours.is_some()
                    && self.clarity_on_ai_tasks.is_some()
                    && self.team_delivering_less_output.is_some()
                    && self.invested_in_automation_but_underutilized.is_some()
            }
            Step::Owner => {
                self.worked_more_than_50_hours.is_some()
                    && self.is_bottleneck.is_some()
                    && self.can_scale_without_hiring.is_some()
                    && self.confidence_in_capturing_costs.is_some()
                    && self.biggest_obstacle.is_some()
            }
            Step::Timeline => self.investment_timeline.is_some(),
        }
    }

    /// Merge the fields of `update` owned by `step`
    fn apply(&mut self, step: Step, update: AnswerUpdate) {
        fn set<T>(slot: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *slot = value;
            }
        }

        match step {
            Step::Contact => {
                if let Some(name) = update.name {
                    self.name = name;
                }
                if let Some(email) = update.email {
                    self.email = email;
                }
                if let Some(phone) = update.phone {
                    self.phone = phone;
                }
                set(&mut self.role, update.role);
                set(&mut self.team_size, update.team_size);
                set(&mut self.main_focus, update.main_focus);
            }
            Step::CoreBusiness => {
                set(
                    &mut self.losing_money_on_repetitive_tasks,
                    update.losing_money_on_repetitive_tasks,
                );
                set(&mut self.tracking_senior_team_hours, update.tracking_senior_team_hours);
                set(&mut self.clarity_on_ai_tasks, update.clarity_on_ai_tasks);
                set(&mut self.team_delivering_less_output, update.team_delivering_less_output);
                set(
                    &mut self.invested_in_automation_but_underutilized,
                    update.invested_in_automation_but_underutilized,
                );
            }
            Step::Owner => {
                set(&mut self.worked_more_than_50_hours, update.worked_more_than_50_hours);
                set(&mut self.is_bottleneck, update.is_bottleneck);
                set(&mut self.can_scale_without_hiring, update.can_scale_without_hiring);
                set(
                    &mut self.confidence_in_capturing_costs,
                    update.confidence_in_capturing_costs,
                );
                set(&mut self.biggest_obstacle, update.biggest_obstacle);
            }
            Step::Timeline => {
                set(&mut self.investment_timeline, update.investment_timeline);
            }
        }
    }

    /// Build the complete answer set, or `None` while anything is missing
    pub fn to_inputs(&self) -> Option<AuditInputs> {
        let all_complete = [Step::Contact, Step::CoreBusiness, Step::Owner, Step::Timeline]
            .into_iter()
            .all(|step| self.is_step_complete(step));
        if !all_complete {
            return None;
        }

        Some(AuditInputs {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            role: self.role?,
            team_size: self.team_size?,
            main_focus: self.main_focus?,
            losing_money_on_repetitive_tasks: self.losing_money_on_repetitive_tasks?,
            tracking_senior_team_hours: self.tracking_senior_team_hours?,
            clarity_on_ai_tasks: self.clarity_on_ai_tasks?,
            team_delivering_less_output: self.team_delivering_less_output?,
            invested_in_automation_but_underutilized: self
                .invested_in_automation_but_underutilized?,
            worked_more_than_50_hours: self.worked_more_than_50_hours?,
            is_bottleneck: self.is_bottleneck?,
            can_scale_without_hiring: self.can_scale_without_hiring?,
            confidence_in_capturing_costs: self.confidence_in_capturing_costs?,
            biggest_obstacle: self.biggest_obstacle?,
            investment_timeline: self.investment_timeline?,
        })
    }
}

/// Outcome of an advance attempt
#[derive(Debug, Clone, PartialEq)]
pub enum Advance {
    /// Moved to the given step
    Moved(Step),
    /// Last step finished; the accumulated answers
    Completed(AuditInputs),
    /// Current step incomplete; nothing changed
    Blocked,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Questionnaire {
    step: Step,
    draft: AuditDraft,
}

impl Default for Questionnaire {
    fn default() -> Self {
        Self::new()
    }
}

impl Questionnaire {
    pub fn new() -> Self {
        Self {
            step: Step::Contact,
            draft: AuditDraft::default(),
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn draft(&self) -> &AuditDraft {
        &self.draft
    }

    /// Record answers for the current step
    pub fn update(&mut self, update: AnswerUpdate) {
        self.draft.apply(self.step, update);
    }

    pub fn is_step_valid(&self) -> bool {
        self.draft.is_step_complete(self.step)
    }

    pub fn progress_percent(&self) -> u8 {
        ((u16::from(self.step.number()) * 100) / u16::from(TOTAL_STEPS)) as u8
    }

    pub fn is_last_step(&self) -> bool {
        self.step == Step::Timeline
    }

    /// Move forward if the current step is complete
    pub fn advance(&mut self) -> Advance {
        if !self.is_step_valid() {
            return Advance::Blocked;
        }

        match self.step.next() {
            Some(next) => {
                self.step = next;
                Advance::Moved(next)
            }
            None => match self.draft.to_inputs() {
                Some(inputs) => Advance::Completed(inputs),
                None => Advance::Blocked,
            },
        }
    }

    /// Move backward; no-op on the first step
    pub fn back(&mut self) -> Step {
        if let Some(previous) = self.step.previous() {
            self.step = previous;
        }
        self.step
    }

    /// Jump to a step already reached (used when restoring navigation history)
    pub(crate) fn restore_step(&mut self, step: Step) {
        if step.number() <= self.furthest_reachable().number() {
            self.step = step;
        }
    }

    /// Furthest step whose predecessors are all complete
    fn furthest_reachable(&self) -> Step {
        let mut step = Step::Contact;
        while self.draft.is_step_complete(step) {
            match step.next() {
                Some(next) => step = next,
                None => break,
            }
        }
        step
    }
}
