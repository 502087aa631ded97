//! Questionnaire page handler

use axum::{
    extract::State,
    response::{Html, Response},
};
use tla_common::audit::{
    BiggestObstacle, ConfidenceRating, InvestmentTimeline, MainFocus, Role, TeamSize,
};

use super::enter;
use super::layout::{escape_html, page_shell};
use crate::api::Visitor;
use crate::models::{AuditDraft, FunnelState, Questionnaire, Step};
use crate::AppState;

/// Enables "next" once every required input holds a value
const STEP_SCRIPT: &str = r#"<script>
document.addEventListener('DOMContentLoaded', function () {
    var form = document.getElementById('step-form');
    var next = document.getElementById('next');
    var check = function () { next.disabled = !form.checkValidity(); };
    form.addEventListener('input', check);
    form.addEventListener('change', check);
    check();
});
</script>"#;

/// GET /assessment
pub async fn assessment_page(State(state): State<AppState>, visitor: Visitor) -> Response {
    match enter(&state, visitor, FunnelState::Audit).await {
        Ok(funnel) => visitor.page(Html(render(funnel.questionnaire()))),
        Err(redirect) => redirect,
    }
}

fn render(questionnaire: &Questionnaire) -> String {
    let step = questionnaire.step();
    let draft = questionnaire.draft();
    let progress = questionnaire.progress_percent();

    let fields = match step {
        Step::Contact => contact_fields(draft),
        Step::CoreBusiness => core_fields(draft),
        Step::Owner => owner_fields(draft),
        Step::Timeline => timeline_fields(draft),
    };

    let back = if step == Step::Contact {
        String::new()
    } else {
        r#"<button class="link-button" type="submit" formaction="/assessment/back" formnovalidate>← Back</button>"#
            .to_string()
    };

    let next_label = if questionnaire.is_last_step() {
        "➡️ See My Score"
    } else {
        "Next Step →"
    };
    let disabled = if questionnaire.is_step_valid() { "" } else { " disabled" };

    let body = format!(
        r#"<main class="container narrow">
    <header>
        <h1>Answer these quick questions to calculate your Time Leak Score.</h1>
        <div class="progress-label">{progress}% Complete</div>
        <div class="progress"><div style="width: {progress}%"></div></div>
    </header>
    <form id="step-form" class="card" method="post" action="/assessment/next">
        <h2 class="step-title">{title}</h2>
        {fields}
        <div class="form-footer">
            <span>{back}</span>
            <button id="next" class="btn" type="submit"{disabled}>{next_label}</button>
        </div>
    </form>
</main>"#,
        progress = progress,
        title = step.title(),
        fields = fields,
        back = back,
        disabled = disabled,
        next_label = next_label,
    );

    page_shell("AI Time Leak Audit", "app", STEP_SCRIPT, &body)
}

fn contact_fields(draft: &AuditDraft) -> String {
    [
        text_field("name", "What's your name?", "text", &draft.name, "John Doe", true),
        text_field("email", "What's your business email?", "email", &draft.email, "john@company.com", true),
        text_field("phone", "Phone number", "tel", &draft.phone, "Optional", false),
        choice_field(
            "role",
            "What's your role in the business?",
            Role::ALL.iter().map(|r| r.label()),
            draft.role.map(Role::label),
            false,
        ),
        choice_field(
            "teamSize",
            "How many full-time employees do you currently have?",
            TeamSize::ALL.iter().map(|t| t.label()),
            draft.team_size.map(TeamSize::label),
            false,
        ),
        choice_field(
            "mainFocus",
            "Which best describes your main focus right now?",
            MainFocus::ALL.iter().map(|m| m.label()),
            draft.main_focus.map(MainFocus::label),
            true,
        ),
    ]
    .concat()
}

fn core_fields(draft: &AuditDraft) -> String {
    [
        yes_no(
            "losingMoneyOnRepetitiveTasks",
            "Do you currently feel your business is losing money on repetitive tasks that could be automated?",
            draft.losing_money_on_repetitive_tasks,
        ),
        yes_no(
            "trackingSeniorTeamHours",
            "Are you tracking how many hours per week your senior team spends on low-value tasks?",
            draft.tracking_senior_team_hours,
        ),
        yes_no(
            "clarityOnAiTasks",
            "Do you have clarity on which staff tasks could be handled (or augmented) by AI or automation within your business?",
            draft.clarity_on_ai_tasks,
        ),
        yes_no(
            "teamDeliveringLessOutput",
            "Would you say your team is delivering less than expected output relative to the hours they log?",
            draft.team_delivering_less_output,
        ),
        yes_no(
            "investedInAutomationButUnderutilized",
            "Have you already invested in automation or AI systems, but they either haven’t delivered or are under-utilised?",
            draft.invested_in_automation_but_underutilized,
        ),
    ]
    .concat()
}

fn owner_fields(draft: &AuditDraft) -> String {
    let ratings: Vec<String> = (ConfidenceRating::MIN..=ConfidenceRating::MAX)
        .map(|n| n.to_string())
        .collect();
    let selected = draft
        .confidence_in_capturing_costs
        .map(|c| c.value().to_string());

    [
        yes_no(
            "workedMoreThan50Hours",
            "In the past 4 weeks, have you personally worked more than 50 hours?",
            draft.worked_more_than_50_hours,
        ),
        yes_no(
            "isBottleneck",
            "Are you the bottleneck in your business (i.e., tasks stop when you aren’t available)?",
            draft.is_bottleneck,
        ),
        yes_no(
            "canScaleWithoutHiring",
            "Do you believe you could scale the business by at least 20% in the next 12 months without hiring more staff?",
            draft.can_scale_without_hiring,
        ),
        choice_field(
            "confidenceInCapturingCosts",
            "On a scale of 1-5, how confident are you that you’re capturing all the cost of manual workflows in your business? <span class=\"hint\">(1 = not confident, 5 = very confident)</span>",
            ratings.iter().map(String::as_str),
            selected.as_deref(),
            false,
        ),
        choice_field(
            "biggestObstacle",
            "What’s the biggest obstacle blocking your business from running without you?",
            BiggestObstacle::ALL.iter().map(|b| b.label()),
            draft.biggest_obstacle.map(BiggestObstacle::label),
            true,
        ),
    ]
    .concat()
}

fn timeline_fields(draft: &AuditDraft) -> String {
    choice_field(
        "investmentTimeline",
        "How soon do you plan to invest in a solution (software, coaching, automation) to free up owner time, improve profit or scale without more staff?",
        InvestmentTimeline::ALL.iter().map(|t| t.label()),
        draft.investment_timeline.map(InvestmentTimeline::label),
        true,
    )
}

fn text_field(name: &str, label: &str, kind: &str, value: &str, placeholder: &str, required: bool) -> String {
    let marker = if required { r#" <span class="required">*</span>"# } else { "" };
    let required_attr = if required { r#" required pattern=".*\S.*""# } else { "" };
    format!(
        r#"<div class="field">
    <label for="{name}">{label}{marker}</label>
    <input id="{name}" name="{name}" type="{kind}" value="{value}" placeholder="{placeholder}"{required_attr}>
</div>"#,
        name = name,
        label = label,
        marker = marker,
        kind = kind,
        value = escape_html(value),
        placeholder = placeholder,
        required_attr = required_attr,
    )
}

/// Radio group; option values are the option labels
fn choice_field<'a>(
    name: &str,
    question: &str,
    options: impl Iterator<Item = &'a str>,
    selected: Option<&str>,
    stacked: bool,
) -> String {
    let radios: String = options
        .map(|option| {
            let checked = if selected == Some(option) { " checked" } else { "" };
            format!(
                r#"<label class="option"><input type="radio" name="{name}" value="{value}" required{checked}><span>{text}</span></label>"#,
                name = name,
                value = escape_html(option),
                checked = checked,
                text = escape_html(option),
            )
        })
        .collect();

    format!(
        r#"<div class="field">
    <span class="question">{question} <span class="required">*</span></span>
    <div class="options{stacked}">{radios}</div>
</div>"#,
        question = question,
        stacked = if stacked { " stacked" } else { "" },
        radios = radios,
    )
}

fn yes_no(name: &str, question: &str, selected: Option<bool>) -> String {
    let selected = selected.map(|answer| if answer { "true" } else { "false" });
    let radios: String = [("true", "Yes"), ("false", "No")]
        .into_iter()
        .map(|(value, text)| {
            let checked = if selected == Some(value) { " checked" } else { "" };
            format!(
                r#"<label class="option"><input type="radio" name="{name}" value="{value}" required{checked}><span>{text}</span></label>"#,
                name = name,
                value = value,
                checked = checked,
                text = text,
            )
        })
        .collect();

    format!(
        r#"<div class="field">
    <span class="question">{question} <span class="required">*</span></span>
    <div class="options">{radios}</div>
</div>"#,
        question = question,
        radios = radios,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AnswerUpdate;

    #[test]
    fn test_first_step_renders_disabled_next_without_back() {
        let html = render(&Questionnaire::new());
        assert!(html.contains("25% Complete"));
        assert!(html.contains(r#"<button id="next" class="btn" type="submit" disabled>"#));
        assert!(!html.contains("/assessment/back"));
        assert!(html.contains(r#"value="Managing Director""#));
    }

    #[test]
    fn test_selected_answers_are_checked() {
        let mut q = Questionnaire::new();
        q.update(AnswerUpdate {
            name: Some("<Sam>".to_string()),
            email: Some("sam@example.com".to_string()),
            role: Some(Role::Ceo),
            team_size: Some(TeamSize::FiveToTen),
            main_focus: Some(MainFocus::Other),
            ..Default::default()
        });
        let html = render(&q);
        assert!(html.contains(r#"value="&lt;Sam&gt;""#));
        assert!(html.contains(r#"name="role" value="CEO" required checked"#));
        assert!(html.contains(r#"<button id="next" class="btn" type="submit">"#));
    }

    #[test]
    fn test_obstacle_labels_are_escaped() {
        let html = owner_fields(&AuditDraft::default());
        assert!(html.contains(r#"value="unclear roles &amp; tasks""#));
        assert!(html.contains(r#"name="confidenceInCapturingCosts" value="5""#));
    }
}
