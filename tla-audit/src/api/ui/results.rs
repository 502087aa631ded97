//! Results dashboard handler

use axum::{
    extract::State,
    response::{Html, Response},
};
use std::f64::consts::PI;
use tla_common::audit::AuditInputs;
use tla_common::score::ScoreLabel;
use tla_common::{AuditResult, Impact};

use super::enter;
use super::layout::{escape_html, page_shell};
use crate::api::Visitor;
use crate::models::{CapacityBreakdown, Dashboard, FunnelState};
use crate::AppState;

const PRODUCTIVE_COLOR: &str = "#64748b";
const WASTED_COLOR: &str = "#4f46e5";
const DONUT_RADIUS: f64 = 55.0;

/// GET /results
pub async fn results_page(State(state): State<AppState>, visitor: Visitor) -> Response {
    let funnel = match enter(&state, visitor, FunnelState::Results).await {
        Ok(funnel) => funnel,
        Err(redirect) => return redirect,
    };

    match (funnel.inputs(), funnel.results()) {
        (Some(inputs), Some(results)) => visitor.page(Html(render(inputs, results))),
        _ => visitor.redirect(FunnelState::Landing),
    }
}

fn score_class(label: ScoreLabel) -> &'static str {
    match label {
        ScoreLabel::Optimized => "score-optimized",
        ScoreLabel::Moderate => "score-moderate",
        ScoreLabel::Critical => "score-critical",
    }
}

fn impact_class(impact: Impact) -> &'static str {
    match impact {
        Impact::High => "impact-high",
        Impact::Medium => "impact-medium",
        Impact::Low => "impact-low",
    }
}

/// Two-segment donut: productive vs wasted capacity
fn capacity_chart(capacity: &CapacityBreakdown) -> String {
    let circumference = 2.0 * PI * DONUT_RADIUS;
    let wasted = circumference * capacity.wasted_fraction();

    format!(
        r#"<svg viewBox="0 0 160 160" width="180" height="180" role="img" aria-label="Team capacity">
    <circle cx="80" cy="80" r="{r}" fill="none" stroke="{productive_color}" stroke-width="22"/>
    <circle cx="80" cy="80" r="{r}" fill="none" stroke="{wasted_color}" stroke-width="22"
        stroke-dasharray="{wasted:.2} {circumference:.2}" transform="rotate(-90 80 80)"/>
</svg>
<ul class="legend">
    <li><i style="background: {productive_color}"></i>Productive Time: {productive} hrs</li>
    <li><i style="background: {wasted_color}"></i>Wasted / Automatable: {wasted_hours} hrs</li>
</ul>"#,
        r = DONUT_RADIUS,
        productive_color = PRODUCTIVE_COLOR,
        wasted_color = WASTED_COLOR,
        wasted = wasted,
        circumference = circumference,
        productive = capacity.productive_display(),
        wasted_hours = capacity.wasted_display(),
    )
}

fn render(inputs: &AuditInputs, results: &AuditResult) -> String {
    let dashboard = Dashboard::new(inputs.team_size, results);
    let class = score_class(dashboard.label);

    let recommendations: String = results
        .recommendations
        .iter()
        .map(|rec| {
            format!(
                r#"<article class="card recommendation">
    <header>
        <h3>{title}</h3>
        <span class="impact {impact_class}">{impact} Impact</span>
    </header>
    <p>{description}</p>
</article>"#,
                title = escape_html(&rec.title),
                impact_class = impact_class(rec.impact),
                impact = rec.impact,
                description = escape_html(&rec.description),
            )
        })
        .collect();

    let body = format!(
        r#"<main class="container">
    <header class="results-header">
        <div>
            <h1>Audit Results: <span>{name}'s Business</span></h1>
            <p style="color: #64748b;">Generated exclusively for your operations team.</p>
        </div>
        <div style="display: flex; gap: 12px;">
            <button class="btn btn-plain" type="button" onclick="window.print()">Save PDF</button>
            <form method="post" action="/restart"><button class="btn btn-plain" type="submit">Restart</button></form>
        </div>
    </header>
    <div class="results-grid">
        <section>
            <div class="card">
                <h3 style="color: #64748b; font-size: 14px; text-transform: uppercase;">Time Leak Score</h3>
                <div class="score {class}">{score}/100</div>
                <span class="pill {class}">{label}</span>
                <p style="margin-top: 16px; color: #475569;">{summary}</p>
            </div>
            <div class="metrics">
                <div class="metric"><strong>{hours}</strong><small>Hours Wasted / Week</small></div>
                <div class="metric"><strong class="score-optimized">{savings}</strong><small>Potential Yearly Savings</small></div>
            </div>
            <div class="card">
                <h3 style="color: #64748b; font-size: 14px; margin-bottom: 12px;">Team Capacity Analysis</h3>
                {chart}
            </div>
        </section>
        <section>
            <h2 style="margin-bottom: 24px;">Operations Upgrade Plan</h2>
            {recommendations}
            <div class="cta-panel">
                <h2>Ready to Fix these leaks in less than 30 days?</h2>
                <form method="post" action="/book"><button class="btn" type="submit">Book Your FREE Call</button></form>
                <p>Limited spots Available</p>
            </div>
        </section>
    </div>
</main>"#,
        name = escape_html(&inputs.name),
        class = class,
        score = dashboard.score,
        label = dashboard.label.display_text(),
        summary = escape_html(&results.summary),
        hours = results.total_hours_wasted_per_week.round() as i64,
        savings = escape_html(&results.potential_cost_savings),
        chart = capacity_chart(&dashboard.capacity),
        recommendations = recommendations,
    );

    page_shell("Your Results - AI Time Leak Audit", "app", "", &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tla_common::audit::{
        BiggestObstacle, ConfidenceRating, InvestmentTimeline, MainFocus, Role, TeamSize,
    };
    use tla_common::Recommendation;

    fn inputs() -> AuditInputs {
        AuditInputs {
            name: "Alex & Co".to_string(),
            email: "alex@example.com".to_string(),
            phone: String::new(),
            role: Role::Owner,
            team_size: TeamSize::FiveToTen,
            main_focus: MainFocus::IncreasingProfits,
            losing_money_on_repetitive_tasks: true,
            tracking_senior_team_hours: true,
            clarity_on_ai_tasks: true,
            team_delivering_less_output: true,
            invested_in_automation_but_underutilized: true,
            worked_more_than_50_hours: true,
            is_bottleneck: true,
            can_scale_without_hiring: true,
            confidence_in_capturing_costs: ConfidenceRating::new(5).unwrap(),
            biggest_obstacle: BiggestObstacle::Other,
            investment_timeline: InvestmentTimeline::Immediately,
        }
    }

    fn results() -> AuditResult {
        AuditResult {
            score: 100,
            summary: "Heavy drag".to_string(),
            total_hours_wasted_per_week: 56.4,
            potential_cost_savings: "$146,640".to_string(),
            recommendations: vec![Recommendation {
                title: "Automate invoicing".to_string(),
                description: "Use <templates>".to_string(),
                impact: Impact::Medium,
                tool_suggestion: "Xero".to_string(),
            }],
        }
    }

    #[test]
    fn test_render_dashboard() {
        let html = render(&inputs(), &results());
        assert!(html.contains("Alex &amp; Co's Business"));
        assert!(html.contains(r#"<div class="score score-critical">100/100</div>"#));
        assert!(html.contains("Critical Leak Alert"));
        assert!(html.contains("<strong>56</strong>"));
        assert!(html.contains("Medium Impact"));
        assert!(html.contains("Use &lt;templates&gt;"));
        // 7 people * 40h = 280h, 280 - 56.4 = 223.6
        assert!(html.contains("Productive Time: 224 hrs"));
        assert!(html.contains("Wasted / Automatable: 56 hrs"));
    }

    #[test]
    fn test_tool_suggestion_not_shown() {
        let html = render(&inputs(), &results());
        assert!(!html.contains("Xero"));
    }
}
