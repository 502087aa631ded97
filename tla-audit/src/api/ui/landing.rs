//! Landing page handler

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::{Html, Response},
};
use serde::Deserialize;
use tracing::debug;
use tla_common::variant::{ContentVariant, Theme};

use super::layout::{escape_html, page_shell};
use crate::api::Visitor;
use crate::models::FunnelState;
use crate::AppState;

/// Variant selection; `variant` wins over `v`
#[derive(Debug, Default, Deserialize)]
pub struct LandingQuery {
    pub variant: Option<String>,
    pub v: Option<String>,
}

impl LandingQuery {
    fn requested(&self) -> Option<ContentVariant> {
        let present = |raw: &Option<String>| raw.as_deref().is_some_and(|s| !s.trim().is_empty());
        if present(&self.variant) || present(&self.v) {
            Some(ContentVariant::from_query(self.variant.as_deref(), self.v.as_deref()))
        } else {
            None
        }
    }
}

/// GET /
///
/// Hero for the selected content variant. Without a query the session keeps the
/// variant it arrived with.
pub async fn landing_page(
    State(state): State<AppState>,
    visitor: Visitor,
    query: Result<Query<LandingQuery>, QueryRejection>,
) -> Response {
    // A query the extractor can't parse (repeated keys) selects nothing
    let requested = match query {
        Ok(Query(query)) => query.requested(),
        Err(e) => {
            debug!(error = %e, "Ignoring unparseable landing query");
            None
        }
    };

    let outcome = state
        .sessions
        .update(visitor.session_id, |funnel| {
            let current = funnel.navigate(FunnelState::Landing.path());
            if current != FunnelState::Landing {
                return Err(current);
            }
            if let Some(variant) = requested {
                funnel.set_variant(variant);
            }
            Ok((funnel.variant(), funnel.take_notice()))
        })
        .await;

    match outcome {
        Some(Ok((variant, notice))) => visitor.page(Html(render(variant, notice.as_deref()))),
        Some(Err(current)) => visitor.redirect(current),
        None => visitor.page(Html(render(ContentVariant::default(), None))),
    }
}

fn render(variant: ContentVariant, notice: Option<&str>) -> String {
    let hero = variant.hero();
    let (accent_from, accent_to) = hero.accent(variant.theme);

    let (body_class, toggle_label, toggle_target) = match variant.theme {
        Theme::Dark => ("dark", "☀ Light", format!("{}-light", variant.base.as_str())),
        Theme::Light => ("light", "☾ Dark", variant.base.as_str().to_string()),
    };

    let notice_html = notice
        .map(|text| format!(r#"<div class="notice" role="alert">{}</div>"#, escape_html(text)))
        .unwrap_or_default();

    let bullets = if hero.bullets.is_empty() {
        String::new()
    } else {
        let items: String = hero
            .bullets
            .iter()
            .map(|b| format!("<li>{}</li>", escape_html(b)))
            .collect();
        format!("<ul>{}</ul>", items)
    };

    let body = format!(
        r#"<a class="theme-toggle" href="/?variant={toggle_target}">{toggle_label}</a>
<main class="hero">
    {notice_html}
    <span class="badge" style="color: {accent_from}">{title}</span>
    <h1>{lead}<span class="highlight" style="background-image: linear-gradient(90deg, {accent_from}, {accent_to})">{highlight}</span>{tail}</h1>
    <p class="subhead">{subhead}</p>
    {bullets}
    <form method="post" action="/start">
        <button class="btn" type="submit" style="background: linear-gradient(90deg, {accent_from}, {accent_to})">{cta} →</button>
    </form>
    <p class="supporting">{supporting}</p>
</main>"#,
        toggle_target = toggle_target,
        toggle_label = toggle_label,
        notice_html = notice_html,
        accent_from = accent_from,
        accent_to = accent_to,
        title = escape_html(hero.title),
        lead = escape_html(hero.headline_lead),
        highlight = escape_html(hero.headline_highlight),
        tail = escape_html(hero.headline_tail),
        subhead = escape_html(hero.subhead),
        bullets = bullets,
        cta = escape_html(hero.cta),
        supporting = escape_html(hero.supporting),
    );

    page_shell(hero.title, body_class, "", &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_precedence_and_absence() {
        let query = LandingQuery {
            variant: Some("wage".to_string()),
            v: Some("ceo-light".to_string()),
        };
        assert_eq!(query.requested().unwrap().name(), "wage");

        let query = LandingQuery {
            variant: None,
            v: Some("ceo-light".to_string()),
        };
        assert_eq!(query.requested().unwrap().name(), "ceo-light");

        assert!(LandingQuery::default().requested().is_none());
    }

    #[test]
    fn test_render_uses_variant_copy_and_theme() {
        let html = render(ContentVariant::parse("founder-light"), None);
        assert!(html.contains("Founder Workload Reset™"));
        assert!(html.contains(r#"<body class="light">"#));
        assert!(html.contains("Identify the tasks draining your time and energy"));
        assert!(html.contains(r#"href="/?variant=founder""#));
    }

    #[test]
    fn test_render_shows_notice() {
        let html = render(ContentVariant::default(), Some("Try again"));
        assert!(html.contains(r#"<div class="notice" role="alert">Try again</div>"#));
    }
}
