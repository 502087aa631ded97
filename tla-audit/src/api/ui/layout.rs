//! Shared page shell, stylesheet and HTML helpers

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Shared stylesheet, served at /static/tla.css
pub const TLA_CSS: &str = r#"
* { margin: 0; padding: 0; box-sizing: border-box; }
body {
    font-family: 'Inter', 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif;
    line-height: 1.6;
    min-height: 100vh;
}
body.dark { background-color: #020617; color: #f8fafc; }
body.light, body.app { background-color: #f8fafc; color: #0f172a; }
a { color: inherit; }
.container { max-width: 1100px; margin: 0 auto; padding: 32px 16px; }
.narrow { max-width: 720px; }
.card {
    background: #ffffff; color: #0f172a; border: 1px solid #e2e8f0;
    border-radius: 16px; box-shadow: 0 10px 25px -5px rgb(0 0 0 / 0.1);
    padding: 32px;
}
.btn {
    display: inline-flex; align-items: center; justify-content: center; gap: 8px;
    padding: 14px 32px; border-radius: 12px; border: none; cursor: pointer;
    font-weight: 700; font-size: 18px; text-decoration: none;
    background: #4f46e5; color: #ffffff;
}
.btn:hover { background: #4338ca; }
.btn[disabled] { background: #e2e8f0; color: #94a3b8; cursor: not-allowed; }
.btn-plain {
    background: #ffffff; color: #334155; border: 1px solid #e2e8f0;
    font-size: 14px; padding: 8px 16px; font-weight: 500;
}
.btn-plain:hover { background: #f8fafc; }
.link-button { background: none; border: none; color: #64748b; cursor: pointer; font-size: 16px; font-weight: 500; }
.link-button:hover { color: #1e293b; }
.notice {
    background: #fef2f2; color: #991b1b; border: 1px solid #fecaca;
    border-radius: 12px; padding: 12px 16px; margin-bottom: 24px; text-align: center;
}

/* Landing */
.hero { text-align: center; padding: 64px 16px; max-width: 880px; margin: 0 auto; }
.hero .badge {
    display: inline-block; padding: 4px 14px; border-radius: 999px; font-size: 14px;
    font-weight: 600; margin-bottom: 24px; border: 1px solid currentColor; opacity: 0.85;
}
.hero h1 { font-size: 44px; line-height: 1.15; font-weight: 800; margin-bottom: 24px; }
.hero .highlight { -webkit-background-clip: text; background-clip: text; color: transparent; }
.hero .subhead { font-size: 20px; opacity: 0.8; margin-bottom: 24px; }
.hero ul { list-style: none; margin: 0 auto 32px; display: inline-block; text-align: left; }
.hero li::before { content: "✓ "; font-weight: 700; }
.hero .supporting { margin-top: 16px; font-size: 14px; opacity: 0.7; }
.theme-toggle { position: absolute; top: 16px; right: 16px; font-size: 14px; opacity: 0.7; }

/* Questionnaire */
.progress { height: 8px; background: #c7d2fe; border-radius: 4px; overflow: hidden; margin: 8px 0 24px; }
.progress > div { height: 100%; background: #4f46e5; }
.progress-label { text-align: right; font-size: 12px; font-weight: 600; color: #4f46e5; }
.step-title { font-size: 20px; font-weight: 700; border-bottom: 1px solid #e2e8f0; padding-bottom: 16px; margin-bottom: 24px; }
.field { margin-bottom: 24px; }
.field > label, .field > .question { display: block; font-size: 14px; font-weight: 600; color: #334155; margin-bottom: 12px; }
.required { color: #ef4444; }
.hint { display: block; font-size: 12px; font-weight: 400; color: #64748b; }
input[type=text], input[type=email], input[type=tel] {
    width: 100%; padding: 12px 16px; border: 2px solid #e2e8f0; border-radius: 8px; font-size: 16px;
}
.options { display: grid; gap: 12px; grid-template-columns: repeat(auto-fit, minmax(140px, 1fr)); }
.options.stacked { grid-template-columns: 1fr; }
.option { position: relative; }
.option input { position: absolute; opacity: 0; }
.option span {
    display: block; padding: 12px 16px; border: 2px solid #e2e8f0; border-radius: 8px;
    cursor: pointer; font-size: 14px; font-weight: 500; color: #475569;
}
.option input:checked + span { border-color: #4f46e5; background: #eef2ff; color: #4338ca; font-weight: 700; }
.form-footer { display: flex; justify-content: space-between; align-items: center; margin-top: 32px; padding-top: 24px; border-top: 1px solid #f1f5f9; }

/* Analyzing */
.analyzing { min-height: 100vh; display: flex; flex-direction: column; align-items: center; justify-content: center; text-align: center; padding: 16px; }
.spinner {
    width: 64px; height: 64px; border: 6px solid #312e81; border-top-color: #6366f1;
    border-radius: 50%; animation: spin 1s linear infinite; margin-bottom: 24px;
}
@keyframes spin { to { transform: rotate(360deg); } }

/* Results */
.results-header { display: flex; flex-wrap: wrap; justify-content: space-between; align-items: center; gap: 16px; padding-bottom: 24px; margin-bottom: 32px; border-bottom: 1px solid #e2e8f0; }
.results-header h1 { font-size: 28px; }
.results-header h1 span { color: #4f46e5; }
.results-grid { display: grid; grid-template-columns: 1fr 2fr; gap: 32px; }
@media (max-width: 900px) { .results-grid { grid-template-columns: 1fr; } }
.score { font-size: 56px; font-weight: 900; }
.score-optimized { color: #059669; }
.score-moderate { color: #ca8a04; }
.score-critical { color: #dc2626; }
.pill { display: inline-block; padding: 4px 12px; border-radius: 999px; font-size: 12px; font-weight: 700; text-transform: uppercase; background: #f1f5f9; }
.metrics { display: grid; grid-template-columns: 1fr 1fr; gap: 16px; margin: 24px 0; }
.metric { background: #ffffff; border: 1px solid #e2e8f0; border-radius: 12px; padding: 16px; }
.metric strong { display: block; font-size: 24px; }
.metric small { color: #64748b; }
.legend { list-style: none; font-size: 13px; color: #475569; margin-top: 12px; }
.legend i { display: inline-block; width: 10px; height: 10px; border-radius: 50%; margin-right: 6px; }
.recommendation { margin-bottom: 16px; }
.recommendation header { display: flex; justify-content: space-between; align-items: flex-start; gap: 12px; margin-bottom: 8px; }
.impact { padding: 4px 8px; border-radius: 4px; font-size: 12px; font-weight: 700; text-transform: uppercase; }
.impact-high { background: #d1fae5; color: #047857; }
.impact-medium { background: #fef9c3; color: #a16207; }
.impact-low { background: #f1f5f9; color: #475569; }
.cta-panel { background: linear-gradient(135deg, #4f46e5, #3730a3); color: #ffffff; border-radius: 16px; padding: 32px; text-align: center; }
.cta-panel h2 { margin-bottom: 24px; }
.cta-panel .btn { background: #ffffff; color: #312e81; }
.cta-panel p { margin-top: 16px; font-size: 14px; color: #e0e7ff; }

/* Booking */
.booking { display: flex; flex-direction: column; height: 800px; padding: 0; overflow: hidden; }
.booking-header { background: #4f46e5; color: #ffffff; text-align: center; padding: 24px; }
.booking iframe { flex: 1; width: 100%; border: none; }

@media print { form, .cta-panel { display: none; } }
"#;

/// GET /static/tla.css
pub async fn serve_tla_css() -> Response {
    (
        StatusCode::OK,
        [
            ("content-type", "text/css"),
            ("cache-control", "public, max-age=3600"),
        ],
        TLA_CSS,
    )
        .into_response()
}

/// Wrap page content in the common document shell
pub fn page_shell(title: &str, body_class: &str, head_extra: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <link rel="stylesheet" href="/static/tla.css">
    {head_extra}
</head>
<body class="{body_class}">
{body}
</body>
</html>
"#,
        title = escape_html(title),
        body_class = body_class,
        head_extra = head_extra,
        body = body,
    )
}

/// Escape text for HTML element content and quoted attributes
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
