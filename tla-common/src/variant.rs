//! Landing page content variants
//!
//! A variant is chosen once from the `variant` (or `v`) query parameter and then
//! carried with the visitor's session. Lookup is total: unknown names resolve to
//! the default pack.

use serde::{Deserialize, Serialize};
use std::fmt;

const LIGHT_SUFFIX: &str = "-light";

/// Named content pack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaseVariant {
    #[default]
    Default,
    Profit,
    Wage,
    Efficiency,
    Ceo,
    Founder,
    Scale,
    #[serde(rename = "self")]
    SelfRunning,
}

impl BaseVariant {
    pub const ALL: &'static [BaseVariant] = &[
        BaseVariant::Default,
        BaseVariant::Profit,
        BaseVariant::Wage,
        BaseVariant::Efficiency,
        BaseVariant::Ceo,
        BaseVariant::Founder,
        BaseVariant::Scale,
        BaseVariant::SelfRunning,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BaseVariant::Default => "default",
            BaseVariant::Profit => "profit",
            BaseVariant::Wage => "wage",
            BaseVariant::Efficiency => "efficiency",
            BaseVariant::Ceo => "ceo",
            BaseVariant::Founder => "founder",
            BaseVariant::Scale => "scale",
            BaseVariant::SelfRunning => "self",
        }
    }

    fn lookup(name: &str) -> Option<Self> {
        BaseVariant::ALL.iter().copied().find(|v| v.as_str() == name)
    }
}

/// Colour theme of the landing page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

/// Fully resolved landing variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ContentVariant {
    pub base: BaseVariant,
    pub theme: Theme,
}

impl ContentVariant {
    /// Resolve a raw variant name such as `"wage"` or `"ceo-light"`
    ///
    /// A `-light` suffix always selects the light theme; an unrecognised base name
    /// falls back to the default pack.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim().to_ascii_lowercase();
        let (base_name, theme) = match raw.strip_suffix(LIGHT_SUFFIX) {
            Some(base) => (base, Theme::Light),
            None => (raw.as_str(), Theme::Dark),
        };

        Self {
            base: BaseVariant::lookup(base_name).unwrap_or_default(),
            theme,
        }
    }

    /// Resolve from the landing query string; `variant` takes precedence over `v`
    pub fn from_query(variant: Option<&str>, v: Option<&str>) -> Self {
        fn given(raw: Option<&str>) -> Option<&str> {
            raw.filter(|r| !r.trim().is_empty())
        }

        given(variant)
            .or(given(v))
            .map(Self::parse)
            .unwrap_or_default()
    }

    pub fn is_light(&self) -> bool {
        self.theme == Theme::Light
    }

    /// Canonical name reported to analytics (`"profit"`, `"profit-light"`)
    pub fn name(&self) -> String {
        match self.theme {
            Theme::Dark => self.base.as_str().to_string(),
            Theme::Light => format!("{}{}", self.base.as_str(), LIGHT_SUFFIX),
        }
    }

    pub fn hero(&self) -> &'static HeroContent {
        hero_content(self.base)
    }
}

impl fmt::Display for ContentVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Copy and accent colours for one landing hero
#[derive(Debug)]
pub struct HeroContent {
    pub title: &'static str,
    /// Headline text preceding the highlighted phrase
    pub headline_lead: &'static str,
    /// Highlighted phrase rendered with the accent gradient
    pub headline_highlight: &'static str,
    /// Headline text following the highlighted phrase
    pub headline_tail: &'static str,
    pub subhead: &'static str,
    /// Checklist rendered under the subhead (empty for most packs)
    pub bullets: &'static [&'static str],
    pub cta: &'static str,
    pub supporting: &'static str,
    /// Gradient stops (from, to) for the dark theme
    pub accent_dark: (&'static str, &'static str),
    /// Gradient stops (from, to) for the light theme
    pub accent_light: (&'static str, &'static str),
}

impl HeroContent {
    pub fn accent(&self, theme: Theme) -> (&'static str, &'static str) {
        match theme {
            Theme::Dark => self.accent_dark,
            Theme::Light => self.accent_light,
        }
    }
}

const TRUSTED_BY: &str = "⭐ Trusted by business owners across Australia";

static DEFAULT_HERO: HeroContent = HeroContent {
    title: "AI Time Leak Audit™",
    headline_lead: "Are you ready to stop wasting ",
    headline_highlight: "10–40 hours a week",
    headline_tail: " on tasks AI could handle?",
    subhead: "Take the free audit and reveal exactly where your business is bleeding time. Get your personalized Time Leak Score in under 2 minutes.",
    bullets: &[],
    cta: "Start the Time Leak Audit",
    supporting: "No login required. Instant Results.",
    accent_dark: ("#818cf8", "#c084fc"),
    accent_light: ("#4f46e5", "#9333ea"),
};

static PROFIT_HERO: HeroContent = HeroContent {
    title: "Profit Leak Locator™",
    headline_lead: "Are you ready to stop losing profit to ",
    headline_highlight: "tasks your team shouldn’t be doing?",
    headline_tail: "",
    subhead: "Take the free audit and pinpoint exactly where hidden costs are eating your margins. Get your personalized Profit Leak Score in under 2 minutes.",
    bullets: &[],
    cta: "Start the Profit Leak Locator",
    supporting: "See exactly how much money inefficient workflows are costing you every week.",
    accent_dark: ("#facc15", "#f59e0b"),
    accent_light: ("#ca8a04", "#d97706"),
};

static WAGE_HERO: HeroContent = HeroContent {
    title: "Wage Waste Detector™",
    headline_lead: "How much payroll are you wasting every month? ",
    headline_highlight: "Most businesses overpay staff 15–35% without realising it.",
    headline_tail: "",
    subhead: "Take the 2-minute Wage Waste Detector™ and uncover the tasks draining payroll — and what AI can replace immediately to reduce wage costs.",
    bullets: &[
        "Identify the tasks burning payroll unnecessarily",
        "See where your team is overspending time",
        "Find out what AI can automate immediately",
    ],
    cta: "Reveal My Wage Waste Score",
    supporting: TRUSTED_BY,
    accent_dark: ("#f87171", "#f43f5e"),
    accent_light: ("#dc2626", "#e11d48"),
};

static EFFICIENCY_HERO: HeroContent = HeroContent {
    title: "Team Efficiency Breakdown™",
    headline_lead: "Are you ready to uncover why your team is ",
    headline_highlight: "busy all day but output is still slow?",
    headline_tail: "",
    subhead: "Take the free audit and see which workflows are slowing your team down. Get your personalized Efficiency Score in under 2 minutes.",
    bullets: &[],
    cta: "Start the Efficiency Breakdown",
    supporting: "Reveal the tasks dragging productivity down — and what AI can handle instantly.",
    accent_dark: ("#34d399", "#14b8a6"),
    accent_light: ("#059669", "#0d9488"),
};

static CEO_HERO: HeroContent = HeroContent {
    title: "CEO Time Recovery Blueprint™",
    headline_lead: "Are you ready to reclaim 10–40 hours a week and ",
    headline_highlight: "finally get your time back as a CEO?",
    headline_tail: "",
    subhead: "Take the free audit and find out where your week is being drained by low-value tasks. Get your personalized Time Recovery Score in under 2 minutes.",
    bullets: &[],
    cta: "Start the Time Recovery Blueprint",
    supporting: "Stop being the bottleneck — get clarity on where AI can free up your time instantly.",
    accent_dark: ("#c084fc", "#8b5cf6"),
    accent_light: ("#9333ea", "#7c3aed"),
};

static FOUNDER_HERO: HeroContent = HeroContent {
    title: "Founder Workload Reset™",
    headline_lead: "Are you carrying your ",
    headline_highlight: "entire business on your back?",
    headline_tail: "",
    subhead: "Take the 2-minute Founder Workload Reset™ to uncover exactly what you should stop doing — and how AI can remove 10–20 hours from your week.",
    bullets: &[
        "Identify the tasks draining your time and energy",
        "Reveal what you can automate, delegate, or delete",
        "Get your Founder Load Score instantly (no email until results)",
    ],
    cta: "Calculate My Founder Load Score",
    supporting: TRUSTED_BY,
    accent_dark: ("#fb923c", "#f59e0b"),
    accent_light: ("#ea580c", "#d97706"),
};

static SCALE_HERO: HeroContent = HeroContent {
    title: "Scale-Without-Staff Score™",
    headline_lead: "Are you ready to scale faster without ",
    headline_highlight: "hiring more people or adding payroll?",
    headline_tail: "",
    subhead: "Take the free audit and discover where AI can help you scale without adding headcount. Get your personalized Scale Score in under 2 minutes.",
    bullets: &[],
    cta: "Start the Scale Score",
    supporting: "See how to grow your business without growing your staffing costs.",
    accent_dark: ("#60a5fa", "#06b6d4"),
    accent_light: ("#2563eb", "#0891b2"),
};

static SELF_RUNNING_HERO: HeroContent = HeroContent {
    title: "Self-Running Business Assessment™",
    headline_lead: "Are you ready to build a business that runs without ",
    headline_highlight: "you being involved in every task?",
    headline_tail: "",
    subhead: "Take the free audit and see what’s stopping your business from running without you. Get your personalized Self-Running Score in under 2 minutes.",
    bullets: &[],
    cta: "Start the Self-Running Assessment",
    supporting: "Find out what must change for your business to operate smoothly — even when you’re not there.",
    accent_dark: ("#818cf8", "#3b82f6"),
    accent_light: ("#4f46e5", "#2563eb"),
};

/// Content pack for a base variant
pub fn hero_content(base: BaseVariant) -> &'static HeroContent {
    match base {
        BaseVariant::Default => &DEFAULT_HERO,
        BaseVariant::Profit => &PROFIT_HERO,
        BaseVariant::Wage => &WAGE_HERO,
        BaseVariant::Efficiency => &EFFICIENCY_HERO,
        BaseVariant::Ceo => &CEO_HERO,
        BaseVariant::Founder => &FOUNDER_HERO,
        BaseVariant::Scale => &SCALE_HERO,
        BaseVariant::SelfRunning => &SELF_RUNNING_HERO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_variants() {
        for base in BaseVariant::ALL {
            let parsed = ContentVariant::parse(base.as_str());
            assert_eq!(parsed.base, *base);
            assert_eq!(parsed.theme, Theme::Dark);
        }
    }

    #[test]
    fn test_light_suffix_toggles_theme() {
        let parsed = ContentVariant::parse("founder-light");
        assert_eq!(parsed.base, BaseVariant::Founder);
        assert!(parsed.is_light());
        assert_eq!(parsed.name(), "founder-light");
    }

    #[test]
    fn test_unknown_variant_falls_back_to_default() {
        assert_eq!(ContentVariant::parse("bogus"), ContentVariant::default());

        // Unknown base keeps the requested theme
        let parsed = ContentVariant::parse("bogus-light");
        assert_eq!(parsed.base, BaseVariant::Default);
        assert_eq!(parsed.theme, Theme::Light);
    }

    #[test]
    fn test_from_query_prefers_variant_over_v() {
        let resolved = ContentVariant::from_query(Some("wage"), Some("ceo"));
        assert_eq!(resolved.base, BaseVariant::Wage);

        let resolved = ContentVariant::from_query(None, Some("ceo"));
        assert_eq!(resolved.base, BaseVariant::Ceo);

        let resolved = ContentVariant::from_query(Some("  "), None);
        assert_eq!(resolved, ContentVariant::default());

        let resolved = ContentVariant::from_query(Some(""), Some("ceo-light"));
        assert_eq!(resolved.name(), "ceo-light");
    }

    #[test]
    fn test_every_pack_has_copy() {
        for base in BaseVariant::ALL {
            let hero = hero_content(*base);
            assert!(!hero.title.is_empty());
            assert!(!hero.cta.is_empty());
            assert!(!hero.headline_highlight.is_empty());
        }
        assert_eq!(hero_content(BaseVariant::Wage).bullets.len(), 3);
    }
}
