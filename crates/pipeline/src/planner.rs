//! Constraint extraction: intent, date range, category, metric and limit.
//!
//! Everything is phrase matching over the lowercased question and the retrieved chunk
//! text. Intent rules are ordered because their patterns overlap ("gross margin" alone
//! versus "gross margin" plus "customer"); the first matching rule wins.

use crate::config::PlannerConfig;
use analyst_protocol::{DateRange, DateSource, DocChunk, Intent, Metric, Plan};
use once_cell::sync::Lazy;
use regex::Regex;

/// Closed set of product categories in the dataset.
pub const CATEGORIES: &[&str] = &[
    "Beverages",
    "Condiments",
    "Confections",
    "Dairy Products",
    "Grains/Cereals",
    "Meat/Poultry",
    "Produce",
    "Seafood",
];

static DATES_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Dates:\s*(\d{4}-\d{2}-\d{2})\s+to\s+(\d{4}-\d{2}-\d{2})").expect("valid regex")
});
static START_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"start_date:\s*(\d{4}-\d{2}-\d{2})").expect("valid regex"));
static END_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"end_date:\s*(\d{4}-\d{2}-\d{2})").expect("valid regex"));
static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]{4,}").expect("valid regex"));

struct IntentRule {
    intent: Intent,
    matches: fn(&str) -> bool,
}

fn any_of(q: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| q.contains(n))
}

const INTENT_RULES: &[IntentRule] = &[
    IntentRule {
        intent: Intent::ReturnPolicy,
        matches: |q| any_of(q, &["return window", "return days"]),
    },
    IntentRule {
        intent: Intent::TopCategoryByQuantity,
        matches: |q| {
            any_of(q, &["top", "highest", "best"])
                && q.contains("category")
                && any_of(q, &["quantity", "qty", "sold"])
        },
    },
    IntentRule {
        intent: Intent::AverageOrderValue,
        matches: |q| any_of(q, &["aov", "average order value"]),
    },
    IntentRule {
        intent: Intent::GrossMarginByCustomer,
        matches: |q| any_of(q, &["gross margin", "margin"]) && q.contains("customer"),
    },
    IntentRule {
        intent: Intent::GrossMarginTotal,
        matches: |q| q.contains("gross margin"),
    },
    IntentRule {
        intent: Intent::TopProductsByRevenue,
        matches: |q| q.contains("top") && q.contains("product") && q.contains("revenue"),
    },
    IntentRule {
        intent: Intent::CategoryRevenue,
        matches: |q| q.contains("revenue") && q.contains("category"),
    },
    IntentRule {
        intent: Intent::GrossMarginByCustomer,
        matches: |q| any_of(q, &["best customer", "top customer"]),
    },
];

/// Builds the single [`Plan`] for a question.
#[derive(Debug, Clone, Default)]
pub struct Planner {
    config: PlannerConfig,
}

impl Planner {
    #[must_use]
    pub const fn new(config: PlannerConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn plan(&self, question: &str, docs: &[DocChunk]) -> Plan {
        let q = question.to_lowercase();
        let (dates, date_source) = self.extract_dates(question, docs);
        if date_source == DateSource::Default {
            log::warn!(
                "No date constraint found, using full year {}: '{}'",
                self.config.default_year,
                question
            );
        }

        let plan = Plan {
            intent: extract_intent(&q),
            dates: Some(dates),
            date_source,
            category: extract_category(&q, docs),
            metric: extract_metric(&q),
            limit: extract_limit(&q),
        };
        log::debug!(
            "Plan: intent={} category={:?} metric={:?} limit={} dates={:?} ({:?})",
            plan.intent,
            plan.category,
            plan.metric,
            plan.limit,
            plan.dates,
            plan.date_source
        );
        plan
    }

    fn extract_dates(&self, question: &str, docs: &[DocChunk]) -> (DateRange, DateSource) {
        if let Some(range) = docs
            .iter()
            .find_map(|doc| self.campaign_dates(&doc.content))
        {
            return (range, DateSource::Document);
        }

        let year = DIGIT_RUN
            .find_iter(question)
            .flat_map(|run| four_digit_windows(run.as_str()))
            .find(|year| (self.config.min_year..=self.config.max_year).contains(year));
        if let Some(year) = year {
            return (DateRange::full_year(year), DateSource::QuestionYear);
        }

        (
            DateRange::full_year(self.config.default_year),
            DateSource::Default,
        )
    }

    /// Dates of a known campaign: the `Dates: X to Y` line wins over `start_date`/`end_date`.
    fn campaign_dates(&self, content: &str) -> Option<DateRange> {
        let lowered = content.to_lowercase();
        if !self
            .config
            .campaigns
            .iter()
            .any(|campaign| lowered.contains(&campaign.to_lowercase()))
        {
            return None;
        }

        if let Some(caps) = DATES_LINE.captures(content) {
            return Some(DateRange::new(&caps[1], &caps[2]));
        }
        let start = START_DATE.captures(content)?;
        let end = END_DATE.captures(content)?;
        Some(DateRange::new(&start[1], &end[1]))
    }
}

#[must_use]
pub fn extract_intent(lowered: &str) -> Intent {
    INTENT_RULES
        .iter()
        .find(|rule| (rule.matches)(lowered))
        .map_or(Intent::Unknown, |rule| rule.intent)
}

/// First category named in the question, else in any retrieved chunk.
fn extract_category(lowered: &str, docs: &[DocChunk]) -> Option<String> {
    let find_in = |text: &str| {
        CATEGORIES
            .iter()
            .find(|cat| text.contains(&cat.to_lowercase()))
            .map(|cat| (*cat).to_string())
    };
    find_in(lowered).or_else(|| {
        docs.iter()
            .find_map(|doc| find_in(&doc.content.to_lowercase()))
    })
}

/// Every four-digit number inside a run of ASCII digits, left to right.
fn four_digit_windows(run: &str) -> impl Iterator<Item = u32> + '_ {
    (0..=run.len().saturating_sub(4)).filter_map(move |start| run.get(start..start + 4)?.parse().ok())
}

fn extract_metric(lowered: &str) -> Metric {
    if lowered.contains("revenue") {
        Metric::Revenue
    } else if any_of(lowered, &["aov", "average order value"]) {
        Metric::Aov
    } else if any_of(lowered, &["margin", "gross"]) {
        Metric::GrossMargin
    } else {
        Metric::Quantity
    }
}

fn extract_limit(lowered: &str) -> u32 {
    if any_of(lowered, &["top 3", "top3"]) {
        3
    } else {
        1
    }
}
