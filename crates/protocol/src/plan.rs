use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pipeline path selected for a question.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    /// Documents only; no query is synthesized or executed.
    Rag,
    /// Relational store only; no documents are retrieved.
    Sql,
    /// Documents feed constraints into a relational query.
    Hybrid,
}

impl Route {
    pub const ALL: [Self; 3] = [Self::Rag, Self::Sql, Self::Hybrid];

    /// Accepts exactly one of the three route literals, trimmed and case-insensitive.
    #[must_use]
    pub fn parse_label(raw: &str) -> Option<Self> {
        let label = raw.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|route| route.as_str() == label)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rag => "rag",
            Self::Sql => "sql",
            Self::Hybrid => "hybrid",
        }
    }

    #[must_use]
    pub const fn needs_retrieval(self) -> bool {
        matches!(self, Self::Rag | Self::Hybrid)
    }

    #[must_use]
    pub const fn needs_query(self) -> bool {
        matches!(self, Self::Sql | Self::Hybrid)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, JsonSchema)]
pub enum Intent {
    #[serde(rename = "top_category_qty")]
    TopCategoryByQuantity,
    #[serde(rename = "aov")]
    AverageOrderValue,
    #[serde(rename = "gross_margin_customer")]
    GrossMarginByCustomer,
    #[serde(rename = "gross_margin")]
    GrossMarginTotal,
    #[serde(rename = "top_products_revenue")]
    TopProductsByRevenue,
    #[serde(rename = "category_revenue")]
    CategoryRevenue,
    /// Answered from policy documents; has no query template.
    #[serde(rename = "return_policy")]
    ReturnPolicy,
    #[serde(rename = "unknown")]
    Unknown,
}

impl Intent {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TopCategoryByQuantity => "top_category_qty",
            Self::AverageOrderValue => "aov",
            Self::GrossMarginByCustomer => "gross_margin_customer",
            Self::GrossMarginTotal => "gross_margin",
            Self::TopProductsByRevenue => "top_products_revenue",
            Self::CategoryRevenue => "category_revenue",
            Self::ReturnPolicy => "return_policy",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Quantity,
    Revenue,
    Aov,
    GrossMargin,
}

/// Inclusive ISO-8601 (`YYYY-MM-DD`) date bounds.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

impl DateRange {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// January 1st through December 31st of `year`.
    #[must_use]
    pub fn full_year(year: u32) -> Self {
        Self::new(format!("{year}-01-01"), format!("{year}-12-31"))
    }
}

/// Where the plan's date range came from.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DateSource {
    Document,
    QuestionYear,
    /// Nothing matched; the configured fallback year was used.
    Default,
}

/// Structured intent and constraints extracted once per question.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct Plan {
    pub intent: Intent,
    pub dates: Option<DateRange>,
    pub date_source: DateSource,
    pub category: Option<String>,
    pub metric: Metric,
    pub limit: u32,
}

impl Plan {
    /// A plan with no recognised intent or constraints.
    #[must_use]
    pub const fn unknown() -> Self {
        Self {
            intent: Intent::Unknown,
            dates: None,
            date_source: DateSource::Default,
            category: None,
            metric: Metric::Quantity,
            limit: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_labels_are_strict() {
        assert_eq!(Route::parse_label(" SQL\n"), Some(Route::Sql));
        assert_eq!(Route::parse_label("Hybrid"), Some(Route::Hybrid));
        assert_eq!(Route::parse_label("rag."), None);
        assert_eq!(Route::parse_label("route: rag"), None);
        assert_eq!(Route::parse_label(""), None);
    }

    #[test]
    fn intent_wire_names_match_as_str() {
        for intent in [
            Intent::TopCategoryByQuantity,
            Intent::AverageOrderValue,
            Intent::GrossMarginByCustomer,
            Intent::GrossMarginTotal,
            Intent::TopProductsByRevenue,
            Intent::CategoryRevenue,
            Intent::ReturnPolicy,
            Intent::Unknown,
        ] {
            let wire = serde_json::to_value(intent).unwrap();
            assert_eq!(wire, serde_json::Value::String(intent.as_str().to_string()));
        }
    }

    #[test]
    fn full_year_spans_calendar() {
        let range = DateRange::full_year(1998);
        assert_eq!(range.start, "1998-01-01");
        assert_eq!(range.end, "1998-12-31");
    }
}
