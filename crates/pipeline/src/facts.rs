//! Facts read straight from retrieved documents, for questions no query can answer.

use analyst_protocol::{DocChunk, Row};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// Column name of the single-column row built from a return-window fact.
pub const RETURN_DAYS_COLUMN: &str = "return_days";

static DAYS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)(\d+)[\s-]*days?\b").expect("valid regex"));

/// A figure found in a document line, with the chunk it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentFact {
    pub days: u32,
    pub chunk_id: String,
    pub line: String,
}

impl DocumentFact {
    /// The fact as a result row so it can go through the same shaping as query rows.
    #[must_use]
    pub fn to_row(&self) -> Row {
        let mut row = Row::new();
        row.insert(RETURN_DAYS_COLUMN.to_string(), Value::from(self.days));
        row
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Condition {
    Unopened,
    Opened,
}

impl Condition {
    fn of(lowered_question: &str) -> Option<Self> {
        if lowered_question.contains("unopened") {
            Some(Self::Unopened)
        } else if lowered_question.contains("opened") {
            Some(Self::Opened)
        } else {
            None
        }
    }

    fn matches(self, lowered_line: &str) -> bool {
        match self {
            Self::Unopened => lowered_line.contains("unopened"),
            Self::Opened => lowered_line.contains("opened") && !lowered_line.contains("unopened"),
        }
    }
}

/// Finds the return window in days for `category`.
///
/// Lines are ranked: category plus the question's condition word, then category alone,
/// then the condition word alone, then any line with a day count. Within a rank the first
/// line in retrieval order wins.
#[must_use]
pub fn return_window(question: &str, category: Option<&str>, docs: &[DocChunk]) -> Option<DocumentFact> {
    let condition = Condition::of(&question.to_lowercase());
    let category = category.map(str::to_lowercase);

    let mut best: Option<(u8, DocumentFact)> = None;
    for doc in docs {
        for line in doc.content.lines() {
            let Some((days, on_condition)) = figure(line, condition) else {
                continue;
            };
            let has_category = category
                .as_deref()
                .is_some_and(|c| line.to_lowercase().contains(c));
            let rank = match (has_category, on_condition) {
                (true, true) => 0,
                (true, false) => 1,
                (false, true) => 2,
                (false, false) => 3,
            };
            if best.as_ref().map_or(true, |(current, _)| rank < *current) {
                best = Some((
                    rank,
                    DocumentFact {
                        days,
                        chunk_id: doc.chunk_id.clone(),
                        line: line.trim().to_string(),
                    },
                ));
            }
            if rank == 0 {
                return best.map(|(_, fact)| fact);
            }
        }
    }
    best.map(|(_, fact)| fact)
}

/// The day count of the first clause naming `condition`, else the first on the line.
///
/// The flag tells whether the figure came from a clause matching the condition.
fn figure(line: &str, condition: Option<Condition>) -> Option<(u32, bool)> {
    if let Some(condition) = condition {
        let on_condition = line
            .split([',', ';'])
            .filter(|clause| condition.matches(&clause.to_lowercase()))
            .find_map(first_days);
        if let Some(days) = on_condition {
            return Some((days, true));
        }
    }
    first_days(line).map(|days| (days, false))
}

fn first_days(text: &str) -> Option<u32> {
    DAYS.captures_iter(text)
        .find_map(|caps| caps[1].parse::<u32>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn policy() -> Vec<DocChunk> {
        vec![
            DocChunk {
                chunk_id: "product_policy::chunk0".into(),
                source: "product_policy".into(),
                content: "# Returns & Policy\n- Perishables (Produce, Seafood, Dairy): 3-7 days.".into(),
                score: 0.4,
            },
            DocChunk {
                chunk_id: "product_policy::chunk1".into(),
                source: "product_policy".into(),
                content: "- Beverages opened: 7 days\n- Beverages unopened: 14 days; opened: no returns.\n- Non-perishables: 30 days.".into(),
                score: 0.6,
            },
        ]
    }

    #[test]
    fn prefers_category_and_condition() {
        let fact = return_window(
            "What is the return window for unopened beverages?",
            Some("Beverages"),
            &policy(),
        )
        .unwrap();
        assert_eq!(fact.days, 14);
        assert_eq!(fact.chunk_id, "product_policy::chunk1");
    }

    #[test]
    fn opened_does_not_match_unopened_lines() {
        let fact = return_window("Return days for opened beverages?", Some("Beverages"), &policy())
            .unwrap();
        assert_eq!(fact.days, 7);
        assert_eq!(fact.line, "- Beverages opened: 7 days");
    }

    #[test]
    fn falls_back_to_category_then_any_line() {
        let fact = return_window("Return window for Beverages?", Some("Beverages"), &policy()).unwrap();
        assert_eq!(fact.days, 7);

        let fact = return_window("Return window?", None, &policy()).unwrap();
        assert_eq!(fact.days, 7);
        assert_eq!(fact.chunk_id, "product_policy::chunk0");
    }

    fn chunk(content: &str) -> Vec<DocChunk> {
        vec![DocChunk {
            chunk_id: "returns::chunk0".into(),
            source: "returns".into(),
            content: content.into(),
            score: 0.5,
        }]
    }

    #[test]
    fn condition_picks_its_figure_on_a_shared_line() {
        let docs = chunk("- Beverages: opened 7 days, unopened 14 days.");
        let unopened = return_window(
            "What is the return window for unopened beverages?",
            Some("Beverages"),
            &docs,
        )
        .unwrap();
        assert_eq!(unopened.days, 14);

        let opened = return_window("Return days for opened beverages?", Some("Beverages"), &docs)
            .unwrap();
        assert_eq!(opened.days, 7);
    }

    #[test]
    fn condition_line_beats_unrelated_line_without_category() {
        let docs = chunk("- Perishables: 3-7 days.\n- Unopened items: 14 days.");
        let fact = return_window(
            "What is the return window for unopened beverages?",
            Some("Beverages"),
            &docs,
        )
        .unwrap();
        assert_eq!(fact.days, 14);
        assert_eq!(fact.line, "- Unopened items: 14 days.");
    }

    #[test]
    fn category_line_outranks_condition_only_line() {
        let docs = chunk("- Unopened items: 30 days.\n- Beverages: 14 days.");
        let fact = return_window("Return window for unopened beverages?", Some("Beverages"), &docs)
            .unwrap();
        assert_eq!(fact.days, 14);
    }

    #[test]
    fn hyphenated_day_counts() {
        let docs = chunk("Unopened beverages have a 14-day return window.");
        let fact = return_window("Return window for unopened beverages?", Some("Beverages"), &docs)
            .unwrap();
        assert_eq!(fact.days, 14);
    }

    #[test]
    fn nothing_without_day_counts() {
        let docs = vec![DocChunk {
            chunk_id: "kpi::chunk0".into(),
            source: "kpi".into(),
            content: "AOV = revenue / orders".into(),
            score: 0.2,
        }];
        assert_eq!(return_window("return window?", None, &docs), None);
    }

    #[test]
    fn fact_row_has_single_column() {
        let fact = DocumentFact {
            days: 14,
            chunk_id: "p::chunk1".into(),
            line: String::new(),
        };
        assert_eq!(
            serde_json::to_value(fact.to_row()).unwrap(),
            serde_json::json!({"return_days": 14})
        );
    }
}
