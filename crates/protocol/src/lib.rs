use anyhow::Result;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

mod plan;

pub use plan::{DateRange, DateSource, Intent, Metric, Plan, Route};

/// A result row: column name to value, in the query's column order.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// One input line of a batch.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
pub struct Question {
    pub id: String,
    #[serde(rename = "question", alias = "text")]
    pub text: String,
    /// Shape grammar for the expected answer (`int`, `float`, `{a:str}`, `list[{..}]`).
    #[serde(default)]
    pub format_hint: String,
}

impl Question {
    pub fn new(id: impl Into<String>, text: impl Into<String>, format_hint: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            format_hint: format_hint.into(),
        }
    }
}

/// A ranked document fragment returned by the retriever.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct DocChunk {
    pub chunk_id: String,
    pub source: String,
    pub content: String,
    /// Similarity in `[0, 1]`.
    pub score: f32,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default, JsonSchema)]
pub struct ExecutionResult {
    pub success: bool,
    pub error: Option<String>,
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl ExecutionResult {
    #[must_use]
    pub const fn ok(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self {
            success: true,
            error: None,
            columns,
            rows,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Succeeded and returned at least one row.
    #[must_use]
    pub fn has_rows(&self) -> bool {
        self.success && !self.rows.is_empty()
    }
}

/// One execution of a candidate query.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct Attempt {
    pub sql: String,
    pub result: ExecutionResult,
    /// 1-based position in the attempt log.
    pub attempt_index: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct Trace {
    pub route: Route,
    pub plan: Plan,
    #[serde(default)]
    pub attempts: Vec<Attempt>,
}

/// One output line of a batch.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct Answer {
    pub id: String,
    pub final_answer: serde_json::Value,
    pub sql: String,
    pub confidence: f64,
    pub explanation: String,
    pub citations: Vec<String>,
    pub trace: Trace,
}

impl Answer {
    /// A null answer for a question the pipeline could not run at all.
    #[must_use]
    pub fn unanswered(id: impl Into<String>, explanation: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            final_answer: serde_json::Value::Null,
            sql: String::new(),
            confidence: 0.0,
            explanation: explanation.into(),
            citations: Vec::new(),
            trace: Trace {
                route: Route::Hybrid,
                plan: Plan::unknown(),
                attempts: Vec::new(),
            },
        }
    }
}

pub fn serialize_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn question_reads_wire_and_alias_names() {
        let wire: Question = serde_json::from_str(
            r#"{"id":"q1","question":"What is the AOV?","format_hint":"float"}"#,
        )
        .unwrap();
        let alias: Question =
            serde_json::from_str(r#"{"id":"q1","text":"What is the AOV?"}"#).unwrap();

        assert_eq!(wire.text, "What is the AOV?");
        assert_eq!(wire.format_hint, "float");
        assert_eq!(alias.text, wire.text);
        assert_eq!(alias.format_hint, "");
    }

    #[test]
    fn rows_keep_column_order() {
        let row: Row = serde_json::from_str(r#"{"zeta":1,"alpha":2}"#).unwrap();
        let keys: Vec<&str> = row.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
    }

    #[test]
    fn has_rows_requires_success() {
        assert!(!ExecutionResult::failed("no such table: Foo").has_rows());
        assert!(!ExecutionResult::ok(vec!["a".into()], Vec::new()).has_rows());

        let mut row = Row::new();
        row.insert("a".into(), serde_json::json!(1));
        assert!(ExecutionResult::ok(vec!["a".into()], vec![row]).has_rows());
    }
}
