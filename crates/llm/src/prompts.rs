//! Prompt builders for the three drafting stages.
//!
//! Replies are validated by the caller; these helpers only shape the request and strip
//! formatting noise from the reply.

use crate::model::CompletionRequest;

const ROUTE_SYSTEM: &str = "Classify the question type to determine which pipeline to use.\n\
- 'rag': questions about policies, definitions, or information found only in documents\n\
- 'sql': questions answered by database queries alone\n\
- 'hybrid': questions that need document context (dates, definitions) and a database query\n\
Reply with exactly one word: rag, sql, or hybrid.";

const SQL_SYSTEM: &str = "Write one SQLite query for the planner's intent and constraints.\n\
- Use the table names Orders, \"Order Details\", Products, Categories, Customers\n\
- Join on OrderID, ProductID, CategoryID, CustomerID\n\
- Filter dates with o.OrderDate BETWEEN 'start' AND 'end'\n\
- Revenue is UnitPrice * Quantity * (1 - Discount); cost is 70% of UnitPrice\n\
Reply with the query only, ending with a semicolon.";

const EXPLAIN_SYSTEM: &str = "Explain in one or two sentences how the answer was derived \
from the query rows and document chunks. Do not restate the rows.";

#[must_use]
pub fn route_prompt(question: &str) -> CompletionRequest {
    CompletionRequest::new(format!("Question: {question}\nRoute:")).with_system(ROUTE_SYSTEM)
}

#[must_use]
pub fn sql_prompt(plan_json: &str, schema_hint: &str) -> CompletionRequest {
    CompletionRequest::new(format!(
        "Schema: {schema_hint}\nPlanner: {plan_json}\nSQL:"
    ))
    .with_system(SQL_SYSTEM)
}

#[must_use]
pub fn explain_prompt(
    question: &str,
    format_hint: &str,
    rows_json: &str,
    chunk_ids: &[String],
) -> CompletionRequest {
    CompletionRequest::new(format!(
        "Question: {question}\nFormat: {format_hint}\nRows: {rows_json}\nDocument chunks: [{}]\nExplanation:",
        chunk_ids.join(", ")
    ))
    .with_system(EXPLAIN_SYSTEM)
}

/// Strips Markdown code fences and a leading `sql` language tag.
#[must_use]
pub fn clean_sql_reply(reply: &str) -> String {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed.to_string();
    };
    let rest = rest
        .strip_prefix("sqlite")
        .or_else(|| rest.strip_prefix("sql"))
        .unwrap_or(rest);
    let body = rest.trim_end().strip_suffix("```").unwrap_or(rest);
    body.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn fences_are_removed() {
        assert_eq!(clean_sql_reply("```sql\nSELECT 1;\n```"), "SELECT 1;");
        assert_eq!(clean_sql_reply("```\nSELECT 2\n```\n"), "SELECT 2");
        assert_eq!(clean_sql_reply("  SELECT 3;  "), "SELECT 3;");
    }

    #[test]
    fn prompts_carry_inputs() {
        let req = sql_prompt(r#"{"intent":"aov"}"#, "Available tables: Orders");
        assert!(req.user.contains(r#"{"intent":"aov"}"#));
        assert!(req.user.contains("Available tables: Orders"));
        assert!(req.system.is_some());

        let req = explain_prompt("q?", "int", "[]", &["a::chunk0".to_string()]);
        assert!(req.user.contains("[a::chunk0]"));
    }
}
