use crate::assist::Assist;
use crate::templates;
use analyst_llm::prompts;
use analyst_protocol::Plan;

/// Produces the first candidate query for a plan.
#[derive(Debug, Clone, Default)]
pub struct QuerySynthesizer {
    assist: Assist,
}

impl QuerySynthesizer {
    #[must_use]
    pub const fn new(assist: Assist) -> Self {
        Self { assist }
    }

    /// A model draft when one is available and non-empty, else the intent's template.
    #[must_use]
    pub fn synthesize(&self, plan: &Plan, schema_hint: &str) -> String {
        if self.assist.is_available() {
            match serde_json::to_string(plan) {
                Ok(plan_json) => {
                    let draft = self.assist.draft(
                        "sql",
                        &prompts::sql_prompt(&plan_json, schema_hint),
                        accept_sql,
                    );
                    if let Some(sql) = draft {
                        log::debug!("Query drafted by model: {sql}");
                        return sql;
                    }
                }
                Err(err) => log::warn!("Could not serialize plan for drafting: {err}"),
            }
        }
        templates::render(plan)
    }

    /// Template text only; used as the last resort of the repair loop.
    #[must_use]
    pub fn template(&self, plan: &Plan) -> String {
        templates::render(plan)
    }
}

fn accept_sql(reply: &str) -> Option<String> {
    let mut sql = prompts::clean_sql_reply(reply);
    if sql.is_empty() {
        return None;
    }
    if !sql.ends_with(';') {
        sql.push(';');
    }
    Some(sql)
}
