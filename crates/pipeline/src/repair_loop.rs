//! Bounded execute-and-repair cycle.
//!
//! ```text
//! attempt 1        synthesized query (model draft or template)
//! attempt 2..n-1   repair(previous query, previous error)
//! attempt n        template text for the plan (n > 1)
//! ```
//!
//! The loop stops at the first attempt that returns rows. An empty candidate stops it
//! without being executed or logged.

use crate::repair::repair;
use crate::synthesizer::QuerySynthesizer;
use analyst_protocol::{Attempt, ExecutionResult, Plan};
use analyst_sql_store::QueryExecutor;

/// Everything the loop tried, in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoopOutcome {
    /// Last query that was executed, or empty when none was.
    pub sql: String,
    pub result: Option<ExecutionResult>,
    pub attempts: Vec<Attempt>,
}

impl LoopOutcome {
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.result.as_ref().is_some_and(ExecutionResult::has_rows)
    }
}

pub struct RepairLoop<'a> {
    synthesizer: &'a QuerySynthesizer,
    executor: &'a dyn QueryExecutor,
    budget: u32,
}

impl<'a> RepairLoop<'a> {
    #[must_use]
    pub fn new(
        synthesizer: &'a QuerySynthesizer,
        executor: &'a dyn QueryExecutor,
        budget: u32,
    ) -> Self {
        Self {
            synthesizer,
            executor,
            budget: budget.max(1),
        }
    }

    #[must_use]
    pub fn run(&self, plan: &Plan, schema_hint: &str) -> LoopOutcome {
        let mut outcome = LoopOutcome::default();

        for index in 1..=self.budget {
            let candidate = match outcome.attempts.last() {
                None => self.synthesizer.synthesize(plan, schema_hint),
                Some(_) if index == self.budget => self.synthesizer.template(plan),
                Some(previous) => repair(&previous.sql, previous.result.error.as_deref()),
            };
            if candidate.trim().is_empty() {
                log::debug!("Attempt {index}: no query for intent {}", plan.intent);
                break;
            }

            let result = self.executor.execute(&candidate);
            let success = result.has_rows();
            log::debug!(
                "Attempt {index}: success={success} rows={} error={:?}",
                result.rows.len(),
                result.error
            );
            outcome.attempts.push(Attempt {
                sql: candidate.clone(),
                result: result.clone(),
                attempt_index: index,
            });
            outcome.sql = candidate;
            outcome.result = Some(result);
            if success {
                break;
            }
        }

        if !outcome.attempts.is_empty() && !outcome.succeeded() {
            log::warn!(
                "No rows after {} attempt(s) for intent {}",
                outcome.attempts.len(),
                plan.intent
            );
        }
        outcome
    }
}
