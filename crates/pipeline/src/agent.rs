use crate::assist::Assist;
use crate::citations;
use crate::confidence::{self, Signals};
use crate::config::AgentConfig;
use crate::error::Result;
use crate::facts::{self, DocumentFact};
use crate::planner::Planner;
use crate::repair_loop::{LoopOutcome, RepairLoop};
use crate::router::RouteClassifier;
use crate::shape::{self, FormatHint};
use crate::synthesizer::QuerySynthesizer;
use analyst_llm::{prompts, LanguageModel, LlmConfig, OllamaClient};
use analyst_protocol::{Answer, DocChunk, Intent, Plan, Question, Route, Row, Trace};
use analyst_sql_store::{schema_hint, QueryExecutor};
use analyst_vector_store::DocumentRetriever;
use serde_json::Value;
use std::sync::Arc;

/// Answers one question at a time from documents, the relational store, or both.
///
/// All state is fixed at construction; `run` borrows it read-only, so one agent can be
/// shared across threads.
pub struct HybridAgent {
    retriever: Arc<dyn DocumentRetriever>,
    executor: Arc<dyn QueryExecutor>,
    classifier: RouteClassifier,
    planner: Planner,
    synthesizer: QuerySynthesizer,
    explainer: Assist,
    config: AgentConfig,
    schema_hint: String,
}

impl HybridAgent {
    /// Builds the agent and caches the schema description.
    ///
    /// `model` is consulted only for the stages enabled in `config.llm`.
    pub fn new(
        retriever: Arc<dyn DocumentRetriever>,
        executor: Arc<dyn QueryExecutor>,
        config: AgentConfig,
        model: Option<Arc<dyn LanguageModel>>,
    ) -> Result<Self> {
        let tables = executor.table_names()?;
        let schema_hint = schema_hint(&tables);
        log::info!("Schema: {schema_hint}");

        let llm = &config.llm;
        let classifier = RouteClassifier::new(Assist::when(llm.route_enabled(), model.as_ref()));
        let synthesizer = QuerySynthesizer::new(Assist::when(llm.sql_enabled(), model.as_ref()));
        let explainer = Assist::when(llm.explain_enabled(), model.as_ref());
        if let Some(model) = &model {
            log::info!(
                "Model {} assists: route={} sql={} explain={}",
                model.name(),
                llm.route_enabled(),
                llm.sql_enabled(),
                llm.explain_enabled()
            );
        }

        Ok(Self {
            retriever,
            executor,
            classifier,
            planner: Planner::new(config.planner.clone()),
            synthesizer,
            explainer,
            config,
            schema_hint,
        })
    }

    #[must_use]
    pub fn schema_hint(&self) -> &str {
        &self.schema_hint
    }

    #[must_use]
    pub const fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Runs the whole pipeline. Every failure is absorbed into the answer.
    #[must_use]
    pub fn run(&self, question: &Question) -> Answer {
        let text = question.text.as_str();
        let route = self.classifier.classify(text);
        log::info!("[{}] route={route}", question.id);

        let docs = if route.needs_retrieval() {
            self.retriever.retrieve(text, self.config.retrieval.k)
        } else {
            Vec::new()
        };
        let plan = self.planner.plan(text, &docs);

        let outcome = if route.needs_query() {
            RepairLoop::new(
                &self.synthesizer,
                self.executor.as_ref(),
                self.config.execution.attempt_budget(),
            )
            .run(&plan, &self.schema_hint)
        } else {
            LoopOutcome::default()
        };

        let (final_answer, rows, fallback_explanation) = if route == Route::Rag {
            self.answer_from_documents(question, &plan, &docs)
        } else {
            answer_from_rows(question, &plan, route, &outcome)
        };

        let doc_scores: Vec<f32> = docs.iter().map(|d| d.score).collect();
        let confidence = confidence::score(&Signals {
            route,
            executed: outcome.succeeded(),
            answered: !final_answer.is_null(),
            doc_scores: &doc_scores,
        });
        let citations = citations::collect(&outcome.sql, &docs);
        let explanation = self.explain(question, &rows, &docs, fallback_explanation);

        log::info!(
            "[{}] intent={} attempts={} confidence={confidence:.2}",
            question.id,
            plan.intent,
            outcome.attempts.len()
        );

        Answer {
            id: question.id.clone(),
            final_answer,
            sql: outcome.sql,
            confidence,
            explanation,
            citations,
            trace: Trace {
                route,
                plan,
                attempts: outcome.attempts,
            },
        }
    }

    fn answer_from_documents(
        &self,
        question: &Question,
        plan: &Plan,
        docs: &[DocChunk],
    ) -> (Value, Vec<Row>, String) {
        let fact = (plan.intent == Intent::ReturnPolicy)
            .then(|| facts::return_window(&question.text, plan.category.as_deref(), docs))
            .flatten();
        let Some(fact) = fact else {
            log::debug!("[{}] no document fact for intent {}", question.id, plan.intent);
            return (
                Value::Null,
                Vec::new(),
                format!(
                    "No answer found in {} retrieved chunk(s); answer derived using rag approach.",
                    docs.len()
                ),
            );
        };

        let rows = vec![fact.to_row()];
        let answer = shape_fact(&question.format_hint, &fact, &rows);
        (answer, rows, describe_fact(&fact))
    }

    /// Model-drafted explanation when the assist is on, else `fallback`.
    fn explain(
        &self,
        question: &Question,
        rows: &[Row],
        docs: &[DocChunk],
        fallback: String,
    ) -> String {
        if !self.explainer.is_available() {
            return fallback;
        }
        let Ok(rows_json) = serde_json::to_string(rows) else {
            return fallback;
        };
        let chunk_ids: Vec<String> = docs.iter().map(|d| d.chunk_id.clone()).collect();
        let request = prompts::explain_prompt(
            &question.text,
            &question.format_hint,
            &rows_json,
            &chunk_ids,
        );
        self.explainer
            .draft("explain", &request, |reply| {
                let reply = reply.trim();
                (!reply.is_empty()).then(|| reply.to_string())
            })
            .unwrap_or(fallback)
    }
}

/// The configured model, or `None` when no stage may use one.
pub fn language_model(config: &LlmConfig) -> Result<Option<Arc<dyn LanguageModel>>> {
    if !config.enabled {
        return Ok(None);
    }
    let client: Arc<dyn LanguageModel> = Arc::new(OllamaClient::new(config)?);
    Ok(Some(client))
}

/// A bare figure for hints the grammar does not cover; shaped otherwise.
fn shape_fact(format_hint: &str, fact: &DocumentFact, rows: &[Row]) -> Value {
    match FormatHint::parse(format_hint) {
        FormatHint::Raw => Value::from(fact.days),
        hint => shape::coerce_with(&hint, rows),
    }
}

fn describe_fact(fact: &DocumentFact) -> String {
    format!(
        "Return window of {} days taken from {} (\"{}\").",
        fact.days, fact.chunk_id, fact.line
    )
}

fn answer_from_rows(
    question: &Question,
    plan: &Plan,
    route: Route,
    outcome: &LoopOutcome,
) -> (Value, Vec<Row>, String) {
    let Some(result) = outcome.result.as_ref().filter(|_| outcome.succeeded()) else {
        let explanation = match outcome.attempts.last() {
            None => format!(
                "No query for intent {}; answer derived using {route} approach.",
                plan.intent
            ),
            Some(last) => format!(
                "No rows after {} attempt(s); last error: {}.",
                outcome.attempts.len(),
                last.result.error.as_deref().unwrap_or("query returned no rows")
            ),
        };
        return (Value::Null, Vec::new(), explanation);
    };

    let answer = shape::coerce(&question.format_hint, &result.rows);
    let explanation = format!(
        "Answer extracted from {} row(s) of attempt {} matching format {}.",
        result.rows.len(),
        outcome.attempts.len(),
        if question.format_hint.is_empty() {
            "raw"
        } else {
            question.format_hint.as_str()
        }
    );
    (answer, result.rows.clone(), explanation)
}
