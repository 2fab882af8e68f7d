//! # Analyst Pipeline
//!
//! The deterministic core of the hybrid analyst. A question flows through a fixed chain
//! of stages; each optional model call sits behind an [`Assist`] and falls back to a rule.
//!
//! ```text
//! Question
//!   └─> RouteClassifier ──> rag | sql | hybrid
//!         ├─> DocumentRetriever::retrieve      (rag, hybrid)
//!         ├─> Planner ──> Plan { intent, dates, category, metric, limit }
//!         ├─> RepairLoop                       (sql, hybrid)
//!         │     synthesize ─> execute ─> repair ─> ... ─> template   (≤ 3 attempts)
//!         ├─> shape::coerce(format_hint, rows) or facts::return_window (rag)
//!         └─> confidence::score + citations::collect
//!               └─> Answer
//! ```

mod agent;
mod assist;
pub mod citations;
pub mod confidence;
mod config;
mod error;
pub mod facts;
mod planner;
pub mod repair;
mod repair_loop;
mod router;
pub mod shape;
mod synthesizer;
pub mod templates;

pub use agent::{language_model, HybridAgent};
pub use assist::Assist;
pub use config::{AgentConfig, ExecutionConfig, PlannerConfig, RetrievalConfig, MAX_ATTEMPTS};
pub use error::{PipelineError, Result};
pub use planner::{extract_intent, Planner, CATEGORIES};
pub use repair::ErrorClass;
pub use repair_loop::{LoopOutcome, RepairLoop};
pub use router::{classify_by_rules, RouteClassifier};
pub use synthesizer::QuerySynthesizer;
