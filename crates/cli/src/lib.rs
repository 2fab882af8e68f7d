//! Command-line front end: `batch`, `ask` and `schema`.
//!
//! Stdout carries only results (answer JSON, the schema, or the batch summary line);
//! logs go to stderr.

use analyst_pipeline::{language_model, AgentConfig, HybridAgent};
use analyst_protocol::{Answer, Question};
use analyst_sql_store::SqliteExecutor;
use analyst_vector_store::{DocCorpus, TfIdfRetriever};
use anyhow::{Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

mod batch;

pub use batch::{read_questions, run_batch, write_answers};

#[derive(Parser)]
#[command(name = "analyst")]
#[command(about = "Answer analytical questions from documents and a relational store", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer every question of a JSONL file
    Batch(BatchArgs),

    /// Answer a single question and print the answer object
    Ask(AskArgs),

    /// Print the JSON Schema of an answer line
    Schema,
}

#[derive(Args)]
struct AgentArgs {
    /// SQLite database (opened read-only)
    #[arg(long, default_value = "data/northwind.sqlite")]
    db: PathBuf,

    /// Directory of markdown documents
    #[arg(long, default_value = "docs")]
    docs: PathBuf,

    /// TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable the local language model for drafting stages
    #[arg(long)]
    llm: bool,
}

#[derive(Args)]
struct BatchArgs {
    /// Input questions, one JSON object per line
    #[arg(long = "batch")]
    input: PathBuf,

    /// Output answers, one JSON object per line
    #[arg(long)]
    out: PathBuf,

    /// Questions answered concurrently
    #[arg(short, long, default_value_t = 1)]
    jobs: usize,

    #[command(flatten)]
    agent: AgentArgs,
}

#[derive(Args)]
struct AskArgs {
    /// Question text
    question: String,

    /// Expected answer shape (int, float, {a:str}, list[{..}])
    #[arg(long, default_value = "")]
    format_hint: String,

    /// Id echoed in the answer
    #[arg(long, default_value = "ask")]
    id: String,

    #[command(flatten)]
    agent: AgentArgs,
}

pub fn main_entry() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    // HTTP client internals are noisy at debug.
    if !cli.verbose {
        builder.filter_module("reqwest", log::LevelFilter::Warn);
    }
    builder.target(env_logger::Target::Stderr).init();

    match cli.command {
        Commands::Batch(args) => {
            let agent = Arc::new(build_agent(&args.agent)?);
            let questions = read_questions(&args.input)?;
            let answers = run_batch(&agent, questions, args.jobs)?;
            write_answers(&args.out, &answers)?;
            println!("Wrote {} outputs to {}", answers.len(), args.out.display());
        }
        Commands::Ask(args) => {
            let agent = build_agent(&args.agent)?;
            let answer = agent.run(&Question::new(args.id, args.question, args.format_hint));
            println!("{}", serde_json::to_string_pretty(&answer)?);
        }
        Commands::Schema => {
            let schema = schemars::schema_for!(Answer);
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
    }
    Ok(())
}

fn load_config(args: &AgentArgs) -> Result<AgentConfig> {
    let mut config = match &args.config {
        Some(path) => AgentConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => AgentConfig::default(),
    };
    if args.llm {
        config.llm.enabled = true;
    }
    config.llm = config.llm.with_env_overrides();
    Ok(config)
}

/// Opens both stores; either failing aborts the run.
fn build_agent(args: &AgentArgs) -> Result<HybridAgent> {
    let config = load_config(args)?;

    let executor = SqliteExecutor::open(&args.db, config.execution.row_limit)
        .with_context(|| format!("Failed to open database {}", args.db.display()))?;
    let corpus = DocCorpus::load(&args.docs)
        .with_context(|| format!("Failed to load documents from {}", args.docs.display()))?;
    if corpus.is_empty() {
        log::warn!("No document chunks under {}", args.docs.display());
    }
    let retriever = TfIdfRetriever::new(corpus);
    let model = language_model(&config.llm).context("Failed to set up language model")?;

    HybridAgent::new(Arc::new(retriever), Arc::new(executor), config, model)
        .context("Failed to initialise agent")
}
