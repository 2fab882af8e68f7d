use analyst_pipeline::HybridAgent;
use analyst_protocol::{serialize_json, Answer, Question};
use anyhow::{Context as AnyhowContext, Result};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;
use tokio::task::JoinError;

/// Parses a JSONL file; blank and unparsable lines are skipped with a warning.
pub fn read_questions(path: &Path) -> Result<Vec<Question>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read batch {}", path.display()))?;

    let mut questions = Vec::new();
    for (idx, line) in raw.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<Question>(line) {
            Ok(question) => questions.push(question),
            Err(err) => log::warn!("Skipping line {} of {}: {err}", idx + 1, path.display()),
        }
    }
    log::info!("Read {} questions from {}", questions.len(), path.display());
    Ok(questions)
}

/// Answers `questions` in input order, on up to `jobs` blocking workers.
pub fn run_batch(agent: &Arc<HybridAgent>, questions: Vec<Question>, jobs: usize) -> Result<Vec<Answer>> {
    if jobs <= 1 || questions.len() <= 1 {
        return Ok(questions.iter().map(|q| agent.run(q)).collect());
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .max_blocking_threads(jobs)
        .enable_all()
        .build()
        .context("Failed to start worker runtime")?;

    let answers = runtime.block_on(async {
        let handles: Vec<_> = questions
            .into_iter()
            .map(|question| {
                let agent = Arc::clone(agent);
                let id = question.id.clone();
                (id, tokio::task::spawn_blocking(move || agent.run(&question)))
            })
            .collect();

        let mut answers = Vec::with_capacity(handles.len());
        for (id, handle) in handles {
            answers.push(settle(id, handle.await));
        }
        answers
    });
    Ok(answers)
}

/// Keeps one output line per question: a failed worker becomes a null answer.
fn settle(id: String, joined: std::result::Result<Answer, JoinError>) -> Answer {
    joined.unwrap_or_else(|err| {
        log::error!("[{id}] question worker failed: {err}");
        Answer::unanswered(id, format!("Question worker failed: {err}"))
    })
}

pub fn write_answers(path: &Path, answers: &[Answer]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let file = fs::File::create(path)
        .with_context(|| format!("Failed to create output {}", path.display()))?;
    let mut out = BufWriter::new(file);
    for answer in answers {
        writeln!(out, "{}", serialize_json(answer)?)?;
    }
    out.flush()?;
    Ok(())
}
