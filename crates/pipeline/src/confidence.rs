use analyst_protocol::Route;

const SUCCESS: f64 = 0.9;
const FAILURE: f64 = 0.2;
const RAG_ANSWERED: f64 = 0.8;
const HYBRID_FLOOR: f64 = 0.7;
const HYBRID_RETRIEVAL_WEIGHT: f64 = 0.3;
const HYBRID_CEILING: f64 = 0.95;
const HYBRID_FAILURE: f64 = 0.3;

/// Inputs to [`score`], gathered once the answer is shaped.
#[derive(Debug, Clone, Copy)]
pub struct Signals<'a> {
    pub route: Route,
    /// The query loop ended with rows.
    pub executed: bool,
    pub answered: bool,
    pub doc_scores: &'a [f32],
}

/// Heuristic confidence in `[0, 1]`.
#[must_use]
pub fn score(signals: &Signals<'_>) -> f64 {
    let base = if signals.executed { SUCCESS } else { FAILURE };
    let value = match signals.route {
        Route::Rag if signals.answered => RAG_ANSWERED,
        Route::Hybrid if signals.executed => {
            HYBRID_CEILING.min(HYBRID_FLOOR + HYBRID_RETRIEVAL_WEIGHT * mean(signals.doc_scores))
        }
        Route::Hybrid => HYBRID_FAILURE,
        Route::Rag | Route::Sql => base,
    };
    value.clamp(0.0, 1.0)
}

fn mean(scores: &[f32]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    scores.iter().copied().map(f64::from).sum::<f64>() / scores.len() as f64
}
