use crate::assist::Assist;
use analyst_llm::prompts;
use analyst_protocol::Route;

/// Words that mark a question as analytical (aggregations, metrics, entities).
const ANALYTICAL_KEYWORDS: &[&str] = &[
    "top",
    "aov",
    "average order value",
    "revenue",
    "gross margin",
    "margin",
    "quantity",
    "sold",
    "customer",
    "product",
    "category",
];

const RETURN_PHRASES: &[&str] = &["return window", "return days"];
const POLICY_WORDS: &[&str] = &["policy", "unopened"];

/// Assigns one of the three routes to every question.
#[derive(Debug, Clone, Default)]
pub struct RouteClassifier {
    assist: Assist,
}

impl RouteClassifier {
    #[must_use]
    pub const fn new(assist: Assist) -> Self {
        Self { assist }
    }

    /// Total: a model reply is kept only when it is exactly a route literal.
    #[must_use]
    pub fn classify(&self, question: &str) -> Route {
        if let Some(route) =
            self.assist
                .draft("route", &prompts::route_prompt(question), Route::parse_label)
        {
            log::debug!("Route from model: {route}");
            return route;
        }
        let route = classify_by_rules(question);
        log::debug!("Route from rules: {route}");
        route
    }
}

/// Keyword fallback: analytical questions go hybrid unless they ask about the return policy.
#[must_use]
pub fn classify_by_rules(question: &str) -> Route {
    let q = question.to_lowercase();
    if is_return_policy_question(&q) {
        return Route::Rag;
    }
    if !is_analytical(&q) {
        log::trace!("No analytical keyword in '{question}', defaulting to hybrid");
    }
    // The rules never pick `sql`: documents may still carry dates or definitions.
    Route::Hybrid
}

fn is_analytical(lowered: &str) -> bool {
    ANALYTICAL_KEYWORDS.iter().any(|kw| lowered.contains(kw))
}

fn is_return_policy_question(lowered: &str) -> bool {
    RETURN_PHRASES.iter().any(|p| lowered.contains(p))
        && POLICY_WORDS.iter().any(|w| lowered.contains(w))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assist::testing::ScriptedModel;

    #[test]
    fn return_policy_goes_to_documents() {
        assert_eq!(
            classify_by_rules("What is the return window for unopened beverages?"),
            Route::Rag
        );
        assert_eq!(
            classify_by_rules("Per the policy, what is the return window (days) for Beverages?"),
            Route::Rag
        );
        assert_eq!(
            classify_by_rules("What's the product return window per policy?"),
            Route::Rag
        );
    }

    #[test]
    fn analytical_questions_go_hybrid() {
        assert_eq!(
            classify_by_rules("Top 3 products by total revenue all-time"),
            Route::Hybrid
        );
        assert_eq!(
            classify_by_rules("What was the AOV during Winter Classics 1997?"),
            Route::Hybrid
        );
        assert_eq!(classify_by_rules("What is the return window?"), Route::Hybrid);
        assert_eq!(classify_by_rules(""), Route::Hybrid);
    }

    #[test]
    fn model_label_is_used_when_valid() {
        let classifier = RouteClassifier::new(Assist::Available(ScriptedModel::replying(" SQL ")));
        assert_eq!(
            classifier.classify("What is the return window for unopened beverages?"),
            Route::Sql
        );
    }

    #[test]
    fn invalid_or_failed_model_falls_back() {
        let classifier =
            RouteClassifier::new(Assist::Available(ScriptedModel::replying("route: rag")));
        assert_eq!(classifier.classify("Top category by quantity"), Route::Hybrid);

        let classifier = RouteClassifier::new(Assist::Available(ScriptedModel::failing()));
        assert_eq!(
            classifier.classify("What is the return window for unopened beverages?"),
            Route::Rag
        );
    }
}
