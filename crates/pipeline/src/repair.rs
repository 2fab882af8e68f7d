//! Error-driven rewrites of a failed query.
//!
//! The executor's error text is classified by substring (first match wins) and each class
//! maps to one textual rewrite. Rewrites are idempotent; an unrecognised error returns the
//! query unchanged.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// `no such table` / `no such column`.
    MissingObject,
    AmbiguousColumn,
    Syntax,
    Other,
}

impl ErrorClass {
    #[must_use]
    pub fn of(error: &str) -> Self {
        let lowered = error.to_lowercase();
        if lowered.contains("no such table") || lowered.contains("no such column") {
            Self::MissingObject
        } else if lowered.contains("ambiguous column") {
            Self::AmbiguousColumn
        } else if lowered.contains("syntax error") {
            Self::Syntax
        } else {
            Self::Other
        }
    }
}

/// Join keys and the alias that owns each one in the query templates.
const KEY_OWNERS: &[(&str, &str)] = &[
    ("OrderID", "o"),
    ("ProductID", "p"),
    ("CustomerID", "o"),
    ("CategoryID", "p"),
];

static ORDER_DETAILS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\[Order Details\]|"?\bOrder[ _]?Details\b"?"#).expect("valid regex")
});
static BARE_KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(^|[^.\w"])(OrderID|ProductID|CustomerID|CategoryID)\b"#).expect("valid regex")
});
static DATE_CALL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bDATE\(([^)]+)\)").expect("valid regex"));

/// Rewrites `sql` according to the class of `error`.
#[must_use]
pub fn repair(sql: &str, error: Option<&str>) -> String {
    let class = error.map_or(ErrorClass::Other, ErrorClass::of);
    let repaired = match class {
        ErrorClass::MissingObject => quote_order_details(sql),
        ErrorClass::AmbiguousColumn => qualify_keys(sql, error.and_then(named_key)),
        ErrorClass::Syntax => strip_date_calls(sql),
        ErrorClass::Other => sql.to_string(),
    };
    log::debug!("Repair for {class:?}: changed={}", repaired != sql);
    repaired
}

fn quote_order_details(sql: &str) -> String {
    ORDER_DETAILS
        .replace_all(sql, "\"Order Details\"")
        .into_owned()
}

/// The join key an `ambiguous column name: X` error refers to, if it is one we own.
fn named_key(error: &str) -> Option<&'static str> {
    let lowered = error.to_lowercase();
    KEY_OWNERS
        .iter()
        .map(|(key, _)| *key)
        .find(|key| lowered.contains(&key.to_lowercase()))
}

fn qualify_keys(sql: &str, only: Option<&str>) -> String {
    BARE_KEY
        .replace_all(sql, |caps: &Captures<'_>| {
            let key = &caps[2];
            let owner = KEY_OWNERS
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, alias)| *alias);
            match owner {
                Some(alias) if only.map_or(true, |wanted| wanted == key) => {
                    format!("{}{alias}.{key}", &caps[1])
                }
                _ => caps[0].to_string(),
            }
        })
        .into_owned()
}

fn strip_date_calls(sql: &str) -> String {
    let mut out = DATE_CALL.replace_all(sql, "$1").trim_end().to_string();
    if !out.ends_with(';') {
        out.push(';');
    }
    out
}
