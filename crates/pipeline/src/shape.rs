//! Shape grammar for answers and the coercion of result rows into it.
//!
//! ```text
//! shape  := "int" | "float" | "float_2" | object | "list[" object "]"
//! object := "{" field ("," field)* "}"
//! field  := name ":" type        type containing "int" | "float" | anything else (string)
//! ```
//!
//! Coercion never fails. Anything the grammar does not cover, or a value that cannot be
//! converted, degrades to the raw rows.

use analyst_protocol::Row;
use serde_json::{Map, Number, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Int,
    Float,
    Str,
}

impl FieldKind {
    fn from_hint(hint: &str) -> Self {
        if hint.contains("int") {
            Self::Int
        } else if hint.contains("float") {
            Self::Float
        } else {
            Self::Str
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub kind: FieldKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatHint {
    Int,
    Float,
    Object(Vec<Field>),
    List(Vec<Field>),
    /// Unrecognised, malformed, or a list whose element is not an object.
    Raw,
}

impl FormatHint {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let hint = raw.trim();
        match hint {
            "int" => return Self::Int,
            "float" | "float_2" => return Self::Float,
            _ => {}
        }
        if let Some(inner) = hint
            .strip_prefix("list[")
            .and_then(|rest| rest.strip_suffix(']'))
        {
            return parse_object(inner.trim()).map_or(Self::Raw, Self::List);
        }
        parse_object(hint).map_or(Self::Raw, Self::Object)
    }
}

/// Fields of `{a:t, b:t}`; parts without a colon are ignored.
fn parse_object(text: &str) -> Option<Vec<Field>> {
    let inner = text.strip_prefix('{')?.strip_suffix('}')?;
    Some(
        inner
            .split(',')
            .filter_map(|part| {
                let (name, hint) = part.split_once(':')?;
                Some(Field {
                    name: name.trim().to_string(),
                    kind: FieldKind::from_hint(hint.trim()),
                })
            })
            .collect(),
    )
}

/// Coerces `rows` into the shape named by `format_hint`.
#[must_use]
pub fn coerce(format_hint: &str, rows: &[Row]) -> Value {
    coerce_with(&FormatHint::parse(format_hint), rows)
}

#[must_use]
pub fn coerce_with(hint: &FormatHint, rows: &[Row]) -> Value {
    let Some(first) = rows.first() else {
        return Value::Null;
    };
    match hint {
        FormatHint::Int => scalar(first, rows, FieldKind::Int),
        FormatHint::Float => scalar(first, rows, FieldKind::Float),
        FormatHint::Object(fields) => {
            let object = project(first, fields);
            if object.is_empty() {
                Value::Object(first.clone())
            } else {
                Value::Object(object)
            }
        }
        FormatHint::List(fields) => Value::Array(
            rows.iter()
                .map(|row| Value::Object(project(row, fields)))
                .collect(),
        ),
        FormatHint::Raw => raw_rows(rows),
    }
}

fn scalar(first: &Row, rows: &[Row], kind: FieldKind) -> Value {
    let Some(value) = first.values().next() else {
        return raw_rows(rows);
    };
    if value.is_null() {
        return Value::Null;
    }
    convert(value, kind).unwrap_or_else(|| {
        log::debug!("Cannot coerce {value} to {kind:?}, returning rows");
        raw_rows(rows)
    })
}

/// Case-insensitive column match per field; unmatched fields are left out.
fn project(row: &Row, fields: &[Field]) -> Map<String, Value> {
    let mut out = Map::new();
    for field in fields {
        let wanted = field.name.to_lowercase();
        let Some(value) = row
            .iter()
            .find(|(column, _)| column.to_lowercase() == wanted)
            .map(|(_, value)| value)
        else {
            continue;
        };
        let coerced = if value.is_null() {
            Value::Null
        } else {
            convert(value, field.kind).unwrap_or_else(|| value.clone())
        };
        out.insert(field.name.clone(), coerced);
    }
    out
}

fn convert(value: &Value, kind: FieldKind) -> Option<Value> {
    match kind {
        FieldKind::Int => {
            let n = numeric(value)?.trunc();
            // Out-of-range values are not representable as an integer answer.
            (n.is_finite() && n.abs() < 9.0e18).then(|| Value::from(n as i64))
        }
        FieldKind::Float => Number::from_f64(round2(numeric(value)?)).map(Value::Number),
        FieldKind::Str => Some(Value::String(match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })),
    }
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(f64::from(u8::from(*b))),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Two decimals, halves away from zero.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn raw_rows(rows: &[Row]) -> Value {
    Value::Array(rows.iter().cloned().map(Value::Object).collect())
}
