//! Structured filters over animal documents.
//!
//! A [`RecordQuery`] is an implicit conjunction of [`Condition`]s. It renders to
//! a MongoDB filter document for the driver, and it can also be evaluated
//! in-process against a document with the same semantics.

use std::collections::HashSet;

use bson::{Bson, Document};
use serde::{Deserialize, Serialize};

use crate::types::as_number;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Condition {
    /// Field equals the value.
    Equals { field: String, value: Bson },
    /// Field equals any of the values.
    In { field: String, values: Vec<Bson> },
    /// Field is a number within the inclusive bounds.
    Range {
        field: String,
        #[serde(default)]
        min: Option<f64>,
        #[serde(default)]
        max: Option<f64>,
    },
}

impl Condition {
    pub fn field(&self) -> &str {
        match self {
            Condition::Equals { field, .. }
            | Condition::In { field, .. }
            | Condition::Range { field, .. } => field,
        }
    }

    pub fn matches(&self, doc: &Document) -> bool {
        let Some(actual) = doc.get(self.field()) else {
            return false;
        };

        match self {
            Condition::Equals { value, .. } => values_equal(actual, value),
            Condition::In { values, .. } => values.iter().any(|v| values_equal(actual, v)),
            Condition::Range { min, max, .. } => match as_number(actual) {
                Some(n) => min.map_or(true, |lo| n >= lo) && max.map_or(true, |hi| n <= hi),
                None => false,
            },
        }
    }

    pub fn to_document(&self) -> Document {
        let mut ops = Document::new();
        let rendered = match self {
            Condition::Equals { value, .. } => value.clone(),
            Condition::In { values, .. } => {
                ops.insert("$in", values.clone());
                Bson::Document(ops)
            }
            Condition::Range { min, max, .. } => {
                if let Some(lo) = min {
                    ops.insert("$gte", *lo);
                }
                if let Some(hi) = max {
                    ops.insert("$lte", *hi);
                }
                if ops.is_empty() {
                    ops.insert("$type", "number");
                }
                Bson::Document(ops)
            }
        };

        let mut filter = Document::new();
        filter.insert(self.field(), rendered);
        filter
    }
}

/// Conjunction of conditions. The empty query matches every document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordQuery {
    conditions: Vec<Condition>,
}

impl RecordQuery {
    /// The always-true query.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn equals(mut self, field: &str, value: impl Into<Bson>) -> Self {
        self.conditions.push(Condition::Equals {
            field: field.to_string(),
            value: value.into(),
        });
        self
    }

    pub fn one_of<V: Into<Bson>>(mut self, field: &str, values: impl IntoIterator<Item = V>) -> Self {
        self.conditions.push(Condition::In {
            field: field.to_string(),
            values: values.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn between(mut self, field: &str, min: f64, max: f64) -> Self {
        self.conditions.push(Condition::Range {
            field: field.to_string(),
            min: Some(min),
            max: Some(max),
        });
        self
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn matches(&self, doc: &Document) -> bool {
        self.conditions.iter().all(|c| c.matches(doc))
    }

    /// Render the MongoDB filter document. Conditions sharing a field are
    /// combined with `$and` so none of them overwrites another.
    pub fn to_document(&self) -> Document {
        let mut seen = HashSet::new();
        let repeated = self.conditions.iter().any(|c| !seen.insert(c.field()));

        if repeated {
            let clauses: Vec<Bson> = self
                .conditions
                .iter()
                .map(|c| Bson::Document(c.to_document()))
                .collect();
            let mut filter = Document::new();
            filter.insert("$and", clauses);
            return filter;
        }

        let mut filter = Document::new();
        for condition in &self.conditions {
            for (key, value) in condition.to_document() {
                filter.insert(key, value);
            }
        }
        filter
    }
}

fn values_equal(actual: &Bson, expected: &Bson) -> bool {
    match (as_number(actual), as_number(expected)) {
        (Some(a), Some(b)) => a == b,
        _ => actual == expected,
    }
}
