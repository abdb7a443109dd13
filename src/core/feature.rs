use std::fmt;

use serde::Serialize;
use serde_json::{Number, Value};

/// A feature value as reported by the scoring service.
///
/// Booleans are kept apart from numbers so that only real numbers ever reach
/// the chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Number(Number),
    Text(String),
    Boolean(bool),
    Null,
    Nested(Value),
}

impl FeatureValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FeatureValue::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            FeatureValue::Number(_) => "number",
            FeatureValue::Text(_) => "text",
            FeatureValue::Boolean(_) => "boolean",
            FeatureValue::Null => "null",
            FeatureValue::Nested(_) => "nested",
        }
    }
}

impl From<Value> for FeatureValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Number(n) => FeatureValue::Number(n),
            Value::String(s) => FeatureValue::Text(s),
            Value::Bool(b) => FeatureValue::Boolean(b),
            Value::Null => FeatureValue::Null,
            other => FeatureValue::Nested(other),
        }
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureValue::Number(n) => write!(f, "{n}"),
            FeatureValue::Text(s) => f.write_str(s),
            FeatureValue::Boolean(b) => write!(f, "{b}"),
            FeatureValue::Null => f.write_str("null"),
            FeatureValue::Nested(v) => write!(f, "{v}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Feature {
    pub name: String,
    pub value: FeatureValue,
}

impl Feature {
    pub fn new(name: impl Into<String>, value: impl Into<FeatureValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericFeature {
    pub name: String,
    pub value: f64,
}

/// Splits the service's feature mapping into the full listing and the
/// numeric-only subset used for charting. Both keep the input order.
pub fn shape(features: &[Feature]) -> (Vec<Feature>, Vec<NumericFeature>) {
    let full_listing = features.to_vec();
    let numeric_subset = features
        .iter()
        .filter_map(|f| {
            f.value.as_f64().map(|value| NumericFeature {
                name: f.name.clone(),
                value,
            })
        })
        .collect();
    (full_listing, numeric_subset)
}
