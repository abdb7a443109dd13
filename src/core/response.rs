use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::core::{Feature, Score};

/// Why a success body could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResponseError {
    #[error("response body is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("response body is not a JSON object")]
    NotAnObject,

    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("field `{field}` must be {expected}, got {found}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    #[error("field `{0}` is not a finite number")]
    NotFinite(&'static str),
}

/// Decoded reply of the scoring service.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskResponse {
    pub risk_score: Score,
    pub risk_level: Score,
    /// Raw timestamp; empty when the service omitted it.
    pub timestamp: String,
    /// Feature mapping in response order. Keys are unique.
    pub features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct RawRiskResponse {
    risk_score: Option<Value>,
    risk_level: Option<Value>,
    timestamp: Option<Value>,
    features: Option<Value>,
}

impl RiskResponse {
    pub fn from_json(body: &str) -> Result<Self, ResponseError> {
        let value: Value =
            serde_json::from_str(body).map_err(|e| ResponseError::InvalidJson(e.to_string()))?;
        if !value.is_object() {
            return Err(ResponseError::NotAnObject);
        }
        let raw: RawRiskResponse =
            serde_json::from_value(value).map_err(|e| ResponseError::InvalidJson(e.to_string()))?;

        let risk_score = required_score(raw.risk_score, "risk_score")?;
        let risk_level = required_score(raw.risk_level, "risk_level")?;

        let timestamp = match raw.timestamp {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s,
            Some(other) => other.to_string(),
        };

        let features = match raw.features {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Object(map)) => map
                .into_iter()
                .map(|(name, value)| Feature::new(name, value))
                .collect(),
            Some(other) => {
                return Err(ResponseError::WrongType {
                    field: "features",
                    expected: "an object",
                    found: json_kind(&other),
                });
            }
        };

        Ok(Self {
            risk_score,
            risk_level,
            timestamp,
            features,
        })
    }
}

fn required_score(value: Option<Value>, field: &'static str) -> Result<Score, ResponseError> {
    match value {
        None | Some(Value::Null) => Err(ResponseError::MissingField(field)),
        Some(Value::Number(n)) => Score::new(n).ok_or(ResponseError::NotFinite(field)),
        Some(other) => Err(ResponseError::WrongType {
            field,
            expected: "a number",
            found: json_kind(&other),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FeatureValue;

    #[test]
    fn optional_fields_default_to_empty() {
        let r = RiskResponse::from_json(r#"{"risk_score": 85, "risk_level": 92}"#)
            .expect("decode");
        assert_eq!(r.risk_score, Score::from(85));
        assert_eq!(r.risk_level.value(), 92.0);
        assert_eq!(r.timestamp, "");
        assert!(r.features.is_empty());
    }

    #[test]
    fn scores_keep_their_number_form() {
        let r = RiskResponse::from_json(r#"{"risk_score": 50, "risk_level": 55.0}"#)
            .expect("decode");
        assert_eq!(r.risk_score.to_string(), "50");
        assert_eq!(r.risk_level.to_string(), "55.0");
    }

    #[test]
    fn missing_required_fields_are_rejected() {
        let err = RiskResponse::from_json(r#"{"risk_score": 85}"#).unwrap_err();
        assert_eq!(err, ResponseError::MissingField("risk_level"));
        let err = RiskResponse::from_json(r#"{"risk_level": 10}"#).unwrap_err();
        assert_eq!(err, ResponseError::MissingField("risk_score"));
        let err = RiskResponse::from_json(r#"{"risk_score": null, "risk_level": 10}"#)
            .unwrap_err();
        assert_eq!(err.to_string(), "missing required field `risk_score`");
    }

    #[test]
    fn non_numeric_required_fields_are_rejected() {
        let err = RiskResponse::from_json(r#"{"risk_score": 1, "risk_level": "high"}"#)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "field `risk_level` must be a number, got string"
        );
        let err = RiskResponse::from_json(r#"{"risk_score": true, "risk_level": 1}"#)
            .unwrap_err();
        assert_eq!(
            err,
            ResponseError::WrongType {
                field: "risk_score",
                expected: "a number",
                found: "boolean",
            }
        );
    }

    #[test]
    fn non_object_bodies_are_rejected() {
        assert_eq!(
            RiskResponse::from_json("[1,2]").unwrap_err(),
            ResponseError::NotAnObject
        );
        assert!(matches!(
            RiskResponse::from_json("internal error").unwrap_err(),
            ResponseError::InvalidJson(_)
        ));
        assert!(RiskResponse::from_json("").is_err());
    }

    #[test]
    fn features_keep_response_order() {
        let r = RiskResponse::from_json(
            r#"{"risk_score": 1, "risk_level": 2,
                "features": {"z": 1, "a": "x", "m": false}}"#,
        )
        .expect("decode");
        let names: Vec<&str> = r.features.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["z", "a", "m"]);
        assert_eq!(r.features[2].value, FeatureValue::Boolean(false));
    }

    #[test]
    fn features_must_be_an_object() {
        let err = RiskResponse::from_json(r#"{"risk_score": 1, "risk_level": 2, "features": [1]}"#)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "field `features` must be an object, got array"
        );
    }

    #[test]
    fn odd_timestamps_are_carried_as_text() {
        let r = RiskResponse::from_json(r#"{"risk_score": 1, "risk_level": 2, "timestamp": null}"#)
            .expect("decode");
        assert_eq!(r.timestamp, "");
        let r = RiskResponse::from_json(
            r#"{"risk_score": 1, "risk_level": 2, "timestamp": 1700000000}"#,
        )
        .expect("decode");
        assert_eq!(r.timestamp, "1700000000");
    }
}
