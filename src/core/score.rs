use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::Number;

/// A numeric field of the service reply. Keeps the number as sent so `55`
/// and `55.0` render the way the service wrote them.
#[derive(Debug, Clone, PartialEq)]
pub struct Score {
    raw: Number,
    value: f64,
}

impl Score {
    /// `None` when the number has no finite `f64` value.
    pub fn new(raw: Number) -> Option<Self> {
        let value = raw.as_f64().filter(|v| v.is_finite())?;
        Some(Self { raw, value })
    }

    pub fn from_f64(value: f64) -> Option<Self> {
        Number::from_f64(value).and_then(Self::new)
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}

impl From<i64> for Score {
    fn from(value: i64) -> Self {
        Self {
            raw: Number::from(value),
            value: value as f64,
        }
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl Serialize for Score {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_and_float_forms_render_as_sent() {
        assert_eq!(Score::from(55).to_string(), "55");
        let float = Score::from_f64(55.0).expect("finite");
        assert_eq!(float.to_string(), "55.0");
        assert_eq!(float.value(), 55.0);
        assert_eq!(Score::from_f64(12.5).expect("finite").to_string(), "12.5");
    }

    #[test]
    fn non_finite_values_are_rejected() {
        assert!(Score::from_f64(f64::NAN).is_none());
        assert!(Score::from_f64(f64::INFINITY).is_none());
    }

    #[test]
    fn serializes_the_number_as_sent() {
        assert_eq!(serde_json::to_string(&Score::from(85)).expect("json"), "85");
        let float = Score::from_f64(92.0).expect("finite");
        assert_eq!(serde_json::to_string(&float).expect("json"), "92.0");
    }
}
