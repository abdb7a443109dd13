use std::fmt;

use serde::{Serialize, Serializer};

use crate::core::{Feature, FeatureValue, LastActive, NumericFeature, RiskClassification, Score};

pub const TOTAL_TRANSACTIONS_FEATURE: &str = "total_transactions";
pub const AVERAGE_FEE_FEATURE: &str = "average_fee";
pub const AVERAGE_FEE_DECIMALS: usize = 6;

const ADDRESS_HEAD_CHARS: usize = 6;
const ADDRESS_TAIL_CHARS: usize = 4;

/// A summary card value derived from a feature that may be missing or of an
/// unexpected type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SummaryValue<T> {
    Value(T),
    Unavailable,
}

impl<T: fmt::Display> fmt::Display for SummaryValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SummaryValue::Value(v) => write!(f, "{v}"),
            SummaryValue::Unavailable => f.write_str("n/a"),
        }
    }
}

impl<T: Serialize> Serialize for SummaryValue<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SummaryValue::Value(v) => v.serialize(serializer),
            SummaryValue::Unavailable => serializer.serialize_none(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    pub total_transactions: SummaryValue<i64>,
    /// Rounded to [`AVERAGE_FEE_DECIMALS`] places.
    pub average_fee: SummaryValue<f64>,
}

/// Everything a rendering surface needs to draw one wallet's risk profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedReport {
    pub wallet: String,
    pub display_address: String,
    pub classification: RiskClassification,
    pub risk_score: Score,
    pub risk_level: Score,
    pub last_active: LastActive,
    pub summary: ReportSummary,
    pub features: Vec<Feature>,
    pub numeric_features: Vec<NumericFeature>,
}

impl NormalizedReport {
    /// Numeric features ordered for the bar chart: descending by value, ties
    /// keep response order.
    pub fn chart_series(&self) -> Vec<&NumericFeature> {
        let mut series: Vec<&NumericFeature> = self.numeric_features.iter().collect();
        series.sort_by(|a, b| b.value.total_cmp(&a.value));
        series
    }

    pub fn risk_level_display(&self) -> String {
        format!("{}%", self.risk_level)
    }
}

pub fn compose(
    identifier: &str,
    classification: RiskClassification,
    risk_score: Score,
    risk_level: Score,
    last_active: LastActive,
    full_listing: Vec<Feature>,
    numeric_subset: Vec<NumericFeature>,
) -> NormalizedReport {
    let summary = ReportSummary {
        total_transactions: total_transactions(&full_listing),
        average_fee: average_fee(&full_listing),
    };
    NormalizedReport {
        wallet: identifier.to_string(),
        display_address: truncate_address(identifier),
        classification,
        risk_score,
        risk_level,
        last_active,
        summary,
        features: full_listing,
        numeric_features: numeric_subset,
    }
}

/// `abcdef...wxyz` form of an address. Identifiers too short to be
/// abbreviated are returned unchanged.
pub fn truncate_address(identifier: &str) -> String {
    let len = identifier.chars().count();
    if len < ADDRESS_HEAD_CHARS + ADDRESS_TAIL_CHARS {
        return identifier.to_string();
    }
    let head: String = identifier.chars().take(ADDRESS_HEAD_CHARS).collect();
    let tail: String = identifier.chars().skip(len - ADDRESS_TAIL_CHARS).collect();
    format!("{head}...{tail}")
}

fn find<'a>(features: &'a [Feature], name: &str) -> Option<&'a FeatureValue> {
    features.iter().find(|f| f.name == name).map(|f| &f.value)
}

fn total_transactions(features: &[Feature]) -> SummaryValue<i64> {
    let Some(value) = find(features, TOTAL_TRANSACTIONS_FEATURE) else {
        return SummaryValue::Value(0);
    };
    let n = match value {
        FeatureValue::Number(n) => match (n.as_i64(), n.as_u64()) {
            (Some(i), _) => Some(i),
            // above i64::MAX
            (None, Some(_)) => None,
            (None, None) => n.as_f64().and_then(truncate_to_i64),
        },
        FeatureValue::Boolean(b) => Some(i64::from(*b)),
        FeatureValue::Text(s) => s.trim().parse::<i64>().ok(),
        FeatureValue::Null | FeatureValue::Nested(_) => None,
    };
    n.map_or(SummaryValue::Unavailable, SummaryValue::Value)
}

fn average_fee(features: &[Feature]) -> SummaryValue<f64> {
    let Some(value) = find(features, AVERAGE_FEE_FEATURE) else {
        return SummaryValue::Value(0.0);
    };
    let fee = match value {
        FeatureValue::Number(n) => n.as_f64(),
        FeatureValue::Boolean(b) => Some(f64::from(u8::from(*b))),
        _ => None,
    };
    fee.map_or(SummaryValue::Unavailable, |f| {
        SummaryValue::Value(round_to(f, AVERAGE_FEE_DECIMALS))
    })
}

fn truncate_to_i64(value: f64) -> Option<i64> {
    // i64::MAX as f64 is 2^63, one past the largest i64.
    let in_range = value.is_finite() && value >= i64::MIN as f64 && value < i64::MAX as f64;
    in_range.then(|| value.trunc() as i64)
}

/// Rounds the exact binary value at `decimals` places, as `{:.N}` formatting does.
fn round_to(value: f64, decimals: usize) -> f64 {
    if !value.is_finite() {
        return value;
    }
    format!("{value:.decimals$}").parse().unwrap_or(value)
}
