mod feature;
mod report;
mod response;
mod risk;
mod score;
mod timestamp;

pub use feature::{Feature, FeatureValue, NumericFeature, shape};
pub use report::{
    AVERAGE_FEE_DECIMALS, AVERAGE_FEE_FEATURE, NormalizedReport, ReportSummary, SummaryValue,
    TOTAL_TRANSACTIONS_FEATURE, compose, truncate_address,
};
pub use response::{ResponseError, RiskResponse};
pub use risk::{
    HIGH_RISK_THRESHOLD, MEDIUM_RISK_THRESHOLD, RiskClassification, RiskTier, TierColor, classify,
};
pub use score::Score;
pub use timestamp::{LastActive, normalize_timestamp, normalize_timestamp_at};
