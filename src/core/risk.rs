use serde::{Deserialize, Serialize};
use std::fmt;

pub const HIGH_RISK_THRESHOLD: f64 = 70.0;
pub const MEDIUM_RISK_THRESHOLD: f64 = 40.0;

/// Risk tier derived from the service's `risk_level` percentage.
///
/// Variants are declared from least to most severe so the derived ordering
/// matches the severity ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskTier {
    LowRisk,
    MediumRisk,
    HighRisk,
}

impl RiskTier {
    pub const fn as_str(self) -> &'static str {
        match self {
            RiskTier::LowRisk => "LOW_RISK",
            RiskTier::MediumRisk => "MEDIUM_RISK",
            RiskTier::HighRisk => "HIGH_RISK",
        }
    }

    /// Badge text shown next to the wallet address.
    pub const fn label(self) -> &'static str {
        match self {
            RiskTier::LowRisk => "LOW RISK",
            RiskTier::MediumRisk => "MEDIUM RISK",
            RiskTier::HighRisk => "HIGH RISK",
        }
    }

    pub const fn severity(self) -> u8 {
        match self {
            RiskTier::LowRisk => 0,
            RiskTier::MediumRisk => 1,
            RiskTier::HighRisk => 2,
        }
    }

    pub const fn color(self) -> TierColor {
        match self {
            RiskTier::LowRisk => TierColor::Green,
            RiskTier::MediumRisk => TierColor::Gray,
            RiskTier::HighRisk => TierColor::Red,
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Presentation color of a tier, independent of any rendering backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TierColor {
    Red,
    Gray,
    Green,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RiskClassification {
    pub tier: RiskTier,
    pub severity: u8,
}

impl RiskClassification {
    pub fn new(tier: RiskTier) -> Self {
        Self {
            tier,
            severity: tier.severity(),
        }
    }
}

/// Thresholds are inclusive at the lower bound of each tier and are checked
/// from the highest tier down. Values outside `[0, 100]` follow the same rules.
pub fn classify(risk_level: f64) -> RiskClassification {
    let tier = if risk_level >= HIGH_RISK_THRESHOLD {
        RiskTier::HighRisk
    } else if risk_level >= MEDIUM_RISK_THRESHOLD {
        RiskTier::MediumRisk
    } else {
        RiskTier::LowRisk
    };
    RiskClassification::new(tier)
}
