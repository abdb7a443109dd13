use std::sync::Arc;
use std::time::{Duration, Instant};

use time::OffsetDateTime;

use crate::client::{ClientError, RiskService};
use crate::core::{
    NormalizedReport, RiskResponse, classify, compose, normalize_timestamp_at, shape,
};

pub const MISSING_IDENTIFIER_WARNING: &str = "Please enter a wallet address before searching.";
pub const IDLE_PROMPT: &str = "Enter a Solana wallet address to get started.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletQuery {
    identifier: String,
}

impl WalletQuery {
    pub fn identifier(&self) -> &str {
        &self.identifier
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputOutcome {
    Proceed(WalletQuery),
    Warn(&'static str),
    Idle,
}

pub fn validate_input(triggered: bool, candidate: &str) -> InputOutcome {
    if !triggered {
        return InputOutcome::Idle;
    }
    let identifier = candidate.trim();
    if identifier.is_empty() {
        return InputOutcome::Warn(MISSING_IDENTIFIER_WARNING);
    }
    InputOutcome::Proceed(WalletQuery {
        identifier: identifier.to_string(),
    })
}

/// Result of one user-triggered run of the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    Idle,
    Warning(&'static str),
    Report(Box<NormalizedReport>),
    Failed(ClientError),
}

#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Lower bound on how long the pending state is shown.
    pub min_latency: Duration,
    pub show_progress: bool,
}

#[derive(Clone)]
pub struct Engine {
    opts: EngineOptions,
    service: Arc<dyn RiskService>,
}

impl Engine {
    pub fn new(opts: EngineOptions, service: Arc<dyn RiskService>) -> Self {
        Self { opts, service }
    }

    pub fn submit(&self, triggered: bool, candidate: &str) -> QueryOutcome {
        match validate_input(triggered, candidate) {
            InputOutcome::Idle => QueryOutcome::Idle,
            InputOutcome::Warn(msg) => QueryOutcome::Warning(msg),
            InputOutcome::Proceed(query) => match self.query(&query) {
                Ok(report) => QueryOutcome::Report(Box::new(report)),
                Err(err) => QueryOutcome::Failed(err),
            },
        }
    }

    pub fn query(&self, query: &WalletQuery) -> Result<NormalizedReport, ClientError> {
        use std::io::IsTerminal;
        let progress_enabled = self.opts.show_progress && std::io::stderr().is_terminal();
        let pb = if progress_enabled {
            let pb = indicatif::ProgressBar::new_spinner();
            pb.set_draw_target(indicatif::ProgressDrawTarget::stderr());
            pb.set_message("Fetching risk profile...");
            pb.enable_steady_tick(Duration::from_millis(120));
            Some(pb)
        } else {
            None
        };

        let started_at = Instant::now();
        let result = self.service.fetch(query.identifier());
        if let Some(remaining) = self.opts.min_latency.checked_sub(started_at.elapsed()) {
            std::thread::sleep(remaining);
        }

        if let Some(pb) = pb {
            pb.finish_and_clear();
        }

        let response = result?;
        let report = build_report(query.identifier(), &response, OffsetDateTime::now_utc());
        tracing::info!(
            wallet = %report.display_address,
            tier = %report.classification.tier,
            features = report.features.len(),
            "risk profile ready"
        );
        Ok(report)
    }
}

/// Normalizes a decoded response into a report. `now` anchors the
/// last-active computation.
pub fn build_report(
    identifier: &str,
    response: &RiskResponse,
    now: OffsetDateTime,
) -> NormalizedReport {
    let classification = classify(response.risk_level.value());
    let last_active = normalize_timestamp_at(&response.timestamp, now);
    let (full_listing, numeric_subset) = shape(&response.features);
    compose(
        identifier,
        classification,
        response.risk_score.clone(),
        response.risk_level.clone(),
        last_active,
        full_listing,
        numeric_subset,
    )
}
