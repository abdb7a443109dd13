use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_ENDPOINT: &str = "https://the-haritz-ml-tool.onrender.com/predict-wallet-risk";

#[derive(Debug, Clone, Serialize)]
pub struct EffectiveConfig {
    pub service: ServiceConfig,
    pub ui: UiConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_path: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceConfig {
    pub endpoint: String,
    /// `0` disables the request timeout.
    pub timeout_secs: u64,
    pub min_latency_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct UiConfig {
    pub color: bool,
    pub max_table_rows: usize,
}

impl ServiceConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    pub fn min_latency(&self) -> Duration {
        Duration::from_millis(self.min_latency_ms)
    }
}

impl Default for EffectiveConfig {
    fn default() -> Self {
        Self {
            service: ServiceConfig {
                endpoint: DEFAULT_ENDPOINT.to_string(),
                timeout_secs: 30,
                min_latency_ms: 0,
            },
            ui: UiConfig {
                color: true,
                max_table_rows: 50,
            },
            config_path: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    service: Option<RawServiceConfig>,
    ui: Option<RawUiConfig>,
}

#[derive(Debug, Deserialize)]
struct RawServiceConfig {
    endpoint: Option<String>,
    timeout_secs: Option<u64>,
    min_latency_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RawUiConfig {
    color: Option<bool>,
    max_table_rows: Option<usize>,
}

pub fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

pub fn default_config_path(home_dir: &Path) -> PathBuf {
    home_dir.join(".config/walletrisk/config.toml")
}

/// Defaults, then the TOML file (if present), then `WALLETRISK_*` variables.
pub fn load(config_path: Option<&Path>, home_dir: Option<&Path>) -> Result<EffectiveConfig> {
    let mut cfg = EffectiveConfig::default();

    let path = config_path
        .map(ToOwned::to_owned)
        .or_else(|| home_dir.map(default_config_path));

    if let Some(path) = path {
        if path.exists() {
            let s = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config file: {}", path.display()))?;
            let raw: RawConfig = toml::from_str(&s)
                .with_context(|| format!("failed to parse config file (TOML): {}", path.display()))?;
            apply_raw_config(&mut cfg, raw);
            cfg.config_path = Some(path.display().to_string());
        } else if config_path.is_some() {
            return Err(anyhow::anyhow!(
                "config file does not exist: {}",
                path.display()
            ));
        }
    }

    apply_env_overrides(&mut cfg)?;

    Ok(cfg)
}

fn apply_raw_config(cfg: &mut EffectiveConfig, raw: RawConfig) {
    if let Some(service) = raw.service {
        if let Some(endpoint) = service.endpoint {
            cfg.service.endpoint = endpoint;
        }
        if let Some(timeout_secs) = service.timeout_secs {
            cfg.service.timeout_secs = timeout_secs;
        }
        if let Some(min_latency_ms) = service.min_latency_ms {
            cfg.service.min_latency_ms = min_latency_ms;
        }
    }

    if let Some(ui) = raw.ui {
        if let Some(color) = ui.color {
            cfg.ui.color = color;
        }
        if let Some(max_table_rows) = ui.max_table_rows {
            cfg.ui.max_table_rows = max_table_rows;
        }
    }
}

fn apply_env_overrides(cfg: &mut EffectiveConfig) -> Result<()> {
    if let Ok(v) = std::env::var("WALLETRISK_SERVICE_ENDPOINT") {
        let v = v.trim();
        if !v.is_empty() {
            cfg.service.endpoint = v.to_string();
        }
    }
    if let Ok(v) = std::env::var("WALLETRISK_SERVICE_TIMEOUT_SECS") {
        cfg.service.timeout_secs = v
            .trim()
            .parse::<u64>()
            .with_context(|| "WALLETRISK_SERVICE_TIMEOUT_SECS")?;
    }
    if let Ok(v) = std::env::var("WALLETRISK_SERVICE_MIN_LATENCY_MS") {
        cfg.service.min_latency_ms = v
            .trim()
            .parse::<u64>()
            .with_context(|| "WALLETRISK_SERVICE_MIN_LATENCY_MS")?;
    }
    if let Ok(v) = std::env::var("WALLETRISK_UI_COLOR") {
        cfg.ui.color = parse_bool(&v).with_context(|| "WALLETRISK_UI_COLOR")?;
    }
    if let Ok(v) = std::env::var("WALLETRISK_UI_MAX_TABLE_ROWS") {
        cfg.ui.max_table_rows = v
            .trim()
            .parse::<usize>()
            .with_context(|| "WALLETRISK_UI_MAX_TABLE_ROWS")?;
    }

    Ok(())
}

fn parse_bool(s: &str) -> Result<bool> {
    let s = s.trim().to_ascii_lowercase();
    match s.as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(anyhow::anyhow!(
            "invalid boolean: {s} (expected true|false|1|0|yes|no|on|off)"
        )),
    }
}
