use std::io;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand};

use crate::client::HttpRiskClient;
use crate::config::EffectiveConfig;
use crate::core::NormalizedReport;
use crate::engine::{Engine, EngineOptions, IDLE_PROMPT, QueryOutcome};
use crate::ui::UiConfig;

#[derive(Debug, Parser)]
#[command(
    name = "walletrisk",
    version,
    about = "Look up a wallet's risk profile from a remote scoring service and render it as a report"
)]
pub struct Cli {
    #[arg(long, global = true)]
    pub json: bool,
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,
    #[arg(long, global = true)]
    pub verbose: bool,
    #[arg(long, global = true)]
    pub quiet: bool,
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Scoring service URL (overrides config and environment).
    #[arg(long, global = true)]
    pub endpoint: Option<String>,
    /// Request timeout in seconds; 0 disables it.
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    Lookup(LookupArgs),
    Ui(UiArgs),
    Completion(CompletionArgs),
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
pub struct LookupArgs {
    /// Wallet address to profile.
    pub wallet: Option<String>,
    #[arg(long)]
    pub markdown: bool,
}

#[derive(Debug, Args)]
pub struct UiArgs {}

#[derive(Debug, Args)]
pub struct CompletionArgs {
    pub shell: String,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[arg(long)]
    pub show: bool,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let stdin_is_tty = io::stdin().is_terminal();
    let stdout_is_tty = io::stdout().is_terminal();
    let stderr_is_tty = io::stderr().is_terminal();

    let home_dir = crate::config::home_dir();
    let env_config_path = std::env::var_os("WALLETRISK_CONFIG").map(PathBuf::from);
    let mut cfg = crate::config::load(
        cli.config.as_deref().or(env_config_path.as_deref()),
        home_dir.as_deref(),
    )
    .map_err(crate::exit::invalid_args_err)?;
    if let Some(endpoint) = &cli.endpoint {
        cfg.service.endpoint = endpoint.trim().to_string();
    }
    if let Some(timeout) = cli.timeout {
        cfg.service.timeout_secs = timeout;
    }

    let color = stdout_is_tty && cfg.ui.color && !cli.no_color;

    let ui_cfg = UiConfig {
        color,
        stdin_is_tty,
        stdout_is_tty,
        stderr_is_tty,
        max_table_rows: cfg.ui.max_table_rows,
        quiet: cli.quiet,
        verbose: cli.verbose,
    };

    let is_ui_mode = matches!(&cli.command, Commands::Ui(_));
    if !is_ui_mode {
        crate::logs::init(cli.verbose, cli.quiet, stderr_is_tty && !cli.no_color);
    }

    match cli.command {
        Commands::Lookup(args) => {
            if cli.json && args.markdown {
                return Err(crate::exit::invalid_args(
                    "--json and --markdown cannot be used together",
                ));
            }
            let engine = build_engine(
                &cfg,
                ui_cfg.stderr_is_tty && !cli.quiet && !cli.json,
            )?;
            let triggered = args.wallet.is_some();
            let candidate = args.wallet.as_deref().unwrap_or_default();
            match engine.submit(triggered, candidate) {
                QueryOutcome::Idle => crate::ui::print_idle(IDLE_PROMPT, &ui_cfg),
                QueryOutcome::Warning(msg) => {
                    crate::ui::eprintln_warning(msg, &ui_cfg);
                    return Err(crate::exit::reported(crate::exit::ExitCode::InvalidArgs));
                }
                QueryOutcome::Report(report) => {
                    if cli.json {
                        write_json(&report)?;
                    } else if args.markdown {
                        write_markdown_summary(&report)?;
                    } else {
                        crate::ui::print_report(&report, &ui_cfg);
                    }
                }
                QueryOutcome::Failed(err) => return Err(crate::exit::query_failed(err)),
            }
        }
        Commands::Ui(_args) => {
            if cli.json {
                return Err(crate::exit::invalid_args("ui cannot be combined with --json"));
            }
            if !(ui_cfg.stdin_is_tty && ui_cfg.stdout_is_tty) {
                return Err(crate::exit::invalid_args(
                    "ui requires a TTY (stdin + stdout)",
                ));
            }
            let engine = build_engine(&cfg, false)?;
            crate::tui::run(engine, ui_cfg.color, cfg.ui.max_table_rows)?;
        }
        Commands::Completion(args) => {
            let shell = parse_shell(&args.shell)?;
            let mut cmd = Cli::command();
            let mut out = std::io::stdout().lock();
            clap_complete::generate(shell, &mut cmd, "walletrisk", &mut out);
        }
        Commands::Config(args) => {
            if args.show {
                if cli.json {
                    let stdout = std::io::stdout();
                    serde_json::to_writer_pretty(stdout.lock(), &cfg)?;
                    println!();
                } else {
                    println!("{}", toml::to_string_pretty(&cfg)?);
                }
            } else if !ui_cfg.quiet {
                eprintln!("config: use `walletrisk config --show`");
            }
        }
    }

    Ok(())
}

fn build_engine(cfg: &EffectiveConfig, show_progress: bool) -> Result<Engine> {
    let client = HttpRiskClient::new(&cfg.service.endpoint, cfg.service.timeout())
        .map_err(crate::exit::invalid_args_err)?;
    Ok(Engine::new(
        EngineOptions {
            min_latency: cfg.service.min_latency(),
            show_progress,
        },
        Arc::new(client),
    ))
}

fn write_json(report: &NormalizedReport) -> Result<()> {
    use std::io::Write;

    let buf = serde_json::to_vec_pretty(report)?;

    let mut stdout = std::io::stdout().lock();
    match stdout.write_all(&buf) {
        Ok(()) => {}
        Err(err) if err.kind() == std::io::ErrorKind::BrokenPipe => return Ok(()),
        Err(err) => return Err(err.into()),
    }
    match stdout.write_all(b"\n") {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::BrokenPipe => Ok(()),
        Err(err) => Err(err.into()),
    }
}

fn write_markdown_summary(report: &NormalizedReport) -> Result<()> {
    use std::io::Write;

    let markdown = format_markdown_summary(report);
    let mut stdout = std::io::stdout().lock();
    match stdout.write_all(markdown.as_bytes()) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::BrokenPipe => Ok(()),
        Err(err) => Err(err.into()),
    }
}

fn format_markdown_summary(report: &NormalizedReport) -> String {
    use std::fmt::Write as _;

    let mut out = String::new();

    let _ = writeln!(out, "# Wallet risk report: {}", report.display_address);
    let _ = writeln!(out);
    let _ = writeln!(out, "- Wallet: `{}`", report.wallet);
    let _ = writeln!(
        out,
        "- Risk tier: **{}**",
        report.classification.tier.label()
    );
    let _ = writeln!(out, "- Risk score: {}", report.risk_score);
    let _ = writeln!(
        out,
        "- Total transactions: {}",
        report.summary.total_transactions
    );
    let _ = writeln!(out, "- Average fee: {}", report.summary.average_fee);
    let last_active = report.last_active.to_string();
    let _ = writeln!(
        out,
        "- Last active: {}",
        if last_active.is_empty() { "-" } else { last_active.as_str() }
    );
    let _ = writeln!(out, "- Risk level: {}", report.risk_level_display());

    let _ = writeln!(out);
    let _ = writeln!(out, "## Feature summary");
    let _ = writeln!(out);
    if report.features.is_empty() {
        let _ = writeln!(out, "_No features reported._");
    } else {
        let _ = writeln!(out, "| Feature | Value |");
        let _ = writeln!(out, "|---|---|");
        for feature in &report.features {
            let _ = writeln!(
                out,
                "| {} | {} |",
                escape_cell(&feature.name),
                escape_cell(&feature.value.to_string())
            );
        }
    }

    let series = report.chart_series();
    if !series.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "## Feature distribution");
        let _ = writeln!(out);
        let _ = writeln!(out, "| Feature | Value |");
        let _ = writeln!(out, "|---|---:|");
        for feature in series {
            let _ = writeln!(out, "| {} | {} |", escape_cell(&feature.name), feature.value);
        }
    }

    out
}

fn escape_cell(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', " ")
}

fn parse_shell(s: &str) -> Result<clap_complete::Shell> {
    let s = s.trim().to_ascii_lowercase();
    match s.as_str() {
        "bash" => Ok(clap_complete::Shell::Bash),
        "zsh" => Ok(clap_complete::Shell::Zsh),
        "fish" => Ok(clap_complete::Shell::Fish),
        other => Err(crate::exit::invalid_args(format!(
            "unsupported shell: {other} (expected bash|zsh|fish)"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Feature, LastActive, Score, classify, compose, shape};
    use serde_json::json;

    fn report(last_active: LastActive, features: Vec<Feature>) -> NormalizedReport {
        let (full, numeric) = shape(&features);
        compose(
            "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM",
            classify(55.0),
            Score::from(50),
            Score::from_f64(55.0).expect("finite"),
            last_active,
            full,
            numeric,
        )
    }

    #[test]
    fn markdown_lists_summary_and_sorted_distribution() {
        let md = format_markdown_summary(&report(
            LastActive::DaysAgo(12),
            vec![
                Feature::new("low", json!(2)),
                Feature::new("note", json!("a|b")),
                Feature::new("high", json!(9.5)),
            ],
        ));
        assert!(md.starts_with("# Wallet risk report: 9WzDXw...AWWM\n"), "{md}");
        assert!(md.contains("- Risk tier: **MEDIUM RISK**\n"), "{md}");
        assert!(md.contains("- Last active: 12 days ago\n"), "{md}");
        assert!(md.contains("- Risk score: 50\n"), "{md}");
        assert!(md.contains("- Risk level: 55.0%\n"), "{md}");
        assert!(md.contains("| note | a\\|b |\n"), "{md}");
        let dist = md.split("## Feature distribution").nth(1).expect("distribution");
        let high = dist.find("| high |").expect("high row");
        let low = dist.find("| low |").expect("low row");
        assert!(high < low);
        assert!(!dist.contains("note"));
    }

    #[test]
    fn markdown_marks_unknown_last_active() {
        let md = format_markdown_summary(&report(LastActive::Raw(String::new()), vec![]));
        assert!(md.contains("- Last active: -\n"), "{md}");
        assert!(md.contains("_No features reported._"), "{md}");
        assert!(!md.contains("## Feature distribution"), "{md}");
    }

    #[test]
    fn parse_shell_rejects_unknown_shells() {
        assert!(parse_shell(" ZSH ").is_ok());
        assert!(parse_shell("powershell").is_err());
    }
}
