use anyhow::Error;
use std::io::{self, Write};
use unicode_width::UnicodeWidthChar;

use crate::core::{NormalizedReport, RiskTier, TierColor};

const CHART_WIDTH: usize = 40;

#[derive(Debug, Clone)]
pub struct UiConfig {
    pub color: bool,
    pub stdin_is_tty: bool,
    pub stdout_is_tty: bool,
    pub stderr_is_tty: bool,
    pub max_table_rows: usize,
    pub quiet: bool,
    pub verbose: bool,
}

pub fn eprintln_error(err: &Error) {
    let mut stderr = io::stderr().lock();
    let _ = writeln!(stderr, "error:");
    let _ = writeln!(stderr, "  {err}");

    let top = err.to_string();
    let mut causes = err
        .chain()
        .skip(1)
        .filter(|cause| cause.to_string() != top)
        .peekable();
    if causes.peek().is_some() {
        let _ = writeln!(stderr, "caused by:");
        for cause in causes {
            let _ = writeln!(stderr, "  - {cause}");
        }
    }

    let _ = writeln!(stderr, "next:");
    let _ = writeln!(
        stderr,
        "  - re-run with `--verbose` to see request diagnostics"
    );
    let _ = writeln!(
        stderr,
        "  - see `walletrisk --help` for available commands and options"
    );
}

pub fn print_idle(message: &str, cfg: &UiConfig) {
    if cfg.quiet {
        return;
    }
    let mut out = io::stdout().lock();
    let _ = writeln!(out, "{message}");
}

pub fn eprintln_warning(message: &str, cfg: &UiConfig) {
    let mut stderr = io::stderr().lock();
    if cfg.color && cfg.stderr_is_tty {
        let _ = writeln!(stderr, "\x1b[33mwarning:\x1b[0m {message}");
    } else {
        let _ = writeln!(stderr, "warning: {message}");
    }
}

pub fn print_report(report: &NormalizedReport, cfg: &UiConfig) {
    if cfg.quiet {
        return;
    }
    let mut out = io::stdout().lock();
    write_report(&mut out, report, cfg);
}

pub fn write_report(out: &mut dyn Write, report: &NormalizedReport, cfg: &UiConfig) {
    let tier = report.classification.tier;
    let _ = writeln!(
        out,
        "{}  [{}]",
        report.display_address,
        format_tier(tier, cfg.color)
    );
    if cfg.verbose && report.display_address != report.wallet {
        let _ = writeln!(out, "{}", report.wallet);
    }

    let _ = writeln!(out);
    let cards = [
        ("Risk Score", format_tier_value(&report.risk_score.to_string(), tier, cfg.color)),
        (
            "Total Transactions",
            report.summary.total_transactions.to_string(),
        ),
        ("Avg. Fee", report.summary.average_fee.to_string()),
        ("Last Active", report.last_active.to_string()),
        ("Risk Level", report.risk_level_display()),
    ];
    let label_w = cards
        .iter()
        .map(|(label, _)| visible_width_ansi(label))
        .max()
        .unwrap_or(0);
    for (label, value) in &cards {
        let _ = writeln!(out, "{}  {}", pad_end_display(label, label_w), value);
    }

    let _ = writeln!(out);
    let total = report.features.len();
    let rows = cfg.max_table_rows.min(total);
    if total > rows {
        let _ = writeln!(out, "Feature Summary ({rows} shown / {total} total):");
    } else {
        let _ = writeln!(out, "Feature Summary ({total}):");
    }
    if total == 0 {
        let _ = writeln!(out, "(no features reported)");
    } else {
        print_features_table(out, report, rows, cfg.verbose);
        if total > rows {
            let _ = writeln!(out, "...({} more)", total - rows);
        }
    }

    let series = report.chart_series();
    if !series.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Feature Distribution:");
        let name_w = series
            .iter()
            .map(|f| visible_width_ansi(&f.name))
            .max()
            .unwrap_or(0);
        let max_value = series
            .iter()
            .map(|f| f.value)
            .fold(0.0_f64, f64::max);
        for feature in series {
            let len = bar_len(feature.value, max_value, CHART_WIDTH);
            let bar = format_tier_value(&"█".repeat(len), tier, cfg.color);
            let _ = writeln!(
                out,
                "{}  {}{}  {}",
                pad_end_display(&feature.name, name_w),
                bar,
                " ".repeat(CHART_WIDTH - len),
                feature.value
            );
        }
    }
}

fn print_features_table(out: &mut dyn Write, report: &NormalizedReport, rows: usize, verbose: bool) {
    let label_name = "Feature";
    let label_value = "Value";
    let label_kind = "Type";

    let name_w = report
        .features
        .iter()
        .take(rows)
        .map(|f| visible_width_ansi(&f.name))
        .max()
        .unwrap_or(0)
        .max(visible_width_ansi(label_name));
    let value_w = report
        .features
        .iter()
        .take(rows)
        .map(|f| visible_width_ansi(&f.value.to_string()))
        .max()
        .unwrap_or(0)
        .max(visible_width_ansi(label_value));

    if verbose {
        let _ = writeln!(
            out,
            "{}  {}  {}",
            pad_end_display(label_name, name_w),
            pad_end_display(label_value, value_w),
            label_kind
        );
        let _ = writeln!(
            out,
            "{}  {}  {}",
            "-".repeat(name_w),
            "-".repeat(value_w),
            "-".repeat(visible_width_ansi(label_kind))
        );
    } else {
        let _ = writeln!(out, "{}  {}", pad_end_display(label_name, name_w), label_value);
        let _ = writeln!(out, "{}  {}", "-".repeat(name_w), "-".repeat(value_w));
    }

    for feature in report.features.iter().take(rows) {
        let name = pad_end_display(&feature.name, name_w);
        let value = feature.value.to_string();
        if verbose {
            let _ = writeln!(
                out,
                "{name}  {}  {}",
                pad_end_display(&value, value_w),
                feature.value.kind()
            );
        } else {
            let _ = writeln!(out, "{name}  {value}");
        }
    }
}

/// Bar length in cells, proportional to the largest positive value.
/// Zero and negative values get no bar.
pub fn bar_len(value: f64, max_value: f64, width: usize) -> usize {
    if value <= 0.0 || max_value <= 0.0 || !value.is_finite() {
        return 0;
    }
    let ratio = (value / max_value).min(1.0);
    let len = (ratio * width as f64).round() as usize;
    len.clamp(1, width)
}

fn tier_ansi_code(color: TierColor) -> &'static str {
    match color {
        TierColor::Red => "31",
        TierColor::Gray => "90",
        TierColor::Green => "32",
    }
}

pub fn format_tier(tier: RiskTier, color: bool) -> String {
    let s = tier.label();
    if !color {
        return s.to_string();
    }
    format!("\x1b[1;{}m{s}\x1b[0m", tier_ansi_code(tier.color()))
}

fn format_tier_value(s: &str, tier: RiskTier, color: bool) -> String {
    if !color || s.is_empty() {
        return s.to_string();
    }
    format!("\x1b[{}m{s}\x1b[0m", tier_ansi_code(tier.color()))
}

fn pad_end_display(s: &str, width: usize) -> String {
    let w = visible_width_ansi(s);
    if w >= width {
        return s.to_string();
    }
    format!("{s}{}", " ".repeat(width - w))
}

fn visible_width_ansi(s: &str) -> usize {
    let mut width: usize = 0;
    let mut chars = s.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\x1b' && chars.peek() == Some(&'[') {
            let _ = chars.next();
            for ch2 in chars.by_ref() {
                if ch2 == 'm' {
                    break;
                }
            }
            continue;
        }
        width = width.saturating_add(UnicodeWidthChar::width(ch).unwrap_or(0));
    }
    width
}
