use std::io;
use std::panic;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, Borders, Cell, Paragraph, Row, Table, Wrap};

use crate::client::ClientError;
use crate::core::{NormalizedReport, RiskTier, TierColor};
use crate::engine::{
    Engine, IDLE_PROMPT, InputOutcome, MISSING_IDENTIFIER_WARNING, WalletQuery, validate_input,
};

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const BAR_SCALE: f64 = 1000.0;

pub fn run(engine: Engine, color: bool, max_table_rows: usize) -> Result<()> {
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;

    let mut terminal =
        Terminal::new(CrosstermBackend::new(stdout)).context("failed to initialize terminal")?;
    terminal.clear().ok();

    let res = panic::catch_unwind(panic::AssertUnwindSafe(|| {
        run_app(&mut terminal, engine, color, max_table_rows)
    }));

    let _ = terminal.show_cursor();
    let _ = disable_raw_mode();
    let mut stdout = io::stdout();
    let _ = execute!(stdout, LeaveAlternateScreen);

    match res {
        Ok(res) => res,
        Err(_) => Err(anyhow::anyhow!(
            "the dashboard panicked (terminal state has been restored)"
        )),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Idle,
    Warning,
    Running,
    Report,
    Error,
}

struct PendingQuery {
    identifier: String,
    rx: mpsc::Receiver<Result<NormalizedReport, ClientError>>,
}

struct App {
    screen: Screen,
    input: String,
    report: Option<NormalizedReport>,
    error: Option<String>,
    pending: Option<PendingQuery>,
    color: bool,
    max_table_rows: usize,
    tick: u64,
}

impl App {
    fn new(color: bool, max_table_rows: usize) -> Self {
        Self {
            screen: Screen::Idle,
            input: String::new(),
            report: None,
            error: None,
            pending: None,
            color,
            max_table_rows,
            tick: 0,
        }
    }
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    engine: Engine,
    color: bool,
    max_table_rows: usize,
) -> Result<()> {
    let mut app = App::new(color, max_table_rows);

    let tick_rate = Duration::from_millis(120);
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| draw(f, &app)).context("failed to draw")?;

        poll_pending(&mut app);

        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        if event::poll(timeout).context("failed to poll terminal events")? {
            if let Event::Key(key) = event::read().context("failed to read terminal event")? {
                if key.kind == KeyEventKind::Press && handle_key(&mut app, &engine, key) {
                    break;
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.tick = app.tick.wrapping_add(1);
            last_tick = Instant::now();
        }
    }

    Ok(())
}

/// Moves a finished background query into the app. Returns true when one landed.
fn poll_pending(app: &mut App) -> bool {
    let Some(pending) = app.pending.take() else {
        return false;
    };
    match pending.rx.try_recv() {
        Ok(Ok(report)) => {
            app.report = Some(report);
            app.error = None;
            app.screen = Screen::Report;
            true
        }
        Ok(Err(err)) => {
            tracing::warn!(wallet = %pending.identifier, error = %err, "lookup failed");
            app.report = None;
            app.error = Some(err.to_string());
            app.screen = Screen::Error;
            true
        }
        Err(mpsc::TryRecvError::Empty) => {
            app.pending = Some(pending);
            false
        }
        Err(mpsc::TryRecvError::Disconnected) => {
            app.report = None;
            app.error = Some("the lookup worker stopped before returning a result".to_string());
            app.screen = Screen::Error;
            true
        }
    }
}

/// Returns true when the dashboard should exit.
fn handle_key(app: &mut App, engine: &Engine, key: KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }

    match key.code {
        KeyCode::Esc => return true,
        KeyCode::Enter => {
            if app.pending.is_some() {
                return false;
            }
            match validate_input(true, &app.input) {
                InputOutcome::Proceed(query) => start_query(app, engine.clone(), query),
                InputOutcome::Warn(_) => {
                    app.report = None;
                    app.error = None;
                    app.screen = Screen::Warning;
                }
                InputOutcome::Idle => app.screen = Screen::Idle,
            }
        }
        KeyCode::Backspace => {
            app.input.pop();
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.input.push(c);
        }
        _ => {}
    }
    false
}

fn start_query(app: &mut App, engine: Engine, query: WalletQuery) {
    let (tx, rx) = mpsc::channel();
    let identifier = query.identifier().to_string();
    thread::spawn(move || {
        let _ = tx.send(engine.query(&query));
    });
    app.pending = Some(PendingQuery { identifier, rx });
    app.report = None;
    app.error = None;
    app.screen = Screen::Running;
}

fn draw(f: &mut ratatui::Frame, app: &App) {
    let size = f.size();

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(36), Constraint::Min(1)])
        .split(size);

    draw_sidebar(f, columns[0], app);

    let main = columns[1];
    match app.screen {
        Screen::Idle => draw_message(f, main, IDLE_PROMPT, Style::default()),
        Screen::Warning => draw_message(
            f,
            main,
            MISSING_IDENTIFIER_WARNING,
            accent(Color::Yellow, app.color),
        ),
        Screen::Running => draw_running(f, main, app),
        Screen::Report => draw_report(f, main, app),
        Screen::Error => draw_error(f, main, app),
    }
}

fn draw_sidebar(f: &mut ratatui::Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
        ])
        .split(area);

    let title = Line::from(vec![
        Span::styled("walletrisk", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    let w = Paragraph::new(title).block(Block::default().borders(Borders::ALL));
    f.render_widget(w, chunks[0]);

    let input = Line::from(vec![
        Span::raw(app.input.as_str()),
        Span::styled("▏", Style::default().add_modifier(Modifier::SLOW_BLINK)),
    ]);
    let w = Paragraph::new(input).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Wallet address"),
    );
    f.render_widget(w, chunks[1]);

    let help = Text::from(vec![
        Line::from("Enter      search"),
        Line::from("Backspace  edit"),
        Line::from("Esc        quit"),
    ]);
    let w = Paragraph::new(help)
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL).title("Keys"));
    f.render_widget(w, chunks[2]);
}

fn draw_message(f: &mut ratatui::Frame, area: Rect, msg: &str, style: Style) {
    let w = Paragraph::new(Span::styled(msg.to_string(), style))
        .block(Block::default().borders(Borders::ALL))
        .wrap(Wrap { trim: false });
    f.render_widget(w, centered_rect(70, 30, area));
}

fn draw_running(f: &mut ratatui::Frame, area: Rect, app: &App) {
    let s = SPINNER[(app.tick as usize) % SPINNER.len()];
    let target = app
        .pending
        .as_ref()
        .map(|p| p.identifier.as_str())
        .unwrap_or_default();
    let w = Paragraph::new(Line::from(vec![
        Span::styled(s, Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" Analyzing "),
        Span::raw(crate::core::truncate_address(target)),
        Span::raw("..."),
    ]))
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(w, centered_rect(60, 20, area));
}

fn draw_error(f: &mut ratatui::Frame, area: Rect, app: &App) {
    let msg = app.error.as_deref().unwrap_or("unknown error");
    let w = Paragraph::new(msg.to_string())
        .style(accent(Color::Red, app.color))
        .block(Block::default().borders(Borders::ALL).title("Error"))
        .wrap(Wrap { trim: false });
    f.render_widget(w, area);
}

fn draw_report(f: &mut ratatui::Frame, area: Rect, app: &App) {
    let Some(report) = app.report.as_ref() else {
        return;
    };
    let tier = report.classification.tier;
    let style = tier_style(tier, app.color);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Min(3),
        ])
        .split(area);

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            report.display_address.as_str(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(format!("[{}]", tier.label()), style.add_modifier(Modifier::BOLD)),
    ]))
    .block(Block::default().borders(Borders::ALL).title("Wallet"));
    f.render_widget(header, chunks[0]);

    draw_cards(f, chunks[1], report, style);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[2]);
    draw_feature_table(f, body[0], report, app.max_table_rows);
    draw_feature_chart(f, body[1], report, style);
}

fn draw_cards(f: &mut ratatui::Frame, area: Rect, report: &NormalizedReport, style: Style) {
    let cards = [
        ("Risk Score", report.risk_score.to_string(), style),
        (
            "Total Transactions",
            report.summary.total_transactions.to_string(),
            Style::default(),
        ),
        (
            "Avg. Fee",
            report.summary.average_fee.to_string(),
            Style::default(),
        ),
        ("Last Active", report.last_active.to_string(), Style::default()),
        ("Risk Level", report.risk_level_display(), Style::default()),
    ];
    let slots = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 5); 5])
        .split(area);
    for ((label, value, value_style), slot) in cards.into_iter().zip(slots.iter()) {
        let w = Paragraph::new(Text::from(vec![
            Line::from(Span::styled(value, value_style.add_modifier(Modifier::BOLD))),
        ]))
        .block(Block::default().borders(Borders::ALL).title(label));
        f.render_widget(w, *slot);
    }
}

fn draw_feature_table(f: &mut ratatui::Frame, area: Rect, report: &NormalizedReport, max_rows: usize) {
    let total = report.features.len();
    let shown = max_rows.min(total);
    let title = if shown < total {
        format!("Feature Summary ({shown}/{total})")
    } else {
        format!("Feature Summary ({total})")
    };

    let rows: Vec<Row> = report
        .features
        .iter()
        .take(shown)
        .map(|feature| {
            Row::new(vec![
                Cell::from(feature.name.clone()),
                Cell::from(feature.value.to_string()),
            ])
        })
        .collect();
    let table = Table::new(rows, [Constraint::Percentage(55), Constraint::Percentage(45)])
        .header(
            Row::new(vec!["Feature", "Value"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(table, area);
}

fn draw_feature_chart(f: &mut ratatui::Frame, area: Rect, report: &NormalizedReport, style: Style) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Feature Distribution");
    let series = report.chart_series();
    if series.is_empty() {
        let w = Paragraph::new("No numeric features.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(w, area);
        return;
    }

    let bars: Vec<Bar> = series
        .iter()
        .map(|feature| {
            Bar::default()
                .label(Line::from(feature.name.clone()))
                .value(bar_value(feature.value))
                .text_value(feature.value.to_string())
                .style(style)
        })
        .collect();
    let chart = BarChart::default()
        .block(block)
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .data(BarGroup::default().bars(&bars));
    f.render_widget(chart, area);
}

/// Bars are integer-valued, so values are scaled and non-positive values get no bar.
fn bar_value(value: f64) -> u64 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    (value * BAR_SCALE).round() as u64
}

fn tier_style(tier: RiskTier, enabled: bool) -> Style {
    let color = match tier.color() {
        TierColor::Red => Color::Red,
        TierColor::Gray => Color::Gray,
        TierColor::Green => Color::Green,
    };
    accent(color, enabled)
}

fn accent(color: Color, enabled: bool) -> Style {
    if enabled {
        Style::default().fg(color)
    } else {
        Style::default()
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
