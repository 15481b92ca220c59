//! A terminal dashboard for hospital ward panels.
//!
//! Polls a panel's data endpoint and shows it as a sortable, filterable
//! table that scrolls itself on unattended screens.
//! Run with `--list-panels` to see which panels the configured user may open.

mod app;
mod config;
mod core;
mod ui;

use std::fs::File;
use std::io::{self, stderr, Stderr};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use tokio::sync::mpsc;

use crate::app::{
    client::{panel_url, PanelClient},
    event::{spawn_event_reader, AppEvent, ControlEvent},
    handler,
    state::AppState,
};
use crate::config::AppConfig;
use crate::core::{
    access::{self, Permissions},
    column::PanelDef,
    display::{render_stats, TableModel},
};
use crate::ui::{
    bars::{FilterBar, StatsBar},
    layout::AppLayout,
    popup::HelpPopup,
    spinner::FetchIndicator,
    table_widget::{self, PanelTable},
    theme::Theme,
};

// ───────────────────────────────────────── CLI ───────────────

#[derive(Parser, Debug)]
#[command(name = env!("CARGO_PKG_NAME"), version, about = "Terminal dashboard for hospital ward panels")]
struct Cli {
    /// Panel to open.
    #[arg(default_value = "painel2")]
    panel: String,

    /// Base URL of the panel API (overrides the config file).
    #[arg(long)]
    origin: Option<String>,

    /// Poll interval in milliseconds (overrides the config file).
    #[arg(long, value_name = "MS")]
    interval: Option<u64>,

    /// JSON table layout for panels without a built-in one.
    #[arg(long, value_name = "FILE")]
    layout: Option<PathBuf>,

    /// Print the panels the configured user may open and exit.
    #[arg(long)]
    list_panels: bool,

    /// Write the effective configuration to the config file and exit.
    #[arg(long)]
    write_config: bool,

    /// Write logs to this file instead of stderr.
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

// ───────────────────────────────────────── setup ─────────────

/// Logs go to `log_file` when given; otherwise to stderr, and only when
/// `RUST_LOG` asks for them, since stderr is also the drawing surface.
fn init_tracing(log_file: Option<&Path>) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env();
    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("creating log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None if std::env::var_os("RUST_LOG").is_some() => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::stderr) // never pollute stdout
                .init();
        }
        None => {}
    }
    Ok(())
}

/// Pick the table layout for `panel`, refusing panels the user may not open.
fn resolve_panel(panel: &str, layout: Option<&Path>, permissions: &Permissions) -> Result<PanelDef> {
    if !access::is_known_panel(panel) {
        bail!(
            "unknown panel `{panel}` (known: {})",
            access::PANELS.join(", ")
        );
    }
    if !permissions.can_access(panel) {
        bail!("access to `{panel}` is not granted; add it to `permissions` in the config file");
    }

    let mut def = match layout {
        Some(path) => PanelDef::from_json_file(path)?,
        None => PanelDef::builtin(panel).with_context(|| {
            format!("`{panel}` has no built-in table layout; pass one with --layout")
        })?,
    };
    def.id = panel.to_string();
    Ok(def)
}

// ───────────────────────────────────────── drawing ───────────

fn draw(frame: &mut Frame, state: &mut AppState) {
    let layout = AppLayout::from_area(frame.area());

    let stats = render_stats(
        state.view.total(),
        state.view.filtered_len(),
        state.view.last_refresh(),
    );
    frame.render_widget(
        StatsBar {
            title: &state.panel.title,
            stats: &stats,
            autoscroll: state.refresh.is_autoscrolling(),
            polling: state.refresh.is_polling(),
        },
        layout.title_area,
    );
    frame.render_widget(
        FilterBar {
            filters: state.view.filters(),
            state: state.view.filter_state(),
            focused: state.focused_filter,
        },
        layout.filter_area,
    );

    let table_block = Block::default()
        .title(format!(" {} ", state.panel.id))
        .title_style(Theme::title_style())
        .borders(Borders::ALL)
        .border_style(Theme::border_style());

    // Remember the geometry for scrolling and mouse hit-testing.
    let inner = table_block.inner(layout.table_area);
    state.table_area = inner;
    state.viewport_rows = table_widget::body_rows(inner);

    let model = TableModel::build(&state.view);
    frame.render_widget(
        PanelTable::new(&model, state.view.columns())
            .offset(state.scroll.offset())
            .selected_column(state.selected_column)
            .block(table_block),
        layout.table_area,
    );
    frame.render_widget(
        FetchIndicator {
            visible: state.refresh.is_fetching(),
            tick: state.tick,
        },
        layout.table_area,
    );

    let hint = state.config.status_bar_hint();
    let status_text = state.status_message.as_deref().unwrap_or(&hint);
    frame.render_widget(
        Paragraph::new(status_text).style(Theme::status_bar_style()),
        layout.status_area,
    );

    if state.show_help {
        frame.render_widget(HelpPopup { config: &state.config }, frame.area());
    }
}

// ───────────────────────────────────────── event loop ────────

async fn run(
    terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    state: &mut AppState,
    control_rx: &mut mpsc::UnboundedReceiver<ControlEvent>,
) -> Result<()> {
    let mut events = spawn_event_reader(Duration::from_millis(100));

    loop {
        terminal.draw(|frame| draw(frame, state))?;

        tokio::select! {
            biased;

            Some(event) = events.recv() => {
                match event {
                    AppEvent::Key(k) => handler::handle_key(state, k),
                    AppEvent::Mouse(m) => handler::handle_mouse(state, m),
                    AppEvent::Resize(_, _) => {}
                    AppEvent::Tick => state.tick = state.tick.wrapping_add(1),
                }
            }

            Some(event) = control_rx.recv() => {
                handler::handle_control(state, event);
                // Drain everything already queued before redrawing.
                while let Ok(event) = control_rx.try_recv() {
                    handler::handle_control(state, event);
                }
            }

            else => break,
        }

        if state.should_quit {
            break;
        }
    }
    Ok(())
}

// ───────────────────────────────────────── main ─────────────

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_file.as_deref())?;

    let mut user_config = AppConfig::load();
    if let Some(origin) = cli.origin.as_deref() {
        user_config.api_origin = origin.trim_end_matches('/').to_string();
    }
    if let Some(ms) = cli.interval {
        user_config.poll_interval_ms = ms.max(1_000);
    }

    // ── one-shot modes ────────────────────────────────────────
    if cli.write_config {
        let path = user_config.save()?;
        println!("{}", path.display());
        return Ok(());
    }
    let permissions = user_config.permissions();
    if cli.list_panels {
        for panel in permissions.visible_panels() {
            println!("{panel}");
        }
        return Ok(());
    }

    // ── panel + client ────────────────────────────────────────
    let panel = resolve_panel(&cli.panel, cli.layout.as_deref(), &permissions)?;
    let url = panel_url(&user_config.api_origin, &panel.id, &panel.resource);
    let client = PanelClient::new(url, user_config.request_timeout())
        .context("building HTTP client")?;
    tracing::info!(url = client.url(), "starting");

    // ── terminal setup ────────────────────────────────────────
    enable_raw_mode()?;
    let mut stderr_handle = stderr();
    execute!(stderr_handle, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stderr());
    let mut terminal = Terminal::new(backend)?;

    let (control_tx, mut control_rx) = mpsc::unbounded_channel();
    let mut state = AppState::mount(panel, user_config, client, control_tx);

    let outcome = run(&mut terminal, &mut state, &mut control_rx).await;
    state.unmount();

    // ── teardown ──────────────────────────────────────────────
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    outcome
}
