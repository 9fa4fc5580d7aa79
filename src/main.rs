use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::Event,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    Terminal,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use blockwatch::ui::{self, Theme};
use blockwatch::{events, App, Overrides, PollHandle, Poller, RpcClient, Settings};

#[derive(Parser, Debug)]
#[command(name = "blockwatch")]
#[command(about = "Live terminal panel for a Tendermint/CometBFT node")]
struct Args {
    /// Path to a TOML settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Base URL of the node's RPC interface
    #[arg(long)]
    rpc: Option<String>,

    /// Polling period in milliseconds
    #[arg(short, long)]
    interval_ms: Option<u64>,

    /// Per-request timeout in milliseconds
    #[arg(short, long)]
    timeout_ms: Option<u64>,

    /// Do not poll the validator set size
    #[arg(long)]
    no_validators: bool,

    /// Write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            rpc_url: self.rpc.clone(),
            interval_ms: self.interval_ms,
            timeout_ms: self.timeout_ms,
            validators: self.no_validators.then_some(false),
            log_file: self.log_file.clone(),
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let settings = Settings::load(args.config.as_deref(), &args.overrides())?;

    if let Some(ref path) = settings.log_file {
        init_logging(path)?;
    }

    let client = RpcClient::builder()
        .endpoint(settings.rpc_url.clone())
        .timeout(settings.timeout())
        .build()
        .context("failed to build HTTP client")?;

    // The poller runs on the runtime's worker threads while the TUI owns
    // the main thread
    let rt = tokio::runtime::Runtime::new()?;
    let handle = rt.block_on(async {
        Poller::builder(Arc::new(client))
            .interval(settings.interval())
            .validators(settings.validators)
            .build()
            .start()
    });
    info!(rpc = %settings.rpc_url, interval_ms = settings.interval_ms, "polling started");

    let mut app = App::new(handle.feed(), Theme::auto_detect());
    app.validators_enabled = settings.validators;
    app.sample_interval = settings.interval();

    let result = run_tui(&mut app, &handle);

    rt.block_on(handle.stop());
    info!("polling stopped");

    result
}

/// Send tracing output to a file; the terminal belongs to the TUI.
fn init_logging(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("blockwatch=info")),
        )
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}

/// Run the TUI until the user quits
fn run_tui(app: &mut App, handle: &PollHandle) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic);
    }));

    let result = run_app(&mut terminal, app, handle);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    handle: &PollHandle,
) -> Result<()> {
    // Minimum terminal size for usable display
    const MIN_WIDTH: u16 = 60;
    const MIN_HEIGHT: u16 = 20;

    while app.running {
        app.reload_data();

        terminal.draw(|frame| {
            let area = frame.area();

            // Check for minimum terminal size
            if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
                let msg = format!(
                    "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
                    area.width, area.height, MIN_WIDTH, MIN_HEIGHT
                );
                let paragraph = ratatui::widgets::Paragraph::new(msg)
                    .alignment(ratatui::layout::Alignment::Center)
                    .style(ratatui::style::Style::default().fg(ratatui::style::Color::Yellow));
                let centered = ratatui::layout::Rect::new(
                    0,
                    (area.height / 2).saturating_sub(2),
                    area.width,
                    5.min(area.height),
                );
                frame.render_widget(paragraph, centered);
                return;
            }

            let chunks = Layout::vertical([
                Constraint::Length(1),                      // Header bar
                Constraint::Length(ui::panel::height(app)), // Values
                Constraint::Min(8),                         // Charts
                Constraint::Length(1),                      // Status bar
            ])
            .split(area);

            ui::common::render_header(frame, app, chunks[0]);
            ui::panel::render(frame, app, chunks[1]);
            ui::chart::render(frame, app, chunks[2]);
            ui::common::render_status_bar(frame, app, chunks[3]);

            if app.show_help {
                ui::common::render_help(frame, app, area);
            }
        })?;

        // Poll for events with a short timeout
        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Resize(_, _) => {
                    // Terminal will redraw on next iteration
                }
                _ => {}
            }
        }

        if app.take_refresh_request() {
            handle.refresh();
        }
    }

    Ok(())
}
