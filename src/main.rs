use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

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
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use blockpulse::{
    events, ui, App, DataSource, Denomination, FileSource, FreshnessMonitor, Settings,
    StreamSource, Thresholds, TimeFrame,
};

#[derive(Parser, Debug)]
#[command(name = "blockpulse")]
#[command(about = "Latest blocks with their fees, and a warning when the feed stalls")]
struct Args {
    /// Path to a JSON feed file, re-read when it changes
    #[arg(short, long, default_value = "feed.json", conflicts_with_all = ["connect"])]
    file: PathBuf,

    /// Connect to a TCP endpoint for newline-delimited updates (host:port)
    #[arg(short, long, conflicts_with_all = ["file"])]
    connect: Option<String>,

    /// Configuration file (TOML, YAML or JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Age of the newest block after which the feed counts as stalled (e.g., "30m")
    #[arg(long)]
    stale_after: Option<String>,

    /// Refresh interval in seconds (only used with --file)
    #[arg(short, long)]
    refresh: Option<u64>,

    /// Fee unit: eth or usd
    #[arg(short, long)]
    unit: Option<Denomination>,

    /// Base fee time frame (5m, 1h, 1d, 7d, 30d, since_burn, since_merge)
    #[arg(short, long)]
    time_frame: Option<TimeFrame>,

    /// Write logs to this file (the terminal belongs to the UI)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(ref path) = args.log_file {
        init_logging(path)?;
    }

    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(stale_after) = args.stale_after {
        settings.stale_after = stale_after;
    }
    if let Some(refresh) = args.refresh {
        settings.refresh_secs = refresh;
    }
    if let Some(unit) = args.unit {
        settings.unit = unit;
    }
    if let Some(time_frame) = args.time_frame {
        settings.time_frame = time_frame;
    }
    let thresholds = settings.thresholds()?;

    // The freshness timer and stream readers run on this runtime while the
    // UI loop stays on the main thread.
    let rt = tokio::runtime::Runtime::new()?;
    let _guard = rt.enter();

    if let Some(ref addr) = args.connect {
        return run_with_tcp(&rt, addr, &settings, thresholds);
    }

    run_with_file(&args.file, &settings, thresholds)
}

/// Install a file-backed tracing subscriber. Honours `RUST_LOG`.
fn init_logging(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Run with a file-based data source
fn run_with_file(path: &Path, settings: &Settings, thresholds: Thresholds) -> Result<()> {
    let source = Box::new(FileSource::new(path));
    run_tui(source, settings, thresholds, settings.refresh_interval())
}

/// Run with a TCP stream data source
fn run_with_tcp(
    rt: &tokio::runtime::Runtime,
    addr: &str,
    settings: &Settings,
    thresholds: Thresholds,
) -> Result<()> {
    let source = rt.block_on(async {
        use tokio::net::TcpStream;

        println!("Connecting to {}...", addr);
        match TcpStream::connect(addr).await {
            Ok(stream) => {
                println!("Connected!");
                Ok(Box::new(StreamSource::spawn(stream, addr)) as Box<dyn DataSource>)
            }
            Err(e) => Err(anyhow::anyhow!("Failed to connect to {}: {}", addr, e)),
        }
    })?;

    // Updates are pushed, so poll continuously
    run_tui(source, settings, thresholds, Duration::from_millis(100))
}

/// Run the TUI with the given data source
fn run_tui(
    source: Box<dyn DataSource>,
    settings: &Settings,
    thresholds: Thresholds,
    refresh_interval: Duration,
) -> Result<()> {
    info!(
        source = source.description(),
        stale_after = ?thresholds.stale_after,
        "starting"
    );

    // Create app and start the freshness timer before touching the terminal
    let monitor = FreshnessMonitor::new(thresholds);
    let mut app = App::new(source, monitor, settings.unit, settings.time_frame);
    app.start()?;
    app.reload_data();

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

    let result = run_app(&mut terminal, &mut app, refresh_interval);

    // Stops the timer even when the loop failed
    app.quit();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        warn!(error = %e, "ui loop failed");
    }
    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    refresh_interval: Duration,
) -> Result<()> {
    let mut last_refresh = Instant::now();

    // Minimum terminal size for usable display
    const MIN_WIDTH: u16 = 40;
    const MIN_HEIGHT: u16 = 10;

    while app.running {
        terminal.draw(|frame| {
            let area = frame.area();

            if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
                let msg = format!(
                    "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
                    area.width, area.height, MIN_WIDTH, MIN_HEIGHT
                );
                let paragraph = ratatui::widgets::Paragraph::new(msg)
                    .alignment(ratatui::layout::Alignment::Center)
                    .style(ratatui::style::Style::default().fg(ratatui::style::Color::Yellow));
                let centered =
                    ratatui::layout::Rect::new(0, (area.height / 2).saturating_sub(2), area.width, 5)
                        .intersection(area);
                frame.render_widget(paragraph, centered);
                return;
            }

            let chunks = Layout::vertical([
                Constraint::Length(1), // Header bar
                Constraint::Min(6),    // Latest blocks
                Constraint::Length(1), // Status bar
            ])
            .split(area);

            ui::common::render_header(frame, app, chunks[0]);
            ui::blocks::render(frame, app, chunks[1]);
            ui::common::render_status_bar(frame, app, chunks[2]);

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

        if last_refresh.elapsed() >= refresh_interval {
            app.reload_data();
            last_refresh = Instant::now();
        }
    }

    Ok(())
}
