use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use tinydash::app::App;
use tinydash::config::{self, Geometry, ItemLoader, Settings};
use tinydash::events;
use tinydash::sensor::{ProbeOutcome, SensorId, SystemProber};
use tinydash::ui::{self, Theme};

#[derive(Parser, Debug)]
#[command(name = "tinydash")]
#[command(about = "Simple dashboard application")]
struct Args {
    /// Dashboard configuration files to read, in order.
    /// Defaults to config.toml in the configuration directory.
    config_files: Vec<PathBuf>,

    /// Directory holding settings, saved geometry and the log file
    #[arg(long)]
    config_dir: Option<PathBuf>,

    /// Window size in pixels (WxH). Disables saving the geometry on exit.
    #[arg(long)]
    geometry: Option<Geometry>,

    /// Log at debug level
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config_dir = args.config_dir.clone().unwrap_or_else(config::default_config_dir);

    init_logging(&config_dir, args.debug)?;
    let settings = Settings::load(&config_dir)?;
    debug!("Settings: {:?}", settings);

    let files = if args.config_files.is_empty() {
        vec![config_dir.join(config::DEFAULT_ITEMS_FILE)]
    } else {
        args.config_files.clone()
    };
    let mut loader = ItemLoader::new();
    let mut items = Vec::new();
    for file in &files {
        items.extend(loader.load_file(file)?);
    }
    info!("Loaded {} items from {} files", items.len(), files.len());

    let geometry = match args.geometry {
        Some(g) => Some(g),
        None => Geometry::load(&config_dir).unwrap_or_else(|e| {
            warn!("Ignoring saved geometry: {}", e);
            None
        }),
    };

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let window = rt.block_on(run_tui(items, &settings, geometry, args.geometry.is_some()))?;

    // Only save geometry if started without the argument
    if args.geometry.is_none() {
        window.save(&config_dir)?;
    }
    Ok(())
}

/// Log to a file in the configuration directory; the terminal belongs to
/// the dashboard.
fn init_logging(config_dir: &Path, debug: bool) -> Result<()> {
    std::fs::create_dir_all(config_dir)
        .with_context(|| format!("creating {}", config_dir.display()))?;
    let log_path = config_dir.join(config::LOG_FILE);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("opening {}", log_path.display()))?;

    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

/// The terminal size in pixels, estimated from the cell size in `settings`
/// when the terminal does not report it.
fn measure_window(settings: &Settings) -> Geometry {
    match crossterm::terminal::window_size() {
        Ok(size) if size.width > 0 && size.height > 0 => {
            Geometry::new(u32::from(size.width), u32::from(size.height))
        }
        Ok(size) => Geometry::new(
            u32::from(size.columns) * u32::from(settings.cell_width),
            u32::from(size.rows) * u32::from(settings.cell_height),
        ),
        Err(_) => match crossterm::terminal::size() {
            Ok((columns, rows)) => Geometry::new(
                u32::from(columns) * u32::from(settings.cell_width),
                u32::from(rows) * u32::from(settings.cell_height),
            ),
            // Unknown width: layout falls back to the configured width
            Err(_) => Geometry::new(1, 1),
        },
    }
}

/// Run the dashboard until the user quits. Returns the final window
/// geometry.
async fn run_tui(
    items: Vec<tinydash::DashboardItem>,
    settings: &Settings,
    geometry: Option<Geometry>,
    pinned: bool,
) -> Result<Geometry> {
    let prober = Arc::new(SystemProber::new(settings.http_timeout())?);
    let (done_tx, done_rx) = mpsc::unbounded_channel();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic);
    }));

    let window = geometry.unwrap_or_else(|| measure_window(settings));
    let mut app = App::new(items, prober, done_tx, window, settings.fallback_width)
        .with_theme(Theme::auto_detect());

    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let _reader = events::spawn_reader(event_tx);

    let result = run_app(
        &mut terminal,
        &mut app,
        done_rx,
        event_rx,
        settings,
        pinned,
    )
    .await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result.map(|()| app.window)
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    mut done_rx: mpsc::UnboundedReceiver<(SensorId, ProbeOutcome)>,
    mut event_rx: mpsc::UnboundedReceiver<Event>,
    settings: &Settings,
    pinned: bool,
) -> Result<()> {
    let mut tick = tokio::time::interval(settings.refresh_period());
    tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

    app.start_sensors();

    while app.running {
        tokio::select! {
            _ = wait_until(app.next_deadline()) => {
                for (id, probe) in app.fire_due(Instant::now()) {
                    debug!("Dispatching {:?} for sensor {}", probe, id);
                    app.dispatch(id, probe);
                }
            }
            Some((id, outcome)) = done_rx.recv() => {
                app.complete_probe(id, outcome);
            }
            _ = tick.tick() => {
                app.refresh();
                terminal.draw(|frame| ui::render(frame, app))?;
            }
            event = event_rx.recv() => match event {
                Some(Event::Key(key)) => events::handle_key_event(app, key),
                Some(Event::Mouse(mouse)) => events::handle_mouse_event(app, mouse),
                Some(Event::Resize(_, _)) => {
                    if !pinned {
                        app.set_window(measure_window(settings));
                    }
                }
                Some(_) => {}
                None => {
                    warn!("Terminal event reader stopped");
                    app.quit();
                }
            },
        }
    }

    // In-flight probes are abandoned with the runtime
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args() {
        let args = Args::parse_from([
            "tinydash",
            "a.toml",
            "b.toml",
            "--geometry",
            "640x200",
            "--config-dir",
            "/tmp/dash",
            "--debug",
        ]);
        assert_eq!(args.config_files, vec![PathBuf::from("a.toml"), PathBuf::from("b.toml")]);
        assert_eq!(args.geometry, Some(Geometry::new(640, 200)));
        assert_eq!(args.config_dir, Some(PathBuf::from("/tmp/dash")));
        assert!(args.debug);
    }

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["tinydash"]);
        assert!(args.config_files.is_empty());
        assert!(args.geometry.is_none());
        assert!(!args.debug);
    }

    #[test]
    fn test_bad_geometry_is_rejected() {
        assert!(Args::try_parse_from(["tinydash", "--geometry", "wide"]).is_err());
    }
}
