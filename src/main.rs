use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event};
use crossterm::execute;
use env_logger::{Target, WriteStyle};
use ratatui::DefaultTerminal;

use traffic_dash::app::{App, Tab};
use traffic_dash::data::ResourceSource;
use traffic_dash::ui;

#[derive(Parser, Debug)]
#[command(
    name = "traffic-dash",
    about = "Education vs traffic fatality dashboard for US states and counties"
)]
struct Args {
    /// Directory holding the dashboard's JSON and GeoJSON files
    #[arg(long, env = "TRAFFIC_DASH_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,

    /// Fetch resources over HTTP from this base URL instead of the data directory
    #[arg(long)]
    base_url: Option<String>,

    /// Log output file; the terminal belongs to the UI
    #[arg(long, default_value = "traffic-dash.log")]
    log_file: PathBuf,

    /// Tab shown at startup
    #[arg(long, value_enum, default_value_t = Tab::Scatter)]
    tab: Tab,
}

fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;
    let filters = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

    pretty_env_logger::formatted_builder()
        .parse_filters(&filters)
        .write_style(WriteStyle::Never)
        .target(Target::Pipe(Box::new(file)))
        .try_init()
        .context("failed to install logger")
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_file)?;

    let source = match &args.base_url {
        Some(url) => ResourceSource::http(url.as_str()),
        None => ResourceSource::dir(args.data_dir.clone()),
    };
    log::info!("Loading resources from {}", source.describe());

    // Initialize terminal
    let mut terminal = ratatui::init();
    terminal.clear()?;

    // Enable mouse capture
    execute!(std::io::stdout(), EnableMouseCapture)?;

    let result = run(&mut terminal, App::new(Arc::new(source), args.tab));

    // Disable mouse capture and restore terminal
    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();

    if let Err(e) = &result {
        log::error!("exiting with error: {e:#}");
    }
    result
}

fn run(terminal: &mut DefaultTerminal, mut app: App) -> Result<()> {
    loop {
        app.tick(Instant::now());
        terminal.draw(|frame| ui::render(frame, &mut app))?;

        // Handle events with ~60fps target
        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                Event::Key(key) => app.handle_key(key, Instant::now()),
                Event::Mouse(mouse) => app.handle_mouse(mouse, Instant::now()),
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
