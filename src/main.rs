use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;

use clap::Parser;
use tracing::{error, info};
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

mod controller;
mod domain;
mod filter;
mod inputter;
mod model;
mod record;
mod schema;
mod ui;
mod view;

use controller::Controller;
use domain::{DTError, TableConfig};
use filter::SearchMode;
use model::{Model, Status};
use record::Dataset;
use ui::TableUI;

const DEFAULT_LOG_FILE: &str = "dyntable.log";

/// A filterable table viewer for JSON record sets.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// JSON file holding an array of objects. Uses the bundled dataset if omitted.
    path: Option<String>,

    /// How search keystrokes combine with the checkbox filters
    #[arg(long, value_enum, default_value_t = SearchMode::Legacy)]
    search_mode: SearchMode,

    /// Event poll timeout in milliseconds
    #[arg(long, default_value_t = 100)]
    poll_ms: u64,

    /// Maximum rendered width of a table column
    #[arg(long, default_value_t = 32)]
    max_column_width: usize,

    /// Log file, defaults to dyntable.log in the temp directory
    #[arg(long)]
    log_file: Option<String>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Err(e) => {
            error!("Exiting with error: {e:?}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}

fn expand_path(path: &str) -> Result<PathBuf, DTError> {
    shellexpand::full(path)
        .map(|p| PathBuf::from(p.as_ref()))
        .map_err(|e| DTError::InvalidArgument(e.to_string()))
}

fn setup_logging(log_file: Option<&str>) -> Result<(), DTError> {
    let path = match log_file {
        Some(p) => expand_path(p)?,
        None => std::env::temp_dir().join(DEFAULT_LOG_FILE),
    };
    let file = File::create(&path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        .with(ErrorLayer::default())
        .init();
    info!("Logging to {}", path.display());
    Ok(())
}

fn run(args: Args) -> Result<(), DTError> {
    setup_logging(args.log_file.as_deref())?;

    let cfg = TableConfig::default()
        .event_poll_time(args.poll_ms)
        .max_column_width(args.max_column_width)
        .search_mode(args.search_mode);
    info!("Starting with {cfg:?}");

    let dataset = match args.path.as_deref() {
        Some(p) => Dataset::from_path(&expand_path(p)?)?,
        None => Dataset::bundled()?,
    };

    let mut terminal = ratatui::init();
    let result = terminal.size().map_err(DTError::from).and_then(|size| {
        let mut model = Model::init(&cfg, dataset, size.height as usize);
        let ui = TableUI::new(&cfg);
        let controller = Controller::new(&cfg);

        while model.status != Status::Quitting {
            // Render the current view
            terminal.draw(|f| ui.draw(&model, f))?;

            // Handle events and map to a Message
            if let Some(message) = controller.handle_event(&model)? {
                model.update(message);
            }
        }
        Ok(())
    });
    ratatui::restore();
    result
}
