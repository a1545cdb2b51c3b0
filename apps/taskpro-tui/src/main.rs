mod app;
mod config;
mod ui;

use anyhow::{Context, Result};
use app::App;
use clap::Parser;
use config::Config;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::{
    fs::OpenOptions,
    io::{self, Write},
    path::PathBuf,
    sync::{Arc, Mutex},
    time::Duration,
};
use taskpro_api_client::ApiClientBuilder;
use taskpro_session::{FileStorage, SessionStore};
use taskpro_tasks::TaskList;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "taskpro-tui")]
#[command(about = "Terminal dashboard for the TaskPro task API", long_about = None)]
struct Cli {
    /// Root URL of the task API
    #[arg(long, env = "TASKPRO_API_BASE_URL")]
    api_url: Option<String>,

    /// Path to a configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(api_url) = cli.api_url {
        config.api.base_url = api_url;
        config.validate()?;
    }

    init_logging(&config)?;
    info!(base_url = %config.api.base_url, "Starting TaskPro dashboard");

    let api = Arc::new(
        ApiClientBuilder::new(config.api.base_url.as_str())
            .build()
            .context("Failed to build API client")?,
    );
    let storage = Arc::new(FileStorage::new(&config.storage.dir, &config.storage.key));
    let session = Arc::new(SessionStore::new(api.clone(), storage));
    let tasks = TaskList::new(api, session.clone());
    let mut app = App::new(session.clone(), tasks);

    // The dashboard shows its loading view until this settles.
    let restoring = session.clone();
    tokio::task::spawn_blocking(move || restoring.restore());

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}

/// Logs go to a file so they do not corrupt the terminal UI.
fn init_logging(config: &Config) -> Result<()> {
    let path = config.log_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_filter()))
        .context("Invalid log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        let view = app.view();
        terminal.draw(|f| ui::draw(f, app, view))?;
        terminal.backend_mut().flush()?;

        app.sync_tasks().await;

        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    app.handle_key(key).await;
                }
                _ => {}
            }
        }

        if app.should_quit {
            info!("Shutting down");
            return Ok(());
        }
    }
}
