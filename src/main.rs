//! wxlookup - Weather lookup in the terminal
//!
//! Shows current weather and a daily forecast for the user's location or a
//! searched city. The `assets` subcommand manages the offline asset cache.

use std::error::Error;
use std::io::{self, Write};
use std::panic;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use wxlookup::app::App;
use wxlookup::cache::{AssetCacheWorker, CacheStorage, ResponseSource};
use wxlookup::cli::{AssetAction, AssetArgs, Cli, Command};
use wxlookup::config::Config;
use wxlookup::data::http_client;
use wxlookup::{logging, ui};

/// Sets up a panic hook that restores the terminal before printing the panic message.
/// This ensures the terminal is usable even if the application panics.
fn setup_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        // Attempt to restore the terminal
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        // Call the original panic hook
        original_hook(panic_info);
    }));
}

/// Renders the UI based on the current application state
fn render_ui(frame: &mut ratatui::Frame, app: &App) {
    let controller = &app.controller;
    ui::render_weather_view(frame, &controller.view, controller.notifier.visible());
    if app.show_help {
        ui::render_help_overlay(frame);
    }
}

async fn run_tui(cli: Cli) -> Result<(), Box<dyn Error>> {
    let log_path = cli.log_file.clone().or_else(logging::default_log_path);
    logging::init_file(log_path.as_deref())?;

    let config = cli.config();
    let locate_on_start = config.locate_on_start;
    let mut app = App::new(config)?;

    // Set up panic hook to restore terminal on crash
    setup_panic_hook();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    if locate_on_start {
        app.controller.locate_and_fetch();
    }

    // Main event loop
    loop {
        app.controller.drain_events();
        app.controller.notifier.dismiss_expired(Instant::now());

        terminal.draw(|f| render_ui(f, &app))?;

        // Poll for keyboard events with 100ms timeout
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    tracing::info!("wxlookup exiting");
    Ok(())
}

async fn run_assets(args: AssetArgs) -> Result<(), Box<dyn Error>> {
    logging::init_stderr();

    let config = args.config()?;
    let client = http_client(&Config::default().user_agent)?;

    match args.action {
        AssetAction::Install => {
            let mut worker = AssetCacheWorker::new(&config, client)?;
            let count = worker.install().await?;
            let deleted = worker.activate()?;

            println!("Installed {} assets into {}", count, worker.version());
            for name in deleted {
                println!("Deleted stale cache {}", name);
            }
        }
        AssetAction::Get { url } => {
            let worker = AssetCacheWorker::resume(&config, client)?;
            let response = worker.fetch(&url).await?;

            let source = match response.source {
                ResponseSource::Cache => "cache",
                ResponseSource::Network => "network",
            };
            eprintln!("{} {} ({})", response.status, response.url, source);

            let mut stdout = io::stdout();
            stdout.write_all(&response.body)?;
            stdout.flush()?;
        }
        AssetAction::List => {
            let storage = CacheStorage::with_dir(config.cache_root.clone());
            for name in storage.keys()? {
                let marker = if name == config.cache_version {
                    " (current)"
                } else {
                    ""
                };
                println!("{}{}", name, marker);
                for key in storage.open(&name)?.keys()? {
                    println!("  {}", key);
                }
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let mut cli = Cli::parse();

    match cli.command.take() {
        Some(Command::Assets(args)) => run_assets(args).await,
        None => run_tui(cli).await,
    }
}
