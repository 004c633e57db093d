mod app;
mod commands;
mod domain;
mod error;
mod input;
mod logging;
mod mcp;
mod persistence;
mod service;
mod ticker;
mod ui;

use anyhow::{Context, Result};
use app::App;
use clap::Parser;
use commands::Command;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use persistence::{database_file, get_data_dir, log_file, Store};
use ratatui::{backend::CrosstermBackend, Terminal};
use service::Planner;
use std::io;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "weekboard", version)]
#[command(about = "A local-first weekly planner for the terminal", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return ExitCode::from(commands::usage_exit_code(&err));
        }
    };

    let result = match cli.command {
        Some(Command::Init) => commands::init(&mut io::stdout()),
        Some(command) => run_command(command),
        None => run_tui(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(commands::exit_code(&err) as u8)
        }
    }
}

/// Open the store and roll overdue items forward when enabled
fn open_planner() -> Result<Planner> {
    let path = database_file()?;
    let store = Store::open(&path)?;
    let mut planner = Planner::new(store, ticker::local_today())?;

    let moved = planner.auto_rollover()?;
    if moved > 0 {
        tracing::info!(moved, "rolled over on start");
    }
    Ok(planner)
}

fn run_command(command: Command) -> Result<()> {
    logging::init_stderr();
    let mut planner = open_planner()?;
    commands::run(command, &mut planner, &mut io::stdout())
}

fn run_tui() -> Result<()> {
    logging::init_file(&log_file()?)?;
    tracing::info!(dir = %get_data_dir()?.display(), "starting board");

    let planner = open_planner()?;
    let mut app = App::new(planner)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run app
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result.context("board loop failed")
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    let tick_rate = ticker::poll_interval();

    loop {
        // Midnight crossing: advance today and roll over
        let today = ticker::local_today();
        if ticker::has_day_changed(app.planner.today(), today) {
            app.tick(today);
        }

        terminal.draw(|f| ui::render(f, app))?;

        // Handle events with timeout for ticking
        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                // Only process key press events (ignore key release)
                if key.kind == KeyEventKind::Press && input::handle_key(app, key) {
                    return Ok(());
                }
            }
        }
    }
}
