// ============================================
// src/main.rs
// CLI entry point, logging and the terminal loop
// ============================================

use std::fs::{self, File};
use std::io::stdout;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use console::style;
use crossterm::{
    ExecutableCommand,
    cursor::{Hide, Show},
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use dialoguer::Confirm;
use log::info;
use ratatui::prelude::*;

mod app;
mod config;
mod games;
mod questions;
mod save_data;
mod scoring;
mod timer;
mod ui;

use app::App;
use config::Settings;
use games::{Difficulty, REGISTRY};
use save_data::ResultStore;

const LOG_FILE: &str = "edukhel.log";

// --------------------------------------------------
// CLI
// --------------------------------------------------

#[derive(Parser)]
#[command(name = "edukhel", version, about = "Educational quiz and puzzle games in your terminal")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Event poll interval in milliseconds (overrides settings.toml)
    #[arg(long, global = true)]
    tick_ms: Option<u64>,

    /// Do not write finished games to the results history
    #[arg(long, global = true)]
    no_record: bool,
}

#[derive(Subcommand)]
enum Command {
    /// List every game and whether it can be played yet
    List,
    /// Jump straight into one game
    Play {
        /// Game slug or title, e.g. `time-rush`
        game: String,
        #[arg(short, long, value_enum)]
        difficulty: Option<Difficulty>,
    },
    /// Show recorded results
    Stats {
        /// Print the history as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete recorded results
    ResetStats {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    if let Err(err) = init_logging() {
        eprintln!("{} {err:#}", style("logging disabled:").yellow());
    }
    questions::validate_catalog().context("built-in content is inconsistent")?;

    let mut settings = Settings::load();
    if let Some(tick_ms) = cli.tick_ms {
        settings.tick_ms = tick_ms;
    }
    if cli.no_record {
        settings.record_results = false;
    }
    let store = settings.record_results.then(ResultStore::open_default);

    match cli.command {
        None => run_tui(App::new(&settings, store), &settings),
        Some(Command::List) => {
            list_games();
            Ok(())
        }
        Some(Command::Play { game, difficulty }) => {
            let difficulty = difficulty.unwrap_or(settings.default_difficulty);
            let game = games::create(&game, difficulty)?;
            run_tui(App::with_game(&settings, store, game), &settings)
        }
        Some(Command::Stats { json }) => show_stats(json),
        Some(Command::ResetStats { yes }) => reset_stats(yes),
    }
}

/// Logs go to a file: the terminal belongs to the TUI.
fn init_logging() -> Result<()> {
    use env_logger::{Builder, Env, Target};

    let dir = config::data_dir();
    fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
    let path = dir.join(LOG_FILE);
    let file = File::options()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening {}", path.display()))?;
    Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .try_init()?;
    Ok(())
}

// --------------------------------------------------
// Plain subcommands
// --------------------------------------------------

fn list_games() {
    for game in REGISTRY.iter() {
        let status = if game.playable {
            style("playable").green()
        } else {
            style("coming soon").dim()
        };
        println!(
            "{:<18} {:<28} {}",
            style(game.slug).cyan().bold(),
            game.title,
            status
        );
    }
}

fn show_stats(json: bool) -> Result<()> {
    let store = ResultStore::open_default();
    let history = store
        .load()
        .with_context(|| format!("reading {}", store.path().display()))?;
    if json {
        println!("{}", history.to_json()?);
        return Ok(());
    }
    if history.records.is_empty() {
        println!("{}", style("No games recorded yet.").dim());
        return Ok(());
    }

    println!("{}", style("Recent results").bold().underlined());
    for record in history.records.iter().rev().take(20) {
        let correct = match record.total {
            Some(total) => format!("{}/{total}", record.correct),
            None => record.correct.to_string(),
        };
        let grade = record.grade.map(|g| g.label()).unwrap_or("-");
        println!(
            "{}  {:<16} {:>6}  {:>7}  {}",
            style(record.timestamp.format("%Y-%m-%d %H:%M")).dim(),
            record.game,
            style(record.score).yellow(),
            correct,
            style(grade).cyan()
        );
    }

    println!();
    println!("{}", style("Best scores").bold().underlined());
    for (game, best) in history.best_scores() {
        println!("{:<16} {}", game, style(best).yellow().bold());
    }
    Ok(())
}

fn reset_stats(yes: bool) -> Result<()> {
    let store = ResultStore::open_default();
    let confirmed = yes
        || Confirm::new()
            .with_prompt("Delete every recorded result?")
            .default(false)
            .interact()?;
    if !confirmed {
        println!("{}", style("Nothing deleted.").dim());
        return Ok(());
    }
    store.clear()?;
    info!("results history cleared");
    println!("{}", style("Results deleted.").green());
    Ok(())
}

// --------------------------------------------------
// MARK: TUI
// --------------------------------------------------

fn run_tui(mut app: App, settings: &Settings) -> Result<()> {
    let mut terminal = setup_terminal().context("setting up the terminal")?;
    let result = run_app(&mut terminal, &mut app, settings);
    restore_terminal().context("restoring the terminal")?;
    result
}

fn setup_terminal() -> Result<Terminal<impl Backend>> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    stdout().execute(Hide)?;
    let backend = CrosstermBackend::new(stdout());
    Ok(Terminal::new(backend)?)
}

fn restore_terminal() -> Result<()> {
    stdout().execute(Show)?;
    stdout().execute(LeaveAlternateScreen)?;
    disable_raw_mode()?;
    Ok(())
}

fn run_app(terminal: &mut Terminal<impl Backend>, app: &mut App, settings: &Settings) -> Result<()> {
    let tick = settings.tick_interval();
    let mut last = Instant::now();

    while !app.should_quit() {
        terminal.draw(|f| app.draw(f))?;

        if event::poll(tick)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                        break;
                    }
                    app.handle_key(key.code);
                }
            }
        }

        let now = Instant::now();
        app.tick(now - last);
        last = now;
    }
    Ok(())
}
