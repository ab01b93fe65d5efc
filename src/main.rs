//! # wop - Weekly Ops Planner
//!
//! A command-line weekly planner for operations work: a task checklist per
//! working day, a problem / solution log, a communication checklist and
//! free-text priorities and notes.
//!
//! ## Key Features
//!
//! - **Daily Check-in**: a day is checked in automatically once every one of
//!   its tasks is done, and collapses out of the way
//! - **Problem Solving**: problem blocks with three solution slots each
//! - **Local File Storage**: one JSON file per planner section, written after
//!   every change
//! - **PDF Export**: a paginated A4 snapshot of the whole planner
//! - **Gateway**: `wop serve` proxies communication-template drafting to a
//!   hosted model and ticket creation to an issue tracker
//!
//! ## Quick Start
//!
//! ```bash
//! # See the planner
//! wop show
//!
//! # Add and complete a task
//! wop task add tue "Review design critique schedule"
//! wop task toggle tue 1
//!
//! # Export to PDF in the current directory
//! wop export
//!
//! # Draft an email for communication task 2, or file a ticket
//! wop comm template 2 --context "Friday 3pm"
//! wop ticket "Book venue for offsite"
//! ```
//!
//! Data is stored in `~/.wop/` unless `--data-dir` or `WOP_DATA_DIR` says
//! otherwise. Logging goes to stderr and is controlled by `WOP_LOG` (or
//! `RUST_LOG`).

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

pub mod checkin;
pub mod cli;
pub mod cmd;
pub mod error;
pub mod export;
pub mod fields;
pub mod gateway;
pub mod planner;
pub mod store;
pub mod task;

use cli::Cli;
use cmd::*;
use planner::Planner;
use store::Store;

fn init_tracing(default_level: &str) {
    let filter = std::env::var("WOP_LOG")
        .ok()
        .and_then(|v| EnvFilter::try_new(v).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();

    let default_level = match cli.command {
        Commands::Serve { .. } => "info",
        _ => "warn",
    };
    init_tracing(default_level);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let data_dir = cli.resolve_data_dir();
    // Only commands that read or change planner data open the store.
    let open = || -> anyhow::Result<Planner> {
        let store = Store::open(&data_dir)?;
        let planner = Planner::load(store)
            .with_context(|| format!("failed to load planner from {}", data_dir.display()))?;
        tracing::debug!(dir = %planner.store().dir().display(), "planner loaded");
        Ok(planner)
    };

    match cli.command {
        Commands::Show => cmd_show(&open()?),
        Commands::Task { action } => cmd_task(&mut open()?, action),
        Commands::Problem { action } => cmd_problem(&mut open()?, action),
        Commands::Comm { action } => cmd_comm(&mut open()?, action),
        Commands::Note { action } => cmd_note(&mut open()?, action),
        Commands::Day { action } => cmd_day(&mut open()?, action),
        Commands::Priorities { text } => cmd_priorities(&mut open()?, text),
        Commands::Notes { text } => cmd_notes(&mut open()?, text),
        Commands::Reset { yes } => cmd_reset(&mut open()?, yes),
        Commands::Export { output } => cmd_export(&open()?, output),
        Commands::Ticket { message, project, description, issue_type } => {
            cmd_ticket(message, project, description, issue_type)
        }
        Commands::Serve { bind, port } => cmd_serve(&bind, port),
        Commands::Completions { shell } => cmd_completions(shell),
    }
}
