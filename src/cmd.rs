//! Command implementations for the CLI interface.
//!
//! Each handler turns its arguments into one or more planner mutations and
//! dispatches them, so every change is on disk before the handler returns.

use std::future::Future;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use chrono::{Datelike, Days, Local, NaiveDate};
use clap::Subcommand;
use clap_complete::{generate, Shell};

use crate::export::layout::{NOT_DESCRIBED, NOT_PROVIDED, NO_CONTENT, NO_TASKS};
use crate::export::{write_export, Exporter};
use crate::fields::{SolutionSlot, Weekday};
use crate::error::GatewayError;
use crate::gateway::config::GatewayConfig;
use crate::gateway::tracker::{NewTicket, Ticket, TicketRequest, DEFAULT_ISSUE_TYPE};
use crate::gateway::{template, tracker, HTML_HINT};
use crate::planner::{Mutation, Planner, PlannerState};
use crate::task::PROBLEM_SOLVING_REMINDERS;

#[derive(Subcommand)]
pub enum Commands {
    /// Print the whole planner.
    Show,

    /// Manage the weekly task board.
    Task {
        #[command(subcommand)]
        action: TaskAction,
    },

    /// Manage problem / solution blocks.
    Problem {
        #[command(subcommand)]
        action: ProblemAction,
    },

    /// Manage the communication checklist.
    Comm {
        #[command(subcommand)]
        action: CommAction,
    },

    /// Manage additional notes.
    Note {
        #[command(subcommand)]
        action: NoteAction,
    },

    /// Collapse or check in a day.
    Day {
        #[command(subcommand)]
        action: DayAction,
    },

    /// Replace the weekly priorities text.
    Priorities {
        /// New text; pass "" to clear.
        text: String,
    },

    /// Replace the weekly notes text.
    Notes {
        /// New text; pass "" to clear.
        text: String,
    },

    /// Create a tracker ticket from a short message.
    Ticket {
        /// Used as both summary and description.
        message: String,
        /// Project key.
        #[arg(long, default_value = "DES")]
        project: String,
        /// Description, when it should differ from the message.
        #[arg(long)]
        description: Option<String>,
        #[arg(long, default_value = DEFAULT_ISSUE_TYPE)]
        issue_type: String,
    },

    /// Restore the planner to its first-run content.
    Reset {
        /// Skip the confirmation prompt.
        #[arg(long, short)]
        yes: bool,
    },

    /// Export the planner to a dated PDF.
    Export {
        /// Output directory (default: current directory)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Run the HTTP gateway for template generation and ticket creation.
    Serve {
        /// Address to bind.
        #[arg(long, default_value = "127.0.0.1")]
        bind: String,
        /// Port to listen on.
        #[arg(long, default_value_t = 8787)]
        port: u16,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum TaskAction {
    /// Add a task to a day.
    Add {
        #[arg(value_enum)]
        day: Weekday,
        text: String,
    },
    /// Flip a task between done and open.
    Toggle {
        #[arg(value_enum)]
        day: Weekday,
        id: u64,
    },
    /// Remove a task.
    Delete {
        #[arg(value_enum)]
        day: Weekday,
        id: u64,
    },
}

#[derive(Subcommand)]
pub enum ProblemAction {
    /// Add an empty problem block, optionally describing it.
    Add { text: Option<String> },
    /// Replace a block's problem description.
    Text { id: u64, text: String },
    /// Replace one of a block's three solutions.
    Solution {
        id: u64,
        /// Solution number: 1, 2 or 3.
        slot: SolutionSlot,
        text: String,
    },
    /// Remove a block. The last block is always kept.
    Delete { id: u64 },
}

#[derive(Subcommand)]
pub enum CommAction {
    /// Add a communication task.
    Add { text: String },
    /// Flip a communication task between done and open.
    Toggle { id: u64 },
    /// Remove a communication task.
    Delete { id: u64 },
    /// Draft an email template for a communication task.
    Template {
        id: u64,
        /// Extra details for the draft.
        #[arg(long)]
        context: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum NoteAction {
    /// Add a note, optionally with text.
    Add { text: Option<String> },
    /// Replace a note's text.
    Set { id: u64, text: String },
    /// Remove a note.
    Delete { id: u64 },
}

#[derive(Subcommand)]
pub enum DayAction {
    /// Collapse or expand a day.
    Collapse {
        #[arg(value_enum)]
        day: Weekday,
    },
    /// Flip a day's check-in by hand.
    Checkin {
        #[arg(value_enum)]
        day: Weekday,
    },
}

/// Print the planner under the current week's label.
pub fn cmd_show(planner: &Planner) -> Result<()> {
    println!("Ops Weekly Planner  {}\n", week_range(Local::now().date_naive()));
    print!("{}", render_planner(planner.state()));
    Ok(())
}

/// Monday to Friday of the week containing `today`, e.g. "Mar 18 - Mar 22, 2024".
pub fn week_range(today: NaiveDate) -> String {
    let monday = today - Days::new(today.weekday().num_days_from_monday() as u64);
    let friday = monday + Days::new(4);
    format!("{} - {}", monday.format("%b %-d"), friday.format("%b %-d, %Y"))
}

/// Plain-text view of the planner, as printed by `wop show`.
pub fn render_planner(state: &PlannerState) -> String {
    let mut lines: Vec<String> = Vec::new();
    let text_or = |text: &str, fallback: &'static str| -> String {
        if text.trim().is_empty() { fallback.to_string() } else { text.to_string() }
    };
    let check = |done: bool| if done { "[x]" } else { "[ ]" };

    lines.push("Weekly Priorities".into());
    lines.extend(text_or(&state.weekly_priorities, NO_CONTENT).lines().map(|l| format!("  {l}")));
    lines.push(String::new());
    lines.push("Weekly Notes".into());
    lines.extend(text_or(&state.weekly_notes, NO_CONTENT).lines().map(|l| format!("  {l}")));

    lines.push(String::new());
    lines.push(format!(
        "Daily Check-in ({}/{} days)",
        state.daily_checkins.count(),
        Weekday::ALL.len()
    ));
    for day in Weekday::ALL {
        let tasks = state.weekly_tasks.day(day);
        let mark = check(state.daily_checkins.get(day));
        let done = tasks.iter().filter(|t| t.completed).count();
        if state.collapsed_days.get(day) {
            lines.push(format!("{day} {mark} ({done}/{} done, collapsed)", tasks.len()));
            continue;
        }
        lines.push(format!("{day} {mark}"));
        if tasks.is_empty() {
            lines.push(format!("  {NO_TASKS}"));
        }
        for t in tasks {
            lines.push(format!("  #{:<3} {} {}", t.id, check(t.completed), t.text));
        }
    }

    lines.push(String::new());
    lines.push("Problem Solving".into());
    lines.extend(PROBLEM_SOLVING_REMINDERS.iter().map(|r| format!("  - {r}")));
    for (n, block) in state.problem_blocks.iter().enumerate() {
        lines.push(format!("Problem / Issue #{} (id {})", n + 1, block.id));
        lines.push(format!("  {}", text_or(&block.problem_text, NOT_DESCRIBED)));
        for (i, solution) in block.solutions.iter().enumerate() {
            lines.push(format!("  {}. {}", i + 1, text_or(solution, NOT_PROVIDED)));
        }
    }

    lines.push(String::new());
    lines.push("Communication".into());
    for t in &state.communication_tasks {
        lines.push(format!("  #{:<3} {} {}", t.id, check(t.completed), t.text));
    }
    lines.push("Additional Notes".into());
    for note in &state.additional_notes {
        lines.push(format!("  #{:<3} {}", note.id, note.text));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Handle weekly task board commands.
pub fn cmd_task(planner: &mut Planner, action: TaskAction) -> Result<()> {
    match action {
        TaskAction::Add { day, text } => {
            if text.trim().is_empty() {
                bail!("task text must not be empty");
            }
            planner.dispatch(Mutation::AddTask { day, text })?;
            let id = planner.state().weekly_tasks.day(day).last().map(|t| t.id).unwrap_or_default();
            println!("Added task #{id} to {day}");
        }
        TaskAction::Toggle { day, id } => {
            require_task(planner, day, id)?;
            planner.dispatch(Mutation::ToggleTask { day, id })?;
            let done = planner
                .state()
                .weekly_tasks
                .day(day)
                .iter()
                .any(|t| t.id == id && t.completed);
            println!("{day} #{id} {}", if done { "done" } else { "reopened" });
            if planner.state().daily_checkins.get(day) {
                println!("{day} checked in");
            }
        }
        TaskAction::Delete { day, id } => {
            require_task(planner, day, id)?;
            planner.dispatch(Mutation::DeleteTask { day, id })?;
            println!("Deleted {day} #{id}");
        }
    }
    Ok(())
}

fn require_task(planner: &Planner, day: Weekday, id: u64) -> Result<()> {
    if planner.state().weekly_tasks.day(day).iter().any(|t| t.id == id) {
        Ok(())
    } else {
        bail!("{day} has no task #{id}")
    }
}

/// Handle problem block commands.
pub fn cmd_problem(planner: &mut Planner, action: ProblemAction) -> Result<()> {
    match action {
        ProblemAction::Add { text } => {
            planner.dispatch(Mutation::AddProblem)?;
            let id = planner.state().problem_blocks.last().map(|b| b.id).unwrap_or_default();
            if let Some(text) = text {
                planner.dispatch(Mutation::UpdateProblemText { id, text })?;
            }
            println!("Added problem block {id}");
        }
        ProblemAction::Text { id, text } => {
            require_problem(planner, id)?;
            planner.dispatch(Mutation::UpdateProblemText { id, text })?;
            println!("Updated problem block {id}");
        }
        ProblemAction::Solution { id, slot, text } => {
            require_problem(planner, id)?;
            planner.dispatch(Mutation::UpdateSolution { id, slot, text })?;
            println!("Updated solution {} of problem block {id}", slot.index() + 1);
        }
        ProblemAction::Delete { id } => {
            require_problem(planner, id)?;
            if planner.state().problem_blocks.len() == 1 {
                println!("Problem block {id} is the last one and was kept");
                return Ok(());
            }
            planner.dispatch(Mutation::DeleteProblem { id })?;
            println!("Deleted problem block {id}");
        }
    }
    Ok(())
}

fn require_problem(planner: &Planner, id: u64) -> Result<()> {
    if planner.state().problem_blocks.iter().any(|b| b.id == id) {
        Ok(())
    } else {
        bail!("no problem block {id}")
    }
}

/// Handle communication checklist commands.
pub fn cmd_comm(planner: &mut Planner, action: CommAction) -> Result<()> {
    let exists = |planner: &Planner, id: u64| {
        if planner.state().communication_tasks.iter().any(|t| t.id == id) {
            Ok(())
        } else {
            Err(anyhow::anyhow!("no communication task #{id}"))
        }
    };
    match action {
        CommAction::Add { text } => {
            if text.trim().is_empty() {
                bail!("communication text must not be empty");
            }
            planner.dispatch(Mutation::AddCommunication { text })?;
            let id = planner.state().communication_tasks.last().map(|t| t.id).unwrap_or_default();
            println!("Added communication task #{id}");
        }
        CommAction::Toggle { id } => {
            exists(planner, id)?;
            planner.dispatch(Mutation::ToggleCommunication { id })?;
            println!("Toggled communication task #{id}");
        }
        CommAction::Delete { id } => {
            exists(planner, id)?;
            planner.dispatch(Mutation::DeleteCommunication { id })?;
            println!("Deleted communication task #{id}");
        }
        CommAction::Template { id, context } => {
            exists(planner, id)?;
            let task = planner.state().communication_tasks.iter().find(|t| t.id == id);
            let text = task.map(|t| t.text.as_str()).unwrap_or_default();
            match draft_template(&GatewayConfig::from_env(), text, context.as_deref()) {
                Ok(template) => println!("{template}"),
                Err(e) => println!("Failed to generate template: {e:#}"),
            }
        }
    }
    Ok(())
}

/// Run a gateway call to completion on a fresh runtime.
fn block_on<F: Future>(future: F) -> Result<F::Output> {
    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    Ok(runtime.block_on(future))
}

/// Readable form of a gateway failure, with the access-layer hint where it applies.
fn gateway_failure(e: GatewayError) -> anyhow::Error {
    match e {
        GatewayError::HtmlResponse { .. } => anyhow!("{e}. {HTML_HINT}"),
        GatewayError::Upstream { status, details } => match details {
            serde_json::Value::String(text) if !text.is_empty() => anyhow!("upstream returned {status}: {text}"),
            serde_json::Value::Null => anyhow!("upstream returned {status}"),
            details => anyhow!("upstream returned {status}: {details}"),
        },
        e => e.into(),
    }
}

/// Ask the model for a communication template.
pub fn draft_template(config: &GatewayConfig, task_text: &str, context: Option<&str>) -> Result<String> {
    let model = config.model().map_err(gateway_failure)?;
    let prompt = template::build_prompt(task_text, context);
    let http = reqwest::Client::new();
    block_on(template::generate(&http, &model, &prompt))?.map_err(gateway_failure)
}

/// Validate and create a ticket upstream.
pub fn file_ticket(config: &GatewayConfig, request: TicketRequest) -> Result<Ticket> {
    let ticket = NewTicket::try_from(request).map_err(gateway_failure)?;
    let tracker = config.tracker().map_err(gateway_failure)?;
    let http = reqwest::Client::new();
    block_on(tracker::create_issue(&http, &tracker, &ticket))?.map_err(gateway_failure)
}

/// Create a ticket and print its key and link.
pub fn cmd_ticket(message: String, project: String, description: Option<String>, issue_type: String) -> Result<()> {
    let request = TicketRequest {
        project: Some(project),
        description: Some(description.unwrap_or_else(|| message.clone())),
        summary: Some(message),
        issue_type: Some(issue_type),
    };
    match file_ticket(&GatewayConfig::from_env(), request) {
        Ok(ticket) => println!("Created {} {}", ticket.key, ticket.url),
        Err(e) => println!("Failed to create ticket: {e:#}"),
    }
    Ok(())
}

/// Handle additional note commands.
pub fn cmd_note(planner: &mut Planner, action: NoteAction) -> Result<()> {
    let exists = |planner: &Planner, id: u64| {
        if planner.state().additional_notes.iter().any(|n| n.id == id) {
            Ok(())
        } else {
            Err(anyhow::anyhow!("no note #{id}"))
        }
    };
    match action {
        NoteAction::Add { text } => {
            planner.dispatch(Mutation::AddNote)?;
            let id = planner.state().additional_notes.last().map(|n| n.id).unwrap_or_default();
            if let Some(text) = text {
                planner.dispatch(Mutation::UpdateNote { id, text })?;
            }
            println!("Added note #{id}");
        }
        NoteAction::Set { id, text } => {
            exists(planner, id)?;
            planner.dispatch(Mutation::UpdateNote { id, text })?;
            println!("Updated note #{id}");
        }
        NoteAction::Delete { id } => {
            exists(planner, id)?;
            planner.dispatch(Mutation::DeleteNote { id })?;
            println!("Deleted note #{id}");
        }
    }
    Ok(())
}

/// Handle per-day collapse and check-in commands.
pub fn cmd_day(planner: &mut Planner, action: DayAction) -> Result<()> {
    match action {
        DayAction::Collapse { day } => {
            planner.dispatch(Mutation::ToggleCollapse { day })?;
            let collapsed = planner.state().collapsed_days.get(day);
            println!("{day} {}", if collapsed { "collapsed" } else { "expanded" });
        }
        DayAction::Checkin { day } => {
            planner.dispatch(Mutation::ToggleCheckin { day })?;
            let checked = planner.state().daily_checkins.get(day);
            println!("{day} {}", if checked { "checked in" } else { "not checked in" });
        }
    }
    Ok(())
}

pub fn cmd_priorities(planner: &mut Planner, text: String) -> Result<()> {
    planner.dispatch(Mutation::SetPriorities { text })?;
    println!("Weekly priorities saved");
    Ok(())
}

pub fn cmd_notes(planner: &mut Planner, text: String) -> Result<()> {
    planner.dispatch(Mutation::SetNotes { text })?;
    println!("Weekly notes saved");
    Ok(())
}

/// Whether a confirmation answer means yes.
pub fn confirmed(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Reset the planner after confirmation.
pub fn cmd_reset(planner: &mut Planner, yes: bool) -> Result<()> {
    if !yes {
        print!("Are you sure you want to reset the entire planner? All your current data will be lost. [y/N] ");
        io::stdout().flush()?;
        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer)?;
        if !confirmed(&answer) {
            println!("Reset cancelled.");
            return Ok(());
        }
    }
    planner.dispatch(Mutation::Reset)?;
    println!("Planner reset.");
    Ok(())
}

/// Render the planner and write it to `output` (default: current directory).
pub fn cmd_export(planner: &Planner, output: Option<PathBuf>) -> Result<()> {
    let dir = output.unwrap_or_else(|| PathBuf::from("."));
    let exporter = Exporter::new();
    let Some(bytes) = exporter.export(planner.state()) else {
        println!("Export failed; nothing was written.");
        return Ok(());
    };
    let today = Local::now().date_naive();
    let path = write_export(&dir, today, &bytes)
        .with_context(|| format!("failed to write export to {}", dir.display()))?;
    println!("Exported planner to {}", path.display());
    Ok(())
}

/// Run the gateway until Ctrl+C.
pub fn cmd_serve(bind: &str, port: u16) -> Result<()> {
    block_on(crate::gateway::run_serve(GatewayConfig::from_env(), bind, port))?
}

pub fn cmd_completions(shell: Shell) -> Result<()> {
    use clap::CommandFactory;
    use crate::cli::Cli;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut io::stdout());
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::store::Store;

    fn planner(dir: &tempfile::TempDir) -> Planner {
        Planner::load(Store::open(dir.path()).unwrap()).unwrap()
    }

    #[test]
    fn test_confirmed() {
        assert!(confirmed("y\n"));
        assert!(confirmed(" YES "));
        assert!(!confirmed(""));
        assert!(!confirmed("no"));
    }

    #[test]
    fn test_render_seeded_planner() {
        let text = render_planner(&PlannerState::seeded());
        assert!(text.contains("Daily Check-in (0/5 days)"));
        assert!(text.contains("Tuesday [ ]\n  No tasks for this day."));
        assert!(text.contains("Problem / Issue #1 (id 1)\n  Not described.\n  1. Not provided."));
        assert!(text.contains("Weekly Priorities\n  No content entered."));
    }

    #[test]
    fn test_week_range() {
        let wednesday = NaiveDate::from_ymd_opt(2024, 3, 20).unwrap();
        assert_eq!(week_range(wednesday), "Mar 18 - Mar 22, 2024");
        let sunday = NaiveDate::from_ymd_opt(2024, 3, 24).unwrap();
        assert_eq!(week_range(sunday), "Mar 18 - Mar 22, 2024");
        let new_year = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        assert_eq!(week_range(new_year), "Dec 30 - Jan 3, 2025");
    }

    #[test]
    fn test_render_ends_each_line() {
        let text = render_planner(&PlannerState::seeded());
        assert!(text.starts_with("Weekly Priorities\n"));
        assert!(text.contains("\n\nWeekly Notes\n"));
        assert!(text.ends_with('\n'));
        assert!(!text.ends_with("\n\n"));
    }

    #[test]
    fn test_collapsed_day_hides_tasks() {
        let state = PlannerState::seeded().apply(&Mutation::ToggleCollapse { day: Weekday::Monday });
        let text = render_planner(&state);
        assert!(text.contains("Monday [ ] (0/4 done, collapsed)"));
        assert!(!text.contains("Monday [ ]\n"));
    }

    #[test]
    fn test_toggle_unknown_task_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut p = planner(&dir);
        let err = cmd_task(&mut p, TaskAction::Toggle { day: Weekday::Friday, id: 9 }).unwrap_err();
        assert_eq!(err.to_string(), "Friday has no task #9");
    }

    #[test]
    fn test_problem_add_with_text() {
        let dir = tempfile::tempdir().unwrap();
        let mut p = planner(&dir);
        cmd_problem(&mut p, ProblemAction::Add { text: Some("Printer jam".into()) }).unwrap();
        let reloaded = planner(&dir);
        let block = reloaded.state().problem_blocks.last().unwrap();
        assert_eq!(block.id, 2);
        assert_eq!(block.problem_text, "Printer jam");
    }

    #[test]
    fn test_last_problem_delete_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let mut p = planner(&dir);
        cmd_problem(&mut p, ProblemAction::Delete { id: 1 }).unwrap();
        assert_eq!(p.state().problem_blocks.len(), 1);
    }

    #[test]
    fn test_export_writes_pdf() {
        let data = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let p = planner(&data);
        cmd_export(&p, Some(out.path().to_path_buf())).unwrap();
        let files: Vec<_> = std::fs::read_dir(out.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(files.len(), 1);
        assert!(files[0].starts_with("weekly-ops-planner-"));
        assert!(files[0].ends_with(".pdf"));
    }

    fn model_env(url: String) -> GatewayConfig {
        GatewayConfig::from_lookup(move |name: &str| match name {
            "AI_ACCOUNT_ID" => Some("acct".into()),
            "AI_API_TOKEN" => Some("tok".into()),
            "AI_BASE_URL" => Some(url.clone()),
            _ => None,
        })
    }

    fn tracker_env(url: String) -> GatewayConfig {
        GatewayConfig::from_lookup(move |name: &str| match name {
            "JIRA_DOMAIN" => Some(url.clone()),
            "CF_ACCESS_CLIENT_ID" => Some("cid".into()),
            "CF_ACCESS_CLIENT_SECRET" => Some("csecret".into()),
            "JIRA_EMAIL" => Some("ops@acme.test".into()),
            "JIRA_API_TOKEN" => Some("tok".into()),
            _ => None,
        })
    }

    fn ticket(summary: &str) -> TicketRequest {
        TicketRequest {
            project: Some("DES".into()),
            summary: Some(summary.into()),
            description: Some(summary.into()),
            issue_type: Some(DEFAULT_ISSUE_TYPE.into()),
        }
    }

    #[test]
    fn test_draft_template_sends_task_text() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", mockito::Matcher::Any)
            .match_body(mockito::Matcher::Regex("Announce sprint demo".into()))
            .with_status(200)
            .with_body(r#"{"result":{"response":"**Subject:** Sprint demo"}}"#)
            .create();

        let template = draft_template(&model_env(server.url()), "Announce sprint demo", Some("Friday")).unwrap();
        assert_eq!(template, "**Subject:** Sprint demo");
        mock.assert();
    }

    #[test]
    fn test_draft_template_names_missing_config() {
        let err = draft_template(&GatewayConfig::default(), "Demo", None).unwrap_err();
        assert_eq!(err.to_string(), "missing required configuration: AI_ACCOUNT_ID, AI_API_TOKEN");
    }

    #[test]
    fn test_file_ticket_defaults() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/rest/api/3/issue")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "fields": { "project": { "key": "DES" }, "summary": "Book venue", "issuetype": { "name": "Task" } }
            })))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":"10001","key":"DES-7","self":"https://acme/rest/api/3/issue/10001"}"#)
            .create();

        let cli = crate::cli::Cli::parse_from(["wop", "ticket", "Book venue"]);
        let Commands::Ticket { message, project, description, issue_type } = cli.command else {
            panic!("expected ticket command");
        };
        assert_eq!((project.as_str(), issue_type.as_str(), description), ("DES", "Task", None));

        let created = file_ticket(&tracker_env(server.url()), ticket(&message)).unwrap();
        assert_eq!(created.key, "DES-7");
        assert_eq!(created.url, format!("{}/browse/DES-7", server.url()));
        mock.assert();
    }

    #[test]
    fn test_file_ticket_html_page_gets_hint() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/rest/api/3/issue")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body("<html>Sign in</html>")
            .create();

        let err = file_ticket(&tracker_env(server.url()), ticket("Book venue")).unwrap_err();
        assert!(err.to_string().contains("CF_ACCESS_CLIENT_ID"));
    }

    #[test]
    fn test_file_ticket_rejects_blank_message() {
        let err = file_ticket(&GatewayConfig::default(), ticket("  ")).unwrap_err();
        assert_eq!(err.to_string(), "project and summary are required");
    }
}
