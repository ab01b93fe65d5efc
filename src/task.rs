//! Planner entities and their seed content.
//!
//! Every list keeps its own id space. Ids are handed out as `max + 1` over the
//! list they are added to, which keeps them unique within that list.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::fields::{SolutionSlot, Weekday};

/// A checkbox item. Used both for weekday tasks and communication tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub text: String,
    pub completed: bool,
}

impl Task {
    pub fn new(id: u64, text: impl Into<String>) -> Self {
        Task {
            id,
            text: text.into(),
            completed: false,
        }
    }
}

/// A problem description paired with exactly three candidate solutions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemBlock {
    pub id: u64,
    pub problem_text: String,
    pub solutions: [String; SolutionSlot::COUNT],
}

impl ProblemBlock {
    pub fn empty(id: u64) -> Self {
        ProblemBlock {
            id,
            problem_text: String::new(),
            solutions: Default::default(),
        }
    }
}

/// Free-form note in the communication section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: u64,
    pub text: String,
}

/// Tasks for each weekday. All five days are always present once normalised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeeklyTasks(BTreeMap<Weekday, Vec<Task>>);

impl WeeklyTasks {
    /// A board with every day present and empty.
    pub fn empty() -> Self {
        WeeklyTasks(Weekday::ALL.into_iter().map(|d| (d, Vec::new())).collect())
    }

    /// Fill in any missing weekday with an empty list.
    pub fn normalised(mut self) -> Self {
        for day in Weekday::ALL {
            self.0.entry(day).or_default();
        }
        self
    }

    pub fn day(&self, day: Weekday) -> &[Task] {
        self.0.get(&day).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn day_mut(&mut self, day: Weekday) -> &mut Vec<Task> {
        self.0.entry(day).or_default()
    }

    /// Whether the day has at least one task and all of them are completed.
    pub fn all_done(&self, day: Weekday) -> bool {
        let tasks = self.day(day);
        !tasks.is_empty() && tasks.iter().all(|t| t.completed)
    }
}

/// A per-weekday boolean. Absent days read as `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DayFlags(BTreeMap<Weekday, bool>);

impl DayFlags {
    pub fn get(&self, day: Weekday) -> bool {
        self.0.get(&day).copied().unwrap_or(false)
    }

    pub fn set(&mut self, day: Weekday, value: bool) {
        self.0.insert(day, value);
    }

    pub fn toggle(&mut self, day: Weekday) {
        let current = self.get(day);
        self.set(day, !current);
    }

    /// Number of days whose flag is set.
    pub fn count(&self) -> usize {
        Weekday::ALL.iter().filter(|d| self.get(**d)).count()
    }
}

/// Unsubmitted input for the add-task fields. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Drafts {
    pub tasks: BTreeMap<Weekday, String>,
    pub communication: String,
}

/// Next id for a list: one past the largest id currently in use.
pub fn next_id<I: IntoIterator<Item = u64>>(ids: I) -> u64 {
    ids.into_iter().max().unwrap_or(0) + 1
}

pub const SEED_MONDAY_TASKS: [&str; 4] = [
    "Review your design leader's calendar for the week",
    "Identify upcoming decisions where they need input",
    "Prepare brief updates on active initiatives",
    "Note any potential blockers or escalations",
];

pub const SEED_COMMUNICATION_TASKS: [&str; 4] = [
    "Send bi-weekly DesignOps communication",
    "Flag upcoming decisions that need their input",
    "Share positive feedback received from design teams",
    "Wrap up the week, clean up email inbox",
];

/// Shown above the problem blocks; not part of the persisted state.
pub const PROBLEM_SOLVING_REMINDERS: [&str; 4] = [
    "When bringing up issues, include 2-3 potential solutions",
    "Frame requests in terms of team/business benefit",
    "Ask clarifying questions early in projects",
    "Own mistakes immediately with proposed solutions",
];

fn seeded_list(texts: &[&str]) -> Vec<Task> {
    texts
        .iter()
        .enumerate()
        .map(|(i, text)| Task::new(i as u64 + 1, *text))
        .collect()
}

pub fn seed_weekly_tasks() -> WeeklyTasks {
    let mut board = WeeklyTasks::empty();
    *board.day_mut(Weekday::Monday) = seeded_list(&SEED_MONDAY_TASKS);
    board
}

pub fn seed_communication_tasks() -> Vec<Task> {
    seeded_list(&SEED_COMMUNICATION_TASKS)
}

pub fn seed_problem_blocks() -> Vec<ProblemBlock> {
    vec![ProblemBlock::empty(1)]
}

pub fn seed_notes() -> Vec<Note> {
    vec![Note {
        id: 1,
        text: String::new(),
    }]
}
