//! Planner state container and its mutation catalogue.
//!
//! `PlannerState::apply` is a pure function from the prior state and a
//! `Mutation` to the next state. `Planner` wraps it with persistence: every
//! slice a mutation changed is written straight away, then the check-in rule
//! runs and its output is written as one batch.

use crate::checkin::reconcile_checkins;
use crate::error::StoreError;
use crate::fields::{SolutionSlot, Weekday};
use crate::store::{StateKey, Store};
use crate::task::*;

/// Every slice of planner state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannerState {
    pub weekly_tasks: WeeklyTasks,
    pub problem_blocks: Vec<ProblemBlock>,
    pub communication_tasks: Vec<Task>,
    pub additional_notes: Vec<Note>,
    pub daily_checkins: DayFlags,
    pub collapsed_days: DayFlags,
    pub weekly_priorities: String,
    pub weekly_notes: String,
    pub drafts: Drafts,
}

impl Default for PlannerState {
    fn default() -> Self {
        PlannerState::seeded()
    }
}

/// A single user action against the planner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    SetTaskDraft { day: Weekday, text: String },
    AddTask { day: Weekday, text: String },
    ToggleTask { day: Weekday, id: u64 },
    DeleteTask { day: Weekday, id: u64 },
    AddProblem,
    UpdateProblemText { id: u64, text: String },
    UpdateSolution { id: u64, slot: SolutionSlot, text: String },
    DeleteProblem { id: u64 },
    SetCommunicationDraft { text: String },
    AddCommunication { text: String },
    ToggleCommunication { id: u64 },
    DeleteCommunication { id: u64 },
    AddNote,
    UpdateNote { id: u64, text: String },
    DeleteNote { id: u64 },
    ToggleCollapse { day: Weekday },
    ToggleCheckin { day: Weekday },
    SetPriorities { text: String },
    SetNotes { text: String },
    Reset,
}

impl Mutation {
    /// Persisted slices this mutation may change.
    pub fn touched_keys(&self) -> &'static [StateKey] {
        use Mutation::*;
        match self {
            SetTaskDraft { .. } | SetCommunicationDraft { .. } => &[],
            AddTask { .. } | ToggleTask { .. } | DeleteTask { .. } => &[StateKey::WeeklyTasks],
            AddProblem | UpdateProblemText { .. } | UpdateSolution { .. } | DeleteProblem { .. } => {
                &[StateKey::ProblemBlocks]
            }
            AddCommunication { .. } | ToggleCommunication { .. } | DeleteCommunication { .. } => {
                &[StateKey::CommunicationTasks]
            }
            AddNote | UpdateNote { .. } | DeleteNote { .. } => &[StateKey::AdditionalNotes],
            ToggleCollapse { .. } => &[StateKey::CollapsedDays],
            ToggleCheckin { .. } => &[StateKey::DailyCheckins],
            SetPriorities { .. } => &[StateKey::WeeklyPriorities],
            SetNotes { .. } => &[StateKey::WeeklyNotes],
            Reset => &StateKey::ALL,
        }
    }

    /// Whether the check-in rule must run after this mutation.
    pub fn affects_checkins(&self) -> bool {
        self.touched_keys().contains(&StateKey::WeeklyTasks)
    }
}

impl PlannerState {
    /// Seed content used on first run and on reset.
    pub fn seeded() -> Self {
        PlannerState {
            weekly_tasks: seed_weekly_tasks(),
            problem_blocks: seed_problem_blocks(),
            communication_tasks: seed_communication_tasks(),
            additional_notes: seed_notes(),
            daily_checkins: DayFlags::default(),
            collapsed_days: DayFlags::default(),
            weekly_priorities: String::new(),
            weekly_notes: String::new(),
            drafts: Drafts::default(),
        }
    }

    /// Return the state that results from applying `mutation`.
    pub fn apply(&self, mutation: &Mutation) -> PlannerState {
        let mut next = self.clone();
        match mutation {
            Mutation::SetTaskDraft { day, text } => {
                next.drafts.tasks.insert(*day, text.clone());
            }
            Mutation::AddTask { day, text } => {
                if text.trim().is_empty() {
                    return next;
                }
                let list = next.weekly_tasks.day_mut(*day);
                let id = next_id(list.iter().map(|t| t.id));
                list.push(Task::new(id, text.clone()));
                next.drafts.tasks.insert(*day, String::new());
            }
            Mutation::ToggleTask { day, id } => {
                toggle_in(next.weekly_tasks.day_mut(*day), *id);
            }
            Mutation::DeleteTask { day, id } => {
                next.weekly_tasks.day_mut(*day).retain(|t| t.id != *id);
            }
            Mutation::AddProblem => {
                let id = next_id(next.problem_blocks.iter().map(|b| b.id));
                next.problem_blocks.push(ProblemBlock::empty(id));
            }
            Mutation::UpdateProblemText { id, text } => {
                if let Some(block) = next.problem_blocks.iter_mut().find(|b| b.id == *id) {
                    block.problem_text = text.clone();
                }
            }
            Mutation::UpdateSolution { id, slot, text } => {
                if let Some(block) = next.problem_blocks.iter_mut().find(|b| b.id == *id) {
                    block.solutions[slot.index()] = text.clone();
                }
            }
            Mutation::DeleteProblem { id } => {
                // The last block always stays.
                if next.problem_blocks.len() > 1 {
                    next.problem_blocks.retain(|b| b.id != *id);
                }
            }
            Mutation::SetCommunicationDraft { text } => {
                next.drafts.communication = text.clone();
            }
            Mutation::AddCommunication { text } => {
                if text.trim().is_empty() {
                    return next;
                }
                let id = next_id(next.communication_tasks.iter().map(|t| t.id));
                next.communication_tasks.push(Task::new(id, text.clone()));
                next.drafts.communication.clear();
            }
            Mutation::ToggleCommunication { id } => {
                toggle_in(&mut next.communication_tasks, *id);
            }
            Mutation::DeleteCommunication { id } => {
                next.communication_tasks.retain(|t| t.id != *id);
            }
            Mutation::AddNote => {
                let id = next_id(next.additional_notes.iter().map(|n| n.id));
                next.additional_notes.push(Note { id, text: String::new() });
            }
            Mutation::UpdateNote { id, text } => {
                if let Some(note) = next.additional_notes.iter_mut().find(|n| n.id == *id) {
                    note.text = text.clone();
                }
            }
            Mutation::DeleteNote { id } => {
                next.additional_notes.retain(|n| n.id != *id);
            }
            Mutation::ToggleCollapse { day } => next.collapsed_days.toggle(*day),
            Mutation::ToggleCheckin { day } => next.daily_checkins.toggle(*day),
            Mutation::SetPriorities { text } => next.weekly_priorities = text.clone(),
            Mutation::SetNotes { text } => next.weekly_notes = text.clone(),
            Mutation::Reset => next = PlannerState::seeded(),
        }
        next
    }

    /// Run the check-in rule over this state.
    pub fn reconciled(mut self) -> (Self, bool) {
        let out = reconcile_checkins(&self.weekly_tasks, &self.daily_checkins, &self.collapsed_days);
        self.daily_checkins = out.checkins;
        self.collapsed_days = out.collapsed;
        (self, out.changed)
    }
}

fn toggle_in(list: &mut [Task], id: u64) {
    if let Some(task) = list.iter_mut().find(|t| t.id == id) {
        task.completed = !task.completed;
    }
}

/// Planner state bound to a durable store.
#[derive(Debug)]
pub struct Planner {
    store: Store,
    state: PlannerState,
}

impl Planner {
    /// Load every slice from the store, substituting seed content where absent.
    pub fn load(store: Store) -> Result<Self, StoreError> {
        let seed = PlannerState::seeded();
        let mut state = PlannerState {
            weekly_tasks: store.load(StateKey::WeeklyTasks, seed.weekly_tasks).normalised(),
            problem_blocks: store.load(StateKey::ProblemBlocks, seed.problem_blocks),
            communication_tasks: store.load(StateKey::CommunicationTasks, seed.communication_tasks),
            additional_notes: store.load(StateKey::AdditionalNotes, seed.additional_notes),
            daily_checkins: store.load(StateKey::DailyCheckins, seed.daily_checkins),
            collapsed_days: store.load(StateKey::CollapsedDays, seed.collapsed_days),
            weekly_priorities: store.load(StateKey::WeeklyPriorities, seed.weekly_priorities),
            weekly_notes: store.load(StateKey::WeeklyNotes, seed.weekly_notes),
            drafts: Drafts::default(),
        };

        if state.problem_blocks.is_empty() {
            tracing::warn!("stored problem block list is empty, using the seed block");
            state.problem_blocks = seed_problem_blocks();
        }

        let mut planner = Planner { store, state };
        if planner.board_newer_than_checkins() {
            let prior = planner.state.clone();
            let (healed, changed) = prior.clone().reconciled();
            if changed {
                tracing::info!("check-in state was behind the task board, recomputed");
                planner.state = healed;
                planner.persist_changed(&prior, &[StateKey::DailyCheckins, StateKey::CollapsedDays])?;
            }
        }
        Ok(planner)
    }

    pub fn state(&self) -> &PlannerState {
        &self.state
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Apply a mutation, persist what changed, then re-derive check-ins.
    pub fn dispatch(&mut self, mutation: Mutation) -> Result<(), StoreError> {
        let prior = std::mem::take(&mut self.state);
        let next = prior.apply(&mutation);
        self.state = next;
        self.persist_changed(&prior, mutation.touched_keys())?;

        if mutation.affects_checkins() {
            let before = self.state.clone();
            let (reconciled, changed) = before.clone().reconciled();
            if changed {
                self.state = reconciled;
                self.persist_changed(&before, &[StateKey::DailyCheckins, StateKey::CollapsedDays])?;
            }
        }
        Ok(())
    }

    fn board_newer_than_checkins(&self) -> bool {
        match (
            self.store.modified(StateKey::WeeklyTasks),
            self.store.modified(StateKey::DailyCheckins),
        ) {
            (Some(board), Some(checkins)) => board > checkins,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }

    /// Write each listed slice whose value differs from `prior`.
    fn persist_changed(&self, prior: &PlannerState, keys: &[StateKey]) -> Result<(), StoreError> {
        let s = &self.state;
        for key in keys {
            match key {
                StateKey::WeeklyTasks if s.weekly_tasks != prior.weekly_tasks => {
                    self.store.save(*key, &s.weekly_tasks)?
                }
                StateKey::ProblemBlocks if s.problem_blocks != prior.problem_blocks => {
                    self.store.save(*key, &s.problem_blocks)?
                }
                StateKey::CommunicationTasks if s.communication_tasks != prior.communication_tasks => {
                    self.store.save(*key, &s.communication_tasks)?
                }
                StateKey::AdditionalNotes if s.additional_notes != prior.additional_notes => {
                    self.store.save(*key, &s.additional_notes)?
                }
                StateKey::DailyCheckins if s.daily_checkins != prior.daily_checkins => {
                    self.store.save(*key, &s.daily_checkins)?
                }
                StateKey::CollapsedDays if s.collapsed_days != prior.collapsed_days => {
                    self.store.save(*key, &s.collapsed_days)?
                }
                StateKey::WeeklyPriorities if s.weekly_priorities != prior.weekly_priorities => {
                    self.store.save(*key, &s.weekly_priorities)?
                }
                StateKey::WeeklyNotes if s.weekly_notes != prior.weekly_notes => {
                    self.store.save(*key, &s.weekly_notes)?
                }
                _ => {}
            }
        }
        Ok(())
    }
}
