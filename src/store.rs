//! Durable key-value store backing every slice of planner state.
//!
//! Each key is one pretty-printed JSON file in the data directory. Reads fail
//! open: a missing or unreadable value yields the caller's default. Writes
//! replace the whole value atomically (temp file + rename).

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StoreError;

/// Fixed identifiers for the independently persisted state slices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StateKey {
    WeeklyTasks,
    ProblemBlocks,
    CommunicationTasks,
    AdditionalNotes,
    DailyCheckins,
    CollapsedDays,
    WeeklyPriorities,
    WeeklyNotes,
}

impl StateKey {
    pub const ALL: [StateKey; 8] = [
        StateKey::WeeklyTasks,
        StateKey::ProblemBlocks,
        StateKey::CommunicationTasks,
        StateKey::AdditionalNotes,
        StateKey::DailyCheckins,
        StateKey::CollapsedDays,
        StateKey::WeeklyPriorities,
        StateKey::WeeklyNotes,
    ];

    /// Storage identifier. The version suffix changes whenever the stored shape does.
    pub fn id(self) -> &'static str {
        match self {
            StateKey::WeeklyTasks => "weeklyTasks_v3",
            StateKey::ProblemBlocks => "problemBlocks_v2",
            StateKey::CommunicationTasks => "communicationTodos_v1",
            StateKey::AdditionalNotes => "additionalNotes_v1",
            StateKey::DailyCheckins => "dailyCheckins_v1",
            StateKey::CollapsedDays => "collapsedDays_v1",
            StateKey::WeeklyPriorities => "weeklyPriorities_v1",
            StateKey::WeeklyNotes => "weeklyNotes_v1",
        }
    }
}

/// Directory-backed JSON store.
#[derive(Debug, Clone)]
pub struct Store {
    dir: PathBuf,
}

impl Store {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StoreError::CreateDir {
            path: dir.clone(),
            source,
        })?;
        Ok(Store { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: StateKey) -> PathBuf {
        self.dir.join(format!("{}.json", key.id()))
    }

    /// Load a value, falling back to `default` when it is absent or unreadable.
    pub fn load<T: DeserializeOwned>(&self, key: StateKey, default: T) -> T {
        let path = self.path(key);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return default,
            Err(e) => {
                tracing::warn!(key = key.id(), error = %e, "error reading stored value, using default");
                return default;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key = key.id(), error = %e, "error parsing stored value, using default");
                default
            }
        }
    }

    /// Serialize and write the full value for `key`.
    pub fn save<T: Serialize>(&self, key: StateKey, value: &T) -> Result<(), StoreError> {
        let data = serde_json::to_string_pretty(value)
            .map_err(|source| StoreError::Serialize { key: key.id(), source })?;
        let path = self.path(key);
        let tmp = path.with_extension("json.tmp");
        let write = || -> std::io::Result<()> {
            let mut f = fs::File::create(&tmp)?;
            f.write_all(data.as_bytes())?;
            f.flush()?;
            fs::rename(&tmp, &path)
        };
        write().map_err(|source| StoreError::Write { key: key.id(), source })?;
        tracing::debug!(key = key.id(), bytes = data.len(), "saved");
        Ok(())
    }

    /// Last modification time of a stored key, if it has been written.
    pub fn modified(&self, key: StateKey) -> Option<SystemTime> {
        fs::metadata(self.path(key)).and_then(|m| m.modified()).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::Weekday;
    use crate::task::{seed_problem_blocks, seed_weekly_tasks, DayFlags, Note, ProblemBlock, Task, WeeklyTasks};

    #[test]
    fn test_load_missing_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        let value: String = store.load(StateKey::WeeklyNotes, "fallback".to_string());
        assert_eq!(value, "fallback");
    }

    #[test]
    fn test_load_corrupt_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        fs::write(dir.path().join("weeklyTasks_v3.json"), "{not json").unwrap();
        let board = store.load(StateKey::WeeklyTasks, seed_weekly_tasks());
        assert_eq!(board, seed_weekly_tasks());
    }

    #[test]
    fn test_load_wrong_shape_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        fs::write(dir.path().join("problemBlocks_v2.json"), r#"[{"id":1}]"#).unwrap();
        assert_eq!(store.load(StateKey::ProblemBlocks, seed_problem_blocks()), seed_problem_blocks());
    }

    #[test]
    fn test_round_trip_each_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();

        let mut board = seed_weekly_tasks();
        board.day_mut(Weekday::Thursday).push(Task {
            id: 1,
            text: "1:1 prep".into(),
            completed: true,
        });
        store.save(StateKey::WeeklyTasks, &board).unwrap();
        assert_eq!(store.load(StateKey::WeeklyTasks, WeeklyTasks::empty()), board);

        let mut flags = DayFlags::default();
        flags.set(Weekday::Tuesday, true);
        store.save(StateKey::DailyCheckins, &flags).unwrap();
        assert_eq!(store.load(StateKey::DailyCheckins, DayFlags::default()), flags);

        let mut blocks = seed_problem_blocks();
        blocks[0].problem_text = "Venue double-booked".into();
        blocks[0].solutions = ["Call venue".into(), "Move online".into(), String::new()];
        blocks.push(ProblemBlock::empty(2));
        store.save(StateKey::ProblemBlocks, &blocks).unwrap();
        assert_eq!(store.load(StateKey::ProblemBlocks, Vec::<ProblemBlock>::new()), blocks);

        let comms = vec![
            Task { id: 1, text: "Email stakeholders".into(), completed: false },
            Task { id: 3, text: "Post in #ops".into(), completed: true },
        ];
        store.save(StateKey::CommunicationTasks, &comms).unwrap();
        assert_eq!(store.load(StateKey::CommunicationTasks, Vec::<Task>::new()), comms);

        let notes = vec![Note { id: 1, text: "Line one\nLine two".into() }, Note { id: 2, text: String::new() }];
        store.save(StateKey::AdditionalNotes, &notes).unwrap();
        assert_eq!(store.load(StateKey::AdditionalNotes, Vec::<Note>::new()), notes);

        let mut collapsed = DayFlags::default();
        collapsed.set(Weekday::Monday, true);
        collapsed.set(Weekday::Friday, false);
        store.save(StateKey::CollapsedDays, &collapsed).unwrap();
        assert_eq!(store.load(StateKey::CollapsedDays, DayFlags::default()), collapsed);

        store.save(StateKey::WeeklyPriorities, &"ship it".to_string()).unwrap();
        assert_eq!(store.load(StateKey::WeeklyPriorities, String::new()), "ship it");

        store.save(StateKey::WeeklyNotes, &"Offsite on Thursday.\n".to_string()).unwrap();
        assert_eq!(store.load(StateKey::WeeklyNotes, String::new()), "Offsite on Thursday.\n");

        for key in StateKey::ALL {
            assert!(store.modified(key).is_some(), "{} was not written", key.id());
        }
    }

    #[test]
    fn test_save_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        store.save(StateKey::WeeklyNotes, &"x".to_string()).unwrap();
        assert!(dir.path().join("weeklyNotes_v1.json").exists());
        assert!(!dir.path().join("weeklyNotes_v1.json.tmp").exists());
        assert!(store.modified(StateKey::WeeklyNotes).is_some());
        assert!(store.modified(StateKey::WeeklyTasks).is_none());
    }

    #[test]
    fn test_key_ids_are_distinct() {
        let mut ids: Vec<_> = StateKey::ALL.iter().map(|k| k.id()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), StateKey::ALL.len());
    }
}
