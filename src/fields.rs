//! Enumerations and small field types for the planner.
//!
//! The planner covers the five working days only. `Weekday` is a closed enum so
//! every per-day map can be kept total, and `SolutionSlot` restricts solution
//! edits to the three slots a problem block carries.

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// A working day of the planner week, ordered Monday first.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Weekday {
    #[value(alias = "mon")]
    Monday,
    #[value(alias = "tue")]
    Tuesday,
    #[value(alias = "wed")]
    Wednesday,
    #[value(alias = "thu")]
    Thursday,
    #[value(alias = "fri")]
    Friday,
}

impl Weekday {
    /// All weekdays in display order.
    pub const ALL: [Weekday; 5] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Index of one of the three solution slots on a problem block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolutionSlot(usize);

impl SolutionSlot {
    pub const COUNT: usize = 3;

    /// Build a slot from a zero-based index.
    pub fn new(index: usize) -> Option<Self> {
        (index < Self::COUNT).then_some(SolutionSlot(index))
    }

    pub fn index(self) -> usize {
        self.0
    }
}

/// Parses the one-based slot number used on the command line.
impl FromStr for SolutionSlot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let n: usize = s
            .trim()
            .parse()
            .map_err(|_| format!("'{}' is not a solution number", s))?;
        n.checked_sub(1)
            .and_then(SolutionSlot::new)
            .ok_or_else(|| format!("solution number must be 1, 2 or 3 (got {})", n))
    }
}
