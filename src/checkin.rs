//! Derived check-in rule.
//!
//! A day counts as checked in once it has tasks and every one of them is
//! done. The rule only ever syncs tasks into the check-in flags; a manual
//! check-in stands until the next reconciliation overwrites it.

use crate::fields::Weekday;
use crate::task::{DayFlags, WeeklyTasks};

/// Output of a reconciliation pass over all five days.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    pub checkins: DayFlags,
    pub collapsed: DayFlags,
    pub changed: bool,
}

/// Recompute check-in flags from task completion.
///
/// A day that flips to checked in is also collapsed. A day that flips back
/// keeps whatever collapse state it had. All days are computed into one new
/// pair of maps so callers can persist them in a single pass.
pub fn reconcile_checkins(tasks: &WeeklyTasks, checkins: &DayFlags, collapsed: &DayFlags) -> Reconciled {
    let mut next_checkins = checkins.clone();
    let mut next_collapsed = collapsed.clone();
    let mut changed = false;

    for day in Weekday::ALL {
        let all_done = tasks.all_done(day);
        if checkins.get(day) == all_done {
            continue;
        }
        next_checkins.set(day, all_done);
        if all_done {
            next_collapsed.set(day, true);
        }
        changed = true;
        tracing::debug!(%day, checked_in = all_done, "check-in recomputed");
    }

    Reconciled {
        checkins: next_checkins,
        collapsed: next_collapsed,
        changed,
    }
}
