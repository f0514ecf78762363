//! Virtual timer queue on the session's cooperative timeline. Each role owns
//! at most one slot: scheduling a role replaces whatever it held and
//! cancelling drops it, so a cancelled task can never fire later.

use std::time::Duration;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TimerRole {
    StagedStart,
    StagedTick,
    AutoCycleTick,
    IdleResume,
    AutoClear,
}

impl TimerRole {
    pub const ALL: [TimerRole; 5] = [
        TimerRole::StagedStart,
        TimerRole::StagedTick,
        TimerRole::AutoCycleTick,
        TimerRole::IdleResume,
        TimerRole::AutoClear,
    ];

    fn index(self) -> usize {
        match self {
            TimerRole::StagedStart => 0,
            TimerRole::StagedTick => 1,
            TimerRole::AutoCycleTick => 2,
            TimerRole::IdleResume => 3,
            TimerRole::AutoClear => 4,
        }
    }
}

/// Monotonic identifier; breaks ties between tasks due at the same instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TaskId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Task {
    id: TaskId,
    due: Duration,
    period: Option<Duration>,
}

/// A task that came due, as handed back by [`Timers::pop_due`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fired {
    pub role: TimerRole,
    pub id: TaskId,
    pub due: Duration,
}

#[derive(Debug, Clone, Default)]
pub struct Timers {
    slots: [Option<Task>; 5],
    next_id: u64,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `role` at `at`, repeating every `period` when given.
    pub fn schedule(&mut self, role: TimerRole, at: Duration, period: Option<Duration>) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        let period = period.filter(|p| !p.is_zero());
        self.slots[role.index()] = Some(Task { id, due: at, period });
        id
    }

    pub fn cancel(&mut self, role: TimerRole) -> bool {
        self.slots[role.index()].take().is_some()
    }

    pub fn cancel_all(&mut self) {
        self.slots = [None; 5];
    }

    pub fn is_scheduled(&self, role: TimerRole) -> bool {
        self.slots[role.index()].is_some()
    }

    pub fn due(&self, role: TimerRole) -> Option<Duration> {
        self.slots[role.index()].map(|task| task.due)
    }

    /// Earliest pending deadline, if any.
    pub fn next_due(&self) -> Option<Duration> {
        self.slots.iter().flatten().map(|task| task.due).min()
    }

    /// Removes and returns the earliest task due at or before `now`.
    /// Periodic tasks are re-armed one period later under the same id.
    pub fn pop_due(&mut self, now: Duration) -> Option<Fired> {
        let (role, task) = TimerRole::ALL
            .iter()
            .filter_map(|role| self.slots[role.index()].map(|task| (*role, task)))
            .filter(|(_, task)| task.due <= now)
            .min_by_key(|(_, task)| (task.due, task.id))?;

        let slot = &mut self.slots[role.index()];
        *slot = task.period.map(|period| Task {
            due: task.due + period,
            ..task
        });
        Some(Fired {
            role,
            id: task.id,
            due: task.due,
        })
    }
}
