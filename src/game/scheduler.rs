//! Logical-time scheduler for deferred continuations
//!
//! Every delay in a battle (banner, start delay, enemy pauses, interrupt
//! windows) is a scheduled continuation on an integer clock. Each task is
//! tagged with the session that owns it, and a subsystem holds at most one
//! pending task, so late callbacks can never touch a finished or foreign
//! session.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_SESSION: AtomicU64 = AtomicU64::new(1);

/// Identity of one battle session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(u64);

impl SessionId {
    pub fn new(id: u64) -> Self {
        SessionId(id)
    }

    /// A process-unique id
    pub fn fresh() -> Self {
        SessionId(NEXT_SESSION.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Subsystem that owns a scheduled task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskKind {
    /// Banner and start-delay transitions
    TurnTransition,
    /// The pause before the enemy's next ability
    EnemySequence,
    /// The interrupt window timeout
    Interrupt,
}

/// What to do when a task comes due
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Continuation {
    BannerElapsed { next: crate::core::Side },
    StartDelayElapsed { next: crate::core::Side },
    EnemyAction,
    InterruptTimeout,
}

impl Continuation {
    pub fn kind(&self) -> TaskKind {
        match self {
            Continuation::BannerElapsed { .. } | Continuation::StartDelayElapsed { .. } => {
                TaskKind::TurnTransition
            }
            Continuation::EnemyAction => TaskKind::EnemySequence,
            Continuation::InterruptTimeout => TaskKind::Interrupt,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledTask {
    pub session: SessionId,
    pub due: u64,
    /// Tie-break for tasks due at the same instant
    seq: u64,
    pub continuation: Continuation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scheduler {
    session: SessionId,
    now: u64,
    next_seq: u64,
    tasks: SmallVec<[ScheduledTask; 3]>,
}

impl Scheduler {
    pub fn new(session: SessionId) -> Self {
        Scheduler {
            session,
            now: 0,
            next_seq: 0,
            tasks: SmallVec::new(),
        }
    }

    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Schedule `continuation` after `delay` units
    ///
    /// Replaces any task already pending for the same subsystem and returns it.
    pub fn schedule(&mut self, delay: u32, continuation: Continuation) -> Option<ScheduledTask> {
        let replaced = self.cancel(continuation.kind());
        self.tasks.push(ScheduledTask {
            session: self.session,
            due: self.now + delay as u64,
            seq: self.next_seq,
            continuation,
        });
        self.next_seq += 1;
        replaced
    }

    pub fn cancel(&mut self, kind: TaskKind) -> Option<ScheduledTask> {
        let pos = self
            .tasks
            .iter()
            .position(|t| t.continuation.kind() == kind)?;
        Some(self.tasks.remove(pos))
    }

    /// Drop every pending task, returns how many were dropped
    pub fn cancel_all(&mut self) -> usize {
        let n = self.tasks.len();
        self.tasks.clear();
        n
    }

    pub fn pending(&self, kind: TaskKind) -> Option<&ScheduledTask> {
        self.tasks.iter().find(|t| t.continuation.kind() == kind)
    }

    /// Units until the task of `kind` comes due
    pub fn remaining(&self, kind: TaskKind) -> Option<u64> {
        self.pending(kind).map(|t| t.due.saturating_sub(self.now))
    }

    /// Units until the earliest task comes due
    pub fn time_until_next(&self) -> Option<u64> {
        self.tasks
            .iter()
            .map(|t| t.due.saturating_sub(self.now))
            .min()
    }

    /// Remove and return the earliest task due at or before now
    pub fn pop_due(&mut self) -> Option<ScheduledTask> {
        let now = self.now;
        let pos = self
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= now)
            .min_by_key(|(_, t)| (t.due, t.seq))
            .map(|(i, _)| i)?;
        Some(self.tasks.remove(pos))
    }

    /// Move the clock forward one unit
    pub fn tick(&mut self) {
        self.now += 1;
    }

    pub fn is_idle(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Side;

    #[test]
    fn test_tasks_fire_in_due_order() {
        let mut sched = Scheduler::new(SessionId::new(7));
        sched.schedule(3, Continuation::EnemyAction);
        sched.schedule(1, Continuation::BannerElapsed { next: Side::Player });

        assert!(sched.pop_due().is_none());
        sched.tick();
        let task = sched.pop_due().unwrap();
        assert_eq!(task.continuation, Continuation::BannerElapsed { next: Side::Player });
        assert_eq!(task.session, SessionId::new(7));

        sched.tick();
        assert!(sched.pop_due().is_none());
        sched.tick();
        assert_eq!(sched.pop_due().unwrap().continuation, Continuation::EnemyAction);
        assert!(sched.is_idle());
    }

    #[test]
    fn test_one_task_per_kind() {
        let mut sched = Scheduler::new(SessionId::new(1));
        assert!(sched.schedule(5, Continuation::EnemyAction).is_none());
        let replaced = sched.schedule(2, Continuation::EnemyAction);
        assert_eq!(replaced.map(|t| t.due), Some(5));
        assert_eq!(sched.len(), 1);
        assert_eq!(sched.remaining(TaskKind::EnemySequence), Some(2));
    }

    #[test]
    fn test_zero_delay_is_due_immediately() {
        let mut sched = Scheduler::new(SessionId::new(1));
        sched.schedule(0, Continuation::StartDelayElapsed { next: Side::Enemy });
        assert_eq!(sched.time_until_next(), Some(0));
        assert!(sched.pop_due().is_some());
    }

    #[test]
    fn test_cancel_all() {
        let mut sched = Scheduler::new(SessionId::new(1));
        sched.schedule(5, Continuation::EnemyAction);
        sched.schedule(15, Continuation::InterruptTimeout);
        assert_eq!(sched.cancel_all(), 2);
        for _ in 0..20 {
            sched.tick();
        }
        assert!(sched.pop_due().is_none());
    }

    #[test]
    fn test_fresh_session_ids_are_unique() {
        let a = SessionId::fresh();
        let b = SessionId::fresh();
        assert_ne!(a, b);
    }
}
