//! Delayed turn continuations
//!
//! Continuations run on a virtual millisecond clock advanced by the owner
//! (a Bevy system in the app, the scenario runner in tests). Closing the
//! scheduler drops everything pending and refuses new work, so nothing can
//! fire against a torn-down session.

use std::time::Duration;

/// Work to resume once a delay elapses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuation {
    /// Clear the turn guard and, if still battling, pose the next question
    ResumeBattle,
    /// Play the next attack of the tutorial drill
    NextTutorialAttack,
}

/// Handle for cancelling a scheduled continuation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

#[derive(Debug, Clone)]
struct ScheduledTask {
    id: TaskId,
    due_ms: u64,
    continuation: Continuation,
}

#[derive(Debug, Default)]
pub struct TurnScheduler {
    now_ms: u64,
    /// Sub-millisecond remainder carried between advances
    carry_us: u64,
    next_id: u64,
    pending: Vec<ScheduledTask>,
    closed: bool,
}

impl TurnScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time in milliseconds
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Schedule `continuation` to run `delay_ms` from now.
    /// Returns `None` once the scheduler has been closed.
    pub fn schedule(&mut self, delay_ms: u64, continuation: Continuation) -> Option<TaskId> {
        if self.closed {
            return None;
        }
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.pending.push(ScheduledTask {
            id,
            due_ms: self.now_ms + delay_ms,
            continuation,
        });
        Some(id)
    }

    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|task| task.id != id);
        self.pending.len() != before
    }

    /// Cancel every pending continuation of one kind
    pub fn cancel_kind(&mut self, continuation: Continuation) -> usize {
        let before = self.pending.len();
        self.pending.retain(|task| task.continuation != continuation);
        before - self.pending.len()
    }

    pub fn cancel_all(&mut self) -> usize {
        let count = self.pending.len();
        self.pending.clear();
        count
    }

    /// Cancel everything and refuse further scheduling
    pub fn close(&mut self) -> usize {
        self.closed = true;
        self.cancel_all()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Advance the clock and return the continuations that came due,
    /// earliest first (ties in scheduling order).
    pub fn advance(&mut self, delta: Duration) -> Vec<Continuation> {
        let total_us = self.carry_us + delta.as_micros() as u64;
        self.now_ms += total_us / 1000;
        self.carry_us = total_us % 1000;

        let now = self.now_ms;
        let mut due: Vec<ScheduledTask> = Vec::new();
        self.pending.retain(|task| {
            if task.due_ms <= now {
                due.push(task.clone());
                false
            } else {
                true
            }
        });
        due.sort_by_key(|task| (task.due_ms, task.id.0));
        due.into_iter().map(|task| task.continuation).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_after_delay() {
        let mut scheduler = TurnScheduler::new();
        scheduler.schedule(2000, Continuation::ResumeBattle);

        assert!(scheduler.advance(Duration::from_millis(1999)).is_empty());
        assert_eq!(
            scheduler.advance(Duration::from_millis(1)),
            vec![Continuation::ResumeBattle]
        );
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[test]
    fn test_sub_millisecond_frames_accumulate() {
        let mut scheduler = TurnScheduler::new();
        scheduler.schedule(10, Continuation::NextTutorialAttack);
        // 16.6ms frames: the carry must not be lost
        let frame = Duration::from_micros(16_600);
        assert_eq!(scheduler.advance(frame).len(), 1);
        assert_eq!(scheduler.now_ms(), 16);
        scheduler.advance(frame);
        scheduler.advance(frame);
        assert_eq!(scheduler.now_ms(), 49);
    }

    #[test]
    fn test_due_order() {
        let mut scheduler = TurnScheduler::new();
        scheduler.schedule(500, Continuation::ResumeBattle);
        scheduler.schedule(100, Continuation::NextTutorialAttack);
        let due = scheduler.advance(Duration::from_secs(1));
        assert_eq!(
            due,
            vec![Continuation::NextTutorialAttack, Continuation::ResumeBattle]
        );
    }

    #[test]
    fn test_cancel() {
        let mut scheduler = TurnScheduler::new();
        let id = scheduler.schedule(100, Continuation::ResumeBattle).unwrap();
        scheduler.schedule(100, Continuation::NextTutorialAttack);
        assert!(scheduler.cancel(id));
        assert!(!scheduler.cancel(id));
        assert_eq!(
            scheduler.advance(Duration::from_millis(100)),
            vec![Continuation::NextTutorialAttack]
        );
    }

    #[test]
    fn test_close_drops_pending_and_refuses_new() {
        let mut scheduler = TurnScheduler::new();
        scheduler.schedule(100, Continuation::ResumeBattle);
        assert_eq!(scheduler.close(), 1);
        assert!(scheduler.schedule(100, Continuation::ResumeBattle).is_none());
        assert!(scheduler.advance(Duration::from_secs(5)).is_empty());
    }
}
