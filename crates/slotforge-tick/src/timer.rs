//! Tick-keyed timer queue.
//!
//! Work is scheduled against an absolute tick number and handed back once
//! the owner reports that tick. Nothing here runs on its own: the queue is
//! polled from the same task that owns the [`TickScheduler`](crate::TickScheduler),
//! so delivery is always on the owning thread.

use std::collections::BTreeMap;

/// A queue of items waiting for a tick to come due.
///
/// Items due on the same tick come back in the order they were scheduled.
#[derive(Debug, Clone)]
pub struct TimerQueue<T> {
    slots: BTreeMap<u64, Vec<T>>,
    len: usize,
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self {
            slots: BTreeMap::new(),
            len: 0,
        }
    }

    /// Schedules `item` to come due at tick `due`.
    pub fn schedule(&mut self, due: u64, item: T) {
        self.slots.entry(due).or_default().push(item);
        self.len += 1;
    }

    /// Removes and returns every item due at or before `now`, earliest tick
    /// first.
    pub fn pop_due(&mut self, now: u64) -> Vec<T> {
        let later = match now.checked_add(1) {
            Some(split) => self.slots.split_off(&split),
            None => BTreeMap::new(),
        };
        let due = std::mem::replace(&mut self.slots, later);

        let items: Vec<T> = due.into_values().flatten().collect();
        self.len -= items.len();
        items
    }

    /// The earliest tick that has something scheduled.
    pub fn next_due(&self) -> Option<u64> {
        self.slots.keys().next().copied()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pop_due_returns_nothing_before_deadline() {
        let mut q = TimerQueue::new();
        q.schedule(10, "a");
        assert!(q.pop_due(9).is_empty());
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn test_pop_due_includes_exact_tick() {
        let mut q = TimerQueue::new();
        q.schedule(10, "a");
        assert_eq!(q.pop_due(10), vec!["a"]);
        assert!(q.is_empty());
    }

    #[test]
    fn test_pop_due_orders_by_tick_then_insertion() {
        let mut q = TimerQueue::new();
        q.schedule(5, "late");
        q.schedule(3, "first");
        q.schedule(3, "second");
        q.schedule(9, "future");

        assert_eq!(q.pop_due(6), vec!["first", "second", "late"]);
        assert_eq!(q.len(), 1);
        assert_eq!(q.next_due(), Some(9));
    }

    #[test]
    fn test_pop_due_at_max_tick_drains_everything() {
        let mut q = TimerQueue::new();
        q.schedule(u64::MAX, 1);
        q.schedule(0, 2);
        assert_eq!(q.pop_due(u64::MAX), vec![2, 1]);
        assert!(q.is_empty());
    }
}
