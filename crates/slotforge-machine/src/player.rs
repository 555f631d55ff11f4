//! The player's balance.
//!
//! Backed by a `tokio::sync::watch` channel: the aggregator is the only
//! writer, and any number of observers (a UI label, the runtime's info
//! command) can read the latest value or wait for changes.

use std::fmt;

use tokio::sync::watch;

/// Read-only view of the balance for observers.
pub type BalanceWatcher = watch::Receiver<i64>;

/// Display wrapper that renders a balance the way the money label shows it:
/// `$950`, `$-50`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Balance(pub i64);

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.0)
    }
}

/// Holds the balance. Unbounded in both directions.
#[derive(Debug)]
pub struct PlayerState {
    balance: watch::Sender<i64>,
}

impl PlayerState {
    pub fn new(initial: i64) -> Self {
        let (balance, _) = watch::channel(initial);
        Self { balance }
    }

    /// Adds `delta` (possibly negative) and returns the new balance.
    ///
    /// Observers see a single change per call.
    pub fn increment(&self, delta: i64) -> i64 {
        let mut after = 0;
        self.balance.send_modify(|balance| {
            *balance = balance.saturating_add(delta);
            after = *balance;
        });
        after
    }

    /// Current balance.
    pub fn get(&self) -> i64 {
        *self.balance.borrow()
    }

    pub fn subscribe(&self) -> BalanceWatcher {
        self.balance.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_increment_and_get() {
        let player = PlayerState::new(500);
        assert_eq!(player.increment(450), 950);
        assert_eq!(player.increment(-100), 850);
        assert_eq!(player.get(), 850);
    }

    #[test]
    fn test_balance_may_go_negative() {
        let player = PlayerState::new(50);
        assert_eq!(player.increment(-100), -50);
        assert_eq!(Balance(player.get()).to_string(), "$-50");
    }

    #[test]
    fn test_subscriber_sees_change() {
        let player = PlayerState::new(500);
        let mut watcher = player.subscribe();
        assert!(!watcher.has_changed().unwrap());

        player.increment(200);
        assert!(watcher.has_changed().unwrap());
        assert_eq!(*watcher.borrow_and_update(), 700);
    }

    #[test]
    fn test_balance_label() {
        assert_eq!(Balance(950).to_string(), "$950");
    }
}
