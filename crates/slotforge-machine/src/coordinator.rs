//! Triggers every wheel and settles each one when its tick comes due.

use slotforge_tick::TimerQueue;
use tracing::{debug, trace};

use crate::wheel::WheelActor;
use crate::{RoundId, WheelId};

/// Owns a fixed set of wheels and the timers for their pending spins.
///
/// Wheels are stored by index, so `WheelId(i)` is always `wheels[i]`.
pub struct SpinCoordinator {
    wheels: Vec<WheelActor>,
    timers: TimerQueue<WheelId>,
}

impl SpinCoordinator {
    /// Takes ownership of the wheels. Each wheel's id must equal its index.
    pub fn new(wheels: Vec<WheelActor>) -> Self {
        debug_assert!(
            wheels.iter().enumerate().all(|(i, w)| w.id() == WheelId(i)),
            "wheel ids must match their position"
        );
        Self {
            wheels,
            timers: TimerQueue::new(),
        }
    }

    /// Triggers a spin on every wheel for `round`.
    ///
    /// Wheels that are already spinning ignore the trigger. Returns how many
    /// actually started.
    pub fn spin_all(&mut self, round: RoundId, now: u64) -> usize {
        let mut started = 0;
        for wheel in &mut self.wheels {
            if let Some(due) = wheel.spin(round, now) {
                self.timers.schedule(due, wheel.id());
                started += 1;
            }
        }
        debug!(%round, started, of = self.wheels.len(), "wheels triggered");
        started
    }

    /// Settles every wheel whose spin is due at or before `now`. Returns how
    /// many settled.
    pub fn advance(&mut self, now: u64) -> usize {
        let mut settled = 0;
        for id in self.timers.pop_due(now) {
            if let Some(wheel) = self.wheels.get_mut(id.0) {
                if wheel.settle().is_some() {
                    settled += 1;
                }
            }
        }
        if settled > 0 {
            trace!(tick = now, settled, "wheels settled");
        }
        settled
    }

    /// `true` if at least one wheel is mid-spin.
    pub fn is_any_spinning(&self) -> bool {
        self.wheels.iter().any(WheelActor::is_spinning)
    }

    pub fn spinning_count(&self) -> usize {
        self.wheels.iter().filter(|w| w.is_spinning()).count()
    }

    /// The tick of the next pending settle.
    pub fn next_due(&self) -> Option<u64> {
        self.timers.next_due()
    }

    pub fn wheel(&self, id: WheelId) -> Option<&WheelActor> {
        self.wheels.get(id.0)
    }

    pub fn wheels(&self) -> &[WheelActor] {
        &self.wheels
    }

    pub fn len(&self) -> usize {
        self.wheels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wheels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use tokio::sync::mpsc;

    use super::*;
    use crate::SpinFinished;

    fn coordinator(
        n: usize,
        range: std::ops::RangeInclusive<u64>,
    ) -> (SpinCoordinator, mpsc::UnboundedReceiver<SpinFinished>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let wheels = (0..n)
            .map(|i| {
                WheelActor::new(
                    WheelId(i),
                    10,
                    range.clone(),
                    ChaCha8Rng::seed_from_u64(i as u64),
                    tx.clone(),
                )
            })
            .collect();
        (SpinCoordinator::new(wheels), rx)
    }

    #[test]
    fn test_spin_all_starts_every_wheel() {
        let (mut c, _rx) = coordinator(5, 3..=9);
        assert!(!c.is_any_spinning());

        assert_eq!(c.spin_all(RoundId(1), 0), 5);
        assert!(c.is_any_spinning());
        assert_eq!(c.spinning_count(), 5);
    }

    #[test]
    fn test_spin_all_while_spinning_starts_nothing() {
        let (mut c, _rx) = coordinator(3, 3..=9);
        c.spin_all(RoundId(1), 0);
        assert_eq!(c.spin_all(RoundId(2), 1), 0);
        assert!(c.wheels().iter().all(|w| w.round() == Some(RoundId(1))));
    }

    #[test]
    fn test_spinning_until_last_wheel_settles() {
        let (mut c, mut rx) = coordinator(5, 3..=9);
        c.spin_all(RoundId(1), 0);

        let last_due = c.wheels().iter().map(|w| w.spin_ticks()).max().unwrap();
        for tick in 1..last_due {
            c.advance(tick);
            assert!(c.is_any_spinning(), "tick {tick}");
        }
        c.advance(last_due);
        assert!(!c.is_any_spinning());
        assert_eq!(c.next_due(), None);

        let mut reports = 0;
        while rx.try_recv().is_ok() {
            reports += 1;
        }
        assert_eq!(reports, 5);
    }

    #[test]
    fn test_advance_past_everything_settles_all_at_once() {
        let (mut c, _rx) = coordinator(4, 1..=50);
        c.spin_all(RoundId(1), 10);
        assert_eq!(c.advance(1_000), 4);
        assert_eq!(c.advance(1_001), 0);
    }

    #[test]
    fn test_wheel_lookup() {
        let (c, _rx) = coordinator(2, 1..=1);
        assert_eq!(c.wheel(WheelId(1)).map(|w| w.id()), Some(WheelId(1)));
        assert!(c.wheel(WheelId(2)).is_none());
        assert_eq!(c.len(), 2);
    }
}
