//! A single wheel.
//!
//! A wheel owns its spin state and its own RNG. It does not keep time:
//! [`WheelActor::spin`] returns the tick it must settle on, and whoever owns
//! the timer calls [`WheelActor::settle`] when that tick arrives.

use std::ops::RangeInclusive;

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::{Face, RoundId, SpinFinished, WheelId};

/// Sending half of the channel wheels report into.
pub type EventSender = mpsc::UnboundedSender<SpinFinished>;

/// One independently timed wheel.
pub struct WheelActor {
    id: WheelId,
    /// `Some` from `spin` until the terminal face is committed.
    in_flight: Option<RoundId>,
    face: Face,
    face_count: u32,
    spin_range: RangeInclusive<u64>,
    /// Duration chosen for the current (or last) spin.
    spin_ticks: u64,
    rng: ChaCha8Rng,
    events: EventSender,
}

impl WheelActor {
    /// Builds an idle wheel showing face 0.
    ///
    /// `face_count` and the lower end of `spin_range` are raised to 1 if
    /// zero; an empty range collapses to its start.
    pub fn new(
        id: WheelId,
        face_count: u32,
        spin_range: RangeInclusive<u64>,
        rng: ChaCha8Rng,
        events: EventSender,
    ) -> Self {
        let min = (*spin_range.start()).max(1);
        let max = (*spin_range.end()).max(min);
        Self {
            id,
            in_flight: None,
            face: Face(0),
            face_count: face_count.max(1),
            spin_range: min..=max,
            spin_ticks: 0,
            rng,
            events,
        }
    }

    /// Starts a spin for `round` and returns the tick it should settle on.
    ///
    /// Returns `None` without touching anything if the wheel is already
    /// spinning, so a second trigger never produces a second report.
    pub fn spin(&mut self, round: RoundId, now: u64) -> Option<u64> {
        if let Some(current) = self.in_flight {
            debug!(wheel = %self.id, %current, "already spinning, ignoring trigger");
            return None;
        }

        self.spin_ticks = self.rng.random_range(self.spin_range.clone());
        self.in_flight = Some(round);
        debug!(wheel = %self.id, %round, ticks = self.spin_ticks, "spin started");
        Some(now.saturating_add(self.spin_ticks))
    }

    /// Commits a random face and reports it.
    ///
    /// No-op on an idle wheel. A closed event channel loses the report but
    /// still leaves the wheel idle.
    pub fn settle(&mut self) -> Option<Face> {
        let round = self.in_flight.take()?;
        self.face = Face(self.rng.random_range(0..self.face_count));

        debug!(wheel = %self.id, %round, face = %self.face, "spin finished");
        let event = SpinFinished {
            round,
            wheel: self.id,
            face: self.face,
        };
        if self.events.send(event).is_err() {
            warn!(wheel = %self.id, %round, "event channel closed, report dropped");
        }
        Some(self.face)
    }

    pub fn id(&self) -> WheelId {
        self.id
    }

    pub fn is_spinning(&self) -> bool {
        self.in_flight.is_some()
    }

    /// The face currently showing (the last committed one).
    pub fn face(&self) -> Face {
        self.face
    }

    /// The round this wheel is spinning for, if any.
    pub fn round(&self) -> Option<RoundId> {
        self.in_flight
    }

    /// Duration in ticks of the current or most recent spin.
    pub fn spin_ticks(&self) -> u64 {
        self.spin_ticks
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    fn wheel(
        faces: u32,
        range: RangeInclusive<u64>,
    ) -> (WheelActor, mpsc::UnboundedReceiver<SpinFinished>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let w = WheelActor::new(WheelId(0), faces, range, ChaCha8Rng::seed_from_u64(7), tx);
        (w, rx)
    }

    #[test]
    fn test_spin_schedules_within_range() {
        let (mut w, _rx) = wheel(10, 5..=8);
        let due = w.spin(RoundId(1), 100).unwrap();
        assert!((105..=108).contains(&due));
        assert_eq!(due - 100, w.spin_ticks());
        assert!(w.is_spinning());
        assert_eq!(w.round(), Some(RoundId(1)));
    }

    #[test]
    fn test_second_spin_is_noop() {
        let (mut w, mut rx) = wheel(10, 5..=8);
        let first = w.spin(RoundId(1), 0);
        let ticks = w.spin_ticks();

        assert_eq!(w.spin(RoundId(2), 3), None);
        assert_eq!(w.spin_ticks(), ticks);
        assert_eq!(w.round(), Some(RoundId(1)));
        assert!(first.is_some());

        w.settle();
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err(), "exactly one report per spin");
    }

    #[test]
    fn test_settle_reports_face_and_goes_idle() {
        let (mut w, mut rx) = wheel(3, 1..=1);
        w.spin(RoundId(4), 0);
        let face = w.settle().unwrap();

        assert!(face.0 < 3);
        assert!(!w.is_spinning());
        assert_eq!(w.face(), face);
        assert_eq!(
            rx.try_recv().unwrap(),
            SpinFinished { round: RoundId(4), wheel: WheelId(0), face }
        );
    }

    #[test]
    fn test_settle_idle_wheel_is_noop() {
        let (mut w, mut rx) = wheel(10, 1..=1);
        assert_eq!(w.settle(), None);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_settle_with_closed_channel_still_goes_idle() {
        let (mut w, rx) = wheel(10, 1..=1);
        drop(rx);
        w.spin(RoundId(1), 0);
        assert!(w.settle().is_some());
        assert!(!w.is_spinning());
    }

    #[test]
    fn test_degenerate_parameters_are_fixed() {
        let (mut w, _rx) = wheel(0, 0..=0);
        assert_eq!(w.spin(RoundId(1), 10), Some(11));
        assert_eq!(w.settle(), Some(Face(0)));
    }

    #[test]
    fn test_faces_cover_the_face_set() {
        let (mut w, _rx) = wheel(4, 1..=1);
        let mut seen = [false; 4];
        for round in 1..=200 {
            w.spin(RoundId(round), 0);
            seen[w.settle().unwrap().0 as usize] = true;
        }
        assert!(seen.iter().all(|s| *s), "uniform draw should hit every face");
    }
}
