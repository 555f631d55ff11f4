//! Collects wheel reports for the open round and pays out once all are in.
//!
//! The aggregator is the only writer of the player's balance. It resolves a
//! round exactly once, after exactly one report from every wheel, whatever
//! order those reports arrive in. Reports for any other round are dropped.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::{
    Face, MachineError, MachineState, PayoutTable, PlayerState, RoundId, RoundOutcome,
    SpinFinished,
};

/// Size of the largest group of equal faces. 0 for an empty slice.
///
/// Ties don't matter: `[2, 2, 3, 3, 5]` is 2.
pub fn max_frequency(faces: &[Face]) -> usize {
    let mut counts: HashMap<Face, usize> = HashMap::with_capacity(faces.len());
    for face in faces {
        *counts.entry(*face).or_default() += 1;
    }
    counts.into_values().max().unwrap_or(0)
}

/// Reward for a round: `max_frequency² × unit` when any face repeats,
/// otherwise minus the ante. Saturates at the `i64` bounds.
pub fn reward(max_frequency: usize, payout: &PayoutTable) -> i64 {
    if max_frequency > 1 {
        let n = i64::try_from(max_frequency).unwrap_or(i64::MAX);
        n.saturating_mul(n).saturating_mul(payout.unit)
    } else {
        payout.ante.saturating_neg()
    }
}

/// Bookkeeping for the round in progress. One slot per wheel.
#[derive(Debug)]
struct SpinSession {
    round: RoundId,
    slots: Vec<Option<Face>>,
    reported: usize,
}

/// Two-state collector: idle, or collecting one round.
#[derive(Debug)]
pub struct OutcomeAggregator {
    wheel_count: usize,
    payout: PayoutTable,
    session: Option<SpinSession>,
}

impl OutcomeAggregator {
    pub fn new(wheel_count: usize, payout: PayoutTable) -> Self {
        Self {
            wheel_count,
            payout,
            session: None,
        }
    }

    /// Opens a session for `round`.
    ///
    /// # Errors
    /// [`MachineError::RoundInProgress`] if a session is already open.
    pub fn open(&mut self, round: RoundId) -> Result<(), MachineError> {
        if let Some(session) = &self.session {
            return Err(MachineError::RoundInProgress(session.round));
        }
        self.session = Some(SpinSession {
            round,
            slots: vec![None; self.wheel_count],
            reported: 0,
        });
        debug!(%round, wheels = self.wheel_count, "session opened");
        Ok(())
    }

    /// Records one wheel's report.
    ///
    /// When the last slot fills, closes the session, applies the reward to
    /// `player` and returns the outcome. Reports that belong to no open
    /// round, name an unknown wheel, or repeat a filled slot are discarded.
    pub fn record(&mut self, event: SpinFinished, player: &PlayerState) -> Option<RoundOutcome> {
        let session = match &mut self.session {
            Some(s) if s.round == event.round => s,
            Some(s) => {
                debug!(
                    stale = %event.round,
                    open = %s.round,
                    wheel = %event.wheel,
                    "discarding report from another round"
                );
                return None;
            }
            None => {
                debug!(round = %event.round, wheel = %event.wheel, "no open round, discarding report");
                return None;
            }
        };

        let Some(slot) = session.slots.get_mut(event.wheel.0) else {
            warn!(round = %event.round, wheel = %event.wheel, "report from unknown wheel");
            return None;
        };
        if slot.is_some() {
            warn!(round = %event.round, wheel = %event.wheel, "duplicate report, ignoring");
            return None;
        }
        *slot = Some(event.face);
        session.reported += 1;

        if session.reported < self.wheel_count {
            return None;
        }

        let session = self.session.take()?;
        let faces: Vec<Face> = session.slots.into_iter().flatten().collect();
        let max_frequency = max_frequency(&faces);
        let reward = reward(max_frequency, &self.payout);
        let balance = player.increment(reward);

        info!(
            round = %session.round,
            ?faces,
            max_frequency,
            reward,
            balance,
            "round resolved"
        );

        Some(RoundOutcome {
            round: session.round,
            faces,
            max_frequency,
            reward,
            balance,
        })
    }

    /// Closes the open session without paying out. Returns the cancelled
    /// round.
    pub fn cancel(&mut self) -> Option<RoundId> {
        let session = self.session.take()?;
        info!(round = %session.round, reported = session.reported, "round cancelled");
        Some(session.round)
    }

    pub fn state(&self) -> MachineState {
        match self.session {
            Some(_) => MachineState::Collecting,
            None => MachineState::Idle,
        }
    }

    /// The round being collected, if any.
    pub fn current_round(&self) -> Option<RoundId> {
        self.session.as_ref().map(|s| s.round)
    }

    /// Reports collected so far for the open round.
    pub fn reported(&self) -> usize {
        self.session.as_ref().map_or(0, |s| s.reported)
    }
}
