//! The composed slot machine.
//!
//! [`SlotMachine`] wires wheels, coordinator, aggregator and player state
//! together around one event channel. It is driven entirely from outside:
//! call [`SlotMachine::tick`] once per tick and [`SlotMachine::spin_all`]
//! when the lever is pulled. Nothing here spawns tasks or sleeps.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::coordinator::SpinCoordinator;
use crate::wheel::WheelActor;
use crate::{
    BalanceWatcher, MachineConfig, MachineError, MachineState, OutcomeAggregator, PlayerState,
    RoundId, RoundOutcome, SpinFinished, WheelId,
};

/// A complete machine: N wheels, the round barrier, and the balance.
pub struct SlotMachine {
    config: MachineConfig,
    coordinator: SpinCoordinator,
    aggregator: OutcomeAggregator,
    player: PlayerState,
    events: mpsc::UnboundedReceiver<SpinFinished>,
    /// Last round handed out; `RoundId(0)` before the first pull.
    last_round: RoundId,
    now: u64,
    seed: u64,
}

impl SlotMachine {
    /// Builds a machine from `config` (validated first).
    ///
    /// Each wheel gets its own RNG seeded from the machine seed, so a fixed
    /// `config.seed` replays the same spins.
    pub fn new(config: MachineConfig) -> Self {
        let config = config.validated();
        let seed = config.seed.unwrap_or_else(|| rand::rng().random());
        let mut master = ChaCha8Rng::seed_from_u64(seed);

        let (tx, events) = mpsc::unbounded_channel();
        let wheels = (0..config.wheel_count)
            .map(|i| {
                WheelActor::new(
                    WheelId(i),
                    config.face_count,
                    config.min_spin_ticks..=config.max_spin_ticks,
                    ChaCha8Rng::seed_from_u64(master.random()),
                    tx.clone(),
                )
            })
            .collect();

        info!(
            wheels = config.wheel_count,
            faces = config.face_count,
            balance = config.starting_balance,
            seed,
            "slot machine built"
        );

        Self {
            coordinator: SpinCoordinator::new(wheels),
            aggregator: OutcomeAggregator::new(config.wheel_count, config.payout),
            player: PlayerState::new(config.starting_balance),
            events,
            last_round: RoundId(0),
            now: 0,
            seed,
            config,
        }
    }

    /// Starts a new round on every wheel.
    ///
    /// # Errors
    /// [`MachineError::RoundInProgress`] while a round is open, or while
    /// wheels from a cancelled round are still spinning.
    pub fn spin_all(&mut self) -> Result<RoundId, MachineError> {
        if let Some(open) = self.aggregator.current_round() {
            return Err(MachineError::RoundInProgress(open));
        }
        if self.coordinator.is_any_spinning() {
            return Err(MachineError::RoundInProgress(self.last_round));
        }

        let round = self.last_round.next();
        self.aggregator.open(round)?;
        self.last_round = round;
        self.coordinator.spin_all(round, self.now);
        info!(%round, tick = self.now, "round started");
        Ok(round)
    }

    /// Advances the machine to tick `now`: settles every wheel that is due,
    /// then feeds their reports to the aggregator.
    ///
    /// The clock never moves backwards: a `now` earlier than the current
    /// tick is treated as the current tick.
    ///
    /// Returns the outcome if the open round resolved on this tick.
    pub fn tick(&mut self, now: u64) -> Option<RoundOutcome> {
        let now = now.max(self.now);
        self.now = now;
        self.coordinator.advance(now);

        let mut resolved = None;
        while let Ok(event) = self.events.try_recv() {
            if let Some(outcome) = self.aggregator.record(event, &self.player) {
                resolved = Some(outcome);
            }
        }
        resolved
    }

    /// Advances by exactly one tick.
    pub fn step(&mut self) -> Option<RoundOutcome> {
        self.tick(self.now.saturating_add(1))
    }

    /// Closes the open round without paying out.
    ///
    /// Wheels already spinning keep going; their reports arrive later and
    /// are discarded as stale.
    ///
    /// # Errors
    /// [`MachineError::NoRoundOpen`] if nothing is being collected.
    pub fn cancel_round(&mut self) -> Result<RoundId, MachineError> {
        let round = self.aggregator.cancel().ok_or(MachineError::NoRoundOpen)?;
        debug!(
            %round,
            still_spinning = self.coordinator.spinning_count(),
            "late reports will be discarded"
        );
        Ok(round)
    }

    pub fn is_any_spinning(&self) -> bool {
        self.coordinator.is_any_spinning()
    }

    pub fn state(&self) -> MachineState {
        self.aggregator.state()
    }

    /// The round being collected, if any.
    pub fn current_round(&self) -> Option<RoundId> {
        self.aggregator.current_round()
    }

    pub fn balance(&self) -> i64 {
        self.player.get()
    }

    pub fn subscribe_balance(&self) -> BalanceWatcher {
        self.player.subscribe()
    }

    /// The last tick the machine was advanced to.
    pub fn current_tick(&self) -> u64 {
        self.now
    }

    /// The seed in use (drawn at build time when not configured).
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    pub fn coordinator(&self) -> &SpinCoordinator {
        &self.coordinator
    }
}
