//! Machine actor: a Tokio task that owns one [`SlotMachine`].
//!
//! The actor interleaves two sources in a `tokio::select!` loop: commands
//! from [`MachineHandle`]s and ticks from its [`TickScheduler`]. All machine
//! state is touched only from inside the task.
//!
//! The scheduler only runs while there is something to settle: it is paused
//! whenever no round is open and no wheel is spinning, and resumed by a
//! successful lever pull. An idle machine costs no wakeups.

use slotforge_machine::{
    BalanceWatcher, MachineConfig, MachineError, MachineState, RoundId, RoundOutcome, SlotMachine,
};
use slotforge_tick::TickScheduler;
use tokio::sync::{broadcast, mpsc, oneshot};

use crate::SlotforgeError;

/// Command channel size for a machine actor.
const DEFAULT_CHANNEL_SIZE: usize = 64;

/// Resolved rounds buffered per outcome subscriber.
const OUTCOME_CAPACITY: usize = 16;

/// Commands sent to a machine actor.
enum MachineCommand {
    /// Start a round on every wheel.
    PullLever {
        reply: oneshot::Sender<Result<RoundId, MachineError>>,
    },

    IsSpinning {
        reply: oneshot::Sender<bool>,
    },

    /// Abandon the open round.
    CancelRound {
        reply: oneshot::Sender<Result<RoundId, MachineError>>,
    },

    GetInfo {
        reply: oneshot::Sender<MachineInfo>,
    },

    Shutdown,
}

/// Snapshot of a running machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineInfo {
    pub state: MachineState,
    /// The round being collected, if any.
    pub round: Option<RoundId>,
    /// Wheels currently mid-spin.
    pub spinning: usize,
    pub balance: i64,
    pub tick: u64,
    /// `false` while the tick loop is parked on an idle machine.
    pub ticking: bool,
}

/// Handle to a running machine actor. Cheap to clone.
#[derive(Clone)]
pub struct MachineHandle {
    sender: mpsc::Sender<MachineCommand>,
    balance: BalanceWatcher,
    outcomes: broadcast::Sender<RoundOutcome>,
}

impl MachineHandle {
    /// Pulls the lever: starts a round on every wheel.
    ///
    /// # Errors
    /// [`MachineError::RoundInProgress`] (wrapped) while a round is still
    /// resolving.
    pub async fn pull_lever(&self) -> Result<RoundId, SlotforgeError> {
        let (reply, rx) = oneshot::channel();
        self.send(MachineCommand::PullLever { reply }).await?;
        Ok(rx.await.map_err(|_| SlotforgeError::Unavailable)??)
    }

    /// `true` if any wheel is mid-spin. Use it to disable the lever.
    pub async fn is_any_spinning(&self) -> Result<bool, SlotforgeError> {
        let (reply, rx) = oneshot::channel();
        self.send(MachineCommand::IsSpinning { reply }).await?;
        rx.await.map_err(|_| SlotforgeError::Unavailable)
    }

    /// Cancels the open round. Reports still in flight are discarded.
    pub async fn cancel_round(&self) -> Result<RoundId, SlotforgeError> {
        let (reply, rx) = oneshot::channel();
        self.send(MachineCommand::CancelRound { reply }).await?;
        Ok(rx.await.map_err(|_| SlotforgeError::Unavailable)??)
    }

    pub async fn info(&self) -> Result<MachineInfo, SlotforgeError> {
        let (reply, rx) = oneshot::channel();
        self.send(MachineCommand::GetInfo { reply }).await?;
        rx.await.map_err(|_| SlotforgeError::Unavailable)
    }

    /// Tells the actor to stop.
    pub async fn shutdown(&self) -> Result<(), SlotforgeError> {
        self.send(MachineCommand::Shutdown).await
    }

    /// Read-only balance observable, for display.
    pub fn balance(&self) -> BalanceWatcher {
        self.balance.clone()
    }

    /// Subscribes to resolved rounds. Only rounds resolved after this call
    /// are delivered.
    pub fn outcomes(&self) -> broadcast::Receiver<RoundOutcome> {
        self.outcomes.subscribe()
    }

    async fn send(&self, cmd: MachineCommand) -> Result<(), SlotforgeError> {
        self.sender
            .send(cmd)
            .await
            .map_err(|_| SlotforgeError::Unavailable)
    }
}

/// Actor state. Runs inside a Tokio task.
struct MachineActor {
    machine: SlotMachine,
    scheduler: TickScheduler,
    receiver: mpsc::Receiver<MachineCommand>,
    outcomes: broadcast::Sender<RoundOutcome>,
}

impl MachineActor {
    async fn run(mut self) {
        tracing::info!(seed = self.machine.seed(), "machine actor started");
        self.pause_if_idle();

        loop {
            tokio::select! {
                cmd = self.receiver.recv() => {
                    let Some(cmd) = cmd else { break };
                    if !self.handle(cmd) {
                        break;
                    }
                    self.pause_if_idle();
                }
                info = self.scheduler.wait_for_tick() => {
                    if let Some(outcome) = self.machine.tick(info.tick) {
                        // No subscribers is fine; the balance already moved.
                        let _ = self.outcomes.send(outcome);
                    }
                    self.pause_if_idle();
                }
            }
        }

        tracing::info!(
            tick = self.scheduler.tick_count(),
            balance = self.machine.balance(),
            "machine actor stopped"
        );
    }

    /// Returns `false` when the actor should stop.
    fn handle(&mut self, cmd: MachineCommand) -> bool {
        match cmd {
            MachineCommand::PullLever { reply } => {
                let result = self.machine.spin_all();
                match &result {
                    Ok(_) => self.scheduler.resume(),
                    Err(e) => tracing::debug!(error = %e, "lever pull rejected"),
                }
                let _ = reply.send(result);
            }
            MachineCommand::IsSpinning { reply } => {
                let _ = reply.send(self.machine.is_any_spinning());
            }
            MachineCommand::CancelRound { reply } => {
                let _ = reply.send(self.machine.cancel_round());
            }
            MachineCommand::GetInfo { reply } => {
                let _ = reply.send(self.info());
            }
            MachineCommand::Shutdown => {
                tracing::info!("machine shutting down");
                return false;
            }
        }
        true
    }

    /// Parks the tick loop when nothing is left to settle.
    fn pause_if_idle(&mut self) {
        if self.machine.state() == MachineState::Idle && !self.machine.is_any_spinning() {
            self.scheduler.pause();
        }
    }

    fn info(&self) -> MachineInfo {
        MachineInfo {
            state: self.machine.state(),
            round: self.machine.current_round(),
            spinning: self.machine.coordinator().spinning_count(),
            balance: self.machine.balance(),
            tick: self.machine.current_tick(),
            ticking: !self.scheduler.is_paused(),
        }
    }
}

/// Builds a machine from `config` and spawns its actor on the current Tokio
/// runtime.
pub fn spawn_machine(config: MachineConfig) -> MachineHandle {
    let machine = SlotMachine::new(config);
    let scheduler = TickScheduler::with_rate(machine.config().tick_rate_hz);

    let (tx, rx) = mpsc::channel(DEFAULT_CHANNEL_SIZE);
    let (outcomes, _) = broadcast::channel(OUTCOME_CAPACITY);
    let balance = machine.subscribe_balance();

    let actor = MachineActor {
        machine,
        scheduler,
        receiver: rx,
        outcomes: outcomes.clone(),
    };
    tokio::spawn(actor.run());

    MachineHandle {
        sender: tx,
        balance,
        outcomes,
    }
}
