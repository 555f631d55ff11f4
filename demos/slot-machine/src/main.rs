use std::time::Duration;

use slotforge::logging::init_tracing;
use slotforge::prelude::*;
use tokio::sync::broadcast;

/// How often a blocked lever is retried.
const LEVER_RETRY: Duration = Duration::from_millis(50);

// ---------------------------------------------------------------------------
// Play loop
// ---------------------------------------------------------------------------

/// Plays `rounds` rounds, waiting for each round to land before the next
/// pull. Returns the outcomes in order.
async fn play(machine: &MachineHandle, rounds: usize) -> Result<Vec<RoundOutcome>, SlotforgeError> {
    let mut outcomes = machine.outcomes();
    let mut played = Vec::with_capacity(rounds);

    for _ in 0..rounds {
        let round = pull_when_ready(machine).await?;
        let outcome = wait_for(&mut outcomes, round).await?;
        tracing::info!(
            %round,
            faces = ?outcome.faces,
            reward = outcome.reward,
            money = %Balance(outcome.balance),
            "round landed"
        );
        played.push(outcome);
    }

    Ok(played)
}

/// Pulls the lever once nothing is spinning. A round started elsewhere
/// delays the pull rather than using it up.
async fn pull_when_ready(machine: &MachineHandle) -> Result<RoundId, SlotforgeError> {
    loop {
        // The lever is disabled while anything is still spinning.
        if machine.is_any_spinning().await? {
            tracing::debug!("wheels still spinning, waiting");
            tokio::time::sleep(LEVER_RETRY).await;
            continue;
        }
        match machine.pull_lever().await {
            Ok(round) => return Ok(round),
            Err(SlotforgeError::Machine(MachineError::RoundInProgress(round))) => {
                tracing::debug!(%round, "round still resolving, waiting");
                tokio::time::sleep(LEVER_RETRY).await;
            }
            Err(e) => return Err(e),
        }
    }
}

async fn wait_for(
    outcomes: &mut broadcast::Receiver<RoundOutcome>,
    round: RoundId,
) -> Result<RoundOutcome, SlotforgeError> {
    loop {
        match outcomes.recv().await {
            Ok(outcome) if outcome.round == round => return Ok(outcome),
            Ok(_) => continue,
            Err(broadcast::error::RecvError::Lagged(n)) => {
                tracing::warn!(skipped = n, "outcome subscriber lagged");
            }
            Err(broadcast::error::RecvError::Closed) => return Err(SlotforgeError::Unavailable),
        }
    }
}

// ---------------------------------------------------------------------------
// Bootstrap
// ---------------------------------------------------------------------------

/// Usage: `slot-machine [config.json] [rounds]`
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => load_config(path)?,
        None => MachineConfig::default(),
    };
    let rounds: usize = match args.next() {
        Some(n) => n.parse()?,
        None => 5,
    };

    let machine = spawn_machine(config);
    tracing::info!(money = %Balance(*machine.balance().borrow()), "machine ready");

    play(&machine, rounds).await?;

    tracing::info!(money = %Balance(*machine.balance().borrow()), "done");
    machine.shutdown().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(seed: u64) -> MachineConfig {
        MachineConfig {
            seed: Some(seed),
            ..MachineConfig::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_play_runs_every_round() {
        let machine = spawn_machine(config(11));
        let outcomes = play(&machine, 4).await.unwrap();

        let rounds: Vec<RoundId> = outcomes.iter().map(|o| o.round).collect();
        assert_eq!(rounds, vec![RoundId(1), RoundId(2), RoundId(3), RoundId(4)]);

        let total: i64 = outcomes.iter().map(|o| o.reward).sum();
        assert_eq!(*machine.balance().borrow(), 500 + total);
    }

    #[tokio::test(start_paused = true)]
    async fn test_play_waits_out_a_round_already_spinning() {
        let machine = spawn_machine(config(41));
        assert_eq!(machine.pull_lever().await.unwrap(), RoundId(1));
        assert!(machine.is_any_spinning().await.unwrap());

        let outcomes = play(&machine, 2).await.unwrap();
        let rounds: Vec<RoundId> = outcomes.iter().map(|o| o.round).collect();
        assert_eq!(rounds, vec![RoundId(2), RoundId(3)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_same_seed_same_session() {
        let a = play(&spawn_machine(config(21)), 3).await.unwrap();
        let b = play(&spawn_machine(config(21)), 3).await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test(start_paused = true)]
    async fn test_play_after_shutdown_fails() {
        let machine = spawn_machine(config(31));
        machine.shutdown().await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(matches!(play(&machine, 1).await, Err(SlotforgeError::Unavailable)));
    }
}
