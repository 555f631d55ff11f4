//! Fixed-timestep tick scheduler.
//!
//! Ticks are numbered from 1 and keep counting across pauses, so a tick
//! number is a stable clock for anything scheduled against it.

use std::time::Duration;

use rand::Rng;
use tokio::time::{self, Instant};
use tracing::{debug, trace, warn};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for a [`TickScheduler`].
#[derive(Debug, Clone)]
pub struct TickConfig {
    /// Tick rate in Hz, clamped to `1..=MAX_TICK_RATE_HZ`.
    pub tick_rate_hz: u32,
    /// Random jitter (0–max µs) added to the first tick so machines created
    /// together don't all wake on the same instant.
    pub initial_jitter_us: u64,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 60,
            initial_jitter_us: 2_000,
        }
    }
}

impl TickConfig {
    /// Maximum supported tick rate.
    pub const MAX_TICK_RATE_HZ: u32 = 128;

    /// Config for a specific rate, everything else default.
    pub fn with_rate(tick_rate_hz: u32) -> Self {
        Self {
            tick_rate_hz,
            ..Default::default()
        }
    }

    /// Clamps `tick_rate_hz` into `1..=MAX_TICK_RATE_HZ`.
    pub fn validated(mut self) -> Self {
        let clamped = self.tick_rate_hz.clamp(1, Self::MAX_TICK_RATE_HZ);
        if clamped != self.tick_rate_hz {
            warn!(
                rate = self.tick_rate_hz,
                using = clamped,
                "tick_rate_hz out of range, clamping"
            );
            self.tick_rate_hz = clamped;
        }
        self
    }

    /// Duration of a single tick.
    pub fn tick_duration(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.tick_rate_hz.max(1) as f64)
    }
}

// ---------------------------------------------------------------------------
// Tick info
// ---------------------------------------------------------------------------

/// Returned by [`TickScheduler::wait_for_tick`] for every tick that fires.
#[derive(Debug, Clone)]
pub struct TickInfo {
    /// Monotonically increasing tick number (starts at 1).
    pub tick: u64,
    /// Fixed delta time for this tick.
    pub dt: Duration,
    /// Whole ticks skipped because the task woke up late.
    pub ticks_skipped: u64,
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// Drives one machine's tick loop.
///
/// A late wake-up never produces a burst: the next tick is always scheduled
/// one period after the tick that actually fired.
pub struct TickScheduler {
    period: Duration,
    tick_count: u64,
    next_tick: Instant,
    paused: bool,
}

impl TickScheduler {
    /// Creates a running scheduler; the first tick is due one period (plus
    /// jitter) from now.
    pub fn new(config: TickConfig) -> Self {
        let config = config.validated();
        let period = config.tick_duration();
        let jitter = match config.initial_jitter_us {
            0 => Duration::ZERO,
            max => Duration::from_micros(rand::rng().random_range(0..max)),
        };

        debug!(
            rate_hz = config.tick_rate_hz,
            period_ms = period.as_secs_f64() * 1000.0,
            "tick scheduler created"
        );

        Self {
            period,
            tick_count: 0,
            next_tick: Instant::now() + period + jitter,
            paused: false,
        }
    }

    /// Scheduler for a specific rate with default settings.
    pub fn with_rate(tick_rate_hz: u32) -> Self {
        Self::new(TickConfig::with_rate(tick_rate_hz))
    }

    /// Waits until the next tick is due.
    ///
    /// Pends forever while paused, so it is safe to use as a
    /// `tokio::select!` branch either way.
    pub async fn wait_for_tick(&mut self) -> TickInfo {
        if self.paused {
            std::future::pending::<()>().await;
        }

        let due = self.next_tick;
        time::sleep_until(due).await;

        let now = Instant::now();
        self.tick_count += 1;

        let late_by = now.saturating_duration_since(due);
        let ticks_skipped = (late_by.as_nanos() / self.period.as_nanos()) as u64;
        if ticks_skipped > 0 {
            warn!(
                tick = self.tick_count,
                skipped = ticks_skipped,
                late_ms = late_by.as_secs_f64() * 1000.0,
                "tick overrun, skipping ahead"
            );
        }
        self.next_tick = now + self.period;

        trace!(tick = self.tick_count, "tick fired");

        TickInfo {
            tick: self.tick_count,
            dt: self.period,
            ticks_skipped,
        }
    }

    /// Stops ticks until [`resume`](Self::resume). Idempotent.
    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            debug!(tick = self.tick_count, "tick scheduler paused");
        }
    }

    /// Resumes ticking one period from now. Idempotent.
    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            self.next_tick = Instant::now() + self.period;
            debug!(tick = self.tick_count, "tick scheduler resumed");
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Number of ticks fired so far.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }
}
