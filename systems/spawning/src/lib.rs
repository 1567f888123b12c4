#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system responsible for emitting a wave's enemies.
//!
//! A [`SpawnSchedule`] is created for exactly one wave and yields
//! `enemy_count` spawn events, one per spawn interval, the first immediately.
//! It cannot be rewound: starting another wave means building a new schedule,
//! and dropping a schedule abandons whatever it had not emitted yet.

use std::time::Duration;

use rand::Rng;
use skyfall_core::{EnemyVariant, SpawnBand, SpawnEvent, WaveParameters};

/// Delay between consecutive spawns of a wave.
pub const DEFAULT_SPAWN_INTERVAL: Duration = Duration::from_millis(500);

/// Configuration parameters required to construct a spawn schedule.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    spawn_interval: Duration,
}

impl Config {
    /// Creates a new configuration using the provided spawn cadence.
    #[must_use]
    pub const fn new(spawn_interval: Duration) -> Self {
        Self { spawn_interval }
    }

    /// Delay between consecutive spawns.
    #[must_use]
    pub const fn spawn_interval(&self) -> Duration {
        self.spawn_interval
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_SPAWN_INTERVAL)
    }
}

/// Finite, single-use sequence of spawn events for one wave.
#[derive(Debug)]
pub struct SpawnSchedule {
    spawn_interval: Duration,
    accumulator: Duration,
    band: SpawnBand,
    velocity: f32,
    total: u32,
    emitted: u32,
}

impl SpawnSchedule {
    /// Creates the schedule for the wave described by `parameters`.
    #[must_use]
    pub fn new(config: Config, parameters: &WaveParameters) -> Self {
        Self {
            spawn_interval: config.spawn_interval,
            // The first enemy is due as soon as the schedule is advanced.
            accumulator: config.spawn_interval,
            band: parameters.spawn_band(),
            velocity: parameters.enemy_speed(),
            total: parameters.enemy_count(),
            emitted: 0,
        }
    }

    /// Advances the schedule by `dt` and emits every spawn that became due.
    pub fn advance<R>(&mut self, dt: Duration, rng: &mut R, out: &mut Vec<SpawnEvent>)
    where
        R: Rng + ?Sized,
    {
        if self.is_exhausted() {
            return;
        }

        self.accumulator = self.accumulator.saturating_add(dt);
        let spawn_attempts = self.resolve_spawn_attempts();

        for _ in 0..spawn_attempts {
            let x = self.select_position(rng);
            let variant = select_variant(rng);
            out.push(SpawnEvent {
                index: self.emitted,
                x,
                velocity: self.velocity,
                variant,
            });
            self.emitted += 1;
        }
    }

    /// Number of spawns still pending.
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.total - self.emitted
    }

    /// Reports whether every spawn of the wave has been emitted.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.emitted >= self.total
    }

    fn resolve_spawn_attempts(&mut self) -> u32 {
        let remaining = self.remaining();
        if self.spawn_interval.is_zero() {
            return remaining;
        }

        let mut attempts = 0;
        while attempts < remaining && self.accumulator >= self.spawn_interval {
            self.accumulator -= self.spawn_interval;
            attempts += 1;
        }
        attempts
    }

    fn select_position<R>(&self, rng: &mut R) -> f32
    where
        R: Rng + ?Sized,
    {
        rng.gen_range(self.band.left()..=self.band.right())
    }
}

fn select_variant<R>(rng: &mut R) -> EnemyVariant
where
    R: Rng + ?Sized,
{
    if rng.gen_bool(0.5) {
        EnemyVariant::Red
    } else {
        EnemyVariant::Yellow
    }
}
