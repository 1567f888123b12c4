#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic wave parameter calculation.
//!
//! Every difficulty knob of a wave is a pure function of its [`Level`] and the
//! [`PlatformProfile`]. Percentages are kept as integers so the floor
//! operations are exact.

use skyfall_core::{Level, PlatformProfile, SpawnBand, WaveParameters};

/// Upper clamp applied to the spawn-area narrowing factor.
pub const MAX_NARROWING_FACTOR: f32 = 0.95;

/// Aggregated tuning knobs controlling every adjustable aspect of a wave.
#[derive(Clone, Debug, Default)]
pub struct WaveTuning {
    /// Controls how many enemies a wave spawns.
    pub count: CountTuning,
    /// Controls how fast enemies descend.
    pub speed: SpeedTuning,
    /// Controls the bullet budget.
    pub bullets: BulletTuning,
    /// Controls the pass threshold.
    pub kills: KillTuning,
    /// Controls where enemies may spawn.
    pub spawn_area: SpawnAreaTuning,
}

/// Enemy-count growth.
#[derive(Clone, Debug)]
pub struct CountTuning {
    /// Enemies spawned on level 1.
    pub base: u32,
    /// Enemies added per level above the first.
    pub per_level: u32,
}

impl Default for CountTuning {
    fn default() -> Self {
        Self {
            base: 25,
            per_level: 5,
        }
    }
}

/// Enemy descent speed growth.
#[derive(Clone, Debug)]
pub struct SpeedTuning {
    /// Descent speed on level 1 in world units per second.
    pub base: f32,
    /// Speed added per level above the first.
    pub per_level: f32,
    /// Multiplier applied on mobile devices.
    pub mobile_multiplier: f32,
}

impl Default for SpeedTuning {
    fn default() -> Self {
        Self {
            base: 100.0,
            per_level: 20.0,
            mobile_multiplier: 0.7,
        }
    }
}

/// Bullet budget expressed as a percentage of the enemy count.
#[derive(Clone, Debug)]
pub struct BulletTuning {
    /// Budget percentage on level 1.
    pub base_percent: u32,
    /// Percentage points added per level above the first.
    pub percent_per_level: u32,
    /// Ceiling on the budget percentage.
    pub max_percent: u32,
    /// Extra budget granted on mobile, as a percentage of the desktop budget.
    pub mobile_bonus_percent: u32,
}

impl Default for BulletTuning {
    fn default() -> Self {
        Self {
            base_percent: 130,
            percent_per_level: 1,
            max_percent: 160,
            mobile_bonus_percent: 110,
        }
    }
}

/// Share of the wave that must be destroyed to pass.
#[derive(Clone, Debug)]
pub struct KillTuning {
    /// Required kill percentage on desktop.
    pub desktop_percent: u32,
    /// Required kill percentage on mobile.
    pub mobile_percent: u32,
}

impl Default for KillTuning {
    fn default() -> Self {
        Self {
            desktop_percent: 90,
            mobile_percent: 80,
        }
    }
}

/// Horizontal spawn band layout.
#[derive(Clone, Debug)]
pub struct SpawnAreaTuning {
    /// Horizontal centre of the desktop wave area in world units.
    pub desktop_center: f32,
    /// Width of the un-narrowed desktop wave area in world units.
    pub desktop_width: f32,
    /// Factor the desktop wave area is narrowed by; clamped to [`MAX_NARROWING_FACTOR`].
    pub narrowing_factor: f32,
    /// Left edge of the mobile band as a fraction of the viewport width.
    pub mobile_start: f32,
    /// Right edge of the mobile band as a fraction of the viewport width.
    pub mobile_end: f32,
}

impl Default for SpawnAreaTuning {
    fn default() -> Self {
        Self {
            desktop_center: 400.0,
            desktop_width: 400.0,
            narrowing_factor: MAX_NARROWING_FACTOR,
            mobile_start: 0.25,
            mobile_end: 0.75,
        }
    }
}

/// Pure calculator mapping levels to [`WaveParameters`].
#[derive(Clone, Debug, Default)]
pub struct WaveParameterCalculator {
    tuning: WaveTuning,
}

impl WaveParameterCalculator {
    /// Creates a calculator with the provided tuning surface.
    #[must_use]
    pub fn new(tuning: WaveTuning) -> Self {
        Self { tuning }
    }

    /// Computes the parameters of the wave played at `level`.
    #[must_use]
    pub fn compute(&self, level: Level, profile: &PlatformProfile) -> WaveParameters {
        let steps = level.steps_above_first();
        let enemy_count = self.enemy_count(steps);
        WaveParameters::new(
            level,
            enemy_count,
            self.enemy_speed(steps, profile),
            self.max_bullets(enemy_count, steps, profile),
            self.required_kills(enemy_count, profile),
            self.spawn_band(profile),
        )
    }

    fn enemy_count(&self, steps: u32) -> u32 {
        let count = &self.tuning.count;
        count.base.saturating_add(steps.saturating_mul(count.per_level))
    }

    fn enemy_speed(&self, steps: u32, profile: &PlatformProfile) -> f32 {
        let speed = &self.tuning.speed;
        let multiplier = if profile.is_mobile {
            speed.mobile_multiplier
        } else {
            1.0
        };
        (speed.base + steps as f32 * speed.per_level) * multiplier
    }

    fn max_bullets(&self, enemy_count: u32, steps: u32, profile: &PlatformProfile) -> u32 {
        let bullets = &self.tuning.bullets;
        let percent = bullets
            .base_percent
            .saturating_add(steps.saturating_mul(bullets.percent_per_level))
            .min(bullets.max_percent);
        let bonus = if profile.is_mobile {
            bullets.mobile_bonus_percent
        } else {
            100
        };
        let scaled = u64::from(enemy_count) * u64::from(percent) * u64::from(bonus) / 10_000;
        u32::try_from(scaled).unwrap_or(u32::MAX)
    }

    fn required_kills(&self, enemy_count: u32, profile: &PlatformProfile) -> u32 {
        let kills = &self.tuning.kills;
        let percent = if profile.is_mobile {
            kills.mobile_percent
        } else {
            kills.desktop_percent
        };
        let scaled = u64::from(enemy_count) * u64::from(percent.min(100)) / 100;
        u32::try_from(scaled).unwrap_or(enemy_count)
    }

    fn spawn_band(&self, profile: &PlatformProfile) -> SpawnBand {
        let area = &self.tuning.spawn_area;
        if profile.is_mobile {
            let viewport = profile.viewport_width.max(0.0);
            return SpawnBand::new(viewport * area.mobile_start, viewport * area.mobile_end);
        }

        let factor = area.narrowing_factor.clamp(0.0, MAX_NARROWING_FACTOR);
        SpawnBand::centered(area.desktop_center, area.desktop_width * factor)
    }
}

/// Computes wave parameters using the default tuning.
#[must_use]
pub fn compute_parameters(level: Level, profile: &PlatformProfile) -> WaveParameters {
    WaveParameterCalculator::default().compute(level, profile)
}
