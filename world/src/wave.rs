//! Counters tracking a single in-progress wave.

use std::time::Duration;

use skyfall_core::{WaveOutcome, WaveParameters, SCORE_PER_KILL};

/// Mutable bookkeeping for the wave currently being played.
///
/// Every counter only moves through the named `record_*` methods. Reports that
/// do not match the tracked state (a kill with no live enemy, an exit with no
/// bullet in flight) are refused and leave the counters untouched.
#[derive(Clone, Debug, PartialEq)]
pub struct WaveRuntimeState {
    parameters: WaveParameters,
    enemies_spawned: u32,
    enemies_killed: u32,
    enemies_escaped: u32,
    bullets_fired: u32,
    bullets_in_flight: u32,
    current_level_score: u32,
}

impl WaveRuntimeState {
    /// Creates zeroed counters for a wave governed by `parameters`.
    #[must_use]
    pub fn new(parameters: WaveParameters) -> Self {
        Self {
            parameters,
            enemies_spawned: 0,
            enemies_killed: 0,
            enemies_escaped: 0,
            bullets_fired: 0,
            bullets_in_flight: 0,
            current_level_score: 0,
        }
    }

    /// Parameters the wave was started with.
    #[must_use]
    pub const fn parameters(&self) -> &WaveParameters {
        &self.parameters
    }

    /// Records that an enemy entered the play field.
    ///
    /// Returns `false` once every enemy of the wave has spawned.
    pub fn record_spawn(&mut self) -> bool {
        if self.all_spawned() {
            return false;
        }
        self.enemies_spawned += 1;
        true
    }

    /// Records that a bullet destroyed an enemy, awarding [`SCORE_PER_KILL`].
    ///
    /// Returns `false` when no enemy is currently active.
    pub fn record_kill(&mut self) -> bool {
        if self.active_enemies() == 0 {
            return false;
        }
        self.enemies_killed += 1;
        self.bullets_in_flight = self.bullets_in_flight.saturating_sub(1);
        self.current_level_score = self.current_level_score.saturating_add(SCORE_PER_KILL);
        true
    }

    /// Records that an enemy left the play field without being hit.
    ///
    /// Returns `false` when no enemy is currently active.
    pub fn record_enemy_escaped(&mut self) -> bool {
        if self.active_enemies() == 0 {
            return false;
        }
        self.enemies_escaped += 1;
        true
    }

    /// Records a shot, refusing it once the bullet budget is spent.
    pub fn record_bullet_fired(&mut self) -> bool {
        if self.budget_exhausted() {
            return false;
        }
        self.bullets_fired += 1;
        self.bullets_in_flight += 1;
        true
    }

    /// Records that a bullet left the play field without hitting anything.
    ///
    /// Returns `false` when no bullet is in flight.
    pub fn record_bullet_expired(&mut self) -> bool {
        if self.bullets_in_flight == 0 {
            return false;
        }
        self.bullets_in_flight -= 1;
        true
    }

    /// Enemies destroyed so far.
    #[must_use]
    pub const fn enemies_killed(&self) -> u32 {
        self.enemies_killed
    }

    /// Enemies currently on the play field.
    #[must_use]
    pub const fn active_enemies(&self) -> u32 {
        self.enemies_spawned - self.enemies_killed - self.enemies_escaped
    }

    /// Bullets fired so far.
    #[must_use]
    pub const fn bullets_fired(&self) -> u32 {
        self.bullets_fired
    }

    /// Bullets currently travelling up the field.
    #[must_use]
    pub const fn bullets_in_flight(&self) -> u32 {
        self.bullets_in_flight
    }

    /// Points earned during this wave.
    #[must_use]
    pub const fn current_level_score(&self) -> u32 {
        self.current_level_score
    }

    /// Reports whether every enemy of the wave has spawned.
    #[must_use]
    pub const fn all_spawned(&self) -> bool {
        self.enemies_spawned >= self.parameters.enemy_count()
    }

    /// Reports whether the bullet budget has been spent.
    #[must_use]
    pub const fn budget_exhausted(&self) -> bool {
        self.bullets_fired >= self.parameters.max_bullets()
    }

    /// Reports whether the wave has ended.
    ///
    /// A wave ends when every enemy spawned and none remain on the field, or
    /// when the bullet budget is spent and no bullet is still in flight.
    #[must_use]
    pub const fn is_wave_resolved(&self) -> bool {
        let field_cleared = self.all_spawned() && self.active_enemies() == 0;
        let out_of_ammunition = self.budget_exhausted() && self.bullets_in_flight == 0;
        field_cleared || out_of_ammunition
    }

    /// Outcome of the wave, `Pending` until it resolves.
    #[must_use]
    pub const fn outcome(&self) -> WaveOutcome {
        if !self.is_wave_resolved() {
            WaveOutcome::Pending
        } else if self.enemies_killed >= self.parameters.required_kills() {
            WaveOutcome::Passed
        } else {
            WaveOutcome::Failed
        }
    }
}

/// Minimum spacing between accepted shots.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FireGate {
    cooldown: Duration,
    ready_at: Duration,
}

impl FireGate {
    /// Creates a gate that is open from `now` onwards.
    #[must_use]
    pub const fn new(cooldown: Duration, now: Duration) -> Self {
        Self {
            cooldown,
            ready_at: now,
        }
    }

    /// Reports whether a shot may be fired at `now`.
    #[must_use]
    pub fn is_ready(&self, now: Duration) -> bool {
        now >= self.ready_at
    }

    /// Closes the gate for one cooldown after a shot fired at `now`.
    pub fn arm(&mut self, now: Duration) {
        self.ready_at = now.saturating_add(self.cooldown);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skyfall_core::{Level, PlatformProfile};
    use skyfall_system_wave_parameters::compute_parameters;

    fn level_one() -> WaveRuntimeState {
        WaveRuntimeState::new(compute_parameters(Level::FIRST, &PlatformProfile::desktop()))
    }

    fn spawn_all(state: &mut WaveRuntimeState) {
        while state.record_spawn() {}
    }

    #[test]
    fn kills_award_fixed_points() {
        let mut state = level_one();
        assert!(state.record_spawn());
        assert!(state.record_bullet_fired());
        assert!(state.record_kill());
        assert_eq!(state.enemies_killed(), 1);
        assert_eq!(state.current_level_score(), 10);
        assert_eq!(state.bullets_in_flight(), 0);
    }

    #[test]
    fn kill_without_live_enemy_is_refused() {
        let mut state = level_one();
        assert!(!state.record_kill());
        assert!(!state.record_enemy_escaped());
        assert_eq!(state.current_level_score(), 0);
    }

    #[test]
    fn bullets_are_rejected_once_budget_is_spent() {
        let mut state = level_one();
        for _ in 0..32 {
            assert!(state.record_bullet_fired());
        }
        assert!(!state.record_bullet_fired());
        assert_eq!(state.bullets_fired(), 32);
    }

    #[test]
    fn escaped_enemies_pass_wave_with_required_kills() {
        let mut state = level_one();
        spawn_all(&mut state);
        for _ in 0..22 {
            assert!(state.record_bullet_fired());
            assert!(state.record_kill());
        }
        assert_eq!(state.outcome(), WaveOutcome::Pending);
        for _ in 0..3 {
            assert!(state.record_enemy_escaped());
        }
        assert!(state.is_wave_resolved());
        assert_eq!(state.outcome(), WaveOutcome::Passed);
    }

    #[test]
    fn one_kill_short_fails_wave() {
        let mut state = level_one();
        spawn_all(&mut state);
        for _ in 0..21 {
            assert!(state.record_kill());
        }
        for _ in 0..4 {
            assert!(state.record_enemy_escaped());
        }
        assert_eq!(state.outcome(), WaveOutcome::Failed);
    }

    #[test]
    fn exhausted_budget_resolves_with_enemies_remaining() {
        let mut state = level_one();
        for _ in 0..20 {
            assert!(state.record_spawn());
        }
        for shot in 0..32 {
            assert!(state.record_bullet_fired());
            if shot < 20 {
                assert!(state.record_kill());
            } else {
                assert!(state.record_bullet_expired());
            }
        }
        assert!(!state.all_spawned());
        assert!(state.is_wave_resolved());
        assert_eq!(state.outcome(), WaveOutcome::Failed);
    }

    #[test]
    fn bullets_in_flight_delay_budget_resolution() {
        let mut state = level_one();
        assert!(state.record_spawn());
        for _ in 0..32 {
            assert!(state.record_bullet_fired());
        }
        assert!(!state.is_wave_resolved());
        for _ in 0..32 {
            assert!(state.record_bullet_expired());
        }
        assert!(state.is_wave_resolved());
    }

    #[test]
    fn fire_gate_enforces_cooldown() {
        let mut gate = FireGate::new(Duration::from_millis(200), Duration::ZERO);
        assert!(gate.is_ready(Duration::ZERO));
        gate.arm(Duration::ZERO);
        assert!(!gate.is_ready(Duration::from_millis(199)));
        assert!(gate.is_ready(Duration::from_millis(200)));
    }
}
