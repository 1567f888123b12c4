#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative level progression for Skyfall.
//!
//! [`ProgressionController`] owns the progress record, the active wave and
//! its spawn schedule. The host feeds it [`Command`] values once per frame and
//! forwards the emitted [`Event`] values to the presentation layer. Within a
//! frame, collision reports are applied before the closing
//! [`Command::Tick`], which advances spawning and evaluates resolution.

use std::time::Duration;

use rand::Rng;
use skyfall_core::{
    BackdropTheme, Command, Event, FailureSummary, FireRejection, Level, LevelSummary,
    PlatformProfile, ProgressRecord, ProgressStore, SpawnEvent, TransitionChoice, WaveOutcome,
};
use skyfall_system_spawning::{self as spawning, SpawnSchedule};
use skyfall_system_wave_parameters::{WaveParameterCalculator, WaveTuning};
use tracing::{debug, error, info};

pub mod wave;

use wave::{FireGate, WaveRuntimeState};

/// Minimum spacing between accepted shots.
pub const DEFAULT_FIRE_COOLDOWN: Duration = Duration::from_millis(200);

/// Configuration parameters required to construct the controller.
#[derive(Clone, Debug)]
pub struct Config {
    /// Device profile the waves are balanced for.
    pub profile: PlatformProfile,
    /// Difficulty tuning handed to the wave parameter calculator.
    pub tuning: WaveTuning,
    /// Spawn cadence.
    pub spawning: spawning::Config,
    /// Minimum spacing between accepted shots.
    pub fire_cooldown: Duration,
}

impl Config {
    /// Default configuration for the provided device profile.
    #[must_use]
    pub fn for_profile(profile: PlatformProfile) -> Self {
        Self {
            profile,
            ..Self::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            profile: PlatformProfile::default(),
            tuning: WaveTuning::default(),
            spawning: spawning::Config::default(),
            fire_cooldown: DEFAULT_FIRE_COOLDOWN,
        }
    }
}

/// Lifecycle phase of the controller.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Phase {
    /// No wave has been started yet.
    Idle,
    /// A wave is being played and gameplay input is live.
    WaveActive,
    /// The active wave just ended and its outcome is being applied.
    WaveResolving,
    /// A level was passed; waiting for the player to continue or restart.
    LevelTransition(LevelSummary),
    /// A level was failed; waiting for the player to retry or restart.
    FailureTransition(FailureSummary),
    /// The final level was passed.
    Completed,
}

#[derive(Debug)]
struct ActiveWave {
    runtime: WaveRuntimeState,
    schedule: SpawnSchedule,
    fire_gate: FireGate,
    theme: BackdropTheme,
}

/// Orchestrates waves, outcome evaluation, level transitions and persistence.
#[derive(Debug)]
pub struct ProgressionController<S, R> {
    store: S,
    rng: R,
    profile: PlatformProfile,
    calculator: WaveParameterCalculator,
    spawn_config: spawning::Config,
    fire_cooldown: Duration,
    record: ProgressRecord,
    phase: Phase,
    wave: Option<ActiveWave>,
    clock: Duration,
    spawn_scratch: Vec<SpawnEvent>,
}

impl<S, R> ProgressionController<S, R>
where
    S: ProgressStore,
    R: Rng,
{
    /// Creates a controller, reading the stored progress record.
    #[must_use]
    pub fn new(config: Config, store: S, rng: R) -> Self {
        let record = store.load();
        debug!(
            level = record.current_level().get(),
            total_score = record.total_score(),
            highest_score = record.highest_score(),
            "loaded progress"
        );
        Self {
            store,
            rng,
            profile: config.profile,
            calculator: WaveParameterCalculator::new(config.tuning),
            spawn_config: config.spawning,
            fire_cooldown: config.fire_cooldown,
            record,
            phase: Phase::Idle,
            wave: None,
            clock: Duration::ZERO,
            spawn_scratch: Vec::new(),
        }
    }

    /// Enters the first screen of a session.
    ///
    /// A player resuming beyond level 1 is shown the transition summary of
    /// the stored level instead of being dropped straight into the wave.
    pub fn begin_session(&mut self, out: &mut Vec<Event>) {
        if self.phase != Phase::Idle {
            debug!(phase = ?self.phase, "session already running");
            return;
        }

        let level = self.record.current_level();
        match Level::try_new(level.get() - 1) {
            Some(completed) => self.present_level_transition(completed, level, out),
            None => self.start(level, out),
        }
    }

    /// Starts a wave at `level`, discarding any wave in progress.
    pub fn start(&mut self, level: Level, out: &mut Vec<Event>) {
        let parameters = self.calculator.compute(level, &self.profile);
        let theme = BackdropTheme::ALL[self.rng.gen_range(0..BackdropTheme::ALL.len())];

        if let Some(previous) = self.wave.take() {
            debug!(
                level = previous.runtime.parameters().level().get(),
                pending_spawns = previous.schedule.remaining(),
                "discarding wave in progress"
            );
        }

        self.record.advance_to(level);
        self.wave = Some(ActiveWave {
            runtime: WaveRuntimeState::new(parameters),
            schedule: SpawnSchedule::new(self.spawn_config, &parameters),
            fire_gate: FireGate::new(self.fire_cooldown, self.clock),
            theme,
        });
        self.phase = Phase::WaveActive;

        debug!(
            level = level.get(),
            enemies = parameters.enemy_count(),
            max_bullets = parameters.max_bullets(),
            required_kills = parameters.required_kills(),
            ?theme,
            "wave started"
        );
        out.push(Event::WaveStarted {
            parameters,
            theme,
            bullet_tint: theme.bullet_tint(),
        });
    }

    /// Applies the provided command, emitting the resulting events.
    pub fn apply(&mut self, command: Command, out: &mut Vec<Event>) {
        match command {
            Command::Tick { dt } => self.tick(dt, out),
            Command::FireRequested => self.request_fire(out),
            Command::Move { direction } => {
                if query::accepts_gameplay_input(self) {
                    out.push(Event::PlayerMoved { direction });
                }
            }
            Command::BulletHitEnemy => {
                let Some(runtime) = self.live_runtime_mut() else {
                    return;
                };
                if runtime.record_kill() {
                    out.push(Event::EnemyDestroyed {
                        enemies_killed: runtime.enemies_killed(),
                        current_level_score: runtime.current_level_score(),
                    });
                } else {
                    debug!("ignoring hit report without a live enemy");
                }
            }
            Command::EnemyExitedField => {
                if let Some(runtime) = self.live_runtime_mut() {
                    if !runtime.record_enemy_escaped() {
                        debug!("ignoring exit report without a live enemy");
                    }
                }
            }
            Command::BulletExitedField => {
                if let Some(runtime) = self.live_runtime_mut() {
                    if !runtime.record_bullet_expired() {
                        debug!("ignoring exit report without a bullet in flight");
                    }
                }
            }
            Command::Choose { choice } => self.choose(choice, out),
        }
    }

    /// Applies a frame's commands followed by a tick of `dt`.
    pub fn frame<I>(&mut self, dt: Duration, commands: I, out: &mut Vec<Event>)
    where
        I: IntoIterator<Item = Command>,
    {
        for command in commands {
            self.apply(command, out);
        }
        self.apply(Command::Tick { dt }, out);
    }

    /// Read-only access to the progress store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    fn live_runtime_mut(&mut self) -> Option<&mut WaveRuntimeState> {
        if !query::accepts_gameplay_input(self) {
            return None;
        }
        self.wave.as_mut().map(|wave| &mut wave.runtime)
    }

    fn tick(&mut self, dt: Duration, out: &mut Vec<Event>) {
        self.clock = self.clock.saturating_add(dt);
        if self.phase != Phase::WaveActive {
            return;
        }
        let Some(wave) = self.wave.as_mut() else {
            return;
        };

        self.spawn_scratch.clear();
        wave.schedule
            .advance(dt, &mut self.rng, &mut self.spawn_scratch);
        for spawn in self.spawn_scratch.drain(..) {
            if wave.runtime.record_spawn() {
                out.push(Event::EnemySpawned {
                    spawn,
                    tint: spawn.variant.tint(),
                });
            }
        }

        if wave.runtime.is_wave_resolved() {
            self.resolve_wave(out);
        }
    }

    fn request_fire(&mut self, out: &mut Vec<Event>) {
        let clock = self.clock;
        let reason = match self.wave.as_mut() {
            Some(wave) if self.phase == Phase::WaveActive => {
                if !wave.fire_gate.is_ready(clock) {
                    FireRejection::CoolingDown
                } else if !wave.runtime.record_bullet_fired() {
                    FireRejection::BudgetExhausted
                } else {
                    wave.fire_gate.arm(clock);
                    out.push(Event::BulletFired {
                        bullets_used: wave.runtime.bullets_fired(),
                        max_bullets: wave.runtime.parameters().max_bullets(),
                    });
                    return;
                }
            }
            _ => FireRejection::InputInactive,
        };
        out.push(Event::FireRejected { reason });
    }

    fn resolve_wave(&mut self, out: &mut Vec<Event>) {
        let outcome = match self.wave.as_ref() {
            Some(wave) => wave.runtime.outcome(),
            None => return,
        };
        if outcome == WaveOutcome::Pending {
            return;
        }
        let Some(ActiveWave { runtime, .. }) = self.wave.take() else {
            return;
        };
        self.phase = Phase::WaveResolving;

        let parameters = *runtime.parameters();
        let level = parameters.level();
        out.push(Event::WaveResolved {
            level,
            outcome,
            enemies_killed: runtime.enemies_killed(),
            required_kills: parameters.required_kills(),
        });

        match outcome {
            WaveOutcome::Passed => self.pass_wave(level, runtime.current_level_score(), out),
            WaveOutcome::Failed | WaveOutcome::Pending => self.fail_wave(&runtime, out),
        }
    }

    fn pass_wave(&mut self, level: Level, score: u32, out: &mut Vec<Event>) {
        self.record.record_passed_wave(level, score);
        info!(
            level = level.get(),
            score,
            total_score = self.record.total_score(),
            "level passed"
        );

        match level.next() {
            Some(next) => {
                self.record.advance_to(next);
                self.commit(out);
                self.present_level_transition(level, next, out);
            }
            None => {
                self.commit(out);
                self.phase = Phase::Completed;
                info!(
                    total_score = self.record.total_score(),
                    highest_score = self.record.highest_score(),
                    "campaign completed"
                );
                out.push(Event::CampaignCompleted {
                    total_score: self.record.total_score(),
                    highest_score: self.record.highest_score(),
                });
            }
        }
    }

    fn fail_wave(&mut self, runtime: &WaveRuntimeState, out: &mut Vec<Event>) {
        let parameters = runtime.parameters();
        let summary = FailureSummary {
            level: parameters.level(),
            enemies_killed: runtime.enemies_killed(),
            required_kills: parameters.required_kills(),
            enemies: parameters.enemy_count(),
            bullets_used: runtime.bullets_fired(),
            total_score: self.record.total_score(),
            highest_score: self.record.highest_score(),
        };
        info!(
            level = summary.level.get(),
            enemies_killed = summary.enemies_killed,
            required_kills = summary.required_kills,
            forfeited_score = runtime.current_level_score(),
            "level failed"
        );
        self.phase = Phase::FailureTransition(summary);
        out.push(Event::FailureTransitionPresented { summary });
    }

    fn present_level_transition(&mut self, completed: Level, next: Level, out: &mut Vec<Event>) {
        let summary = LevelSummary {
            completed_level: completed,
            next_level: next,
            next_parameters: self.calculator.compute(next, &self.profile),
            total_score: self.record.total_score(),
            highest_score: self.record.highest_score(),
        };
        self.phase = Phase::LevelTransition(summary);
        out.push(Event::LevelTransitionPresented { summary });
    }

    fn choose(&mut self, choice: TransitionChoice, out: &mut Vec<Event>) {
        match (self.phase, choice) {
            (Phase::LevelTransition(summary), TransitionChoice::Continue) => {
                self.start(summary.next_level, out);
            }
            (Phase::FailureTransition(summary), TransitionChoice::Restart) => {
                self.start(summary.level, out);
            }
            (
                Phase::LevelTransition(_) | Phase::FailureTransition(_) | Phase::Completed,
                TransitionChoice::RestartFromBeginning,
            ) => self.restart_from_beginning(out),
            (phase, choice) => {
                debug!(?phase, ?choice, "ignoring choice outside its popup");
            }
        }
    }

    fn restart_from_beginning(&mut self, out: &mut Vec<Event>) {
        self.record.reset_campaign();
        self.commit(out);
        self.phase = Phase::Idle;
        info!(highest_score = self.record.highest_score(), "progress reset");
        out.push(Event::ProgressReset);
        self.start(Level::FIRST, out);
    }

    fn commit(&mut self, out: &mut Vec<Event>) {
        match self.store.commit(&self.record) {
            Ok(()) => {
                debug!(
                    level = self.record.current_level().get(),
                    total_score = self.record.total_score(),
                    highest_score = self.record.highest_score(),
                    "progress committed"
                );
                out.push(Event::ProgressCommitted {
                    record: self.record.clone(),
                });
            }
            Err(error) => {
                error!(%error, "failed to persist progress; keeping in-memory state");
            }
        }
    }
}

/// Query functions that provide read-only access to the controller state.
pub mod query {
    use skyfall_core::{
        BackdropTheme, HudSnapshot, PlatformProfile, ProgressRecord, WaveOutcome, MAX_LEVEL,
    };

    use super::{Phase, ProgressionController};

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase<S, R>(controller: &ProgressionController<S, R>) -> Phase {
        controller.phase
    }

    /// Progress record as held in memory.
    #[must_use]
    pub fn record<S, R>(controller: &ProgressionController<S, R>) -> &ProgressRecord {
        &controller.record
    }

    /// Device profile the controller balances waves for.
    #[must_use]
    pub fn profile<S, R>(controller: &ProgressionController<S, R>) -> PlatformProfile {
        controller.profile
    }

    /// Reports whether movement and fire input currently affect gameplay.
    #[must_use]
    pub fn accepts_gameplay_input<S, R>(controller: &ProgressionController<S, R>) -> bool {
        controller.phase == Phase::WaveActive && controller.wave.is_some()
    }

    /// Heads-up display fields for the active wave.
    #[must_use]
    pub fn hud<S, R>(controller: &ProgressionController<S, R>) -> Option<HudSnapshot> {
        let runtime = &controller.wave.as_ref()?.runtime;
        let parameters = runtime.parameters();
        Some(HudSnapshot {
            level: parameters.level(),
            max_level: MAX_LEVEL,
            total_score: controller.record.total_score(),
            current_level_score: runtime.current_level_score(),
            highest_score: controller.record.highest_score(),
            enemies_killed: runtime.enemies_killed(),
            enemies_per_wave: parameters.enemy_count(),
            required_kills: parameters.required_kills(),
            bullets_used: runtime.bullets_fired(),
            max_bullets: parameters.max_bullets(),
        })
    }

    /// Outcome of the active wave as evaluated right now.
    #[must_use]
    pub fn wave_outcome<S, R>(controller: &ProgressionController<S, R>) -> Option<WaveOutcome> {
        controller
            .wave
            .as_ref()
            .map(|wave| wave.runtime.outcome())
    }

    /// Enemies of the active wave that have not spawned yet.
    #[must_use]
    pub fn spawn_queue_remaining<S, R>(controller: &ProgressionController<S, R>) -> Option<u32> {
        controller
            .wave
            .as_ref()
            .map(|wave| wave.schedule.remaining())
    }

    /// Enemies of the active wave currently on the play field.
    #[must_use]
    pub fn active_enemies<S, R>(controller: &ProgressionController<S, R>) -> Option<u32> {
        controller
            .wave
            .as_ref()
            .map(|wave| wave.runtime.active_enemies())
    }

    /// Backdrop drawn behind the active wave.
    #[must_use]
    pub fn backdrop<S, R>(controller: &ProgressionController<S, R>) -> Option<BackdropTheme> {
        controller.wave.as_ref().map(|wave| wave.theme)
    }
}
