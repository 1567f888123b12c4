#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Skyfall engine.
//!
//! This crate defines the message surface that connects the host, the
//! authoritative progression controller, and the pure systems. The host
//! submits [`Command`] values describing player input and physics reports,
//! the controller executes those commands via its `apply` entry point, and
//! then broadcasts [`Event`] values the presentation layer reacts to. Systems
//! are pure computations over immutable inputs.

use std::{collections::BTreeMap, error::Error, fmt, time::Duration};

use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Skyfall.";

/// Final level of the campaign.
pub const MAX_LEVEL: Level = Level::new(20);

/// Points awarded for every enemy destroyed.
pub const SCORE_PER_KILL: u32 = 10;

/// One-based level number. Zero is unrepresentable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Level(u32);

impl Level {
    /// First level of the campaign.
    pub const FIRST: Level = Level(1);

    /// Creates a level from its one-based number.
    ///
    /// # Panics
    ///
    /// Panics when `value` is zero. Levels originate from trusted code paths;
    /// untrusted input goes through [`Level::try_new`].
    #[must_use]
    pub const fn new(value: u32) -> Self {
        assert!(value >= 1, "levels are numbered from 1");
        Self(value)
    }

    /// Creates a level, returning `None` when `value` is zero.
    #[must_use]
    pub const fn try_new(value: u32) -> Option<Self> {
        if value == 0 {
            None
        } else {
            Some(Self(value))
        }
    }

    /// Retrieves the numeric representation of the level.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Number of levels between the first level and this one.
    #[must_use]
    pub const fn steps_above_first(&self) -> u32 {
        self.0 - 1
    }

    /// Reports whether this is the last level of the campaign.
    #[must_use]
    pub const fn is_final(&self) -> bool {
        self.0 >= MAX_LEVEL.0
    }

    /// Level that follows this one, or `None` once the campaign is complete.
    #[must_use]
    pub const fn next(&self) -> Option<Self> {
        if self.is_final() {
            None
        } else {
            Some(Self(self.0 + 1))
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u32> for Level {
    type Error = InvalidLevel;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::try_new(value).ok_or(InvalidLevel(value))
    }
}

impl From<Level> for u32 {
    fn from(level: Level) -> Self {
        level.0
    }
}

/// Error returned when a raw number does not describe a level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InvalidLevel(u32);

impl fmt::Display for InvalidLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "level {} is out of range; levels start at 1", self.0)
    }
}

impl Error for InvalidLevel {}

/// Describes the device the game runs on.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformProfile {
    /// Whether the game runs on a touch device with the easier balancing.
    pub is_mobile: bool,
    /// Width of the play field measured in world units.
    pub viewport_width: f32,
}

impl PlatformProfile {
    /// Width of the desktop play field in world units.
    pub const DESKTOP_VIEWPORT_WIDTH: f32 = 800.0;

    /// Desktop profile using the fixed design width.
    #[must_use]
    pub const fn desktop() -> Self {
        Self {
            is_mobile: false,
            viewport_width: Self::DESKTOP_VIEWPORT_WIDTH,
        }
    }

    /// Mobile profile for a viewport of the provided width.
    #[must_use]
    pub const fn mobile(viewport_width: f32) -> Self {
        Self {
            is_mobile: true,
            viewport_width,
        }
    }
}

impl Default for PlatformProfile {
    fn default() -> Self {
        Self::desktop()
    }
}

/// Horizontal range enemy spawn positions are drawn from.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnBand {
    left: f32,
    right: f32,
}

impl SpawnBand {
    /// Creates a band spanning `left..=right`.
    #[must_use]
    pub fn new(left: f32, right: f32) -> Self {
        debug_assert!(left <= right, "spawn band must not be inverted");
        Self { left, right }
    }

    /// Creates a band of the given width centred on `center`.
    #[must_use]
    pub fn centered(center: f32, width: f32) -> Self {
        Self::new(center - width / 2.0, center + width / 2.0)
    }

    /// Leftmost spawn coordinate.
    #[must_use]
    pub const fn left(&self) -> f32 {
        self.left
    }

    /// Rightmost spawn coordinate.
    #[must_use]
    pub const fn right(&self) -> f32 {
        self.right
    }

    /// Width of the band in world units.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    /// Reports whether `x` lies inside the band.
    #[must_use]
    pub fn contains(&self, x: f32) -> bool {
        (self.left..=self.right).contains(&x)
    }
}

/// Difficulty parameters derived from a level. Immutable for the wave's lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaveParameters {
    level: Level,
    enemy_count: u32,
    enemy_speed: f32,
    max_bullets: u32,
    required_kills: u32,
    spawn_band: SpawnBand,
}

impl WaveParameters {
    /// Bundles precomputed wave parameters.
    #[must_use]
    pub fn new(
        level: Level,
        enemy_count: u32,
        enemy_speed: f32,
        max_bullets: u32,
        required_kills: u32,
        spawn_band: SpawnBand,
    ) -> Self {
        debug_assert!(required_kills <= enemy_count);
        Self {
            level,
            enemy_count,
            enemy_speed,
            max_bullets,
            required_kills,
            spawn_band,
        }
    }

    /// Level the parameters were derived from.
    #[must_use]
    pub const fn level(&self) -> Level {
        self.level
    }

    /// Number of enemies the wave spawns.
    #[must_use]
    pub const fn enemy_count(&self) -> u32 {
        self.enemy_count
    }

    /// Descent velocity of every enemy in world units per second.
    #[must_use]
    pub const fn enemy_speed(&self) -> f32 {
        self.enemy_speed
    }

    /// Bullet budget for the wave.
    #[must_use]
    pub const fn max_bullets(&self) -> u32 {
        self.max_bullets
    }

    /// Kills needed to pass the wave.
    #[must_use]
    pub const fn required_kills(&self) -> u32 {
        self.required_kills
    }

    /// Horizontal band enemies spawn in.
    #[must_use]
    pub const fn spawn_band(&self) -> SpawnBand {
        self.spawn_band
    }

    /// Width of the spawn band in world units.
    #[must_use]
    pub fn spawn_area_width(&self) -> f32 {
        self.spawn_band.width()
    }
}

/// RGB tint used by the presentation layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tint {
    red: u8,
    green: u8,
    blue: u8,
}

impl Tint {
    /// Creates a new tint from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Red component of the tint.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the tint.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the tint.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }
}

/// Cosmetic colour variant of a spawned enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyVariant {
    /// Red enemy.
    Red,
    /// Yellow enemy.
    Yellow,
}

impl EnemyVariant {
    /// Tint applied to the enemy sprite.
    #[must_use]
    pub const fn tint(self) -> Tint {
        match self {
            Self::Red => Tint::from_rgb(0xff, 0x00, 0x00),
            Self::Yellow => Tint::from_rgb(0xff, 0xff, 0x00),
        }
    }
}

/// Cosmetic backdrop drawn behind a wave.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BackdropTheme {
    /// Starfield.
    Space,
    /// Dunes.
    Desert,
    /// Snowfield.
    Snow,
    /// Open water.
    Ocean,
    /// Canopy.
    Jungle,
    /// Skyline.
    City,
}

impl BackdropTheme {
    /// Every theme in selection order.
    pub const ALL: [BackdropTheme; 6] = [
        Self::Space,
        Self::Desert,
        Self::Snow,
        Self::Ocean,
        Self::Jungle,
        Self::City,
    ];

    /// Bullet tint that stays readable against the backdrop.
    #[must_use]
    pub const fn bullet_tint(self) -> Tint {
        match self {
            Self::Space => Tint::from_rgb(0xff, 0xff, 0xff),
            Self::Desert => Tint::from_rgb(0x00, 0xff, 0xff),
            Self::Snow => Tint::from_rgb(0xff, 0x00, 0x00),
            Self::Ocean => Tint::from_rgb(0xff, 0xff, 0x00),
            Self::Jungle | Self::City => Tint::from_rgb(0xff, 0x00, 0xff),
        }
    }
}

/// Instruction to place a new enemy at the top of the play field.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnEvent {
    /// Zero-based position of the enemy within the wave.
    pub index: u32,
    /// Horizontal spawn coordinate inside the wave's spawn band.
    pub x: f32,
    /// Initial descent velocity in world units per second.
    pub velocity: f32,
    /// Cosmetic colour variant.
    pub variant: EnemyVariant,
}

/// Horizontal movement directions available to the player ship.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing x.
    Left,
    /// Movement toward increasing x.
    Right,
}

/// Player decisions offered by the transition popups.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransitionChoice {
    /// Start the next level after a passed wave.
    Continue,
    /// Replay the level that was just failed.
    Restart,
    /// Wipe progress and start again from level 1.
    RestartFromBeginning,
}

/// Result of evaluating a wave.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WaveOutcome {
    /// The wave is still in progress.
    Pending,
    /// Enough enemies were destroyed.
    Passed,
    /// The wave ended short of the required kills.
    Failed,
}

/// Reasons a fire request may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FireRejection {
    /// No wave is active, so gameplay input is ignored.
    InputInactive,
    /// Every bullet of the wave's budget has been fired.
    BudgetExhausted,
    /// The previous shot was fired too recently.
    CoolingDown,
}

/// Commands that express every input the progression controller accepts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    /// Advances the frame clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that the player ship fire a bullet.
    FireRequested,
    /// Requests that the player ship move horizontally.
    Move {
        /// Direction of travel.
        direction: Direction,
    },
    /// Reports that a bullet struck an enemy; both are removed from play.
    BulletHitEnemy,
    /// Reports that an enemy left the play field without being hit.
    EnemyExitedField,
    /// Reports that a bullet left the play field without hitting anything.
    BulletExitedField,
    /// Submits the player's choice on a transition popup.
    Choose {
        /// Choice the player made.
        choice: TransitionChoice,
    },
}

/// Events broadcast by the progression controller after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Announces that a new wave began.
    WaveStarted {
        /// Parameters governing the wave.
        parameters: WaveParameters,
        /// Backdrop drawn behind the wave.
        theme: BackdropTheme,
        /// Tint of the player's bullets against the backdrop.
        bullet_tint: Tint,
    },
    /// Requests that the presentation layer place a new enemy.
    EnemySpawned {
        /// Spawn details.
        spawn: SpawnEvent,
        /// Sprite tint of the spawned variant.
        tint: Tint,
    },
    /// Confirms that a bullet was fired.
    BulletFired {
        /// Bullets fired so far in the wave.
        bullets_used: u32,
        /// Bullet budget of the wave.
        max_bullets: u32,
    },
    /// Reports that a fire request was rejected.
    FireRejected {
        /// Specific reason the request failed.
        reason: FireRejection,
    },
    /// Confirms that a movement request is live and should be applied.
    PlayerMoved {
        /// Direction of travel.
        direction: Direction,
    },
    /// Confirms that an enemy was destroyed and scored.
    EnemyDestroyed {
        /// Kills made so far in the wave.
        enemies_killed: u32,
        /// Points earned so far in the wave.
        current_level_score: u32,
    },
    /// Announces that the active wave ended.
    WaveResolved {
        /// Level the wave belonged to.
        level: Level,
        /// Whether the wave passed or failed.
        outcome: WaveOutcome,
        /// Kills made during the wave.
        enemies_killed: u32,
        /// Kills the wave required.
        required_kills: u32,
    },
    /// Confirms that the progress record was handed to the store.
    ProgressCommitted {
        /// Record as committed.
        record: ProgressRecord,
    },
    /// Requests that the level-complete popup be shown.
    LevelTransitionPresented {
        /// Contents of the popup.
        summary: LevelSummary,
    },
    /// Requests that the level-failed popup be shown.
    FailureTransitionPresented {
        /// Contents of the popup.
        summary: FailureSummary,
    },
    /// Announces that the final level was passed.
    CampaignCompleted {
        /// Final accumulated score.
        total_score: u32,
        /// Best accumulated score ever reached.
        highest_score: u32,
    },
    /// Announces that progress was wiped back to level 1.
    ProgressReset,
}

/// Progress that survives between sessions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    current_level: Level,
    total_score: u32,
    highest_score: u32,
    level_scores: BTreeMap<Level, u32>,
}

impl ProgressRecord {
    /// Assembles a record from stored parts.
    ///
    /// The highest score is raised to the total when the stored value lags
    /// behind it, so the returned record always satisfies the score invariant.
    #[must_use]
    pub fn from_parts(
        current_level: Level,
        total_score: u32,
        highest_score: u32,
        level_scores: BTreeMap<Level, u32>,
    ) -> Self {
        Self {
            current_level,
            total_score,
            highest_score: highest_score.max(total_score),
            level_scores,
        }
    }

    /// Level the player resumes at.
    #[must_use]
    pub const fn current_level(&self) -> Level {
        self.current_level
    }

    /// Sum of the scores of every passed level since the last full restart.
    #[must_use]
    pub const fn total_score(&self) -> u32 {
        self.total_score
    }

    /// Best total score ever reached.
    #[must_use]
    pub const fn highest_score(&self) -> u32 {
        self.highest_score
    }

    /// Score of each passed level.
    #[must_use]
    pub fn level_scores(&self) -> &BTreeMap<Level, u32> {
        &self.level_scores
    }

    /// Score recorded for the provided level, if it was passed.
    #[must_use]
    pub fn level_score(&self, level: Level) -> Option<u32> {
        self.level_scores.get(&level).copied()
    }

    /// Folds the score of a passed wave into the record.
    pub fn record_passed_wave(&mut self, level: Level, score: u32) {
        self.total_score = self.total_score.saturating_add(score);
        let _ = self.level_scores.insert(level, score);
        self.highest_score = self.highest_score.max(self.total_score);
    }

    /// Moves the resume point to the provided level.
    pub fn advance_to(&mut self, level: Level) {
        self.current_level = level;
    }

    /// Wipes campaign progress while keeping the highest score.
    pub fn reset_campaign(&mut self) {
        self.current_level = Level::FIRST;
        self.total_score = 0;
        self.level_scores.clear();
    }
}

impl Default for ProgressRecord {
    fn default() -> Self {
        Self {
            current_level: Level::FIRST,
            total_score: 0,
            highest_score: 0,
            level_scores: BTreeMap::new(),
        }
    }
}

/// Persistence backend for the progress record.
pub trait ProgressStore {
    /// Error raised when a commit cannot be written.
    type Error: Error + 'static;

    /// Reads the stored record, substituting defaults for anything missing or
    /// malformed.
    fn load(&self) -> ProgressRecord;

    /// Writes every field of the record in a single all-or-nothing operation.
    fn commit(&mut self, record: &ProgressRecord) -> Result<(), Self::Error>;
}

/// Fields displayed on the in-wave heads-up display.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HudSnapshot {
    /// Level being played.
    pub level: Level,
    /// Final level of the campaign.
    pub max_level: Level,
    /// Score banked from passed levels.
    pub total_score: u32,
    /// Score earned in the current wave.
    pub current_level_score: u32,
    /// Best total score ever reached.
    pub highest_score: u32,
    /// Kills made in the current wave.
    pub enemies_killed: u32,
    /// Enemies the wave spawns.
    pub enemies_per_wave: u32,
    /// Kills needed to pass.
    pub required_kills: u32,
    /// Bullets fired in the current wave.
    pub bullets_used: u32,
    /// Bullet budget of the current wave.
    pub max_bullets: u32,
}

/// Contents of the level-complete popup.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelSummary {
    /// Level that was just passed.
    pub completed_level: Level,
    /// Level the player continues with.
    pub next_level: Level,
    /// Parameters of the upcoming wave.
    pub next_parameters: WaveParameters,
    /// Score banked from passed levels.
    pub total_score: u32,
    /// Best total score ever reached.
    pub highest_score: u32,
}

/// Contents of the level-failed popup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureSummary {
    /// Level that was failed.
    pub level: Level,
    /// Kills made during the wave.
    pub enemies_killed: u32,
    /// Kills the wave required.
    pub required_kills: u32,
    /// Enemies the wave spawned.
    pub enemies: u32,
    /// Bullets fired during the wave.
    pub bullets_used: u32,
    /// Score banked from passed levels.
    pub total_score: u32,
    /// Best total score ever reached.
    pub highest_score: u32,
}
