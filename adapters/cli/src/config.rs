//! Session configuration read from an optional TOML file.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use skyfall_core::PlatformProfile;

/// Settings for a headless session. Every field may be omitted from the file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct SessionConfig {
    /// Seed shared by the engine and the autopilot.
    pub(crate) seed: u64,
    /// Device profile the waves are balanced for.
    pub(crate) platform: PlatformProfile,
    /// Simulated physics settings.
    pub(crate) autopilot: AutopilotConfig,
    /// Length of a simulated frame in milliseconds.
    pub(crate) frame_ms: u64,
    /// Location of the progress file.
    pub(crate) save_path: PathBuf,
}

/// Behaviour of the simulated player and play field.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct AutopilotConfig {
    /// Probability that a fired bullet strikes its target.
    pub(crate) accuracy: f64,
    /// Distance an enemy descends before leaving the field.
    pub(crate) field_height: f32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            platform: PlatformProfile::desktop(),
            autopilot: AutopilotConfig::default(),
            frame_ms: 16,
            save_path: PathBuf::from("skyfall-progress.json"),
        }
    }
}

impl Default for AutopilotConfig {
    fn default() -> Self {
        Self {
            accuracy: 0.95,
            field_height: 600.0,
        }
    }
}

impl SessionConfig {
    /// Reads the configuration at `path`, or the defaults when no path is given.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    fn parse(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings the simulation cannot run with.
    pub(crate) fn validate(&self) -> Result<()> {
        ensure!(
            (0.0..=1.0).contains(&self.autopilot.accuracy),
            "autopilot accuracy must lie within 0.0..=1.0, got {}",
            self.autopilot.accuracy
        );
        ensure!(
            self.autopilot.field_height.is_finite() && self.autopilot.field_height > 0.0,
            "field height must be positive, got {}",
            self.autopilot.field_height
        );
        ensure!(self.frame_ms > 0, "frame length must be at least 1 ms");
        ensure!(
            self.platform.viewport_width.is_finite() && self.platform.viewport_width > 0.0,
            "viewport width must be positive, got {}",
            self.platform.viewport_width
        );
        Ok(())
    }

    /// Simulated frame length.
    pub(crate) fn frame(&self) -> Duration {
        Duration::from_millis(self.frame_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        assert_eq!(
            SessionConfig::parse("").expect("parse"),
            SessionConfig::default()
        );
    }

    #[test]
    fn partial_tables_keep_remaining_defaults() {
        let config = SessionConfig::parse(
            r#"
            seed = 42
            save_path = "saves/progress.json"

            [platform]
            is_mobile = true
            viewport_width = 390.0

            [autopilot]
            accuracy = 0.5
            "#,
        )
        .expect("parse");

        assert_eq!(config.seed, 42);
        assert_eq!(config.save_path, PathBuf::from("saves/progress.json"));
        assert!(config.platform.is_mobile);
        assert_eq!(config.platform.viewport_width, 390.0);
        assert_eq!(config.autopilot.accuracy, 0.5);
        assert_eq!(config.autopilot.field_height, 600.0);
        assert_eq!(config.frame(), Duration::from_millis(16));
    }

    #[test]
    fn out_of_range_accuracy_is_rejected() {
        let error = SessionConfig::parse("[autopilot]\naccuracy = 1.5\n").expect_err("invalid");
        assert!(error.to_string().contains("accuracy"), "{error}");
    }

    #[test]
    fn zero_frame_length_is_rejected() {
        assert!(SessionConfig::parse("frame_ms = 0\n").is_err());
    }

    #[test]
    fn missing_file_reports_path() {
        let directory = tempfile::tempdir().expect("tempdir");
        let path = directory.path().join("absent.toml");
        let error = SessionConfig::load(Some(&path)).expect_err("missing");
        assert!(format!("{error:#}").contains("absent.toml"));
    }
}
