//! Text and JSON renderings of session milestones.

use std::fmt;

use serde::Serialize;
use skyfall_core::{Event, FailureSummary, LevelSummary, WaveParameters};

/// Session milestone printed by the `play` command.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub(crate) enum Report {
    LevelCleared { summary: LevelSummary },
    LevelFailed { summary: FailureSummary },
    CampaignCompleted { total_score: u32, highest_score: u32 },
}

impl Report {
    pub(crate) fn from_event(event: &Event) -> Option<Self> {
        match *event {
            Event::LevelTransitionPresented { summary } => Some(Self::LevelCleared { summary }),
            Event::FailureTransitionPresented { summary } => Some(Self::LevelFailed { summary }),
            Event::CampaignCompleted {
                total_score,
                highest_score,
            } => Some(Self::CampaignCompleted {
                total_score,
                highest_score,
            }),
            _ => None,
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LevelCleared { summary } => write!(
                f,
                "level {} cleared, total {} (best {}); next level {}: {}",
                summary.completed_level,
                summary.total_score,
                summary.highest_score,
                summary.next_level,
                ParameterLine(&summary.next_parameters),
            ),
            Self::LevelFailed { summary } => write!(
                f,
                "level {} failed with {}/{} kills of {} enemies using {} bullets, total {} (best {})",
                summary.level,
                summary.enemies_killed,
                summary.required_kills,
                summary.enemies,
                summary.bullets_used,
                summary.total_score,
                summary.highest_score,
            ),
            Self::CampaignCompleted {
                total_score,
                highest_score,
            } => write!(
                f,
                "campaign completed, total {total_score} (best {highest_score})"
            ),
        }
    }
}

/// One-line rendering of a wave's difficulty.
pub(crate) struct ParameterLine<'a>(pub(crate) &'a WaveParameters);

impl fmt::Display for ParameterLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parameters = self.0;
        let band = parameters.spawn_band();
        write!(
            f,
            "{} enemies at {:.0}/s, {} bullets, {} kills required, spawn x {:.0}..{:.0}",
            parameters.enemy_count(),
            parameters.enemy_speed(),
            parameters.max_bullets(),
            parameters.required_kills(),
            band.left(),
            band.right(),
        )
    }
}
