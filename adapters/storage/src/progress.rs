use std::{collections::BTreeMap, str::FromStr};

use skyfall_core::{Level, ProgressRecord, ProgressStore, MAX_LEVEL};
use tracing::warn;

use crate::{keys, KeyValueStore, StoreError};

/// [`ProgressStore`] that maps a record onto the four progress keys.
#[derive(Debug, Default)]
pub struct KeyValueProgressStore<K> {
    backend: K,
}

impl<K: KeyValueStore> KeyValueProgressStore<K> {
    /// Wraps the provided backend.
    #[must_use]
    pub fn new(backend: K) -> Self {
        Self { backend }
    }

    /// Read-only access to the backend.
    #[must_use]
    pub fn backend(&self) -> &K {
        &self.backend
    }

    fn load_level(&self) -> Level {
        let Some(raw) = self.backend.get(keys::CURRENT_LEVEL) else {
            return Level::FIRST;
        };
        let Some(level) = raw.trim().parse::<u32>().ok().and_then(Level::try_new) else {
            warn!(key = keys::CURRENT_LEVEL, value = %raw, "invalid stored level; starting at level 1");
            return Level::FIRST;
        };
        if level > MAX_LEVEL {
            warn!(key = keys::CURRENT_LEVEL, value = %raw, "stored level beyond the campaign; clamping");
            return MAX_LEVEL;
        }
        level
    }

    fn load_number<T>(&self, key: &str) -> T
    where
        T: FromStr + Default,
    {
        let Some(raw) = self.backend.get(key) else {
            return T::default();
        };
        raw.trim().parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, "invalid stored number; using default");
            T::default()
        })
    }

    fn load_level_scores(&self) -> BTreeMap<Level, u32> {
        let Some(raw) = self.backend.get(keys::LEVEL_SCORES) else {
            return BTreeMap::new();
        };
        serde_json::from_str(&raw).unwrap_or_else(|error| {
            warn!(key = keys::LEVEL_SCORES, %error, "invalid stored level scores; using empty map");
            BTreeMap::new()
        })
    }
}

impl<K: KeyValueStore> ProgressStore for KeyValueProgressStore<K> {
    type Error = StoreError;

    fn load(&self) -> ProgressRecord {
        ProgressRecord::from_parts(
            self.load_level(),
            self.load_number(keys::TOTAL_SCORE),
            self.load_number(keys::HIGHEST_SCORE),
            self.load_level_scores(),
        )
    }

    fn commit(&mut self, record: &ProgressRecord) -> Result<(), StoreError> {
        let level_scores = serde_json::to_string(record.level_scores())?;
        self.backend.put_all(&[
            (keys::CURRENT_LEVEL, record.current_level().to_string()),
            (keys::TOTAL_SCORE, record.total_score().to_string()),
            (keys::HIGHEST_SCORE, record.highest_score().to_string()),
            (keys::LEVEL_SCORES, level_scores),
        ])
    }
}
