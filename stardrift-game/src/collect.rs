//! Auto-collection session engine.
//!
//! Owns the single idle-collection session and turns elapsed wall-clock
//! time into rewards on demand. Nothing runs in the background: accrual is
//! settled lazily whenever a settling operation is called with the current
//! time. All timestamps are milliseconds since the Unix epoch and are
//! supplied by the caller.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{CollectCatalog, CollectLocation, StaticCatalog};
use crate::constants::{DEFAULT_LOCATION_ID, MS_PER_HOUR, PREVIEW_WINDOW_HOURS};
use crate::mode::{AutoStopCondition, CollectMode};
use crate::rewards::RewardBundle;
use crate::rng::{RngDomain, window_rng};
use crate::save::AutoCollectSave;
use crate::settlement::{elapsed_hours, generate_rewards};

/// Failures surfaced to the player. Display strings are player-facing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CollectError {
    #[error("collection site '{location_id}' does not exist")]
    InvalidLocation { location_id: String },
    #[error("collection site '{location_id}' unlocks at level {required_level} (current level {player_level})")]
    LocationLocked {
        location_id: String,
        required_level: u32,
        player_level: u32,
    },
    #[error("no auto-collection is running")]
    NotCollecting,
    #[error("nothing to claim yet")]
    NothingToClaim,
}

/// The idle-collection session. Inactive sessions carry zeroed timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectState {
    pub is_collecting: bool,
    pub start_time: u64,
    pub last_collect_time: u64,
    pub location_id: String,
    pub mode: CollectMode,
    #[serde(default)]
    pub total_rewards: RewardBundle,
}

impl Default for CollectState {
    fn default() -> Self {
        Self {
            is_collecting: false,
            start_time: 0,
            last_collect_time: 0,
            location_id: DEFAULT_LOCATION_ID.to_string(),
            mode: CollectMode::default(),
            total_rewards: RewardBundle::default(),
        }
    }
}

/// Player preferences for auto-collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectConfig {
    pub location_id: String,
    pub mode: CollectMode,
    #[serde(default)]
    pub auto_stop_condition: AutoStopCondition,
    /// Sell common equipment automatically when rewards are claimed
    #[serde(default = "default_auto_sell_common")]
    pub auto_sell_common: bool,
}

const fn default_auto_sell_common() -> bool {
    true
}

impl Default for CollectConfig {
    fn default() -> Self {
        Self {
            location_id: DEFAULT_LOCATION_ID.to_string(),
            mode: CollectMode::default(),
            auto_stop_condition: AutoStopCondition::default(),
            auto_sell_common: default_auto_sell_common(),
        }
    }
}

/// Partial update for [`CollectConfig`]; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigPatch {
    pub location_id: Option<String>,
    pub mode: Option<CollectMode>,
    pub auto_stop_condition: Option<AutoStopCondition>,
    pub auto_sell_common: Option<bool>,
}

/// Offline reward accrual engine bound to a catalog.
#[derive(Debug, Clone)]
pub struct AutoCollectEngine<C = &'static StaticCatalog> {
    state: CollectState,
    config: CollectConfig,
    last_save_time: u64,
    rng_seed: u64,
    catalog: C,
}

impl AutoCollectEngine {
    /// Create an engine over the embedded catalog.
    #[must_use]
    pub fn new(rng_seed: u64, now_ms: u64) -> Self {
        Self::with_catalog(StaticCatalog::default_config(), rng_seed, now_ms)
    }
}

impl<C: CollectCatalog> AutoCollectEngine<C> {
    /// Create an engine with an inactive session over a custom catalog.
    #[must_use]
    pub fn with_catalog(catalog: C, rng_seed: u64, now_ms: u64) -> Self {
        Self {
            state: CollectState::default(),
            config: CollectConfig::default(),
            last_save_time: now_ms,
            rng_seed,
            catalog,
        }
    }

    /// Rebuild an engine from a persisted snapshot. Stored timestamps are trusted as-is.
    #[must_use]
    pub fn restore(save: AutoCollectSave, catalog: C) -> Self {
        Self {
            state: save.state,
            config: save.config,
            last_save_time: save.last_save_time,
            rng_seed: save.rng_seed,
            catalog,
        }
    }

    /// Capture the full engine state for persistence, recording the save time.
    pub fn snapshot(&mut self, now_ms: u64) -> AutoCollectSave {
        self.last_save_time = now_ms;
        AutoCollectSave {
            state: self.state.clone(),
            config: self.config.clone(),
            last_save_time: self.last_save_time,
            rng_seed: self.rng_seed,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &CollectState {
        &self.state
    }

    #[must_use]
    pub const fn config(&self) -> &CollectConfig {
        &self.config
    }

    #[must_use]
    pub const fn catalog(&self) -> &C {
        &self.catalog
    }

    #[must_use]
    pub const fn rng_seed(&self) -> u64 {
        self.rng_seed
    }

    #[must_use]
    pub const fn last_save_time(&self) -> u64 {
        self.last_save_time
    }

    #[must_use]
    pub const fn is_collecting(&self) -> bool {
        self.state.is_collecting
    }

    /// Begin collecting at a location, discarding any previous session.
    ///
    /// # Errors
    ///
    /// Returns [`CollectError::InvalidLocation`] if the id is not in the catalog.
    pub fn start(
        &mut self,
        location_id: &str,
        mode: CollectMode,
        now_ms: u64,
    ) -> Result<(), CollectError> {
        let location_name = self
            .catalog
            .resolve_location(location_id)
            .map(|loc| loc.name.clone())
            .ok_or_else(|| CollectError::InvalidLocation {
                location_id: location_id.to_string(),
            })?;

        self.state = CollectState {
            is_collecting: true,
            start_time: now_ms,
            last_collect_time: now_ms,
            location_id: location_id.to_string(),
            mode,
            total_rewards: RewardBundle::new(),
        };
        self.config.location_id = location_id.to_string();
        self.config.mode = mode;
        self.last_save_time = now_ms;

        log::info!("auto-collect started at {location_name} in {} mode", mode.as_str());
        Ok(())
    }

    /// Begin collecting, first checking the location is unlocked at `player_level`.
    ///
    /// # Errors
    ///
    /// Returns [`CollectError::InvalidLocation`] for unknown ids and
    /// [`CollectError::LocationLocked`] when the player level is too low.
    pub fn start_unlocked(
        &mut self,
        location_id: &str,
        mode: CollectMode,
        player_level: u32,
        now_ms: u64,
    ) -> Result<(), CollectError> {
        let location = self.catalog.resolve_location(location_id).ok_or_else(|| {
            CollectError::InvalidLocation {
                location_id: location_id.to_string(),
            }
        })?;
        if let Some(required_level) = location.required_level()
            && player_level < required_level
        {
            return Err(CollectError::LocationLocked {
                location_id: location_id.to_string(),
                required_level,
                player_level,
            });
        }
        self.start(location_id, mode, now_ms)
    }

    /// Settle, end the session, and hand back everything it earned.
    ///
    /// # Errors
    ///
    /// Returns [`CollectError::NotCollecting`] if no session is active.
    pub fn stop(&mut self, now_ms: u64) -> Result<RewardBundle, CollectError> {
        if !self.state.is_collecting {
            return Err(CollectError::NotCollecting);
        }
        self.settle(now_ms);

        let rewards = self.state.total_rewards.take();
        self.state.is_collecting = false;
        self.state.start_time = 0;
        self.state.last_collect_time = 0;

        log::info!(
            "auto-collect stopped at {}: {} gold, {} exp",
            self.state.location_id,
            rewards.gold,
            rewards.exp
        );
        Ok(rewards)
    }

    /// Hand out everything earned so far and restart the clock without stopping.
    ///
    /// Nothing is committed when the claim fails, so an empty claim does not
    /// forfeit the partial window.
    ///
    /// # Errors
    ///
    /// Returns [`CollectError::NotCollecting`] if no session is active and
    /// [`CollectError::NothingToClaim`] if settling would yield nothing.
    pub fn claim(&mut self, now_ms: u64) -> Result<RewardBundle, CollectError> {
        if !self.state.is_collecting {
            return Err(CollectError::NotCollecting);
        }
        let mut rewards = self.state.total_rewards.clone();
        if let Some(delta) = self.compute_settlement(now_ms) {
            rewards.merge(&delta);
        }
        if rewards.is_empty() {
            return Err(CollectError::NothingToClaim);
        }

        // A clock that runs backwards must not reopen windows already settled.
        let anchor = now_ms.max(self.state.last_collect_time);
        self.state.total_rewards = RewardBundle::new();
        self.state.start_time = anchor;
        self.state.last_collect_time = anchor;

        log::info!(
            "auto-collect claimed at {}: {} gold, {} exp, {} materials, {} equipment",
            self.state.location_id,
            rewards.gold,
            rewards.exp,
            rewards.material_units(),
            rewards.equipments.len()
        );
        Ok(rewards)
    }

    /// Fold the time since the last settlement into the accumulated rewards.
    ///
    /// Returns `true` when a window was committed. Inactive sessions, empty or
    /// backwards windows, and unresolvable locations leave state untouched.
    pub fn settle(&mut self, now_ms: u64) -> bool {
        let Some(delta) = self.compute_settlement(now_ms) else {
            return false;
        };
        self.state.total_rewards.merge(&delta);
        self.state.last_collect_time = now_ms;
        true
    }

    /// What [`Self::stop`] would return at `now_ms`, without committing anything.
    #[must_use]
    pub fn pending(&self, now_ms: u64) -> RewardBundle {
        let mut rewards = self.state.total_rewards.clone();
        if let Some(delta) = self.compute_settlement(now_ms) {
            rewards.merge(&delta);
        }
        rewards
    }

    /// Estimated income for one hour at the session's location and mode.
    ///
    /// Stable between settlements: the preview window is anchored at the last
    /// settlement time.
    #[must_use]
    pub fn query(&self) -> RewardBundle {
        let Some(location) = self.catalog.resolve_location(&self.state.location_id) else {
            return RewardBundle::new();
        };
        let anchor = self.state.last_collect_time;
        let mut rng = window_rng(
            self.rng_seed,
            RngDomain::Preview,
            anchor,
            anchor.saturating_add(MS_PER_HOUR),
        );
        generate_rewards(
            &self.catalog,
            &location.base_rewards,
            self.state.mode,
            PREVIEW_WINDOW_HOURS,
            &mut rng,
        )
    }

    fn compute_settlement(&self, now_ms: u64) -> Option<RewardBundle> {
        if !self.state.is_collecting {
            return None;
        }
        let from = self.state.last_collect_time;
        let hours = elapsed_hours(from, now_ms);
        if hours <= 0.0 {
            return None;
        }
        let Some(location) = self.catalog.resolve_location(&self.state.location_id) else {
            log::warn!(
                "active session references unknown location '{}'; skipping settlement",
                self.state.location_id
            );
            return None;
        };
        let mut rng = window_rng(self.rng_seed, RngDomain::Settle, from, now_ms);
        let delta = generate_rewards(
            &self.catalog,
            &location.base_rewards,
            self.state.mode,
            hours,
            &mut rng,
        );
        log::debug!(
            "settled {hours:.3}h at {}: +{} gold, +{} exp, +{} materials, +{} equipment",
            self.state.location_id,
            delta.gold,
            delta.exp,
            delta.material_units(),
            delta.equipments.len()
        );
        Some(delta)
    }

    /// Milliseconds since the session started, or 0 when inactive.
    #[must_use]
    pub const fn collecting_duration(&self, now_ms: u64) -> u64 {
        if !self.state.is_collecting {
            return 0;
        }
        now_ms.saturating_sub(self.state.start_time)
    }

    /// Session duration as `HH:MM:SS`, or `MM:SS` under an hour.
    #[must_use]
    pub fn formatted_duration(&self, now_ms: u64) -> String {
        let seconds = self.collecting_duration(now_ms) / 1000;
        let minutes = seconds / 60;
        let hours = minutes / 60;
        if hours > 0 {
            format!("{hours:02}:{:02}:{:02}", minutes % 60, seconds % 60)
        } else {
            format!("{minutes:02}:{:02}", seconds % 60)
        }
    }

    pub fn update_config(&mut self, patch: ConfigPatch) {
        if let Some(location_id) = patch.location_id {
            self.config.location_id = location_id;
        }
        if let Some(mode) = patch.mode {
            self.config.mode = mode;
        }
        if let Some(condition) = patch.auto_stop_condition {
            self.config.auto_stop_condition = condition;
        }
        if let Some(auto_sell) = patch.auto_sell_common {
            self.config.auto_sell_common = auto_sell;
        }
    }

    #[must_use]
    pub const fn should_auto_stop(&self, inventory_full: bool, energy_low: bool) -> bool {
        self.config
            .auto_stop_condition
            .should_stop(inventory_full, energy_low)
    }

    /// Locations the player may start a session at.
    #[must_use]
    pub fn available_locations(&self, player_level: u32) -> Vec<&CollectLocation> {
        self.catalog.unlocked_locations(player_level)
    }

    /// Return to a fresh inactive session with default preferences.
    pub fn reset(&mut self, now_ms: u64) {
        self.state = CollectState::default();
        self.config = CollectConfig::default();
        self.last_save_time = now_ms;
    }
}
