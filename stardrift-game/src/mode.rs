//! Collection modes and auto-stop policy
use serde::{Deserialize, Serialize};

use crate::constants::{BALANCED_MULTIPLIER, FOCUSED_MULTIPLIER};

/// How the ship spends its time while parked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CollectMode {
    /// Focus on harvesting; material yield boosted.
    Gather,
    /// Patrol for fights; exp and equipment yield boosted.
    Combat,
    /// Split time evenly; every yield modestly boosted.
    #[default]
    Balanced,
}

/// Yield multipliers applied on top of a location's base rates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModeMultipliers {
    pub gold: f64,
    pub exp: f64,
    pub material: f64,
    pub equipment: f64,
}

impl ModeMultipliers {
    pub const NEUTRAL: Self = Self {
        gold: 1.0,
        exp: 1.0,
        material: 1.0,
        equipment: 1.0,
    };
}

impl Default for ModeMultipliers {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

/// Display metadata for a mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeInfo {
    pub name: &'static str,
    pub description: &'static str,
}

impl CollectMode {
    pub const ALL: [Self; 3] = [Self::Gather, Self::Combat, Self::Balanced];

    /// Multiplier set for this mode. The asymmetry between modes is intentional.
    #[must_use]
    pub const fn multipliers(self) -> ModeMultipliers {
        match self {
            Self::Gather => ModeMultipliers {
                material: FOCUSED_MULTIPLIER,
                ..ModeMultipliers::NEUTRAL
            },
            Self::Combat => ModeMultipliers {
                exp: FOCUSED_MULTIPLIER,
                equipment: FOCUSED_MULTIPLIER,
                ..ModeMultipliers::NEUTRAL
            },
            Self::Balanced => ModeMultipliers {
                gold: BALANCED_MULTIPLIER,
                exp: BALANCED_MULTIPLIER,
                material: BALANCED_MULTIPLIER,
                equipment: BALANCED_MULTIPLIER,
            },
        }
    }

    #[must_use]
    pub const fn info(self) -> ModeInfo {
        match self {
            Self::Gather => ModeInfo {
                name: "Resource Gathering",
                description: "Focus on harvesting resources. Materials +50%.",
            },
            Self::Combat => ModeInfo {
                name: "Combat Patrol",
                description: "Seek out fights. Exp +50%, equipment drops +50%.",
            },
            Self::Balanced => ModeInfo {
                name: "Balanced",
                description: "Split time between gathering and fighting. All yields +20%.",
            },
        }
    }

    /// Stable lowercase identifier, matching the persisted form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gather => "gather",
            Self::Combat => "combat",
            Self::Balanced => "balanced",
        }
    }
}

impl std::str::FromStr for CollectMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "gather" => Ok(Self::Gather),
            "combat" => Ok(Self::Combat),
            "balanced" => Ok(Self::Balanced),
            other => Err(format!("unknown collect mode: {other}")),
        }
    }
}

/// When an active session should end itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AutoStopCondition {
    /// Stop once the cargo hold is full.
    #[default]
    Full,
    /// Stop once ship energy runs low.
    Energy,
    /// Keep collecting indefinitely.
    Never,
}

impl AutoStopCondition {
    #[must_use]
    pub const fn should_stop(self, inventory_full: bool, energy_low: bool) -> bool {
        match self {
            Self::Full => inventory_full,
            Self::Energy => energy_low,
            Self::Never => false,
        }
    }
}
