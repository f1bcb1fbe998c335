//! Centralized balance and tuning constants for Stardrift auto-collection.
//!
//! These values define the accrual math for idle sessions. Keeping them
//! together ensures that balance can only be adjusted via code changes
//! reviewed in version control, rather than through external JSON assets.

// Accrual window -----------------------------------------------------------
/// Milliseconds in one hour of wall-clock time.
pub const MS_PER_HOUR: u64 = 60 * 60 * 1000;
/// Longest window a single settlement will credit. Time beyond it is forfeited.
pub const MAX_ACCRUAL_HOURS: f64 = 24.0;
/// Synthetic window used for hourly income previews.
pub const PREVIEW_WINDOW_HOURS: f64 = 1.0;

// Yield jitter -------------------------------------------------------------
pub const YIELD_JITTER_MIN: f64 = 0.9;
pub const YIELD_JITTER_MAX: f64 = 1.1;

// Mode multipliers ---------------------------------------------------------
pub const BALANCED_MULTIPLIER: f64 = 1.2;
pub const FOCUSED_MULTIPLIER: f64 = 1.5;

// Drop pools ---------------------------------------------------------------
pub const MATERIAL_IDS: [&str; 10] = [
    "mat_001", "mat_002", "mat_003", "mat_004", "mat_005", "mat_006", "mat_007", "mat_008",
    "mat_009", "mat_010",
];

pub const EQUIPMENT_IDS: [&str; 8] = [
    "weapon_001",
    "weapon_002",
    "weapon_003",
    "armor_001",
    "armor_002",
    "armor_003",
    "accessory_001",
    "accessory_002",
];

// Defaults -----------------------------------------------------------------
pub const DEFAULT_LOCATION_ID: &str = "orbit_debris";

// RNG domain tags ----------------------------------------------------------
pub(crate) const RNG_DOMAIN_SETTLE: &[u8] = b"settle";
pub(crate) const RNG_DOMAIN_PREVIEW: &[u8] = b"preview";
