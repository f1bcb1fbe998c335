//! Stardrift Game Engine
//!
//! Platform-agnostic idle-collection logic for the Stardrift space exploration game.
//! This crate accrues offline rewards for a parked ship without UI or platform-specific
//! dependencies; callers supply the current time and persist the snapshots.

pub mod catalog;
pub mod collect;
pub mod constants;
pub mod mode;
pub mod numbers;
pub mod rewards;
pub mod rng;
pub mod save;
pub mod settlement;
pub mod shared;

// Re-export commonly used types
pub use catalog::{
    BaseRewards, CatalogError, CollectCatalog, CollectLocation, ItemCatalog, ItemKind, ItemRarity,
    ItemTemplate, LocationCatalog, StaticCatalog, UnlockRequirement,
};
pub use collect::{AutoCollectEngine, CollectConfig, CollectError, CollectState, ConfigPatch};
pub use mode::{AutoStopCondition, CollectMode, ModeInfo, ModeMultipliers};
pub use rewards::{EquipmentDrop, MaterialStack, RewardBundle};
pub use save::{
    AutoCollectSave, CollectStorage, LoadStatus, LoadedSave, MemoryStorage, PersistError,
    load_save,
};
pub use settlement::{elapsed_hours, generate_rewards};
pub use shared::SharedCollector;
