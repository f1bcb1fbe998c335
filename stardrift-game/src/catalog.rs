//! Collection locations and item templates consumed by id lookup.
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::OnceLock;
use thiserror::Error;

const DEFAULT_LOCATION_DATA: &str = include_str!("../assets/data/collect_locations.json");
const DEFAULT_ITEM_DATA: &str = include_str!("../assets/data/items.json");

/// Item rarity tiers, serialized as lowercase strings in saves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ItemRarity {
    #[default]
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Material,
    Weapon,
    Armor,
    Accessory,
}


/// Static description of an item that can drop from a collection session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemTemplate {
    pub id: String,
    pub name: String,
    pub kind: ItemKind,
    #[serde(default)]
    pub rarity: ItemRarity,
}

/// Per-hour base yields for a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseRewards {
    pub gold_min: u32,
    pub gold_max: u32,
    pub exp_min: u32,
    pub exp_max: u32,
    /// Expected material drops per hour
    pub material_drop_chance: f64,
    /// Expected equipment drops per hour
    pub equipment_drop_chance: f64,
}

impl BaseRewards {
    /// Midpoint of the gold range.
    #[must_use]
    pub fn gold_per_hour(&self) -> f64 {
        (f64::from(self.gold_min) + f64::from(self.gold_max)) / 2.0
    }

    /// Midpoint of the exp range.
    #[must_use]
    pub fn exp_per_hour(&self) -> f64 {
        (f64::from(self.exp_min) + f64::from(self.exp_max)) / 2.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct UnlockRequirement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,
}

/// An orbit or site the ship can be parked at for auto-collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectLocation {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Danger rating from 1 to 10
    #[serde(default)]
    pub danger_level: u8,
    /// Resource quality rating from 1 to 10
    #[serde(default)]
    pub resource_quality: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlock_requirement: Option<UnlockRequirement>,
    pub base_rewards: BaseRewards,
}

impl CollectLocation {
    /// Player level required to start collecting here, if any.
    #[must_use]
    pub fn required_level(&self) -> Option<u32> {
        self.unlock_requirement
            .as_ref()
            .and_then(|req| req.level)
            .filter(|level| *level > 0)
    }

    #[must_use]
    pub fn is_unlocked_at(&self, player_level: u32) -> bool {
        self.required_level()
            .is_none_or(|required| player_level >= required)
    }
}

/// Errors raised when catalog data fails validation.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate catalog id: {id}")]
    DuplicateId { id: String },
    #[error("{id}: {field} minimum {min} exceeds maximum {max}")]
    InvertedRange {
        id: String,
        field: &'static str,
        min: u32,
        max: u32,
    },
    #[error("{id}: {field} must be a finite, non-negative rate (got {value})")]
    InvalidRate {
        id: String,
        field: &'static str,
        value: f64,
    },
}

fn ensure_unique<'a>(ids: impl Iterator<Item = &'a str>) -> Result<(), CatalogError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(CatalogError::DuplicateId { id: id.to_string() });
        }
    }
    Ok(())
}

/// Container for all collection locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LocationCatalog {
    pub locations: Vec<CollectLocation>,
}

impl LocationCatalog {
    /// Load location data from a JSON string
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed or a location has inconsistent rates.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let catalog: Self = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        ensure_unique(self.locations.iter().map(|loc| loc.id.as_str()))?;
        for loc in &self.locations {
            let base = &loc.base_rewards;
            for (field, min, max) in [
                ("gold", base.gold_min, base.gold_max),
                ("exp", base.exp_min, base.exp_max),
            ] {
                if min > max {
                    return Err(CatalogError::InvertedRange {
                        id: loc.id.clone(),
                        field,
                        min,
                        max,
                    });
                }
            }
            for (field, value) in [
                ("material_drop_chance", base.material_drop_chance),
                ("equipment_drop_chance", base.equipment_drop_chance),
            ] {
                if !value.is_finite() || value < 0.0 {
                    return Err(CatalogError::InvalidRate {
                        id: loc.id.clone(),
                        field,
                        value,
                    });
                }
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn find(&self, location_id: &str) -> Option<&CollectLocation> {
        self.locations.iter().find(|loc| loc.id == location_id)
    }
}

/// Container for all item templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ItemCatalog {
    pub items: Vec<ItemTemplate>,
}

impl ItemCatalog {
    /// Load item templates from a JSON string
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed or contains duplicate ids.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let catalog: Self = serde_json::from_str(json)?;
        ensure_unique(catalog.items.iter().map(|item| item.id.as_str()))?;
        Ok(catalog)
    }

    #[must_use]
    pub fn find(&self, item_id: &str) -> Option<&ItemTemplate> {
        self.items.iter().find(|item| item.id == item_id)
    }
}

/// Lookup surface the accrual engine consumes.
pub trait CollectCatalog {
    /// Resolve per-hour base rates for a location id.
    fn resolve_location(&self, location_id: &str) -> Option<&CollectLocation>;

    /// Resolve display name and rarity for an item id.
    fn resolve_item_template(&self, item_id: &str) -> Option<&ItemTemplate>;

    /// All known locations in display order.
    fn locations(&self) -> &[CollectLocation];

    /// Locations reachable at the given player level, in display order.
    fn unlocked_locations(&self, player_level: u32) -> Vec<&CollectLocation> {
        self.locations()
            .iter()
            .filter(|loc| loc.is_unlocked_at(player_level))
            .collect()
    }
}

impl<T: CollectCatalog + ?Sized> CollectCatalog for &T {
    fn resolve_location(&self, location_id: &str) -> Option<&CollectLocation> {
        (**self).resolve_location(location_id)
    }

    fn resolve_item_template(&self, item_id: &str) -> Option<&ItemTemplate> {
        (**self).resolve_item_template(item_id)
    }

    fn locations(&self) -> &[CollectLocation] {
        (**self).locations()
    }
}

/// Catalog backed by the embedded game data.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StaticCatalog {
    locations: LocationCatalog,
    items: ItemCatalog,
}

impl StaticCatalog {
    #[must_use]
    pub const fn new(locations: LocationCatalog, items: ItemCatalog) -> Self {
        Self { locations, items }
    }

    /// Parse the embedded location and item tables.
    #[must_use]
    pub fn load_from_static() -> Self {
        let locations = LocationCatalog::from_json(DEFAULT_LOCATION_DATA).unwrap_or_else(|err| {
            log::warn!("embedded location catalog rejected: {err}");
            LocationCatalog::default()
        });
        let items = ItemCatalog::from_json(DEFAULT_ITEM_DATA).unwrap_or_else(|err| {
            log::warn!("embedded item catalog rejected: {err}");
            ItemCatalog::default()
        });
        Self::new(locations, items)
    }

    /// Shared copy of the embedded catalog, parsed once.
    #[must_use]
    pub fn default_config() -> &'static Self {
        static CATALOG: OnceLock<StaticCatalog> = OnceLock::new();
        CATALOG.get_or_init(Self::load_from_static)
    }

    #[must_use]
    pub const fn items(&self) -> &ItemCatalog {
        &self.items
    }
}

impl CollectCatalog for StaticCatalog {
    fn resolve_location(&self, location_id: &str) -> Option<&CollectLocation> {
        self.locations.find(location_id)
    }

    fn resolve_item_template(&self, item_id: &str) -> Option<&ItemTemplate> {
        self.items.find(item_id)
    }

    fn locations(&self) -> &[CollectLocation] {
        &self.locations.locations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{DEFAULT_LOCATION_ID, EQUIPMENT_IDS, MATERIAL_IDS};

    #[test]
    fn embedded_catalog_covers_drop_pools() {
        let catalog = StaticCatalog::default_config();
        assert!(catalog.resolve_location(DEFAULT_LOCATION_ID).is_some());
        for id in MATERIAL_IDS {
            let template = catalog.resolve_item_template(id).expect("material template");
            assert_eq!(template.kind, ItemKind::Material);
        }
        for id in EQUIPMENT_IDS {
            let template = catalog.resolve_item_template(id).expect("equipment template");
            assert_ne!(template.kind, ItemKind::Material, "{id} should be equipment");
        }
    }

    #[test]
    fn unlock_filter_respects_level() {
        let catalog = StaticCatalog::default_config();
        let starter: Vec<_> = catalog
            .unlocked_locations(1)
            .into_iter()
            .map(|loc| loc.id.as_str())
            .collect();
        assert_eq!(starter, vec!["orbit_debris", "asteroid_belt"]);
        assert_eq!(catalog.unlocked_locations(20).len(), catalog.locations().len());

        let nebula = catalog.resolve_location("nebula_cloud").unwrap();
        assert_eq!(nebula.required_level(), Some(5));
        assert!(!nebula.is_unlocked_at(4));
        assert!(nebula.is_unlocked_at(5));
    }

    #[test]
    fn base_rewards_midpoints() {
        let catalog = StaticCatalog::default_config();
        let base = &catalog.resolve_location("orbit_debris").unwrap().base_rewards;
        assert!((base.gold_per_hour() - 15.0).abs() < f64::EPSILON);
        assert!((base.exp_per_hour() - 7.5).abs() < f64::EPSILON);
    }

    #[test]
    fn location_validation_rejects_inverted_range() {
        let json = r#"{
            "locations": [
                {
                    "id": "bad",
                    "name": "Bad",
                    "base_rewards": {
                        "gold_min": 30, "gold_max": 10,
                        "exp_min": 1, "exp_max": 2,
                        "material_drop_chance": 0.1,
                        "equipment_drop_chance": 0.1
                    }
                }
            ]
        }"#;
        let err = LocationCatalog::from_json(json).unwrap_err();
        assert!(matches!(err, CatalogError::InvertedRange { field: "gold", .. }));
    }

    #[test]
    fn location_validation_rejects_negative_rate_and_duplicates() {
        let loc = |id: &str, rate: f64| {
            format!(
                r#"{{"id":"{id}","name":"x","base_rewards":{{"gold_min":1,"gold_max":2,"exp_min":1,"exp_max":2,"material_drop_chance":{rate},"equipment_drop_chance":0.0}}}}"#
            )
        };
        let negative = format!(r#"{{"locations":[{}]}}"#, loc("a", -0.5));
        assert!(matches!(
            LocationCatalog::from_json(&negative),
            Err(CatalogError::InvalidRate { .. })
        ));
        let duplicate = format!(r#"{{"locations":[{},{}]}}"#, loc("a", 0.1), loc("a", 0.2));
        assert!(matches!(
            LocationCatalog::from_json(&duplicate),
            Err(CatalogError::DuplicateId { .. })
        ));
    }

    #[test]
    fn rarity_serializes_lowercase() {
        let json = serde_json::to_string(&ItemRarity::Legendary).unwrap();
        assert_eq!(json, "\"legendary\"");
    }
}
