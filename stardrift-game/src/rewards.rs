//! Reward bundles produced by settlement
use serde::{Deserialize, Serialize};

use crate::catalog::ItemRarity;

/// Stack of a single material. One stack per item id within a bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialStack {
    pub item_id: String,
    pub name: String,
    pub quantity: u32,
}

/// A single equipment drop. Drops are distinct instances and never stacked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentDrop {
    pub item_id: String,
    pub name: String,
    pub rarity: ItemRarity,
}

/// Gold, exp, materials, and equipment accrued over one or more settlements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RewardBundle {
    #[serde(default)]
    pub gold: u64,
    #[serde(default)]
    pub exp: u64,
    #[serde(default)]
    pub materials: Vec<MaterialStack>,
    #[serde(default)]
    pub equipments: Vec<EquipmentDrop>,
}

impl RewardBundle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// True when there is nothing to hand out.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.gold == 0 && self.exp == 0 && self.materials.is_empty() && self.equipments.is_empty()
    }

    #[must_use]
    pub fn material_quantity(&self, item_id: &str) -> u32 {
        self.materials
            .iter()
            .find(|stack| stack.item_id == item_id)
            .map_or(0, |stack| stack.quantity)
    }

    /// Total number of material units across all stacks.
    #[must_use]
    pub fn material_units(&self) -> u64 {
        self.materials
            .iter()
            .map(|stack| u64::from(stack.quantity))
            .sum()
    }

    /// Add `quantity` of a material, stacking onto an existing entry for the same id.
    pub fn add_material(&mut self, item_id: &str, name: &str, quantity: u32) {
        if quantity == 0 {
            return;
        }
        if let Some(stack) = self
            .materials
            .iter_mut()
            .find(|stack| stack.item_id == item_id)
        {
            stack.quantity = stack.quantity.saturating_add(quantity);
        } else {
            self.materials.push(MaterialStack {
                item_id: item_id.to_string(),
                name: name.to_string(),
                quantity,
            });
        }
    }

    pub fn push_equipment(&mut self, drop: EquipmentDrop) {
        self.equipments.push(drop);
    }

    /// Fold another bundle into this one: sums currencies, stacks materials, appends equipment.
    pub fn merge(&mut self, other: &Self) {
        self.gold = self.gold.saturating_add(other.gold);
        self.exp = self.exp.saturating_add(other.exp);
        for stack in &other.materials {
            self.add_material(&stack.item_id, &stack.name, stack.quantity);
        }
        self.equipments.extend(other.equipments.iter().cloned());
    }

    /// Take the contents, leaving an empty bundle behind.
    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }
}
