//! Master side of a character: inventory, equipment slot and AI drivers.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::content::{EquipmentRef, ItemRef};

/// Item stack in an inventory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemStack {
    pub item: ItemRef,
    pub count: u32,
}

/// Inventory component on the master entity
#[derive(Component, Debug, Default, Clone)]
pub struct Inventory {
    items: Vec<ItemStack>,
    equipment: Option<EquipmentRef>,
}

impl Inventory {
    pub fn give_item(&mut self, item: ItemRef, count: u32) {
        if count == 0 {
            return;
        }
        match self.items.iter_mut().find(|s| s.item == item) {
            Some(stack) => stack.count = stack.count.saturating_add(count),
            None => self.items.push(ItemStack { item, count }),
        }
    }

    pub fn item_count(&self, item: ItemRef) -> u32 {
        self.items
            .iter()
            .find(|s| s.item == item)
            .map_or(0, |s| s.count)
    }

    /// Number of distinct items held
    pub fn distinct_items(&self) -> usize {
        self.items.len()
    }

    pub fn equipment(&self) -> Option<EquipmentRef> {
        self.equipment
    }

    /// `None` empties the equipment slot
    pub fn set_equipment(&mut self, equipment: Option<EquipmentRef>) {
        self.equipment = equipment;
    }
}

/// One AI skill driver: when and how the AI uses a skill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiSkillDriver {
    pub name: String,
    pub min_target_health_fraction: f32,
    pub max_target_health_fraction: f32,
    pub min_user_health_fraction: f32,
    pub max_user_health_fraction: f32,
    pub should_sprint: bool,
}

impl AiSkillDriver {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            min_target_health_fraction: 0.0,
            max_target_health_fraction: 1.0,
            min_user_health_fraction: 0.0,
            max_user_health_fraction: 1.0,
            should_sprint: false,
        }
    }

    /// Builder: restrict this driver by the user's own health fraction
    pub fn with_user_health(mut self, min: f32, max: f32) -> Self {
        self.min_user_health_fraction = min;
        self.max_user_health_fraction = max;
        self
    }
}

/// AI skill drivers component on the master entity
#[derive(Component, Debug, Default, Clone)]
pub struct AiSkillDrivers(pub Vec<AiSkillDriver>);

/// Guard marking that the extra-life item was already granted to this master
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct PreventRecursion;
