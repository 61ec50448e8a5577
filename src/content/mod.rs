//! Content catalog: identifier resolution for items, equipment, buffs,
//! skills and artifacts.
//!
//! Every lookup returns an `Option`. Callers branch on absence; nothing here
//! panics or errors on an unknown name.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

macro_rules! content_ref {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub u32);
    };
}

content_ref!(
    /// Index into the item table
    ItemRef
);
content_ref!(
    /// Index into the equipment table
    EquipmentRef
);
content_ref!(
    /// Index into the buff table
    BuffRef
);
content_ref!(
    /// Index into the skill table
    SkillRef
);
content_ref!(
    /// Index into the artifact table
    ArtifactRef
);

/// Lookup service consumed by the mutation pipeline.
pub trait ContentResolver {
    fn resolve_item(&self, name: &str) -> Option<ItemRef>;
    fn resolve_equipment(&self, name: &str) -> Option<EquipmentRef>;
    fn resolve_buff(&self, name: &str) -> Option<BuffRef>;
    fn resolve_skill(&self, name: &str) -> Option<SkillRef>;
    fn resolve_artifact(&self, name: &str) -> Option<ArtifactRef>;
}

/// One name table; indices are assigned in registration order
#[derive(Debug, Default, Clone)]
struct NameTable {
    names: Vec<String>,
    index: HashMap<String, u32>,
}

impl NameTable {
    fn register(&mut self, name: &str) -> u32 {
        if let Some(&id) = self.index.get(name) {
            return id;
        }
        let id = self.names.len() as u32;
        self.names.push(name.to_string());
        self.index.insert(name.to_string(), id);
        id
    }

    fn find(&self, name: &str) -> Option<u32> {
        self.index.get(name).copied()
    }

    fn name(&self, id: u32) -> Option<&str> {
        self.names.get(id as usize).map(String::as_str)
    }
}

/// Registered game content, populated once at content-registration time.
#[derive(Resource, Debug, Default, Clone)]
pub struct ContentCatalog {
    items: NameTable,
    equipment: NameTable,
    buffs: NameTable,
    skills: NameTable,
    artifacts: NameTable,
}

impl ContentCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_item(&mut self, name: &str) -> ItemRef {
        ItemRef(self.items.register(name))
    }

    pub fn register_equipment(&mut self, name: &str) -> EquipmentRef {
        EquipmentRef(self.equipment.register(name))
    }

    pub fn register_buff(&mut self, name: &str) -> BuffRef {
        BuffRef(self.buffs.register(name))
    }

    pub fn register_skill(&mut self, name: &str) -> SkillRef {
        SkillRef(self.skills.register(name))
    }

    pub fn register_artifact(&mut self, name: &str) -> ArtifactRef {
        ArtifactRef(self.artifacts.register(name))
    }

    pub fn item_name(&self, item: ItemRef) -> Option<&str> {
        self.items.name(item.0)
    }

    pub fn equipment_name(&self, equipment: EquipmentRef) -> Option<&str> {
        self.equipment.name(equipment.0)
    }

    pub fn skill_name(&self, skill: SkillRef) -> Option<&str> {
        self.skills.name(skill.0)
    }
}

impl ContentResolver for ContentCatalog {
    fn resolve_item(&self, name: &str) -> Option<ItemRef> {
        self.items.find(name).map(ItemRef)
    }

    fn resolve_equipment(&self, name: &str) -> Option<EquipmentRef> {
        self.equipment.find(name).map(EquipmentRef)
    }

    fn resolve_buff(&self, name: &str) -> Option<BuffRef> {
        self.buffs.find(name).map(BuffRef)
    }

    fn resolve_skill(&self, name: &str) -> Option<SkillRef> {
        self.skills.find(name).map(SkillRef)
    }

    fn resolve_artifact(&self, name: &str) -> Option<ArtifactRef> {
        self.artifacts.find(name).map(ArtifactRef)
    }
}

/// Artifacts enabled for the current run
#[derive(Resource, Debug, Default, Clone)]
pub struct RunArtifacts {
    enabled: HashSet<ArtifactRef>,
}

impl RunArtifacts {
    pub fn enable(&mut self, artifact: ArtifactRef) {
        self.enabled.insert(artifact);
    }

    pub fn disable(&mut self, artifact: ArtifactRef) {
        self.enabled.remove(&artifact);
    }

    pub fn is_enabled(&self, artifact: ArtifactRef) -> bool {
        self.enabled.contains(&artifact)
    }
}
