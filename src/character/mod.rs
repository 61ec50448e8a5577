//! Character entities the variant pipeline mutates.
//!
//! A character is three entities:
//! - body: `CharacterBody`, `SkillLocator`, `CharacterMotor`, `DeathBehavior`,
//!   `DeathRewards`, plus links to the other two
//! - master: `Inventory`, `AiSkillDrivers`
//! - model: `CharacterModel`, `Skeleton`, `Transform`
//!
//! Any of the optional parts may be missing; the pipeline skips what it
//! cannot find.

use bevy::prelude::*;

pub mod body;
pub mod master;
pub mod model;
pub mod skills;

pub use body::{ActiveBuff, CharacterBody};
pub use master::{AiSkillDriver, AiSkillDrivers, Inventory, ItemStack, PreventRecursion};
pub use model::{
    Bone, CharacterModel, CharacterMotor, DisplayRuleSet, LightInfo, Renderer, RendererInfo,
    Skeleton, SkinnedMesh,
};
pub use skills::{GenericSkill, SkillLocator, SkillOverridePriority, SkillSlot};

use crate::content::{EquipmentRef, SkillRef};

/// Body → master entity
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct MasterLink(pub Entity);

/// Body → model entity
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModelLocator {
    pub model: Option<Entity>,
}

/// Entity state entered when the body dies
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct DeathBehavior {
    pub death_state: String,
}

/// Rewards paid out when the body dies
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeathRewards {
    pub gold: u32,
    pub experience: u32,
}

/// Distance to the AI's current target, written by the host AI
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct AiTarget {
    pub distance: Option<f32>,
}

/// Everything needed to spawn a character's three entities
#[derive(Debug, Clone)]
pub struct CharacterPrefab {
    pub body: CharacterBody,
    pub renderers: Vec<RendererInfo>,
    pub lights: Vec<LightInfo>,
    pub bones: Vec<Bone>,
    pub display_rule_set: Option<DisplayRuleSet>,
    pub ai_drivers: Vec<AiSkillDriver>,
    pub skills: [Option<SkillRef>; 4],
    pub equipment: Option<EquipmentRef>,
    pub death_state: String,
    pub rewards: DeathRewards,
    pub motor: CharacterMotor,
}

impl CharacterPrefab {
    pub fn new(body_name: &str, name_token: &str) -> Self {
        Self {
            body: CharacterBody::new(body_name, name_token),
            renderers: Vec::new(),
            lights: Vec::new(),
            bones: Vec::new(),
            display_rule_set: None,
            ai_drivers: Vec::new(),
            skills: [None; 4],
            equipment: None,
            death_state: "GenericCharacterDeath".to_string(),
            rewards: DeathRewards {
                gold: 10,
                experience: 10,
            },
            motor: CharacterMotor::default(),
        }
    }
}

/// Handles to a spawned character
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharacterEntities {
    pub body: Entity,
    pub master: Entity,
    pub model: Entity,
}

/// Spawn the master, model and body entities for a prefab
pub fn spawn_character(world: &mut World, prefab: &CharacterPrefab) -> CharacterEntities {
    let mut inventory = Inventory::default();
    inventory.set_equipment(prefab.equipment);
    let master = world
        .spawn((inventory, AiSkillDrivers(prefab.ai_drivers.clone())))
        .id();

    let model = world
        .spawn((
            CharacterModel {
                base_renderer_infos: prefab.renderers.clone(),
                base_light_infos: prefab.lights.clone(),
                item_display_rule_set: prefab.display_rule_set.clone(),
            },
            Skeleton {
                transforms: prefab.bones.clone(),
            },
            Transform::default(),
        ))
        .id();

    let [primary, secondary, utility, special] = prefab.skills;
    let body = world
        .spawn((
            prefab.body.clone(),
            MasterLink(master),
            ModelLocator { model: Some(model) },
            SkillLocator {
                primary: primary.map(GenericSkill::new),
                secondary: secondary.map(GenericSkill::new),
                utility: utility.map(GenericSkill::new),
                special: special.map(GenericSkill::new),
            },
            prefab.motor,
            DeathBehavior {
                death_state: prefab.death_state.clone(),
            },
            prefab.rewards,
        ))
        .id();

    CharacterEntities {
        body,
        master,
        model,
    }
}
