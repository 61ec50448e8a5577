//! Variant definitions: the immutable recipe applied to a selected entity.
//!
//! Definitions are authored as RON data assets. Every field has a default so
//! an asset only needs to spell out what it changes.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::character::{AiSkillDriver, SkillSlot};
use crate::handlers::components::VariantComponentRegistry;
use crate::handlers::reward::RewardDefinition;
use crate::remap::MeshTopology;

/// Rarity classification; gates the marker item and arrival announcements
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum VariantTier {
    #[default]
    Common,
    Uncommon,
    Rare,
    Legendary,
}

/// AI behaviour modifiers, each a pure transform of one skill driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AiModifier {
    /// Drop every health-fraction gate on target and self
    Unstable,
    /// Sprint while using every skill
    ForceSprint,
}

impl AiModifier {
    pub fn apply(self, driver: AiSkillDriver) -> AiSkillDriver {
        match self {
            AiModifier::Unstable => AiSkillDriver {
                min_target_health_fraction: f32::NEG_INFINITY,
                max_target_health_fraction: f32::INFINITY,
                min_user_health_fraction: f32::NEG_INFINITY,
                max_user_health_fraction: f32::INFINITY,
                ..driver
            },
            AiModifier::ForceSprint => AiSkillDriver {
                should_sprint: true,
                ..driver
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialReplacement {
    pub renderer_index: usize,
    pub material: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightReplacement {
    pub renderer_index: usize,
    /// sRGBA, 0.0 - 1.0 per channel
    pub color: [f32; 4],
}

impl LightReplacement {
    pub fn color(&self) -> Color {
        let [r, g, b, a] = self.color;
        Color::srgba(r, g, b, a)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshReplacement {
    pub renderer_index: usize,
    pub mesh: String,
    #[serde(default)]
    pub topology: MeshTopology,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillReplacement {
    pub slot: SkillSlot,
    pub skill: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NameOverrideKind {
    Prefix,
    Suffix,
    Replace,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NameOverride {
    pub kind: NameOverrideKind,
    pub text: String,
}

impl NameOverride {
    pub fn apply(&self, name: &str) -> String {
        match self.kind {
            NameOverrideKind::Prefix => format!("{} {}", self.text, name),
            NameOverrideKind::Suffix => format!("{} {}", name, self.text),
            NameOverrideKind::Replace => self.text.clone(),
        }
    }
}

/// Behaviour component added to the model. Only aesthetic ones are applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtraComponent {
    pub component: String,
    pub aesthetic: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeModifier {
    pub new_size: f32,
    pub scale_collider: bool,
}

/// Parallel item / count arrays. Mismatched lengths void the whole grant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VariantInventory {
    pub items: Vec<String>,
    pub counts: Vec<i32>,
}

impl VariantInventory {
    pub fn is_consistent(&self) -> bool {
        self.items.len() == self.counts.len()
    }
}

/// Equipment granted to the variant, plus how its AI should fire it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentInfo {
    pub equipment: String,
    #[serde(default = "default_use_distance")]
    pub ai_max_use_distance: f32,
    #[serde(default = "default_use_cooldown")]
    pub ai_use_cooldown: f32,
}

fn default_use_distance() -> f32 {
    60.0
}

fn default_use_cooldown() -> f32 {
    10.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantBuff {
    pub buff: String,
    #[serde(default)]
    pub timed: bool,
    #[serde(default)]
    pub duration: f32,
    #[serde(default)]
    pub stacks: u32,
}

/// One variant recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VariantDefinition {
    pub identifier: String,
    /// Body this variant can spawn on
    pub body_name: String,
    pub arrival_message: String,
    pub tier: VariantTier,
    pub unique: bool,
    pub gives_rewards: bool,
    /// Percent chance, 0 - 100
    pub spawn_rate: f32,

    pub health_multiplier: f32,
    pub move_speed_multiplier: f32,
    pub attack_speed_multiplier: f32,
    pub damage_multiplier: f32,
    pub armor_multiplier: f32,
    pub armor_bonus: f32,

    pub ai_modifiers: Vec<AiModifier>,

    pub material_replacements: Vec<MaterialReplacement>,
    pub light_replacements: Vec<LightReplacement>,
    pub mesh_replacements: Vec<MeshReplacement>,
    pub skill_replacements: Vec<SkillReplacement>,
    pub name_overrides: Vec<NameOverride>,
    pub extra_components: Vec<ExtraComponent>,
    pub size_modifier: Option<SizeModifier>,

    pub inventory: Option<VariantInventory>,
    pub custom_equipment: Option<EquipmentInfo>,
    pub custom_rewards: Option<RewardDefinition>,
    pub buffs: Vec<VariantBuff>,
    pub custom_death_state: Option<String>,
}

impl Default for VariantDefinition {
    fn default() -> Self {
        Self {
            identifier: String::new(),
            body_name: String::new(),
            arrival_message: String::new(),
            tier: VariantTier::Common,
            unique: false,
            gives_rewards: true,
            spawn_rate: 1.0,
            health_multiplier: 1.0,
            move_speed_multiplier: 1.0,
            attack_speed_multiplier: 1.0,
            damage_multiplier: 1.0,
            armor_multiplier: 1.0,
            armor_bonus: 0.0,
            ai_modifiers: Vec::new(),
            material_replacements: Vec::new(),
            light_replacements: Vec::new(),
            mesh_replacements: Vec::new(),
            skill_replacements: Vec::new(),
            name_overrides: Vec::new(),
            extra_components: Vec::new(),
            size_modifier: None,
            inventory: None,
            custom_equipment: None,
            custom_rewards: None,
            buffs: Vec::new(),
            custom_death_state: None,
        }
    }
}

/// Problem found while validating a definition
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DefinitionIssue {
    #[error("identifier is empty")]
    EmptyIdentifier,
    #[error("body name is empty")]
    EmptyBodyName,
    #[error("aesthetic component {0:?} is not registered")]
    UnknownComponent(String),
    #[error("{stat} multiplier is negative ({value}); here be dragons")]
    NegativeMultiplier { stat: &'static str, value: f32 },
    #[error("spawn rate {0} is outside 0-100 and will be clamped")]
    SpawnRateOutOfRange(f32),
    #[error("inventory has {items} items but {counts} counts; no items will be granted")]
    InventoryLengthMismatch { items: usize, counts: usize },
    #[error("component {0:?} is not aesthetic; non-aesthetic components are not supported")]
    NonAestheticComponent(String),
    #[error("skill replacement #{0} targets slot None")]
    SkillSlotNone(usize),
    #[error("tier is Rare or above but no arrival message is set")]
    MissingArrivalMessage,
}

impl DefinitionIssue {
    /// Errors reject the definition at registration; the rest are logged
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            DefinitionIssue::EmptyIdentifier
                | DefinitionIssue::EmptyBodyName
                | DefinitionIssue::UnknownComponent(_)
        )
    }
}

impl VariantDefinition {
    pub fn new(identifier: &str, body_name: &str) -> Self {
        Self {
            identifier: identifier.to_string(),
            body_name: body_name.to_string(),
            ..Default::default()
        }
    }

    /// Stat multipliers in the order the stat step applies them
    pub fn multipliers(&self) -> [(&'static str, f32); 5] {
        [
            ("health", self.health_multiplier),
            ("move speed", self.move_speed_multiplier),
            ("attack speed", self.attack_speed_multiplier),
            ("damage", self.damage_multiplier),
            ("armor", self.armor_multiplier),
        ]
    }

    pub fn validate(&self, components: &VariantComponentRegistry) -> Vec<DefinitionIssue> {
        let mut issues = Vec::new();

        if self.identifier.trim().is_empty() {
            issues.push(DefinitionIssue::EmptyIdentifier);
        }
        if self.body_name.trim().is_empty() {
            issues.push(DefinitionIssue::EmptyBodyName);
        }
        for (stat, value) in self.multipliers() {
            if value < 0.0 {
                issues.push(DefinitionIssue::NegativeMultiplier { stat, value });
            }
        }
        if !(0.0..=100.0).contains(&self.spawn_rate) {
            issues.push(DefinitionIssue::SpawnRateOutOfRange(self.spawn_rate));
        }
        if let Some(inventory) = &self.inventory {
            if !inventory.is_consistent() {
                issues.push(DefinitionIssue::InventoryLengthMismatch {
                    items: inventory.items.len(),
                    counts: inventory.counts.len(),
                });
            }
        }
        for extra in &self.extra_components {
            if !extra.aesthetic {
                issues.push(DefinitionIssue::NonAestheticComponent(extra.component.clone()));
            } else if !components.contains(&extra.component) {
                issues.push(DefinitionIssue::UnknownComponent(extra.component.clone()));
            }
        }
        for (i, replacement) in self.skill_replacements.iter().enumerate() {
            if replacement.slot == SkillSlot::None {
                issues.push(DefinitionIssue::SkillSlotNone(i));
            }
        }
        if self.tier >= VariantTier::Rare && self.arrival_message.is_empty() {
            issues.push(DefinitionIssue::MissingArrivalMessage);
        }

        issues
    }
}
