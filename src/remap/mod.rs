//! Skeleton remapping for mesh swaps onto rigs whose bone order differs
//! from the base skeleton.
//!
//! A remap detaches the equipment and display rules first; they come back
//! through a deferred restore once the attachment system has settled. The
//! restore is keyed by entity id and re-resolved when it fires, so a body
//! despawned in the meantime simply drops out.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::character::{Bone, CharacterModel, DisplayRuleSet, Inventory, Skeleton};
use crate::constants::{BEETLE_BONE_SWAPS, MINI_MUSHRUM_TRAILING_BONES};
use crate::content::EquipmentRef;
use crate::variant::{CharacterLinks, VariantHandlers};

/// Rig family of a replacement mesh
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeshTopology {
    /// Same rig as the base body; no remap needed
    #[default]
    Default,
    Beetle,
    BeetleGuard,
    MiniMushrum,
    MagmaWorm,
    OverloadingWorm,
}

/// Result of remapping one skeleton for one topology
#[derive(Debug, Clone, PartialEq)]
pub enum RemapOutcome {
    NotRequired,
    Remapped(Vec<Bone>),
    Unsupported,
}

impl MeshTopology {
    /// Name fragments whose transforms are not bones of the rig
    pub fn exclusions(self) -> &'static [&'static str] {
        match self {
            MeshTopology::Beetle => &["Hurtbox", "BeetleBody", "Mesh", "mdl"],
            MeshTopology::MiniMushrum => &["Hurtbox", "IK", "_end", "miniMush_R_Palps_02"],
            _ => &[],
        }
    }

    /// Build the bone list for a skinned renderer from the full skeleton
    pub fn remap(self, skeleton: &[Bone]) -> RemapOutcome {
        match self {
            MeshTopology::Default => RemapOutcome::NotRequired,
            MeshTopology::Beetle => {
                let mut bones = filter_bones(skeleton, self.exclusions());
                let needed = BEETLE_BONE_SWAPS
                    .iter()
                    .map(|&(a, b)| a.max(b) + 1)
                    .max()
                    .unwrap_or(0);
                if bones.len() < needed {
                    return RemapOutcome::Unsupported;
                }
                for (a, b) in BEETLE_BONE_SWAPS {
                    bones.swap(a, b);
                }
                RemapOutcome::Remapped(bones)
            }
            MeshTopology::MiniMushrum => {
                let mut bones = filter_bones(skeleton, self.exclusions());
                if bones.len() <= MINI_MUSHRUM_TRAILING_BONES {
                    return RemapOutcome::Unsupported;
                }
                bones.truncate(bones.len() - MINI_MUSHRUM_TRAILING_BONES);
                RemapOutcome::Remapped(bones)
            }
            MeshTopology::BeetleGuard | MeshTopology::MagmaWorm | MeshTopology::OverloadingWorm => {
                RemapOutcome::Unsupported
            }
        }
    }
}

/// Keep bones whose names contain none of the excluded fragments
pub fn filter_bones(bones: &[Bone], exclusions: &[&str]) -> Vec<Bone> {
    bones
        .iter()
        .filter(|bone| !exclusions.iter().any(|ex| bone.name.contains(ex)))
        .cloned()
        .collect()
}

/// Remap the model's skeleton and bind the result to every skinned renderer.
///
/// Missing model components count as unsupported.
pub fn remap_model(world: &mut World, model: Entity, topology: MeshTopology) -> RemapOutcome {
    let Some(skeleton) = world.get::<Skeleton>(model) else {
        return RemapOutcome::Unsupported;
    };
    let outcome = topology.remap(&skeleton.transforms);
    if let RemapOutcome::Remapped(bones) = &outcome {
        let Some(mut character_model) = world.get_mut::<CharacterModel>(model) else {
            return RemapOutcome::Unsupported;
        };
        for skinned in character_model.skinned_renderers_mut() {
            skinned.bones = bones.clone();
        }
    }
    outcome
}

/// Equipment and display rules detached for the duration of a remap
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SavedEquipment {
    pub equipment: Option<EquipmentRef>,
    pub display_rules: Option<DisplayRuleSet>,
}

/// Detach the equipment and display rules, returning what was there
pub fn capture_equipment(world: &mut World, links: &CharacterLinks) -> SavedEquipment {
    let mut saved = SavedEquipment::default();
    if let Some(mut inventory) = links.master.and_then(|m| world.get_mut::<Inventory>(m)) {
        saved.equipment = inventory.equipment();
        inventory.set_equipment(None);
    }
    if let Some(mut model) = links.model.and_then(|m| world.get_mut::<CharacterModel>(m)) {
        saved.display_rules = model.item_display_rule_set.take();
    }
    saved
}

/// Put captured equipment and display rules back on whatever still exists
pub fn restore_equipment(world: &mut World, links: &CharacterLinks, saved: SavedEquipment) {
    if let Some(mut model) = links.model.and_then(|m| world.get_mut::<CharacterModel>(m)) {
        if saved.display_rules.is_some() {
            model.item_display_rule_set = saved.display_rules;
        }
    }
    if let Some(mut inventory) = links.master.and_then(|m| world.get_mut::<Inventory>(m)) {
        inventory.set_equipment(saved.equipment);
    }
}

/// A scheduled restore for one variant on one body
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRestore {
    pub entity: Entity,
    pub variant: String,
    /// Game time (elapsed seconds) at which the restore becomes due
    pub due_at: f32,
}

/// One-shot delayed restores, keyed to elapsed game time.
///
/// Entries are due `delay` seconds after the elapsed time they were
/// scheduled at. The frame delta that preceded the scheduling frame never
/// counts towards the delay.
#[derive(Resource, Debug, Default)]
pub struct RestoreQueue {
    pending: Vec<PendingRestore>,
}

impl RestoreQueue {
    pub fn schedule(&mut self, entity: Entity, variant: &str, now: f32, delay: f32) {
        self.pending.push(PendingRestore {
            entity,
            variant: variant.to_string(),
            due_at: now + delay,
        });
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Remove and return the restores that are due at `now`
    pub fn take_due(&mut self, now: f32) -> Vec<PendingRestore> {
        let (due, waiting) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|r| now >= r.due_at);
        self.pending = waiting;
        due
    }
}

/// Elapsed game time in seconds; zero before a clock exists
pub fn elapsed_secs(world: &World) -> f32 {
    world
        .get_resource::<Time>()
        .map_or(0.0, |time| time.elapsed_secs())
}

/// Take the saved state off a handler and restore it.
///
/// No-op when the body, the handler or the saved state is gone; the saved
/// state is taken, so at most one restore ever happens per capture.
pub fn restore_variant(world: &mut World, body: Entity, variant: &str) -> bool {
    if !world.entities().contains(body) {
        debug!(?body, variant, "Body despawned before its equipment restore");
        return false;
    }
    let saved = world
        .get_mut::<VariantHandlers>(body)
        .and_then(|mut handlers| handlers.find_mut(variant).and_then(|h| h.saved.take()));
    let Some(saved) = saved else {
        return false;
    };
    let links = CharacterLinks::resolve(world, body);
    restore_equipment(world, &links, saved);
    debug!(?body, variant, "Restored equipment after remap");
    true
}

/// Exclusive system: fire the restores whose delay has elapsed
pub fn run_due_restores(world: &mut World) {
    let now = elapsed_secs(world);
    let Some(mut queue) = world.get_resource_mut::<RestoreQueue>() else {
        return;
    };
    let due = queue.take_due(now);
    for restore in due {
        restore_variant(world, restore.entity, &restore.variant);
    }
}
