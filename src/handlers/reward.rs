//! Extra rewards for killing a variant: scaled gold/experience and a
//! chance at an item drop.

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::character::DeathRewards;
use crate::selection::VariantRng;

/// Reward tuning; chances are percentages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardDefinition {
    pub gold_multiplier: f32,
    pub experience_multiplier: f32,
    pub white_item_chance: f32,
    pub green_item_chance: f32,
    pub red_item_chance: f32,
}

impl Default for RewardDefinition {
    fn default() -> Self {
        Self {
            gold_multiplier: 1.5,
            experience_multiplier: 1.5,
            white_item_chance: 3.0,
            green_item_chance: 1.0,
            red_item_chance: 0.1,
        }
    }
}

/// Item drop rarity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DropTier {
    White,
    Green,
    Red,
}

impl RewardDefinition {
    /// Roll for a drop, rarest tier first; at most one tier wins
    pub fn roll_drop(&self, rng: &mut impl Rng) -> Option<DropTier> {
        [
            (DropTier::Red, self.red_item_chance),
            (DropTier::Green, self.green_item_chance),
            (DropTier::White, self.white_item_chance),
        ]
        .into_iter()
        .find(|(_, chance)| rng.gen::<f32>() * 100.0 < *chance)
        .map(|(tier, _)| tier)
    }

    pub fn scale(&self, rewards: DeathRewards) -> DeathRewards {
        DeathRewards {
            gold: scale_amount(rewards.gold, self.gold_multiplier),
            experience: scale_amount(rewards.experience, self.experience_multiplier),
        }
    }
}

fn scale_amount(amount: u32, multiplier: f32) -> u32 {
    (amount as f32 * multiplier.max(0.0)).round() as u32
}

/// Reward sub-behaviour on a variant body
#[derive(Component, Debug, Clone)]
pub struct VariantRewardHandler {
    pub reward: RewardDefinition,
}

/// A variant body died; sent by the host's death handling
#[derive(Event, Debug, Clone, Copy)]
pub struct VariantDeathEvent {
    pub entity: Entity,
    pub position: Vec3,
}

/// An item drop earned by killing a variant
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct VariantRewardDrop {
    pub entity: Entity,
    pub position: Vec3,
    pub tier: DropTier,
}

/// Attach the reward handler and scale the body's death rewards.
///
/// Returns false if a handler is already present; rewards are scaled once.
pub fn attach_reward_handler(world: &mut World, body: Entity, reward: RewardDefinition) -> bool {
    if !world.entities().contains(body) || world.get::<VariantRewardHandler>(body).is_some() {
        return false;
    }
    if let Some(mut rewards) = world.get_mut::<DeathRewards>(body) {
        *rewards = reward.scale(*rewards);
    }
    world.entity_mut(body).insert(VariantRewardHandler { reward });
    true
}

pub fn process_variant_deaths(
    mut deaths: EventReader<VariantDeathEvent>,
    handlers: Query<&VariantRewardHandler>,
    mut rng: ResMut<VariantRng>,
    mut drops: EventWriter<VariantRewardDrop>,
) {
    for death in deaths.read() {
        let Ok(handler) = handlers.get(death.entity) else {
            continue;
        };
        if let Some(tier) = handler.reward.roll_drop(&mut rng.0) {
            debug!(entity = ?death.entity, ?tier, "Variant dropped an item");
            drops.send(VariantRewardDrop {
                entity: death.entity,
                position: death.position,
                tier,
            });
        }
    }
}
