//! Character body: base stats, derived stats, health and buffs.

use bevy::prelude::*;

use crate::content::BuffRef;

/// A buff currently applied to a body
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveBuff {
    pub buff: BuffRef,
    pub stacks: u32,
    /// Seconds remaining; `None` for permanent buffs
    pub remaining: Option<f32>,
}

/// Body component: everything the stat step and finalization touch.
///
/// `base_*` and `level_*` values are authored; the un-prefixed values are
/// derived by [`CharacterBody::recalculate_stats`].
#[derive(Component, Debug, Clone)]
pub struct CharacterBody {
    pub body_name: String,
    pub base_name_token: String,
    pub level: u32,

    pub base_max_health: f32,
    pub level_max_health: f32,
    pub base_move_speed: f32,
    pub base_attack_speed: f32,
    pub base_damage: f32,
    pub level_damage: f32,
    pub base_armor: f32,
    pub level_armor: f32,

    pub max_health: f32,
    pub move_speed: f32,
    pub attack_speed: f32,
    pub damage: f32,
    pub armor: f32,
    pub health: f32,

    pub buffs: Vec<ActiveBuff>,
}

impl CharacterBody {
    pub fn new(body_name: &str, name_token: &str) -> Self {
        let mut body = Self {
            body_name: body_name.to_string(),
            base_name_token: name_token.to_string(),
            level: 1,
            base_max_health: 100.0,
            level_max_health: 30.0,
            base_move_speed: 7.0,
            base_attack_speed: 1.0,
            base_damage: 12.0,
            level_damage: 2.4,
            base_armor: 0.0,
            level_armor: 0.0,
            max_health: 0.0,
            move_speed: 0.0,
            attack_speed: 0.0,
            damage: 0.0,
            armor: 0.0,
            health: 0.0,
            buffs: Vec::new(),
        };
        body.recalculate_stats();
        body.health = body.max_health;
        body
    }

    /// Display name shown to players
    pub fn display_name(&self) -> &str {
        &self.base_name_token
    }

    /// Recompute derived stats from base and per-level values
    pub fn recalculate_stats(&mut self) {
        let levels = self.level.saturating_sub(1) as f32;
        self.max_health = self.base_max_health + self.level_max_health * levels;
        self.damage = self.base_damage + self.level_damage * levels;
        self.armor = self.base_armor + self.level_armor * levels;
        self.move_speed = self.base_move_speed;
        self.attack_speed = self.base_attack_speed;
        self.health = self.health.min(self.max_health);
    }

    /// Add one permanent stack of a buff
    pub fn add_buff(&mut self, buff: BuffRef) {
        if let Some(existing) = self
            .buffs
            .iter_mut()
            .find(|b| b.buff == buff && b.remaining.is_none())
        {
            existing.stacks += 1;
        } else {
            self.buffs.push(ActiveBuff {
                buff,
                stacks: 1,
                remaining: None,
            });
        }
    }

    /// Add a timed buff; zero stacks counts as one
    pub fn add_timed_buff(&mut self, buff: BuffRef, duration: f32, stacks: u32) {
        self.buffs.push(ActiveBuff {
            buff,
            stacks: stacks.max(1),
            remaining: Some(duration),
        });
    }

    /// Total stacks of a buff across permanent and timed entries
    pub fn buff_count(&self, buff: BuffRef) -> u32 {
        self.buffs
            .iter()
            .filter(|b| b.buff == buff)
            .map(|b| b.stacks)
            .sum()
    }

    /// Advance timed buffs and drop the expired ones
    pub fn tick_buffs(&mut self, dt: f32) {
        for buff in &mut self.buffs {
            if let Some(remaining) = buff.remaining.as_mut() {
                *remaining -= dt;
            }
        }
        self.buffs
            .retain(|b| b.remaining.map_or(true, |remaining| remaining > 0.0));
    }
}

/// System: expire timed buffs on every body
pub fn tick_body_buffs(time: Res<Time>, mut bodies: Query<&mut CharacterBody>) {
    let dt = time.delta_secs();
    for mut body in &mut bodies {
        if body.buffs.iter().any(|b| b.remaining.is_some()) {
            body.tick_buffs(dt);
        }
    }
}
