//! Equipment sub-behaviour: lets the AI fire a variant's custom equipment.

use bevy::prelude::*;

use crate::character::AiTarget;
use crate::content::EquipmentRef;
use crate::variant::EquipmentInfo;

/// Attached to a variant body once its custom equipment is granted
#[derive(Component, Debug, Clone, PartialEq)]
pub struct VariantEquipmentHandler {
    pub equipment: EquipmentRef,
    pub max_use_distance: f32,
    pub use_cooldown: f32,
    /// Seconds until the next use is allowed
    pub cooldown: f32,
}

impl VariantEquipmentHandler {
    pub fn new(equipment: EquipmentRef, info: &EquipmentInfo) -> Self {
        Self {
            equipment,
            max_use_distance: info.ai_max_use_distance,
            use_cooldown: info.ai_use_cooldown,
            cooldown: info.ai_use_cooldown,
        }
    }

    /// Advance the cooldown. Returns true when the equipment should fire.
    pub fn tick(&mut self, dt: f32, target_distance: Option<f32>) -> bool {
        self.cooldown = (self.cooldown - dt).max(0.0);
        if self.cooldown > 0.0 {
            return false;
        }
        match target_distance {
            Some(distance) if distance <= self.max_use_distance => {
                self.cooldown = self.use_cooldown;
                true
            }
            _ => false,
        }
    }
}

/// The AI wants to activate its equipment
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct EquipmentUseRequest {
    pub entity: Entity,
    pub equipment: EquipmentRef,
}

pub fn drive_equipment_handlers(
    time: Res<Time>,
    mut handlers: Query<(Entity, &mut VariantEquipmentHandler, Option<&AiTarget>)>,
    mut requests: EventWriter<EquipmentUseRequest>,
) {
    let dt = time.delta_secs();
    for (entity, mut handler, target) in &mut handlers {
        let distance = target.and_then(|t| t.distance);
        if handler.tick(dt, distance) {
            requests.send(EquipmentUseRequest {
                entity,
                equipment: handler.equipment,
            });
        }
    }
}
