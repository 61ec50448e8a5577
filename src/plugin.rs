use bevy::prelude::*;
use tracing::{debug, trace};

use crate::character::body::tick_body_buffs;
use crate::character::CharacterBody;
use crate::config::VarianceConfig;
use crate::content::{ContentCatalog, RunArtifacts};
use crate::handlers::components::spin_models;
use crate::handlers::equipment::drive_equipment_handlers;
use crate::handlers::reward::process_variant_deaths;
use crate::handlers::{
    EquipmentUseRequest, VariantComponentRegistry, VariantDeathEvent, VariantRewardDrop,
};
use crate::pipeline::{apply_pending_variants, Authority, VariantAnnouncement, VariantApplied};
use crate::remap::{run_due_restores, RestoreQueue};
use crate::selection::{roll_variants, VariantRng};
use crate::variant::{VariantHandlers, VariantRegistry, VariantSync};

/// Runtime variants for every spawned character body
#[derive(Default)]
pub struct VariancePlugin {
    pub config: VarianceConfig,
}

impl Plugin for VariancePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(self.config.clone())
            .insert_resource(VariantRng::from_seed(self.config.rng_seed))
            .init_resource::<Authority>()
            .init_resource::<ContentCatalog>()
            .init_resource::<RunArtifacts>()
            .init_resource::<VariantRegistry>()
            .init_resource::<VariantComponentRegistry>()
            .init_resource::<RestoreQueue>()
            .add_event::<VariantAnnouncement>()
            .add_event::<VariantApplied>()
            .add_event::<VariantSyncMessage>()
            .add_event::<EquipmentUseRequest>()
            .add_event::<VariantDeathEvent>()
            .add_event::<VariantRewardDrop>()
            .add_systems(
                Update,
                (
                    attach_variant_handlers,
                    receive_variant_sync.run_if(client_only),
                    roll_variants,
                    apply_pending_variants,
                    run_due_restores,
                    tick_body_buffs,
                    drive_equipment_handlers.run_if(server_only),
                    process_variant_deaths.run_if(server_only),
                )
                    .chain(),
            )
            .add_systems(Update, spin_models);
    }
}

/// Replicated roll outcomes for one body, as received by a client
#[derive(Event, Debug, Clone)]
pub struct VariantSyncMessage {
    pub entity: Entity,
    pub snapshots: Vec<VariantSync>,
}

pub fn server_only(authority: Res<Authority>) -> bool {
    authority.is_authoritative()
}

pub fn client_only(authority: Res<Authority>) -> bool {
    !authority.is_authoritative()
}

/// Give every new body one handler per variant registered for it
pub fn attach_variant_handlers(
    mut commands: Commands,
    registry: Res<VariantRegistry>,
    bodies: Query<(Entity, &CharacterBody), (Added<CharacterBody>, Without<VariantHandlers>)>,
) {
    for (entity, body) in &bodies {
        let variants = registry.variants_for(&body.body_name);
        if variants.is_empty() {
            continue;
        }
        trace!(?entity, body = %body.body_name, count = variants.len(), "Attaching variant handlers");
        commands
            .entity(entity)
            .insert(VariantHandlers::new(variants.iter().cloned()));
    }
}

pub fn receive_variant_sync(
    mut messages: EventReader<VariantSyncMessage>,
    mut bodies: Query<&mut VariantHandlers>,
) {
    for message in messages.read() {
        match bodies.get_mut(message.entity) {
            Ok(mut handlers) => {
                handlers.apply_sync(&message.snapshots);
            }
            Err(_) => debug!(entity = ?message.entity, "Variant sync for unknown body"),
        }
    }
}
