//! Per-entity variant state.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::character::{MasterLink, ModelLocator};
use crate::remap::SavedEquipment;

use super::VariantDefinition;

/// One candidate variant on one body
#[derive(Debug, Clone)]
pub struct VariantHandler {
    pub definition: Arc<VariantDefinition>,
    /// Replicated roll outcome
    pub is_variant: bool,
    pub rolled: bool,
    pub applied: bool,
    /// Equipment detached by a skeleton remap, awaiting restore
    pub saved: Option<SavedEquipment>,
}

impl VariantHandler {
    pub fn new(definition: Arc<VariantDefinition>) -> Self {
        Self {
            definition,
            is_variant: false,
            rolled: false,
            applied: false,
            saved: None,
        }
    }

    pub fn identifier(&self) -> &str {
        &self.definition.identifier
    }

    /// Selected but not yet applied
    pub fn is_pending(&self) -> bool {
        self.is_variant && !self.applied
    }

    pub fn sync(&self) -> VariantSync {
        VariantSync {
            identifier: self.definition.identifier.clone(),
            is_variant: self.is_variant,
        }
    }

    /// Adopt a replicated roll. Returns false for another variant's snapshot.
    pub fn apply_sync(&mut self, sync: &VariantSync) -> bool {
        if sync.identifier != self.definition.identifier {
            return false;
        }
        self.is_variant = sync.is_variant;
        self.rolled = true;
        true
    }
}

/// Replicated snapshot of one handler's roll
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantSync {
    pub identifier: String,
    pub is_variant: bool,
}

/// Every variant handler attached to a body
#[derive(Component, Debug, Clone, Default)]
pub struct VariantHandlers {
    pub handlers: Vec<VariantHandler>,
}

impl VariantHandlers {
    pub fn new(definitions: impl IntoIterator<Item = Arc<VariantDefinition>>) -> Self {
        Self {
            handlers: definitions.into_iter().map(VariantHandler::new).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &VariantHandler> {
        self.handlers.iter()
    }

    pub fn find(&self, identifier: &str) -> Option<&VariantHandler> {
        self.handlers.iter().find(|h| h.identifier() == identifier)
    }

    pub fn find_mut(&mut self, identifier: &str) -> Option<&mut VariantHandler> {
        self.handlers.iter_mut().find(|h| h.identifier() == identifier)
    }

    /// Drop every handler except `identifier`; returns how many were removed
    pub fn retain_only(&mut self, identifier: &str) -> usize {
        let before = self.handlers.len();
        let mut kept = false;
        self.handlers.retain(|h| {
            let keep = !kept && h.identifier() == identifier;
            kept |= keep;
            keep
        });
        before - self.handlers.len()
    }

    /// Identifiers of selected, unapplied handlers; unique ones first
    pub fn pending_in_order(&self) -> Vec<String> {
        let mut pending: Vec<&VariantHandler> =
            self.handlers.iter().filter(|h| h.is_pending()).collect();
        pending.sort_by_key(|h| !h.definition.unique);
        pending
            .into_iter()
            .map(|h| h.identifier().to_string())
            .collect()
    }

    pub fn sync(&self) -> Vec<VariantSync> {
        self.handlers.iter().map(VariantHandler::sync).collect()
    }

    /// Apply replicated snapshots; returns how many matched a handler
    pub fn apply_sync(&mut self, snapshots: &[VariantSync]) -> usize {
        snapshots
            .iter()
            .filter(|sync| {
                self.find_mut(&sync.identifier)
                    .is_some_and(|handler| handler.apply_sync(sync))
            })
            .count()
    }
}

/// Entities making up one character, resolved from its body.
///
/// Links to despawned entities resolve to `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharacterLinks {
    pub body: Entity,
    pub master: Option<Entity>,
    pub model: Option<Entity>,
}

impl CharacterLinks {
    pub fn resolve(world: &World, body: Entity) -> Self {
        let alive = |e: Entity| world.entities().contains(e).then_some(e);
        Self {
            body,
            master: world.get::<MasterLink>(body).and_then(|l| alive(l.0)),
            model: world
                .get::<ModelLocator>(body)
                .and_then(|l| l.model)
                .and_then(alive),
        }
    }
}
