//! The variant mutation pipeline.
//!
//! `apply_variant` runs a fixed sequence of steps against one body. Every
//! step fails soft: a missing reference or part is recorded as a
//! [`Diagnostic`], logged, and skipped. Nothing here returns an error.
//!
//! Order matters. Stats are final before health is reset, the mesh swap
//! precedes the bone remap, and the remap precedes the equipment restore.

use bevy::prelude::*;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::config::VarianceConfig;
use crate::content::{ContentCatalog, ContentResolver};
use crate::handlers::VariantComponentRegistry;
use crate::logging::variant_span;
use crate::variant::{CharacterLinks, VariantHandlers};

mod behavior;
mod inventory;
mod skills;
mod stats;
mod visuals;

/// Which side of the simulation this app is
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Authority {
    #[default]
    Server,
    Client,
}

impl Authority {
    pub fn is_authoritative(self) -> bool {
        self == Authority::Server
    }
}

/// User-visible arrival message for a rare variant
#[derive(Event, Debug, Clone, PartialEq)]
pub struct VariantAnnouncement {
    pub entity: Entity,
    pub message: String,
}

/// Sent after a variant has been applied to a body
#[derive(Event, Debug, Clone)]
pub struct VariantApplied {
    pub entity: Entity,
    pub report: VariantReport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineStep {
    Uniqueness,
    Announcement,
    Stats,
    Inventory,
    Equipment,
    Model,
    Skills,
    ExtraComponents,
    Name,
    DeathState,
    Buffs,
    Size,
    Finalize,
    AiModifiers,
    Rewards,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// A referenced item, buff, skill, component or body part was not found
    ResolutionFailure,
    /// The definition contradicts itself; the whole step was skipped
    DataInconsistency,
    /// A feature that is not supported; degraded or skipped
    UnsupportedConfiguration,
    /// A suspicious value that was used anyway
    ParameterSanity,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub step: PipelineStep,
    pub kind: DiagnosticKind,
    pub message: String,
}

/// What one pipeline run did
#[derive(Debug, Clone, Default)]
pub struct VariantReport {
    pub identifier: String,
    pub steps: Vec<PipelineStep>,
    pub diagnostics: Vec<Diagnostic>,
}

impl VariantReport {
    pub fn new(identifier: &str) -> Self {
        Self {
            identifier: identifier.to_string(),
            ..Default::default()
        }
    }

    /// True when the pipeline ran at all
    pub fn applied(&self) -> bool {
        !self.steps.is_empty()
    }

    pub fn ran(&self, step: PipelineStep) -> bool {
        self.steps.contains(&step)
    }

    pub fn diagnostics_for(&self, step: PipelineStep) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.step == step)
    }

    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.diagnostics.iter().filter(|d| d.kind == kind).count()
    }

    fn enter(&mut self, step: PipelineStep) {
        self.steps.push(step);
    }

    fn record(&mut self, step: PipelineStep, kind: DiagnosticKind, message: String) {
        match kind {
            DiagnosticKind::DataInconsistency => error!(?step, "{message}"),
            _ => warn!(?step, "{message}"),
        }
        self.diagnostics.push(Diagnostic {
            step,
            kind,
            message,
        });
    }
}

/// Services and settings a pipeline run reads
#[derive(Clone, Copy)]
pub struct VariantContext<'a> {
    pub authority: Authority,
    pub resolver: &'a dyn ContentResolver,
    pub components: &'a VariantComponentRegistry,
    pub config: &'a VarianceConfig,
}

/// Apply the selected handler `identifier` to `body`.
///
/// A no-op on the non-authoritative side, and for handlers that are
/// missing, unselected, or already applied.
pub fn apply_variant(
    world: &mut World,
    body: Entity,
    identifier: &str,
    ctx: &VariantContext,
) -> VariantReport {
    let mut report = VariantReport::new(identifier);
    if !ctx.authority.is_authoritative() {
        return report;
    }

    let definition = world.get_mut::<VariantHandlers>(body).and_then(|mut handlers| {
        let handler = handlers.find_mut(identifier).filter(|h| h.is_pending())?;
        handler.applied = true;
        Some(Arc::clone(&handler.definition))
    });
    let Some(definition) = definition else {
        debug!(?body, variant = identifier, "No pending handler, nothing to apply");
        return report;
    };

    let _span = variant_span(identifier, body).entered();
    info!("Applying variant");
    let links = CharacterLinks::resolve(world, body);
    let def = definition.as_ref();

    behavior::enforce_uniqueness(world, &links, def, &mut report);
    behavior::announce_arrival(world, &links, def, &mut report);
    stats::modify_stats(world, &links, def, &mut report);
    inventory::grant_items(world, &links, def, ctx, &mut report);
    inventory::grant_equipment(world, &links, def, ctx, &mut report);
    visuals::modify_model(world, &links, def, &mut report);
    skills::replace_skills(world, &links, def, ctx, &mut report);
    visuals::add_extra_components(world, &links, def, ctx, &mut report);
    behavior::override_name(world, &links, def, &mut report);
    behavior::override_death_state(world, &links, def, &mut report);
    stats::add_buffs(world, &links, def, ctx, &mut report);
    stats::scale_size(world, &links, def, &mut report);
    stats::finalize(world, &links, &mut report);
    behavior::modify_ai(world, &links, def, &mut report);
    behavior::attach_rewards(world, &links, def, ctx, &mut report);

    info!(
        diagnostics = report.diagnostics.len(),
        "Variant applied"
    );
    report
}

/// Exclusive system: apply every selected, unapplied handler.
///
/// Unique handlers on a body go first so their uniqueness step removes
/// the siblings before those get a chance to apply.
pub fn apply_pending_variants(world: &mut World) {
    let authority = world.get_resource::<Authority>().copied().unwrap_or_default();
    if !authority.is_authoritative() {
        return;
    }

    let mut work = Vec::new();
    let mut bodies = world.query::<(Entity, &VariantHandlers)>();
    for (entity, handlers) in bodies.iter(world) {
        for identifier in handlers.pending_in_order() {
            work.push((entity, identifier));
        }
    }
    if work.is_empty() {
        return;
    }

    let config = world.get_resource::<VarianceConfig>().cloned().unwrap_or_default();
    let components = world
        .get_resource::<VariantComponentRegistry>()
        .cloned()
        .unwrap_or_default();

    world.init_resource::<ContentCatalog>();
    world.resource_scope(|world, catalog: Mut<ContentCatalog>| {
        let ctx = VariantContext {
            authority,
            resolver: &*catalog,
            components: &components,
            config: &config,
        };
        for (entity, identifier) in work {
            let report = apply_variant(world, entity, &identifier, &ctx);
            if report.applied() {
                world.send_event(VariantApplied { entity, report });
            }
        }
    });
}
