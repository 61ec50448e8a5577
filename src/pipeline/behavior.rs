use bevy::prelude::*;
use tracing::{debug, info};

use crate::character::{AiSkillDrivers, CharacterBody, DeathBehavior};
use crate::handlers::reward::attach_reward_handler;
use crate::variant::{CharacterLinks, VariantDefinition, VariantHandlers, VariantTier};

use super::{DiagnosticKind, PipelineStep, VariantAnnouncement, VariantContext, VariantReport};

pub(super) fn enforce_uniqueness(
    world: &mut World,
    links: &CharacterLinks,
    def: &VariantDefinition,
    report: &mut VariantReport,
) {
    report.enter(PipelineStep::Uniqueness);
    if !def.unique {
        return;
    }
    if let Some(mut handlers) = world.get_mut::<VariantHandlers>(links.body) {
        let removed = handlers.retain_only(&def.identifier);
        if removed > 0 {
            info!(removed, "Unique variant, removed sibling handlers");
        }
    }
}

pub(super) fn announce_arrival(
    world: &mut World,
    links: &CharacterLinks,
    def: &VariantDefinition,
    report: &mut VariantReport,
) {
    report.enter(PipelineStep::Announcement);
    if def.tier < VariantTier::Rare {
        return;
    }
    let message = if def.arrival_message.is_empty() {
        let name = world
            .get::<CharacterBody>(links.body)
            .map_or_else(|| def.body_name.clone(), |b| b.display_name().to_string());
        report.record(
            PipelineStep::Announcement,
            DiagnosticKind::ParameterSanity,
            "Rare or Legendary variant has no arrival message, using the generic one".into(),
        );
        format!("A {name} with unique qualities has appeared!")
    } else {
        def.arrival_message.clone()
    };
    world.send_event(VariantAnnouncement {
        entity: links.body,
        message,
    });
}

/// First rule wins; the rest are ignored
pub(super) fn override_name(
    world: &mut World,
    links: &CharacterLinks,
    def: &VariantDefinition,
    report: &mut VariantReport,
) {
    report.enter(PipelineStep::Name);
    let Some(rule) = def.name_overrides.first() else {
        return;
    };
    match world.get_mut::<CharacterBody>(links.body) {
        Some(mut body) => body.base_name_token = rule.apply(body.display_name()),
        None => report.record(
            PipelineStep::Name,
            DiagnosticKind::ResolutionFailure,
            "Body has no CharacterBody, name left unchanged".into(),
        ),
    }
}

pub(super) fn override_death_state(
    world: &mut World,
    links: &CharacterLinks,
    def: &VariantDefinition,
    report: &mut VariantReport,
) {
    report.enter(PipelineStep::DeathState);
    let Some(state) = def.custom_death_state.as_deref().filter(|s| !s.is_empty()) else {
        return;
    };
    match world.get_mut::<DeathBehavior>(links.body) {
        Some(mut death) => death.death_state = state.to_string(),
        None => report.record(
            PipelineStep::DeathState,
            DiagnosticKind::ResolutionFailure,
            format!("Body has no DeathBehavior, cannot set death state {state:?}"),
        ),
    }
}

/// Run every AI modifier over every skill driver on the master
pub(super) fn modify_ai(
    world: &mut World,
    links: &CharacterLinks,
    def: &VariantDefinition,
    report: &mut VariantReport,
) {
    report.enter(PipelineStep::AiModifiers);
    if def.ai_modifiers.is_empty() {
        return;
    }
    let Some(mut drivers) = links.master.and_then(|m| world.get_mut::<AiSkillDrivers>(m)) else {
        report.record(
            PipelineStep::AiModifiers,
            DiagnosticKind::ResolutionFailure,
            "Character has no AI skill drivers to modify".into(),
        );
        return;
    };
    let modified = std::mem::take(&mut drivers.0)
        .into_iter()
        .map(|driver| {
            def.ai_modifiers
                .iter()
                .fold(driver, |driver, modifier| modifier.apply(driver))
        })
        .collect();
    drivers.0 = modified;
}

pub(super) fn attach_rewards(
    world: &mut World,
    links: &CharacterLinks,
    def: &VariantDefinition,
    ctx: &VariantContext,
    report: &mut VariantReport,
) {
    report.enter(PipelineStep::Rewards);
    if !ctx.config.variants_give_rewards || !def.gives_rewards {
        return;
    }
    let reward = def
        .custom_rewards
        .clone()
        .unwrap_or_else(|| ctx.config.default_rewards.clone());
    if !attach_reward_handler(world, links.body, reward) {
        debug!("Reward handler already present");
    }
}
