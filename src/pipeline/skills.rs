use bevy::prelude::*;

use crate::character::{SkillLocator, SkillOverridePriority, SkillSlot};
use crate::variant::{CharacterLinks, VariantDefinition};

use super::{DiagnosticKind, PipelineStep, VariantContext, VariantReport};

/// Override skill slots at upgrade priority, sourced from the body itself
pub(super) fn replace_skills(
    world: &mut World,
    links: &CharacterLinks,
    def: &VariantDefinition,
    ctx: &VariantContext,
    report: &mut VariantReport,
) {
    report.enter(PipelineStep::Skills);
    if def.skill_replacements.is_empty() {
        return;
    }
    let Some(mut locator) = world.get_mut::<SkillLocator>(links.body) else {
        report.record(
            PipelineStep::Skills,
            DiagnosticKind::ResolutionFailure,
            "Body has no SkillLocator, skills unchanged".into(),
        );
        return;
    };

    for (i, replacement) in def.skill_replacements.iter().enumerate() {
        if replacement.slot == SkillSlot::None {
            report.record(
                PipelineStep::Skills,
                DiagnosticKind::UnsupportedConfiguration,
                format!("Skill replacement #{i} has its slot set to None"),
            );
            continue;
        }
        let Some(skill) = ctx.resolver.resolve_skill(&replacement.skill) else {
            report.record(
                PipelineStep::Skills,
                DiagnosticKind::ResolutionFailure,
                format!("Could not find skill {:?}, skipping it", replacement.skill),
            );
            continue;
        };
        match locator.slot_mut(replacement.slot) {
            Some(slot) => {
                slot.set_skill_override(links.body, skill, SkillOverridePriority::Upgrade)
            }
            None => report.record(
                PipelineStep::Skills,
                DiagnosticKind::ResolutionFailure,
                format!("Body has no {:?} skill to replace", replacement.slot),
            ),
        }
    }
}
