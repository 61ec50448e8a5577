use bevy::prelude::*;
use tracing::debug;

use crate::character::{Inventory, PreventRecursion};
use crate::constants::{EXTRA_LIFE_ITEM, TIER_MARKER_ITEM};
use crate::handlers::VariantEquipmentHandler;
use crate::variant::{CharacterLinks, VariantDefinition, VariantTier};

use super::{DiagnosticKind, PipelineStep, VariantContext, VariantReport};

/// Master entity with an inventory, or `None` after recording why not
fn inventory_owner(
    world: &World,
    links: &CharacterLinks,
    step: PipelineStep,
    report: &mut VariantReport,
) -> Option<Entity> {
    let master = links
        .master
        .filter(|&m| world.get::<Inventory>(m).is_some());
    if master.is_none() {
        report.record(
            step,
            DiagnosticKind::ResolutionFailure,
            "Character has no master inventory".into(),
        );
    }
    master
}

/// Grant the inventory list, then the tier marker item.
///
/// Mismatched item and count arrays void the whole list. The extra-life
/// item is granted at most once per master.
pub(super) fn grant_items(
    world: &mut World,
    links: &CharacterLinks,
    def: &VariantDefinition,
    ctx: &VariantContext,
    report: &mut VariantReport,
) {
    report.enter(PipelineStep::Inventory);
    let wants_marker = def.tier >= VariantTier::Uncommon;
    if def.inventory.is_none() && !wants_marker {
        return;
    }
    let Some(master) = inventory_owner(world, links, PipelineStep::Inventory, report) else {
        return;
    };

    if let Some(list) = &def.inventory {
        if !list.is_consistent() {
            report.record(
                PipelineStep::Inventory,
                DiagnosticKind::DataInconsistency,
                format!(
                    "Inventory has {} items but {} counts, no items granted",
                    list.items.len(),
                    list.counts.len()
                ),
            );
        } else {
            for (name, &count) in list.items.iter().zip(&list.counts) {
                if name == EXTRA_LIFE_ITEM {
                    if world.get::<PreventRecursion>(master).is_some() {
                        debug!("Extra life already granted to this master");
                        continue;
                    }
                    world.entity_mut(master).insert(PreventRecursion);
                }
                let Some(item) = ctx.resolver.resolve_item(name) else {
                    report.record(
                        PipelineStep::Inventory,
                        DiagnosticKind::ResolutionFailure,
                        format!("Could not find item {name:?}, skipping it"),
                    );
                    continue;
                };
                if count <= 0 {
                    report.record(
                        PipelineStep::Inventory,
                        DiagnosticKind::ParameterSanity,
                        format!("Item {name:?} has count {count}, skipping it"),
                    );
                    continue;
                }
                if let Some(mut inventory) = world.get_mut::<Inventory>(master) {
                    inventory.give_item(item, count as u32);
                }
            }
        }
    }

    if wants_marker {
        match ctx.resolver.resolve_item(TIER_MARKER_ITEM) {
            Some(marker) => {
                if let Some(mut inventory) = world.get_mut::<Inventory>(master) {
                    inventory.give_item(marker, 1);
                }
            }
            None => report.record(
                PipelineStep::Inventory,
                DiagnosticKind::ResolutionFailure,
                format!("Tier marker item {TIER_MARKER_ITEM:?} is not registered"),
            ),
        }
    }
}

/// Equip the custom equipment and hand its use over to the AI
pub(super) fn grant_equipment(
    world: &mut World,
    links: &CharacterLinks,
    def: &VariantDefinition,
    ctx: &VariantContext,
    report: &mut VariantReport,
) {
    report.enter(PipelineStep::Equipment);
    let Some(info) = &def.custom_equipment else {
        return;
    };
    let Some(master) = inventory_owner(world, links, PipelineStep::Equipment, report) else {
        return;
    };
    let Some(equipment) = ctx.resolver.resolve_equipment(&info.equipment) else {
        report.record(
            PipelineStep::Equipment,
            DiagnosticKind::ResolutionFailure,
            format!("Could not find equipment {:?}, skipping it", info.equipment),
        );
        return;
    };
    if let Some(mut inventory) = world.get_mut::<Inventory>(master) {
        inventory.set_equipment(Some(equipment));
    }
    world
        .entity_mut(links.body)
        .insert(VariantEquipmentHandler::new(equipment, info));
}
