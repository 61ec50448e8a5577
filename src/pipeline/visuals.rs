use bevy::prelude::*;
use tracing::{debug, info};

use crate::character::{CharacterModel, Renderer};
use crate::constants::REMAP_RESTORE_DELAY;
use crate::remap::{
    capture_equipment, elapsed_secs, remap_model, restore_variant, RemapOutcome, RestoreQueue,
};
use crate::variant::{CharacterLinks, VariantDefinition, VariantHandlers};

use super::{DiagnosticKind, PipelineStep, VariantContext, VariantReport};

/// Material, light and mesh replacements by renderer index.
///
/// Equipment is detached before the first mesh swap. It comes back after
/// a delay if any swap remapped the skeleton, immediately otherwise.
pub(super) fn modify_model(
    world: &mut World,
    links: &CharacterLinks,
    def: &VariantDefinition,
    report: &mut VariantReport,
) {
    report.enter(PipelineStep::Model);
    if def.material_replacements.is_empty()
        && def.light_replacements.is_empty()
        && def.mesh_replacements.is_empty()
    {
        return;
    }
    let Some(model) = links
        .model
        .filter(|&m| world.get::<CharacterModel>(m).is_some())
    else {
        report.record(
            PipelineStep::Model,
            DiagnosticKind::ResolutionFailure,
            "Character has no model, visuals unchanged".into(),
        );
        return;
    };

    if let Some(mut character_model) = world.get_mut::<CharacterModel>(model) {
        for replacement in &def.material_replacements {
            match character_model
                .base_renderer_infos
                .get_mut(replacement.renderer_index)
            {
                Some(info) => info.default_material = Some(replacement.material.clone()),
                None => report.record(
                    PipelineStep::Model,
                    DiagnosticKind::ResolutionFailure,
                    format!(
                        "Material replacement targets renderer {} which does not exist",
                        replacement.renderer_index
                    ),
                ),
            }
        }
        for replacement in &def.light_replacements {
            match character_model
                .base_light_infos
                .get_mut(replacement.renderer_index)
            {
                Some(light) => light.default_color = replacement.color(),
                None => report.record(
                    PipelineStep::Model,
                    DiagnosticKind::ResolutionFailure,
                    format!(
                        "Light replacement targets light {} which does not exist",
                        replacement.renderer_index
                    ),
                ),
            }
        }
    }

    let mut captured = false;
    let mut remapped = false;
    for replacement in &def.mesh_replacements {
        let index = replacement.renderer_index;
        let skinned = world
            .get::<CharacterModel>(model)
            .and_then(|m| m.base_renderer_infos.get(index))
            .map(|info| matches!(info.renderer, Renderer::Skinned(_)));
        match skinned {
            None => {
                report.record(
                    PipelineStep::Model,
                    DiagnosticKind::ResolutionFailure,
                    format!("Mesh replacement targets renderer {index} which does not exist"),
                );
                continue;
            }
            Some(false) => {
                report.record(
                    PipelineStep::Model,
                    DiagnosticKind::UnsupportedConfiguration,
                    format!("Renderer {index} is not skinned, cannot swap its mesh"),
                );
                continue;
            }
            Some(true) => {}
        }

        if !captured {
            let saved = capture_equipment(world, links);
            if let Some(mut handlers) = world.get_mut::<VariantHandlers>(links.body) {
                if let Some(handler) = handlers.find_mut(&def.identifier) {
                    handler.saved = Some(saved);
                }
            }
            captured = true;
        }

        if let Some(mut character_model) = world.get_mut::<CharacterModel>(model) {
            if let Some(Renderer::Skinned(skinned)) = character_model
                .base_renderer_infos
                .get_mut(index)
                .map(|info| &mut info.renderer)
            {
                skinned.shared_mesh = Some(replacement.mesh.clone());
            }
        }

        match remap_model(world, model, replacement.topology) {
            RemapOutcome::Remapped(bones) => {
                debug!(topology = ?replacement.topology, bones = bones.len(), "Remapped skeleton");
                remapped = true;
            }
            RemapOutcome::NotRequired => {}
            RemapOutcome::Unsupported => report.record(
                PipelineStep::Model,
                DiagnosticKind::UnsupportedConfiguration,
                format!(
                    "{:?} mesh swaps are not supported, the variant will not look right",
                    replacement.topology
                ),
            ),
        }
    }

    if !captured {
        return;
    }
    if remapped {
        let now = elapsed_secs(world);
        world
            .get_resource_or_insert_with(RestoreQueue::default)
            .schedule(links.body, &def.identifier, now, REMAP_RESTORE_DELAY);
    } else {
        restore_variant(world, links.body, &def.identifier);
    }
}

/// Attach each aesthetic extra component to the model entity
pub(super) fn add_extra_components(
    world: &mut World,
    links: &CharacterLinks,
    def: &VariantDefinition,
    ctx: &VariantContext,
    report: &mut VariantReport,
) {
    report.enter(PipelineStep::ExtraComponents);
    for extra in &def.extra_components {
        if !extra.aesthetic {
            report.record(
                PipelineStep::ExtraComponents,
                DiagnosticKind::UnsupportedConfiguration,
                format!(
                    "{:?} is not aesthetic; non-aesthetic components are not supported",
                    extra.component
                ),
            );
            continue;
        }
        let Some(model) = links.model else {
            report.record(
                PipelineStep::ExtraComponents,
                DiagnosticKind::ResolutionFailure,
                format!("Character has no model to add {:?} to", extra.component),
            );
            continue;
        };
        let mut entity = world.entity_mut(model);
        if ctx.components.attach(&extra.component, &mut entity) {
            info!(component = %extra.component, "Added extra component to model");
        } else {
            report.record(
                PipelineStep::ExtraComponents,
                DiagnosticKind::ResolutionFailure,
                format!("No component registered as {:?}", extra.component),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::super::*;
    use super::*;
    use crate::character::{
        Bone, CharacterPrefab, DisplayRuleSet, Inventory, LightInfo, RendererInfo,
    };
    use crate::constants::BEETLE_BONE_SWAPS;
    use crate::content::EquipmentRef;
    use crate::handlers::ModelSpinner;
    use crate::remap::{filter_bones, MeshTopology};
    use crate::variant::{
        ExtraComponent, LightReplacement, MaterialReplacement, MeshReplacement,
    };

    fn beetle_prefab() -> CharacterPrefab {
        let mut prefab = CharacterPrefab::new("BeetleBody", "Beetle");
        prefab.renderers = vec![
            RendererInfo::skinned("matBeetle", "meshBeetle"),
            RendererInfo::static_mesh("matEye"),
        ];
        prefab.lights = vec![LightInfo {
            default_color: Color::WHITE,
        }];
        prefab.bones = std::iter::once(Bone::new("mdlBeetle"))
            .chain((0..20).map(|i| Bone::new(&format!("bone{i}"))))
            .chain(std::iter::once(Bone::new("HurtboxHead")))
            .collect();
        prefab.display_rule_set = Some(DisplayRuleSet("idrsBeetle".into()));
        prefab.equipment = Some(EquipmentRef(7));
        prefab
    }

    fn mesh_swap(topology: MeshTopology) -> VariantDefinition {
        VariantDefinition {
            mesh_replacements: vec![MeshReplacement {
                renderer_index: 0,
                mesh: "meshBeetleQueen".into(),
                topology,
            }],
            ..VariantDefinition::new("Swapped", "BeetleBody")
        }
    }

    #[test]
    fn test_material_and_light_replacement() {
        let mut world = world();
        let def = VariantDefinition {
            material_replacements: vec![
                MaterialReplacement {
                    renderer_index: 1,
                    material: "matGold".into(),
                },
                MaterialReplacement {
                    renderer_index: 9,
                    material: "matLost".into(),
                },
            ],
            light_replacements: vec![LightReplacement {
                renderer_index: 0,
                color: [1.0, 0.0, 0.0, 1.0],
            }],
            ..VariantDefinition::new("Golden", "BeetleBody")
        };
        let spawned = spawn_selected(&mut world, &beetle_prefab(), vec![def]);
        let report = run(
            &mut world,
            spawned.body,
            "Golden",
            &ContentCatalog::new(),
            &VarianceConfig::default(),
        );

        let model = world.get::<CharacterModel>(spawned.model).unwrap();
        assert_eq!(
            model.base_renderer_infos[1].default_material.as_deref(),
            Some("matGold")
        );
        assert_eq!(
            model.base_light_infos[0].default_color,
            Color::srgba(1.0, 0.0, 0.0, 1.0)
        );
        assert_eq!(report.diagnostics_for(PipelineStep::Model).count(), 1);
    }

    #[test]
    fn test_beetle_swap_defers_restore() {
        let mut world = world();
        let spawned = spawn_selected(
            &mut world,
            &beetle_prefab(),
            vec![mesh_swap(MeshTopology::Beetle)],
        );
        run(
            &mut world,
            spawned.body,
            "Swapped",
            &ContentCatalog::new(),
            &VarianceConfig::default(),
        );

        let model = world.get::<CharacterModel>(spawned.model).unwrap();
        let Renderer::Skinned(skinned) = &model.base_renderer_infos[0].renderer else {
            panic!("renderer 0 is skinned");
        };
        assert_eq!(skinned.shared_mesh.as_deref(), Some("meshBeetleQueen"));
        let filtered = filter_bones(
            &beetle_prefab().bones,
            MeshTopology::Beetle.exclusions(),
        );
        for (a, b) in BEETLE_BONE_SWAPS {
            assert_eq!(skinned.bones[a], filtered[b]);
        }
        assert!(model.item_display_rule_set.is_none(), "cleared until restore");

        assert_eq!(world.get::<Inventory>(spawned.master).unwrap().equipment(), None);
        assert_eq!(world.resource::<RestoreQueue>().len(), 1);
    }

    #[test]
    fn test_default_topology_restores_immediately() {
        let mut world = world();
        let spawned = spawn_selected(
            &mut world,
            &beetle_prefab(),
            vec![mesh_swap(MeshTopology::Default)],
        );
        let report = run(
            &mut world,
            spawned.body,
            "Swapped",
            &ContentCatalog::new(),
            &VarianceConfig::default(),
        );

        assert!(report.diagnostics.is_empty());
        assert!(world.resource::<RestoreQueue>().is_empty());
        assert_eq!(
            world.get::<Inventory>(spawned.master).unwrap().equipment(),
            Some(EquipmentRef(7))
        );
        assert!(world
            .get::<CharacterModel>(spawned.model)
            .unwrap()
            .item_display_rule_set
            .is_some());
        let handlers = world.get::<VariantHandlers>(spawned.body).unwrap();
        assert!(handlers.handlers[0].saved.is_none(), "saved state consumed");
    }

    #[test]
    fn test_unsupported_topology_warns_and_restores() {
        let mut world = world();
        let spawned = spawn_selected(
            &mut world,
            &beetle_prefab(),
            vec![mesh_swap(MeshTopology::MagmaWorm)],
        );
        let report = run(
            &mut world,
            spawned.body,
            "Swapped",
            &ContentCatalog::new(),
            &VarianceConfig::default(),
        );
        assert_eq!(report.count(DiagnosticKind::UnsupportedConfiguration), 1);
        assert!(world.resource::<RestoreQueue>().is_empty());
        assert_eq!(
            world.get::<Inventory>(spawned.master).unwrap().equipment(),
            Some(EquipmentRef(7))
        );
    }

    #[test]
    fn test_static_renderer_mesh_swap_skipped() {
        let mut world = world();
        let def = VariantDefinition {
            mesh_replacements: vec![MeshReplacement {
                renderer_index: 1,
                mesh: "meshEye".into(),
                topology: MeshTopology::Beetle,
            }],
            ..VariantDefinition::new("Swapped", "BeetleBody")
        };
        let spawned = spawn_selected(&mut world, &beetle_prefab(), vec![def]);
        let report = run(
            &mut world,
            spawned.body,
            "Swapped",
            &ContentCatalog::new(),
            &VarianceConfig::default(),
        );
        assert_eq!(report.count(DiagnosticKind::UnsupportedConfiguration), 1);
        assert_eq!(
            world.get::<Inventory>(spawned.master).unwrap().equipment(),
            Some(EquipmentRef(7)),
            "nothing captured"
        );
    }

    #[test]
    fn test_extra_components() {
        let mut world = world();
        let def = VariantDefinition {
            extra_components: vec![
                ExtraComponent {
                    component: "ModelSpinner".into(),
                    aesthetic: true,
                },
                ExtraComponent {
                    component: "Brain".into(),
                    aesthetic: false,
                },
            ],
            ..VariantDefinition::new("Spinning", "BeetleBody")
        };
        let spawned = spawn_selected(&mut world, &beetle_prefab(), vec![def]);
        let report = run(
            &mut world,
            spawned.body,
            "Spinning",
            &ContentCatalog::new(),
            &VarianceConfig::default(),
        );
        assert!(world.get::<ModelSpinner>(spawned.model).is_some());
        assert_eq!(report.count(DiagnosticKind::UnsupportedConfiguration), 1);
    }
}
