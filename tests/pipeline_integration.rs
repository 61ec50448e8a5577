//! End-to-end tests: VariancePlugin in a headless App, driven frame by
//! frame with a manually advanced clock.

use bevy::prelude::*;
use std::time::Duration;

use variance_core::character::{
    spawn_character, Bone, CharacterBody, CharacterEntities, CharacterModel, CharacterPrefab,
    DisplayRuleSet, Inventory, RendererInfo,
};
use variance_core::constants::VARIANCE_ARTIFACT;
use variance_core::content::{ContentCatalog, EquipmentRef, RunArtifacts};
use variance_core::handlers::{
    DropTier, RewardDefinition, VariantComponentRegistry, VariantDeathEvent, VariantRewardDrop,
};
use variance_core::pipeline::{VariantAnnouncement, VariantApplied};
use variance_core::plugin::VariantSyncMessage;
use variance_core::remap::{MeshTopology, RestoreQueue};
use variance_core::variant::{
    MeshReplacement, NameOverride, NameOverrideKind, VariantHandlers, VariantSync, VariantTier,
};
use variance_core::{Authority, VarianceConfig, VariancePlugin, VariantDefinition, VariantRegistry};

// ============================================================
// Helpers
// ============================================================

fn test_app() -> App {
    let mut app = App::new();
    app.add_plugins(VariancePlugin {
        config: VarianceConfig {
            rng_seed: Some(7),
            ..Default::default()
        },
    });
    app.insert_resource(Time::<()>::default());
    app
}

/// Advance the clock by `secs` and run one frame
fn step(app: &mut App, secs: f32) {
    app.world_mut()
        .resource_mut::<Time>()
        .advance_by(Duration::from_secs_f32(secs));
    app.update();
}

fn register(app: &mut App, definition: VariantDefinition) {
    app.world_mut()
        .resource_mut::<VariantRegistry>()
        .register(definition, &VariantComponentRegistry::default())
        .unwrap();
}

fn always(identifier: &str, body: &str) -> VariantDefinition {
    VariantDefinition {
        spawn_rate: 100.0,
        ..VariantDefinition::new(identifier, body)
    }
}

fn beetle_prefab() -> CharacterPrefab {
    let mut prefab = CharacterPrefab::new("BeetleBody", "Beetle");
    prefab.renderers = vec![RendererInfo::skinned("matBeetle", "meshBeetle")];
    let mut bones = vec![Bone::new("mdlBeetle"), Bone::new("BeetleBodyMesh")];
    bones.extend((0..20).map(|i| Bone::new(&format!("bone{i}"))));
    prefab.bones = bones;
    prefab.display_rule_set = Some(DisplayRuleSet("idrsBeetle".into()));
    prefab.equipment = Some(EquipmentRef(3));
    prefab
}

fn queen() -> VariantDefinition {
    VariantDefinition {
        mesh_replacements: vec![MeshReplacement {
            renderer_index: 0,
            mesh: "meshBeetleQueen".into(),
            topology: MeshTopology::Beetle,
        }],
        ..always("BeetleQueen", "BeetleBody")
    }
}

fn equipment(app: &App, spawned: CharacterEntities) -> Option<EquipmentRef> {
    app.world()
        .get::<Inventory>(spawned.master)
        .and_then(Inventory::equipment)
}

fn display_rules(app: &App, spawned: CharacterEntities) -> Option<DisplayRuleSet> {
    app.world()
        .get::<CharacterModel>(spawned.model)
        .and_then(|m| m.item_display_rule_set.clone())
}

// ============================================================
// Selection and application
// ============================================================

#[test]
fn selected_variant_applies_on_first_frame() {
    let mut app = test_app();
    register(
        &mut app,
        VariantDefinition {
            health_multiplier: 2.0,
            name_overrides: vec![NameOverride {
                kind: NameOverrideKind::Prefix,
                text: "Mega".into(),
            }],
            ..always("MegaWisp", "WispBody")
        },
    );
    let spawned = spawn_character(app.world_mut(), &CharacterPrefab::new("WispBody", "Wisp"));

    step(&mut app, 0.0);

    let body = app.world().get::<CharacterBody>(spawned.body).unwrap();
    assert_eq!(body.max_health, 200.0);
    assert_eq!(body.health, body.max_health);
    assert_eq!(body.display_name(), "Mega Wisp");

    let applied: Vec<_> = app
        .world()
        .resource::<Events<VariantApplied>>()
        .iter_current_update_events()
        .map(|e| e.report.identifier.clone())
        .collect();
    assert_eq!(applied, vec!["MegaWisp".to_string()]);
}

#[test]
fn variant_applies_only_once() {
    let mut app = test_app();
    register(
        &mut app,
        VariantDefinition {
            health_multiplier: 2.0,
            ..always("MegaWisp", "WispBody")
        },
    );
    let spawned = spawn_character(app.world_mut(), &CharacterPrefab::new("WispBody", "Wisp"));

    for _ in 0..5 {
        step(&mut app, 0.1);
    }
    let body = app.world().get::<CharacterBody>(spawned.body).unwrap();
    assert_eq!(body.base_max_health, 200.0);
}

#[test]
fn zero_rate_never_applies() {
    let mut app = test_app();
    register(
        &mut app,
        VariantDefinition {
            spawn_rate: 0.0,
            health_multiplier: 2.0,
            ..VariantDefinition::new("MegaWisp", "WispBody")
        },
    );
    let prefab = CharacterPrefab::new("WispBody", "Wisp");
    let bodies: Vec<_> = (0..50)
        .map(|_| spawn_character(app.world_mut(), &prefab).body)
        .collect();

    step(&mut app, 0.0);

    for body in bodies {
        let handlers = app.world().get::<VariantHandlers>(body).unwrap();
        assert!(handlers.iter().all(|h| h.rolled && !h.is_variant));
        assert_eq!(
            app.world().get::<CharacterBody>(body).unwrap().max_health,
            100.0
        );
    }
}

#[test]
fn bodies_without_variants_get_no_handlers() {
    let mut app = test_app();
    register(&mut app, always("MegaWisp", "WispBody"));
    let spawned = spawn_character(app.world_mut(), &CharacterPrefab::new("GolemBody", "Golem"));

    step(&mut app, 0.0);

    assert!(app.world().get::<VariantHandlers>(spawned.body).is_none());
}

#[test]
fn variance_artifact_scales_spawn_rates() {
    let mut app = test_app();
    register(
        &mut app,
        VariantDefinition {
            spawn_rate: 60.0,
            ..VariantDefinition::new("MegaWisp", "WispBody")
        },
    );
    let artifact = app
        .world_mut()
        .resource_mut::<ContentCatalog>()
        .register_artifact(VARIANCE_ARTIFACT);
    app.world_mut()
        .resource_mut::<RunArtifacts>()
        .enable(artifact);

    let prefab = CharacterPrefab::new("WispBody", "Wisp");
    let bodies: Vec<_> = (0..30)
        .map(|_| spawn_character(app.world_mut(), &prefab).body)
        .collect();
    step(&mut app, 0.0);

    // 60% doubled clamps to 100%
    for body in bodies {
        let handlers = app.world().get::<VariantHandlers>(body).unwrap();
        assert!(handlers.find("MegaWisp").unwrap().applied);
    }
}

#[test]
fn unique_variant_removes_siblings() {
    let mut app = test_app();
    register(
        &mut app,
        VariantDefinition {
            health_multiplier: 2.0,
            ..always("MegaWisp", "WispBody")
        },
    );
    register(
        &mut app,
        VariantDefinition {
            unique: true,
            damage_multiplier: 3.0,
            ..always("LoneWisp", "WispBody")
        },
    );
    let spawned = spawn_character(app.world_mut(), &CharacterPrefab::new("WispBody", "Wisp"));

    step(&mut app, 0.0);

    let handlers = app.world().get::<VariantHandlers>(spawned.body).unwrap();
    assert_eq!(handlers.len(), 1);
    assert!(handlers.find("LoneWisp").unwrap().applied);

    let body = app.world().get::<CharacterBody>(spawned.body).unwrap();
    assert_eq!(body.base_max_health, 100.0, "sibling never applied");
    assert_eq!(body.base_damage, 36.0);
    assert_eq!(
        app.world()
            .resource::<Events<VariantApplied>>()
            .iter_current_update_events()
            .count(),
        1
    );
}

#[test]
fn rare_variant_announces_arrival() {
    let mut app = test_app();
    register(
        &mut app,
        VariantDefinition {
            tier: VariantTier::Rare,
            arrival_message: "The ground trembles...".into(),
            ..always("GreatWisp", "WispBody")
        },
    );
    register(&mut app, always("MegaWisp", "WispBody"));
    spawn_character(app.world_mut(), &CharacterPrefab::new("WispBody", "Wisp"));

    step(&mut app, 0.0);

    let messages: Vec<_> = app
        .world()
        .resource::<Events<VariantAnnouncement>>()
        .iter_current_update_events()
        .map(|a| a.message.clone())
        .collect();
    assert_eq!(messages, vec!["The ground trembles...".to_string()]);
}

// ============================================================
// Skeleton remap and deferred restore
// ============================================================

#[test]
fn equipment_returns_after_restore_delay() {
    let mut app = test_app();
    register(&mut app, queen());
    let spawned = spawn_character(app.world_mut(), &beetle_prefab());

    step(&mut app, 0.0);
    assert_eq!(equipment(&app, spawned), None, "detached during remap");
    assert_eq!(display_rules(&app, spawned), None);
    assert_eq!(app.world().resource::<RestoreQueue>().len(), 1);

    step(&mut app, 0.1);
    assert_eq!(equipment(&app, spawned), None, "restore not due yet");

    step(&mut app, 0.15);
    assert_eq!(equipment(&app, spawned), Some(EquipmentRef(3)));
    assert_eq!(
        display_rules(&app, spawned),
        Some(DisplayRuleSet("idrsBeetle".into()))
    );
    assert!(app.world().resource::<RestoreQueue>().is_empty());

    let model = app.world().get::<CharacterModel>(spawned.model).unwrap();
    let skinned = model.skinned_renderers().next().unwrap();
    assert_eq!(skinned.shared_mesh.as_deref(), Some("meshBeetleQueen"));
    assert_eq!(skinned.bones.len(), 20);
    assert_eq!(skinned.bones[11].name, "bone14");
}

#[test]
fn restore_waits_past_a_long_remap_frame() {
    let mut app = test_app();
    register(&mut app, queen());
    let spawned = spawn_character(app.world_mut(), &beetle_prefab());

    step(&mut app, 0.25);
    let model = app.world().get::<CharacterModel>(spawned.model).unwrap();
    assert_eq!(model.skinned_renderers().next().unwrap().bones.len(), 20);
    assert_eq!(equipment(&app, spawned), None, "not restored in the remap frame");
    assert_eq!(app.world().resource::<RestoreQueue>().len(), 1);

    step(&mut app, 0.1);
    assert_eq!(equipment(&app, spawned), None);

    step(&mut app, 0.15);
    assert_eq!(equipment(&app, spawned), Some(EquipmentRef(3)));
}

#[test]
fn restore_delay_counts_from_the_remap() {
    let mut app = test_app();
    register(&mut app, queen());
    let spawned = spawn_character(app.world_mut(), &beetle_prefab());

    step(&mut app, 0.15);
    assert_eq!(app.world().resource::<RestoreQueue>().len(), 1);

    step(&mut app, 0.05);
    assert_eq!(equipment(&app, spawned), None, "only 0.05s since the remap");

    step(&mut app, 0.1);
    assert_eq!(equipment(&app, spawned), None);

    step(&mut app, 0.1);
    assert_eq!(equipment(&app, spawned), Some(EquipmentRef(3)));
    assert!(app.world().resource::<RestoreQueue>().is_empty());
}

#[test]
fn despawned_body_skips_restore() {
    let mut app = test_app();
    register(&mut app, queen());
    let spawned = spawn_character(app.world_mut(), &beetle_prefab());

    step(&mut app, 0.0);
    assert_eq!(app.world().resource::<RestoreQueue>().len(), 1);
    app.world_mut().despawn(spawned.body);

    step(&mut app, 0.3);
    assert!(app.world().resource::<RestoreQueue>().is_empty());
    assert_eq!(equipment(&app, spawned), None);
}

// ============================================================
// Authority
// ============================================================

#[test]
fn client_adopts_replicated_rolls_without_applying() {
    let mut app = test_app();
    app.insert_resource(Authority::Client);
    register(
        &mut app,
        VariantDefinition {
            health_multiplier: 2.0,
            ..always("MegaWisp", "WispBody")
        },
    );
    let spawned = spawn_character(app.world_mut(), &CharacterPrefab::new("WispBody", "Wisp"));

    step(&mut app, 0.0);
    let handlers = app.world().get::<VariantHandlers>(spawned.body).unwrap();
    assert!(!handlers.find("MegaWisp").unwrap().rolled, "clients never roll");

    app.world_mut().send_event(VariantSyncMessage {
        entity: spawned.body,
        snapshots: vec![VariantSync {
            identifier: "MegaWisp".into(),
            is_variant: true,
        }],
    });
    step(&mut app, 0.1);

    let handler = app
        .world()
        .get::<VariantHandlers>(spawned.body)
        .unwrap()
        .find("MegaWisp")
        .cloned()
        .unwrap();
    assert!(handler.rolled && handler.is_variant);
    assert!(!handler.applied);
    assert_eq!(
        app.world().get::<CharacterBody>(spawned.body).unwrap().max_health,
        100.0
    );
}

// ============================================================
// Rewards
// ============================================================

#[test]
fn death_of_rewarding_variant_drops_item() {
    let mut app = test_app();
    register(
        &mut app,
        VariantDefinition {
            custom_rewards: Some(RewardDefinition {
                red_item_chance: 100.0,
                ..Default::default()
            }),
            ..always("RichWisp", "WispBody")
        },
    );
    let spawned = spawn_character(app.world_mut(), &CharacterPrefab::new("WispBody", "Wisp"));
    step(&mut app, 0.0);

    app.world_mut().send_event(VariantDeathEvent {
        entity: spawned.body,
        position: Vec3::new(1.0, 0.0, 2.0),
    });
    step(&mut app, 0.1);

    let drops: Vec<_> = app
        .world()
        .resource::<Events<VariantRewardDrop>>()
        .iter_current_update_events()
        .copied()
        .collect();
    assert_eq!(drops.len(), 1);
    assert_eq!(drops[0].tier, DropTier::Red);
    assert_eq!(drops[0].position, Vec3::new(1.0, 0.0, 2.0));
}

#[test]
fn rewards_disabled_globally() {
    let mut app = App::new();
    app.add_plugins(VariancePlugin {
        config: VarianceConfig {
            variants_give_rewards: false,
            rng_seed: Some(1),
            ..Default::default()
        },
    });
    app.insert_resource(Time::<()>::default());
    register(&mut app, always("MegaWisp", "WispBody"));
    let spawned = spawn_character(app.world_mut(), &CharacterPrefab::new("WispBody", "Wisp"));

    step(&mut app, 0.0);

    assert!(app
        .world()
        .get::<variance_core::handlers::VariantRewardHandler>(spawned.body)
        .is_none());
}
