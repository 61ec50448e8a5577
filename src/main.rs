use anyhow::Context;
use bevy::prelude::*;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

use variance_core::character::{
    spawn_character, AiSkillDriver, Bone, CharacterPrefab, DisplayRuleSet, LightInfo,
    RendererInfo,
};
use variance_core::constants::{EXTRA_LIFE_ITEM, TIER_MARKER_ITEM, VARIANCE_ARTIFACT};
use variance_core::content::{ContentCatalog, EquipmentRef, RunArtifacts};
use variance_core::handlers::{VariantComponentRegistry, VariantRewardDrop};
use variance_core::logging::LoggingPlugin;
use variance_core::pipeline::{VariantAnnouncement, VariantApplied};
use variance_core::{VarianceConfig, VariancePlugin, VariantRegistry};

const FRAMES: u32 = 20;
const FRAME_TIME: Duration = Duration::from_millis(50);

fn wisp() -> CharacterPrefab {
    let mut prefab = CharacterPrefab::new("WispBody", "Lesser Wisp");
    prefab.renderers = vec![RendererInfo::static_mesh("matWisp")];
    prefab.lights = vec![LightInfo {
        default_color: Color::srgb(1.0, 0.6, 0.2),
    }];
    prefab.ai_drivers = vec![AiSkillDriver::new("FireLance")];
    prefab
}

fn beetle(equipment: EquipmentRef) -> CharacterPrefab {
    let mut prefab = CharacterPrefab::new("BeetleBody", "Beetle");
    prefab.renderers = vec![RendererInfo::skinned("matBeetle", "meshBeetle")];
    let mut bones = vec![Bone::new("mdlBeetle"), Bone::new("BeetleBodyMesh")];
    bones.extend((0..20).map(|i| Bone::new(&format!("beetle_bone_{i}"))));
    bones.push(Bone::new("HurtboxHead"));
    prefab.bones = bones;
    prefab.display_rule_set = Some(DisplayRuleSet("idrsBeetle".to_string()));
    prefab.ai_drivers = vec![AiSkillDriver::new("Headbutt").with_user_health(0.0, 0.5)];
    prefab.equipment = Some(equipment);
    prefab
}

fn main() -> anyhow::Result<()> {
    let variants_dir = std::env::var("VARIANTS_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data/variants"));
    let config = match std::env::var("VARIANCE_CONFIG") {
        Ok(path) => VarianceConfig::load(path.as_ref())
            .with_context(|| format!("loading variance config from {path}"))?,
        Err(_) => VarianceConfig::default(),
    };
    let spawn_count: usize = std::env::var("SPAWN_COUNT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(50);

    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .add_plugins(LoggingPlugin)
        .add_plugins(VariancePlugin { config });

    let components = VariantComponentRegistry::default();
    let summary = app
        .world_mut()
        .resource_mut::<VariantRegistry>()
        .load_dir(&variants_dir, &components)
        .with_context(|| format!("loading variants from {}", variants_dir.display()))?;
    info!(
        loaded = summary.loaded,
        rejected = summary.rejected,
        "Variant registry ready"
    );

    let (fireworks, artifact) = {
        let mut catalog = app.world_mut().resource_mut::<ContentCatalog>();
        for item in ["Syringe", EXTRA_LIFE_ITEM, TIER_MARKER_ITEM] {
            catalog.register_item(item);
        }
        for buff in ["Warbanner", "Cloak"] {
            catalog.register_buff(buff);
        }
        catalog.register_skill("FireBolt");
        catalog.register_equipment("Meteor");
        (
            catalog.register_equipment("Fireworks"),
            catalog.register_artifact(VARIANCE_ARTIFACT),
        )
    };
    app.world_mut()
        .resource_mut::<RunArtifacts>()
        .enable(artifact);

    let (wisp, beetle) = (wisp(), beetle(fireworks));
    for i in 0..spawn_count {
        let prefab = if i % 2 == 0 { &wisp } else { &beetle };
        spawn_character(app.world_mut(), prefab);
    }
    info!(spawn_count, "Spawned characters");

    let mut applied = 0;
    for _ in 0..FRAMES {
        app.update();

        let world = app.world_mut();
        for announcement in world
            .resource_mut::<Events<VariantAnnouncement>>()
            .drain()
        {
            info!(entity = ?announcement.entity, "{}", announcement.message);
        }
        for event in world.resource_mut::<Events<VariantApplied>>().drain() {
            applied += 1;
            info!(
                entity = ?event.entity,
                variant = %event.report.identifier,
                diagnostics = event.report.diagnostics.len(),
                "Variant applied"
            );
        }
        for drop in world.resource_mut::<Events<VariantRewardDrop>>().drain() {
            info!(entity = ?drop.entity, tier = ?drop.tier, "Reward dropped");
        }

        std::thread::sleep(FRAME_TIME);
    }

    info!(applied, spawned = spawn_count, "Simulation finished");
    Ok(())
}
