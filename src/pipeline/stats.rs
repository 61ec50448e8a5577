use bevy::prelude::*;

use crate::character::{CharacterBody, CharacterMotor};
use crate::constants::LEVEL_DAMAGE_FRACTION;
use crate::variant::{CharacterLinks, VariantDefinition};

use super::{DiagnosticKind, PipelineStep, VariantContext, VariantReport};

/// Multiply base stats; negative multipliers are used as-is
pub(super) fn modify_stats(
    world: &mut World,
    links: &CharacterLinks,
    def: &VariantDefinition,
    report: &mut VariantReport,
) {
    report.enter(PipelineStep::Stats);
    for (stat, value) in def.multipliers() {
        if value < 0.0 {
            report.record(
                PipelineStep::Stats,
                DiagnosticKind::ParameterSanity,
                format!("{stat} multiplier is negative ({value}); continuing, here be dragons"),
            );
        }
    }
    let Some(mut body) = world.get_mut::<CharacterBody>(links.body) else {
        report.record(
            PipelineStep::Stats,
            DiagnosticKind::ResolutionFailure,
            "Body has no CharacterBody, stats unchanged".into(),
        );
        return;
    };
    body.base_max_health *= def.health_multiplier;
    body.base_move_speed *= def.move_speed_multiplier;
    body.base_attack_speed *= def.attack_speed_multiplier;
    body.base_damage *= def.damage_multiplier;
    body.level_damage = body.base_damage * LEVEL_DAMAGE_FRACTION;
    body.base_armor *= def.armor_multiplier;
    body.base_armor += def.armor_bonus;
}

pub(super) fn add_buffs(
    world: &mut World,
    links: &CharacterLinks,
    def: &VariantDefinition,
    ctx: &VariantContext,
    report: &mut VariantReport,
) {
    report.enter(PipelineStep::Buffs);
    if def.buffs.is_empty() {
        return;
    }
    let Some(mut body) = world.get_mut::<CharacterBody>(links.body) else {
        report.record(
            PipelineStep::Buffs,
            DiagnosticKind::ResolutionFailure,
            "Body has no CharacterBody, buffs skipped".into(),
        );
        return;
    };
    for entry in &def.buffs {
        let Some(buff) = ctx.resolver.resolve_buff(&entry.buff) else {
            report.record(
                PipelineStep::Buffs,
                DiagnosticKind::ResolutionFailure,
                format!("Could not find buff {:?}, skipping it", entry.buff),
            );
            continue;
        };
        if entry.timed {
            body.add_timed_buff(buff, entry.duration, entry.stacks);
        } else {
            body.add_buff(buff);
        }
    }
}

/// Scale the model root, and the collision capsule if asked to
pub(super) fn scale_size(
    world: &mut World,
    links: &CharacterLinks,
    def: &VariantDefinition,
    report: &mut VariantReport,
) {
    report.enter(PipelineStep::Size);
    let Some(size) = def.size_modifier else {
        return;
    };
    match links.model.and_then(|m| world.get_mut::<Transform>(m)) {
        Some(mut transform) => transform.scale *= size.new_size,
        None => {
            report.record(
                PipelineStep::Size,
                DiagnosticKind::ResolutionFailure,
                "Character has no model transform to scale".into(),
            );
            return;
        }
    }
    if !size.scale_collider {
        return;
    }
    match world.get_mut::<CharacterMotor>(links.body) {
        Some(mut motor) => {
            let (radius, height, step) = (motor.radius, motor.height, motor.step_offset);
            motor.set_capsule_dimensions(
                radius * size.new_size,
                height * size.new_size,
                step * size.new_size,
            );
        }
        None => report.record(
            PipelineStep::Size,
            DiagnosticKind::ResolutionFailure,
            "Body has no CharacterMotor, collider left unscaled".into(),
        ),
    }
}

/// Recompute derived stats and refill health
pub(super) fn finalize(world: &mut World, links: &CharacterLinks, report: &mut VariantReport) {
    report.enter(PipelineStep::Finalize);
    if let Some(mut body) = world.get_mut::<CharacterBody>(links.body) {
        body.recalculate_stats();
        body.health = body.max_health;
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::super::*;
    use super::*;
    use crate::character::CharacterPrefab;
    use crate::variant::{SizeModifier, VariantBuff};

    #[test]
    fn test_multipliers_scale_base_stats() {
        let mut world = world();
        let prefab = CharacterPrefab::new("WispBody", "Wisp");
        let def = VariantDefinition {
            health_multiplier: 2.0,
            move_speed_multiplier: 1.5,
            ..VariantDefinition::new("Mega", "WispBody")
        };
        let spawned = spawn_selected(&mut world, &prefab, vec![def]);
        run(
            &mut world,
            spawned.body,
            "Mega",
            &ContentCatalog::new(),
            &VarianceConfig::default(),
        );

        let body = world.get::<CharacterBody>(spawned.body).unwrap();
        assert_eq!(body.base_max_health, 200.0);
        assert_eq!(body.base_move_speed, 10.5);
        assert_eq!(body.base_damage, 12.0);
        assert_eq!(body.base_armor, 0.0);
        assert_eq!(body.health, body.max_health, "health refilled");
        assert_eq!(body.max_health, 200.0);
    }

    #[test]
    fn test_level_damage_follows_new_base() {
        let mut world = world();
        let prefab = CharacterPrefab::new("WispBody", "Wisp");
        let def = VariantDefinition {
            damage_multiplier: 2.0,
            armor_multiplier: 2.0,
            armor_bonus: 15.0,
            ..VariantDefinition::new("Brute", "WispBody")
        };
        let spawned = spawn_selected(&mut world, &prefab, vec![def]);
        run(
            &mut world,
            spawned.body,
            "Brute",
            &ContentCatalog::new(),
            &VarianceConfig::default(),
        );
        let body = world.get::<CharacterBody>(spawned.body).unwrap();
        assert_eq!(body.base_damage, 24.0);
        assert!((body.level_damage - 4.8).abs() < 1e-5);
        assert_eq!(body.base_armor, 15.0);
    }

    #[test]
    fn test_negative_multiplier_warns_and_applies() {
        let mut world = world();
        let prefab = CharacterPrefab::new("WispBody", "Wisp");
        let def = VariantDefinition {
            attack_speed_multiplier: -1.0,
            ..VariantDefinition::new("Odd", "WispBody")
        };
        let spawned = spawn_selected(&mut world, &prefab, vec![def]);
        let report = run(
            &mut world,
            spawned.body,
            "Odd",
            &ContentCatalog::new(),
            &VarianceConfig::default(),
        );
        assert_eq!(report.count(DiagnosticKind::ParameterSanity), 1);
        let body = world.get::<CharacterBody>(spawned.body).unwrap();
        assert_eq!(body.base_attack_speed, -1.0);
    }

    #[test]
    fn test_buffs_skip_unknown() {
        let mut world = world();
        let prefab = CharacterPrefab::new("WispBody", "Wisp");
        let mut catalog = ContentCatalog::new();
        let warbanner = catalog.register_buff("Warbanner");
        let cloak = catalog.register_buff("Cloak");
        let def = VariantDefinition {
            buffs: vec![
                VariantBuff {
                    buff: "Warbanner".into(),
                    timed: false,
                    duration: 0.0,
                    stacks: 0,
                },
                VariantBuff {
                    buff: "Missing".into(),
                    timed: false,
                    duration: 0.0,
                    stacks: 0,
                },
                VariantBuff {
                    buff: "Cloak".into(),
                    timed: true,
                    duration: 5.0,
                    stacks: 3,
                },
            ],
            ..VariantDefinition::new("Buffed", "WispBody")
        };
        let spawned = spawn_selected(&mut world, &prefab, vec![def]);
        let report = run(
            &mut world,
            spawned.body,
            "Buffed",
            &catalog,
            &VarianceConfig::default(),
        );

        assert_eq!(report.diagnostics_for(PipelineStep::Buffs).count(), 1);
        let body = world.get::<CharacterBody>(spawned.body).unwrap();
        assert_eq!(body.buff_count(warbanner), 1);
        assert_eq!(body.buff_count(cloak), 3);
    }

    #[test]
    fn test_size_scales_model_and_collider() {
        let mut world = world();
        let prefab = CharacterPrefab::new("WispBody", "Wisp");
        let def = VariantDefinition {
            size_modifier: Some(SizeModifier {
                new_size: 2.0,
                scale_collider: true,
            }),
            ..VariantDefinition::new("Huge", "WispBody")
        };
        let spawned = spawn_selected(&mut world, &prefab, vec![def]);
        run(
            &mut world,
            spawned.body,
            "Huge",
            &ContentCatalog::new(),
            &VarianceConfig::default(),
        );

        let transform = world.get::<Transform>(spawned.model).unwrap();
        assert_eq!(transform.scale, Vec3::splat(2.0));
        let motor = world.get::<CharacterMotor>(spawned.body).unwrap();
        assert_eq!(motor.radius, 1.0);
        assert_eq!(motor.height, 4.0);
        assert_eq!(motor.step_offset, 2.0);
    }

    #[test]
    fn test_size_without_collider() {
        let mut world = world();
        let prefab = CharacterPrefab::new("WispBody", "Wisp");
        let def = VariantDefinition {
            size_modifier: Some(SizeModifier {
                new_size: 0.5,
                scale_collider: false,
            }),
            ..VariantDefinition::new("Tiny", "WispBody")
        };
        let spawned = spawn_selected(&mut world, &prefab, vec![def]);
        run(
            &mut world,
            spawned.body,
            "Tiny",
            &ContentCatalog::new(),
            &VarianceConfig::default(),
        );
        assert_eq!(
            world.get::<Transform>(spawned.model).unwrap().scale,
            Vec3::splat(0.5)
        );
        assert_eq!(
            *world.get::<CharacterMotor>(spawned.body).unwrap(),
            CharacterMotor::default()
        );
    }
}
