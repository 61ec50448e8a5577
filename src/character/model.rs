//! Visual model: renderer table, lights, skeleton and collision capsule.

use bevy::prelude::*;

/// Named bone transform
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Bone {
    pub name: String,
}

impl Bone {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

/// Skinned mesh renderer: a mesh bound to an ordered bone list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkinnedMesh {
    pub shared_mesh: Option<String>,
    pub bones: Vec<Bone>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Renderer {
    Static,
    Skinned(SkinnedMesh),
}

/// One slot of the model's renderer table
#[derive(Debug, Clone, PartialEq)]
pub struct RendererInfo {
    pub default_material: Option<String>,
    pub renderer: Renderer,
}

impl RendererInfo {
    pub fn static_mesh(material: &str) -> Self {
        Self {
            default_material: Some(material.to_string()),
            renderer: Renderer::Static,
        }
    }

    pub fn skinned(material: &str, mesh: &str) -> Self {
        Self {
            default_material: Some(material.to_string()),
            renderer: Renderer::Skinned(SkinnedMesh {
                shared_mesh: Some(mesh.to_string()),
                bones: Vec::new(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightInfo {
    pub default_color: Color,
}

/// Rules for where equipment and items attach on the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRuleSet(pub String);

/// Model component on the model entity
#[derive(Component, Debug, Clone, Default)]
pub struct CharacterModel {
    pub base_renderer_infos: Vec<RendererInfo>,
    pub base_light_infos: Vec<LightInfo>,
    pub item_display_rule_set: Option<DisplayRuleSet>,
}

impl CharacterModel {
    pub fn skinned_renderers_mut(&mut self) -> impl Iterator<Item = &mut SkinnedMesh> {
        self.base_renderer_infos
            .iter_mut()
            .filter_map(|info| match &mut info.renderer {
                Renderer::Skinned(skinned) => Some(skinned),
                Renderer::Static => None,
            })
    }

    pub fn skinned_renderers(&self) -> impl Iterator<Item = &SkinnedMesh> {
        self.base_renderer_infos
            .iter()
            .filter_map(|info| match &info.renderer {
                Renderer::Skinned(skinned) => Some(skinned),
                Renderer::Static => None,
            })
    }
}

/// Every named transform under the character, in hierarchy order
#[derive(Component, Debug, Clone, Default)]
pub struct Skeleton {
    pub transforms: Vec<Bone>,
}

impl Skeleton {
    pub fn from_names(names: &[&str]) -> Self {
        Self {
            transforms: names.iter().map(|n| Bone::new(n)).collect(),
        }
    }
}

/// Kinematic collision capsule on the body entity
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct CharacterMotor {
    pub radius: f32,
    pub height: f32,
    pub step_offset: f32,
}

impl Default for CharacterMotor {
    fn default() -> Self {
        Self {
            radius: 0.5,
            height: 2.0,
            step_offset: 1.0,
        }
    }
}

impl CharacterMotor {
    pub fn set_capsule_dimensions(&mut self, radius: f32, height: f32, step_offset: f32) {
        self.radius = radius;
        self.height = height;
        self.step_offset = step_offset;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skinned_renderer_iteration_skips_static() {
        let mut model = CharacterModel {
            base_renderer_infos: vec![
                RendererInfo::skinned("matBody", "meshBody"),
                RendererInfo::static_mesh("matEye"),
                RendererInfo::skinned("matWing", "meshWing"),
            ],
            ..Default::default()
        };
        assert_eq!(model.skinned_renderers().count(), 2);
        for skinned in model.skinned_renderers_mut() {
            skinned.bones.push(Bone::new("root"));
        }
        assert!(model.skinned_renderers().all(|s| s.bones.len() == 1));
    }

    #[test]
    fn test_capsule_dimensions() {
        let mut motor = CharacterMotor::default();
        motor.set_capsule_dimensions(1.0, 4.0, 2.0);
        assert_eq!(
            motor,
            CharacterMotor {
                radius: 1.0,
                height: 4.0,
                step_offset: 2.0
            }
        );
    }
}
