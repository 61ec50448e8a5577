//! Aesthetic extra components, attached to the model entity by string key.
//!
//! Keys are bound to factories at registration time and checked when
//! definitions are registered, so an unknown key never reaches a spawn.

use bevy::prelude::*;
use std::collections::HashMap;

/// Inserts one component bundle on the target entity
pub type ComponentFactory = fn(&mut EntityWorldMut);

/// Generic factory for any component with a sensible default
pub fn insert_default<T: Component + Default>(entity: &mut EntityWorldMut) {
    entity.insert(T::default());
}

/// Stable key → factory table for extra components
#[derive(Resource, Clone)]
pub struct VariantComponentRegistry {
    factories: HashMap<String, ComponentFactory>,
}

impl Default for VariantComponentRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register("ModelSpinner", insert_default::<ModelSpinner>);
        registry.register("AfterImage", insert_default::<AfterImage>);
        registry
    }
}

impl VariantComponentRegistry {
    /// Registry without the built-in components
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    pub fn register(&mut self, key: &str, factory: ComponentFactory) {
        self.factories.insert(key.to_string(), factory);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.factories.contains_key(key)
    }

    pub fn factory(&self, key: &str) -> Option<ComponentFactory> {
        self.factories.get(key).copied()
    }

    /// Run the factory for `key`; false when the key is unknown
    pub fn attach(&self, key: &str, entity: &mut EntityWorldMut) -> bool {
        match self.factory(key) {
            Some(factory) => {
                factory(entity);
                true
            }
            None => false,
        }
    }
}

/// Spins the model around its vertical axis
#[derive(Component, Debug, Clone, Copy)]
pub struct ModelSpinner {
    pub degrees_per_second: f32,
}

impl Default for ModelSpinner {
    fn default() -> Self {
        Self {
            degrees_per_second: 90.0,
        }
    }
}

/// Leaves fading copies of the model behind while it moves
#[derive(Component, Debug, Clone, Copy)]
pub struct AfterImage {
    pub interval: f32,
}

impl Default for AfterImage {
    fn default() -> Self {
        Self { interval: 0.1 }
    }
}

pub fn spin_models(time: Res<Time>, mut models: Query<(&ModelSpinner, &mut Transform)>) {
    let dt = time.delta_secs();
    for (spinner, mut transform) in &mut models {
        transform.rotate_y(spinner.degrees_per_second.to_radians() * dt);
    }
}
