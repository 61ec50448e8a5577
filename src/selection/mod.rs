//! Random variant selection.
//!
//! Each handler rolls exactly once, on the authoritative side only. The
//! outcome is the replicated `is_variant` flag.

use bevy::prelude::*;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use tracing::{debug, warn};

use crate::config::VarianceConfig;
use crate::constants::{MAX_SPAWN_RATE, MIN_SPAWN_RATE};
use crate::content::{ContentCatalog, RunArtifacts};
use crate::pipeline::Authority;
use crate::variant::VariantHandlers;

/// RNG used for variant rolls and reward drops
#[derive(Resource, Debug, Clone)]
pub struct VariantRng(pub Xoshiro256PlusPlus);

impl VariantRng {
    pub fn from_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self(Xoshiro256PlusPlus::seed_from_u64(seed)),
            None => Self(Xoshiro256PlusPlus::from_entropy()),
        }
    }
}

impl Default for VariantRng {
    fn default() -> Self {
        Self::from_seed(None)
    }
}

/// Spawn chance in percent after the global multiplier, clamped to 0-100
pub fn effective_rate(base_rate: f32, multiplier: f32) -> f32 {
    let rate = base_rate * multiplier;
    if rate.is_nan() {
        warn!(base_rate, multiplier, "Spawn rate is NaN, treating as 0");
        return MIN_SPAWN_RATE;
    }
    if !(MIN_SPAWN_RATE..=MAX_SPAWN_RATE).contains(&rate) {
        warn!(base_rate, multiplier, "Spawn rate out of range, clamping");
    }
    rate.clamp(MIN_SPAWN_RATE, MAX_SPAWN_RATE)
}

/// One uniform draw against the effective rate
pub fn select_variant(base_rate: f32, multiplier: f32, rng: &mut impl Rng) -> bool {
    rng.gen::<f32>() * 100.0 < effective_rate(base_rate, multiplier)
}

/// Roll every handler that has not rolled yet; returns how many were selected
pub fn roll_handlers(handlers: &mut VariantHandlers, multiplier: f32, rng: &mut impl Rng) -> usize {
    let mut selected = 0;
    for handler in handlers.handlers.iter_mut().filter(|h| !h.rolled) {
        handler.rolled = true;
        handler.is_variant = select_variant(handler.definition.spawn_rate, multiplier, rng);
        if handler.is_variant {
            selected += 1;
            debug!(variant = %handler.identifier(), "Variant selected");
        }
    }
    selected
}

/// System: roll newly attached handlers
pub fn roll_variants(
    authority: Res<Authority>,
    config: Res<VarianceConfig>,
    catalog: Res<ContentCatalog>,
    artifacts: Res<RunArtifacts>,
    mut rng: ResMut<VariantRng>,
    mut bodies: Query<&mut VariantHandlers>,
) {
    if !authority.is_authoritative() {
        return;
    }
    let multiplier = config.global_multiplier(&*catalog, &artifacts);
    for mut handlers in &mut bodies {
        if handlers.iter().any(|h| !h.rolled) {
            roll_handlers(&mut handlers, multiplier, &mut rng.0);
        }
    }
}
