use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::content::{ContentResolver, RunArtifacts};
use crate::error::VariantError;
use crate::handlers::RewardDefinition;

/// Global variance settings, read once per roll pass
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VarianceConfig {
    /// Let the variance artifact scale spawn rates
    pub enable_variance_artifact: bool,
    pub variance_multiplier: f32,
    pub variants_give_rewards: bool,
    pub default_rewards: RewardDefinition,
    /// Fixed seed for reproducible rolls; entropy when unset
    pub rng_seed: Option<u64>,
}

impl Default for VarianceConfig {
    fn default() -> Self {
        Self {
            enable_variance_artifact: true,
            variance_multiplier: 2.0,
            variants_give_rewards: true,
            default_rewards: RewardDefinition::default(),
            rng_seed: None,
        }
    }
}

impl VarianceConfig {
    pub fn from_json(json: &str) -> Result<Self, VariantError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_ron(source: &str) -> Result<Self, VariantError> {
        Ok(ron::from_str(source)?)
    }

    /// Load from a `.json` or `.ron` file, picked by extension
    pub fn load(path: &Path) -> Result<Self, VariantError> {
        let source = std::fs::read_to_string(path).map_err(|e| VariantError::io(path, e))?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("ron") => Self::from_ron(&source),
            _ => Self::from_json(&source),
        }
    }

    /// Multiplier applied to every spawn rate this run.
    ///
    /// 1.0 unless the toggle is on and the variance artifact exists and is
    /// enabled.
    pub fn global_multiplier(
        &self,
        resolver: &impl ContentResolver,
        artifacts: &RunArtifacts,
    ) -> f32 {
        if !self.enable_variance_artifact {
            return 1.0;
        }
        match resolver.resolve_artifact(crate::constants::VARIANCE_ARTIFACT) {
            Some(artifact) if artifacts.is_enabled(artifact) => self.variance_multiplier,
            _ => 1.0,
        }
    }
}
