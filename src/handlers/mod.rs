//! Secondary behaviours attached to a variant after it is applied.

pub mod components;
pub mod equipment;
pub mod reward;

pub use components::{AfterImage, ComponentFactory, ModelSpinner, VariantComponentRegistry};
pub use equipment::{EquipmentUseRequest, VariantEquipmentHandler};
pub use reward::{
    DropTier, RewardDefinition, VariantDeathEvent, VariantRewardDrop, VariantRewardHandler,
};
