//! Variant data: definitions, the registry they live in, and the
//! per-entity handler state.

pub mod definition;
pub mod instance;
pub mod registry;

pub use definition::{
    AiModifier, DefinitionIssue, EquipmentInfo, ExtraComponent, LightReplacement,
    MaterialReplacement, MeshReplacement, NameOverride, NameOverrideKind, SizeModifier,
    SkillReplacement, VariantBuff, VariantDefinition, VariantInventory, VariantTier,
};
pub use instance::{CharacterLinks, VariantHandler, VariantHandlers, VariantSync};
pub use registry::{LoadSummary, VariantRegistry};
