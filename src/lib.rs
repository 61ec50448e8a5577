//! Variance Core - runtime enemy variants
//!
//! Every character body that spawns gets one handler per variant registered
//! for it. Each handler rolls once against its spawn rate on the
//! authoritative side; a selected handler runs the mutation pipeline:
//! - Uniqueness and arrival announcement
//! - Stat multipliers, inventory and equipment grants
//! - Material, light and mesh swaps (with skeleton remap and deferred
//!   equipment restore)
//! - Skill, name, death-state, buff, size and AI changes
//! - Extra rewards on death
//!
//! Definitions are RON data assets loaded into the [`variant::VariantRegistry`].
//! [`plugin::VariancePlugin`] wires the whole thing into a Bevy app.

pub mod character;
pub mod config;
pub mod constants;
pub mod content;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod pipeline;
pub mod plugin;
pub mod remap;
pub mod selection;
pub mod variant;

pub use config::VarianceConfig;
pub use error::VariantError;
pub use pipeline::{apply_variant, Authority, VariantContext, VariantReport};
pub use plugin::VariancePlugin;
pub use variant::{VariantDefinition, VariantRegistry};
