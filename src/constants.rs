//! Centralized constants for the variance core.
//!
//! Content identifiers that the pipeline special-cases live here so the
//! data assets and the code agree on a single spelling.

// =====================================================
// Selection
// =====================================================

/// Lower bound of a spawn rate, in percent
pub const MIN_SPAWN_RATE: f32 = 0.0;

/// Upper bound of a spawn rate, in percent
pub const MAX_SPAWN_RATE: f32 = 100.0;

/// Artifact that scales every spawn rate by the configured multiplier
pub const VARIANCE_ARTIFACT: &str = "VarianceArtifact";

// =====================================================
// Stats
// =====================================================

/// Per-level damage is recomputed as this fraction of the new base damage
pub const LEVEL_DAMAGE_FRACTION: f32 = 0.2;

// =====================================================
// Inventory
// =====================================================

/// Item that revives its holder; only ever granted once per master
pub const EXTRA_LIFE_ITEM: &str = "ExtraLife";

/// Cosmetic marker item granted to Uncommon and above (purple health bar)
pub const TIER_MARKER_ITEM: &str = "VariantHealthbarMarker";

// =====================================================
// Skeleton remap
// =====================================================

/// Seconds between a bone remap and the equipment / display-rule restore
pub const REMAP_RESTORE_DELAY: f32 = 0.2;

/// Trailing helper bones dropped from the mini mushrum rig after filtering
pub const MINI_MUSHRUM_TRAILING_BONES: usize = 7;

/// Left/right bone index pairs transposed on the beetle rig
pub const BEETLE_BONE_SWAPS: [(usize, usize); 3] = [(11, 14), (12, 15), (13, 16)];
