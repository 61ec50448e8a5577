//! Skill locator: four generic skill slots with prioritized overrides.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::content::SkillRef;

/// Named skill slot. `None` is representable in data but never valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkillSlot {
    None,
    Primary,
    Secondary,
    Utility,
    Special,
}

/// Override priority; higher wins
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SkillOverridePriority {
    Default,
    Loadout,
    Upgrade,
    Replacement,
    Contextual,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkillOverride {
    pub source: Entity,
    pub skill: SkillRef,
    pub priority: SkillOverridePriority,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenericSkill {
    pub base_skill: SkillRef,
    overrides: Vec<SkillOverride>,
}

impl GenericSkill {
    pub fn new(base_skill: SkillRef) -> Self {
        Self {
            base_skill,
            overrides: Vec::new(),
        }
    }

    pub fn set_skill_override(
        &mut self,
        source: Entity,
        skill: SkillRef,
        priority: SkillOverridePriority,
    ) {
        let duplicate = self
            .overrides
            .iter()
            .any(|o| o.source == source && o.skill == skill && o.priority == priority);
        if !duplicate {
            self.overrides.push(SkillOverride {
                source,
                skill,
                priority,
            });
        }
    }

    pub fn unset_skill_override(&mut self, source: Entity, skill: SkillRef) {
        self.overrides
            .retain(|o| !(o.source == source && o.skill == skill));
    }

    /// Highest-priority override, latest wins ties; falls back to the base skill
    pub fn current_skill(&self) -> SkillRef {
        self.overrides
            .iter()
            .max_by_key(|o| o.priority)
            .map_or(self.base_skill, |o| o.skill)
    }
}

#[derive(Component, Debug, Clone, Default)]
pub struct SkillLocator {
    pub primary: Option<GenericSkill>,
    pub secondary: Option<GenericSkill>,
    pub utility: Option<GenericSkill>,
    pub special: Option<GenericSkill>,
}

impl SkillLocator {
    pub fn slot(&self, slot: SkillSlot) -> Option<&GenericSkill> {
        match slot {
            SkillSlot::Primary => self.primary.as_ref(),
            SkillSlot::Secondary => self.secondary.as_ref(),
            SkillSlot::Utility => self.utility.as_ref(),
            SkillSlot::Special => self.special.as_ref(),
            SkillSlot::None => None,
        }
    }

    pub fn slot_mut(&mut self, slot: SkillSlot) -> Option<&mut GenericSkill> {
        match slot {
            SkillSlot::Primary => self.primary.as_mut(),
            SkillSlot::Secondary => self.secondary.as_mut(),
            SkillSlot::Utility => self.utility.as_mut(),
            SkillSlot::Special => self.special.as_mut(),
            SkillSlot::None => None,
        }
    }
}
