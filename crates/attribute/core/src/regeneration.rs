//! Regeneration descriptors consumed by an external scheduler.
//!
//! The engine never schedules itself. A periodic task applies the interval
//! sets every [`crate::config::EngineConfig::regeneration_interval_ms`], and
//! game-event handlers apply the kill-triggered sets.
//!
//! `current = min(maximum, current + multiplier × maximum + absolute)`

use std::sync::Arc;

use crate::definition::AttributeDefinition;
use crate::error::Result;
use crate::stats;
use crate::system::AttributeSystem;

/// Four attribute bindings describing one regeneration rule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Regeneration {
    pub multiplier: Arc<AttributeDefinition>,
    pub maximum: Arc<AttributeDefinition>,
    pub current: Arc<AttributeDefinition>,
    pub absolute: Arc<AttributeDefinition>,
}

impl Regeneration {
    pub fn new(
        multiplier: Arc<AttributeDefinition>,
        maximum: Arc<AttributeDefinition>,
        current: Arc<AttributeDefinition>,
        absolute: Arc<AttributeDefinition>,
    ) -> Self {
        Self {
            multiplier,
            maximum,
            current,
            absolute,
        }
    }

    /// The pure formula.
    pub fn next_value(multiplier: f32, maximum: f32, current: f32, absolute: f32) -> f32 {
        (current + multiplier * maximum + absolute).min(maximum)
    }

    /// Applies one tick to `system` and returns the new current value.
    pub fn apply(&self, system: &dyn AttributeSystem) -> Result<f32> {
        let value = Self::next_value(
            system.value_of(&self.multiplier),
            system.value_of(&self.maximum),
            system.value_of(&self.current),
            system.value_of(&self.absolute),
        );
        system.set_value(&self.current, value)?;
        Ok(value)
    }

    pub fn health() -> Self {
        Self::new(
            stats::health_recovery_multiplier().clone(),
            stats::maximum_health().clone(),
            stats::current_health().clone(),
            stats::health_recovery_absolute().clone(),
        )
    }

    pub fn mana() -> Self {
        Self::new(
            stats::mana_recovery_multiplier().clone(),
            stats::maximum_mana().clone(),
            stats::current_mana().clone(),
            stats::mana_recovery_absolute().clone(),
        )
    }

    pub fn shield() -> Self {
        Self::new(
            stats::shield_recovery_multiplier().clone(),
            stats::maximum_shield().clone(),
            stats::current_shield().clone(),
            stats::shield_recovery_absolute().clone(),
        )
    }

    pub fn ability() -> Self {
        Self::new(
            stats::ability_recovery_multiplier().clone(),
            stats::maximum_ability().clone(),
            stats::current_ability().clone(),
            stats::ability_recovery_absolute().clone(),
        )
    }

    /// Interval-based sets, in application order.
    pub fn interval_sets() -> Vec<Self> {
        vec![Self::health(), Self::mana(), Self::shield(), Self::ability()]
    }

    pub fn health_after_monster_kill() -> Self {
        Self::new(
            stats::health_after_monster_kill_multiplier().clone(),
            stats::maximum_health().clone(),
            stats::current_health().clone(),
            stats::health_after_monster_kill_absolute().clone(),
        )
    }

    pub fn mana_after_monster_kill() -> Self {
        Self::new(
            stats::mana_after_monster_kill_multiplier().clone(),
            stats::maximum_mana().clone(),
            stats::current_mana().clone(),
            stats::mana_after_monster_kill_absolute().clone(),
        )
    }

    /// Sets applied when the entity kills a monster.
    pub fn monster_kill_sets() -> Vec<Self> {
        vec![Self::health_after_monster_kill(), Self::mana_after_monster_kill()]
    }
}
