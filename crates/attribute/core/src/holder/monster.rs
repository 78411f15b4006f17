//! Monsters: base table per definition, live health on the instance.

use std::sync::LazyLock;

use super::{BaseTable, BaseTableCache, ComputedAccessor, HolderKind, LightweightAttributeHolder};
use crate::element::AtomicValue;
use crate::records::MonsterDefinition;
use crate::stats;

/// Marker for monster holders.
pub struct Monster;

/// Live state of one monster instance.
#[derive(Debug)]
pub struct MonsterState {
    health: AtomicValue,
}

impl MonsterState {
    pub fn new(health: f32) -> Self {
        Self {
            health: AtomicValue::new(health),
        }
    }

    pub fn health(&self) -> f32 {
        self.health.load()
    }

    pub fn set_health(&self, health: f32) {
        self.health.swap(health.max(0.0));
    }
}

pub type MonsterAttributeHolder = LightweightAttributeHolder<Monster>;

static BASE_TABLES: LazyLock<BaseTableCache> = LazyLock::new(|| BaseTableCache::new(Monster::NAME));

static ACCESSORS: [ComputedAccessor<MonsterState>; 1] = [ComputedAccessor {
    attribute: stats::current_health,
    get: MonsterState::health,
    set: Some(MonsterState::set_health),
}];

impl HolderKind for Monster {
    const NAME: &'static str = "monster";
    type State = MonsterState;

    fn base_tables() -> &'static BaseTableCache {
        &BASE_TABLES
    }

    fn computed_accessors() -> &'static [ComputedAccessor<MonsterState>] {
        &ACCESSORS
    }

    fn initial_state(_definition: &MonsterDefinition, base: &BaseTable) -> MonsterState {
        MonsterState::new(base.get(stats::maximum_health()).unwrap_or(0.0))
    }
}
