//! Destructible objects (gates, statues): static stats plus live health.

use std::sync::LazyLock;

use super::{BaseTable, BaseTableCache, ComputedAccessor, HolderKind, LightweightAttributeHolder};
use crate::element::AtomicValue;
use crate::records::MonsterDefinition;
use crate::stats;

pub struct Destructible;

#[derive(Debug)]
pub struct DestructibleState {
    health: AtomicValue,
}

impl DestructibleState {
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

    pub fn is_destroyed(&self) -> bool {
        self.health() <= 0.0
    }
}

pub type DestructibleAttributeHolder = LightweightAttributeHolder<Destructible>;

static BASE_TABLES: LazyLock<BaseTableCache> =
    LazyLock::new(|| BaseTableCache::new(Destructible::NAME));

static ACCESSORS: [ComputedAccessor<DestructibleState>; 1] = [ComputedAccessor {
    attribute: stats::current_health,
    get: DestructibleState::health,
    set: Some(DestructibleState::set_health),
}];

impl HolderKind for Destructible {
    const NAME: &'static str = "destructible";
    type State = DestructibleState;

    fn base_tables() -> &'static BaseTableCache {
        &BASE_TABLES
    }

    fn computed_accessors() -> &'static [ComputedAccessor<DestructibleState>] {
        &ACCESSORS
    }

    fn initial_state(_definition: &MonsterDefinition, base: &BaseTable) -> DestructibleState {
        DestructibleState::new(base.get(stats::maximum_health()).unwrap_or(0.0))
    }
}
