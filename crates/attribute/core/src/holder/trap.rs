//! Traps: no mutable state, base table and dynamic overrides only.

use std::sync::LazyLock;

use super::{BaseTable, BaseTableCache, ComputedAccessor, HolderKind, LightweightAttributeHolder};
use crate::records::MonsterDefinition;

pub struct Trap;

pub type TrapAttributeHolder = LightweightAttributeHolder<Trap>;

static BASE_TABLES: LazyLock<BaseTableCache> = LazyLock::new(|| BaseTableCache::new(Trap::NAME));

impl HolderKind for Trap {
    const NAME: &'static str = "trap";
    type State = ();

    fn base_tables() -> &'static BaseTableCache {
        &BASE_TABLES
    }

    fn computed_accessors() -> &'static [ComputedAccessor<()>] {
        &[]
    }

    fn initial_state(_definition: &MonsterDefinition, _base: &BaseTable) {}
}
