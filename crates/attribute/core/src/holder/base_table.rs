//! Per-definition base tables shared by every instance of that definition.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use dashmap::DashMap;
use tracing::debug;

use crate::definition::AttributeDefinition;
use crate::records::MonsterDefinition;

/// Read-only attribute values of one monster definition.
#[derive(Debug, Default)]
pub struct BaseTable {
    values: HashMap<Arc<AttributeDefinition>, f32>,
}

impl BaseTable {
    /// Builds the table; repeated entries for one attribute are summed.
    pub fn from_definition(definition: &MonsterDefinition) -> Self {
        let mut values = HashMap::with_capacity(definition.attributes.len());
        for stat in &definition.attributes {
            *values.entry(Arc::clone(&stat.definition)).or_insert(0.0) += stat.value;
        }
        Self { values }
    }

    pub fn get(&self, attribute: &AttributeDefinition) -> Option<f32> {
        self.values.get(attribute).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Cached table plus a weak handle that pins the definition's address.
///
/// The allocation behind a `Weak` is never freed or reused while the handle
/// exists, so the address key cannot be taken over by another definition.
struct CachedTable {
    definition: Weak<MonsterDefinition>,
    table: Arc<BaseTable>,
}

/// Process-wide memo of base tables, one per distinct definition instance.
///
/// Keyed by the address of the shared `Arc<MonsterDefinition>`, not by its
/// number: a reloaded definition reusing a number gets its own table.
/// Concurrent first access from instances spawned at the same time yields a
/// single table: insertion goes through the map's entry lock.
pub struct BaseTableCache {
    kind: &'static str,
    tables: DashMap<usize, CachedTable>,
}

impl BaseTableCache {
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            tables: DashMap::new(),
        }
    }

    /// Returns the shared table of `definition`, building it on first access.
    pub fn get_or_build(&self, definition: &Arc<MonsterDefinition>) -> Arc<BaseTable> {
        let key = Arc::as_ptr(definition) as usize;
        if let Some(cached) = self.tables.get(&key) {
            return Arc::clone(&cached.table);
        }

        // Tables of definitions nobody holds anymore.
        self.tables.retain(|_, cached| cached.definition.strong_count() > 0);

        let entry = self.tables.entry(key).or_insert_with(|| {
            debug!(
                kind = self.kind,
                number = definition.number,
                designation = %definition.designation,
                "building base attribute table"
            );
            CachedTable {
                definition: Arc::downgrade(definition),
                table: Arc::new(BaseTable::from_definition(definition)),
            }
        });
        Arc::clone(&entry.table)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats;

    #[test]
    fn table_sums_repeated_entries() {
        let definition = MonsterDefinition::new(1, "Spider")
            .with_attribute(stats::defense_base().clone(), 2.0)
            .with_attribute(stats::defense_base().clone(), 3.0);
        let table = BaseTable::from_definition(&definition);
        assert_eq!(table.get(stats::defense_base()), Some(5.0));
        assert_eq!(table.get(stats::strength()), None);
    }

    #[test]
    fn cache_returns_same_instance() {
        let cache = BaseTableCache::new("test");
        let definition = Arc::new(
            MonsterDefinition::new(2, "Budge Dragon")
                .with_attribute(stats::maximum_health().clone(), 60.0),
        );
        let first = cache.get_or_build(&definition);
        let second = cache.get_or_build(&definition);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn concurrent_first_access_builds_one_table() {
        let cache = BaseTableCache::new("test");
        let definition = Arc::new(
            MonsterDefinition::new(3, "Goblin")
                .with_attribute(stats::maximum_health().clone(), 45.0),
        );

        let tables: Vec<Arc<BaseTable>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| cache.get_or_build(&definition)))
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().unwrap())
                .collect()
        });

        assert!(tables.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
    }

    #[test]
    fn reloaded_definition_with_same_number_gets_its_own_table() {
        let cache = BaseTableCache::new("test");
        let old = Arc::new(
            MonsterDefinition::new(7, "Spider")
                .with_attribute(stats::defense_base().clone(), 10.0),
        );
        let reloaded = Arc::new(
            MonsterDefinition::new(7, "Spider")
                .with_attribute(stats::defense_base().clone(), 99.0),
        );

        let old_table = cache.get_or_build(&old);
        let reloaded_table = cache.get_or_build(&reloaded);
        assert!(!Arc::ptr_eq(&old_table, &reloaded_table));
        assert_eq!(old_table.get(stats::defense_base()), Some(10.0));
        assert_eq!(reloaded_table.get(stats::defense_base()), Some(99.0));
    }

    #[test]
    fn tables_of_dropped_definitions_are_released() {
        let cache = BaseTableCache::new("test");
        let first = Arc::new(MonsterDefinition::new(8, "Hound"));
        cache.get_or_build(&first);
        drop(first);

        let second = Arc::new(MonsterDefinition::new(9, "Yeti"));
        cache.get_or_build(&second);
        assert_eq!(cache.len(), 1);
    }
}
