//! Per-instance dynamic overrides for lightweight holders.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::trace;

use crate::definition::AttributeDefinition;
use crate::element::{AggregateType, ComposableAttribute, Element, SimpleElement};

struct OverrideSlot {
    attribute: Arc<ComposableAttribute>,
    base: Arc<SimpleElement>,
}

/// Optional `{attribute → ComposableAttribute}` table of one instance.
///
/// Absent until the first element is added and dropped again once every
/// slot has fallen back to its seeded base. Guarded per instance, so
/// unrelated instances never contend.
#[derive(Default)]
pub struct DynamicOverrides {
    slots: RwLock<Option<HashMap<Arc<AttributeDefinition>, OverrideSlot>>>,
}

impl DynamicOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_allocated(&self) -> bool {
        self.slots.read().is_some()
    }

    pub fn contains(&self, attribute: &AttributeDefinition) -> bool {
        self.slots
            .read()
            .as_ref()
            .is_some_and(|slots| slots.contains_key(attribute))
    }

    pub fn value_of(&self, attribute: &AttributeDefinition) -> Option<f32> {
        self.slots
            .read()
            .as_ref()?
            .get(attribute)
            .map(|slot| slot.attribute.value())
    }

    /// Adds `element` to the override of `target`.
    ///
    /// A missing override is created first and seeded with one raw element
    /// holding `seed()`: the value the instance reported before.
    pub fn add(
        &self,
        element: Arc<dyn Element>,
        target: &Arc<AttributeDefinition>,
        seed: impl FnOnce() -> f32,
    ) {
        let mut guard = self.slots.write();
        let slots = guard.get_or_insert_with(|| {
            trace!(attribute = %target, "allocating dynamic attribute table");
            HashMap::new()
        });
        let slot = slots.entry(Arc::clone(target)).or_insert_with(|| {
            let attribute = ComposableAttribute::new(Arc::clone(target));
            let base = Arc::new(SimpleElement::new(seed(), AggregateType::AddRaw));
            attribute.add_element(Arc::clone(&base) as Arc<dyn Element>);
            OverrideSlot { attribute, base }
        });
        slot.attribute.add_element(element);
    }

    /// Removes `element` from the override of `target`.
    ///
    /// The override is dropped once only the seeded base remains, and the
    /// whole table once it is empty. Absent table or slot is a no-op.
    pub fn remove(&self, element: &Arc<dyn Element>, target: &AttributeDefinition) {
        let mut guard = self.slots.write();
        let Some(slots) = guard.as_mut() else {
            return;
        };
        let Some(slot) = slots.get(target) else {
            return;
        };

        slot.attribute.remove_element(element);
        if slot.attribute.element_count() <= 1 {
            slots.remove(target);
        }
        if slots.is_empty() {
            trace!(attribute = %target, "releasing dynamic attribute table");
            *guard = None;
        }
    }

    /// Replaces the seeded base value of `target`'s override, if one exists.
    pub fn set_base(&self, target: &AttributeDefinition, value: f32) -> bool {
        let base = self
            .slots
            .read()
            .as_ref()
            .and_then(|slots| slots.get(target))
            .map(|slot| Arc::clone(&slot.base));
        match base {
            Some(base) => {
                base.set_value(value);
                true
            }
            None => false,
        }
    }
}
