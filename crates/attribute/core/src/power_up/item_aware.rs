//! Attribute system that remembers which power-ups belong to which item.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use super::{PowerUpWrapper, dispose_all};
use crate::definition::AttributeDefinition;
use crate::element::{ComposableAttribute, Element};
use crate::error::Result;
use crate::records::{AttributeRelationship, PowerUpDefinition};
use crate::system::{AttributeGraph, AttributeSystem};

/// Identity of an equipped item instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item#{}", self.0)
    }
}

/// [`AttributeGraph`] plus bookkeeping for item and set-bonus power-ups.
///
/// Every wrapper reachable from `item_power_ups` or `item_set_power_ups` is
/// attached to exactly one slot of the inner graph. Unequipping an item,
/// replacing the set bonus, or disposing the system detaches the
/// corresponding wrappers.
pub struct ItemAwareAttributeSystem {
    graph: Arc<AttributeGraph>,
    item_power_ups: Mutex<HashMap<ItemId, Vec<Arc<PowerUpWrapper>>>>,
    item_set_power_ups: Mutex<Vec<Arc<PowerUpWrapper>>>,
}

impl ItemAwareAttributeSystem {
    pub fn new(graph: AttributeGraph) -> Self {
        Self {
            graph: Arc::new(graph),
            item_power_ups: Mutex::new(HashMap::new()),
            item_set_power_ups: Mutex::new(Vec::new()),
        }
    }

    pub fn graph(&self) -> &Arc<AttributeGraph> {
        &self.graph
    }

    fn as_system(&self) -> Arc<dyn AttributeSystem> {
        Arc::clone(&self.graph) as Arc<dyn AttributeSystem>
    }

    /// Attaches the power-ups of `item` and remembers them under its id.
    ///
    /// Equipping an item that is already tracked replaces its power-ups.
    pub fn equip(&self, item: ItemId, power_ups: &[PowerUpDefinition]) -> Result<()> {
        let wrappers = PowerUpWrapper::create_all(power_ups, &self.as_system())?;
        debug!(%item, power_ups = wrappers.len(), "item equipped");

        let previous = self.item_power_ups.lock().insert(item, wrappers);
        if let Some(previous) = previous {
            debug!(%item, "replacing power-ups of re-equipped item");
            dispose_all(&previous);
        }
        Ok(())
    }

    /// Detaches every power-up of `item`. Returns `false` if it was not equipped.
    pub fn unequip(&self, item: ItemId) -> bool {
        let Some(wrappers) = self.item_power_ups.lock().remove(&item) else {
            return false;
        };
        dispose_all(&wrappers);
        debug!(%item, power_ups = wrappers.len(), "item unequipped");
        true
    }

    /// Replaces the active set-bonus power-ups wholesale.
    pub fn replace_item_set_power_ups(&self, power_ups: &[PowerUpDefinition]) -> Result<()> {
        let wrappers = PowerUpWrapper::create_all(power_ups, &self.as_system())?;
        let previous = std::mem::replace(&mut *self.item_set_power_ups.lock(), wrappers);
        dispose_all(&previous);
        debug!(
            removed = previous.len(),
            added = self.item_set_power_ups.lock().len(),
            "item set power-ups replaced"
        );
        Ok(())
    }

    pub fn is_equipped(&self, item: ItemId) -> bool {
        self.item_power_ups.lock().contains_key(&item)
    }

    pub fn equipped_items(&self) -> Vec<ItemId> {
        let mut items: Vec<_> = self.item_power_ups.lock().keys().copied().collect();
        items.sort();
        items
    }

    pub fn item_power_ups(&self, item: ItemId) -> Vec<Arc<PowerUpWrapper>> {
        self.item_power_ups
            .lock()
            .get(&item)
            .cloned()
            .unwrap_or_default()
    }

    pub fn item_set_power_up_count(&self) -> usize {
        self.item_set_power_ups.lock().len()
    }

    /// Detaches every tracked power-up. Safe to call more than once.
    pub fn dispose(&self) {
        let items: Vec<_> = self.item_power_ups.lock().drain().collect();
        for (_, wrappers) in &items {
            dispose_all(wrappers);
        }
        let set_power_ups = std::mem::take(&mut *self.item_set_power_ups.lock());
        dispose_all(&set_power_ups);
    }
}

impl Drop for ItemAwareAttributeSystem {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl AttributeSystem for ItemAwareAttributeSystem {
    fn value_of(&self, attribute: &AttributeDefinition) -> f32 {
        self.graph.value_of(attribute)
    }

    fn set_value(&self, attribute: &Arc<AttributeDefinition>, value: f32) -> Result<()> {
        self.graph.set_value(attribute, value)
    }

    fn add_element(&self, element: Arc<dyn Element>, target: &Arc<AttributeDefinition>) {
        self.graph.add_element(element, target);
    }

    fn remove_element(&self, element: &Arc<dyn Element>, target: &AttributeDefinition) {
        self.graph.remove_element(element, target);
    }

    fn add_attribute_relationship(&self, relationship: &AttributeRelationship) -> Result<()> {
        self.graph.add_attribute_relationship(relationship)
    }

    fn get_or_create_attribute(
        &self,
        attribute: &Arc<AttributeDefinition>,
    ) -> Result<Arc<ComposableAttribute>> {
        self.graph.get_or_create_attribute(attribute)
    }
}
