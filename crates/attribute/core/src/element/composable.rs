//! Aggregation node combining a multiset of elements into one attribute value.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use super::notify::{ChangeCallback, ChangeNotifier, Subscription};
use super::{AggregateType, AtomicValue, Element, same_element};
use crate::config::EngineConfig;
use crate::definition::AttributeDefinition;

struct AttachedElement {
    element: Arc<dyn Element>,
    _subscription: Subscription,
}

/// One attribute slot of an attribute system.
///
/// Owns the subscriptions to its children, not the children themselves:
/// a child may be shared by several attributes. Duplicates are allowed.
///
/// # Aggregation
///
/// ```text
/// value = clamp((Σ AddRaw) × (Π Multiplicate, or 1 if none) + (Σ AddFinal))
/// ```
///
/// The phase order is fixed. Raw bonuses sum first, scaling bonuses multiply
/// the raw total, and final bonuses are flat additions after scaling.
///
/// # Concurrency
///
/// Add/remove/recompute run under a per-instance mutex. `value()` reads the
/// cached aggregate without locking. Dependents are notified after the lock
/// is released.
pub struct ComposableAttribute {
    definition: Arc<AttributeDefinition>,
    aggregate_type: AggregateType,
    elements: Mutex<Vec<AttachedElement>>,
    value: AtomicValue,
    notifier: ChangeNotifier,
    this: Weak<Self>,
}

impl ComposableAttribute {
    /// Creates an empty attribute contributing as `AddRaw` when used as an element.
    pub fn new(definition: Arc<AttributeDefinition>) -> Arc<Self> {
        Self::with_aggregate_type(definition, AggregateType::AddRaw)
    }

    pub fn with_aggregate_type(
        definition: Arc<AttributeDefinition>,
        aggregate_type: AggregateType,
    ) -> Arc<Self> {
        let initial = definition.clamp(0.0);
        Arc::new_cyclic(|this| Self {
            definition,
            aggregate_type,
            elements: Mutex::new(Vec::new()),
            value: AtomicValue::new(initial),
            notifier: ChangeNotifier::new(),
            this: this.clone(),
        })
    }

    pub fn definition(&self) -> &Arc<AttributeDefinition> {
        &self.definition
    }

    /// Inserts an element, subscribes to it and recomputes.
    pub fn add_element(&self, element: Arc<dyn Element>) {
        let changed = {
            let mut elements = self.elements.lock();
            let subscription = element.subscribe(self.element_changed_callback());
            elements.push(AttachedElement {
                element,
                _subscription: subscription,
            });
            self.recompute(&elements)
        };
        if changed {
            self.notifier.notify();
        }
    }

    /// Removes one occurrence of `element` (by identity).
    ///
    /// Returns `false` when the element was not attached; that is not an error,
    /// concurrent cleanup paths may race to remove the same element.
    pub fn remove_element(&self, element: &Arc<dyn Element>) -> bool {
        let (removed, changed) = {
            let mut elements = self.elements.lock();
            let Some(index) = elements
                .iter()
                .position(|attached| same_element(&attached.element, element))
            else {
                return false;
            };
            // Dropping the entry releases the subscription.
            let removed = elements.remove(index);
            (removed, self.recompute(&elements))
        };
        drop(removed);
        if changed {
            self.notifier.notify();
        }
        true
    }

    pub fn contains(&self, element: &Arc<dyn Element>) -> bool {
        self.elements
            .lock()
            .iter()
            .any(|attached| same_element(&attached.element, element))
    }

    pub fn element_count(&self) -> usize {
        self.elements.lock().len()
    }

    /// Snapshot of the attached elements.
    pub fn elements(&self) -> Vec<Arc<dyn Element>> {
        self.elements
            .lock()
            .iter()
            .map(|attached| Arc::clone(&attached.element))
            .collect()
    }

    /// Recomputes from the current children (e.g. after a missed notification).
    pub fn refresh(&self) {
        let changed = {
            let elements = self.elements.lock();
            self.recompute(&elements)
        };
        if changed {
            self.notifier.notify();
        }
    }

    fn element_changed_callback(&self) -> ChangeCallback {
        let this = self.this.clone();
        Arc::new(move || {
            if let Some(attribute) = this.upgrade() {
                attribute.refresh();
            }
        })
    }

    /// Stores the new aggregate; returns whether it changed.
    fn recompute(&self, elements: &[AttachedElement]) -> bool {
        let total = aggregate(
            elements
                .iter()
                .map(|attached| (attached.element.value(), attached.element.aggregate_type())),
        );
        let value = self.definition.clamp(total);
        let previous = self.value.swap(value);
        (previous - value).abs() > EngineConfig::VALUE_EPSILON
    }
}

/// The three-phase aggregation formula over `(value, phase)` contributions.
pub fn aggregate(contributions: impl IntoIterator<Item = (f32, AggregateType)>) -> f32 {
    let mut raw = 0.0_f32;
    let mut multiplier: Option<f32> = None;
    let mut final_sum = 0.0_f32;

    for (value, aggregate_type) in contributions {
        match aggregate_type {
            AggregateType::AddRaw => raw += value,
            AggregateType::Multiplicate => *multiplier.get_or_insert(1.0) *= value,
            AggregateType::AddFinal => final_sum += value,
        }
    }

    raw * multiplier.unwrap_or(1.0) + final_sum
}

impl Element for ComposableAttribute {
    fn value(&self) -> f32 {
        self.value.load()
    }

    fn aggregate_type(&self) -> AggregateType {
        self.aggregate_type
    }

    fn subscribe(&self, callback: ChangeCallback) -> Subscription {
        self.notifier.subscribe(callback)
    }
}

impl std::fmt::Debug for ComposableAttribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComposableAttribute")
            .field("definition", &self.definition.designation())
            .field("value", &self.value.load())
            .field("elements", &self.element_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::AttributeId;
    use crate::element::{ConstantElement, SimpleElement};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn definition() -> Arc<AttributeDefinition> {
        Arc::new(AttributeDefinition::new(AttributeId(500), "Test"))
    }

    fn constant(value: f32, aggregate_type: AggregateType) -> Arc<dyn Element> {
        Arc::new(ConstantElement::new(value, aggregate_type))
    }

    #[test]
    fn empty_attribute_is_zero() {
        assert_eq!(ComposableAttribute::new(definition()).value(), 0.0);
    }

    #[test]
    fn three_phase_formula() {
        let attribute = ComposableAttribute::new(definition());
        attribute.add_element(constant(100.0, AggregateType::AddRaw));
        attribute.add_element(constant(20.0, AggregateType::AddRaw));
        attribute.add_element(constant(1.5, AggregateType::Multiplicate));
        attribute.add_element(constant(2.0, AggregateType::Multiplicate));
        attribute.add_element(constant(7.0, AggregateType::AddFinal));

        // (100 + 20) × 1.5 × 2 + 7
        assert_eq!(attribute.value(), 367.0);
    }

    #[test]
    fn multiplicate_only_scales_raw_total() {
        let attribute = ComposableAttribute::new(definition());
        attribute.add_element(constant(3.0, AggregateType::Multiplicate));
        attribute.add_element(constant(5.0, AggregateType::AddFinal));
        assert_eq!(attribute.value(), 5.0);
    }

    #[test]
    fn duplicates_are_counted_and_removed_one_at_a_time() {
        let attribute = ComposableAttribute::new(definition());
        let bonus = constant(10.0, AggregateType::AddRaw);
        attribute.add_element(Arc::clone(&bonus));
        attribute.add_element(Arc::clone(&bonus));
        assert_eq!(attribute.value(), 20.0);

        assert!(attribute.remove_element(&bonus));
        assert_eq!(attribute.value(), 10.0);
        assert!(attribute.remove_element(&bonus));
        assert!(!attribute.remove_element(&bonus));
        assert_eq!(attribute.value(), 0.0);
    }

    #[test]
    fn child_change_propagates() {
        let attribute = ComposableAttribute::new(definition());
        let base = Arc::new(SimpleElement::new(40.0, AggregateType::AddRaw));
        attribute.add_element(base.clone());
        base.set_value(55.0);
        assert_eq!(attribute.value(), 55.0);
    }

    #[test]
    fn removed_child_no_longer_propagates() {
        let attribute = ComposableAttribute::new(definition());
        let base = Arc::new(SimpleElement::new(40.0, AggregateType::AddRaw));
        let as_element: Arc<dyn Element> = base.clone();
        attribute.add_element(Arc::clone(&as_element));
        attribute.remove_element(&as_element);
        base.set_value(99.0);
        assert_eq!(attribute.value(), 0.0);
    }

    #[test]
    fn clamp_to_maximum() {
        let bounded = Arc::new(
            AttributeDefinition::new(AttributeId(501), "Bounded")
                .with_minimum(0.0)
                .with_maximum(50.0),
        );
        let attribute = ComposableAttribute::new(bounded);
        attribute.add_element(constant(80.0, AggregateType::AddRaw));
        assert_eq!(attribute.value(), 50.0);
        attribute.add_element(constant(-200.0, AggregateType::AddFinal));
        assert_eq!(attribute.value(), 0.0);
    }

    #[test]
    fn nested_attribute_notifies_parent() {
        let inner = ComposableAttribute::new(definition());
        let outer = ComposableAttribute::new(Arc::new(AttributeDefinition::new(
            AttributeId(502),
            "Outer",
        )));
        outer.add_element(inner.clone());
        inner.add_element(constant(12.0, AggregateType::AddRaw));
        assert_eq!(outer.value(), 12.0);
    }

    #[test]
    fn neutral_elements_do_not_notify() {
        let attribute = ComposableAttribute::new(definition());
        let notified = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&notified);
        let _subscription = attribute.subscribe(Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        attribute.add_element(constant(10.0, AggregateType::AddRaw));
        assert_eq!(notified.load(Ordering::SeqCst), 1);

        let nothing = constant(0.0, AggregateType::AddFinal);
        let unit = constant(1.0, AggregateType::Multiplicate);
        attribute.add_element(Arc::clone(&nothing));
        attribute.add_element(Arc::clone(&unit));
        attribute.remove_element(&nothing);
        attribute.remove_element(&unit);
        assert_eq!(attribute.value(), 10.0);
        assert_eq!(notified.load(Ordering::SeqCst), 1);
    }
}
