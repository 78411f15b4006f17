//! Attach/detach handles for removable modifiers.
//!
//! A [`PowerUpWrapper`] is the unit of ownership for one attached modifier:
//! it is what gets inserted into the target slot, it owns the subscription
//! to the wrapped element, and disposing it is the only supported way to
//! detach.

pub mod item_aware;

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::trace;

pub use item_aware::{ItemAwareAttributeSystem, ItemId};

use crate::definition::AttributeDefinition;
use crate::element::{
    AggregateType, ChangeCallback, ChangeNotifier, ConstantElement, Element, Subscription,
};
use crate::error::Result;
use crate::records::PowerUpDefinition;
use crate::system::AttributeSystem;

/// Element forwarding a wrapped modifier, attached to one target attribute.
pub struct PowerUpWrapper {
    element: Arc<dyn Element>,
    target: Arc<AttributeDefinition>,
    parent: Mutex<Option<Weak<dyn AttributeSystem>>>,
    element_subscription: Mutex<Option<Subscription>>,
    notifier: ChangeNotifier,
    this: Weak<Self>,
}

impl PowerUpWrapper {
    /// Wraps `element` and attaches it to `target` in `system`.
    pub fn attach(
        element: Arc<dyn Element>,
        target: Arc<AttributeDefinition>,
        system: &Arc<dyn AttributeSystem>,
    ) -> Arc<Self> {
        let wrapper = Arc::new_cyclic(|this: &Weak<Self>| Self {
            element,
            target,
            parent: Mutex::new(Some(Arc::downgrade(system))),
            element_subscription: Mutex::new(None),
            notifier: ChangeNotifier::new(),
            this: this.clone(),
        });

        let forward: ChangeCallback = {
            let this = wrapper.this.clone();
            Arc::new(move || {
                if let Some(wrapper) = this.upgrade() {
                    wrapper.notifier.notify();
                }
            })
        };
        *wrapper.element_subscription.lock() = Some(wrapper.element.subscribe(forward));

        system.add_element(Arc::clone(&wrapper) as Arc<dyn Element>, &wrapper.target);
        trace!(target_attribute = %wrapper.target, value = wrapper.value(), "power-up attached");
        wrapper
    }

    /// Builds and attaches the wrappers described by one power-up definition:
    /// one for the constant boost (if any) and one per related value.
    ///
    /// Every referenced element is resolved before anything is attached, so a
    /// configuration error leaves `system` untouched.
    pub fn create_by_power_up_definition(
        definition: &PowerUpDefinition,
        system: &Arc<dyn AttributeSystem>,
    ) -> Result<Vec<Arc<Self>>> {
        let target = definition.target()?;
        let boost = definition.boost()?;

        let mut elements: Vec<Arc<dyn Element>> = Vec::new();
        if let Some(constant) = boost.constant_value {
            elements.push(Arc::new(ConstantElement::new(
                constant.value,
                constant.aggregate_type,
            )));
        }
        for derivation in &boost.related_values {
            elements.push(derivation.resolve(system.as_ref())?);
        }

        Ok(elements
            .into_iter()
            .map(|element| Self::attach(element, Arc::clone(target), system))
            .collect())
    }

    /// Applies several definitions; on failure, already attached wrappers are
    /// disposed again before the error is returned.
    pub fn create_all(
        definitions: &[PowerUpDefinition],
        system: &Arc<dyn AttributeSystem>,
    ) -> Result<Vec<Arc<Self>>> {
        let mut wrappers = Vec::new();
        for definition in definitions {
            match Self::create_by_power_up_definition(definition, system) {
                Ok(created) => wrappers.extend(created),
                Err(err) => {
                    dispose_all(&wrappers);
                    return Err(err);
                }
            }
        }
        Ok(wrappers)
    }

    pub fn target(&self) -> &Arc<AttributeDefinition> {
        &self.target
    }

    pub fn is_attached(&self) -> bool {
        self.parent.lock().is_some()
    }

    /// Detaches the modifier.
    ///
    /// In order: removes this wrapper from the parent slot, drops the
    /// subscription to the wrapped element, clears its own subscribers and
    /// forgets the parent. A repeated dispose is a no-op.
    pub fn dispose(&self) {
        let mut parent = self.parent.lock();
        let Some(system) = parent.as_ref() else {
            return;
        };

        if let (Some(system), Some(this)) = (system.upgrade(), self.this.upgrade()) {
            system.remove_element(&(this as Arc<dyn Element>), &self.target);
        }
        self.element_subscription.lock().take();
        self.notifier.clear();
        *parent = None;
        trace!(target_attribute = %self.target, "power-up disposed");
    }
}

/// Disposes every wrapper in `wrappers`.
pub fn dispose_all(wrappers: &[Arc<PowerUpWrapper>]) {
    for wrapper in wrappers {
        wrapper.dispose();
    }
}

impl Element for PowerUpWrapper {
    fn value(&self) -> f32 {
        self.element.value()
    }

    fn aggregate_type(&self) -> AggregateType {
        self.element.aggregate_type()
    }

    fn subscribe(&self, callback: ChangeCallback) -> Subscription {
        self.notifier.subscribe(callback)
    }
}

impl std::fmt::Debug for PowerUpWrapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PowerUpWrapper")
            .field("target", &self.target.designation())
            .field("value", &self.value())
            .field("aggregate_type", &self.aggregate_type())
            .field("attached", &self.is_attached())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{InputOperator, SimpleElement};
    use crate::records::{Derivation, Operand, PowerUpValue, StatValue};
    use crate::stats;
    use crate::system::AttributeGraph;

    fn graph_with_strength(value: f32) -> Arc<dyn AttributeSystem> {
        Arc::new(
            AttributeGraph::builder()
                .with_base_values([StatValue::new(stats::strength().clone(), value)])
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn dispose_removes_contribution() {
        let system = graph_with_strength(100.0);
        let wrappers = PowerUpWrapper::create_by_power_up_definition(
            &PowerUpDefinition::constant(stats::strength().clone(), 25.0, AggregateType::AddRaw),
            &system,
        )
        .unwrap();
        assert_eq!(wrappers.len(), 1);
        assert_eq!(system.value_of(stats::strength()), 125.0);

        wrappers[0].dispose();
        assert_eq!(system.value_of(stats::strength()), 100.0);
        assert!(!wrappers[0].is_attached());
    }

    #[test]
    fn double_dispose_is_noop() {
        let system = graph_with_strength(10.0);
        let wrapper = PowerUpWrapper::attach(
            Arc::new(ConstantElement::new(5.0, AggregateType::AddFinal)),
            stats::strength().clone(),
            &system,
        );
        wrapper.dispose();
        wrapper.dispose();
        assert_eq!(system.value_of(stats::strength()), 10.0);
    }

    #[test]
    fn forwards_wrapped_element_changes() {
        let system = graph_with_strength(10.0);
        let inner = Arc::new(SimpleElement::new(1.0, AggregateType::Multiplicate));
        let wrapper = PowerUpWrapper::attach(inner.clone(), stats::strength().clone(), &system);

        inner.set_value(2.0);
        assert_eq!(system.value_of(stats::strength()), 20.0);

        wrapper.dispose();
        inner.set_value(3.0);
        assert_eq!(system.value_of(stats::strength()), 10.0);
    }

    #[test]
    fn related_value_creates_one_wrapper_each() {
        let system = graph_with_strength(50.0);
        let definition = PowerUpDefinition {
            target_attribute: Some(stats::defense_base().clone()),
            boost: Some(PowerUpValue {
                constant_value: Some(crate::records::ConstantBoost {
                    value: 4.0,
                    aggregate_type: AggregateType::AddRaw,
                }),
                related_values: vec![Derivation::new(
                    vec![stats::strength().clone()],
                    InputOperator::Multiply,
                    Operand::Constant(0.1),
                    AggregateType::AddRaw,
                )],
            }),
        };

        let wrappers = PowerUpWrapper::create_by_power_up_definition(&definition, &system).unwrap();
        assert_eq!(wrappers.len(), 2);
        assert_eq!(system.value_of(stats::defense_base()), 9.0);

        system.set_value(stats::strength(), 100.0).unwrap();
        assert_eq!(system.value_of(stats::defense_base()), 14.0);

        dispose_all(&wrappers);
        assert_eq!(system.value_of(stats::defense_base()), 0.0);
    }

    #[test]
    fn missing_boost_attaches_nothing() {
        let system = graph_with_strength(10.0);
        let definitions = [
            PowerUpDefinition::constant(stats::strength().clone(), 5.0, AggregateType::AddRaw),
            PowerUpDefinition {
                target_attribute: Some(stats::strength().clone()),
                boost: None,
            },
        ];
        assert!(PowerUpWrapper::create_all(&definitions, &system).is_err());
        assert_eq!(system.value_of(stats::strength()), 10.0);
    }
}
