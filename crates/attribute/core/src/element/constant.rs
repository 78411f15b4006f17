//! Leaf elements: fixed constants and settable raw values.

use super::notify::{ChangeCallback, ChangeNotifier, Subscription};
use super::{AggregateType, AtomicValue, Element};
use crate::config::EngineConfig;

/// Element with a fixed value. Never notifies.
#[derive(Clone, Debug)]
pub struct ConstantElement {
    value: f32,
    aggregate_type: AggregateType,
}

impl ConstantElement {
    pub const fn new(value: f32, aggregate_type: AggregateType) -> Self {
        Self {
            value,
            aggregate_type,
        }
    }
}

impl Element for ConstantElement {
    fn value(&self) -> f32 {
        self.value
    }

    fn aggregate_type(&self) -> AggregateType {
        self.aggregate_type
    }

    fn subscribe(&self, _callback: ChangeCallback) -> Subscription {
        Subscription::inert()
    }
}

/// Raw element whose value can be replaced from outside.
///
/// Backs persisted base stats and externally forced synthetic attributes
/// (e.g. the safe-zone flag), and the seeded base of lightweight overrides.
pub struct SimpleElement {
    value: AtomicValue,
    aggregate_type: AggregateType,
    notifier: ChangeNotifier,
}

impl SimpleElement {
    pub fn new(value: f32, aggregate_type: AggregateType) -> Self {
        Self {
            value: AtomicValue::new(value),
            aggregate_type,
            notifier: ChangeNotifier::new(),
        }
    }

    /// Replaces the value and notifies subscribers if it changed.
    pub fn set_value(&self, value: f32) {
        let previous = self.value.swap(value);
        if (previous - value).abs() > EngineConfig::VALUE_EPSILON {
            self.notifier.notify();
        }
    }
}

impl Element for SimpleElement {
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

impl std::fmt::Debug for SimpleElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimpleElement")
            .field("value", &self.value.load())
            .field("aggregate_type", &self.aggregate_type)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn simple_element_notifies_only_on_change() {
        let element = SimpleElement::new(10.0, AggregateType::AddRaw);
        let count = Arc::new(AtomicUsize::new(0));
        let inner = Arc::clone(&count);
        let _subscription = element.subscribe(Arc::new(move || {
            inner.fetch_add(1, Ordering::SeqCst);
        }));

        element.set_value(10.0);
        assert_eq!(count.load(Ordering::SeqCst), 0);

        element.set_value(12.5);
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(element.value(), 12.5);
    }
}
