//! Derived elements computed from other attributes.

use std::sync::Arc;

use parking_lot::Mutex;

use super::notify::{ChangeCallback, ChangeNotifier, Subscription};
use super::{AggregateType, AtomicValue, Element};
use crate::config::EngineConfig;

/// Operator combining the summed inputs with the operand.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InputOperator {
    /// `input × operand`
    Multiply,
    /// `input + operand`
    Add,
    /// `input ^ operand`
    Exponentiate,
    /// `operand ^ input`
    ExponentiateByAttribute,
    /// `min(input, operand)`
    Minimum,
    /// `max(input, operand)`
    Maximum,
}

impl InputOperator {
    pub fn apply(self, input: f32, operand: f32) -> f32 {
        match self {
            Self::Multiply => input * operand,
            Self::Add => input + operand,
            Self::Exponentiate => input.powf(operand),
            Self::ExponentiateByAttribute => operand.powf(input),
            Self::Minimum => input.min(operand),
            Self::Maximum => input.max(operand),
        }
    }
}

/// Operand after its attribute reference (if any) was resolved.
#[derive(Clone)]
pub enum ResolvedOperand {
    Constant(f32),
    Element(Arc<dyn Element>),
}

impl ResolvedOperand {
    fn value(&self) -> f32 {
        match self {
            Self::Constant(value) => *value,
            Self::Element(element) => element.value(),
        }
    }
}

/// Element whose value is `operator(Σ inputs, operand)`.
///
/// Subscribes to every input (and an attribute operand) and re-raises its
/// own notification when the derived value changes. The subscriptions live
/// as long as the element does.
pub struct RelationshipElement {
    inputs: Vec<Arc<dyn Element>>,
    operator: InputOperator,
    operand: ResolvedOperand,
    aggregate_type: AggregateType,
    value: AtomicValue,
    recompute: Mutex<()>,
    notifier: ChangeNotifier,
    subscriptions: Mutex<Vec<Subscription>>,
}

impl RelationshipElement {
    pub fn new(
        inputs: Vec<Arc<dyn Element>>,
        operator: InputOperator,
        operand: ResolvedOperand,
        aggregate_type: AggregateType,
    ) -> Arc<Self> {
        let element = Arc::new(Self {
            inputs,
            operator,
            operand,
            aggregate_type,
            value: AtomicValue::new(0.0),
            recompute: Mutex::new(()),
            notifier: ChangeNotifier::new(),
            subscriptions: Mutex::new(Vec::new()),
        });

        let weak = Arc::downgrade(&element);
        let callback: ChangeCallback = Arc::new(move || {
            if let Some(element) = weak.upgrade() {
                element.refresh();
            }
        });

        let mut subscriptions: Vec<Subscription> = element
            .inputs
            .iter()
            .map(|input| input.subscribe(Arc::clone(&callback)))
            .collect();
        if let ResolvedOperand::Element(operand) = &element.operand {
            subscriptions.push(operand.subscribe(callback));
        }
        *element.subscriptions.lock() = subscriptions;

        // Subscribed first, so no input change can slip in unseen.
        {
            let _guard = element.recompute.lock();
            element.value.swap(element.compute());
        }
        element
    }

    pub fn operator(&self) -> InputOperator {
        self.operator
    }

    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    fn compute(&self) -> f32 {
        let input: f32 = self.inputs.iter().map(|input| input.value()).sum();
        self.operator.apply(input, self.operand.value())
    }

    fn refresh(&self) {
        let changed = {
            let _guard = self.recompute.lock();
            let value = self.compute();
            let previous = self.value.swap(value);
            (previous - value).abs() > EngineConfig::VALUE_EPSILON
        };
        if changed {
            self.notifier.notify();
        }
    }
}

impl Element for RelationshipElement {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{AttributeDefinition, AttributeId};
    use crate::element::{ComposableAttribute, ConstantElement};

    fn attribute(id: u32, base: f32) -> Arc<ComposableAttribute> {
        let attribute =
            ComposableAttribute::new(Arc::new(AttributeDefinition::new(AttributeId(id), "Input")));
        attribute.add_element(Arc::new(ConstantElement::new(base, AggregateType::AddRaw)));
        attribute
    }

    #[test]
    fn operators() {
        assert_eq!(InputOperator::Multiply.apply(4.0, 2.5), 10.0);
        assert_eq!(InputOperator::Add.apply(4.0, 2.5), 6.5);
        assert_eq!(InputOperator::Exponentiate.apply(3.0, 2.0), 9.0);
        assert_eq!(InputOperator::ExponentiateByAttribute.apply(3.0, 2.0), 8.0);
        assert_eq!(InputOperator::Minimum.apply(3.0, 2.0), 2.0);
        assert_eq!(InputOperator::Maximum.apply(3.0, 2.0), 3.0);
    }

    #[test]
    fn inputs_are_summed_before_operator() {
        let a = attribute(600, 10.0);
        let b = attribute(601, 20.0);
        let element = RelationshipElement::new(
            vec![a as Arc<dyn Element>, b],
            InputOperator::Multiply,
            ResolvedOperand::Constant(0.5),
            AggregateType::AddRaw,
        );
        assert_eq!(element.value(), 15.0);
    }

    #[test]
    fn follows_input_changes() {
        let vitality = attribute(602, 20.0);
        let element = RelationshipElement::new(
            vec![vitality.clone() as Arc<dyn Element>],
            InputOperator::Multiply,
            ResolvedOperand::Constant(2.0),
            AggregateType::AddRaw,
        );
        vitality.add_element(Arc::new(ConstantElement::new(5.0, AggregateType::AddRaw)));
        assert_eq!(element.value(), 50.0);
    }

    #[test]
    fn follows_operand_attribute_changes() {
        let level = attribute(603, 10.0);
        let factor = attribute(604, 2.0);
        let element = RelationshipElement::new(
            vec![level as Arc<dyn Element>],
            InputOperator::Multiply,
            ResolvedOperand::Element(factor.clone()),
            AggregateType::AddFinal,
        );
        assert_eq!(element.value(), 20.0);
        factor.add_element(Arc::new(ConstantElement::new(1.0, AggregateType::AddRaw)));
        assert_eq!(element.value(), 30.0);
        assert_eq!(element.aggregate_type(), AggregateType::AddFinal);
    }
}
