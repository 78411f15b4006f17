use std::sync::Arc;

use attribute_core::{
    AggregateType, AttributeDefinition, AttributeGraph, AttributeId, AttributeSystem,
    ComposableAttribute, ConstantElement, Element, MonsterAttributeHolder, MonsterDefinition,
    PowerUpDefinition, PowerUpWrapper, StatValue, stats,
};
use proptest::prelude::*;

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() <= 1e-3 * (1.0 + a.abs().max(b.abs()))
}

fn aggregate_type() -> impl Strategy<Value = AggregateType> {
    prop_oneof![
        Just(AggregateType::AddRaw),
        Just(AggregateType::Multiplicate),
        Just(AggregateType::AddFinal),
    ]
}

fn attribute() -> Arc<ComposableAttribute> {
    ComposableAttribute::new(Arc::new(AttributeDefinition::new(AttributeId(9_000), "Prop")))
}

proptest! {
    #[test]
    fn value_matches_three_phase_formula(
        raw in prop::collection::vec(-100.0f32..100.0, 0..6),
        multipliers in prop::collection::vec(0.5f32..2.0, 0..4),
        finals in prop::collection::vec(-100.0f32..100.0, 0..6),
    ) {
        let attribute = attribute();
        for value in &raw {
            attribute.add_element(Arc::new(ConstantElement::new(*value, AggregateType::AddRaw)));
        }
        for value in &multipliers {
            attribute.add_element(Arc::new(ConstantElement::new(*value, AggregateType::Multiplicate)));
        }
        for value in &finals {
            attribute.add_element(Arc::new(ConstantElement::new(*value, AggregateType::AddFinal)));
        }

        let product = if multipliers.is_empty() { 1.0 } else { multipliers.iter().product() };
        let expected = raw.iter().sum::<f32>() * product + finals.iter().sum::<f32>();
        prop_assert!(approx_eq(attribute.value(), expected));
    }

    #[test]
    fn add_then_remove_round_trips(
        base in -100.0f32..100.0,
        value in 0.5f32..2.0,
        phase in aggregate_type(),
    ) {
        let attribute = attribute();
        attribute.add_element(Arc::new(ConstantElement::new(base, AggregateType::AddRaw)));
        let before = attribute.value();

        let element: Arc<dyn Element> = Arc::new(ConstantElement::new(value, phase));
        attribute.add_element(Arc::clone(&element));
        prop_assert!(attribute.remove_element(&element));
        prop_assert!(approx_eq(attribute.value(), before));
    }

    #[test]
    fn disposed_power_up_leaves_no_trace(
        base in 1.0f32..500.0,
        bonus in 0.5f32..50.0,
        phase in aggregate_type(),
    ) {
        let system: Arc<dyn AttributeSystem> = Arc::new(
            AttributeGraph::builder()
                .with_base_values([StatValue::new(stats::vitality().clone(), base)])
                .build()
                .unwrap(),
        );
        let before = system.value_of(stats::vitality());
        let wrappers = PowerUpWrapper::create_by_power_up_definition(
            &PowerUpDefinition::constant(stats::vitality().clone(), bonus, phase),
            &system,
        ).unwrap();
        for wrapper in &wrappers {
            wrapper.dispose();
        }
        prop_assert!(approx_eq(system.value_of(stats::vitality()), before));
    }

    #[test]
    fn clamped_attribute_never_exceeds_maximum(values in prop::collection::vec(0.0f32..1000.0, 1..8)) {
        let bounded = ComposableAttribute::new(Arc::new(
            AttributeDefinition::new(AttributeId(9_001), "Bounded").with_maximum(250.0),
        ));
        for value in &values {
            bounded.add_element(Arc::new(ConstantElement::new(*value, AggregateType::AddRaw)));
        }
        let total: f32 = values.iter().sum();
        if total > 250.0 {
            prop_assert_eq!(bounded.value(), 250.0);
        } else {
            prop_assert!(approx_eq(bounded.value(), total));
        }
    }

    #[test]
    fn monster_override_round_trips(
        value in 0.5f32..2.0,
        phase in aggregate_type(),
    ) {
        let definition = Arc::new(
            MonsterDefinition::new(60_001, "Prop Monster")
                .with_attribute(stats::defense_base().clone(), 50.0),
        );
        let monster = MonsterAttributeHolder::spawn(&definition);
        let before = monster.value_of(stats::attack_speed());

        let element: Arc<dyn Element> = Arc::new(ConstantElement::new(value, phase));
        monster.add_element(Arc::clone(&element), stats::attack_speed());
        monster.remove_element(&element, stats::attack_speed());

        prop_assert_eq!(monster.value_of(stats::attack_speed()), before);
        prop_assert!(!monster.has_dynamic_overrides());
    }
}
