use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use attribute_content::{ContentFactory, MonsterKind};
use attribute_core::{
    AttributeGraph, AttributeId, AttributeSystem, DestructibleAttributeHolder,
    ItemAwareAttributeSystem, MonsterAttributeHolder, Regeneration, StatValue,
    TrapAttributeHolder, stats,
};
use tempfile::TempDir;

fn data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("data")
}

#[test]
fn loads_sample_data_directory() {
    let content = ContentFactory::new(data_dir()).load_all().unwrap();

    assert_eq!(content.config.regeneration_interval_ms, 3000);
    assert_eq!(content.classes.len(), 2);
    assert_eq!(content.monsters.len(), 4);
    assert_eq!(content.items.len(), 2);
    assert!(content.catalog.get(AttributeId(100)).is_some());
    assert!(Arc::ptr_eq(
        &content.catalog.get(stats::strength().id()).unwrap(),
        stats::strength()
    ));
}

#[test]
fn wizard_plays_with_loaded_content() {
    let content = ContentFactory::new(data_dir()).load_all().unwrap();
    let wizard = content.class(0).unwrap();

    let graph = AttributeGraph::builder()
        .with_base_values([StatValue::new(stats::current_health().clone(), 10.0)])
        .with_class(wizard)
        .build()
        .unwrap();
    assert_eq!(graph.value_of(stats::maximum_health()), 30.0);
    assert_eq!(graph.value_of(stats::maximum_mana()), 60.0);

    let system = ItemAwareAttributeSystem::new(graph);
    let sword = content.item(1).unwrap();
    let ring = content.item(2).unwrap();
    system.equip(sword.item, &sword.power_ups).unwrap();
    system.equip(ring.item, &ring.power_ups).unwrap();

    // (18 + 20) × 1.1
    assert!((system.value_of(stats::strength()) - 41.8).abs() < 1e-3);
    let resistance = content.catalog.get(AttributeId(100)).unwrap();
    assert!((system.value_of(&resistance) - 0.1).abs() < 1e-6);

    // 10 + 0.01 × 30 + 0
    let health = Regeneration::health().apply(&system).unwrap();
    assert!((health - 10.3).abs() < 1e-4);

    system.unequip(ring.item);
    assert_eq!(system.value_of(stats::strength()), 38.0);
    assert_eq!(system.value_of(&resistance), 0.0);
}

#[test]
fn spawns_every_holder_kind() {
    let content = ContentFactory::new(data_dir()).load_all().unwrap();

    for loaded in &content.monsters {
        match loaded.kind {
            MonsterKind::Monster => {
                let monster = MonsterAttributeHolder::spawn(&loaded.definition);
                assert_eq!(
                    monster.value_of(stats::current_health()),
                    monster.value_of(stats::maximum_health())
                );
            }
            MonsterKind::Destructible => {
                let gate = DestructibleAttributeHolder::spawn(&loaded.definition);
                assert_eq!(gate.value_of(stats::defense_base()), 100.0);
            }
            MonsterKind::Trap => {
                let trap = TrapAttributeHolder::spawn(&loaded.definition);
                assert!(trap.set_value(stats::current_health(), 1.0).is_err());
            }
        }
    }
}

#[test]
fn unknown_attribute_fails_the_whole_load() {
    let temp_dir = TempDir::new().unwrap();
    for file in ["config.toml", "attributes.ron", "classes.ron", "monsters.ron"] {
        fs::copy(data_dir().join(file), temp_dir.path().join(file)).unwrap();
    }
    fs::write(
        temp_dir.path().join("items.ron"),
        r#"(items: [(number: 1, name: "Cursed", power_ups: [(target: Some(777))])])"#,
    )
    .unwrap();

    let err = ContentFactory::new(temp_dir.path()).load_all().unwrap_err();
    assert!(err.to_string().contains("777"));
}

#[test]
fn config_file_overrides_defaults() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("config.toml"), "seed_epsilon = 0.5\n").unwrap();

    let config = ContentFactory::new(temp_dir.path()).load_config().unwrap();
    assert_eq!(config.seed_epsilon, 0.5);
    assert_eq!(config.regeneration_interval_ms, 3000);
}
