//! Character class loader.

use std::path::Path;

use attribute_core::{
    AggregateType, AttributeCatalog, AttributeRelationship, CharacterClass, ConstValue,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::loaders::{DerivationSpec, LoadResult, read_file, resolve_attribute, resolve_optional};

/// Class-level constant as written in `classes.ron`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstValueSpec {
    pub attribute: u32,
    pub value: f32,
    #[serde(default)]
    pub aggregate_type: AggregateType,
}

/// Class relationship rule as written in `classes.ron`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipSpec {
    #[serde(default)]
    pub target: Option<u32>,
    pub derivation: DerivationSpec,
}

/// One class entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassSpec {
    pub number: u8,
    pub name: String,
    #[serde(default)]
    pub base_values: Vec<ConstValueSpec>,
    #[serde(default)]
    pub relationships: Vec<RelationshipSpec>,
}

/// Class catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassFile {
    pub classes: Vec<ClassSpec>,
}

/// Loader for character classes from RON files.
pub struct ClassLoader;

impl ClassLoader {
    /// Load character classes from a RON file, resolving attribute ids
    /// against `catalog`.
    ///
    /// A relationship without `target` loads fine; building an attribute
    /// graph from that class reports it.
    pub fn load(path: &Path, catalog: &AttributeCatalog) -> LoadResult<Vec<CharacterClass>> {
        let content = read_file(path)?;
        Self::parse(&content, catalog)
    }

    pub(crate) fn parse(
        content: &str,
        catalog: &AttributeCatalog,
    ) -> LoadResult<Vec<CharacterClass>> {
        let file: ClassFile = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse class catalog RON: {}", e))?;

        let classes = file
            .classes
            .into_iter()
            .map(|spec| resolve_class(spec, catalog))
            .collect::<LoadResult<Vec<_>>>()?;

        debug!(count = classes.len(), "character classes loaded");
        Ok(classes)
    }
}

fn resolve_class(spec: ClassSpec, catalog: &AttributeCatalog) -> LoadResult<CharacterClass> {
    let context = format!("class '{}'", spec.name);
    let mut class = CharacterClass::new(spec.number, spec.name);

    for base in &spec.base_values {
        let definition = resolve_attribute(catalog, base.attribute, &context)?;
        class.base_attribute_values.push(
            ConstValue::new(definition, base.value).with_aggregate_type(base.aggregate_type),
        );
    }

    for rule in &spec.relationships {
        let derivation = rule.derivation.resolve(catalog, &context)?;
        class.attribute_combinations.push(AttributeRelationship {
            target_attribute: resolve_optional(catalog, rule.target, &context)?,
            derivation,
        });
    }

    Ok(class)
}

#[cfg(test)]
mod tests {
    use super::*;
    use attribute_core::{AttributeGraph, AttributeSystem, InputOperator, StatValue, stats};

    const KNIGHT: &str = r#"(classes: [
        (
            number: 4,
            name: "Dark Knight",
            base_values: [
                (attribute: 2, value: 28.0),
                (attribute: 4, value: 25.0),
            ],
            relationships: [
                (
                    target: Some(10),
                    derivation: (inputs: [4], operator: Multiply, operand: Constant(2.0)),
                ),
                (
                    target: Some(40),
                    derivation: (inputs: [3], operator: Multiply, operand: Constant(0.2)),
                ),
            ],
        ),
    ])"#;

    #[test]
    fn loads_and_builds_class() {
        let catalog = AttributeCatalog::new();
        let classes = ClassLoader::parse(KNIGHT, &catalog).unwrap();
        assert_eq!(classes.len(), 1);

        let knight = &classes[0];
        assert_eq!(knight.name, "Dark Knight");
        assert_eq!(knight.base_attribute_values.len(), 2);
        assert_eq!(
            knight.attribute_combinations[0].derivation.input_operator,
            InputOperator::Multiply
        );

        let graph = AttributeGraph::builder()
            .with_base_values([StatValue::new(stats::agility().clone(), 50.0)])
            .with_class(knight)
            .build()
            .unwrap();
        assert_eq!(graph.value_of(stats::maximum_health()), 50.0);
        assert_eq!(graph.value_of(stats::defense_base()), 10.0);
    }

    #[test]
    fn unknown_attribute_is_a_load_error() {
        let catalog = AttributeCatalog::new();
        let err = ClassLoader::parse(
            r#"(classes: [(number: 1, name: "Ghost", base_values: [(attribute: 9999, value: 1.0)])])"#,
            &catalog,
        )
        .unwrap_err();
        assert!(err.to_string().contains("9999"));
    }

    #[test]
    fn missing_target_stays_unset() {
        let catalog = AttributeCatalog::new();
        let classes = ClassLoader::parse(
            r#"(classes: [(
                number: 2,
                name: "Incomplete",
                relationships: [(derivation: (inputs: [2], operator: Add, operand: Constant(1.0)))],
            )])"#,
            &catalog,
        )
        .unwrap();

        assert!(classes[0].attribute_combinations[0].target_attribute.is_none());
        assert!(
            AttributeGraph::builder()
                .with_class(&classes[0])
                .build()
                .is_err()
        );
    }
}
