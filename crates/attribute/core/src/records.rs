//! Configuration records supplied by content loading and persistence.
//!
//! These are plain data, already resolved against the attribute catalog.
//! References that content may leave unset are `Option`s; the engine checks
//! them when a record is used and fails with [`AttributeError::NotInitialized`].

use std::sync::Arc;

use crate::definition::AttributeDefinition;
use crate::element::{AggregateType, Element, InputOperator, RelationshipElement, ResolvedOperand};
use crate::error::{AttributeError, Result};
use crate::system::AttributeSystem;

/// A persisted per-entity base value (e.g. a character's allocated strength).
#[derive(Clone, Debug, PartialEq)]
pub struct StatValue {
    pub definition: Arc<AttributeDefinition>,
    pub value: f32,
}

impl StatValue {
    pub fn new(definition: Arc<AttributeDefinition>, value: f32) -> Self {
        Self { definition, value }
    }
}

/// A class-level constant contribution.
#[derive(Clone, Debug, PartialEq)]
pub struct ConstValue {
    pub definition: Arc<AttributeDefinition>,
    pub value: f32,
    pub aggregate_type: AggregateType,
}

impl ConstValue {
    pub fn new(definition: Arc<AttributeDefinition>, value: f32) -> Self {
        Self {
            definition,
            value,
            aggregate_type: AggregateType::AddRaw,
        }
    }

    #[must_use]
    pub fn with_aggregate_type(mut self, aggregate_type: AggregateType) -> Self {
        self.aggregate_type = aggregate_type;
        self
    }
}

/// Second argument of a relationship operator.
#[derive(Clone, Debug, PartialEq)]
pub enum Operand {
    Constant(f32),
    Attribute(Arc<AttributeDefinition>),
}

/// How a derived value is computed from other attributes, without a target.
#[derive(Clone, Debug, PartialEq)]
pub struct Derivation {
    pub input_attributes: Vec<Arc<AttributeDefinition>>,
    pub input_operator: InputOperator,
    pub operand: Operand,
    pub aggregate_type: AggregateType,
}

impl Derivation {
    pub fn new(
        input_attributes: Vec<Arc<AttributeDefinition>>,
        input_operator: InputOperator,
        operand: Operand,
        aggregate_type: AggregateType,
    ) -> Self {
        Self {
            input_attributes,
            input_operator,
            operand,
            aggregate_type,
        }
    }

    /// Builds the relationship element, resolving every referenced attribute
    /// through `system` (creating empty slots on first reference).
    pub fn resolve(&self, system: &dyn AttributeSystem) -> Result<Arc<RelationshipElement>> {
        if self.input_attributes.is_empty() {
            return Err(AttributeError::not_initialized(
                "input attribute",
                format!("{} relationship", self.input_operator),
            ));
        }

        let inputs = self
            .input_attributes
            .iter()
            .map(|definition| {
                system
                    .get_or_create_attribute(definition)
                    .map(|attribute| attribute as Arc<dyn Element>)
            })
            .collect::<Result<Vec<_>>>()?;

        let operand = match &self.operand {
            Operand::Constant(value) => ResolvedOperand::Constant(*value),
            Operand::Attribute(definition) => {
                ResolvedOperand::Element(system.get_or_create_attribute(definition)?)
            }
        };

        Ok(RelationshipElement::new(
            inputs,
            self.input_operator,
            operand,
            self.aggregate_type,
        ))
    }

    /// Attributes this derivation reads.
    pub fn sources(&self) -> impl Iterator<Item = &Arc<AttributeDefinition>> {
        let operand = match &self.operand {
            Operand::Attribute(definition) => Some(definition),
            Operand::Constant(_) => None,
        };
        self.input_attributes.iter().chain(operand)
    }
}

/// A class-level rule: `target += derivation`.
#[derive(Clone, Debug, PartialEq)]
pub struct AttributeRelationship {
    pub target_attribute: Option<Arc<AttributeDefinition>>,
    pub derivation: Derivation,
}

impl AttributeRelationship {
    pub fn new(target_attribute: Arc<AttributeDefinition>, derivation: Derivation) -> Self {
        Self {
            target_attribute: Some(target_attribute),
            derivation,
        }
    }

    pub fn target(&self) -> Result<&Arc<AttributeDefinition>> {
        self.target_attribute.as_ref().ok_or_else(|| {
            AttributeError::not_initialized(
                "target attribute",
                format!("{} relationship", self.derivation.input_operator),
            )
        })
    }
}

/// Class-level defaults and formulas shared by every character of the class.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CharacterClass {
    pub number: u8,
    pub name: String,
    pub base_attribute_values: Vec<ConstValue>,
    pub attribute_combinations: Vec<AttributeRelationship>,
}

impl CharacterClass {
    pub fn new(number: u8, name: impl Into<String>) -> Self {
        Self {
            number,
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Fixed part of a power-up.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConstantBoost {
    pub value: f32,
    pub aggregate_type: AggregateType,
}

/// Boost of a power-up: a constant and/or relationship-based values.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PowerUpValue {
    pub constant_value: Option<ConstantBoost>,
    pub related_values: Vec<Derivation>,
}

/// A removable modifier granted by an item option, set bonus or effect.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PowerUpDefinition {
    pub target_attribute: Option<Arc<AttributeDefinition>>,
    pub boost: Option<PowerUpValue>,
}

impl PowerUpDefinition {
    /// Power-up adding a constant to `target`.
    pub fn constant(
        target: Arc<AttributeDefinition>,
        value: f32,
        aggregate_type: AggregateType,
    ) -> Self {
        Self {
            target_attribute: Some(target),
            boost: Some(PowerUpValue {
                constant_value: Some(ConstantBoost {
                    value,
                    aggregate_type,
                }),
                related_values: Vec::new(),
            }),
        }
    }

    /// Power-up adding a derived value to `target`.
    pub fn related(target: Arc<AttributeDefinition>, derivation: Derivation) -> Self {
        Self {
            target_attribute: Some(target),
            boost: Some(PowerUpValue {
                constant_value: None,
                related_values: vec![derivation],
            }),
        }
    }

    fn describe(&self) -> String {
        match &self.target_attribute {
            Some(target) => format!("power-up for {target}"),
            None => "power-up without target".to_string(),
        }
    }

    pub fn target(&self) -> Result<&Arc<AttributeDefinition>> {
        self.target_attribute
            .as_ref()
            .ok_or_else(|| AttributeError::not_initialized("target attribute", self.describe()))
    }

    pub fn boost(&self) -> Result<&PowerUpValue> {
        self.boost
            .as_ref()
            .ok_or_else(|| AttributeError::not_initialized("boost value", self.describe()))
    }
}

/// Base attribute values of a monster, destructible object or trap.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MonsterDefinition {
    pub number: u16,
    pub designation: String,
    pub attributes: Vec<StatValue>,
}

impl MonsterDefinition {
    pub fn new(number: u16, designation: impl Into<String>) -> Self {
        Self {
            number,
            designation: designation.into(),
            attributes: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_attribute(mut self, definition: Arc<AttributeDefinition>, value: f32) -> Self {
        self.attributes.push(StatValue::new(definition, value));
        self
    }
}
