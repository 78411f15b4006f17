//! Attribute definitions and the process-wide catalog that owns them.
//!
//! A definition is created once at configuration load and shared by `Arc`
//! across every entity's attribute system. Identity is the [`AttributeId`]:
//! two definitions with the same id compare and hash equal regardless of
//! their display data.

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use parking_lot::RwLock;

/// Globally unique identifier of an attribute definition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttributeId(pub u32);

impl fmt::Display for AttributeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Immutable identity plus optional clamp bounds for one named statistic.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttributeDefinition {
    id: AttributeId,
    designation: String,
    description: String,
    minimum_value: Option<f32>,
    maximum_value: Option<f32>,
}

impl AttributeDefinition {
    pub fn new(id: AttributeId, designation: impl Into<String>) -> Self {
        Self {
            id,
            designation: designation.into(),
            description: String::new(),
            minimum_value: None,
            maximum_value: None,
        }
    }

    /// Attaches a description (builder pattern).
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the lower clamp bound (builder pattern).
    #[must_use]
    pub fn with_minimum(mut self, minimum: f32) -> Self {
        self.minimum_value = Some(minimum);
        self
    }

    /// Sets the upper clamp bound (builder pattern).
    #[must_use]
    pub fn with_maximum(mut self, maximum: f32) -> Self {
        self.maximum_value = Some(maximum);
        self
    }

    pub fn id(&self) -> AttributeId {
        self.id
    }

    pub fn designation(&self) -> &str {
        &self.designation
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn minimum_value(&self) -> Option<f32> {
        self.minimum_value
    }

    pub fn maximum_value(&self) -> Option<f32> {
        self.maximum_value
    }

    /// Applies the clamp bounds, if any, to an aggregated value.
    ///
    /// The maximum wins when a misconfigured definition has `min > max`.
    pub fn clamp(&self, value: f32) -> f32 {
        let value = match self.minimum_value {
            Some(min) if value < min => min,
            _ => value,
        };
        match self.maximum_value {
            Some(max) if value > max => max,
            _ => value,
        }
    }
}

impl PartialEq for AttributeDefinition {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for AttributeDefinition {}

impl Hash for AttributeDefinition {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for AttributeDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.designation, self.id)
    }
}

/// Registry of every attribute definition known to the process.
///
/// The catalog starts with the built-in definitions from [`crate::stats`], so
/// content loaded later resolves to the very same `Arc` the engine uses
/// internally (e.g. for computed accessors and regeneration).
#[derive(Debug)]
pub struct AttributeCatalog {
    definitions: RwLock<HashMap<AttributeId, Arc<AttributeDefinition>>>,
}

impl AttributeCatalog {
    /// Creates a catalog pre-populated with the built-in definitions.
    pub fn new() -> Self {
        let definitions = crate::stats::all()
            .into_iter()
            .map(|definition| (definition.id(), definition))
            .collect();
        Self {
            definitions: RwLock::new(definitions),
        }
    }

    /// Creates a catalog without any built-in definitions.
    pub fn empty() -> Self {
        Self {
            definitions: RwLock::new(HashMap::new()),
        }
    }

    /// Registers a definition, returning the shared instance for its id.
    ///
    /// If the id is already known, the existing instance is returned and the
    /// passed definition is discarded.
    pub fn register(&self, definition: AttributeDefinition) -> Arc<AttributeDefinition> {
        self.definitions
            .write()
            .entry(definition.id())
            .or_insert_with(|| Arc::new(definition))
            .clone()
    }

    /// Looks up a definition by id.
    pub fn get(&self, id: AttributeId) -> Option<Arc<AttributeDefinition>> {
        self.definitions.read().get(&id).cloned()
    }

    /// Looks up a definition by its designation.
    pub fn find_by_designation(&self, designation: &str) -> Option<Arc<AttributeDefinition>> {
        self.definitions
            .read()
            .values()
            .find(|definition| definition.designation() == designation)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.definitions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.read().is_empty()
    }
}

impl Default for AttributeCatalog {
    fn default() -> Self {
        Self::new()
    }
}
