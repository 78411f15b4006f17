//! The attribute-system capability and its full-graph implementation.
//!
//! Entity kinds pick an implementation:
//! - [`AttributeGraph`]: characters; one [`ComposableAttribute`] per attribute,
//!   class formulas wired as relationship elements.
//! - [`crate::holder::LightweightAttributeHolder`]: monsters, destructibles and
//!   traps; shared per-definition base tables with rare dynamic overrides.

pub mod graph;

use std::sync::Arc;

pub use graph::{AttributeGraph, AttributeGraphBuilder};

use crate::definition::AttributeDefinition;
use crate::element::{ComposableAttribute, Element};
use crate::error::Result;
use crate::records::AttributeRelationship;

/// What damage calculation, broadcast plugins, regeneration and game-event
/// handlers use to read and modify an entity's attributes.
pub trait AttributeSystem: Send + Sync {
    /// Current value of `attribute`, or 0 when the entity has none.
    fn value_of(&self, attribute: &AttributeDefinition) -> f32;

    /// Forces the raw value of an externally driven attribute.
    ///
    /// This replaces a dedicated raw element, it never overwrites a computed
    /// aggregate. On an attribute that also has derived contributions the
    /// forced value is added to them rather than taking their place.
    ///
    /// Lightweight holders keep no per-instance value for base-table
    /// attributes: such a write lands only while an override exists and is
    /// lost when the override is released.
    fn set_value(&self, attribute: &Arc<AttributeDefinition>, value: f32) -> Result<()>;

    /// Adds `element` to the slot of `target`.
    fn add_element(&self, element: Arc<dyn Element>, target: &Arc<AttributeDefinition>);

    /// Removes one occurrence of `element` from the slot of `target`.
    ///
    /// Removing an element that is not attached is a no-op.
    fn remove_element(&self, element: &Arc<dyn Element>, target: &AttributeDefinition);

    /// Adds a derived contribution described by `relationship`.
    fn add_attribute_relationship(&self, relationship: &AttributeRelationship) -> Result<()>;

    /// Returns the slot for `attribute`, creating an empty one if needed.
    fn get_or_create_attribute(
        &self,
        attribute: &Arc<AttributeDefinition>,
    ) -> Result<Arc<ComposableAttribute>>;
}
