//! Full attribute graph for characters.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, trace};

use super::AttributeSystem;
use crate::definition::{AttributeDefinition, AttributeId};
use crate::element::{AggregateType, ComposableAttribute, ConstantElement, Element, SimpleElement};
use crate::error::{AttributeError, Result};
use crate::records::{AttributeRelationship, CharacterClass, StatValue};

/// Attribute system owning one [`ComposableAttribute`] per attribute.
///
/// Built once per composition root (character session) by
/// [`AttributeGraphBuilder`]. Relationship targets and inputs that have no
/// base value get an empty slot on first reference.
///
/// # Invariant
///
/// Relationships must be acyclic. Class rules are checked at build time;
/// relationships added later through power-ups are not, and a cycle there
/// recurses without bound on the first change.
pub struct AttributeGraph {
    attributes: RwLock<HashMap<Arc<AttributeDefinition>, Arc<ComposableAttribute>>>,
    /// Settable raw elements: persisted base values and forced synthetics.
    raw_elements: Mutex<HashMap<Arc<AttributeDefinition>, Arc<SimpleElement>>>,
}

impl AttributeGraph {
    pub fn builder<'a>() -> AttributeGraphBuilder<'a> {
        AttributeGraphBuilder::new()
    }

    /// Graph without any slots.
    pub fn empty() -> Self {
        Self {
            attributes: RwLock::new(HashMap::new()),
            raw_elements: Mutex::new(HashMap::new()),
        }
    }

    /// Slot of `attribute`, if it exists.
    pub fn attribute(&self, attribute: &AttributeDefinition) -> Option<Arc<ComposableAttribute>> {
        self.attributes.read().get(attribute).cloned()
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.attributes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.read().is_empty()
    }

    pub fn definitions(&self) -> Vec<Arc<AttributeDefinition>> {
        self.attributes.read().keys().cloned().collect()
    }

    fn slot(&self, attribute: &Arc<AttributeDefinition>) -> Arc<ComposableAttribute> {
        if let Some(existing) = self.attributes.read().get(attribute.as_ref()) {
            return Arc::clone(existing);
        }

        let mut attributes = self.attributes.write();
        Arc::clone(attributes.entry(Arc::clone(attribute)).or_insert_with(|| {
            debug!(attribute = %attribute, "creating attribute slot on demand");
            ComposableAttribute::new(Arc::clone(attribute))
        }))
    }

    /// Adds a settable raw element holding `value`.
    ///
    /// The first raw element per attribute is the one `set_value` updates.
    fn add_raw_element(&self, attribute: &Arc<AttributeDefinition>, value: f32) {
        let element = Arc::new(SimpleElement::new(value, AggregateType::AddRaw));
        self.raw_elements
            .lock()
            .entry(Arc::clone(attribute))
            .or_insert_with(|| Arc::clone(&element));
        self.slot(attribute).add_element(element);
    }
}

impl Default for AttributeGraph {
    fn default() -> Self {
        Self::empty()
    }
}

impl AttributeSystem for AttributeGraph {
    fn value_of(&self, attribute: &AttributeDefinition) -> f32 {
        self.attributes
            .read()
            .get(attribute)
            .map_or(0.0, |slot| slot.value())
    }

    fn set_value(&self, attribute: &Arc<AttributeDefinition>, value: f32) -> Result<()> {
        let (element, created) = {
            let mut raw_elements = self.raw_elements.lock();
            match raw_elements.get(attribute.as_ref()) {
                Some(existing) => (Arc::clone(existing), false),
                None => {
                    let element = Arc::new(SimpleElement::new(value, AggregateType::AddRaw));
                    raw_elements.insert(Arc::clone(attribute), Arc::clone(&element));
                    (element, true)
                }
            }
        };

        if created {
            let slot = self.slot(attribute);
            if slot.element_count() > 0 {
                debug!(
                    attribute = %attribute,
                    value,
                    contributions = slot.element_count(),
                    "forced value adds to existing contributions"
                );
            } else {
                trace!(attribute = %attribute, value, "seeding forced raw element");
            }
            slot.add_element(element);
        } else {
            element.set_value(value);
        }
        Ok(())
    }

    fn add_element(&self, element: Arc<dyn Element>, target: &Arc<AttributeDefinition>) {
        self.slot(target).add_element(element);
    }

    fn remove_element(&self, element: &Arc<dyn Element>, target: &AttributeDefinition) {
        if let Some(slot) = self.attribute(target) {
            slot.remove_element(element);
        }
    }

    fn add_attribute_relationship(&self, relationship: &AttributeRelationship) -> Result<()> {
        let target = relationship.target()?;
        let element = relationship.derivation.resolve(self)?;
        self.add_element(element, target);
        Ok(())
    }

    fn get_or_create_attribute(
        &self,
        attribute: &Arc<AttributeDefinition>,
    ) -> Result<Arc<ComposableAttribute>> {
        Ok(self.slot(attribute))
    }
}

/// Wires an [`AttributeGraph`] from persisted values and class rules.
///
/// # Order
///
/// 1. Persisted base values (every source passed to `with_base_values`,
///    e.g. character and account stats) as settable `AddRaw` elements
/// 2. Class constant defaults
/// 3. Class relationship rules as relationship elements
#[derive(Default)]
pub struct AttributeGraphBuilder<'a> {
    base_values: Vec<StatValue>,
    class: Option<&'a CharacterClass>,
}

impl<'a> AttributeGraphBuilder<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one source of persisted base values. May be called repeatedly.
    #[must_use]
    pub fn with_base_values(mut self, values: impl IntoIterator<Item = StatValue>) -> Self {
        self.base_values.extend(values);
        self
    }

    #[must_use]
    pub fn with_class(mut self, class: &'a CharacterClass) -> Self {
        self.class = Some(class);
        self
    }

    pub fn build(self) -> Result<AttributeGraph> {
        if let Some(class) = self.class {
            ensure_acyclic(&class.attribute_combinations)?;
        }

        let graph = AttributeGraph::empty();

        for base in &self.base_values {
            graph.add_raw_element(&base.definition, base.value);
        }

        if let Some(class) = self.class {
            for constant in &class.base_attribute_values {
                graph.add_element(
                    Arc::new(ConstantElement::new(constant.value, constant.aggregate_type)),
                    &constant.definition,
                );
            }

            for relationship in &class.attribute_combinations {
                graph.add_attribute_relationship(relationship)?;
            }
        }

        debug!(
            class = self.class.map(|class| class.name.as_str()),
            base_values = self.base_values.len(),
            attributes = graph.len(),
            "built attribute graph"
        );
        Ok(graph)
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

/// Rejects relationship sets in which an attribute (transitively) feeds itself.
fn ensure_acyclic(relationships: &[AttributeRelationship]) -> Result<()> {
    let mut edges: HashMap<AttributeId, Vec<AttributeId>> = HashMap::new();
    let mut definitions: HashMap<AttributeId, Arc<AttributeDefinition>> = HashMap::new();

    for relationship in relationships {
        let target = relationship.target()?;
        definitions.insert(target.id(), Arc::clone(target));
        for source in relationship.derivation.sources() {
            definitions.insert(source.id(), Arc::clone(source));
            edges.entry(source.id()).or_default().push(target.id());
        }
    }

    fn visit(
        node: AttributeId,
        edges: &HashMap<AttributeId, Vec<AttributeId>>,
        marks: &mut HashMap<AttributeId, Mark>,
    ) -> Option<AttributeId> {
        match marks.get(&node) {
            Some(Mark::Done) => return None,
            Some(Mark::Visiting) => return Some(node),
            None => {}
        }
        marks.insert(node, Mark::Visiting);
        for next in edges.get(&node).into_iter().flatten() {
            if let Some(cycle) = visit(*next, edges, marks) {
                return Some(cycle);
            }
        }
        marks.insert(node, Mark::Done);
        None
    }

    let mut marks = HashMap::new();
    let mut nodes: Vec<_> = edges.keys().copied().collect();
    nodes.sort();
    for node in nodes {
        if let Some(cycle) = visit(node, &edges, &mut marks) {
            if let Some(attribute) = definitions.get(&cycle) {
                return Err(AttributeError::CyclicRelationship {
                    attribute: Arc::clone(attribute),
                });
            }
        }
    }
    Ok(())
}
