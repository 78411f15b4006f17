//! Lightweight attribute holders for monsters, destructibles and traps.
//!
//! Thousands of these exist at once, built from a handful of definitions,
//! and almost none ever receive a modifier. Instead of a graph per instance
//! they read a shared per-definition [`BaseTable`] and only allocate
//! [`DynamicOverrides`] for the rare buff or debuff.
//!
//! # Resolution order of `value_of`
//!
//! 1. Dynamic override of the instance, if present
//! 2. Per-definition base table
//! 3. Computed accessor (live instance state, e.g. current health)
//! 4. `0.0`

pub mod base_table;
pub mod computed;
pub mod destructible;
pub mod monster;
pub mod overrides;
pub mod trap;

use std::marker::PhantomData;
use std::sync::Arc;

use tracing::warn;

pub use base_table::{BaseTable, BaseTableCache};
pub use computed::ComputedAccessor;
pub use destructible::{Destructible, DestructibleAttributeHolder, DestructibleState};
pub use monster::{Monster, MonsterAttributeHolder, MonsterState};
pub use overrides::DynamicOverrides;
pub use trap::{Trap, TrapAttributeHolder};

use crate::config::EngineConfig;
use crate::definition::AttributeDefinition;
use crate::element::{ComposableAttribute, Element};
use crate::error::{AttributeError, Result};
use crate::records::{AttributeRelationship, MonsterDefinition};
use crate::system::AttributeSystem;

/// Static description of one lightweight entity kind.
pub trait HolderKind: Send + Sync + 'static {
    /// Kind name used in logs and errors.
    const NAME: &'static str;

    /// Mutable per-instance state exposed through computed accessors.
    type State: Send + Sync + 'static;

    /// Process-wide base-table cache of this kind.
    fn base_tables() -> &'static BaseTableCache;

    fn computed_accessors() -> &'static [ComputedAccessor<Self::State>];

    fn initial_state(definition: &MonsterDefinition, base: &BaseTable) -> Self::State;
}

/// Attribute system of one lightweight entity instance.
pub struct LightweightAttributeHolder<K: HolderKind> {
    definition: Arc<MonsterDefinition>,
    base: Arc<BaseTable>,
    state: K::State,
    overrides: DynamicOverrides,
    seed_epsilon: f32,
    _kind: PhantomData<K>,
}

impl<K: HolderKind> LightweightAttributeHolder<K> {
    pub fn new(definition: Arc<MonsterDefinition>) -> Self {
        Self::with_config(definition, &EngineConfig::default())
    }

    pub fn with_config(definition: Arc<MonsterDefinition>, config: &EngineConfig) -> Self {
        let base = K::base_tables().get_or_build(&definition);
        let state = K::initial_state(&definition, &base);
        Self {
            definition,
            base,
            state,
            overrides: DynamicOverrides::new(),
            seed_epsilon: config.seed_epsilon,
            _kind: PhantomData,
        }
    }

    /// Convenience for spawning from a shared definition.
    pub fn spawn(definition: &Arc<MonsterDefinition>) -> Self {
        Self::new(Arc::clone(definition))
    }

    pub fn definition(&self) -> &Arc<MonsterDefinition> {
        &self.definition
    }

    /// The shared base table (same `Arc` for every instance of the definition).
    pub fn base_table(&self) -> &Arc<BaseTable> {
        &self.base
    }

    pub fn state(&self) -> &K::State {
        &self.state
    }

    /// Whether the per-instance override table currently exists.
    pub fn has_dynamic_overrides(&self) -> bool {
        self.overrides.is_allocated()
    }

    fn accessor(
        &self,
        attribute: &AttributeDefinition,
    ) -> Option<&'static ComputedAccessor<K::State>> {
        computed::find(K::computed_accessors(), attribute)
    }

    /// Value without dynamic overrides (steps 2-4).
    fn static_value(&self, attribute: &AttributeDefinition) -> f32 {
        self.base
            .get(attribute)
            .or_else(|| self.accessor(attribute).map(|accessor| (accessor.get)(&self.state)))
            .unwrap_or(0.0)
    }

    fn unsupported(operation: &'static str) -> AttributeError {
        warn!(operation, holder = K::NAME, "unsupported attribute operation");
        AttributeError::Unsupported {
            operation,
            holder: K::NAME,
        }
    }
}

impl<K: HolderKind> AttributeSystem for LightweightAttributeHolder<K> {
    fn value_of(&self, attribute: &AttributeDefinition) -> f32 {
        self.overrides
            .value_of(attribute)
            .unwrap_or_else(|| self.static_value(attribute))
    }

    /// Writes through the computed setter if the attribute has one, and keeps
    /// the seeded base of an existing override in step. An attribute with
    /// neither is [`AttributeError::ReadOnly`].
    ///
    /// Base-table attributes have no per-instance storage: a value written
    /// while an override exists only replaces that override's seed, and is
    /// discarded once the last element is removed and the table value shows
    /// through again.
    fn set_value(&self, attribute: &Arc<AttributeDefinition>, value: f32) -> Result<()> {
        let overridden = self.overrides.set_base(attribute, value);
        if let Some(set) = self.accessor(attribute).and_then(|accessor| accessor.set) {
            set(&self.state, value);
            return Ok(());
        }
        if overridden {
            return Ok(());
        }
        Err(AttributeError::ReadOnly {
            attribute: Arc::clone(attribute),
        })
    }

    fn add_element(&self, element: Arc<dyn Element>, target: &Arc<AttributeDefinition>) {
        let identity = element.aggregate_type().identity();
        let seed_epsilon = self.seed_epsilon;
        self.overrides.add(element, target, || {
            let current = self.static_value(target);
            if current.abs() < seed_epsilon {
                identity
            } else {
                current
            }
        });
    }

    fn remove_element(&self, element: &Arc<dyn Element>, target: &AttributeDefinition) {
        self.overrides.remove(element, target);
    }

    fn add_attribute_relationship(&self, _relationship: &AttributeRelationship) -> Result<()> {
        Err(Self::unsupported("add_attribute_relationship"))
    }

    fn get_or_create_attribute(
        &self,
        _attribute: &Arc<AttributeDefinition>,
    ) -> Result<Arc<ComposableAttribute>> {
        Err(Self::unsupported("get_or_create_attribute"))
    }
}
