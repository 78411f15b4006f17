//! Attribute computation engine for simulated game entities.
//!
//! `attribute-core` derives numeric statistics (strength, defense, current and
//! maximum health, ...) from base values plus a changing set of modifiers
//! contributed by items, buffs and class formulas. It performs no I/O and
//! never schedules itself: callers drive it by attaching and detaching
//! modifiers and by applying regeneration ticks.
//!
//! # Layers
//!
//! ```text
//! [ AttributeDefinition ]                     definition, stats
//!      ↓
//! [ Element / ComposableAttribute / Relationship ]   element
//!      ↓
//! [ AttributeSystem: AttributeGraph | LightweightAttributeHolder ]   system, holder
//!      ↓
//! [ PowerUpWrapper / ItemAwareAttributeSystem ]      power_up
//! ```
pub mod config;
pub mod definition;
pub mod element;
pub mod error;
pub mod holder;
pub mod power_up;
pub mod records;
pub mod regeneration;
pub mod stats;
pub mod system;

pub use config::EngineConfig;
pub use definition::{AttributeCatalog, AttributeDefinition, AttributeId};
pub use element::{
    AggregateType, ComposableAttribute, ConstantElement, Element, InputOperator,
    RelationshipElement, SimpleElement, Subscription,
};
pub use error::{AttributeError, ErrorSeverity, Result};
pub use holder::{
    DestructibleAttributeHolder, LightweightAttributeHolder, MonsterAttributeHolder,
    TrapAttributeHolder,
};
pub use power_up::{ItemAwareAttributeSystem, ItemId, PowerUpWrapper};
pub use records::{
    AttributeRelationship, CharacterClass, ConstValue, ConstantBoost, Derivation,
    MonsterDefinition, Operand, PowerUpDefinition, PowerUpValue, StatValue,
};
pub use regeneration::Regeneration;
pub use system::{AttributeGraph, AttributeGraphBuilder, AttributeSystem};
