//! Data-driven attribute content and loaders.
//!
//! Reads RON/TOML data files into `attribute-core` records:
//! - Engine configuration (TOML)
//! - Attribute catalog (RON)
//! - Character classes with base values and relationship rules (RON)
//! - Monster, destructible and trap definitions (RON)
//! - Item power-ups (RON)
//!
//! Numeric attribute ids in the files are resolved against an
//! [`AttributeCatalog`](attribute_core::AttributeCatalog); an unknown id is a
//! load error. References a file leaves out stay `None` so the engine reports
//! them when the record is used.

pub mod loaders;

pub use loaders::{
    AttributeLoader, ClassLoader, ConfigLoader, Content, ContentFactory, ItemLoader,
    ItemPowerUps, LoadResult, LoadedMonster, MonsterKind, MonsterLoader,
};
