//! Content loaders for reading attribute data from files.
//!
//! Each loader owns the serde shape of its file (the `*Spec` types) and turns
//! it into resolved core records.

pub mod attributes;
pub mod classes;
pub mod config;
pub mod factory;
pub mod items;
pub mod monsters;

pub use attributes::AttributeLoader;
pub use classes::ClassLoader;
pub use config::ConfigLoader;
pub use factory::{Content, ContentFactory};
pub use items::{ItemLoader, ItemPowerUps};
pub use monsters::{LoadedMonster, MonsterKind, MonsterLoader};

use std::path::Path;
use std::sync::Arc;

use attribute_core::{
    AggregateType, AttributeCatalog, AttributeDefinition, AttributeId, Derivation, InputOperator,
    Operand,
};
use serde::{Deserialize, Serialize};

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}

/// Looks up a catalog definition by numeric id.
pub(crate) fn resolve_attribute(
    catalog: &AttributeCatalog,
    id: u32,
    context: &str,
) -> LoadResult<Arc<AttributeDefinition>> {
    catalog
        .get(AttributeId(id))
        .ok_or_else(|| anyhow::anyhow!("Unknown attribute id {} in {}", id, context))
}

/// Like [`resolve_attribute`], but a missing reference stays `None`.
pub(crate) fn resolve_optional(
    catalog: &AttributeCatalog,
    id: Option<u32>,
    context: &str,
) -> LoadResult<Option<Arc<AttributeDefinition>>> {
    id.map(|id| resolve_attribute(catalog, id, context)).transpose()
}

/// Operand as written in data files.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum OperandSpec {
    Constant(f32),
    Attribute(u32),
}

/// Derivation as written in data files; shared by class rules and item
/// power-ups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivationSpec {
    pub inputs: Vec<u32>,
    pub operator: InputOperator,
    pub operand: OperandSpec,
    #[serde(default)]
    pub aggregate_type: AggregateType,
}

impl DerivationSpec {
    pub(crate) fn resolve(
        &self,
        catalog: &AttributeCatalog,
        context: &str,
    ) -> LoadResult<Derivation> {
        let inputs = self
            .inputs
            .iter()
            .map(|id| resolve_attribute(catalog, *id, context))
            .collect::<LoadResult<Vec<_>>>()?;
        let operand = match self.operand {
            OperandSpec::Constant(value) => Operand::Constant(value),
            OperandSpec::Attribute(id) => {
                Operand::Attribute(resolve_attribute(catalog, id, context)?)
            }
        };

        Ok(Derivation::new(inputs, self.operator, operand, self.aggregate_type))
    }
}
