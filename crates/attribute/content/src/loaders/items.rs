//! Item power-up loader.

use std::collections::HashSet;
use std::path::Path;

use attribute_core::{
    AggregateType, AttributeCatalog, ConstantBoost, ItemId, PowerUpDefinition, PowerUpValue,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::loaders::{DerivationSpec, LoadResult, read_file, resolve_optional};

/// Constant part of a boost.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConstantBoostSpec {
    pub value: f32,
    #[serde(default)]
    pub aggregate_type: AggregateType,
}

/// Boost of a power-up as written in `items.ron`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoostSpec {
    #[serde(default)]
    pub constant: Option<ConstantBoostSpec>,
    #[serde(default)]
    pub related: Vec<DerivationSpec>,
}

/// One power-up; `target` and `boost` may be left out and are then reported
/// when the item is equipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerUpSpec {
    #[serde(default)]
    pub target: Option<u32>,
    #[serde(default)]
    pub boost: Option<BoostSpec>,
}

/// One item entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemSpec {
    pub number: u64,
    pub name: String,
    #[serde(default)]
    pub power_ups: Vec<PowerUpSpec>,
}

/// Item catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemFile {
    pub items: Vec<ItemSpec>,
}

/// Resolved power-ups of one item, ready for
/// [`ItemAwareAttributeSystem::equip`](attribute_core::ItemAwareAttributeSystem::equip).
#[derive(Debug, Clone)]
pub struct ItemPowerUps {
    pub item: ItemId,
    pub name: String,
    pub power_ups: Vec<PowerUpDefinition>,
}

/// Loader for item power-ups from RON files.
pub struct ItemLoader;

impl ItemLoader {
    /// Load item power-ups from a RON file.
    pub fn load(path: &Path, catalog: &AttributeCatalog) -> LoadResult<Vec<ItemPowerUps>> {
        let content = read_file(path)?;
        Self::parse(&content, catalog)
    }

    pub(crate) fn parse(
        content: &str,
        catalog: &AttributeCatalog,
    ) -> LoadResult<Vec<ItemPowerUps>> {
        let file: ItemFile = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse item catalog RON: {}", e))?;

        let mut seen = HashSet::new();
        let mut items = Vec::with_capacity(file.items.len());
        for spec in file.items {
            if !seen.insert(spec.number) {
                anyhow::bail!("Duplicate item number {} in item catalog", spec.number);
            }

            let context = format!("item '{}'", spec.name);
            let power_ups = spec
                .power_ups
                .iter()
                .map(|power_up| resolve_power_up(power_up, catalog, &context))
                .collect::<LoadResult<Vec<_>>>()?;

            items.push(ItemPowerUps {
                item: ItemId(spec.number),
                name: spec.name,
                power_ups,
            });
        }

        debug!(count = items.len(), "item power-ups loaded");
        Ok(items)
    }
}

fn resolve_power_up(
    spec: &PowerUpSpec,
    catalog: &AttributeCatalog,
    context: &str,
) -> LoadResult<PowerUpDefinition> {
    let boost = match &spec.boost {
        Some(boost) => Some(PowerUpValue {
            constant_value: boost.constant.map(|constant| ConstantBoost {
                value: constant.value,
                aggregate_type: constant.aggregate_type,
            }),
            related_values: boost
                .related
                .iter()
                .map(|derivation| derivation.resolve(catalog, context))
                .collect::<LoadResult<Vec<_>>>()?,
        }),
        None => None,
    };

    Ok(PowerUpDefinition {
        target_attribute: resolve_optional(catalog, spec.target, context)?,
        boost,
    })
}
