//! Monster, destructible and trap definition loader.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use attribute_core::{AttributeCatalog, MonsterDefinition, StatValue};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::loaders::{LoadResult, read_file, resolve_attribute};

/// Which lightweight holder a definition is spawned with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MonsterKind {
    #[default]
    Monster,
    Destructible,
    Trap,
}

/// One definition entry in `monsters.ron`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonsterSpec {
    pub number: u16,
    pub designation: String,
    #[serde(default)]
    pub kind: MonsterKind,
    /// `(attribute id, base value)` pairs.
    #[serde(default)]
    pub attributes: Vec<(u32, f32)>,
}

/// Monster catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonsterFile {
    pub monsters: Vec<MonsterSpec>,
}

/// A resolved definition together with the holder kind it is meant for.
#[derive(Debug, Clone)]
pub struct LoadedMonster {
    pub kind: MonsterKind,
    pub definition: Arc<MonsterDefinition>,
}

/// Loader for monster definitions from RON files.
pub struct MonsterLoader;

impl MonsterLoader {
    /// Load monster definitions from a RON file.
    ///
    /// Numbers must be unique per kind within one file.
    pub fn load(path: &Path, catalog: &AttributeCatalog) -> LoadResult<Vec<LoadedMonster>> {
        let content = read_file(path)?;
        Self::parse(&content, catalog)
    }

    pub(crate) fn parse(
        content: &str,
        catalog: &AttributeCatalog,
    ) -> LoadResult<Vec<LoadedMonster>> {
        let file: MonsterFile = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse monster catalog RON: {}", e))?;

        let mut seen = HashSet::new();
        let mut monsters = Vec::with_capacity(file.monsters.len());
        for spec in file.monsters {
            if !seen.insert((spec.kind, spec.number)) {
                anyhow::bail!("Duplicate {:?} number {} in monster catalog", spec.kind, spec.number);
            }

            let context = format!("monster '{}'", spec.designation);
            let mut definition = MonsterDefinition::new(spec.number, spec.designation.clone());
            for (id, value) in spec.attributes {
                let attribute = resolve_attribute(catalog, id, &context)?;
                definition.attributes.push(StatValue::new(attribute, value));
            }

            monsters.push(LoadedMonster {
                kind: spec.kind,
                definition: Arc::new(definition),
            });
        }

        debug!(count = monsters.len(), "monster definitions loaded");
        Ok(monsters)
    }
}
