//! Attribute catalog loader.

use std::path::Path;

use attribute_core::{AttributeCatalog, AttributeDefinition, AttributeId};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::loaders::{LoadResult, read_file};

/// One attribute entry in `attributes.ron`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeSpec {
    pub id: u32,
    pub designation: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub minimum: Option<f32>,
    #[serde(default)]
    pub maximum: Option<f32>,
}

impl AttributeSpec {
    fn into_definition(self) -> AttributeDefinition {
        let mut definition = AttributeDefinition::new(AttributeId(self.id), self.designation)
            .with_description(self.description);
        if let Some(minimum) = self.minimum {
            definition = definition.with_minimum(minimum);
        }
        if let Some(maximum) = self.maximum {
            definition = definition.with_maximum(maximum);
        }
        definition
    }
}

/// Attribute catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeFile {
    pub attributes: Vec<AttributeSpec>,
}

/// Loader for attribute definitions from RON files.
pub struct AttributeLoader;

impl AttributeLoader {
    /// Registers every attribute of the RON file in `catalog`.
    ///
    /// Ids already present (built-ins or earlier files) keep their existing
    /// definition. Returns the number of entries read.
    pub fn load(path: &Path, catalog: &AttributeCatalog) -> LoadResult<usize> {
        let content = read_file(path)?;
        Self::parse(&content, catalog)
    }

    pub(crate) fn parse(content: &str, catalog: &AttributeCatalog) -> LoadResult<usize> {
        let file: AttributeFile = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse attribute catalog RON: {}", e))?;

        let count = file.attributes.len();
        for spec in file.attributes {
            if let (Some(minimum), Some(maximum)) = (spec.minimum, spec.maximum) {
                if minimum > maximum {
                    anyhow::bail!(
                        "Attribute {} ({}) has minimum {} above maximum {}",
                        spec.designation,
                        spec.id,
                        minimum,
                        maximum
                    );
                }
            }

            let designation = spec.designation.clone();
            let registered = catalog.register(spec.into_definition());
            if registered.designation() != designation {
                warn!(
                    id = %registered.id(),
                    existing = registered.designation(),
                    ignored = %designation,
                    "attribute id already registered under another name"
                );
            }
        }

        debug!(count, total = catalog.len(), "attribute catalog loaded");
        Ok(count)
    }
}
