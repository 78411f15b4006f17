//! Content factory for loading attribute content from a data directory.

use std::path::{Path, PathBuf};

use attribute_core::{AttributeCatalog, CharacterClass, EngineConfig};
use tracing::info;

use crate::loaders::{
    AttributeLoader, ClassLoader, ConfigLoader, ItemLoader, ItemPowerUps, LoadResult,
    LoadedMonster, MonsterLoader,
};

/// Everything a data directory describes, resolved against one catalog.
#[derive(Debug)]
pub struct Content {
    pub config: EngineConfig,
    pub catalog: AttributeCatalog,
    pub classes: Vec<CharacterClass>,
    pub monsters: Vec<LoadedMonster>,
    pub items: Vec<ItemPowerUps>,
}

impl Content {
    pub fn class(&self, number: u8) -> Option<&CharacterClass> {
        self.classes.iter().find(|class| class.number == number)
    }

    pub fn item(&self, number: u64) -> Option<&ItemPowerUps> {
        self.items.iter().find(|item| item.item.0 == number)
    }
}

/// Content factory that loads all attribute content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// ├── attributes.ron
/// ├── classes.ron
/// ├── monsters.ron
/// └── items.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    /// Creates a new content factory pointing to a data directory.
    ///
    /// # Arguments
    ///
    /// * `data_dir` - Path to the directory containing data files
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load engine configuration from `config.toml`.
    pub fn load_config(&self) -> LoadResult<EngineConfig> {
        let path = self.data_dir.join("config.toml");
        ConfigLoader::load(&path)
    }

    /// Build a catalog of the built-in attributes plus `attributes.ron`.
    pub fn load_catalog(&self) -> LoadResult<AttributeCatalog> {
        let catalog = AttributeCatalog::new();
        let path = self.data_dir.join("attributes.ron");
        AttributeLoader::load(&path, &catalog)?;
        Ok(catalog)
    }

    /// Load character classes from `classes.ron`.
    pub fn load_classes(&self, catalog: &AttributeCatalog) -> LoadResult<Vec<CharacterClass>> {
        let path = self.data_dir.join("classes.ron");
        ClassLoader::load(&path, catalog)
    }

    /// Load monster, destructible and trap definitions from `monsters.ron`.
    pub fn load_monsters(&self, catalog: &AttributeCatalog) -> LoadResult<Vec<LoadedMonster>> {
        let path = self.data_dir.join("monsters.ron");
        MonsterLoader::load(&path, catalog)
    }

    /// Load item power-ups from `items.ron`.
    pub fn load_items(&self, catalog: &AttributeCatalog) -> LoadResult<Vec<ItemPowerUps>> {
        let path = self.data_dir.join("items.ron");
        ItemLoader::load(&path, catalog)
    }

    /// Load every file of the data directory.
    ///
    /// The catalog is loaded first so the other files can refer to the
    /// attributes it adds.
    pub fn load_all(&self) -> LoadResult<Content> {
        let config = self.load_config()?;
        let catalog = self.load_catalog()?;
        let classes = self.load_classes(&catalog)?;
        let monsters = self.load_monsters(&catalog)?;
        let items = self.load_items(&catalog)?;

        info!(
            data_dir = %self.data_dir.display(),
            attributes = catalog.len(),
            classes = classes.len(),
            monsters = monsters.len(),
            items = items.len(),
            "attribute content loaded"
        );

        Ok(Content {
            config,
            catalog,
            classes,
            monsters,
            items,
        })
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
