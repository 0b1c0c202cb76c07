//! Directory of named dictionaries.
//!
//! The registry maps codes to dictionaries and aliases to codes. Everything
//! sits behind one reader/writer lock: lookups and saves share it, while
//! creating, deleting and re-aliasing take it exclusively.
//!
//! Saves only hold the shared lock, so a save racing an [`Registry::add`] may
//! or may not include the new dictionary. The next save picks it up.
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use hashbrown::HashMap;
use parking_lot::RwLock;
use serde::Serialize;
use smol_str::SmolStr;

use self::error::Chain;
use crate::dictionary::{Dictionary, DictionaryOptions, FuzzyDictionary};
use crate::storage::Storage;

pub use self::error::{ErrorKind, RegistryError};
pub use self::item::RegistryItem;
pub use self::metadata::Metadata;

mod autosave;
pub mod error;
mod item;
pub mod metadata;

/// A dictionary code with the aliases pointing at it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct ListItem {
    /// dictionary code
    #[cfg_attr(feature = "schema", schemars(with = "String"))]
    pub code: SmolStr,
    /// aliases in the order they were set
    #[cfg_attr(feature = "schema", schemars(with = "Vec<String>"))]
    pub aliases: Vec<SmolStr>,
}

/// Thread-safe directory of dictionaries persisted under one directory.
///
/// The directory belongs to this instance alone; two registries writing the
/// same directory overwrite each other's metadata.
pub struct Registry<D = FuzzyDictionary> {
    inner: RwLock<Inner<D>>,
    storage: Storage,
    autosave_started: AtomicBool,
}

struct Inner<D> {
    items: HashMap<SmolStr, RegistryItem<D>>,
    metadata: Metadata,
}

impl<D: Dictionary> Registry<D> {
    /// Loads every record and the alias metadata found in `dir`.
    ///
    /// Records that cannot be read or decoded are logged and skipped. A
    /// missing metadata file means no aliases; a corrupt one is an error.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Registry<D>, RegistryError> {
        let storage = Storage::new(dir);
        let mut items = HashMap::new();

        for code in storage.record_codes()? {
            match Self::load(&storage, &code) {
                Ok(item) => {
                    log::debug!("registry: loaded dictionary '{}'", code);
                    items.insert(SmolStr::new(code), item);
                }
                Err(e) => log::warn!("registry: skipping dictionary '{}': {}", code, Chain(&e)),
            }
        }

        let metadata = match storage.read_metadata()? {
            Some(bytes) => Metadata::from_bytes(&bytes).map_err(|e| RegistryError::Decode {
                path: storage.metadata_path(),
                source: e.into(),
            })?,
            None => Metadata::new(),
        };

        log::info!(
            "registry: opened {} with {} dictionaries and {} aliases",
            storage.dir().display(),
            items.len(),
            metadata.len()
        );

        Ok(Registry {
            inner: RwLock::new(Inner { items, metadata }),
            storage,
            autosave_started: AtomicBool::new(false),
        })
    }

    fn load(storage: &Storage, code: &str) -> Result<RegistryItem<D>, RegistryError> {
        let bytes = storage.read_record(code)?;
        RegistryItem::decode(&bytes).map_err(|source| RegistryError::Decode {
            path: storage.record_path(code),
            source,
        })
    }

    /// The storage directory.
    pub fn dir(&self) -> &Path {
        self.storage.dir()
    }

    /// Creates an empty dictionary under `code`. Nothing is written to disk.
    pub fn add(&self, code: &str, options: DictionaryOptions) -> Result<Arc<D>, RegistryError> {
        validate_name(code)?;

        let mut inner = self.inner.write();
        if inner.items.contains_key(code) {
            return Err(RegistryError::AlreadyExists(code.into()));
        }

        let item = RegistryItem::new(options).map_err(RegistryError::Initialization)?;
        let dictionary = Arc::clone(&item.dictionary);
        inner.items.insert(SmolStr::new(code), item);

        log::info!("registry: dictionary '{}' created", code);
        Ok(dictionary)
    }

    /// Finds a dictionary by code, falling back to resolving `code` as an alias.
    pub fn get(&self, code: &str) -> Result<Arc<D>, RegistryError> {
        let inner = self.inner.read();

        if let Some(item) = inner.items.get(code) {
            return Ok(Arc::clone(&item.dictionary));
        }

        inner
            .metadata
            .code(code)
            .and_then(|target| inner.items.get(target))
            .map(|item| Arc::clone(&item.dictionary))
            .ok_or_else(|| RegistryError::NotFound(code.into()))
    }

    /// Options `code` was created with. Aliases are not resolved.
    pub fn options(&self, code: &str) -> Result<DictionaryOptions, RegistryError> {
        self.inner
            .read()
            .items
            .get(code)
            .map(|item| item.options.clone())
            .ok_or_else(|| RegistryError::NotFound(code.into()))
    }

    /// Removes `code` and its record file. Aliases pointing at it are kept.
    pub fn delete(&self, code: &str) -> Result<(), RegistryError> {
        let mut inner = self.inner.write();
        if !inner.items.contains_key(code) {
            return Err(RegistryError::NotFound(code.into()));
        }

        self.storage.remove_record(code)?;
        inner.items.remove(code);

        log::info!("registry: dictionary '{}' deleted", code);
        Ok(())
    }

    /// Every dictionary code with its aliases, in no particular order.
    pub fn list(&self) -> Vec<ListItem> {
        let inner = self.inner.read();

        inner
            .items
            .keys()
            .map(|code| ListItem {
                code: code.clone(),
                aliases: inner.metadata.aliases_of(code).to_vec(),
            })
            .collect()
    }

    /// Same view as [`Registry::list`].
    pub fn list_aliases(&self) -> Vec<ListItem> {
        self.list()
    }

    /// Writes the record of `code`.
    pub fn save(&self, code: &str) -> Result<(), RegistryError> {
        let inner = self.inner.read();
        let item = inner
            .items
            .get(code)
            .ok_or_else(|| RegistryError::NotFound(code.into()))?;

        self.write_item(code, item)
    }

    /// Writes the metadata and then every record, stopping at the first failure.
    pub fn save_all(&self) -> Result<(), RegistryError> {
        let inner = self.inner.read();

        self.write_metadata(&inner.metadata)?;

        for (code, item) in inner.items.iter() {
            self.write_item(code, item)?;
            log::info!("registry: dictionary '{}' saved", code);
        }

        Ok(())
    }

    /// Points `alias` at `code` and persists the metadata before returning.
    ///
    /// An alias already pointing elsewhere is moved. Setting the same alias
    /// twice is a no-op.
    pub fn set_alias(&self, alias: &str, code: &str) -> Result<(), RegistryError> {
        validate_name(alias)?;

        let mut inner = self.inner.write();
        if !inner.items.contains_key(code) {
            return Err(RegistryError::AliasTargetNotFound {
                alias: alias.into(),
                code: code.into(),
            });
        }

        if inner.metadata.code(alias).map(SmolStr::as_str) == Some(code) {
            return Ok(());
        }

        let previous = inner.metadata.clone();
        inner.metadata.set(alias, code);

        if let Err(e) = self.write_metadata(&inner.metadata) {
            inner.metadata = previous;
            return Err(e);
        }

        log::info!("registry: alias '{}' set to '{}'", alias, code);
        Ok(())
    }

    /// Removes `alias` and persists the metadata before returning.
    pub fn delete_alias(&self, alias: &str) -> Result<(), RegistryError> {
        let mut inner = self.inner.write();

        let previous = inner.metadata.clone();
        if inner.metadata.remove(alias).is_none() {
            return Err(RegistryError::AliasNotFound(alias.into()));
        }

        if let Err(e) = self.write_metadata(&inner.metadata) {
            inner.metadata = previous;
            return Err(e);
        }

        log::info!("registry: alias '{}' deleted", alias);
        Ok(())
    }

    /// Code `alias` points at. The code may no longer exist.
    pub fn get_code_by_alias(&self, alias: &str) -> Result<SmolStr, RegistryError> {
        self.inner
            .read()
            .metadata
            .code(alias)
            .cloned()
            .ok_or_else(|| RegistryError::AliasNotFound(alias.into()))
    }

    fn write_item(&self, code: &str, item: &RegistryItem<D>) -> Result<(), RegistryError> {
        let bytes = item
            .encode()
            .map_err(|e| RegistryError::Encode(format!("dictionary '{}'", code), e.into()))?;

        self.storage.write_record(code, &bytes)?;
        Ok(())
    }

    fn write_metadata(&self, metadata: &Metadata) -> Result<(), RegistryError> {
        let bytes = metadata
            .to_bytes()
            .map_err(|e| RegistryError::Encode("metadata".into(), e.into()))?;

        self.storage.write_metadata(&bytes)?;
        Ok(())
    }
}

/// Codes name files in the storage directory, so they cannot be paths.
fn validate_name(name: &str) -> Result<(), RegistryError> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(|c: char| c == '/' || c == '\\' || c == '\0');

    if invalid {
        return Err(RegistryError::InvalidName(name.to_string()));
    }

    Ok(())
}
