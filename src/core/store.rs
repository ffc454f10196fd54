//! Inventory persistence
//!
//! State lives in three JSON documents under `inventory/`: the item list, the
//! tag tree and the pack book. Commands load once, mutate in memory, and call
//! `save_*` after a mutation succeeds.

use miette::Diagnostic;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::defaults;
use crate::core::project::Project;
use crate::entities::item::GearItem;
use crate::entities::pack::PackBook;
use crate::inventory::catalog::Inventory;
use crate::inventory::hierarchy::TagHierarchy;

pub const ITEMS_FILE: &str = "items.json";
pub const TAGS_FILE: &str = "tags.json";
pub const PACKS_FILE: &str = "packs.json";

#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("failed to write {path}: {message}")]
    #[diagnostic(code(gear::store::write))]
    Write { path: PathBuf, message: String },

    #[error("failed to encode {what}: {source}")]
    #[diagnostic(code(gear::store::encode))]
    Encode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Load/save boundary for inventory state
pub trait InventoryStore {
    /// Items and hierarchy; falls back to the starter dataset
    fn load_inventory(&self) -> Inventory;

    fn save_inventory(&self, inventory: &Inventory) -> Result<(), StoreError>;

    /// Packs; falls back to an empty book
    fn load_packs(&self) -> PackBook;

    fn save_packs(&self, packs: &PackBook) -> Result<(), StoreError>;
}

/// JSON documents in a directory
#[derive(Debug, Clone)]
pub struct JsonStore {
    dir: PathBuf,
}

impl JsonStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn for_project(project: &Project) -> Self {
        Self::new(project.inventory_dir())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn read<T: DeserializeOwned>(&self, file: &str) -> Option<T> {
        let path = self.dir.join(file);
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "document missing");
                return None;
            }
        };
        match serde_json::from_str(&contents) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "document unreadable");
                None
            }
        }
    }

    /// Whole-document rewrite via a temp file in the same directory
    fn write<T: Serialize + ?Sized>(
        &self,
        file: &str,
        what: &'static str,
        value: &T,
    ) -> Result<(), StoreError> {
        let path = self.dir.join(file);
        let write_err = |e: std::io::Error| StoreError::Write {
            path: path.clone(),
            message: e.to_string(),
        };

        let json = serde_json::to_string_pretty(value)
            .map_err(|source| StoreError::Encode { what, source })?;
        std::fs::create_dir_all(&self.dir).map_err(write_err)?;

        let tmp = self.dir.join(format!(".{}.tmp", file));
        std::fs::write(&tmp, json).map_err(write_err)?;
        std::fs::rename(&tmp, &path).map_err(write_err)?;

        tracing::debug!(path = %path.display(), "saved document");
        Ok(())
    }
}

impl InventoryStore for JsonStore {
    fn load_inventory(&self) -> Inventory {
        let items: Option<Vec<GearItem>> = self.read(ITEMS_FILE);
        let tags: Option<TagHierarchy> = self.read(TAGS_FILE);
        let items = items.unwrap_or_else(|| {
            tracing::warn!("using starter items");
            defaults::items()
        });
        let tags = tags.unwrap_or_else(|| {
            tracing::warn!("using starter tag hierarchy");
            defaults::hierarchy()
        });
        Inventory::from_parts(items, tags)
    }

    fn save_inventory(&self, inventory: &Inventory) -> Result<(), StoreError> {
        self.write(ITEMS_FILE, "items", inventory.items())?;
        self.write(TAGS_FILE, "tags", inventory.tags())
    }

    fn load_packs(&self) -> PackBook {
        self.read(PACKS_FILE).unwrap_or_default()
    }

    fn save_packs(&self, packs: &PackBook) -> Result<(), StoreError> {
        self.write(PACKS_FILE, "packs", packs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::Offline;
    use crate::entities::item::ItemDraft;
    use crate::entities::tag::{TagPath, TagRef};
    use std::sync::Mutex;
    use tempfile::tempdir;

    /// Store that keeps documents in memory
    #[derive(Debug, Default)]
    struct MemoryStore {
        inventory: Mutex<Option<Inventory>>,
        packs: Mutex<PackBook>,
    }

    impl InventoryStore for MemoryStore {
        fn load_inventory(&self) -> Inventory {
            self.inventory
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .clone()
                .unwrap_or_else(defaults::inventory)
        }

        fn save_inventory(&self, inventory: &Inventory) -> Result<(), StoreError> {
            *self.inventory.lock().unwrap_or_else(|e| e.into_inner()) = Some(inventory.clone());
            Ok(())
        }

        fn load_packs(&self) -> PackBook {
            self.packs.lock().unwrap_or_else(|e| e.into_inner()).clone()
        }

        fn save_packs(&self, packs: &PackBook) -> Result<(), StoreError> {
            *self.packs.lock().unwrap_or_else(|e| e.into_inner()) = packs.clone();
            Ok(())
        }
    }

    #[test]
    fn test_missing_documents_fall_back_to_defaults() {
        let tmp = tempdir().unwrap();
        let store = JsonStore::new(tmp.path());
        let inv = store.load_inventory();
        assert_eq!(inv.items().len(), 5);
        assert!(store.load_packs().is_empty());
    }

    #[test]
    fn test_corrupt_items_fall_back_to_defaults() {
        let tmp = tempdir().unwrap();
        std::fs::write(tmp.path().join(ITEMS_FILE), "{ not json").unwrap();
        let inv = JsonStore::new(tmp.path()).load_inventory();
        assert_eq!(inv.items().len(), 5);
    }

    #[test]
    fn test_save_then_load_keeps_mutations() {
        let tmp = tempdir().unwrap();
        let store = JsonStore::new(tmp.path().join("inventory"));
        let mut inv = store.load_inventory();
        inv.add_item(
            ItemDraft::new("Bivy", "OR", 450).with_path(TagPath::new("Shelter", "Bivy", "Alpine")),
            &Offline,
        )
        .unwrap();
        inv.rename_tag(&TagRef::Top("Tech".into()), "Electronics").unwrap();
        store.save_inventory(&inv).unwrap();

        let reloaded = store.load_inventory();
        assert_eq!(reloaded, inv);
        assert!(!tmp.path().join("inventory").join(".items.json.tmp").exists());
    }

    #[test]
    fn test_empty_documents_stay_empty() {
        let tmp = tempdir().unwrap();
        let store = JsonStore::new(tmp.path());
        store.save_inventory(&Inventory::new()).unwrap();
        let inv = store.load_inventory();
        assert!(inv.items().is_empty());
        assert!(inv.tags().is_empty());
    }

    #[test]
    fn test_packs_round_trip() {
        let tmp = tempdir().unwrap();
        let store = JsonStore::new(tmp.path());
        let inv = store.load_inventory();
        let mut book = PackBook::new();
        book.create("Weekend").unwrap().add(inv.items()[0].id);
        store.save_packs(&book).unwrap();
        assert_eq!(store.load_packs(), book);
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::default();
        let mut inv = store.load_inventory();
        inv.delete_tag(&TagRef::Top("Tech".into())).unwrap();
        store.save_inventory(&inv).unwrap();
        assert_eq!(store.load_inventory().items().len(), 4);
    }
}
