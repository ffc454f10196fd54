//! The gear catalog - items plus the tag hierarchy they point into
//!
//! Every item carries its (tt, mt, bt) names. The catalog is the only place
//! that mutates either side, and each mutation keeps the two in step:
//! creating or editing an item ensures its path exists, renaming a tag
//! rewrites the matching segment of every item below it, and deleting a tag
//! deletes every item below it.

use miette::Diagnostic;
use thiserror::Error;

use crate::collab::{self, Collaborator};
use crate::core::identity::EntityId;
use crate::entities::item::{GearItem, ItemDraft, ValidationError};
use crate::entities::tag::{TagPath, TagRef, Visuals};
use crate::inventory::hierarchy::{TagError, TagHierarchy};

/// Errors raised by catalog operations
#[derive(Debug, Error, Diagnostic)]
pub enum InventoryError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Invalid(#[from] ValidationError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Tag(#[from] TagError),

    #[error("this exact item already exists: {name} ({brand}, {weight}g)")]
    #[diagnostic(
        code(gear::item::duplicate),
        help("items are duplicates when name, brand and weight all match")
    )]
    Duplicate {
        name: String,
        brand: String,
        weight: u32,
    },

    #[error("no gear item matches '{0}'")]
    #[diagnostic(code(gear::item::not_found), help("run `gear item list` to see item ids"))]
    ItemNotFound(String),

    #[error("'{0}' matches {1} items; use the full id")]
    #[diagnostic(code(gear::item::ambiguous))]
    Ambiguous(String, usize),
}

/// An item whose stored path does not resolve in the hierarchy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingPath {
    pub item: EntityId,
    pub name: String,
    pub path: TagPath,
}

/// Items and tag hierarchy, mutated together
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    items: Vec<GearItem>,
    tags: TagHierarchy,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble from stored documents; items are re-sorted by name
    pub fn from_parts(items: Vec<GearItem>, tags: TagHierarchy) -> Self {
        let mut inventory = Self { items, tags };
        inventory.sort_items();
        inventory
    }

    pub fn items(&self) -> &[GearItem] {
        &self.items
    }

    pub fn tags(&self) -> &TagHierarchy {
        &self.tags
    }

    /// Mutable hierarchy access for visual updates; names go through
    /// [`Inventory::rename_tag`] so items stay in step
    pub fn set_tag_visuals(
        &mut self,
        tag: &TagRef,
        visuals: Visuals,
    ) -> Result<(), InventoryError> {
        Ok(self.tags.set_visuals(tag, visuals)?)
    }

    /// Validate, reject duplicates, ensure the tag path, then store
    ///
    /// Missing tag nodes are created with visuals from the collaborator
    /// (falling back to the fixed pair when it is unavailable).
    pub fn add_item(
        &mut self,
        draft: ItemDraft,
        collaborator: &dyn Collaborator,
    ) -> Result<GearItem, InventoryError> {
        let draft = draft.validate()?;
        self.check_duplicate(&draft, None)?;

        let created = self.tags.ensure_path(&draft.path(), |name, level| {
            collab::visuals_for(collaborator, name, level)
        });

        let item = GearItem::from_draft(draft);
        tracing::info!(
            id = %item.id,
            name = %item.name,
            new_tags = created.len(),
            "added gear item"
        );
        self.items.push(item.clone());
        self.sort_items();
        Ok(item)
    }

    /// Replace an item's fields, ensuring the new path if it changed
    pub fn edit_item(
        &mut self,
        id: &EntityId,
        draft: ItemDraft,
        collaborator: &dyn Collaborator,
    ) -> Result<GearItem, InventoryError> {
        let draft = draft.validate()?;
        let index = self
            .items
            .iter()
            .position(|i| i.id == *id)
            .ok_or_else(|| InventoryError::ItemNotFound(id.to_string()))?;
        self.check_duplicate(&draft, Some(id))?;

        if self.items[index].path() != draft.path() {
            self.tags.ensure_path(&draft.path(), |name, level| {
                collab::visuals_for(collaborator, name, level)
            });
        }

        let item = GearItem::with_id(*id, draft);
        self.items[index] = item.clone();
        self.sort_items();
        tracing::info!(id = %item.id, "edited gear item");
        Ok(item)
    }

    /// Remove one item
    pub fn delete_item(&mut self, id: &EntityId) -> Result<GearItem, InventoryError> {
        let index = self
            .items
            .iter()
            .position(|i| i.id == *id)
            .ok_or_else(|| InventoryError::ItemNotFound(id.to_string()))?;
        let item = self.items.remove(index);
        tracing::info!(id = %item.id, name = %item.name, "deleted gear item");
        Ok(item)
    }

    /// Rename a Top, Middle or Base Tag and cascade to items
    ///
    /// Only the renamed segment of each affected item changes. On failure
    /// neither the hierarchy nor any item is modified. Returns the number of
    /// items rewritten.
    pub fn rename_tag(&mut self, tag: &TagRef, new_name: &str) -> Result<usize, InventoryError> {
        self.tags.rename(tag, new_name)?;

        let new_name = new_name.trim();
        let level = tag.level();
        let mut updated = 0;
        for item in self.items.iter_mut().filter(|i| tag.covers(&i.path())) {
            item.set_segment(level, new_name);
            updated += 1;
        }
        tracing::info!(tag = %tag, new_name, items = updated, "renamed tag");
        Ok(updated)
    }

    /// Delete a tag with its subtree and every item filed under it
    ///
    /// Returns the removed items.
    pub fn delete_tag(&mut self, tag: &TagRef) -> Result<Vec<GearItem>, InventoryError> {
        let removed_nodes = self.tags.delete(tag)?;

        let (removed, kept): (Vec<GearItem>, Vec<GearItem>) = std::mem::take(&mut self.items)
            .into_iter()
            .partition(|i| tag.covers(&i.path()));
        self.items = kept;

        tracing::info!(
            tag = %tag,
            nodes = removed_nodes.len(),
            items = removed.len(),
            "deleted tag"
        );
        Ok(removed)
    }

    /// Find an item by full id, unique id prefix, or unique name
    pub fn find(&self, reference: &str) -> Result<&GearItem, InventoryError> {
        let reference = reference.trim();
        let upper = reference.to_uppercase();

        if let Some(item) = self.items.iter().find(|i| i.id.to_string() == upper) {
            return Ok(item);
        }

        let by_prefix: Vec<&GearItem> = if upper.starts_with("GEAR-") && upper.len() >= 8 {
            self.items
                .iter()
                .filter(|i| i.id.to_string().starts_with(&upper))
                .collect()
        } else {
            Vec::new()
        };
        let candidates = if by_prefix.is_empty() {
            self.items
                .iter()
                .filter(|i| i.name.eq_ignore_ascii_case(reference))
                .collect()
        } else {
            by_prefix
        };

        match candidates.as_slice() {
            [item] => Ok(item),
            [] => Err(InventoryError::ItemNotFound(reference.to_string())),
            many => Err(InventoryError::Ambiguous(reference.to_string(), many.len())),
        }
    }

    /// Items whose path is missing from the hierarchy
    pub fn verify(&self) -> Vec<DanglingPath> {
        self.items
            .iter()
            .filter(|i| !self.tags.contains_path(&i.path()))
            .map(|i| DanglingPath {
                item: i.id,
                name: i.name.clone(),
                path: i.path(),
            })
            .collect()
    }

    fn check_duplicate(
        &self,
        draft: &ItemDraft,
        ignore: Option<&EntityId>,
    ) -> Result<(), InventoryError> {
        let key = draft.duplicate_key();
        let clash = self
            .items
            .iter()
            .filter(|i| Some(&i.id) != ignore)
            .any(|i| i.duplicate_key() == key);
        if clash {
            tracing::warn!(name = %draft.name, brand = %draft.brand, "rejected duplicate item");
            return Err(InventoryError::Duplicate {
                name: draft.name.clone(),
                brand: draft.brand.clone(),
                weight: draft.weight,
            });
        }
        Ok(())
    }

    fn sort_items(&mut self) {
        self.items.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.name.cmp(&b.name))
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::Offline;
    use crate::core::defaults;
    use crate::entities::tag::{TagLevel, Visuals};
    use crate::inventory::aggregate::PackAnalysis;
    use crate::collab::{ItemDetails, SuggestionContext, TagSuggestion};
    use std::sync::Mutex;

    fn draft(name: &str, brand: &str, weight: u32, tt: &str, mt: &str, bt: &str) -> ItemDraft {
        ItemDraft::new(name, brand, weight).with_path(TagPath::new(tt, mt, bt))
    }

    /// Records every visuals request
    #[derive(Default)]
    struct Recorder {
        visuals_calls: Mutex<Vec<String>>,
    }

    impl Collaborator for Recorder {
        fn suggest_tags(
            &self,
            _: TagLevel,
            _: &ItemDetails,
            _: &[String],
            _: &SuggestionContext,
        ) -> Option<Vec<TagSuggestion>> {
            None
        }
        fn tag_visuals(&self, name: &str) -> Option<Visuals> {
            self.visuals_calls.lock().unwrap().push(name.to_string());
            Some(Visuals::new("#ff0000", "🔥"))
        }
        fn brand_domain(&self, _: &str) -> Option<String> {
            None
        }
        fn analyze_pack(&self, _: &[&GearItem]) -> Option<PackAnalysis> {
            None
        }
        fn pack_summary(&self, _: &PackAnalysis) -> Option<String> {
            None
        }
    }

    #[test]
    fn test_add_item_with_novel_path_creates_missing_levels_only() {
        let mut inv = defaults::inventory();
        let shelter_before = inv.tags().resolve(&TagRef::Top("Shelter".into()));
        let nodes_before = inv.tags().len();
        let recorder = Recorder::default();

        inv.add_item(
            draft("Bivy Sack", "OR", 450, "Shelter", "Bivy", "Alpine Bivy"),
            &recorder,
        )
        .unwrap();

        assert!(inv
            .tags()
            .contains_path(&TagPath::new("Shelter", "Bivy", "Alpine Bivy")));
        assert_eq!(inv.tags().len(), nodes_before + 2);
        assert_eq!(
            inv.tags().resolve(&TagRef::Top("Shelter".into())),
            shelter_before
        );
        assert_eq!(
            *recorder.visuals_calls.lock().unwrap(),
            vec!["Bivy".to_string(), "Alpine Bivy".to_string()]
        );
    }

    #[test]
    fn test_add_item_offline_uses_fallback_visuals() {
        let mut inv = Inventory::new();
        inv.add_item(draft("Cup", "", 50, "Kitchen", "Mugs", "Titanium Mug"), &Offline)
            .unwrap();
        for node in inv.tags().walk() {
            assert_eq!(node.visuals, Visuals::fallback());
        }
        assert_eq!(inv.tags().len(), 3);
    }

    #[test]
    fn test_duplicate_item_rejected_and_list_unchanged() {
        let mut inv = defaults::inventory();
        let before = inv.items().len();

        let err = inv
            .add_item(
                draft("PocketRocket 2", "MSR", 73, "Cookware", "Stove", "Canister Stove"),
                &Offline,
            )
            .unwrap_err();
        assert!(matches!(err, InventoryError::Duplicate { .. }));

        let err = inv
            .add_item(
                draft("  pocketrocket 2 ", "msr", 73, "Cookware", "Stove", "Canister Stove"),
                &Offline,
            )
            .unwrap_err();
        assert!(matches!(err, InventoryError::Duplicate { .. }));
        assert_eq!(inv.items().len(), before);
    }

    #[test]
    fn test_same_name_different_weight_is_not_duplicate() {
        let mut inv = defaults::inventory();
        inv.add_item(
            draft("PocketRocket 2", "MSR", 83, "Cookware", "Stove", "Canister Stove"),
            &Offline,
        )
        .unwrap();
        assert_eq!(inv.items().len(), 6);
    }

    #[test]
    fn test_validation_blocks_mutation() {
        let mut inv = defaults::inventory();
        let before = inv.clone();
        let err = inv
            .add_item(draft("Spork", "", 0, "Cookware", "Utensils", "Spork"), &Offline)
            .unwrap_err();
        assert!(matches!(err, InventoryError::Invalid(ValidationError::NonPositiveWeight)));
        assert_eq!(inv, before);
    }

    #[test]
    fn test_items_stay_sorted_by_name() {
        let mut inv = defaults::inventory();
        inv.add_item(draft("aeroPress Go", "AeroPress", 320, "Cookware", "Coffee", "Press"), &Offline)
            .unwrap();
        let names: Vec<&str> = inv.items().iter().map(|i| i.name.as_str()).collect();
        let mut sorted = names.clone();
        sorted.sort_by_key(|n| n.to_lowercase());
        assert_eq!(names, sorted);
        assert_eq!(names[0], "aeroPress Go");
    }

    #[test]
    fn test_rename_middle_tag_cascades_within_top_tag_only() {
        let mut inv = defaults::inventory();
        inv.add_item(draft("Bivy", "OR", 450, "Shelter", "Tent", "Bivy"), &Offline)
            .unwrap();
        inv.add_item(draft("Fly", "X", 300, "Cookware", "Tent", "Kitchen Tarp"), &Offline)
            .unwrap();

        let updated = inv
            .rename_tag(&TagRef::Middle("Shelter".into(), "Tent".into()), "Tents")
            .unwrap();
        assert_eq!(updated, 2);

        let hubba = inv.find("Hubba Hubba NX").unwrap();
        assert_eq!(hubba.path(), TagPath::new("Shelter", "Tents", "2-Person Tent"));
        let bivy = inv.find("Bivy").unwrap();
        assert_eq!(bivy.path(), TagPath::new("Shelter", "Tents", "Bivy"));
        let fly = inv.find("Fly").unwrap();
        assert_eq!(fly.path(), TagPath::new("Cookware", "Tent", "Kitchen Tarp"));
        let stove = inv.find("PocketRocket 2").unwrap();
        assert_eq!(stove.path(), TagPath::new("Cookware", "Stove", "Canister Stove"));

        assert!(inv.verify().is_empty());
    }

    #[test]
    fn test_rename_top_and_base_tags() {
        let mut inv = defaults::inventory();
        inv.rename_tag(&TagRef::Top("Tech".into()), "Electronics").unwrap();
        assert_eq!(inv.find("PowerCore 10000").unwrap().tt, "Electronics");

        inv.rename_tag(
            &TagRef::Base("Tools".into(), "Knife".into(), "Multi-tool".into()),
            "Multitool",
        )
        .unwrap();
        let signal = inv.find("Leatherman Signal").unwrap();
        assert_eq!(signal.path(), TagPath::new("Tools", "Knife", "Multitool"));
        assert!(inv.verify().is_empty());
    }

    #[test]
    fn test_rename_collision_leaves_everything_unchanged() {
        let mut inv = defaults::inventory();
        let before = inv.clone();
        let err = inv
            .rename_tag(&TagRef::Top("Tech".into()), "Tools")
            .unwrap_err();
        assert!(matches!(err, InventoryError::Tag(TagError::Duplicate { .. })));
        assert_eq!(inv, before);
    }

    #[test]
    fn test_delete_base_tag_removes_exact_path_only() {
        let mut inv = defaults::inventory();
        inv.add_item(draft("Bivy", "OR", 450, "Shelter", "Tent", "Bivy"), &Offline)
            .unwrap();

        let removed = inv
            .delete_tag(&TagRef::Base("Shelter".into(), "Tent".into(), "2-Person Tent".into()))
            .unwrap();
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].name, "Hubba Hubba NX");
        assert!(inv.find("Bivy").is_ok());
        assert_eq!(inv.items().len(), 5);
        assert!(inv.verify().is_empty());
    }

    #[test]
    fn test_delete_top_tag_removes_all_items_beneath() {
        let mut inv = defaults::inventory();
        inv.add_item(draft("Bivy", "OR", 450, "Shelter", "Bivy", "Alpine"), &Offline)
            .unwrap();

        let removed = inv.delete_tag(&TagRef::Top("Shelter".into())).unwrap();
        assert_eq!(removed.len(), 3);
        assert!(inv.items().iter().all(|i| i.tt != "Shelter"));
        assert!(inv.tags().resolve(&TagRef::Top("Shelter".into())).is_none());
    }

    #[test]
    fn test_delete_missing_tag_fails() {
        let mut inv = defaults::inventory();
        let err = inv.delete_tag(&TagRef::Top("Kayak".into())).unwrap_err();
        assert!(matches!(err, InventoryError::Tag(TagError::NotFound(_))));
        assert_eq!(inv.items().len(), 5);
    }

    #[test]
    fn test_edit_item_moves_to_new_path() {
        let mut inv = defaults::inventory();
        let id = inv.find("Cosmic 20").unwrap().id;
        let mut d = inv.find("Cosmic 20").unwrap().to_draft();
        d.mt = "Sleep System".into();
        d.bt = "Synthetic Bag".into();

        let edited = inv.edit_item(&id, d, &Offline).unwrap();
        assert_eq!(edited.id, id);
        assert!(inv
            .tags()
            .contains_path(&TagPath::new("Shelter", "Sleep System", "Synthetic Bag")));
        assert!(inv.verify().is_empty());
    }

    #[test]
    fn test_edit_item_cannot_become_duplicate() {
        let mut inv = defaults::inventory();
        let id = inv.find("Cosmic 20").unwrap().id;
        let d = inv.find("PocketRocket 2").unwrap().to_draft();
        assert!(matches!(
            inv.edit_item(&id, d, &Offline),
            Err(InventoryError::Duplicate { .. })
        ));
    }

    #[test]
    fn test_find_by_id_prefix_and_name() {
        let inv = defaults::inventory();
        let item = inv.find("cosmic 20").unwrap();
        let full = item.id.to_string();
        assert_eq!(inv.find(&full).unwrap().id, item.id);
        assert_eq!(inv.find(&full[..20].to_lowercase()).unwrap().id, item.id);
        assert!(matches!(inv.find("Nope"), Err(InventoryError::ItemNotFound(_))));
    }

    #[test]
    fn test_delete_item() {
        let mut inv = defaults::inventory();
        let id = inv.find("Cosmic 20").unwrap().id;
        inv.delete_item(&id).unwrap();
        assert_eq!(inv.items().len(), 4);
        assert!(matches!(inv.delete_item(&id), Err(InventoryError::ItemNotFound(_))));
    }
}
