//! Pack entity - a named selection of gear items

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::identity::{EntityId, EntityPrefix};
use crate::entities::item::GearItem;

/// A user-assembled subset of the inventory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pack {
    /// Unique identifier
    pub id: EntityId,

    /// Pack name (unique within a project, case-insensitive)
    pub name: String,

    /// Creation timestamp
    pub created: DateTime<Utc>,

    /// Selected item ids, in selection order, without duplicates
    #[serde(default)]
    pub items: Vec<EntityId>,
}

impl Pack {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Pack),
            name: name.into(),
            created: Utc::now(),
            items: Vec::new(),
        }
    }

    pub fn contains(&self, id: &EntityId) -> bool {
        self.items.contains(id)
    }

    /// Add an item; returns false if it was already selected
    pub fn add(&mut self, id: EntityId) -> bool {
        if self.contains(&id) {
            return false;
        }
        self.items.push(id);
        true
    }

    /// Remove an item; returns false if it was not selected
    pub fn remove(&mut self, id: &EntityId) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i != id);
        self.items.len() != before
    }

    /// Flip selection state; returns true if the item is now selected
    pub fn toggle(&mut self, id: EntityId) -> bool {
        if self.remove(&id) {
            false
        } else {
            self.items.push(id);
            true
        }
    }

    /// Selected items that still exist, heaviest first
    pub fn packed_items<'a>(&self, inventory: &'a [GearItem]) -> Vec<&'a GearItem> {
        let mut packed: Vec<&GearItem> = inventory
            .iter()
            .filter(|item| self.contains(&item.id))
            .collect();
        packed.sort_by(|a, b| b.weight.cmp(&a.weight));
        packed
    }

    /// Sum of weight over exactly the selected items
    pub fn total_weight(&self, inventory: &[GearItem]) -> u64 {
        crate::inventory::aggregate::total_weight(inventory, &self.items)
    }

    /// Drop ids that no longer exist; returns how many were dropped
    pub fn prune(&mut self, removed: &[EntityId]) -> usize {
        let before = self.items.len();
        self.items.retain(|id| !removed.contains(id));
        before - self.items.len()
    }
}

/// All packs of a project
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackBook {
    packs: Vec<Pack>,
}

impl PackBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pack> {
        self.packs.iter()
    }

    pub fn len(&self) -> usize {
        self.packs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packs.is_empty()
    }

    /// Create a pack; returns None if the name is already taken
    pub fn create(&mut self, name: &str) -> Option<&mut Pack> {
        let name = name.trim();
        if name.is_empty() || self.position(name).is_some() {
            return None;
        }
        self.packs.push(Pack::new(name));
        self.packs.last_mut()
    }

    /// Find a pack by full id, id prefix, or case-insensitive name
    pub fn find(&self, reference: &str) -> Option<&Pack> {
        self.position(reference).map(|i| &self.packs[i])
    }

    pub fn find_mut(&mut self, reference: &str) -> Option<&mut Pack> {
        self.position(reference).map(move |i| &mut self.packs[i])
    }

    /// Remove a pack, returning it
    pub fn delete(&mut self, reference: &str) -> Option<Pack> {
        self.position(reference).map(|i| self.packs.remove(i))
    }

    /// Remove deleted items from every pack; returns total ids dropped
    pub fn prune(&mut self, removed: &[EntityId]) -> usize {
        self.packs.iter_mut().map(|p| p.prune(removed)).sum()
    }

    fn position(&self, reference: &str) -> Option<usize> {
        let reference = reference.trim();
        let upper = reference.to_uppercase();
        self.packs
            .iter()
            .position(|p| p.id.to_string() == upper)
            .or_else(|| {
                self.packs
                    .iter()
                    .position(|p| p.name.eq_ignore_ascii_case(reference))
            })
            .or_else(|| {
                if upper.len() < 8 {
                    return None;
                }
                let mut matches = self
                    .packs
                    .iter()
                    .enumerate()
                    .filter(|(_, p)| p.id.to_string().starts_with(&upper));
                match (matches.next(), matches.next()) {
                    (Some((i, _)), None) => Some(i),
                    _ => None,
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::item::ItemDraft;
    use crate::entities::tag::TagPath;

    fn item(name: &str, weight: u32) -> GearItem {
        GearItem::from_draft(
            ItemDraft::new(name, "Brand", weight).with_path(TagPath::new("A", "B", "C")),
        )
    }

    #[test]
    fn test_toggle_updates_total() {
        let items = vec![item("Tent", 1720), item("Stove", 73), item("Knife", 212)];
        let mut pack = Pack::new("Weekend");

        assert!(pack.toggle(items[0].id));
        assert!(pack.toggle(items[1].id));
        assert_eq!(pack.total_weight(&items), 1793);

        assert!(!pack.toggle(items[0].id));
        assert_eq!(pack.total_weight(&items), 73);

        assert!(pack.toggle(items[2].id));
        assert_eq!(pack.total_weight(&items), 285);
    }

    #[test]
    fn test_add_is_idempotent() {
        let tent = item("Tent", 1720);
        let mut pack = Pack::new("Trip");
        assert!(pack.add(tent.id));
        assert!(!pack.add(tent.id));
        assert_eq!(pack.items.len(), 1);
    }

    #[test]
    fn test_packed_items_heaviest_first() {
        let items = vec![item("Stove", 73), item("Tent", 1720), item("Knife", 212)];
        let mut pack = Pack::new("Trip");
        for i in &items {
            pack.add(i.id);
        }
        let names: Vec<&str> = pack
            .packed_items(&items)
            .iter()
            .map(|i| i.name.as_str())
            .collect();
        assert_eq!(names, vec!["Tent", "Knife", "Stove"]);
    }

    #[test]
    fn test_book_rejects_duplicate_names() {
        let mut book = PackBook::new();
        assert!(book.create("Summer").is_some());
        assert!(book.create("summer").is_none());
        assert!(book.create("   ").is_none());
        assert_eq!(book.len(), 1);
    }

    #[test]
    fn test_book_find_by_name_and_id() {
        let mut book = PackBook::new();
        let id = book.create("Summer").unwrap().id;
        assert_eq!(book.find("SUMMER").map(|p| p.id), Some(id));
        assert_eq!(book.find(&id.to_string()).map(|p| p.id), Some(id));
        assert_eq!(book.find(&id.to_string()[..12]).map(|p| p.id), Some(id));
        assert!(book.find("Winter").is_none());
    }

    #[test]
    fn test_book_prune_removes_deleted_items() {
        let tent = item("Tent", 1720);
        let stove = item("Stove", 73);
        let mut book = PackBook::new();
        {
            let pack = book.create("A").unwrap();
            pack.add(tent.id);
            pack.add(stove.id);
        }
        book.create("B").unwrap().add(tent.id);

        assert_eq!(book.prune(&[tent.id]), 2);
        assert_eq!(book.find("A").unwrap().items, vec![stove.id]);
        assert!(book.find("B").unwrap().items.is_empty());
    }
}
