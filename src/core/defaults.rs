//! Starter dataset for new projects

use crate::entities::item::{GearItem, ItemDraft};
use crate::entities::tag::{TagLevel, TagPath, Visuals};
use crate::inventory::catalog::Inventory;
use crate::inventory::hierarchy::TagHierarchy;

const TOP_VISUALS: [(&str, &str, &str); 4] = [
    ("Shelter", "#2980b9", "⛺️"),
    ("Cookware", "#e67e22", "🍳"),
    ("Tools", "#c0392b", "🛠️"),
    ("Tech", "#8e44ad", "🔋"),
];

/// (name, brand, weight, notes, tt, mt, bt)
const ITEMS: [(&str, &str, u32, &str, &str, &str, &str); 5] = [
    ("Hubba Hubba NX", "MSR", 1720, "Reliable 2-person tent.", "Shelter", "Tent", "2-Person Tent"),
    ("Cosmic 20", "Kelty", 1162, "Good for 3-season use.", "Shelter", "Sleeping Bag", "3-Season Synthetic"),
    ("PocketRocket 2", "MSR", 73, "Fast and lightweight stove.", "Cookware", "Stove", "Canister Stove"),
    ("Leatherman Signal", "Leatherman", 212, "Contains all essential tools.", "Tools", "Knife", "Multi-tool"),
    ("PowerCore 10000", "Anker", 180, "About 2-3 phone charges.", "Tech", "Power", "Power Bank"),
];

fn drafts() -> impl Iterator<Item = ItemDraft> {
    ITEMS.iter().map(|&(name, brand, weight, notes, tt, mt, bt)| {
        ItemDraft::new(name, brand, weight)
            .with_notes(notes)
            .with_path(TagPath::new(tt, mt, bt))
    })
}

/// The starter hierarchy: four Top Tags, each with one or two branches
///
/// Only Top Tags carry visuals; deeper nodes have empty color and emoji.
pub fn hierarchy() -> TagHierarchy {
    let mut tags = TagHierarchy::new();
    for draft in drafts() {
        tags.ensure_path(&draft.path(), |name, level| match level {
            TagLevel::Top => TOP_VISUALS
                .iter()
                .find(|(top, _, _)| *top == name)
                .map(|&(_, color, emoji)| Visuals::new(color, emoji))
                .unwrap_or_default(),
            TagLevel::Middle | TagLevel::Base => Visuals::new("", ""),
        });
    }
    tags
}

/// The five starter items, with fresh ids
pub fn items() -> Vec<GearItem> {
    drafts().map(GearItem::from_draft).collect()
}

pub fn inventory() -> Inventory {
    Inventory::from_parts(items(), hierarchy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::tag::TagRef;

    #[test]
    fn test_default_inventory_is_consistent() {
        let inv = inventory();
        assert_eq!(inv.items().len(), 5);
        assert_eq!(inv.tags().len(), 4 + 5 + 5);
        assert!(inv.verify().is_empty());
    }

    #[test]
    fn test_top_tags_in_order_with_visuals() {
        let tags = hierarchy();
        let names: Vec<&str> = tags.roots().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["Shelter", "Cookware", "Tools", "Tech"]);
        assert_eq!(tags.top_visuals("Cookware").unwrap().emoji, "🍳");

        let tent = tags
            .resolve(&TagRef::Middle("Shelter".into(), "Tent".into()))
            .and_then(|id| tags.node(&id))
            .unwrap();
        assert!(tent.visuals.color.is_empty());
    }
}
