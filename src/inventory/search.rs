//! Inventory search by item name, brand or tag

use crate::entities::item::GearItem;

/// Which field a query is matched against
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchBy {
    /// Item name
    #[default]
    Item,
    /// Brand name
    Brand,
    /// Any of the three tag names
    Tag,
}

/// Case-insensitive substring match
pub fn matches(item: &GearItem, query: &str, by: SearchBy) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }
    match by {
        SearchBy::Item => item.name.to_lowercase().contains(&query),
        SearchBy::Brand => item.brand.to_lowercase().contains(&query),
        SearchBy::Tag => [&item.tt, &item.mt, &item.bt]
            .iter()
            .any(|tag| tag.to_lowercase().contains(&query)),
    }
}

/// Items matching `query`; an empty query matches everything
pub fn search<'a>(items: &'a [GearItem], query: &str, by: SearchBy) -> Vec<&'a GearItem> {
    items.iter().filter(|i| matches(i, query, by)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::item::ItemDraft;
    use crate::entities::tag::TagPath;

    fn items() -> Vec<GearItem> {
        vec![
            GearItem::from_draft(
                ItemDraft::new("Hubba Hubba NX", "MSR", 1720)
                    .with_path(TagPath::new("Shelter", "Tent", "2-Person Tent")),
            ),
            GearItem::from_draft(
                ItemDraft::new("PocketRocket 2", "MSR", 73)
                    .with_path(TagPath::new("Cookware", "Stove", "Canister Stove")),
            ),
            GearItem::from_draft(
                ItemDraft::new("PowerCore 10000", "Anker", 180)
                    .with_path(TagPath::new("Tech", "Power", "Power Bank")),
            ),
        ]
    }

    #[test]
    fn test_search_by_item_name() {
        let items = items();
        let found = search(&items, "rocket", SearchBy::Item);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "PocketRocket 2");
    }

    #[test]
    fn test_search_by_brand() {
        let items = items();
        assert_eq!(search(&items, "msr", SearchBy::Brand).len(), 2);
        assert!(search(&items, "msr", SearchBy::Item).is_empty());
    }

    #[test]
    fn test_search_by_any_tag_level() {
        let items = items();
        assert_eq!(search(&items, "power", SearchBy::Tag).len(), 1);
        assert_eq!(search(&items, "TENT", SearchBy::Tag).len(), 1);
        assert_eq!(search(&items, "canister", SearchBy::Tag).len(), 1);
    }

    #[test]
    fn test_empty_query_matches_all() {
        let items = items();
        assert_eq!(search(&items, "  ", SearchBy::Brand).len(), 3);
    }
}
