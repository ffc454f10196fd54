//! Grouping and weight aggregation over the tag hierarchy

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::identity::EntityId;
use crate::entities::item::GearItem;

/// Items grouped Top Tag → Middle Tag → Base Tag
pub type GroupedGear<'a> = BTreeMap<String, BTreeMap<String, BTreeMap<String, Vec<&'a GearItem>>>>;

/// Group items by their exact (tt, mt, bt) path
pub fn group_by_path<'a, I>(items: I) -> GroupedGear<'a>
where
    I: IntoIterator<Item = &'a GearItem>,
{
    let mut grouped: GroupedGear<'a> = BTreeMap::new();
    for item in items {
        grouped
            .entry(item.tt.clone())
            .or_default()
            .entry(item.mt.clone())
            .or_default()
            .entry(item.bt.clone())
            .or_default()
            .push(item);
    }
    grouped
}

/// Sum of `weight` over exactly the selected ids
///
/// Ids that do not match an item contribute nothing; duplicates in the
/// selection are counted once.
pub fn total_weight(items: &[GearItem], selection: &[EntityId]) -> u64 {
    items
        .iter()
        .filter(|item| selection.contains(&item.id))
        .map(|item| u64::from(item.weight))
        .sum()
}

/// One slice of a weight breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionNode {
    pub tag: String,
    pub weight: u64,
    /// Share of the parent slice (or of the pack total at the top), 0-100
    pub percentage: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DistributionNode>,
}

/// Weight breakdown of a pack mirroring the tag tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackAnalysis {
    pub total_weight: u64,
    pub distribution: Vec<DistributionNode>,
}

/// Compute the TT → MT → BT breakdown locally
///
/// Slices are sorted heaviest first; ties keep name order.
pub fn weight_distribution<'a, I>(items: I) -> PackAnalysis
where
    I: IntoIterator<Item = &'a GearItem>,
{
    let grouped = group_by_path(items);

    let distribution: Vec<DistributionNode> = grouped
        .iter()
        .map(|(tt, mts)| {
            let children = mts
                .iter()
                .map(|(mt, bts)| {
                    let children = bts
                        .iter()
                        .map(|(bt, items)| leaf(bt, items))
                        .collect();
                    branch(mt, children)
                })
                .collect();
            branch(tt, children)
        })
        .collect();

    let total_weight = distribution.iter().map(|n| n.weight).sum();
    let mut distribution = distribution;
    assign_percentages(&mut distribution, total_weight);
    sort_heaviest_first(&mut distribution);

    PackAnalysis {
        total_weight,
        distribution,
    }
}

fn leaf(tag: &str, items: &[&GearItem]) -> DistributionNode {
    DistributionNode {
        tag: tag.to_string(),
        weight: items.iter().map(|i| u64::from(i.weight)).sum(),
        percentage: 0.0,
        children: Vec::new(),
    }
}

fn branch(tag: &str, children: Vec<DistributionNode>) -> DistributionNode {
    DistributionNode {
        tag: tag.to_string(),
        weight: children.iter().map(|c| c.weight).sum(),
        percentage: 0.0,
        children,
    }
}

fn assign_percentages(nodes: &mut [DistributionNode], parent_weight: u64) {
    for node in nodes {
        node.percentage = percentage(node.weight, parent_weight);
        let weight = node.weight;
        assign_percentages(&mut node.children, weight);
    }
}

fn sort_heaviest_first(nodes: &mut [DistributionNode]) {
    nodes.sort_by(|a, b| b.weight.cmp(&a.weight));
    for node in nodes {
        sort_heaviest_first(&mut node.children);
    }
}

/// `part / whole` as a percentage rounded to one decimal
pub fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    (part as f64 * 1000.0 / whole as f64).round() / 10.0
}

/// Descend into a breakdown by tag names
///
/// An empty path returns the top level. Returns `None` if a segment does not
/// exist or has no children to show.
pub fn drill<'a>(distribution: &'a [DistributionNode], path: &[&str]) -> Option<&'a [DistributionNode]> {
    let mut level = distribution;
    for segment in path {
        let node = level.iter().find(|n| n.tag == *segment)?;
        if node.children.is_empty() {
            return None;
        }
        level = &node.children;
    }
    Some(level)
}

/// Format grams as `"1720g (1.72kg)"`
pub fn format_weight(grams: u64) -> String {
    format!("{}g ({:.2}kg)", grams, grams as f64 / 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::item::ItemDraft;
    use crate::entities::tag::TagPath;

    fn item(name: &str, weight: u32, tt: &str, mt: &str, bt: &str) -> GearItem {
        GearItem::from_draft(ItemDraft::new(name, "", weight).with_path(TagPath::new(tt, mt, bt)))
    }

    fn gear() -> Vec<GearItem> {
        vec![
            item("Hubba Hubba NX", 1720, "Shelter", "Tent", "2-Person Tent"),
            item("Cosmic 20", 1162, "Shelter", "Sleeping Bag", "3-Season Synthetic"),
            item("PocketRocket 2", 73, "Cookware", "Stove", "Canister Stove"),
            item("Windburner", 430, "Cookware", "Stove", "Canister Stove"),
            item("Leatherman Signal", 212, "Tools", "Knife", "Multi-tool"),
        ]
    }

    #[test]
    fn test_group_by_path_nests_three_levels() {
        let items = gear();
        let grouped = group_by_path(&items);
        assert_eq!(grouped.len(), 3);
        assert_eq!(grouped["Shelter"].len(), 2);
        let stoves = &grouped["Cookware"]["Stove"]["Canister Stove"];
        assert_eq!(stoves.len(), 2);
        assert!(stoves.iter().all(|i| i.bt == "Canister Stove"));
    }

    #[test]
    fn test_total_weight_counts_only_selection() {
        let items = gear();
        let selection = vec![items[0].id, items[2].id];
        assert_eq!(total_weight(&items, &selection), 1793);
        assert_eq!(total_weight(&items, &[]), 0);
    }

    #[test]
    fn test_distribution_is_recursive_and_sorted() {
        let items = gear();
        let analysis = weight_distribution(&items);
        assert_eq!(analysis.total_weight, 3597);

        let tags: Vec<&str> = analysis.distribution.iter().map(|n| n.tag.as_str()).collect();
        assert_eq!(tags, vec!["Shelter", "Cookware", "Tools"]);

        let shelter = &analysis.distribution[0];
        assert_eq!(shelter.weight, 2882);
        assert_eq!(shelter.percentage, 80.1);
        assert_eq!(shelter.children[0].tag, "Tent");
        assert_eq!(shelter.children[0].percentage, 59.7);

        let cookware = &analysis.distribution[1];
        assert_eq!(cookware.children[0].children[0].weight, 503);
        assert_eq!(cookware.children[0].children[0].percentage, 100.0);
    }

    #[test]
    fn test_distribution_of_empty_pack() {
        let analysis = weight_distribution(std::iter::empty());
        assert_eq!(analysis.total_weight, 0);
        assert!(analysis.distribution.is_empty());
    }

    #[test]
    fn test_drill_follows_tags() {
        let items = gear();
        let analysis = weight_distribution(&items);
        let level = drill(&analysis.distribution, &["Shelter"]).unwrap();
        assert_eq!(level.len(), 2);
        let level = drill(&analysis.distribution, &["Shelter", "Tent"]).unwrap();
        assert_eq!(level[0].tag, "2-Person Tent");
        assert!(drill(&analysis.distribution, &["Shelter", "Tent", "2-Person Tent"]).is_none());
        assert!(drill(&analysis.distribution, &["Kitchen"]).is_none());
    }

    #[test]
    fn test_analysis_json_shape() {
        let items = gear();
        let json = serde_json::to_value(weight_distribution(&items)).unwrap();
        assert_eq!(json["totalWeight"], 3597);
        assert_eq!(json["distribution"][0]["tag"], "Shelter");
        assert!(json["distribution"][0]["children"].is_array());
    }

    #[test]
    fn test_format_weight() {
        assert_eq!(format_weight(1720), "1720g (1.72kg)");
        assert_eq!(format_weight(73), "73g (0.07kg)");
    }
}
