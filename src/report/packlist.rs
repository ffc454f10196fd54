//! Printable pack list
//!
//! Packed items grouped by Top Tag in hierarchy order, with the Top Tag's
//! emoji in each heading and the pack total in grams and kilograms.

use miette::Diagnostic;
use rust_embed::Embed;
use serde::Serialize;
use tera::Tera;
use thiserror::Error;

use crate::entities::item::GearItem;
use crate::entities::pack::Pack;
use crate::entities::tag::FALLBACK_EMOJI;
use crate::inventory::aggregate::format_weight;
use crate::inventory::catalog::Inventory;

#[derive(Embed)]
#[folder = "templates/"]
struct EmbeddedTemplates;

const PACKLIST_TEMPLATE: &str = "packlist.html";

#[derive(Debug, Error, Diagnostic)]
pub enum ReportError {
    #[error("template not found: {0}")]
    #[diagnostic(code(gear::report::template))]
    NotFound(String),

    #[error("template rendering error: {0}")]
    #[diagnostic(code(gear::report::render))]
    RenderError(String),
}

/// One printed item line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackLine {
    /// `name (brand)`, or just the name when the brand is empty
    pub label: String,
    pub weight: u32,
}

/// Items under one Top Tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackSection {
    pub tag: String,
    pub emoji: String,
    pub color: String,
    pub weight: u64,
    pub items: Vec<PackLine>,
}

/// Everything a pack list shows
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackList {
    pub title: String,
    pub total_weight: u64,
    pub total_display: String,
    pub sections: Vec<PackSection>,
}

impl PackList {
    /// Group a pack's items by Top Tag
    ///
    /// Sections follow hierarchy order and skip Top Tags with nothing packed.
    /// Items whose Top Tag is missing from the hierarchy are listed last.
    pub fn build(pack: &Pack, inventory: &Inventory) -> Self {
        let packed = pack.packed_items(inventory.items());
        let tags = inventory.tags();

        let mut sections: Vec<PackSection> = tags
            .roots()
            .filter_map(|top| {
                let items: Vec<&GearItem> =
                    packed.iter().copied().filter(|i| i.tt == top.name).collect();
                if items.is_empty() {
                    return None;
                }
                Some(section(&top.name, &top.visuals.emoji, &top.visuals.color, &items))
            })
            .collect();

        let mut orphans: Vec<&str> = Vec::new();
        for item in packed.iter().filter(|i| tags.top_visuals(&i.tt).is_none()) {
            if !orphans.contains(&item.tt.as_str()) {
                orphans.push(&item.tt);
            }
        }
        for tt in orphans {
            let items: Vec<&GearItem> = packed.iter().copied().filter(|i| i.tt == tt).collect();
            sections.push(section(tt, FALLBACK_EMOJI, "", &items));
        }

        let total_weight = pack.total_weight(inventory.items());
        Self {
            title: pack.name.clone(),
            total_weight,
            total_display: format_weight(total_weight),
            sections,
        }
    }

    /// Plain-text rendering of the same grouping
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("{}\n", self.title));
        out.push_str(&format!("Total Weight: {}\n", self.total_display));
        for section in &self.sections {
            out.push('\n');
            let heading = format!("{} {}", section.emoji, section.tag);
            out.push_str(heading.trim());
            out.push('\n');
            for line in &section.items {
                out.push_str(&format!("  {:<40} {:>6}g\n", line.label, line.weight));
            }
        }
        out
    }
}

fn section(tag: &str, emoji: &str, color: &str, items: &[&GearItem]) -> PackSection {
    PackSection {
        tag: tag.to_string(),
        emoji: emoji.to_string(),
        color: color.to_string(),
        weight: items.iter().map(|i| u64::from(i.weight)).sum(),
        items: items
            .iter()
            .map(|i| PackLine {
                label: if i.brand.is_empty() {
                    i.name.clone()
                } else {
                    format!("{} ({})", i.name, i.brand)
                },
                weight: i.weight,
            })
            .collect(),
    }
}

/// HTML renderer over the embedded templates
pub struct ReportRenderer {
    tera: Tera,
}

impl ReportRenderer {
    pub fn new() -> Result<Self, ReportError> {
        let mut tera = Tera::default();

        for file in EmbeddedTemplates::iter() {
            let filename = file.as_ref();
            if let Some(content) = EmbeddedTemplates::get(filename) {
                if let Ok(template_str) = std::str::from_utf8(&content.data) {
                    // Registered without `.tera` so html autoescaping applies
                    let name = filename.trim_end_matches(".tera");
                    tera.add_raw_template(name, template_str)
                        .map_err(|e| ReportError::RenderError(e.to_string()))?;
                }
            }
        }

        Ok(Self { tera })
    }

    pub fn render_html(&self, list: &PackList) -> Result<String, ReportError> {
        if !self.tera.get_template_names().any(|n| n == PACKLIST_TEMPLATE) {
            return Err(ReportError::NotFound(PACKLIST_TEMPLATE.to_string()));
        }
        let context = tera::Context::from_serialize(list)
            .map_err(|e| ReportError::RenderError(e.to_string()))?;
        self.tera
            .render(PACKLIST_TEMPLATE, &context)
            .map_err(|e| ReportError::RenderError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::Offline;
    use crate::core::defaults;
    use crate::entities::item::ItemDraft;
    use crate::entities::tag::TagPath;

    fn pack_of(inv: &Inventory, names: &[&str]) -> Pack {
        let mut pack = Pack::new("Weekend");
        for name in names {
            pack.add(inv.find(name).unwrap().id);
        }
        pack
    }

    #[test]
    fn test_sections_follow_hierarchy_order() {
        let inv = defaults::inventory();
        let pack = pack_of(&inv, &["PowerCore 10000", "PocketRocket 2", "Hubba Hubba NX"]);
        let list = PackList::build(&pack, &inv);

        let tags: Vec<&str> = list.sections.iter().map(|s| s.tag.as_str()).collect();
        assert_eq!(tags, vec!["Shelter", "Cookware", "Tech"]);
        assert_eq!(list.sections[0].emoji, "⛺️");
        assert_eq!(list.total_weight, 1973);
        assert_eq!(list.total_display, "1973g (1.97kg)");
        assert_eq!(list.sections[0].items[0].label, "Hubba Hubba NX (MSR)");
    }

    #[test]
    fn test_empty_pack() {
        let inv = defaults::inventory();
        let list = PackList::build(&Pack::new("Empty"), &inv);
        assert!(list.sections.is_empty());
        assert_eq!(list.total_display, "0g (0.00kg)");
    }

    #[test]
    fn test_brandless_item_label() {
        let mut inv = defaults::inventory();
        inv.add_item(
            ItemDraft::new("Spork", "", 17).with_path(TagPath::new("Cookware", "Utensils", "Spork")),
            &Offline,
        )
        .unwrap();
        let list = PackList::build(&pack_of(&inv, &["Spork"]), &inv);
        assert_eq!(list.sections[0].items[0].label, "Spork");
    }

    #[test]
    fn test_html_render() {
        let inv = defaults::inventory();
        let pack = pack_of(&inv, &["Cosmic 20", "Leatherman Signal"]);
        let html = ReportRenderer::new()
            .unwrap()
            .render_html(&PackList::build(&pack, &inv))
            .unwrap();

        assert!(html.contains("Total Weight: 1374g (1.37kg)"));
        assert!(html.contains("⛺️ Shelter"));
        assert!(html.contains("🛠️ Tools"));
        assert!(html.contains("<span>1162g</span>"));
        assert!(html.find("Shelter").unwrap() < html.find("Tools").unwrap());
    }

    #[test]
    fn test_html_escapes_names() {
        let mut inv = Inventory::new();
        inv.add_item(
            ItemDraft::new("<Tarp>", "A&B", 300).with_path(TagPath::new("Shelter", "Tarp", "Flat")),
            &Offline,
        )
        .unwrap();
        let html = ReportRenderer::new()
            .unwrap()
            .render_html(&PackList::build(&pack_of(&inv, &["<Tarp>"]), &inv))
            .unwrap();
        assert!(html.contains("&lt;Tarp&gt; (A&amp;B)"));
    }

    #[test]
    fn test_text_render() {
        let inv = defaults::inventory();
        let text = PackList::build(&pack_of(&inv, &["PocketRocket 2"]), &inv).to_text();
        assert!(text.contains("Total Weight: 73g (0.07kg)"));
        assert!(text.contains("🍳 Cookware"));
        assert!(text.contains("PocketRocket 2 (MSR)"));
    }
}
