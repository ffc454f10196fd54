//! Gear item entity - one catalogued piece of gear

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::identity::{EntityId, EntityPrefix};
use crate::entities::tag::{TagLevel, TagPath};

/// A catalogued gear item
///
/// The `tt`/`mt`/`bt` fields are a denormalized path into the tag hierarchy;
/// the catalog keeps them in step with tag renames and deletions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GearItem {
    /// Unique identifier
    pub id: EntityId,

    /// Item name (e.g. "Hubba Hubba NX")
    pub name: String,

    /// Brand name (may be empty)
    #[serde(default)]
    pub brand: String,

    /// Weight in grams
    pub weight: u32,

    /// Free-text notes
    #[serde(default)]
    pub notes: String,

    /// Top Tag
    pub tt: String,

    /// Middle Tag
    pub mt: String,

    /// Base Tag
    pub bt: String,
}

impl GearItem {
    /// Materialize a validated draft with a fresh id
    pub fn from_draft(draft: ItemDraft) -> Self {
        Self::with_id(EntityId::new(EntityPrefix::Gear), draft)
    }

    /// Materialize a draft under an existing id
    pub fn with_id(id: EntityId, draft: ItemDraft) -> Self {
        Self {
            id,
            name: draft.name,
            brand: draft.brand,
            weight: draft.weight,
            notes: draft.notes,
            tt: draft.tt,
            mt: draft.mt,
            bt: draft.bt,
        }
    }

    /// The item's tag path
    pub fn path(&self) -> TagPath {
        TagPath::new(&self.tt, &self.mt, &self.bt)
    }

    /// Overwrite a single path segment
    pub fn set_segment(&mut self, level: TagLevel, name: &str) {
        match level {
            TagLevel::Top => self.tt = name.to_string(),
            TagLevel::Middle => self.mt = name.to_string(),
            TagLevel::Base => self.bt = name.to_string(),
        }
    }

    /// Key used for duplicate detection: normalized name and brand, exact weight
    pub fn duplicate_key(&self) -> (String, String, u32) {
        duplicate_key(&self.name, &self.brand, self.weight)
    }

    /// Convert back to an editable draft
    pub fn to_draft(&self) -> ItemDraft {
        ItemDraft {
            name: self.name.clone(),
            brand: self.brand.clone(),
            weight: self.weight,
            notes: self.notes.clone(),
            tt: self.tt.clone(),
            mt: self.mt.clone(),
            bt: self.bt.clone(),
        }
    }
}

fn duplicate_key(name: &str, brand: &str, weight: u32) -> (String, String, u32) {
    (
        name.trim().to_lowercase(),
        brand.trim().to_lowercase(),
        weight,
    )
}

/// Field values for an item that has not been stored yet
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDraft {
    pub name: String,
    #[serde(default)]
    pub brand: String,
    pub weight: u32,
    #[serde(default)]
    pub notes: String,
    pub tt: String,
    pub mt: String,
    pub bt: String,
}

impl ItemDraft {
    pub fn new(name: impl Into<String>, brand: impl Into<String>, weight: u32) -> Self {
        Self {
            name: name.into(),
            brand: brand.into(),
            weight,
            ..Self::default()
        }
    }

    pub fn with_path(mut self, path: TagPath) -> Self {
        self.tt = path.tt;
        self.mt = path.mt;
        self.bt = path.bt;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn path(&self) -> TagPath {
        TagPath::new(&self.tt, &self.mt, &self.bt)
    }

    pub fn segment_mut(&mut self, level: TagLevel) -> &mut String {
        match level {
            TagLevel::Top => &mut self.tt,
            TagLevel::Middle => &mut self.mt,
            TagLevel::Base => &mut self.bt,
        }
    }

    pub fn duplicate_key(&self) -> (String, String, u32) {
        duplicate_key(&self.name, &self.brand, self.weight)
    }

    /// Check required fields and return a whitespace-trimmed copy
    pub fn validate(self) -> Result<ItemDraft, ValidationError> {
        let draft = ItemDraft {
            name: self.name.trim().to_string(),
            brand: self.brand.trim().to_string(),
            weight: self.weight,
            notes: self.notes.trim().to_string(),
            tt: self.tt.trim().to_string(),
            mt: self.mt.trim().to_string(),
            bt: self.bt.trim().to_string(),
        };

        if draft.name.is_empty() {
            return Err(ValidationError::MissingName);
        }
        if draft.weight == 0 {
            return Err(ValidationError::NonPositiveWeight);
        }
        for level in TagLevel::all() {
            if draft.path().segment(level).is_empty() {
                return Err(ValidationError::MissingTag(level));
            }
        }
        Ok(draft)
    }
}

/// Required-field failures, raised before any state is touched
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum ValidationError {
    #[error("item name is required")]
    #[diagnostic(code(gear::item::missing_name))]
    MissingName,

    #[error("weight must be a positive number of grams")]
    #[diagnostic(code(gear::item::weight))]
    NonPositiveWeight,

    #[error("{} is required", .0.label())]
    #[diagnostic(
        code(gear::item::missing_tag),
        help("every item needs a complete Top Tag / Middle Tag / Base Tag path")
    )]
    MissingTag(TagLevel),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stove() -> ItemDraft {
        ItemDraft::new("PocketRocket 2", "MSR", 73)
            .with_path(TagPath::new("Cookware", "Stove", "Canister Stove"))
    }

    #[test]
    fn test_validate_trims_fields() {
        let mut draft = stove();
        draft.name = "  PocketRocket 2 ".to_string();
        draft.tt = " Cookware".to_string();
        let valid = draft.validate().unwrap();
        assert_eq!(valid.name, "PocketRocket 2");
        assert_eq!(valid.tt, "Cookware");
    }

    #[test]
    fn test_validate_rejects_missing_fields() {
        let mut draft = stove();
        draft.name = "   ".to_string();
        assert_eq!(draft.validate(), Err(ValidationError::MissingName));

        let mut draft = stove();
        draft.weight = 0;
        assert_eq!(draft.validate(), Err(ValidationError::NonPositiveWeight));

        let mut draft = stove();
        draft.mt = String::new();
        assert_eq!(
            draft.validate(),
            Err(ValidationError::MissingTag(TagLevel::Middle))
        );
    }

    #[test]
    fn test_duplicate_key_is_normalized() {
        let a = GearItem::from_draft(stove());
        let mut other = stove();
        other.name = " pocketrocket 2".to_string();
        other.brand = "msr ".to_string();
        assert_eq!(a.duplicate_key(), other.duplicate_key());

        other.weight = 74;
        assert_ne!(a.duplicate_key(), other.duplicate_key());
    }

    #[test]
    fn test_item_serializes_flat_path() {
        let item = GearItem::from_draft(stove());
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["tt"], "Cookware");
        assert_eq!(json["mt"], "Stove");
        assert_eq!(json["bt"], "Canister Stove");
        assert!(json["id"].as_str().unwrap().starts_with("GEAR-"));
    }

    #[test]
    fn test_set_segment_only_touches_one_level() {
        let mut item = GearItem::from_draft(stove());
        item.set_segment(TagLevel::Middle, "Stoves");
        assert_eq!(item.path(), TagPath::new("Cookware", "Stoves", "Canister Stove"));
    }
}
