//! Entity type definitions
//!
//! - [`GearItem`] - a catalogued piece of gear with its (tt, mt, bt) tag path
//! - [`TagNode`] - a Top, Middle or Base Tag in the hierarchy
//! - [`Pack`] - a named selection of items assembled for weight analysis

pub mod item;
pub mod pack;
pub mod tag;

pub use item::{GearItem, ItemDraft, ValidationError};
pub use pack::{Pack, PackBook};
pub use tag::{TagLevel, TagNode, TagPath, TagRef, Visuals};
