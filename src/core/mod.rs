//! Core module - identity, project layout, configuration and persistence

pub mod config;
pub mod defaults;
pub mod identity;
pub mod logging;
pub mod project;
pub mod shortid;
pub mod store;

pub use config::{AiConfig, Config};
pub use identity::{EntityId, EntityPrefix, IdParseError};
pub use project::{Project, ProjectError};
pub use shortid::ShortIdIndex;
pub use store::{InventoryStore, JsonStore, StoreError};
