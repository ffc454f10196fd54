//! Inventory operations: tag hierarchy, catalog, aggregation and search

pub mod aggregate;
pub mod catalog;
pub mod hierarchy;
pub mod search;

pub use aggregate::{
    format_weight, group_by_path, total_weight, weight_distribution, DistributionNode,
    GroupedGear, PackAnalysis,
};
pub use catalog::{DanglingPath, Inventory, InventoryError};
pub use hierarchy::{TagError, TagHierarchy, TagRecord};
pub use search::{search, SearchBy};
