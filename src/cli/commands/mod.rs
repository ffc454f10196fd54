//! CLI command implementations

pub mod brand;
pub mod check;
pub mod completions;
pub mod init;
pub mod item;
pub mod pack;
pub mod tag;
