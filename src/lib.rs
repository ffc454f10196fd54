//! gear: a backpacking gear inventory
//!
//! Items are filed under a three-level Top / Middle / Base tag hierarchy,
//! grouped into packs and weighed. An optional AI collaborator suggests tags,
//! picks tag visuals and analyses packs; every call to it fails soft.

pub mod cli;
pub mod collab;
pub mod core;
pub mod entities;
pub mod inventory;
pub mod report;
