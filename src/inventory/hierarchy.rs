//! Three-level tag hierarchy
//!
//! Nodes live in an arena keyed by their stable [`EntityId`]. A separate
//! `(parent, name) -> id` index answers name lookups, so renaming a node is a
//! metadata update plus one index move; children keep pointing at the same
//! parent id and nothing else in the tree has to be rebuilt.
//!
//! On disk the hierarchy is a nested document:
//!
//! ```json
//! [{ "id": "TAG-…", "name": "Shelter", "color": "#2980b9", "emoji": "⛺️",
//!    "children": [{ "id": "TAG-…", "name": "Tent", … }] }]
//! ```

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::core::identity::{EntityId, EntityPrefix};
use crate::entities::tag::{TagLevel, TagNode, TagPath, TagRef, Visuals};

/// Errors raised by hierarchy mutations
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum TagError {
    #[error("tag not found: {0}")]
    #[diagnostic(code(gear::tag::not_found), help("run `gear tag tree` to list tags"))]
    NotFound(String),

    #[error("a {} named '{name}' already exists here", .level.label())]
    #[diagnostic(code(gear::tag::duplicate))]
    Duplicate { name: String, level: TagLevel },

    #[error("tag name cannot be empty")]
    #[diagnostic(code(gear::tag::empty_name))]
    EmptyName,

    #[error("invalid hierarchy document: {0}")]
    #[diagnostic(code(gear::tag::invalid_document))]
    InvalidDocument(String),
}

/// Serialized form of one node and its subtree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRecord {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub emoji: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TagRecord>,
}

/// The Top Tag → Middle Tag → Base Tag tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<TagRecord>", into = "Vec<TagRecord>")]
pub struct TagHierarchy {
    nodes: HashMap<EntityId, TagNode>,
    roots: Vec<EntityId>,
    index: HashMap<(Option<EntityId>, String), EntityId>,
}

impl TagHierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes across all levels
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: &EntityId) -> Option<&TagNode> {
        self.nodes.get(id)
    }

    /// Top Tags in insertion order
    pub fn roots(&self) -> impl Iterator<Item = &TagNode> {
        self.roots.iter().filter_map(|id| self.nodes.get(id))
    }

    /// Children of a node in insertion order
    pub fn children(&self, id: &EntityId) -> impl Iterator<Item = &TagNode> {
        self.nodes
            .get(id)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(|child| self.nodes.get(child))
    }

    /// Look up a direct child by name (`None` parent = Top Tags)
    pub fn find_child(&self, parent: Option<EntityId>, name: &str) -> Option<EntityId> {
        self.index.get(&(parent, name.to_string())).copied()
    }

    /// Resolve a 1-3 segment reference to a node id
    pub fn resolve(&self, tag: &TagRef) -> Option<EntityId> {
        let mut parent = None;
        for segment in tag.segments() {
            parent = Some(self.find_child(parent, segment)?);
        }
        parent
    }

    /// Whether the full path exists
    pub fn contains_path(&self, path: &TagPath) -> bool {
        self.resolve(&path.to_ref(TagLevel::Base)).is_some()
    }

    /// Names from the root down to `id`
    pub fn path_of(&self, id: &EntityId) -> Vec<String> {
        let mut segments = Vec::new();
        let mut current = self.nodes.get(id);
        while let Some(node) = current {
            segments.push(node.name.clone());
            current = node.parent.and_then(|p| self.nodes.get(&p));
        }
        segments.reverse();
        segments
    }

    /// Existing names at a level under the given ancestors
    ///
    /// Returns an empty list when a required ancestor is missing or unknown.
    pub fn existing_names(&self, level: TagLevel, tt: Option<&str>, mt: Option<&str>) -> Vec<String> {
        let parent = match level {
            TagLevel::Top => None,
            TagLevel::Middle => match tt.and_then(|tt| self.find_child(None, tt)) {
                Some(id) => Some(id),
                None => return Vec::new(),
            },
            TagLevel::Base => {
                let tt_id = tt.and_then(|tt| self.find_child(None, tt));
                match tt_id.zip(mt).and_then(|(id, mt)| self.find_child(Some(id), mt)) {
                    Some(id) => Some(id),
                    None => return Vec::new(),
                }
            }
        };
        match parent {
            None => self.roots().map(|n| n.name.clone()).collect(),
            Some(id) => self.children(&id).map(|n| n.name.clone()).collect(),
        }
    }

    /// Visuals of the Top Tag with this name, if present
    pub fn top_visuals(&self, tt: &str) -> Option<&Visuals> {
        self.find_child(None, tt)
            .and_then(|id| self.nodes.get(&id))
            .map(|n| &n.visuals)
    }

    /// All nodes depth-first in display order
    pub fn walk(&self) -> Vec<&TagNode> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<EntityId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if let Some(node) = self.nodes.get(&id) {
                out.push(node);
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    /// Ensure all three levels of `path` exist, creating only the missing ones
    ///
    /// `visuals` is called once for each node that has to be created, parent
    /// before child. Returns the ids of the created nodes (empty if the path
    /// already existed).
    pub fn ensure_path<F>(&mut self, path: &TagPath, mut visuals: F) -> Vec<EntityId>
    where
        F: FnMut(&str, TagLevel) -> Visuals,
    {
        let mut created = Vec::new();
        let mut parent = None;
        for level in TagLevel::all() {
            let name = path.segment(level);
            let id = match self.find_child(parent, name) {
                Some(id) => id,
                None => {
                    let id = self.insert(
                        EntityId::new(EntityPrefix::Tag),
                        parent,
                        name,
                        level,
                        visuals(name, level),
                    );
                    tracing::debug!(tag = %name, level = %level, "created tag node");
                    created.push(id);
                    id
                }
            };
            parent = Some(id);
        }
        created
    }

    /// Rename the referenced node, keeping its id and children
    pub fn rename(&mut self, tag: &TagRef, new_name: &str) -> Result<EntityId, TagError> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(TagError::EmptyName);
        }
        let id = self
            .resolve(tag)
            .ok_or_else(|| TagError::NotFound(tag.to_string()))?;
        let node = &self.nodes[&id];
        if node.name == new_name {
            return Ok(id);
        }
        let parent = node.parent;
        if self.find_child(parent, new_name).is_some() {
            return Err(TagError::Duplicate {
                name: new_name.to_string(),
                level: tag.level(),
            });
        }

        let node = self
            .nodes
            .get_mut(&id)
            .ok_or_else(|| TagError::NotFound(tag.to_string()))?;
        let old_name = std::mem::replace(&mut node.name, new_name.to_string());
        self.index.remove(&(parent, old_name));
        self.index.insert((parent, new_name.to_string()), id);
        Ok(id)
    }

    /// Remove the referenced node and its whole subtree
    ///
    /// Returns the ids of every removed node.
    pub fn delete(&mut self, tag: &TagRef) -> Result<Vec<EntityId>, TagError> {
        let id = self
            .resolve(tag)
            .ok_or_else(|| TagError::NotFound(tag.to_string()))?;

        let parent = self.nodes[&id].parent;
        match parent {
            Some(p) => {
                if let Some(parent_node) = self.nodes.get_mut(&p) {
                    parent_node.children.retain(|c| *c != id);
                }
            }
            None => self.roots.retain(|r| *r != id),
        }

        let mut removed = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.remove(&current) {
                self.index.remove(&(node.parent, node.name));
                stack.extend(node.children);
                removed.push(current);
            }
        }
        Ok(removed)
    }

    /// Replace a node's visuals
    pub fn set_visuals(&mut self, tag: &TagRef, visuals: Visuals) -> Result<(), TagError> {
        let id = self
            .resolve(tag)
            .ok_or_else(|| TagError::NotFound(tag.to_string()))?;
        if let Some(node) = self.nodes.get_mut(&id) {
            node.visuals = visuals;
        }
        Ok(())
    }

    fn insert(
        &mut self,
        id: EntityId,
        parent: Option<EntityId>,
        name: &str,
        level: TagLevel,
        visuals: Visuals,
    ) -> EntityId {
        self.nodes.insert(
            id,
            TagNode {
                id,
                name: name.to_string(),
                visuals,
                level,
                parent,
                children: Vec::new(),
            },
        );
        self.index.insert((parent, name.to_string()), id);
        match parent {
            Some(p) => {
                if let Some(parent_node) = self.nodes.get_mut(&p) {
                    parent_node.children.push(id);
                }
            }
            None => self.roots.push(id),
        }
        id
    }

    /// Nested document form
    pub fn to_records(&self) -> Vec<TagRecord> {
        fn record(h: &TagHierarchy, node: &TagNode) -> TagRecord {
            TagRecord {
                id: node.id,
                name: node.name.clone(),
                color: node.visuals.color.clone(),
                emoji: node.visuals.emoji.clone(),
                children: h.children(&node.id).map(|c| record(h, c)).collect(),
            }
        }
        self.roots().map(|n| record(self, n)).collect()
    }

    /// Rebuild the arena from a nested document
    pub fn from_records(records: Vec<TagRecord>) -> Result<Self, TagError> {
        let mut hierarchy = Self::new();
        let mut stack: Vec<(Option<EntityId>, TagLevel, TagRecord)> = records
            .into_iter()
            .rev()
            .map(|r| (None, TagLevel::Top, r))
            .collect();

        while let Some((parent, level, record)) = stack.pop() {
            let name = record.name.trim();
            if name.is_empty() {
                return Err(TagError::InvalidDocument("tag with empty name".into()));
            }
            if hierarchy.nodes.contains_key(&record.id) {
                return Err(TagError::InvalidDocument(format!(
                    "duplicate tag id {}",
                    record.id
                )));
            }
            if hierarchy.find_child(parent, name).is_some() {
                return Err(TagError::InvalidDocument(format!(
                    "duplicate sibling tag '{}'",
                    name
                )));
            }
            let child_level = match (level.child(), record.children.is_empty()) {
                (Some(child), _) => child,
                (None, true) => level,
                (None, false) => {
                    return Err(TagError::InvalidDocument(format!(
                        "base tag '{}' cannot have children",
                        name
                    )))
                }
            };
            let id = hierarchy.insert(
                record.id,
                parent,
                name,
                level,
                Visuals::new(record.color, record.emoji),
            );
            for child in record.children.into_iter().rev() {
                stack.push((Some(id), child_level, child));
            }
        }
        Ok(hierarchy)
    }
}

impl TryFrom<Vec<TagRecord>> for TagHierarchy {
    type Error = TagError;

    fn try_from(records: Vec<TagRecord>) -> Result<Self, Self::Error> {
        Self::from_records(records)
    }
}

impl From<TagHierarchy> for Vec<TagRecord> {
    fn from(hierarchy: TagHierarchy) -> Self {
        hierarchy.to_records()
    }
}
