//! Short ID aliases (`@1`, `@2`, ...) for the last listing
//!
//! Every list command rebuilds the index in display order, so `@3` means the
//! third row of whatever was listed last.

use std::fs;

use crate::core::identity::EntityId;
use crate::core::project::Project;

const INDEX_FILE: &str = "shortids.json";

/// Ordered full ids from the last listing
#[derive(Debug, Default, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ShortIdIndex {
    ids: Vec<String>,
}

impl ShortIdIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the index from a project, or empty if missing or unreadable
    pub fn load(project: &Project) -> Self {
        let path = project.gear_dir().join(INDEX_FILE);
        fs::read_to_string(&path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default()
    }

    pub fn save(&self, project: &Project) -> std::io::Result<()> {
        let path = project.gear_dir().join(INDEX_FILE);
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)
    }

    /// Replace the index with ids in display order
    pub fn rebuild<'a>(&mut self, ids: impl IntoIterator<Item = &'a EntityId>) {
        self.ids = ids.into_iter().map(|id| id.to_string()).collect();
    }

    /// Resolve `@N` or a bare number; anything else passes through
    pub fn resolve(&self, reference: &str) -> Option<String> {
        let reference = reference.trim();
        let digits = reference.strip_prefix('@').unwrap_or(reference);
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Some(reference.to_string());
        }
        let n: usize = digits.parse().ok()?;
        n.checked_sub(1).and_then(|i| self.ids.get(i)).cloned()
    }

    pub fn short_id(&self, id: &EntityId) -> Option<usize> {
        let id = id.to_string();
        self.ids.iter().position(|i| *i == id).map(|i| i + 1)
    }

    /// `@N` if listed, otherwise the full id
    pub fn label(&self, id: &EntityId) -> String {
        match self.short_id(id) {
            Some(n) => format!("@{}", n),
            None => id.to_string(),
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Resolve a possibly-short reference against the project's last listing
pub fn resolve_reference(reference: &str, project: &Project) -> String {
    ShortIdIndex::load(project)
        .resolve(reference)
        .unwrap_or_else(|| reference.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::EntityPrefix;

    #[test]
    fn test_short_id_rebuild_and_resolve() {
        let a = EntityId::new(EntityPrefix::Gear);
        let b = EntityId::new(EntityPrefix::Gear);
        let mut index = ShortIdIndex::new();
        index.rebuild([&a, &b]);

        assert_eq!(index.resolve("@1"), Some(a.to_string()));
        assert_eq!(index.resolve("2"), Some(b.to_string()));
        assert_eq!(index.resolve("@3"), None);
        assert_eq!(index.resolve("@0"), None);
        assert_eq!(index.label(&b), "@2");
    }

    #[test]
    fn test_short_id_passthrough() {
        let index = ShortIdIndex::new();
        assert_eq!(index.resolve("Cosmic 20"), Some("Cosmic 20".to_string()));
        assert_eq!(index.resolve("GEAR-01ABC"), Some("GEAR-01ABC".to_string()));
    }

    #[test]
    fn test_short_id_persists() {
        let tmp = tempfile::tempdir().unwrap();
        let project = Project::init(tmp.path(), false).unwrap();
        let id = EntityId::new(EntityPrefix::Pack);
        let mut index = ShortIdIndex::new();
        index.rebuild([&id]);
        index.save(&project).unwrap();

        assert_eq!(resolve_reference("@1", &project), id.to_string());
        assert_eq!(resolve_reference("@9", &project), "@9");
    }
}
