//! Tag hierarchy vocabulary - levels, paths and node records

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::identity::EntityId;

/// Color used when the collaborator cannot supply one
pub const FALLBACK_COLOR: &str = "#7f8c8d";

/// Emoji used when the collaborator cannot supply one
pub const FALLBACK_EMOJI: &str = "📦";

/// One of the three fixed hierarchy levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagLevel {
    /// Top Tag (TT) - broadest category, root level
    Top,
    /// Middle Tag (MT) - sub-category under a Top Tag
    Middle,
    /// Base Tag (BT) - most specific category, leaf level
    Base,
}

impl TagLevel {
    /// Zero-based depth of the level
    pub fn depth(&self) -> usize {
        match self {
            TagLevel::Top => 0,
            TagLevel::Middle => 1,
            TagLevel::Base => 2,
        }
    }

    /// Level one step deeper, if any
    pub fn child(&self) -> Option<TagLevel> {
        match self {
            TagLevel::Top => Some(TagLevel::Middle),
            TagLevel::Middle => Some(TagLevel::Base),
            TagLevel::Base => None,
        }
    }

    /// Short code used in output (TT, MT, BT)
    pub fn code(&self) -> &'static str {
        match self {
            TagLevel::Top => "TT",
            TagLevel::Middle => "MT",
            TagLevel::Base => "BT",
        }
    }

    /// Human-readable level name
    pub fn label(&self) -> &'static str {
        match self {
            TagLevel::Top => "Top Tag",
            TagLevel::Middle => "Middle Tag",
            TagLevel::Base => "Base Tag",
        }
    }

    pub fn all() -> [TagLevel; 3] {
        [TagLevel::Top, TagLevel::Middle, TagLevel::Base]
    }
}

impl fmt::Display for TagLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl std::str::FromStr for TagLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tt" | "top" => Ok(TagLevel::Top),
            "mt" | "middle" => Ok(TagLevel::Middle),
            "bt" | "base" => Ok(TagLevel::Base),
            _ => Err(format!("Invalid tag level: {}. Use tt, mt or bt", s)),
        }
    }
}

/// Display metadata attached to every tag node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visuals {
    pub color: String,
    pub emoji: String,
}

impl Visuals {
    pub fn new(color: impl Into<String>, emoji: impl Into<String>) -> Self {
        Self {
            color: color.into(),
            emoji: emoji.into(),
        }
    }

    /// The fixed `(#7f8c8d, 📦)` pair
    pub fn fallback() -> Self {
        Self::new(FALLBACK_COLOR, FALLBACK_EMOJI)
    }

    /// Whether this is the generic box emoji
    pub fn is_fallback_emoji(&self) -> bool {
        self.emoji == FALLBACK_EMOJI
    }
}

impl Default for Visuals {
    fn default() -> Self {
        Self::fallback()
    }
}

/// A complete (tt, mt, bt) path into the hierarchy
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TagPath {
    pub tt: String,
    pub mt: String,
    pub bt: String,
}

impl TagPath {
    pub fn new(tt: impl Into<String>, mt: impl Into<String>, bt: impl Into<String>) -> Self {
        Self {
            tt: tt.into(),
            mt: mt.into(),
            bt: bt.into(),
        }
    }

    /// Name at the given level
    pub fn segment(&self, level: TagLevel) -> &str {
        match level {
            TagLevel::Top => &self.tt,
            TagLevel::Middle => &self.mt,
            TagLevel::Base => &self.bt,
        }
    }

    /// Reference to the node at the given level along this path
    pub fn to_ref(&self, level: TagLevel) -> TagRef {
        match level {
            TagLevel::Top => TagRef::Top(self.tt.clone()),
            TagLevel::Middle => TagRef::Middle(self.tt.clone(), self.mt.clone()),
            TagLevel::Base => TagRef::Base(self.tt.clone(), self.mt.clone(), self.bt.clone()),
        }
    }
}

impl fmt::Display for TagPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} > {} > {}", self.tt, self.mt, self.bt)
    }
}

/// A 1, 2 or 3 segment reference to a Top, Middle or Base node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TagRef {
    Top(String),
    Middle(String, String),
    Base(String, String, String),
}

impl TagRef {
    /// Build a reference from 1 to 3 path segments
    pub fn from_segments<S: AsRef<str>>(segments: &[S]) -> Option<Self> {
        match segments {
            [tt] => Some(TagRef::Top(tt.as_ref().to_string())),
            [tt, mt] => Some(TagRef::Middle(
                tt.as_ref().to_string(),
                mt.as_ref().to_string(),
            )),
            [tt, mt, bt] => Some(TagRef::Base(
                tt.as_ref().to_string(),
                mt.as_ref().to_string(),
                bt.as_ref().to_string(),
            )),
            _ => None,
        }
    }

    /// Level of the referenced node
    pub fn level(&self) -> TagLevel {
        match self {
            TagRef::Top(..) => TagLevel::Top,
            TagRef::Middle(..) => TagLevel::Middle,
            TagRef::Base(..) => TagLevel::Base,
        }
    }

    /// Segments from the root down to the referenced node
    pub fn segments(&self) -> Vec<&str> {
        match self {
            TagRef::Top(tt) => vec![tt.as_str()],
            TagRef::Middle(tt, mt) => vec![tt.as_str(), mt.as_str()],
            TagRef::Base(tt, mt, bt) => vec![tt.as_str(), mt.as_str(), bt.as_str()],
        }
    }

    /// Name of the referenced node itself
    pub fn name(&self) -> &str {
        match self {
            TagRef::Top(tt) => tt,
            TagRef::Middle(_, mt) => mt,
            TagRef::Base(_, _, bt) => bt,
        }
    }

    /// Whether a full item path lies at or below this node
    pub fn covers(&self, path: &TagPath) -> bool {
        match self {
            TagRef::Top(tt) => path.tt == *tt,
            TagRef::Middle(tt, mt) => path.tt == *tt && path.mt == *mt,
            TagRef::Base(tt, mt, bt) => path.tt == *tt && path.mt == *mt && path.bt == *bt,
        }
    }
}

impl fmt::Display for TagRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments().join(" > "))
    }
}

/// A node in the tag hierarchy arena
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagNode {
    pub id: EntityId,
    pub name: String,
    pub visuals: Visuals,
    pub level: TagLevel,
    pub parent: Option<EntityId>,
    /// Child node ids in insertion order (always empty for Base Tags)
    pub children: Vec<EntityId>,
}
