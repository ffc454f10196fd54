//! Shared helper functions for CLI commands

use clap::ValueEnum;
use console::style;
use miette::Result;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::collab::{self, Collaborator};
use crate::core::config::Config;
use crate::core::identity::EntityId;
use crate::core::project::Project;
use crate::core::shortid::ShortIdIndex;
use crate::core::store::JsonStore;
use crate::entities::tag::TagRef;

/// An opened project with its configuration and store
pub struct Workspace {
    pub project: Project,
    pub config: Config,
    pub store: JsonStore,
}

impl Workspace {
    /// Open the project named by `--project`, or discover one from the cwd
    pub fn open(global: &GlobalOpts) -> Result<Self> {
        let project = match &global.project {
            Some(root) => Project::discover_from(root),
            None => Project::discover(),
        }
        .map_err(|e| miette::miette!("{}", e))?;

        let config = Config::load(Some(&project));
        let store = JsonStore::for_project(&project);
        Ok(Self {
            project,
            config,
            store,
        })
    }

    pub fn collaborator(&self) -> Box<dyn Collaborator> {
        collab::connect(&self.config.ai)
    }

    /// `--format`, else the configured default, else `fallback`
    pub fn format(&self, global: &GlobalOpts, fallback: OutputFormat) -> OutputFormat {
        if global.format != OutputFormat::Auto {
            return global.format;
        }
        self.config
            .default_format
            .as_deref()
            .and_then(|f| OutputFormat::from_str(f, true).ok())
            .unwrap_or(OutputFormat::Auto)
            .or(fallback)
    }

    /// Resolve `@N` aliases from the last listing
    pub fn resolve(&self, reference: &str) -> String {
        crate::core::shortid::resolve_reference(reference, &self.project)
    }

    /// Record ids in display order for `@N` aliases
    pub fn remember<'a>(&self, ids: impl IntoIterator<Item = &'a EntityId>) {
        let mut index = ShortIdIndex::new();
        index.rebuild(ids);
        if let Err(e) = index.save(&self.project) {
            tracing::debug!(error = %e, "could not save short ids");
        }
    }
}

/// Parse `TT [MT [BT]]` into a tag reference
pub fn parse_tag_ref(segments: &[String]) -> Result<TagRef> {
    TagRef::from_segments(segments).ok_or_else(|| {
        miette::miette!(
            "expected 1 to 3 tag names (Top [Middle [Base]]), got {}",
            segments.len()
        )
    })
}

/// Print a success line unless quiet
pub fn success(global: &GlobalOpts, message: impl std::fmt::Display) {
    if !global.quiet {
        println!("{} {}", style("✓").green(), message);
    }
}

/// Format an EntityId for display, truncating if too long
///
/// IDs longer than 16 characters are truncated to 13 chars with "..." suffix.
pub fn format_short_id(id: &EntityId) -> String {
    let s = id.to_string();
    if s.len() > 16 {
        format!("{}...", &s[..13])
    } else {
        s
    }
}

/// Truncate a string to `max_len` characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Escape a string for CSV output
///
/// Handles commas, quotes, and newlines according to RFC 4180.
pub fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
