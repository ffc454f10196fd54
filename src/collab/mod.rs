//! AI collaborator - tag suggestions, tag visuals, brand domains and pack analysis
//!
//! Every call is fail-soft: an unavailable or failing collaborator yields
//! `None` and the caller falls back to something deterministic. Nothing in
//! the inventory depends on a response arriving.

pub mod gemini;
pub mod prompt;
pub mod slot;
pub mod suggest;

use serde::{Deserialize, Serialize};

use crate::core::config::AiConfig;
use crate::entities::item::{GearItem, ItemDraft};
use crate::entities::tag::{TagLevel, Visuals};
use crate::inventory::aggregate::PackAnalysis;

pub use gemini::{CollabError, GeminiClient};
pub use slot::{ResultSlot, Ticket};
pub use suggest::SuggestionBoard;

/// A suggested tag name with its confidence, 0-100
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagSuggestion {
    pub tag: String,
    pub match_percentage: u8,
}

impl TagSuggestion {
    pub fn new(tag: impl Into<String>, match_percentage: u8) -> Self {
        Self {
            tag: tag.into(),
            match_percentage,
        }
    }
}

/// The item fields a suggestion is based on
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemDetails {
    pub name: String,
    pub brand: String,
    pub notes: String,
}

impl ItemDetails {
    pub fn new(name: impl Into<String>, brand: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            brand: brand.into(),
            notes: String::new(),
        }
    }
}

impl From<&ItemDraft> for ItemDetails {
    fn from(draft: &ItemDraft) -> Self {
        Self {
            name: draft.name.clone(),
            brand: draft.brand.clone(),
            notes: draft.notes.clone(),
        }
    }
}

/// Tags already chosen above the level being suggested
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuggestionContext {
    pub tt: Option<String>,
    pub mt: Option<String>,
}

impl SuggestionContext {
    /// Record a choice; choosing a level clears everything below it
    pub fn choose(&mut self, level: TagLevel, name: &str) {
        match level {
            TagLevel::Top => {
                self.tt = Some(name.to_string());
                self.mt = None;
            }
            TagLevel::Middle => self.mt = Some(name.to_string()),
            TagLevel::Base => {}
        }
    }
}

/// An external service that enriches the inventory
///
/// Implementations must never panic on service failures and must return
/// `None` when they cannot answer.
pub trait Collaborator: Send + Sync {
    /// Ranked candidate names for one tag level
    fn suggest_tags(
        &self,
        level: TagLevel,
        item: &ItemDetails,
        existing: &[String],
        context: &SuggestionContext,
    ) -> Option<Vec<TagSuggestion>>;

    /// Color and emoji for a new tag
    fn tag_visuals(&self, name: &str) -> Option<Visuals>;

    /// Web domain of a brand, e.g. "msrgear.com"
    fn brand_domain(&self, brand: &str) -> Option<String>;

    /// Weight breakdown of a set of items
    fn analyze_pack(&self, items: &[&GearItem]) -> Option<PackAnalysis>;

    /// A short prose summary of an analysis
    fn pack_summary(&self, analysis: &PackAnalysis) -> Option<String>;

    /// Whether calls can succeed at all
    fn is_available(&self) -> bool {
        true
    }
}

/// The collaborator used when AI features are disabled or unconfigured
#[derive(Debug, Clone, Copy, Default)]
pub struct Offline;

impl Collaborator for Offline {
    fn suggest_tags(
        &self,
        _level: TagLevel,
        _item: &ItemDetails,
        _existing: &[String],
        _context: &SuggestionContext,
    ) -> Option<Vec<TagSuggestion>> {
        None
    }

    fn tag_visuals(&self, _name: &str) -> Option<Visuals> {
        None
    }

    fn brand_domain(&self, _brand: &str) -> Option<String> {
        None
    }

    fn analyze_pack(&self, _items: &[&GearItem]) -> Option<PackAnalysis> {
        None
    }

    fn pack_summary(&self, _analysis: &PackAnalysis) -> Option<String> {
        None
    }

    fn is_available(&self) -> bool {
        false
    }
}

/// Visuals for a newly created tag node
///
/// Falls back to the fixed pair. A Middle Tag that comes back with the
/// fallback emoji gets one retry with a category hint appended to its name.
pub fn visuals_for(collaborator: &dyn Collaborator, name: &str, level: TagLevel) -> Visuals {
    let visuals = collaborator
        .tag_visuals(name)
        .unwrap_or_else(Visuals::fallback);

    if level == TagLevel::Middle && visuals.is_fallback_emoji() && collaborator.is_available() {
        let hinted = format!("{} (backpacking gear category)", name);
        if let Some(retry) = collaborator.tag_visuals(&hinted) {
            return retry;
        }
    }
    visuals
}

/// Build the collaborator described by configuration
///
/// Returns [`Offline`] when AI is disabled, no API key is set, or the HTTP
/// client cannot be constructed.
pub fn connect(config: &AiConfig) -> Box<dyn Collaborator> {
    if !config.enabled() {
        tracing::debug!("AI features disabled by configuration");
        return Box::new(Offline);
    }
    let Some(api_key) = config.api_key() else {
        tracing::warn!("API key not set; AI features will be disabled");
        return Box::new(Offline);
    };
    match GeminiClient::new(config, api_key) {
        Ok(client) => Box::new(client),
        Err(e) => {
            tracing::warn!(error = %e, "could not build AI client; AI features will be disabled");
            Box::new(Offline)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Answers visuals from a fixed script, recording requests
    struct Scripted {
        answers: Mutex<Vec<Option<Visuals>>>,
        asked: Mutex<Vec<String>>,
    }

    impl Scripted {
        fn new(answers: Vec<Option<Visuals>>) -> Self {
            Self {
                answers: Mutex::new(answers),
                asked: Mutex::new(Vec::new()),
            }
        }
    }

    impl Collaborator for Scripted {
        fn suggest_tags(
            &self,
            _: TagLevel,
            _: &ItemDetails,
            _: &[String],
            _: &SuggestionContext,
        ) -> Option<Vec<TagSuggestion>> {
            None
        }
        fn tag_visuals(&self, name: &str) -> Option<Visuals> {
            self.asked.lock().unwrap().push(name.to_string());
            let mut answers = self.answers.lock().unwrap();
            if answers.is_empty() {
                None
            } else {
                answers.remove(0)
            }
        }
        fn brand_domain(&self, _: &str) -> Option<String> {
            None
        }
        fn analyze_pack(&self, _: &[&GearItem]) -> Option<PackAnalysis> {
            None
        }
        fn pack_summary(&self, _: &PackAnalysis) -> Option<String> {
            None
        }
    }

    #[test]
    fn test_offline_visuals_fall_back() {
        assert_eq!(visuals_for(&Offline, "Tent", TagLevel::Middle), Visuals::fallback());
        assert!(!Offline.is_available());
    }

    #[test]
    fn test_middle_tag_retries_with_hint() {
        let collab = Scripted::new(vec![
            Some(Visuals::fallback()),
            Some(Visuals::new("#27ae60", "🧭")),
        ]);
        let visuals = visuals_for(&collab, "Navigation", TagLevel::Middle);
        assert_eq!(visuals.emoji, "🧭");
        assert_eq!(
            *collab.asked.lock().unwrap(),
            vec![
                "Navigation".to_string(),
                "Navigation (backpacking gear category)".to_string()
            ]
        );
    }

    #[test]
    fn test_failed_retry_keeps_first_answer() {
        let collab = Scripted::new(vec![Some(Visuals::new("#123456", "📦")), None]);
        let visuals = visuals_for(&collab, "Misc", TagLevel::Middle);
        assert_eq!(visuals, Visuals::new("#123456", "📦"));
    }

    #[test]
    fn test_top_and_base_tags_do_not_retry() {
        let collab = Scripted::new(vec![Some(Visuals::fallback())]);
        visuals_for(&collab, "Misc", TagLevel::Top);
        visuals_for(&collab, "Misc", TagLevel::Base);
        assert_eq!(collab.asked.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_context_choose_clears_deeper_levels() {
        let mut context = SuggestionContext::default();
        context.choose(TagLevel::Top, "Shelter");
        context.choose(TagLevel::Middle, "Tent");
        context.choose(TagLevel::Top, "Cookware");
        assert_eq!(context.tt.as_deref(), Some("Cookware"));
        assert!(context.mt.is_none());
    }

    #[test]
    fn test_connect_disabled_is_offline() {
        let config = AiConfig {
            enabled: Some(false),
            api_key: Some("key".into()),
            ..AiConfig::default()
        };
        assert!(!connect(&config).is_available());
    }

    #[test]
    fn test_suggestion_json_shape() {
        let json = serde_json::to_value(TagSuggestion::new("Tent", 90)).unwrap();
        assert_eq!(json["matchPercentage"], 90);
    }
}
