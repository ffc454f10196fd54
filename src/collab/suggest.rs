//! Three-level tag suggestion board
//!
//! Holds one [`ResultSlot`] per tag level. Requests for several levels run
//! concurrently; choosing a tag at one level re-requests every deeper level
//! and supersedes whatever was still in flight for them.

use crate::collab::prompt::MAX_SUGGESTIONS;
use crate::collab::slot::ResultSlot;
use crate::collab::{Collaborator, ItemDetails, SuggestionContext, TagSuggestion};
use crate::entities::item::ItemDraft;
use crate::entities::tag::TagLevel;
use crate::inventory::hierarchy::TagHierarchy;

pub struct SuggestionBoard<'c> {
    collaborator: &'c dyn Collaborator,
    slots: [ResultSlot<Vec<TagSuggestion>>; 3],
    context: SuggestionContext,
}

impl<'c> SuggestionBoard<'c> {
    pub fn new(collaborator: &'c dyn Collaborator) -> Self {
        Self {
            collaborator,
            slots: Default::default(),
            context: SuggestionContext::default(),
        }
    }

    pub fn context(&self) -> &SuggestionContext {
        &self.context
    }

    fn slot(&self, level: TagLevel) -> &ResultSlot<Vec<TagSuggestion>> {
        &self.slots[level.depth()]
    }

    /// Request all three levels with no tags chosen
    pub fn refresh(&mut self, item: &ItemDetails, hierarchy: &TagHierarchy) {
        self.context = SuggestionContext::default();
        self.request(&TagLevel::all(), item, hierarchy);
    }

    /// Choose a tag and re-request every deeper level
    pub fn select(
        &mut self,
        level: TagLevel,
        name: &str,
        item: &ItemDetails,
        hierarchy: &TagHierarchy,
    ) {
        self.context.choose(level, name);
        let deeper: Vec<TagLevel> = TagLevel::all()
            .into_iter()
            .filter(|l| l.depth() > level.depth())
            .collect();
        self.request(&deeper, item, hierarchy);
    }

    /// Current suggestions for a level; empty when none arrived
    pub fn suggestions(&self, level: TagLevel) -> Vec<TagSuggestion> {
        self.slot(level).get().unwrap_or_default()
    }

    /// Highest-ranked suggestion for a level
    pub fn best(&self, level: TagLevel) -> Option<TagSuggestion> {
        self.suggestions(level).into_iter().next()
    }

    /// Fill the draft's empty tag levels top-down with the best suggestion.
    ///
    /// Levels already set are kept and still narrow the deeper requests.
    /// Returns the first level that came back with nothing.
    pub fn complete(
        &mut self,
        draft: &mut ItemDraft,
        hierarchy: &TagHierarchy,
    ) -> Result<(), TagLevel> {
        let item = ItemDetails::from(&*draft);
        self.refresh(&item, hierarchy);

        for level in TagLevel::all() {
            let current = draft.segment_mut(level).trim().to_string();
            let chosen = if current.is_empty() {
                self.best(level).map(|s| s.tag).ok_or(level)?
            } else {
                current
            };
            *draft.segment_mut(level) = chosen.clone();
            if level != TagLevel::Base {
                self.select(level, &chosen, &item, hierarchy);
            }
        }
        Ok(())
    }

    fn request(&self, levels: &[TagLevel], item: &ItemDetails, hierarchy: &TagHierarchy) {
        let collaborator = self.collaborator;
        let context = &self.context;

        std::thread::scope(|s| {
            for &level in levels {
                let slot = self.slot(level);
                let ticket = slot.begin();
                let existing = existing_for(hierarchy, level, context);
                s.spawn(move || {
                    let mut suggestions = collaborator
                        .suggest_tags(level, item, &existing, context)
                        .unwrap_or_default();
                    suggestions.sort_by(|a, b| b.match_percentage.cmp(&a.match_percentage));
                    suggestions.truncate(MAX_SUGGESTIONS);
                    slot.fulfill(ticket, suggestions);
                });
            }
        });
    }
}

/// Existing names at `level` under the chosen context
fn existing_for(hierarchy: &TagHierarchy, level: TagLevel, context: &SuggestionContext) -> Vec<String> {
    hierarchy.existing_names(level, context.tt.as_deref(), context.mt.as_deref())
}
