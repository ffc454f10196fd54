//! Gemini generateContent client

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

use crate::collab::prompt::{self, RawSuggestion};
use crate::collab::{Collaborator, ItemDetails, SuggestionContext, TagSuggestion};
use crate::core::config::AiConfig;
use crate::entities::item::GearItem;
use crate::entities::tag::{TagLevel, Visuals};
use crate::inventory::aggregate::PackAnalysis;

const USER_AGENT: &str = concat!("gear/", env!("CARGO_PKG_VERSION"));

/// Collaborator transport errors
#[derive(Debug, Error)]
pub enum CollabError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("response contained no text")]
    EmptyResponse,

    #[error("could not parse response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("response rejected: {0}")]
    Rejected(String),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize)]
struct GroundingChunk {
    web: Option<WebSource>,
}

#[derive(Debug, Deserialize)]
struct WebSource {
    uri: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }

    fn first_grounding_uri(&self) -> Option<&str> {
        self.candidates
            .first()?
            .grounding_metadata
            .as_ref()?
            .grounding_chunks
            .first()?
            .web
            .as_ref()?
            .uri
            .as_deref()
    }
}

/// Blocking client for the Gemini API
pub struct GeminiClient {
    http: reqwest::blocking::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(config: &AiConfig, api_key: String) -> Result<Self, CollabError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs()))
            .build()?;

        Ok(Self {
            http,
            endpoint: config.endpoint().trim_end_matches('/').to_string(),
            model: config.model().to_string(),
            api_key,
        })
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }

    /// POST a generateContent request
    fn generate(&self, body: &Value) -> Result<GenerateResponse, CollabError> {
        tracing::debug!(model = %self.model, "calling generateContent");
        let response = self
            .http
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().unwrap_or_default();
            return Err(CollabError::Api(status.as_u16(), text));
        }
        Ok(response.json()?)
    }

    /// Ask for JSON constrained by `schema` and decode it
    fn generate_json<T: DeserializeOwned>(
        &self,
        prompt: &str,
        schema: Value,
    ) -> Result<T, CollabError> {
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": schema
            }
        });
        let response = self.generate(&body)?;
        let text = response.text().ok_or(CollabError::EmptyResponse)?;
        Ok(serde_json::from_str(text.trim())?)
    }

    fn generate_text(&self, prompt: &str) -> Result<String, CollabError> {
        let body = json!({ "contents": [{ "parts": [{ "text": prompt }] }] });
        let response = self.generate(&body)?;
        response.text().ok_or(CollabError::EmptyResponse)
    }

    fn try_suggest(
        &self,
        level: TagLevel,
        item: &ItemDetails,
        existing: &[String],
        context: &SuggestionContext,
    ) -> Result<Vec<TagSuggestion>, CollabError> {
        let prompt = prompt::suggestion_prompt(level, item, existing, context);
        let raw: Vec<RawSuggestion> = self.generate_json(&prompt, prompt::suggestion_schema())?;
        Ok(prompt::rank_suggestions(raw))
    }

    fn try_visuals(&self, name: &str) -> Result<Visuals, CollabError> {
        let visuals: Visuals =
            self.generate_json(&prompt::visuals_prompt(name), prompt::visuals_schema())?;
        prompt::check_visuals(visuals.clone())
            .ok_or_else(|| CollabError::Rejected(format!("{} / {}", visuals.color, visuals.emoji)))
    }

    fn try_brand_domain(&self, brand: &str) -> Result<Option<String>, CollabError> {
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt::brand_domain_prompt(brand) }] }],
            "tools": [{ "google_search": {} }]
        });
        let response = self.generate(&body)?;

        if let Some(domain) = response.text().as_deref().and_then(prompt::clean_domain) {
            return Ok(Some(domain));
        }
        Ok(response.first_grounding_uri().and_then(prompt::clean_domain))
    }

    fn try_analyze(&self, items: &[&GearItem]) -> Result<PackAnalysis, CollabError> {
        let analysis: PackAnalysis =
            self.generate_json(&prompt::analysis_prompt(items), prompt::analysis_schema())?;
        if analysis.distribution.is_empty() && !items.is_empty() {
            return Err(CollabError::Rejected("empty distribution".to_string()));
        }
        Ok(analysis)
    }
}

impl Collaborator for GeminiClient {
    fn suggest_tags(
        &self,
        level: TagLevel,
        item: &ItemDetails,
        existing: &[String],
        context: &SuggestionContext,
    ) -> Option<Vec<TagSuggestion>> {
        match self.try_suggest(level, item, existing, context) {
            Ok(suggestions) => Some(suggestions),
            Err(e) => {
                tracing::warn!(level = %level, error = %e, "tag suggestion failed");
                None
            }
        }
    }

    fn tag_visuals(&self, name: &str) -> Option<Visuals> {
        match self.try_visuals(name) {
            Ok(visuals) => Some(visuals),
            Err(e) => {
                tracing::warn!(tag = name, error = %e, "tag visuals failed");
                None
            }
        }
    }

    fn brand_domain(&self, brand: &str) -> Option<String> {
        match self.try_brand_domain(brand) {
            Ok(domain) => domain,
            Err(e) => {
                tracing::warn!(brand, error = %e, "brand domain lookup failed");
                None
            }
        }
    }

    fn analyze_pack(&self, items: &[&GearItem]) -> Option<PackAnalysis> {
        match self.try_analyze(items) {
            Ok(analysis) => Some(analysis),
            Err(e) => {
                tracing::warn!(error = %e, "pack analysis failed");
                None
            }
        }
    }

    fn pack_summary(&self, analysis: &PackAnalysis) -> Option<String> {
        match self.generate_text(&prompt::summary_prompt(analysis)) {
            Ok(text) => Some(text.trim().to_string()),
            Err(e) => {
                tracing::warn!(error = %e, "pack summary failed");
                None
            }
        }
    }
}
