//! Prompt text, response schemas and response cleanup
//!
//! Everything here is pure so the HTTP client stays a thin transport.

use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::collab::{ItemDetails, SuggestionContext, TagSuggestion};
use crate::entities::item::GearItem;
use crate::entities::tag::{TagLevel, Visuals};
use crate::inventory::aggregate::PackAnalysis;

/// Most suggestions kept per level
pub const MAX_SUGGESTIONS: usize = 5;

/// Deepest analysis nesting requested from the model (TT → MT → BT)
const ANALYSIS_DEPTH: usize = 3;

fn existing_list(existing: &[String]) -> String {
    if existing.is_empty() {
        "None".to_string()
    } else {
        existing.join(", ")
    }
}

/// Prompt asking for tag suggestions at one level
pub fn suggestion_prompt(
    level: TagLevel,
    item: &ItemDetails,
    existing: &[String],
    context: &SuggestionContext,
) -> String {
    let tt = context.tt.as_deref().unwrap_or("");
    let mt = context.mt.as_deref().unwrap_or("");
    let (task, scope) = match level {
        TagLevel::Top => (
            "Suggest a Top Tag (TT): a broad category such as \"Clothing\", \"Shelter\" or \"Cookware\".".to_string(),
            String::new(),
        ),
        TagLevel::Middle => (
            "Suggest a Middle Tag (MT): a sub-category.".to_string(),
            format!("The Top Tag \"{}\" is already chosen; suggestions must fit inside it.", tt),
        ),
        TagLevel::Base => (
            "Suggest a Base Tag (BT): a very specific tag.".to_string(),
            format!(
                "The Top Tag \"{}\" and Middle Tag \"{}\" are already chosen; suggestions must fit that path.",
                tt, mt
            ),
        ),
    };

    format!(
        "You organize backpacking gear. Suggest a tag for a new item.\n\
         \n\
         Item:\n\
         - Name: {name}\n\
         - Brand: {brand}\n\
         - Notes: {notes}\n\
         \n\
         {task}\n\
         {scope}\n\
         \n\
         Existing tags at this level: [{existing}].\n\
         Reuse an existing tag whenever one fits; include every good existing fit.\n\
         Only when none fits, propose 1-3 new specific names.\n\
         Give each suggestion a strict matchPercentage from 0 to 100: 90-100 for an undeniable fit, \
         70-89 for a good fit, 40-69 for a plausible fit, below 40 for a poor fit. Do not default to high scores.\n\
         \n\
         Return only a JSON array of 2-5 unique objects with keys \"tag\" (string) and \"matchPercentage\" (integer).",
        name = item.name,
        brand = item.brand,
        notes = item.notes,
        task = task,
        scope = scope,
        existing = existing_list(existing),
    )
}

pub fn suggestion_schema() -> Value {
    json!({
        "type": "ARRAY",
        "description": "2-5 tag suggestions",
        "items": {
            "type": "OBJECT",
            "properties": {
                "tag": { "type": "STRING" },
                "matchPercentage": { "type": "INTEGER" }
            },
            "required": ["tag", "matchPercentage"]
        }
    })
}

/// Deduplicate by name keeping the highest score, then rank
///
/// Blank names are dropped, scores are clamped to 0-100, and at most
/// [`MAX_SUGGESTIONS`] are kept, best first.
pub fn rank_suggestions(raw: Vec<RawSuggestion>) -> Vec<TagSuggestion> {
    let mut best: HashMap<String, TagSuggestion> = HashMap::new();
    for suggestion in raw {
        let tag = suggestion.tag.trim();
        if tag.is_empty() {
            continue;
        }
        let score = suggestion.match_percentage.clamp(0, 100) as u8;
        match best.get(tag) {
            Some(current) if current.match_percentage >= score => {}
            _ => {
                best.insert(tag.to_string(), TagSuggestion::new(tag, score));
            }
        }
    }

    let mut ranked: Vec<TagSuggestion> = best.into_values().collect();
    ranked.sort_by(|a, b| {
        b.match_percentage
            .cmp(&a.match_percentage)
            .then_with(|| a.tag.cmp(&b.tag))
    });
    ranked.truncate(MAX_SUGGESTIONS);
    ranked
}

/// A suggestion as the model returns it, before clamping
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSuggestion {
    pub tag: String,
    #[serde(deserialize_with = "lenient_percentage")]
    pub match_percentage: i64,
}

fn lenient_percentage<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    Ok(value.round() as i64)
}

pub fn visuals_prompt(name: &str) -> String {
    format!(
        "For the backpacking gear category \"{}\", give one distinctive hex color code that reads well \
         on a dark background and one fitting emoji. Return only a JSON object.",
        name
    )
}

pub fn visuals_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "color": { "type": "STRING", "description": "Hex color code, e.g. #FF5733" },
            "emoji": { "type": "STRING", "description": "A single emoji" }
        },
        "required": ["color", "emoji"]
    })
}

/// Accept model visuals only when the color is a hex code and the emoji is present
pub fn check_visuals(visuals: Visuals) -> Option<Visuals> {
    let color = visuals.color.trim();
    let emoji = visuals.emoji.trim();
    if is_hex_color(color) && !emoji.is_empty() {
        Some(Visuals::new(color, emoji))
    } else {
        None
    }
}

/// `#rgb` or `#rrggbb`
pub fn is_hex_color(s: &str) -> bool {
    match s.strip_prefix('#') {
        Some(hex) => (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

pub fn brand_domain_prompt(brand: &str) -> String {
    format!(
        "What is the official website domain of the brand \"{}\"? For example, for \"The North Face\" \
         the answer is \"thenorthface.com\". Respond with only the domain name.",
        brand
    )
}

/// Reduce free text or a URL to a bare domain
///
/// Lowercases, strips scheme and `www.`, keeps everything before the first
/// `/`. Returns `None` unless the result contains a dot.
pub fn clean_domain(text: &str) -> Option<String> {
    let lower = text.trim().to_lowercase();
    let rest = lower
        .strip_prefix("https://")
        .or_else(|| lower.strip_prefix("http://"))
        .unwrap_or(&lower);
    let rest = rest.strip_prefix("www.").unwrap_or(rest);
    let domain = rest.split('/').next().unwrap_or("").trim();
    let domain = domain.trim_end_matches('.');

    if domain.contains('.') && !domain.chars().any(char::is_whitespace) {
        Some(domain.to_string())
    } else {
        None
    }
}

pub fn analysis_prompt(items: &[&GearItem]) -> String {
    let listing: Vec<Value> = items
        .iter()
        .map(|i| {
            json!({
                "name": i.name,
                "weight": i.weight,
                "tt": i.tt,
                "mt": i.mt,
                "bt": i.bt,
            })
        })
        .collect();
    format!(
        "Analyze the weight of this backpacking pack. Weights are in grams. Group weight by Top Tag (tt), \
         then Middle Tag (mt), then Base Tag (bt). For each group give its tag, its total weight, and its \
         percentage of its parent group (of the whole pack at the top level), with children for the next \
         level down. Also give totalWeight for the whole pack.\n\nItems:\n{}",
        Value::Array(listing)
    )
}

fn distribution_schema(depth: usize) -> Value {
    let mut properties = json!({
        "tag": { "type": "STRING" },
        "weight": { "type": "INTEGER" },
        "percentage": { "type": "NUMBER" }
    });
    if depth > 1 {
        properties["children"] = distribution_schema(depth - 1);
    }
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": properties,
            "required": ["tag", "weight", "percentage"]
        }
    })
}

pub fn analysis_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "totalWeight": { "type": "INTEGER" },
            "distribution": distribution_schema(ANALYSIS_DEPTH)
        },
        "required": ["totalWeight", "distribution"]
    })
}

pub fn summary_prompt(analysis: &PackAnalysis) -> String {
    let analysis = serde_json::to_string(analysis).unwrap_or_default();
    format!(
        "Here is the weight breakdown of a backpacking pack (grams, percentages relative to the parent \
         group):\n{}\n\nWrite a short, friendly summary in two or three sentences: where the weight goes, \
         and one concrete idea for going lighter. Plain text only.",
        analysis
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(tag: &str, pct: i64) -> RawSuggestion {
        RawSuggestion {
            tag: tag.to_string(),
            match_percentage: pct,
        }
    }

    #[test]
    fn test_rank_dedupes_keeping_highest() {
        let ranked = rank_suggestions(vec![
            raw("Tech", 80),
            raw("Tools", 25),
            raw("Tech", 95),
            raw("Electronics", 90),
        ]);
        assert_eq!(
            ranked,
            vec![
                TagSuggestion::new("Tech", 95),
                TagSuggestion::new("Electronics", 90),
                TagSuggestion::new("Tools", 25),
            ]
        );
    }

    #[test]
    fn test_rank_clamps_and_truncates() {
        let ranked = rank_suggestions(vec![
            raw("A", 140),
            raw("B", -3),
            raw("C", 50),
            raw("D", 40),
            raw("E", 30),
            raw("F", 20),
            raw("  ", 99),
        ]);
        assert_eq!(ranked.len(), MAX_SUGGESTIONS);
        assert_eq!(ranked[0], TagSuggestion::new("A", 100));
        assert!(ranked.iter().all(|s| s.tag != "B"));
    }

    #[test]
    fn test_raw_suggestion_accepts_float_scores() {
        let parsed: Vec<RawSuggestion> =
            serde_json::from_str(r#"[{"tag":"Shelter","matchPercentage":87.6}]"#).unwrap();
        assert_eq!(parsed[0].match_percentage, 88);
    }

    #[test]
    fn test_clean_domain() {
        assert_eq!(clean_domain("msrgear.com").as_deref(), Some("msrgear.com"));
        assert_eq!(
            clean_domain("https://www.MSRGear.com/stoves").as_deref(),
            Some("msrgear.com")
        );
        assert_eq!(clean_domain("www.kelty.com.").as_deref(), Some("kelty.com"));
        assert_eq!(clean_domain("I don't know"), None);
        assert_eq!(clean_domain(""), None);
    }

    #[test]
    fn test_check_visuals() {
        assert!(check_visuals(Visuals::new("#e67e22", "🍳")).is_some());
        assert!(check_visuals(Visuals::new("#abc", "🍳")).is_some());
        assert!(check_visuals(Visuals::new("orange", "🍳")).is_none());
        assert!(check_visuals(Visuals::new("#e67e22", " ")).is_none());
    }

    #[test]
    fn test_suggestion_prompt_lists_existing_and_context() {
        let item = ItemDetails::new("Hubba Hubba NX", "MSR");
        let context = SuggestionContext {
            tt: Some("Shelter".into()),
            mt: None,
        };
        let prompt = suggestion_prompt(
            TagLevel::Middle,
            &item,
            &["Tent".to_string(), "Sleeping Bag".to_string()],
            &context,
        );
        assert!(prompt.contains("[Tent, Sleeping Bag]"));
        assert!(prompt.contains("\"Shelter\""));
        assert!(prompt.contains("Middle Tag"));

        let prompt = suggestion_prompt(TagLevel::Top, &item, &[], &SuggestionContext::default());
        assert!(prompt.contains("[None]"));
    }

    #[test]
    fn test_analysis_schema_nests_three_levels() {
        let schema = analysis_schema();
        let top = &schema["properties"]["distribution"]["items"]["properties"];
        let middle = &top["children"]["items"]["properties"];
        let base = &middle["children"]["items"]["properties"];
        assert!(base.is_object());
        assert!(base.get("children").is_none());
    }
}
