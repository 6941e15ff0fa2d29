//! Prompt templates.
//!
//! Versioned templates for the three language-model operations of a turn.
//! Placeholders use `{{variable_name}}` syntax.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;

/// A versioned prompt template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptTemplate {
    /// Template name (used in logs).
    pub name: String,
    /// Semantic version.
    pub version: String,
    /// User-message template with placeholders.
    pub content: String,
    /// Optional system prompt.
    pub system_prompt: Option<String>,
}

impl PromptTemplate {
    /// Creates a new prompt template.
    #[must_use]
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: "0.1.0".to_string(),
            content: content.into(),
            system_prompt: None,
        }
    }

    /// Sets the version.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Sets the system prompt.
    #[must_use]
    pub fn with_system_prompt(mut self, system: impl Into<String>) -> Self {
        self.system_prompt = Some(system.into());
        self
    }

    /// Renders the template with the given variables.
    ///
    /// Substitution is a single pass over the template, so placeholder syntax
    /// inside a substituted value is copied through verbatim. Unknown
    /// placeholders are left in place.
    #[must_use]
    pub fn render(&self, variables: &HashMap<&str, JsonValue>) -> String {
        let mut result = String::with_capacity(self.content.len());
        let mut rest = self.content.as_str();

        while let Some(start) = rest.find("{{") {
            let after = &rest[start + 2..];
            let Some(end) = after.find("}}") else {
                break;
            };
            result.push_str(&rest[..start]);
            let name = &after[..end];
            match variables.get(name) {
                Some(JsonValue::String(s)) => result.push_str(s),
                Some(other) => result.push_str(&other.to_string()),
                None => {
                    result.push_str("{{");
                    result.push_str(name);
                    result.push_str("}}");
                }
            }
            rest = &after[end + 2..];
        }
        result.push_str(rest);

        result
    }

    /// Names of the placeholders still present in the template.
    #[must_use]
    pub fn placeholders(&self) -> Vec<&str> {
        let mut names = Vec::new();
        let mut rest = self.content.as_str();
        while let Some(start) = rest.find("{{") {
            let after = &rest[start + 2..];
            let Some(end) = after.find("}}") else {
                break;
            };
            names.push(&after[..end]);
            rest = &after[end + 2..];
        }
        names
    }
}

const MODERATION_SYSTEM: &str = "You are a content moderator for a place-recommendation assistant. \
Classify the user's search request against this policy.\n\
Prohibited: soliciting illegal drugs or other illegal substances; sexual content that is \
non-consensual, involves minors, or is otherwise illegal; hateful content targeting a group; \
content encouraging self-harm or violence.\n\
Permitted: any legal business, including legal adult-oriented venues such as bars, \
nightclubs, casinos, and adult entertainment.\n\
Answer with exactly one word: \"safe\" or \"inappropriate\".";

const REFINEMENT_SYSTEM: &str = "You turn a conversation about finding a place into a single \
search phrase for a maps search.\n\
Read the whole transcript. Later lines refine earlier ones; merge them into one phrase \
instead of listing alternatives.\n\
Respond with a JSON object {\"type\": ..., \"content\": ...}:\n\
- {\"type\": \"keyword\", \"content\": <phrase>} when the transcript is specific enough to search. \
The phrase has at most 9 words and no commas, semicolons, pipes, or line breaks.\n\
- {\"type\": \"question\", \"content\": <one short question>} only when the transcript as a whole \
is still too vague to search.\n\
Example: \"User's initial request: spanish food\" then \"User was not satisfied. New request: \
something cheaper with a terrace\" gives {\"type\": \"keyword\", \"content\": \"cheap spanish \
restaurant with terrace\"}.";

const RANKING_SYSTEM: &str = "You rank candidate places for a user. Score every candidate from \
0 to 10 on four criteria:\n\
- relevance_score: how well it matches what the user asked for across the whole transcript\n\
- quality_score: rating weighted by how many ratings it has\n\
- vibe_score: the atmosphere suggested by its reviews and summary\n\
- convenience_score: how short the travel time is\n\
final_score = 0.4 * relevance + 0.25 * quality + 0.2 * vibe + 0.15 * convenience.\n\
Respond with a JSON object {\"ranked_recommendations\": [{\"place_id\", \"relevance_score\", \
\"quality_score\", \"vibe_score\", \"convenience_score\", \"final_score\", \"justification\"}]} \
sorted by final_score from highest to lowest. Use only place_id values from the candidate list. \
Keep each justification to one sentence.";

/// Template for the moderation call.
#[must_use]
pub fn moderation() -> PromptTemplate {
    PromptTemplate::new("moderation", "Search request (JSON string): {{query}}")
        .with_system_prompt(MODERATION_SYSTEM)
}

/// Template for the refinement call.
#[must_use]
pub fn refinement() -> PromptTemplate {
    PromptTemplate::new("refinement", "{{transcript}}").with_system_prompt(REFINEMENT_SYSTEM)
}

/// Template for the ranking call.
#[must_use]
pub fn ranking() -> PromptTemplate {
    PromptTemplate::new(
        "ranking",
        "Conversation:\n{{transcript}}\n\nUser location: {{origin}}\n\n\
Pick the best {{limit}} places.\n\nCandidates:\n{{candidates}}",
    )
    .with_system_prompt(RANKING_SYSTEM)
}
