// src/extract/mod.rs
//! Idea extraction client: builds one combined prompt from the surviving
//! items and walks a priority-ordered model list. Rate limits retry the same
//! model after a fixed backoff; every other error falls through to the next
//! model. Exhausting the list yields an empty output, not a run failure.

pub mod openai;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::time::{sleep, Duration};

use crate::config::ExtractCfg;
use crate::relevance::ScoredItem;

/// A structured trade/asset recommendation as returned by the model,
/// pre-validation. `confidence_raw` is on whatever scale the model chose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdeaCandidate {
    pub name: String,
    #[serde(rename = "type", default)]
    pub asset_type: String,
    #[serde(default)]
    pub signal: String,
    #[serde(default)]
    pub rationale: String,
    #[serde(rename = "confidence", default)]
    pub confidence_raw: f64,
    #[serde(rename = "affectsHeldPosition", default)]
    pub affects_held_position: bool,
}

/// Wire shape: `{"ideas": [...]}`. Older model prompts produced
/// `{"actions": [...]}`; accept both.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdeaOutput {
    #[serde(alias = "actions", default)]
    pub ideas: Vec<IdeaCandidate>,
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("rate limited")]
    RateLimited,
    #[error("model unavailable: {0}")]
    Unavailable(String),
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

/// One uniform way to call a text-generation model. Implementations carry
/// transport and auth; the model id is chosen per call by the client.
#[async_trait::async_trait]
pub trait ModelCaller: Send + Sync {
    async fn complete(&self, model: &str, prompt: &str) -> Result<String, ModelError>;
    fn name(&self) -> &str;
}

pub struct ExtractionClient {
    caller: Box<dyn ModelCaller>,
    cfg: ExtractCfg,
}

impl ExtractionClient {
    pub fn new(caller: Box<dyn ModelCaller>, cfg: ExtractCfg) -> Self {
        Self { caller, cfg }
    }

    /// Extract idea candidates from the given items. Never fails the run:
    /// exhausting every model returns an empty output.
    pub async fn extract(&self, items: &[ScoredItem]) -> IdeaOutput {
        if items.is_empty() {
            return IdeaOutput::default();
        }
        let prompt = self.build_prompt(items);

        for model in &self.cfg.models {
            let mut attempt = 0u32;
            loop {
                attempt += 1;
                match self.caller.complete(model, &prompt).await {
                    Ok(raw) => match parse_idea_output(&raw) {
                        Ok(out) => {
                            tracing::info!(
                                model,
                                provider = self.caller.name(),
                                ideas = out.ideas.len(),
                                "extraction succeeded"
                            );
                            return out;
                        }
                        Err(e) => {
                            tracing::warn!(model, error = %e, "unparseable response, trying next model");
                            break;
                        }
                    },
                    Err(ModelError::RateLimited) if attempt < self.cfg.max_attempts => {
                        tracing::warn!(model, attempt, "rate limited, backing off");
                        sleep(Duration::from_secs(self.cfg.backoff_secs)).await;
                    }
                    Err(e) => {
                        tracing::warn!(model, attempt, error = %e, "model failed, trying next model");
                        break;
                    }
                }
            }
        }

        tracing::warn!("all models exhausted, no ideas this run");
        IdeaOutput::default()
    }

    /// Fixed preamble plus one bullet per item, capped at `max_items` by
    /// score (recency as tiebreak).
    fn build_prompt(&self, items: &[ScoredItem]) -> String {
        let mut order: Vec<usize> = (0..items.len()).collect();
        order.sort_by(|&a, &b| {
            items[b]
                .score
                .cmp(&items[a].score)
                .then_with(|| items[b].item.published_at.cmp(&items[a].item.published_at))
        });
        order.truncate(self.cfg.max_items);

        let mut out = String::with_capacity(1024);
        out.push_str(&self.cfg.prompt);
        out.push_str("\n\n");
        for &i in &order {
            let it = &items[i].item;
            out.push_str("- ");
            out.push_str(&it.title);
            if !it.summary.is_empty() {
                out.push_str(" — ");
                out.push_str(&it.summary);
            }
            if let Some(link) = &it.link {
                out.push_str(" (");
                out.push_str(link);
                out.push(')');
            }
            out.push('\n');
        }
        out
    }
}

/// Strip markdown code fences (```json ... ``` or plain ``` ... ```), or fall
/// back to the outermost brace span, before parsing.
pub fn strip_code_fences(content: &str) -> &str {
    if let Some(start) = content.find("```json") {
        let start = start + 7;
        if let Some(end) = content[start..].find("```") {
            return content[start..start + end].trim();
        }
    }
    if let Some(start) = content.find("```") {
        let start = start + 3;
        let start = content[start..]
            .find('\n')
            .map(|n| start + n + 1)
            .unwrap_or(start);
        if let Some(end) = content[start..].find("```") {
            return content[start..start + end].trim();
        }
    }
    if let (Some(start), Some(end)) = (content.find('{'), content.rfind('}')) {
        if start < end {
            return &content[start..=end];
        }
    }
    content.trim()
}

/// Pre-parse cleanup, schema parse, and validation. Candidates without a
/// name are dropped.
pub fn parse_idea_output(raw: &str) -> Result<IdeaOutput, ModelError> {
    let cleaned = strip_code_fences(raw);
    let mut out: IdeaOutput = serde_json::from_str(cleaned)
        .map_err(|e| ModelError::Malformed(format!("{e} in: {}", truncate(cleaned, 120))))?;
    out.ideas.retain(|c| !c.name.trim().is_empty());
    Ok(out)
}

fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_json_fence() {
        let raw = "```json\n{\"ideas\": []}\n```";
        assert_eq!(strip_code_fences(raw), "{\"ideas\": []}");
    }

    #[test]
    fn strips_plain_fence_with_language_line() {
        let raw = "```\n{\"ideas\": []}\n```";
        assert_eq!(strip_code_fences(raw), "{\"ideas\": []}");
    }

    #[test]
    fn falls_back_to_brace_span() {
        let raw = "Sure! Here you go: {\"ideas\": []} Hope that helps.";
        assert_eq!(strip_code_fences(raw), "{\"ideas\": []}");
    }

    #[test]
    fn parses_expected_schema() {
        let raw = r#"{"ideas": [{"name": "AAPL", "type": "stock", "signal": "BUY",
            "rationale": "strong quarter", "confidence": 0.9, "affectsHeldPosition": true}]}"#;
        let out = parse_idea_output(raw).unwrap();
        assert_eq!(out.ideas.len(), 1);
        assert_eq!(out.ideas[0].name, "AAPL");
        assert_eq!(out.ideas[0].confidence_raw, 0.9);
        assert!(out.ideas[0].affects_held_position);
    }

    #[test]
    fn accepts_actions_alias_and_missing_optionals() {
        let raw = r#"{"actions": [{"name": "Gold", "confidence": 70}]}"#;
        let out = parse_idea_output(raw).unwrap();
        assert_eq!(out.ideas.len(), 1);
        assert_eq!(out.ideas[0].signal, "");
        assert!(!out.ideas[0].affects_held_position);
    }

    #[test]
    fn nameless_candidates_are_dropped() {
        let raw = r#"{"ideas": [{"name": "  ", "confidence": 50}, {"name": "TSLA", "confidence": 50}]}"#;
        let out = parse_idea_output(raw).unwrap();
        assert_eq!(out.ideas.len(), 1);
    }

    #[test]
    fn garbage_is_malformed() {
        assert!(matches!(
            parse_idea_output("no json here at all"),
            Err(ModelError::Malformed(_))
        ));
    }
}
