use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;
use wreq::header::AUTHORIZATION;

use crate::{
    entities::media,
    error::{AppError, AppResult},
};

const SYSTEM_PROMPT: &str = "Du er redaktør på et dansk website om børnefilm og -serier. \
Svar kun med et JSON-objekt med felterne parentInfo (string), parentTip (string), \
pros (array af strings), cons (array af strings), minAge (heltal eller null), \
hasViolence, hasScaryContent, hasLanguage og hasEducational (booleans).";

/// Parent-facing review of a film or series.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct MediaReview {
    pub parent_info: Option<String>,
    pub parent_tip: Option<String>,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
    pub min_age: Option<i32>,
    pub has_violence: bool,
    pub has_scary_content: bool,
    pub has_language: bool,
    pub has_educational: bool,
}

pub struct ReviewClient {
    client: wreq::Client,
    api_url: Option<String>,
    api_key: Option<String>,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    response_format: serde_json::Value,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatContent,
}

#[derive(Deserialize)]
struct ChatContent {
    content: Option<String>,
}

impl ReviewClient {
    pub fn new(
        client: wreq::Client,
        api_url: Option<String>,
        api_key: Option<String>,
        model: String,
    ) -> Self {
        if api_url.is_none() {
            warn!("review generation disabled - no REVIEW_API_URL provided");
        }
        Self { client, api_url, api_key, model }
    }

    pub fn enabled(&self) -> bool {
        self.api_url.is_some()
    }

    pub async fn review(&self, item: &media::Model) -> AppResult<Option<MediaReview>> {
        let Some(url) = &self.api_url else {
            return Ok(None);
        };

        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage { role: "system", content: SYSTEM_PROMPT.to_string() },
                ChatMessage { role: "user", content: prompt(item) },
            ],
            response_format: json!({ "type": "json_object" }),
        };

        let mut req = self.client.post(url).json(&body);
        if let Some(key) = &self.api_key {
            req = req.header(AUTHORIZATION, format!("Bearer {key}"));
        }
        let resp: ChatResponse = req.send().await?.error_for_status()?.json().await?;

        let content = resp
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| AppError::from(anyhow::anyhow!("empty completion")))?;
        Ok(Some(parse_review(&content)?))
    }
}

fn prompt(item: &media::Model) -> String {
    let kind = if item.media_type == "series" { "serien" } else { "filmen" };
    let mut text = format!("Skriv en forældreguide til {kind} \"{}\"", item.title);
    if let Some(year) = item.release_year {
        text.push_str(&format!(" ({year})"));
    }
    text.push('.');
    if let Some(overview) = &item.overview {
        text.push_str(&format!(" Handling: {overview}"));
    }
    text
}

/// Models sometimes wrap the document in a markdown fence.
fn parse_review(content: &str) -> AppResult<MediaReview> {
    let trimmed = content.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|s| s.strip_suffix("```"))
        .unwrap_or(trimmed);
    Ok(serde_json::from_str(unfenced.trim())?)
}
