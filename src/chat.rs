/// AI chat panel: conversation state and the generative chat backend

use crate::config::{GEMINI_BASE_URL, RemoteConfig};
use crate::error::{Result, XTabError, check_status};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TurnKind {
    Question,
    Answer,
}

/// One message of the conversation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatTurn {
    pub content: String,
    #[serde(rename = "type")]
    pub kind: TurnKind,
}

impl ChatTurn {
    pub fn question(content: impl Into<String>) -> Self {
        ChatTurn {
            content: content.into(),
            kind: TurnKind::Question,
        }
    }

    pub fn answer(content: impl Into<String>) -> Self {
        ChatTurn {
            content: content.into(),
            kind: TurnKind::Answer,
        }
    }
}

/// Answers a question given everything said so far
#[async_trait(?Send)]
pub trait ChatBackend {
    async fn ask(&self, history: &[ChatTurn], question: &str) -> Result<String>;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conversation {
    turns: Vec<ChatTurn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn validate_question(question: &str) -> Result<&str> {
        let question = question.trim();
        if question.is_empty() {
            return Err(XTabError::validation("Ask something first"));
        }
        Ok(question)
    }

    /// Append a completed question/answer pair
    pub fn record_exchange(&mut self, question: &str, answer: String) {
        self.turns.push(ChatTurn::question(question));
        self.turns.push(ChatTurn::answer(answer));
    }

    /// Ask and record; on failure the conversation is left as it was
    pub async fn ask<B: ChatBackend + ?Sized>(&mut self, backend: &B, question: &str) -> Result<&ChatTurn> {
        let question = Self::validate_question(question)?;
        let answer = backend.ask(&self.turns, question).await?;
        self.record_exchange(question, answer);
        Ok(&self.turns[self.turns.len() - 1])
    }
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Content {
    #[serde(default)]
    role: String,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

fn role_for(kind: TurnKind) -> &'static str {
    match kind {
        TurnKind::Question => "user",
        TurnKind::Answer => "model",
    }
}

fn build_request(history: &[ChatTurn], question: &str) -> GenerateContentRequest {
    let contents = history
        .iter()
        .map(|turn| (role_for(turn.kind), turn.content.as_str()))
        .chain(std::iter::once(("user", question)))
        .map(|(role, text)| Content {
            role: role.to_string(),
            parts: vec![Part {
                text: text.to_string(),
            }],
        })
        .collect();

    GenerateContentRequest { contents }
}

fn answer_text(response: GenerateContentResponse) -> Result<String> {
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| content.parts.into_iter().map(|p| p.text).collect())
        .unwrap_or_default();

    if text.is_empty() {
        return Err(XTabError::Remote("The model returned no answer".to_string()));
    }
    Ok(text)
}

/// Google Gemini `generateContent`
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: &str, model: &str) -> Self {
        GeminiClient {
            client: Client::new(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }

    pub fn from_config(config: &RemoteConfig) -> Result<Self> {
        let api_key = config
            .gemini_api_key
            .as_deref()
            .ok_or(XTabError::NotConfigured("XTAB_GEMINI_API_KEY"))?;
        Ok(Self::new(api_key, &config.gemini_model))
    }

    fn endpoint(&self) -> Result<Url> {
        let mut url = Url::parse(&format!(
            "{}/models/{}:generateContent",
            GEMINI_BASE_URL, self.model
        ))?;
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }
}

#[async_trait(?Send)]
impl ChatBackend for GeminiClient {
    async fn ask(&self, history: &[ChatTurn], question: &str) -> Result<String> {
        let body = build_request(history, question);
        log::debug!("Asking {} with {} prior turns", self.model, history.len());

        let response = self
            .client
            .post(self.endpoint()?)
            .json(&body)
            .send()
            .await?;
        let parsed: GenerateContentResponse = check_status(response).await?.json().await?;
        answer_text(parsed)
    }
}
