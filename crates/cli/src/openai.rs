//! OpenAI-compatible embedding and chat providers.
//!
//! One blocking HTTP client is shared by both providers. Any endpoint that
//! speaks the OpenAI `/embeddings` and `/chat/completions` wire format works;
//! only the base URL and API key differ.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use sopindex_core::config::API_KEY_ENV;
use sopindex_core::provider::{AnswerGenerator, EmbeddingProvider};
use sopindex_core::{DocumentRecord, Result, SopError};

/// System prompt for SOP-grounded answers.
pub const SYSTEM_PROMPT: &str = "\
You are an internal SOP knowledge assistant for a factory.
Answer only from the SOP content you are given and never invent new rules.

Rules:
1. Prefer the newest SOP version.
2. Answer as numbered steps that floor staff can follow directly.
3. End the answer with a list of the SOPs you used, including SOP_ID and VERSION.
4. If the SOPs do not cover something, say \"The SOPs do not cover this\" instead of guessing.";

const BLOCK_SEPARATOR: &str =
    "\n\n--------------------------------------------------------------------------------\n\n";

/// Blocking HTTP client for an OpenAI-compatible API.
#[derive(Debug)]
pub struct OpenAiClient {
    api_key: String,
    base_url: String,
    http: reqwest::blocking::Client,
}

impl OpenAiClient {
    /// Creates a client. A missing or blank API key is a configuration error.
    pub fn new(api_key: Option<&str>, base_url: &str, timeout: Duration) -> Result<Self> {
        let api_key = api_key
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| SopError::Configuration(format!("{API_KEY_ENV} is not set")))?;
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SopError::Configuration(format!("cannot build HTTP client: {e}")))?;
        Ok(Self {
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn post<T: DeserializeOwned>(&self, path: &str, body: &Value) -> Result<T> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .map_err(|e| SopError::Provider(format!("request to {url} failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().unwrap_or_default();
            return Err(SopError::Provider(format!("{url} returned {status}: {text}")));
        }
        resp.json::<T>()
            .map_err(|e| SopError::Provider(format!("invalid response from {url}: {e}")))
    }
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingItem {
    index: usize,
    embedding: Vec<f32>,
}

/// Orders embeddings by their `index` field and checks the count.
fn vectors_in_order(resp: EmbeddingResponse, expected: usize) -> Result<Vec<Vec<f32>>> {
    let mut items = resp.data;
    if items.len() != expected {
        return Err(SopError::Provider(format!(
            "expected {} embeddings, got {}",
            expected,
            items.len()
        )));
    }
    items.sort_by_key(|item| item.index);
    Ok(items.into_iter().map(|item| item.embedding).collect())
}

/// Embeddings through `POST /embeddings`.
#[derive(Debug, Clone)]
pub struct OpenAiEmbedder {
    client: Arc<OpenAiClient>,
    model: String,
}

impl OpenAiEmbedder {
    pub fn new(client: Arc<OpenAiClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

impl EmbeddingProvider for OpenAiEmbedder {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_batch(&[text])?
            .pop()
            .ok_or_else(|| SopError::Provider("empty embedding response".into()))
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let body = json!({ "model": self.model, "input": texts });
        let resp: EmbeddingResponse = self.client.post("embeddings", &body)?;
        vectors_in_order(resp, texts.len())
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

fn first_answer(resp: ChatResponse) -> Result<String> {
    resp.choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|text| text.trim().to_string())
        .ok_or_else(|| SopError::Provider("chat response has no content".into()))
}

/// Renders evidence as prompt blocks, one per SOP.
pub fn build_context(evidence: &[DocumentRecord]) -> String {
    let blocks: Vec<String> = evidence
        .iter()
        .map(|ev| {
            format!(
                "SOP_ID: {}\nVERSION: {}\nEFFECTIVE_DATE: {}\nTITLE: {}\nCONTENT:\n{}",
                ev.id.as_deref().unwrap_or(""),
                ev.version.as_deref().unwrap_or(""),
                ev.effective_date.as_deref().unwrap_or(""),
                ev.title,
                ev.text.trim()
            )
        })
        .collect();
    format!("\n\n{}", blocks.join(BLOCK_SEPARATOR))
}

/// User message carrying the question and the resolved SOP content.
pub fn build_user_prompt(query: &str, evidence: &[DocumentRecord]) -> String {
    format!(
        "The user's question:\n{query}\n\n\
         Below is the relevant SOP content, already filtered to the latest version of each SOP:\n\
         {context}\n\n\
         Please:\n\
         1. Answer only from the SOP content above.\n\
         2. Answer as numbered steps or key points.\n\
         3. Call out any precautions or safety reminders the SOPs mention.\n\
         4. Finish with a \"References\" section listing the SOPs you used, e.g.\n   \
         - SOP-001 v2.0 Machine startup\n",
        context = build_context(evidence)
    )
}

/// Answers through `POST /chat/completions`.
#[derive(Debug, Clone)]
pub struct OpenAiGenerator {
    client: Arc<OpenAiClient>,
    model: String,
}

impl OpenAiGenerator {
    pub fn new(client: Arc<OpenAiClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

impl AnswerGenerator for OpenAiGenerator {
    fn generate(&self, query: &str, evidence: &[DocumentRecord]) -> Result<String> {
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": build_user_prompt(query, evidence) },
            ],
        });
        let resp: ChatResponse = self.client.post("chat/completions", &body)?;
        first_answer(resp)
    }
}
