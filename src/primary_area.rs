//! Primary-area classification of accepted papers.
//!
//! Each accepted submission's abstract is sent to an OpenAI-compatible chat
//! endpoint and the raw reply is stored in a JSON cache keyed by submission
//! id. The cache is rewritten after every classification, so an interrupted
//! run resumes where it stopped and never asks twice for the same id.

use crate::error::{OpenReviewError, OptionExt, Result};
use crate::outcome::Outcome;
use crate::prompts::build_prompt;
use crate::table::reader_builder;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::future::Future;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Default chat model
pub const DEFAULT_MODEL: &str = "gpt-4o-2024-08-06";

/// Default OpenAI-compatible endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Anything that turns a prompt into a text reply
pub trait CompletionClient {
    fn complete(&self, prompt: &str) -> impl Future<Output = Result<String>> + Send;
}

/// LLM configuration
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
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

/// Client for `/chat/completions`
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    config: LlmConfig,
}

impl OpenAiClient {
    pub fn new(config: LlmConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| OpenReviewError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { http, config })
    }
}

impl CompletionClient for OpenAiClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let request_body = serde_json::json!({
            "model": self.config.model,
            "messages": [
                {"role": "user", "content": prompt}
            ]
        });
        let api_url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));

        let response = self
            .http
            .post(&api_url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&request_body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(OpenReviewError::Api {
                code: status.as_u16() as i32,
                message: format!("LLM API error: {} - {}", status, error_text),
            });
        }

        let api_response: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| OpenReviewError::Parse(format!("Failed to parse LLM response: {}", e)))?;

        api_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_parse("LLM response has no message content")
    }
}

/// Ask the model for the primary area of one abstract; the reply is returned
/// untouched.
pub async fn classify_abstract<C: CompletionClient>(
    client: &C,
    template: &str,
    abstract_text: &str,
    year: &str,
) -> Result<String> {
    let prompt = build_prompt(template, abstract_text, year);
    debug!(prompt = %prompt, "Sending primary area prompt");
    let reply = client.complete(&prompt).await?;
    debug!(reply = %reply, "Primary area reply");
    Ok(reply)
}

/// Submission id to prediction text, persisted as one JSON object.
#[derive(Debug)]
pub struct PredictionCache {
    path: PathBuf,
    predictions: BTreeMap<String, String>,
}

impl PredictionCache {
    /// Load the cache at `path`; a missing file is an empty cache.
    pub fn load(path: &Path) -> Result<Self> {
        let predictions = if path.exists() {
            let file = File::open(path)?;
            serde_json::from_reader(file)?
        } else {
            BTreeMap::new()
        };
        Ok(Self {
            path: path.to_path_buf(),
            predictions,
        })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.predictions.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.predictions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predictions.is_empty()
    }

    pub fn insert(&mut self, id: String, prediction: String) {
        self.predictions.insert(id, prediction);
    }

    /// Rewrite the whole file. The new contents go to a temporary file in the
    /// same directory which then replaces the cache, so the cache on disk is
    /// always a complete JSON object.
    pub fn save(&self) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir)?;
        serde_json::to_writer(&mut tmp, &self.predictions)?;
        tmp.as_file_mut().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

/// Submission row as read back from `submissions.csv`
#[derive(Debug, Clone, Deserialize)]
pub struct SubmissionRecord {
    pub id: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    #[serde(default)]
    pub outcome: String,
}

/// Accepted submissions from a submissions table, in file order.
pub fn load_accepted(path: &Path) -> Result<Vec<SubmissionRecord>> {
    let mut rdr = reader_builder().from_path(path)?;
    let mut accepted = Vec::new();
    for record in rdr.deserialize::<SubmissionRecord>() {
        let record = record?;
        if record.outcome == Outcome::Accepted.as_str() {
            accepted.push(record);
        }
    }
    info!(path = %path.display(), accepted = accepted.len(), "Loaded accepted submissions");
    Ok(accepted)
}

/// Counts from one classification run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub cached: usize,
    pub classified: usize,
}

/// Classify every submission missing from the cache, in shuffled order,
/// saving the cache after each new prediction.
pub async fn run<C, R>(
    client: &C,
    mut submissions: Vec<SubmissionRecord>,
    cache: &mut PredictionCache,
    template: &str,
    year: &str,
    rng: &mut R,
) -> Result<RunSummary>
where
    C: CompletionClient,
    R: Rng + ?Sized,
{
    submissions.shuffle(rng);
    let mut summary = RunSummary {
        total: submissions.len(),
        ..Default::default()
    };

    for submission in submissions {
        if cache.contains(&submission.id) {
            summary.cached += 1;
            continue;
        }
        let prediction = classify_abstract(client, template, &submission.abstract_text, year).await?;
        println!("{}: {}", submission.id, prediction);
        cache.insert(submission.id, prediction);
        cache.save()?;
        summary.classified += 1;
    }

    info!(
        total = summary.total,
        cached = summary.cached,
        classified = summary.classified,
        "Primary area classification complete"
    );
    Ok(summary)
}
