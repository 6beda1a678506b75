//! `POST /v1/completions`
//!
//! Given a prompt, the model returns one or more predicted completions.

use crate::client::OpenAiClient;
use crate::endpoint::{Endpoint, Method};
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use tokio::task::JoinHandle;

/// Completion model ids known to this crate. Any other id can be passed with `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CompletionModel {
    Davinci,
    Curie,
    Babbage,
    Ada,
    Other(String),
}

impl CompletionModel {
    pub fn id(&self) -> &str {
        match self {
            CompletionModel::Davinci => "text-davinci-003",
            CompletionModel::Curie => "text-curie-001",
            CompletionModel::Babbage => "text-babbage-001",
            CompletionModel::Ada => "text-ada-001",
            CompletionModel::Other(id) => id,
        }
    }
}

impl From<String> for CompletionModel {
    fn from(id: String) -> Self {
        match id.as_str() {
            "text-davinci-003" => CompletionModel::Davinci,
            "text-curie-001" => CompletionModel::Curie,
            "text-babbage-001" => CompletionModel::Babbage,
            "text-ada-001" => CompletionModel::Ada,
            _ => CompletionModel::Other(id),
        }
    }
}

impl From<CompletionModel> for String {
    fn from(model: CompletionModel) -> Self {
        model.id().to_string()
    }
}

/// Who wrote a conversation entry in a chatbot prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    Bot,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationEntry {
    pub speaker: Speaker,
    pub text: String,
}

impl ConversationEntry {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            text: text.into(),
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Bot,
            text: text.into(),
        }
    }
}

pub const SUPPORT_BOT_PROMPT: &str = "You are a friendly support person. The customer will ask you questions, and you will provide polite responses";

/// Prompt shapes rendered into completion prompt text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    Basic(String),
    /// Q/A transcript: bot instructions, prior conversation, the new question, and an
    /// empty answer line for the model to fill in.
    Chatbot {
        message: String,
        bot_prompt: String,
        conversation: Vec<ConversationEntry>,
    },
}

impl Prompt {
    pub fn render(&self) -> String {
        match self {
            Prompt::Basic(prompt) => prompt.clone(),
            Prompt::Chatbot {
                message,
                bot_prompt,
                conversation,
            } => {
                let history = conversation
                    .iter()
                    .map(|entry| match entry.speaker {
                        Speaker::Bot => answer(&entry.text),
                        Speaker::User => question(&entry.text),
                    })
                    .collect::<Vec<_>>()
                    .join("\n");
                [bot_prompt.clone(), history, question(message), answer("")].join("\n")
            }
        }
    }
}

fn question(text: &str) -> String {
    format!("Q: {}", text)
}

fn answer(text: &str) -> String {
    format!("A: {}", text)
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prompt::Basic(_) => write!(f, "Prompt::Basic({:?})", self.render()),
            Prompt::Chatbot { .. } => write!(f, "Prompt::Chatbot({:?})", self.render()),
        }
    }
}

/// Request body. Unset parameters are omitted so the API applies its defaults.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: CompletionModel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logprobs: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub echo: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_of: Option<u32>,
    /// Sorted so identical requests serialize (and coalesce) identically.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logit_bias: Option<BTreeMap<String, i32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

impl CompletionRequest {
    pub fn new(model: CompletionModel) -> Self {
        Self {
            model,
            prompt: None,
            suffix: None,
            max_tokens: None,
            temperature: None,
            top_p: None,
            n: None,
            logprobs: None,
            echo: None,
            stop: None,
            presence_penalty: None,
            frequency_penalty: None,
            best_of: None,
            logit_bias: None,
            user: None,
        }
    }

    pub fn prompt(mut self, prompt: &Prompt) -> Self {
        self.prompt = Some(vec![prompt.render()]);
        self
    }

    pub fn prompts(mut self, prompts: Vec<String>) -> Self {
        self.prompt = Some(prompts);
        self
    }

    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn top_p(mut self, top_p: f64) -> Self {
        self.top_p = Some(top_p);
        self
    }

    pub fn n(mut self, n: u32) -> Self {
        self.n = Some(n);
        self
    }

    pub fn logprobs(mut self, logprobs: u32) -> Self {
        self.logprobs = Some(logprobs);
        self
    }

    pub fn echo(mut self, echo: bool) -> Self {
        self.echo = Some(echo);
        self
    }

    pub fn stop(mut self, stop: Vec<String>) -> Self {
        self.stop = Some(stop);
        self
    }

    pub fn presence_penalty(mut self, penalty: f64) -> Self {
        self.presence_penalty = Some(penalty);
        self
    }

    pub fn frequency_penalty(mut self, penalty: f64) -> Self {
        self.frequency_penalty = Some(penalty);
        self
    }

    pub fn best_of(mut self, best_of: u32) -> Self {
        self.best_of = Some(best_of);
        self
    }

    pub fn logit_bias(mut self, bias: BTreeMap<String, i32>) -> Self {
        self.logit_bias = Some(bias);
        self
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CompletionResponse {
    pub id: String,
    pub object: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created: DateTime<Utc>,
    pub model: String,
    pub choices: Vec<Choice>,
    pub usage: HashMap<String, u64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Choice {
    pub text: String,
    pub index: u32,
    pub logprobs: Option<serde_json::Value>,
    pub finish_reason: String,
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Choice({:?})", self.text)
    }
}

pub fn create_completion(
    client: &OpenAiClient,
    request: CompletionRequest,
) -> Endpoint<CompletionResponse> {
    client
        .endpoint(Method::Post, "/v1/completions")
        .with_body(request)
}

pub struct CompletionsProvider<'a> {
    client: &'a OpenAiClient,
}

impl<'a> CompletionsProvider<'a> {
    pub fn new(client: &'a OpenAiClient) -> Self {
        Self { client }
    }

    /// Completion choices for the given request.
    pub async fn create(&self, request: CompletionRequest) -> Result<Vec<Choice>> {
        let response = self
            .client
            .execute(&create_completion(self.client, request))
            .await?;
        Ok(response.choices)
    }

    pub fn create_with_callback<F>(
        &self,
        request: CompletionRequest,
        completion: F,
    ) -> Option<JoinHandle<()>>
    where
        F: FnOnce(Option<Vec<Choice>>) + Send + 'static,
    {
        self.client.execute_with_callback(
            create_completion(self.client, request),
            move |response| completion(response.map(|r| r.choices)),
        )
    }
}
