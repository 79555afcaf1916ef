//! Text-generation features: drafting event descriptions and answering
//! questions about the festival's events.
//!
//! Generation failures never reach the caller as errors. Each feature
//! degrades to a fixed placeholder string instead.

use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::models::Event;

pub const UNAVAILABLE_MESSAGE: &str =
    "AI service is unavailable. Please configure an API key.";
pub const DESCRIPTION_FAILED_MESSAGE: &str = "Failed to generate description. Please try again.";
pub const ANSWER_FAILED_MESSAGE: &str = "Sorry, I encountered an error. Please try asking again.";

/// Temperature for question answering; descriptions use the model default.
pub const ANSWER_TEMPERATURE: f32 = 0.2;

const EVENT_SEPARATOR: &str = "\n\n---\n\n";

#[derive(Debug, Error)]
pub enum TextGenerationError {
    #[error("Text generation is not configured")]
    Unavailable,

    #[error("Text generation request failed: {0}")]
    Request(String),

    #[error("Text generation timed out")]
    Timeout,

    #[error("Invalid text generation response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GenerationOptions {
    pub temperature: Option<f32>,
}

/// A prompt-in, plain-text-out generation backend.
#[async_trait::async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        options: GenerationOptions,
    ) -> Result<String, TextGenerationError>;
}

pub fn description_prompt(title: &str) -> String {
    format!(
        "Write a short, compelling description for a college event titled \"{}\". \
         Use 2-3 sentences that convey excitement and the key activities. \
         Do not use markdown.",
        title.trim()
    )
}

/// Facts the assistant may draw on, one block per event.
pub fn event_context(events: &[Event]) -> String {
    events
        .iter()
        .map(|e| {
            format!(
                "Event: {}\nDate: {}\nVenue: {}\nDescription: {}\nSchedule: {}\nRules: {}\nContact: {}",
                e.title,
                e.date.format("%Y-%m-%d"),
                e.venue,
                e.description,
                e.schedule,
                e.rules,
                e.contact
            )
        })
        .collect::<Vec<_>>()
        .join(EVENT_SEPARATOR)
}

pub fn question_prompt(events: &[Event], question: &str) -> String {
    format!(
        "You are a helpful event assistant for the EventEase college festival. \
         Answer the user's question using only the event information below. \
         If the answer is not in the information, say that you do not have that detail. \
         Be friendly and concise.\n\nEvent Information:\n{}\n\nUser's Question: \"{}\"",
        event_context(events),
        question.trim()
    )
}

/// Generation with graceful degradation.
#[derive(Clone)]
pub struct AssistantService {
    generator: Arc<dyn TextGenerator>,
}

impl AssistantService {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    pub async fn describe_event(&self, title: &str) -> String {
        let prompt = description_prompt(title);
        self.generate_or(&prompt, GenerationOptions::default(), DESCRIPTION_FAILED_MESSAGE)
            .await
    }

    pub async fn answer_question(&self, events: &[Event], question: &str) -> String {
        let prompt = question_prompt(events, question);
        let options = GenerationOptions {
            temperature: Some(ANSWER_TEMPERATURE),
        };
        self.generate_or(&prompt, options, ANSWER_FAILED_MESSAGE).await
    }

    async fn generate_or(
        &self,
        prompt: &str,
        options: GenerationOptions,
        fallback: &str,
    ) -> String {
        match self.generator.generate(prompt, options).await {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => {
                tracing::warn!("Text generation returned an empty response");
                fallback.to_string()
            }
            Err(TextGenerationError::Unavailable) => UNAVAILABLE_MESSAGE.to_string(),
            Err(e) => {
                tracing::error!(error = %e, "Text generation failed");
                fallback.to_string()
            }
        }
    }
}

impl std::fmt::Debug for AssistantService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssistantService").finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MockMode {
    Reply,
    Fail,
    Unavailable,
}

/// Canned generator for development and tests. Records every prompt it receives.
#[derive(Debug)]
pub struct MockTextGenerator {
    reply: String,
    mode: MockMode,
    prompts: Mutex<Vec<(String, GenerationOptions)>>,
}

impl MockTextGenerator {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            mode: MockMode::Reply,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            mode: MockMode::Fail,
            ..Self::new("")
        }
    }

    pub fn unavailable() -> Self {
        Self {
            mode: MockMode::Unavailable,
            ..Self::new("")
        }
    }

    pub fn prompts(&self) -> Vec<(String, GenerationOptions)> {
        self.prompts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl TextGenerator for MockTextGenerator {
    async fn generate(
        &self,
        prompt: &str,
        options: GenerationOptions,
    ) -> Result<String, TextGenerationError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push((prompt.to_string(), options));
        }
        match self.mode {
            MockMode::Reply => Ok(self.reply.clone()),
            MockMode::Fail => Err(TextGenerationError::Request("Simulated failure".to_string())),
            MockMode::Unavailable => Err(TextGenerationError::Unavailable),
        }
    }
}
