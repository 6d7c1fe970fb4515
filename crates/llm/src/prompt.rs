//! Prompt construction

use serde::{Deserialize, Serialize};
use std::fmt;

use faq_assistant_config::PersonaConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// Chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Context line pointing the model at the nearest FAQ entry
pub fn context_hint(original_question: &str, answer: &str) -> String {
    format!(
        "The user may be asking about '{}', whose answer is: '{}'",
        original_question, answer
    )
}

/// Builds the two-message fallback prompt from the configured persona
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    persona: PersonaConfig,
}

impl PromptBuilder {
    pub fn new(persona: PersonaConfig) -> Self {
        Self { persona }
    }

    pub fn persona(&self) -> &PersonaConfig {
        &self.persona
    }

    pub fn system_prompt(&self) -> String {
        let p = &self.persona;
        format!(
            "You are \"{name}\", a very friendly and helpful chatbot for {platform}.\n\
             Your audience is {audience}.\n\
             Your task is to answer user questions about using {platform}.\n\
             Reply in {language}, in a {tone} tone.",
            name = p.assistant_name,
            platform = p.platform,
            audience = p.audience,
            language = p.language,
            tone = p.tone,
        )
    }

    pub fn user_prompt(&self, question: &str, context_hint: &str) -> String {
        format!(
            "ADDITIONAL CONTEXT (if relevant): \"{}\"\n\nUSER QUESTION: \"{}\"\n\nYOUR ANSWER:",
            context_hint, question
        )
    }

    pub fn build(&self, question: &str, context_hint: &str) -> Vec<Message> {
        vec![
            Message::system(self.system_prompt()),
            Message::user(self.user_prompt(question, context_hint)),
        ]
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(PersonaConfig::default())
    }
}
