//! Prompt issuing and input recognition
//!
//! A prompt declares the shape of input a suspended dialog expects. When
//! the next turn arrives, [`recognize`] validates and normalizes the raw
//! input against that shape before the dialog sees it.

use serde::{Deserialize, Serialize};

use crate::models::{Attachment, OutboundMessage, Turn};

const AFFIRMATIVE: &[&str] = &["yes", "y", "yeah", "yep", "sure", "ok", "okay"];
const NEGATIVE: &[&str] = &["no", "n", "nope", "nah"];

/// Labels offered with every yes/no prompt
pub const CONFIRM_LABELS: [&str; 2] = ["Yes", "No"];

/// Shape of input a prompt accepts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PromptKind {
    Text,
    Confirm,
    Attachment {
        allowed_types: Vec<String>,
        /// Accept a non-empty text reply in place of attachments
        #[serde(default)]
        accept_text: bool,
    },
    Choice {
        options: Vec<String>,
    },
}

impl PromptKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PromptKind::Text => "text",
            PromptKind::Confirm => "confirm",
            PromptKind::Attachment { .. } => "attachment",
            PromptKind::Choice { .. } => "choice",
        }
    }
}

/// Outstanding request for user input, persisted with the suspended instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptSpec {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_text: Option<String>,
    pub kind: PromptKind,
}

impl PromptSpec {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            retry_text: None,
            kind: PromptKind::Text,
        }
    }

    pub fn confirm(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            retry_text: None,
            kind: PromptKind::Confirm,
        }
    }

    pub fn attachment(text: impl Into<String>, allowed_types: Vec<String>) -> Self {
        Self {
            text: text.into(),
            retry_text: None,
            kind: PromptKind::Attachment {
                allowed_types,
                accept_text: false,
            },
        }
    }

    pub fn choice(text: impl Into<String>, options: Vec<String>) -> Self {
        Self {
            text: text.into(),
            retry_text: None,
            kind: PromptKind::Choice { options },
        }
    }

    pub fn with_retry(mut self, retry_text: impl Into<String>) -> Self {
        self.retry_text = Some(retry_text.into());
        self
    }

    /// Let an attachment prompt fall back to a typed reply
    pub fn accepting_text(mut self) -> Self {
        if let PromptKind::Attachment { accept_text, .. } = &mut self.kind {
            *accept_text = true;
        }
        self
    }

    fn suggestions(&self) -> Vec<String> {
        match &self.kind {
            PromptKind::Confirm => CONFIRM_LABELS.iter().map(|label| label.to_string()).collect(),
            PromptKind::Choice { options } => options.clone(),
            _ => Vec::new(),
        }
    }
}

/// Normalized value produced by a successful recognition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum RecognizedValue {
    Text(String),
    Confirm(bool),
    Attachments(Vec<Attachment>),
    Choice(String),
}

/// Messages that ask for the prompt's input
pub fn issue(spec: &PromptSpec) -> Vec<OutboundMessage> {
    vec![OutboundMessage::with_suggestions(
        spec.text.clone(),
        spec.suggestions(),
    )]
}

/// Messages re-issued after a failed recognition
pub fn reissue(spec: &PromptSpec) -> Vec<OutboundMessage> {
    let text = spec.retry_text.clone().unwrap_or_else(|| spec.text.clone());
    vec![OutboundMessage::with_suggestions(text, spec.suggestions())]
}

/// Validate a turn against the prompt's declared shape
pub fn recognize(spec: &PromptSpec, turn: &Turn) -> Option<RecognizedValue> {
    match &spec.kind {
        PromptKind::Text => Some(RecognizedValue::Text(
            turn.trimmed_text().unwrap_or_default().to_string(),
        )),
        PromptKind::Confirm => turn
            .trimmed_text()
            .and_then(recognize_confirm)
            .map(RecognizedValue::Confirm),
        PromptKind::Attachment {
            allowed_types,
            accept_text,
        } => {
            let matching = filter_attachments(&turn.attachments, allowed_types);
            if !matching.is_empty() {
                return Some(RecognizedValue::Attachments(matching));
            }
            // Text only stands in when nothing was attached
            if *accept_text && turn.attachments.is_empty() {
                return turn
                    .trimmed_text()
                    .map(|text| RecognizedValue::Text(text.to_string()));
            }
            None
        }
        PromptKind::Choice { options } => turn
            .trimmed_text()
            .and_then(|text| recognize_choice(text, options))
            .map(RecognizedValue::Choice),
    }
}

/// Map a yes/no reply onto a boolean
pub fn recognize_confirm(text: &str) -> Option<bool> {
    let normalized = text
        .trim()
        .trim_end_matches(['.', '!'])
        .trim()
        .to_lowercase();

    if AFFIRMATIVE.contains(&normalized.as_str()) {
        Some(true)
    } else if NEGATIVE.contains(&normalized.as_str()) {
        Some(false)
    } else {
        None
    }
}

/// Canonical label matching the reply, ignoring case
pub fn recognize_choice(text: &str, options: &[String]) -> Option<String> {
    let text = text.trim();
    options
        .iter()
        .find(|option| option.eq_ignore_ascii_case(text))
        .cloned()
}

/// Attachments whose content type is in the allowed set
pub fn filter_attachments(attachments: &[Attachment], allowed_types: &[String]) -> Vec<Attachment> {
    attachments
        .iter()
        .filter(|attachment| {
            allowed_types
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(attachment.content_type.trim()))
        })
        .cloned()
        .collect()
}
