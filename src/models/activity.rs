//! Inbound turns and outbound messages exchanged with a transport

use serde::{Deserialize, Serialize};

/// A file sent by the user alongside (or instead of) text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub content_type: String,
    /// Location the content can be fetched from (URL or transport file reference)
    pub source_ref: String,
    /// Content already fetched by the transport; never persisted
    #[serde(skip)]
    pub data: Option<Vec<u8>>,
}

impl Attachment {
    pub fn new(content_type: impl Into<String>, source_ref: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            source_ref: source_ref.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: Vec<u8>) -> Self {
        self.data = Some(data);
        self
    }
}

/// Shape of an inbound turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnKind {
    /// No payload, e.g. the user joined or restarted the conversation
    None,
    Text,
    Attachments,
}

impl TurnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnKind::None => "none",
            TurnKind::Text => "text",
            TurnKind::Attachments => "attachments",
        }
    }
}

/// One inbound user event, processed to completion by the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Turn {
    pub conversation_id: String,
    pub user_id: String,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl Turn {
    /// A turn that only announces the user's presence
    pub fn presence(conversation_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            user_id: user_id.into(),
            user_name: None,
            text: None,
            attachments: Vec::new(),
        }
    }

    /// A plain text turn
    pub fn text(
        conversation_id: impl Into<String>,
        user_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::presence(conversation_id, user_id)
        }
    }

    /// A turn carrying attachments
    pub fn attachments(
        conversation_id: impl Into<String>,
        user_id: impl Into<String>,
        attachments: Vec<Attachment>,
    ) -> Self {
        Self {
            attachments,
            ..Self::presence(conversation_id, user_id)
        }
    }

    pub fn with_user_name(mut self, name: impl Into<String>) -> Self {
        self.user_name = Some(name.into());
        self
    }

    /// Trimmed text, if any non-blank text was sent
    pub fn trimmed_text(&self) -> Option<&str> {
        self.text
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }

    pub fn kind(&self) -> TurnKind {
        if !self.attachments.is_empty() {
            TurnKind::Attachments
        } else if self.trimmed_text().is_some() {
            TurnKind::Text
        } else {
            TurnKind::None
        }
    }
}

/// A message sent back to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub text: String,
    /// Quick-reply labels a transport may render as buttons
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl OutboundMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            suggestions: Vec::new(),
        }
    }

    pub fn with_suggestions(text: impl Into<String>, suggestions: Vec<String>) -> Self {
        Self {
            text: text.into(),
            suggestions,
        }
    }
}
