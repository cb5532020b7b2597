//! Items displayed in the conversation

use chrono::{DateTime, Local};

/// What a message displays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Text,
    Image,
}

/// A single displayed item. Messages are appended once and never changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub kind: MessageKind,
    pub text: Option<String>,
    pub image_url: Option<String>,
    pub is_user: bool,
    pub timestamp: DateTime<Local>,
}

impl Message {
    /// A text message typed by the user
    pub fn user(text: impl Into<String>) -> Self {
        Self::text(text, true)
    }

    /// A text message from the assistant, including error notices
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::text(text, false)
    }

    /// A generated image
    pub fn image(url: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Image,
            text: None,
            image_url: Some(url.into()),
            is_user: false,
            timestamp: Local::now(),
        }
    }

    fn text(text: impl Into<String>, is_user: bool) -> Self {
        Self {
            kind: MessageKind::Text,
            text: Some(text.into()),
            image_url: None,
            is_user,
            timestamp: Local::now(),
        }
    }

    pub fn is_image(&self) -> bool {
        self.kind == MessageKind::Image
    }
}
