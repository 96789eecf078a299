use crate::sessions::ChatId;
use serde::Serialize;
use strum::Display;

/// Response text starting with this is sent as audio from the URL that follows.
pub const PREFIX_AUDIO: &str = "audio:";
/// Response text starting with this is sent as a photo from the URL that follows.
pub const PREFIX_PHOTO: &str = "photo:";

/// Transient status shown in the chat while media uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ChatAction {
    Typing,
    UploadPhoto,
    UploadDocument,
}

/// One message ready for the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    Text { chat: ChatId, text: String },
    Audio { chat: ChatId, url: String },
    Photo { chat: ChatId, url: String },
}

impl Outbound {
    /// Pick the message kind from a response text's prefix.
    pub fn from_response(chat: ChatId, text: &str) -> Self {
        if let Some(url) = text.strip_prefix(PREFIX_AUDIO) {
            Self::Audio {
                chat,
                url: url.to_string(),
            }
        } else if let Some(url) = text.strip_prefix(PREFIX_PHOTO) {
            Self::Photo {
                chat,
                url: url.to_string(),
            }
        } else {
            Self::Text {
                chat,
                text: text.to_string(),
            }
        }
    }

    pub fn chat(&self) -> ChatId {
        match self {
            Self::Text { chat, .. } | Self::Audio { chat, .. } | Self::Photo { chat, .. } => *chat,
        }
    }

    /// Bot API method that delivers this message.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::Text { .. } => "sendMessage",
            Self::Audio { .. } => "sendAudio",
            Self::Photo { .. } => "sendPhoto",
        }
    }

    /// Action to announce before sending, for media only.
    pub fn chat_action(&self) -> Option<ChatAction> {
        match self {
            Self::Text { .. } => None,
            Self::Audio { .. } => Some(ChatAction::UploadDocument),
            Self::Photo { .. } => Some(ChatAction::UploadPhoto),
        }
    }

    /// JSON body for [`endpoint`](Self::endpoint).
    pub fn body(&self) -> serde_json::Value {
        match self {
            Self::Text { chat, text } => serde_json::json!({ "chat_id": chat, "text": text }),
            Self::Audio { chat, url } => serde_json::json!({ "chat_id": chat, "audio": url }),
            Self::Photo { chat, url } => serde_json::json!({ "chat_id": chat, "photo": url }),
        }
    }
}
