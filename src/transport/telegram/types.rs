use crate::sessions::ChatId;
use crate::story::GeoPoint;
use crate::transport::traits::IncomingMessage;
use serde::{Deserialize, Serialize};

/// Envelope of every Bot API reply.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub chat: Chat,
    #[serde(default)]
    pub from: Option<User>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub location: Option<Location>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub language_code: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl IncomingMessage {
    /// Updates without a message (edits, callbacks, ...) carry nothing for
    /// the story and yield `None`.
    pub fn from_update(update: Update) -> Option<Self> {
        let message = update.message?;
        Some(Self {
            chat: ChatId(message.chat.id),
            text: message.text.unwrap_or_default(),
            location: message
                .location
                .map(|location| GeoPoint::new(location.latitude, location.longitude)),
            language_hint: message
                .from
                .and_then(|user| user.language_code)
                .filter(|code| !code.is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_update_maps_to_incoming() {
        let update: Update = serde_json::from_value(serde_json::json!({
            "update_id": 10,
            "message": {
                "message_id": 1,
                "chat": {"id": 657, "type": "private"},
                "from": {"id": 1, "is_bot": false, "language_code": "ru"},
                "text": "step 1"
            }
        }))
        .unwrap();

        let incoming = IncomingMessage::from_update(update).unwrap();
        assert_eq!(incoming.chat, ChatId(657));
        assert_eq!(incoming.text, "step 1");
        assert_eq!(incoming.language_hint.as_deref(), Some("ru"));
        assert_eq!(incoming.location, None);
    }

    #[test]
    fn location_update_maps_to_coordinates() {
        let update: Update = serde_json::from_value(serde_json::json!({
            "update_id": 11,
            "message": {
                "chat": {"id": 1},
                "location": {"latitude": 43.257081, "longitude": 76.924835}
            }
        }))
        .unwrap();

        let incoming = IncomingMessage::from_update(update).unwrap();
        assert_eq!(incoming.story_input(), "43.257081,76.924835");
        assert_eq!(incoming.language_hint, None);
    }

    #[test]
    fn update_without_message_is_skipped() {
        let update: Update =
            serde_json::from_value(serde_json::json!({"update_id": 12, "edited_message": {}}))
                .unwrap();
        assert!(IncomingMessage::from_update(update).is_none());
    }
}
