use serde::{ Serialize, Deserialize };
use crate::models::chat::Message as ChatMessage;
use crate::session::SessionEvent;

#[derive(Serialize, Deserialize, Debug)]
#[serde(tag = "type")]
pub enum ClientMessage {
    #[serde(rename = "chat")] Chat {
        content: String,
    },
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
#[serde(tag = "type")]
pub enum ServerMessage {
    #[serde(rename = "transcript")] Transcript {
        messages: Vec<ChatMessage>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        quick_questions: Option<Vec<String>>,
    },
    #[serde(rename = "message")] Appended {
        message: ChatMessage,
    },
    #[serde(rename = "error")] Error {
        message: String,
    },
    #[serde(rename = "processing")]
    Processing,
    #[serde(rename = "idle")]
    Idle,
}

impl From<SessionEvent> for ServerMessage {
    fn from(event: SessionEvent) -> Self {
        match event {
            SessionEvent::MessageAppended(message) => ServerMessage::Appended { message },
            SessionEvent::Composing(true) => ServerMessage::Processing,
            SessionEvent::Composing(false) => ServerMessage::Idle,
        }
    }
}
