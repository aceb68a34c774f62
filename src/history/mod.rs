use chrono::Local;
use crate::models::chat::{ Message, MessageId, Sender };

pub const WELCOME_MESSAGE: &str =
    "Добро пожаловать в RaceTrack Pro! Я ваш виртуальный помощник. Чем могу помочь?";

/// Append-only, in-memory message log of one chat session.
///
/// Every transcript starts with the bot's welcome message. Entries are never
/// edited or removed, so insertion order is also display and chronological
/// order.
#[derive(Debug, Clone)]
pub struct Transcript {
    messages: Vec<Message>,
    next_id: u64,
}

impl Transcript {
    pub fn new() -> Self {
        let mut transcript = Self {
            messages: Vec::new(),
            next_id: 1,
        };
        transcript.append(Sender::Bot, WELCOME_MESSAGE);
        transcript
    }

    pub fn append(&mut self, sender: Sender, text: impl Into<String>) -> &Message {
        let message = Message {
            id: MessageId(self.next_id),
            text: text.into(),
            sender,
            timestamp: Local::now(),
        };
        self.next_id += 1;
        self.messages.push(message);
        &self.messages[self.messages.len() - 1]
    }

    pub fn all(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}

pub fn format_transcript(transcript: &Transcript) -> String {
    let mut result = String::new();
    for msg in transcript.all() {
        let sender_display = match msg.sender {
            Sender::User => "User",
            Sender::Bot => "Bot",
        };

        result.push_str(&format!("[{}] {}: {}\n", msg.display_time(), sender_display, msg.text));
    }

    result
}
