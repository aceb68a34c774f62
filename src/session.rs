use log::debug;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::history::Transcript;
use crate::models::chat::{ Message, Sender };
use crate::resolver::Resolver;

/// Starter questions offered before the user has written anything.
pub static QUICK_QUESTIONS: [&str; 4] = [
    "Как записаться на трассу?",
    "Какие цены?",
    "Что нужно для участия?",
    "Расскажите о трассах",
];

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    MessageAppended(Message),
    Composing(bool),
}

/// Returns `false` once it no longer wants events.
type Listener = Box<dyn Fn(&SessionEvent) -> bool + Send + Sync>;

/// One support-chat conversation: the transcript, the composing flag and the
/// resolver answering it.
pub struct ChatSession {
    transcript: Transcript,
    composing: bool,
    resolver: Arc<dyn Resolver>,
    listeners: Vec<Listener>,
}

impl ChatSession {
    pub fn new(resolver: Arc<dyn Resolver>) -> Self {
        Self {
            transcript: Transcript::new(),
            composing: false,
            resolver,
            listeners: Vec::new(),
        }
    }

    /// Calls `listener` synchronously for every transcript append and
    /// composing change, in order.
    pub fn on_event<F>(&mut self, listener: F)
        where F: Fn(&SessionEvent) -> bool + Send + Sync + 'static
    {
        self.listeners.push(Box::new(listener));
    }

    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<SessionEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.on_event(move |event| tx.send(event.clone()).is_ok());
        rx
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn is_composing(&self) -> bool {
        self.composing
    }

    pub fn quick_questions(&self) -> Option<&'static [&'static str]> {
        if self.transcript.len() <= 1 {
            Some(&QUICK_QUESTIONS[..])
        } else {
            None
        }
    }

    /// Runs one exchange: append the user message, mark composing, resolve,
    /// append the reply, clear composing.
    ///
    /// Blank input is ignored and returns `None`. Otherwise returns the bot
    /// message that was appended.
    pub async fn submit(&mut self, input: &str) -> Option<Message> {
        if input.trim().is_empty() {
            debug!("Ignoring blank input");
            return None;
        }

        let user_message = self.transcript.append(Sender::User, input).clone();
        self.emit(SessionEvent::MessageAppended(user_message));
        self.set_composing(true);

        let reply = self.resolver.resolve(input).await;

        let bot_message = self.transcript.append(Sender::Bot, reply).clone();
        self.emit(SessionEvent::MessageAppended(bot_message.clone()));
        self.set_composing(false);

        Some(bot_message)
    }

    fn set_composing(&mut self, composing: bool) {
        self.composing = composing;
        self.emit(SessionEvent::Composing(composing));
    }

    fn emit(&mut self, event: SessionEvent) {
        self.listeners.retain(|listener| listener(&event));
    }
}
