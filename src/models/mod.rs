pub mod chat;
pub mod inference;
pub mod websocket;
