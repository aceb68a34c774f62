use crate::history::format_transcript;
use crate::models::websocket::{ ClientMessage, ServerMessage };
use crate::resolver::Resolver;
use crate::session::ChatSession;

use std::error::Error;
use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::sync::Arc;

use tokio::io::{ AsyncRead, AsyncWrite };
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use tokio_tungstenite::{ accept_async, WebSocketStream };
use tokio_tungstenite::tungstenite::protocol::Message;

use lazy_static::lazy_static;
use governor::{ RateLimiter, Quota, state::{ InMemoryState, NotKeyed }, clock::DefaultClock };

use log::{ info, warn, error, debug };
use futures::{ Sink, SinkExt, StreamExt };
use uuid::Uuid;

const MAX_MESSAGE_SIZE: usize = 1 * 1024 * 1024;
const CONNECTIONS_PER_SECOND: NonZeroU32 = match NonZeroU32::new(10) {
    Some(n) => n,
    None => unreachable!(),
};

lazy_static! {
    static ref CONNECTION_LIMITER: RateLimiter<NotKeyed, InMemoryState, DefaultClock> =
        RateLimiter::direct(Quota::per_second(CONNECTIONS_PER_SECOND));
}

pub async fn start_ws_server(
    addr: &str,
    resolver: Arc<dyn Resolver>,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let listener = TcpListener::bind(addr).await?;
    info!("WS server listening on: {}", addr);
    serve(listener, resolver).await
}

/// Accepts widget connections forever; every connection gets its own session.
pub async fn serve(
    listener: TcpListener,
    resolver: Arc<dyn Resolver>,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    loop {
        let (stream, peer) = listener.accept().await?;

        if CONNECTION_LIMITER.check().is_err() {
            warn!("Global connection rate limit exceeded for {}. Dropping connection.", peer);
            continue;
        }

        info!("Incoming connection from: {}", peer);
        let resolver_clone = Arc::clone(&resolver);

        tokio::spawn(async move {
            match accept_async(stream).await {
                Ok(ws) => handle_connection(peer, ws, resolver_clone).await,
                Err(e) => error!("Handshake failed for {}: {}", peer, e),
            }
        });
    }
}

async fn send_frame<S>(tx: &mut S, frame: &ServerMessage) -> Result<(), Box<dyn Error + Send + Sync>>
    where S: Sink<Message> + Unpin, S::Error: Error + Send + Sync + 'static
{
    let json = serde_json::to_string(frame)?;
    tx.send(Message::Text(json)).await?;
    Ok(())
}

pub async fn handle_connection<S>(
    peer: SocketAddr,
    websocket: WebSocketStream<S>,
    resolver: Arc<dyn Resolver>
)
    where S: AsyncRead + AsyncWrite + Unpin + Send + 'static
{
    let (mut tx, mut rx) = websocket.split();
    let session_id = Uuid::new_v4();
    info!("Assigned session ID {} to {}", session_id, peer);

    let mut session = ChatSession::new(resolver);

    let greeting = ServerMessage::Transcript {
        messages: session.transcript().all().to_vec(),
        quick_questions: session
            .quick_questions()
            .map(|questions| questions.iter().map(|q| q.to_string()).collect()),
    };
    if let Err(e) = send_frame(&mut tx, &greeting).await {
        error!("Failed to send transcript to {}: {}", peer, e);
        return;
    }

    // The write half lives in its own task so frames go out while the
    // resolver is pending. All outgoing frames share one channel.
    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<ServerMessage>();
    let events_tx = out_tx.clone();
    session.on_event(move |event| events_tx.send(ServerMessage::from(event.clone())).is_ok());

    let writer = tokio::spawn(async move {
        while let Some(frame) = out_rx.recv().await {
            if let Err(e) = send_frame(&mut tx, &frame).await {
                error!("Error sending frame to {}: {}", peer, e);
                break;
            }
        }
    });

    while let Some(msg) = rx.next().await {
        match msg {
            Ok(message) => {
                if message.len() > MAX_MESSAGE_SIZE {
                    warn!(
                        "Message from {} exceeds size limit ({} > {})",
                        peer,
                        message.len(),
                        MAX_MESSAGE_SIZE
                    );
                    let _ = out_tx.send(ServerMessage::Error {
                        message: "Message too large".to_string(),
                    });
                    break;
                }

                match message {
                    Message::Text(text) => {
                        match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(ClientMessage::Chat { content }) => {
                                if session.submit(&content).await.is_none() {
                                    debug!("Blank chat message from {} ignored", peer);
                                }
                            }
                            Err(e) => {
                                error!("Failed to parse message from {}: {}", peer, e);
                                let _ = out_tx.send(ServerMessage::Error {
                                    message: format!("Failed to parse message: {}", e),
                                });
                            }
                        }
                    }
                    Message::Close(_) => {
                        info!("Received close frame from {}", peer);
                        break;
                    }
                    Message::Binary(_) => {
                        warn!("Ignoring binary message from {}", peer);
                    }
                    // tungstenite answers pings itself
                    Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {}
                }
            }
            Err(e) => {
                match e {
                    | tokio_tungstenite::tungstenite::Error::ConnectionClosed
                    | tokio_tungstenite::tungstenite::Error::Protocol(_)
                    | tokio_tungstenite::tungstenite::Error::Utf8 => {
                        info!("WebSocket connection closed or protocol error for {}: {}", peer, e);
                    }
                    tokio_tungstenite::tungstenite::Error::Io(ref io_err) if
                        io_err.kind() == std::io::ErrorKind::ConnectionReset
                    => {
                        info!("WebSocket connection reset by peer {}", peer);
                    }
                    _ => {
                        error!("Error receiving message from {}: {}", peer, e);
                    }
                }
                break;
            }
        }
    }

    debug!("Transcript of session {}:\n{}", session_id, format_transcript(session.transcript()));
    drop(session);
    drop(out_tx);
    if let Err(e) = writer.await {
        error!("Writer task for {} failed: {}", peer, e);
    }
    info!("WebSocket connection closed for {} (Session ID: {})", peer, session_id);
}
