//! The connection handler: the external edge of one client's websocket.
//! It reads client frames and forwards directions to the room, and
//! reports disconnects. It never writes game state to the socket itself
//! — only the room (the two join-handshake frames) and the broadcaster
//! do that.
//!
//! Writing is behind the [`WireWriter`] trait rather than a concrete
//! `SplitSink<WebSocket, Message>` so the room and broadcaster can be
//! exercised in tests without a live socket.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::future::BoxFuture;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use protocol::{ClientFrame, Direction, ServerFrame};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::actor::ActorRef;
use crate::error::RoomError;
use crate::manager::ManagerMessage;
use crate::room::messages::RoomMessage;

pub type ConnectionId = Uuid;

/// The write side of one client's transport. Implemented for the real
/// websocket sink and, in tests, for an in-memory recorder.
pub trait WireWriter: Send + Sync + 'static {
    fn write_frame<'a>(&'a self, frame: ServerFrame) -> BoxFuture<'a, Result<(), ()>>;
    fn close<'a>(&'a self) -> BoxFuture<'a, ()>;
}

pub struct WebSocketWriter {
    sink: Mutex<SplitSink<WebSocket, Message>>,
}

impl WebSocketWriter {
    pub fn new(sink: SplitSink<WebSocket, Message>) -> Self {
        WebSocketWriter {
            sink: Mutex::new(sink),
        }
    }
}

/// Any write failure is treated as a disconnect: the usual transport
/// errors (closed network, broken pipe, connection reset, EOF, write
/// timeout, no buffer space) all surface through `axum`'s websocket sink
/// as the same opaque `axum::Error`, so there is nothing finer to
/// distinguish on at this layer.
impl WireWriter for WebSocketWriter {
    fn write_frame<'a>(&'a self, frame: ServerFrame) -> BoxFuture<'a, Result<(), ()>> {
        Box::pin(async move {
            let text = serde_json::to_string(&frame).expect("ServerFrame always serializes");
            let mut sink = self.sink.lock().await;
            sink.send(Message::Text(text.into())).await.map_err(|err| {
                tracing::debug!(?err, "client write failed, treating as disconnected");
            })
        })
    }

    fn close<'a>(&'a self) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            let mut sink = self.sink.lock().await;
            let _ = sink.send(Message::Close(None)).await;
        })
    }
}

/// A cheaply-clonable handle to one client's outbound transport. Held by
/// the room (briefly, for the join handshake) and by the broadcaster (for
/// the session's lifetime).
#[derive(Clone)]
pub struct ConnectionHandle {
    pub id: ConnectionId,
    writer: Arc<dyn WireWriter>,
}

impl PartialEq for ConnectionHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
impl Eq for ConnectionHandle {}

impl std::hash::Hash for ConnectionHandle {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl std::fmt::Debug for ConnectionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionHandle").field("id", &self.id).finish()
    }
}

impl ConnectionHandle {
    pub fn new(sink: SplitSink<WebSocket, Message>) -> Self {
        ConnectionHandle {
            id: Uuid::new_v4(),
            writer: Arc::new(WebSocketWriter::new(sink)),
        }
    }

    pub fn from_writer(writer: Arc<dyn WireWriter>) -> Self {
        ConnectionHandle {
            id: Uuid::new_v4(),
            writer,
        }
    }

    /// Writes one JSON frame to this client. `Err` means any of the
    /// recognised transport failures occurred; the caller should then
    /// treat the client as disconnected.
    pub async fn send_frame(&self, frame: ServerFrame) -> Result<(), ()> {
        self.writer.write_frame(frame).await
    }

    pub async fn close(&self) {
        self.writer.close().await;
    }
}

/// Reads inbound frames for one client and forwards its direction to the
/// room; reports the disconnect once the socket closes or errors.
pub async fn read_loop(
    mut receiver: SplitStream<WebSocket>,
    connection: ConnectionHandle,
    room: ActorRef<RoomMessage>,
) {
    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                let direction = match serde_json::from_str::<ClientFrame>(&text) {
                    Ok(frame) => Direction::from_client_value(&frame.direction),
                    Err(_) => Direction::Stop, // malformed frame: ignored, defaults to stop
                };
                let _ = room
                    .send(RoomMessage::ForwardedPaddleDirection {
                        connection: connection.clone(),
                        direction,
                    })
                    .await;
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {} // ping/pong/binary: ignored
            Err(_) => break,
        }
    }

    let _ = room
        .send(RoomMessage::PlayerDisconnect {
            connection: connection.clone(),
        })
        .await;
}

/// Top-level handler for one upgraded websocket: asks the manager for a
/// room assignment, then forwards frames to that room for the rest of the
/// connection's life.
pub async fn handle_socket(
    socket: WebSocket,
    manager: ActorRef<ManagerMessage>,
    ask_timeout: std::time::Duration,
) {
    let (sender, receiver) = socket.split();
    let connection = ConnectionHandle::new(sender);

    let room = match manager
        .ask(|reply| ManagerMessage::FindRoom { reply }, ask_timeout)
        .await
    {
        Ok(Some(room)) => room,
        Ok(None) => {
            tracing::info!(error = %RoomError::NoRoomAvailable, "closing connection");
            connection.close().await;
            return;
        }
        Err(ask_err) => {
            let err = RoomError::from(ask_err);
            tracing::warn!(%err, "room manager did not respond in time");
            connection.close().await;
            return;
        }
    };

    if room
        .send(RoomMessage::AssignPlayer {
            connection: connection.clone(),
        })
        .await
        .is_err()
    {
        connection.close().await;
        return;
    }

    read_loop(receiver, connection, room).await;
}

#[cfg(test)]
pub mod test_support {
    use super::*;
    use tokio::sync::Mutex as TokioMutex;

    /// An in-memory [`WireWriter`] that records every frame instead of
    /// touching a socket, for room/broadcaster tests.
    #[derive(Default)]
    pub struct RecordingWriter {
        pub frames: TokioMutex<Vec<ServerFrame>>,
        pub closed: std::sync::atomic::AtomicBool,
    }

    impl WireWriter for RecordingWriter {
        fn write_frame<'a>(&'a self, frame: ServerFrame) -> BoxFuture<'a, Result<(), ()>> {
            Box::pin(async move {
                if self.closed.load(std::sync::atomic::Ordering::SeqCst) {
                    return Err(());
                }
                self.frames.lock().await.push(frame);
                Ok(())
            })
        }

        fn close<'a>(&'a self) -> BoxFuture<'a, ()> {
            Box::pin(async move {
                self.closed.store(true, std::sync::atomic::Ordering::SeqCst);
            })
        }
    }

    pub fn recording_connection() -> (ConnectionHandle, Arc<RecordingWriter>) {
        let writer = Arc::new(RecordingWriter::default());
        (ConnectionHandle::from_writer(writer.clone()), writer)
    }
}
