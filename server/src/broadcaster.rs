//! The broadcaster actor: owns one room's client set and is
//! the only component that touches the wire, except for the two
//! join-handshake frames the room sends directly under `AssignPlayer`.

use std::collections::HashSet;

use protocol::{ServerFrame, UpdateItem};

use crate::actor::{Actor, Directive, SystemMessage};
use crate::connection::ConnectionHandle;
use crate::room::messages::RoomMessage;

pub enum BroadcasterMessage {
    AddClient {
        connection: ConnectionHandle,
    },
    RemoveClient {
        connection: ConnectionHandle,
    },
    BroadcastUpdates {
        batch: Vec<UpdateItem>,
    },
    GameOver {
        winner_index: i8,
        final_scores: Vec<i32>,
        reason: String,
        room_id: String,
    },
}

pub struct BroadcasterActor {
    room: crate::actor::ActorRef<RoomMessage>,
    clients: HashSet<ConnectionHandle>,
}

impl BroadcasterActor {
    pub fn new(room: crate::actor::ActorRef<RoomMessage>) -> Self {
        BroadcasterActor {
            room,
            clients: HashSet::new(),
        }
    }

    async fn close_all(&mut self) {
        for client in self.clients.drain() {
            client.close().await;
        }
    }
}

impl Actor for BroadcasterActor {
    type Message = BroadcasterMessage;

    async fn on_system(&mut self, msg: SystemMessage) {
        if let SystemMessage::Stopping = msg {
            self.close_all().await;
        }
    }

    async fn handle(&mut self, msg: BroadcasterMessage) -> Directive {
        match msg {
            BroadcasterMessage::AddClient { connection } => {
                self.clients.insert(connection);
                Directive::Continue
            }
            BroadcasterMessage::RemoveClient { connection } => {
                self.clients.remove(&connection);
                Directive::Continue
            }
            BroadcasterMessage::BroadcastUpdates { batch } => {
                if batch.is_empty() {
                    return Directive::Continue;
                }
                let frame = ServerFrame::GameUpdates { updates: batch };
                let mut dead = Vec::new();
                for client in &self.clients {
                    if client.send_frame(frame.clone()).await.is_err() {
                        dead.push(client.clone());
                    }
                }
                for client in dead {
                    self.clients.remove(&client);
                    let _ = self
                        .room
                        .send(RoomMessage::PlayerDisconnect {
                            connection: client,
                        })
                        .await;
                }
                Directive::Continue
            }
            BroadcasterMessage::GameOver {
                winner_index,
                final_scores,
                reason,
                room_id,
            } => {
                let frame = ServerFrame::GameOver {
                    winner_index,
                    final_scores,
                    reason,
                    room_id,
                };
                for client in &self.clients {
                    let _ = client.send_frame(frame.clone()).await;
                }
                self.close_all().await;
                Directive::Continue
            }
        }
    }
}
