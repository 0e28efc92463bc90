//! The room manager actor: assigns clients to rooms, caps the
//! number of live rooms, garbage-collects empty ones, and answers
//! room-list asks for the `/rooms` HTTP endpoint.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::oneshot;
use uuid::Uuid;

use crate::actor::{Actor, ActorRef, Directive, SystemMessage, spawn_with, DEFAULT_MAILBOX_SIZE};
use crate::config::SimulationConfig;
use crate::room::RoomActor;
use crate::room::messages::RoomMessage;

pub struct RoomSummary {
    pub room_id: String,
    pub player_count: usize,
}

pub enum ManagerMessage {
    FindRoom {
        reply: oneshot::Sender<Option<ActorRef<RoomMessage>>>,
    },
    RoomEmpty {
        room_id: String,
    },
    GetRoomList {
        reply: oneshot::Sender<Vec<RoomSummary>>,
    },
}

struct RoomEntry {
    identity: ActorRef<RoomMessage>,
    player_count: usize,
}

pub struct ManagerActor {
    config: Arc<SimulationConfig>,
    self_ref: ActorRef<ManagerMessage>,
    rooms: HashMap<String, RoomEntry>,
}

impl ManagerActor {
    pub fn new(config: Arc<SimulationConfig>, self_ref: ActorRef<ManagerMessage>) -> Self {
        ManagerActor {
            config,
            self_ref,
            rooms: HashMap::new(),
        }
    }

    fn spawn_room(&mut self) -> (String, ActorRef<RoomMessage>) {
        let room_id = Uuid::new_v4().to_string();
        let config = self.config.clone();
        let manager_ref = self.self_ref.clone();
        let id_for_room = room_id.clone();
        let (room_ref, _join) = spawn_with(DEFAULT_MAILBOX_SIZE, move |self_ref| {
            RoomActor::new(id_for_room, config, manager_ref, self_ref)
        });
        self.rooms.insert(
            room_id.clone(),
            RoomEntry {
                identity: room_ref.clone(),
                player_count: 0,
            },
        );
        (room_id, room_ref)
    }
}

impl Actor for ManagerActor {
    type Message = ManagerMessage;

    async fn on_system(&mut self, msg: SystemMessage) {
        if let SystemMessage::Stopping = msg {
            for (_, entry) in self.rooms.drain() {
                entry.identity.stop().await;
            }
        }
    }

    async fn handle(&mut self, msg: ManagerMessage) -> Directive {
        match msg {
            ManagerMessage::FindRoom { reply } => {
                let max_players = self.config.max_players as usize;
                let existing = self
                    .rooms
                    .iter_mut()
                    .find(|(_, entry)| entry.player_count < max_players);

                let identity = if let Some((_, entry)) = existing {
                    entry.player_count += 1;
                    Some(entry.identity.clone())
                } else if self.rooms.len() < self.config.max_rooms {
                    let (room_id, room_ref) = self.spawn_room();
                    if let Some(entry) = self.rooms.get_mut(&room_id) {
                        entry.player_count += 1;
                    }
                    Some(room_ref)
                } else {
                    None
                };

                let _ = reply.send(identity);
                Directive::Continue
            }
            ManagerMessage::RoomEmpty { room_id } => {
                if let Some(entry) = self.rooms.remove(&room_id) {
                    entry.identity.stop().await;
                }
                Directive::Continue
            }
            ManagerMessage::GetRoomList { reply } => {
                let summary = self
                    .rooms
                    .iter()
                    .map(|(room_id, entry)| RoomSummary {
                        room_id: room_id.clone(),
                        player_count: entry.player_count,
                    })
                    .collect();
                let _ = reply.send(summary);
                Directive::Continue
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::spawn_with;
    use std::time::Duration;

    fn test_config() -> Arc<SimulationConfig> {
        let mut cfg = SimulationConfig::default();
        cfg.max_players = 2;
        cfg.max_rooms = 1;
        Arc::new(cfg)
    }

    #[tokio::test]
    async fn find_room_spawns_then_reuses_until_full() {
        let config = test_config();
        let (manager, _join) = spawn_with(8, |self_ref| ManagerActor::new(config, self_ref));

        let first = manager
            .ask(|reply| ManagerMessage::FindRoom { reply }, Duration::from_secs(1))
            .await
            .unwrap();
        assert!(first.is_some());

        let second = manager
            .ask(|reply| ManagerMessage::FindRoom { reply }, Duration::from_secs(1))
            .await
            .unwrap();
        assert!(second.is_some());

        // max_players is 2 and max_rooms is 1: a third request must fail.
        let third = manager
            .ask(|reply| ManagerMessage::FindRoom { reply }, Duration::from_secs(1))
            .await
            .unwrap();
        assert!(third.is_none());
    }
}
