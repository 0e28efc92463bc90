//! Black-box exercise of the public actor tree: manager room assignment,
//! the join handshake, and paddle direction forwarding, all driven through
//! the crate's public message/connection API rather than a live socket.

use std::sync::Arc;
use std::time::Duration;

use arena_server::actor::{spawn_with, ActorRef};
use arena_server::config::SimulationConfig;
use arena_server::connection::{ConnectionHandle, WireWriter};
use arena_server::manager::{ManagerActor, ManagerMessage};
use arena_server::room::messages::RoomMessage;
use futures_util::future::BoxFuture;
use protocol::{Direction, ServerFrame};
use tokio::sync::Mutex;

/// A [`WireWriter`] visible only to tests in this crate's public API, since
/// `connection::test_support` is compiled only for the crate's own unit
/// tests, not for a separate integration test binary.
#[derive(Default)]
struct RecordingWriter {
    frames: Mutex<Vec<ServerFrame>>,
}

impl WireWriter for RecordingWriter {
    fn write_frame<'a>(&'a self, frame: ServerFrame) -> BoxFuture<'a, Result<(), ()>> {
        Box::pin(async move {
            self.frames.lock().await.push(frame);
            Ok(())
        })
    }

    fn close<'a>(&'a self) -> BoxFuture<'a, ()> {
        Box::pin(async move {})
    }
}

fn recording_connection() -> (ConnectionHandle, Arc<RecordingWriter>) {
    let writer = Arc::new(RecordingWriter::default());
    (ConnectionHandle::from_writer(writer.clone()), writer)
}

async fn spawn_manager(config: SimulationConfig) -> ActorRef<ManagerMessage> {
    let config = Arc::new(config);
    let (manager, _join) = spawn_with(32, move |self_ref| ManagerActor::new(config, self_ref));
    manager
}

#[tokio::test]
async fn finding_a_room_and_joining_it_delivers_the_handshake() {
    let manager = spawn_manager(SimulationConfig::default()).await;

    let room = manager
        .ask(|reply| ManagerMessage::FindRoom { reply }, Duration::from_secs(1))
        .await
        .unwrap()
        .expect("a fresh manager always has room to spawn one");

    let (connection, writer) = recording_connection();
    room.send(RoomMessage::AssignPlayer { connection: connection.clone() })
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(20)).await;
    let frames = writer.frames.lock().await;
    assert_eq!(frames.len(), 2, "a join gets a player assignment and the initial snapshot");
    assert!(matches!(frames[0], ServerFrame::PlayerAssignment { player_index: 0 }));
    assert!(matches!(frames[1], ServerFrame::InitialPlayersAndBallsState { .. }));
}

#[tokio::test]
async fn a_full_room_spills_over_into_a_new_one() {
    let mut config = SimulationConfig::default();
    config.max_players = 1;
    config.max_rooms = 2;
    let manager = spawn_manager(config).await;

    let first = manager
        .ask(|reply| ManagerMessage::FindRoom { reply }, Duration::from_secs(1))
        .await
        .unwrap()
        .unwrap();
    let second = manager
        .ask(|reply| ManagerMessage::FindRoom { reply }, Duration::from_secs(1))
        .await
        .unwrap()
        .unwrap();

    let (conn_a, _writer_a) = recording_connection();
    let (conn_b, _writer_b) = recording_connection();
    first
        .send(RoomMessage::AssignPlayer { connection: conn_a })
        .await
        .unwrap();
    second
        .send(RoomMessage::AssignPlayer { connection: conn_b })
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;

    let rooms = manager
        .ask(|reply| ManagerMessage::GetRoomList { reply }, Duration::from_secs(1))
        .await
        .unwrap();
    assert_eq!(rooms.len(), 2);
    assert!(rooms.iter().all(|r| r.player_count == 1));
}

#[tokio::test]
async fn manager_refuses_once_every_room_is_full() {
    let mut config = SimulationConfig::default();
    config.max_players = 1;
    config.max_rooms = 1;
    let manager = spawn_manager(config).await;

    let first = manager
        .ask(|reply| ManagerMessage::FindRoom { reply }, Duration::from_secs(1))
        .await
        .unwrap();
    assert!(first.is_some());

    let second = manager
        .ask(|reply| ManagerMessage::FindRoom { reply }, Duration::from_secs(1))
        .await
        .unwrap();
    assert!(second.is_none(), "max_rooms=1 and the only room is already full");
}

#[tokio::test]
async fn a_forwarded_direction_moves_the_paddle_and_is_reported_back() {
    let manager = spawn_manager(SimulationConfig::default()).await;
    let room = manager
        .ask(|reply| ManagerMessage::FindRoom { reply }, Duration::from_secs(1))
        .await
        .unwrap()
        .unwrap();

    let (connection, writer) = recording_connection();
    room.send(RoomMessage::AssignPlayer { connection: connection.clone() })
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;

    room.send(RoomMessage::ForwardedPaddleDirection {
        connection: connection.clone(),
        direction: Direction::Left,
    })
    .await
    .unwrap();

    // Drive one physics tick so the paddle's new velocity is observable on
    // the broadcast stream rather than only in the room's own cache.
    room.send(RoomMessage::GameTick).await.unwrap();
    room.send(RoomMessage::BroadcastTick).await.unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;

    let frames = writer.frames.lock().await;
    let moved = frames.iter().any(|frame| {
        matches!(
            frame,
            ServerFrame::GameUpdates { updates } if updates.iter().any(|u| matches!(
                u,
                protocol::UpdateItem::PaddlePositionUpdate { is_moving: true, .. }
            ))
        )
    });
    assert!(moved, "the paddle's direction change should surface on the wire");
}
