//! The room actor's inbound message set.

use protocol::Direction;

use crate::connection::ConnectionHandle;

pub enum RoomMessage {
    AssignPlayer {
        connection: ConnectionHandle,
    },
    PlayerDisconnect {
        connection: ConnectionHandle,
    },
    ForwardedPaddleDirection {
        connection: ConnectionHandle,
        direction: Direction,
    },
    SpawnBall {
        owner_index: i8,
        x: i64,
        y: i64,
        expire_in: Option<std::time::Duration>,
        is_permanent: bool,
        set_initial_phasing: bool,
    },
    DestroyExpiredBall {
        ball_id: String,
    },
    StopPhasingTimer {
        ball_id: String,
    },
    GameTick,
    BroadcastTick,
    PaddleStateUpdate {
        index: u8,
        direction: Direction,
    },
    BallStateUpdate {
        id: String,
        radius: f64,
        mass: f64,
    },
}

/// A minimal stand-in room actor used to test the broadcaster in
/// isolation, without spinning up a real `RoomActor`.
#[cfg(test)]
pub mod test_support {
    use super::RoomMessage;
    use crate::actor::{Actor, Directive};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    pub struct Sink {
        pub disconnect_count: Arc<AtomicUsize>,
    }

    impl Actor for Sink {
        type Message = RoomMessage;

        async fn handle(&mut self, msg: RoomMessage) -> Directive {
            if let RoomMessage::PlayerDisconnect { .. } = msg {
                self.disconnect_count.fetch_add(1, Ordering::SeqCst);
            }
            Directive::Continue
        }
    }
}
