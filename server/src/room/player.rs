//! Player slot state. Score is a plain `AtomicI32` because it may be read
//! for update generation without taking the room's own single-threaded
//! execution as a lock.

use std::sync::atomic::{AtomicI32, Ordering};

use crate::connection::ConnectionHandle;

pub struct Player {
    pub index: u8,
    pub id: String,
    pub colour: String,
    pub is_connected: bool,
    pub connection: ConnectionHandle,
    score: AtomicI32,
}

const COLOURS: [&str; 4] = ["#e63946", "#457b9d", "#2a9d8f", "#f4a261"];

impl Player {
    pub fn new(index: u8, connection: ConnectionHandle, initial_score: i32) -> Self {
        Player {
            index,
            id: connection.id.to_string(),
            colour: COLOURS[index as usize % COLOURS.len()].to_string(),
            is_connected: true,
            connection,
            score: AtomicI32::new(initial_score),
        }
    }

    pub fn score(&self) -> i32 {
        self.score.load(Ordering::Relaxed)
    }

    pub fn add_score(&self, delta: i32) {
        self.score.fetch_add(delta, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::test_support::recording_connection;

    #[test]
    fn score_can_go_negative() {
        let (connection, _writer) = recording_connection();
        let player = Player::new(0, connection, 0);
        player.add_score(-3);
        assert_eq!(player.score(), -3);
    }
}
