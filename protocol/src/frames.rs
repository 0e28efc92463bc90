use serde::{Deserialize, Serialize};

use crate::dto::{BallDto, BrickDto, PaddleDto, PlayerDto};

/// One client -> server frame. The only thing a client ever sends is its
/// desired paddle direction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientFrame {
    pub direction: String,
}

/// One item inside a `gameUpdates` batch. Tagged with `type` so that,
/// unlike the outer [`ServerFrame`] (tagged `messageType`), batch items can
/// be told apart from top-level frames at a glance when both appear in a
/// captured session log.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum UpdateItem {
    PlayerJoined {
        player: PlayerDto,
        paddle: PaddleDto,
        r3f_x: f64,
        r3f_y: f64,
    },
    PlayerLeft {
        index: u8,
    },
    BallSpawned {
        ball: BallDto,
        r3f_x: f64,
        r3f_y: f64,
    },
    BallRemoved {
        id: String,
    },
    BallOwnerChanged {
        id: String,
        new_owner_index: i8,
    },
    BallPositionUpdate {
        id: String,
        x: f64,
        y: f64,
        r3f_x: f64,
        r3f_y: f64,
        vx: f64,
        vy: f64,
        phasing: bool,
        collided: bool,
    },
    PaddlePositionUpdate {
        index: u8,
        x: f64,
        y: f64,
        r3f_x: f64,
        r3f_y: f64,
        width: f64,
        height: f64,
        vx: f64,
        vy: f64,
        is_moving: bool,
        collided: bool,
    },
    ScoreUpdate {
        index: u8,
        score: i32,
    },
    FullGridUpdate {
        cell_size: f64,
        bricks: Vec<BrickDto>,
    },
}

/// One server -> client frame, tagged with `messageType`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "messageType", rename_all = "camelCase")]
pub enum ServerFrame {
    PlayerAssignment {
        player_index: u8,
    },
    InitialPlayersAndBallsState {
        players: Vec<PlayerDto>,
        paddles: Vec<PaddleDto>,
        balls: Vec<BallDto>,
    },
    GameUpdates {
        updates: Vec<UpdateItem>,
    },
    GameOver {
        winner_index: i8,
        final_scores: Vec<i32>,
        reason: String,
        room_id: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_frame_tags_with_message_type() {
        let frame = ServerFrame::PlayerAssignment { player_index: 2 };
        let json = serde_json::to_string(&frame).unwrap();
        assert!(json.contains("\"messageType\":\"playerAssignment\""));
        assert!(json.contains("\"playerIndex\":2"));
    }

    #[test]
    fn update_item_tags_with_type() {
        let item = UpdateItem::BallRemoved { id: "b1".into() };
        let json = serde_json::to_string(&item).unwrap();
        assert!(json.contains("\"type\":\"ballRemoved\""));
    }

    #[test]
    fn client_frame_round_trips() {
        let json = r#"{"direction":"ArrowLeft"}"#;
        let frame: ClientFrame = serde_json::from_str(json).unwrap();
        assert_eq!(frame.direction, "ArrowLeft");
    }
}
