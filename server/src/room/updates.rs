//! The room's pending-updates buffer and the builders that turn cache
//! state into wire [`UpdateItem`]s, including the R3F coordinate mapping.

use protocol::{BallDto, BrickDto, PaddleDto, PlayerDto, UpdateItem};

use crate::entities::ball::Ball;
use crate::entities::paddle::Paddle;
use crate::geometry::{BrickData, Canvas, Grid};

use super::player::Player;

/// Append-only buffer drained once per `BroadcastTick`.
#[derive(Default)]
pub struct PendingUpdates {
    items: Vec<UpdateItem>,
}

impl PendingUpdates {
    pub fn push(&mut self, item: UpdateItem) {
        self.items.push(item);
    }

    /// Swaps the buffer for an empty one and returns what was pending.
    pub fn drain(&mut self) -> Vec<UpdateItem> {
        std::mem::take(&mut self.items)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

pub fn player_dto(player: &Player) -> PlayerDto {
    PlayerDto {
        index: player.index,
        id: player.id.clone(),
        colour: player.colour.clone(),
        score: player.score(),
        is_connected: player.is_connected,
    }
}

pub fn paddle_dto(paddle: &Paddle, canvas: &Canvas) -> PaddleDto {
    let (r3f_x, r3f_y) = canvas.to_r3f(paddle.x, paddle.y);
    PaddleDto {
        index: paddle.index,
        x: paddle.x,
        y: paddle.y,
        r3f_x,
        r3f_y,
        width: paddle.width,
        height: paddle.height,
        vx: paddle.vx,
        vy: paddle.vy,
        is_moving: paddle.is_moving,
    }
}

pub fn ball_dto(ball: &Ball, canvas: &Canvas) -> BallDto {
    let (r3f_x, r3f_y) = canvas.to_r3f(ball.x as f64, ball.y as f64);
    BallDto {
        id: ball.id.clone(),
        owner_index: ball.owner_index,
        x: ball.x as f64,
        y: ball.y as f64,
        r3f_x,
        r3f_y,
        vx: ball.vx as f64,
        vy: ball.vy as f64,
        radius: ball.radius,
        mass: ball.mass,
        phasing: ball.phasing,
        is_permanent: ball.is_permanent,
    }
}

pub fn player_joined(player: &Player, paddle: &Paddle, canvas: &Canvas) -> UpdateItem {
    let (r3f_x, r3f_y) = canvas.to_r3f(paddle.x, paddle.y);
    UpdateItem::PlayerJoined {
        player: player_dto(player),
        paddle: paddle_dto(paddle, canvas),
        r3f_x,
        r3f_y,
    }
}

pub fn ball_spawned(ball: &Ball, canvas: &Canvas) -> UpdateItem {
    let (r3f_x, r3f_y) = canvas.to_r3f(ball.x as f64, ball.y as f64);
    UpdateItem::BallSpawned {
        ball: ball_dto(ball, canvas),
        r3f_x,
        r3f_y,
    }
}

pub fn player_left(index: u8) -> UpdateItem {
    UpdateItem::PlayerLeft { index }
}

pub fn score_update(player: &Player) -> UpdateItem {
    UpdateItem::ScoreUpdate {
        index: player.index,
        score: player.score(),
    }
}

pub fn ball_owner_changed(ball_id: impl Into<String>, new_owner_index: i8) -> UpdateItem {
    UpdateItem::BallOwnerChanged {
        id: ball_id.into(),
        new_owner_index,
    }
}

pub fn ball_removed(ball_id: impl Into<String>) -> UpdateItem {
    UpdateItem::BallRemoved { id: ball_id.into() }
}

pub fn ball_position_update(ball: &Ball, canvas: &Canvas) -> UpdateItem {
    let (r3f_x, r3f_y) = canvas.to_r3f(ball.x as f64, ball.y as f64);
    UpdateItem::BallPositionUpdate {
        id: ball.id.clone(),
        x: ball.x as f64,
        y: ball.y as f64,
        r3f_x,
        r3f_y,
        vx: ball.vx as f64,
        vy: ball.vy as f64,
        phasing: ball.phasing,
        collided: ball.collided,
    }
}

pub fn paddle_position_update(paddle: &Paddle, canvas: &Canvas) -> UpdateItem {
    let (r3f_x, r3f_y) = canvas.to_r3f(paddle.x, paddle.y);
    UpdateItem::PaddlePositionUpdate {
        index: paddle.index,
        x: paddle.x,
        y: paddle.y,
        r3f_x,
        r3f_y,
        width: paddle.width,
        height: paddle.height,
        vx: paddle.vx,
        vy: paddle.vy,
        is_moving: paddle.is_moving,
        collided: paddle.collided,
    }
}

fn brick_dto(row: usize, col: usize, brick: &BrickData, canvas: &Canvas) -> BrickDto {
    let centre_x = (col as f64 + 0.5) * canvas.cell_size;
    let centre_y = (row as f64 + 0.5) * canvas.cell_size;
    let (x, y) = canvas.to_r3f(centre_x, centre_y);
    BrickDto {
        x,
        y,
        life: brick.life,
        kind: brick.kind,
    }
}

/// One `fullGridUpdate` snapshot of the entire grid.
pub fn full_grid_update(grid: &Grid, canvas: &Canvas) -> UpdateItem {
    let mut bricks = Vec::with_capacity(grid.len() * grid.len());
    for (row, cells) in grid.iter_rows() {
        for (col, cell) in cells.iter().enumerate() {
            bricks.push(brick_dto(row, col, cell, canvas));
        }
    }
    UpdateItem::FullGridUpdate {
        cell_size: canvas.cell_size,
        bricks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_empties_and_returns_pending_items() {
        let mut pending = PendingUpdates::default();
        assert!(pending.is_empty());
        pending.push(UpdateItem::BallRemoved { id: "b1".into() });
        assert!(!pending.is_empty());
        let drained = pending.drain();
        assert_eq!(drained.len(), 1);
        assert!(pending.is_empty());
    }
}
