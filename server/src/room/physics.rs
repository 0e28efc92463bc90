//! The physics tick: paddle/ball movement, then wall, paddle and brick
//! collision detection, then power-ups and game-over.

use std::f64::consts::PI;

use rand::Rng;

use crate::collision::CollisionKey;
use crate::entities::ball::{Axis, Ball, BallMessage};
use crate::entities::paddle::PaddleMessage;
use crate::vecmath::{scale_to_speed, to_int_preserving_sign};

use super::RoomActor;
use super::updates;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Wall {
    Right,
    Top,
    Left,
    Bottom,
}

impl Wall {
    fn index(self) -> u8 {
        match self {
            Wall::Right => 0,
            Wall::Top => 1,
            Wall::Left => 2,
            Wall::Bottom => 3,
        }
    }

    fn axis(self) -> Axis {
        match self {
            Wall::Right | Wall::Left => Axis::X,
            Wall::Top | Wall::Bottom => Axis::Y,
        }
    }
}

/// Which wall (if any) the ball's bounding circle currently overlaps,
/// checked in the fixed tie-break order right, top, left, bottom.
fn wall_hit(ball: &Ball, canvas_size: f64) -> Option<Wall> {
    let r = ball.radius;
    let x = ball.x as f64;
    let y = ball.y as f64;
    if x + r >= canvas_size {
        Some(Wall::Right)
    } else if y - r <= 0.0 {
        Some(Wall::Top)
    } else if x - r <= 0.0 {
        Some(Wall::Left)
    } else if y + r >= canvas_size {
        Some(Wall::Bottom)
    } else {
        None
    }
}

fn clamp_to_wall(ball: &mut Ball, wall: Wall, canvas_size: f64) {
    let r = ball.radius.round() as i64;
    match wall {
        Wall::Right => ball.x = canvas_size.round() as i64 - r,
        Wall::Top => ball.y = r,
        Wall::Left => ball.x = r,
        Wall::Bottom => ball.y = canvas_size.round() as i64 - r,
    }
}

impl RoomActor {
    /// Runs one `GameTick`: moves every paddle and ball, detects wall,
    /// paddle and brick collisions, applies power-ups, emits the position
    /// updates that changed this tick, and checks for game-over.
    pub(super) async fn physics_tick(&mut self) {
        if self.grid.is_none() {
            return;
        }

        let before_paddles: Vec<_> = self.paddles.clone();
        let before_balls: std::collections::HashMap<String, Ball> = self.balls.clone();

        for paddle in self.paddles.iter_mut().flatten() {
            paddle.collided = false;
            paddle.advance();
            let half = paddle.long_axis_extent() / 2.0;
            let pos = paddle.position_along_axis();
            let at_bound = (pos - half).abs() < 1e-6 || (pos - (paddle.canvas_size - half)).abs() < 1e-6;
            paddle.collided = at_bound && paddle.is_moving;
        }

        let ball_ids: Vec<String> = self.balls.keys().cloned().collect();
        for id in &ball_ids {
            if let Some(ball) = self.balls.get_mut(id) {
                ball.collided = false;
                ball.advance();
            }
        }

        let mut removed = Vec::new();
        let mut power_ups = Vec::new();
        for id in &ball_ids {
            self.detect_collisions_for_ball(id, &mut removed, &mut power_ups).await;
        }

        for id in &removed {
            self.remove_ball(id, true).await;
        }

        for snapshot in power_ups {
            self.apply_power_up(snapshot).await;
        }

        for (i, paddle) in self.paddles.iter().enumerate() {
            if let Some(paddle) = paddle {
                let changed = before_paddles[i]
                    .as_ref()
                    .map(|before| {
                        (before.x, before.y, before.vx, before.vy, before.is_moving)
                            != (paddle.x, paddle.y, paddle.vx, paddle.vy, paddle.is_moving)
                    })
                    .unwrap_or(true);
                if changed || paddle.collided {
                    self.pending.push(updates::paddle_position_update(paddle, &self.canvas));
                }
            }
        }
        for id in &ball_ids {
            if let Some(ball) = self.balls.get(id) {
                let changed = before_balls
                    .get(id)
                    .map(|before| {
                        (before.x, before.y, before.vx, before.vy, before.phasing)
                            != (ball.x, ball.y, ball.vx, ball.vy, ball.phasing)
                    })
                    .unwrap_or(true);
                if changed || ball.collided {
                    self.pending.push(updates::ball_position_update(ball, &self.canvas));
                }
            }
        }

        self.check_game_over().await;
    }

    fn still_touching(&self, ball: &Ball, object2_id: &str) -> bool {
        if let Some(idx_str) = object2_id.strip_prefix("paddle:") {
            let Ok(idx) = idx_str.parse::<usize>() else { return false };
            let Some(paddle) = self.paddles.get(idx).and_then(|p| p.as_ref()) else {
                return false;
            };
            circle_intersects_paddle(ball, paddle)
        } else if let Some(rest) = object2_id.strip_prefix("brick:") {
            let mut parts = rest.split(':');
            let (Some(row), Some(col)) = (parts.next(), parts.next()) else {
                return false;
            };
            let (Ok(row), Ok(col)) = (row.parse::<usize>(), col.parse::<usize>()) else {
                return false;
            };
            let Some(grid) = &self.grid else { return false };
            if row >= grid.len() || col >= grid.len() {
                return false;
            }
            ball_bounding_box_touches_cell(ball, row, col, self.canvas.cell_size) && grid.cell(row, col).is_brick()
        } else {
            false
        }
    }

    async fn detect_collisions_for_ball(
        &mut self,
        id: &str,
        removed: &mut Vec<String>,
        power_ups: &mut Vec<Ball>,
    ) {
        let Some(mut ball) = self.balls.remove(id) else {
            return;
        };

        let stale: Vec<_> = self
            .collisions
            .active_for_object1(&format!("ball:{id}"))
            .into_iter()
            .filter(|key| !self.still_touching(&ball, &key.object2_id))
            .collect();
        for key in stale {
            self.collisions.end(&key);
        }

        let mut reflected_x = false;
        let mut reflected_y = false;

        if let Some(wall) = wall_hit(&ball, self.canvas.size) {
            clamp_to_wall(&mut ball, wall, self.canvas.size);
            let wall_index = wall.index();
            let owned_by_connected_player = self
                .players
                .get(wall_index as usize)
                .and_then(|p| p.as_ref())
                .map(|p| p.is_connected)
                .unwrap_or(false);

            if owned_by_connected_player {
                self.reflect_once(&mut ball, wall.axis(), &mut reflected_x, &mut reflected_y)
                    .await;
                let owner = ball.owner_index;
                if owner >= 0
                    && owner != wall_index as i8
                    && self
                        .players
                        .get(owner as usize)
                        .and_then(|p| p.as_ref())
                        .map(|p| p.is_connected)
                        .unwrap_or(false)
                {
                    self.players[owner as usize].as_ref().unwrap().add_score(1);
                    self.players[wall_index as usize].as_ref().unwrap().add_score(-1);
                    self.pending
                        .push(updates::score_update(self.players[owner as usize].as_ref().unwrap()));
                } else {
                    self.players[wall_index as usize].as_ref().unwrap().add_score(-1);
                }
                self.pending
                    .push(updates::score_update(self.players[wall_index as usize].as_ref().unwrap()));
                ball.collided = true;
                self.start_phasing(&mut ball).await;
            } else if ball.is_permanent {
                self.reflect_once(&mut ball, wall.axis(), &mut reflected_x, &mut reflected_y)
                    .await;
                ball.collided = true;
                self.start_phasing(&mut ball).await;
            } else {
                removed.push(id.to_string());
                return;
            }
        }

        if !ball.phasing {
            'paddle: for idx in 0..self.paddles.len() {
                let Some(connected) = self.players.get(idx).and_then(|p| p.as_ref()) else {
                    continue;
                };
                if !connected.is_connected {
                    continue;
                }
                let Some(paddle) = self.paddles[idx].clone() else {
                    continue;
                };
                if !circle_intersects_paddle(&ball, &paddle) {
                    continue;
                }
                let key = CollisionKey::new(format!("ball:{id}"), format!("paddle:{idx}"));
                if !self.collisions.begin(key) {
                    continue;
                }

                self.deflect_off_paddle(&mut ball, &paddle, idx as u8);
                if ball.owner_index != idx as i8 {
                    self.pending.push(updates::ball_owner_changed(ball.id.clone(), idx as i8));
                }
                ball.owner_index = idx as i8;
                ball.collided = true;
                self.start_phasing(&mut ball).await;
                break 'paddle;
            }
        }

        if !ball.phasing {
            self.detect_brick_collision(&mut ball, &mut reflected_x, &mut reflected_y, power_ups)
                .await;
        }

        self.balls.insert(id.to_string(), ball);
    }

    async fn reflect_once(&self, ball: &mut Ball, axis: Axis, reflected_x: &mut bool, reflected_y: &mut bool) {
        let already = match axis {
            Axis::X => *reflected_x,
            Axis::Y => *reflected_y,
        };
        if already {
            return;
        }
        ball.reflect(axis);
        match axis {
            Axis::X => *reflected_x = true,
            Axis::Y => *reflected_y = true,
        }
        if let Some(actor) = self.ball_refs.get(&ball.id) {
            let _ = actor.send(BallMessage::ReflectVelocity { axis }).await;
        }
    }

    fn deflect_off_paddle(&self, ball: &mut Ball, paddle: &crate::entities::paddle::Paddle, index: u8) {
        let half = paddle.long_axis_extent() / 2.0;
        let ball_pos = match paddle.axis {
            crate::entities::paddle::PaddleAxis::Vertical => ball.y as f64,
            crate::entities::paddle::PaddleAxis::Horizontal => ball.x as f64,
        };
        let offset = ((ball_pos - paddle.position_along_axis()) / half).clamp(-1.0, 1.0);

        let speed_in = ball.speed().max(self.config.min_ball_velocity);
        let (vx, vy) = (ball.vx as f64, ball.vy as f64);
        let (mut new_vx, mut new_vy) = match paddle.axis {
            crate::entities::paddle::PaddleAxis::Vertical => (-vx, vy),
            crate::entities::paddle::PaddleAxis::Horizontal => (vx, -vy),
        };

        let max_angle = PI / self.config.ball_hit_paddle_angle_factor;
        let transverse = speed_in * max_angle.sin() * offset;
        match paddle.axis {
            crate::entities::paddle::PaddleAxis::Vertical => new_vy += transverse,
            crate::entities::paddle::PaddleAxis::Horizontal => new_vx += transverse,
        }

        let magnitude = (new_vx * new_vx + new_vy * new_vy).sqrt();
        let (ux, uy) = if magnitude > 1e-9 {
            (new_vx / magnitude, new_vy / magnitude)
        } else {
            match paddle.axis {
                crate::entities::paddle::PaddleAxis::Vertical => (-vx.signum().max(1.0).copysign(-vx), 0.0),
                crate::entities::paddle::PaddleAxis::Horizontal => (0.0, -vy.signum().max(1.0).copysign(-vy)),
            }
        };

        let mut new_speed = speed_in + paddle.velocity_along_axis() * self.config.ball_hit_paddle_speed_factor;
        if new_speed < self.config.min_ball_velocity {
            new_speed = self.config.min_ball_velocity;
        }

        let final_vx = ux * new_speed;
        let final_vy = uy * new_speed;
        // Rounding each axis independently can drift the resulting speed
        // away from `new_speed`; rescale the rounded pair back onto it.
        let (ivx, ivy) = scale_to_speed(to_int_preserving_sign(final_vx), to_int_preserving_sign(final_vy), new_speed);
        ball.set_velocity(ivx, ivy);
        if let Some(actor) = self.ball_refs.get(&ball.id) {
            let _ = actor.try_send(BallMessage::SetVelocity { vx: ivx, vy: ivy });
        }
        let _ = index;
    }

    async fn detect_brick_collision(
        &mut self,
        ball: &mut Ball,
        reflected_x: &mut bool,
        reflected_y: &mut bool,
        power_ups: &mut Vec<Ball>,
    ) {
        let Some(grid) = &self.grid else { return };
        let n = grid.len();
        let cell = self.canvas.cell_size;
        let r = ball.radius;
        let x = ball.x as f64;
        let y = ball.y as f64;

        let min_col = ((x - r) / cell).floor().max(0.0) as usize;
        let max_col = (((x + r) / cell).floor() as usize).min(n.saturating_sub(1));
        let min_row = ((y - r) / cell).floor().max(0.0) as usize;
        let max_row = (((y + r) / cell).floor() as usize).min(n.saturating_sub(1));

        for row in min_row..=max_row {
            for col in min_col..=max_col {
                let is_brick = self.grid.as_ref().unwrap().cell(row, col).is_brick();
                if !is_brick {
                    continue;
                }

                let key = CollisionKey::new(format!("ball:{}", ball.id), format!("brick:{row}:{col}"));
                if self.collisions.begin(key) {
                    let centre_x = (col as f64 + 0.5) * cell;
                    let centre_y = (row as f64 + 0.5) * cell;
                    let dx = x - centre_x;
                    let dy = y - centre_y;
                    let axis = if dx.abs() >= dy.abs() { Axis::X } else { Axis::Y };
                    self.reflect_once(ball, axis, reflected_x, reflected_y).await;

                    let grid = self.grid.as_mut().unwrap();
                    let level = grid.cell(row, col).level;
                    let destroyed = grid.cell_mut(row, col).hit();
                    if destroyed {
                        let owner = ball.owner_index;
                        if owner >= 0
                            && self
                                .players
                                .get(owner as usize)
                                .and_then(|p| p.as_ref())
                                .map(|p| p.is_connected)
                                .unwrap_or(false)
                        {
                            self.players[owner as usize].as_ref().unwrap().add_score(level as i32);
                            self.pending
                                .push(updates::score_update(self.players[owner as usize].as_ref().unwrap()));
                        }
                        if self.rng.random::<f64>() < self.config.power_up_chance {
                            power_ups.push(ball.clone());
                        }
                    }
                    ball.collided = true;
                    self.start_phasing(ball).await;
                }
                return;
            }
        }
    }

    async fn check_game_over(&mut self) {
        if self.game_over {
            return;
        }
        let Some(grid) = &self.grid else { return };
        if grid.any_brick_remaining() {
            return;
        }
        self.game_over = true;

        let mut best: Option<(u8, i32)> = None;
        let mut tie = false;
        for (i, player) in self.players.iter().enumerate() {
            let Some(player) = player else { continue };
            if !player.is_connected {
                continue;
            }
            let score = player.score();
            match best {
                None => best = Some((i as u8, score)),
                Some((_, best_score)) if score > best_score => {
                    best = Some((i as u8, score));
                    tie = false;
                }
                Some((_, best_score)) if score == best_score => tie = true,
                _ => {}
            }
        }
        let winner_index: i8 = if tie { -1 } else { best.map(|(i, _)| i as i8).unwrap_or(-1) };
        let final_scores: Vec<i32> = (0..self.players.len())
            .map(|i| self.players[i].as_ref().map(|p| p.score()).unwrap_or(0))
            .collect();

        self.flush_pending().await;
        let _ = self
            .broadcaster
            .send(crate::broadcaster::BroadcasterMessage::GameOver {
                winner_index,
                final_scores,
                reason: "grid cleared".to_string(),
                room_id: self.id.clone(),
            })
            .await;
        let _ = self
            .manager
            .send(crate::manager::ManagerMessage::RoomEmpty {
                room_id: self.id.clone(),
            })
            .await;
        self.self_ref.stop().await;
    }
}

fn circle_intersects_paddle(ball: &Ball, paddle: &crate::entities::paddle::Paddle) -> bool {
    let half_w = paddle.width / 2.0;
    let half_h = paddle.height / 2.0;
    let cx = (ball.x as f64).clamp(paddle.x - half_w, paddle.x + half_w);
    let cy = (ball.y as f64).clamp(paddle.y - half_h, paddle.y + half_h);
    let dx = ball.x as f64 - cx;
    let dy = ball.y as f64 - cy;
    dx * dx + dy * dy <= ball.radius * ball.radius
}

fn ball_bounding_box_touches_cell(ball: &Ball, row: usize, col: usize, cell_size: f64) -> bool {
    let centre_x = (col as f64 + 0.5) * cell_size;
    let centre_y = (row as f64 + 0.5) * cell_size;
    let dx = (ball.x as f64 - centre_x).abs();
    let dy = (ball.y as f64 - centre_y).abs();
    dx <= cell_size / 2.0 + ball.radius && dy <= cell_size / 2.0 + ball.radius
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    use crate::actor::{spawn, Actor, Directive};
    use crate::broadcaster::BroadcasterMessage;
    use crate::config::SimulationConfig;
    use crate::connection::test_support::recording_connection;
    use crate::geometry::{BrickData, Grid};
    use crate::manager::ManagerMessage;
    use crate::room::messages::test_support::Sink;
    use protocol::CellKind;

    struct ManagerStub {
        room_empty: std::sync::Arc<AtomicBool>,
    }

    impl Actor for ManagerStub {
        type Message = ManagerMessage;

        async fn handle(&mut self, msg: ManagerMessage) -> Directive {
            if let ManagerMessage::RoomEmpty { .. } = msg {
                self.room_empty.store(true, Ordering::SeqCst);
            }
            Directive::Continue
        }
    }

    fn test_room(config: Arc<SimulationConfig>) -> (RoomActor, std::sync::Arc<AtomicBool>) {
        let room_empty = std::sync::Arc::new(AtomicBool::new(false));
        let (manager_ref, _join) = spawn(
            ManagerStub {
                room_empty: room_empty.clone(),
            },
            8,
        );
        let (self_ref, _join) = spawn(Sink::default(), 8);
        let room = RoomActor::new("room-1".into(), config, manager_ref, self_ref);
        (room, room_empty)
    }

    fn connected_player(room: &mut RoomActor, index: u8) {
        let (connection, _writer) = recording_connection();
        room.connections.insert(connection.id, index);
        room.players[index as usize] = Some(super::super::player::Player::new(index, connection, 0));
    }

    fn sample_ball(id: &str, owner: i8, x: i64, y: i64, vx: i64, vy: i64) -> Ball {
        Ball {
            id: id.into(),
            owner_index: owner,
            x,
            y,
            vx,
            vy,
            radius: 8.0,
            mass: 1.0,
            phasing: false,
            is_permanent: false,
            canvas_size: 800.0,
            collided: false,
        }
    }

    #[tokio::test]
    async fn wall_hit_owned_by_opponent_transfers_score_and_reflects() {
        let (mut room, _room_empty) = test_room(Arc::new(SimulationConfig::default()));
        room.grid = Some(Grid::empty(16));
        connected_player(&mut room, 0); // sits behind the right wall
        connected_player(&mut room, 1); // owns the ball

        room.balls.insert("b1".into(), sample_ball("b1", 1, 795, 400, 10, 0));

        room.physics_tick().await;

        let ball = room.balls.get("b1").expect("a wall bounce reflects, it doesn't remove");
        assert!(ball.collided);
        assert!(ball.vx < 0, "velocity reflected away from the wall");
        assert!(ball.phasing, "a wall bounce starts phasing");
        assert_eq!(room.players[1].as_ref().unwrap().score(), 1);
        assert_eq!(room.players[0].as_ref().unwrap().score(), -1);
    }

    #[tokio::test]
    async fn wall_hit_by_its_own_owner_only_penalises_once() {
        let (mut room, _room_empty) = test_room(Arc::new(SimulationConfig::default()));
        room.grid = Some(Grid::empty(16));
        connected_player(&mut room, 0);

        room.balls.insert("b1".into(), sample_ball("b1", 0, 795, 400, 10, 0));

        room.physics_tick().await;

        assert_eq!(room.players[0].as_ref().unwrap().score(), -1);
    }

    #[tokio::test]
    async fn wall_hit_with_no_connected_owner_removes_the_ball() {
        let (mut room, _room_empty) = test_room(Arc::new(SimulationConfig::default()));
        room.grid = Some(Grid::empty(16));

        room.balls.insert("b1".into(), sample_ball("b1", -1, 795, 400, 10, 0));

        room.physics_tick().await;

        assert!(room.balls.get("b1").is_none());
    }

    #[tokio::test]
    async fn permanent_ball_survives_an_unowned_wall() {
        let (mut room, _room_empty) = test_room(Arc::new(SimulationConfig::default()));
        room.grid = Some(Grid::empty(16));

        let mut ball = sample_ball("b1", -1, 795, 400, 10, 0);
        ball.is_permanent = true;
        room.balls.insert("b1".into(), ball);

        room.physics_tick().await;

        let ball = room.balls.get("b1").expect("permanent balls are never removed by a wall");
        assert!(ball.vx < 0);
    }

    #[tokio::test]
    async fn brick_hit_reflects_and_decrements_life_without_destroying() {
        let (mut room, _room_empty) = test_room(Arc::new(SimulationConfig::default()));
        connected_player(&mut room, 0);

        let mut grid = Grid::empty(16);
        *grid.cell_mut(3, 3) = BrickData {
            kind: CellKind::Brick,
            life: 2,
            level: 2,
        };
        room.grid = Some(grid);
        room.balls.insert("b1".into(), sample_ball("b1", 0, 175, 175, 1, 0));

        room.physics_tick().await;

        let grid = room.grid.as_ref().unwrap();
        assert!(grid.cell(3, 3).is_brick());
        assert_eq!(grid.cell(3, 3).life, 1);
        assert_eq!(room.players[0].as_ref().unwrap().score(), 0, "only destruction scores");
        let ball = room.balls.get("b1").unwrap();
        assert!(ball.collided);
        assert!(ball.vx < 0, "reflected off the dominant axis");
    }

    #[tokio::test]
    async fn brick_destroyed_awards_its_level_as_score() {
        let mut config = SimulationConfig::default();
        config.power_up_chance = 0.0;
        let (mut room, _room_empty) = test_room(Arc::new(config));
        connected_player(&mut room, 0);

        let mut grid = Grid::empty(16);
        *grid.cell_mut(3, 3) = BrickData {
            kind: CellKind::Brick,
            life: 1,
            level: 3,
        };
        room.grid = Some(grid);
        room.balls.insert("b1".into(), sample_ball("b1", 0, 175, 175, 1, 0));

        room.physics_tick().await;

        let grid = room.grid.as_ref().unwrap();
        assert!(!grid.cell(3, 3).is_brick());
        assert_eq!(room.players[0].as_ref().unwrap().score(), 3);
    }

    #[tokio::test]
    async fn game_over_picks_the_highest_connected_score_and_broadcasts() {
        let (mut room, room_empty) = test_room(Arc::new(SimulationConfig::default()));
        room.grid = Some(Grid::empty(16)); // no bricks left
        connected_player(&mut room, 0);
        connected_player(&mut room, 1);
        room.players[0].as_ref().unwrap().add_score(5);
        room.players[1].as_ref().unwrap().add_score(2);

        let (spectator, writer) = recording_connection();
        room.broadcaster
            .send(BroadcasterMessage::AddClient { connection: spectator })
            .await
            .unwrap();

        room.check_game_over().await;
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        assert!(room.game_over);
        assert!(room_empty.load(Ordering::SeqCst));

        let frames = writer.frames.lock().await;
        assert_eq!(frames.len(), 1);
        match &frames[0] {
            protocol::ServerFrame::GameOver { winner_index, final_scores, .. } => {
                assert_eq!(*winner_index, 0);
                assert_eq!(final_scores[0], 5);
                assert_eq!(final_scores[1], 2);
            }
            other => panic!("expected a game-over frame, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn game_over_is_a_tie_when_connected_scores_match() {
        let (mut room, _room_empty) = test_room(Arc::new(SimulationConfig::default()));
        room.grid = Some(Grid::empty(16));
        connected_player(&mut room, 0);
        connected_player(&mut room, 1);
        room.players[0].as_ref().unwrap().add_score(4);
        room.players[1].as_ref().unwrap().add_score(4);

        let (spectator, writer) = recording_connection();
        room.broadcaster
            .send(BroadcasterMessage::AddClient { connection: spectator })
            .await
            .unwrap();

        room.check_game_over().await;
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        let frames = writer.frames.lock().await;
        match &frames[0] {
            protocol::ServerFrame::GameOver { winner_index, .. } => assert_eq!(*winner_index, -1),
            other => panic!("expected a game-over frame, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn a_disconnected_players_wall_no_longer_scores_against_anyone() {
        let (mut room, _room_empty) = test_room(Arc::new(SimulationConfig::default()));
        room.grid = Some(Grid::empty(16));
        connected_player(&mut room, 0);
        room.players[0].as_ref().unwrap().add_score(0);
        room.players[0].as_mut().unwrap().is_connected = false;

        room.balls.insert("b1".into(), sample_ball("b1", -1, 795, 400, 10, 0));

        room.physics_tick().await;

        // wall 0 has nobody connected behind it: a non-permanent ball is removed
        // rather than scoring against a player who already left.
        assert!(room.balls.get("b1").is_none());
        assert_eq!(room.players[0].as_ref().unwrap().score(), 0);
    }
}
