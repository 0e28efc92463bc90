//! The room actor: the authoritative cache for one game world, its
//! physics tick, its join/disconnect sequences, and its update stream.

pub mod messages;
pub mod player;
pub mod updates;

mod physics;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;
use tokio::task::JoinHandle;

use crate::actor::{Actor, ActorRef, Directive, SystemMessage, spawn, spawn_with, DEFAULT_MAILBOX_SIZE};
use crate::broadcaster::{BroadcasterActor, BroadcasterMessage};
use crate::collision::CollisionTracker;
use crate::config::SimulationConfig;
use crate::connection::ConnectionHandle;
use crate::entities::ball::{Ball, BallActor, BallMessage};
use crate::entities::paddle::{Paddle, PaddleActor, PaddleMessage};
use crate::geometry::{Canvas, Grid};
use crate::manager::ManagerMessage;

use self::messages::RoomMessage;
use self::player::Player;
use self::updates::PendingUpdates;

const PLAYER_SLOTS: usize = 4;

/// One room's authoritative state. Everything here is touched only from
/// inside this actor's own `handle`/tick methods, owned solely by the
/// room actor and never shared.
pub struct RoomActor {
    id: String,
    config: Arc<SimulationConfig>,
    manager: ActorRef<ManagerMessage>,
    self_ref: ActorRef<RoomMessage>,
    broadcaster: ActorRef<BroadcasterMessage>,

    canvas: Canvas,
    grid: Option<Grid>,

    players: Vec<Option<Player>>,
    connections: HashMap<crate::connection::ConnectionId, u8>,

    paddles: Vec<Option<Paddle>>,
    paddle_refs: HashMap<u8, ActorRef<PaddleMessage>>,

    balls: HashMap<String, Ball>,
    ball_refs: HashMap<String, ActorRef<BallMessage>>,
    expiry_timers: HashMap<String, JoinHandle<()>>,
    phasing_timers: HashMap<String, JoinHandle<()>>,

    collisions: CollisionTracker,
    pending: PendingUpdates,
    rng: StdRng,
    game_over: bool,
    tickers: Option<(JoinHandle<()>, JoinHandle<()>)>,
}

impl RoomActor {
    pub fn new(
        id: String,
        config: Arc<SimulationConfig>,
        manager: ActorRef<ManagerMessage>,
        self_ref: ActorRef<RoomMessage>,
    ) -> Self {
        let canvas = Canvas::from_config(&config);
        let (broadcaster, _join) = spawn(BroadcasterActor::new(self_ref.clone()), DEFAULT_MAILBOX_SIZE);
        RoomActor {
            id,
            config,
            manager,
            self_ref,
            broadcaster,
            canvas,
            grid: None,
            players: (0..PLAYER_SLOTS).map(|_| None).collect(),
            connections: HashMap::new(),
            paddles: (0..PLAYER_SLOTS).map(|_| None).collect(),
            paddle_refs: HashMap::new(),
            balls: HashMap::new(),
            ball_refs: HashMap::new(),
            expiry_timers: HashMap::new(),
            phasing_timers: HashMap::new(),
            collisions: CollisionTracker::new(),
            pending: PendingUpdates::default(),
            rng: StdRng::from_os_rng(),
            game_over: false,
            tickers: None,
        }
    }

    fn start_tickers_if_needed(&mut self) {
        if self.tickers.is_some() {
            return;
        }
        let tick_period = self.config.game_tick_period();
        let broadcast_period = self.config.broadcast_period();

        let game_tick_ref = self.self_ref.clone();
        let game_tick_task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick_period);
            loop {
                interval.tick().await;
                if game_tick_ref.send(RoomMessage::GameTick).await.is_err() {
                    break;
                }
            }
        });

        let broadcast_tick_ref = self.self_ref.clone();
        let broadcast_tick_task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(broadcast_period);
            loop {
                interval.tick().await;
                if broadcast_tick_ref.send(RoomMessage::BroadcastTick).await.is_err() {
                    break;
                }
            }
        });

        self.tickers = Some((game_tick_task, broadcast_tick_task));
    }

    fn stop_tickers(&mut self) {
        if let Some((game_tick, broadcast_tick)) = self.tickers.take() {
            game_tick.abort();
            broadcast_tick.abort();
        }
    }

    fn next_free_slot(&self) -> Option<u8> {
        self.players.iter().position(|p| p.is_none()).map(|i| i as u8)
    }

    async fn assign_player(&mut self, connection: ConnectionHandle) {
        if self.connections.contains_key(&connection.id) {
            return;
        }
        let Some(index) = self.next_free_slot() else {
            connection.close().await;
            return;
        };

        if self.grid.is_none() {
            self.grid = Some(Grid::fill_symmetrical(self.config.grid_size, self.config.as_ref(), &mut self.rng));
            self.start_tickers_if_needed();
        }

        let player = Player::new(index, connection.clone(), self.config.initial_score);

        let long_axis_len = self.config.paddle_width;
        let thickness = self.config.paddle_height;
        let canvas = self.canvas;
        let spawned_paddle = Paddle::spawn_at_wall(index, &canvas, long_axis_len, thickness);

        self.connections.insert(connection.id, index);

        let _ = self
            .broadcaster
            .send(BroadcasterMessage::AddClient {
                connection: connection.clone(),
            })
            .await;

        let self_ref = self.self_ref.clone();
        let velocity_magnitude = self.config.paddle_velocity;
        let paddle_for_actor = spawned_paddle.clone();
        let (paddle_ref, _join) = spawn_with(DEFAULT_MAILBOX_SIZE, move |_ref| PaddleActor {
            paddle: paddle_for_actor,
            velocity_magnitude,
            report_to_room: Some(self_ref),
        });
        self.paddle_refs.insert(index, paddle_ref);
        self.paddles[index as usize] = Some(spawned_paddle.clone());
        self.players[index as usize] = Some(player);

        let assignment = protocol::ServerFrame::PlayerAssignment { player_index: index };
        if connection.send_frame(assignment).await.is_err() {
            self.disconnect(connection).await;
            return;
        }

        let initial = protocol::ServerFrame::InitialPlayersAndBallsState {
            players: self.players.iter().flatten().map(updates::player_dto).collect(),
            paddles: self
                .paddles
                .iter()
                .flatten()
                .map(|p| updates::paddle_dto(p, &self.canvas))
                .collect(),
            balls: self.balls.values().map(|b| updates::ball_dto(b, &self.canvas)).collect(),
        };
        if connection.send_frame(initial).await.is_err() {
            self.disconnect(connection).await;
            return;
        }

        self.pending.push(updates::player_joined(
            self.players[index as usize].as_ref().unwrap(),
            &spawned_paddle,
            &self.canvas,
        ));

        let canvas_size = self.canvas.size;
        self.spawn_ball(
            index as i8,
            canvas_size / 2.0,
            canvas_size / 2.0,
            None,
            true,
            false,
        )
        .await;
    }

    async fn disconnect(&mut self, connection: ConnectionHandle) {
        let Some(index) = self.connections.remove(&connection.id) else {
            return;
        };
        let Some(player) = self.players[index as usize].as_mut() else {
            return;
        };
        if !player.is_connected {
            return;
        }
        player.is_connected = false;

        if let Some(paddle_ref) = self.paddle_refs.remove(&index) {
            paddle_ref.stop().await;
        }
        self.paddles[index as usize] = None;
        self.collisions.forget_object(&format!("paddle:{index}"));

        let owned: Vec<String> = self
            .balls
            .iter()
            .filter(|(_, b)| b.owner_index == index as i8)
            .map(|(id, _)| id.clone())
            .collect();
        let remaining_after_exclusion = self.balls.len() - owned.len();

        let mut rescued: Option<String> = None;
        if remaining_after_exclusion == 0 && !owned.is_empty() {
            let preferred = owned
                .iter()
                .find(|id| self.balls.get(*id).map(|b| b.is_permanent).unwrap_or(false))
                .cloned();
            rescued = Some(preferred.unwrap_or_else(|| owned[0].clone()));
        }

        for id in &owned {
            if Some(id.clone()) == rescued {
                if let Some(ball) = self.balls.get_mut(id) {
                    ball.owner_index = -1;
                    ball.is_permanent = true;
                }
                self.pending.push(updates::ball_owner_changed(id.clone(), -1));
                continue;
            }
            self.remove_ball(id, true).await;
        }

        // Queued after every ball-disposition update above: a `playerLeft`
        // must always be preceded by the `ballRemoved`/`ballOwnerChanged`
        // updates for the balls that player owned.
        self.pending.push(updates::player_left(index));

        self.connections.retain(|_, i| *i != index);
        let _ = self
            .broadcaster
            .send(BroadcasterMessage::RemoveClient { connection })
            .await;

        let any_connected = self
            .players
            .iter()
            .flatten()
            .any(|p| p.is_connected);
        if !any_connected && !self.game_over {
            let _ = self
                .manager
                .send(ManagerMessage::RoomEmpty { room_id: self.id.clone() })
                .await;
        }
    }

    async fn flush_pending(&mut self) {
        if self.grid.is_some() {
            let grid = self.grid.as_ref().unwrap();
            self.pending.push(updates::full_grid_update(grid, &self.canvas));
        }
        if self.pending.is_empty() {
            return;
        }
        let batch = self.pending.drain();
        let _ = self.broadcaster.send(BroadcasterMessage::BroadcastUpdates { batch }).await;
    }

    pub(crate) async fn remove_ball(&mut self, id: &str, push_update: bool) {
        if let Some(handle) = self.expiry_timers.remove(id) {
            handle.abort();
        }
        if let Some(handle) = self.phasing_timers.remove(id) {
            handle.abort();
        }
        if let Some(actor) = self.ball_refs.remove(id) {
            actor.stop().await;
        }
        self.balls.remove(id);
        self.collisions.forget_object(&format!("ball:{id}"));
        if push_update {
            self.pending.push(updates::ball_removed(id));
        }
    }

    pub(crate) async fn spawn_ball(
        &mut self,
        owner_index: i8,
        x: f64,
        y: f64,
        expire_in: Option<Duration>,
        is_permanent: bool,
        set_initial_phasing: bool,
    ) {
        let id = uuid::Uuid::new_v4().to_string();
        let (vx, vy) = random_unit_velocity(&mut self.rng, self.config.min_ball_velocity);
        let mut ball = Ball {
            id: id.clone(),
            owner_index,
            x: x.round() as i64,
            y: y.round() as i64,
            vx,
            vy,
            radius: self.config.ball_radius,
            mass: 1.0,
            phasing: set_initial_phasing,
            is_permanent,
            canvas_size: self.canvas.size,
            collided: false,
        };

        let self_ref = self.self_ref.clone();
        let (ball_ref, _join) = spawn(
            BallActor {
                ball: ball.clone(),
                report_to_room: Some(self_ref),
            },
            DEFAULT_MAILBOX_SIZE,
        );
        self.ball_refs.insert(id.clone(), ball_ref);

        if let Some(duration) = expire_in {
            let timer_ref = self.self_ref.clone();
            let ball_id = id.clone();
            let handle = tokio::spawn(async move {
                tokio::time::sleep(duration).await;
                let _ = timer_ref.send(RoomMessage::DestroyExpiredBall { ball_id }).await;
            });
            self.expiry_timers.insert(id.clone(), handle);
        }

        if set_initial_phasing {
            self.arm_phasing_timer(&id);
        }

        self.pending.push(updates::ball_spawned(&ball, &self.canvas));
        self.balls.insert(id, ball);
    }

    fn arm_phasing_timer(&mut self, ball_id: &str) {
        if let Some(old) = self.phasing_timers.remove(ball_id) {
            old.abort();
        }
        let duration = self.config.ball_phasing_time();
        let timer_ref = self.self_ref.clone();
        let id = ball_id.to_string();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            let _ = timer_ref.send(RoomMessage::StopPhasingTimer { ball_id: id }).await;
        });
        self.phasing_timers.insert(ball_id.to_string(), handle);
    }

    async fn start_phasing(&mut self, ball: &mut Ball) {
        ball.phasing = true;
        if let Some(actor) = self.ball_refs.get(&ball.id) {
            let _ = actor.try_send(BallMessage::SetPhasing);
        }
        self.arm_phasing_timer(&ball.id);
    }

    async fn apply_power_up(&mut self, snapshot: Ball) {
        let choice = self.rng.random_range(0..3u8);
        match choice {
            0 => {
                let owner_connected = snapshot.owner_index >= 0
                    && self
                        .players
                        .get(snapshot.owner_index as usize)
                        .and_then(|p| p.as_ref())
                        .map(|p| p.is_connected)
                        .unwrap_or(false);
                if owner_connected {
                    let jitter = self.rng.random_range(-2.0..=2.0);
                    let expire_secs = (self.config.power_up_spawn_ball_expiry_secs + jitter).max(0.5);
                    self.spawn_ball(
                        snapshot.owner_index,
                        snapshot.x as f64,
                        snapshot.y as f64,
                        Some(Duration::from_secs_f64(expire_secs)),
                        false,
                        true,
                    )
                    .await;
                }
            }
            1 => {
                if let Some(actor) = self.ball_refs.get(&snapshot.id) {
                    let _ = actor.try_send(BallMessage::IncreaseMass {
                        additional: self.config.power_up_increase_mass_add,
                        power_up_mass_size: self.config.power_up_increase_mass_size,
                    });
                }
            }
            _ => {
                if let Some(ball) = self.balls.get_mut(&snapshot.id) {
                    ball.increase_velocity(self.config.power_up_increase_vel_ratio);
                }
                if let Some(actor) = self.ball_refs.get(&snapshot.id) {
                    let _ = actor.try_send(BallMessage::IncreaseVelocity {
                        ratio: self.config.power_up_increase_vel_ratio,
                    });
                }
            }
        }
    }
}

fn random_unit_velocity(rng: &mut impl rand::Rng, min_speed: f64) -> (i64, i64) {
    let angle = rng.random_range(0.0..std::f64::consts::TAU);
    let vx = crate::vecmath::to_int_preserving_sign(angle.cos() * min_speed);
    let vy = crate::vecmath::to_int_preserving_sign(angle.sin() * min_speed);
    (vx, vy)
}


impl Actor for RoomActor {
    type Message = RoomMessage;

    async fn on_system(&mut self, msg: SystemMessage) {
        if let SystemMessage::Stopping = msg {
            self.stop_tickers();
            for (_, handle) in self.expiry_timers.drain() {
                handle.abort();
            }
            for (_, handle) in self.phasing_timers.drain() {
                handle.abort();
            }
            for (_, actor) in self.ball_refs.drain() {
                actor.stop().await;
            }
            for (_, actor) in self.paddle_refs.drain() {
                actor.stop().await;
            }
            self.broadcaster.stop().await;
        }
    }

    async fn handle(&mut self, msg: RoomMessage) -> Directive {
        match msg {
            RoomMessage::AssignPlayer { connection } => {
                self.assign_player(connection).await;
                Directive::Continue
            }
            RoomMessage::PlayerDisconnect { connection } => {
                self.disconnect(connection).await;
                Directive::Continue
            }
            RoomMessage::ForwardedPaddleDirection { connection, direction } => {
                if let Some(index) = self.connections.get(&connection.id).copied() {
                    if let Some(paddle_ref) = self.paddle_refs.get(&index) {
                        let _ = paddle_ref.send(PaddleMessage::SetDirection { direction }).await;
                    }
                }
                Directive::Continue
            }
            RoomMessage::SpawnBall {
                owner_index,
                x,
                y,
                expire_in,
                is_permanent,
                set_initial_phasing,
            } => {
                self.spawn_ball(owner_index, x as f64, y as f64, expire_in, is_permanent, set_initial_phasing)
                    .await;
                Directive::Continue
            }
            RoomMessage::DestroyExpiredBall { ball_id } => {
                if !self.balls.get(&ball_id).map(|b| b.is_permanent).unwrap_or(true) {
                    self.remove_ball(&ball_id, true).await;
                }
                Directive::Continue
            }
            RoomMessage::StopPhasingTimer { ball_id } => {
                self.phasing_timers.remove(&ball_id);
                if let Some(ball) = self.balls.get_mut(&ball_id) {
                    ball.phasing = false;
                }
                Directive::Continue
            }
            RoomMessage::GameTick => {
                self.physics_tick().await;
                Directive::Continue
            }
            RoomMessage::BroadcastTick => {
                self.flush_pending().await;
                Directive::Continue
            }
            RoomMessage::PaddleStateUpdate { index, direction } => {
                if let Some(paddle) = self.paddles.get_mut(index as usize).and_then(|p| p.as_mut()) {
                    let velocity_magnitude = self.config.paddle_velocity;
                    paddle.set_direction(direction, velocity_magnitude);
                }
                Directive::Continue
            }
            RoomMessage::BallStateUpdate { id, radius, mass } => {
                if let Some(ball) = self.balls.get_mut(&id) {
                    ball.radius = radius;
                    ball.mass = mass;
                }
                Directive::Continue
            }
        }
    }
}
