//! The ball entity. Position and velocity are integers so
//! that the Euler step used for movement is bit-for-bit reproducible
//! across the room's own cache and this actor's mirrored copy of it.

use tokio::sync::oneshot;

use crate::actor::{Actor, Directive};
use crate::vecmath::{speed_i, to_int_preserving_sign};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Authoritative-shaped ball state. The room keeps its own copy of this
/// struct for synchronous physics; the ball actor keeps another copy so it
/// can answer `GetPosition` asks without round-tripping through the room.
#[derive(Debug, Clone, PartialEq)]
pub struct Ball {
    pub id: String,
    pub owner_index: i8,
    pub x: i64,
    pub y: i64,
    pub vx: i64,
    pub vy: i64,
    pub radius: f64,
    pub mass: f64,
    pub phasing: bool,
    pub is_permanent: bool,
    pub canvas_size: f64,
    /// Per-tick latch: has this ball already reflected on X/Y this tick?
    /// Owned by the room's cache, not replicated to the actor.
    pub collided: bool,
}

impl Ball {
    pub fn speed(&self) -> f64 {
        speed_i(self.vx, self.vy)
    }

    /// `x += vx; y += vy` — the integer Euler step for ball movement.
    pub fn advance(&mut self) {
        self.x += self.vx;
        self.y += self.vy;
    }

    pub fn reflect(&mut self, axis: Axis) {
        match axis {
            Axis::X => self.vx = -self.vx,
            Axis::Y => self.vy = -self.vy,
        }
    }

    pub fn set_velocity(&mut self, vx: i64, vy: i64) {
        self.vx = vx;
        self.vy = vy;
    }

    pub fn increase_velocity(&mut self, ratio: f64) {
        let new_vx = to_int_preserving_sign(self.vx as f64 * ratio);
        let new_vy = to_int_preserving_sign(self.vy as f64 * ratio);
        self.vx = new_vx;
        self.vy = new_vy;
    }

    pub fn increase_mass(&mut self, additional: f64, power_up_mass_size: f64) {
        self.mass += additional;
        self.radius += additional * power_up_mass_size;
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BallSnapshot {
    pub x: i64,
    pub y: i64,
    pub vx: i64,
    pub vy: i64,
    pub radius: f64,
    pub mass: f64,
    pub phasing: bool,
}

impl From<&Ball> for BallSnapshot {
    fn from(b: &Ball) -> Self {
        BallSnapshot {
            x: b.x,
            y: b.y,
            vx: b.vx,
            vy: b.vy,
            radius: b.radius,
            mass: b.mass,
            phasing: b.phasing,
        }
    }
}

pub enum BallMessage {
    UpdatePosition,
    SetVelocity { vx: i64, vy: i64 },
    ReflectVelocity { axis: Axis },
    SetPhasing,
    IncreaseVelocity { ratio: f64 },
    IncreaseMass { additional: f64, power_up_mass_size: f64 },
    Destroy,
    GetPosition { reply: oneshot::Sender<BallSnapshot> },
}

pub struct BallActor {
    pub ball: Ball,
    pub report_to_room: Option<crate::actor::ActorRef<crate::room::messages::RoomMessage>>,
}

impl BallActor {
    async fn report_mass_and_radius(&self) {
        if let Some(room) = &self.report_to_room {
            let _ = room
                .send(crate::room::messages::RoomMessage::BallStateUpdate {
                    id: self.ball.id.clone(),
                    radius: self.ball.radius,
                    mass: self.ball.mass,
                })
                .await;
        }
    }
}

impl Actor for BallActor {
    type Message = BallMessage;

    async fn handle(&mut self, msg: BallMessage) -> Directive {
        match msg {
            BallMessage::UpdatePosition => {
                self.ball.advance();
                Directive::Continue
            }
            BallMessage::SetVelocity { vx, vy } => {
                self.ball.set_velocity(vx, vy);
                Directive::Continue
            }
            BallMessage::ReflectVelocity { axis } => {
                self.ball.reflect(axis);
                Directive::Continue
            }
            BallMessage::SetPhasing => {
                self.ball.phasing = true;
                Directive::Continue
            }
            BallMessage::IncreaseVelocity { ratio } => {
                self.ball.increase_velocity(ratio);
                Directive::Continue
            }
            BallMessage::IncreaseMass {
                additional,
                power_up_mass_size,
            } => {
                self.ball.increase_mass(additional, power_up_mass_size);
                self.report_mass_and_radius().await;
                Directive::Continue
            }
            BallMessage::Destroy => Directive::Stop,
            BallMessage::GetPosition { reply } => {
                let _ = reply.send(BallSnapshot::from(&self.ball));
                Directive::Continue
            }
        }
    }
}
