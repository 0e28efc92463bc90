//! The paddle entity. Paddles 0 and 2 slide along Y (they
//! guard the right/left walls); paddles 1 and 3 slide along X (top/bottom
//! walls). Direction strings are axis-agnostic: `"left"` always means the
//! negative direction along whichever axis this paddle slides on.

use protocol::Direction;
use tokio::sync::oneshot;

use crate::actor::{Actor, Directive};
use crate::geometry::Canvas;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaddleAxis {
    Vertical,
    Horizontal,
}

impl PaddleAxis {
    pub fn for_index(index: u8) -> Self {
        match index % 2 {
            0 => PaddleAxis::Vertical,
            _ => PaddleAxis::Horizontal,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Paddle {
    pub index: u8,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub velocity: f64,
    pub direction: Direction,
    pub vx: f64,
    pub vy: f64,
    pub is_moving: bool,
    pub canvas_size: f64,
    pub axis: PaddleAxis,
    /// Per-tick collision latch, mirroring the ball's.
    pub collided: bool,
}

impl Paddle {
    /// Places a freshly-joined paddle at its wall, centred on the
    /// perpendicular axis. Index 0 = right wall, 1 = top, 2 = left,
    /// 3 = bottom — the same order the wall-collision check uses.
    pub fn spawn_at_wall(index: u8, canvas: &Canvas, long_axis_len: f64, thickness: f64) -> Self {
        let axis = PaddleAxis::for_index(index);
        let half_canvas = canvas.size / 2.0;
        let (x, y, width, height) = match index % 4 {
            0 => (canvas.size - thickness / 2.0, half_canvas, thickness, long_axis_len),
            1 => (half_canvas, thickness / 2.0, long_axis_len, thickness),
            2 => (thickness / 2.0, half_canvas, thickness, long_axis_len),
            _ => (half_canvas, canvas.size - thickness / 2.0, long_axis_len, thickness),
        };
        Paddle {
            index,
            x,
            y,
            width,
            height,
            velocity: 0.0,
            direction: Direction::Stop,
            vx: 0.0,
            vy: 0.0,
            is_moving: false,
            canvas_size: canvas.size,
            axis,
            collided: false,
        }
    }

    pub fn set_direction(&mut self, direction: Direction, velocity_magnitude: f64) {
        self.direction = direction;
        self.velocity = velocity_magnitude;
        self.is_moving = direction != Direction::Stop;
        let signed = match direction {
            Direction::Left => -velocity_magnitude,
            Direction::Right => velocity_magnitude,
            Direction::Stop => 0.0,
        };
        match self.axis {
            PaddleAxis::Horizontal => {
                self.vx = signed;
                self.vy = 0.0;
            }
            PaddleAxis::Vertical => {
                self.vx = 0.0;
                self.vy = signed;
            }
        }
    }

    /// The paddle's extent along its sliding axis (used to clamp to the
    /// canvas and to normalise ball hit-offset in deflection).
    pub fn long_axis_extent(&self) -> f64 {
        match self.axis {
            PaddleAxis::Horizontal => self.width,
            PaddleAxis::Vertical => self.height,
        }
    }

    /// Direction-driven kinematics, clamped to the canvas.
    pub fn advance(&mut self) {
        let half = self.long_axis_extent() / 2.0;
        match self.axis {
            PaddleAxis::Horizontal => {
                self.x = (self.x + self.vx).clamp(half, self.canvas_size - half);
            }
            PaddleAxis::Vertical => {
                self.y = (self.y + self.vy).clamp(half, self.canvas_size - half);
            }
        }
    }

    /// The coordinate this paddle moves along, used for hit-offset math.
    pub fn position_along_axis(&self) -> f64 {
        match self.axis {
            PaddleAxis::Horizontal => self.x,
            PaddleAxis::Vertical => self.y,
        }
    }

    /// Velocity along the sliding axis, used for the deflection speed
    /// contribution on ball bounce.
    pub fn velocity_along_axis(&self) -> f64 {
        match self.axis {
            PaddleAxis::Horizontal => self.vx,
            PaddleAxis::Vertical => self.vy,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PaddleSnapshot {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub is_moving: bool,
}

impl From<&Paddle> for PaddleSnapshot {
    fn from(p: &Paddle) -> Self {
        PaddleSnapshot {
            x: p.x,
            y: p.y,
            vx: p.vx,
            vy: p.vy,
            is_moving: p.is_moving,
        }
    }
}

pub enum PaddleMessage {
    SetDirection { direction: Direction },
    Move,
    GetPosition { reply: oneshot::Sender<PaddleSnapshot> },
}

pub struct PaddleActor {
    pub paddle: Paddle,
    pub velocity_magnitude: f64,
    pub report_to_room: Option<crate::actor::ActorRef<crate::room::messages::RoomMessage>>,
}

impl Actor for PaddleActor {
    type Message = PaddleMessage;

    async fn handle(&mut self, msg: PaddleMessage) -> Directive {
        match msg {
            PaddleMessage::SetDirection { direction } => {
                self.paddle.set_direction(direction, self.velocity_magnitude);
                if let Some(room) = &self.report_to_room {
                    let _ = room
                        .send(crate::room::messages::RoomMessage::PaddleStateUpdate {
                            index: self.paddle.index,
                            direction,
                        })
                        .await;
                }
                Directive::Continue
            }
            PaddleMessage::Move => {
                self.paddle.advance();
                Directive::Continue
            }
            PaddleMessage::GetPosition { reply } => {
                let _ = reply.send(PaddleSnapshot::from(&self.paddle));
                Directive::Continue
            }
        }
    }
}
