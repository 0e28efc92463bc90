//! Wire types shared between the simulation server and its websocket
//! clients. Every frame is JSON, one frame per logical message. Frames
//! carry their own `serde` discriminator field so the wire format is
//! plain JSON rather than a tagged binary encoding.

mod direction;
mod dto;
mod frames;

pub use direction::Direction;
pub use dto::{BallDto, BrickDto, CellKind, PaddleDto, PlayerDto};
pub use frames::{ClientFrame, ServerFrame, UpdateItem};
