pub mod ball;
pub mod paddle;

pub use ball::{Axis, Ball, BallActor, BallMessage, BallSnapshot};
pub use paddle::{Paddle, PaddleActor, PaddleAxis, PaddleMessage, PaddleSnapshot};
