//! Error kinds that cross actor/HTTP boundaries. These describe error
//! *kinds*, not wire formats — errors never reach a client except via a
//! `gameOver` frame or by the connection simply being closed.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {0}: {1}")]
    Read(PathBuf, String),
    #[error("failed to parse config file {0}: {1}")]
    Parse(PathBuf, String),
}

/// Errors observable by the connection handler / HTTP layer when talking
/// to the room manager or a room actor.
#[derive(Debug, Error)]
pub enum RoomError {
    #[error("no room available")]
    NoRoomAvailable,
    #[error("request to actor timed out")]
    AskTimeout,
    #[error("actor is no longer running")]
    ActorGone,
}

impl From<crate::actor::AskError> for RoomError {
    fn from(value: crate::actor::AskError) -> Self {
        match value {
            crate::actor::AskError::Timeout => RoomError::AskTimeout,
            crate::actor::AskError::MailboxClosed => RoomError::ActorGone,
        }
    }
}

impl From<crate::actor::SendError> for RoomError {
    fn from(_: crate::actor::SendError) -> Self {
        RoomError::ActorGone
    }
}
