use serde::{Deserialize, Serialize};

/// The direction a paddle is being driven in. `Stop` also covers the "empty
/// string" and "unknown value" cases from the client frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
    Stop,
}

impl Direction {
    /// Maps the raw key name a client sends (`"ArrowLeft"`, `"ArrowRight"`,
    /// `"Stop"`, or an empty string) onto a [`Direction`]. Anything
    /// unrecognised defaults to `Stop` rather than being rejected.
    pub fn from_client_value(raw: &str) -> Self {
        match raw {
            "ArrowLeft" => Direction::Left,
            "ArrowRight" => Direction::Right,
            _ => Direction::Stop,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Stop => "",
        }
    }
}

impl Default for Direction {
    fn default() -> Self {
        Direction::Stop
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_known_keys() {
        assert_eq!(Direction::from_client_value("ArrowLeft"), Direction::Left);
        assert_eq!(Direction::from_client_value("ArrowRight"), Direction::Right);
    }

    #[test]
    fn unknown_and_empty_default_to_stop() {
        assert_eq!(Direction::from_client_value(""), Direction::Stop);
        assert_eq!(Direction::from_client_value("Stop"), Direction::Stop);
        assert_eq!(Direction::from_client_value("banana"), Direction::Stop);
    }
}
