use serde::{Deserialize, Serialize};

/// Brick/empty-cell discriminator, mirrored on the wire as a plain string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellKind {
    Empty,
    Brick,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerDto {
    pub index: u8,
    pub id: String,
    pub colour: String,
    pub score: i32,
    pub is_connected: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaddleDto {
    pub index: u8,
    pub x: f64,
    pub y: f64,
    pub r3f_x: f64,
    pub r3f_y: f64,
    pub width: f64,
    pub height: f64,
    pub vx: f64,
    pub vy: f64,
    pub is_moving: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BallDto {
    pub id: String,
    pub owner_index: i8,
    pub x: f64,
    pub y: f64,
    pub r3f_x: f64,
    pub r3f_y: f64,
    pub vx: f64,
    pub vy: f64,
    pub radius: f64,
    pub mass: f64,
    pub phasing: bool,
    pub is_permanent: bool,
}

/// One grid cell, in the mapped R3F-centric coordinates the client renders
/// with. `x`/`y` are the cell centre, not the top-left corner.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrickDto {
    pub x: f64,
    pub y: f64,
    pub life: u32,
    #[serde(rename = "type")]
    pub kind: CellKind,
}
