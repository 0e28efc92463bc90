//! Runtime configuration: CLI flags layered over a JSON config file,
//! a `GameConfig.json`-style file plus CLI bootstrap generalized to the
//! full simulation option table.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Parser)]
#[command(name = "arena-server", about = "Brick-breaker arena simulation server")]
pub struct CliArgs {
    /// Address to bind the HTTP/websocket listener on.
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Port to bind the HTTP/websocket listener on.
    #[arg(long, default_value_t = 8080)]
    pub port: u16,

    /// Path to a JSON file overriding the default simulation config.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Every recognised simulation configuration option. Values not present
/// in a loaded config file fall back to [`SimulationConfig::default`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimulationConfig {
    pub canvas_size: f64,
    pub grid_size: u32,
    pub max_players: u8,
    pub max_rooms: usize,
    pub game_tick_period_ms: u64,
    pub broadcast_rate_hz: f64,
    pub initial_score: i32,

    pub paddle_velocity: f64,
    pub paddle_width: f64,
    pub paddle_height: f64,

    pub ball_radius: f64,
    pub min_ball_velocity: f64,
    pub max_ball_velocity: f64,
    pub ball_hit_paddle_angle_factor: f64,
    pub ball_hit_paddle_speed_factor: f64,
    pub ball_phasing_time_ms: u64,

    pub power_up_chance: f64,
    pub power_up_spawn_ball_expiry_secs: f64,
    pub power_up_increase_vel_ratio: f64,
    pub power_up_increase_mass_add: f64,
    pub power_up_increase_mass_size: f64,

    pub grid_fill_density: f64,
    pub grid_clear_center_radius: f64,
    pub grid_clear_wall_distance: f64,
    pub grid_brick_min_life: u32,
    pub grid_brick_max_life: u32,

    /// Timeout for room-manager/room `ask` calls made from HTTP handlers.
    pub ask_timeout_ms: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            canvas_size: 800.0,
            grid_size: 16,
            max_players: 4,
            max_rooms: 64,
            game_tick_period_ms: 16,
            broadcast_rate_hz: 20.0,
            initial_score: 0,

            paddle_velocity: 6.0,
            paddle_width: 96.0,
            paddle_height: 16.0,

            ball_radius: 8.0,
            min_ball_velocity: 3.0,
            max_ball_velocity: 12.0,
            ball_hit_paddle_angle_factor: 3.0,
            ball_hit_paddle_speed_factor: 0.2,
            ball_phasing_time_ms: 400,

            power_up_chance: 0.1,
            power_up_spawn_ball_expiry_secs: 12.0,
            power_up_increase_vel_ratio: 1.2,
            power_up_increase_mass_add: 1.0,
            power_up_increase_mass_size: 0.5,

            grid_fill_density: 0.55,
            grid_clear_center_radius: 2.5,
            grid_clear_wall_distance: 1.0,
            grid_brick_min_life: 1,
            grid_brick_max_life: 3,

            ask_timeout_ms: 500,
        }
    }
}

impl SimulationConfig {
    pub fn cell_size(&self) -> f64 {
        self.canvas_size / self.grid_size as f64
    }

    pub fn game_tick_period(&self) -> Duration {
        Duration::from_millis(self.game_tick_period_ms)
    }

    pub fn broadcast_period(&self) -> Duration {
        // Never faster than the physics tick.
        let broadcast_ms = (1000.0 / self.broadcast_rate_hz.max(0.001)) as u64;
        Duration::from_millis(broadcast_ms.max(self.game_tick_period_ms))
    }

    pub fn ball_phasing_time(&self) -> Duration {
        Duration::from_millis(self.ball_phasing_time_ms)
    }

    pub fn ask_timeout(&self) -> Duration {
        Duration::from_millis(self.ask_timeout_ms)
    }

    pub fn load(path: Option<&std::path::Path>) -> Result<Self, crate::error::ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path)
            .map_err(|e| crate::error::ConfigError::Read(path.to_path_buf(), e.to_string()))?;
        serde_json::from_str(&raw)
            .map_err(|e| crate::error::ConfigError::Parse(path.to_path_buf(), e.to_string()))
    }
}
