//! Exercises `SimulationConfig::load` against real files on disk: the
//! default-when-absent path and the override-from-JSON path.

use std::io::Write;

use arena_server::config::SimulationConfig;

#[test]
fn load_with_no_path_returns_defaults() {
    let config = SimulationConfig::load(None).unwrap();
    let default = SimulationConfig::default();
    assert_eq!(config.canvas_size, default.canvas_size);
    assert_eq!(config.grid_size, default.grid_size);
}

#[test]
fn load_overrides_only_the_fields_present_in_the_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"canvasSize": 1200.0, "gridSize": 24, "maxPlayers": 2}}"#
    )
    .unwrap();

    let config = SimulationConfig::load(Some(file.path())).unwrap();
    assert_eq!(config.canvas_size, 1200.0);
    assert_eq!(config.grid_size, 24);
    assert_eq!(config.max_players, 2);
    // Everything else falls back to the default.
    assert_eq!(config.ball_radius, SimulationConfig::default().ball_radius);
}

#[test]
fn load_rejects_malformed_json() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{{not valid json").unwrap();

    let result = SimulationConfig::load(Some(file.path()));
    assert!(result.is_err());
}

#[test]
fn load_rejects_a_missing_path() {
    let result = SimulationConfig::load(Some(std::path::Path::new("/no/such/config.json")));
    assert!(result.is_err());
}
