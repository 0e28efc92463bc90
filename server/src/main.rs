use std::sync::Arc;

use axum::Router;
use axum::extract::ws::WebSocketUpgrade;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use arena_server::actor::{spawn_with, ActorRef};
use arena_server::config::{CliArgs, SimulationConfig};
use arena_server::connection::handle_socket;
use arena_server::error::RoomError;
use arena_server::manager::{ManagerActor, ManagerMessage, RoomSummary};

#[derive(Clone)]
struct AppState {
    manager: ActorRef<ManagerMessage>,
    config: Arc<SimulationConfig>,
}

#[tokio::main]
/// Activates error tracing, parses the CLI/config layers, then sets up the
/// routing system to serve the game websocket and the room listing.
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=info", env!("CARGO_CRATE_NAME")).into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_file(true)
                .with_line_number(true)
                .with_target(true)
                .with_thread_ids(true)
                .with_thread_names(true),
        )
        .init();

    let args = CliArgs::parse();
    let config = match SimulationConfig::load(args.config.as_deref()) {
        Ok(config) => Arc::new(config),
        Err(err) => {
            tracing::error!(%err, "failed to load simulation config");
            panic!("failed to load simulation config: {err}");
        }
    };

    let manager_config = config.clone();
    let (manager, _join) = spawn_with(32, move |self_ref| ManagerActor::new(manager_config, self_ref));

    let state = AppState {
        manager: manager.clone(),
        config,
    };

    let app = Router::new()
        .route("/ws", get(websocket_handler))
        .route("/rooms", get(rooms_handler))
        .route("/healthz", get(healthz_handler))
        .with_state(state);

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    tracing::info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    // Cascades `Stopping` into every room (and each room's paddles, balls,
    // and broadcaster) so sockets close cleanly instead of just dropping.
    manager.stop().await;
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c().await.expect("failed to install SIGINT handler");
    tracing::info!("shutting down");
}

async fn healthz_handler() -> &'static str {
    "ok"
}

/// Lists every live room and its current player count, for operators.
/// Returns `504` if the manager doesn't answer within the configured ask
/// timeout.
async fn rooms_handler(State(state): State<AppState>) -> impl IntoResponse {
    let rooms = state
        .manager
        .ask(|reply| ManagerMessage::GetRoomList { reply }, state.config.ask_timeout())
        .await;

    match rooms {
        Ok(rooms) => (StatusCode::OK, format_rooms(&rooms)),
        Err(ask_err) => {
            let err = RoomError::from(ask_err);
            tracing::warn!(%err, "room manager did not respond");
            (StatusCode::GATEWAY_TIMEOUT, err.to_string())
        }
    }
}

fn format_rooms(rooms: &[RoomSummary]) -> String {
    rooms
        .iter()
        .map(|room| format!("Room: {:<36}  Players: {}", room.room_id, room.player_count))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Upgrades the request to a websocket and hands it to the connection
/// handler, which asks the manager for a room and forwards frames for the
/// rest of the connection's life.
async fn websocket_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    let ask_timeout = state.config.ask_timeout();
    ws.on_upgrade(move |socket| handle_socket(socket, state.manager, ask_timeout))
}
