use std::future::Future;
use std::path::PathBuf;

use axum::{
    Json, Router,
    extract::{Query, State, WebSocketUpgrade},
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
};

use common::log;

use crate::broadcaster::ChannelBroadcaster;
use crate::room_registry::RoomSummary;
use crate::session_coordinator::SessionCoordinator;
use crate::ws_handler::handle_websocket;

#[derive(Clone)]
pub struct WebServerState {
    pub coordinator: SessionCoordinator<ChannelBroadcaster>,
    pub broadcaster: ChannelBroadcaster,
    pub outbound_queue_capacity: usize,
}

#[derive(Debug, Deserialize)]
struct CreateRoomParams {
    name: String,
}

pub fn build_router(state: WebServerState, static_files_path: Option<PathBuf>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut app = Router::new()
        .route("/ws", get(ws_upgrade_handler))
        .route("/api/rooms", get(list_rooms_handler).post(create_room_handler));

    if let Some(path) = static_files_path {
        app = app.nest_service("/ui", ServeDir::new(path));
    }

    app.layer(cors).with_state(state)
}

pub async fn run_web_server(
    state: WebServerState,
    listen_address: &str,
    static_files_path: Option<PathBuf>,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let app = build_router(state, static_files_path);

    let listener = tokio::net::TcpListener::bind(listen_address).await?;
    log!("Web server listening on {}", listen_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
}

async fn ws_upgrade_handler(
    ws: WebSocketUpgrade,
    State(state): State<WebServerState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_websocket(socket, state))
}

async fn list_rooms_handler(State(state): State<WebServerState>) -> Json<Vec<RoomSummary>> {
    Json(state.coordinator.registry().list().await)
}

async fn create_room_handler(
    State(state): State<WebServerState>,
    Query(params): Query<CreateRoomParams>,
) -> Json<RoomSummary> {
    let name = params.name.trim();
    let name = if name.is_empty() { "Gomoku" } else { name };
    Json(state.coordinator.registry().create_named(name.to_string()).await)
}
