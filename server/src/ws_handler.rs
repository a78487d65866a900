use std::collections::HashMap;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use prost::Message as ProstMessage;
use tokio::sync::mpsc;

use common::games::gomoku::StoneType;
use common::id_generator::generate_connection_id;
use common::proto::{ClientMessage, ServerMessage, client_message};
use common::{ConnectionId, ParticipantId, RoomId, log};

use crate::broadcaster::ChannelBroadcaster;
use crate::room::{Participant, RoomChannel};
use crate::session_coordinator::SessionCoordinator;
use crate::web_server::WebServerState;

/// Participants that joined a room over one connection, keyed by room and id,
/// with the display name they joined under.
type JoinedParticipants = HashMap<(RoomId, ParticipantId), String>;

pub async fn handle_websocket(socket: WebSocket, state: WebServerState) {
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let (tx, mut rx) = mpsc::channel::<ServerMessage>(state.outbound_queue_capacity);

    let connection_id = generate_connection_id();
    state.broadcaster.register(connection_id.clone(), tx).await;
    log!("[ws:{}] Connected", connection_id);

    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let buf = msg.encode_to_vec();
            if ws_sender.send(Message::Binary(buf.into())).await.is_err() {
                break;
            }
        }
    });

    let coordinator = state.coordinator;
    let broadcaster = state.broadcaster;
    let mut joined = JoinedParticipants::new();

    while let Some(result) = ws_receiver.next().await {
        let data = match result {
            Ok(Message::Binary(data)) => data,
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                log!("[ws:{}] WebSocket error: {}", connection_id, e);
                break;
            }
        };

        let client_message = match ClientMessage::decode(data.as_ref()) {
            Ok(m) => m,
            Err(e) => {
                log!("[ws:{}] Failed to decode ClientMessage: {}", connection_id, e);
                continue;
            }
        };

        if client_message.room_id.is_empty() {
            log!("[ws:{}] Ignoring message without room id", connection_id);
            continue;
        }
        let room_id = RoomId::new(client_message.room_id);

        let Some(message) = client_message.message else {
            continue;
        };

        handle_client_message(
            &coordinator,
            &broadcaster,
            &connection_id,
            &mut joined,
            room_id,
            message,
        )
        .await;
    }

    log!("[ws:{}] Connection ended", connection_id);
    handle_disconnect(&coordinator, &broadcaster, &connection_id, joined).await;
    send_task.abort();
}

async fn handle_client_message(
    coordinator: &SessionCoordinator<ChannelBroadcaster>,
    broadcaster: &ChannelBroadcaster,
    connection_id: &ConnectionId,
    joined: &mut JoinedParticipants,
    room_id: RoomId,
    message: client_message::Message,
) {
    match message {
        client_message::Message::Join(req) => {
            if req.sender_id.is_empty() {
                log!("[ws:{}] Join without sender id for room {}", connection_id, room_id);
                return;
            }

            // Subscribe first so the joiner sees its own seat assignment.
            broadcaster.subscribe(&room_id, connection_id).await;

            let participant_id = ParticipantId::new(req.sender_id);
            let mut participant = Participant::new(participant_id.clone(), req.sender.clone());
            if !req.skin_url.is_empty() {
                participant = participant.with_skin(req.skin_url);
            }

            match coordinator.join(&room_id, participant).await {
                Ok(_) => {
                    joined.insert((room_id.clone(), participant_id), req.sender);
                    let listeners = broadcaster.subscriber_count(&room_id, RoomChannel::Chat).await;
                    log!("[ws:{}] Subscribed to {} ({} listeners)", connection_id, room_id, listeners);
                }
                Err(e) => {
                    log!("[ws:{}] Join to {} dropped: {}", connection_id, room_id, e);
                    unsubscribe_if_unused(broadcaster, connection_id, joined, &room_id).await;
                }
            }
        }
        client_message::Message::PlaceStone(req) => {
            let participant_id = ParticipantId::new(req.sender_id);
            let stone = StoneType::from_proto(req.stone_type);
            if let Err(e) = coordinator
                .place_stone(&room_id, &participant_id, req.row, req.col, stone)
                .await
            {
                log!(
                    "[room:{}] Move by {} at ({}, {}) dropped: {}",
                    room_id,
                    participant_id,
                    req.row,
                    req.col,
                    e
                );
            }
        }
        client_message::Message::Chat(req) => {
            if let Err(e) = coordinator
                .chat(&room_id, &req.sender, &req.sender_id, &req.content)
                .await
            {
                log!("[room:{}] Chat from {} dropped: {}", room_id, req.sender_id, e);
            }
        }
        client_message::Message::Start(_) => {
            if let Err(e) = coordinator.start(&room_id).await {
                log!("[room:{}] Start dropped: {}", room_id, e);
            }
        }
        client_message::Message::Leave(req) => {
            let participant_id = ParticipantId::new(req.sender_id);
            if let Err(e) = coordinator.leave(&room_id, &participant_id, &req.sender).await {
                log!("[room:{}] Leave from {} dropped: {}", room_id, participant_id, e);
            }
            joined.remove(&(room_id.clone(), participant_id));
            unsubscribe_if_unused(broadcaster, connection_id, joined, &room_id).await;
        }
    }
}

async fn unsubscribe_if_unused(
    broadcaster: &ChannelBroadcaster,
    connection_id: &ConnectionId,
    joined: &JoinedParticipants,
    room_id: &RoomId,
) {
    if !joined.keys().any(|(joined_room, _)| joined_room == room_id) {
        broadcaster.unsubscribe(room_id, connection_id).await;
    }
}

async fn handle_disconnect(
    coordinator: &SessionCoordinator<ChannelBroadcaster>,
    broadcaster: &ChannelBroadcaster,
    connection_id: &ConnectionId,
    joined: JoinedParticipants,
) {
    broadcaster.unregister(connection_id).await;

    for ((room_id, participant_id), name) in joined {
        log!("[ws:{}] Leaving {} as {} on disconnect", connection_id, room_id, participant_id);
        if let Err(e) = coordinator.leave(&room_id, &participant_id, &name).await {
            log!("[room:{}] Disconnect leave for {} dropped: {}", room_id, participant_id, e);
        }
    }
}
