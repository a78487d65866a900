use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Mutex;

use common::id_generator::generate_room_id;
use common::{RoomId, log};

use crate::room::GameRoom;

pub type SharedRoom = Arc<Mutex<GameRoom>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    pub room_id: String,
    pub room_name: String,
    pub participants: usize,
    pub is_playing: bool,
}

impl RoomSummary {
    fn from_room(room: &GameRoom) -> Self {
        Self {
            room_id: room.id().to_string(),
            room_name: room.name().to_string(),
            participants: room.participant_count(),
            is_playing: room.is_playing(),
        }
    }
}

/// Lock order is room, then registry. Nothing here locks a room while the
/// `rooms` map is held.
#[derive(Debug, Clone, Default)]
pub struct RoomRegistry {
    rooms: Arc<Mutex<HashMap<RoomId, SharedRoom>>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn find(&self, room_id: &RoomId) -> Option<SharedRoom> {
        self.rooms.lock().await.get(room_id).cloned()
    }

    pub async fn create_if_absent(&self, room_id: &RoomId) -> SharedRoom {
        let mut rooms = self.rooms.lock().await;
        rooms
            .entry(room_id.clone())
            .or_insert_with(|| {
                log!("[room:{}] Created on first join", room_id);
                Arc::new(Mutex::new(GameRoom::new(room_id.clone(), room_id.to_string())))
            })
            .clone()
    }

    pub async fn create_named(&self, name: String) -> RoomSummary {
        let mut rooms = self.rooms.lock().await;
        let room_id = loop {
            let candidate = generate_room_id();
            if !rooms.contains_key(&candidate) {
                break candidate;
            }
        };

        let room = GameRoom::new(room_id.clone(), name);
        let summary = RoomSummary::from_room(&room);
        rooms.insert(room_id.clone(), Arc::new(Mutex::new(room)));
        log!("[room:{}] Created with name '{}'", room_id, summary.room_name);
        summary
    }

    /// Removes the entry only if it still points at `room`, so a room that was
    /// re-created under the same id is left alone.
    pub async fn remove(&self, room_id: &RoomId, room: &SharedRoom) -> bool {
        let mut rooms = self.rooms.lock().await;
        match rooms.get(room_id) {
            Some(current) if Arc::ptr_eq(current, room) => {
                rooms.remove(room_id);
                log!("[room:{}] Removed", room_id);
                true
            }
            _ => false,
        }
    }

    pub async fn list(&self) -> Vec<RoomSummary> {
        let snapshot: Vec<SharedRoom> = self.rooms.lock().await.values().cloned().collect();

        let mut summaries = Vec::with_capacity(snapshot.len());
        for shared in snapshot {
            let room = shared.lock().await;
            if !room.is_closed() {
                summaries.push(RoomSummary::from_room(&room));
            }
        }
        summaries.sort_by(|a, b| a.room_name.cmp(&b.room_name).then_with(|| a.room_id.cmp(&b.room_id)));
        summaries
    }

    pub async fn room_count(&self) -> usize {
        self.rooms.lock().await.len()
    }

    /// Drops rooms that have had nobody in them for at least `ttl`.
    pub async fn remove_idle_empty(&self, ttl: Duration) -> Vec<RoomId> {
        let snapshot: Vec<(RoomId, SharedRoom)> = self
            .rooms
            .lock()
            .await
            .iter()
            .map(|(id, room)| (id.clone(), room.clone()))
            .collect();

        let mut removed = Vec::new();
        for (room_id, shared) in snapshot {
            let mut room = shared.lock().await;
            if room.is_closed() || !room.is_empty() || room.idle_for() < ttl {
                continue;
            }
            room.mark_closed();
            if self.remove(&room_id, &shared).await {
                removed.push(room_id);
            }
        }
        removed
    }
}
