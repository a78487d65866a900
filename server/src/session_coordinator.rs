use std::fmt;

use common::games::gomoku::StoneType;
use common::{ParticipantId, RoomId, log};

use crate::broadcaster::RoomBroadcaster;
use crate::room::{MoveRejection, Participant, RoomBroadcast, Seat};
use crate::room_registry::{RoomRegistry, SharedRoom};

/// Why an inbound event was dropped. Nothing is reported back to the sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    RoomNotFound,
    IllegalMove(MoveRejection),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::RoomNotFound => write!(f, "room not found"),
            Rejection::IllegalMove(reason) => write!(f, "illegal move: {}", reason),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveResult {
    Placed,
    Won,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveResult {
    Left { interrupted: bool },
    RoomClosed,
}

/// Routes inbound room events to the owning `GameRoom`. Each call holds the
/// room's lock from the first read until its broadcasts are queued, so the
/// messages of one room go out in commit order.
#[derive(Debug, Clone)]
pub struct SessionCoordinator<B: RoomBroadcaster> {
    registry: RoomRegistry,
    broadcaster: B,
    auto_create_rooms: bool,
}

impl<B: RoomBroadcaster> SessionCoordinator<B> {
    pub fn new(registry: RoomRegistry, broadcaster: B, auto_create_rooms: bool) -> Self {
        Self {
            registry,
            broadcaster,
            auto_create_rooms,
        }
    }

    pub fn registry(&self) -> &RoomRegistry {
        &self.registry
    }

    pub async fn join(&self, room_id: &RoomId, participant: Participant) -> Result<Seat, Rejection> {
        loop {
            let shared = if self.auto_create_rooms {
                self.registry.create_if_absent(room_id).await
            } else {
                self.resolve(room_id).await?
            };

            let mut room = shared.lock().await;
            if room.is_closed() {
                // Emptied and removed while we waited for the lock.
                if self.auto_create_rooms {
                    continue;
                }
                return Err(Rejection::RoomNotFound);
            }

            let participant_id = participant.id.clone();
            let outcome = room.join(participant);
            log!("[room:{}] {} joined as {:?}", room_id, participant_id, outcome.seat);
            self.publish_all(room_id, outcome.broadcasts).await;
            return Ok(outcome.seat);
        }
    }

    pub async fn place_stone(
        &self,
        room_id: &RoomId,
        participant_id: &ParticipantId,
        row: i32,
        col: i32,
        stone: StoneType,
    ) -> Result<MoveResult, Rejection> {
        let shared = self.resolve(room_id).await?;
        let mut room = shared.lock().await;
        if room.is_closed() {
            return Err(Rejection::RoomNotFound);
        }

        let outcome = room
            .place_stone(participant_id, row, col, stone)
            .map_err(Rejection::IllegalMove)?;
        self.publish_all(room_id, outcome.broadcasts).await;

        if let Some(winner) = outcome.winner {
            log!("[room:{}] {} won with {} at ({}, {})", room_id, winner, stone, row, col);
            return Ok(MoveResult::Won);
        }

        log!(
            "[room:{}] {} placed {} at ({}, {}), {} stones on board, {} to move",
            room_id,
            participant_id,
            stone,
            row,
            col,
            room.board().stone_count(),
            room.current_turn()
        );
        Ok(MoveResult::Placed)
    }

    pub async fn chat(
        &self,
        room_id: &RoomId,
        sender: &str,
        sender_id: &str,
        content: &str,
    ) -> Result<(), Rejection> {
        let shared = self.resolve(room_id).await?;
        let mut room = shared.lock().await;
        if room.is_closed() {
            return Err(Rejection::RoomNotFound);
        }

        let broadcast = room.chat(sender, sender_id, content);
        self.broadcaster.publish(room_id.clone(), broadcast).await;
        Ok(())
    }

    pub async fn start(&self, room_id: &RoomId) -> Result<(), Rejection> {
        let shared = self.resolve(room_id).await?;
        let mut room = shared.lock().await;
        if room.is_closed() {
            return Err(Rejection::RoomNotFound);
        }

        let broadcasts = room.start();
        log!("[room:{}] Game started", room_id);
        self.publish_all(room_id, broadcasts).await;
        Ok(())
    }

    pub async fn leave(
        &self,
        room_id: &RoomId,
        participant_id: &ParticipantId,
        sender_name: &str,
    ) -> Result<LeaveResult, Rejection> {
        let shared = self.resolve(room_id).await?;
        let mut room = shared.lock().await;
        if room.is_closed() {
            return Err(Rejection::RoomNotFound);
        }

        let outcome = room.leave(participant_id, sender_name);
        if outcome.was_member {
            log!("[room:{}] {} left", room_id, participant_id);
        }
        self.publish_all(room_id, outcome.broadcasts).await;

        if outcome.room_empty {
            room.mark_closed();
            self.registry.remove(room_id, &shared).await;
            return Ok(LeaveResult::RoomClosed);
        }

        if outcome.interrupted {
            log!(
                "[room:{}] Game interrupted (black: {:?}, white: {:?})",
                room_id,
                room.seat_holder(StoneType::Black),
                room.seat_holder(StoneType::White)
            );
        }
        Ok(LeaveResult::Left {
            interrupted: outcome.interrupted,
        })
    }

    async fn resolve(&self, room_id: &RoomId) -> Result<SharedRoom, Rejection> {
        self.registry
            .find(room_id)
            .await
            .ok_or(Rejection::RoomNotFound)
    }

    async fn publish_all(&self, room_id: &RoomId, broadcasts: Vec<RoomBroadcast>) {
        for broadcast in broadcasts {
            self.broadcaster.publish(room_id.clone(), broadcast).await;
        }
    }
}
