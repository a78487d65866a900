use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

use common::games::gomoku::{Board, OutOfRange, StoneType, check_win};
use common::{ParticipantId, RoomId};

use super::message::{GameMessage, MessageKind, RoomBroadcast};
use super::player::{Participant, Player, Seat, Seats};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveRejection {
    NotPlaying,
    WrongTurn { expected: StoneType, got: StoneType },
    NotSeated,
    CellOccupied,
    OutOfRange(OutOfRange),
}

impl fmt::Display for MoveRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveRejection::NotPlaying => write!(f, "game is not in progress"),
            MoveRejection::WrongTurn { expected, got } => {
                write!(f, "it is {}'s turn, got {}", expected, got)
            }
            MoveRejection::NotSeated => write!(f, "sender does not hold that seat"),
            MoveRejection::CellOccupied => write!(f, "cell is already occupied"),
            MoveRejection::OutOfRange(e) => write!(f, "{}", e),
        }
    }
}

#[derive(Debug)]
pub struct JoinOutcome {
    pub seat: Seat,
    pub broadcasts: Vec<RoomBroadcast>,
}

#[derive(Debug)]
pub struct MoveOutcome {
    pub winner: Option<ParticipantId>,
    pub broadcasts: Vec<RoomBroadcast>,
}

#[derive(Debug)]
pub struct LeaveOutcome {
    pub was_member: bool,
    pub room_empty: bool,
    pub interrupted: bool,
    pub broadcasts: Vec<RoomBroadcast>,
}

/// One game table. Callers serialize access (the registry wraps every room in
/// its own mutex); every operation here is plain synchronous state work and
/// returns the broadcasts it produced instead of sending them.
#[derive(Debug)]
pub struct GameRoom {
    id: RoomId,
    name: String,
    board: Board,
    participants: HashMap<ParticipantId, Player>,
    seats: Seats,
    current_turn: StoneType,
    is_playing: bool,
    winner_id: Option<ParticipantId>,
    closed: bool,
    last_activity: Instant,
}

impl GameRoom {
    pub fn new(id: RoomId, name: String) -> Self {
        Self {
            id,
            name,
            board: Board::new(),
            participants: HashMap::new(),
            seats: Seats::default(),
            current_turn: StoneType::Black,
            is_playing: false,
            winner_id: None,
            closed: false,
            last_activity: Instant::now(),
        }
    }

    pub fn id(&self) -> &RoomId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current_turn(&self) -> StoneType {
        self.current_turn
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn winner_id(&self) -> Option<&ParticipantId> {
        self.winner_id.as_ref()
    }

    pub fn seat_holder(&self, stone: StoneType) -> Option<&ParticipantId> {
        self.seats.holder(stone)
    }

    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// Set once the room has been removed from the registry. Anyone still
    /// holding the room must treat it as gone.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn mark_closed(&mut self) {
        self.closed = true;
    }

    pub fn idle_for(&self) -> Duration {
        self.last_activity.elapsed()
    }

    pub fn join(&mut self, participant: Participant) -> JoinOutcome {
        self.touch();

        let seat = self.seats.assign(&participant.id);
        let notice = GameMessage::new(MessageKind::Join, participant.name.clone(), participant.id.to_string())
            .with_content(format!("{} joined the room.", participant.name))
            .with_stone(seat.stone())
            .with_skin(participant.skin_url.clone());

        self.participants
            .insert(participant.id.clone(), Player { participant, seat });

        JoinOutcome {
            seat,
            broadcasts: vec![RoomBroadcast::chat(notice)],
        }
    }

    pub fn place_stone(
        &mut self,
        participant_id: &ParticipantId,
        row: i32,
        col: i32,
        stone: StoneType,
    ) -> Result<MoveOutcome, MoveRejection> {
        if !self.is_playing {
            return Err(MoveRejection::NotPlaying);
        }
        if stone != self.current_turn {
            return Err(MoveRejection::WrongTurn {
                expected: self.current_turn,
                got: stone,
            });
        }
        if self.seats.holder(stone) != Some(participant_id) {
            return Err(MoveRejection::NotSeated);
        }
        if self.board.get(row, col).map_err(MoveRejection::OutOfRange)?.is_stone() {
            return Err(MoveRejection::CellOccupied);
        }

        self.board
            .set(row, col, stone)
            .map_err(MoveRejection::OutOfRange)?;
        self.touch();

        let (sender, skin_url) = match self.participants.get(participant_id) {
            Some(player) => (player.name().to_string(), player.participant.skin_url.clone()),
            None => (participant_id.to_string(), None),
        };

        let mut broadcasts = vec![RoomBroadcast::moves(
            GameMessage::new(MessageKind::Stone, sender.clone(), participant_id.to_string())
                .with_position(row, col)
                .with_stone(stone)
                .with_skin(skin_url),
        )];

        if check_win(&self.board, row, col, stone) {
            self.is_playing = false;
            self.winner_id = Some(participant_id.clone());
            broadcasts.push(RoomBroadcast::chat(
                GameMessage::system(
                    MessageKind::GameOver,
                    format!("{} wins! Game over.", sender),
                )
                .with_winner(participant_id)
                .with_stone(stone),
            ));
            return Ok(MoveOutcome {
                winner: self.winner_id.clone(),
                broadcasts,
            });
        }

        if let Some(next) = stone.opponent() {
            self.current_turn = next;
        }

        Ok(MoveOutcome {
            winner: None,
            broadcasts,
        })
    }

    pub fn start(&mut self) -> Vec<RoomBroadcast> {
        self.touch();
        self.board.reset();
        self.current_turn = StoneType::Black;
        self.is_playing = true;
        self.winner_id = None;

        vec![RoomBroadcast::chat(GameMessage::system(
            MessageKind::Start,
            "Game started! Black moves first.",
        ))]
    }

    /// `sender_name` names the leave notice when the participant is unknown to the room.
    pub fn leave(&mut self, participant_id: &ParticipantId, sender_name: &str) -> LeaveOutcome {
        self.touch();

        let removed = self.participants.remove(participant_id);
        self.seats.release(participant_id);

        let was_member = removed.is_some();
        let notice = match removed {
            Some(player) => GameMessage::new(MessageKind::Leave, player.name().to_string(), participant_id.to_string())
                .with_content(format!("{} left the room.", player.name()))
                .with_stone(player.seat.stone()),
            None => {
                common::log!(
                    "[room:{}] Leave from unknown participant {} ({})",
                    self.id,
                    participant_id,
                    sender_name
                );
                GameMessage::new(MessageKind::Leave, sender_name, participant_id.to_string())
                    .with_content(format!("{} left the room.", sender_name))
            }
        };
        let mut broadcasts = vec![RoomBroadcast::chat(notice)];

        let room_empty = self.participants.is_empty();
        let mut interrupted = false;
        if !room_empty && self.is_playing && !self.seats.both_filled() {
            self.is_playing = false;
            interrupted = true;
            broadcasts.push(RoomBroadcast::chat(GameMessage::system(
                MessageKind::Interrupted,
                "A player left, so the game was interrupted.",
            )));
        }

        LeaveOutcome {
            was_member,
            room_empty,
            interrupted,
            broadcasts,
        }
    }

    pub fn chat(&mut self, sender: &str, sender_id: &str, content: &str) -> RoomBroadcast {
        self.touch();
        RoomBroadcast::chat(GameMessage::new(MessageKind::Chat, sender, sender_id).with_content(content))
    }

    fn touch(&mut self) {
        self.last_activity = Instant::now();
    }
}
