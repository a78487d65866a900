use common::ParticipantId;
use common::games::gomoku::StoneType;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Seat {
    Black,
    White,
    Spectator,
}

impl Seat {
    /// Spectators map to `Empty`, which is also how they appear on the wire.
    pub fn stone(&self) -> StoneType {
        match self {
            Seat::Black => StoneType::Black,
            Seat::White => StoneType::White,
            Seat::Spectator => StoneType::Empty,
        }
    }
}

/// Identity carried by an inbound join event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    pub skin_url: Option<String>,
}

impl Participant {
    pub fn new(id: impl Into<ParticipantId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            skin_url: None,
        }
    }

    pub fn with_skin(mut self, skin_url: impl Into<String>) -> Self {
        self.skin_url = Some(skin_url.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct Player {
    pub participant: Participant,
    pub seat: Seat,
}

impl Player {
    pub fn name(&self) -> &str {
        &self.participant.name
    }
}

/// Black/White seat references. These only name participants; the room's
/// participant map owns the players.
#[derive(Debug, Default, Clone)]
pub struct Seats {
    black: Option<ParticipantId>,
    white: Option<ParticipantId>,
}

impl Seats {
    /// First come, first served. A participant that already holds a seat keeps it.
    pub fn assign(&mut self, id: &ParticipantId) -> Seat {
        let current = self.seat_of(id);
        if current != Seat::Spectator {
            return current;
        }

        if self.black.is_none() {
            self.black = Some(id.clone());
            Seat::Black
        } else if self.white.is_none() {
            self.white = Some(id.clone());
            Seat::White
        } else {
            Seat::Spectator
        }
    }

    pub fn release(&mut self, id: &ParticipantId) -> Option<Seat> {
        if self.black.as_ref() == Some(id) {
            self.black = None;
            Some(Seat::Black)
        } else if self.white.as_ref() == Some(id) {
            self.white = None;
            Some(Seat::White)
        } else {
            None
        }
    }

    pub fn seat_of(&self, id: &ParticipantId) -> Seat {
        if self.black.as_ref() == Some(id) {
            Seat::Black
        } else if self.white.as_ref() == Some(id) {
            Seat::White
        } else {
            Seat::Spectator
        }
    }

    pub fn holder(&self, stone: StoneType) -> Option<&ParticipantId> {
        match stone {
            StoneType::Black => self.black.as_ref(),
            StoneType::White => self.white.as_ref(),
            StoneType::Empty => None,
        }
    }

    pub fn both_filled(&self) -> bool {
        self.black.is_some() && self.white.is_some()
    }
}
