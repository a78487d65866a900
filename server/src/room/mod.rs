mod game_room;
mod message;
mod player;

pub use game_room::{GameRoom, MoveRejection};
pub use message::{GameMessage, MessageKind, RoomBroadcast, RoomChannel};
pub use player::{Participant, Seat};
