use rand::Rng;
use rand::distr::Alphanumeric;

use crate::{ConnectionId, RoomId};

const ROOM_CODE_LENGTH: usize = 8;

pub fn generate_room_id() -> RoomId {
    let code: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(ROOM_CODE_LENGTH)
        .map(char::from)
        .collect();
    RoomId::new(code.to_lowercase())
}

pub fn generate_connection_id() -> ConnectionId {
    let value: u64 = rand::rng().random();
    ConnectionId::new(format!("conn_{:016x}", value))
}
