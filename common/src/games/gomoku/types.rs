use std::fmt;

use crate::proto;

/// Content of a board cell. `Empty` doubles as the "no seat" value on the wire.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum StoneType {
    #[default]
    Empty,
    Black,
    White,
}

impl StoneType {
    pub fn opponent(&self) -> Option<StoneType> {
        match self {
            StoneType::Black => Some(StoneType::White),
            StoneType::White => Some(StoneType::Black),
            StoneType::Empty => None,
        }
    }

    pub fn is_stone(&self) -> bool {
        *self != StoneType::Empty
    }

    pub fn to_proto(&self) -> i32 {
        let value = match self {
            StoneType::Empty => proto::StoneType::Empty,
            StoneType::Black => proto::StoneType::Black,
            StoneType::White => proto::StoneType::White,
        };
        value.into()
    }

    /// Values outside the known range decode as `Empty`.
    pub fn from_proto(value: i32) -> StoneType {
        match proto::StoneType::try_from(value) {
            Ok(proto::StoneType::Black) => StoneType::Black,
            Ok(proto::StoneType::White) => StoneType::White,
            Ok(proto::StoneType::Empty) | Err(_) => StoneType::Empty,
        }
    }
}

impl fmt::Display for StoneType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StoneType::Empty => "Empty",
            StoneType::Black => "Black",
            StoneType::White => "White",
        };
        write!(f, "{}", name)
    }
}
