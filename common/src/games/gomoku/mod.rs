mod board;
mod types;
mod win_detector;

pub use board::{BOARD_SIZE, Board, OutOfRange};
pub use types::StoneType;
pub use win_detector::{WIN_LENGTH, check_win};
