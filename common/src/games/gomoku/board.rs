use std::fmt;

use super::types::StoneType;

pub const BOARD_SIZE: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutOfRange {
    pub row: i32,
    pub col: i32,
}

impl fmt::Display for OutOfRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "position ({}, {}) is outside the {}x{} board",
            self.row, self.col, BOARD_SIZE, BOARD_SIZE
        )
    }
}

impl std::error::Error for OutOfRange {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    cells: [[StoneType; BOARD_SIZE]; BOARD_SIZE],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub fn new() -> Self {
        Self {
            cells: [[StoneType::Empty; BOARD_SIZE]; BOARD_SIZE],
        }
    }

    pub fn get(&self, row: i32, col: i32) -> Result<StoneType, OutOfRange> {
        let (r, c) = Self::index(row, col)?;
        Ok(self.cells[r][c])
    }

    pub fn set(&mut self, row: i32, col: i32, stone: StoneType) -> Result<(), OutOfRange> {
        let (r, c) = Self::index(row, col)?;
        self.cells[r][c] = stone;
        Ok(())
    }

    pub fn reset(&mut self) {
        self.cells = [[StoneType::Empty; BOARD_SIZE]; BOARD_SIZE];
    }

    pub fn stone_count(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|cell| cell.is_stone())
            .count()
    }

    fn index(row: i32, col: i32) -> Result<(usize, usize), OutOfRange> {
        let in_range = |v: i32| usize::try_from(v).ok().filter(|&v| v < BOARD_SIZE);
        match (in_range(row), in_range(col)) {
            (Some(r), Some(c)) => Ok((r, c)),
            _ => Err(OutOfRange { row, col }),
        }
    }
}
