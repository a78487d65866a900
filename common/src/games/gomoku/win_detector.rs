use super::board::Board;
use super::types::StoneType;

pub const WIN_LENGTH: usize = 5;

const DIRECTIONS: [(i32, i32); 4] = [(1, 0), (0, 1), (1, 1), (1, -1)];

/// Local check around a freshly placed stone. Only lines through
/// `(row, col)` are inspected, so it must run right after each placement.
pub fn check_win(board: &Board, row: i32, col: i32, stone: StoneType) -> bool {
    if !stone.is_stone() {
        return false;
    }

    DIRECTIONS.iter().any(|&(dr, dc)| {
        let count = 1
            + count_run(board, row, col, dr, dc, stone)
            + count_run(board, row, col, -dr, -dc, stone);
        count >= WIN_LENGTH
    })
}

fn count_run(board: &Board, row: i32, col: i32, dr: i32, dc: i32, stone: StoneType) -> usize {
    (1..WIN_LENGTH as i32)
        .take_while(|&step| board.get(row + dr * step, col + dc * step) == Ok(stone))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_with(stones: &[(i32, i32)], stone: StoneType) -> Board {
        let mut board = Board::new();
        for &(row, col) in stones {
            board.set(row, col, stone).unwrap();
        }
        board
    }

    #[test]
    fn test_five_along_row_wins() {
        let stones = [(7, 7), (7, 8), (7, 9), (7, 10), (7, 11)];
        let board = board_with(&stones, StoneType::Black);
        assert!(check_win(&board, 7, 11, StoneType::Black));
    }

    #[test]
    fn test_five_along_column_wins() {
        let stones = [(2, 4), (3, 4), (4, 4), (5, 4), (6, 4)];
        let board = board_with(&stones, StoneType::White);
        assert!(check_win(&board, 2, 4, StoneType::White));
    }

    #[test]
    fn test_five_on_diagonal_wins() {
        let stones = [(0, 0), (1, 1), (2, 2), (3, 3), (4, 4)];
        let board = board_with(&stones, StoneType::Black);
        assert!(check_win(&board, 2, 2, StoneType::Black));
    }

    #[test]
    fn test_five_on_anti_diagonal_wins() {
        let stones = [(10, 4), (11, 3), (12, 2), (13, 1), (14, 0)];
        let board = board_with(&stones, StoneType::White);
        assert!(check_win(&board, 14, 0, StoneType::White));
    }

    #[test]
    fn test_four_in_a_row_does_not_win() {
        let stones = [(7, 7), (7, 8), (7, 9), (7, 10)];
        let board = board_with(&stones, StoneType::Black);
        assert!(!check_win(&board, 7, 10, StoneType::Black));
    }

    #[test]
    fn test_placement_in_the_middle_joins_two_runs() {
        let stones = [(5, 5), (6, 6), (7, 7), (8, 8), (9, 9)];
        let board = board_with(&stones, StoneType::Black);
        assert!(check_win(&board, 7, 7, StoneType::Black));
    }

    #[test]
    fn test_overline_still_wins() {
        let stones = [(0, 3), (0, 4), (0, 5), (0, 6), (0, 7), (0, 8)];
        let board = board_with(&stones, StoneType::White);
        assert!(check_win(&board, 0, 5, StoneType::White));
    }

    #[test]
    fn test_line_along_board_edge_wins() {
        let stones = [(14, 10), (14, 11), (14, 12), (14, 13), (14, 14)];
        let board = board_with(&stones, StoneType::Black);
        assert!(check_win(&board, 14, 14, StoneType::Black));
    }

    #[test]
    fn test_opponent_stone_breaks_the_line() {
        let mut board = board_with(&[(7, 7), (7, 8), (7, 10), (7, 11)], StoneType::Black);
        board.set(7, 9, StoneType::White).unwrap();
        assert!(!check_win(&board, 7, 11, StoneType::Black));
        assert!(!check_win(&board, 7, 9, StoneType::White));
    }

    #[test]
    fn test_empty_stone_never_wins() {
        let board = Board::new();
        assert!(!check_win(&board, 7, 7, StoneType::Empty));
    }
}
