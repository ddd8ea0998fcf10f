use crate::board::{Board, Color, Piece};

pub type PieceSquareTable = [[i32; 8]; 8];

/// Material plus piece-square evaluation, scored from White's side.
///
/// Tables are laid out the way the board is drawn: row 0 is Black's back
/// rank. White pieces read them directly, Black pieces read them with the
/// row mirrored, so both colors share one notion of a good square.
#[derive(Debug, Clone)]
pub struct Evaluator {
    pub pawn_value: i32,
    pub knight_value: i32,
    pub bishop_value: i32,
    pub rook_value: i32,
    pub queen_value: i32,
    pub king_value: i32,

    pub pawn_position_bonus: PieceSquareTable,
    pub knight_position_bonus: PieceSquareTable,
    pub bishop_position_bonus: PieceSquareTable,
    pub rook_position_bonus: PieceSquareTable,
    pub queen_position_bonus: PieceSquareTable,
    pub king_position_bonus: PieceSquareTable,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Self {
            pawn_value: 100,
            knight_value: 320,
            bishop_value: 330,
            rook_value: 500,
            queen_value: 900,
            king_value: 20000,

            // Advance, and hold the center
            pawn_position_bonus: [
                [0, 0, 0, 0, 0, 0, 0, 0],
                [50, 50, 50, 50, 50, 50, 50, 50],
                [10, 10, 20, 30, 30, 20, 10, 10],
                [5, 5, 10, 25, 25, 10, 5, 5],
                [0, 0, 0, 20, 20, 0, 0, 0],
                [5, -5, -10, 0, 0, -10, -5, 5],
                [5, 10, 10, -20, -20, 10, 10, 5],
                [0, 0, 0, 0, 0, 0, 0, 0],
            ],

            knight_position_bonus: [
                [-50, -40, -30, -30, -30, -30, -40, -50],
                [-40, -20, 0, 0, 0, 0, -20, -40],
                [-30, 0, 10, 15, 15, 10, 0, -30],
                [-30, 5, 15, 20, 20, 15, 5, -30],
                [-30, 0, 15, 20, 20, 15, 0, -30],
                [-30, 5, 10, 15, 15, 10, 5, -30],
                [-40, -20, 0, 5, 5, 0, -20, -40],
                [-50, -40, -30, -30, -30, -30, -40, -50],
            ],

            bishop_position_bonus: [
                [-20, -10, -10, -10, -10, -10, -10, -20],
                [-10, 0, 0, 0, 0, 0, 0, -10],
                [-10, 0, 5, 10, 10, 5, 0, -10],
                [-10, 5, 5, 10, 10, 5, 5, -10],
                [-10, 0, 10, 10, 10, 10, 0, -10],
                [-10, 10, 10, 10, 10, 10, 10, -10],
                [-10, 5, 0, 0, 0, 0, 5, -10],
                [-20, -10, -10, -10, -10, -10, -10, -20],
            ],

            // Seventh rank, and central files on the home rank
            rook_position_bonus: [
                [0, 0, 0, 0, 0, 0, 0, 0],
                [5, 10, 10, 10, 10, 10, 10, 5],
                [-5, 0, 0, 0, 0, 0, 0, -5],
                [-5, 0, 0, 0, 0, 0, 0, -5],
                [-5, 0, 0, 0, 0, 0, 0, -5],
                [-5, 0, 0, 0, 0, 0, 0, -5],
                [-5, 0, 0, 0, 0, 0, 0, -5],
                [0, 0, 0, 5, 5, 0, 0, 0],
            ],

            queen_position_bonus: [
                [-20, -10, -10, -5, -5, -10, -10, -20],
                [-10, 0, 0, 0, 0, 0, 0, -10],
                [-10, 0, 5, 5, 5, 5, 0, -10],
                [-5, 0, 5, 5, 5, 5, 0, -5],
                [0, 0, 5, 5, 5, 5, 0, -5],
                [-10, 5, 5, 5, 5, 5, 0, -10],
                [-10, 0, 5, 0, 0, 0, 0, -10],
                [-20, -10, -10, -5, -5, -10, -10, -20],
            ],

            // Stay home behind the pawns
            king_position_bonus: [
                [-30, -40, -40, -50, -50, -40, -40, -30],
                [-30, -40, -40, -50, -50, -40, -40, -30],
                [-30, -40, -40, -50, -50, -40, -40, -30],
                [-30, -40, -40, -50, -50, -40, -40, -30],
                [-20, -30, -30, -40, -40, -30, -30, -20],
                [-10, -20, -20, -20, -20, -20, -20, -10],
                [20, 20, 0, 0, 0, 0, 20, 20],
                [20, 30, 10, 0, 0, 10, 30, 20],
            ],
        }
    }

    /// Positive scores favour White, negative favour Black.
    pub fn evaluate(&self, board: &Board) -> i32 {
        board
            .pieces()
            .map(|(square, piece, color)| {
                let row = match color {
                    Color::White => square.row as usize,
                    Color::Black => 7 - square.row as usize,
                };
                let value = self.get_piece_value(piece, row, square.col as usize);
                match color {
                    Color::White => value,
                    Color::Black => -value,
                }
            })
            .sum()
    }

    pub fn material_value(&self, piece: Piece) -> i32 {
        match piece {
            Piece::Pawn => self.pawn_value,
            Piece::Knight => self.knight_value,
            Piece::Bishop => self.bishop_value,
            Piece::Rook => self.rook_value,
            Piece::Queen => self.queen_value,
            Piece::King => self.king_value,
        }
    }

    fn position_table(&self, piece: Piece) -> &PieceSquareTable {
        match piece {
            Piece::Pawn => &self.pawn_position_bonus,
            Piece::Knight => &self.knight_position_bonus,
            Piece::Bishop => &self.bishop_position_bonus,
            Piece::Rook => &self.rook_position_bonus,
            Piece::Queen => &self.queen_position_bonus,
            Piece::King => &self.king_position_bonus,
        }
    }

    /// `row` is already in White's frame of reference.
    fn get_piece_value(&self, piece: Piece, row: usize, col: usize) -> i32 {
        self.material_value(piece) + self.position_table(piece)[row][col]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Square;
    use crate::movegen::Move;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    #[test]
    fn test_initial_position_is_balanced() {
        assert_eq!(Evaluator::new().evaluate(&Board::new()), 0);
    }

    #[test]
    fn test_empty_board_is_zero() {
        assert_eq!(Evaluator::new().evaluate(&Board::empty()), 0);
    }

    #[test]
    fn test_material_advantage() {
        let evaluator = Evaluator::new();
        let mut board = Board::new();
        board.set_piece_at(sq("d8"), None);
        assert_eq!(evaluator.evaluate(&board), 900 - 5);

        let mut board = Board::new();
        board.set_piece_at(sq("a2"), None);
        assert!(evaluator.evaluate(&board) < 0);
    }

    #[test]
    fn test_mirrored_tables() {
        let evaluator = Evaluator::new();
        let white = Board::empty().with_piece(sq("e4"), Piece::Knight, Color::White);
        let black = Board::empty().with_piece(sq("e5"), Piece::Knight, Color::Black);
        assert_eq!(evaluator.evaluate(&white), 320 + 20);
        assert_eq!(evaluator.evaluate(&black), -(320 + 20));

        let both = white.with_piece(sq("e5"), Piece::Knight, Color::Black);
        assert_eq!(evaluator.evaluate(&both), 0);
    }

    #[test]
    fn test_advanced_pawn_is_rewarded() {
        let evaluator = Evaluator::new();
        let home = Board::empty().with_piece(sq("e2"), Piece::Pawn, Color::White);
        let advanced = Board::empty().with_piece(sq("e7"), Piece::Pawn, Color::White);
        assert!(evaluator.evaluate(&advanced) > evaluator.evaluate(&home));

        let black_advanced = Board::empty().with_piece(sq("e2"), Piece::Pawn, Color::Black);
        assert_eq!(evaluator.evaluate(&black_advanced), -evaluator.evaluate(&advanced));
    }

    #[test]
    fn test_opening_pawn_push_improves_score() {
        let evaluator = Evaluator::new();
        let board = Board::new();
        let after = board.apply_move(&Move::new(sq("e2"), sq("e4"), Piece::Pawn, Color::White));
        assert_eq!(evaluator.evaluate(&after), 40);
    }
}
