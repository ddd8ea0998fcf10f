use std::fmt;

use crate::board::{Board, Color, Piece, Square};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

const ORTHOGONAL: [(i8, i8); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
const DIAGONAL: [(i8, i8); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];
#[rustfmt::skip]
const KING_STEPS: [(i8, i8); 8] = [
    (-1, -1), (-1, 0), (-1, 1),
    (0, -1),           (0, 1),
    (1, -1),  (1, 0),  (1, 1),
];
#[rustfmt::skip]
const KNIGHT_JUMPS: [(i8, i8); 8] = [
    (-2, -1), (-2, 1), (-1, -2), (-1, 2),
    (1, -2), (1, 2), (2, -1), (2, 1),
];

/// A pseudo-legal move: geometry and capture rules are respected, king
/// safety is not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub piece: Piece,
    pub color: Color,
    pub captured_piece: Option<Piece>,
}

impl Move {
    pub fn new(from: Square, to: Square, piece: Piece, color: Color) -> Self {
        Self {
            from,
            to,
            piece,
            color,
            captured_piece: None,
        }
    }

    pub fn is_capture(&self) -> bool {
        self.captured_piece.is_some()
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct MoveGenerator;

impl MoveGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Destination squares for `piece` standing on `square`.
    ///
    /// Returns nothing when the square is off the board, the square is
    /// empty, or no piece is given.
    pub fn generate_moves(
        &self,
        board: &Board,
        square: Square,
        piece: Option<(Piece, Color)>,
    ) -> Vec<Square> {
        let mut targets = Vec::new();
        let Some((piece, color)) = piece else {
            return targets;
        };
        if board.get_piece_at(square).is_none() {
            return targets;
        }

        match piece {
            Piece::Pawn => self.pawn_moves(board, square, color, &mut targets),
            Piece::Knight => self.step_moves(board, square, color, &KNIGHT_JUMPS, &mut targets),
            Piece::Bishop => self.slide_moves(board, square, color, &DIAGONAL, &mut targets),
            Piece::Rook => self.slide_moves(board, square, color, &ORTHOGONAL, &mut targets),
            Piece::Queen => {
                self.slide_moves(board, square, color, &ORTHOGONAL, &mut targets);
                self.slide_moves(board, square, color, &DIAGONAL, &mut targets);
            }
            Piece::King => self.step_moves(board, square, color, &KING_STEPS, &mut targets),
        }
        targets
    }

    /// Every pseudo-legal move for `color`, scanning squares row by row
    /// from the top-left corner.
    pub fn generate_all_moves(&self, board: &Board, color: Color) -> Vec<Move> {
        let mut moves = Vec::new();
        for (from, piece, c) in board.pieces() {
            if c != color {
                continue;
            }
            for to in self.generate_moves(board, from, Some((piece, c))) {
                let mut mv = Move::new(from, to, piece, c);
                mv.captured_piece = board.get_piece_at(to).map(|(captured, _)| captured);
                moves.push(mv);
            }
        }
        moves
    }

    fn pawn_moves(&self, board: &Board, square: Square, color: Color, targets: &mut Vec<Square>) {
        let dir = color.forward();

        if let Some(one) = square.offset(dir, 0) {
            if board.get_piece_at(one).is_none() {
                targets.push(one);
                if square.row == color.pawn_start_row() {
                    if let Some(two) = square.offset(2 * dir, 0) {
                        if board.get_piece_at(two).is_none() {
                            targets.push(two);
                        }
                    }
                }
            }
        }

        for dc in [-1, 1] {
            if let Some(diag) = square.offset(dir, dc) {
                if matches!(board.get_piece_at(diag), Some((_, c)) if c != color) {
                    targets.push(diag);
                }
            }
        }
    }

    fn slide_moves(
        &self,
        board: &Board,
        square: Square,
        color: Color,
        directions: &[(i8, i8)],
        targets: &mut Vec<Square>,
    ) {
        for &(dr, dc) in directions {
            let mut current = square;
            while let Some(next) = current.offset(dr, dc) {
                match board.get_piece_at(next) {
                    None => targets.push(next),
                    Some((_, c)) => {
                        if c != color {
                            targets.push(next);
                        }
                        break;
                    }
                }
                current = next;
            }
        }
    }

    fn step_moves(
        &self,
        board: &Board,
        square: Square,
        color: Color,
        offsets: &[(i8, i8)],
        targets: &mut Vec<Square>,
    ) {
        for &(dr, dc) in offsets {
            if let Some(target) = square.offset(dr, dc) {
                match board.get_piece_at(target) {
                    Some((_, c)) if c == color => {}
                    _ => targets.push(target),
                }
            }
        }
    }
}
