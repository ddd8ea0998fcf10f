use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::movegen::Move;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(rename_all = "lowercase"))]
pub enum Piece {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl Piece {
    /// FEN letter, uppercase for White.
    pub fn to_char(self, color: Color) -> char {
        let c = match self {
            Piece::Pawn => 'p',
            Piece::Knight => 'n',
            Piece::Bishop => 'b',
            Piece::Rook => 'r',
            Piece::Queen => 'q',
            Piece::King => 'k',
        };
        match color {
            Color::White => c.to_ascii_uppercase(),
            Color::Black => c,
        }
    }

    pub fn from_char(c: char) -> Option<(Piece, Color)> {
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        let piece = match c.to_ascii_lowercase() {
            'p' => Piece::Pawn,
            'n' => Piece::Knight,
            'b' => Piece::Bishop,
            'r' => Piece::Rook,
            'q' => Piece::Queen,
            'k' => Piece::King,
            _ => return None,
        };
        Some((piece, color))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(rename_all = "lowercase"))]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opposite(&self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Row delta of a pawn step for this side.
    pub fn forward(&self) -> i8 {
        match self {
            Color::White => -1,
            Color::Black => 1,
        }
    }

    pub fn pawn_start_row(&self) -> i8 {
        match self {
            Color::White => 6,
            Color::Black => 1,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Color::White => write!(f, "white"),
            Color::Black => write!(f, "black"),
        }
    }
}

/// A board coordinate. Row 0 is Black's back rank, row 7 is White's.
///
/// Coordinates are signed so that off-board squares can be expressed and
/// rejected instead of wrapping around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Square {
    pub row: i8,
    pub col: i8,
}

impl Square {
    pub const fn new(row: i8, col: i8) -> Self {
        Self { row, col }
    }

    pub fn is_on_board(&self) -> bool {
        (0..8).contains(&self.row) && (0..8).contains(&self.col)
    }

    /// The square `(dr, dc)` away, or `None` if that leaves the board.
    pub fn offset(&self, dr: i8, dc: i8) -> Option<Square> {
        let target = Square::new(self.row.checked_add(dr)?, self.col.checked_add(dc)?);
        target.is_on_board().then_some(target)
    }

    /// Parses `"a8"` style notation; `a8` is row 0, column 0.
    pub fn from_algebraic(s: &str) -> Option<Square> {
        let mut chars = s.chars();
        let file = chars.next()?;
        let rank = chars.next()?;
        if chars.next().is_some() || !('a'..='h').contains(&file) || !('1'..='8').contains(&rank) {
            return None;
        }
        let col = (file as u8 - b'a') as i8;
        let row = 8 - (rank as u8 - b'0') as i8;
        Some(Square::new(row, col))
    }

    pub fn all() -> impl Iterator<Item = Square> {
        (0..8).flat_map(|row| (0..8).map(move |col| Square::new(row, col)))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if !self.is_on_board() {
            return write!(f, "({},{})", self.row, self.col);
        }
        let file = (b'a' + self.col as u8) as char;
        let rank = 8 - self.row;
        write!(f, "{}{}", file, rank)
    }
}

impl FromStr for Square {
    type Err = FenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Square::from_algebraic(s).ok_or_else(|| FenError::InvalidSquare(s.to_string()))
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error("{0} king is missing")]
    MissingKing(Color),
    #[error("{color} has {count} kings")]
    TooManyKings { color: Color, count: usize },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FenError {
    #[error("empty fen")]
    Empty,
    #[error("expected 8 ranks, found {0}")]
    RankCount(usize),
    #[error("rank {rank} describes {files} files")]
    FileCount { rank: usize, files: usize },
    #[error("invalid piece character '{0}'")]
    InvalidPiece(char),
    #[error("invalid side to move '{0}'")]
    InvalidSide(String),
    #[error("invalid square '{0}'")]
    InvalidSquare(String),
}

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w - - 0 1";

/// One occupied square in the flat `(row, col, piece, color)` encoding.
pub type Placement = (i8, i8, Piece, Color);

/// An 8x8 grid of optional pieces. Boards are plain values: applying a
/// move returns a new board and never touches the original.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(into = "Vec<Placement>", try_from = "Vec<Placement>")
)]
pub struct Board {
    squares: [[Option<(Piece, Color)>; 8]; 8],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// The standard starting position.
    pub fn new() -> Self {
        const BACK_RANK: [Piece; 8] = [
            Piece::Rook,
            Piece::Knight,
            Piece::Bishop,
            Piece::Queen,
            Piece::King,
            Piece::Bishop,
            Piece::Knight,
            Piece::Rook,
        ];

        let mut board = Self::empty();
        for (col, &piece) in BACK_RANK.iter().enumerate() {
            board.squares[0][col] = Some((piece, Color::Black));
            board.squares[1][col] = Some((Piece::Pawn, Color::Black));
            board.squares[6][col] = Some((Piece::Pawn, Color::White));
            board.squares[7][col] = Some((piece, Color::White));
        }
        board
    }

    pub fn empty() -> Self {
        Self {
            squares: [[None; 8]; 8],
        }
    }

    pub fn get_piece_at(&self, square: Square) -> Option<(Piece, Color)> {
        if !square.is_on_board() {
            return None;
        }
        self.squares[square.row as usize][square.col as usize]
    }

    /// Puts `piece` on `square`, replacing whatever was there. Off-board
    /// squares are ignored.
    pub fn set_piece_at(&mut self, square: Square, piece: Option<(Piece, Color)>) {
        if square.is_on_board() {
            self.squares[square.row as usize][square.col as usize] = piece;
        }
    }

    /// Builder form of [`Board::set_piece_at`].
    pub fn with_piece(mut self, square: Square, piece: Piece, color: Color) -> Self {
        self.set_piece_at(square, Some((piece, color)));
        self
    }

    /// Moves whatever stands on `mv.from` to `mv.to`, capturing anything
    /// there. No legality check is made; an empty origin empties the
    /// destination.
    pub fn apply_move(&self, mv: &Move) -> Board {
        let mut next = *self;
        next.set_piece_at(mv.to, self.get_piece_at(mv.from));
        next.set_piece_at(mv.from, None);
        next
    }

    /// Occupied squares in row-major order.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece, Color)> + '_ {
        Square::all().filter_map(move |sq| {
            self.get_piece_at(sq)
                .map(|(piece, color)| (sq, piece, color))
        })
    }

    pub fn placements(&self) -> Vec<Placement> {
        self.pieces()
            .map(|(sq, piece, color)| (sq.row, sq.col, piece, color))
            .collect()
    }

    pub fn from_placements(placements: &[Placement]) -> Result<Self, FenError> {
        let mut board = Self::empty();
        for &(row, col, piece, color) in placements {
            let square = Square::new(row, col);
            if !square.is_on_board() {
                return Err(FenError::InvalidSquare(square.to_string()));
            }
            board.set_piece_at(square, Some((piece, color)));
        }
        Ok(board)
    }

    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.pieces()
            .find(|&(_, piece, c)| piece == Piece::King && c == color)
            .map(|(sq, _, _)| sq)
    }

    /// Checks that each side has exactly one king.
    pub fn validate(&self) -> Result<(), BoardError> {
        for color in [Color::White, Color::Black] {
            let count = self
                .pieces()
                .filter(|&(_, piece, c)| piece == Piece::King && c == color)
                .count();
            match count {
                0 => return Err(BoardError::MissingKing(color)),
                1 => {}
                count => return Err(BoardError::TooManyKings { color, count }),
            }
        }
        Ok(())
    }

    /// Parses a FEN record. Only the placement and side-to-move fields are
    /// used; the side defaults to White when absent.
    pub fn from_fen(fen: &str) -> Result<(Self, Color), FenError> {
        let mut fields = fen.split_whitespace();
        let placement = fields.next().ok_or(FenError::Empty)?;

        let ranks: Vec<&str> = placement.split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::RankCount(ranks.len()));
        }

        let mut board = Self::empty();
        for (row, rank) in ranks.iter().enumerate() {
            let mut col = 0usize;
            for c in rank.chars() {
                if let Some(skip) = c.to_digit(10) {
                    col += skip as usize;
                } else {
                    let piece = Piece::from_char(c).ok_or(FenError::InvalidPiece(c))?;
                    if col < 8 {
                        board.squares[row][col] = Some(piece);
                    }
                    col += 1;
                }
            }
            if col != 8 {
                return Err(FenError::FileCount {
                    rank: 8 - row,
                    files: col,
                });
            }
        }

        let side = match fields.next() {
            None | Some("w") => Color::White,
            Some("b") => Color::Black,
            Some(other) => return Err(FenError::InvalidSide(other.to_string())),
        };

        Ok((board, side))
    }

    /// The placement field of a FEN record.
    pub fn to_fen(&self) -> String {
        let mut fen = String::new();
        for (row, rank) in self.squares.iter().enumerate() {
            let mut empty = 0;
            for cell in rank {
                match cell {
                    Some((piece, color)) => {
                        if empty > 0 {
                            fen.push_str(&empty.to_string());
                            empty = 0;
                        }
                        fen.push(piece.to_char(*color));
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                fen.push_str(&empty.to_string());
            }
            if row < 7 {
                fen.push('/');
            }
        }
        fen
    }
}

impl From<Board> for Vec<Placement> {
    fn from(board: Board) -> Self {
        board.placements()
    }
}

impl TryFrom<Vec<Placement>> for Board {
    type Error = FenError;

    fn try_from(placements: Vec<Placement>) -> Result<Self, Self::Error> {
        Board::from_placements(&placements)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (row, rank) in self.squares.iter().enumerate() {
            write!(f, "{} ", 8 - row)?;
            for (col, cell) in rank.iter().enumerate() {
                let c = match cell {
                    Some((piece, color)) => piece.to_char(*color),
                    None => '.',
                };
                write!(f, "{}", c)?;
                if col < 7 {
                    write!(f, " ")?;
                }
            }
            writeln!(f)?;
        }
        write!(f, "  a b c d e f g h")
    }
}
