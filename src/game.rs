use crate::board::{Board, BoardError, Color, Piece, Square};
use crate::movegen::{Move, MoveGenerator};
use crate::search::{Search, SearchConfig, SearchResult};
use log::{info, warn};
use rand::seq::SliceRandom;
use rand::Rng;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("no {0} piece on {1}")]
    NotYourPiece(Color, Square),
    #[error("{from} to {to} is not a valid move")]
    IllegalMove { from: Square, to: Square },
    #[error("{0} has no moves")]
    NoMoves(Color),
    #[error("game is over")]
    GameOver,
    #[error("nothing to undo")]
    NothingToUndo,
    #[error(transparent)]
    Board(#[from] BoardError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    InProgress,
    /// Moves are pseudo-legal, so play ends when a king is taken.
    KingCaptured { winner: Color },
}

/// Owns the current position and alternates turns between a human and the
/// engine. Every applied move pushes the previous position onto a history
/// stack, so any number of plies can be taken back.
pub struct Game {
    board: Board,
    side_to_move: Color,
    history: Vec<(Board, Color, Move)>,
    move_generator: MoveGenerator,
    search: Search,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    pub fn new() -> Self {
        Self::from_board(Board::new(), Color::White)
    }

    pub fn from_board(board: Board, side_to_move: Color) -> Self {
        Self::with_config(board, side_to_move, SearchConfig::default())
    }

    pub fn with_config(board: Board, side_to_move: Color, config: SearchConfig) -> Self {
        info!("new game, {} to move", side_to_move);
        Self {
            board,
            side_to_move,
            history: Vec::new(),
            move_generator: MoveGenerator::new(),
            search: Search::with_config(config),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub fn history(&self) -> impl Iterator<Item = &Move> {
        self.history.iter().map(|(_, _, mv)| mv)
    }

    pub fn search_config(&self) -> SearchConfig {
        self.search.config()
    }

    pub fn set_max_depth(&mut self, depth: u32) {
        self.search.set_max_depth(depth);
    }

    pub fn set_time_limit(&mut self, limit: Option<Duration>) {
        self.search.set_time_limit(limit);
    }

    /// Runs the engine for the side to move without playing its choice.
    pub fn think(&mut self) -> Result<SearchResult, BoardError> {
        self.search.search(&self.board, self.side_to_move)
    }

    pub fn status(&self) -> GameStatus {
        for color in [Color::White, Color::Black] {
            if self.board.king_square(color).is_none() {
                return GameStatus::KingCaptured {
                    winner: color.opposite(),
                };
            }
        }
        GameStatus::InProgress
    }

    /// Squares the piece on `square` may move to, if it belongs to the side
    /// to move. Used to highlight options after a tap.
    pub fn selectable_targets(&self, square: Square) -> Vec<Square> {
        match self.board.get_piece_at(square) {
            Some((piece, color)) if color == self.side_to_move => {
                self.move_generator
                    .generate_moves(&self.board, square, Some((piece, color)))
            }
            _ => Vec::new(),
        }
    }

    /// Plays a human move from `from` to `to`.
    pub fn play(&mut self, from: Square, to: Square) -> Result<Move, GameError> {
        self.ensure_in_progress()?;
        let (piece, color) = self
            .board
            .get_piece_at(from)
            .filter(|&(_, color)| color == self.side_to_move)
            .ok_or(GameError::NotYourPiece(self.side_to_move, from))?;

        if !self.selectable_targets(from).contains(&to) {
            return Err(GameError::IllegalMove { from, to });
        }

        let mut mv = Move::new(from, to, piece, color);
        mv.captured_piece = self.board.get_piece_at(to).map(|(captured, _)| captured);
        self.commit(mv);
        Ok(mv)
    }

    /// Lets the engine choose and play a move for the side to move.
    pub fn play_engine_move(&mut self) -> Result<Move, GameError> {
        self.ensure_in_progress()?;
        let color = self.side_to_move;
        let result = self.think().map_err(|err| {
            warn!("engine could not move: {}", err);
            err
        })?;

        match result.best_move {
            Some(mv) => {
                self.commit(mv);
                Ok(mv)
            }
            None => {
                warn!("engine could not move: {} has no moves", color);
                Err(GameError::NoMoves(color))
            }
        }
    }

    /// Plays a uniformly random pseudo-legal move.
    pub fn play_random_move<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Move, GameError> {
        self.ensure_in_progress()?;
        let color = self.side_to_move;
        let moves = self.move_generator.generate_all_moves(&self.board, color);
        let mv = *moves.choose(rng).ok_or(GameError::NoMoves(color))?;
        self.commit(mv);
        Ok(mv)
    }

    /// Takes back the last ply.
    pub fn undo(&mut self) -> Result<Move, GameError> {
        let (board, side, mv) = self.history.pop().ok_or(GameError::NothingToUndo)?;
        self.board = board;
        self.side_to_move = side;
        Ok(mv)
    }

    fn ensure_in_progress(&self) -> Result<(), GameError> {
        match self.status() {
            GameStatus::InProgress => Ok(()),
            GameStatus::KingCaptured { .. } => Err(GameError::GameOver),
        }
    }

    fn commit(&mut self, mv: Move) {
        self.history.push((self.board, self.side_to_move, mv));
        self.board = self.board.apply_move(&mv);
        self.side_to_move = self.side_to_move.opposite();

        if mv.captured_piece == Some(Piece::King) {
            info!("{} captured the king with {}", mv.color, mv);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    #[test]
    fn test_selectable_targets_only_for_side_to_move() {
        let game = Game::new();
        assert_eq!(game.selectable_targets(sq("g1")).len(), 2);
        assert!(game.selectable_targets(sq("g8")).is_empty());
        assert!(game.selectable_targets(sq("e4")).is_empty());
    }

    #[test]
    fn test_human_then_engine() {
        let mut game = Game::with_config(Board::new(), Color::White, SearchConfig::with_depth(2));
        let mv = game.play(sq("e2"), sq("e4")).unwrap();
        assert_eq!(mv.piece, Piece::Pawn);
        assert_eq!(game.side_to_move(), Color::Black);

        let reply = game.play_engine_move().unwrap();
        assert_eq!(reply.color, Color::Black);
        assert_eq!(game.side_to_move(), Color::White);
        assert_eq!(game.history().count(), 2);
        assert_eq!(game.board().get_piece_at(reply.from), None);
    }

    #[test]
    fn test_rejects_bad_human_moves() {
        let mut game = Game::new();
        assert_eq!(
            game.play(sq("e7"), sq("e5")),
            Err(GameError::NotYourPiece(Color::White, sq("e7")))
        );
        assert_eq!(
            game.play(sq("e2"), sq("e5")),
            Err(GameError::IllegalMove {
                from: sq("e2"),
                to: sq("e5")
            })
        );
        assert_eq!(game.board(), &Board::new());
    }

    #[test]
    fn test_undo_restores_position() {
        let mut game = Game::new();
        assert_eq!(game.undo(), Err(GameError::NothingToUndo));

        game.play(sq("g1"), sq("f3")).unwrap();
        game.play(sq("b8"), sq("c6")).unwrap();
        let taken_back = game.undo().unwrap();
        assert_eq!(taken_back.from, sq("b8"));
        assert_eq!(game.side_to_move(), Color::Black);
        game.undo().unwrap();
        assert_eq!(game.board(), &Board::new());
        assert_eq!(game.side_to_move(), Color::White);
    }

    #[test]
    fn test_king_capture_ends_game() {
        let board = Board::empty()
            .with_piece(sq("e1"), Piece::King, Color::White)
            .with_piece(sq("e7"), Piece::Rook, Color::White)
            .with_piece(sq("e8"), Piece::King, Color::Black);
        let mut game = Game::from_board(board, Color::White);

        let mv = game.play(sq("e7"), sq("e8")).unwrap();
        assert_eq!(mv.captured_piece, Some(Piece::King));
        assert_eq!(
            game.status(),
            GameStatus::KingCaptured {
                winner: Color::White
            }
        );
        assert_eq!(game.play_engine_move(), Err(GameError::GameOver));
    }

    #[test]
    fn test_engine_reports_malformed_board() {
        let board = Board::empty()
            .with_piece(sq("e1"), Piece::King, Color::White)
            .with_piece(sq("e8"), Piece::King, Color::Black)
            .with_piece(sq("a8"), Piece::King, Color::Black);
        let mut game = Game::from_board(board, Color::Black);
        assert_eq!(
            game.play_engine_move(),
            Err(GameError::Board(BoardError::TooManyKings {
                color: Color::Black,
                count: 2
            }))
        );
    }

    #[test]
    fn test_engine_without_moves() {
        let mut board = Board::empty()
            .with_piece(sq("a8"), Piece::King, Color::Black)
            .with_piece(sq("b8"), Piece::Pawn, Color::Black)
            .with_piece(sq("h1"), Piece::King, Color::White);
        for row in 1..8 {
            board = board
                .with_piece(Square::new(row, 0), Piece::Pawn, Color::Black)
                .with_piece(Square::new(row, 1), Piece::Pawn, Color::Black);
        }
        let mut game = Game::from_board(board, Color::Black);
        assert_eq!(game.play_engine_move(), Err(GameError::NoMoves(Color::Black)));
        assert!(game.history().next().is_none());
    }

    #[test]
    fn test_random_moves_are_reproducible() {
        let play = |seed| {
            let mut game = Game::new();
            let mut rng = StdRng::seed_from_u64(seed);
            for _ in 0..10 {
                if game.play_random_move(&mut rng).is_err() {
                    break;
                }
            }
            *game.board()
        };
        assert_eq!(play(42), play(42));
    }
}
