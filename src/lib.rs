//! Chess rules and move search for the game's computer opponent.
//!
//! Moves are pseudo-legal: they follow each piece's movement and capture
//! geometry but ignore check. There is no castling, en passant or
//! promotion. Boards are values, and every function here is pure.

pub mod board;
pub mod evaluation;
pub mod game;
pub mod movegen;
pub mod search;
pub mod uci;

pub use board::{Board, BoardError, Color, FenError, Piece, Square};
pub use game::{Game, GameError, GameStatus};
pub use movegen::{Move, MoveGenerator};
pub use search::{Search, SearchConfig, SearchResult, DEFAULT_MAX_DEPTH};

use evaluation::Evaluator;

/// Destinations for `piece` on `square`. Empty for an empty or off-board
/// square, or when no piece is given.
pub fn generate_moves(board: &Board, square: Square, piece: Option<(Piece, Color)>) -> Vec<Square> {
    MoveGenerator::new().generate_moves(board, square, piece)
}

pub fn apply_move(board: &Board, mv: &Move) -> Board {
    board.apply_move(mv)
}

/// Static score of `board`; positive favours White.
pub fn evaluate(board: &Board) -> i32 {
    Evaluator::new().evaluate(board)
}

/// The engine's move for `color`, searching `max_depth` plies.
///
/// Depth 1 answers immediately but only weighs the next position; each
/// extra ply costs roughly thirty times more. `Ok(None)` means the side
/// has no move at all.
pub fn find_best_move(board: &Board, color: Color, max_depth: u32) -> Result<Option<Move>, BoardError> {
    Search::with_config(SearchConfig::with_depth(max_depth)).find_best_move(board, color)
}

/// Finds the engine's move and plays it.
pub fn choose_move(board: &Board, color: Color, max_depth: u32) -> Result<Option<(Board, Move)>, BoardError> {
    Ok(find_best_move(board, color, max_depth)?.map(|mv| (board.apply_move(&mv), mv)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    fn random_game(seed: u64, plies: usize) -> Game {
        let mut game = Game::with_config(Board::new(), Color::White, SearchConfig::with_depth(1));
        let mut rng = StdRng::seed_from_u64(seed);
        for _ in 0..plies {
            if game.play_random_move(&mut rng).is_err() {
                break;
            }
        }
        game
    }

    #[test]
    fn test_initial_position() {
        let board = Board::new();
        assert_eq!(evaluate(&board), 0);

        let knight = board.get_piece_at(sq("g1"));
        let mut targets = generate_moves(&board, sq("g1"), knight);
        targets.sort();
        assert_eq!(targets, vec![sq("f3"), sq("h3")]);
    }

    #[test]
    fn test_pawn_double_step_disappears_after_moving() {
        let board = Board::new();
        let pawn = board.get_piece_at(sq("c2"));
        assert_eq!(generate_moves(&board, sq("c2"), pawn), vec![sq("c3"), sq("c4")]);

        let board = apply_move(&board, &Move::new(sq("c2"), sq("c3"), Piece::Pawn, Color::White));
        assert_eq!(generate_moves(&board, sq("c3"), pawn), vec![sq("c4")]);
    }

    #[test]
    fn test_queen_blocked_by_friend_then_enemy() {
        let board = Board::empty()
            .with_piece(sq("d1"), Piece::Queen, Color::White)
            .with_piece(sq("d3"), Piece::Pawn, Color::White);
        let queen = board.get_piece_at(sq("d1"));
        let up: Vec<Square> = generate_moves(&board, sq("d1"), queen)
            .into_iter()
            .filter(|s| s.col == 3)
            .collect();
        assert_eq!(up, vec![sq("d2")]);

        let board = board.with_piece(sq("d3"), Piece::Pawn, Color::Black);
        let up: Vec<Square> = generate_moves(&board, sq("d1"), queen)
            .into_iter()
            .filter(|s| s.col == 3)
            .collect();
        assert_eq!(up, vec![sq("d2"), sq("d3")]);
    }

    #[test]
    fn test_choose_move_applies_the_search_result() {
        let board = Board::new();
        let (next, mv) = choose_move(&board, Color::White, 2).unwrap().unwrap();
        assert_eq!(find_best_move(&board, Color::White, 2), Ok(Some(mv)));
        assert_eq!(next, board.apply_move(&mv));
        assert_eq!(next.get_piece_at(mv.from), None);
    }

    #[test]
    fn test_choose_move_on_a_stuck_side() {
        let mut board = Board::empty()
            .with_piece(sq("a8"), Piece::King, Color::Black)
            .with_piece(sq("b8"), Piece::Pawn, Color::Black)
            .with_piece(sq("h1"), Piece::King, Color::White);
        for row in 1..8 {
            board = board
                .with_piece(Square::new(row, 0), Piece::Pawn, Color::Black)
                .with_piece(Square::new(row, 1), Piece::Pawn, Color::Black);
        }
        assert_eq!(choose_move(&board, Color::Black, 3), Ok(None));
    }

    #[test]
    fn test_find_best_move_rejects_kingless_board() {
        assert_eq!(
            find_best_move(&Board::empty(), Color::White, 1),
            Err(BoardError::MissingKing(Color::White))
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_apply_move_round_trip(seed in any::<u64>(), plies in 0..30usize) {
            let game = random_game(seed, plies);
            let board = *game.board();
            let color = game.side_to_move();

            for (from, piece, c) in board.pieces().filter(|&(_, _, c)| c == color) {
                for to in generate_moves(&board, from, Some((piece, c))) {
                    prop_assert!(to.is_on_board());
                    prop_assert_ne!(board.get_piece_at(to).map(|(_, owner)| owner), Some(color));

                    let next = apply_move(&board, &Move::new(from, to, piece, c));
                    prop_assert_eq!(next.get_piece_at(from), None);
                    prop_assert_eq!(next.get_piece_at(to), Some((piece, c)));
                    prop_assert_eq!(next.pieces().count() + usize::from(board.get_piece_at(to).is_some()),
                        board.pieces().count());
                }
            }
        }

        #[test]
        fn prop_find_best_move_is_deterministic(seed in any::<u64>(), plies in 0..20usize) {
            let game = random_game(seed, plies);
            prop_assume!(game.board().validate().is_ok());
            let first = find_best_move(game.board(), game.side_to_move(), 2);
            let second = find_best_move(game.board(), game.side_to_move(), 2);
            prop_assert_eq!(first, second);
        }
    }
}
