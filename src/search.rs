use crate::board::{Board, BoardError, Color};
use crate::evaluation::Evaluator;
use crate::movegen::{Move, MoveGenerator};
use log::{debug, trace};
use std::time::{Duration, Instant};

/// Search depth used when the caller does not pick one.
///
/// Each extra ply multiplies the work by roughly the branching factor
/// (about 30 in the middlegame). Depth 1 answers instantly but only looks
/// at immediate material; depth 4 plays noticeably stronger and usually
/// finishes well under a second in release builds.
pub const DEFAULT_MAX_DEPTH: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    /// Plies to search. Zero is treated as one.
    pub max_depth: u32,
    /// Optional wall-clock budget. When it runs out the best root move
    /// found so far is returned.
    pub time_limit: Option<Duration>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            time_limit: None,
        }
    }
}

impl SearchConfig {
    pub fn with_depth(max_depth: u32) -> Self {
        Self {
            max_depth,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchResult {
    pub best_move: Option<Move>,
    /// Minimax score of `best_move`, from White's side. The static
    /// evaluation of the root when there is no move.
    pub score: i32,
    pub depth: u32,
    pub nodes: u64,
    /// False when the deadline cut the search short.
    pub completed: bool,
}

/// Depth-limited minimax with alpha-beta pruning. White maximizes, Black
/// minimizes. Moves are searched best-first according to the static
/// evaluation one ply ahead.
pub struct Search {
    evaluator: Evaluator,
    move_generator: MoveGenerator,
    config: SearchConfig,
    nodes_searched: u64,
    deadline: Option<Instant>,
    out_of_time: bool,
}

impl Default for Search {
    fn default() -> Self {
        Self::new()
    }
}

impl Search {
    pub fn new() -> Self {
        Self::with_config(SearchConfig::default())
    }

    pub fn with_config(config: SearchConfig) -> Self {
        Self {
            evaluator: Evaluator::new(),
            move_generator: MoveGenerator::new(),
            config,
            nodes_searched: 0,
            deadline: None,
            out_of_time: false,
        }
    }

    pub fn config(&self) -> SearchConfig {
        self.config
    }

    pub fn set_max_depth(&mut self, depth: u32) {
        self.config.max_depth = depth;
    }

    pub fn set_time_limit(&mut self, limit: Option<Duration>) {
        self.config.time_limit = limit;
    }

    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    pub fn get_nodes_searched(&self) -> u64 {
        self.nodes_searched
    }

    /// Best move for `color`, or `None` when that side has no move.
    ///
    /// The board must hold exactly one king per side.
    pub fn find_best_move(&mut self, board: &Board, color: Color) -> Result<Option<Move>, BoardError> {
        Ok(self.search(board, color)?.best_move)
    }

    pub fn search(&mut self, board: &Board, color: Color) -> Result<SearchResult, BoardError> {
        board.validate()?;
        Ok(self.search_root(board, color))
    }

    fn search_root(&mut self, board: &Board, color: Color) -> SearchResult {
        let depth = self.config.max_depth.max(1);
        self.nodes_searched = 0;
        self.out_of_time = false;
        self.deadline = self.config.time_limit.map(|limit| Instant::now() + limit);

        let maximizing = color == Color::White;
        let mut best_move = None;
        let mut best_score = if maximizing { i32::MIN } else { i32::MAX };
        let mut alpha = i32::MIN;
        let mut beta = i32::MAX;

        for mv in self.ordered_moves(board, color) {
            if best_move.is_some() && self.check_deadline() {
                break;
            }

            let child = board.apply_move(&mv);
            let score = self.minimax(&child, depth - 1, alpha, beta, !maximizing);

            // A cut-short subtree only counts when nothing else is known.
            if self.out_of_time && best_move.is_some() {
                break;
            }

            if maximizing {
                if score > best_score {
                    best_score = score;
                    best_move = Some(mv);
                }
                alpha = alpha.max(score);
            } else {
                if score < best_score {
                    best_score = score;
                    best_move = Some(mv);
                }
                beta = beta.min(score);
            }
        }

        if best_move.is_none() {
            best_score = self.evaluator.evaluate(board);
        }

        let result = SearchResult {
            best_move,
            score: best_score,
            depth,
            nodes: self.nodes_searched,
            completed: !self.out_of_time,
        };
        debug!(
            "search {} depth {}: best {} score {} nodes {}{}",
            color,
            depth,
            best_move.map_or_else(|| "(none)".to_string(), |mv| mv.to_string()),
            result.score,
            result.nodes,
            if result.completed { "" } else { " (deadline)" }
        );
        result
    }

    fn minimax(&mut self, board: &Board, depth: u32, mut alpha: i32, mut beta: i32, maximizing: bool) -> i32 {
        self.nodes_searched += 1;

        if depth == 0 || self.check_deadline() {
            return self.evaluator.evaluate(board);
        }

        let color = if maximizing { Color::White } else { Color::Black };
        let moves = self.ordered_moves(board, color);
        if moves.is_empty() {
            return self.evaluator.evaluate(board);
        }

        if maximizing {
            let mut value = i32::MIN;
            for mv in moves {
                let child = board.apply_move(&mv);
                value = value.max(self.minimax(&child, depth - 1, alpha, beta, false));
                alpha = alpha.max(value);
                if beta <= alpha {
                    break;
                }
            }
            value
        } else {
            let mut value = i32::MAX;
            for mv in moves {
                let child = board.apply_move(&mv);
                value = value.min(self.minimax(&child, depth - 1, alpha, beta, true));
                beta = beta.min(value);
                if beta <= alpha {
                    break;
                }
            }
            value
        }
    }

    /// All moves for `color`, best first by the evaluation of the board
    /// they lead to. The sort is stable, so equal scores keep generation
    /// order.
    pub fn ordered_moves(&self, board: &Board, color: Color) -> Vec<Move> {
        let mut scored: Vec<(i32, Move)> = self
            .move_generator
            .generate_all_moves(board, color)
            .into_iter()
            .map(|mv| (self.evaluator.evaluate(&board.apply_move(&mv)), mv))
            .collect();

        match color {
            Color::White => scored.sort_by(|a, b| b.0.cmp(&a.0)),
            Color::Black => scored.sort_by(|a, b| a.0.cmp(&b.0)),
        }

        scored.into_iter().map(|(_, mv)| mv).collect()
    }

    fn check_deadline(&mut self) -> bool {
        if !self.out_of_time {
            if let Some(deadline) = self.deadline {
                if Instant::now() >= deadline {
                    trace!("search deadline reached after {} nodes", self.nodes_searched);
                    self.out_of_time = true;
                }
            }
        }
        self.out_of_time
    }
}
