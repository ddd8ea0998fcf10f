//! Text protocol host layer for the `salmon-core` binary.
//!
//! This sits outside the engine's library surface: the core is the set of
//! pure functions re-exported from the crate root, and this module only
//! translates UCI-style commands into calls on [`Game`].

use crate::board::{Board, Color, Square, START_FEN};
use crate::game::Game;
use crate::search::SearchConfig;
use anyhow::{anyhow, bail, Context, Result};
use log::warn;
use std::io::{self, BufRead, Write};
use std::time::Duration;

/// Line-based UCI-style front end. Coordinates use standard algebraic
/// squares (`e2e4`); promotion suffixes are rejected since pawns never
/// promote.
pub struct UciHandler {
    game: Game,
    config: SearchConfig,
}

impl Default for UciHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl UciHandler {
    pub fn new() -> Self {
        Self::with_config(SearchConfig::default())
    }

    pub fn with_config(config: SearchConfig) -> Self {
        UciHandler {
            game: Game::with_config(Board::new(), Color::White, config),
            config,
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn run(&mut self) -> Result<()> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        let mut reader = stdin.lock();
        let mut line = String::new();

        while reader.read_line(&mut line)? > 0 {
            let command = line.trim();
            if command == "quit" {
                break;
            }

            match self.handle_command(command) {
                Ok(response) => write!(stdout, "{}", response)?,
                Err(err) => warn!("{:#}", err),
            }

            stdout.flush()?;
            line.clear();
        }
        Ok(())
    }

    pub fn handle_command(&mut self, command: &str) -> Result<String> {
        let parts: Vec<&str> = command.split_whitespace().collect();
        if parts.is_empty() {
            return Ok(String::new());
        }

        match parts[0] {
            "uci" => Ok(self.handle_uci()),
            "isready" => Ok("readyok\n".to_string()),
            "ucinewgame" => Ok(self.handle_ucinewgame()),
            "position" => self.handle_position(&parts[1..]),
            "go" => self.handle_go(&parts[1..]),
            "setoption" => self.handle_setoption(&parts[1..]),
            "d" => Ok(format!("{}\n{} to move\n", self.game.board(), self.game.side_to_move())),
            _ => Ok(String::new()),
        }
    }

    fn handle_uci(&self) -> String {
        format!(
            "id name Salmon Core\nid author Your Name\noption name Depth type spin default {} min 1 max 8\nuciok\n",
            self.config.max_depth
        )
    }

    fn handle_ucinewgame(&mut self) -> String {
        self.game = Game::with_config(Board::new(), Color::White, self.config);
        String::new()
    }

    fn handle_position(&mut self, parts: &[&str]) -> Result<String> {
        let moves_at = parts.iter().position(|&p| p == "moves").unwrap_or(parts.len());
        let (setup, moves) = parts.split_at(moves_at);

        let fen = match setup.first() {
            Some(&"startpos") => START_FEN.to_string(),
            Some(&"fen") => setup[1..].join(" "),
            _ => bail!("position needs 'startpos' or 'fen'"),
        };
        let (board, side) = Board::from_fen(&fen).with_context(|| format!("bad fen '{}'", fen))?;

        let mut game = Game::with_config(board, side, self.config);
        for move_str in moves.iter().skip(1) {
            let (from, to) = parse_move(move_str)?;
            game.play(from, to)
                .with_context(|| format!("cannot play '{}'", move_str))?;
        }
        self.game = game;
        Ok(String::new())
    }

    fn handle_go(&mut self, parts: &[&str]) -> Result<String> {
        let mut max_depth = self.config.max_depth;
        let mut time_limit = self.config.time_limit;
        let side = self.game.side_to_move();

        for i in 0..parts.len() {
            let next = parts.get(i + 1);
            let millis = next.and_then(|s| s.parse::<u64>().ok());
            match (parts[i], millis) {
                ("depth", _) => {
                    if let Some(depth) = next.and_then(|s| s.parse::<u32>().ok()) {
                        max_depth = depth;
                    }
                }
                ("movetime", Some(ms)) => time_limit = Some(Duration::from_millis(ms)),
                // Use 1/20th of the remaining clock
                ("wtime", Some(ms)) if side == Color::White => {
                    time_limit = Some(Duration::from_millis(ms / 20))
                }
                ("btime", Some(ms)) if side == Color::Black => {
                    time_limit = Some(Duration::from_millis(ms / 20))
                }
                _ => {}
            }
        }

        self.game.set_max_depth(max_depth);
        self.game.set_time_limit(time_limit);
        let result = self.game.think();
        self.game.set_max_depth(self.config.max_depth);
        self.game.set_time_limit(self.config.time_limit);
        let result = result?;

        let score = match side {
            Color::White => result.score,
            Color::Black => -result.score,
        };
        let mut response = format!(
            "info depth {} score cp {} nodes {}\n",
            result.depth, score, result.nodes
        );
        match result.best_move {
            Some(mv) => response.push_str(&format!("bestmove {}\n", mv)),
            None => response.push_str("bestmove (none)\n"),
        }
        Ok(response)
    }

    fn handle_setoption(&mut self, parts: &[&str]) -> Result<String> {
        // setoption name <id> value <x>
        match parts {
            ["name", name, "value", value] if name.eq_ignore_ascii_case("depth") => {
                let depth: u32 = value
                    .parse()
                    .with_context(|| format!("bad depth '{}'", value))?;
                self.config.max_depth = depth;
                self.game.set_max_depth(depth);
                Ok(String::new())
            }
            _ => bail!("unsupported option '{}'", parts.join(" ")),
        }
    }
}

fn parse_move(move_str: &str) -> Result<(Square, Square)> {
    if move_str.len() != 4 {
        return Err(anyhow!("move '{}' must look like e2e4", move_str));
    }
    let from = move_str
        .get(0..2)
        .and_then(Square::from_algebraic)
        .ok_or_else(|| anyhow!("bad square in '{}'", move_str))?;
    let to = move_str
        .get(2..4)
        .and_then(Square::from_algebraic)
        .ok_or_else(|| anyhow!("bad square in '{}'", move_str))?;
    Ok((from, to))
}
