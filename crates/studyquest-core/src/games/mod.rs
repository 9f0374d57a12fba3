//! Minigames: the unlock catalog, scoring outcomes and the small engines
//! that produce them.
//!
//! Every game reports into the reward system through [`GameOutcome`]; the
//! session turns an outcome into a [`crate::reward::RewardDelta`] via
//! `StudyState::apply_outcome`.

pub mod memory;
pub mod round;
pub mod tictactoe;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub use memory::MemoryMatch;
pub use round::{MathQuestion, Puzzle, QuizQuestion, Round, RoundKind, WordPuzzle};
pub use tictactoe::{Mark, TicTacToe};

/// The minigame catalog, in unlock order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Game {
    TicTacToe,
    Pong,
    FlappyBird,
    MemoryMatch,
    MathChallenge,
    WordScramble,
    QuizMaster,
}

impl Game {
    /// Catalog order. Entry `i` unlocks at level `i + 1`.
    pub const ALL: [Game; 7] = [
        Game::TicTacToe,
        Game::Pong,
        Game::FlappyBird,
        Game::MemoryMatch,
        Game::MathChallenge,
        Game::WordScramble,
        Game::QuizMaster,
    ];

    /// Content id stored in the unlock set.
    pub fn id(&self) -> &'static str {
        match self {
            Game::TicTacToe => "Tic-Tac-Toe",
            Game::Pong => "Pong",
            Game::FlappyBird => "Flappy Bird",
            Game::MemoryMatch => "Memory Match",
            Game::MathChallenge => "Math Challenge",
            Game::WordScramble => "Word Scramble",
            Game::QuizMaster => "Quiz Master",
        }
    }

    pub fn catalog_index(&self) -> usize {
        Self::ALL.iter().position(|g| g == self).unwrap_or(0)
    }

    /// Level at which the level-up policy inserts this game.
    pub fn unlock_level(&self) -> u32 {
        self.catalog_index() as u32 + 1
    }

    /// Accepts the content id ("Flappy Bird") or a slug ("flappy-bird").
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let wanted = s.trim().to_lowercase().replace([' ', '_'], "-");
        Self::ALL
            .into_iter()
            .find(|g| {
                let slug = g.id().to_lowercase().replace(' ', "-");
                slug == wanted || slug.replace('-', "") == wanted.replace('-', "")
            })
            .ok_or_else(|| ValidationError::UnknownGame(s.to_string()))
    }
}

impl std::fmt::Display for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// A scoring event from a minigame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameOutcome {
    /// Tic-tac-toe finished; only a player (X) win scores.
    TicTacToe { winner: Option<Mark> },
    /// Pong game over after `hits` paddle returns.
    Pong { hits: u32 },
    /// Flappy bird game over after passing `pipes`.
    FlappyBird { pipes: u32 },
    /// One pair matched in memory match.
    MemoryPair,
    /// One answer in a math/word/quiz round.
    Answer { round: RoundKind, correct: bool },
    /// A math/word/quiz round ended with `score` correct answers.
    RoundEnd { round: RoundKind, score: u32 },
}

impl GameOutcome {
    pub const TICTACTOE_WIN: u64 = 20;
    pub const MEMORY_PAIR: u64 = 10;

    pub fn game(&self) -> Game {
        match self {
            GameOutcome::TicTacToe { .. } => Game::TicTacToe,
            GameOutcome::Pong { .. } => Game::Pong,
            GameOutcome::FlappyBird { .. } => Game::FlappyBird,
            GameOutcome::MemoryPair => Game::MemoryMatch,
            GameOutcome::Answer { round, .. } | GameOutcome::RoundEnd { round, .. } => {
                round.game()
            }
        }
    }

    /// Points this outcome is worth.
    pub fn points(&self) -> u64 {
        match *self {
            GameOutcome::TicTacToe { winner } => {
                if winner == Some(Mark::X) {
                    Self::TICTACTOE_WIN
                } else {
                    0
                }
            }
            GameOutcome::Pong { hits } => hits as u64,
            GameOutcome::FlappyBird { pipes } => pipes as u64,
            GameOutcome::MemoryPair => Self::MEMORY_PAIR,
            GameOutcome::Answer { round, correct } => {
                if correct {
                    round.answer_points()
                } else {
                    0
                }
            }
            GameOutcome::RoundEnd { round, score } => score as u64 * round.round_multiplier(),
        }
    }
}
