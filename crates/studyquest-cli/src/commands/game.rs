//! Minigame commands.
//!
//! Real-time games (pong, flappy bird) run in a front end and only report
//! their score here via `game record`. Turn-based games can be played
//! directly.

use std::io::BufRead;

use clap::{Subcommand, ValueEnum};
use rand::SeedableRng;
use rand_pcg::Pcg64;
use serde::Serialize;
use studyquest_core::games::{
    MathQuestion, MemoryMatch, Mark, Puzzle, QuizQuestion, Round, RoundKind, TicTacToe, WordPuzzle,
};
use studyquest_core::{Game, GameOutcome, SqliteStore, StudyState};

use super::{emit, open_state, CmdResult};

#[derive(Clone, Copy, ValueEnum)]
pub enum RoundArg {
    Math,
    Word,
    Quiz,
}

impl From<RoundArg> for RoundKind {
    fn from(arg: RoundArg) -> Self {
        match arg {
            RoundArg::Math => RoundKind::Math,
            RoundArg::Word => RoundKind::Word,
            RoundArg::Quiz => RoundKind::Quiz,
        }
    }
}

#[derive(Subcommand)]
pub enum GameAction {
    /// List the catalog with unlock levels
    List,
    /// Report a game result played elsewhere
    Record {
        #[command(subcommand)]
        outcome: RecordOutcome,
    },
    /// Play tic-tac-toe (you are X) against a random opponent
    Tictactoe {
        /// Cells 0-8, row by row, comma separated
        #[arg(long, value_delimiter = ',')]
        moves: Vec<usize>,
        /// Seed for the opponent
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Flip memory match cards
    Memory {
        /// Cards 0-11, comma separated
        #[arg(long, value_delimiter = ',')]
        flips: Vec<usize>,
        /// Seed for the deal
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Play a question round, one answer per line on stdin
    Play {
        #[arg(value_enum)]
        round: RoundArg,
        /// Seed for the questions
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[derive(Subcommand)]
pub enum RecordOutcome {
    /// Tic-tac-toe won as X
    TictactoeWin,
    /// Pong game over
    Pong {
        /// Paddle hits
        hits: u32,
    },
    /// Flappy bird game over
    Flappy {
        /// Pipes passed
        pipes: u32,
    },
    /// One memory match pair found
    MemoryPair,
    /// One question answered
    Answer {
        #[arg(value_enum)]
        round: RoundArg,
        /// The answer was right
        #[arg(long)]
        correct: bool,
    },
    /// A question round finished
    RoundEnd {
        #[arg(value_enum)]
        round: RoundArg,
        /// Correct answers in the round
        score: u32,
    },
}

impl From<RecordOutcome> for GameOutcome {
    fn from(outcome: RecordOutcome) -> Self {
        match outcome {
            RecordOutcome::TictactoeWin => GameOutcome::TicTacToe {
                winner: Some(Mark::X),
            },
            RecordOutcome::Pong { hits } => GameOutcome::Pong { hits },
            RecordOutcome::Flappy { pipes } => GameOutcome::FlappyBird { pipes },
            RecordOutcome::MemoryPair => GameOutcome::MemoryPair,
            RecordOutcome::Answer { round, correct } => GameOutcome::Answer {
                round: round.into(),
                correct,
            },
            RecordOutcome::RoundEnd { round, score } => GameOutcome::RoundEnd {
                round: round.into(),
                score,
            },
        }
    }
}

#[derive(Serialize)]
struct CatalogEntry {
    id: &'static str,
    unlock_level: u32,
    unlocked: bool,
}

#[derive(Serialize)]
struct TicTacToeResult {
    board: Vec<String>,
    over: bool,
    winner: Option<Mark>,
    awarded: u64,
}

#[derive(Serialize)]
struct MemoryResult {
    table: Vec<String>,
    moves: u32,
    score: u32,
    won: bool,
    awarded: u64,
}

#[derive(Serialize)]
struct RoundResult {
    round: RoundKind,
    answered: u32,
    score: u32,
    completed: bool,
    awarded: u64,
}

fn rng_for(seed: Option<u64>) -> Pcg64 {
    match seed {
        Some(seed) => Pcg64::seed_from_u64(seed),
        None => Pcg64::from_entropy(),
    }
}

fn lines(text: String) -> Vec<String> {
    text.lines().map(str::to_string).collect()
}

pub fn run(action: GameAction) -> CmdResult {
    let (mut state, _config) = open_state()?;

    match action {
        GameAction::List => {
            let catalog: Vec<_> = Game::ALL
                .iter()
                .map(|g| CatalogEntry {
                    id: g.id(),
                    unlock_level: g.unlock_level(),
                    unlocked: state.reward().is_unlocked(g.id()),
                })
                .collect();
            emit(&mut state, &catalog)
        }
        GameAction::Record { outcome } => {
            let outcome = GameOutcome::from(outcome);
            state.ensure_unlocked(outcome.game())?;
            let delta = state.apply_outcome(&outcome);
            emit(&mut state, &delta)
        }
        GameAction::Tictactoe { moves, seed } => {
            state.ensure_unlocked(Game::TicTacToe)?;
            let mut rng = rng_for(seed);
            let mut game = TicTacToe::new();
            let mut awarded = 0;
            for cell in moves {
                if let Some(outcome) = game.play_turn(cell, &mut rng)? {
                    awarded += state.apply_outcome(&outcome).awarded;
                    break;
                }
            }
            let result = TicTacToeResult {
                board: lines(game.render()),
                over: game.is_over(),
                winner: game.winner(),
                awarded,
            };
            emit(&mut state, &result)
        }
        GameAction::Memory { flips, seed } => {
            state.ensure_unlocked(Game::MemoryMatch)?;
            let mut rng = rng_for(seed);
            let mut game = MemoryMatch::deal(&mut rng);
            let mut awarded = 0;
            for card in flips {
                if let Some(outcome) = game.flip(card)? {
                    awarded += state.apply_outcome(&outcome).awarded;
                }
            }
            let result = MemoryResult {
                table: lines(game.render()),
                moves: game.moves(),
                score: game.score(),
                won: game.is_won(),
                awarded,
            };
            emit(&mut state, &result)
        }
        GameAction::Play { round, seed } => {
            let kind = RoundKind::from(round);
            state.ensure_unlocked(kind.game())?;
            let mut rng = rng_for(seed);
            let result = match kind {
                RoundKind::Math => play_round::<MathQuestion>(&mut state, &mut rng)?,
                RoundKind::Word => play_round::<WordPuzzle>(&mut state, &mut rng)?,
                RoundKind::Quiz => play_round::<QuizQuestion>(&mut state, &mut rng)?,
            };
            emit(&mut state, &result)
        }
    }
}

/// Prompts go to stderr so stdout stays a single JSON document. Stops early
/// at end of input; an unfinished round earns no end bonus.
fn play_round<P: Puzzle>(
    state: &mut StudyState<SqliteStore>,
    rng: &mut Pcg64,
) -> Result<RoundResult, Box<dyn std::error::Error>> {
    let mut round = Round::<P>::start(rng);
    let stdin = std::io::stdin();
    let mut input = stdin.lock().lines();
    let mut awarded = 0;

    while !round.is_complete() {
        eprintln!("{}", round.current().prompt());
        let Some(line) = input.next() else {
            break;
        };
        let line = line?;
        let solution = round.current().solution();
        let outcome = round.answer(&line, rng);
        if let GameOutcome::Answer { correct: false, .. } = outcome {
            eprintln!("answer: {solution}");
        }
        awarded += state.apply_outcome(&outcome).awarded;
    }

    let completed = round.is_complete();
    let answered = round.answered();
    let score = round.score();
    if completed {
        awarded += state.apply_outcome(&round.finish(rng)).awarded;
    }
    Ok(RoundResult {
        round: P::KIND,
        answered,
        score,
        completed,
        awarded,
    })
}
