//! Tic-tac-toe against a random computer opponent.
//!
//! The player is always `X` and moves first; the computer (`O`) picks a
//! uniformly random free cell.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::GameOutcome;
use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    fn other(self) -> Self {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }
}

const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicTacToe {
    board: [Option<Mark>; 9],
    current: Mark,
    over: bool,
    winner: Option<Mark>,
}

impl Default for TicTacToe {
    fn default() -> Self {
        Self::new()
    }
}

impl TicTacToe {
    pub fn new() -> Self {
        Self {
            board: [None; 9],
            current: Mark::X,
            over: false,
            winner: None,
        }
    }

    pub fn board(&self) -> &[Option<Mark>; 9] {
        &self.board
    }

    pub fn current(&self) -> Mark {
        self.current
    }

    pub fn is_over(&self) -> bool {
        self.over
    }

    pub fn winner(&self) -> Option<Mark> {
        self.winner
    }

    pub fn free_cells(&self) -> Vec<usize> {
        (0..9).filter(|&i| self.board[i].is_none()).collect()
    }

    /// Place the current mark at `index` (0..9, row-major).
    ///
    /// Returns the outcome once the move ends the game.
    pub fn place(&mut self, index: usize) -> Result<Option<GameOutcome>, ValidationError> {
        if self.over {
            return Err(ValidationError::InvalidValue {
                field: "cell".into(),
                message: "game is over".into(),
            });
        }
        match self.board.get(index) {
            None => {
                return Err(ValidationError::InvalidValue {
                    field: "cell".into(),
                    message: format!("{index} is outside the board"),
                })
            }
            Some(Some(_)) => {
                return Err(ValidationError::InvalidValue {
                    field: "cell".into(),
                    message: format!("{index} is already taken"),
                })
            }
            Some(None) => {}
        }

        self.board[index] = Some(self.current);
        self.current = self.current.other();
        Ok(self.check_winner())
    }

    /// Let the computer place its mark on a random free cell.
    pub fn computer_move<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<GameOutcome> {
        if self.over || self.current != Mark::O {
            return None;
        }
        let cell = *self.free_cells().choose(rng)?;
        self.place(cell).ok().flatten()
    }

    /// Player move followed by the computer's reply.
    pub fn play_turn<R: Rng + ?Sized>(
        &mut self,
        index: usize,
        rng: &mut R,
    ) -> Result<Option<GameOutcome>, ValidationError> {
        if let Some(outcome) = self.place(index)? {
            return Ok(Some(outcome));
        }
        Ok(self.computer_move(rng))
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    fn check_winner(&mut self) -> Option<GameOutcome> {
        for [a, b, c] in LINES {
            if let Some(mark) = self.board[a] {
                if self.board[b] == Some(mark) && self.board[c] == Some(mark) {
                    self.over = true;
                    self.winner = Some(mark);
                    return Some(GameOutcome::TicTacToe { winner: Some(mark) });
                }
            }
        }
        if self.board.iter().all(Option::is_some) {
            self.over = true;
            return Some(GameOutcome::TicTacToe { winner: None });
        }
        None
    }

    /// Three rows of `X`, `O` and `.`.
    pub fn render(&self) -> String {
        self.board
            .chunks(3)
            .map(|row| {
                row.iter()
                    .map(|c| match c {
                        Some(Mark::X) => 'X',
                        Some(Mark::O) => 'O',
                        None => '.',
                    })
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    #[test]
    fn row_win_for_player() {
        let mut game = TicTacToe::new();
        assert_eq!(game.place(0).unwrap(), None);
        assert_eq!(game.place(3).unwrap(), None);
        assert_eq!(game.place(1).unwrap(), None);
        assert_eq!(game.place(4).unwrap(), None);
        let outcome = game.place(2).unwrap().unwrap();
        assert_eq!(outcome, GameOutcome::TicTacToe { winner: Some(Mark::X) });
        assert_eq!(outcome.points(), 20);
        assert!(game.is_over());
    }

    #[test]
    fn draw_has_no_winner() {
        let mut game = TicTacToe::new();
        // X O X / X O O / O X X
        let moves = [0, 1, 2, 4, 3, 5, 7, 6];
        for m in moves {
            assert_eq!(game.place(m).unwrap(), None);
        }
        let outcome = game.place(8).unwrap().unwrap();
        assert_eq!(outcome, GameOutcome::TicTacToe { winner: None });
        assert_eq!(outcome.points(), 0);
    }

    #[test]
    fn rejects_taken_and_out_of_range_cells() {
        let mut game = TicTacToe::new();
        game.place(4).unwrap();
        assert!(game.place(4).is_err());
        assert!(game.place(9).is_err());
    }

    #[test]
    fn computer_fills_a_free_cell() {
        let mut rng = Pcg64::seed_from_u64(7);
        let mut game = TicTacToe::new();
        game.play_turn(4, &mut rng).unwrap();
        let filled = game.board().iter().filter(|c| c.is_some()).count();
        assert_eq!(filled, 2);
        assert_eq!(game.current(), Mark::X);
    }

    #[test]
    fn seeded_games_always_terminate() {
        for seed in 0..20 {
            let mut rng = Pcg64::seed_from_u64(seed);
            let mut game = TicTacToe::new();
            let mut outcome = None;
            while outcome.is_none() {
                let cell = game.free_cells()[0];
                outcome = game.play_turn(cell, &mut rng).unwrap();
            }
            assert!(game.is_over());
        }
    }
}
