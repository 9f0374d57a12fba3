//! Points, levels and content unlocks.
//!
//! ## Level policy
//!
//! After points are added, while `points >= level * 100` the level goes up by
//! one and the catalog entry at `min(level - 1, len - 1)` is unlocked. Once the
//! catalog is exhausted the last entry keeps being "unlocked", which the set
//! absorbs.
//!
//! The loop is evaluated in closed form: it stops at `points / 100 + 1`, and
//! only the first `len` new levels can insert anything.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::games::Game;

pub const POINTS_PER_LEVEL: u64 = 100;

/// Level given to a user with nothing persisted.
pub const DEFAULT_LEVEL: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardState {
    points: u64,
    level: u32,
    unlocked: BTreeSet<String>,
}

/// What a single `add_points` call changed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RewardDelta {
    pub awarded: u64,
    pub points: u64,
    pub from_level: u32,
    pub to_level: u32,
    /// Ids inserted by this call, in unlock order.
    pub unlocked: Vec<String>,
}

impl RewardDelta {
    pub fn leveled_up(&self) -> bool {
        self.to_level > self.from_level
    }

    pub fn is_empty(&self) -> bool {
        self.awarded == 0
    }
}

impl Default for RewardState {
    fn default() -> Self {
        Self::new(0, DEFAULT_LEVEL, BTreeSet::new())
    }
}

impl RewardState {
    /// Build from persisted parts. The first catalog entry and everything the
    /// level already earned are added to `unlocked`.
    pub fn new(points: u64, level: u32, unlocked: BTreeSet<String>) -> Self {
        let mut state = Self {
            points,
            level,
            unlocked,
        };
        state.unlocked.insert(Game::ALL[0].id().to_string());
        for game in Game::ALL {
            if game.unlock_level() <= state.level {
                state.unlocked.insert(game.id().to_string());
            }
        }
        state
    }

    pub fn points(&self) -> u64 {
        self.points
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn unlocked(&self) -> &BTreeSet<String> {
        &self.unlocked
    }

    pub fn is_unlocked(&self, content_id: &str) -> bool {
        self.unlocked.contains(content_id)
    }

    /// `points mod 100`.
    pub fn progress_within_level(&self) -> u64 {
        self.points % POINTS_PER_LEVEL
    }

    /// Progress bar value in `0.0..1.0`.
    pub fn progress_fraction(&self) -> f64 {
        self.progress_within_level() as f64 / POINTS_PER_LEVEL as f64
    }

    /// First catalog entry still locked.
    pub fn next_unlock(&self) -> Option<Game> {
        Game::ALL.into_iter().find(|g| !self.is_unlocked(g.id()))
    }

    pub fn add_points(&mut self, amount: u64) -> RewardDelta {
        let from_level = self.level;
        if amount == 0 {
            return RewardDelta {
                awarded: 0,
                points: self.points,
                from_level,
                to_level: from_level,
                unlocked: Vec::new(),
            };
        }

        self.points = self.points.saturating_add(amount);

        let mut unlocked = Vec::new();
        let target = self.points / POINTS_PER_LEVEL + 1;
        if target > self.level as u64 {
            let to_level = u32::try_from(target).unwrap_or(u32::MAX);
            let last = Game::ALL.len() - 1;
            // Levels past `from_level + len` only re-insert the last entry.
            let span_end = to_level.min(from_level.saturating_add(Game::ALL.len() as u32));
            for level in from_level.saturating_add(1)..=span_end {
                let idx = (level as usize - 1).min(last);
                let id = Game::ALL[idx].id();
                if self.unlocked.insert(id.to_string()) {
                    unlocked.push(id.to_string());
                }
            }
            self.level = to_level;
            tracing::debug!(from_level, to_level, ?unlocked, "level up");
        }

        RewardDelta {
            awarded: amount,
            points: self.points,
            from_level,
            to_level: self.level,
            unlocked,
        }
    }

    /// Entry point for untyped input: negative amounts are rejected and leave
    /// the state untouched.
    pub fn try_add_points(&mut self, amount: i64) -> Result<RewardDelta, ValidationError> {
        let amount = u64::try_from(amount).map_err(|_| ValidationError::NegativeAmount { amount })?;
        Ok(self.add_points(amount))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Literal transcription of the level-up loop, for comparison.
    fn iterative(state: &mut RewardState, amount: u64) {
        if amount == 0 {
            return;
        }
        state.points += amount;
        while state.points >= state.level as u64 * POINTS_PER_LEVEL {
            state.level += 1;
            let idx = (state.level as usize - 1).min(Game::ALL.len() - 1);
            state.unlocked.insert(Game::ALL[idx].id().to_string());
        }
    }

    fn raw(points: u64, level: u32) -> RewardState {
        RewardState {
            points,
            level,
            unlocked: [Game::TicTacToe.id().to_string()].into_iter().collect(),
        }
    }

    #[test]
    fn default_has_first_game_unlocked() {
        let state = RewardState::default();
        assert_eq!(state.points(), 0);
        assert_eq!(state.level(), 1);
        assert!(state.is_unlocked("Tic-Tac-Toe"));
        assert_eq!(state.unlocked().len(), 1);
        assert_eq!(state.next_unlock(), Some(Game::Pong));
    }

    #[test]
    fn hundred_points_from_level_zero() {
        let mut state = raw(0, 0);
        let delta = state.add_points(100);
        assert_eq!(state.points(), 100);
        assert_eq!(state.level(), 2);
        assert_eq!(delta.from_level, 0);
        assert_eq!(delta.to_level, 2);
        assert!(delta.leveled_up());
        assert_eq!(delta.unlocked, vec!["Pong".to_string()]);
        assert!(state.is_unlocked("Pong"));
    }

    #[test]
    fn zero_is_a_no_op_even_at_level_zero() {
        let mut state = raw(0, 0);
        let before = state.clone();
        let delta = state.add_points(0);
        assert_eq!(state, before);
        assert!(delta.is_empty());
        assert!(!delta.leveled_up());
    }

    #[test]
    fn below_threshold_keeps_level() {
        let mut state = RewardState::default();
        let delta = state.add_points(99);
        assert_eq!(state.level(), 1);
        assert!(delta.unlocked.is_empty());
        assert_eq!(state.progress_within_level(), 99);
        assert!((state.progress_fraction() - 0.99).abs() < 1e-9);
    }

    #[test]
    fn exact_threshold_levels_up() {
        let mut state = RewardState::default();
        state.add_points(100);
        assert_eq!(state.level(), 2);
        assert_eq!(state.progress_within_level(), 0);
        state.add_points(100);
        assert_eq!(state.level(), 3);
        assert!(state.is_unlocked("Flappy Bird"));
    }

    #[test]
    fn large_award_unlocks_whole_catalog_once() {
        let mut state = RewardState::default();
        let delta = state.add_points(5_000);
        assert_eq!(state.level(), 51);
        assert_eq!(state.unlocked().len(), Game::ALL.len());
        assert_eq!(delta.unlocked.len(), Game::ALL.len() - 1);
        assert_eq!(state.next_unlock(), None);

        let again = state.add_points(1_000);
        assert_eq!(state.level(), 61);
        assert!(again.unlocked.is_empty());
    }

    #[test]
    fn new_repairs_missing_unlocks() {
        let state = RewardState::new(450, 5, BTreeSet::new());
        for game in &Game::ALL[..5] {
            assert!(state.is_unlocked(game.id()), "{game}");
        }
        assert!(!state.is_unlocked(Game::WordScramble.id()));
    }

    #[test]
    fn new_keeps_unknown_ids() {
        let unlocked: BTreeSet<String> = ["Legacy Game".to_string()].into_iter().collect();
        let state = RewardState::new(0, 1, unlocked);
        assert!(state.is_unlocked("Legacy Game"));
        assert!(state.is_unlocked("Tic-Tac-Toe"));
    }

    #[test]
    fn negative_amount_is_rejected() {
        let mut state = RewardState::default();
        state.add_points(40);
        let before = state.clone();
        assert_eq!(
            state.try_add_points(-5),
            Err(ValidationError::NegativeAmount { amount: -5 })
        );
        assert_eq!(state, before);
        assert_eq!(state.try_add_points(60).unwrap().to_level, 2);
    }

    #[test]
    fn points_saturate() {
        let mut state = RewardState::default();
        state.add_points(u64::MAX);
        state.add_points(10);
        assert_eq!(state.points(), u64::MAX);
        assert_eq!(state.level(), u32::MAX);
    }

    proptest! {
        #[test]
        fn matches_iterative_policy(
            start_level in 0u32..4,
            amounts in prop::collection::vec(0u64..400, 0..40),
        ) {
            let mut fast = raw(0, start_level);
            let mut slow = raw(0, start_level);
            for amount in &amounts {
                fast.add_points(*amount);
                iterative(&mut slow, *amount);
                prop_assert_eq!(&fast, &slow);
            }
            prop_assert_eq!(fast.points(), amounts.iter().sum::<u64>());
        }

        #[test]
        fn unlock_set_never_shrinks(amounts in prop::collection::vec(0u64..300, 1..30)) {
            let mut state = RewardState::default();
            let mut last = state.unlocked().len();
            for amount in amounts {
                state.add_points(amount);
                prop_assert!(state.unlocked().len() >= last);
                last = state.unlocked().len();
            }
        }

        #[test]
        fn level_covers_catalog_invariant(amounts in prop::collection::vec(0u64..500, 1..20)) {
            let mut state = RewardState::default();
            for amount in amounts {
                state.add_points(amount);
            }
            for game in Game::ALL {
                if game.unlock_level() <= state.level() {
                    prop_assert!(state.is_unlocked(game.id()));
                }
            }
        }
    }
}
