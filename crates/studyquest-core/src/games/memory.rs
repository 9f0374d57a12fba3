//! Memory match: twelve face-down cards, six pairs.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::GameOutcome;
use crate::error::ValidationError;

const SYMBOLS: [&str; 13] = [
    "🐶", "🐱", "🐭", "🐹", "🐰", "🦊", "🐻", "🐼", "🐨", "🐯", "🦁", "🐮", "🐸",
];

pub const CARD_COUNT: usize = 12;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryMatch {
    cards: Vec<String>,
    matched: Vec<bool>,
    /// Face-up, not yet matched. At most two.
    flipped: Vec<usize>,
    moves: u32,
    score: u32,
}

impl MemoryMatch {
    /// Deal six random symbols as pairs, shuffled.
    pub fn deal<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut symbols: Vec<&str> = SYMBOLS.to_vec();
        symbols.shuffle(rng);
        let mut cards: Vec<String> = symbols
            .into_iter()
            .take(CARD_COUNT / 2)
            .flat_map(|s| [s.to_string(), s.to_string()])
            .collect();
        cards.shuffle(rng);
        Self::with_cards(cards)
    }

    fn with_cards(cards: Vec<String>) -> Self {
        let len = cards.len();
        Self {
            cards,
            matched: vec![false; len],
            flipped: Vec::new(),
            moves: 0,
            score: 0,
        }
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn is_face_up(&self, index: usize) -> bool {
        self.matched.get(index).copied().unwrap_or(false) || self.flipped.contains(&index)
    }

    pub fn is_won(&self) -> bool {
        self.matched.iter().all(|m| *m)
    }

    /// Table as rows of four; hidden cards show `?`.
    pub fn render(&self) -> String {
        self.cards
            .iter()
            .enumerate()
            .map(|(i, card)| if self.is_face_up(i) { card.as_str() } else { "?" })
            .collect::<Vec<_>>()
            .chunks(4)
            .map(|row| row.join(" "))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Flip a card. A mismatched pair from the previous turn is turned back
    /// down first. Returns [`GameOutcome::MemoryPair`] when this flip completes
    /// a match.
    pub fn flip(&mut self, index: usize) -> Result<Option<GameOutcome>, ValidationError> {
        if index >= self.cards.len() {
            return Err(ValidationError::InvalidValue {
                field: "card".into(),
                message: format!("{index} is outside the table"),
            });
        }
        if self.flipped.len() == 2 {
            self.flipped.clear();
        }
        if self.is_face_up(index) {
            return Err(ValidationError::InvalidValue {
                field: "card".into(),
                message: format!("{index} is already face up"),
            });
        }

        self.flipped.push(index);
        self.moves += 1;

        if let [a, b] = self.flipped[..] {
            if self.cards[a] == self.cards[b] {
                self.matched[a] = true;
                self.matched[b] = true;
                self.flipped.clear();
                self.score += 2;
                return Ok(Some(GameOutcome::MemoryPair));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    fn fixed() -> MemoryMatch {
        let cards = ["a", "b", "a", "b"].iter().map(|s| s.to_string()).collect();
        MemoryMatch::with_cards(cards)
    }

    #[test]
    fn deal_makes_six_pairs() {
        let mut rng = Pcg64::seed_from_u64(3);
        let game = MemoryMatch::deal(&mut rng);
        assert_eq!(game.cards.len(), CARD_COUNT);
        for card in &game.cards {
            assert_eq!(game.cards.iter().filter(|c| *c == card).count(), 2);
        }
    }

    #[test]
    fn matching_pair_scores() {
        let mut game = fixed();
        assert_eq!(game.flip(0).unwrap(), None);
        assert_eq!(game.flip(2).unwrap(), Some(GameOutcome::MemoryPair));
        assert!(game.is_face_up(0) && game.is_face_up(2));
        assert_eq!(game.score(), 2);
        assert_eq!(game.moves(), 2);
    }

    #[test]
    fn mismatch_turns_back_down_on_next_flip() {
        let mut game = fixed();
        game.flip(0).unwrap();
        assert_eq!(game.flip(1).unwrap(), None);
        assert!(game.is_face_up(1));
        game.flip(3).unwrap();
        assert!(!game.is_face_up(0));
        assert!(!game.is_face_up(1));
    }

    #[test]
    fn cannot_flip_face_up_card() {
        let mut game = fixed();
        game.flip(0).unwrap();
        assert!(game.flip(0).is_err());
        assert!(game.flip(10).is_err());
    }

    #[test]
    fn clearing_the_table_wins() {
        let mut game = fixed();
        game.flip(0).unwrap();
        game.flip(2).unwrap();
        game.flip(1).unwrap();
        game.flip(3).unwrap();
        assert!(game.is_won());
    }
}
