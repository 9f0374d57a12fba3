//! Question rounds shared by math challenge, word scramble and quiz master.
//!
//! A round asks a fixed number of questions. Each answer is an outcome on its
//! own; after the last one `finish` yields the round-end bonus and starts over.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{Game, GameOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundKind {
    Math,
    Word,
    Quiz,
}

impl RoundKind {
    pub fn game(&self) -> Game {
        match self {
            RoundKind::Math => Game::MathChallenge,
            RoundKind::Word => Game::WordScramble,
            RoundKind::Quiz => Game::QuizMaster,
        }
    }

    pub fn answer_points(&self) -> u64 {
        match self {
            RoundKind::Math | RoundKind::Word => 5,
            RoundKind::Quiz => 10,
        }
    }

    pub fn round_multiplier(&self) -> u64 {
        match self {
            RoundKind::Math | RoundKind::Word => 10,
            RoundKind::Quiz => 20,
        }
    }

    pub fn length(&self) -> u32 {
        match self {
            RoundKind::Math | RoundKind::Word => 10,
            RoundKind::Quiz => 5,
        }
    }
}

/// One question of a round.
pub trait Puzzle: Sized {
    const KIND: RoundKind;

    fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self;
    fn prompt(&self) -> String;
    fn solution(&self) -> String;
    fn check(&self, answer: &str) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MathQuestion {
    pub text: String,
    pub answer: i64,
}

impl MathQuestion {
    fn build(a: i64, op: char, b: i64) -> Self {
        let (text, answer) = match op {
            '+' => (format!("{a} + {b}"), a + b),
            '-' => (format!("{a} - {b}"), a - b),
            _ => (format!("{a} × {b}"), a * b),
        };
        Self { text, answer }
    }
}

impl Puzzle for MathQuestion {
    const KIND: RoundKind = RoundKind::Math;

    fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let op = *['+', '-', '×'].choose(rng).unwrap_or(&'+');
        let a = rng.gen_range(1..=20);
        let b = rng.gen_range(1..=20);
        Self::build(a, op, b)
    }

    fn prompt(&self) -> String {
        self.text.clone()
    }

    fn solution(&self) -> String {
        self.answer.to_string()
    }

    fn check(&self, answer: &str) -> bool {
        answer.trim().parse::<i64>().map_or(false, |n| n == self.answer)
    }
}

pub const STUDY_WORDS: [&str; 10] = [
    "biology",
    "chemistry",
    "physics",
    "math",
    "programming",
    "homework",
    "pencil",
    "computer",
    "eraser",
    "notebook",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordPuzzle {
    pub word: String,
    pub scrambled: String,
}

impl Puzzle for WordPuzzle {
    const KIND: RoundKind = RoundKind::Word;

    fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let word = STUDY_WORDS.choose(rng).copied().unwrap_or("rust").to_string();
        let mut letters: Vec<char> = word.chars().collect();
        letters.shuffle(rng);
        Self {
            scrambled: letters.into_iter().collect(),
            word,
        }
    }

    fn prompt(&self) -> String {
        self.scrambled.clone()
    }

    fn solution(&self) -> String {
        self.word.clone()
    }

    fn check(&self, answer: &str) -> bool {
        answer.trim().to_lowercase() == self.word
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizQuestion {
    pub text: &'static str,
    pub answers: [&'static str; 4],
    pub correct: &'static str,
}

pub const TRIVIA: [QuizQuestion; 5] = [
    QuizQuestion {
        text: "What is the capital of France?",
        answers: ["London", "Berlin", "Paris", "Madrid"],
        correct: "Paris",
    },
    QuizQuestion {
        text: "Which planet is known as the Red Planet?",
        answers: ["Mars", "Venus", "Jupiter", "Saturn"],
        correct: "Mars",
    },
    QuizQuestion {
        text: "Who painted the Mona Lisa?",
        answers: ["Vincent van Gogh", "Leonardo da Vinci", "Pablo Picasso", "Claude Monet"],
        correct: "Leonardo da Vinci",
    },
    QuizQuestion {
        text: "What is the largest ocean on Earth?",
        answers: ["Atlantic Ocean", "Indian Ocean", "Arctic Ocean", "Pacific Ocean"],
        correct: "Pacific Ocean",
    },
    QuizQuestion {
        text: "Which element has the chemical symbol 'O'?",
        answers: ["Gold", "Silver", "Oxygen", "Iron"],
        correct: "Oxygen",
    },
];

impl Puzzle for QuizQuestion {
    const KIND: RoundKind = RoundKind::Quiz;

    fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        TRIVIA.choose(rng).cloned().unwrap_or_else(|| TRIVIA[0].clone())
    }

    fn prompt(&self) -> String {
        format!("{} [{}]", self.text, self.answers.join(" / "))
    }

    fn solution(&self) -> String {
        self.correct.to_string()
    }

    fn check(&self, answer: &str) -> bool {
        answer.trim() == self.correct
    }
}

/// A round of `P` questions.
#[derive(Debug, Clone)]
pub struct Round<P: Puzzle> {
    current: P,
    score: u32,
    answered: u32,
}

impl<P: Puzzle> Round<P> {
    pub fn start<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            current: P::generate(rng),
            score: 0,
            answered: 0,
        }
    }

    pub fn current(&self) -> &P {
        &self.current
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn answered(&self) -> u32 {
        self.answered
    }

    pub fn is_complete(&self) -> bool {
        self.answered >= P::KIND.length()
    }

    /// Grade `answer` against the current question and move to the next one
    /// unless the round is complete.
    pub fn answer<R: Rng + ?Sized>(&mut self, answer: &str, rng: &mut R) -> GameOutcome {
        let correct = self.current.check(answer);
        if correct {
            self.score += 1;
        }
        self.answered += 1;
        if !self.is_complete() {
            self.current = P::generate(rng);
        }
        GameOutcome::Answer {
            round: P::KIND,
            correct,
        }
    }

    /// Close the round, yielding the end bonus, and start a fresh one.
    pub fn finish<R: Rng + ?Sized>(&mut self, rng: &mut R) -> GameOutcome {
        let outcome = GameOutcome::RoundEnd {
            round: P::KIND,
            score: self.score,
        };
        *self = Self::start(rng);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    #[test]
    fn math_questions_stay_in_range() {
        let mut rng = Pcg64::seed_from_u64(11);
        for _ in 0..200 {
            let q = MathQuestion::generate(&mut rng);
            assert!((-19..=400).contains(&q.answer), "{}", q.text);
            assert!(q.check(&q.solution()));
        }
    }

    #[test]
    fn math_check_ignores_whitespace_and_rejects_text() {
        let q = MathQuestion::build(3, '×', 4);
        assert_eq!(q.text, "3 × 4");
        assert!(q.check(" 12 "));
        assert!(!q.check("twelve"));
        assert!(!q.check("13"));
    }

    #[test]
    fn word_puzzle_is_a_permutation() {
        let mut rng = Pcg64::seed_from_u64(5);
        let p = WordPuzzle::generate(&mut rng);
        let mut a: Vec<char> = p.word.chars().collect();
        let mut b: Vec<char> = p.scrambled.chars().collect();
        a.sort_unstable();
        b.sort_unstable();
        assert_eq!(a, b);
        assert!(p.check(&p.word.to_uppercase()));
    }

    #[test]
    fn quiz_checks_exact_answer() {
        let q = TRIVIA[1].clone();
        assert!(q.check("Mars"));
        assert!(!q.check("Venus"));
        assert!(q.prompt().contains("Red Planet"));
    }

    #[test]
    fn round_scores_and_finishes() {
        let mut rng = Pcg64::seed_from_u64(1);
        let mut round: Round<QuizQuestion> = Round::start(&mut rng);
        let mut earned = 0;
        while !round.is_complete() {
            let solution = round.current().solution();
            earned += round.answer(&solution, &mut rng).points();
        }
        assert_eq!(round.answered(), 5);
        assert_eq!(earned, 50);

        let end = round.finish(&mut rng);
        assert_eq!(end, GameOutcome::RoundEnd { round: RoundKind::Quiz, score: 5 });
        assert_eq!(end.points(), 100);
        assert_eq!(round.score(), 0);
        assert_eq!(round.answered(), 0);
    }

    #[test]
    fn wrong_answers_score_nothing() {
        let mut rng = Pcg64::seed_from_u64(2);
        let mut round: Round<MathQuestion> = Round::start(&mut rng);
        let outcome = round.answer("not a number", &mut rng);
        assert_eq!(outcome.points(), 0);
        assert_eq!(round.score(), 0);
        assert_eq!(round.finish(&mut rng).points(), 0);
    }
}
