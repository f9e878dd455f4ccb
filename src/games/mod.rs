// ============================================
// src/games/mod.rs
// Game registry and the interface every game implements
// ============================================

pub mod balloon_drop;
pub mod crossword;
pub mod matching;
pub mod mcq;
pub mod memory_test;
pub mod msq;
pub mod pattern_puzzle;
pub mod round;
pub mod time_rush;
pub mod true_false;
pub mod word_scramble;

use std::fmt;
use std::time::Duration;

use clap::ValueEnum;
use crossterm::event::KeyCode;
use rand::SeedableRng;
use rand::rngs::StdRng;
use ratatui::{Frame, layout::Rect};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::scoring::Grade;

// --------------------------------------------------
// Shared types
// --------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn next(self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Medium,
            Difficulty::Medium | Difficulty::Hard => Difficulty::Hard,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            Difficulty::Hard => Difficulty::Medium,
            Difficulty::Medium | Difficulty::Easy => Difficulty::Easy,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        };
        f.write_str(label)
    }
}

/// The three screens every game goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NotStarted,
    Playing,
    Finished,
}

/// What the results screen shows.
#[derive(Debug, Clone)]
pub struct Summary {
    pub score: u32,
    pub correct: u32,
    /// Items that could have been answered, for graded games
    pub total: Option<u32>,
    pub grade: Option<Grade>,
    pub message: &'static str,
    /// Extra `label: value` rows (streaks, hints, level...)
    pub stats: Vec<(&'static str, String)>,
}

pub trait Game {
    fn descriptor(&self) -> &'static GameDescriptor;

    fn phase(&self) -> Phase;

    /// Leaves the rules screen and begins play.
    fn start(&mut self);

    /// Back to the rules screen with a fresh state; cancels pending timers.
    fn reset(&mut self);

    fn tick(&mut self, dt: Duration);

    /// Input while playing. Keys that mean nothing right now are ignored.
    fn handle_key(&mut self, key: KeyCode);

    fn summary(&self) -> Summary;

    fn draw(&self, frame: &mut Frame, area: Rect);

    fn difficulty(&self) -> Option<Difficulty> {
        None
    }

    fn set_difficulty(&mut self, _difficulty: Difficulty) {}
}

// --------------------------------------------------
// MARK: Registry
// --------------------------------------------------

pub struct GameDescriptor {
    pub slug: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub rules: &'static [&'static str],
    pub playable: bool,
}

pub static BALLOON_DROP: GameDescriptor = GameDescriptor {
    slug: "balloon-drop",
    title: "Balloon Drop",
    description: "Pop balloons with correct answers",
    rules: &[
        "Balloons rise up six lanes; press 1-6 to pop the highest balloon in a lane.",
        "Each colour is worth different points (pink is worth 50!).",
        "❓ balloons ask a quick question: correct +50, wrong +25.",
        "Never let a ❓ balloon escape, or the game is over.",
        "Survive 60 seconds.",
    ],
    playable: true,
};

pub static CROSSWORD: GameDescriptor = GameDescriptor {
    slug: "crossword",
    title: "Crossword Puzzle",
    description: "Fill in the crossword with correct words",
    rules: &[
        "Tab / Shift-Tab jumps between clues; arrow keys move and set the direction.",
        "Enter shows a pointer: move it with the arrows and press Enter to select that cell.",
        "Type letters to fill cells, Backspace to clear.",
        "Each solved clue is worth 30 points, finishing early earns a time bonus.",
        "Press 1-9 to reveal the first letter of that clue (3 hints, -10 points each).",
        "3 minutes per puzzle.",
    ],
    playable: true,
};

pub static WORD_SCRAMBLE: GameDescriptor = GameDescriptor {
    slug: "word-scramble",
    title: "Word Scramble",
    description: "Unscramble letters to form correct words",
    rules: &[
        "Type letters to move them from the pool into the answer.",
        "Backspace returns the last letter, ↑ reshuffles the pool.",
        "←/→ pick a slot to type into, Delete empties it.",
        "Tab reveals a hint (2 per word, -10 points each).",
        "The word is checked as soon as every slot is filled.",
        "2 minutes per word, faster answers score more.",
    ],
    playable: true,
};

pub static TIME_RUSH: GameDescriptor = GameDescriptor {
    slug: "time-rush",
    title: "Time Rush",
    description: "Answer questions quickly before time runs out",
    rules: &[
        "Solve arithmetic problems before the per-problem timer hits zero.",
        "Type the answer and press Enter.",
        "Streaks multiply your points.",
        "The game ends when the timer runs out.",
    ],
    playable: true,
};

pub static MEMORY_TEST: GameDescriptor = GameDescriptor {
    slug: "memory-test",
    title: "Memory Test",
    description: "Remember and recall information",
    rules: &[
        "Watch the cells light up, then repeat the sequence.",
        "Move with the arrow keys and press Enter or Space to pick a cell.",
        "Each level adds one more step to the sequence.",
        "One wrong cell ends the game.",
    ],
    playable: true,
};

pub static MATCHING: GameDescriptor = GameDescriptor {
    slug: "matching",
    title: "Matching Game",
    description: "Match related items together",
    rules: &[
        "Press 1-5 to pick a term and a-e to pick its definition.",
        "Pick the same item again to unselect it.",
        "Each correct match is worth 20 points.",
        "60 seconds per set.",
    ],
    playable: true,
};

pub static MCQ: GameDescriptor = GameDescriptor {
    slug: "mcq",
    title: "Multiple Choice Questions",
    description: "Choose the correct answer from given options",
    rules: &[
        "30 seconds per question.",
        "Press 1-4, or move with ↑/↓ and press Enter.",
        "Each correct answer is worth 10 points.",
        "Your first answer is final.",
    ],
    playable: true,
};

pub static MSQ: GameDescriptor = GameDescriptor {
    slug: "msq",
    title: "Multiple Select Questions",
    description: "Select all correct answers from options",
    rules: &[
        "45 seconds per question.",
        "Press 1-4 (or Space on the highlighted option) to toggle a choice.",
        "Press Enter to submit; only the exact set of correct options scores.",
        "Each correct answer is worth 15 points.",
    ],
    playable: true,
};

pub static TRUE_FALSE: GameDescriptor = GameDescriptor {
    slug: "true-false",
    title: "True or False Quiz",
    description: "Quick true or false questions with explanations",
    rules: &[
        "Press T or F (or ←/→ and Enter).",
        "Correct answers score 50 plus 2 points per second left.",
        "30 seconds per statement; an explanation follows every answer.",
    ],
    playable: true,
};

pub static PATTERN_PUZZLE: GameDescriptor = GameDescriptor {
    slug: "pattern-puzzle",
    title: "Pattern Puzzle",
    description: "Find the pattern and complete the sequence",
    rules: &[
        "Find the missing term of the sequence.",
        "Press the number of your choice.",
        "Levels and streaks raise your points.",
        "A wrong answer or running out of time ends the game.",
    ],
    playable: true,
};

macro_rules! coming_soon {
    ($name:ident, $slug:literal, $title:literal, $description:literal) => {
        pub static $name: GameDescriptor = GameDescriptor {
            slug: $slug,
            title: $title,
            description: $description,
            rules: &[],
            playable: false,
        };
    };
}

coming_soon!(DRAG_DROP, "drag-&-drop", "Drag & Drop", "Drag items to their correct places");
coming_soon!(EQUATION_BUILDER, "equation-builder", "Equation Builder", "Build mathematical equations step by step");
coming_soon!(MATH_BINGO, "math-bingo", "Math Bingo", "Solve math problems to complete bingo");
coming_soon!(FRACTION_PIZZA, "fraction-pizza", "Fraction Pizza", "Learn fractions with pizza slices");
coming_soon!(ENERGY_MATCH, "energy-match", "Energy Match", "Match different forms of energy");
coming_soon!(WORD_LADDER, "word-ladder", "Word Ladder", "Transform one word to another by changing letters");
coming_soon!(BODY_ORGAN_MATCH, "body-organ-match", "Body Organ Match", "Match organs with their functions");
coming_soon!(GEOMETRY_DASH, "geometry-dash", "Geometry Dash", "Navigate through geometric shapes and obstacles");

/// Home screen order.
pub static REGISTRY: [&GameDescriptor; 18] = [
    &BALLOON_DROP,
    &CROSSWORD,
    &WORD_SCRAMBLE,
    &TIME_RUSH,
    &MEMORY_TEST,
    &MATCHING,
    &MCQ,
    &MSQ,
    &TRUE_FALSE,
    &DRAG_DROP,
    &EQUATION_BUILDER,
    &MATH_BINGO,
    &PATTERN_PUZZLE,
    &FRACTION_PIZZA,
    &ENERGY_MATCH,
    &WORD_LADDER,
    &BODY_ORGAN_MATCH,
    &GEOMETRY_DASH,
];

/// `"Time Rush"` -> `"time-rush"`
pub fn slugify(name: &str) -> String {
    name.split_whitespace()
        .map(|part| part.to_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}

/// Looks a game up by slug or by its display name.
pub fn find(name: &str) -> Option<&'static GameDescriptor> {
    let slug = slugify(name);
    REGISTRY
        .iter()
        .copied()
        .find(|game| game.slug == slug || slugify(game.title) == slug)
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("unknown game '{0}', run `list` to see every game")]
    Unknown(String),

    #[error("{0} is coming soon")]
    ComingSoon(&'static str),
}

pub fn create(name: &str, difficulty: Difficulty) -> Result<Box<dyn Game>, GameError> {
    create_with_rng(name, difficulty, StdRng::from_os_rng())
}

pub fn create_with_rng(name: &str, difficulty: Difficulty, rng: StdRng) -> Result<Box<dyn Game>, GameError> {
    let descriptor = find(name).ok_or_else(|| GameError::Unknown(name.to_string()))?;
    let game: Box<dyn Game> = match descriptor.slug {
        "mcq" => Box::new(mcq::McqGame::new()),
        "msq" => Box::new(msq::MsqGame::new()),
        "true-false" => Box::new(true_false::TrueFalseGame::new()),
        "matching" => Box::new(matching::MatchingGame::new(rng)),
        "crossword" => Box::new(crossword::CrosswordGame::new()),
        "word-scramble" => Box::new(word_scramble::WordScrambleGame::new(rng)),
        "time-rush" => Box::new(time_rush::TimeRushGame::new(difficulty, rng)),
        "memory-test" => Box::new(memory_test::MemoryTestGame::new(difficulty, rng)),
        "pattern-puzzle" => Box::new(pattern_puzzle::PatternPuzzleGame::new(difficulty, rng)),
        "balloon-drop" => Box::new(balloon_drop::BalloonDropGame::new(rng)),
        _ => return Err(GameError::ComingSoon(descriptor.title)),
    };
    log::debug!("created game {}", descriptor.slug);
    Ok(game)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_accepts_slug_and_title() {
        assert_eq!(find("time-rush").map(|g| g.slug), Some("time-rush"));
        assert_eq!(find("Time Rush").map(|g| g.slug), Some("time-rush"));
        assert_eq!(find("Multiple Choice Questions").map(|g| g.slug), Some("mcq"));
        assert!(find("chess").is_none());
    }

    #[test]
    fn every_playable_game_can_be_created() {
        for game in REGISTRY.iter().filter(|g| g.playable) {
            let created = create_with_rng(game.slug, Difficulty::Easy, StdRng::seed_from_u64(1))
                .unwrap_or_else(|err| panic!("{}: {err}", game.slug));
            assert_eq!(created.descriptor().slug, game.slug);
            assert_eq!(created.phase(), Phase::NotStarted);
            assert!(!game.rules.is_empty());
        }
    }

    #[test]
    fn placeholders_are_coming_soon() {
        let err = create_with_rng("word-ladder", Difficulty::Easy, StdRng::seed_from_u64(1)).err();
        assert_eq!(err, Some(GameError::ComingSoon("Word Ladder")));
        let err = create_with_rng("nope", Difficulty::Easy, StdRng::seed_from_u64(1)).err();
        assert_eq!(err, Some(GameError::Unknown("nope".to_string())));
    }

    #[test]
    fn slugs_are_unique() {
        let mut slugs: Vec<_> = REGISTRY.iter().map(|g| g.slug).collect();
        slugs.sort_unstable();
        slugs.dedup();
        assert_eq!(slugs.len(), REGISTRY.len());
    }

    #[test]
    fn difficulty_steps_clamp() {
        assert_eq!(Difficulty::Easy.previous(), Difficulty::Easy);
        assert_eq!(Difficulty::Easy.next(), Difficulty::Medium);
        assert_eq!(Difficulty::Hard.next(), Difficulty::Hard);
    }
}
