// ============================================
// src/games/pattern_puzzle.rs
// Find the missing term of a number or letter sequence
// ============================================

use std::fmt;
use std::time::Duration;

use crossterm::event::KeyCode;
use log::{debug, info};
use rand::Rng;
use rand::rngs::StdRng;
use rand::seq::{IndexedRandom, SliceRandom};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};

use super::{Difficulty, Game, GameDescriptor, PATTERN_PUZZLE, Phase, Summary};
use crate::scoring::{Tally, threshold_message};
use crate::timer::{Countdown, Delay};
use crate::ui::{self, OptionMark};

const NEXT_LEVEL_DELAY: Duration = Duration::from_secs(2);
const GAME_OVER_DELAY: Duration = Duration::from_millis(1500);
const PRIMES: [u64; 15] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47];

const LEVEL_MESSAGES: &[(u32, &str)] = &[
    (15, "🧩 Pattern Master!"),
    (10, "⭐ Pattern Expert!"),
    (7, "👍 Great Pattern Skills!"),
    (5, "💪 Good Progress!"),
];

// --------------------------------------------------
// Sequences
// --------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    Arithmetic,
    Geometric,
    Squares,
    Cubes,
    Primes,
    Multiples,
    Powers,
    Alphabet,
    Fibonacci,
    Factorials,
}

impl PatternKind {
    pub const ALL: [PatternKind; 10] = [
        PatternKind::Arithmetic,
        PatternKind::Geometric,
        PatternKind::Squares,
        PatternKind::Cubes,
        PatternKind::Primes,
        PatternKind::Multiples,
        PatternKind::Powers,
        PatternKind::Alphabet,
        PatternKind::Fibonacci,
        PatternKind::Factorials,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PatternKind::Arithmetic => "Arithmetic Sequence",
            PatternKind::Geometric => "Geometric Sequence",
            PatternKind::Squares => "Perfect Squares",
            PatternKind::Cubes => "Perfect Cubes",
            PatternKind::Primes => "Prime Numbers",
            PatternKind::Multiples => "Multiples",
            PatternKind::Powers => "Powers",
            PatternKind::Alphabet => "Alphabet Pattern",
            PatternKind::Fibonacci => "Fibonacci Sequence",
            PatternKind::Factorials => "Factorials",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Term {
    Number(u64),
    Letter(char),
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Number(n) => write!(f, "{n}"),
            Term::Letter(c) => write!(f, "{c}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternSettings {
    pub length: usize,
    pub options: usize,
    pub seconds: u32,
}

impl PatternSettings {
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Easy => Self { length: 4, options: 3, seconds: 30 },
            Difficulty::Medium => Self { length: 5, options: 4, seconds: 25 },
            Difficulty::Hard => Self { length: 6, options: 5, seconds: 20 },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    pub kind: PatternKind,
    /// The whole sequence, including the hidden term
    pub terms: Vec<Term>,
    pub missing: usize,
    pub options: Vec<Term>,
}

impl Pattern {
    pub fn answer(&self) -> Term {
        self.terms[self.missing]
    }
}

/// The full sequence of `kind` with `length` terms.
pub fn sequence(kind: PatternKind, length: usize, rng: &mut impl Rng) -> Vec<Term> {
    let n = length as u64;
    let numbers: Vec<u64> = match kind {
        PatternKind::Arithmetic => {
            let start = rng.random_range(1..=10);
            let diff = rng.random_range(2..=6);
            (0..n).map(|i| start + i * diff).collect()
        }
        PatternKind::Geometric => {
            let start = rng.random_range(2..=6u64);
            let ratio = rng.random_range(2..=4u64);
            (0..n).map(|i| start * ratio.pow(i as u32)).collect()
        }
        PatternKind::Squares => (1..=n).map(|i| i * i).collect(),
        PatternKind::Cubes => (1..=n).map(|i| i * i * i).collect(),
        PatternKind::Primes => PRIMES.iter().copied().take(length).collect(),
        PatternKind::Multiples => {
            let factor = rng.random_range(2..=8);
            (1..=n).map(|i| i * factor).collect()
        }
        PatternKind::Powers => {
            let base = rng.random_range(2..=4u64);
            (1..=n).map(|i| base.pow(i as u32)).collect()
        }
        PatternKind::Alphabet => {
            let step = rng.random_range(1..=3u8);
            return (0..length as u8).map(|i| Term::Letter((b'A' + i * step) as char)).collect();
        }
        PatternKind::Fibonacci => {
            let mut fib = vec![1u64, 1];
            while fib.len() < length {
                let next = fib[fib.len() - 1] + fib[fib.len() - 2];
                fib.push(next);
            }
            fib.truncate(length);
            fib
        }
        PatternKind::Factorials => (1..=n)
            .scan(1u64, |acc, i| {
                *acc *= i;
                Some(*acc)
            })
            .collect(),
    };
    numbers.into_iter().map(Term::Number).collect()
}

fn wrong_option(answer: Term, rng: &mut impl Rng) -> Option<Term> {
    match answer {
        Term::Number(value) => {
            let offset = rng.random_range(1..=15u64);
            let candidate = if rng.random_bool(0.5) {
                value.checked_add(offset)
            } else {
                value.checked_sub(offset)
            };
            candidate.filter(|v| *v > 0).map(Term::Number)
        }
        Term::Letter(_) => Some(Term::Letter((b'A' + rng.random_range(0..26u8)) as char)),
    }
}

/// A puzzle of `kind` with one hidden term and shuffled, distinct options.
pub fn generate_pattern(kind: PatternKind, settings: &PatternSettings, rng: &mut impl Rng) -> Pattern {
    let terms = sequence(kind, settings.length, rng);
    let missing = rng.random_range(0..terms.len());
    let answer = terms[missing];
    let mut options = vec![answer];
    while options.len() < settings.options {
        if let Some(wrong) = wrong_option(answer, rng) {
            if !options.contains(&wrong) {
                options.push(wrong);
            }
        }
    }
    options.shuffle(rng);
    Pattern { kind, terms, missing, options }
}

// --------------------------------------------------
// Game
// --------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Next {
    Level,
    GameOver,
}

pub struct PatternPuzzleGame {
    difficulty: Difficulty,
    settings: PatternSettings,
    phase: Phase,
    rng: StdRng,
    level: u32,
    tally: Tally,
    pattern: Pattern,
    clock: Countdown,
    /// Option picked for the current pattern; locks it
    selected: Option<usize>,
    next: Delay<Next>,
}

impl PatternPuzzleGame {
    pub fn new(difficulty: Difficulty, mut rng: StdRng) -> Self {
        let settings = PatternSettings::for_difficulty(difficulty);
        let pattern = Self::random_pattern(&settings, &mut rng);
        Self {
            difficulty,
            settings,
            phase: Phase::NotStarted,
            rng,
            level: 1,
            tally: Tally::default(),
            pattern,
            clock: Countdown::new(settings.seconds),
            selected: None,
            next: Delay::default(),
        }
    }

    fn random_pattern(settings: &PatternSettings, rng: &mut StdRng) -> Pattern {
        let kind = PatternKind::ALL.choose(rng).copied().unwrap_or(PatternKind::Arithmetic);
        generate_pattern(kind, settings, rng)
    }

    fn new_pattern(&mut self) {
        self.pattern = Self::random_pattern(&self.settings, &mut self.rng);
        self.selected = None;
        self.clock.reset(self.settings.seconds);
        debug!("pattern level {}: {:?}", self.level, self.pattern.kind);
    }

    /// Picks option `index`. Returns whether it was the hidden term.
    pub fn choose(&mut self, index: usize) -> Option<bool> {
        if self.phase != Phase::Playing || self.selected.is_some() || index >= self.pattern.options.len() {
            return None;
        }
        self.selected = Some(index);
        self.clock.pause();
        let correct = self.pattern.options[index] == self.pattern.answer();
        if correct {
            let points = self.level * 100 + self.tally.streak * 50;
            self.tally.award(points);
            self.next.schedule(NEXT_LEVEL_DELAY, Next::Level);
        } else {
            self.tally.miss();
            self.next.schedule(GAME_OVER_DELAY, Next::GameOver);
        }
        Some(correct)
    }

    fn game_over(&mut self) {
        self.phase = Phase::Finished;
        self.next.cancel();
        info!("pattern puzzle over at level {}", self.level);
    }

    fn mark(&self, index: usize) -> OptionMark {
        match self.selected {
            None => OptionMark::Plain,
            Some(_) if self.pattern.options[index] == self.pattern.answer() => OptionMark::Correct,
            Some(picked) if picked == index => OptionMark::Wrong,
            Some(_) => OptionMark::Faded,
        }
    }
}

impl Game for PatternPuzzleGame {
    fn descriptor(&self) -> &'static GameDescriptor {
        &PATTERN_PUZZLE
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    fn start(&mut self) {
        self.reset();
        self.phase = Phase::Playing;
        info!("pattern puzzle started on {}", self.difficulty);
    }

    fn reset(&mut self) {
        self.phase = Phase::NotStarted;
        self.level = 1;
        self.tally = Tally::default();
        self.next.cancel();
        self.new_pattern();
    }

    fn tick(&mut self, dt: Duration) {
        if self.phase != Phase::Playing {
            return;
        }
        match self.next.tick(dt) {
            Some(Next::Level) => {
                self.level += 1;
                self.new_pattern();
            }
            Some(Next::GameOver) => self.game_over(),
            None => {
                if self.clock.tick(dt) {
                    self.game_over();
                }
            }
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        if let KeyCode::Char(c) = key {
            if let Some(digit) = c.to_digit(10).filter(|d| *d >= 1) {
                self.choose(digit as usize - 1);
            }
        }
    }

    fn summary(&self) -> Summary {
        Summary {
            score: self.tally.score,
            correct: self.tally.correct,
            total: None,
            grade: None,
            message: threshold_message(self.level, LEVEL_MESSAGES, "🎯 Keep Practicing!"),
            stats: vec![
                ("Level reached", self.level.to_string()),
                ("Best streak", self.tally.max_streak.to_string()),
                ("Difficulty", self.difficulty.to_string()),
            ],
        }
    }

    fn draw(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(2),
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Min(3),
            ])
            .split(area);
        let mut status = ui::status_line(None, Some(self.clock.remaining()), self.tally.score);
        status.push_span(Span::raw(format!("   Level {}", self.level)).cyan());
        frame.render_widget(Paragraph::new(status), chunks[0]);
        frame.render_widget(
            Paragraph::new(self.pattern.kind.label()).magenta().centered(),
            chunks[1],
        );

        let terms: Vec<Span> = self
            .pattern
            .terms
            .iter()
            .enumerate()
            .map(|(i, term)| {
                if i == self.pattern.missing && self.selected.is_none() {
                    Span::styled(" ? ", Style::default().fg(Color::Black).bg(Color::Yellow).bold())
                } else {
                    Span::styled(format!(" {term} "), Style::default().fg(Color::White).bold())
                }
            })
            .flat_map(|span| [span, Span::raw("  ")])
            .collect();
        frame.render_widget(
            Paragraph::new(Line::from(terms))
                .centered()
                .block(Block::default().borders(Borders::ALL)),
            chunks[2],
        );

        let options: Vec<Line> = self
            .pattern
            .options
            .iter()
            .enumerate()
            .map(|(i, term)| ui::option_line(i, &term.to_string(), self.mark(i)))
            .collect();
        frame.render_widget(Paragraph::new(options), chunks[4]);
    }

    fn difficulty(&self) -> Option<Difficulty> {
        Some(self.difficulty)
    }

    fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
        self.settings = PatternSettings::for_difficulty(difficulty);
        self.reset();
    }
}
