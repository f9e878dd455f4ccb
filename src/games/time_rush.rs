// ============================================
// src/games/time_rush.rs
// Arithmetic against a per-problem clock
// ============================================

use std::fmt;
use std::time::Duration;

use crossterm::event::KeyCode;
use log::{debug, info};
use rand::Rng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use ratatui::{prelude::*, widgets::Paragraph};

use super::{Difficulty, Game, GameDescriptor, Phase, Summary, TIME_RUSH};
use crate::scoring::{Tally, percentage, threshold_message};
use crate::timer::{Countdown, Delay};
use crate::ui;

const FEEDBACK: Duration = Duration::from_millis(500);
const MAX_INPUT: usize = 7;

const ACCURACY_MESSAGES: &[(u32, &str)] = &[
    (90, "🏆 Math Genius!"),
    (75, "⭐ Great Job!"),
    (60, "👍 Nice Work!"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Add,
    Sub,
    Mul,
    Div,
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Op::Add => "+",
            Op::Sub => "−",
            Op::Mul => "×",
            Op::Div => "÷",
        };
        f.write_str(symbol)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RushSettings {
    pub seconds: u32,
    /// Largest operand for + and −
    pub max: i64,
    pub ops: &'static [Op],
}

impl RushSettings {
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Easy => Self { seconds: 10, max: 10, ops: &[Op::Add, Op::Sub] },
            Difficulty::Medium => Self { seconds: 8, max: 50, ops: &[Op::Add, Op::Sub, Op::Mul] },
            Difficulty::Hard => Self { seconds: 6, max: 100, ops: &[Op::Add, Op::Sub, Op::Mul, Op::Div] },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Problem {
    pub a: i64,
    pub b: i64,
    pub op: Op,
    pub answer: i64,
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} = ?", self.a, self.op, self.b)
    }
}

/// Random problem for `settings`. Subtraction never goes negative and
/// division always comes out whole.
pub fn generate_problem(settings: &RushSettings, rng: &mut impl Rng) -> Problem {
    let op = settings.ops.choose(rng).copied().unwrap_or(Op::Add);
    match op {
        Op::Add => {
            let a = rng.random_range(1..=settings.max);
            let b = rng.random_range(1..=settings.max);
            Problem { a, b, op, answer: a + b }
        }
        Op::Sub => {
            let a = rng.random_range(1..=settings.max);
            let b = rng.random_range(1..=a);
            Problem { a, b, op, answer: a - b }
        }
        Op::Mul => {
            let a = rng.random_range(1..=12);
            let b = rng.random_range(1..=12);
            Problem { a, b, op, answer: a * b }
        }
        Op::Div => {
            let answer = rng.random_range(1..=12);
            let b = rng.random_range(1..=12);
            Problem { a: answer * b, b, op, answer }
        }
    }
}

/// Ten points, plus ten more for every five answers already in the streak.
pub fn points_for(streak: u32) -> u32 {
    (streak / 5 + 1).max(1) * 10
}

pub struct TimeRushGame {
    difficulty: Difficulty,
    settings: RushSettings,
    phase: Phase,
    rng: StdRng,
    problem: Problem,
    input: String,
    clock: Countdown,
    feedback: Delay,
    last_correct: Option<bool>,
    tally: Tally,
}

impl TimeRushGame {
    pub fn new(difficulty: Difficulty, mut rng: StdRng) -> Self {
        let settings = RushSettings::for_difficulty(difficulty);
        let problem = generate_problem(&settings, &mut rng);
        Self {
            difficulty,
            settings,
            phase: Phase::NotStarted,
            rng,
            problem,
            input: String::new(),
            clock: Countdown::new(settings.seconds),
            feedback: Delay::default(),
            last_correct: None,
            tally: Tally::default(),
        }
    }

    pub fn accuracy(&self) -> u32 {
        percentage(self.tally.correct, self.tally.correct + self.tally.wrong).round() as u32
    }

    fn next_problem(&mut self) {
        self.problem = generate_problem(&self.settings, &mut self.rng);
        self.input.clear();
        self.last_correct = None;
        self.clock.reset(self.settings.seconds);
    }

    /// Checks the typed answer. Ignored while feedback is showing or when
    /// nothing has been typed; text that is not a number counts as wrong.
    pub fn submit(&mut self) -> Option<bool> {
        if self.phase != Phase::Playing || self.feedback.is_pending() || self.input.trim().is_empty() {
            return None;
        }
        let correct = self.input.trim().parse::<i64>() == Ok(self.problem.answer);
        if correct {
            self.tally.award(points_for(self.tally.streak));
        } else {
            self.tally.miss();
        }
        debug!("time rush {}: typed {:?}, correct={correct}", self.problem, self.input);
        self.last_correct = Some(correct);
        self.clock.pause();
        self.feedback.schedule(FEEDBACK, ());
        Some(correct)
    }

    fn game_over(&mut self) {
        self.phase = Phase::Finished;
        self.feedback.cancel();
        info!(
            "time rush over: score {} after {} problems",
            self.tally.score,
            self.tally.correct + self.tally.wrong
        );
    }
}

impl Game for TimeRushGame {
    fn descriptor(&self) -> &'static GameDescriptor {
        &TIME_RUSH
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    fn start(&mut self) {
        self.reset();
        self.phase = Phase::Playing;
        info!("time rush started on {}", self.difficulty);
    }

    fn reset(&mut self) {
        self.phase = Phase::NotStarted;
        self.tally = Tally::default();
        self.feedback.cancel();
        self.next_problem();
    }

    fn tick(&mut self, dt: Duration) {
        if self.phase != Phase::Playing {
            return;
        }
        if self.feedback.tick(dt).is_some() {
            self.next_problem();
            return;
        }
        if self.clock.tick(dt) {
            self.game_over();
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        if self.phase != Phase::Playing || self.feedback.is_pending() {
            return;
        }
        match key {
            KeyCode::Char(c) if (c.is_ascii_digit() || c == '-') && self.input.len() < MAX_INPUT => {
                self.input.push(c);
            }
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Enter => {
                self.submit();
            }
            _ => {}
        }
    }

    fn summary(&self) -> Summary {
        let accuracy = self.accuracy();
        Summary {
            score: self.tally.score,
            correct: self.tally.correct,
            total: Some(self.tally.correct + self.tally.wrong),
            grade: None,
            message: threshold_message(accuracy, ACCURACY_MESSAGES, "💪 Keep Practicing!"),
            stats: vec![
                ("Accuracy", format!("{accuracy}%")),
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
                Constraint::Length(2),
                Constraint::Min(1),
            ])
            .split(area);
        frame.render_widget(
            Paragraph::new(ui::status_line(None, Some(self.clock.remaining()), self.tally.score)),
            chunks[0],
        );
        frame.render_widget(
            Paragraph::new(self.problem.to_string()).white().bold().centered(),
            chunks[2],
        );
        let input = match self.last_correct {
            Some(true) => Line::from(format!("{} ✔", self.input)).green().bold(),
            Some(false) => Line::from(format!("{} ✘  ({})", self.input, self.problem.answer)).red().bold(),
            None => Line::from(format!("> {}_", self.input)).yellow(),
        };
        frame.render_widget(Paragraph::new(input).centered(), chunks[3]);
        frame.render_widget(
            Paragraph::new(format!("Streak: {}   Difficulty: {}", self.tally.streak, self.difficulty))
                .gray()
                .centered(),
            chunks[4],
        );
    }

    fn difficulty(&self) -> Option<Difficulty> {
        Some(self.difficulty)
    }

    fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
        self.settings = RushSettings::for_difficulty(difficulty);
        self.reset();
    }
}
