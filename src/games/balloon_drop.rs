// ============================================
// src/games/balloon_drop.rs
// Pop rising balloons by lane; question balloons must not escape
// ============================================

use std::time::Duration;

use crossterm::event::KeyCode;
use log::{debug, info};
use rand::Rng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use super::{BALLOON_DROP, Game, GameDescriptor, Phase, Summary};
use crate::questions::{Answer, BALLOON_QUESTIONS, ChoiceQuestion};
use crate::scoring::Tally;
use crate::timer::Countdown;
use crate::ui::{self, OptionMark};

const ROUND_SECONDS: u32 = 60;
const SPAWN_EVERY: Duration = Duration::from_millis(1200);
pub const LANES: usize = 6;
const START_Y: f32 = -8.0;
const ESCAPE_Y: f32 = 8.0;
const MAX_ALIVE: usize = 15;
const QUESTION_CHANCE: f64 = 0.2;
const RIGHT_POINTS: u32 = 50;
const WRONG_POINTS: u32 = 25;
const LANE_WIDTH: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalloonColour {
    Red,
    Blue,
    Green,
    Yellow,
    Purple,
    Orange,
    Pink,
}

impl BalloonColour {
    pub const ALL: [BalloonColour; 7] = [
        BalloonColour::Red,
        BalloonColour::Blue,
        BalloonColour::Green,
        BalloonColour::Yellow,
        BalloonColour::Purple,
        BalloonColour::Orange,
        BalloonColour::Pink,
    ];

    pub fn points(&self) -> u32 {
        match self {
            BalloonColour::Red => 10,
            BalloonColour::Blue => 15,
            BalloonColour::Green => 20,
            BalloonColour::Yellow => 25,
            BalloonColour::Purple => 30,
            BalloonColour::Orange => 35,
            BalloonColour::Pink => 50,
        }
    }

    fn color(&self) -> Color {
        match self {
            BalloonColour::Red => Color::Red,
            BalloonColour::Blue => Color::Blue,
            BalloonColour::Green => Color::Green,
            BalloonColour::Yellow => Color::Yellow,
            BalloonColour::Purple => Color::Magenta,
            BalloonColour::Orange => Color::Rgb(255, 140, 0),
            BalloonColour::Pink => Color::Rgb(255, 105, 180),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Balloon {
    pub lane: usize,
    pub y: f32,
    pub colour: BalloonColour,
    pub question: bool,
}

/// Rising speed in units per second, `elapsed` seconds into the round.
pub fn speed(elapsed: f32) -> f32 {
    (1.5 + elapsed * 0.015).min(2.5)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pop {
    Points(u32),
    /// A question balloon; the game waits for an answer
    Question,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ending {
    Completed,
    Escaped,
}

struct OpenQuestion {
    question: &'static ChoiceQuestion,
    cursor: usize,
}

pub struct BalloonDropGame {
    phase: Phase,
    rng: StdRng,
    balloons: Vec<Balloon>,
    clock: Countdown,
    elapsed: Duration,
    spawn_carry: Duration,
    tally: Tally,
    popped: u32,
    question: Option<OpenQuestion>,
    /// Result of the last question, shown until the next pop
    last_answer: Option<bool>,
    ending: Option<Ending>,
}

impl BalloonDropGame {
    pub fn new(rng: StdRng) -> Self {
        Self {
            phase: Phase::NotStarted,
            rng,
            balloons: Vec::new(),
            clock: Countdown::new(ROUND_SECONDS),
            elapsed: Duration::ZERO,
            spawn_carry: Duration::ZERO,
            tally: Tally::default(),
            popped: 0,
            question: None,
            last_answer: None,
            ending: None,
        }
    }

    fn spawn(&mut self) {
        if self.balloons.len() >= MAX_ALIVE {
            return;
        }
        let colour = BalloonColour::ALL.choose(&mut self.rng).copied().unwrap_or(BalloonColour::Red);
        let balloon = Balloon {
            lane: self.rng.random_range(0..LANES),
            y: START_Y,
            colour,
            question: self.rng.random_bool(QUESTION_CHANCE),
        };
        self.balloons.push(balloon);
    }

    fn finish(&mut self, ending: Ending) {
        self.phase = Phase::Finished;
        self.ending = Some(ending);
        self.question = None;
        info!("balloon drop {ending:?}: score {}, popped {}", self.tally.score, self.popped);
    }

    /// Pops the highest balloon in `lane`.
    pub fn pop(&mut self, lane: usize) -> Option<Pop> {
        if self.phase != Phase::Playing || self.question.is_some() {
            return None;
        }
        let (at, _) = self
            .balloons
            .iter()
            .enumerate()
            .filter(|(_, b)| b.lane == lane)
            .max_by(|(_, a), (_, b)| a.y.total_cmp(&b.y))?;
        let balloon = self.balloons.remove(at);
        self.last_answer = None;
        if balloon.question {
            let question = BALLOON_QUESTIONS.choose(&mut self.rng)?;
            debug!("balloon question {}", question.id);
            self.question = Some(OpenQuestion { question, cursor: 0 });
            return Some(Pop::Question);
        }
        let points = balloon.colour.points();
        self.tally.add_points(points);
        self.popped += 1;
        Some(Pop::Points(points))
    }

    /// Answers the open question. Any answer scores; a right one scores more.
    pub fn answer(&mut self, index: usize) -> Option<bool> {
        let open = self.question.as_ref()?;
        if index >= open.question.options.len() {
            return None;
        }
        let correct = open.question.answer == Answer::Single(index);
        if correct {
            self.tally.award(RIGHT_POINTS);
        } else {
            self.tally.add_points(WRONG_POINTS);
            self.tally.miss();
        }
        self.popped += 1;
        self.question = None;
        self.last_answer = Some(correct);
        Some(correct)
    }

    fn rise(&mut self, dt: Duration) {
        let step = speed(self.elapsed.as_secs_f32()) * dt.as_secs_f32();
        for balloon in &mut self.balloons {
            balloon.y += step;
        }
        let escaped_question = self.balloons.iter().any(|b| b.y > ESCAPE_Y && b.question);
        self.balloons.retain(|b| b.y <= ESCAPE_Y);
        if escaped_question {
            self.finish(Ending::Escaped);
        }
    }

    fn field_lines(&self, height: usize) -> Vec<Line<'static>> {
        let rows = height.max(2);
        let mut grid: Vec<Vec<Option<&Balloon>>> = vec![vec![None; LANES]; rows];
        for balloon in &self.balloons {
            let t = ((ESCAPE_Y - balloon.y) / (ESCAPE_Y - START_Y)).clamp(0.0, 1.0);
            let row = (t * (rows - 1) as f32).round() as usize;
            grid[row][balloon.lane] = Some(balloon);
        }
        let mut lines: Vec<Line> = grid
            .into_iter()
            .map(|row| {
                let spans: Vec<Span> = row
                    .into_iter()
                    .map(|cell| match cell {
                        Some(b) => {
                            let glyph = if b.question { "(❓)" } else { "( )" };
                            Span::styled(
                                format!("{glyph:^width$}", width = LANE_WIDTH),
                                Style::default().fg(b.colour.color()).bold(),
                            )
                        }
                        None => Span::raw(" ".repeat(LANE_WIDTH)),
                    })
                    .collect();
                Line::from(spans)
            })
            .collect();
        let labels: Vec<Span> = (1..=LANES)
            .map(|lane| Span::raw(format!("{lane:^width$}", width = LANE_WIDTH)).gray())
            .collect();
        lines.push(Line::from(labels));
        lines
    }

    fn draw_question(&self, open: &OpenQuestion, frame: &mut Frame, area: Rect) {
        let popup = ui::centered_rect(70, 60, area);
        let mut lines = vec![Line::from(open.question.prompt).bold(), Line::from("")];
        lines.extend(open.question.options.iter().enumerate().map(|(i, text)| {
            let mark = if i == open.cursor { OptionMark::Cursor } else { OptionMark::Plain };
            ui::option_line(i, text, mark)
        }));
        frame.render_widget(Clear, popup);
        frame.render_widget(
            Paragraph::new(lines)
                .wrap(Wrap { trim: true })
                .block(Block::default().borders(Borders::ALL).title("❓ Quick question")),
            popup,
        );
    }
}

impl Game for BalloonDropGame {
    fn descriptor(&self) -> &'static GameDescriptor {
        &BALLOON_DROP
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    fn start(&mut self) {
        self.reset();
        self.phase = Phase::Playing;
        info!("balloon drop started");
    }

    fn reset(&mut self) {
        self.phase = Phase::NotStarted;
        self.balloons.clear();
        self.clock.reset(ROUND_SECONDS);
        self.elapsed = Duration::ZERO;
        self.spawn_carry = Duration::ZERO;
        self.tally = Tally::default();
        self.popped = 0;
        self.question = None;
        self.last_answer = None;
        self.ending = None;
    }

    fn tick(&mut self, dt: Duration) {
        // the field freezes while a question is open
        if self.phase != Phase::Playing || self.question.is_some() {
            return;
        }
        if self.clock.tick(dt) {
            self.finish(Ending::Completed);
            return;
        }
        self.rise(dt);
        if self.phase != Phase::Playing {
            return;
        }
        self.elapsed += dt;
        self.spawn_carry += dt;
        while self.spawn_carry >= SPAWN_EVERY {
            self.spawn_carry -= SPAWN_EVERY;
            self.spawn();
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        if let Some(open) = self.question.as_mut() {
            let options = open.question.options.len();
            match key {
                KeyCode::Up => open.cursor = open.cursor.saturating_sub(1),
                KeyCode::Down => open.cursor = (open.cursor + 1).min(options.saturating_sub(1)),
                KeyCode::Enter | KeyCode::Char(' ') => {
                    let cursor = open.cursor;
                    self.answer(cursor);
                }
                KeyCode::Char(c) => {
                    if let Some(digit) = c.to_digit(10).filter(|d| *d >= 1) {
                        self.answer(digit as usize - 1);
                    }
                }
                _ => {}
            }
            return;
        }
        if let KeyCode::Char(c) = key {
            if let Some(lane) = c.to_digit(10).filter(|d| (1..=LANES as u32).contains(d)) {
                self.pop(lane as usize - 1);
            }
        }
    }

    fn summary(&self) -> Summary {
        let message = match self.ending {
            Some(Ending::Escaped) => "💥 A question balloon escaped!",
            _ => "🎉 Time's up, great popping!",
        };
        Summary {
            score: self.tally.score,
            correct: self.tally.correct,
            total: None,
            grade: None,
            message,
            stats: vec![
                ("Balloons popped", self.popped.to_string()),
                ("Questions right", self.tally.correct.to_string()),
            ],
        }
    }

    fn draw(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(6), Constraint::Length(1)])
            .split(area);
        frame.render_widget(
            Paragraph::new(ui::status_line(None, Some(self.clock.remaining()), self.tally.score)),
            chunks[0],
        );
        let field_height = chunks[1].height.saturating_sub(3) as usize;
        frame.render_widget(
            Paragraph::new(self.field_lines(field_height)).block(Block::default().borders(Borders::ALL)),
            chunks[1],
        );
        let footer = match self.last_answer {
            Some(true) => Line::from(format!("✔ Correct! +{RIGHT_POINTS}")).green(),
            Some(false) => Line::from(format!("✘ Not quite, +{WRONG_POINTS}")).red(),
            None => Line::from(format!("Popped: {}", self.popped)).gray(),
        };
        frame.render_widget(Paragraph::new(footer), chunks[2]);

        if let Some(open) = &self.question {
            self.draw_question(open, frame, area);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn started() -> BalloonDropGame {
        let mut game = BalloonDropGame::new(StdRng::seed_from_u64(4));
        game.start();
        game
    }

    fn plain(lane: usize, y: f32, colour: BalloonColour) -> Balloon {
        Balloon { lane, y, colour, question: false }
    }

    #[test]
    fn speed_ramps_and_caps() {
        assert_eq!(speed(0.0), 1.5);
        assert!((speed(20.0) - 1.8).abs() < 1e-6);
        assert_eq!(speed(100.0), 2.5);
    }

    #[test]
    fn spawns_every_interval() {
        let mut game = started();
        game.tick(Duration::from_millis(1100));
        assert!(game.balloons.is_empty());
        game.tick(Duration::from_millis(100));
        assert_eq!(game.balloons.len(), 1);
        assert_eq!(game.balloons[0].y, START_Y);
        for _ in 0..3 {
            game.tick(SPAWN_EVERY);
        }
        assert_eq!(game.balloons.len(), 4);
        assert!(game.balloons.iter().all(|b| b.lane < LANES));
    }

    #[test]
    fn alive_balloons_are_capped() {
        let mut game = started();
        game.balloons = vec![plain(0, START_Y, BalloonColour::Red); MAX_ALIVE];
        game.tick(SPAWN_EVERY);
        assert_eq!(game.balloons.len(), MAX_ALIVE);
    }

    #[test]
    fn pop_takes_the_highest_balloon_in_a_lane() {
        let mut game = started();
        game.balloons = vec![
            plain(2, -3.0, BalloonColour::Red),
            plain(2, 1.0, BalloonColour::Pink),
            plain(4, 5.0, BalloonColour::Blue),
        ];
        game.handle_key(KeyCode::Char('3'));
        assert_eq!(game.tally.score, 50);
        assert_eq!(game.popped, 1);
        assert_eq!(game.balloons.len(), 2);
        assert_eq!(game.pop(0), None);
        assert_eq!(game.pop(2), Some(Pop::Points(10)));
    }

    #[test]
    fn question_balloon_freezes_field_until_answered() {
        let mut game = started();
        game.balloons = vec![
            Balloon { question: true, ..plain(1, 0.0, BalloonColour::Green) },
            plain(3, 0.0, BalloonColour::Green),
        ];
        assert_eq!(game.pop(1), Some(Pop::Question));
        assert!(game.question.is_some());

        game.tick(Duration::from_secs(5));
        assert_eq!(game.balloons[0].y, 0.0);
        assert_eq!(game.clock.remaining(), ROUND_SECONDS);
        assert_eq!(game.pop(3), None);

        let right = match game.question.as_ref().map(|q| q.question.answer) {
            Some(Answer::Single(i)) => i,
            other => panic!("unexpected answer {other:?}"),
        };
        assert_eq!(game.answer(right), Some(true));
        assert_eq!(game.tally.score, RIGHT_POINTS);
        assert_eq!(game.popped, 1);
        assert!(!game.question.is_some());
    }

    #[test]
    fn wrong_answer_still_scores() {
        let mut game = started();
        game.balloons = vec![Balloon { question: true, ..plain(0, 0.0, BalloonColour::Red) }];
        game.pop(0);
        let wrong = match game.question.as_ref().map(|q| q.question.answer) {
            Some(Answer::Single(i)) => (i + 1) % 4,
            other => panic!("unexpected answer {other:?}"),
        };
        assert_eq!(game.answer(wrong), Some(false));
        assert_eq!(game.tally.score, WRONG_POINTS);
        assert_eq!(game.popped, 1);
    }

    #[test]
    fn escaping_question_balloon_ends_the_game() {
        let mut game = started();
        game.balloons = vec![
            plain(0, 7.9, BalloonColour::Red),
            Balloon { question: true, ..plain(1, 7.9, BalloonColour::Red) },
        ];
        game.tick(Duration::from_millis(500));
        assert_eq!(game.phase(), Phase::Finished);
        assert_eq!(game.ending, Some(Ending::Escaped));
    }

    #[test]
    fn escaping_plain_balloon_is_just_removed() {
        let mut game = started();
        game.balloons = vec![plain(0, 7.9, BalloonColour::Red)];
        game.tick(Duration::from_millis(500));
        assert_eq!(game.phase(), Phase::Playing);
        assert!(game.balloons.is_empty());
    }

    #[test]
    fn surviving_the_round_completes_it() {
        let mut game = started();
        game.tick(Duration::from_secs(ROUND_SECONDS as u64));
        assert_eq!(game.ending, Some(Ending::Completed));
        assert_eq!(game.summary().message, "🎉 Time's up, great popping!");
    }
}
