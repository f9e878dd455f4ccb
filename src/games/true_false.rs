// ============================================
// src/games/true_false.rs
// True or false statements with explanations
// ============================================

use std::time::Duration;

use crossterm::event::KeyCode;
use log::{debug, info};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, Wrap},
};

use super::round::{RoundEvent, Rounds};
use super::{Game, GameDescriptor, Phase, Summary, TRUE_FALSE};
use crate::questions::{TRUE_FALSE_ITEMS, TrueFalseItem};
use crate::scoring::{STANDARD_SCALE, Tally};
use crate::ui;

const SECONDS_PER_ITEM: u32 = 30;
const BASE_POINTS: u32 = 50;
const FEEDBACK: Duration = Duration::from_secs(2);

pub struct TrueFalseGame {
    items: &'static [TrueFalseItem],
    rounds: Rounds,
    tally: Tally,
    /// The player's answer; stays `None` when the item timed out
    user_answer: Option<bool>,
    /// Highlighted button: `true` on the left
    cursor: bool,
}

/// 50 points plus two per second still on the clock.
pub fn points_for(seconds_left: u32) -> u32 {
    BASE_POINTS + seconds_left * 2
}

impl TrueFalseGame {
    pub fn new() -> Self {
        Self::with_items(TRUE_FALSE_ITEMS)
    }

    pub fn with_items(items: &'static [TrueFalseItem]) -> Self {
        Self {
            items,
            rounds: Rounds::new(items.len(), SECONDS_PER_ITEM),
            tally: Tally::default(),
            user_answer: None,
            cursor: true,
        }
    }

    pub fn current(&self) -> &'static TrueFalseItem {
        &self.items[self.rounds.index()]
    }

    pub fn answer(&mut self, answer: bool) -> Option<bool> {
        if !self.rounds.is_open() {
            return None;
        }
        let item = self.current();
        let correct = answer == item.answer;
        if correct {
            self.tally.award(points_for(self.rounds.seconds_left()));
        } else {
            self.tally.miss();
        }
        self.user_answer = Some(answer);
        self.rounds.lock_then_advance(FEEDBACK);
        debug!("true/false {:?}: answered {answer}, correct={correct}", item.statement);
        Some(correct)
    }

    fn on_round_event(&mut self, event: RoundEvent) {
        match event {
            RoundEvent::TimedOut => self.rounds.lock_then_advance(FEEDBACK),
            RoundEvent::Advanced => {
                self.user_answer = None;
                self.cursor = true;
            }
            RoundEvent::Finished => {
                info!("true/false finished: {} / {}", self.tally.correct, self.items.len());
            }
            RoundEvent::Idle => {}
        }
    }

    fn feedback(&self) -> Vec<Line<'static>> {
        let item = self.current();
        let verdict = match self.user_answer {
            Some(answer) if answer == item.answer => Line::from("✔ Correct!").green().bold(),
            Some(_) => Line::from("✘ Incorrect").red().bold(),
            None => Line::from("⏱ Time's up!").yellow().bold(),
        };
        let truth = if item.answer { "TRUE" } else { "FALSE" };
        vec![
            verdict,
            Line::from(format!("The statement is {truth}.")),
            Line::from(item.explanation).gray(),
        ]
    }
}

impl Default for TrueFalseGame {
    fn default() -> Self {
        Self::new()
    }
}

impl Game for TrueFalseGame {
    fn descriptor(&self) -> &'static GameDescriptor {
        &TRUE_FALSE
    }

    fn phase(&self) -> Phase {
        self.rounds.phase()
    }

    fn start(&mut self) {
        self.reset();
        self.rounds.start();
        info!("true/false started with {} statements", self.items.len());
    }

    fn reset(&mut self) {
        self.rounds.reset();
        self.tally = Tally::default();
        self.user_answer = None;
        self.cursor = true;
    }

    fn tick(&mut self, dt: Duration) {
        let event = self.rounds.tick(dt);
        self.on_round_event(event);
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('t') | KeyCode::Char('T') => {
                self.answer(true);
            }
            KeyCode::Char('f') | KeyCode::Char('F') => {
                self.answer(false);
            }
            KeyCode::Left => self.cursor = true,
            KeyCode::Right => self.cursor = false,
            KeyCode::Enter | KeyCode::Char(' ') => {
                self.answer(self.cursor);
            }
            _ => {}
        }
    }

    fn summary(&self) -> Summary {
        let total = self.items.len() as u32;
        let (grade, message) = STANDARD_SCALE.grade(self.tally.correct, total);
        Summary {
            score: self.tally.score,
            correct: self.tally.correct,
            total: Some(total),
            grade: Some(grade),
            message,
            stats: vec![("Best streak", self.tally.max_streak.to_string())],
        }
    }

    fn draw(&self, frame: &mut Frame, area: Rect) {
        let item = self.current();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(4),
                Constraint::Length(2),
                Constraint::Min(3),
            ])
            .split(area);

        frame.render_widget(
            Paragraph::new(ui::status_line(
                Some((self.rounds.index(), self.rounds.total())),
                Some(self.rounds.seconds_left()),
                self.tally.score,
            )),
            chunks[0],
        );
        frame.render_widget(
            Paragraph::new(vec![
                Line::from(item.category).magenta(),
                Line::from(item.statement).white().bold(),
            ])
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::BOTTOM)),
            chunks[2],
        );

        let button = |label: &'static str, value: bool| {
            let style = if self.rounds.is_locked() {
                if value == item.answer {
                    Style::default().fg(Color::Green).bold()
                } else {
                    Style::default().fg(Color::DarkGray)
                }
            } else if value == self.cursor {
                Style::default().fg(Color::Black).bg(Color::White)
            } else {
                Style::default().fg(Color::White)
            };
            Span::styled(format!(" {label} "), style)
        };
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                button("[T] TRUE", true),
                Span::raw("     "),
                button("[F] FALSE", false),
            ]))
            .centered(),
            chunks[3],
        );

        if self.rounds.is_locked() {
            frame.render_widget(Paragraph::new(self.feedback()).wrap(Wrap { trim: true }), chunks[4]);
        }
    }
}
