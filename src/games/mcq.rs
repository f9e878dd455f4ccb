// ============================================
// src/games/mcq.rs
// Multiple choice quiz
// ============================================

use std::time::Duration;

use crossterm::event::KeyCode;
use log::{debug, info};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, Wrap},
};

use super::round::{RoundEvent, Rounds};
use super::{Game, GameDescriptor, MCQ, Phase, Summary};
use crate::questions::{Answer, ChoiceQuestion, mcq_questions};
use crate::scoring::{STANDARD_SCALE, Tally};
use crate::ui::{self, OptionMark};

const SECONDS_PER_QUESTION: u32 = 30;
const POINTS: u32 = 10;
const FEEDBACK: Duration = Duration::from_millis(1500);

pub struct McqGame {
    questions: Vec<&'static ChoiceQuestion>,
    rounds: Rounds,
    tally: Tally,
    /// Option picked for the current question
    selected: Option<usize>,
    cursor: usize,
}

impl McqGame {
    pub fn new() -> Self {
        Self::with_questions(mcq_questions())
    }

    pub fn with_questions(questions: Vec<&'static ChoiceQuestion>) -> Self {
        let rounds = Rounds::new(questions.len(), SECONDS_PER_QUESTION);
        Self {
            questions,
            rounds,
            tally: Tally::default(),
            selected: None,
            cursor: 0,
        }
    }

    pub fn current(&self) -> &'static ChoiceQuestion {
        self.questions[self.rounds.index()]
    }

    /// Locks in an answer. Returns whether it was correct, or `None` when
    /// the answer was ignored (already locked, not playing, bad index).
    pub fn answer(&mut self, index: usize) -> Option<bool> {
        let question = self.current();
        if !self.rounds.is_open() || index >= question.options.len() {
            return None;
        }
        self.selected = Some(index);
        let correct = question.answer == Answer::Single(index);
        if correct {
            self.tally.award(POINTS);
        } else {
            self.tally.miss();
        }
        debug!("mcq {}: picked {index}, correct={correct}", question.id);
        self.rounds.lock_then_advance(FEEDBACK);
        Some(correct)
    }

    fn on_round_event(&mut self, event: RoundEvent) {
        match event {
            RoundEvent::TimedOut => {
                debug!("mcq {}: timed out", self.current().id);
                let next = self.rounds.advance();
                self.on_round_event(next);
            }
            RoundEvent::Advanced => {
                self.selected = None;
                self.cursor = 0;
            }
            RoundEvent::Finished => {
                info!("mcq finished: {} / {}", self.tally.correct, self.questions.len());
            }
            RoundEvent::Idle => {}
        }
    }

    fn mark(&self, index: usize) -> OptionMark {
        let question = self.current();
        if self.rounds.is_locked() {
            if question.answer == Answer::Single(index) {
                OptionMark::Correct
            } else if self.selected == Some(index) {
                OptionMark::Wrong
            } else {
                OptionMark::Faded
            }
        } else if index == self.cursor {
            OptionMark::Cursor
        } else {
            OptionMark::Plain
        }
    }
}

impl Default for McqGame {
    fn default() -> Self {
        Self::new()
    }
}

impl Game for McqGame {
    fn descriptor(&self) -> &'static GameDescriptor {
        &MCQ
    }

    fn phase(&self) -> Phase {
        self.rounds.phase()
    }

    fn start(&mut self) {
        self.reset();
        self.rounds.start();
        info!("mcq started with {} questions", self.questions.len());
    }

    fn reset(&mut self) {
        self.rounds.reset();
        self.tally = Tally::default();
        self.selected = None;
        self.cursor = 0;
    }

    fn tick(&mut self, dt: Duration) {
        let event = self.rounds.tick(dt);
        self.on_round_event(event);
    }

    fn handle_key(&mut self, key: KeyCode) {
        let options = self.current().options.len();
        match key {
            KeyCode::Up => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Down => self.cursor = (self.cursor + 1).min(options.saturating_sub(1)),
            KeyCode::Enter | KeyCode::Char(' ') => {
                self.answer(self.cursor);
            }
            KeyCode::Char(c) => {
                if let Some(digit) = c.to_digit(10).filter(|d| *d >= 1) {
                    self.answer(digit as usize - 1);
                }
            }
            _ => {}
        }
    }

    fn summary(&self) -> Summary {
        let total = self.questions.len() as u32;
        let (grade, message) = STANDARD_SCALE.grade(self.tally.correct, total);
        Summary {
            score: self.tally.score,
            correct: self.tally.correct,
            total: Some(total),
            grade: Some(grade),
            message,
            stats: Vec::new(),
        }
    }

    fn draw(&self, frame: &mut Frame, area: Rect) {
        let question = self.current();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // status
                Constraint::Length(1),
                Constraint::Length(4), // prompt
                Constraint::Min(4),    // options
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
            Paragraph::new(question.tag()).style(Style::default().fg(Color::DarkGray)),
            chunks[1],
        );
        frame.render_widget(
            Paragraph::new(question.prompt)
                .style(Style::default().fg(Color::White).bold())
                .wrap(Wrap { trim: true })
                .block(Block::default().borders(Borders::BOTTOM)),
            chunks[2],
        );
        let lines: Vec<Line> = question
            .options
            .iter()
            .enumerate()
            .map(|(i, text)| ui::option_line(i, text, self.mark(i)))
            .collect();
        frame.render_widget(Paragraph::new(lines), chunks[3]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started() -> McqGame {
        let mut game = McqGame::new();
        game.start();
        game
    }

    fn correct_index(game: &McqGame) -> usize {
        game.current().correct_indices()[0]
    }

    #[test]
    fn correct_answer_scores_once() {
        let mut game = started();
        let right = correct_index(&game);
        assert_eq!(game.answer(right), Some(true));
        assert_eq!(game.tally.score, POINTS);
        assert_eq!(game.tally.correct, 1);

        // locked: further answers are ignored
        assert_eq!(game.answer(right), None);
        assert_eq!(game.answer((right + 1) % 4), None);
        assert_eq!(game.tally.score, POINTS);
        assert_eq!(game.tally.correct, 1);
    }

    #[test]
    fn wrong_answer_scores_nothing() {
        let mut game = started();
        let wrong = (correct_index(&game) + 1) % 4;
        assert_eq!(game.answer(wrong), Some(false));
        assert_eq!(game.tally.score, 0);
    }

    #[test]
    fn advances_after_feedback_delay() {
        let mut game = started();
        game.answer(0);
        game.tick(Duration::from_millis(1000));
        assert_eq!(game.rounds.index(), 0);
        game.tick(Duration::from_millis(600));
        assert_eq!(game.rounds.index(), 1);
        assert!(game.rounds.is_open());
    }

    #[test]
    fn timeout_advances_without_award() {
        let mut game = started();
        for _ in 0..SECONDS_PER_QUESTION {
            game.tick(Duration::from_secs(1));
        }
        assert_eq!(game.rounds.index(), 1);
        assert_eq!(game.tally.score, 0);
        assert_eq!(game.tally.correct, 0);
        assert_eq!(game.rounds.seconds_left(), SECONDS_PER_QUESTION);
    }

    #[test]
    fn perfect_run_finishes_with_top_grade() {
        let mut game = started();
        let total = game.questions.len();
        for _ in 0..total {
            let right = correct_index(&game);
            game.handle_key(KeyCode::Char(char::from_digit(right as u32 + 1, 10).unwrap()));
            game.tick(FEEDBACK);
        }
        assert_eq!(game.phase(), Phase::Finished);
        let summary = game.summary();
        assert_eq!(summary.score, POINTS * total as u32);
        assert_eq!(summary.grade, Some(crate::scoring::Grade::APlus));
    }
}
