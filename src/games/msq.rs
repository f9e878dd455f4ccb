// ============================================
// src/games/msq.rs
// Multiple select quiz: every correct option, and only those
// ============================================

use std::collections::BTreeSet;
use std::time::Duration;

use crossterm::event::KeyCode;
use log::{debug, info};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, Wrap},
};

use super::round::{RoundEvent, Rounds};
use super::{Game, GameDescriptor, MSQ, Phase, Summary};
use crate::questions::{ChoiceQuestion, msq_questions};
use crate::scoring::{Grade, GradeScale, Tally};
use crate::ui::{self, OptionMark};

const SECONDS_PER_QUESTION: u32 = 45;
const POINTS: u32 = 15;
const FEEDBACK: Duration = Duration::from_secs(2);

const SCALE: GradeScale = GradeScale {
    messages: ["Outstanding!", "Excellent!", "Well Done!", "Good Effort!", "Keep Practicing!"],
    fail: Grade::D,
};

pub struct MsqGame {
    questions: Vec<&'static ChoiceQuestion>,
    rounds: Rounds,
    tally: Tally,
    selected: BTreeSet<usize>,
    cursor: usize,
    /// Outcome of the last submission, shown while locked
    last_correct: Option<bool>,
}

impl MsqGame {
    pub fn new() -> Self {
        let questions = msq_questions();
        let rounds = Rounds::new(questions.len(), SECONDS_PER_QUESTION);
        Self {
            questions,
            rounds,
            tally: Tally::default(),
            selected: BTreeSet::new(),
            cursor: 0,
            last_correct: None,
        }
    }

    pub fn current(&self) -> &'static ChoiceQuestion {
        self.questions[self.rounds.index()]
    }

    pub fn toggle(&mut self, index: usize) {
        if !self.rounds.is_open() || index >= self.current().options.len() {
            return;
        }
        if !self.selected.remove(&index) {
            self.selected.insert(index);
        }
    }

    /// Checks the selection against the exact set of correct options.
    /// Returns `None` when the question was already locked.
    pub fn submit(&mut self) -> Option<bool> {
        if !self.rounds.is_open() {
            return None;
        }
        let question = self.current();
        let expected: BTreeSet<usize> = question.correct_indices().into_iter().collect();
        let correct = expected == self.selected;
        if correct {
            self.tally.award(POINTS);
        } else {
            self.tally.miss();
        }
        debug!("msq {}: submitted {:?}, correct={correct}", question.id, self.selected);
        self.last_correct = Some(correct);
        self.rounds.lock_then_advance(FEEDBACK);
        Some(correct)
    }

    fn on_round_event(&mut self, event: RoundEvent) {
        match event {
            // time's up: reveal the answer, nothing is awarded
            RoundEvent::TimedOut => {
                debug!("msq {}: timed out", self.current().id);
                self.last_correct = Some(false);
                self.rounds.lock_then_advance(FEEDBACK);
            }
            RoundEvent::Advanced => {
                self.selected.clear();
                self.cursor = 0;
                self.last_correct = None;
            }
            RoundEvent::Finished => {
                info!("msq finished: {} / {}", self.tally.correct, self.questions.len());
            }
            RoundEvent::Idle => {}
        }
    }

    fn mark(&self, index: usize) -> OptionMark {
        let selected = self.selected.contains(&index);
        if self.rounds.is_locked() {
            let correct = self.current().correct_indices().contains(&index);
            return match (correct, selected) {
                (true, _) => OptionMark::Correct,
                (false, true) => OptionMark::Wrong,
                (false, false) => OptionMark::Faded,
            };
        }
        match (selected, index == self.cursor) {
            (true, true) => OptionMark::SelectedCursor,
            (true, false) => OptionMark::Selected,
            (false, true) => OptionMark::Cursor,
            (false, false) => OptionMark::Plain,
        }
    }
}

impl Default for MsqGame {
    fn default() -> Self {
        Self::new()
    }
}

impl Game for MsqGame {
    fn descriptor(&self) -> &'static GameDescriptor {
        &MSQ
    }

    fn phase(&self) -> Phase {
        self.rounds.phase()
    }

    fn start(&mut self) {
        self.reset();
        self.rounds.start();
        info!("msq started with {} questions", self.questions.len());
    }

    fn reset(&mut self) {
        self.rounds.reset();
        self.tally = Tally::default();
        self.selected.clear();
        self.cursor = 0;
        self.last_correct = None;
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
            KeyCode::Char(' ') => self.toggle(self.cursor),
            KeyCode::Enter => {
                self.submit();
            }
            KeyCode::Char(c) => {
                if let Some(digit) = c.to_digit(10).filter(|d| *d >= 1) {
                    self.toggle(digit as usize - 1);
                }
            }
            _ => {}
        }
    }

    fn summary(&self) -> Summary {
        let total = self.questions.len() as u32;
        let (grade, message) = SCALE.grade(self.tally.correct, total);
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
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(4),
                Constraint::Min(4),
                Constraint::Length(1),
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

        let footer = match self.last_correct {
            Some(true) => Line::from("Correct! +15").green(),
            Some(false) => Line::from("Not quite, the correct options are marked ✔").red(),
            None => Line::from(format!("{} selected, Enter to submit", self.selected.len())).gray(),
        };
        frame.render_widget(Paragraph::new(footer), chunks[4]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started() -> MsqGame {
        let mut game = MsqGame::new();
        game.start();
        game
    }

    #[test]
    fn exact_selection_scores() {
        let mut game = started();
        for index in game.current().correct_indices() {
            game.toggle(index);
        }
        assert_eq!(game.submit(), Some(true));
        assert_eq!(game.tally.score, POINTS);
        assert_eq!(game.submit(), None);
        assert_eq!(game.tally.correct, 1);
    }

    #[test]
    fn partial_or_extra_selection_fails() {
        let mut game = started();
        let correct = game.current().correct_indices();
        game.toggle(correct[0]);
        assert_eq!(game.submit(), Some(false));
        assert_eq!(game.tally.score, 0);

        game.tick(FEEDBACK);
        let correct = game.current().correct_indices();
        for index in 0..game.current().options.len() {
            game.toggle(index);
        }
        assert!(game.selected.len() > correct.len());
        assert_eq!(game.submit(), Some(false));
    }

    #[test]
    fn toggle_twice_unselects() {
        let mut game = started();
        game.toggle(1);
        game.toggle(1);
        assert!(game.selected.is_empty());
    }

    #[test]
    fn toggling_after_lock_is_ignored() {
        let mut game = started();
        game.submit();
        game.toggle(0);
        assert!(game.selected.is_empty());
    }

    #[test]
    fn timeout_locks_without_award() {
        let mut game = started();
        for index in game.current().correct_indices() {
            game.toggle(index);
        }
        game.tick(Duration::from_secs(SECONDS_PER_QUESTION as u64));
        assert_eq!(game.tally.correct, 0);
        assert_eq!(game.submit(), None);
        assert_eq!(game.rounds.index(), 0);
        game.tick(FEEDBACK);
        assert_eq!(game.rounds.index(), 1);
        assert!(game.selected.is_empty());
    }

    #[test]
    fn empty_timeout_awards_nothing() {
        let mut game = started();
        game.tick(Duration::from_secs(SECONDS_PER_QUESTION as u64));
        assert_eq!(game.tally.score, 0);
        assert!(game.rounds.is_locked());
    }
}
