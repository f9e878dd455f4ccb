// ============================================
// src/games/word_scramble.rs
// Rebuild a scrambled word from its letter tiles
// ============================================

use std::time::Duration;

use crossterm::event::KeyCode;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, Wrap},
};

use super::round::{RoundEvent, Rounds};
use super::{Game, GameDescriptor, Phase, Summary, WORD_SCRAMBLE};
use crate::questions::{SCRAMBLE_WORDS, ScrambleWord};
use crate::scoring::{Grade, GradeScale, Tally};
use crate::ui;

const SECONDS_PER_WORD: u32 = 120;
const MAX_HINTS: u32 = 2;
const FEEDBACK: Duration = Duration::from_secs(2);
const TIMEOUT_DELAY: Duration = Duration::from_secs(3);

const SCALE: GradeScale = GradeScale {
    messages: ["Excellent!", "Great Job!", "Good Work!", "Keep Practicing!", "Try Again!"],
    fail: Grade::F,
};

/// A letter with a stable id, so repeated letters stay distinguishable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    pub id: usize,
    pub letter: char,
}

/// Points for a solved word: 50 plus 2 per second left, minus 10 per hint,
/// never below 10.
pub fn points_for(seconds_left: u32, hints: u32) -> u32 {
    (50 + 2 * seconds_left as i64 - 10 * hints as i64).max(10) as u32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Solved,
    Wrong,
    TimedOut,
}

pub struct WordScrambleGame {
    words: Vec<&'static ScrambleWord>,
    rounds: Rounds,
    tally: Tally,
    rng: StdRng,
    pool: Vec<Tile>,
    slots: Vec<Option<Tile>>,
    /// Slot picked with ←/→; typing goes there instead of the first gap
    slot_cursor: Option<usize>,
    hints: Vec<String>,
    outcome: Option<Outcome>,
}

impl WordScrambleGame {
    pub fn new(rng: StdRng) -> Self {
        Self::with_words(SCRAMBLE_WORDS.iter().collect(), rng)
    }

    pub fn with_words(words: Vec<&'static ScrambleWord>, rng: StdRng) -> Self {
        let mut game = Self {
            rounds: Rounds::new(words.len(), SECONDS_PER_WORD),
            words,
            tally: Tally::default(),
            rng,
            pool: Vec::new(),
            slots: Vec::new(),
            slot_cursor: None,
            hints: Vec::new(),
            outcome: None,
        };
        game.deal();
        game
    }

    pub fn current(&self) -> &'static ScrambleWord {
        self.words[self.rounds.index()]
    }

    /// Letters currently in the answer, gaps as `_`.
    pub fn attempt(&self) -> String {
        self.slots
            .iter()
            .map(|slot| slot.map(|tile| tile.letter).unwrap_or('_'))
            .collect()
    }

    fn deal(&mut self) {
        let word = self.current().word.to_lowercase();
        self.pool = word
            .chars()
            .enumerate()
            .map(|(id, letter)| Tile { id, letter })
            .collect();
        self.pool.shuffle(&mut self.rng);
        self.slots = vec![None; self.pool.len()];
        self.slot_cursor = None;
        self.hints.clear();
        self.outcome = None;
    }

    fn take_from_pool(&mut self, id: usize) -> Option<Tile> {
        let at = self.pool.iter().position(|tile| tile.id == id)?;
        Some(self.pool.remove(at))
    }

    /// Moves a pool tile into the first empty slot.
    pub fn place(&mut self, id: usize) -> bool {
        if !self.rounds.is_open() {
            return false;
        }
        let Some(slot) = self.slots.iter().position(Option::is_none) else {
            return false;
        };
        let Some(tile) = self.take_from_pool(id) else {
            return false;
        };
        self.slots[slot] = Some(tile);
        self.check_if_full();
        true
    }

    /// Moves a pool tile into `slot`, sending any occupant back to the pool.
    pub fn place_at(&mut self, id: usize, slot: usize) -> bool {
        if !self.rounds.is_open() || slot >= self.slots.len() {
            return false;
        }
        let Some(tile) = self.take_from_pool(id) else {
            return false;
        };
        if let Some(previous) = self.slots[slot].replace(tile) {
            self.pool.push(previous);
        }
        self.check_if_full();
        true
    }

    /// Sends the tile in `slot` back to the pool.
    pub fn remove(&mut self, slot: usize) -> bool {
        if !self.rounds.is_open() {
            return false;
        }
        match self.slots.get_mut(slot).and_then(Option::take) {
            Some(tile) => {
                self.pool.push(tile);
                true
            }
            None => false,
        }
    }

    /// Returns every tile to the pool in a new order.
    pub fn shuffle(&mut self) {
        if !self.rounds.is_open() {
            return;
        }
        let placed: Vec<Tile> = self.slots.iter_mut().filter_map(Option::take).collect();
        self.pool.extend(placed);
        self.pool.shuffle(&mut self.rng);
        self.slot_cursor = None;
    }

    /// Reveals the category, then the hint text.
    pub fn hint(&mut self) -> bool {
        if !self.rounds.is_open() || self.hints.len() as u32 >= MAX_HINTS {
            return false;
        }
        let word = self.current();
        let text = if self.hints.is_empty() {
            format!("Category: {}", word.category)
        } else {
            word.hint.to_string()
        };
        self.hints.push(text);
        true
    }

    fn check_if_full(&mut self) {
        if self.slots.iter().any(Option::is_none) {
            return;
        }
        let word = self.current().word.to_lowercase();
        if self.attempt() == word {
            let points = points_for(self.rounds.seconds_left(), self.hints.len() as u32);
            self.tally.award(points);
            self.outcome = Some(Outcome::Solved);
            debug!("scramble {word}: solved for {points}");
        } else {
            self.tally.miss();
            self.outcome = Some(Outcome::Wrong);
            debug!("scramble {word}: wrong attempt {}", self.attempt());
        }
        self.rounds.lock_then_advance(FEEDBACK);
    }

    fn type_letter(&mut self, letter: char) {
        let letter = letter.to_ascii_lowercase();
        let Some(id) = self.pool.iter().find(|tile| tile.letter == letter).map(|tile| tile.id) else {
            return;
        };
        match self.slot_cursor.take() {
            Some(slot) => {
                self.place_at(id, slot);
            }
            None => {
                self.place(id);
            }
        }
    }

    fn backspace(&mut self) {
        if let Some(last) = self.slots.iter().rposition(Option::is_some) {
            self.remove(last);
        }
    }

    fn move_slot_cursor(&mut self, forward: bool) {
        let last = self.slots.len().saturating_sub(1);
        self.slot_cursor = Some(match (self.slot_cursor, forward) {
            (None, _) => 0,
            (Some(i), true) => (i + 1).min(last),
            (Some(i), false) => i.saturating_sub(1),
        });
    }

    fn on_round_event(&mut self, event: RoundEvent) {
        match event {
            RoundEvent::TimedOut => {
                self.tally.miss();
                self.outcome = Some(Outcome::TimedOut);
                self.rounds.lock_then_advance(TIMEOUT_DELAY);
            }
            RoundEvent::Advanced => self.deal(),
            RoundEvent::Finished => {
                info!("word scramble finished: {} / {}", self.tally.correct, self.words.len());
            }
            RoundEvent::Idle => {}
        }
    }

    fn tile_span(tile: Option<Tile>, highlighted: bool) -> Span<'static> {
        let text = format!(" {} ", tile.map(|t| t.letter.to_ascii_uppercase()).unwrap_or('_'));
        let style = if highlighted {
            Style::default().fg(Color::Black).bg(Color::Yellow)
        } else if tile.is_some() {
            Style::default().fg(Color::Black).bg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        Span::styled(text, style.bold())
    }
}

impl Game for WordScrambleGame {
    fn descriptor(&self) -> &'static GameDescriptor {
        &WORD_SCRAMBLE
    }

    fn phase(&self) -> Phase {
        self.rounds.phase()
    }

    fn start(&mut self) {
        self.reset();
        self.words.shuffle(&mut self.rng);
        self.deal();
        self.rounds.start();
        info!("word scramble started with {} words", self.words.len());
    }

    fn reset(&mut self) {
        self.rounds.reset();
        self.tally = Tally::default();
        self.deal();
    }

    fn tick(&mut self, dt: Duration) {
        let event = self.rounds.tick(dt);
        self.on_round_event(event);
    }

    fn handle_key(&mut self, key: KeyCode) {
        if !self.rounds.is_open() {
            return;
        }
        match key {
            KeyCode::Char(c) if c.is_ascii_alphabetic() => self.type_letter(c),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => {
                if let Some(slot) = self.slot_cursor {
                    self.remove(slot);
                }
            }
            KeyCode::Left => self.move_slot_cursor(false),
            KeyCode::Right => self.move_slot_cursor(true),
            KeyCode::Up => self.shuffle(),
            KeyCode::Tab => {
                self.hint();
            }
            _ => {}
        }
    }

    fn summary(&self) -> Summary {
        let total = self.words.len() as u32;
        let (grade, message) = SCALE.grade(self.tally.correct, total);
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
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Length(3),
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

        let answer: Vec<Span> = self
            .slots
            .iter()
            .enumerate()
            .map(|(i, slot)| Self::tile_span(*slot, self.slot_cursor == Some(i)))
            .collect();
        frame.render_widget(
            Paragraph::new(Line::from(answer))
                .centered()
                .block(Block::default().borders(Borders::ALL).title("Answer")),
            chunks[2],
        );
        let pool: Vec<Span> = self.pool.iter().map(|tile| Self::tile_span(Some(*tile), false)).collect();
        frame.render_widget(
            Paragraph::new(Line::from(pool))
                .centered()
                .block(Block::default().borders(Borders::ALL).title("Letters")),
            chunks[3],
        );

        let mut lines: Vec<Line> = self
            .hints
            .iter()
            .map(|hint| Line::from(format!("💡 {hint}")).cyan())
            .collect();
        let word = self.current().word.to_uppercase();
        match self.outcome {
            Some(Outcome::Solved) => lines.push(Line::from("✔ Correct!").green().bold()),
            Some(Outcome::Wrong) => lines.push(Line::from(format!("✘ The word was {word}")).red().bold()),
            Some(Outcome::TimedOut) => lines.push(Line::from(format!("⏱ Time's up! The word was {word}")).yellow()),
            None => {}
        }
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), chunks[4]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn started() -> WordScrambleGame {
        let mut game = WordScrambleGame::new(StdRng::seed_from_u64(3));
        game.start();
        game
    }

    /// Places tiles so the answer spells the current word.
    fn spell(game: &mut WordScrambleGame) {
        let word = game.current().word.to_lowercase();
        for letter in word.chars() {
            let id = game.pool.iter().find(|t| t.letter == letter).map(|t| t.id).unwrap();
            game.place(id);
        }
    }

    #[test]
    fn pool_is_a_permutation_of_the_word() {
        let game = started();
        let mut letters: Vec<char> = game.pool.iter().map(|t| t.letter).collect();
        let mut expected: Vec<char> = game.current().word.chars().collect();
        letters.sort_unstable();
        expected.sort_unstable();
        assert_eq!(letters, expected);
        assert!(game.slots.iter().all(Option::is_none));
    }

    #[test]
    fn solving_scores_by_time_and_hints() {
        let mut game = started();
        game.tick(Duration::from_secs(20));
        game.hint();
        spell(&mut game);
        assert_eq!(game.tally.score, points_for(100, 1));
        assert_eq!(game.tally.score, 240);
        assert!(game.rounds.is_locked());
        game.tick(FEEDBACK);
        assert_eq!(game.rounds.index(), 1);
        assert!(game.hints.is_empty());
    }

    #[test]
    fn points_never_drop_below_ten() {
        assert_eq!(points_for(0, 2), 30);
        assert_eq!(points_for(0, 9), 10);
    }

    #[test]
    fn place_at_displaces_occupant() {
        let mut game = started();
        let first = game.pool[0];
        let second = game.pool[1];
        assert!(game.place_at(first.id, 2));
        assert!(game.place_at(second.id, 2));
        assert_eq!(game.slots[2], Some(second));
        assert!(game.pool.contains(&first));
    }

    #[test]
    fn remove_and_shuffle_return_tiles() {
        let mut game = started();
        let tile = game.pool[0];
        game.place(tile.id);
        assert_eq!(game.slots[0], Some(tile));
        assert!(game.remove(0));
        assert!(game.pool.contains(&tile));
        assert!(!game.remove(0));

        game.place(game.pool[0].id);
        game.place(game.pool[0].id);
        game.shuffle();
        assert!(game.slots.iter().all(Option::is_none));
        assert_eq!(game.pool.len(), game.current().word.len());
    }

    #[test]
    fn hints_come_in_order_and_run_out() {
        let mut game = started();
        assert!(game.hint());
        assert!(game.hints[0].starts_with("Category: "));
        assert!(game.hint());
        assert_eq!(game.hints[1], game.current().hint);
        assert!(!game.hint());
    }

    #[test]
    fn wrong_full_answer_locks_without_points() {
        let mut game = started();
        let word: Vec<char> = game.current().word.chars().collect();
        // fill back to front; scramble words are never palindromes
        for letter in word.iter().rev() {
            let id = game.pool.iter().find(|t| t.letter == *letter).map(|t| t.id).unwrap();
            game.place(id);
        }
        assert_eq!(game.tally.score, 0);
        assert!(game.rounds.is_locked());
        assert!(!game.remove(0));
    }

    #[test]
    fn timeout_waits_three_seconds() {
        let mut game = started();
        game.tick(Duration::from_secs(SECONDS_PER_WORD as u64));
        assert!(game.rounds.is_locked());
        game.tick(Duration::from_secs(2));
        assert_eq!(game.rounds.index(), 0);
        game.tick(Duration::from_secs(1));
        assert_eq!(game.rounds.index(), 1);
        assert_eq!(game.tally.score, 0);
    }
}
