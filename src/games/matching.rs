// ============================================
// src/games/matching.rs
// Match each term with its definition
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
use super::{Game, GameDescriptor, MATCHING, Phase, Summary};
use crate::questions::{MATCHING_SETS, MatchingSet};
use crate::scoring::{STANDARD_SCALE, Tally};
use crate::timer::Delay;
use crate::ui;

const SECONDS_PER_SET: u32 = 60;
const POINTS: u32 = 20;
const SET_DONE_DELAY: Duration = Duration::from_secs(2);
const WRONG_FLASH: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    None,
    Term(usize),
    Definition(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    Correct,
    Wrong,
}

/// A wrong pairing that stays visible for a moment.
struct WrongFlash {
    term: usize,
    definition: usize,
    fade: Delay,
}

pub struct MatchingGame {
    sets: &'static [MatchingSet],
    rounds: Rounds,
    tally: Tally,
    rng: StdRng,
    /// Pair index shown at each term position
    terms: Vec<usize>,
    /// Pair index shown at each definition position
    definitions: Vec<usize>,
    /// Matched `(term position, definition position)`
    matched: Vec<(usize, usize)>,
    selection: Selection,
    wrong: Vec<WrongFlash>,
}

impl MatchingGame {
    pub fn new(rng: StdRng) -> Self {
        Self::with_sets(MATCHING_SETS, rng)
    }

    pub fn with_sets(sets: &'static [MatchingSet], rng: StdRng) -> Self {
        let mut game = Self {
            sets,
            rounds: Rounds::new(sets.len(), SECONDS_PER_SET),
            tally: Tally::default(),
            rng,
            terms: Vec::new(),
            definitions: Vec::new(),
            matched: Vec::new(),
            selection: Selection::None,
            wrong: Vec::new(),
        };
        game.shuffle_set();
        game
    }

    pub fn current(&self) -> &'static MatchingSet {
        &self.sets[self.rounds.index()]
    }

    fn shuffle_set(&mut self) {
        let pairs = self.current().pairs.len();
        self.terms = (0..pairs).collect();
        self.definitions = (0..pairs).collect();
        self.terms.shuffle(&mut self.rng);
        self.definitions.shuffle(&mut self.rng);
        self.matched.clear();
        self.selection = Selection::None;
        self.wrong.clear();
    }

    fn term_matched(&self, term: usize) -> bool {
        self.matched.iter().any(|(t, _)| *t == term)
    }

    fn definition_matched(&self, definition: usize) -> bool {
        self.matched.iter().any(|(_, d)| *d == definition)
    }

    /// Picks the term at `position`. Evaluates a pair when a definition is
    /// already selected.
    pub fn select_term(&mut self, position: usize) -> Option<MatchOutcome> {
        if !self.rounds.is_open() || position >= self.terms.len() || self.term_matched(position) {
            return None;
        }
        match self.selection {
            Selection::Term(current) if current == position => {
                self.selection = Selection::None;
                None
            }
            Selection::Definition(definition) => {
                self.selection = Selection::None;
                Some(self.check(position, definition))
            }
            _ => {
                self.selection = Selection::Term(position);
                None
            }
        }
    }

    /// Picks the definition at `position`. Evaluates a pair when a term is
    /// already selected.
    pub fn select_definition(&mut self, position: usize) -> Option<MatchOutcome> {
        if !self.rounds.is_open() || position >= self.definitions.len() || self.definition_matched(position) {
            return None;
        }
        match self.selection {
            Selection::Definition(current) if current == position => {
                self.selection = Selection::None;
                None
            }
            Selection::Term(term) => {
                self.selection = Selection::None;
                Some(self.check(term, position))
            }
            _ => {
                self.selection = Selection::Definition(position);
                None
            }
        }
    }

    fn check(&mut self, term: usize, definition: usize) -> MatchOutcome {
        if self.terms[term] != self.definitions[definition] {
            self.tally.miss();
            let mut fade = Delay::default();
            fade.schedule(WRONG_FLASH, ());
            self.wrong.push(WrongFlash { term, definition, fade });
            debug!("matching: wrong pair {term} -> {definition}");
            return MatchOutcome::Wrong;
        }
        self.tally.award(POINTS);
        self.matched.push((term, definition));
        if self.matched.len() == self.terms.len() {
            info!("matching: set {} complete", self.current().id);
            self.rounds.lock_then_advance(SET_DONE_DELAY);
        }
        MatchOutcome::Correct
    }

    fn on_round_event(&mut self, event: RoundEvent) {
        match event {
            RoundEvent::TimedOut => {
                let next = self.rounds.advance();
                self.on_round_event(next);
            }
            RoundEvent::Advanced => self.shuffle_set(),
            RoundEvent::Finished => {
                info!("matching finished: {} pairs", self.tally.correct);
            }
            RoundEvent::Idle => {}
        }
    }

    fn total_pairs(&self) -> u32 {
        self.sets.iter().map(|set| set.pairs.len() as u32).sum()
    }

    fn term_line(&self, position: usize) -> Line<'static> {
        let pair = &self.current().pairs[self.terms[position]];
        let matched = self.matched.iter().find(|(t, _)| *t == position);
        let flashing = self.wrong.iter().find(|w| w.term == position);
        let (suffix, style) = match (matched, flashing) {
            (Some((_, d)), _) => (format!(" ↔ {}", letter(*d)), Style::default().fg(Color::Green)),
            (None, Some(w)) => (format!(" ✘ {}", letter(w.definition)), Style::default().fg(Color::Red)),
            _ if self.selection == Selection::Term(position) => {
                (String::new(), Style::default().fg(Color::Black).bg(Color::Yellow))
            }
            _ => (String::new(), Style::default().fg(Color::White)),
        };
        Line::from(Span::styled(format!("{}. {}{suffix}", position + 1, pair.term), style))
    }

    fn definition_line(&self, position: usize) -> Line<'static> {
        let pair = &self.current().pairs[self.definitions[position]];
        let style = if self.definition_matched(position) {
            Style::default().fg(Color::Green)
        } else if self.wrong.iter().any(|w| w.definition == position) {
            Style::default().fg(Color::Red)
        } else if self.selection == Selection::Definition(position) {
            Style::default().fg(Color::Black).bg(Color::Yellow)
        } else {
            Style::default().fg(Color::White)
        };
        Line::from(Span::styled(format!("{}. {}", letter(position), pair.definition), style))
    }
}

fn letter(position: usize) -> char {
    (b'a' + position as u8) as char
}

impl Game for MatchingGame {
    fn descriptor(&self) -> &'static GameDescriptor {
        &MATCHING
    }

    fn phase(&self) -> Phase {
        self.rounds.phase()
    }

    fn start(&mut self) {
        self.reset();
        self.rounds.start();
        info!("matching started with {} sets", self.sets.len());
    }

    fn reset(&mut self) {
        self.rounds.reset();
        self.tally = Tally::default();
        self.shuffle_set();
    }

    fn tick(&mut self, dt: Duration) {
        self.wrong.retain_mut(|flash| flash.fade.tick(dt).is_none());
        let event = self.rounds.tick(dt);
        self.on_round_event(event);
    }

    fn handle_key(&mut self, key: KeyCode) {
        if let KeyCode::Char(c) = key {
            if let Some(digit) = c.to_digit(10).filter(|d| *d >= 1) {
                self.select_term(digit as usize - 1);
            } else if c.is_ascii_lowercase() {
                self.select_definition((c as u8 - b'a') as usize);
            }
        }
    }

    fn summary(&self) -> Summary {
        let total = self.total_pairs();
        let (grade, message) = STANDARD_SCALE.grade(self.tally.correct, total);
        Summary {
            score: self.tally.score,
            correct: self.tally.correct,
            total: Some(total),
            grade: Some(grade),
            message,
            stats: vec![("Wrong pairings", self.tally.wrong.to_string())],
        }
    }

    fn draw(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(2),
                Constraint::Min(6),
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
            Paragraph::new(self.current().title).bold().centered(),
            chunks[1],
        );

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
            .split(chunks[2]);
        let terms: Vec<Line> = (0..self.terms.len()).map(|p| self.term_line(p)).collect();
        let definitions: Vec<Line> = (0..self.definitions.len()).map(|p| self.definition_line(p)).collect();
        frame.render_widget(
            Paragraph::new(terms).block(Block::default().borders(Borders::ALL).title("Terms")),
            columns[0],
        );
        frame.render_widget(
            Paragraph::new(definitions)
                .wrap(Wrap { trim: true })
                .block(Block::default().borders(Borders::ALL).title("Definitions")),
            columns[1],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn started() -> MatchingGame {
        let mut game = MatchingGame::new(StdRng::seed_from_u64(7));
        game.start();
        game
    }

    /// Definition position holding the same pair as the term at `term`.
    fn partner(game: &MatchingGame, term: usize) -> usize {
        let pair = game.terms[term];
        game.definitions.iter().position(|d| *d == pair).unwrap()
    }

    #[test]
    fn correct_pair_scores_once() {
        let mut game = started();
        let definition = partner(&game, 0);
        assert_eq!(game.select_term(0), None);
        assert_eq!(game.selection, Selection::Term(0));
        assert_eq!(game.select_definition(definition), Some(MatchOutcome::Correct));
        assert_eq!(game.tally.score, POINTS);
        assert_eq!(game.selection, Selection::None);

        // matched items ignore further picks
        assert_eq!(game.select_term(0), None);
        assert_eq!(game.select_definition(definition), None);
        assert_eq!(game.selection, Selection::None);
        assert_eq!(game.tally.correct, 1);
    }

    #[test]
    fn definition_first_also_works() {
        let mut game = started();
        let definition = partner(&game, 2);
        game.select_definition(definition);
        assert_eq!(game.select_term(2), Some(MatchOutcome::Correct));
    }

    #[test]
    fn same_item_twice_unselects() {
        let mut game = started();
        game.select_term(1);
        game.select_term(1);
        assert_eq!(game.selection, Selection::None);
    }

    #[test]
    fn wrong_pair_flashes_then_fades() {
        let mut game = started();
        let wrong = (partner(&game, 0) + 1) % game.definitions.len();
        game.select_term(0);
        assert_eq!(game.select_definition(wrong), Some(MatchOutcome::Wrong));
        assert_eq!(game.tally.score, 0);
        assert_eq!(game.wrong.len(), 1);
        game.tick(WRONG_FLASH);
        assert!(game.wrong.is_empty());
        assert!(game.matched.is_empty());
    }

    #[test]
    fn completing_a_set_advances() {
        let mut game = started();
        for term in 0..game.terms.len() {
            let definition = partner(&game, term);
            game.select_term(term);
            game.select_definition(definition);
        }
        assert!(game.rounds.is_locked());
        game.tick(SET_DONE_DELAY);
        assert_eq!(game.rounds.index(), 1);
        assert!(game.matched.is_empty());
        assert_eq!(game.tally.correct, 5);
    }

    #[test]
    fn timeout_moves_to_next_set() {
        let mut game = started();
        game.tick(Duration::from_secs(SECONDS_PER_SET as u64));
        assert_eq!(game.rounds.index(), 1);
        assert_eq!(game.tally.score, 0);
    }
}
