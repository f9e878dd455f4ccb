// ============================================
// src/games/memory_test.rs
// Watch a sequence of lit cells, then repeat it
// ============================================

use std::time::Duration;

use crossterm::event::KeyCode;
use log::{debug, info};
use rand::Rng;
use rand::rngs::StdRng;
use ratatui::{prelude::*, widgets::Paragraph};

use super::{Difficulty, Game, GameDescriptor, MEMORY_TEST, Phase, Summary};
use crate::scoring::{Tally, threshold_message};
use crate::timer::{Countdown, Delay};
use crate::ui;

const GAP: Duration = Duration::from_millis(200);
const FIRST_LEAD_IN: Duration = Duration::from_millis(700);
const LEAD_IN: Duration = Duration::from_millis(1100);
const LEVEL_PAUSE: Duration = Duration::from_secs(1);
const GAME_OVER_DELAY: Duration = Duration::from_millis(1500);

const LEVEL_MESSAGES: &[(u32, &str)] = &[
    (10, "🏆 Memory Master!"),
    (7, "⭐ Excellent Memory!"),
    (5, "👍 Great Job!"),
    (3, "💪 Good Start!"),
];

/// Cell colours, handed out cyclically by cell index.
pub const PALETTE: [(&str, Color); 9] = [
    ("red", Color::Red),
    ("blue", Color::Blue),
    ("green", Color::Green),
    ("yellow", Color::Yellow),
    ("purple", Color::Magenta),
    ("orange", Color::Rgb(255, 140, 0)),
    ("pink", Color::Rgb(255, 105, 180)),
    ("teal", Color::Rgb(0, 128, 128)),
    ("indigo", Color::Rgb(75, 0, 130)),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemorySettings {
    /// Cells per side
    pub size: usize,
    pub start_len: usize,
    pub display: Duration,
    pub memorize: Duration,
}

impl MemorySettings {
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        let (size, start_len, display, memorize) = match difficulty {
            Difficulty::Easy => (3, 3, 1500, 3000),
            Difficulty::Medium => (4, 4, 1200, 2500),
            Difficulty::Hard => (5, 5, 1000, 2000),
        };
        Self {
            size,
            start_len,
            display: Duration::from_millis(display),
            memorize: Duration::from_millis(memorize),
        }
    }

    /// Sequence length at `level` (1-based).
    pub fn sequence_len(&self, level: u32) -> usize {
        self.start_len + level as usize - 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Waiting,
    Showing,
    Memorizing,
    Testing,
    LevelComplete,
    GameOver,
}

/// Scheduled steps of the show sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cue {
    Light(usize),
    Dark(usize),
    NextLevel,
    GameOver,
}

pub struct MemoryTestGame {
    difficulty: Difficulty,
    settings: MemorySettings,
    phase: Phase,
    stage: Stage,
    rng: StdRng,
    level: u32,
    tally: Tally,
    sequence: Vec<usize>,
    /// Cells the player got right so far this level
    progress: usize,
    lit: Option<usize>,
    cue: Delay<Cue>,
    memorize_clock: Countdown,
    cursor: usize,
    /// Cell that ended the game
    mistake: Option<usize>,
}

impl MemoryTestGame {
    pub fn new(difficulty: Difficulty, rng: StdRng) -> Self {
        let settings = MemorySettings::for_difficulty(difficulty);
        Self {
            difficulty,
            settings,
            phase: Phase::NotStarted,
            stage: Stage::Waiting,
            rng,
            level: 1,
            tally: Tally::default(),
            sequence: Vec::new(),
            progress: 0,
            lit: None,
            cue: Delay::default(),
            memorize_clock: Countdown::new(0),
            cursor: 0,
            mistake: None,
        }
    }

    fn cell_count(&self) -> usize {
        self.settings.size * self.settings.size
    }

    pub fn colour_of(cell: usize) -> (&'static str, Color) {
        PALETTE[cell % PALETTE.len()]
    }

    fn begin_level(&mut self, lead_in: Duration) {
        let len = self.settings.sequence_len(self.level);
        let cells = self.cell_count();
        self.sequence = (0..len).map(|_| self.rng.random_range(0..cells)).collect();
        self.progress = 0;
        self.lit = None;
        self.stage = Stage::Waiting;
        self.cue.schedule(lead_in, Cue::Light(0));
        debug!("memory level {}: sequence {:?}", self.level, self.sequence);
    }

    fn on_cue(&mut self, cue: Cue) {
        match cue {
            Cue::Light(step) => {
                self.stage = Stage::Showing;
                self.lit = self.sequence.get(step).copied();
                self.cue.schedule(self.settings.display, Cue::Dark(step));
            }
            Cue::Dark(step) => {
                self.lit = None;
                if step + 1 < self.sequence.len() {
                    self.cue.schedule(GAP, Cue::Light(step + 1));
                } else {
                    self.stage = Stage::Memorizing;
                    self.memorize_clock.reset(self.settings.memorize.as_secs() as u32);
                    if self.memorize_clock.is_expired() {
                        self.stage = Stage::Testing;
                    }
                }
            }
            Cue::NextLevel => {
                self.level += 1;
                self.begin_level(LEAD_IN);
            }
            Cue::GameOver => {
                self.phase = Phase::Finished;
                info!("memory test over at level {}", self.level);
            }
        }
    }

    /// Picks a cell while testing. Returns whether it was the expected one.
    pub fn pick(&mut self, cell: usize) -> Option<bool> {
        if self.phase != Phase::Playing || self.stage != Stage::Testing || cell >= self.cell_count() {
            return None;
        }
        if self.sequence.get(self.progress) != Some(&cell) {
            self.tally.miss();
            self.mistake = Some(cell);
            self.stage = Stage::GameOver;
            self.cue.schedule(GAME_OVER_DELAY, Cue::GameOver);
            debug!("memory test: wrong cell {cell}");
            return Some(false);
        }
        self.progress += 1;
        if self.progress == self.sequence.len() {
            let points = self.level * 100 + self.tally.streak * 50;
            self.tally.award(points);
            self.stage = Stage::LevelComplete;
            self.cue.schedule(LEVEL_PAUSE, Cue::NextLevel);
            debug!("memory level {} complete for {points}", self.level);
        }
        Some(true)
    }

    fn move_cursor(&mut self, key: KeyCode) {
        let size = self.settings.size;
        let (row, col) = (self.cursor / size, self.cursor % size);
        let (row, col) = match key {
            KeyCode::Up => (row.saturating_sub(1), col),
            KeyCode::Down => ((row + 1).min(size - 1), col),
            KeyCode::Left => (row, col.saturating_sub(1)),
            KeyCode::Right => (row, (col + 1).min(size - 1)),
            _ => (row, col),
        };
        self.cursor = row * size + col;
    }

    fn prompt(&self) -> Line<'static> {
        match self.stage {
            Stage::Waiting => Line::from("Get ready...").gray(),
            Stage::Showing => Line::from("👀 Watch the sequence...").cyan(),
            Stage::Memorizing => {
                Line::from(format!("🧠 Memorize! {}", self.memorize_clock.remaining())).magenta()
            }
            Stage::Testing => Line::from(format!(
                "🎯 Repeat the sequence ({}/{})",
                self.progress,
                self.sequence.len()
            ))
            .yellow(),
            Stage::LevelComplete => Line::from("✔ Level complete!").green().bold(),
            Stage::GameOver => Line::from("✘ Wrong cell!").red().bold(),
        }
    }

    fn grid_lines(&self) -> Vec<Line<'static>> {
        let size = self.settings.size;
        (0..size)
            .map(|row| {
                let spans: Vec<Span> = (0..size)
                    .map(|col| {
                        let cell = row * size + col;
                        let (_, colour) = Self::colour_of(cell);
                        let style = if self.lit == Some(cell) || self.mistake == Some(cell) {
                            Style::default().bg(colour)
                        } else if self.stage == Stage::Testing && self.cursor == cell {
                            Style::default().bg(Color::White)
                        } else {
                            Style::default().bg(Color::DarkGray)
                        };
                        let label = if self.mistake == Some(cell) { " ✘  " } else { "    " };
                        Span::styled(label, style)
                    })
                    .flat_map(|span| [span, Span::raw(" ")])
                    .collect();
                Line::from(spans)
            })
            .flat_map(|line| [line, Line::from("")])
            .collect()
    }
}

impl Game for MemoryTestGame {
    fn descriptor(&self) -> &'static GameDescriptor {
        &MEMORY_TEST
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    fn start(&mut self) {
        self.reset();
        self.phase = Phase::Playing;
        self.begin_level(FIRST_LEAD_IN);
        info!("memory test started on {}", self.difficulty);
    }

    fn reset(&mut self) {
        self.phase = Phase::NotStarted;
        self.stage = Stage::Waiting;
        self.level = 1;
        self.tally = Tally::default();
        self.sequence.clear();
        self.progress = 0;
        self.lit = None;
        self.cue.cancel();
        self.cursor = 0;
        self.mistake = None;
    }

    fn tick(&mut self, dt: Duration) {
        if self.phase != Phase::Playing {
            return;
        }
        if let Some(cue) = self.cue.tick(dt) {
            self.on_cue(cue);
            return;
        }
        if self.stage == Stage::Memorizing && self.memorize_clock.tick(dt) {
            self.stage = Stage::Testing;
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Enter | KeyCode::Char(' ') => {
                self.pick(self.cursor);
            }
            other => self.move_cursor(other),
        }
    }

    fn summary(&self) -> Summary {
        Summary {
            score: self.tally.score,
            correct: self.tally.correct,
            total: None,
            grade: None,
            message: threshold_message(self.level, LEVEL_MESSAGES, "🎯 Keep Trying!"),
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
                Constraint::Min(6),
            ])
            .split(area);
        let mut status = ui::status_line(None, None, self.tally.score);
        status.push_span(Span::raw(format!("   Level {}", self.level)).cyan());
        frame.render_widget(Paragraph::new(status), chunks[0]);
        frame.render_widget(Paragraph::new(self.prompt()).centered(), chunks[1]);
        frame.render_widget(Paragraph::new(self.grid_lines()).centered(), chunks[2]);
    }

    fn difficulty(&self) -> Option<Difficulty> {
        Some(self.difficulty)
    }

    fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
        self.settings = MemorySettings::for_difficulty(difficulty);
        self.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn started(difficulty: Difficulty) -> MemoryTestGame {
        let mut game = MemoryTestGame::new(difficulty, StdRng::seed_from_u64(21));
        game.start();
        game
    }

    /// Ticks in 100 ms steps until the game reaches `stage`.
    fn run_until(game: &mut MemoryTestGame, stage: Stage) {
        for _ in 0..1000 {
            if game.stage == stage {
                return;
            }
            game.tick(Duration::from_millis(100));
        }
        panic!("never reached {stage:?}");
    }

    #[test]
    fn settings_per_difficulty() {
        let easy = MemorySettings::for_difficulty(Difficulty::Easy);
        assert_eq!((easy.size, easy.start_len), (3, 3));
        assert_eq!(easy.sequence_len(1), 3);
        assert_eq!(easy.sequence_len(4), 6);
        let hard = MemorySettings::for_difficulty(Difficulty::Hard);
        assert_eq!(hard.display, Duration::from_millis(1000));
    }

    #[test]
    fn colours_cycle() {
        assert_eq!(MemoryTestGame::colour_of(0).0, "red");
        assert_eq!(MemoryTestGame::colour_of(9).0, "red");
        assert_eq!(MemoryTestGame::colour_of(13).0, "purple");
    }

    #[test]
    fn shows_each_cell_then_memorizes_then_tests() {
        let mut game = started(Difficulty::Easy);
        assert_eq!(game.stage, Stage::Waiting);
        assert_eq!(game.pick(0), None);

        game.tick(FIRST_LEAD_IN);
        assert_eq!(game.stage, Stage::Showing);
        assert_eq!(game.lit, Some(game.sequence[0]));
        game.tick(Duration::from_millis(1500));
        assert_eq!(game.lit, None);
        game.tick(GAP);
        assert_eq!(game.lit, Some(game.sequence[1]));

        run_until(&mut game, Stage::Memorizing);
        game.tick(Duration::from_secs(3));
        assert_eq!(game.stage, Stage::Testing);
    }

    #[test]
    fn sequences_grow_per_level() {
        let mut game = started(Difficulty::Medium);
        for level in 1..=3u32 {
            run_until(&mut game, Stage::Testing);
            assert_eq!(game.sequence.len(), 4 + level as usize - 1);
            for cell in game.sequence.to_vec() {
                assert_eq!(game.pick(cell), Some(true));
            }
            assert_eq!(game.stage, Stage::LevelComplete);
            game.tick(LEVEL_PAUSE);
            assert_eq!(game.level, level + 1);
        }
        // 100 + (200 + 50) + (300 + 100)
        assert_eq!(game.tally.score, 750);
    }

    #[test]
    fn wrong_cell_ends_the_game() {
        let mut game = started(Difficulty::Easy);
        run_until(&mut game, Stage::Testing);
        let wrong = (game.sequence[0] + 1) % 9;
        assert_eq!(game.pick(wrong), Some(false));
        assert_eq!(game.stage, Stage::GameOver);
        assert_eq!(game.mistake, Some(wrong));
        assert_eq!(game.pick(game.sequence[0]), None);

        // the mistake stays on screen before the results
        game.tick(Duration::from_millis(1000));
        assert_eq!(game.phase(), Phase::Playing);
        game.tick(Duration::from_millis(500));
        assert_eq!(game.phase(), Phase::Finished);
        assert_eq!(game.tally.streak, 0);
        assert_eq!(game.summary().message, "🎯 Keep Trying!");
    }

    #[test]
    fn cursor_stays_inside_grid() {
        let mut game = started(Difficulty::Easy);
        game.handle_key(KeyCode::Up);
        game.handle_key(KeyCode::Left);
        assert_eq!(game.cursor, 0);
        for _ in 0..5 {
            game.handle_key(KeyCode::Right);
            game.handle_key(KeyCode::Down);
        }
        assert_eq!(game.cursor, 8);
    }
}
