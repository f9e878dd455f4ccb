// ============================================
// src/games/crossword.rs
// Crossword grid: selection, navigation, completion and hints
// ============================================

use std::time::Duration;

use crossterm::event::KeyCode;
use log::{debug, info};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, Wrap},
};

use super::round::{RoundEvent, Rounds};
use super::{CROSSWORD, Game, GameDescriptor, Phase, Summary};
use crate::questions::{CROSSWORDS, Clue, CrosswordPuzzle, Direction as Axis};
use crate::scoring::{STANDARD_SCALE, Tally};
use crate::ui;

const SECONDS_PER_PUZZLE: u32 = 180;
const POINTS_PER_CLUE: u32 = 30;
const MAX_HINTS: u32 = 3;
const HINT_COST: u32 = 10;
const SOLVED_DELAY: Duration = Duration::from_secs(2);
const TIMEOUT_DELAY: Duration = Duration::from_secs(3);

pub type Cell = (usize, usize);

// --------------------------------------------------
// Grid geometry
// --------------------------------------------------

/// The contiguous run of open cells through `cell` along `axis`.
/// Empty when `cell` itself is blocked.
pub fn word_bounds(puzzle: &CrosswordPuzzle, cell: Cell, axis: Axis) -> Vec<Cell> {
    let (row, col) = cell;
    if !puzzle.is_open(row, col) {
        return Vec::new();
    }
    let step = |n: usize| match axis {
        Axis::Across => (row, n),
        Axis::Down => (n, col),
    };
    let fixed = match axis {
        Axis::Across => col,
        Axis::Down => row,
    };
    let mut start = fixed;
    while start > 0 {
        let (r, c) = step(start - 1);
        if !puzzle.is_open(r, c) {
            break;
        }
        start -= 1;
    }
    let mut end = fixed;
    loop {
        let (r, c) = step(end + 1);
        if !puzzle.is_open(r, c) {
            break;
        }
        end += 1;
    }
    (start..=end).map(step).collect()
}

/// Direction with the longer run through `cell`; a tie keeps `current`.
pub fn best_direction(puzzle: &CrosswordPuzzle, cell: Cell, current: Axis) -> Axis {
    let across = word_bounds(puzzle, cell, Axis::Across).len();
    let down = word_bounds(puzzle, cell, Axis::Down).len();
    match across.cmp(&down) {
        std::cmp::Ordering::Greater => Axis::Across,
        std::cmp::Ordering::Less => Axis::Down,
        std::cmp::Ordering::Equal => current,
    }
}

// --------------------------------------------------
// Game
// --------------------------------------------------

pub struct CrosswordGame {
    puzzles: &'static [CrosswordPuzzle],
    rounds: Rounds,
    tally: Tally,
    entries: Vec<Vec<Option<char>>>,
    cursor: Option<Cell>,
    direction: Axis,
    /// One flag per clue, in `CrosswordPuzzle::clues` order
    completed: Vec<bool>,
    hints_used: u32,
    /// Clue whose start cell Tab selected last
    clue_cursor: Option<usize>,
    /// Free cell pointer while picking a cell with Enter
    pointer: Option<Cell>,
    timed_out: bool,
}

impl CrosswordGame {
    pub fn new() -> Self {
        Self::with_puzzles(CROSSWORDS)
    }

    pub fn with_puzzles(puzzles: &'static [CrosswordPuzzle]) -> Self {
        let mut game = Self {
            puzzles,
            rounds: Rounds::new(puzzles.len(), SECONDS_PER_PUZZLE),
            tally: Tally::default(),
            entries: Vec::new(),
            cursor: None,
            direction: Axis::Across,
            completed: Vec::new(),
            hints_used: 0,
            clue_cursor: None,
            pointer: None,
            timed_out: false,
        };
        game.clear_board();
        game
    }

    pub fn puzzle(&self) -> &'static CrosswordPuzzle {
        &self.puzzles[self.rounds.index()]
    }

    pub fn entry(&self, (row, col): Cell) -> Option<char> {
        self.entries.get(row)?.get(col).copied().flatten()
    }

    pub fn completed_count(&self) -> usize {
        self.completed.iter().filter(|done| **done).count()
    }

    /// Cells of the word under the cursor.
    pub fn current_word(&self) -> Vec<Cell> {
        self.cursor
            .map(|cell| word_bounds(self.puzzle(), cell, self.direction))
            .unwrap_or_default()
    }

    fn clear_board(&mut self) {
        let puzzle = self.puzzle();
        self.entries = vec![vec![None; puzzle.cols()]; puzzle.rows()];
        self.completed = vec![false; puzzle.clue_count()];
        self.cursor = None;
        self.direction = Axis::Across;
        self.hints_used = 0;
        self.clue_cursor = None;
        self.pointer = None;
        self.timed_out = false;
    }

    /// Selects an open cell and picks the direction of its longer word.
    pub fn select(&mut self, cell: Cell) -> bool {
        let puzzle = self.puzzle();
        if !puzzle.is_open(cell.0, cell.1) {
            return false;
        }
        self.direction = best_direction(puzzle, cell, self.direction);
        self.cursor = Some(cell);
        true
    }

    fn scan(&self, forward: bool) -> Option<Cell> {
        let puzzle = self.puzzle();
        let (mut row, mut col) = self.cursor?;
        loop {
            match (self.direction, forward) {
                (Axis::Across, true) => col += 1,
                (Axis::Down, true) => row += 1,
                (Axis::Across, false) => col = col.checked_sub(1)?,
                (Axis::Down, false) => row = row.checked_sub(1)?,
            }
            if row >= puzzle.rows() || col >= puzzle.cols() {
                return None;
            }
            if puzzle.is_open(row, col) {
                return Some((row, col));
            }
        }
    }

    /// Moves to the next open cell along the current direction.
    pub fn next_cell(&mut self) {
        if let Some(cell) = self.scan(true) {
            self.cursor = Some(cell);
        }
    }

    pub fn previous_cell(&mut self) {
        if let Some(cell) = self.scan(false) {
            self.cursor = Some(cell);
        }
    }

    fn steer(&mut self, axis: Axis, forward: bool) {
        if self.cursor.is_none() {
            self.select_clue(0);
            return;
        }
        self.direction = axis;
        if forward {
            self.next_cell();
        } else {
            self.previous_cell();
        }
    }

    /// First Enter shows the pointer; the next one selects the cell under it.
    fn pick_with_pointer(&mut self) {
        match self.pointer {
            None => self.pointer = Some(self.cursor.unwrap_or((0, 0))),
            Some(cell) => {
                if self.select(cell) {
                    self.pointer = None;
                }
            }
        }
    }

    fn move_pointer(&mut self, key: KeyCode) {
        let puzzle = self.puzzle();
        let Some((row, col)) = self.pointer else {
            return;
        };
        self.pointer = Some(match key {
            KeyCode::Up => (row.saturating_sub(1), col),
            KeyCode::Down => ((row + 1).min(puzzle.rows() - 1), col),
            KeyCode::Left => (row, col.saturating_sub(1)),
            KeyCode::Right => (row, (col + 1).min(puzzle.cols() - 1)),
            _ => (row, col),
        });
    }

    pub fn type_letter(&mut self, letter: char) {
        if !self.rounds.is_open() || !letter.is_ascii_alphabetic() {
            return;
        }
        let Some((row, col)) = self.cursor else {
            return;
        };
        self.entries[row][col] = Some(letter.to_ascii_uppercase());
        self.check_completion();
        if self.rounds.is_open() {
            self.next_cell();
        }
    }

    pub fn backspace(&mut self) {
        if !self.rounds.is_open() {
            return;
        }
        if let Some((row, col)) = self.cursor {
            self.entries[row][col] = None;
            self.check_completion();
            self.previous_cell();
        }
    }

    fn clue_done(&self, axis: Axis, clue: &Clue) -> bool {
        clue.cells(axis)
            .zip(clue.answer.chars())
            .all(|(cell, expected)| self.entry(cell) == Some(expected))
    }

    fn check_completion(&mut self) {
        let puzzle = self.puzzle();
        self.completed = puzzle
            .clues()
            .map(|(axis, clue)| self.clue_done(axis, clue))
            .collect();
        if self.rounds.is_open() && self.completed.iter().all(|done| *done) {
            let clues = puzzle.clue_count() as u32;
            let bonus = self.rounds.seconds_left() * 2;
            self.tally.add_points(POINTS_PER_CLUE * clues + bonus);
            self.tally.correct += clues;
            info!("crossword {}: solved with {}s left", puzzle.id, self.rounds.seconds_left());
            self.rounds.lock_then_advance(SOLVED_DELAY);
        }
    }

    /// Reveals the first letter of clue `number`. Costs points and is
    /// limited per puzzle.
    pub fn hint(&mut self, number: u32) -> bool {
        if !self.rounds.is_open() || self.hints_used >= MAX_HINTS {
            return false;
        }
        let Some((axis, clue)) = self.puzzle().clues().find(|(_, c)| c.number == number) else {
            return false;
        };
        let Some(first) = clue.answer.chars().next() else {
            return false;
        };
        let (row, col) = (clue.row, clue.col);
        self.entries[row][col] = Some(first);
        self.hints_used += 1;
        self.tally.deduct(HINT_COST);
        self.cursor = Some((row, col));
        self.direction = axis;
        debug!("crossword: hint {} for clue {number} {axis}", self.hints_used);
        self.check_completion();
        true
    }

    /// Jumps to the start cell of the `index`-th clue.
    pub fn select_clue(&mut self, index: usize) {
        let Some((axis, clue)) = self.puzzle().clues().nth(index) else {
            return;
        };
        self.cursor = Some((clue.row, clue.col));
        self.direction = axis;
        self.clue_cursor = Some(index);
    }

    fn cycle_clue(&mut self, forward: bool) {
        let count = self.puzzle().clue_count();
        if count == 0 {
            return;
        }
        let next = match (self.clue_cursor, forward) {
            (None, true) => 0,
            (None, false) => count - 1,
            (Some(i), true) => (i + 1) % count,
            (Some(i), false) => (i + count - 1) % count,
        };
        self.select_clue(next);
    }

    fn on_round_event(&mut self, event: RoundEvent) {
        match event {
            RoundEvent::TimedOut => {
                let done = self.completed_count() as u32;
                self.tally.add_points(POINTS_PER_CLUE * done);
                self.tally.correct += done;
                self.timed_out = true;
                info!("crossword {}: time up with {done} clues", self.puzzle().id);
                self.rounds.lock_then_advance(TIMEOUT_DELAY);
            }
            RoundEvent::Advanced => self.clear_board(),
            RoundEvent::Finished => {
                info!("crossword finished: {} clues", self.tally.correct);
            }
            RoundEvent::Idle => {}
        }
    }

    fn total_clues(&self) -> u32 {
        self.puzzles.iter().map(|p| p.clue_count() as u32).sum()
    }

    fn grid_lines(&self) -> Vec<Line<'static>> {
        let puzzle = self.puzzle();
        let word = self.current_word();
        let solved_cells: Vec<Cell> = puzzle
            .clues()
            .zip(&self.completed)
            .filter(|(_, done)| **done)
            .flat_map(|((axis, clue), _)| clue.cells(axis).collect::<Vec<_>>())
            .collect();

        (0..puzzle.rows())
            .map(|row| {
                let spans: Vec<Span> = (0..puzzle.cols())
                    .map(|col| {
                        let cell = (row, col);
                        if self.pointer == Some(cell) {
                            let letter = self.entry(cell).unwrap_or(' ');
                            return Span::styled(
                                format!("[{letter}]"),
                                Style::default().fg(Color::Black).bg(Color::Magenta).bold(),
                            );
                        }
                        if !puzzle.is_open(row, col) {
                            return Span::styled("   ", Style::default().bg(Color::DarkGray));
                        }
                        let letter = self.entry(cell).unwrap_or(' ');
                        let style = if self.cursor == Some(cell) {
                            Style::default().fg(Color::Black).bg(Color::Yellow)
                        } else if solved_cells.contains(&cell) {
                            Style::default().fg(Color::Black).bg(Color::Green)
                        } else if word.contains(&cell) {
                            Style::default().fg(Color::Black).bg(Color::LightBlue)
                        } else {
                            Style::default().fg(Color::Black).bg(Color::White)
                        };
                        Span::styled(format!(" {letter} "), style.bold())
                    })
                    .collect();
                Line::from(spans)
            })
            .collect()
    }

    fn clue_lines(&self) -> Vec<Line<'static>> {
        let puzzle = self.puzzle();
        let mut lines = Vec::new();
        for (i, (axis, clue)) in puzzle.clues().enumerate() {
            if i == 0 || (axis == Axis::Down && i == puzzle.across.len()) {
                let heading = if axis == Axis::Across { "Across" } else { "Down" };
                lines.push(Line::from(heading).bold().underlined());
            }
            let done = self.completed.get(i).copied().unwrap_or(false);
            let text = format!("{}. {} ({})", clue.number, clue.clue, clue.len());
            lines.push(if done {
                Line::from(format!("✔ {text}")).green()
            } else {
                Line::from(format!("  {text}"))
            });
        }
        lines
    }
}

impl Default for CrosswordGame {
    fn default() -> Self {
        Self::new()
    }
}

impl Game for CrosswordGame {
    fn descriptor(&self) -> &'static GameDescriptor {
        &CROSSWORD
    }

    fn phase(&self) -> Phase {
        self.rounds.phase()
    }

    fn start(&mut self) {
        self.reset();
        self.rounds.start();
        info!("crossword started with {} puzzles", self.puzzles.len());
    }

    fn reset(&mut self) {
        self.rounds.reset();
        self.tally = Tally::default();
        self.clear_board();
    }

    fn tick(&mut self, dt: Duration) {
        let event = self.rounds.tick(dt);
        self.on_round_event(event);
    }

    fn handle_key(&mut self, key: KeyCode) {
        if self.pointer.is_some() {
            match key {
                KeyCode::Up | KeyCode::Down | KeyCode::Left | KeyCode::Right => {
                    self.move_pointer(key);
                    return;
                }
                KeyCode::Enter => {
                    self.pick_with_pointer();
                    return;
                }
                _ => self.pointer = None,
            }
        }
        match key {
            KeyCode::Enter => self.pick_with_pointer(),
            KeyCode::Left => self.steer(Axis::Across, false),
            KeyCode::Right => self.steer(Axis::Across, true),
            KeyCode::Up => self.steer(Axis::Down, false),
            KeyCode::Down => self.steer(Axis::Down, true),
            KeyCode::Tab => self.cycle_clue(true),
            KeyCode::BackTab => self.cycle_clue(false),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Char(c) if c.is_ascii_alphabetic() => self.type_letter(c),
            KeyCode::Char(c) => {
                if let Some(number) = c.to_digit(10) {
                    self.hint(number);
                }
            }
            _ => {}
        }
    }

    fn summary(&self) -> Summary {
        let total = self.total_clues();
        let (grade, message) = STANDARD_SCALE.grade(self.tally.correct, total);
        Summary {
            score: self.tally.score,
            correct: self.tally.correct,
            total: Some(total),
            grade: Some(grade),
            message,
            stats: vec![("Puzzles", self.puzzles.len().to_string())],
        }
    }

    fn draw(&self, frame: &mut Frame, area: Rect) {
        let puzzle = self.puzzle();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(2),
                Constraint::Min(6),
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
        frame.render_widget(Paragraph::new(puzzle.title).bold().centered(), chunks[1]);

        let grid_width = (puzzle.cols() * 3 + 2) as u16;
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(grid_width), Constraint::Min(20)])
            .split(chunks[2]);
        frame.render_widget(
            Paragraph::new(self.grid_lines()).block(Block::default().borders(Borders::ALL)),
            columns[0],
        );
        frame.render_widget(
            Paragraph::new(self.clue_lines())
                .wrap(Wrap { trim: true })
                .block(Block::default().borders(Borders::ALL).title("Clues")),
            columns[1],
        );

        let footer = if self.timed_out {
            Line::from(format!("⏱ Time's up! {} clues solved", self.completed_count())).yellow()
        } else if self.rounds.is_locked() {
            Line::from("🎉 Puzzle solved!").green().bold()
        } else if self.pointer.is_some() {
            Line::from("Arrows move the pointer · Enter selects that cell").magenta()
        } else {
            Line::from(format!(
                "Hints left: {}   Direction: {}",
                MAX_HINTS - self.hints_used,
                self.direction
            ))
            .gray()
        };
        frame.render_widget(Paragraph::new(footer), chunks[3]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: CrosswordPuzzle = CrosswordPuzzle {
        id: 99,
        title: "Square",
        grid: &["AB", "C."],
        across: &[],
        down: &[],
    };

    fn science() -> &'static CrosswordPuzzle {
        &CROSSWORDS[0]
    }

    fn started() -> CrosswordGame {
        let mut game = CrosswordGame::new();
        game.start();
        game
    }

    fn type_word(game: &mut CrosswordGame, start: Cell, word: &str) {
        assert!(game.select(start));
        for c in word.chars() {
            game.type_letter(c);
        }
    }

    #[test]
    fn word_bounds_follow_open_runs() {
        let puzzle = science();
        assert_eq!(
            word_bounds(puzzle, (2, 2), Axis::Across),
            vec![(2, 0), (2, 1), (2, 2), (2, 3), (2, 4)]
        );
        assert_eq!(
            word_bounds(puzzle, (2, 2), Axis::Down),
            vec![(1, 2), (2, 2), (3, 2), (4, 2)]
        );
        assert_eq!(word_bounds(puzzle, (2, 6), Axis::Across), vec![(2, 6)]);
        assert!(word_bounds(puzzle, (0, 0), Axis::Across).is_empty());
    }

    #[test]
    fn longer_run_wins_and_tie_keeps_direction() {
        let puzzle = science();
        assert_eq!(best_direction(puzzle, (2, 2), Axis::Down), Axis::Across);
        assert_eq!(best_direction(puzzle, (3, 2), Axis::Across), Axis::Down);
        assert_eq!(best_direction(&SQUARE, (0, 0), Axis::Down), Axis::Down);
        assert_eq!(best_direction(&SQUARE, (0, 0), Axis::Across), Axis::Across);
    }

    #[test]
    fn blocked_cells_cannot_be_selected() {
        let mut game = started();
        assert!(!game.select((0, 0)));
        assert_eq!(game.cursor, None);
        assert!(game.select((0, 6)));
        assert_eq!(game.direction, Axis::Down);
    }

    #[test]
    fn navigation_skips_blocked_cells_and_stops_at_edges() {
        let mut game = started();
        game.select((2, 4));
        assert_eq!(game.direction, Axis::Across);
        game.next_cell();
        assert_eq!(game.cursor, Some((2, 6)));
        game.next_cell();
        assert_eq!(game.cursor, Some((2, 6)));
        game.previous_cell();
        assert_eq!(game.cursor, Some((2, 4)));

        game.select((2, 0));
        game.previous_cell();
        assert_eq!(game.cursor, Some((2, 0)));
    }

    #[test]
    fn arrows_force_direction() {
        let mut game = started();
        game.select((2, 2));
        game.handle_key(KeyCode::Down);
        assert_eq!(game.direction, Axis::Down);
        assert_eq!(game.cursor, Some((3, 2)));
        game.handle_key(KeyCode::Up);
        game.handle_key(KeyCode::Up);
        assert_eq!(game.cursor, Some((1, 2)));
    }

    #[test]
    fn typing_uppercases_and_advances() {
        let mut game = started();
        game.select((2, 0));
        game.type_letter('w');
        assert_eq!(game.entry((2, 0)), Some('W'));
        assert_eq!(game.cursor, Some((2, 1)));
        game.backspace();
        assert_eq!(game.entry((2, 1)), None);
        assert_eq!(game.cursor, Some((2, 0)));
    }

    #[test]
    fn solving_every_clue_scores_and_advances() {
        let mut game = started();
        type_word(&mut game, (2, 0), "WATER");
        assert_eq!(game.completed_count(), 1);
        type_word(&mut game, (0, 6), "SUN");
        type_word(&mut game, (1, 2), "ATOM");
        assert_eq!(game.completed_count(), 3);
        assert_eq!(game.tally.score, 3 * POINTS_PER_CLUE + 2 * SECONDS_PER_PUZZLE);
        assert_eq!(game.tally.correct, 3);

        // locked: typing is ignored
        game.type_letter('x');
        assert_eq!(game.tally.correct, 3);

        game.tick(SOLVED_DELAY);
        assert_eq!(game.rounds.index(), 1);
        assert_eq!(game.completed_count(), 0);
        assert_eq!(game.cursor, None);
    }

    #[test]
    fn timeout_scores_completed_clues() {
        let mut game = started();
        type_word(&mut game, (2, 0), "WATER");
        game.tick(Duration::from_secs(SECONDS_PER_PUZZLE as u64));
        assert_eq!(game.tally.score, POINTS_PER_CLUE);
        assert_eq!(game.tally.correct, 1);
        assert!(game.rounds.is_locked());
        game.tick(Duration::from_secs(2));
        assert_eq!(game.rounds.index(), 0);
        game.tick(Duration::from_secs(1));
        assert_eq!(game.rounds.index(), 1);
    }

    #[test]
    fn hints_reveal_first_letter_and_are_limited() {
        let mut game = started();
        assert!(game.hint(1));
        assert_eq!(game.entry((2, 0)), Some('W'));
        assert_eq!(game.tally.score, 0);
        assert!(game.hint(2));
        assert!(game.hint(3));
        assert!(!game.hint(1));
        assert_eq!(game.hints_used, MAX_HINTS);
    }

    #[test]
    fn hint_for_unknown_clue_is_refused() {
        let mut game = started();
        assert!(!game.hint(7));
        assert_eq!(game.hints_used, 0);
    }

    #[test]
    fn enter_picks_a_cell_and_infers_its_direction() {
        let mut game = started();
        game.handle_key(KeyCode::Tab);
        game.handle_key(KeyCode::Tab);
        assert_eq!(game.direction, Axis::Down);

        game.handle_key(KeyCode::Enter);
        assert_eq!(game.pointer, Some((0, 6)));
        // pointer moves freely and does not steer
        game.handle_key(KeyCode::Down);
        game.handle_key(KeyCode::Down);
        for _ in 0..4 {
            game.handle_key(KeyCode::Left);
        }
        assert_eq!(game.pointer, Some((2, 2)));
        assert_eq!(game.cursor, Some((0, 6)));
        assert_eq!(game.direction, Axis::Down);

        game.handle_key(KeyCode::Enter);
        assert_eq!(game.pointer, None);
        assert_eq!(game.cursor, Some((2, 2)));
        assert_eq!(game.direction, Axis::Across);
        assert_eq!(game.current_word(), vec![(2, 0), (2, 1), (2, 2), (2, 3), (2, 4)]);
    }

    #[test]
    fn pointer_on_blocked_cell_keeps_picking() {
        let mut game = started();
        game.handle_key(KeyCode::Enter);
        assert_eq!(game.pointer, Some((0, 0)));
        game.handle_key(KeyCode::Enter);
        assert_eq!(game.pointer, Some((0, 0)));
        assert_eq!(game.cursor, None);

        // any other key drops the pointer and acts as usual
        game.handle_key(KeyCode::Tab);
        assert_eq!(game.pointer, None);
        assert_eq!(game.cursor, Some((2, 0)));
    }

    #[test]
    fn tab_cycles_clue_starts() {
        let mut game = started();
        game.handle_key(KeyCode::Tab);
        assert_eq!(game.cursor, Some((2, 0)));
        assert_eq!(game.direction, Axis::Across);
        game.handle_key(KeyCode::Tab);
        assert_eq!(game.cursor, Some((0, 6)));
        assert_eq!(game.direction, Axis::Down);
        game.handle_key(KeyCode::BackTab);
        assert_eq!(game.cursor, Some((2, 0)));
    }
}
