// ============================================
// src/app.rs
// Home menu, rules, play and results screens
// ============================================

use std::time::Duration;

use crossterm::event::KeyCode;
use log::{info, warn};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};

use crate::config::Settings;
use crate::games::{self, Difficulty, Game, GameError, Phase, REGISTRY};
use crate::save_data::{History, ResultRecord, ResultStore};

enum Screen {
    Menu,
    /// The game's own phase picks rules, play or results.
    Game(Box<dyn Game>),
}

pub struct App {
    screen: Screen,
    menu_cursor: usize,
    difficulty: Difficulty,
    /// `None` when results are not recorded
    store: Option<ResultStore>,
    history: History,
    /// The finished game on screen has been written to the history
    recorded: bool,
    /// Launched straight into one game: leaving it quits
    direct: bool,
    notice: Option<String>,
    quit: bool,
}

impl App {
    pub fn new(settings: &Settings, store: Option<ResultStore>) -> Self {
        let history = store.as_ref().map(ResultStore::load_or_default).unwrap_or_default();
        Self {
            screen: Screen::Menu,
            menu_cursor: 0,
            difficulty: settings.default_difficulty,
            store,
            history,
            recorded: false,
            direct: false,
            notice: None,
            quit: false,
        }
    }

    /// Opens `game` on its rules screen; Esc from there quits.
    pub fn with_game(settings: &Settings, store: Option<ResultStore>, game: Box<dyn Game>) -> Self {
        let mut app = Self::new(settings, store);
        app.screen = Screen::Game(game);
        app.direct = true;
        app
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    fn current_game(&self) -> Option<&dyn Game> {
        match &self.screen {
            Screen::Game(game) => Some(game.as_ref()),
            Screen::Menu => None,
        }
    }

    fn open_selected(&mut self) {
        let descriptor = REGISTRY[self.menu_cursor];
        match games::create(descriptor.slug, self.difficulty) {
            Ok(game) => {
                info!("opening {}", descriptor.slug);
                self.notice = None;
                self.recorded = false;
                self.screen = Screen::Game(game);
            }
            Err(err @ GameError::ComingSoon(_)) => self.notice = Some(err.to_string()),
            Err(err) => {
                warn!("{err}");
                self.notice = Some(err.to_string());
            }
        }
    }

    fn leave_game(&mut self) {
        if self.direct {
            self.quit = true;
        } else {
            self.screen = Screen::Menu;
        }
    }

    fn record_if_finished(&mut self) {
        let Screen::Game(game) = &self.screen else {
            return;
        };
        if game.phase() != Phase::Finished || self.recorded {
            return;
        }
        self.recorded = true;
        let record = ResultRecord::new(game.descriptor().slug, &game.summary());
        info!("{} finished with {}", record.game, record.score);
        if let Some(store) = &self.store {
            if let Err(err) = store.append(record.clone()) {
                warn!("could not record result: {err}");
            }
        }
        self.history.records.push(record);
    }

    pub fn tick(&mut self, dt: Duration) {
        if let Screen::Game(game) = &mut self.screen {
            game.tick(dt);
        }
        self.record_if_finished();
    }

    pub fn handle_key(&mut self, key: KeyCode) {
        match &mut self.screen {
            Screen::Menu => match key {
                KeyCode::Up => self.menu_cursor = self.menu_cursor.saturating_sub(1),
                KeyCode::Down => self.menu_cursor = (self.menu_cursor + 1).min(REGISTRY.len() - 1),
                KeyCode::Enter => self.open_selected(),
                KeyCode::Esc | KeyCode::Char('q') => self.quit = true,
                _ => {}
            },
            Screen::Game(game) => match (game.phase(), key) {
                (Phase::NotStarted, KeyCode::Enter) => {
                    self.recorded = false;
                    game.start();
                }
                (Phase::NotStarted, KeyCode::Left | KeyCode::Right) => {
                    if let Some(current) = game.difficulty() {
                        let next = if key == KeyCode::Left { current.previous() } else { current.next() };
                        game.set_difficulty(next);
                        self.difficulty = next;
                    }
                }
                (Phase::Playing, KeyCode::Esc) => {
                    game.reset();
                    self.leave_game();
                }
                (Phase::Playing, key) => game.handle_key(key),
                (Phase::Finished, KeyCode::Char('r')) => game.reset(),
                (Phase::NotStarted | Phase::Finished, KeyCode::Esc) => self.leave_game(),
                _ => {}
            },
        }
        self.record_if_finished();
    }

    // --------------------------------------------------
    // MARK: Drawing
    // --------------------------------------------------

    pub fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let title = match self.current_game() {
            Some(game) => format!(" Edu Khel · {} ", game.descriptor().title),
            None => " Edu Khel ".to_string(),
        };
        let block = Block::default().borders(Borders::ALL).title(title);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        match &self.screen {
            Screen::Menu => self.draw_menu(frame, inner),
            Screen::Game(game) => match game.phase() {
                Phase::NotStarted => self.draw_rules(game.as_ref(), frame, inner),
                Phase::Playing => game.draw(frame, inner),
                Phase::Finished => self.draw_results(game.as_ref(), frame, inner),
            },
        }
    }

    fn draw_menu(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Min(5),
                Constraint::Length(1),
            ])
            .split(area);
        frame.render_widget(
            Paragraph::new("🎮 Learn through play").bold().centered(),
            chunks[0],
        );

        let items: Vec<ListItem> = REGISTRY
            .iter()
            .map(|game| {
                let mut spans = vec![Span::styled(
                    format!("{:<28}", game.title),
                    Style::default().fg(Color::White).bold(),
                )];
                if game.playable {
                    spans.push(Span::raw(game.description).gray());
                    if let Some(best) = self.history.best_for(game.slug) {
                        spans.push(Span::raw(format!("  🏆 {best}")).yellow());
                    }
                } else {
                    spans.push(Span::raw("Coming Soon").dark_gray().italic());
                }
                ListItem::new(Line::from(spans))
            })
            .collect();
        let mut state = ListState::default().with_selected(Some(self.menu_cursor));
        frame.render_stateful_widget(
            List::new(items)
                .highlight_style(Style::default().bg(Color::DarkGray))
                .highlight_symbol("▶ "),
            chunks[1],
            &mut state,
        );

        let footer = match &self.notice {
            Some(notice) => Line::from(notice.clone()).yellow(),
            None => Line::from("↑/↓ choose · Enter open · Esc quit").gray(),
        };
        frame.render_widget(Paragraph::new(footer).centered(), chunks[2]);
    }

    fn draw_rules(&self, game: &dyn Game, frame: &mut Frame, area: Rect) {
        let descriptor = game.descriptor();
        let mut lines = vec![
            Line::from(descriptor.title).bold().cyan(),
            Line::from(descriptor.description).gray(),
            Line::from(""),
            Line::from("How to play").bold(),
        ];
        lines.extend(descriptor.rules.iter().map(|rule| Line::from(format!("• {rule}"))));
        lines.push(Line::from(""));
        if let Some(difficulty) = game.difficulty() {
            let choices: Vec<Span> = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard]
                .into_iter()
                .map(|d| {
                    let label = format!(" {d} ");
                    if d == difficulty {
                        Span::styled(label, Style::default().fg(Color::Black).bg(Color::Yellow).bold())
                    } else {
                        Span::raw(label).gray()
                    }
                })
                .collect();
            lines.push(Line::from(choices));
            lines.push(Line::from("←/→ change difficulty").dark_gray());
            lines.push(Line::from(""));
        }
        lines.push(Line::from("Enter start · Esc back").green());
        frame.render_widget(
            Paragraph::new(lines).wrap(Wrap { trim: true }),
            crate::ui::centered_rect(80, 80, area),
        );
    }

    fn draw_results(&self, game: &dyn Game, frame: &mut Frame, area: Rect) {
        let summary = game.summary();
        let mut lines = vec![
            Line::from(summary.message).bold().yellow(),
            Line::from(""),
            Line::from(format!("Score: {}", summary.score)).bold(),
        ];
        if let Some(total) = summary.total {
            lines.push(Line::from(format!("Correct: {} / {total}", summary.correct)));
        }
        if let Some(grade) = summary.grade {
            lines.push(Line::from(format!("Grade: {}", grade.label())).cyan().bold());
        }
        for (label, value) in &summary.stats {
            lines.push(Line::from(format!("{label}: {value}")).gray());
        }
        if let Some(best) = self.history.best_for(game.descriptor().slug) {
            lines.push(Line::from(format!("Best score: {best}")).magenta());
        }
        lines.push(Line::from(""));
        lines.push(Line::from("r play again · Esc back").green());
        frame.render_widget(
            Paragraph::new(lines).centered(),
            crate::ui::centered_rect(60, 70, area),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::mcq::McqGame;

    fn store() -> (tempfile::TempDir, ResultStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultStore::at(dir.path().join("results.bin"));
        (dir, store)
    }

    fn phase(app: &App) -> Option<Phase> {
        app.current_game().map(|g| g.phase())
    }

    #[test]
    fn menu_cursor_is_clamped() {
        let mut app = App::new(&Settings::default(), None);
        app.handle_key(KeyCode::Up);
        assert_eq!(app.menu_cursor, 0);
        for _ in 0..40 {
            app.handle_key(KeyCode::Down);
        }
        assert_eq!(app.menu_cursor, REGISTRY.len() - 1);
    }

    #[test]
    fn placeholder_shows_notice() {
        let mut app = App::new(&Settings::default(), None);
        app.menu_cursor = REGISTRY.iter().position(|g| !g.playable).unwrap();
        app.handle_key(KeyCode::Enter);
        assert!(app.current_game().is_none());
        assert!(app.notice.as_deref().unwrap().contains("coming soon"));
    }

    #[test]
    fn enter_opens_rules_then_starts() {
        let mut app = App::new(&Settings::default(), None);
        app.menu_cursor = REGISTRY.iter().position(|g| g.slug == "mcq").unwrap();
        app.handle_key(KeyCode::Enter);
        assert_eq!(phase(&app), Some(Phase::NotStarted));
        app.handle_key(KeyCode::Enter);
        assert_eq!(phase(&app), Some(Phase::Playing));
        app.handle_key(KeyCode::Esc);
        assert!(app.current_game().is_none());
        assert!(!app.should_quit());
    }

    #[test]
    fn difficulty_changes_on_rules_screen() {
        let mut app = App::new(&Settings::default(), None);
        app.menu_cursor = REGISTRY.iter().position(|g| g.slug == "time-rush").unwrap();
        app.handle_key(KeyCode::Enter);
        app.handle_key(KeyCode::Right);
        assert_eq!(app.current_game().and_then(|g| g.difficulty()), Some(Difficulty::Hard));
        assert_eq!(app.difficulty, Difficulty::Hard);
    }

    #[test]
    fn finished_game_is_recorded_once() {
        let (_dir, store) = store();
        let mut app = App::with_game(&Settings::default(), Some(store.clone()), Box::new(McqGame::new()));
        app.handle_key(KeyCode::Enter);
        while phase(&app) == Some(Phase::Playing) {
            app.handle_key(KeyCode::Char('1'));
            app.tick(Duration::from_secs(2));
        }
        assert_eq!(phase(&app), Some(Phase::Finished));
        app.tick(Duration::from_secs(1));
        let history = store.load().unwrap();
        assert_eq!(history.records.len(), 1);
        assert_eq!(history.records[0].game, "mcq");
        assert_eq!(app.history.records.len(), 1);

        // play again, then leave: direct launch quits
        app.handle_key(KeyCode::Char('r'));
        assert_eq!(phase(&app), Some(Phase::NotStarted));
        app.handle_key(KeyCode::Esc);
        assert!(app.should_quit());
    }
}
