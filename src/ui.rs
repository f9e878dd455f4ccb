// ============================================
// src/ui.rs
// Small drawing helpers shared by the shell and the games
// ============================================

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
};

/// How an answer option should look right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionMark {
    Plain,
    Cursor,
    Selected,
    /// Selected and under the cursor (multi-select)
    SelectedCursor,
    Correct,
    Wrong,
    Faded,
}

/// `m:ss`
pub fn format_clock(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Timer span that turns red in the last ten seconds.
pub fn timer_span(secs: u32) -> Span<'static> {
    let style = if secs <= 10 {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Cyan)
    };
    Span::styled(format!("⏱ {}", format_clock(secs)), style)
}

/// Top status line: progress, timer and score.
pub fn status_line(progress: Option<(usize, usize)>, secs: Option<u32>, score: u32) -> Line<'static> {
    let mut spans = Vec::new();
    if let Some((current, total)) = progress {
        spans.push(Span::styled(
            format!("{}/{}", current + 1, total),
            Style::default().fg(Color::Gray),
        ));
        spans.push(Span::raw("   "));
    }
    if let Some(secs) = secs {
        spans.push(timer_span(secs));
        spans.push(Span::raw("   "));
    }
    spans.push(Span::styled(
        format!("Score: {score}"),
        Style::default().fg(Color::Yellow).bold(),
    ));
    Line::from(spans)
}

/// Numbered option line (`1. Delhi`) styled by its mark.
pub fn option_line(index: usize, text: &str, mark: OptionMark) -> Line<'static> {
    let (prefix, style) = match mark {
        OptionMark::Plain => ("  ", Style::default().fg(Color::White)),
        OptionMark::Cursor => ("> ", Style::default().fg(Color::Black).bg(Color::White)),
        OptionMark::Selected => ("* ", Style::default().fg(Color::Magenta).bold()),
        OptionMark::SelectedCursor => ("*>", Style::default().fg(Color::Black).bg(Color::Magenta)),
        OptionMark::Correct => ("✔ ", Style::default().fg(Color::Green).bold()),
        OptionMark::Wrong => ("✘ ", Style::default().fg(Color::Red).bold()),
        OptionMark::Faded => ("  ", Style::default().fg(Color::DarkGray)),
    };
    Line::from(Span::styled(format!("{prefix}{}. {text}", index + 1), style))
}

/// Rectangle of the given percentage size centred in `area`.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
