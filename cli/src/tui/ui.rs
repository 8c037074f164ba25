use chrono::{Datelike, NaiveDate};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Row, Table, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;
use workoutlog_core::{DayKey, LogStore};

use crate::tui::app::{App, InputMode};

const WEEKDAYS: [&str; 7] = ["Mo", "Tu", "We", "Th", "Fr", "Sa", "Su"];

pub fn draw<S: LogStore>(f: &mut Frame, app: &mut App<S>) {
    let size = f.area();

    // Header and Main Content Split
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(0)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(1),    // Content
            Constraint::Length(1), // Footer/Input
        ])
        .split(size);

    let title = format!(
        "WORKOUT LOG  {}",
        app.selected_day().date().format("%B %Y")
    );
    let header = Paragraph::new(title)
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_type(BorderType::Rounded));
    f.render_widget(header, main_chunks[0]);

    let content_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(32), Constraint::Min(20)])
        .split(main_chunks[1]);

    draw_calendar(f, app, content_chunks[0]);

    let right_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(content_chunks[1]);

    draw_day_list(f, app, right_chunks[0]);
    draw_detail_view(f, app, right_chunks[1]);
    draw_footer(f, app, main_chunks[2]);
}

/// Monday-first grid of the selected day's month, padded to whole weeks.
fn month_grid(day: DayKey) -> Vec<[Option<NaiveDate>; 7]> {
    let Some(first) = NaiveDate::from_ymd_opt(day.year(), day.month(), 1) else {
        return Vec::new();
    };
    let offset = first.weekday().num_days_from_monday() as usize;

    let mut weeks = Vec::new();
    let mut week = [None; 7];
    let mut slot = offset;
    let mut current = Some(first);
    while let Some(date) = current.filter(|d| d.month() == day.month()) {
        week[slot] = Some(date);
        slot += 1;
        if slot == 7 {
            weeks.push(week);
            week = [None; 7];
            slot = 0;
        }
        current = date.succ_opt();
    }
    if slot > 0 {
        weeks.push(week);
    }
    weeks
}

fn draw_calendar<S: LogStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let selected = app.selected_day();
    let today = DayKey::today();
    let busy = app.busy_days();

    let mut lines = vec![Line::from(
        WEEKDAYS
            .iter()
            .map(|d| Span::styled(format!(" {:>2} ", d), Style::default().fg(Color::Yellow)))
            .collect::<Vec<_>>(),
    )];

    for week in month_grid(selected) {
        let cells: Vec<Span> = week
            .iter()
            .map(|cell| match cell {
                None => Span::raw("    "),
                Some(date) => {
                    let key = DayKey::new(*date);
                    let mut style = Style::default();
                    if busy.contains(&key) {
                        style = style.fg(Color::Green).add_modifier(Modifier::BOLD);
                    }
                    if key == today {
                        style = style.add_modifier(Modifier::UNDERLINED);
                    }
                    if key == selected {
                        style = style.add_modifier(Modifier::REVERSED);
                    }
                    let marker = if busy.contains(&key) { "•" } else { " " };
                    Span::styled(format!(" {:>2}{}", date.day(), marker), style)
                }
            })
            .collect();
        lines.push(Line::from(cells));
    }

    let calendar = Paragraph::new(lines).block(
        Block::default()
            .title(" Calendar ")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded),
    );
    f.render_widget(calendar, area);
}

fn draw_day_list<S: LogStore>(f: &mut Frame, app: &mut App<S>, area: Rect) {
    let title = format!(" {} ", app.selected_day().date().format("%a %Y-%m-%d"));
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded);

    if !app.book.is_ready() {
        let loading = Paragraph::new("Loading…")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(loading, area);
        return;
    }

    if app.logs().is_empty() {
        let empty = Paragraph::new("No workouts logged. Press 'a' to add one.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(empty, area);
        return;
    }

    let rows: Vec<Row> = app
        .logs()
        .iter()
        .map(|log| {
            Row::new(vec![
                Span::raw(log.date.format("%H:%M").to_string()),
                Span::styled(log.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(log.duration.to_string()),
                Span::raw(log.calories.to_string()),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(6), // Time
            Constraint::Min(10),   // Name
            Constraint::Length(5), // Minutes
            Constraint::Length(6), // Calories
        ],
    )
    .header(Row::new(vec!["Time", "Workout", "Min", "kcal"]).style(Style::default().fg(Color::Yellow)))
    .block(block)
    .row_highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol(">> ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn draw_detail_view<S: LogStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let block = Block::default()
        .title(" Detail ")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded);

    let mut detail_text = Vec::new();
    if let Some(log) = app.selected_log() {
        detail_text.push(Line::from(vec![
            Span::styled("Workout: ", Style::default().fg(Color::Blue)),
            Span::styled(log.name.as_str(), Style::default().add_modifier(Modifier::BOLD)),
        ]));
        detail_text.push(Line::from(vec![
            Span::styled("ID: ", Style::default().fg(Color::DarkGray)),
            Span::raw(log.id.to_string()),
        ]));
        detail_text.push(Line::from(vec![
            Span::styled("When: ", Style::default().fg(Color::Blue)),
            Span::raw(log.date.format("%Y-%m-%d %H:%M").to_string()),
        ]));
        detail_text.push(Line::from(vec![
            Span::styled("Effort: ", Style::default().fg(Color::Blue)),
            Span::raw(format!("{} min, {} kcal", log.duration, log.calories)),
        ]));
        if !log.notes.is_empty() {
            detail_text.push(Line::from(Span::styled("Notes:", Style::default().fg(Color::Blue))));
            detail_text.push(Line::from(log.notes.as_str()));
        }
    }

    if let Some(index) = app.book.index() {
        let totals = index.day_totals(app.selected_day());
        if totals.sessions > 0 {
            detail_text.push(Line::from(""));
            detail_text.push(Line::from(Span::styled(
                format!(
                    "Day total: {} sessions, {} min, {} kcal",
                    totals.sessions, totals.minutes, totals.calories
                ),
                Style::default().fg(Color::Green),
            )));
        }
    }

    let detail = Paragraph::new(detail_text)
        .block(block)
        .wrap(Wrap { trim: true });
    f.render_widget(detail, area);
}

fn draw_footer<S: LogStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let prompt = match app.input_mode {
        InputMode::Adding => "add> ",
        InputMode::Modifying => "edit> ",
        InputMode::Normal => {
            let footer = match &app.status {
                Some(status) if status.is_error => Paragraph::new(status.text.as_str())
                    .style(Style::default().fg(Color::Red)),
                Some(status) => Paragraph::new(status.text.as_str())
                    .style(Style::default().fg(Color::Green)),
                None => Paragraph::new(
                    "h/l: Day | j/k: Week | [/]: Month | t: Today | n/p: Workout | a: Add | m: Modify | d: Delete | r: Reload | q: Quit",
                )
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center),
            };
            f.render_widget(footer, area);
            return;
        }
    };

    let mut spans = vec![
        Span::styled(prompt, Style::default().fg(Color::Yellow)),
        Span::raw(app.input.as_str()),
    ];
    if let Some(status) = app.status.as_ref().filter(|s| s.is_error) {
        spans.push(Span::styled(
            format!("  ({})", status.text),
            Style::default().fg(Color::Red),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);

    let x = area.x + (prompt.width() + app.input_before_cursor().width()) as u16;
    f.set_cursor_position(Position::new(x.min(area.right().saturating_sub(1)), area.y));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_grid_starts_on_monday() {
        // May 2024 starts on a Wednesday and spans five weeks
        let grid = month_grid(DayKey::from_ymd(2024, 5, 17).unwrap());
        assert_eq!(grid.len(), 5);
        assert_eq!(grid[0][0], None);
        assert_eq!(grid[0][2], NaiveDate::from_ymd_opt(2024, 5, 1));
        assert_eq!(grid[4][4], NaiveDate::from_ymd_opt(2024, 5, 31));
        assert_eq!(grid[4][5], None);
    }

    #[test]
    fn test_month_grid_full_weeks() {
        // February 2021 starts on a Monday and has exactly four weeks
        let grid = month_grid(DayKey::from_ymd(2021, 2, 3).unwrap());
        assert_eq!(grid.len(), 4);
        assert_eq!(grid[0][0], NaiveDate::from_ymd_opt(2021, 2, 1));
        assert_eq!(grid[3][6], NaiveDate::from_ymd_opt(2021, 2, 28));
    }
}
