pub mod app;
pub mod ui;

use std::io;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tracing::info;
use workoutlog_core::{FileLogStore, LogBook, LogStore};

use crate::tui::app::{App, InputMode};

pub fn run(book: LogBook<FileLogStore>) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(book);
    info!("calendar view opened");
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{:?}", err);
    }

    Ok(())
}

fn run_app<B: Backend, S: LogStore>(terminal: &mut Terminal<B>, app: &mut App<S>) -> io::Result<()> {
    loop {
        terminal
            .draw(|f| ui::draw(f, app))
            .map_err(|e| io::Error::other(e.to_string()))?;

        if !event::poll(std::time::Duration::from_millis(250))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match app.input_mode {
            InputMode::Normal => match key.code {
                KeyCode::Char('q') => return Ok(()),
                KeyCode::Left | KeyCode::Char('h') => app.previous_day(),
                KeyCode::Right | KeyCode::Char('l') => app.next_day(),
                KeyCode::Up | KeyCode::Char('k') => app.previous_week(),
                KeyCode::Down | KeyCode::Char('j') => app.next_week(),
                KeyCode::Char('[') => app.previous_month(),
                KeyCode::Char(']') => app.next_month(),
                KeyCode::Char('t') => app.today(),
                KeyCode::Tab | KeyCode::Char('n') => app.next(),
                KeyCode::BackTab | KeyCode::Char('p') => app.previous(),
                KeyCode::Char('d') | KeyCode::Delete => app.delete_log(),
                KeyCode::Char('a') => app.enter_add_mode(),
                KeyCode::Char('m') => app.enter_modify_mode(),
                KeyCode::Char('r') => app.reload(),
                _ => {}
            },
            InputMode::Adding | InputMode::Modifying => match key.code {
                KeyCode::Enter => app.submit_command(),
                KeyCode::Esc => app.exit_input_mode(),
                KeyCode::Char(c) => app.input_char(c),
                KeyCode::Backspace => app.delete_char(),
                KeyCode::Left => app.move_cursor_left(),
                KeyCode::Right => app.move_cursor_right(),
                _ => {}
            },
        }
    }
}
