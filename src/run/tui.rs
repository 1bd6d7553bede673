use anyhow::Result;
use chrono::Utc;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;

use crate::db::Database;
use crate::directory::UserDirectory;
use crate::ui::app::{App, Backend, InputMode, Screen};
use crate::ui::commands;

pub(crate) fn as_tui(db: &Database, users: &dyn UserDirectory) -> Result<()> {
    let backend = Backend { db, users };
    let mut app = App::new(Utc::now());
    app.refresh_all(&backend)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let result = run_app(&mut terminal, &mut app, &backend);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        tracing::error!(error = %e, "tui exited with an error");
        eprintln!("Error: {e:?}");
    }

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    backend: &Backend,
) -> Result<()> {
    while app.running {
        terminal.draw(|f| {
            // Tab, status and command bars, borders and the table header
            let content_height = f.area().height.saturating_sub(6) as usize;
            app.visible_rows = content_height.max(1);
            crate::ui::render::render(f, app);
        })?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if app.show_help {
                app.show_help = false;
                continue;
            }
            match app.input_mode {
                InputMode::Normal => handle_normal_input(key, app, backend)?,
                InputMode::Command => handle_command_input(key, app, backend)?,
            }
        }
    }
    Ok(())
}

// ── Input handlers ───────────────────────────────────────────

fn handle_normal_input(key: KeyEvent, app: &mut App, backend: &Backend) -> Result<()> {
    let page = app.visible_rows;
    match key.code {
        KeyCode::Char(':') => {
            app.input_mode = InputMode::Command;
            app.command_input.clear();
        }
        KeyCode::Char('q') | KeyCode::Char('c')
            if key.modifiers.contains(KeyModifiers::CONTROL) =>
        {
            app.running = false;
        }
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            let len = app.active_len();
            let cursor = app.active_cursor();
            for _ in 0..page / 2 {
                cursor.down(len, page);
            }
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            let cursor = app.active_cursor();
            for _ in 0..page / 2 {
                cursor.up();
            }
        }
        KeyCode::Char('j') | KeyCode::Down => {
            let len = app.active_len();
            app.active_cursor().down(len, page);
        }
        KeyCode::Char('k') | KeyCode::Up => app.active_cursor().up(),
        KeyCode::Char('g') => app.active_cursor().top(),
        KeyCode::Char('G') => {
            let len = app.active_len();
            app.active_cursor().bottom(len, page);
        }
        KeyCode::Char('1') => switch_screen(app, backend, Screen::Records)?,
        KeyCode::Char('2') => switch_screen(app, backend, Screen::Report)?,
        KeyCode::Tab | KeyCode::BackTab => {
            let screens = Screen::all();
            let idx = screens.iter().position(|s| *s == app.screen).unwrap_or(0);
            let next = if key.code == KeyCode::Tab {
                (idx + 1) % screens.len()
            } else {
                (idx + screens.len() - 1) % screens.len()
            };
            switch_screen(app, backend, screens[next])?;
        }
        KeyCode::Char('H') => commands::handle_command("prev-month", app, backend)?,
        KeyCode::Char('L') => commands::handle_command("next-month", app, backend)?,
        KeyCode::Char('?') => {
            app.show_help = true;
        }
        KeyCode::Esc => app.status_message.clear(),
        _ => {}
    }
    Ok(())
}

fn handle_command_input(key: KeyEvent, app: &mut App, backend: &Backend) -> Result<()> {
    match key.code {
        KeyCode::Enter => {
            let input = std::mem::take(&mut app.command_input);
            app.input_mode = InputMode::Normal;
            commands::handle_command(&input, app, backend)?;
        }
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            app.command_input.clear();
        }
        KeyCode::Backspace => {
            app.command_input.pop();
            if app.command_input.is_empty() {
                app.input_mode = InputMode::Normal;
            }
        }
        KeyCode::Char(c) => {
            app.command_input.push(c);
        }
        _ => {}
    }
    Ok(())
}

fn switch_screen(app: &mut App, backend: &Backend, screen: Screen) -> Result<()> {
    app.screen = screen;
    match screen {
        Screen::Records => app.refresh_records(backend)?,
        Screen::Report => app.refresh_report(backend),
    }
    Ok(())
}

#[cfg(test)]
#[path = "tui_tests.rs"]
mod tests;
