use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode, size as terminal_size,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;

use crate::tui::app::{Mode, Tab};
use crate::tui::error::TuiError;
use crate::tui::{App, Layout};
use crate::utils::{ParsedKeyBinding, has_primary_modifier, parse_key_binding};

/// Restores the terminal on drop, so a panic does not leave it in raw mode
struct TerminalGuard {
    raw_mode_enabled: bool,
    alternate_screen_enabled: bool,
}

impl TerminalGuard {
    fn new() -> Result<Self, TuiError> {
        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen)?;
        Ok(Self {
            raw_mode_enabled: true,
            alternate_screen_enabled: true,
        })
    }

    fn restore(&mut self) -> Result<(), TuiError> {
        if self.raw_mode_enabled {
            disable_raw_mode()?;
            self.raw_mode_enabled = false;
        }
        if self.alternate_screen_enabled {
            execute!(io::stdout(), LeaveAlternateScreen)?;
            self.alternate_screen_enabled = false;
        }
        Ok(())
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if self.raw_mode_enabled {
            let _ = disable_raw_mode();
        }
        if self.alternate_screen_enabled {
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
        }
    }
}

pub fn run_event_loop(mut app: App) -> Result<(), TuiError> {
    let (width, height) = terminal_size()?;
    let min_width = Layout::MIN_WIDTH + 2;
    let min_height = Layout::MIN_HEIGHT + 2;
    if width < min_width || height < min_height {
        return Err(TuiError::RenderError(format!(
            "Terminal size too small. Current: {}x{}, Minimum required: {}x{}. Please resize your terminal window.",
            width, height, min_width, min_height
        )));
    }

    let mut guard = TerminalGuard::new()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;
    log::info!("event=tui_start");

    loop {
        app.tick(Instant::now());

        let size = terminal.size()?;
        let layout = Layout::calculate(Rect::new(0, 0, size.width, size.height));
        terminal.draw(|f| crate::tui::render::render(f, &mut app, &layout))?;

        // Press only; Windows also reports releases
        if event::poll(Duration::from_millis(16))? {
            if let Event::Key(key_event) = event::read()? {
                if key_event.kind == KeyEventKind::Press && handle_key_event(&mut app, key_event)? {
                    break;
                }
            }
        }
        if app.quit_requested {
            break;
        }
    }

    guard.restore()?;
    log::info!("event=tui_stop");
    Ok(())
}

fn binding(key: &str) -> Result<ParsedKeyBinding, TuiError> {
    parse_key_binding(key).map_err(TuiError::KeyBindingError)
}

fn matches_key_event(key_event: KeyEvent, binding: &ParsedKeyBinding) -> bool {
    binding.requires_ctrl == has_primary_modifier(key_event.modifiers) && binding.key_code == key_event.code
}

/// Handle one key press. Returns true when the app should quit.
pub fn handle_key_event(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    match app.mode.clone() {
        Mode::Adding => handle_adding_mode(app, key_event),
        Mode::Help => {
            if matches!(key_event.code, KeyCode::Esc)
                || matches_key_event(key_event, &binding(&app.config.key_bindings.help)?)
            {
                app.mode = Mode::View;
            }
            Ok(false)
        }
        Mode::ConfirmDelete(id) => {
            match key_event.code {
                KeyCode::Char('y') | KeyCode::Enter => app.confirm_delete(id)?,
                KeyCode::Char('n') | KeyCode::Esc => app.mode = Mode::View,
                _ => {}
            }
            Ok(false)
        }
        Mode::ConfirmClear => {
            match key_event.code {
                KeyCode::Char('y') => {
                    app.confirm_clear()?;
                    return Ok(app.quit_requested);
                }
                KeyCode::Char('n') | KeyCode::Esc => {
                    app.mode = Mode::View;
                    app.set_status_message("Clear cancelled".to_string());
                }
                _ => {}
            }
            Ok(false)
        }
        Mode::View => handle_view_mode(app, key_event),
    }
}

fn handle_adding_mode(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    match key_event.code {
        KeyCode::Esc => {
            app.input_buffer.clear();
            app.mode = Mode::View;
        }
        KeyCode::Enter => app.submit_add()?,
        KeyCode::Backspace => {
            app.input_buffer.pop();
        }
        KeyCode::Char(c) => app.input_buffer.push(c),
        _ => {}
    }
    Ok(false)
}

fn handle_view_mode(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    let kb = app.config.key_bindings.clone();

    if matches_key_event(key_event, &binding(&kb.quit)?) {
        return Ok(true);
    }
    if matches_key_event(key_event, &binding(&kb.help)?) {
        app.mode = Mode::Help;
    } else if matches_key_event(key_event, &binding(&kb.add)?) {
        app.start_add();
    } else if matches_key_event(key_event, &binding(&kb.filter_next)?) {
        app.switch_tab(app.tab.next());
    } else if matches_key_event(key_event, &binding(&kb.filter_prev)?) {
        app.switch_tab(app.tab.previous());
    } else if matches_key_event(key_event, &binding(&kb.list_up)?) || key_event.code == KeyCode::Up {
        app.move_selection_up();
    } else if matches_key_event(key_event, &binding(&kb.list_down)?) || key_event.code == KeyCode::Down {
        app.move_selection_down();
    } else if matches_key_event(key_event, &binding(&kb.toggle)?) {
        if matches!(app.tab, Tab::Tasks(_)) {
            app.toggle_selected()?;
        }
    } else if matches_key_event(key_event, &binding(&kb.delete)?) {
        if app.tab != Tab::Notifications {
            app.request_delete();
        }
    } else if matches_key_event(key_event, &binding(&kb.mark_all_read)?) {
        app.mark_all_read()?;
    } else if matches_key_event(key_event, &binding(&kb.toggle_dark_mode)?) {
        app.toggle_dark_mode();
    } else if matches_key_event(key_event, &binding(&kb.export)?) {
        app.export();
    } else if matches_key_event(key_event, &binding(&kb.clear_all)?) {
        app.mode = Mode::ConfirmClear;
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    use crossterm::event::KeyModifiers;

    use crate::config::Config;
    use crate::models::NewTask;
    use crate::routine::Routine;
    use crate::store::MemoryStore;
    use crate::utils::FixedClock;

    fn app() -> App {
        let store = Rc::new(MemoryStore::new());
        let clock = Rc::new(FixedClock::on_date("2024-01-01").unwrap());
        let routine = Routine::open(store, clock).unwrap();
        App::new(Config::default(), routine)
    }

    fn press(app: &mut App, code: KeyCode) -> bool {
        handle_key_event(app, KeyEvent::new(code, KeyModifiers::NONE)).unwrap()
    }

    #[test]
    fn quick_add_then_toggle_updates_dashboard() {
        let mut app = app();
        press(&mut app, KeyCode::Char('a'));
        for c in "Water plants".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.mode, Mode::View);
        assert_eq!(app.frame.list.rows.len(), 1);
        assert_eq!(app.frame.dashboard.remaining, 1);

        press(&mut app, KeyCode::Char(' '));
        assert_eq!(app.frame.dashboard.completion_percentage, 100);
        assert!(app.frame.list.rows.is_empty());
        assert_eq!(app.frame.list.empty_message, Some("No tasks yet. Add one to get started!"));
    }

    #[test]
    fn delete_waits_for_confirmation() {
        let mut app = app();
        app.routine.add_task(NewTask::new("Stretch")).unwrap();
        app.refresh();

        press(&mut app, KeyCode::Char('d'));
        assert!(matches!(app.mode, Mode::ConfirmDelete(_)));
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.routine.tasks.all().len(), 1);

        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Char('y'));
        assert!(app.routine.tasks.all().is_empty());
    }

    #[test]
    fn badge_follows_unread_count() {
        let mut app = app();
        app.routine.add_task(NewTask::new("Read")).unwrap();
        assert_eq!(app.badge.get(), 1);
        press(&mut app, KeyCode::Char('r'));
        assert_eq!(app.badge.get(), 0);
    }

    #[test]
    fn declined_clear_keeps_data_and_quit_ends_loop() {
        let mut app = app();
        app.routine.add_task(NewTask::new("Journal")).unwrap();
        handle_key_event(&mut app, KeyEvent::new(KeyCode::Char('x'), KeyModifiers::CONTROL)).unwrap();
        assert_eq!(app.mode, Mode::ConfirmClear);
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.routine.tasks.all().len(), 1);
        assert!(press(&mut app, KeyCode::Char('q')));
    }
}
