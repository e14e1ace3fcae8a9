use ratatui::Frame;
use ratatui::layout::Alignment;
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders};

use crate::tui::app::{Mode, Tab};
use crate::tui::widgets::{
    color::parse_color,
    confirm::{render_confirm, render_input},
    dashboard::render_dashboard,
    help::render_help,
    notification_list::render_notification_list,
    status_bar::{render_status_bar, render_toasts},
    tabs::render_tabs,
    task_list::render_task_list,
};
use crate::tui::{App, Layout};
use crate::utils::format_key_binding_for_display as display;

pub fn render(f: &mut Frame, app: &mut App, layout: &Layout) {
    let fg_color = parse_color(&app.theme.fg);
    let bg_color = parse_color(&app.theme.bg);
    let title = format!("Daily Routine - {}", app.routine.profile.get().name);
    let outer_block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .title_alignment(Alignment::Center)
        .style(Style::default().fg(fg_color).bg(bg_color));
    f.render_widget(outer_block, f.area());

    render_tabs(f, layout.tabs_area, app.tab, app.badge.get(), &app.theme);
    render_dashboard(f, layout.dashboard_area, &app.frame.dashboard, &app.theme);

    match app.tab {
        Tab::Notifications => {
            render_notification_list(
                f,
                layout.main_area,
                app.routine.notifications.history(),
                &mut app.list_state,
                &app.theme,
            );
        }
        tab => {
            let view = app.current_view();
            render_task_list(
                f,
                layout.main_area,
                tab.title(),
                &view,
                &mut app.list_state,
                app.density,
                &app.theme,
            );
        }
    }

    let hints = key_hints(app);
    render_status_bar(f, layout.status_area, app.status_message.as_deref(), &hints, &app.theme);
    render_toasts(f, layout.main_area, app.routine.notifications.toasts(), &app.theme);

    match &app.mode {
        Mode::View => {}
        Mode::Adding => render_input(f, layout.inner_area, &app.input_buffer, &app.theme),
        Mode::Help => render_help(f, layout.inner_area, &app.config.key_bindings, &app.theme),
        Mode::ConfirmDelete(id) => {
            let title = app
                .routine
                .tasks
                .get(*id)
                .map(|t| t.title.clone())
                .unwrap_or_default();
            render_confirm(
                f,
                layout.inner_area,
                "Delete task",
                &format!("Delete \"{}\"?", title),
                &app.theme,
            );
        }
        Mode::ConfirmClear => render_confirm(
            f,
            layout.inner_area,
            "Clear all data",
            "Are you sure you want to clear all data? This cannot be undone.",
            &app.theme,
        ),
    }
}

fn key_hints(app: &App) -> Vec<String> {
    let kb = &app.config.key_bindings;
    let mut hints = vec![format!("{}: Add", display(&kb.add))];
    match app.tab {
        Tab::Tasks(_) => {
            hints.push(format!("{}: Toggle", display(&kb.toggle)));
            hints.push(format!("{}: Delete", display(&kb.delete)));
        }
        Tab::Completed => hints.push(format!("{}: Delete", display(&kb.delete))),
        Tab::Notifications => hints.push(format!("{}: Mark all read", display(&kb.mark_all_read))),
    }
    hints.push(format!("{}: View", display(&kb.filter_next)));
    hints.push(format!("{}: Help", display(&kb.help)));
    hints.push(format!("{}: Quit", display(&kb.quit)));
    hints
}
