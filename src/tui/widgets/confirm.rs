use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::config::Theme;
use crate::tui::widgets::color::parse_color;
use crate::tui::widgets::popup_area;

/// Yes/no popup used for deleting a task and for clearing all data
pub fn render_confirm(f: &mut Frame, area: Rect, title: &str, message: &str, theme: &Theme) {
    let fg_color = parse_color(&theme.fg);
    let bg_color = parse_color(&theme.bg);
    let popup = popup_area(area, 50, 30);
    f.render_widget(Clear, popup);

    let lines = vec![
        Line::from(message.to_string()),
        Line::from(""),
        Line::from("y: Confirm    n / Esc: Cancel"),
    ];
    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title.to_string())
                .title_alignment(Alignment::Center),
        )
        .style(Style::default().fg(fg_color).bg(bg_color))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, popup);
}

/// Quick-add prompt with the current input
pub fn render_input(f: &mut Frame, area: Rect, input: &str, theme: &Theme) {
    let fg_color = parse_color(&theme.fg);
    let bg_color = parse_color(&theme.bg);
    let popup = popup_area(area, 70, 25);
    f.render_widget(Clear, popup);

    let lines = vec![
        Line::from(format!("> {}", input)),
        Line::from(""),
        Line::from("@YYYY-MM-DD date  @@HH:MM time  !high priority  #category"),
        Line::from("Enter: Add    Esc: Cancel"),
    ];
    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("New task"))
        .style(Style::default().fg(fg_color).bg(bg_color))
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, popup);
    f.set_cursor_position((input_cursor_x(popup, input.chars().count()), popup.y + 1));
}

/// Column after the typed text, kept inside the popup border
fn input_cursor_x(popup: Rect, typed: usize) -> u16 {
    let typed = u16::try_from(typed).unwrap_or(u16::MAX);
    popup
        .x
        .saturating_add(3)
        .saturating_add(typed)
        .min(popup.right().saturating_sub(2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_stays_inside_popup_for_long_input() {
        let popup = Rect::new(10, 5, 40, 6);
        assert_eq!(input_cursor_x(popup, 0), 13);
        assert_eq!(input_cursor_x(popup, 5), 18);
        assert_eq!(input_cursor_x(popup, 500), 48);
        assert_eq!(input_cursor_x(popup, 100_000), 48);
    }
}
