use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::config::Theme;
use crate::notifications::{Toast, ToastPhase};
use crate::tui::widgets::color::{get_contrast_text_color, parse_color};
use crate::tui::widgets::truncate;

/// One-line bar: a status message when set, otherwise as many key hints as fit
pub fn render_status_bar(f: &mut Frame, area: Rect, message: Option<&str>, key_hints: &[String], theme: &Theme) {
    let max_width = area.width as usize;
    let (content, style) = match message {
        Some(msg) => {
            let highlight_bg = parse_color(&theme.highlight_bg);
            (
                truncate(msg, max_width),
                Style::default()
                    .fg(get_contrast_text_color(highlight_bg))
                    .bg(highlight_bg)
                    .add_modifier(Modifier::BOLD),
            )
        }
        None => (
            fit_hints(key_hints, max_width),
            Style::default().fg(parse_color(&theme.fg)).bg(parse_color(&theme.bg)),
        ),
    };
    f.render_widget(Paragraph::new(content).style(style), area);
}

fn fit_hints(hints: &[String], max_width: usize) -> String {
    const SEPARATOR: &str = " • ";
    const ELLIPSIS: &str = "...";
    let mut text = String::new();
    for (i, hint) in hints.iter().enumerate() {
        let extra = if text.is_empty() { 0 } else { SEPARATOR.chars().count() };
        // Hints that are not last must leave room for the ellipsis
        let reserve = if i + 1 < hints.len() { ELLIPSIS.len() } else { 0 };
        if text.chars().count() + extra + hint.chars().count() + reserve > max_width {
            if text.is_empty() {
                return truncate(hint, max_width);
            }
            text.push_str(ELLIPSIS);
            break;
        }
        if !text.is_empty() {
            text.push_str(SEPARATOR);
        }
        text.push_str(hint);
    }
    text
}

/// Stack live toasts in the bottom-right corner of `area`, newest lowest.
/// Leaving toasts are dimmed for their exit window.
pub fn render_toasts(f: &mut Frame, area: Rect, toasts: &[Toast], theme: &Theme) {
    const TOAST_WIDTH: u16 = 36;
    const TOAST_HEIGHT: u16 = 3;

    let width = TOAST_WIDTH.min(area.width);
    let bg_color = parse_color(&theme.bg);
    let mut bottom = area.y + area.height;

    for toast in toasts.iter().rev() {
        if bottom < area.y + TOAST_HEIGHT {
            break;
        }
        bottom -= TOAST_HEIGHT;
        let rect = Rect::new(area.x + area.width - width, bottom, width, TOAST_HEIGHT);

        let style = toast.kind.style();
        let color = parse_color(style.color);
        let mut border = Style::default().fg(color).bg(bg_color);
        if toast.phase == ToastPhase::Leaving {
            border = border.add_modifier(Modifier::DIM);
        }
        let text = truncate(&toast.message, width.saturating_sub(6) as usize);
        let line = Line::from(vec![
            Span::styled(format!("{} ", style.glyph), Style::default().fg(color)),
            Span::raw(text),
        ]);

        f.render_widget(Clear, rect);
        f.render_widget(
            Paragraph::new(line).block(Block::default().borders(Borders::ALL).style(border)),
            rect,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hints_stop_with_ellipsis_when_out_of_room() {
        let hints = vec!["a: Add".to_string(), "d: Delete".to_string(), "q: Quit".to_string()];
        assert_eq!(fit_hints(&hints, 80), "a: Add • d: Delete • q: Quit");
        assert_eq!(fit_hints(&hints, 21), "a: Add • d: Delete...");
        assert_eq!(fit_hints(&hints, 20), "a: Add...");
        assert_eq!(fit_hints(&hints, 28), "a: Add • d: Delete • q: Quit");
        assert!(fit_hints(&hints, 20).chars().count() <= 20);
        assert_eq!(fit_hints(&hints, 4), "a...");
    }
}
