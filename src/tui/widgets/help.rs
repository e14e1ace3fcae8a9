use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::config::{KeyBindings, Theme};
use crate::tui::widgets::color::parse_color;
use crate::tui::widgets::popup_area;
use crate::utils::format_key_binding_for_display as display;

pub fn render_help(f: &mut Frame, area: Rect, key_bindings: &KeyBindings, theme: &Theme) {
    let fg_color = parse_color(&theme.fg);
    let bg_color = parse_color(&theme.bg);
    let popup = popup_area(area, 60, 70);
    f.render_widget(Clear, popup);

    let paragraph = Paragraph::new(build_help_text(key_bindings))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Help - Key Bindings")
                .title_alignment(Alignment::Center),
        )
        .style(Style::default().fg(fg_color).bg(bg_color))
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, popup);
}

fn build_help_text(kb: &KeyBindings) -> String {
    let mut text = String::new();
    text.push_str("Navigation:\n");
    text.push_str(&format!("  {} / {}: Switch view\n", display(&kb.filter_next), display(&kb.filter_prev)));
    text.push_str(&format!("  {} / {}: Move up/down\n", display(&kb.list_up), display(&kb.list_down)));
    text.push('\n');

    text.push_str("Tasks:\n");
    text.push_str(&format!("  {}: Add task\n", display(&kb.add)));
    text.push_str(&format!("  {}: Toggle completed\n", display(&kb.toggle)));
    text.push_str(&format!("  {}: Delete task\n", display(&kb.delete)));
    text.push('\n');

    text.push_str("General:\n");
    text.push_str(&format!("  {}: Mark all notifications read\n", display(&kb.mark_all_read)));
    text.push_str(&format!("  {}: Toggle dark mode\n", display(&kb.toggle_dark_mode)));
    text.push_str(&format!("  {}: Export backup\n", display(&kb.export)));
    text.push_str(&format!("  {}: Clear all data\n", display(&kb.clear_all)));
    text.push_str(&format!("  {}: Show/hide help\n", display(&kb.help)));
    text.push_str(&format!("  {}: Quit\n", display(&kb.quit)));
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn help_lists_configured_bindings() {
        let text = build_help_text(&KeyBindings::default());
        assert!(text.contains("a: Add task"));
        assert!(text.contains("Clear all data"));
    }
}
