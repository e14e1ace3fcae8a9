use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

use crate::config::Theme;
use crate::models::Notification;
use crate::tui::widgets::color::{get_contrast_text_color, parse_color};
use crate::tui::widgets::truncate;

/// History newest-first; unread entries are bold
pub fn render_notification_list(
    f: &mut Frame,
    area: Rect,
    history: &[Notification],
    list_state: &mut ListState,
    theme: &Theme,
) {
    let fg_color = parse_color(&theme.fg);
    let bg_color = parse_color(&theme.bg);
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Notifications")
        .style(Style::default().fg(fg_color).bg(bg_color));

    if history.is_empty() {
        let paragraph = Paragraph::new("No notifications.")
            .block(block)
            .alignment(Alignment::Center);
        f.render_widget(paragraph, area);
        return;
    }

    let max_width = area.width.saturating_sub(4) as usize;
    let items: Vec<ListItem> = history
        .iter()
        .map(|n| {
            let style = n.kind.style();
            let mut text_style = Style::default();
            if !n.read {
                text_style = text_style.add_modifier(Modifier::BOLD);
            }
            let timestamp = n.timestamp.get(..16).unwrap_or(&n.timestamp).replace('T', " ");
            let message = truncate(&n.message, max_width.saturating_sub(timestamp.len() + 4));
            ListItem::new(Line::from(vec![
                Span::styled(format!("{} ", style.glyph), Style::default().fg(parse_color(style.color))),
                Span::styled(message, text_style),
                Span::styled(format!("  {}", timestamp), Style::default().add_modifier(Modifier::DIM)),
            ]))
        })
        .collect();

    let highlight_bg = parse_color(&theme.highlight_bg);
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().fg(get_contrast_text_color(highlight_bg)).bg(highlight_bg));
    f.render_stateful_widget(list, area, list_state);
}
