use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Tabs;

use crate::config::Theme;
use crate::tui::app::Tab;
use crate::tui::widgets::color::{get_contrast_text_color, parse_color};

/// Tab strip; the notifications tab carries the unread badge
pub fn render_tabs(f: &mut Frame, area: Rect, current: Tab, unread: usize, theme: &Theme) {
    let fg_color = parse_color(&theme.fg);
    let bg_color = parse_color(&theme.bg);
    let tab_bg = parse_color(&theme.tab_bg);
    let tab_fg = get_contrast_text_color(tab_bg);
    let highlight_bg = parse_color(&theme.highlight_bg);
    let highlight_fg = get_contrast_text_color(highlight_bg);

    let titles: Vec<Line> = Tab::ORDER
        .iter()
        .map(|tab| {
            let label = match tab {
                Tab::Notifications if unread > 0 => format!("{} ({})", tab.title(), unread),
                _ => tab.title().to_string(),
            };
            Line::from(vec![
                Span::styled(" ", Style::default().bg(tab_bg)),
                Span::styled(label, Style::default().fg(tab_fg).bg(tab_bg)),
                Span::styled(" ", Style::default().bg(tab_bg)),
            ])
        })
        .collect();

    let tabs = Tabs::new(titles)
        .select(current.index())
        .style(Style::default().fg(fg_color).bg(bg_color))
        .highlight_style(
            Style::default()
                .fg(highlight_fg)
                .bg(highlight_bg)
                .add_modifier(Modifier::BOLD),
        )
        .divider(" ")
        .padding("", "");

    f.render_widget(tabs, area);
}
