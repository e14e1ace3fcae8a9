use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, Gauge, Paragraph};

use crate::config::Theme;
use crate::tui::widgets::color::parse_color;
use crate::view::Dashboard;

/// Progress gauge plus the remaining-task text
pub fn render_dashboard(f: &mut Frame, area: Rect, dashboard: &Dashboard, theme: &Theme) {
    let fg_color = parse_color(&theme.fg);
    let bg_color = parse_color(&theme.bg);
    let highlight_bg = parse_color(&theme.highlight_bg);

    let block = Block::default()
        .borders(Borders::ALL)
        .title("Today's progress")
        .style(Style::default().fg(fg_color).bg(bg_color));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let [gauge_area, text_area] = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(10), Constraint::Length(22)])
        .areas(inner);

    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(highlight_bg).bg(bg_color))
        .percent(dashboard.completion_percentage.min(100) as u16)
        .label(dashboard.percentage_text());
    f.render_widget(gauge, gauge_area);

    let text = Paragraph::new(format!(" {}", dashboard.remaining_text()))
        .style(Style::default().fg(fg_color).bg(bg_color));
    f.render_widget(text, text_area);
}
