use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};

use crate::config::Theme;
use crate::tui::app::ListDensity;
use crate::tui::widgets::color::{get_contrast_text_color, parse_color};
use crate::tui::widgets::truncate;
use crate::view::{ListView, TaskRow};

pub fn render_task_list(
    f: &mut Frame,
    area: Rect,
    title: &str,
    view: &ListView,
    list_state: &mut ListState,
    density: ListDensity,
    theme: &Theme,
) {
    let fg_color = parse_color(&theme.fg);
    let bg_color = parse_color(&theme.bg);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title.to_string())
        .style(Style::default().fg(fg_color).bg(bg_color));

    if let Some(message) = view.empty_message {
        let paragraph = Paragraph::new(message)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
        return;
    }

    let max_width = area.width.saturating_sub(4) as usize;
    let items: Vec<ListItem> = view
        .rows
        .iter()
        .map(|row| row_item(row, density, max_width))
        .collect();

    let highlight_bg = parse_color(&theme.highlight_bg);
    let highlight_fg = if theme.highlight_fg.is_empty() {
        get_contrast_text_color(highlight_bg)
    } else {
        parse_color(&theme.highlight_fg)
    };

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().fg(highlight_fg).bg(highlight_bg));

    f.render_stateful_widget(list, area, list_state);
}

fn row_item(row: &TaskRow, density: ListDensity, max_width: usize) -> ListItem<'static> {
    let check = if row.checked { "[x]" } else { "[ ]" };
    let mut title_style = Style::default();
    if row.checked {
        title_style = title_style.add_modifier(Modifier::CROSSED_OUT);
    }
    let title = truncate(&row.title, max_width.saturating_sub(4));
    let first = Line::from(vec![Span::raw(format!("{} ", check)), Span::styled(title, title_style)]);

    match density {
        ListDensity::Compact => ListItem::new(first),
        ListDensity::Normal => {
            let detail = truncate(&format!("    {}", row.detail), max_width);
            ListItem::new(vec![first, Line::from(Span::styled(detail, Style::default().add_modifier(Modifier::DIM)))])
        }
        ListDensity::Spacious => {
            let detail = truncate(&format!("    {}", row.detail), max_width);
            ListItem::new(vec![
                first,
                Line::from(Span::styled(detail, Style::default().add_modifier(Modifier::DIM))),
                Line::from(""),
            ])
        }
    }
}
