use ratatui::layout::{Constraint, Direction, Layout as RatLayout, Rect};

pub struct Layout {
    /// Area inside the outer border
    pub inner_area: Rect,
    pub tabs_area: Rect,
    pub dashboard_area: Rect,
    pub main_area: Rect,
    pub status_area: Rect,
}

impl Layout {
    /// Height: tabs (1) + dashboard (3) + at least two list rows with borders (4) + status (1)
    pub const MIN_WIDTH: u16 = 40;
    pub const MIN_HEIGHT: u16 = 9;

    pub fn calculate(size: Rect) -> Self {
        let width = size.width.max(Self::MIN_WIDTH + 2);
        let height = size.height.max(Self::MIN_HEIGHT + 2);
        let size = Rect::new(size.x, size.y, width, height);

        let inner_area = Rect::new(
            size.x + 1,
            size.y + 1,
            size.width.saturating_sub(2),
            size.height.saturating_sub(2),
        );

        let [tabs_area, dashboard_area, main_area, status_area] = RatLayout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Min(1),
                Constraint::Length(1),
            ])
            .areas(inner_area);

        Self {
            inner_area,
            tabs_area,
            dashboard_area,
            main_area,
            status_area,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn areas_stack_inside_the_border() {
        let layout = Layout::calculate(Rect::new(0, 0, 80, 24));
        assert_eq!(layout.inner_area, Rect::new(1, 1, 78, 22));
        assert_eq!(layout.tabs_area.height, 1);
        assert_eq!(layout.dashboard_area.y, 2);
        assert_eq!(layout.main_area.height, 22 - 1 - 3 - 1);
        assert_eq!(layout.status_area.y, 22);
    }

    #[test]
    fn tiny_terminals_are_clamped_to_minimum() {
        let layout = Layout::calculate(Rect::new(0, 0, 10, 5));
        assert_eq!(layout.inner_area.width, Layout::MIN_WIDTH);
        assert_eq!(layout.inner_area.height, Layout::MIN_HEIGHT);
    }
}
