//! Help popup overlay listing every action and its key bindings.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Widget},
};

use crate::config::{Action, AppConfig};

/// Keyboard help overlay.
pub struct HelpPopup<'a> {
    pub config: &'a AppConfig,
}

impl HelpPopup<'_> {
    fn lines(&self, inner_width: u16) -> Vec<Line<'static>> {
        let dim = Style::default().fg(Color::DarkGray);
        let mut lines = vec![Line::raw("")];

        for &action in Action::ALL {
            // Fixed-width columns: label left-aligned, keys right-aligned.
            let label_col = format!("   {:<22}", action.label());
            let keys_width = (inner_width as usize)
                .saturating_sub(label_col.chars().count() + 2)
                .max(1);
            let keys = self.config.display_bindings(action);
            lines.push(Line::from(vec![
                Span::styled(label_col, Style::default().fg(Color::White)),
                Span::styled(format!("{keys:>keys_width$}"), Style::default().fg(Color::Yellow)),
            ]));
        }

        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled(
            "   1-9: sort by column   click header: sort",
            dim,
        )));
        lines.push(Line::from(Span::styled("   Any key: close", dim)));
        lines
    }
}

impl Widget for HelpPopup<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let height = (Action::ALL.len() as u16) + 6;
        let popup = centered_fixed(56, height, area);
        Clear.render(popup, buf);

        let block = Block::default()
            .title(" Keys ")
            .title_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::DarkGray));

        let inner = block.inner(popup);
        block.render(popup, buf);

        Paragraph::new(self.lines(inner.width)).render(inner, buf);
    }
}

/// Create a centered rectangle with fixed dimensions, clamped to the available area.
pub fn centered_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(w)) / 2;
    let y = area.y + (area.height.saturating_sub(h)) / 2;
    Rect::new(x, y, w, h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_rect_is_clamped() {
        assert_eq!(centered_fixed(20, 10, Rect::new(0, 0, 40, 20)), Rect::new(10, 5, 20, 10));
        assert_eq!(centered_fixed(60, 30, Rect::new(0, 0, 40, 20)), Rect::new(0, 0, 40, 20));
    }

    #[test]
    fn every_action_gets_a_line() {
        let config = AppConfig::default();
        let lines = HelpPopup { config: &config }.lines(54);
        let text: Vec<String> = lines.iter().map(ToString::to_string).collect();
        for action in Action::ALL {
            assert!(text.iter().any(|l| l.contains(action.label())), "{action:?}");
        }
        assert!(text.iter().any(|l| l.trim_end().ends_with("q/Esc")));
    }
}
