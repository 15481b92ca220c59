//! Colour palette and text styles used across the UI.

use ratatui::style::{Color, Modifier, Style};

use crate::core::display::BannerTone;
use crate::core::format::StatusBucket;

/// Central theme. Change colours here and they propagate everywhere.
pub struct Theme;

impl Theme {
    // ── table ──────────────────────────────────────────────────
    pub fn header_style() -> Style {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    }

    /// Header of the column the keyboard sort applies to.
    pub fn header_selected_style() -> Style {
        Self::header_style()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::UNDERLINED)
    }

    pub fn sort_indicator_style() -> Style {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    }

    pub fn cell_style() -> Style {
        Style::default().fg(Color::White)
    }

    pub fn placeholder_style() -> Style {
        Style::default().fg(Color::DarkGray)
    }

    pub fn status_style(bucket: StatusBucket) -> Style {
        match bucket {
            StatusBucket::Done => Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
            StatusBucket::NotDone => Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::BOLD),
            StatusBucket::Pending => Style::default().fg(Color::Yellow),
        }
    }

    pub fn banner_style(tone: BannerTone) -> Style {
        match tone {
            BannerTone::Muted => Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::ITALIC),
            BannerTone::Error => Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::BOLD),
        }
    }

    /// Every other body row.
    pub fn stripe_style() -> Style {
        Style::default().bg(Color::Rgb(24, 24, 32))
    }

    // ── chrome ─────────────────────────────────────────────────
    pub fn border_style() -> Style {
        Style::default().fg(Color::Gray)
    }

    pub fn title_style() -> Style {
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD)
    }

    pub fn status_bar_style() -> Style {
        Style::default().bg(Color::DarkGray).fg(Color::White)
    }

    pub fn filter_label_style() -> Style {
        Style::default().fg(Color::Gray)
    }

    pub fn filter_value_style(focused: bool) -> Style {
        let style = Style::default().fg(Color::Yellow);
        if focused {
            style.bg(Color::DarkGray).add_modifier(Modifier::BOLD)
        } else {
            style
        }
    }

    pub fn dim_style() -> Style {
        Style::default().fg(Color::DarkGray)
    }
}
