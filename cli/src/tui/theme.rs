use ratatui::style::{Color, Style};

use crate::tui::input::InputMode;

/// MicroLend color palette
pub struct Theme {
    pub primary: Color,
    pub text_primary: Color,
    pub text_dim: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,
    pub mode_normal: Color,
    pub mode_insert: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary: Color::Rgb(56, 178, 172), // #38B2AC - teal
            text_primary: Color::Rgb(224, 224, 224),
            text_dim: Color::Rgb(128, 128, 128),
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
            info: Color::Blue,
            mode_normal: Color::Blue,
            mode_insert: Color::Green,
        }
    }
}

impl Theme {
    /// Titles and active elements
    pub fn primary_style(&self) -> Style {
        Style::default().fg(self.primary)
    }

    pub fn text_primary_style(&self) -> Style {
        Style::default().fg(self.text_primary)
    }

    pub fn text_dim_style(&self) -> Style {
        Style::default().fg(self.text_dim)
    }

    pub fn mode_style(&self, mode: InputMode) -> Style {
        let color = match mode {
            InputMode::Normal => self.mode_normal,
            InputMode::Insert => self.mode_insert,
        };
        Style::default().fg(color)
    }
}
