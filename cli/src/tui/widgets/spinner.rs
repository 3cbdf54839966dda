use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::tui::theme::Theme;

const FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub struct Spinner {
    pub message: String,
    pub frame: usize,
    pub spinning: bool,
}

impl Spinner {
    pub fn new(message: String) -> Self {
        Self {
            message,
            frame: 0,
            spinning: false,
        }
    }

    pub fn start(&mut self, message: impl Into<String>) {
        self.message = message.into();
        self.spinning = true;
    }

    pub fn stop(&mut self) {
        self.spinning = false;
        self.frame = 0;
    }

    pub fn tick(&mut self) {
        if self.spinning {
            self.frame = (self.frame + 1) % FRAMES.len();
        }
    }

    pub fn render(&self, frame: &mut Frame, theme: &Theme, area: Rect) {
        if !self.spinning {
            return;
        }

        let text = format!("{} {}", FRAMES[self.frame], self.message);
        let widget = Paragraph::new(text)
            .style(theme.text_primary_style())
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(theme.info)),
            );

        frame.render_widget(Clear, area);
        frame.render_widget(widget, area);
    }
}
