use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::tui::theme::Theme;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PopupType {
    Error,
    Info,
}

pub struct Popup {
    pub popup_type: PopupType,
    pub title: String,
    pub content: String,
    pub details: Vec<String>, // Extra lines (tx hash, hints)
}

impl Popup {
    pub fn new(popup_type: PopupType, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            popup_type,
            title: title.into(),
            content: content.into(),
            details: Vec::new(),
        }
    }

    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = details;
        self
    }

    pub fn render(&self, frame: &mut Frame, theme: &Theme, area: Rect) {
        let border_color = match self.popup_type {
            PopupType::Error => theme.error,
            PopupType::Info => theme.primary,
        };

        let mut lines = vec![
            Line::from(""),
            Line::from(Span::styled(self.content.as_str(), theme.text_primary_style())),
            Line::from(""),
        ];
        for detail in &self.details {
            lines.push(Line::from(Span::styled(detail.as_str(), theme.text_dim_style())));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Press any key to dismiss",
            theme.text_dim_style(),
        )));

        let widget = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .title(Span::styled(self.title.as_str(), Style::default().fg(border_color).bold()))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(border_color)),
            );

        frame.render_widget(Clear, area);
        frame.render_widget(widget, area);
    }
}
