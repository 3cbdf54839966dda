use crate::tui::app::App;
use crate::tui::screens::{render_account, render_title, split_panels};
use crate::tui::theme::Theme;
use ratatui::prelude::*;
use ratatui::widgets::*;

pub fn render(frame: &mut Frame, theme: &Theme, app: &App, area: Rect) {
    let body = render_title(frame, theme, "Not Registered", area);
    let (left, right) = split_panels(body);
    render_account(frame, theme, app, left);

    let lines = vec![
        Line::from(Span::styled(
            "This address is not registered.",
            Style::default().fg(theme.warning).bold(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Ask your self-help group coordinator to register you,",
            theme.text_primary_style(),
        )),
        Line::from(Span::styled(
            "then press r to check again.",
            theme.text_primary_style(),
        )),
    ];
    let widget = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
        Block::default()
            .title(Span::styled(" Registration ", theme.primary_style()))
            .borders(Borders::ALL)
            .border_style(theme.text_dim_style()),
    );
    frame.render_widget(widget, right);
}
