use crate::tui::app::App;
use crate::tui::theme::Theme;
use microlend::ConnectAffordance;
use ratatui::prelude::*;
use ratatui::widgets::*;

pub fn render(frame: &mut Frame, theme: &Theme, app: &App, area: Rect) {
    let (label, style) = match app.connect_affordance() {
        ConnectAffordance::Enabled => ("[ c ]  Connect Wallet", theme.primary_style().bold()),
        ConnectAffordance::Pending => ("Connecting...", Style::default().fg(theme.info)),
        ConnectAffordance::Unavailable => (
            "No wallet provider configured",
            Style::default().fg(theme.warning),
        ),
    };

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("MicroLend", theme.primary_style().bold())),
        Line::from(""),
        Line::from(Span::styled(
            "Small loans for self-help group members, funded by community lenders.",
            theme.text_primary_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Connect a wallet to see your dashboard.",
            theme.text_dim_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(label, style)),
    ];

    let widget = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.primary_style()),
        );
    frame.render_widget(widget, area);
}
