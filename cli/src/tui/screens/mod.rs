use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::tui::app::App;
use crate::tui::theme::Theme;

mod admin;
mod borrower;
mod landing;
mod lender;
mod unregistered;

pub fn render_landing(frame: &mut Frame, theme: &Theme, app: &App, area: Rect) {
    landing::render(frame, theme, app, area);
}

pub fn render_borrower(frame: &mut Frame, theme: &Theme, app: &App, area: Rect) {
    borrower::render(frame, theme, app, area);
}

pub fn render_lender(frame: &mut Frame, theme: &Theme, app: &App, area: Rect) {
    lender::render(frame, theme, app, area);
}

pub fn render_admin(frame: &mut Frame, theme: &Theme, app: &App, area: Rect) {
    admin::render(frame, theme, app, area);
}

pub fn render_unregistered(frame: &mut Frame, theme: &Theme, app: &App, area: Rect) {
    unregistered::render(frame, theme, app, area);
}

/// Title bar shared by the dashboards. Returns the area below it.
fn render_title(frame: &mut Frame, theme: &Theme, title: &str, area: Rect) -> Rect {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(area);

    let widget = Paragraph::new(title)
        .style(theme.primary_style().bold())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.primary_style()),
        );
    frame.render_widget(widget, layout[0]);
    layout[1]
}

/// Left account panel and right action panel.
fn split_panels(area: Rect) -> (Rect, Rect) {
    let layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);
    (layout[0], layout[1])
}

/// Connected address, role and profile.
fn render_account(frame: &mut Frame, theme: &Theme, app: &App, area: Rect) {
    let address = app.session.address.as_deref().unwrap_or("-");
    let mut lines = vec![
        Line::from(Span::styled("Address", theme.text_primary_style().bold())),
        Line::from(Span::styled(format!("  {}", address), theme.text_primary_style())),
        Line::from(""),
    ];

    if let Some(resolution) = &app.session.resolution {
        lines.push(Line::from(vec![
            Span::styled("Role  ", theme.text_primary_style().bold()),
            Span::styled(resolution.role.to_string(), theme.primary_style()),
        ]));

        if let Some(profile) = resolution.profile.as_ref().filter(|p| p.is_registered()) {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled("Profile", theme.text_primary_style().bold())));
            lines.push(Line::from(Span::styled(
                format!("  Name:          {}", profile.name),
                theme.text_primary_style(),
            )));
            lines.push(Line::from(Span::styled(
                format!("  Credit score:  {}", profile.credit_score),
                theme.text_primary_style(),
            )));
            lines.push(Line::from(Span::styled(
                format!(
                    "  SHG member:    {}",
                    if profile.is_shg_member { "yes" } else { "no" }
                ),
                theme.text_primary_style(),
            )));
        }

        if let Some(reason) = &resolution.degraded {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                format!("Role lookup degraded: {}", reason),
                Style::default().fg(theme.warning),
            )));
        }
    }

    let panel = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .title(Span::styled(" Account ", theme.primary_style()))
            .borders(Borders::ALL)
            .border_style(theme.text_dim_style()),
    );
    frame.render_widget(panel, area);
}
