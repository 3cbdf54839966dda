use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::tui::app::App;
use crate::tui::input::InputMode;
use crate::tui::screens;
use crate::tui::theme::Theme;
use microlend::View;

/// Render the current application state
pub fn render(frame: &mut Frame, app: &App) {
    let theme = Theme::default();

    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(1),    // Content
            Constraint::Length(3), // Footer
        ])
        .split(frame.area());

    render_header(frame, &theme, app, main_layout[0]);

    match app.view() {
        View::Landing => screens::render_landing(frame, &theme, app, main_layout[1]),
        View::BorrowerDashboard => screens::render_borrower(frame, &theme, app, main_layout[1]),
        View::LenderDashboard => screens::render_lender(frame, &theme, app, main_layout[1]),
        View::AdminDashboard => screens::render_admin(frame, &theme, app, main_layout[1]),
        View::UnregisteredNotice => screens::render_unregistered(frame, &theme, app, main_layout[1]),
    }

    render_footer(frame, &theme, app, main_layout[2]);

    if app.spinner.spinning {
        app.spinner.render(frame, &theme, centered_rect(40, 3, frame.area()));
    }

    if let Some(popup) = &app.popup {
        popup.render(frame, &theme, centered_rect(60, 40, frame.area()));
    }
}

fn render_header(frame: &mut Frame, theme: &Theme, app: &App, area: Rect) {
    let status = if let Some((ref msg, is_error)) = app.status_message {
        let style = if is_error {
            Style::default().fg(theme.error)
        } else {
            Style::default().fg(theme.success)
        };
        Span::styled(format!(" │ {}", msg), style)
    } else {
        Span::raw("")
    };

    let title_line = Line::from(vec![
        Span::styled("MicroLend", theme.primary_style().bold()),
        status,
    ]);

    let header = Paragraph::new(title_line)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.primary_style()),
        );

    frame.render_widget(header, area);
}

fn render_footer(frame: &mut Frame, theme: &Theme, app: &App, area: Rect) {
    let mode_text = match app.input_mode {
        InputMode::Normal => "NORMAL",
        InputMode::Insert => "INSERT",
    };

    let help_text = match (app.view(), app.input_mode) {
        (_, InputMode::Insert) => "Tab/BackTab: Field | Enter: Submit | Esc: Done",
        (View::Landing, _) => "c: Connect Wallet | q: Quit",
        (View::UnregisteredNotice, _) => "r: Re-check | y: Copy Address | d: Disconnect | q: Quit",
        _ => "i: Edit | j/k: Field | s: Submit | x: Clear | r: Refresh | y: Copy | d: Disconnect | q: Quit",
    };

    let footer_line = Line::from(vec![
        Span::styled(format!(" {} ", mode_text), theme.mode_style(app.input_mode).bold()),
        Span::styled(" │ ", theme.text_dim_style()),
        Span::styled(app.view().title().to_uppercase(), theme.text_primary_style()),
        Span::styled(" │ ", theme.text_dim_style()),
        Span::styled(help_text, theme.text_dim_style()),
    ]);

    let footer = Paragraph::new(footer_line)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.primary_style()),
        );

    frame.render_widget(footer, area);
}

/// Rectangle of `percent_x` width centred in `area`, `height` rows tall
/// when `height` is small, otherwise treated as a percentage.
fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let vertical = if height <= 5 {
        Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(0),
                Constraint::Length(height),
                Constraint::Min(0),
            ])
            .split(area)
    } else {
        Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage((100 - height) / 2),
                Constraint::Percentage(height),
                Constraint::Percentage((100 - height) / 2),
            ])
            .split(area)
    };

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
