use crate::tui::app::App;
use crate::tui::input::InputMode;
use crate::tui::screens::{render_account, render_title, split_panels};
use crate::tui::theme::Theme;
use ratatui::prelude::*;

pub fn render(frame: &mut Frame, theme: &Theme, app: &App, area: Rect) {
    let body = render_title(frame, theme, "Lender Dashboard", area);
    let (left, right) = split_panels(body);
    render_account(frame, theme, app, left);
    app.form
        .render(frame, theme, right, "Create Lending Pool", app.input_mode == InputMode::Insert);
}
