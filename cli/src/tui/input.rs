/// Input modes for the TUI
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    /// Typing into the active form field
    Insert,
}
