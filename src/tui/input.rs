use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Represents the result of handling a key event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    /// Quit the application
    Quit,
    /// Focus the next panel
    NextPanel,
    /// Focus the previous panel
    PreviousPanel,
    /// Select the next image in the focused panel
    Next,
    /// Select the previous image in the focused panel
    Previous,
    /// Open the selected image in the default viewer
    Open,
    /// Prompt for the focused panel's directory
    ChooseDirectory,
    /// Unset the focused panel's directory
    ClearDirectory,
    /// Enable or disable an optional panel
    ToggleEnabled,
    /// Show or hide the image list of the focused panel
    ToggleImages,
    /// Show or hide the preview pane
    TogglePreview,
    /// Show the frame selection summary
    Summary,
    /// Toggle help overlay
    Help,
    /// No action
    None,
}

/// Maps keyboard events to actions
pub fn handle_key_event(key: KeyEvent) -> KeyAction {
    match (key.code, key.modifiers) {
        // Quit: q or Ctrl+C
        (KeyCode::Char('q'), KeyModifiers::NONE) => KeyAction::Quit,
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => KeyAction::Quit,
        (KeyCode::Esc, KeyModifiers::NONE) => KeyAction::Quit,

        // Panels
        (KeyCode::Tab, KeyModifiers::NONE) => KeyAction::NextPanel,
        (KeyCode::Right, KeyModifiers::NONE) => KeyAction::NextPanel,
        (KeyCode::BackTab, _) => KeyAction::PreviousPanel,
        (KeyCode::Left, KeyModifiers::NONE) => KeyAction::PreviousPanel,

        // Rows
        (KeyCode::Down, KeyModifiers::NONE) => KeyAction::Next,
        (KeyCode::Char('j'), KeyModifiers::NONE) => KeyAction::Next,
        (KeyCode::Up, KeyModifiers::NONE) => KeyAction::Previous,
        (KeyCode::Char('k'), KeyModifiers::NONE) => KeyAction::Previous,

        (KeyCode::Enter, KeyModifiers::NONE) => KeyAction::Open,
        (KeyCode::Char('o'), KeyModifiers::NONE) => KeyAction::Open,

        (KeyCode::Char('d'), KeyModifiers::NONE) => KeyAction::ChooseDirectory,
        (KeyCode::Char('x'), KeyModifiers::NONE) => KeyAction::ClearDirectory,
        (KeyCode::Char(' '), KeyModifiers::NONE) => KeyAction::ToggleEnabled,
        (KeyCode::Char('e'), KeyModifiers::NONE) => KeyAction::ToggleEnabled,
        (KeyCode::Char('i'), KeyModifiers::NONE) => KeyAction::ToggleImages,
        (KeyCode::Char('p'), KeyModifiers::NONE) => KeyAction::TogglePreview,
        (KeyCode::Char('s'), KeyModifiers::NONE) => KeyAction::Summary,

        // Help: ?
        (KeyCode::Char('?'), KeyModifiers::NONE) => KeyAction::Help,
        (KeyCode::Char('?'), KeyModifiers::SHIFT) => KeyAction::Help,

        _ => KeyAction::None,
    }
}

/// Editing actions for the directory prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptAction {
    Insert(char),
    Backspace,
    Clear,
    Submit,
    Cancel,
    None,
}

/// Maps keyboard events while the directory prompt is open
pub fn handle_prompt_input(key: KeyEvent) -> PromptAction {
    match (key.code, key.modifiers) {
        (KeyCode::Enter, _) => PromptAction::Submit,
        (KeyCode::Esc, _) => PromptAction::Cancel,
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => PromptAction::Cancel,
        (KeyCode::Char('u'), KeyModifiers::CONTROL) => PromptAction::Clear,
        (KeyCode::Backspace, _) => PromptAction::Backspace,
        (KeyCode::Char(c), KeyModifiers::NONE) | (KeyCode::Char(c), KeyModifiers::SHIFT) => {
            PromptAction::Insert(c)
        }
        _ => PromptAction::None,
    }
}
