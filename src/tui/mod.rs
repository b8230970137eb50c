// TUI module for rendering the terminal interface
pub mod colors;
pub mod helpers;
pub mod input;

// Re-exports
pub use colors::*;
pub use helpers::{expand_path, format_file_size, truncate_path};
pub use input::{handle_key_event, handle_prompt_input, KeyAction, PromptAction};

use crate::async_preview::{PreviewState, SyncPreviewManager};
use crate::domain::FileDescriptor;
use crate::panel::{FrameCategory, FrameSelection, PanelKind, SelectionPanel, StatusIcon, Workspace};
use crate::preview::{self, PreviewContent};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// UI view state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    /// Main panel view
    Browsing,
    /// Help overlay visible
    Help,
    /// Welcome screen shown on first launch
    Welcome,
    /// Directory prompt for the focused panel
    ChooseDirectory,
    /// Frame selection summary
    Summary,
}

/// Everything the renderer needs that is not owned by the workspace
#[derive(Debug, Clone)]
pub struct UiState {
    pub view: ViewState,
    focus: FrameCategory,
    selected: [usize; 4],
    /// Text typed into the directory prompt
    pub input: String,
    /// One-shot message shown in the footer
    pub message: Option<String>,
    pub show_preview: bool,
}

impl UiState {
    pub fn new(view: ViewState) -> Self {
        Self {
            view,
            focus: FrameCategory::Light,
            selected: [0; 4],
            input: String::new(),
            message: None,
            show_preview: true,
        }
    }

    pub fn focus(&self) -> FrameCategory {
        self.focus
    }

    pub fn set_focus(&mut self, category: FrameCategory) {
        self.focus = category;
    }

    pub fn next_panel(&mut self) {
        let next = (self.focus.index() + 1) % FrameCategory::ALL.len();
        self.focus = FrameCategory::ALL[next];
    }

    pub fn previous_panel(&mut self) {
        let len = FrameCategory::ALL.len();
        let previous = (self.focus.index() + len - 1) % len;
        self.focus = FrameCategory::ALL[previous];
    }

    pub fn selected_row(&self, category: FrameCategory) -> usize {
        self.selected[category.index()]
    }

    /// Moves the focused panel's selection down. Returns whether it moved.
    pub fn select_next(&mut self, workspace: &Workspace) -> bool {
        let len = workspace.panel(self.focus).images().len();
        let row = &mut self.selected[self.focus.index()];
        if *row + 1 < len {
            *row += 1;
            true
        } else {
            false
        }
    }

    /// Moves the focused panel's selection up. Returns whether it moved.
    pub fn select_previous(&mut self) -> bool {
        let row = &mut self.selected[self.focus.index()];
        if *row > 0 {
            *row -= 1;
            true
        } else {
            false
        }
    }

    /// Keeps every selection inside its panel after a relisting
    pub fn clamp(&mut self, workspace: &Workspace) {
        for category in FrameCategory::ALL {
            let len = workspace.panel(category).images().len();
            let row = &mut self.selected[category.index()];
            *row = (*row).min(len.saturating_sub(1));
        }
    }

    pub fn reset_selection(&mut self, category: FrameCategory) {
        self.selected[category.index()] = 0;
    }

    /// The highlighted image of the focused panel, if its rows are visible
    pub fn selected_image<'a>(&self, workspace: &'a Workspace) -> Option<&'a FileDescriptor> {
        let panel = workspace.panel(self.focus);
        if !panel.shows_images() {
            return None;
        }
        panel.images().get(self.selected_row(self.focus))
    }

    /// Opens the directory prompt pre-filled with the focused panel's path
    pub fn begin_prompt(&mut self, workspace: &Workspace) {
        self.input = workspace
            .panel(self.focus)
            .directory()
            .map(|dir| dir.display().to_string())
            .unwrap_or_default();
        self.view = ViewState::ChooseDirectory;
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }
}

impl Default for UiState {
    fn default() -> Self {
        Self::new(ViewState::Browsing)
    }
}

/// Renders the TUI, decoding the preview synchronously
#[cfg(test)]
pub fn render(frame: &mut Frame, workspace: &Workspace, ui: &UiState) {
    let (panels_area, preview_area, footer_area) = main_layout(frame, workspace, ui);

    render_panels(frame, panels_area, workspace, ui);
    if let Some(area) = preview_area {
        let lines = match ui.selected_image(workspace) {
            Some(descriptor) => match preview::generate_preview(descriptor) {
                Ok(content) => content_lines(&content),
                Err(e) => failure_lines(descriptor, &e.to_string()),
            },
            None => empty_preview_lines(workspace, ui),
        };
        render_preview_pane(frame, area, ui.selected_image(workspace), lines);
    }
    render_footer(frame, footer_area, ui);
    render_overlay(frame, workspace, ui);
}

/// Renders the TUI with async preview support
pub fn render_with_preview(
    frame: &mut Frame,
    workspace: &Workspace,
    ui: &UiState,
    preview_manager: &mut SyncPreviewManager,
) {
    let (panels_area, preview_area, footer_area) = main_layout(frame, workspace, ui);

    render_panels(frame, panels_area, workspace, ui);
    if let Some(area) = preview_area {
        let selected = ui.selected_image(workspace);
        let lines = match selected {
            Some(descriptor) => match preview_manager.request_preview(descriptor) {
                PreviewState::Loading => loading_lines(descriptor),
                PreviewState::Ready(content) => content_lines(content),
                PreviewState::Error(e) => failure_lines(descriptor, e),
            },
            None => empty_preview_lines(workspace, ui),
        };
        render_preview_pane(frame, area, selected, lines);
    }
    render_footer(frame, footer_area, ui);
    render_overlay(frame, workspace, ui);
}

/// Splits the screen into header, panel column, optional preview pane and footer
fn main_layout(
    frame: &mut Frame,
    workspace: &Workspace,
    ui: &UiState,
) -> (Rect, Option<Rect>, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Footer
        ])
        .split(frame.area());

    render_header(frame, chunks[0], &workspace.selection());

    if ui.show_preview {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(chunks[1]);
        (columns[0], Some(columns[1]), chunks[2])
    } else {
        (chunks[1], None, chunks[2])
    }
}

fn render_header(frame: &mut Frame, area: Rect, selection: &FrameSelection) {
    let mut spans = vec![Span::styled(
        " calframes ",
        Style::default()
            .fg(ACCENT_HIGHLIGHT)
            .add_modifier(Modifier::BOLD),
    )];

    for frames in &selection.frames {
        spans.push(Span::raw(" │ "));
        let label = frames.category.key();
        let value = if !frames.enabled {
            "off".to_string()
        } else if frames.directory.is_none() {
            "--".to_string()
        } else {
            frames.image_count.to_string()
        };
        spans.push(Span::styled(
            format!("{}: ", label),
            Style::default().fg(TEXT_SECONDARY),
        ));
        spans.push(Span::styled(value, Style::default().fg(TEXT_PRIMARY)));
    }

    spans.push(Span::raw(" │ "));
    if selection.is_ready() {
        spans.push(Span::styled(
            "Ready",
            Style::default()
                .fg(ACCENT_SECONDARY)
                .add_modifier(Modifier::BOLD),
        ));
    } else {
        spans.push(Span::styled("Incomplete", Style::default().fg(ACCENT_PRIMARY)));
    }

    let header = Paragraph::new(Line::from(spans))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(BORDER_COLOR)),
        )
        .alignment(Alignment::Left);

    frame.render_widget(header, area);
}

fn render_panels(frame: &mut Frame, area: Rect, workspace: &Workspace, ui: &UiState) {
    // Collapsed panels only need their two status lines
    let constraints: Vec<Constraint> = workspace
        .panels()
        .iter()
        .map(|panel| {
            if panel.shows_images() {
                Constraint::Min(5)
            } else {
                Constraint::Length(4)
            }
        })
        .collect();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (panel, chunk) in workspace.panels().iter().zip(chunks.iter()) {
        let category = panel.category();
        render_panel(
            frame,
            *chunk,
            panel,
            ui.focus() == category,
            ui.selected_row(category),
        );
    }
}

fn status_glyph(icon: StatusIcon) -> &'static str {
    match icon {
        StatusIcon::None => "  ",
        StatusIcon::MissingDirectory => "⚠ ",
        StatusIcon::Folder => "▣ ",
    }
}

fn render_panel(
    frame: &mut Frame,
    area: Rect,
    panel: &SelectionPanel,
    focused: bool,
    selected: usize,
) {
    let enabled = panel.is_enabled();
    let text_color = if enabled { TEXT_PRIMARY } else { TEXT_DISABLED };
    let border_color = if focused { ACCENT_HIGHLIGHT } else { BORDER_COLOR };

    let mut title = vec![Span::styled(
        format!(" {} ", panel.category().title()),
        Style::default().fg(text_color).add_modifier(Modifier::BOLD),
    )];
    if panel.kind() == PanelKind::Optional {
        let (mark, color) = if enabled {
            ("[on] ", ACCENT_SECONDARY)
        } else {
            ("[disabled] ", TEXT_DISABLED)
        };
        title.push(Span::styled(mark, Style::default().fg(color)));
    }

    let block = Block::default()
        .title(Line::from(title))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border_color));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let status = panel.status();
    let icon_color = match status.icon {
        StatusIcon::Folder => ACCENT_SECONDARY,
        StatusIcon::MissingDirectory => ACCENT_PRIMARY,
        StatusIcon::None => TEXT_SECONDARY,
    };
    let path_width = (inner.width as usize).saturating_sub(3);

    let mut lines = vec![
        Line::from(vec![
            Span::styled(status_glyph(status.icon), Style::default().fg(icon_color)),
            Span::styled(
                truncate_path(&status.primary, path_width),
                Style::default().fg(text_color),
            ),
        ]),
        Line::from(vec![
            Span::raw("  "),
            Span::styled(status.secondary.clone(), Style::default().fg(TEXT_SECONDARY)),
        ]),
    ];

    if panel.shows_images() {
        let visible = (inner.height as usize).saturating_sub(2);
        let offset = if selected >= visible {
            selected + 1 - visible
        } else {
            0
        };

        for (i, descriptor) in panel.images().iter().enumerate().skip(offset).take(visible) {
            let is_selected = focused && i == selected;
            let row_style = if is_selected {
                Style::default().fg(TEXT_PRIMARY).bg(BG_SELECTED)
            } else {
                Style::default().fg(text_color)
            };
            lines.push(Line::from(vec![
                Span::styled(if is_selected { "▶ " } else { "  " }, row_style),
                Span::styled(descriptor.name.clone(), row_style.add_modifier(Modifier::BOLD)),
                Span::styled("  ", row_style),
                Span::styled(descriptor.type_label.clone(), row_style.fg(TEXT_SECONDARY)),
                Span::styled("  ", row_style),
                Span::styled(format_file_size(descriptor.size), row_style.fg(TEXT_SECONDARY)),
            ]));
        }
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

fn content_lines(content: &PreviewContent) -> Vec<Line<'static>> {
    match content {
        PreviewContent::Text(text_lines) => {
            text_lines.iter().map(|s| Line::from(s.clone())).collect()
        }
        PreviewContent::Styled(styled_lines) => styled_lines.clone(),
    }
}

fn failure_lines(descriptor: &FileDescriptor, error: &str) -> Vec<Line<'static>> {
    preview::describe_failure(descriptor, error)
        .into_iter()
        .map(|line| {
            if line.starts_with('[') {
                Line::from(Span::styled(line, Style::default().fg(ACCENT_PRIMARY)))
            } else {
                Line::from(line)
            }
        })
        .collect()
}

fn loading_lines(descriptor: &FileDescriptor) -> Vec<Line<'static>> {
    // Simple spinner based on current time
    let spinners = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    let spinner = spinners[(now / 100) as usize % spinners.len()];

    vec![
        Line::from(""),
        Line::from(vec![
            Span::styled(format!("  {} ", spinner), Style::default().fg(ACCENT_HIGHLIGHT)),
            Span::styled("Loading preview", Style::default().fg(TEXT_PRIMARY)),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Name: ", Style::default().fg(TEXT_SECONDARY)),
            Span::styled(descriptor.name.clone(), Style::default().fg(TEXT_PRIMARY)),
        ]),
        Line::from(vec![
            Span::styled("  Size: ", Style::default().fg(TEXT_SECONDARY)),
            Span::styled(format_file_size(descriptor.size), Style::default().fg(TEXT_PRIMARY)),
        ]),
    ]
}

fn empty_preview_lines(workspace: &Workspace, ui: &UiState) -> Vec<Line<'static>> {
    let panel = workspace.panel(ui.focus());
    let hint = if panel.images().is_empty() {
        "No images to preview."
    } else if !panel.shows_images() {
        "Press 'i' to list the images of this panel."
    } else {
        "Select an image to preview it."
    };

    vec![
        Line::from(""),
        Line::from(Span::styled(
            "No Preview",
            Style::default()
                .fg(ACCENT_HIGHLIGHT)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(hint, Style::default().fg(TEXT_SECONDARY))),
    ]
}

fn render_preview_pane(
    frame: &mut Frame,
    area: Rect,
    selected: Option<&FileDescriptor>,
    lines: Vec<Line<'static>>,
) {
    let title = match selected {
        Some(descriptor) => format!(" {} ", descriptor.name),
        None => " Preview ".to_string(),
    };
    let alignment = if selected.is_some() {
        Alignment::Left
    } else {
        Alignment::Center
    };

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(BORDER_COLOR))
                .title(title),
        )
        .alignment(alignment)
        .style(Style::default().fg(TEXT_PRIMARY))
        .wrap(Wrap { trim: false });

    frame.render_widget(paragraph, area);
}

fn render_footer(frame: &mut Frame, area: Rect, ui: &UiState) {
    let content = match &ui.message {
        Some(message) => Line::from(Span::styled(
            message.clone(),
            Style::default().fg(ACCENT_PRIMARY),
        )),
        None => {
            let key = Style::default()
                .fg(ACCENT_HIGHLIGHT)
                .add_modifier(Modifier::BOLD);
            let label = Style::default().fg(TEXT_SECONDARY);
            let bindings = [
                ("Tab ", "Panel"),
                ("↑↓ ", "Select"),
                ("d ", "Directory"),
                ("x ", "Clear"),
                ("Space ", "Enable"),
                ("i ", "Images"),
                ("o ", "Open"),
                ("s ", "Summary"),
                ("? ", "Help"),
                ("q ", "Quit"),
            ];

            let mut spans = Vec::with_capacity(bindings.len() * 3);
            for (i, (k, l)) in bindings.iter().enumerate() {
                if i > 0 {
                    spans.push(Span::raw(" │ "));
                }
                spans.push(Span::styled(*k, key));
                spans.push(Span::styled(*l, label));
            }
            Line::from(spans)
        }
    };

    let footer = Paragraph::new(content)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(BORDER_COLOR)),
        )
        .alignment(Alignment::Center);

    frame.render_widget(footer, area);
}

/// Draws whichever overlay the current view asks for
pub fn render_overlay(frame: &mut Frame, workspace: &Workspace, ui: &UiState) {
    match ui.view {
        ViewState::Browsing => {}
        ViewState::Help => render_help_overlay(frame),
        ViewState::Welcome => render_welcome_overlay(frame),
        ViewState::ChooseDirectory => render_prompt_overlay(frame, ui.focus(), &ui.input),
        ViewState::Summary => render_summary(frame, &workspace.selection()),
    }
}

fn overlay_block(title: &str, color: ratatui::style::Color) -> Block<'_> {
    Block::default()
        .title(title)
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
        .style(Style::default().bg(BG_DARK))
}

/// Renders the help overlay
pub fn render_help_overlay(frame: &mut Frame) {
    let help_area = centered_rect(50, 70, frame.area());
    frame.render_widget(Clear, help_area);

    let block = overlay_block(" Help ", ACCENT_HIGHLIGHT);
    let inner = block.inner(help_area);
    frame.render_widget(block, help_area);

    let entry = |keys: &'static str, what: &'static str| {
        Line::from(vec![
            Span::styled(format!("{:<12}", keys), Style::default().fg(ACCENT_SECONDARY)),
            Span::raw(what),
        ])
    };

    let help_lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Keyboard Shortcuts",
            Style::default()
                .fg(ACCENT_HIGHLIGHT)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        entry("Tab / →", "Next panel"),
        entry("S-Tab / ←", "Previous panel"),
        entry("↑↓ / k j", "Select image"),
        Line::from(""),
        entry("d", "Choose directory"),
        entry("x", "Clear directory"),
        entry("Space / e", "Enable or disable panel"),
        entry("i", "Show or hide images"),
        entry("p", "Show or hide preview"),
        entry("o / Enter", "Open in default viewer"),
        entry("s", "Frame selection summary"),
        Line::from(""),
        entry("q / Esc", "Quit"),
        entry("?", "Toggle help"),
        Line::from(""),
        Line::from(Span::styled(
            "Press ? or Esc to close",
            Style::default().fg(TEXT_SECONDARY),
        )),
    ];

    let paragraph = Paragraph::new(help_lines)
        .alignment(Alignment::Center)
        .style(Style::default().fg(TEXT_PRIMARY));

    frame.render_widget(paragraph, inner);
}

/// Renders the welcome dialog overlay
pub fn render_welcome_overlay(frame: &mut Frame) {
    let area = centered_rect(80, 80, frame.area());
    frame.render_widget(Clear, area);

    let heading = Style::default()
        .fg(ACCENT_HIGHLIGHT)
        .add_modifier(Modifier::BOLD);
    let bullet = Style::default().fg(ACCENT_SECONDARY);

    let welcome_lines = vec![
        Line::from(""),
        Line::from(Span::styled("Welcome to calframes!", heading)),
        Line::from(""),
        Line::from("Pick the directories holding the frames of your imaging session."),
        Line::from("Each panel keeps watching its directory and lists the images it finds."),
        Line::from(""),
        Line::from(Span::styled("Frame sets:", heading)),
        Line::from(""),
        Line::from(vec![
            Span::styled("  •  ", bullet),
            Span::styled("Light", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" frames are the exposures of your target (always enabled)"),
        ]),
        Line::from(vec![
            Span::styled("  •  ", bullet),
            Span::styled("Dark", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" frames capture sensor noise with the cap on"),
        ]),
        Line::from(vec![
            Span::styled("  •  ", bullet),
            Span::styled("Flat", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" frames capture vignetting and dust"),
        ]),
        Line::from(vec![
            Span::styled("  •  ", bullet),
            Span::styled("Bias/Offset", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" frames capture the read-out signal"),
        ]),
        Line::from(""),
        Line::from(Span::styled("Getting started:", heading)),
        Line::from(""),
        Line::from(vec![
            Span::styled("  1. ", Style::default().fg(TEXT_SECONDARY)),
            Span::raw("Press "),
            Span::styled("d", bullet),
            Span::raw(" to choose the directory of the focused panel"),
        ]),
        Line::from(vec![
            Span::styled("  2. ", Style::default().fg(TEXT_SECONDARY)),
            Span::raw("Press "),
            Span::styled("Space", bullet),
            Span::raw(" to enable the calibration sets you have"),
        ]),
        Line::from(vec![
            Span::styled("  3. ", Style::default().fg(TEXT_SECONDARY)),
            Span::raw("Press "),
            Span::styled("s", bullet),
            Span::raw(" to review the selection"),
        ]),
        Line::from(""),
        Line::from("Directories are remembered between sessions. Press ? at any time for help."),
        Line::from(""),
        Line::from(Span::styled("Press any key to start...", heading)),
    ];

    let welcome_text = Paragraph::new(welcome_lines)
        .block(overlay_block(" Welcome to calframes ", ACCENT_HIGHLIGHT))
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: false });

    frame.render_widget(welcome_text, area);
}

/// Renders the directory prompt for `category`
pub fn render_prompt_overlay(frame: &mut Frame, category: FrameCategory, input: &str) {
    let area = centered_rect(70, 30, frame.area());
    frame.render_widget(Clear, area);

    let title = format!(" Directory for {} ", category.title());
    let block = overlay_block(&title, ACCENT_HIGHLIGHT);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Enter a directory path:",
            Style::default().fg(TEXT_SECONDARY),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("> ", Style::default().fg(ACCENT_HIGHLIGHT)),
            Span::styled(input.to_string(), Style::default().fg(TEXT_PRIMARY)),
            Span::styled("█", Style::default().fg(ACCENT_HIGHLIGHT)),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("[Enter]", Style::default().fg(ACCENT_SECONDARY)),
            Span::raw(" confirm  "),
            Span::styled("[Esc]", Style::default().fg(ACCENT_PRIMARY)),
            Span::raw(" cancel  "),
            Span::styled("[Ctrl+U]", Style::default().fg(TEXT_SECONDARY)),
            Span::raw(" clear"),
        ]),
        Line::from(Span::styled(
            "~ expands to your home directory; an empty path unsets it.",
            Style::default().fg(TEXT_SECONDARY),
        )),
    ];

    let paragraph = Paragraph::new(lines)
        .style(Style::default().fg(TEXT_PRIMARY))
        .wrap(Wrap { trim: false });

    frame.render_widget(paragraph, inner);
}

/// Renders the frame selection summary
pub fn render_summary(frame: &mut Frame, selection: &FrameSelection) {
    let summary_area = centered_rect(70, 60, frame.area());
    frame.render_widget(Clear, summary_area);

    let block = overlay_block(" Frame Selection ", ACCENT_HIGHLIGHT);
    let inner = block.inner(summary_area);
    frame.render_widget(block, summary_area);

    let mut lines = vec![Line::from("")];

    for frames in &selection.frames {
        let (mark, color) = if !frames.enabled {
            ("○ ", TEXT_DISABLED)
        } else if frames.directory.is_some() && frames.image_count > 0 {
            ("✓ ", ACCENT_SECONDARY)
        } else {
            ("✗ ", ACCENT_PRIMARY)
        };

        lines.push(Line::from(vec![
            Span::styled(format!("  {}", mark), Style::default().fg(color)),
            Span::styled(
                format!("{:<20}", frames.title),
                Style::default()
                    .fg(TEXT_PRIMARY)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                if frames.enabled {
                    frames.status.clone()
                } else {
                    "Disabled".to_string()
                },
                Style::default().fg(color),
            ),
        ]));

        if frames.enabled {
            let directory = frames
                .directory
                .as_ref()
                .map(|d| d.display().to_string())
                .unwrap_or_else(|| "--".to_string());
            lines.push(Line::from(Span::styled(
                format!("      {}", directory),
                Style::default().fg(TEXT_SECONDARY),
            )));
        }
    }

    lines.push(Line::from(""));
    lines.push(if selection.is_ready() {
        Line::from(Span::styled(
            "  Ready to stack",
            Style::default()
                .fg(ACCENT_SECONDARY)
                .add_modifier(Modifier::BOLD),
        ))
    } else {
        Line::from(Span::styled(
            "  Some enabled frame sets have no images",
            Style::default()
                .fg(ACCENT_PRIMARY)
                .add_modifier(Modifier::BOLD),
        ))
    });
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  Press any key to return",
        Style::default().fg(TEXT_SECONDARY),
    )));

    let paragraph = Paragraph::new(lines).style(Style::default().fg(TEXT_PRIMARY));
    frame.render_widget(paragraph, inner);
}

/// Helper to create a centered rect
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Preferences;
    use ratatui::{backend::TestBackend, Terminal};
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    fn workspace(temp_dir: &TempDir) -> Workspace {
        let prefs = Preferences::load_from(&temp_dir.path().join("prefs.json")).unwrap();
        let mut ws = Workspace::new(prefs, Duration::from_secs(1));
        ws.refresh_all();
        ws
    }

    fn workspace_with_lights(temp_dir: &TempDir, names: &[&str]) -> Workspace {
        let lights = temp_dir.path().join("lights");
        fs::create_dir(&lights).unwrap();
        for name in names {
            fs::write(lights.join(name), b"not really an image").unwrap();
        }
        let mut ws = workspace(temp_dir);
        ws.set_directory(FrameCategory::Light, lights);
        ws
    }

    fn draw(ws: &Workspace, ui: &UiState, width: u16, height: u16) -> String {
        let backend = TestBackend::new(width, height);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| render(frame, ws, ui)).unwrap();

        let buffer = terminal.backend().buffer().clone();
        buffer.content().iter().map(|c| c.symbol()).collect()
    }

    mod ui_state_tests {
        use super::*;

        #[test]
        fn test_panel_focus_wraps() {
            let mut ui = UiState::default();
            assert_eq!(ui.focus(), FrameCategory::Light);

            ui.previous_panel();
            assert_eq!(ui.focus(), FrameCategory::Bias);

            ui.next_panel();
            ui.next_panel();
            assert_eq!(ui.focus(), FrameCategory::Dark);
        }

        #[test]
        fn test_selection_stays_in_bounds() {
            let temp_dir = TempDir::new().unwrap();
            let mut ws = workspace_with_lights(&temp_dir, &["a.png", "b.png"]);
            ws.toggle_images(FrameCategory::Light);
            let mut ui = UiState::default();

            assert!(!ui.select_previous());
            assert!(ui.select_next(&ws));
            assert!(!ui.select_next(&ws));
            assert_eq!(ui.selected_row(FrameCategory::Light), 1);
            assert_eq!(ui.selected_image(&ws).unwrap().name, "b.png");
        }

        #[test]
        fn test_selected_image_requires_visible_rows() {
            let temp_dir = TempDir::new().unwrap();
            let ws = workspace_with_lights(&temp_dir, &["a.png"]);
            let ui = UiState::default();

            assert!(ui.selected_image(&ws).is_none());
        }

        #[test]
        fn test_clamp_after_relisting() {
            let temp_dir = TempDir::new().unwrap();
            let mut ws = workspace_with_lights(&temp_dir, &["a.png", "b.png", "c.png"]);
            let mut ui = UiState::default();
            ui.select_next(&ws);
            ui.select_next(&ws);
            assert_eq!(ui.selected_row(FrameCategory::Light), 2);

            fs::remove_file(temp_dir.path().join("lights").join("c.png")).unwrap();
            ws.refresh_all();
            ui.clamp(&ws);
            assert_eq!(ui.selected_row(FrameCategory::Light), 1);

            ws.clear_directory(FrameCategory::Light);
            ui.clamp(&ws);
            assert_eq!(ui.selected_row(FrameCategory::Light), 0);
        }

        #[test]
        fn test_begin_prompt_prefills_directory() {
            let temp_dir = TempDir::new().unwrap();
            let ws = workspace_with_lights(&temp_dir, &[]);
            let mut ui = UiState::default();

            ui.begin_prompt(&ws);
            assert_eq!(ui.view, ViewState::ChooseDirectory);
            assert!(ui.input.ends_with("lights"));

            ui.set_focus(FrameCategory::Flat);
            ui.begin_prompt(&ws);
            assert!(ui.input.is_empty());
        }
    }

    mod layout_tests {
        use super::*;

        #[test]
        fn test_render_all_panels() {
            let temp_dir = TempDir::new().unwrap();
            let ws = workspace(&temp_dir);
            let content = draw(&ws, &UiState::default(), 120, 30);

            assert!(content.contains("Light Frames"));
            assert!(content.contains("Dark Frames"));
            assert!(content.contains("Flat Frames"));
            assert!(content.contains("Bias/Offset Frames"));
            assert!(content.contains("No directory is set"));
            assert!(content.contains("[disabled]"));
        }

        #[test]
        fn test_render_missing_directory() {
            let temp_dir = TempDir::new().unwrap();
            let mut ws = workspace(&temp_dir);
            ws.set_directory(FrameCategory::Dark, temp_dir.path().join("nope"));

            let content = draw(&ws, &UiState::default(), 120, 30);
            assert!(content.contains("The directory does not exist"));
        }

        #[test]
        fn test_render_image_rows() {
            let temp_dir = TempDir::new().unwrap();
            let mut ws = workspace_with_lights(&temp_dir, &["m31_001.png", "m31_002.fits"]);
            ws.toggle_images(FrameCategory::Light);

            let content = draw(&ws, &UiState::default(), 140, 40);
            assert!(content.contains("2 images"));
            assert!(content.contains("m31_001.png"));
            assert!(content.contains("m31_002.fits"));
            assert!(content.contains("FITS image"));
        }

        #[test]
        fn test_render_preview_failure_for_unsupported() {
            let temp_dir = TempDir::new().unwrap();
            let mut ws = workspace_with_lights(&temp_dir, &["m42.cr2"]);
            ws.toggle_images(FrameCategory::Light);

            let content = draw(&ws, &UiState::default(), 140, 40);
            assert!(content.contains("Canon raw image"));
            assert!(content.contains("Press 'o'"));
        }

        #[test]
        fn test_render_footer_and_message() {
            let temp_dir = TempDir::new().unwrap();
            let ws = workspace(&temp_dir);
            let mut ui = UiState::default();

            let content = draw(&ws, &ui, 140, 30);
            assert!(content.contains("Directory"));
            assert!(content.contains("Quit"));

            ui.set_message("Failed to open m31.png");
            let content = draw(&ws, &ui, 140, 30);
            assert!(content.contains("Failed to open m31.png"));
        }

        #[test]
        fn test_render_without_preview_pane() {
            let temp_dir = TempDir::new().unwrap();
            let ws = workspace(&temp_dir);
            let mut ui = UiState::default();
            ui.show_preview = false;

            let content = draw(&ws, &ui, 120, 30);
            assert!(!content.contains("No Preview"));
        }

        #[test]
        fn test_render_help_overlay() {
            let temp_dir = TempDir::new().unwrap();
            let ws = workspace(&temp_dir);
            let content = draw(&ws, &UiState::new(ViewState::Help), 100, 40);

            assert!(content.contains("Help"));
            assert!(content.contains("Choose directory"));
        }

        #[test]
        fn test_render_welcome_overlay() {
            let temp_dir = TempDir::new().unwrap();
            let ws = workspace(&temp_dir);
            let content = draw(&ws, &UiState::new(ViewState::Welcome), 120, 40);

            assert!(content.contains("Welcome to calframes"));
        }

        #[test]
        fn test_render_prompt_overlay() {
            let temp_dir = TempDir::new().unwrap();
            let ws = workspace(&temp_dir);
            let mut ui = UiState::new(ViewState::ChooseDirectory);
            ui.set_focus(FrameCategory::Flat);
            ui.input = "~/astro/flats".to_string();

            let content = draw(&ws, &ui, 120, 40);
            assert!(content.contains("Directory for Flat Frames"));
            assert!(content.contains("~/astro/flats"));
        }

        #[test]
        fn test_render_summary() {
            let temp_dir = TempDir::new().unwrap();
            let ws = workspace_with_lights(&temp_dir, &["a.png"]);
            let content = draw(&ws, &UiState::new(ViewState::Summary), 120, 40);

            assert!(content.contains("Frame Selection"));
            assert!(content.contains("Ready to stack"));
            assert!(content.contains("Disabled"));
        }

        #[test]
        fn test_render_with_preview_manager() {
            let temp_dir = TempDir::new().unwrap();
            let mut ws = workspace_with_lights(&temp_dir, &["m31.png"]);
            ws.toggle_images(FrameCategory::Light);
            let ui = UiState::default();
            let mut manager = SyncPreviewManager::new().unwrap();

            let backend = TestBackend::new(140, 40);
            let mut terminal = Terminal::new(backend).unwrap();
            terminal
                .draw(|frame| render_with_preview(frame, &ws, &ui, &mut manager))
                .unwrap();

            let buffer = terminal.backend().buffer().clone();
            let content: String = buffer.content().iter().map(|c| c.symbol()).collect();
            assert!(content.contains("m31.png"));
            assert_eq!(
                manager.current_path(),
                Some(temp_dir.path().join("lights").join("m31.png").as_path())
            );
        }
    }
}
