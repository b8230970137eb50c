use calframes::async_preview::SyncPreviewManager;
use calframes::cli::{AppConfig, Args, INTERVAL_RANGE_MS};
use calframes::config::Preferences;
use calframes::logging;
use calframes::panel::{FrameSelection, PanelKind, Workspace};
use calframes::tui::{
    expand_path, handle_key_event, handle_prompt_input, render_with_preview, KeyAction,
    PromptAction, UiState, ViewState,
};
use calframes::{open_file, FrameCategory};

use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{
    io,
    time::{Duration, Instant},
};

fn main() -> io::Result<()> {
    // Parse command line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Convert to config
    let config: AppConfig = args.into();

    init_logging(&config);
    log::info!("calframes {} starting", env!("CARGO_PKG_VERSION"));

    let mut workspace = build_workspace(&config);

    if config.list {
        return print_selection(&mut workspace, config.json);
    }

    run_app_with_config(&config, &mut workspace)
}

fn init_logging(config: &AppConfig) {
    let path = match config.log_file.clone().or_else(logging::default_log_path) {
        Some(path) => path,
        None => return,
    };

    if let Err(e) = logging::init(&path, config.log_level) {
        eprintln!("Warning: Failed to open log file {}: {}", path.display(), e);
    }
}

/// Loads preferences, applies command line overrides and builds the panels
fn build_workspace(config: &AppConfig) -> Workspace {
    let loaded = match &config.config_path {
        Some(path) => Preferences::load_from(path),
        None => Preferences::load(),
    };

    let preferences = loaded.unwrap_or_else(|e| {
        eprintln!("Warning: Failed to load preferences: {}", e);
        log::warn!("failed to load preferences: {}", e);
        let path = config.config_path.clone().or_else(Preferences::default_path);
        match path {
            Some(path) => Preferences::recover(&path),
            None => Preferences::default(),
        }
    });

    let interval = config.refresh_interval.unwrap_or_else(|| {
        let ms = preferences
            .refresh_interval_ms
            .clamp(*INTERVAL_RANGE_MS.start(), *INTERVAL_RANGE_MS.end());
        Duration::from_millis(ms)
    });

    let mut workspace = Workspace::new(preferences, interval);
    for (category, directory) in &config.directories {
        workspace.set_directory(*category, directory.clone());
    }
    workspace
}

/// Non-interactive mode: one listing pass, then print every frame set
fn print_selection(workspace: &mut Workspace, json: bool) -> io::Result<()> {
    workspace.refresh_all();
    let selection = workspace.selection();

    if json {
        let out = serde_json::to_string_pretty(&selection)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        println!("{}", out);
        return Ok(());
    }

    for panel in workspace.panels() {
        let state = if panel.is_enabled() { "" } else { " (disabled)" };
        println!("{}{}", panel.category().title(), state);
        println!("  {}", panel.status().primary);
        println!("  {}", panel.status().secondary);
    }
    println!();
    println!("{}", readiness(&selection));

    Ok(())
}

fn readiness(selection: &FrameSelection) -> &'static str {
    if selection.is_ready() {
        "Ready to stack"
    } else {
        "Some enabled frame sets have no images"
    }
}

/// Runs the TUI application with configuration
pub fn run_app_with_config(config: &AppConfig, workspace: &mut Workspace) -> io::Result<()> {
    let mut preview_manager = SyncPreviewManager::new()?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let result = run_loop(&mut terminal, workspace, &mut preview_manager, config);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        log::error!("terminal error: {}", e);
    }
    log::info!("calframes exiting");

    result
}

/// Main application loop
fn run_loop<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    workspace: &mut Workspace,
    preview_manager: &mut SyncPreviewManager,
    config: &AppConfig,
) -> io::Result<()> {
    // Show welcome on first launch or if --welcome flag is set
    let should_show_welcome = config.show_welcome || !workspace.preferences().welcome_shown;
    let mut ui = UiState::new(if should_show_welcome {
        ViewState::Welcome
    } else {
        ViewState::Browsing
    });
    ui.show_preview = config.show_preview;

    workspace.activate(Instant::now());

    loop {
        if workspace.poll(Instant::now()) {
            ui.clamp(workspace);
        }

        terminal.draw(|frame| {
            render_with_preview(frame, workspace, &ui, preview_manager);
        })?;

        if !event::poll(Duration::from_millis(100))? {
            continue;
        }

        let key = match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => key,
            _ => continue,
        };

        // Handle overlay-specific input
        match ui.view {
            ViewState::Help => {
                let action = handle_key_event(key);
                if matches!(action, KeyAction::Help | KeyAction::Quit | KeyAction::None) {
                    ui.view = ViewState::Browsing;
                }
                continue;
            }
            ViewState::Summary => {
                // Any key returns to the panels
                ui.view = ViewState::Browsing;
                continue;
            }
            ViewState::Welcome => {
                ui.view = ViewState::Browsing;

                // Mark welcome as shown and persist
                let preferences = workspace.preferences_mut();
                preferences.welcome_shown = true;
                if let Err(e) = preferences.save() {
                    log::warn!("failed to save preferences: {}", e);
                    ui.set_message(format!("Failed to save preferences: {}", e));
                }
                continue;
            }
            ViewState::ChooseDirectory => {
                handle_prompt(&mut ui, workspace, preview_manager, handle_prompt_input(key));
                continue;
            }
            ViewState::Browsing => {}
        }

        ui.message = None;
        let focus = ui.focus();

        match handle_key_event(key) {
            KeyAction::Quit => break,
            KeyAction::NextPanel => {
                ui.next_panel();
                preview_manager.reset();
            }
            KeyAction::PreviousPanel => {
                ui.previous_panel();
                preview_manager.reset();
            }
            KeyAction::Next => {
                if ui.select_next(workspace) {
                    preview_manager.reset();
                }
            }
            KeyAction::Previous => {
                if ui.select_previous() {
                    preview_manager.reset();
                }
            }
            KeyAction::Open => {
                let path = ui
                    .selected_image(workspace)
                    .map(|descriptor| descriptor.path.clone());
                match path {
                    Some(path) => {
                        if let Err(e) = open_file(&path) {
                            log::warn!("{}", e);
                            ui.set_message(e.to_string());
                        }
                    }
                    None => ui.set_message("No image selected"),
                }
            }
            KeyAction::ChooseDirectory => ui.begin_prompt(workspace),
            KeyAction::ClearDirectory => {
                workspace.clear_directory(focus);
                ui.reset_selection(focus);
                preview_manager.reset();
            }
            KeyAction::ToggleEnabled => {
                if workspace.panel(focus).kind() == PanelKind::Required {
                    ui.set_message(format!("{} are always enabled", focus.title()));
                } else {
                    workspace.toggle_enabled(focus);
                }
            }
            KeyAction::ToggleImages => {
                workspace.toggle_images(focus);
                preview_manager.reset();
            }
            KeyAction::TogglePreview => ui.show_preview = !ui.show_preview,
            KeyAction::Summary => ui.view = ViewState::Summary,
            KeyAction::Help => ui.view = ViewState::Help,
            KeyAction::None => {}
        }
    }

    workspace.deactivate();
    Ok(())
}

/// Applies one edit to the directory prompt
fn handle_prompt(
    ui: &mut UiState,
    workspace: &mut Workspace,
    preview_manager: &mut SyncPreviewManager,
    action: PromptAction,
) {
    match action {
        PromptAction::Insert(c) => ui.input.push(c),
        PromptAction::Backspace => {
            ui.input.pop();
        }
        PromptAction::Clear => ui.input.clear(),
        PromptAction::Cancel => ui.view = ViewState::Browsing,
        PromptAction::Submit => {
            let category: FrameCategory = ui.focus();
            let input = ui.input.trim().to_string();

            if input.is_empty() {
                workspace.clear_directory(category);
            } else {
                match expand_path(&input) {
                    Some(path) => workspace.set_directory(category, path),
                    None => ui.set_message(format!("Cannot resolve {}", input)),
                }
            }

            ui.reset_selection(category);
            preview_manager.reset();
            ui.input.clear();
            ui.view = ViewState::Browsing;
        }
        PromptAction::None => {}
    }
}
