//! bucketview - browse a cloud storage bucket from the terminal

use std::io::{self, stdout};
use std::panic;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::Style,
    Frame, Terminal,
};
use tracing::{error, info};

mod api;
mod config;
mod errors;
mod input;
mod logging;
mod state;
mod ui;
mod validate;

use api::{HttpApi, StorageApi};
use config::{Config, Loaded};
use errors::AppResult;
use state::app::App;
use state::mode::Mode;
use ui::dialog::input_dialog_cursor_position;
use ui::status::BROWSER_KEYS;
use ui::{
    Breadcrumb, BucketSelector, FileViewer, KeyBar, MkdirDialog, PanelWidget, SearchDialog,
    SimpleConfirmDialog, SpinnerDialog, StatusBar, UploadProgressDialog, UploadPromptDialog,
};

const USAGE: &str = "usage: bv [URL] [--open NAME]";

/// Command line: an optional server URL and a file to open on start
#[derive(Debug, Default, PartialEq)]
struct Args {
    url: Option<String>,
    open: Option<String>,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Args, String> {
    let mut parsed = Args::default();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--open" => match args.next() {
                Some(name) => parsed.open = Some(name),
                None => return Err("--open needs a file name".to_string()),
            },
            "-h" | "--help" => return Err(USAGE.to_string()),
            _ if arg.starts_with('-') => return Err(format!("unknown option {}\n{}", arg, USAGE)),
            _ if parsed.url.is_none() => parsed.url = Some(arg),
            _ => return Err(USAGE.to_string()),
        }
    }
    Ok(parsed)
}

/// Set up panic hook to restore terminal on panic
fn setup_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));
}

/// Initialize the terminal for TUI mode
fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend)
}

/// Restore terminal to normal mode
fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen)?;
    Ok(())
}

/// Render the browser and whatever overlay the mode asks for
fn draw(frame: &mut Frame, app: &mut App) {
    let size = frame.area();

    // The viewer takes the whole screen
    if let Mode::Viewing { entries, cursor, kind, content, scroll } = &app.mode {
        let Some(entry) = entries.get(cursor.selected) else {
            return;
        };
        let url = app.api.download_url(&entry.path);
        let viewer = FileViewer::new(entry, *cursor, *kind, content, *scroll, url, &app.theme);
        app.ui.viewer_height = FileViewer::content_height(size);
        frame.render_widget(viewer, size);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(size);

    let crumbs = app.breadcrumbs();
    frame.render_widget(Breadcrumb::new(&crumbs, &app.theme), chunks[0]);
    frame.render_stateful_widget(PanelWidget::new(&app.theme), chunks[1], &mut app.panel);
    let status = StatusBar::new(&app.panel, &app.theme)
        .with_notification(app.notifications.current())
        .with_admin(app.permissions.is_admin);
    frame.render_widget(status, chunks[2]);
    frame.render_widget(KeyBar::new(BROWSER_KEYS, &app.theme), chunks[3]);

    let input_selected = app.ui.input_selected;
    match &app.mode {
        Mode::BackgroundTask { title, message, frame: spinner_frame } => {
            let spinner = SpinnerDialog::new(*spinner_frame, title, message)
                .border_style(Style::default().fg(app.theme.panel_border))
                .content_style(Style::default().fg(app.theme.cursor_fg).bg(app.theme.cursor_bg));
            frame.render_widget(spinner, size);
        }
        Mode::MakingDir { name_input, cursor_pos, focus, error } => {
            let dialog = MkdirDialog::new(name_input, error.as_deref(), *focus, input_selected, &app.theme);
            frame.render_widget(dialog, size);
            if *focus == 0 {
                frame.set_cursor_position(input_dialog_cursor_position(size, name_input, *cursor_pos));
            }
        }
        Mode::Searching { pattern_input, cursor_pos, focus, error } => {
            let dialog = SearchDialog::new(pattern_input, error.as_deref(), *focus, input_selected, &app.theme);
            frame.render_widget(dialog, size);
            if *focus == 0 {
                frame.set_cursor_position(input_dialog_cursor_position(size, pattern_input, *cursor_pos));
            }
        }
        Mode::UploadPrompt { path_input, cursor_pos, focus, error } => {
            let target = format!("/{}", app.panel.path);
            let dialog = UploadPromptDialog::new(path_input, &target, error.as_deref(), *focus, input_selected, &app.theme);
            frame.render_widget(dialog, size);
            if *focus == 0 {
                frame.set_cursor_position(input_dialog_cursor_position(size, path_input, *cursor_pos));
            }
        }
        Mode::SimpleConfirm { message, warning, focus, .. } => {
            let dialog = SimpleConfirmDialog::new(message, warning.as_deref(), *focus, &app.theme);
            frame.render_widget(dialog, size);
        }
        Mode::BucketSelector { buckets, selected } => {
            let dialog = BucketSelector::new(buckets, *selected, app.bucket.as_deref(), &app.theme);
            frame.render_widget(dialog, size);
        }
        Mode::Uploading { items, frame: spinner_frame, confirm_cancel, cancelling } => {
            let dialog = UploadProgressDialog::new(*spinner_frame, items, *confirm_cancel, *cancelling, &app.theme);
            frame.render_widget(dialog, size);
        }
        Mode::Normal | Mode::Viewing { .. } => {}
    }
}

/// Main event loop
fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|frame| draw(frame, app))?;

        app.poll_background_task();
        app.tick_spinner();
        app.tick();

        if app.should_quit {
            return Ok(());
        }

        // Poll faster while something is animating
        let poll_timeout = if matches!(app.mode, Mode::BackgroundTask { .. } | Mode::Uploading { .. }) {
            Duration::from_millis(50)
        } else {
            Duration::from_millis(100)
        };

        if event::poll(poll_timeout)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            input::handle_key(app, key);
        }
    }
}

fn build_app(args: Args) -> AppResult<App> {
    let Loaded { mut config, warnings } = Config::load();
    for warning in &warnings {
        eprintln!("Warning: {}", warning);
    }
    if let Some(url) = args.url {
        config.server.url = url;
    }

    match logging::init_logging(&config.logging) {
        Ok(Some(path)) => info!(log = %path.display(), server = %config.server.url, "bucketview starting"),
        Ok(None) => {}
        Err(e) => eprintln!("bv: logging disabled: {}", e),
    }

    let server = &config.server;
    let api: Arc<dyn StorageApi> = Arc::new(HttpApi::new(
        &server.url,
        &server.api_prefix,
        server.timeout_secs,
        server.upload_timeout_secs,
    )?);

    let mut app = App::new(config, api);
    app.config_path = config::config_file();
    app.report_config_warnings(&warnings);
    app.start(args.open);
    Ok(app)
}

fn main() -> ExitCode {
    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{}", message);
            return ExitCode::from(2);
        }
    };

    let mut app = match build_app(args) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("bv: {}", e);
            return ExitCode::FAILURE;
        }
    };

    setup_panic_hook();
    let result = setup_terminal().and_then(|mut terminal| {
        let result = run(&mut terminal, &mut app);
        restore_terminal()?;
        result
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "terminal failure");
            let _ = restore_terminal();
            eprintln!("bv: {}", e);
            ExitCode::FAILURE
        }
    }
}
