//! A new-tab page for the terminal.
//!
//! Shows the time, the date and a keyboard-navigable grid of the browser's
//! bookmarks. Run with `--options` to go straight to the options form, or
//! with `--print-style` to print the page's stylesheet for the saved
//! settings.

mod app;
mod config;
mod core;
mod ui;

use std::io::{self, stderr};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;

use crate::app::{
    bookmark_runtime::{spawn_folder_render, BookmarkUpdate},
    event::{spawn_event_sources, AppEvent},
    handler,
    state::{ActiveView, AppState},
};
use crate::config::{default_bookmarks_path, default_settings_path, load_settings};
use crate::core::{
    bookmarks::{BookmarkSource, BookmarkTree},
    data_url::{average_color, read_image_data_url, DataUrlError},
    debounce::Debouncer,
    page::{PageModel, Rgb},
    storage::{JsonFileStorage, MemoryStorage, SettingsStorage},
};
use crate::ui::{newtab::NewTabView, options::OptionsView};

// ───────────────────────────────────────── CLI ───────────────

#[derive(Parser, Debug)]
#[command(name = env!("CARGO_PKG_NAME"), about = "Clock, date and bookmark grid for a new tab")]
struct Cli {
    /// Open the options form instead of the new-tab view.
    #[arg(long)]
    options: bool,

    /// Settings file (defaults to `$XDG_CONFIG_HOME/tabgrid/settings.json`).
    #[arg(long, value_name = "PATH")]
    settings: Option<PathBuf>,

    /// Chromium `Bookmarks` file to show.
    #[arg(long, value_name = "PATH")]
    bookmarks: Option<PathBuf>,

    /// Keep settings in memory only; nothing is written to disk.
    #[arg(long)]
    ephemeral: bool,

    /// Print the stylesheet for the current settings and exit.
    #[arg(long, conflicts_with = "options")]
    print_style: bool,
}

/// What to do once settings are loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Launch {
    NewTab,
    Options,
    PrintStyle,
}

impl Launch {
    fn from_cli(cli: &Cli) -> Self {
        if cli.print_style {
            Launch::PrintStyle
        } else if cli.options {
            Launch::Options
        } else {
            Launch::NewTab
        }
    }
}

// ───────────────────────────────────────── main ─────────────

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing (only when RUST_LOG is set).
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr) // never pollute stdout
        .init();

    let cli = Cli::parse();
    let launch = Launch::from_cli(&cli);

    let bookmarks_path = cli.bookmarks.unwrap_or_else(default_bookmarks_path);
    let bookmarks = Arc::new(load_bookmarks(&bookmarks_path));

    if cli.ephemeral {
        run(Arc::new(MemoryStorage::default()), bookmarks, launch).await
    } else {
        let path = cli.settings.unwrap_or_else(default_settings_path);
        tracing::info!("settings file: {}", path.display());
        run(Arc::new(JsonFileStorage::new(path)), bookmarks, launch).await
    }
}

/// A missing or unreadable bookmarks file shows an empty grid.
fn load_bookmarks(path: &Path) -> BookmarkTree {
    match BookmarkTree::load(path) {
        Ok(tree) => {
            tracing::info!("loaded {} bookmarks from {}", tree.len(), path.display());
            tree
        }
        Err(e) => {
            tracing::warn!("no bookmarks from {}: {e}", path.display());
            BookmarkTree::new()
        }
    }
}

async fn run<S: SettingsStorage, B: BookmarkSource>(
    storage: Arc<S>,
    bookmarks: Arc<B>,
    launch: Launch,
) -> Result<()> {
    let settings = load_settings(storage.as_ref()).await;
    let now = chrono::Local::now().naive_local();
    let mut state = match launch {
        Launch::PrintStyle => {
            print!("{}", PageModel::from_settings(&settings).stylesheet());
            return Ok(());
        }
        Launch::Options => AppState::new_in_options(settings, now),
        Launch::NewTab => AppState::new(settings, now),
    };
    let mut debouncer = Debouncer::new(storage);

    // ── terminal setup ────────────────────────────────────────
    enable_raw_mode()?;
    let mut stderr_handle = stderr();
    execute!(stderr_handle, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stderr());
    let mut terminal = Terminal::new(backend)?;

    // ── async channels ────────────────────────────────────────
    let mut events = spawn_event_sources(Duration::from_millis(100));
    let (bookmark_tx, mut bookmark_rx) = mpsc::unbounded_channel::<BookmarkUpdate>();
    let (image_tx, mut image_rx) = mpsc::unbounded_channel::<Result<String, DataUrlError>>();
    let (backdrop_tx, mut backdrop_rx) = mpsc::unbounded_channel::<(String, Option<Rgb>)>();

    // ── event loop ────────────────────────────────────────────
    loop {
        terminal.draw(|frame| {
            let area = frame.area();
            state.terminal_area = area;
            match state.active_view {
                ActiveView::NewTab => {
                    frame.render_widget(NewTabView { state: &state.new_tab }, area);
                }
                ActiveView::Options => {
                    if let Some(options) = &state.options {
                        frame.render_widget(OptionsView { state: options }, area);
                    }
                }
            }
        })?;

        // ── side effects requested by the handlers ──────────────
        if let Some(options) = state.options.as_mut() {
            for save in options.pending_saves.drain(..) {
                debouncer.schedule(save.key, save.value, save.delay);
            }
            if let Some(path) = options.pending_image.take() {
                let tx = image_tx.clone();
                tokio::spawn(async move {
                    let _ = tx.send(read_image_data_url(&path).await);
                });
            }
        }

        if let Some(url) = state.new_tab.pending_backdrop.take() {
            let tx = backdrop_tx.clone();
            tokio::task::spawn_blocking(move || {
                let color = average_color(&url);
                let _ = tx.send((url, color));
            });
        }

        if state.active_view == ActiveView::NewTab {
            if let Some(request) = state.new_tab.begin_render() {
                spawn_folder_render(bookmark_tx.clone(), Arc::clone(&bookmarks), request);
            }
        }

        if let Some(url) = state.open_url.take() {
            tracing::debug!("opening {url}");
            if let Err(e) = webbrowser::open(&url) {
                tracing::warn!("could not open {url}: {e}");
            }
        }

        if state.should_quit {
            break;
        }

        tokio::select! {
            biased;

            Some(event) = events.recv() => {
                match event {
                    AppEvent::Key(k) => handler::handle_key(&mut state, k),
                    AppEvent::Mouse(m) => handler::handle_mouse(&mut state, m),
                    AppEvent::Resize(_, _) => {}
                    AppEvent::Tick => state.new_tab.tick(chrono::Local::now().naive_local()),
                }
            }

            Some(update) = bookmark_rx.recv() => {
                state.new_tab.finish_render(update);
            }

            Some((url, color)) = backdrop_rx.recv() => {
                state.new_tab.finish_backdrop(&url, color);
            }

            Some(result) = image_rx.recv() => {
                if let Some(options) = state.options.as_mut() {
                    options.apply_image(result);
                }
            }
        }
    }

    // ── teardown ──────────────────────────────────────────────
    debouncer.settle().await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    Ok(())
}
