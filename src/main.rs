mod app;
mod components;
mod draw;
mod keys;
mod state;
mod ui;

use crate::app::App;
use crate::state::app_settings::AppSettings;
use crate::state::loader::{LoaderWorker, LoadingState};
use crate::state::messages::{DataRequest, DataResponse, UiEvent};
use crate::state::refresher::PeriodicRefresher;
use crossterm::event::{self as crossterm_event, Event};
use crossterm::{cursor, execute, terminal};
use log::{error, info};
use padel_core::source::DataSource;
use std::io::Stdout;
use std::sync::Arc;
use std::{io, panic};
use tokio::sync::{Mutex, mpsc};
use tokio::time::Duration;
use tui::{Terminal, backend::CrosstermBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if handle_cli_args() {
        return Ok(());
    }

    better_panic::install();

    let backend = CrosstermBackend::new(io::stdout());
    let terminal = Terminal::new(backend)?;

    setup_panic_hook();
    setup_terminal()?;

    tui_logger::init_logger(log::LevelFilter::Trace)?;
    tui_logger::set_default_level(log::LevelFilter::Info);

    let settings = AppSettings::load();
    let source = DataSource::new(settings.data_json.clone());
    let refresh_period = Duration::from_secs(settings.refresh_secs);
    info!("padeltui {} reading {}", env!("CARGO_PKG_VERSION"), source.describe());
    let app = Arc::new(Mutex::new(App::new(settings)));

    let (ui_event_tx, ui_event_rx) = mpsc::channel::<UiEvent>(100);
    let (data_req_tx, data_req_rx) = mpsc::channel::<DataRequest>(100);
    let (data_resp_tx, data_resp_rx) = mpsc::channel::<DataResponse>(100);

    // Input handler thread
    let input_handler = tokio::spawn(input_handler_task(ui_event_tx.clone()));

    // Snapshot loader thread
    let loader = LoaderWorker::new(source, data_req_rx, data_resp_tx);
    let loader_task = tokio::spawn(loader.run());

    // Periodic snapshot check
    let periodic_updater = PeriodicRefresher::new(data_req_tx.clone(), refresh_period);
    let periodic_task = tokio::spawn(periodic_updater.run());

    // Animation tick thread, 80ms ≈ 12.5 FPS
    let anim_tx = ui_event_tx.clone();
    let animation_task = tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(80));
        loop {
            interval.tick().await;
            if anim_tx.send(UiEvent::AnimationTick).await.is_err() {
                break;
            }
        }
    });

    // Trigger snapshot load on startup
    let _ = ui_event_tx.send(UiEvent::AppStarted).await;

    main_ui_loop(terminal, app, ui_event_rx, data_req_tx, data_resp_rx).await;

    input_handler.abort();
    loader_task.abort();
    periodic_task.abort();
    animation_task.abort();

    Ok(())
}

fn handle_cli_args() -> bool {
    let mut args = std::env::args().skip(1);
    let Some(arg) = args.next() else {
        return false;
    };

    match arg.as_str() {
        "-h" | "--help" => {
            println!("{}", usage_text());
            true
        }
        "-V" | "--version" => {
            println!("padeltui {}", env!("CARGO_PKG_VERSION"));
            true
        }
        _ => {
            eprintln!("Unknown argument: {arg}\n\n{}", usage_text());
            std::process::exit(2);
        }
    }
}

fn usage_text() -> &'static str {
    "padeltui - padel association back-office in the terminal

Usage:
  padeltui
  padeltui --help
  padeltui --version

Settings are read from $XDG_CONFIG_HOME/padeltui/settings.json
(or ~/.config/padeltui/settings.json), then from the environment.

Environment:
  PADELTUI_DATA_JSON    Path to an association JSON snapshot (default: built-in)
  PADELTUI_LOG_LEVEL    error, warn, info, debug or trace
  PADELTUI_BOX_HEIGHT   Match card height in rows (min 3, default 3)
  PADELTUI_BASE_GAP     Rows between first-round cards (min 1, default 1)
  PADELTUI_PAGE_SIZE    Rows per page in list tabs (default 10)"
}

async fn main_ui_loop(
    mut terminal: Terminal<CrosstermBackend<Stdout>>,
    app: Arc<Mutex<App>>,
    mut ui_events: mpsc::Receiver<UiEvent>,
    data_requests: mpsc::Sender<DataRequest>,
    mut data_responses: mpsc::Receiver<DataResponse>,
) {
    let mut loading = LoadingState::default();

    loop {
        tokio::select! {
            Some(ui_event) = ui_events.recv() => {
                let should_redraw = handle_ui_event(ui_event, &app, &data_requests).await;
                if should_redraw && !loading.is_loading {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }

            Some(response) = data_responses.recv() => {
                let should_redraw = handle_data_response(response, &app, &mut loading).await;
                if should_redraw {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }
        }
    }
}

async fn handle_ui_event(
    ui_event: UiEvent,
    app: &Arc<Mutex<App>>,
    data_requests: &mpsc::Sender<DataRequest>,
) -> bool {
    match ui_event {
        UiEvent::AppStarted => {
            let _ = data_requests.send(DataRequest::Load).await;
            true
        }
        UiEvent::KeyPressed(key_event) => {
            keys::handle_key_bindings(key_event, app, data_requests).await;
            true
        }
        UiEvent::Resize => true,
        UiEvent::AnimationTick => {
            let mut guard = app.lock().await;
            // Only the intro splash animates.
            if !guard.state.show_intro {
                return false;
            }
            guard.advance_animation(crate::components::banner_frames::FRAME_COUNT);
            true
        }
    }
}

async fn handle_data_response(
    response: DataResponse,
    app: &Arc<Mutex<App>>,
    loading: &mut LoadingState,
) -> bool {
    match response {
        DataResponse::LoadingStateChanged { loading_state } => {
            *loading = loading_state;
            return true;
        }
        DataResponse::Loaded { association, source } => {
            let mut guard = app.lock().await;
            guard.on_data_loaded(*association, source);
        }
        DataResponse::Unchanged => return false,
        DataResponse::Error { message } => {
            error!("Snapshot error: {message}");
            let mut guard = app.lock().await;
            guard.on_error(message);
        }
    }
    !loading.is_loading
}

async fn input_handler_task(ui_events: mpsc::Sender<UiEvent>) {
    loop {
        if let Ok(event) = crossterm_event::read() {
            let ui_event = match event {
                Event::Key(key_event) => Some(UiEvent::KeyPressed(key_event)),
                Event::Resize(_, _) => Some(UiEvent::Resize),
                _ => None,
            };

            if let Some(ui_event) = ui_event
                && ui_events.send(ui_event).await.is_err()
            {
                break;
            }
        }
    }
}

fn setup_terminal() -> io::Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, cursor::Hide)?;
    execute!(stdout, terminal::EnterAlternateScreen)?;
    execute!(stdout, terminal::Clear(terminal::ClearType::All))?;
    terminal::enable_raw_mode()
}

/// Restore the terminal. Best effort: also runs from the panic hook.
pub fn cleanup_terminal() {
    let mut stdout = io::stdout();
    let _ = execute!(stdout, cursor::MoveTo(0, 0));
    let _ = execute!(stdout, terminal::Clear(terminal::ClearType::All));
    let _ = execute!(stdout, terminal::LeaveAlternateScreen);
    let _ = execute!(stdout, cursor::Show);
    let _ = terminal::disable_raw_mode();
}

fn setup_panic_hook() {
    panic::set_hook(Box::new(|panic_info| {
        cleanup_terminal();
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));
}
