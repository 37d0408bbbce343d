mod config;
mod controller;
mod error;
mod logging;
mod model;
mod view;

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};
use anyhow::Result;
use tokio::sync::Mutex;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};

use view::{AppView, ViewState};
use controller::AppController;
use model::{AppModel, LibraryClient};

/// Upper bound on how long the loop waits for input before redrawing
const FRAME_INTERVAL: Duration = Duration::from_millis(50);

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let config = config::load_config();

    if let Err(e) = logging::init_logging(config.log_filter.as_deref()) {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    tracing::info!("=== Subsonic-RS Client Starting ===");
    tracing::debug!(?config, "Configuration loaded");

    let library = LibraryClient::from_file(&config.library_file)?;

    let mut app_model = AppModel::new(config.notification_timeout());
    app_model.set_library_client(library.clone());
    let model = Arc::new(Mutex::new(app_model));

    let controller = AppController::new(model.clone(), library, &config);
    controller.load_playlists().await;
    controller.load_music_folders().await;

    tracing::info!("Starting TUI...");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, model, controller).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = ?err, "Application error");
    }

    tracing::info!("Subsonic-RS Client shutting down");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    model: Arc<Mutex<AppModel>>,
    controller: AppController,
) -> io::Result<()> {
    loop {
        controller.tick(Instant::now()).await;

        let size = terminal.size()?;
        let listing = AppView::listing_area(Rect::new(0, 0, size.width, size.height));

        // Get current state
        let (state, should_quit) = {
            let model_guard = model.lock().await;
            model_guard.set_viewport_height(listing.height as usize).await;

            let state = ViewState {
                ui_state: model_guard.get_ui_state().await,
                content_state: model_guard.get_content_state().await,
                selection: model_guard.get_selection().await,
                play_queue: model_guard.get_play_queue().await,
                processing: controller.in_flight().snapshot(),
            };
            (state, model_guard.should_quit().await)
        };

        if should_quit {
            break;
        }

        // Draw UI
        terminal.draw(|f| {
            AppView::render(f, &state);
        })?;

        // Wake up early for a pending click so its single-click action is not delayed
        let timeout = match controller.next_deadline().await {
            Some(deadline) => deadline.saturating_duration_since(Instant::now()).min(FRAME_INTERVAL),
            None => FRAME_INTERVAL,
        };

        // Batches run in spawned tasks; yield so they progress between frames
        tokio::task::yield_now().await;

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) => {
                    // Errors are handled internally, no need to log
                    let _ = controller.handle_key_event(key).await;
                }
                Event::Mouse(mouse) => {
                    controller.handle_mouse_event(mouse, listing, Instant::now()).await;
                }
                _ => {}
            }
        }
    }

    Ok(())
}
