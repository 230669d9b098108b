mod audio;
mod auth;
mod config;
mod controller;
mod logging;
mod model;
mod view;

use std::io;
use std::sync::Arc;
use anyhow::{Context, Result};
use std::time::Duration;
use tokio::sync::Mutex;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use view::AppView;
use audio::AudioBackend;
use auth::SessionStore;
use config::Settings;
use controller::AppController;
use model::{AppModel, CatalogClient, LikedSongsCache, LocalStore, PersistenceClient, PlaybackQueue};

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load().context("loading settings")?;
    settings.validate()?;

    if let Err(e) = logging::init_logging(&settings.storage.log_dir) {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    tracing::info!("=== Redtune Starting ===");

    let catalog = CatalogClient::new(settings.catalog.clone())?;
    let backend = PersistenceClient::new(&settings.backend)?;
    let session = SessionStore::new(&settings.backend, &settings.storage.cache_dir, backend.clone())?;

    // Liked songs come from the durable store before the first frame
    let liked = LikedSongsCache::load(LocalStore::new(settings.storage.cache_dir.clone()));
    let mut app_model = AppModel::new(PlaybackQueue::new(liked));
    app_model.set_clients(catalog, backend, session);
    let model = Arc::new(Mutex::new(app_model));

    let (audio_backend, player_events) = AudioBackend::new(settings.player.clone());
    model
        .lock()
        .await
        .set_device_name(audio_backend.device_name().to_string())
        .await;
    let audio_backend = Arc::new(Mutex::new(audio_backend));

    let controller = AppController::new(
        model.clone(),
        audio_backend.clone(),
        settings.ui.clone(),
        settings.library.clone(),
    );
    controller.start_player_event_listener(player_events);
    controller.start_progress_ticker();

    tracing::info!("Starting TUI...");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    controller.spawn_task(|c| async move { c.restore_session().await });

    let res = run_app(&mut terminal, model.clone(), controller).await;

    audio_backend.lock().await.stop();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = ?err, "Application error");
    }

    tracing::info!("Redtune shutting down");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    model: Arc<Mutex<AppModel>>,
    controller: AppController,
) -> io::Result<()> {
    // Track when we last checked the token
    let mut last_token_check = std::time::Instant::now();
    const TOKEN_CHECK_INTERVAL: Duration = Duration::from_secs(60); // Check every minute

    loop {
        // Periodically check and refresh token if needed
        if last_token_check.elapsed() >= TOKEN_CHECK_INTERVAL {
            last_token_check = std::time::Instant::now();
            controller.spawn_task(|c| async move { c.refresh_session().await });
        }

        // Get current state
        let (playback, ui_state, content_state, liked, should_quit) = {
            let model_guard = model.lock().await;

            // Auto-clear old notifications (after 5 seconds)
            model_guard.auto_clear_old_notifications().await;

            (
                model_guard.get_playback_info().await,
                model_guard.get_ui_state().await,
                model_guard.get_content_state().await,
                model_guard.liked_ids().await,
                model_guard.should_quit().await,
            )
        };

        // Draw UI
        terminal.draw(|f| {
            AppView::render(f, &playback, &ui_state, &content_state, &liked);
        })?;

        // Handle input with shorter poll time for smoother UI updates
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if let Err(e) = controller.handle_key_event(key).await {
                    tracing::warn!(error = %e, "Key handling failed");
                }
            }
        }

        if should_quit {
            break;
        }
    }

    Ok(())
}
