use anyhow::Result;
use chrono::Utc;
use pltconfig::{get_config, Config};
use pltsources::{ArtworkProvider, SourcesConfigExt};
use plttracker::{
    render_dashboard, EasterEgg, EasterEggView, PlaylistTracker, TrackerConfigExt, TrackerState,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const CLEAR_SCREEN: &str = "\x1B[2J\x1B[H";

/// Re-render at least this often so the offline message rotates
const RERENDER_INTERVAL: Duration = Duration::from_secs(60);

fn init_logging(config: &Config) -> Result<()> {
    if !config.get_log_enable_console()? {
        return Ok(());
    }

    // RUST_LOG wins over the configured level
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(config.get_log_min_level()?.to_lowercase())?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn print_dashboard(state: &TrackerState, egg: &EasterEggView, clear: bool) {
    let out = render_dashboard(state, egg, Utc::now());
    if clear {
        print!("{}{}", CLEAR_SCREEN, out);
    } else {
        print!("{}", out);
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await,
        None => std::future::pending().await,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let once = std::env::args().skip(1).any(|arg| arg == "--once");

    let config = get_config();
    init_logging(&config)?;

    info!("🎵 Starting PLTracker...");

    let archive = Arc::new(config.create_archive_client()?);
    let status = Arc::new(config.create_status_client()?);
    let artwork = Arc::new(config.create_artwork_chain()?);
    let settings = config.get_tracker_settings()?;

    info!(
        "📡 Following {} on #{} ({} artwork provider(s))",
        archive.user(),
        archive.channel(),
        artwork.len()
    );

    if once {
        let mut tracker = PlaylistTracker::new(settings, archive, status, artwork.clone());
        tracker.poll_once(&CancellationToken::new()).await;
        let mut state = tracker.current();
        drop(tracker);

        if let Some(song) = state.snapshot.current_song_info() {
            state.album_art = artwork.find_artwork(&song).await.unwrap_or_default();
        }
        print_dashboard(&state, &EasterEggView::default(), false);
        return Ok(());
    }

    let handle = PlaylistTracker::spawn(settings, archive, status, artwork);
    let mut updates = handle.subscribe();
    let mut egg = EasterEgg::new(config.get_easter_egg_settings()?);

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut rerender = tokio::time::interval(RERENDER_INTERVAL);

    loop {
        let deadline = egg.next_deadline();
        tokio::select! {
            _ = &mut ctrl_c => {
                info!("🛑 Ctrl+C received, shutting down");
                break;
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    warn!("Tracker stopped unexpectedly");
                    break;
                }
            }
            line = stdin.next_line(), if stdin_open => match line {
                // every line on stdin is a click on the play button
                Ok(Some(_)) => egg.click(Instant::now()),
                Ok(None) => stdin_open = false,
                Err(e) => {
                    warn!("Failed to read stdin: {}", e);
                    stdin_open = false;
                }
            },
            _ = sleep_until(deadline) => {}
            _ = rerender.tick() => {}
        }

        let view = egg.view(Instant::now());
        let state = updates.borrow_and_update().clone();
        print_dashboard(&state, &view, true);
    }

    handle.shutdown().await;
    info!("✅ PLTracker stopped");
    Ok(())
}
