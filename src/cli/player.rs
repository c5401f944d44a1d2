use std::time::Duration;

use crate::{
    config::ClientConfig,
    error, info,
    management::NowPlayingPoller,
    spotify::{CURRENTLY_PLAYING_PATH, client::SpotifyClient},
    success,
    types::CurrentlyPlaying,
    warning,
};

use super::{auth::authorized_client, library::print_json};

/// Time Spotify gets to apply a play/pause before the player is read back.
pub const PLAYBACK_SETTLE_DELAY: Duration = Duration::from_secs(1);

pub fn describe(now_playing: &CurrentlyPlaying) -> String {
    match (&now_playing.item, now_playing.is_playing) {
        (Some(track), true) => format!("▶ {} - {}", track.name, track.artist_names()),
        (Some(track), false) => format!("⏸ {} - {}", track.name, track.artist_names()),
        (None, _) => "Nothing playing".to_string(),
    }
}

/// Waits `delay`, reads the player again and describes it.
///
/// Used after play and pause so the command shows the state the change led to.
/// Returns `None` when the read fails; the command itself already succeeded.
pub async fn playback_summary(client: &SpotifyClient, delay: Duration) -> Option<String> {
    tokio::time::sleep(delay).await;
    match client.currently_playing().await {
        Ok(now) => Some(describe(&now)),
        Err(e) => {
            warning!("Failed to refresh currently playing: {}", e);
            None
        }
    }
}

/// Prints what is playing. With `watch`, keeps polling every `watch` seconds
/// until Ctrl-C. With `json`, every snapshot is printed as JSON.
pub async fn now_playing(config: &ClientConfig, watch: Option<u64>, json: bool) {
    let client = authorized_client(config).await;

    let Some(every) = watch else {
        if json {
            match client.get_json(CURRENTLY_PLAYING_PATH).await {
                Ok(body) => print_json(&body),
                Err(e) => error!("Failed to fetch currently playing: {}", e),
            }
            return;
        }
        match client.currently_playing().await {
            Ok(now) => info!("{}", describe(&now)),
            Err(e) => error!("Failed to fetch currently playing: {}", e),
        }
        return;
    };

    let poller = NowPlayingPoller::start(client, Duration::from_secs(every.max(1)));
    let mut updates = poller.subscribe();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                match snapshot {
                    Some(now) if json => match serde_json::to_value(&now) {
                        Ok(body) => print_json(&body),
                        Err(e) => warning!("Failed to render snapshot: {}", e),
                    },
                    Some(now) => info!("{}", describe(&now)),
                    None => {}
                }
            }
        }
    }

    poller.stop().await;
}

pub async fn play(config: &ClientConfig, uri: Option<String>) {
    let client = authorized_client(config).await;
    match client.play(uri.as_deref()).await {
        Ok(_) => {
            success!("Playback started.");
            if let Some(now) = playback_summary(&client, PLAYBACK_SETTLE_DELAY).await {
                info!("{}", now);
            }
        }
        Err(e) if e.is_unauthorized() => {
            warning!("Spotify rejected the token. Run spotview status to refresh it.");
            error!("{}", e)
        }
        Err(e) => error!("Failed to start playback: {}", e),
    }
}

pub async fn pause(config: &ClientConfig) {
    let client = authorized_client(config).await;
    match client.pause().await {
        Ok(_) => {
            success!("Playback paused.");
            if let Some(now) = playback_summary(&client, PLAYBACK_SETTLE_DELAY).await {
                info!("{}", now);
            }
        }
        Err(e) => error!("Failed to pause playback: {}", e),
    }
}
