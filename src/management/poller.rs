use std::time::Duration;

use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};

use crate::{spotify::client::SpotifyClient, types::CurrentlyPlaying, warning};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Periodically refreshes the currently-playing snapshot.
///
/// The task runs until [`stop`](Self::stop) is called or the poller is
/// dropped. Failed polls are logged and leave the previous snapshot in place;
/// the next tick simply tries again.
pub struct NowPlayingPoller {
    shutdown: watch::Sender<bool>,
    updates: watch::Receiver<Option<CurrentlyPlaying>>,
    task: Option<JoinHandle<()>>,
}

impl NowPlayingPoller {
    /// Spawns the polling task. The first poll happens immediately.
    pub fn start(client: SpotifyClient, interval: Duration) -> Self {
        let (shutdown, mut stop) = watch::channel(false);
        let (publish, updates) = watch::channel(None);

        let task = tokio::spawn(async move {
            let mut ticker = time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = stop.changed() => break,
                    _ = ticker.tick() => {
                        match client.currently_playing().await {
                            Ok(now_playing) => {
                                if publish.send(Some(now_playing)).is_err() {
                                    break;
                                }
                            }
                            Err(e) => warning!("Failed to refresh currently playing: {}", e),
                        }
                    }
                }
            }
        });

        Self {
            shutdown,
            updates,
            task: Some(task),
        }
    }

    /// Receiver that observes every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Option<CurrentlyPlaying>> {
        self.updates.clone()
    }

    /// Most recent snapshot, if any poll has succeeded yet.
    pub fn latest(&self) -> Option<CurrentlyPlaying> {
        self.updates.borrow().clone()
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Stops polling and waits for the task to wind down.
    pub async fn stop(mut self) {
        let _ = self.shutdown.send(true);
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for NowPlayingPoller {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
