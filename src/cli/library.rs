use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use tabled::Table;

use crate::{
    config::ClientConfig,
    error,
    spotify::{FOLLOWED_ARTISTS_PATH, TOP_TRACKS_PATH},
    types::{Artist, ArtistTableRow, Track, TrackTableRow},
    utils,
};

use super::{auth::authorized_client, player::describe};

pub fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    pb
}

/// Prints `value` as indented JSON, the way `--json` shows everything.
pub fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => error!("Failed to render JSON: {}", e),
    }
}

pub async fn top_tracks(config: &ClientConfig, json: bool) {
    let client = authorized_client(config).await;
    let pb = spinner("Fetching top tracks...");

    if json {
        let result = client.get_json(TOP_TRACKS_PATH).await;
        pb.finish_and_clear();
        match result {
            Ok(body) => print_json(&body),
            Err(e) => error!("Failed to fetch top tracks: {}\nRun the command again to retry.", e),
        }
        return;
    }

    let result = client.top_tracks().await;
    pb.finish_and_clear();

    match result {
        Ok(top) => println!("{}", track_table(&top.items)),
        Err(e) => error!("Failed to fetch top tracks: {}\nRun the command again to retry.", e),
    }
}

pub async fn artists(config: &ClientConfig, search: Option<String>, json: bool) {
    let client = authorized_client(config).await;
    let pb = spinner("Fetching followed artists...");

    if json {
        let result = client.get_json(FOLLOWED_ARTISTS_PATH).await;
        pb.finish_and_clear();
        match result {
            Ok(mut body) => {
                if let Some(search) = search {
                    retain_matching_artists(&mut body, &search);
                }
                print_json(&body);
            }
            Err(e) => error!(
                "Failed to fetch followed artists: {}\nRun the command again to retry.",
                e
            ),
        }
        return;
    }

    let result = client.followed_artists().await;
    pb.finish_and_clear();

    match result {
        Ok(followed) => {
            let mut artists = followed.artists.items;
            artists.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));

            if let Some(search) = search {
                let search_term = search.to_lowercase();
                artists.retain(|a| a.name.to_lowercase().contains(&search_term));
            }

            println!("{}", artist_table(&artists));
        }
        Err(e) => error!(
            "Failed to fetch followed artists: {}\nRun the command again to retry.",
            e
        ),
    }
}

/// Top tracks, now playing and followed artists in one go.
pub async fn overview(config: &ClientConfig, json: bool) {
    let client = authorized_client(config).await;
    let pb = spinner("Fetching your Spotify overview...");

    if json {
        let result = client.raw_overview().await;
        pb.finish_and_clear();
        match result {
            Ok(document) => print_json(&document),
            Err(e) => error!("Failed to fetch overview: {}\nRun the command again to retry.", e),
        }
        return;
    }

    let result = client.overview().await;
    pb.finish_and_clear();

    match result {
        Ok(overview) => {
            println!("{}\n", describe(&overview.currently_playing));
            println!("Top tracks\n{}\n", track_table(&overview.top_tracks.items));
            println!(
                "Followed artists\n{}",
                artist_table(&overview.followed_artists.artists.items)
            );
        }
        Err(e) => error!("Failed to fetch overview: {}\nRun the command again to retry.", e),
    }
}

/// Drops followed artists whose name does not contain `search`
/// (case-insensitive) from a raw `/me/following` body.
pub fn retain_matching_artists(body: &mut Value, search: &str) {
    let search = search.to_lowercase();
    if let Some(Value::Array(items)) = body.pointer_mut("/artists/items") {
        items.retain(|artist| {
            artist["name"]
                .as_str()
                .is_some_and(|name| name.to_lowercase().contains(&search))
        });
    }
}

fn track_table(tracks: &[Track]) -> Table {
    let rows: Vec<TrackTableRow> = tracks
        .iter()
        .enumerate()
        .map(|(i, t)| TrackTableRow {
            rank: i + 1,
            name: utils::truncate(&t.name, 40),
            artists: utils::truncate(&t.artist_names(), 40),
            album: t
                .album
                .as_ref()
                .map(|a| utils::truncate(&a.name, 40))
                .unwrap_or_default(),
        })
        .collect();
    Table::new(rows)
}

fn artist_table(artists: &[Artist]) -> Table {
    let rows: Vec<ArtistTableRow> = artists
        .iter()
        .map(|a| ArtistTableRow {
            name: a.name.clone(),
            followers: a
                .followers
                .as_ref()
                .map(|f| f.total.to_string())
                .unwrap_or_default(),
            genres: a
                .genres
                .iter()
                .take(3)
                .cloned()
                .collect::<Vec<_>>()
                .join(","),
        })
        .collect();
    Table::new(rows)
}
