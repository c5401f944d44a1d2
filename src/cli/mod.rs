//! # CLI Module
//!
//! User-facing commands. Each one loads the stored authorization state,
//! refreshes it through the relay when needed and prints the result with the
//! crate's output macros and `tabled` tables.
//!
//! - [`login`], [`logout`], [`status`] - authorization lifecycle
//! - [`top_tracks`], [`artists`], [`overview`] - listening data
//! - [`now_playing`], [`play`], [`pause`] - player
//! - [`relay`] - runs the token relay
//!
//! The global `--json` flag swaps the tables of the listening commands for the
//! provider's JSON, pretty printed.
//!
//! Data fetch failures are shown with the upstream message and leave the
//! stored tokens alone; running the command again retries.

mod auth;
mod library;
mod player;
mod relay;

pub use auth::authorized_client;
pub use auth::login;
pub use auth::logout;
pub use auth::status;
pub use library::artists;
pub use library::overview;
pub use library::print_json;
pub use library::retain_matching_artists;
pub use library::top_tracks;
pub use player::PLAYBACK_SETTLE_DELAY;
pub use player::describe;
pub use player::now_playing;
pub use player::pause;
pub use player::play;
pub use player::playback_summary;
pub use relay::relay;
