//! Spotify listening overview with an OAuth token relay.
//!
//! The crate has two halves. The local client logs in through Spotify's
//! authorization-code flow, keeps the resulting tokens on disk and reads top
//! tracks, now playing and followed artists. The relay is a small HTTP service
//! holding the client secret; it performs the code exchange and token refresh
//! on the client's behalf and can proxy resource calls.
//!
//! # Modules
//!
//! - `api` - HTTP endpoints of the token relay
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration management and environment variables
//! - `error` - Error type shared by every module
//! - `management` - Authorization lifecycle, token storage and polling
//! - `scope` - OAuth scopes requested at login
//! - `server` - Relay server and the local login redirect listener
//! - `spotify` - Spotify Web API, accounts service and relay clients
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers
//!
//! # Example
//!
//! ```
//! use spotview::{config::ClientConfig, management::{AuthManager, FileAuthorizationStore}};
//! use spotview::spotify::relay::RelayClient;
//!
//! #[tokio::main]
//! async fn main() -> spotview::Result<()> {
//!     spotview::config::load_env().await?;
//!     let config = ClientConfig::from_env()?;
//!     let relay = RelayClient::from_config(&config);
//!     let mut auth = AuthManager::new(config, relay, FileAuthorizationStore::default());
//!     let login_url = auth.login().await?;
//!     println!("{login_url}");
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod management;
pub mod scope;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

pub use error::{Error, Result};

/// Prints an informational line with a blue bullet.
///
/// ```
/// info!("Relay listening on http://{}", addr);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success line with a green checkmark.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a warning to stderr with a yellow exclamation mark.
///
/// Used for recoverable problems: a failed token exchange, an upstream error
/// the relay passes on, a poll that did not go through.
///
/// ```
/// warning!("Error refreshing token: {}", err);
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error to stderr with a red exclamation mark and exits with
/// status 1.
///
/// Reserved for the end of a CLI command. Everything below the `cli` module
/// returns [`Error`] instead.
///
/// ```
/// error!("Failed to fetch top tracks: {}", err);
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}
