use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use spotview::{
    cli,
    config::{self, ClientConfig, RelayConfig},
    error,
};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightGreen.on_default())
        .placeholder(AnsiColor::BrightBlue.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    /// Print fetched data as raw JSON instead of tables
    #[clap(long, global = true)]
    json: bool,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Authorize with Spotify through the token relay
    Login,

    /// Forget stored tokens
    Logout,

    /// Show whether a usable token is stored (refreshes an expired one)
    Status,

    /// Your top tracks
    TopTracks,

    /// Artists you follow
    Artists(ArtistsOptions),

    /// What is playing right now
    NowPlaying(NowPlayingOptions),

    /// Top tracks, now playing and followed artists together
    Overview,

    /// Resume playback or play a track
    Play(PlayOptions),

    /// Pause playback
    Pause,

    /// Run the token relay
    Relay,

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct ArtistsOptions {
    /// Only show artists whose name contains this text
    #[clap(long)]
    pub search: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct NowPlayingOptions {
    /// Keep refreshing every N seconds until Ctrl-C
    #[clap(long, value_name = "SECONDS")]
    pub watch: Option<u64>,
}

#[derive(Parser, Debug, Clone)]
pub struct PlayOptions {
    /// Spotify track URI, e.g. spotify:track:4uLU6hMCjMI75M1A2tKUQC
    #[clap(long)]
    pub uri: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

fn client_config() -> ClientConfig {
    match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => error!("{}", e),
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    match cli.command {
        Command::Login => cli::login(&client_config()).await,
        Command::Logout => cli::logout(&client_config()).await,
        Command::Status => cli::status(&client_config()).await,
        Command::TopTracks => cli::top_tracks(&client_config(), cli.json).await,
        Command::Artists(opt) => cli::artists(&client_config(), opt.search, cli.json).await,
        Command::NowPlaying(opt) => {
            cli::now_playing(&client_config(), opt.watch, cli.json).await
        }
        Command::Overview => cli::overview(&client_config(), cli.json).await,
        Command::Play(opt) => cli::play(&client_config(), opt.uri).await,
        Command::Pause => cli::pause(&client_config()).await,
        Command::Relay => match RelayConfig::from_env() {
            Ok(config) => cli::relay(config).await,
            Err(e) => error!("{}", e),
        },
        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
