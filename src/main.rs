use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use sonicsync::{
    cli,
    config::{self, Config},
    error,
    mood::MAX_RECENTLY_PLAYED,
    utils,
};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
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
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Authorize with Spotify API
    Auth,

    /// Forget the stored Spotify token
    Logout,

    /// Show the signed-in Spotify user
    Profile,

    /// Show your top tracks
    Top(TopOptions),

    /// Show recently played tracks
    Recent(RecentOptions),

    /// Show audio features for tracks
    Features(FeaturesOptions),

    /// Build a mood profile per time of day
    Analyze(AnalyzeOptions),

    /// Show the time-of-day segments
    Segments,

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct TopOptions {
    /// Time range: short_term, medium_term or long_term
    #[clap(long, default_value = "medium_term", value_parser = utils::parse_time_range)]
    pub time_range: utils::TimeRange,

    /// Number of tracks (1-50)
    #[clap(long, default_value_t = 50, value_parser = clap::value_parser!(u32).range(1..=50))]
    pub limit: u32,

    /// Include audio features
    #[clap(long)]
    pub features: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct RecentOptions {
    /// Number of tracks (1-50)
    #[clap(long, default_value_t = MAX_RECENTLY_PLAYED, value_parser = clap::value_parser!(u32).range(1..=50))]
    pub limit: u32,
}

#[derive(Parser, Debug, Clone)]
pub struct FeaturesOptions {
    /// Comma-separated Spotify track IDs
    #[clap(long, value_delimiter = ',', required = true)]
    pub ids: Vec<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct AnalyzeOptions {
    /// Number of days of history to analyze (0 = everything returned)
    #[clap(long, default_value_t = 7)]
    pub days: u32,

    /// Number of play events to fetch (1-50)
    #[clap(long, default_value_t = MAX_RECENTLY_PLAYED, value_parser = clap::value_parser!(u32).range(1..=50))]
    pub limit: u32,

    /// Print the analysis as JSON
    #[clap(long)]
    pub json: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

fn load_config() -> Config {
    match Config::from_env() {
        Ok(config) => config,
        Err(e) => error!("Invalid configuration. Err: {}", e),
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    match cli.command {
        Command::Auth => cli::auth(load_config()).await,
        Command::Logout => cli::logout().await,
        Command::Profile => cli::profile(load_config()).await,
        Command::Top(opt) => {
            cli::top(load_config(), opt.time_range, opt.limit, opt.features).await
        }
        Command::Recent(opt) => cli::recent(load_config(), opt.limit).await,
        Command::Features(opt) => cli::features(load_config(), opt.ids).await,
        Command::Analyze(opt) => {
            cli::analyze(load_config(), opt.days, opt.limit, opt.json).await
        }
        Command::Segments => cli::segments(),
        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
