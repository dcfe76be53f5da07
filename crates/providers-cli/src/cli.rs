use std::path::PathBuf;

use anime_providers::filter::{Filters, MediaType, Season, Status};
use anime_providers::media::{EpisodeNumber, LanguageType, QualityPreference};
use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Provider to query
    #[arg(short, long, global = true, default_value = "anikoto", env = "PROVIDERS_CLI_PROVIDER")]
    pub provider: String,

    /// Configuration file (defaults to <config dir>/providers-cli/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the provider's base URL
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the available providers and the filters they support
    Providers,

    /// Search a provider
    Search {
        /// Free-text query
        query: String,

        #[command(flatten)]
        filters: FilterArgs,
    },

    /// List the episodes of a title
    Episodes {
        /// Identifier returned by `search`
        identifier: String,

        #[arg(short, long, default_value = "sub")]
        lang: LanguageType,
    },

    /// Show the metadata of a title
    Info {
        /// Identifier returned by `search`
        identifier: String,
    },

    /// Resolve the playable streams of an episode
    Video {
        /// Identifier returned by `search`
        identifier: String,

        /// Episode number, e.g. 3 or 12.5
        episode: EpisodeNumber,

        #[arg(short, long, default_value = "sub")]
        lang: LanguageType,

        /// Pick one stream: best, worst or a height such as 720p
        #[arg(long)]
        quality: Option<QualityPreference>,
    },
}

#[derive(ClapArgs, Debug, Default)]
pub struct FilterArgs {
    #[arg(long)]
    pub year: Option<u32>,

    /// spring, summer, fall or winter
    #[arg(long)]
    pub season: Option<Season>,

    /// upcoming, ongoing or completed
    #[arg(long)]
    pub status: Option<Status>,

    /// tv, movie, ova, ona, special or music
    #[arg(long = "type")]
    pub media_type: Option<MediaType>,
}

impl FilterArgs {
    pub fn to_filters(&self) -> Filters {
        Filters {
            year: self.year,
            season: self.season,
            status: self.status,
            media_type: self.media_type,
        }
    }
}
