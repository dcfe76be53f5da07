mod cli;
mod config;
mod output;

use std::process;
use std::time::Duration;

use anime_providers::media::select_rendition;
use anime_providers::provider::{
    Provider, default_client, default_registry, merge_provider_extras,
};
use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use tracing::{Level, debug, error};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use crate::cli::{Args, Commands};
use crate::config::AppConfig;
use crate::output::OutputManager;

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let json = args.json;

    if let Err(e) = run(args).await {
        if json {
            let error_json = json!({
                "status": "error",
                "message": format!("{e:#}"),
            });
            println!("{error_json}");
        } else {
            error!("Application error: {e:#}");
            eprintln!("{} {e:#}", "Error:".red().bold());
        }
        process::exit(1);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    init_logging(args.verbose, args.quiet);

    let config = AppConfig::load(args.config.as_deref())?;
    debug!(?config, "Loaded configuration");

    let output = OutputManager::new(args.json, !args.no_color);
    let registry = default_registry();

    if let Commands::Providers = args.command {
        let providers: Vec<_> = registry
            .names()
            .filter_map(|name| registry.capabilities(name).map(|caps| (name, caps)))
            .collect();
        print!("{}", output.format_providers(&providers)?);
        return Ok(());
    }

    let timeout = args.timeout.map(Duration::from_secs).or(config.timeout());
    let client = default_client(timeout).context("Failed to build HTTP client")?;

    let overlay = args.base_url.map(|url| json!({ "base_url": url }));
    let extras = merge_provider_extras(config.provider_extras(&args.provider)?, overlay);
    let provider = registry
        .create(&args.provider, client, extras)
        .with_context(|| format!("Failed to create provider {}", args.provider))?;

    let spinner = (!args.json && !args.quiet).then(spinner);
    let result = execute(provider.as_ref(), args.command, &output).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    print!("{}", result?);
    Ok(())
}

async fn execute(
    provider: &dyn Provider,
    command: Commands,
    output: &OutputManager,
) -> anyhow::Result<String> {
    match command {
        Commands::Providers => {
            output.format_providers(&[(provider.name(), provider.filter_caps())])
        }
        Commands::Search { query, filters } => {
            let results = provider
                .search(&query, &filters.to_filters())
                .await
                .with_context(|| format!("Search for {query:?} failed"))?;
            output.format_search(&results)
        }
        Commands::Episodes { identifier, lang } => {
            let episodes = provider
                .get_episodes(&identifier, lang)
                .await
                .with_context(|| format!("Failed to list episodes of {identifier}"))?;
            output.format_episodes(&episodes)
        }
        Commands::Info { identifier } => {
            let info = provider
                .get_info(&identifier)
                .await
                .with_context(|| format!("Failed to fetch info of {identifier}"))?;
            output.format_info(&info)
        }
        Commands::Video {
            identifier,
            episode,
            lang,
            quality,
        } => {
            let streams = provider
                .get_video(&identifier, episode, lang)
                .await
                .with_context(|| format!("Failed to resolve episode {episode} of {identifier}"))?;

            match quality {
                None => output.format_streams(&streams),
                Some(preference) => {
                    let stream = select_rendition(&streams, preference).with_context(|| {
                        format!("No stream matches {preference:?} among {} streams", streams.len())
                    })?;
                    output.format_streams(std::slice::from_ref(stream))
                }
            }
        }
    }
}

fn spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.enable_steady_tick(Duration::from_millis(120));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_strings(&[
            "▹▹▹▹▹", "▸▹▹▹▹", "▹▸▹▹▹", "▹▹▸▹▹", "▹▹▹▸▹", "▹▹▹▹▸", "▪▪▪▪▪",
        ]));
    }
    pb.set_message("Querying provider...");
    pb
}

fn init_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(verbose),
        )
        .init();
}
