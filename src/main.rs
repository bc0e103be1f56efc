use std::io;
use std::path::PathBuf;

use eyre::{Result, WrapErr, bail};
use log::{info, warn};

use ytblocks::config::{Config, Settings};
use ytblocks::host::{MemoryHost, Severity, echo_message};
use ytblocks::outline::OutlineHost;
use ytblocks::pipeline::{Outcome, get_captions};
use ytblocks::youtube::YouTubeCaptions;

mod cli;

use cli::{Cli, OutputFormat};

/// Id of the single block print mode runs against
const INPUT_BLOCK: &str = "input";

fn setup_logging() -> Result<()> {
    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir)?;
    let log_file = log_dir.join("ytblocks.log");

    let target = Box::new(std::fs::OpenOptions::new().create(true).append(true).open(&log_file)?);

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized: {}", log_file.display());
    Ok(())
}

fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ytblocks")
        .join("logs")
}

fn build_after_help() -> String {
    let config_path = ytblocks::config::config_path();
    let config_line = if config_path.exists() {
        format!("  \x1b[32m✅\x1b[0m {}", config_path.display())
    } else {
        format!("  \x1b[33m-\x1b[0m {} (not present, using defaults)", config_path.display())
    };

    let log_path = log_dir().join("ytblocks.log");

    format!(
        "\nCONFIG:\n{config_line}\n\nLogs are written to: {}",
        log_path.display()
    )
}

fn print_summary(outcome: &Outcome) {
    match outcome {
        Outcome::Inserted {
            language,
            blocks,
            failures,
        } => {
            eprintln!(
                "Language: {language}\nBlocks: {}\nFailed languages: {}",
                blocks.len(),
                failures.len()
            );
        }
        Outcome::NoIdentifier => eprintln!("Result: no video found"),
        Outcome::NoCaptions { video_id, failures } => {
            eprintln!("Result: no captions for {video_id} ({} failed languages)", failures.len());
        }
        Outcome::Failed { message } => eprintln!("Result: failed: {message}"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging()?;

    let after_help = build_after_help();
    let cmd = <Cli as clap::CommandFactory>::command().after_help(after_help);
    let matches = cmd.get_matches();
    let cli = <Cli as clap::FromArgMatches>::from_arg_matches(&matches)?;

    // Load config file (non-fatal if invalid)
    let config = Config::load().unwrap_or_else(|e| {
        warn!("Ignoring config: {e:#}");
        echo_message(&format!("ignoring config: {e:#}"), Severity::Warning);
        Config::default()
    });
    let settings = Settings::resolve(&config, &cli.overrides())?;

    if cli.verbose {
        let config_path = ytblocks::config::config_path();
        if config_path.exists() {
            eprintln!("Config: {}", config_path.display());
        }
        eprintln!(
            "Languages: {}\nBlock size: {}\nTimestamps: {}\nIndent: {}",
            settings.languages.join(","),
            settings.packing.max_block_chars,
            settings.packing.include_timestamps,
            settings.packing.indent_under_source,
        );
    }

    let source = YouTubeCaptions::new(reqwest::Client::new());

    let outcome = if let (Some(page), Some(block)) = (&cli.page, &cli.block) {
        let mut host = OutlineHost::open(page).await?;
        let outcome = get_captions(&mut host, &source, block, &settings).await;
        if let Outcome::Inserted { blocks, .. } = &outcome {
            eprintln!("Inserted {} blocks into {}", blocks.len(), page.display());
        }
        outcome
    } else {
        let text = match &cli.text {
            Some(text) => text.clone(),
            None => io::read_to_string(io::stdin()).wrap_err("failed to read stdin")?,
        };
        if text.trim().is_empty() {
            bail!("no URL or video ID provided\n\nUsage: ytblocks <TEXT>\n       echo <TEXT> | ytblocks");
        }

        let mut host = MemoryHost::with_block(INPUT_BLOCK, text.clone()).echo(true);
        let outcome = get_captions(&mut host, &source, INPUT_BLOCK, &settings).await;

        if let Outcome::Inserted { blocks, .. } = &outcome {
            let rendered = match cli.format {
                OutputFormat::Text => ytblocks::output::render_text(blocks),
                OutputFormat::Json => ytblocks::output::render_json(blocks),
                OutputFormat::Outline => {
                    ytblocks::output::render_outline(&text, blocks, settings.packing.indent_under_source)
                }
            };

            if let Some(ref path) = cli.output {
                std::fs::write(path, &rendered)?;
                if cli.verbose {
                    eprintln!("Output written to: {}", path.display());
                }
            } else {
                println!("{rendered}");
            }
        }
        outcome
    };

    if cli.verbose {
        print_summary(&outcome);
    }

    if !outcome.is_inserted() {
        std::process::exit(1);
    }

    Ok(())
}
