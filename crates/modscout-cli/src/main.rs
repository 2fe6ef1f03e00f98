use anyhow::{bail, Context};
use clap::Parser;
use modscout_core::{
    loader, Config, ExportFormat, Exporter, FavoritesDocument, Report, RunMetadata,
};
use modscout_scrape::{extract_favorites, scrape_favorites, FavoritesClient};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "modscout")]
#[command(version, about = "Sort saved mod favorites into a categorized report", long_about = None)]
struct Cli {
    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Game version an entry must support to count as compatible
    #[arg(long, global = true, env = "MODSCOUT_TARGET_VERSION")]
    target_version: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Build a report from a favorites JSON document
    Categorize {
        /// Favorites document to read
        #[arg(default_value = "favorites-data.json")]
        input: PathBuf,
        /// Report file to write
        #[arg(default_value = "curseforge-favorites.md")]
        output: PathBuf,
        /// Output format (guessed from the extension when omitted)
        #[arg(long, value_enum)]
        format: Option<FormatArg>,
    },
    /// Fetch a member's favorites page and build a report from it
    Scrape {
        /// Member whose favorites to fetch (falls back to source.username)
        #[arg(long)]
        user: Option<String>,
        /// Report file to write
        #[arg(long, short, default_value = "curseforge-favorites.md")]
        output: PathBuf,
        /// Also save the scraped entries as a favorites document
        #[arg(long)]
        save_json: Option<PathBuf>,
        #[arg(long, value_enum)]
        format: Option<FormatArg>,
    },
    /// Turn a saved favorites page into a favorites JSON document
    Extract {
        /// Saved HTML of the favorites page
        html: PathBuf,
        /// Favorites document to write
        #[arg(long, short, default_value = "favorites-data.json")]
        output: PathBuf,
        /// Member name recorded in the document metadata
        #[arg(long)]
        user: Option<String>,
    },
    /// List the keyword categories in evaluation order
    Categories,
    /// Write a config file with every default spelled out
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum FormatArg {
    Md,
    Json,
}

impl From<FormatArg> for ExportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Md => ExportFormat::Markdown,
            FormatArg::Json => ExportFormat::Json,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries the run summary
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "modscout=info,modscout_core=info,modscout_scrape=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Categorize {
            input,
            output,
            format,
        } => {
            let loaded = loader::load_document(&input, &config.source.base_url)
                .with_context(|| format!("Failed to load favorites from {}", input.display()))?;

            report_dropped(loaded.dropped_count());
            let report = Report::build(loaded.items, &config, loaded.metadata)
                .with_skipped(loaded.dropped.len());
            write_report(&report, &config, &output, format)?;

            println!();
            println!("Categories used:");
            for label in report.category_labels() {
                println!("  - {}", label);
            }
        }
        Commands::Scrape {
            user,
            output,
            save_json,
            format,
        } => {
            let Some(username) = user.or_else(|| config.source.username.clone()) else {
                bail!("No member given. Pass --user or set source.username in the config");
            };

            let client = FavoritesClient::new(
                &config.source.base_url,
                &config.source.user_agent,
                config.source.timeout_secs,
            )?;
            let records = scrape_favorites(&client, &username, &config.source.base_url)
                .await
                .with_context(|| format!("Failed to fetch favorites for {}", username))?;

            let metadata = run_metadata(&config, Some(username));
            if let Some(path) = save_json {
                save_document(
                    &FavoritesDocument {
                        metadata: Some(metadata.clone()),
                        favorites: records.clone(),
                    },
                    &path,
                )?;
            }

            let (items, dropped) = loader::normalize_raw_records(records, &config.source.base_url);
            report_dropped(dropped.len());
            let report = Report::build(items, &config, Some(metadata)).with_skipped(dropped.len());
            write_report(&report, &config, &output, format)?;
        }
        Commands::Extract { html, output, user } => {
            let markup = std::fs::read_to_string(&html)
                .with_context(|| format!("Failed to read {}", html.display()))?;
            let records = extract_favorites(&markup, &config.source.base_url);
            if records.is_empty() {
                bail!(
                    "Could not find any favorites in {}. The page structure may have changed.",
                    html.display()
                );
            }

            let count = records.len();
            let username = user.or_else(|| config.source.username.clone());
            save_document(
                &FavoritesDocument {
                    metadata: Some(run_metadata(&config, username)),
                    favorites: records,
                },
                &output,
            )?;
            println!("Extracted {} mods", count);
        }
        Commands::Categories => {
            for rule in config.keyword_table().rules() {
                println!("{}: {}", rule.name, rule.keywords.join(", "));
            }
        }
        Commands::InitConfig { force } => {
            let path = match &cli.config {
                Some(path) => path.clone(),
                None => Config::config_path()?,
            };
            if path.exists() && !force {
                bail!(
                    "{} already exists. Use --force to overwrite it",
                    path.display()
                );
            }
            config.save_to(&path)?;
            println!("Wrote config to {}", path.display());
        }
    }

    Ok(())
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("Failed to load config")?;

    // CLI/env beats the file
    if let Some(version) = &cli.target_version {
        config.target.game_version = version.clone();
    }
    Ok(config)
}

/// Header info for documents and reports we produce ourselves
fn run_metadata(config: &Config, username: Option<String>) -> RunMetadata {
    RunMetadata {
        username,
        modpack_version: Some(config.target.game_version.clone()),
        forge_version: Some(config.target.loader_version.clone()),
        last_updated: Some(chrono::Utc::now().format("%Y-%m-%d").to_string()),
    }
}

fn report_dropped(dropped: usize) {
    if dropped > 0 {
        println!(
            "Skipped {} record(s) missing a name or link (see log for details)",
            dropped
        );
    }
}

fn write_report(
    report: &Report,
    config: &Config,
    output: &Path,
    format: Option<FormatArg>,
) -> anyhow::Result<()> {
    match format {
        Some(format) => {
            Exporter::export_to_file_with_format(report, &config.report, output, format.into())
        }
        None => Exporter::export_to_file(report, &config.report, output),
    }
    .with_context(|| format!("Failed to write report to {}", output.display()))?;

    println!("Saved to {}", output.display());
    println!(
        "{} compatible, {} for asset reference, {} incompatible, {} unknown version",
        report.summary.compatible,
        report.summary.asset_reference,
        report.summary.incompatible,
        report.summary.unknown_version
    );
    Ok(())
}

fn save_document(document: &FavoritesDocument, path: &Path) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(document)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;

    let named = document
        .favorites
        .iter()
        .filter(|r| r.name.is_some())
        .count();
    tracing::info!(
        "Saved {} favorites ({} named) to {}",
        document.favorites.len(),
        named,
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_categorize_defaults() {
        let cli = Cli::try_parse_from(["modscout", "categorize"]).unwrap();
        match cli.command {
            Commands::Categorize {
                input,
                output,
                format,
            } => {
                assert_eq!(input, PathBuf::from("favorites-data.json"));
                assert_eq!(output, PathBuf::from("curseforge-favorites.md"));
                assert!(format.is_none());
            }
            _ => panic!("expected categorize"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "modscout",
            "categorize",
            "in.json",
            "out.json",
            "--format",
            "json",
            "--target-version",
            "1.19.2",
        ])
        .unwrap();
        assert_eq!(cli.target_version.as_deref(), Some("1.19.2"));
        assert!(matches!(
            cli.command,
            Commands::Categorize {
                format: Some(FormatArg::Json),
                ..
            }
        ));
    }

    #[test]
    fn test_target_version_override() {
        let cli = Cli::try_parse_from([
            "modscout",
            "--config",
            "/nonexistent/modscout/config.toml",
            "--target-version",
            "1.12.2",
            "categories",
        ])
        .unwrap();
        let config = load_config(&cli).unwrap();
        assert_eq!(config.target.game_version, "1.12.2");
        assert_eq!(config.target.loader, "Forge");
    }

    #[test]
    fn test_extract_requires_html_file() {
        assert!(Cli::try_parse_from(["modscout", "extract"]).is_err());
    }
}
