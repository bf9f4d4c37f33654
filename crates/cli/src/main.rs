mod logging;

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use tracing::info;

use vaultpub_core::media::{DEFAULT_PLACEHOLDER, MediaOptions, MediaProgress, OptimizeOptions};
use vaultpub_core::publish::{PublishOptions, publish_vault};

#[derive(Debug, Parser)]
#[command(
    name = "vaultpub",
    version,
    about = "Publish an Obsidian vault as a structured JSON dataset"
)]
struct Cli {
    /// Vault directory to publish
    #[arg(short, long)]
    input: PathBuf,

    /// Output JSON file for page results
    #[arg(short, long)]
    output: PathBuf,

    /// URL prefix for note links
    #[arg(long, default_value = "/notes")]
    path_prefix: String,

    /// URL prefix for optimized media files
    #[arg(long, default_value = "/media")]
    media_prefix: String,

    /// Debug verbosity (0 = errors only, 3 = trace)
    #[arg(short = 'd', long, default_value_t = 1)]
    debug: u8,

    /// Folder that receives optimized media files
    #[arg(long, default_value = "media-out")]
    media_folder: PathBuf,

    /// Generate resized and re-encoded media variants
    #[arg(long)]
    optimize_media: bool,

    /// Skip the media pipeline entirely
    #[arg(long)]
    skip_media: bool,

    /// Keep media output files that already exist instead of rewriting them
    #[arg(long)]
    skip_existing: bool,

    /// Rewrite media output files even when they already exist
    #[arg(long)]
    force_reprocess: bool,

    /// Domain for absolute media URLs, e.g. https://example.com
    #[arg(long)]
    domain: Option<String>,

    /// Optional output JSON file for the media catalog and path map
    #[arg(long)]
    media_results: Option<PathBuf>,

    /// Preferred media size variant for embeds
    #[arg(long, default_value = "md")]
    preferred_size: String,

    /// Placeholder image substituted for unresolved embeds
    #[arg(long, default_value = DEFAULT_PLACEHOLDER)]
    placeholder: String,

    /// Folders (relative to the vault root) to exclude from publishing
    #[arg(long)]
    exclude: Vec<PathBuf>,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    logging::init(cli.debug);

    let options = PublishOptions {
        vault_root: cli.input.clone(),
        note_prefix: cli.path_prefix.clone(),
        excluded_folders: cli.exclude.clone(),
        skip_media: cli.skip_media,
        optimize: OptimizeOptions {
            output_folder: cli.media_folder.clone(),
            path_prefix: cli.media_prefix.clone(),
            domain: cli.domain.clone(),
            optimize: cli.optimize_media,
            skip_existing: cli.skip_existing,
            force_reprocess: cli.force_reprocess,
            ..OptimizeOptions::default()
        },
        resolver: MediaOptions {
            preferred_size: cli.preferred_size.clone(),
            use_absolute_paths: cli.domain.is_some(),
            placeholder: cli.placeholder.clone(),
        },
    };

    let progress = |p: &MediaProgress<'_>| {
        info!(
            "media {}/{}: {}",
            p.index + 1,
            p.total,
            p.path.display()
        );
    };

    let output = publish_vault(&options, Some(&progress))
        .wrap_err_with(|| format!("failed to publish vault {}", cli.input.display()))?;

    let pages_json = serde_json::to_string_pretty(&output.pages)
        .wrap_err("failed to serialize page results")?;
    fs::write(&cli.output, pages_json)
        .wrap_err_with(|| format!("failed to write {}", cli.output.display()))?;
    info!(pages = output.pages.len(), output = %cli.output.display(), "wrote page results");

    if let Some(path) = &cli.media_results {
        let media_json = serde_json::to_string_pretty(&serde_json::json!({
            "mediaData": output.media_data,
            "mediaPathMap": output.media_path_map,
        }))
        .wrap_err("failed to serialize media results")?;
        fs::write(path, media_json)
            .wrap_err_with(|| format!("failed to write {}", path.display()))?;
        info!(output = %path.display(), "wrote media results");
    }

    Ok(())
}
