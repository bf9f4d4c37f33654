//! Vault orchestration.
//!
//! Drives one full publishing run: discovery, visibility resolution, the
//! media pipeline, and the per-note document pipeline, in that order.
//! Only conditions that make the whole run meaningless (missing vault
//! root, unwritable output) surface as errors; per-note and per-media
//! failures are logged and skipped.

use std::collections::HashMap;
use std::path::PathBuf;

use thiserror::Error;
use tracing::{info, warn};

use crate::document::{DocumentPipeline, PageResult};
use crate::media::{
    MediaCatalogEntry, MediaOptimizeError, MediaOptions, MediaPipelineOutput, MediaProgress,
    MediaResolver, OptimizeOptions, optimize_vault_media,
};
use crate::vault::{VaultWalker, VaultWalkerError};
use crate::visibility::AllowSet;

/// Settings for one publishing run.
#[derive(Debug, Clone)]
pub struct PublishOptions {
    pub vault_root: PathBuf,
    /// URL prefix for note links, e.g. `/notes`.
    pub note_prefix: String,
    /// Folders (relative to the vault root) excluded from discovery.
    pub excluded_folders: Vec<PathBuf>,
    /// Skip the media pipeline entirely; embeds then resolve to
    /// placeholders.
    pub skip_media: bool,
    /// Media optimization settings.
    pub optimize: OptimizeOptions,
    /// Media resolution settings.
    pub resolver: MediaOptions,
}

impl Default for PublishOptions {
    fn default() -> Self {
        Self {
            vault_root: PathBuf::new(),
            note_prefix: "/notes".to_string(),
            excluded_folders: Vec::new(),
            skip_media: false,
            optimize: OptimizeOptions::default(),
            resolver: MediaOptions::default(),
        }
    }
}

/// Everything one run produces.
#[derive(Debug, Default)]
pub struct PublishOutput {
    /// Page records in traversal order.
    pub pages: Vec<PageResult>,
    pub media_data: Vec<MediaCatalogEntry>,
    pub media_path_map: HashMap<String, String>,
}

#[derive(Debug, Error)]
pub enum PublishError {
    #[error(transparent)]
    Walk(#[from] VaultWalkerError),

    #[error(transparent)]
    Media(#[from] MediaOptimizeError),
}

/// Run one full publish over a vault.
pub fn publish_vault(
    options: &PublishOptions,
    progress: Option<&dyn Fn(&MediaProgress<'_>)>,
) -> Result<PublishOutput, PublishError> {
    let walker = VaultWalker::with_exclusions(
        &options.vault_root,
        options.excluded_folders.clone(),
    )?;
    let notes = walker.walk_notes()?;
    info!(notes = notes.len(), "discovered markdown notes");

    let allow = AllowSet::build(&notes);
    info!(public = allow.len(), "resolved visibility");

    let media = if options.skip_media {
        MediaPipelineOutput::default()
    } else {
        optimize_vault_media(&options.vault_root, &options.optimize, progress)?
    };
    if !options.skip_media {
        info!(media = media.media_data.len(), "cataloged media files");
    }

    let resolver =
        MediaResolver::new(&media.media_data, &media.path_map, options.resolver.clone());
    let pipeline = DocumentPipeline::new(&allow, &resolver, &options.note_prefix);

    let mut pages = Vec::new();
    for note in &notes {
        if !allow.contains_path(&note.absolute_path) {
            continue;
        }
        match pipeline.process(note) {
            Ok(page) => pages.push(page),
            Err(err) => {
                warn!(path = %note.relative_path.display(), "skipping note: {err}");
            }
        }
    }
    info!(pages = pages.len(), "rendered pages");

    Ok(PublishOutput {
        pages,
        media_data: media.media_data,
        media_path_map: media.path_map,
    })
}
