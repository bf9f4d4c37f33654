//! Media discovery, optimization, and catalog construction.
//!
//! Walks the vault for media files and produces, for each one, resized and
//! re-encoded variants plus a catalog entry describing them. Files the
//! encoder cannot handle (vector, animated, audio, video) and files that
//! fail to encode are copied through untouched into an `original` bucket,
//! so the catalog is complete regardless of what succeeded. Processing is
//! strictly sequential; progress is reported through an injectable
//! callback.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use image::{GenericImageView as _, ImageReader};
use thiserror::Error;
use tracing::{debug, warn};

use super::catalog::{FormatVariant, MediaCatalogEntry, SourceMetadata};
use super::kinds;
use crate::vault::{VaultWalker, VaultWalkerError, WalkedFile};

/// One target output width. The suffix names the size bucket in catalogs
/// and output file names (`pic-md.webp`).
#[derive(Debug, Clone)]
pub struct SizeSpec {
    pub suffix: String,
    pub width: u32,
}

impl SizeSpec {
    pub fn new(suffix: impl Into<String>, width: u32) -> Self {
        Self { suffix: suffix.into(), width }
    }
}

/// Default responsive size ladder.
pub fn default_sizes() -> Vec<SizeSpec> {
    vec![SizeSpec::new("sm", 640), SizeSpec::new("md", 1024), SizeSpec::new("lg", 1920)]
}

/// Output encode formats, listed per run in preference order: the first
/// format becomes the first variant in each size bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeFormat {
    Webp,
    Jpeg,
    Png,
}

impl EncodeFormat {
    pub fn extension(self) -> &'static str {
        match self {
            EncodeFormat::Webp => "webp",
            EncodeFormat::Jpeg => "jpg",
            EncodeFormat::Png => "png",
        }
    }

    fn image_format(self) -> image::ImageFormat {
        match self {
            EncodeFormat::Webp => image::ImageFormat::WebP,
            EncodeFormat::Jpeg => image::ImageFormat::Jpeg,
            EncodeFormat::Png => image::ImageFormat::Png,
        }
    }
}

/// Settings for one optimization run.
#[derive(Debug, Clone)]
pub struct OptimizeOptions {
    /// Folder that receives the generated files.
    pub output_folder: PathBuf,
    /// Rooted URL prefix for generated files, e.g. `/media`.
    pub path_prefix: String,
    /// Base for absolute URLs, e.g. `https://example.com`. When set, every
    /// variant also carries an absolute public path.
    pub domain: Option<String>,
    /// Target sizes; empty means copy-through only.
    pub sizes: Vec<SizeSpec>,
    /// Target formats in preference order.
    pub formats: Vec<EncodeFormat>,
    /// Generate resized variants. When false everything is copied through.
    pub optimize: bool,
    /// Do not rewrite output files that already exist.
    pub skip_existing: bool,
    /// Rewrite output files even when they already exist.
    pub force_reprocess: bool,
}

impl Default for OptimizeOptions {
    fn default() -> Self {
        Self {
            output_folder: PathBuf::from("media-out"),
            path_prefix: "/media".to_string(),
            domain: None,
            sizes: default_sizes(),
            formats: vec![EncodeFormat::Webp, EncodeFormat::Jpeg],
            optimize: true,
            skip_existing: false,
            force_reprocess: false,
        }
    }
}

/// Progress report for one media file, emitted before it is processed.
#[derive(Debug)]
pub struct MediaProgress<'a> {
    pub index: usize,
    pub total: usize,
    pub path: &'a Path,
}

/// Errors that abort the whole media run. Per-file failures are logged and
/// absorbed into copy-through entries instead.
#[derive(Debug, Error)]
pub enum MediaOptimizeError {
    #[error(transparent)]
    Walk(#[from] VaultWalkerError),

    #[error("failed to create media output folder {path}: {source}")]
    OutputFolder {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The catalog and path map produced by one run.
#[derive(Debug, Default)]
pub struct MediaPipelineOutput {
    pub media_data: Vec<MediaCatalogEntry>,
    /// Original relative path (as found on disk) to the single
    /// best-preference output path.
    pub path_map: HashMap<String, String>,
}

/// Run the optimization pipeline over a vault. Files are processed one at
/// a time in walk order; the catalog gets an entry for every discovered
/// media file no matter what happened to its bytes.
pub fn optimize_vault_media(
    vault_root: &Path,
    options: &OptimizeOptions,
    progress: Option<&dyn Fn(&MediaProgress<'_>)>,
) -> Result<MediaPipelineOutput, MediaOptimizeError> {
    let walker = VaultWalker::new(vault_root)?;
    let files = walker.walk_media()?;

    fs::create_dir_all(&options.output_folder).map_err(|source| {
        MediaOptimizeError::OutputFolder { path: options.output_folder.clone(), source }
    })?;

    let total = files.len();
    let mut media_data = Vec::with_capacity(total);
    let mut path_map = HashMap::new();

    for (index, file) in files.iter().enumerate() {
        if let Some(report) = progress {
            report(&MediaProgress { index, total, path: &file.relative_path });
        }

        let entry = process_media_file(file, options);
        if let Some(best) = best_public_path(&entry) {
            path_map.insert(entry.original_relative_path.clone(), best);
        }
        media_data.push(entry);
    }

    Ok(MediaPipelineOutput { media_data, path_map })
}

/// Process one media file into a catalog entry. Never fails: encode and
/// copy problems degrade the entry instead of propagating.
fn process_media_file(file: &WalkedFile, options: &OptimizeOptions) -> MediaCatalogEntry {
    let extension = kinds::extension(&file.relative_path).unwrap_or_default();
    let mut entry = MediaCatalogEntry {
        original_relative_path: file.relative_str(),
        file_name: file.file_name(),
        file_extension: extension.clone(),
        mime_type: kinds::mime_type(&extension).to_string(),
        size_variants: Default::default(),
        source_metadata: SourceMetadata { width: None, height: None, byte_size: file.size },
    };

    if options.optimize && kinds::is_encodable(&extension) {
        encode_variants(file, &mut entry, options);
    }

    // Every entry keeps an `original` bucket with the untouched bytes,
    // both as the last-resort size preference and as the fallback when no
    // variant could be generated.
    copy_through(file, &mut entry, options);

    entry
}

/// Generate resized variants for a decodable image. Failures are caught
/// per variant attempt and logged; whatever succeeded stays in the entry.
fn encode_variants(file: &WalkedFile, entry: &mut MediaCatalogEntry, options: &OptimizeOptions) {
    let source = match ImageReader::open(&file.absolute_path)
        .and_then(|r| r.with_guessed_format())
    {
        Ok(reader) => match reader.decode() {
            Ok(img) => img,
            Err(err) => {
                warn!(
                    path = %file.relative_path.display(),
                    "decode failed, falling back to original: {err}"
                );
                return;
            }
        },
        Err(err) => {
            warn!(
                path = %file.relative_path.display(),
                "read failed, falling back to original: {err}"
            );
            return;
        }
    };

    entry.source_metadata.width = Some(source.width());
    entry.source_metadata.height = Some(source.height());

    for size in &options.sizes {
        // Never upscale; small sources keep their dimensions.
        let target_width = size.width.min(source.width());
        let target_height = ((u64::from(source.height()) * u64::from(target_width))
            / u64::from(source.width().max(1)))
        .max(1) as u32;

        let resized = if target_width == source.width() {
            source.clone()
        } else {
            source.resize(target_width, target_height, FilterType::Lanczos3)
        };

        for format in &options.formats {
            match write_variant(&resized, file, size, *format, options) {
                Ok(variant) => {
                    entry.size_variants.entry(size.suffix.clone()).or_default().push(variant);
                }
                Err(err) => {
                    warn!(
                        path = %file.relative_path.display(),
                        size = %size.suffix,
                        format = format.extension(),
                        "variant encode failed: {err}"
                    );
                }
            }
        }
    }
}

#[derive(Debug, Error)]
enum VariantError {
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("encode error on {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Encode one resized image into one output format, honoring the
/// skip-existing / force flags for the byte write only.
fn write_variant(
    resized: &image::DynamicImage,
    file: &WalkedFile,
    size: &SizeSpec,
    format: EncodeFormat,
    options: &OptimizeOptions,
) -> Result<FormatVariant, VariantError> {
    let stem = file
        .relative_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "media".to_string());

    let out_name = format!("{stem}-{}.{}", size.suffix, format.extension());
    let out_rel = file.relative_path.parent().unwrap_or(Path::new("")).join(&out_name);
    let out_abs = options.output_folder.join(&out_rel);

    if let Some(parent) = out_abs.parent() {
        fs::create_dir_all(parent)
            .map_err(|source| VariantError::Io { path: parent.to_path_buf(), source })?;
    }

    let skip = options.skip_existing && !options.force_reprocess && out_abs.exists();
    if skip {
        debug!(path = %out_abs.display(), "variant exists, skipping rewrite");
    } else {
        let result = match format {
            // JPEG cannot carry an alpha channel.
            EncodeFormat::Jpeg => resized
                .to_rgb8()
                .save_with_format(&out_abs, format.image_format()),
            _ => resized.save_with_format(&out_abs, format.image_format()),
        };
        result.map_err(|source| VariantError::Encode { path: out_abs.clone(), source })?;
    }

    let byte_size = fs::metadata(&out_abs).map(|m| m.len()).unwrap_or(0);
    let public_path = public_path(&options.path_prefix, &out_rel);

    Ok(FormatVariant {
        width: resized.width(),
        height: resized.height(),
        format: format.extension().to_string(),
        absolute_public_path: absolute_path(options.domain.as_deref(), &public_path),
        public_path,
        byte_size,
    })
}

/// Copy the source bytes into the output tree and record them as the
/// `original` bucket. On failure the entry simply ends up without the
/// bucket and resolution degrades to the placeholder.
fn copy_through(file: &WalkedFile, entry: &mut MediaCatalogEntry, options: &OptimizeOptions) {
    let out_abs = options.output_folder.join(&file.relative_path);

    if let Some(parent) = out_abs.parent() {
        if let Err(err) = fs::create_dir_all(parent) {
            warn!(path = %parent.display(), "cannot create media folder: {err}");
            return;
        }
    }

    let skip = options.skip_existing && !options.force_reprocess && out_abs.exists();
    if !skip {
        if let Err(err) = fs::copy(&file.absolute_path, &out_abs) {
            warn!(
                path = %file.relative_path.display(),
                "copy-through failed, entry will have no original bucket: {err}"
            );
            return;
        }
    }

    let byte_size = fs::metadata(&out_abs).map(|m| m.len()).unwrap_or(file.size);
    let public_path = public_path(&options.path_prefix, &file.relative_path);

    entry.size_variants.insert(
        "original".to_string(),
        vec![FormatVariant {
            width: entry.source_metadata.width.unwrap_or(0),
            height: entry.source_metadata.height.unwrap_or(0),
            format: entry.file_extension.clone(),
            absolute_public_path: absolute_path(options.domain.as_deref(), &public_path),
            public_path,
            byte_size,
        }],
    );
}

/// Best-preference output for the path map: smallest generated size first,
/// original last; within a bucket the first (preferred-format) variant.
fn best_public_path(entry: &MediaCatalogEntry) -> Option<String> {
    for label in ["sm", "md", "lg", "original"] {
        if let Some(variant) = entry.size_variants.get(label).and_then(|v| v.first()) {
            return Some(variant.public_path.clone());
        }
    }
    None
}

/// Rooted public path: prefix + relative structure + file name.
fn public_path(prefix: &str, relative: &Path) -> String {
    let rel = relative.to_string_lossy().replace('\\', "/");
    format!("{}/{}", prefix.trim_end_matches('/'), rel)
}

fn absolute_path(domain: Option<&str>, public_path: &str) -> Option<String> {
    domain.map(|d| format!("{}{}", d.trim_end_matches('/'), public_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn copy_only_options(out: &Path) -> OptimizeOptions {
        OptimizeOptions {
            output_folder: out.to_path_buf(),
            optimize: false,
            ..OptimizeOptions::default()
        }
    }

    #[test]
    fn copy_through_builds_complete_catalog() {
        let vault = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        fs::create_dir(vault.path().join("attachments")).unwrap();
        fs::write(vault.path().join("attachments/pic.png"), b"not a real png").unwrap();
        fs::write(vault.path().join("clip.mp4"), b"not a real video").unwrap();

        let output = optimize_vault_media(
            vault.path(),
            &copy_only_options(out.path()),
            None,
        )
        .unwrap();

        assert_eq!(output.media_data.len(), 2);

        let pic = output
            .media_data
            .iter()
            .find(|e| e.file_name == "pic.png")
            .unwrap();
        assert_eq!(pic.original_relative_path, "attachments/pic.png");
        assert_eq!(pic.mime_type, "image/png");
        let original = &pic.size_variants["original"][0];
        assert_eq!(original.public_path, "/media/attachments/pic.png");
        assert_eq!(original.byte_size, 14);

        assert!(out.path().join("attachments/pic.png").exists());
        assert_eq!(
            output.path_map["attachments/pic.png"],
            "/media/attachments/pic.png"
        );
    }

    #[test]
    fn undecodable_image_falls_back_to_original_bucket() {
        let vault = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        fs::write(vault.path().join("broken.png"), b"garbage").unwrap();

        let options = OptimizeOptions {
            output_folder: out.path().to_path_buf(),
            optimize: true,
            ..OptimizeOptions::default()
        };
        let output = optimize_vault_media(vault.path(), &options, None).unwrap();

        let entry = &output.media_data[0];
        assert!(entry.size_variants.contains_key("original"));
        assert!(!entry.size_variants.contains_key("md"));
        assert_eq!(output.path_map["broken.png"], "/media/broken.png");
    }

    #[test]
    fn skip_existing_keeps_catalog_complete() {
        let vault = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        fs::write(vault.path().join("pic.png"), b"v1").unwrap();

        let mut options = copy_only_options(out.path());
        optimize_vault_media(vault.path(), &options, None).unwrap();

        // Grow the source, then run again with skip_existing: bytes stay,
        // catalog entry still produced.
        fs::write(vault.path().join("pic.png"), b"version two").unwrap();
        options.skip_existing = true;
        let output = optimize_vault_media(vault.path(), &options, None).unwrap();

        assert_eq!(output.media_data.len(), 1);
        let original = &output.media_data[0].size_variants["original"][0];
        assert_eq!(original.byte_size, 2, "existing output must not be rewritten");

        // force_reprocess overrides the skip
        options.force_reprocess = true;
        let output = optimize_vault_media(vault.path(), &options, None).unwrap();
        let original = &output.media_data[0].size_variants["original"][0];
        assert_eq!(original.byte_size, 11);
    }

    #[test]
    fn progress_reports_every_file_in_order() {
        let vault = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        fs::write(vault.path().join("a.png"), b"a").unwrap();
        fs::write(vault.path().join("b.png"), b"b").unwrap();

        let seen = std::cell::RefCell::new(Vec::new());
        let report = |p: &MediaProgress<'_>| {
            seen.borrow_mut().push((p.index, p.total, p.path.to_path_buf()));
        };

        optimize_vault_media(vault.path(), &copy_only_options(out.path()), Some(&report))
            .unwrap();

        let seen = seen.into_inner();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].0, 0);
        assert_eq!(seen[1].0, 1);
        assert!(seen.iter().all(|(_, total, _)| *total == 2));
        assert_eq!(seen[0].2, PathBuf::from("a.png"));
    }

    #[test]
    fn domain_produces_absolute_paths() {
        let vault = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        fs::write(vault.path().join("pic.png"), b"x").unwrap();

        let options = OptimizeOptions {
            output_folder: out.path().to_path_buf(),
            domain: Some("https://example.com/".to_string()),
            optimize: false,
            ..OptimizeOptions::default()
        };
        let output = optimize_vault_media(vault.path(), &options, None).unwrap();

        let original = &output.media_data[0].size_variants["original"][0];
        assert_eq!(
            original.absolute_public_path.as_deref(),
            Some("https://example.com/media/pic.png")
        );
    }

    #[test]
    fn best_path_prefers_smallest_generated_size() {
        let mut entry = MediaCatalogEntry {
            original_relative_path: "pic.png".into(),
            file_name: "pic.png".into(),
            file_extension: "png".into(),
            mime_type: "image/png".into(),
            size_variants: Default::default(),
            source_metadata: SourceMetadata::default(),
        };
        let variant = |path: &str| FormatVariant {
            width: 1,
            height: 1,
            format: "webp".into(),
            public_path: path.into(),
            absolute_public_path: None,
            byte_size: 0,
        };
        entry.size_variants.insert("lg".into(), vec![variant("/m/pic-lg.webp")]);
        entry.size_variants.insert("original".into(), vec![variant("/m/pic.png")]);
        assert_eq!(best_public_path(&entry).as_deref(), Some("/m/pic-lg.webp"));

        entry.size_variants.insert("sm".into(), vec![variant("/m/pic-sm.webp")]);
        assert_eq!(best_public_path(&entry).as_deref(), Some("/m/pic-sm.webp"));
    }
}
