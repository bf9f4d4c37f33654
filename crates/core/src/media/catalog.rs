//! Media catalog records and lookup indexes.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// One generated size/format variant of a source media file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatVariant {
    pub width: u32,
    pub height: u32,
    /// Output format, e.g. "webp" or the source extension for copied files.
    pub format: String,
    /// Rooted public path: prefix + relative structure + file name.
    pub public_path: String,
    /// Absolute URL when a domain was configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub absolute_public_path: Option<String>,
    pub byte_size: u64,
}

/// Dimensions and size of the untouched source file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    pub byte_size: u64,
}

/// The record of all generated size/format variants for one source media
/// file. Created by the optimization pipeline, immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaCatalogEntry {
    /// Vault-relative source path with forward slashes.
    pub original_relative_path: String,
    pub file_name: String,
    pub file_extension: String,
    pub mime_type: String,
    /// Variants per size label; each list is ordered by format preference,
    /// first entry is the best choice.
    pub size_variants: BTreeMap<String, Vec<FormatVariant>>,
    pub source_metadata: SourceMetadata,
}

impl MediaCatalogEntry {
    /// Whether any variant was produced for this entry.
    pub fn has_variants(&self) -> bool {
        self.size_variants.values().any(|v| !v.is_empty())
    }
}

/// Lookup tables over a catalog, built once per run and handed to the
/// resolution engine. Keys are lowercased; on duplicate keys the first
/// entry in catalog order wins.
#[derive(Debug, Default)]
pub struct MediaIndex {
    by_path: HashMap<String, usize>,
    by_name: HashMap<String, usize>,
}

impl MediaIndex {
    /// Build the path and name indexes for the given catalog.
    pub fn build(entries: &[MediaCatalogEntry]) -> Self {
        let mut by_path = HashMap::new();
        let mut by_name = HashMap::new();

        for (i, entry) in entries.iter().enumerate() {
            by_path.entry(entry.original_relative_path.to_lowercase()).or_insert(i);

            let name_key = entry.file_name.to_lowercase();
            by_name.entry(name_key.clone()).or_insert(i);

            // The stored file name can differ from the path's basename
            // (renamed outputs); index the basename as a secondary key.
            let path_base = basename(&entry.original_relative_path).to_lowercase();
            if path_base != name_key {
                by_name.entry(path_base).or_insert(i);
            }
        }

        Self { by_path, by_name }
    }

    /// Look up an entry index for a raw embed value. Probes the path index
    /// with the normalized value, then the name index with the normalized
    /// value, then the name index with the normalized value's basename.
    pub fn lookup(&self, raw: &str) -> Option<usize> {
        let normalized = raw.to_lowercase();
        if let Some(&i) = self.by_path.get(&normalized) {
            return Some(i);
        }
        if let Some(&i) = self.by_name.get(&normalized) {
            return Some(i);
        }
        self.by_name.get(basename(&normalized)).copied()
    }
}

/// Final path segment of a slash- or backslash-separated path.
pub(crate) fn basename(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(path: &str, name: &str) -> MediaCatalogEntry {
        MediaCatalogEntry {
            original_relative_path: path.to_string(),
            file_name: name.to_string(),
            file_extension: "png".to_string(),
            mime_type: "image/png".to_string(),
            size_variants: BTreeMap::new(),
            source_metadata: SourceMetadata::default(),
        }
    }

    #[test]
    fn lookup_by_path_then_name() {
        let entries =
            vec![entry("img/a.png", "a.png"), entry("img/b.png", "b.png")];
        let index = MediaIndex::build(&entries);

        assert_eq!(index.lookup("img/a.png"), Some(0));
        assert_eq!(index.lookup("IMG/A.PNG"), Some(0));
        assert_eq!(index.lookup("b.png"), Some(1));
        assert_eq!(index.lookup("deep/path/b.png"), Some(1));
        assert_eq!(index.lookup("missing.png"), None);
    }

    #[test]
    fn secondary_basename_key_when_names_differ() {
        let entries = vec![entry("img/original-name.png", "renamed.png")];
        let index = MediaIndex::build(&entries);

        assert_eq!(index.lookup("renamed.png"), Some(0));
        assert_eq!(index.lookup("original-name.png"), Some(0));
    }

    #[test]
    fn first_entry_wins_on_duplicate_names() {
        let entries = vec![entry("a/pic.png", "pic.png"), entry("b/pic.png", "pic.png")];
        let index = MediaIndex::build(&entries);

        assert_eq!(index.lookup("pic.png"), Some(0));
        assert_eq!(index.lookup("b/pic.png"), Some(1));
    }

    #[test]
    fn basename_handles_separators() {
        assert_eq!(basename("a/b/c.png"), "c.png");
        assert_eq!(basename("a\\b\\c.png"), "c.png");
        assert_eq!(basename("c.png"), "c.png");
    }
}
