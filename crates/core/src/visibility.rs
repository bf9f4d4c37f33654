//! Vault visibility resolution.
//!
//! Scans note frontmatter for the boolean `public` field and collects the
//! allow set: the notes eligible as output pages and link targets. Built
//! once per run, read-only during link resolution.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::frontmatter;
use crate::vault::WalkedFile;

/// The set of notes marked public. Holds both the absolute paths and the
/// derived name-only set (directory and extension stripped) used by the
/// link visibility gate.
#[derive(Debug, Clone, Default)]
pub struct AllowSet {
    paths: HashSet<PathBuf>,
    names: HashSet<String>,
}

impl AllowSet {
    /// Build the allow set by scanning the frontmatter of every discovered
    /// note. Unreadable files and malformed frontmatter are logged and
    /// skipped; scanning never fails.
    pub fn build(notes: &[WalkedFile]) -> Self {
        let mut set = AllowSet::default();

        for note in notes {
            let content = match std::fs::read_to_string(&note.absolute_path) {
                Ok(content) => content,
                Err(err) => {
                    warn!(
                        path = %note.relative_path.display(),
                        "skipping unreadable note: {err}"
                    );
                    continue;
                }
            };

            match frontmatter::parse(&content) {
                Ok(doc) => {
                    let public =
                        doc.frontmatter.map(|fm| fm.is_public()).unwrap_or(false);
                    if public {
                        set.insert_path(note.absolute_path.clone());
                    }
                }
                Err(err) => {
                    warn!(
                        path = %note.relative_path.display(),
                        "skipping note with malformed frontmatter: {err}"
                    );
                }
            }
        }

        set
    }

    /// Add a note path, deriving its name-only key.
    pub fn insert_path(&mut self, path: PathBuf) {
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            self.names.insert(stem.to_string());
        }
        self.paths.insert(path);
    }

    /// Add a bare page name. Mostly useful for tests of the link gate.
    pub fn insert_name(&mut self, name: String) {
        self.names.insert(name);
    }

    /// Whether the given absolute path is publishable.
    pub fn contains_path(&self, path: &Path) -> bool {
        self.paths.contains(path)
    }

    /// Whether a page name (directory and extension already stripped) is
    /// publishable. This is the link visibility gate.
    pub fn contains_name(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Number of publishable notes.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}
