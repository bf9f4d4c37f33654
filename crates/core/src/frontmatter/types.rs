//! Frontmatter types and data structures.

use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::collections::BTreeMap;

/// Represents parsed YAML frontmatter from a markdown document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Frontmatter {
    /// Fields as key-value pairs.
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

impl Frontmatter {
    /// Whether the note is marked publishable via `public: true`.
    /// Absent or non-boolean values count as private.
    pub fn is_public(&self) -> bool {
        self.fields.get("public").and_then(Value::as_bool).unwrap_or(false)
    }

    /// Tags declared in the frontmatter, if any.
    pub fn tags(&self) -> Vec<String> {
        match self.fields.get("tags") {
            Some(Value::Sequence(seq)) => {
                seq.iter().filter_map(|v| v.as_str().map(str::to_string)).collect()
            }
            Some(Value::String(s)) => vec![s.clone()],
            _ => Vec::new(),
        }
    }

    /// The field map converted to JSON values, for inclusion in output
    /// records. Values that do not translate become `null`.
    pub fn to_json_map(&self) -> serde_json::Map<String, serde_json::Value> {
        self.fields
            .iter()
            .map(|(k, v)| {
                let value = serde_json::to_value(v).unwrap_or(serde_json::Value::Null);
                (k.clone(), value)
            })
            .collect()
    }
}

/// Result of splitting frontmatter from markdown.
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    /// Parsed frontmatter (if present).
    pub frontmatter: Option<Frontmatter>,
    /// The markdown body (everything after frontmatter).
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fm(yaml: &str) -> Frontmatter {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn public_flag_defaults_to_private() {
        assert!(!fm("title: Note").is_public());
        assert!(!fm("public: false").is_public());
        assert!(!fm("public: maybe").is_public());
        assert!(fm("public: true").is_public());
    }

    #[test]
    fn tags_from_sequence_and_scalar() {
        assert_eq!(fm("tags:\n  - a\n  - b").tags(), vec!["a", "b"]);
        assert_eq!(fm("tags: solo").tags(), vec!["solo"]);
        assert!(fm("title: none").tags().is_empty());
    }

    #[test]
    fn json_map_preserves_fields() {
        let map = fm("public: true\ntitle: Hello").to_json_map();
        assert_eq!(map.get("public"), Some(&serde_json::Value::Bool(true)));
        assert_eq!(map.get("title").and_then(|v| v.as_str()), Some("Hello"));
    }
}
