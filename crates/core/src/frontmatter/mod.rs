//! Frontmatter parsing.
//!
//! Notes carry optional YAML frontmatter delimited by `---` lines. The
//! publisher reads it for the `public` visibility flag and passes the rest
//! through verbatim into the output records.

pub mod parser;
pub mod types;

pub use parser::{FrontmatterParseError, parse};
pub use types::{Frontmatter, ParsedDocument};
