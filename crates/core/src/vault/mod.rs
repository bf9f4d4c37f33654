//! Vault discovery.
//!
//! A vault is a plain directory tree of markdown notes plus the media they
//! embed. The walker produces deterministic, vault-relative listings of
//! both, which the rest of the pipeline consumes.

pub mod walker;

pub use walker::{VaultWalker, VaultWalkerError, WalkedFile};
