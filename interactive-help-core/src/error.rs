//! Typed error model.
//!
//! ```text
//! build time    → GraphError   (fatal to GraphBuilder::build / add_link)
//! config load   → ConfigError
//! traversal     → NavError     (fails one session, never the others)
//! ```

use crate::types::{EntryId, PageId};

/// Graph construction failures. Raised synchronously by the builder.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    #[error("{page}: trigger {trigger:?} is already used by another link")]
    DuplicateTrigger { page: PageId, trigger: String },

    #[error("{page}: trigger {trigger:?} is reserved for leaving the help")]
    ReservedTrigger { page: PageId, trigger: String },

    #[error("{page}: a page accepts at most one free-text link")]
    DuplicateFreeTextLink { page: PageId },

    #[error("{page}: all {pool_size} default triggers are already in use")]
    DefaultTriggersExhausted { page: PageId, pool_size: usize },

    #[error("{count} shortcut triggers given for {pages} pages")]
    ShortcutCountMismatch { pages: usize, count: usize },

    #[error("link must have at least one target page")]
    EmptyTargets,

    #[error("unknown page {0}")]
    UnknownPage(PageId),
}

/// Configuration loading and validation failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Failures of a running session.
#[derive(Debug, thiserror::Error)]
pub enum NavError {
    #[error("link selected target {index} but only has {len} targets")]
    SelectionOutOfRange { index: usize, len: usize },

    #[error("unknown page {0}")]
    UnknownPage(PageId),

    #[error("unknown entry link {0}")]
    UnknownEntry(EntryId),

    #[error("callback failed: {0}")]
    Callback(#[source] anyhow::Error),

    #[error("gateway failed: {0}")]
    Gateway(#[source] anyhow::Error),

    #[error("session task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
