//! Error types shared by the menu-tree and commit pipelines.

use std::path::PathBuf;

use thiserror::Error;

use crate::contract::CollaboratorError;

/// Failures while loading or validating the TOML config.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// A `[ships]` entry names a code outside the ship table.
    #[error("Unknown ship code in [ships]: {0}")]
    UnknownShipCode(String),

    #[error("Config has no [tokens.openai] table")]
    MissingTokens,
}

/// Failures while building the menu content tree.
#[derive(Debug, Error)]
pub enum TreeError {
    /// The object listing collaborator failed; passed through untouched.
    #[error("Object listing failed: {0}")]
    Listing(#[source] CollaboratorError),

    #[error("Failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl TreeError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TreeError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Failures (and the one expected abort) of the commit assistant.
#[derive(Debug, Error)]
pub enum CommitError {
    /// Nothing is staged. This is a user-level abort, not a system failure.
    #[error("No staged changes to commit")]
    NoStagedChanges,

    #[error("Cannot use --all with path arguments")]
    ConflictingStageOptions,

    #[error("Version control operation failed: {0}")]
    Vcs(#[source] CollaboratorError),

    #[error("Chat completion failed: {0}")]
    Completion(#[source] CollaboratorError),

    #[error("Chat completion returned an empty message")]
    EmptyCompletion,

    #[error("Prompt failed: {0}")]
    Prompt(#[source] CollaboratorError),
}
