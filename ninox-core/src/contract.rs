//! # contract: interfaces to the external collaborators
//!
//! Everything ninox does is glue around four services it does not own:
//!
//! - [`ObjectLister`]: enumerate objects in a bucket, one page at a time.
//! - [`ChatCompleter`]: send a chat prompt to a language model, get text back.
//! - [`VersionControl`]: stage paths, diff the index against `HEAD`, commit.
//! - [`Prompter`]: show notices to the user, ask yes/no, open an editor.
//!
//! The concrete clients (S3 over HTTP, the OpenAI API, libgit2, the terminal)
//! live in the `ninox` binary crate. The pipelines in this crate only see the
//! traits, which keeps them testable with the generated `mockall` mocks.
//!
//! ## Mocking & Testing
//! - Every trait is annotated with `automock` when compiled for tests or with
//!   the `test-export-mocks` feature (on by default), so downstream crates can
//!   use `MockObjectLister`, `MockChatCompleter`, `MockVersionControl` and
//!   `MockPrompter` in their own test suites.
//!
//! ## Errors
//! - Collaborator errors are boxed trait objects. The pipelines never retry or
//!   reinterpret them; they are wrapped once and propagated.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use serde::Serialize;

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

/// Error type returned by every collaborator.
pub type CollaboratorError = Box<dyn std::error::Error + Send + Sync>;

/// One object as reported by the storage listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRecord {
    /// Slash-delimited object key.
    pub key: String,
    /// Last-modified timestamp, in whatever offset the store reported.
    pub last_modified: DateTime<FixedOffset>,
}

/// A single page of a listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectPage {
    pub objects: Vec<ObjectRecord>,
    /// Token for the following page; `None` on the last page.
    pub next_token: Option<String>,
}

/// Trait for paging through the objects stored under a prefix in a bucket.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ObjectLister: Send + Sync {
    /// Fetch one page. Pass the previous page's `next_token` to continue.
    async fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        continuation: Option<String>,
    ) -> Result<ObjectPage, CollaboratorError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// Request body for a chat completion. Serialises to the OpenAI wire shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
}

/// Trait for a chat-completion endpoint.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ChatCompleter: Send + Sync {
    /// Returns the text of the first choice's message, untrimmed.
    async fn complete(&self, request: ChatRequest) -> Result<String, CollaboratorError>;
}

/// Trait for the handful of version-control primitives the commit assistant needs.
///
/// Implementations are synchronous; libgit2 handles are not `Send`.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait VersionControl {
    /// Every path currently recorded in the index, in a form [`VersionControl::stage`] accepts.
    fn tracked_paths(&self) -> Result<Vec<String>, CollaboratorError>;

    /// Add (or, for deleted files, remove) the given paths in the index.
    /// A path that is neither on disk nor in the index is an error.
    fn stage(&self, paths: &[String]) -> Result<(), CollaboratorError>;

    /// Unified diff between the `HEAD` tree and the index. Empty when nothing is staged.
    fn staged_diff(&self) -> Result<String, CollaboratorError>;

    /// Commit the index with `message`, returning the new commit id.
    fn commit(&self, message: &str) -> Result<String, CollaboratorError>;
}

/// Trait for user interaction at the terminal.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait Prompter {
    /// Print a user-visible notice.
    fn notify(&self, message: &str);

    /// Ask a yes/no question.
    fn confirm(&self, prompt: &str, default: bool) -> Result<bool, CollaboratorError>;

    /// Open an editor pre-filled with `text`. `None` means the user saved nothing.
    fn edit(&self, text: &str) -> Result<Option<String>, CollaboratorError>;
}
