//! Commit-message assistant.
//!
//! The flow is strictly linear:
//!
//! 1. **collect diff**: optionally stage paths (or every tracked path), then
//!    diff the index against `HEAD`.
//! 2. **no changes**: an empty diff prints a notice and aborts with
//!    [`CommitError::NoStagedChanges`]; nothing is committed.
//! 3. **generate**: send the patch with a fixed instruction prompt to the chat
//!    model and keep the first choice, trimmed.
//! 4. **confirm/edit**: show the suggestion. A dry run stops here; otherwise
//!    the user may open it in an editor.
//! 5. **commit**: record the final message.

use tracing::{debug, info};

use crate::contract::{ChatCompleter, ChatMessage, ChatRequest, Prompter, VersionControl};
use crate::error::CommitError;

pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";
pub const MAX_TOKENS: u32 = 512;

const SYSTEM_PROMPT: &str = "You are \u{201c}CommitCraft AI\u{201d}, an expert on the guidelines from \
\u{201c}A Note about Git Commit Messages\u{201d} (tbaggery.com, 2008).";

const FORMAT_RULES: &str = "Format rules:
1. Subject line \u{2264} 50 chars, **imperative**, no period.
2. Exactly one blank line after the subject.
3. *Body wrapped \u{2264} 72 chars per line*; explain **what** & **why**, not how.
4. Mention high-level modules/files that changed, excluding lock files.
5. Further paragraphs start with a blank line; bulleted lists are OK.
6. Skip body for lock file updates.

Return only the formatted commit message\u{2014}no code fences, no extra prose.";

pub const NO_CHANGES_NOTICE: &str = "No staged changes to commit.";
pub const EDIT_PROMPT: &str = "Edit the commit message?";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitOptions {
    pub model: String,
    /// Stage every tracked path before diffing.
    pub stage_all: bool,
    /// Print the suggestion and stop.
    pub dry_run: bool,
    /// Paths to stage before diffing. Mutually exclusive with `stage_all`.
    pub paths: Vec<String>,
}

impl Default for CommitOptions {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            stage_all: false,
            dry_run: false,
            paths: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    DryRun { message: String },
    Committed { id: String, message: String },
}

/// Build the chat request for a patch.
pub fn build_request(model: &str, patch: &str) -> ChatRequest {
    let user = format!(
        "\nGiven ONLY the following git patch, create ONE commit message.\n\n\
         \u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500} PATCH START \u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\n\
         {patch}\n\
         \u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500} PATCH END \u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\n\n\
         {FORMAT_RULES}"
    );
    ChatRequest {
        model: model.to_string(),
        messages: vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(user)],
        max_tokens: MAX_TOKENS,
    }
}

fn collect_diff<V>(vcs: &V, options: &CommitOptions) -> Result<String, CommitError>
where
    V: VersionControl + ?Sized,
{
    if options.stage_all {
        let tracked = vcs.tracked_paths().map_err(CommitError::Vcs)?;
        if !tracked.is_empty() {
            debug!(count = tracked.len(), "Staging tracked paths");
            vcs.stage(&tracked).map_err(CommitError::Vcs)?;
        }
    }
    if !options.paths.is_empty() {
        debug!(paths = ?options.paths, "Staging requested paths");
        vcs.stage(&options.paths).map_err(CommitError::Vcs)?;
    }
    vcs.staged_diff().map_err(CommitError::Vcs)
}

/// Run the assistant end to end.
pub async fn commit_staged<V, C, P>(
    vcs: &V,
    chat: &C,
    prompter: &P,
    options: &CommitOptions,
) -> Result<CommitOutcome, CommitError>
where
    V: VersionControl + ?Sized,
    C: ChatCompleter + ?Sized,
    P: Prompter + ?Sized,
{
    if options.stage_all && !options.paths.is_empty() {
        return Err(CommitError::ConflictingStageOptions);
    }

    let patch = collect_diff(vcs, options)?;
    if patch.trim().is_empty() {
        info!("No staged changes; aborting");
        prompter.notify(NO_CHANGES_NOTICE);
        return Err(CommitError::NoStagedChanges);
    }
    info!(model = %options.model, patch_bytes = patch.len(), "Requesting commit message");

    let reply = chat
        .complete(build_request(&options.model, &patch))
        .await
        .map_err(CommitError::Completion)?;
    let mut message = reply.trim().to_string();
    if message.is_empty() {
        return Err(CommitError::EmptyCompletion);
    }

    prompter.notify(&format!("Suggested commit message:\n{message}"));
    if options.dry_run {
        info!("Dry run; not committing");
        return Ok(CommitOutcome::DryRun { message });
    }

    if prompter
        .confirm(EDIT_PROMPT, false)
        .map_err(CommitError::Prompt)?
    {
        if let Some(edited) = prompter.edit(&message).map_err(CommitError::Prompt)? {
            let edited = edited.trim();
            if !edited.is_empty() {
                message = edited.to_string();
            }
        }
    }

    let id = vcs.commit(&message).map_err(CommitError::Vcs)?;
    info!(commit = %id, "Commit created");
    prompter.notify("Commit created.");
    Ok(CommitOutcome::Committed { id, message })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{ChatRole, MockChatCompleter, MockPrompter, MockVersionControl};
    use mockall::predicate::eq;

    const PATCH: &str = "diff --git a/file.txt b/file.txt\n-hello\n+world\n";

    fn chat_replying(reply: &'static str) -> MockChatCompleter {
        let mut chat = MockChatCompleter::new();
        chat.expect_complete()
            .times(1)
            .returning(move |_| Ok(reply.to_string()));
        chat
    }

    #[test]
    fn request_embeds_patch_and_limits() {
        let request = build_request("some-model", PATCH);
        assert_eq!(request.model, "some-model");
        assert_eq!(request.max_tokens, 512);
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, ChatRole::System);
        assert!(request.messages[0].content.contains("CommitCraft AI"));
        assert_eq!(request.messages[1].role, ChatRole::User);
        assert!(request.messages[1].content.contains(PATCH));
        assert!(request.messages[1].content.contains("PATCH START"));
        assert!(request.messages[1].content.contains("Skip body for lock file updates."));
    }

    #[tokio::test]
    async fn commits_trimmed_suggestion_when_user_declines_editing() {
        let mut vcs = MockVersionControl::new();
        vcs.expect_staged_diff().returning(|| Ok(PATCH.to_string()));
        vcs.expect_commit()
            .with(eq("Update file"))
            .times(1)
            .returning(|_| Ok("abc123".to_string()));
        let chat = chat_replying("  Update file\n");
        let mut prompter = MockPrompter::new();
        prompter.expect_notify().return_const(());
        prompter
            .expect_confirm()
            .with(eq(EDIT_PROMPT), eq(false))
            .returning(|_, _| Ok(false));
        prompter.expect_edit().never();

        let outcome = commit_staged(&vcs, &chat, &prompter, &CommitOptions::default())
            .await
            .unwrap();

        assert_eq!(
            outcome,
            CommitOutcome::Committed {
                id: "abc123".to_string(),
                message: "Update file".to_string()
            }
        );
    }

    #[tokio::test]
    async fn edited_message_replaces_suggestion() {
        let mut vcs = MockVersionControl::new();
        vcs.expect_staged_diff().returning(|| Ok(PATCH.to_string()));
        vcs.expect_commit()
            .with(eq("Rewrite greeting"))
            .returning(|_| Ok("def456".to_string()));
        let chat = chat_replying("Update file");
        let mut prompter = MockPrompter::new();
        prompter.expect_notify().return_const(());
        prompter.expect_confirm().returning(|_, _| Ok(true));
        prompter
            .expect_edit()
            .with(eq("Update file"))
            .returning(|_| Ok(Some("Rewrite greeting\n".to_string())));

        let outcome = commit_staged(&vcs, &chat, &prompter, &CommitOptions::default())
            .await
            .unwrap();
        assert!(matches!(outcome, CommitOutcome::Committed { message, .. } if message == "Rewrite greeting"));
    }

    #[tokio::test]
    async fn editor_closed_without_saving_keeps_suggestion() {
        let mut vcs = MockVersionControl::new();
        vcs.expect_staged_diff().returning(|| Ok(PATCH.to_string()));
        vcs.expect_commit()
            .with(eq("Update file"))
            .returning(|_| Ok("1".to_string()));
        let chat = chat_replying("Update file");
        let mut prompter = MockPrompter::new();
        prompter.expect_notify().return_const(());
        prompter.expect_confirm().returning(|_, _| Ok(true));
        prompter.expect_edit().returning(|_| Ok(None));

        commit_staged(&vcs, &chat, &prompter, &CommitOptions::default())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn empty_diff_notifies_and_aborts_without_commit() {
        let mut vcs = MockVersionControl::new();
        vcs.expect_staged_diff().returning(|| Ok("  \n".to_string()));
        vcs.expect_commit().never();
        let mut chat = MockChatCompleter::new();
        chat.expect_complete().never();
        let mut prompter = MockPrompter::new();
        prompter
            .expect_notify()
            .with(eq(NO_CHANGES_NOTICE))
            .times(1)
            .return_const(());

        let err = commit_staged(&vcs, &chat, &prompter, &CommitOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CommitError::NoStagedChanges));
    }

    #[tokio::test]
    async fn dry_run_never_commits_or_prompts() {
        let mut vcs = MockVersionControl::new();
        vcs.expect_staged_diff().returning(|| Ok(PATCH.to_string()));
        vcs.expect_commit().never();
        let chat = chat_replying("Update file");
        let mut prompter = MockPrompter::new();
        prompter
            .expect_notify()
            .with(eq("Suggested commit message:\nUpdate file"))
            .times(1)
            .return_const(());
        prompter.expect_confirm().never();

        let options = CommitOptions {
            dry_run: true,
            ..CommitOptions::default()
        };
        let outcome = commit_staged(&vcs, &chat, &prompter, &options).await.unwrap();
        assert_eq!(
            outcome,
            CommitOutcome::DryRun {
                message: "Update file".to_string()
            }
        );
    }

    #[tokio::test]
    async fn stage_all_stages_tracked_paths_before_diffing() {
        let mut seq = mockall::Sequence::new();
        let mut vcs = MockVersionControl::new();
        vcs.expect_tracked_paths()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(vec!["a.txt".to_string(), "b.txt".to_string()]));
        vcs.expect_stage()
            .withf(|paths| paths == ["a.txt".to_string(), "b.txt".to_string()])
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        vcs.expect_staged_diff()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(String::new()));
        let chat = MockChatCompleter::new();
        let mut prompter = MockPrompter::new();
        prompter.expect_notify().return_const(());

        let options = CommitOptions {
            stage_all: true,
            ..CommitOptions::default()
        };
        let err = commit_staged(&vcs, &chat, &prompter, &options).await.unwrap_err();
        assert!(matches!(err, CommitError::NoStagedChanges));
    }

    #[tokio::test]
    async fn stage_all_with_paths_is_rejected() {
        let vcs = MockVersionControl::new();
        let chat = MockChatCompleter::new();
        let prompter = MockPrompter::new();
        let options = CommitOptions {
            stage_all: true,
            paths: vec!["file.txt".to_string()],
            ..CommitOptions::default()
        };
        let err = commit_staged(&vcs, &chat, &prompter, &options).await.unwrap_err();
        assert!(matches!(err, CommitError::ConflictingStageOptions));
    }

    #[tokio::test]
    async fn completion_failure_propagates() {
        let mut vcs = MockVersionControl::new();
        vcs.expect_staged_diff().returning(|| Ok(PATCH.to_string()));
        vcs.expect_commit().never();
        let mut chat = MockChatCompleter::new();
        chat.expect_complete()
            .returning(|_| Err("503 Service Unavailable".into()));
        let prompter = MockPrompter::new();

        let err = commit_staged(&vcs, &chat, &prompter, &CommitOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CommitError::Completion(ref e) if e.to_string().contains("503")));
    }
}
