use git2::Repository;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

use ninox::cli::{run_commit, Aborted, CommitArgs};
use ninox::git::GitRepository;
use ninox_core::commit::{CommitOutcome, DEFAULT_MODEL, NO_CHANGES_NOTICE};
use ninox_core::contract::{MockChatCompleter, MockPrompter};

/// Repository with one commit of `file.txt` containing "hello".
fn repo_with_initial_commit() -> TempDir {
    let dir = TempDir::new().unwrap();
    let repo = Repository::init(dir.path()).unwrap();
    let mut config = repo.config().unwrap();
    config.set_str("user.name", "Test User").unwrap();
    config.set_str("user.email", "test@example.com").unwrap();

    fs::write(dir.path().join("file.txt"), "hello").unwrap();
    let mut index = repo.index().unwrap();
    index.add_path(Path::new("file.txt")).unwrap();
    index.write().unwrap();
    let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
    let sig = repo.signature().unwrap();
    repo.commit(Some("HEAD"), &sig, &sig, "init", &tree, &[])
        .unwrap();
    dir
}

fn head_message(dir: &Path) -> String {
    let repo = Repository::open(dir).unwrap();
    let head = repo.head().unwrap().peel_to_commit().unwrap();
    head.message().unwrap().to_string()
}

fn args(stage_all: bool, dry_run: bool, paths: Vec<String>) -> CommitArgs {
    CommitArgs {
        model: DEFAULT_MODEL.to_string(),
        stage_all,
        dry_run,
        config: None,
        paths,
    }
}

fn chat_replying(reply: &'static str) -> MockChatCompleter {
    let mut chat = MockChatCompleter::new();
    chat.expect_complete()
        .withf(|request| request.messages[1].content.contains("+world"))
        .times(1)
        .returning(move |_| Ok(reply.to_string()));
    chat
}

/// Prompter that prints nothing and declines to edit.
fn declining_prompter() -> MockPrompter {
    let mut prompter = MockPrompter::new();
    prompter.expect_notify().return_const(());
    prompter.expect_confirm().returning(|_, _| Ok(false));
    prompter.expect_edit().never();
    prompter
}

#[tokio::test]
async fn test_commit_creates_commit_from_staged_paths() {
    let dir = repo_with_initial_commit();
    fs::write(dir.path().join("file.txt"), "world").unwrap();

    let git = GitRepository::discover(dir.path()).unwrap();
    let chat = chat_replying("Update file");
    let prompter = declining_prompter();

    let outcome = run_commit(
        &args(false, false, vec!["file.txt".to_string()]),
        &git,
        &chat,
        &prompter,
    )
    .await
    .expect("commit should succeed");

    assert!(matches!(outcome, CommitOutcome::Committed { ref message, .. } if message == "Update file"));
    assert_eq!(head_message(dir.path()).trim(), "Update file");
}

#[tokio::test]
async fn test_commit_all_stages_tracked_changes() {
    let dir = repo_with_initial_commit();
    fs::write(dir.path().join("file.txt"), "world").unwrap();
    fs::write(dir.path().join("untracked.txt"), "ignored").unwrap();

    let git = GitRepository::discover(dir.path()).unwrap();
    let chat = chat_replying("Update file");
    let prompter = declining_prompter();

    run_commit(&args(true, false, vec![]), &git, &chat, &prompter)
        .await
        .expect("commit should succeed");

    assert_eq!(head_message(dir.path()).trim(), "Update file");
    let repo = Repository::open(dir.path()).unwrap();
    let tree = repo.head().unwrap().peel_to_tree().unwrap();
    assert!(tree.get_name("untracked.txt").is_none());
}

#[tokio::test]
async fn test_dry_run_leaves_head_alone() {
    let dir = repo_with_initial_commit();
    fs::write(dir.path().join("file.txt"), "world").unwrap();

    let git = GitRepository::discover(dir.path()).unwrap();
    let chat = chat_replying("Update file");
    let mut prompter = MockPrompter::new();
    prompter
        .expect_notify()
        .withf(|msg| msg.contains("Update file"))
        .times(1)
        .return_const(());
    prompter.expect_confirm().never();

    let outcome = run_commit(
        &args(false, true, vec!["file.txt".to_string()]),
        &git,
        &chat,
        &prompter,
    )
    .await
    .unwrap();

    assert!(matches!(outcome, CommitOutcome::DryRun { .. }));
    assert_eq!(head_message(dir.path()), "init");
}

#[tokio::test]
async fn test_nothing_staged_aborts() {
    let dir = repo_with_initial_commit();
    // Modified but not staged.
    fs::write(dir.path().join("file.txt"), "world").unwrap();

    let git = GitRepository::discover(dir.path()).unwrap();
    let mut chat = MockChatCompleter::new();
    chat.expect_complete().never();
    let mut prompter = MockPrompter::new();
    prompter
        .expect_notify()
        .withf(|msg| msg == NO_CHANGES_NOTICE)
        .times(1)
        .return_const(());

    let err = run_commit(&args(false, false, vec![]), &git, &chat, &prompter)
        .await
        .unwrap_err();

    assert!(err.is::<Aborted>());
    assert_eq!(head_message(dir.path()), "init");
}
