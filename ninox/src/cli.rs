//! # ninox CLI Interface (Module)
//!
//! Command parsing and orchestration for the `ninox` binary. Business logic
//! lives in [`ninox_core`]; this module wires the concrete collaborators
//! (S3, OpenAI, libgit2, the terminal) into the core pipelines.
//!
//! ## Commands
//! - `ninox menu-tree`: build the Hugo menu tree from a bucket listing.
//! - `ninox git commit`: have a language model write the commit message.
//!
//! ## Programmatic use
//! [`run`] is the entry point used by `main`. [`run_menu_tree`] and
//! [`run_commit`] take their collaborators as parameters so tests can hand in
//! mocks.
//!
//! ## Aborts
//! Declining a prompt or having nothing to commit returns an [`Aborted`]
//! error. `main` reports it as `Aborted!` and exits non-zero.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use ninox_core::commit::{commit_staged, CommitOptions, CommitOutcome, DEFAULT_MODEL};
use ninox_core::contract::{ChatCompleter, ObjectLister, Prompter, VersionControl};
use ninox_core::error::CommitError;
use ninox_core::menu_tree::{create_tree, TreeReport};

use crate::git::GitRepository;
use crate::load_config::{default_config_path, load_config, resolve_menu_descriptions};
use crate::openai::OpenAiClient;
use crate::prompt::TerminalPrompter;
use crate::s3::{S3Lister, ENDPOINT_ENV};

/// The user chose not to go on, or there was nothing to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Aborted;

impl fmt::Display for Aborted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Aborted!")
    }
}

impl std::error::Error for Aborted {}

/// CLI for ninox: menu trees from S3 and LLM-written commit messages.
#[derive(Parser)]
#[clap(
    name = "ninox",
    version,
    about = "Generate Hugo menu trees from S3 and write git commit messages with an LLM"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a Hugo content tree from menu PDFs stored in S3
    MenuTree(MenuTreeArgs),
    /// Git helper commands
    Git {
        #[clap(subcommand)]
        command: GitCommands,
    },
}

#[derive(Subcommand)]
pub enum GitCommands {
    /// Generate a commit message with an LLM and commit staged changes
    Commit(CommitArgs),
}

#[derive(Args, Debug, Clone)]
pub struct MenuTreeArgs {
    /// S3 bucket to scan
    #[clap(long)]
    pub bucket: String,
    /// Key prefix
    #[clap(long, default_value = "content/")]
    pub prefix: String,
    /// Destination content directory
    #[clap(long, default_value = "content")]
    pub output: PathBuf,
    /// Base URL for S3 objects
    #[clap(long)]
    pub cdn_host: String,
    /// TOML file with ship descriptions (defaults to ./config.toml)
    #[clap(long)]
    pub config: Option<PathBuf>,
    /// S3-compatible endpoint, path-style (defaults to AWS virtual-host URLs)
    #[clap(long, env = ENDPOINT_ENV)]
    pub endpoint: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct CommitArgs {
    /// OpenAI model to use
    #[clap(long, default_value = DEFAULT_MODEL)]
    pub model: String,
    /// Automatically stage tracked changes before committing
    #[clap(short = 'a', long = "all", conflicts_with = "paths")]
    pub stage_all: bool,
    /// Only print the suggested commit message and do not commit
    #[clap(short = 'n', long)]
    pub dry_run: bool,
    /// Config file holding the OpenAI token (defaults to ~/.config/ninox/config.toml)
    #[clap(long)]
    pub config: Option<PathBuf>,
    /// Paths to stage before committing
    pub paths: Vec<String>,
}

impl CommitArgs {
    pub fn options(&self) -> CommitOptions {
        CommitOptions {
            model: self.model.clone(),
            stage_all: self.stage_all,
            dry_run: self.dry_run,
            paths: self.paths.clone(),
        }
    }
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    // Emit a top-level 'trace_initialised' event at the very start
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::MenuTree(args) => {
            tracing::info!(command = "menu-tree", bucket = %args.bucket, "Starting menu tree generation");
            let cwd = std::env::current_dir().context("Failed to read working directory")?;
            let lister = S3Lister::new(args.endpoint.clone());
            run_menu_tree(&args, &lister, &TerminalPrompter, &cwd).await?;
            Ok(())
        }
        Commands::Git {
            command: GitCommands::Commit(args),
        } => {
            tracing::info!(command = "git commit", model = %args.model, "Starting commit assistant");
            let config_path = args.config.clone().unwrap_or_else(default_config_path);
            let config = load_config(&config_path)
                .with_context(|| format!("Failed to load config {}", config_path.display()))?;
            let chat = OpenAiClient::new(config.openai_key()?, None);
            let cwd = std::env::current_dir().context("Failed to read working directory")?;
            let repo = GitRepository::discover(&cwd).map_err(anyhow::Error::msg)?;
            run_commit(&args, &repo, &chat, &TerminalPrompter).await?;
            Ok(())
        }
    }
}

/// `menu-tree` with injected collaborators. `cwd` is where `config.toml` is looked up.
pub async fn run_menu_tree<L, P>(
    args: &MenuTreeArgs,
    lister: &L,
    prompter: &P,
    cwd: &Path,
) -> Result<TreeReport>
where
    L: ObjectLister + ?Sized,
    P: Prompter + ?Sized,
{
    let descriptions = resolve_menu_descriptions(args.config.as_deref(), cwd, prompter)?;
    let report = create_tree(
        lister,
        &args.bucket,
        &args.prefix,
        &args.output,
        &args.cdn_host,
        &descriptions,
    )
    .await
    .map_err(|e| {
        tracing::error!(command = "menu-tree", error = %e, "Menu tree generation failed");
        e
    })?;

    prompter.notify(&format!(
        "Wrote {} year page(s) for {} object(s) under {}",
        report.pages_written.len(),
        report.objects,
        args.output.display()
    ));
    Ok(report)
}

/// `git commit` with injected collaborators.
pub async fn run_commit<V, C, P>(
    args: &CommitArgs,
    vcs: &V,
    chat: &C,
    prompter: &P,
) -> Result<CommitOutcome>
where
    V: VersionControl + ?Sized,
    C: ChatCompleter + ?Sized,
    P: Prompter + ?Sized,
{
    match commit_staged(vcs, chat, prompter, &args.options()).await {
        Ok(outcome) => {
            tracing::info!(command = "git commit", ?outcome, "Commit assistant finished");
            Ok(outcome)
        }
        Err(CommitError::NoStagedChanges) => Err(Aborted.into()),
        Err(e) => {
            tracing::error!(command = "git commit", error = %e, "Commit assistant failed");
            Err(e.into())
        }
    }
}
