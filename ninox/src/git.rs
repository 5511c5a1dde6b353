//! libgit2-backed [`VersionControl`].

use std::path::{Component, Path, PathBuf};

use git2::{Commit, DiffFormat, ErrorCode, Repository};
use tracing::{debug, info};

use ninox_core::contract::{CollaboratorError, VersionControl};

pub struct GitRepository {
    repo: Repository,
    /// Directory relative path arguments are resolved against.
    base: PathBuf,
}

impl GitRepository {
    /// Open the repository containing `path`. Relative paths handed to
    /// [`VersionControl::stage`] are taken relative to `path`.
    pub fn discover(path: impl AsRef<Path>) -> Result<Self, CollaboratorError> {
        let path = path.as_ref();
        let repo = Repository::discover(path).map_err(|e| {
            format!("No git repository found at {}: {}", path.display(), e.message())
        })?;
        let base = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        info!(path = ?repo.path(), base = %base.display(), "Opened git repository");
        Ok(Self { repo, base })
    }

    fn workdir(&self) -> Result<&Path, CollaboratorError> {
        self.repo
            .workdir()
            .ok_or_else(|| "Bare repositories are not supported".into())
    }

    /// Path relative to the working tree, as the index stores it.
    fn index_path(&self, path: &str) -> Result<PathBuf, CollaboratorError> {
        let given = Path::new(path);
        let absolute = normalize(&self.base.join(given));
        let workdir = self.workdir()?;
        let canonical = workdir.canonicalize().ok();
        for root in std::iter::once(workdir).chain(canonical.as_deref()) {
            if let Ok(relative) = absolute.strip_prefix(root) {
                return Ok(relative.to_path_buf());
            }
        }
        Err(format!("{} is outside the repository", given.display()).into())
    }

    /// `HEAD`'s commit, or `None` on an unborn branch.
    fn head_commit(&self) -> Result<Option<Commit<'_>>, git2::Error> {
        match self.repo.head() {
            Ok(head) => Ok(Some(head.peel_to_commit()?)),
            Err(e) if e.code() == ErrorCode::UnbornBranch => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Resolve `.` and `..` without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

impl VersionControl for GitRepository {
    /// Absolute paths, so they stage correctly from any directory.
    fn tracked_paths(&self) -> Result<Vec<String>, CollaboratorError> {
        let workdir = self.workdir()?;
        let index = self.repo.index()?;
        Ok(index
            .iter()
            .map(|entry| {
                let relative = String::from_utf8_lossy(&entry.path).into_owned();
                workdir.join(relative).to_string_lossy().into_owned()
            })
            .collect())
    }

    fn stage(&self, paths: &[String]) -> Result<(), CollaboratorError> {
        let workdir = self.workdir()?.to_path_buf();
        let mut index = self.repo.index()?;
        for path in paths {
            let relative = self.index_path(path)?;
            if workdir.join(&relative).exists() {
                index.add_path(&relative)?;
                debug!(path = %relative.display(), "Staged path");
            } else if index.get_path(&relative, 0).is_some() {
                index.remove_path(&relative)?;
                debug!(path = %relative.display(), "Staged removal");
            } else {
                return Err(format!("pathspec '{path}' did not match any files").into());
            }
        }
        index.write()?;
        Ok(())
    }

    fn staged_diff(&self) -> Result<String, CollaboratorError> {
        let head_tree = match self.head_commit()? {
            Some(commit) => Some(commit.tree()?),
            None => None,
        };
        let index = self.repo.index()?;
        let diff = self
            .repo
            .diff_tree_to_index(head_tree.as_ref(), Some(&index), None)?;

        let mut patch = String::new();
        diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
            if matches!(line.origin(), '+' | '-' | ' ') {
                patch.push(line.origin());
            }
            patch.push_str(&String::from_utf8_lossy(line.content()));
            true
        })?;
        debug!(bytes = patch.len(), "Computed staged diff");
        Ok(patch)
    }

    fn commit(&self, message: &str) -> Result<String, CollaboratorError> {
        let signature = self.repo.signature()?;
        let mut index = self.repo.index()?;
        let tree_id = index.write_tree()?;
        let tree = self.repo.find_tree(tree_id)?;
        let parent = self.head_commit()?;
        let parents: Vec<&Commit<'_>> = parent.iter().collect();
        let oid = self
            .repo
            .commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)?;
        info!(commit = %oid, "Created commit");
        Ok(oid.to_string())
    }
}
