//! Split a tree into per-language copies.
//!
//! Each language discovered among code files gets a private copy of the whole
//! tree in a fresh temporary directory. Files the [`KeepPolicy`] rejects for
//! that language are then deleted, empty copies are dropped, and a copy whose
//! only child is a directory is collapsed onto that child.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::TempDir;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::filter::KeepPolicy;
use crate::language::classify;
use crate::walker::{contains_files, require_dir, walk, EntryKind, WalkError};

/// Prefix for every group directory allocated by [`partition`].
pub const GROUP_DIR_PREFIX: &str = "withrepo_";

/// Errors that abort a partition pass.
#[derive(Debug, Error)]
pub enum PartitionError {
    #[error("failed to create temporary directory in {parent}: {source}")]
    TempDir {
        parent: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to copy {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to remove {path}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to resolve {path}: {source}")]
    Resolve {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to list {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Walk(#[from] WalkError),
}

/// A filtered copy of a tree holding one language's files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageGroup {
    /// Protocol language of every file in the group.
    pub language: String,
    /// Root to list the group from. Inside `allocation` when collapsed.
    pub root: PathBuf,
    /// Temporary directory allocated for the group; removed on cleanup.
    pub allocation: PathBuf,
}

/// Options for a partition pass.
#[derive(Debug, Clone)]
pub struct PartitionOptions {
    /// Retention rule applied to each copy.
    pub policy: KeepPolicy,
    /// Collapse a copy whose only child is a directory onto that child.
    pub collapse_single_root: bool,
    /// Parent for group directories (None = system temp dir).
    pub temp_root: Option<PathBuf>,
}

impl Default for PartitionOptions {
    fn default() -> Self {
        Self {
            policy: KeepPolicy::ExtensionOnly,
            collapse_single_root: true,
            temp_root: None,
        }
    }
}

/// Protocol languages of the code files under `root`, in discovery order.
pub fn discover_languages(root: &Path) -> Result<Vec<String>, WalkError> {
    let mut seen = HashSet::new();
    let mut languages = Vec::new();

    for entry in walk(root) {
        let entry = entry?;
        if !entry.is_file() {
            continue;
        }
        if let Some(language) = classify(&entry.path).code_language() {
            if seen.insert(language) {
                languages.push(language.to_string());
            }
        }
    }

    Ok(languages)
}

/// Partition `root` into one [`LanguageGroup`] per language.
///
/// `root` must be a directory. No returned group is empty. On error every
/// directory allocated by this call is removed before the error is returned.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use withrepo::partition::{cleanup_groups, partition, PartitionOptions};
///
/// let groups = partition(Path::new("./repo"), &PartitionOptions::default()).unwrap();
/// for group in &groups {
///     println!("{} -> {}", group.language, group.root.display());
/// }
/// cleanup_groups(&groups);
/// ```
pub fn partition(
    root: &Path,
    options: &PartitionOptions,
) -> Result<Vec<LanguageGroup>, PartitionError> {
    require_dir(root)?;
    let languages = discover_languages(root)?;
    debug!(root = %root.display(), ?languages, "discovered languages");

    let mut staged: Vec<(String, TempDir, PathBuf)> = Vec::with_capacity(languages.len());
    for language in languages {
        let dir = allocate(options)?;
        debug!(%language, dir = %dir.path().display(), "copying tree");
        copy_tree(root, dir.path())?;

        let removed = prune(dir.path(), &language, options.policy)?;
        debug!(%language, removed, "pruned copy");

        if !contains_files(dir.path())? {
            debug!(%language, "no files left, dropping group");
            let path = dir.path().to_path_buf();
            dir.close()
                .map_err(|source| PartitionError::Remove { path, source })?;
            continue;
        }

        let group_root = if options.collapse_single_root {
            collapse_single_root(dir.path())?
        } else {
            dir.path().to_path_buf()
        };
        staged.push((language, dir, group_root));
    }

    let groups: Vec<LanguageGroup> = staged
        .into_iter()
        .map(|(language, dir, root)| LanguageGroup {
            language,
            root,
            allocation: dir.keep(),
        })
        .collect();

    info!(
        root = %root.display(),
        groups = groups.len(),
        "partitioned tree by language"
    );
    Ok(groups)
}

fn allocate(options: &PartitionOptions) -> Result<TempDir, PartitionError> {
    let parent = options
        .temp_root
        .clone()
        .unwrap_or_else(std::env::temp_dir);

    if !parent.exists() {
        fs::create_dir_all(&parent).map_err(|source| PartitionError::CreateDir {
            path: parent.clone(),
            source,
        })?;
    }

    tempfile::Builder::new()
        .prefix(GROUP_DIR_PREFIX)
        .tempdir_in(&parent)
        .map_err(|source| PartitionError::TempDir { parent, source })
}

/// Recursively copy the contents of `src` into the existing directory `dst`.
///
/// Symlinks to files are copied as the file they point to. Links to
/// directories, dangling links and special files are skipped. When `dst`
/// lives inside `src`, the group directories next to it are not copied.
pub fn copy_tree(src: &Path, dst: &Path) -> Result<(), PartitionError> {
    let resolved_src = resolve(src)?;
    let groups_parent = resolve(dst)?.parent().map(Path::to_path_buf);
    let mut skipped: Option<PathBuf> = None;

    for entry in walk(src) {
        let entry = entry?;
        if entry.depth == 0 {
            continue;
        }
        if skipped.as_ref().is_some_and(|dir| entry.path.starts_with(dir)) {
            continue;
        }

        let Ok(relative) = entry.path.strip_prefix(src) else {
            continue;
        };
        let target = dst.join(relative);

        match entry.kind {
            EntryKind::Directory => {
                if is_group_dir(&resolved_src.join(relative), groups_parent.as_deref()) {
                    debug!(path = %entry.path.display(), "skipping group directory");
                    skipped = Some(entry.path);
                    continue;
                }
                fs::create_dir_all(&target).map_err(|source| PartitionError::CreateDir {
                    path: target.clone(),
                    source,
                })?;
            }
            EntryKind::File => copy_file(&entry.path, &target)?,
            EntryKind::Symlink => {
                warn!(path = %entry.path.display(), "skipping symlink that is not a file")
            }
            EntryKind::Other => warn!(path = %entry.path.display(), "skipping special file"),
        }
    }
    Ok(())
}

fn resolve(path: &Path) -> Result<PathBuf, PartitionError> {
    fs::canonicalize(path).map_err(|source| PartitionError::Resolve {
        path: path.to_path_buf(),
        source,
    })
}

fn is_group_dir(path: &Path, groups_parent: Option<&Path>) -> bool {
    let named = path
        .file_name()
        .is_some_and(|name| name.to_string_lossy().starts_with(GROUP_DIR_PREFIX));
    named && groups_parent.is_some() && path.parent() == groups_parent
}

fn copy_file(from: &Path, to: &Path) -> Result<(), PartitionError> {
    fs::copy(from, to)
        .map(|_| ())
        .map_err(|source| PartitionError::Copy {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            source,
        })
}

/// Delete every file under `root` that `policy` rejects for `language`.
/// Empty directories are left in place. Returns the number of files removed.
pub fn prune(root: &Path, language: &str, policy: KeepPolicy) -> Result<usize, PartitionError> {
    let mut doomed = Vec::new();
    for entry in walk(root) {
        let entry = entry?;
        if entry.is_dir() {
            continue;
        }
        let relative = entry.path.strip_prefix(root).unwrap_or(&entry.path);
        if !policy.keeps(relative, language) {
            doomed.push(entry.path);
        }
    }

    for path in &doomed {
        fs::remove_file(path).map_err(|source| PartitionError::Remove {
            path: path.clone(),
            source,
        })?;
    }
    Ok(doomed.len())
}

/// The single child directory of `dir`, or `dir` itself when it has zero or
/// several children or its only child is not a directory.
pub fn collapse_single_root(dir: &Path) -> Result<PathBuf, PartitionError> {
    let read_err = |source| PartitionError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut children = fs::read_dir(dir).map_err(read_err)?;
    let Some(first) = children.next() else {
        return Ok(dir.to_path_buf());
    };
    let first = first.map_err(read_err)?;
    if children.next().is_some() {
        return Ok(dir.to_path_buf());
    }

    let is_dir = first.file_type().map_err(read_err)?.is_dir();
    if is_dir {
        debug!(dir = %dir.display(), child = %first.path().display(), "collapsing single root");
        Ok(first.path())
    } else {
        Ok(dir.to_path_buf())
    }
}

/// Remove `path` and everything below it. Missing paths are not an error.
pub fn remove_tree(path: &Path) -> io::Result<()> {
    match fs::remove_dir_all(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

/// Best-effort removal of every group's allocated directory.
///
/// Failures are logged rather than returned. Safe to call repeatedly.
pub fn cleanup_groups(groups: &[LanguageGroup]) {
    for group in groups {
        if let Err(e) = remove_tree(&group.allocation) {
            warn!(path = %group.allocation.display(), error = %e, "failed to remove language group");
        }
    }
}

/// Best-effort removal of an extracted `root` and all of its groups.
pub fn cleanup(root: &Path, groups: &[LanguageGroup]) {
    cleanup_groups(groups);
    if let Err(e) = remove_tree(root) {
        warn!(path = %root.display(), error = %e, "failed to remove root");
    }
}
