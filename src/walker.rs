//! Directory traversal and file listings.
//!
//! [`walk`] is the low-level traversal built on the `ignore` crate. [`walk_files`] and [`walk_groups`] produce the flat and per-language
//! file listings on top of it.

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use serde::Serialize;
use thiserror::Error;

use crate::partition::LanguageGroup;
use crate::repo_file::RepoFile;

/// Errors that can occur during directory walking.
#[derive(Debug, Error)]
pub enum WalkError {
    #[error("path not found: {path}")]
    NotFound { path: PathBuf },

    #[error("not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("symlink loop detected: {path}")]
    SymlinkLoop { path: PathBuf },
}

/// Kind of a walked entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Regular file, or a symlink that resolves to one.
    File,
    Directory,
    /// Symlink to a directory, or a dangling one.
    Symlink,
    /// FIFO, socket or device node.
    Other,
}

/// Entry from directory walk.
#[derive(Debug, Clone)]
pub struct WalkEntry {
    /// Path to the entry.
    pub path: PathBuf,
    /// Depth from root (root = 0).
    pub depth: usize,
    pub kind: EntryKind,
}

impl WalkEntry {
    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// Walk a directory tree, yielding every entry including the root itself.
///
/// Hidden files are included and ignore files are not consulted. Symlinks
/// are never descended into; a link whose target is a regular file is
/// reported as [`EntryKind::File`]. Siblings are visited in file-name order.
pub fn walk(root: &Path) -> impl Iterator<Item = Result<WalkEntry, WalkError>> {
    let root = root.to_path_buf();

    if !root.exists() {
        return either::Either::Left(std::iter::once(Err(WalkError::NotFound { path: root })));
    }

    let mut builder = WalkBuilder::new(&root);
    builder
        .standard_filters(false)
        .hidden(false)
        .require_git(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b));

    either::Either::Right(builder.build().map(|result| match result {
        Ok(entry) => {
            let kind = match entry.file_type() {
                Some(ft) if ft.is_dir() => EntryKind::Directory,
                Some(ft) if ft.is_file() => EntryKind::File,
                Some(ft) if ft.is_symlink() => symlink_kind(entry.path()),
                _ => EntryKind::Other,
            };
            Ok(WalkEntry {
                path: entry.path().to_path_buf(),
                depth: entry.depth(),
                kind,
            })
        }
        Err(err) => Err(convert_error(err)),
    }))
}

fn symlink_kind(path: &Path) -> EntryKind {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() => EntryKind::File,
        _ => EntryKind::Symlink,
    }
}

fn error_path(err: &ignore::Error) -> Option<PathBuf> {
    match err {
        ignore::Error::WithPath { path, .. } => Some(path.clone()),
        ignore::Error::WithDepth { err, .. } | ignore::Error::WithLineNumber { err, .. } => {
            error_path(err)
        }
        ignore::Error::Loop { child, .. } => Some(child.clone()),
        _ => None,
    }
}

fn is_loop(err: &ignore::Error) -> bool {
    match err {
        ignore::Error::Loop { .. } => true,
        ignore::Error::WithPath { err, .. }
        | ignore::Error::WithDepth { err, .. }
        | ignore::Error::WithLineNumber { err, .. } => is_loop(err),
        _ => false,
    }
}

fn convert_error(err: ignore::Error) -> WalkError {
    let path = error_path(&err).unwrap_or_else(|| PathBuf::from("<walk error>"));
    if is_loop(&err) {
        return WalkError::SymlinkLoop { path };
    }

    match err.into_io_error() {
        Some(io_err) if io_err.kind() == std::io::ErrorKind::PermissionDenied => {
            WalkError::PermissionDenied { path }
        }
        Some(io_err) if io_err.kind() == std::io::ErrorKind::NotFound => {
            WalkError::NotFound { path }
        }
        Some(source) => WalkError::Io { path, source },
        None => WalkError::Io {
            path,
            source: std::io::Error::other("walk failed"),
        },
    }
}

/// One file in a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeEntry {
    /// Absolute directory containing the file.
    pub directory: PathBuf,
    /// Path relative to the listing root.
    pub relative_path: PathBuf,
    /// Group language, for per-language listings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl TreeEntry {
    /// Absolute path of the file.
    pub fn path(&self) -> PathBuf {
        match self.relative_path.file_name() {
            Some(name) => self.directory.join(name),
            None => self.directory.clone(),
        }
    }

    /// View of the file with lazy content access.
    pub fn file(&self) -> RepoFile {
        RepoFile::new(self.path(), self.relative_path.clone())
    }
}

pub(crate) fn require_dir(root: &Path) -> Result<(), WalkError> {
    let metadata = std::fs::metadata(root).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => WalkError::NotFound {
            path: root.to_path_buf(),
        },
        std::io::ErrorKind::PermissionDenied => WalkError::PermissionDenied {
            path: root.to_path_buf(),
        },
        _ => WalkError::Io {
            path: root.to_path_buf(),
            source: e,
        },
    })?;

    if metadata.is_dir() {
        Ok(())
    } else {
        Err(WalkError::NotADirectory {
            path: root.to_path_buf(),
        })
    }
}

fn files_under(
    root: PathBuf,
    language: Option<String>,
) -> impl Iterator<Item = Result<TreeEntry, WalkError>> {
    walk(&root).filter_map(move |result| {
        let entry = match result {
            Ok(entry) => entry,
            Err(e) => return Some(Err(e)),
        };
        if !entry.is_file() {
            return None;
        }

        let relative_path = entry.path.strip_prefix(&root).ok()?.to_path_buf();
        let directory = entry.path.parent()?.to_path_buf();
        Some(Ok(TreeEntry {
            directory,
            relative_path,
            language: language.clone(),
        }))
    })
}

/// Lazily list every file under `root`, each exactly once, in pre-order.
///
/// # Examples
///
/// ```no_run
/// use withrepo::walker::walk_files;
/// use std::path::Path;
///
/// for entry in walk_files(Path::new("./repo")).unwrap().flatten() {
///     println!("{}", entry.relative_path.display());
/// }
/// ```
pub fn walk_files(
    root: &Path,
) -> Result<impl Iterator<Item = Result<TreeEntry, WalkError>>, WalkError> {
    require_dir(root)?;
    Ok(files_under(root.to_path_buf(), None))
}

/// Lazily list the files of each language group, tagged with the group's
/// language and relative to the group root.
pub fn walk_groups(
    groups: &[LanguageGroup],
) -> impl Iterator<Item = Result<TreeEntry, WalkError>> + '_ {
    groups.iter().flat_map(|group| {
        let listing: Box<dyn Iterator<Item = Result<TreeEntry, WalkError>>> =
            match require_dir(&group.root) {
                Ok(()) => Box::new(files_under(group.root.clone(), Some(group.language.clone()))),
                Err(e) => Box::new(std::iter::once(Err(e))),
            };
        listing
    })
}

/// Whether any regular file exists below `root`.
pub fn contains_files(root: &Path) -> Result<bool, WalkError> {
    for entry in walk(root) {
        if entry?.is_file() {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Simple Either type to avoid adding itertools dependency.
mod either {
    pub enum Either<L, R> {
        Left(L),
        Right(R),
    }

    impl<L, R, T> Iterator for Either<L, R>
    where
        L: Iterator<Item = T>,
        R: Iterator<Item = T>,
    {
        type Item = T;

        fn next(&mut self) -> Option<Self::Item> {
            match self {
                Either::Left(l) => l.next(),
                Either::Right(r) => r.next(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_dir() -> TempDir {
        let dir = TempDir::new().unwrap();

        fs::create_dir_all(dir.path().join("src/nested")).unwrap();
        fs::write(dir.path().join("src/main.py"), "print('hi')").unwrap();
        fs::write(dir.path().join("src/nested/util.js"), "export {}").unwrap();
        fs::write(dir.path().join(".env"), "SECRET=1").unwrap();
        fs::write(dir.path().join("LICENSE"), "MIT").unwrap();

        dir
    }

    fn relative_paths(dir: &Path) -> Vec<String> {
        let mut paths: Vec<String> = walk_files(dir)
            .unwrap()
            .map(|r| r.unwrap().relative_path.to_string_lossy().replace('\\', "/"))
            .collect();
        paths.sort();
        paths
    }

    #[test]
    fn test_walk_basic() {
        let dir = create_test_dir();

        let entries: Vec<_> = walk(dir.path()).filter_map(|r| r.ok()).collect();

        assert_eq!(entries[0].path, dir.path());
        assert_eq!(entries[0].depth, 0);
        assert!(entries.iter().any(|e| e.is_dir() && e.path.ends_with("src/nested")));
        assert_eq!(entries.iter().filter(|e| e.is_file()).count(), 4);
    }

    #[test]
    fn test_walk_nonexistent() {
        let result: Vec<_> = walk(Path::new("/nonexistent/path")).collect();
        assert_eq!(result.len(), 1);
        assert!(matches!(result[0], Err(WalkError::NotFound { .. })));
    }

    #[test]
    fn test_walk_files_lists_every_file_once() {
        let dir = create_test_dir();

        assert_eq!(
            relative_paths(dir.path()),
            vec![".env", "LICENSE", "src/main.py", "src/nested/util.js"]
        );
    }

    #[test]
    fn test_walk_files_includes_gitignored_files() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        fs::write(dir.path().join(".gitignore"), "*.log").unwrap();
        fs::write(dir.path().join("debug.log"), "x").unwrap();

        assert!(relative_paths(dir.path()).contains(&"debug.log".to_string()));
    }

    #[test]
    fn test_entry_directory_and_path() {
        let dir = create_test_dir();

        let entry = walk_files(dir.path())
            .unwrap()
            .filter_map(|r| r.ok())
            .find(|e| e.relative_path.ends_with("util.js"))
            .unwrap();

        assert_eq!(entry.directory, dir.path().join("src/nested"));
        assert_eq!(entry.path(), dir.path().join("src/nested/util.js"));
        assert_eq!(entry.language, None);
    }

    #[test]
    fn test_entry_file_view() {
        let dir = create_test_dir();

        let entry = walk_files(dir.path())
            .unwrap()
            .filter_map(|r| r.ok())
            .find(|e| e.relative_path.ends_with("main.py"))
            .unwrap();
        let file = entry.file();

        assert_eq!(file.relative_path(), Path::new("src/main.py"));
        assert_eq!(file.protocol_language(), Some("python"));
        assert_eq!(file.content(), "print('hi')");
    }

    #[test]
    fn test_walk_files_rejects_file_root() {
        let dir = create_test_dir();
        let result = walk_files(&dir.path().join("LICENSE"));
        assert!(matches!(result, Err(WalkError::NotADirectory { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_kinds() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("shared")).unwrap();
        fs::write(dir.path().join("shared/util.go"), "package shared").unwrap();
        std::os::unix::fs::symlink("shared/util.go", dir.path().join("link.go")).unwrap();
        std::os::unix::fs::symlink("shared", dir.path().join("linkdir")).unwrap();
        std::os::unix::fs::symlink("missing.go", dir.path().join("dangling.go")).unwrap();

        let kind_of = |name: &str| {
            walk(dir.path())
                .filter_map(|r| r.ok())
                .find(|e| e.path == dir.path().join(name))
                .map(|e| e.kind)
        };

        assert_eq!(kind_of("link.go"), Some(EntryKind::File));
        assert_eq!(kind_of("linkdir"), Some(EntryKind::Symlink));
        assert_eq!(kind_of("dangling.go"), Some(EntryKind::Symlink));
        assert_eq!(
            relative_paths(dir.path()),
            vec!["link.go", "shared/util.go"]
        );
    }

    #[test]
    fn test_walk_groups_tags_language() {
        let dir = create_test_dir();
        let groups = vec![LanguageGroup {
            language: "python".to_string(),
            root: dir.path().join("src"),
            allocation: dir.path().join("src"),
        }];

        let entries: Vec<_> = walk_groups(&groups).map(|r| r.unwrap()).collect();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.language.as_deref() == Some("python")));
        assert!(entries.iter().any(|e| e.relative_path == Path::new("main.py")));
    }

    #[test]
    fn test_walk_groups_missing_root_fails() {
        let groups = vec![LanguageGroup {
            language: "go".to_string(),
            root: PathBuf::from("/nonexistent/group"),
            allocation: PathBuf::from("/nonexistent/group"),
        }];

        let results: Vec<_> = walk_groups(&groups).collect();
        assert_eq!(results.len(), 1);
        assert!(matches!(results[0], Err(WalkError::NotFound { .. })));
    }

    #[test]
    fn test_contains_files() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("empty/deeper")).unwrap();
        assert!(!contains_files(dir.path()).unwrap());

        fs::write(dir.path().join("empty/deeper/x.txt"), "x").unwrap();
        assert!(contains_files(dir.path()).unwrap());
    }
}
