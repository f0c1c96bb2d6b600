//! Fluent builder API for withrepo.
//!
//! [`Splitter`] configures a partition pass over an extracted tree.
//! [`LanguageSplit`] owns the resulting group directories and removes them
//! when dropped.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::errors::Error;
use crate::filter::KeepPolicy;
use crate::partition::{cleanup_groups, partition, LanguageGroup, PartitionOptions};
use crate::walker::{walk_files, walk_groups, TreeEntry, WalkError};

/// Builder for splitting a tree by language.
///
/// # Examples
///
/// ```no_run
/// use withrepo::builder::Splitter;
///
/// let split = Splitter::new("./repo")
///     .exclude_vendored(true)
///     .split()
///     .unwrap();
///
/// for group in split.groups() {
///     println!("{}: {}", group.language, group.root.display());
/// }
/// // group directories are removed when `split` goes out of scope
/// ```
#[derive(Debug, Clone)]
pub struct Splitter {
    root: PathBuf,
    options: PartitionOptions,
}

impl Splitter {
    /// Create a new builder for the given root path.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            options: PartitionOptions::default(),
        }
    }

    /// Drop vendored files from every group (default: false).
    pub fn exclude_vendored(mut self, exclude: bool) -> Self {
        self.options.policy = if exclude {
            KeepPolicy::ExcludeVendored
        } else {
            KeepPolicy::ExtensionOnly
        };
        self
    }

    /// Set the retention policy directly.
    pub fn policy(mut self, policy: KeepPolicy) -> Self {
        self.options.policy = policy;
        self
    }

    /// Collapse a single top-level wrapper directory (default: true).
    pub fn collapse_single_root(mut self, collapse: bool) -> Self {
        self.options.collapse_single_root = collapse;
        self
    }

    /// Allocate group directories under `dir` instead of the system temp dir.
    pub fn temp_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.options.temp_root = Some(dir.into());
        self
    }

    fn check_root(&self) -> Result<(), Error> {
        if !self.root.exists() {
            return Err(Error::PathNotFound(self.root.clone()));
        }
        if !self.root.is_dir() {
            return Err(Error::NotADirectory(self.root.clone()));
        }
        Ok(())
    }

    /// Partition the tree.
    pub fn split(self) -> Result<LanguageSplit, Error> {
        self.check_root()?;
        let groups = partition(&self.root, &self.options)?;
        Ok(LanguageSplit {
            root: self.root,
            groups,
        })
    }

    /// List the tree's files, flat or per language.
    ///
    /// With `multilang` the tree is partitioned first and the returned
    /// [`Tree`] keeps the group directories alive until it is dropped.
    pub fn tree(self, multilang: bool) -> Result<Tree, Error> {
        if multilang {
            let split = self.split()?;
            let entries = split.entries().collect::<Result<Vec<_>, _>>()?;
            Ok(Tree {
                entries,
                split: Some(split),
            })
        } else {
            self.check_root()?;
            let entries = walk_files(&self.root)?.collect::<Result<Vec<_>, _>>()?;
            Ok(Tree {
                entries,
                split: None,
            })
        }
    }
}

/// Language groups produced by [`Splitter::split`].
///
/// Group directories are removed on drop; use [`LanguageSplit::persist`] to
/// keep them.
#[derive(Debug)]
pub struct LanguageSplit {
    root: PathBuf,
    groups: Vec<LanguageGroup>,
}

impl LanguageSplit {
    /// The tree that was partitioned.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn groups(&self) -> &[LanguageGroup] {
        &self.groups
    }

    /// Languages with a group, in discovery order.
    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.language.as_str())
    }

    /// Group for a specific language.
    pub fn group(&self, language: &str) -> Option<&LanguageGroup> {
        self.groups.iter().find(|g| g.language == language)
    }

    /// Files of every group, tagged with their language.
    pub fn entries(&self) -> impl Iterator<Item = Result<TreeEntry, WalkError>> + '_ {
        walk_groups(&self.groups)
    }

    /// Number of files in each group.
    pub fn file_counts(&self) -> Result<BTreeMap<String, usize>, WalkError> {
        let mut counts = BTreeMap::new();
        for entry in self.entries() {
            if let Some(language) = entry?.language {
                *counts.entry(language).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }

    /// Remove every group directory now. Safe to call more than once.
    pub fn cleanup(&mut self) {
        cleanup_groups(&self.groups);
        self.groups.clear();
    }

    /// Keep the group directories on disk and hand them to the caller.
    pub fn persist(mut self) -> Vec<LanguageGroup> {
        std::mem::take(&mut self.groups)
    }
}

impl Drop for LanguageSplit {
    fn drop(&mut self) {
        self.cleanup();
    }
}

/// File listing from [`Splitter::tree`].
#[derive(Debug)]
pub struct Tree {
    /// Listed files.
    pub entries: Vec<TreeEntry>,
    split: Option<LanguageSplit>,
}

impl Tree {
    /// Groups backing a multi-language listing.
    pub fn split(&self) -> Option<&LanguageSplit> {
        self.split.as_ref()
    }
}

/// Partition a tree with default options.
pub fn split_from_path(root: impl AsRef<Path>) -> Result<LanguageSplit, Error> {
    Splitter::new(root.as_ref()).split()
}
