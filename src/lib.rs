//! withrepo - language-segmented views of a source tree.
//!
//! Given an extracted repository, withrepo classifies every file by extension,
//! flags vendored and generated paths, and splits the tree into one filtered
//! copy per detected language.
//!
//! # Quick Start
//!
//! ```no_run
//! use withrepo::builder::Splitter;
//!
//! let split = Splitter::new("./my-repo")
//!     .exclude_vendored(true)
//!     .split()
//!     .unwrap();
//!
//! for entry in split.entries().flatten() {
//!     println!("{:?} {}", entry.language, entry.relative_path.display());
//! }
//! ```
//!
//! # Modules
//!
//! - [`language`] - Extension to language registry
//! - [`vendor`] - Vendored/generated path patterns
//! - [`filter`] - Per-language retention rules
//! - [`walker`] - Directory traversal and file listings
//! - [`partition`] - Per-language tree copies and cleanup
//! - [`repo_file`] - File view with lazy content
//! - [`builder`] - Fluent API owning the group directories

pub mod language;
pub mod vendor;
pub mod filter;
pub mod errors;
pub mod walker;
pub mod partition;
pub mod repo_file;
pub mod builder;

// Re-export key types at crate root for convenience
pub use builder::{LanguageSplit, Splitter, Tree};
pub use errors::Error;
pub use filter::{keep, FilterError, KeepPolicy};
pub use language::{classify, Classification, LanguageDescriptor};
pub use partition::{cleanup, cleanup_groups, partition, LanguageGroup, PartitionError, PartitionOptions};
pub use repo_file::RepoFile;
pub use vendor::is_vendored;
pub use walker::{walk_files, walk_groups, TreeEntry, WalkError};
