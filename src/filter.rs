//! Per-language retention decisions.
//!
//! A file is kept in a language view when the registry says it is code for
//! that protocol language. [`KeepPolicy::ExcludeVendored`] additionally drops
//! paths the vendor filter flags.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use crate::language::classify;
use crate::vendor::is_vendored;

/// Errors from parsing filter settings.
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("unknown keep policy: {0} (expected `extension` or `exclude-vendored`)")]
    UnknownPolicy(String),
}

/// How a language view decides which files to retain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeepPolicy {
    /// Extension and language match only. Vendored files are retained.
    #[default]
    ExtensionOnly,
    /// Extension and language match, and the path is not vendored.
    ExcludeVendored,
}

impl KeepPolicy {
    /// Whether `path` belongs in the view for `language`.
    ///
    /// `path` should be relative to the view root so that vendor patterns
    /// anchored at the start of the path line up.
    pub fn keeps(self, path: &Path, language: &str) -> bool {
        if !keep(path, language) {
            return false;
        }
        match self {
            KeepPolicy::ExtensionOnly => true,
            KeepPolicy::ExcludeVendored => !is_vendored(path),
        }
    }
}

impl fmt::Display for KeepPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeepPolicy::ExtensionOnly => write!(f, "extension"),
            KeepPolicy::ExcludeVendored => write!(f, "exclude-vendored"),
        }
    }
}

impl FromStr for KeepPolicy {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "extension" | "extension-only" => Ok(KeepPolicy::ExtensionOnly),
            "exclude-vendored" | "strict" => Ok(KeepPolicy::ExcludeVendored),
            _ => Err(FilterError::UnknownPolicy(s.to_string())),
        }
    }
}

/// Baseline retention rule: keep code files of exactly `language`.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use withrepo::filter::keep;
///
/// assert!(keep(Path::new("app/main.py"), "python"));
/// assert!(!keep(Path::new("app/main.py"), "javascript"));
/// assert!(!keep(Path::new("README.md"), "markdown"));
/// ```
pub fn keep(path: &Path, language: &str) -> bool {
    let classification = classify(path);
    classification.is_code && classification.protocol_language == Some(language)
}
