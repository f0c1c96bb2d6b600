//! Extension-based language registry.
//!
//! Maps a file extension to a [`LanguageDescriptor`] and a language mode to the
//! protocol language identifier used by language-server tooling. Both tables
//! are compiled in and indexed once per process.

use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

use serde::Serialize;

/// Static description of one recognized extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LanguageDescriptor {
    /// Lowercase extension including the leading dot, e.g. `".py"`.
    pub extension: &'static str,
    /// Canonical language name, e.g. `"python"`.
    pub language_mode: &'static str,
    /// Whether files with this extension count as source code.
    pub is_code: bool,
}

impl LanguageDescriptor {
    const fn code(extension: &'static str, language_mode: &'static str) -> Self {
        Self {
            extension,
            language_mode,
            is_code: true,
        }
    }

    const fn data(extension: &'static str, language_mode: &'static str) -> Self {
        Self {
            extension,
            language_mode,
            is_code: false,
        }
    }

    /// Protocol language for this descriptor's mode, if any tooling speaks it.
    pub fn protocol_language(&self) -> Option<&'static str> {
        protocol_language(self.language_mode)
    }
}

/// Result of classifying a path against the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Classification {
    pub protocol_language: Option<&'static str>,
    pub language_mode: Option<&'static str>,
    pub is_code: bool,
}

impl Classification {
    /// Classification of a path whose extension is not in the registry.
    pub const UNKNOWN: Classification = Classification {
        protocol_language: None,
        language_mode: None,
        is_code: false,
    };

    /// Protocol language, but only when the file counts as code.
    pub fn code_language(&self) -> Option<&'static str> {
        if self.is_code {
            self.protocol_language
        } else {
            None
        }
    }
}

const EXTENSIONS: &[LanguageDescriptor] = &[
    // Source code
    LanguageDescriptor::code(".py", "python"),
    LanguageDescriptor::code(".pyi", "python"),
    LanguageDescriptor::code(".pyw", "python"),
    LanguageDescriptor::code(".js", "javascript"),
    LanguageDescriptor::code(".jsx", "javascript"),
    LanguageDescriptor::code(".mjs", "javascript"),
    LanguageDescriptor::code(".cjs", "javascript"),
    LanguageDescriptor::code(".ts", "typescript"),
    LanguageDescriptor::code(".tsx", "typescript"),
    LanguageDescriptor::code(".mts", "typescript"),
    LanguageDescriptor::code(".cts", "typescript"),
    LanguageDescriptor::code(".java", "java"),
    LanguageDescriptor::code(".kt", "kotlin"),
    LanguageDescriptor::code(".kts", "kotlin"),
    LanguageDescriptor::code(".scala", "scala"),
    LanguageDescriptor::code(".rs", "rust"),
    LanguageDescriptor::code(".go", "go"),
    LanguageDescriptor::code(".cs", "csharp"),
    LanguageDescriptor::code(".rb", "ruby"),
    LanguageDescriptor::code(".dart", "dart"),
    LanguageDescriptor::code(".c", "c"),
    LanguageDescriptor::code(".h", "c"),
    LanguageDescriptor::code(".cpp", "cpp"),
    LanguageDescriptor::code(".cc", "cpp"),
    LanguageDescriptor::code(".cxx", "cpp"),
    LanguageDescriptor::code(".hpp", "cpp"),
    LanguageDescriptor::code(".hh", "cpp"),
    LanguageDescriptor::code(".hxx", "cpp"),
    LanguageDescriptor::code(".m", "objective-c"),
    LanguageDescriptor::code(".mm", "objective-cpp"),
    LanguageDescriptor::code(".swift", "swift"),
    LanguageDescriptor::code(".php", "php"),
    LanguageDescriptor::code(".lua", "lua"),
    LanguageDescriptor::code(".pl", "perl"),
    LanguageDescriptor::code(".pm", "perl"),
    LanguageDescriptor::code(".r", "r"),
    LanguageDescriptor::code(".ex", "elixir"),
    LanguageDescriptor::code(".exs", "elixir"),
    LanguageDescriptor::code(".erl", "erlang"),
    LanguageDescriptor::code(".hrl", "erlang"),
    LanguageDescriptor::code(".hs", "haskell"),
    LanguageDescriptor::code(".clj", "clojure"),
    LanguageDescriptor::code(".cljs", "clojure"),
    LanguageDescriptor::code(".fs", "fsharp"),
    LanguageDescriptor::code(".fsx", "fsharp"),
    LanguageDescriptor::code(".sh", "shell"),
    LanguageDescriptor::code(".bash", "shell"),
    LanguageDescriptor::code(".zsh", "shell"),
    LanguageDescriptor::code(".ps1", "powershell"),
    LanguageDescriptor::code(".sql", "sql"),
    LanguageDescriptor::code(".vue", "vue"),
    LanguageDescriptor::code(".svelte", "svelte"),
    // Code without protocol support
    LanguageDescriptor::code(".zig", "zig"),
    LanguageDescriptor::code(".nim", "nim"),
    LanguageDescriptor::code(".ml", "ocaml"),
    LanguageDescriptor::code(".mli", "ocaml"),
    LanguageDescriptor::code(".f90", "fortran"),
    LanguageDescriptor::code(".f", "fortran"),
    LanguageDescriptor::code(".cob", "cobol"),
    LanguageDescriptor::code(".vb", "vb"),
    LanguageDescriptor::code(".pas", "pascal"),
    // Markup, styles and config
    LanguageDescriptor::data(".md", "markdown"),
    LanguageDescriptor::data(".markdown", "markdown"),
    LanguageDescriptor::data(".rst", "restructuredtext"),
    LanguageDescriptor::data(".txt", "plaintext"),
    LanguageDescriptor::data(".html", "html"),
    LanguageDescriptor::data(".htm", "html"),
    LanguageDescriptor::data(".css", "css"),
    LanguageDescriptor::data(".scss", "scss"),
    LanguageDescriptor::data(".sass", "sass"),
    LanguageDescriptor::data(".less", "less"),
    LanguageDescriptor::data(".json", "json"),
    LanguageDescriptor::data(".jsonc", "jsonc"),
    LanguageDescriptor::data(".yaml", "yaml"),
    LanguageDescriptor::data(".yml", "yaml"),
    LanguageDescriptor::data(".toml", "toml"),
    LanguageDescriptor::data(".ini", "ini"),
    LanguageDescriptor::data(".cfg", "ini"),
    LanguageDescriptor::data(".xml", "xml"),
    LanguageDescriptor::data(".csv", "csv"),
    LanguageDescriptor::data(".lock", "lockfile"),
    // Images, documents and binaries
    LanguageDescriptor::data(".png", "image"),
    LanguageDescriptor::data(".jpg", "image"),
    LanguageDescriptor::data(".jpeg", "image"),
    LanguageDescriptor::data(".gif", "image"),
    LanguageDescriptor::data(".bmp", "image"),
    LanguageDescriptor::data(".ico", "image"),
    LanguageDescriptor::data(".svg", "image"),
    LanguageDescriptor::data(".webp", "image"),
    LanguageDescriptor::data(".pdf", "document"),
    LanguageDescriptor::data(".zip", "archive"),
    LanguageDescriptor::data(".tar", "archive"),
    LanguageDescriptor::data(".gz", "archive"),
    LanguageDescriptor::data(".jar", "binary"),
    LanguageDescriptor::data(".class", "binary"),
    LanguageDescriptor::data(".exe", "binary"),
    LanguageDescriptor::data(".dll", "binary"),
    LanguageDescriptor::data(".so", "binary"),
    LanguageDescriptor::data(".dylib", "binary"),
    LanguageDescriptor::data(".o", "binary"),
    LanguageDescriptor::data(".a", "binary"),
    LanguageDescriptor::data(".wasm", "binary"),
    LanguageDescriptor::data(".pyc", "binary"),
];

/// Language mode to protocol language. Modes missing here have no tooling.
const PROTOCOL_LANGUAGES: &[(&str, &str)] = &[
    ("python", "python"),
    ("javascript", "javascript"),
    ("typescript", "typescript"),
    ("java", "java"),
    ("kotlin", "kotlin"),
    ("scala", "scala"),
    ("rust", "rust"),
    ("go", "go"),
    ("csharp", "csharp"),
    ("ruby", "ruby"),
    ("dart", "dart"),
    ("c", "c"),
    ("cpp", "cpp"),
    ("objective-c", "objective-c"),
    ("objective-cpp", "objective-cpp"),
    ("swift", "swift"),
    ("php", "php"),
    ("lua", "lua"),
    ("perl", "perl"),
    ("r", "r"),
    ("elixir", "elixir"),
    ("erlang", "erlang"),
    ("haskell", "haskell"),
    ("clojure", "clojure"),
    ("fsharp", "fsharp"),
    ("shell", "shellscript"),
    ("powershell", "powershell"),
    ("sql", "sql"),
    ("vue", "vue"),
    ("svelte", "svelte"),
    ("markdown", "markdown"),
    ("restructuredtext", "restructuredtext"),
    ("plaintext", "plaintext"),
    ("html", "html"),
    ("css", "css"),
    ("scss", "scss"),
    ("sass", "sass"),
    ("less", "less"),
    ("json", "json"),
    ("jsonc", "jsonc"),
    ("yaml", "yaml"),
    ("toml", "toml"),
    ("ini", "ini"),
    ("xml", "xml"),
];

static EXTENSION_INDEX: OnceLock<HashMap<&'static str, &'static LanguageDescriptor>> =
    OnceLock::new();
static PROTOCOL_INDEX: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();

fn extension_index() -> &'static HashMap<&'static str, &'static LanguageDescriptor> {
    EXTENSION_INDEX.get_or_init(|| EXTENSIONS.iter().map(|d| (d.extension, d)).collect())
}

fn protocol_index() -> &'static HashMap<&'static str, &'static str> {
    PROTOCOL_INDEX.get_or_init(|| PROTOCOL_LANGUAGES.iter().copied().collect())
}

/// Every descriptor in the registry, in table order.
pub fn descriptors() -> &'static [LanguageDescriptor] {
    EXTENSIONS
}

/// Look up a descriptor by extension (with or without the leading dot).
pub fn descriptor(extension: &str) -> Option<&'static LanguageDescriptor> {
    let ext = extension.to_lowercase();
    if ext.starts_with('.') {
        extension_index().get(ext.as_str()).copied()
    } else {
        extension_index().get(format!(".{ext}").as_str()).copied()
    }
}

/// Protocol language for a language mode.
pub fn protocol_language(language_mode: &str) -> Option<&'static str> {
    protocol_index().get(language_mode).copied()
}

/// Extension of `path` as used for registry lookup: lowercase, dot included.
///
/// Leading dots of the file name do not start an extension (`.bashrc` has
/// none). A file whose stem is `readme` in any case is treated as `.md`.
pub fn extension_of(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_string_lossy();
    let trimmed = name.trim_start_matches('.');
    let (stem, ext) = match trimmed.rsplit_once('.') {
        Some((stem, ext)) => (stem, Some(ext)),
        None => (trimmed, None),
    };

    if stem.eq_ignore_ascii_case("readme") {
        return Some(".md".to_string());
    }

    ext.map(|e| format!(".{}", e.to_lowercase()))
}

/// Classify a path by its extension.
///
/// Unknown extensions yield [`Classification::UNKNOWN`].
///
/// # Examples
///
/// ```
/// use withrepo::language::classify;
///
/// let c = classify("src/app.TSX");
/// assert_eq!(c.protocol_language, Some("typescript"));
/// assert!(c.is_code);
/// ```
pub fn classify(path: impl AsRef<Path>) -> Classification {
    let Some(ext) = extension_of(path.as_ref()) else {
        return Classification::UNKNOWN;
    };

    match extension_index().get(ext.as_str()) {
        Some(descriptor) => Classification {
            protocol_language: descriptor.protocol_language(),
            language_mode: Some(descriptor.language_mode),
            is_code: descriptor.is_code,
        },
        None => Classification::UNKNOWN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_extension_keys_are_unique() {
        let mut seen = HashSet::new();
        for d in EXTENSIONS {
            assert!(seen.insert(d.extension), "duplicate extension {}", d.extension);
            assert!(d.extension.starts_with('.'));
            assert_eq!(d.extension, d.extension.to_lowercase());
        }
    }

    #[test]
    fn test_classify_known_extensions() {
        let py = classify("pkg/module.py");
        assert_eq!(py.protocol_language, Some("python"));
        assert_eq!(py.language_mode, Some("python"));
        assert!(py.is_code);

        let rs = classify("src/lib.rs");
        assert_eq!(rs.protocol_language, Some("rust"));

        let sh = classify("scripts/build.sh");
        assert_eq!(sh.language_mode, Some("shell"));
        assert_eq!(sh.protocol_language, Some("shellscript"));
    }

    #[test]
    fn test_ts_and_tsx_share_language() {
        assert_eq!(classify("a.ts"), classify("b.tsx"));
        assert_eq!(classify("a.ts").protocol_language, Some("typescript"));
    }

    #[test]
    fn test_classify_is_case_insensitive() {
        assert_eq!(classify("Main.JAVA"), classify("Main.java"));
        assert_eq!(classify("X.Py").protocol_language, Some("python"));
    }

    #[test]
    fn test_unknown_extension() {
        assert_eq!(classify("LICENSE"), Classification::UNKNOWN);
        assert_eq!(classify("data.unknownext"), Classification::UNKNOWN);
        assert_eq!(classify(".bashrc"), Classification::UNKNOWN);
    }

    #[test]
    fn test_readme_is_markdown() {
        for name in ["README", "readme.txt", "ReadMe.rst", "docs/README.md"] {
            let c = classify(name);
            assert_eq!(c.language_mode, Some("markdown"), "{name}");
            assert!(!c.is_code);
        }
    }

    #[test]
    fn test_code_without_protocol_language() {
        let c = classify("build.zig");
        assert_eq!(c.language_mode, Some("zig"));
        assert!(c.is_code);
        assert_eq!(c.protocol_language, None);
        assert_eq!(c.code_language(), None);
    }

    #[test]
    fn test_non_code_has_no_code_language() {
        let c = classify("index.html");
        assert_eq!(c.protocol_language, Some("html"));
        assert!(!c.is_code);
        assert_eq!(c.code_language(), None);
    }

    #[test]
    fn test_classify_is_pure() {
        for path in ["a.py", "b.go", "c.md", "d", "e.tar.gz"] {
            assert_eq!(classify(path), classify(path));
        }
    }

    #[test]
    fn test_last_dot_wins() {
        assert_eq!(extension_of(Path::new("archive.tar.gz")).as_deref(), Some(".gz"));
        assert_eq!(extension_of(Path::new("types.d.ts")).as_deref(), Some(".ts"));
        assert_eq!(extension_of(Path::new("Makefile")), None);
    }

    #[test]
    fn test_descriptor_lookup() {
        assert_eq!(descriptor("go").map(|d| d.language_mode), Some("go"));
        assert_eq!(descriptor(".GO").map(|d| d.language_mode), Some("go"));
        assert!(descriptor("nope").is_none());
    }
}
