//! Vendored, generated and build-output path detection.
//!
//! Patterns are matched against posix-style paths relative to a walk root.
//! Each pattern carries its own anchoring, usually `(^|/)` for a path-segment
//! boundary and `$` for a full basename.

use std::borrow::Cow;
use std::path::{Component, Path};
use std::sync::OnceLock;

use regex::RegexSet;

/// Compiled-in vendor patterns. Order carries no priority.
pub const VENDOR_PATTERNS: &[&str] = &[
    // Python bytecode and packaging
    r"(^|/)__pycache__/",
    r"(^|/)build/",
    r"(^|/)dist/",
    r"(^|/)develop-eggs/",
    r"(^|/)downloads/",
    r"(^|/)eggs/",
    r"(^|/)\.eggs/",
    r"(^|/)lib/",
    r"(^|/)lib64/",
    r"(^|/)parts/",
    r"(^|/)sdist/",
    r"(^|/)var/",
    r"(^|/)wheels/",
    r"(^|/)pip-wheel-metadata/",
    r"(^|/)share/python-wheels/",
    r"(^|/)\.egg-info/",
    // Test and coverage reports
    r"(^|/)htmlcov/",
    r"(^|/)\.tox/",
    r"(^|/)\.nox/",
    r"(^|/)\.hypothesis/",
    r"(^|/)\.pytest_cache/",
    r"(^|/)target/",
    r"(^|/)profile_default/",
    r"(^|/)ipython_config\.py$",
    r"(^|/)__pypackages__/",
    r"(^|/)\.mypy_cache/",
    r"(^|/)\.pyre/",
    r"(^|/)cache/",
    // Dependencies
    r"^[Dd]ependencies/",
    r"^deps/",
    r"(^|/)configure$",
    r"(^|/)dotnet-install\.(ps1|sh)$",
    r"(^|/)cpplint\.py",
    r"(^|/)node_modules/",
    r"(^|/)\.next/",
    r"(^|/)out/",
    r"(^|/)\.yarn/releases/",
    r"(^|/)\.yarn/plugins/",
    r"(^|/)\.yarn/sdks/",
    r"(^|/)\.yarn/versions/",
    r"(^|/)\.yarn/unplugged/",
    r"(^|/)_esy$",
    r"(^|/)bower_components/",
    r"^rebar$",
    r"(^|/)Godeps/_workspace/",
    r"(^|/)testdata/",
    // Bundled CSS frameworks
    r"(^|/)bootstrap([^/.]*)\.(.*\.)?(js|css|less|scss|styl)$",
    r"(^|/)custom\.bootstrap([^\s]*)(js|css|less|scss|styl)$",
    r"(^|/)select2/.*\.(css|scss|js)$",
    r"(^|/)bulma\.(css|sass|scss)$",
    // Vendored trees
    r"(3rd|[Tt]hird)[-_]?[Pp]arty/",
    r"(^|/)vendors?/",
    r"(^|/)[Ee]xtern(als?)?/",
    r"(^|/)[Vv]+endor/",
    r"^debian/",
    r"(^|/)run\.n$",
    r"(^|/)bootstrap-datepicker/",
    // Bundled JavaScript libraries
    r"(^|/)jquery([^.]*)\.js$",
    r"(^|/)jquery-\d\.\d+(\.\d+)?\.js$",
    r"(^|/)jquery-ui(-\d\.\d+(\.\d+)?)?(\.\w+)?\.(js|css)$",
    r"(^|/)jquery\.(ui|effects)\.([^.]*)\.(js|css)$",
    r"(^|/)jquery\.fn\.gantt\.js",
    r"(^|/)jquery\.fancybox\.(js|css)",
    r"(^|/)fuelux\.js",
    r"(^|/)jquery\.fileupload(-\w+)?\.js$",
    r"(^|/)jquery\.dataTables\.js",
    r"(^|/)bootbox\.js",
    r"(^|/)pdf\.worker\.js",
    r"(^|/)slick\.\w+.js$",
    r"(^|/)Leaflet\.Coordinates-\d+\.\d+\.\d+\.src\.js$",
    r"(^|/)leaflet\.draw-src\.js",
    r"(^|/)leaflet\.draw\.css",
    r"(^|/)Control\.FullScreen\.css",
    r"(^|/)Control\.FullScreen\.js",
    r"(^|/)leaflet\.spin\.js",
    r"(^|/)wicket-leaflet\.js",
    r"(^|/)\.sublime-project",
    r"(^|/)\.sublime-workspace",
    r"(^|/)\.vscode/",
    r"(^|/)prototype(.*)\.js$",
    r"(^|/)effects\.js$",
    r"(^|/)controls\.js$",
    r"(^|/)dragdrop\.js$",
    r"(.*?)\.d\.ts$",
    r"(^|/)mootools([^.]*)\d+\.\d+.\d+([^.]*)\.js$",
    r"(^|/)dojo\.js$",
    r"(^|/)MochiKit\.js$",
    r"(^|/)yahoo-([^.]*)\.js$",
    r"(^|/)yui([^.]*)\.js$",
    r"(^|/)ckeditor\.js$",
    r"(^|/)tiny_mce([^.]*)\.js$",
    r"(^|/)tiny_mce/(langs|plugins|themes|utils)",
    r"(^|/)ace-builds/",
    r"(^|/)fontello(.*?)\.css$",
    r"(^|/)MathJax/",
    r"(^|/)Chart\.js$",
    r"(^|/)[Cc]ode[Mm]irror/(\d+\.\d+/)?(lib|mode|theme|addon|keymap|demo)",
    r"(^|/)shBrush([^.]*)\.js$",
    r"(^|/)shCore\.js$",
    r"(^|/)shLegacy\.js$",
    r"(^|/)angular([^.]*)\.js$",
    r"(^|/)d3(\.v\d+)?([^.]*)\.js$",
    r"(^|/)react(-[^.]*)?\.js$",
    r"(^|/)flow-typed/.*\.js$",
    r"(^|/)modernizr-\d\.\d+(\.\d+)?\.js$",
    r"(^|/)modernizr\.custom\.\d+\.js$",
    r"(^|/)knockout-(\d+\.){3}(debug\.)?js$",
    // Python frameworks
    r"(^|/)docs?/_?(build|themes?|templates?|static)/",
    r"(^|/)admin_media/",
    r"(^|/)local_settings\.py",
    r"(^|/)instance/",
    r"(^|/)fabfile\.py$",
    r"(^|/)waf$",
    r"(^|/)\.osx$",
    // Xcode and Apple frameworks
    r"\.xctemplate/",
    r"\.imageset/",
    r"(^|/)Carthage/",
    r"(^|/)Sparkle/",
    r"(^|/)Crashlytics\.framework/",
    r"(^|/)Fabric\.framework/",
    r"(^|/)BuddyBuildSDK\.framework/",
    r"(^|/)Realm\.framework",
    r"(^|/)RealmSwift\.framework",
    // VCS metadata
    r"(^|/)\.gitattributes$",
    r"(^|/)\.gitignore$",
    r"(^|/)\.gitmodules$",
    // Build tool wrappers
    r"(^|/)gradlew$",
    r"(^|/)gradlew\.bat$",
    r"(^|/)gradle/wrapper/",
    r"(^|/)mvnw$",
    r"(^|/)mvnw\.cmd$",
    r"(^|/)\.mvn/wrapper/",
    // .NET
    r"-vsdoc\.js$",
    r"\.intellisense\.js$",
    r"(^|/)jquery([^.]*)\.validate(\.unobtrusive)?\.js$",
    r"(^|/)jquery([^.]*)\.unobtrusive-ajax\.js$",
    r"(^|/)[Mm]icrosoft([Mm]vc)?([Aa]jax|[Vv]alidation)(\.debug)?\.js$",
    r"(^|/)[Pp]ackages/.+\.\d+/",
    // ExtJS
    r"(^|/)extjs/.*?\.js$",
    r"(^|/)extjs/.*?\.xml$",
    r"(^|/)extjs/.*?\.txt$",
    r"(^|/)extjs/.*?\.html$",
    r"(^|/)extjs/.*?\.properties$",
    r"(^|/)extjs/\.sencha/",
    r"(^|/)extjs/docs/",
    r"(^|/)extjs/builds/",
    r"(^|/)extjs/cmd/",
    r"(^|/)extjs/examples/",
    r"(^|/)extjs/locale/",
    r"(^|/)extjs/packages/",
    r"(^|/)extjs/plugins/",
    r"(^|/)extjs/resources/",
    r"(^|/)extjs/src/",
    r"(^|/)extjs/welcome/",
    r"(^|/)html5shiv\.js$",
    // Test fixtures
    r"(^|/)[Tt]ests?/fixtures/",
    r"(^|/)[Ss]pecs?/fixtures/",
    r"(^|/)cordova([^.]*)\.js$",
    r"(^|/)cordova-\d\.\d(\.\d)?\.js$",
    r"(^|/)foundation(\..*)?\.js$",
    r"(^|/)Vagrantfile$",
    r"(^|/)vignettes/",
    r"(^|/)inst/extdata/",
    r"(^|/)activator$",
    r"(^|/)puphpet/",
    r"(^|/)\.google_apis/",
    r"(^|/)Jenkinsfile$",
    r"(^|/)\.github/",
    // Virtual environments
    r"(^|/)venv/",
    r"(^|/)env/",
    r"(^|/)ENV/",
    r"(^|/)env\.bak/",
    r"(^|/)venv\.bak/",
    // Lock files
    r"(^|/)package-lock\.json",
    r"(^|/)yarn\.lock",
    r"(^|/)pnpm-lock\.ya?ml",
    r"(^|/)pnpm-workspace\.ya?ml",
    r"(^|/)pnpm-workspace\.json",
    r"(^|/)Pipfile\.lock",
    r"(^|/).*\.lock$",
];

static VENDOR_SET: OnceLock<RegexSet> = OnceLock::new();

fn vendor_set() -> &'static RegexSet {
    VENDOR_SET.get_or_init(|| {
        RegexSet::new(VENDOR_PATTERNS).expect("compiled-in vendor patterns must be valid")
    })
}

/// Render a relative path with `/` separators, dropping root and `.` parts.
pub fn posix_path(path: &Path) -> Cow<'_, str> {
    let simple = path
        .components()
        .all(|c| matches!(c, Component::Normal(_)));
    if simple && std::path::MAIN_SEPARATOR == '/' {
        return path.to_string_lossy();
    }

    let parts: Vec<_> = path
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect();
    Cow::Owned(parts.join("/"))
}

/// Whether `path` (relative to some walk root) is vendored or generated.
///
/// # Examples
///
/// ```
/// use withrepo::vendor::is_vendored;
///
/// assert!(is_vendored("node_modules/left-pad/index.js"));
/// assert!(!is_vendored("src/index.js"));
/// ```
pub fn is_vendored(path: impl AsRef<Path>) -> bool {
    vendor_set().is_match(&posix_path(path.as_ref()))
}

/// Every pattern that matches `path`, in table order.
pub fn matching_rules(path: impl AsRef<Path>) -> Vec<&'static str> {
    vendor_set()
        .matches(&posix_path(path.as_ref()))
        .into_iter()
        .map(|i| VENDOR_PATTERNS[i])
        .collect()
}
