//! withrepo CLI - classify files and split a tree by language.

use std::collections::BTreeMap;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use withrepo::builder::Splitter;
use withrepo::errors::{exit_code, Error};
use withrepo::filter::KeepPolicy;
use withrepo::language::{classify, descriptors};
use withrepo::vendor::{is_vendored, matching_rules};
use withrepo::walker::TreeEntry;

#[derive(Parser)]
#[command(name = "withrepo")]
#[command(about = "Classify repository files by language and split trees per language")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify paths by extension and vendor rules
    Classify {
        /// Paths to classify (need not exist)
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List files, flat or per language
    Tree {
        /// Root directory to list
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Split by language first and list each group
        #[arg(long)]
        multilang: bool,

        /// Retention policy for language groups
        #[arg(long, default_value_t = KeepPolicy::ExtensionOnly)]
        policy: KeepPolicy,

        /// Keep the top-level wrapper directory of each group
        #[arg(long, requires = "multilang")]
        no_collapse: bool,

        /// Directory to allocate language groups in
        #[arg(long)]
        temp_dir: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Split a tree into per-language copies
    Split {
        /// Root directory to split
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Retention policy for language groups
        #[arg(long, default_value_t = KeepPolicy::ExtensionOnly)]
        policy: KeepPolicy,

        /// Keep the top-level wrapper directory of each group
        #[arg(long)]
        no_collapse: bool,

        /// Directory to allocate language groups in
        #[arg(long)]
        temp_dir: Option<PathBuf>,

        /// Leave the group directories on disk
        #[arg(long)]
        keep: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the extension registry
    Languages {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let json_output = json_flag(&cli.command);

    let result = match cli.command {
        Commands::Classify { paths, json } => run_classify(paths, json),
        Commands::Tree {
            path,
            multilang,
            policy,
            no_collapse,
            temp_dir,
            json,
        } => run_tree(path, multilang, policy, !no_collapse, temp_dir, json),
        Commands::Split {
            path,
            policy,
            no_collapse,
            temp_dir,
            keep,
            json,
        } => run_split(path, policy, !no_collapse, temp_dir, keep, json),
        Commands::Languages { json } => run_languages(json),
        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "withrepo", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        if json_output {
            #[derive(Serialize)]
            struct ErrorOutput {
                error: String,
            }

            let payload = ErrorOutput {
                error: e.to_string(),
            };

            let json = serde_json::to_string(&payload)
                .unwrap_or_else(|_| "{\"error\":\"serialization failed\"}".to_string());
            eprintln!("{json}");
        } else {
            eprintln!("error: {}", e);
        }
        std::process::exit(exit_code(&e));
    }
}

/// Logs go to stderr. `RUST_LOG` overrides the `-v` level.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("withrepo={level}")));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn json_flag(cmd: &Commands) -> bool {
    match cmd {
        Commands::Classify { json, .. } => *json,
        Commands::Tree { json, .. } => *json,
        Commands::Split { json, .. } => *json,
        Commands::Languages { json } => *json,
        Commands::Completions { .. } => false,
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Error> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}

// --- Classify command ---

#[derive(Serialize)]
struct ClassifyRow {
    path: String,
    protocol_language: Option<&'static str>,
    language_mode: Option<&'static str>,
    is_code: bool,
    vendored: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    vendor_rules: Vec<&'static str>,
}

fn run_classify(paths: Vec<PathBuf>, json: bool) -> Result<(), Error> {
    let rows: Vec<ClassifyRow> = paths
        .iter()
        .map(|path| {
            let c = classify(path);
            ClassifyRow {
                path: path.display().to_string(),
                protocol_language: c.protocol_language,
                language_mode: c.language_mode,
                is_code: c.is_code,
                vendored: is_vendored(path),
                vendor_rules: matching_rules(path),
            }
        })
        .collect();

    if json {
        return print_json(&rows);
    }

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for row in &rows {
        let mut flags = Vec::new();
        if row.is_code {
            flags.push("code");
        }
        if row.vendored {
            flags.push("vendored");
        }
        writeln!(
            out,
            "{}: {} ({}) [{}]",
            row.path,
            row.protocol_language.unwrap_or("-"),
            row.language_mode.unwrap_or("unknown"),
            flags.join(", ")
        )?;
    }
    out.flush()?;
    Ok(())
}

// --- Tree command ---

fn splitter(
    path: PathBuf,
    policy: KeepPolicy,
    collapse: bool,
    temp_dir: Option<PathBuf>,
) -> Splitter {
    let splitter = Splitter::new(path)
        .policy(policy)
        .collapse_single_root(collapse);
    match temp_dir {
        Some(dir) => splitter.temp_root(dir),
        None => splitter,
    }
}

fn run_tree(
    path: PathBuf,
    multilang: bool,
    policy: KeepPolicy,
    collapse: bool,
    temp_dir: Option<PathBuf>,
    json: bool,
) -> Result<(), Error> {
    let tree = splitter(path, policy, collapse, temp_dir).tree(multilang)?;

    if json {
        #[derive(Serialize)]
        struct Output<'a> {
            files: &'a [TreeEntry],
        }
        return print_json(&Output {
            files: &tree.entries,
        });
    }

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for entry in &tree.entries {
        match &entry.language {
            Some(language) => writeln!(
                out,
                "{}\t{}\t{}",
                language,
                entry.directory.display(),
                entry.relative_path.display()
            )?,
            None => writeln!(
                out,
                "{}\t{}",
                entry.directory.display(),
                entry.relative_path.display()
            )?,
        }
    }
    out.flush()?;
    Ok(())
}

// --- Split command ---

#[derive(Serialize)]
struct GroupRow {
    language: String,
    root: String,
    files: usize,
}

fn run_split(
    path: PathBuf,
    policy: KeepPolicy,
    collapse: bool,
    temp_dir: Option<PathBuf>,
    keep: bool,
    json: bool,
) -> Result<(), Error> {
    let split = splitter(path, policy, collapse, temp_dir).split()?;

    let counts = split.file_counts()?;
    let rows: Vec<GroupRow> = split
        .groups()
        .iter()
        .map(|g| GroupRow {
            language: g.language.clone(),
            root: g.root.display().to_string(),
            files: counts.get(&g.language).copied().unwrap_or(0),
        })
        .collect();

    if keep {
        split.persist();
    }

    if json {
        #[derive(Serialize)]
        struct Output {
            kept: bool,
            groups: Vec<GroupRow>,
        }
        return print_json(&Output { kept: keep, groups: rows });
    }

    if rows.is_empty() {
        println!("No code files found");
        return Ok(());
    }
    for row in &rows {
        println!("{:12} {:>6} files  {}", row.language, row.files, row.root);
    }
    Ok(())
}

// --- Languages command ---

#[derive(Serialize)]
struct LanguageInfo {
    language_mode: &'static str,
    protocol_language: Option<&'static str>,
    is_code: bool,
    extensions: Vec<&'static str>,
}

fn run_languages(json: bool) -> Result<(), Error> {
    let mut by_mode: BTreeMap<&'static str, LanguageInfo> = BTreeMap::new();
    for descriptor in descriptors() {
        by_mode
            .entry(descriptor.language_mode)
            .or_insert_with(|| LanguageInfo {
                language_mode: descriptor.language_mode,
                protocol_language: descriptor.protocol_language(),
                is_code: descriptor.is_code,
                extensions: Vec::new(),
            })
            .extensions
            .push(descriptor.extension);
    }
    let languages: Vec<LanguageInfo> = by_mode.into_values().collect();

    if json {
        #[derive(Serialize)]
        struct Output {
            languages: Vec<LanguageInfo>,
        }
        return print_json(&Output { languages });
    }

    println!("Known languages:");
    for lang in &languages {
        println!(
            "  {:18} {:18} {:5} {}",
            lang.language_mode,
            lang.protocol_language.unwrap_or("-"),
            if lang.is_code { "code" } else { "" },
            lang.extensions.join(", ")
        );
    }
    Ok(())
}
