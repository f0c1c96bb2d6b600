//! Properties of partitioning over a mixed-language tree.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use tempfile::TempDir;
use withrepo::language::classify;
use withrepo::partition::{cleanup_groups, partition, LanguageGroup, PartitionOptions};
use withrepo::walker::{walk_files, walk_groups};

fn write(root: &Path, rel: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, format!("// {rel}\n")).unwrap();
}

fn fixture() -> TempDir {
    let dir = TempDir::new().unwrap();
    for rel in [
        "api/server.go",
        "api/handlers/users.go",
        "web/src/index.ts",
        "web/src/App.tsx",
        "web/scripts/build.js",
        "web/package-lock.json",
        "tools/gen.py",
        "tools/README",
        "docs/index.html",
        "Makefile",
        "LICENSE",
    ] {
        write(dir.path(), rel);
    }
    dir
}

fn group_files(group: &LanguageGroup) -> BTreeSet<PathBuf> {
    walk_files(&group.root)
        .unwrap()
        .map(|r| r.unwrap().relative_path)
        .collect()
}

fn counts(groups: &[LanguageGroup]) -> BTreeMap<String, usize> {
    groups
        .iter()
        .map(|g| (g.language.clone(), group_files(g).len()))
        .collect()
}

fn options(temp: &TempDir) -> PartitionOptions {
    PartitionOptions {
        temp_root: Some(temp.path().to_path_buf()),
        ..Default::default()
    }
}

#[test]
fn every_code_file_lands_in_its_group() {
    let src = fixture();
    let temp = TempDir::new().unwrap();
    let groups = partition(src.path(), &options(&temp)).unwrap();

    for entry in walk_files(src.path()).unwrap() {
        let entry = entry.unwrap();
        let Some(language) = classify(&entry.relative_path).code_language() else {
            continue;
        };
        let group = groups.iter().find(|g| g.language == language).unwrap();
        assert!(
            group.root.join(&entry.relative_path).is_file(),
            "{} missing from {language}",
            entry.relative_path.display()
        );
    }
    cleanup_groups(&groups);
}

#[test]
fn groups_only_hold_their_language() {
    let src = fixture();
    let temp = TempDir::new().unwrap();
    let groups = partition(src.path(), &options(&temp)).unwrap();

    for entry in walk_groups(&groups) {
        let entry = entry.unwrap();
        let c = classify(&entry.relative_path);
        assert!(c.is_code);
        assert_eq!(c.protocol_language, entry.language.as_deref());
    }
    cleanup_groups(&groups);
}

#[test]
fn no_group_is_empty() {
    let src = fixture();
    let temp = TempDir::new().unwrap();
    let groups = partition(src.path(), &options(&temp)).unwrap();

    assert!(!groups.is_empty());
    assert!(groups.iter().all(|g| !group_files(g).is_empty()));
    cleanup_groups(&groups);
}

#[test]
fn partitioning_twice_is_stable() {
    let src = fixture();
    let temp = TempDir::new().unwrap();

    let first = partition(src.path(), &options(&temp)).unwrap();
    let second = partition(src.path(), &options(&temp)).unwrap();

    assert_eq!(counts(&first), counts(&second));
    let expected: BTreeMap<String, usize> = [
        ("go".to_string(), 2),
        ("javascript".to_string(), 1),
        ("python".to_string(), 1),
        ("typescript".to_string(), 2),
    ]
    .into_iter()
    .collect();
    assert_eq!(counts(&first), expected);

    let first_roots: BTreeSet<_> = first.iter().map(|g| g.allocation.clone()).collect();
    assert!(second.iter().all(|g| !first_roots.contains(&g.allocation)));

    cleanup_groups(&first);
    cleanup_groups(&second);
}

#[test]
fn flat_walk_is_superset_of_every_group() {
    let src = fixture();
    let temp = TempDir::new().unwrap();
    let groups = partition(src.path(), &options(&temp)).unwrap();

    let all: BTreeSet<PathBuf> = walk_files(src.path())
        .unwrap()
        .map(|r| r.unwrap().relative_path)
        .collect();

    for group in &groups {
        assert!(group_files(group).is_subset(&all), "{}", group.language);
    }
    cleanup_groups(&groups);
}

#[test]
fn walking_after_cleanup_fails() {
    let src = fixture();
    let temp = TempDir::new().unwrap();
    let groups = partition(src.path(), &options(&temp)).unwrap();

    cleanup_groups(&groups);

    assert!(walk_groups(&groups).all(|r| r.is_err()));
    assert!(walk_files(&groups[0].root).is_err());
}

#[cfg(unix)]
#[test]
fn symlinked_files_are_listed_and_partitioned_alike() {
    let src = TempDir::new().unwrap();
    let outside = TempDir::new().unwrap();
    let temp = TempDir::new().unwrap();
    write(src.path(), "a.py");
    write(src.path(), "shared/util.go");
    write(outside.path(), "lib.rb");
    std::os::unix::fs::symlink("shared/util.go", src.path().join("link.go")).unwrap();
    std::os::unix::fs::symlink(outside.path().join("lib.rb"), src.path().join("lib.rb")).unwrap();

    let groups = partition(src.path(), &options(&temp)).unwrap();
    let all: BTreeSet<PathBuf> = walk_files(src.path())
        .unwrap()
        .map(|r| r.unwrap().relative_path)
        .collect();

    assert!(all.contains(Path::new("link.go")));
    for group in &groups {
        assert!(group_files(group).is_subset(&all), "{}", group.language);
    }
    let go = groups.iter().find(|g| g.language == "go").unwrap();
    assert_eq!(
        group_files(go),
        [PathBuf::from("link.go"), PathBuf::from("shared/util.go")]
            .into_iter()
            .collect::<BTreeSet<_>>()
    );
    assert!(groups.iter().any(|g| g.language == "ruby"));
    cleanup_groups(&groups);
}
