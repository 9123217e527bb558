// File store behaviour on a real (temporary) filesystem.

use std::fs::{self, File};
use std::io;
use std::time::{Duration, SystemTime};

use filetime::FileTime;
use leaklens_cli::config::Config;
use leaklens_cli::store::{Category, FileStore, StoreError};
use tempfile::TempDir;

fn store_in(dir: &TempDir) -> FileStore {
    FileStore::new(&Config::for_root(dir.path().join("data")))
}

#[test]
fn save_creates_missing_directories() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    assert!(!store.dir(Category::Results).exists());

    let path = store
        .save(Category::Results, "results_a.txt", "hello")
        .unwrap();
    assert_eq!(path, dir.path().join("data/Results/results_a.txt"));
    assert_eq!(fs::read_to_string(&path).unwrap(), "hello");
    assert!(!store.dir(Category::Exports).exists());
    assert!(!store.dir(Category::Backups).exists());

    store.ensure_dirs().unwrap();
    store.ensure_dirs().unwrap();
    assert!(store.dir(Category::Exports).is_dir());
    assert!(store.dir(Category::Backups).is_dir());
}

#[test]
fn save_does_not_depend_on_other_categories() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    fs::create_dir_all(dir.path().join("data")).unwrap();
    fs::write(store.dir(Category::Backups), "not a directory").unwrap();

    let path = store.save(Category::Results, "r.txt", "report").unwrap();
    assert_eq!(fs::read_to_string(path).unwrap(), "report");
    assert!(store.ensure_dirs().is_err());
}

#[test]
fn unusable_category_directory_is_a_write_failure() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    fs::create_dir_all(dir.path().join("data")).unwrap();
    fs::write(store.dir(Category::Exports), "not a directory").unwrap();

    let err = store
        .save(Category::Exports, "e.json", "{}")
        .unwrap_err();
    assert!(matches!(err, StoreError::WriteFailed { .. }), "{err:?}");
}

#[test]
fn failed_write_is_reported_not_fatal() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    store.ensure_dirs().unwrap();
    fs::create_dir(store.dir(Category::Results).join("taken.txt")).unwrap();

    let err = store
        .save(Category::Results, "taken.txt", "data")
        .unwrap_err();
    assert!(matches!(err, StoreError::WriteFailed { .. }));
    assert!(store.save(Category::Results, "other.txt", "data").is_ok());
}

#[test]
fn list_returns_regular_files_sorted_by_name() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    assert!(store.list(Category::Results).unwrap().is_empty());

    store.save(Category::Results, "b.txt", "bb").unwrap();
    store.save(Category::Results, "a.txt", "a").unwrap();
    fs::create_dir(store.dir(Category::Results).join("nested")).unwrap();

    let files = store.list(Category::Results).unwrap();
    let names: Vec<_> = files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["a.txt", "b.txt"]);
    assert_eq!(files[1].size, 2);

    let usage = store.usage(Category::Results).unwrap();
    assert_eq!(usage.files, 2);
    assert_eq!(usage.bytes, 3);
}

#[test]
fn delete_all_is_best_effort() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    for name in ["a", "b", "c"] {
        store.save(Category::Results, name, name).unwrap();
    }

    let outcome = store
        .delete_all_with(Category::Results, |path| {
            if path.file_name().is_some_and(|n| n == "b") {
                Err(io::Error::new(io::ErrorKind::PermissionDenied, "simulated"))
            } else {
                fs::remove_file(path)
            }
        })
        .unwrap();

    assert!(!outcome.is_success());
    assert_eq!(outcome.succeeded.len(), 2);
    assert_eq!(outcome.failed.len(), 1);
    assert!(outcome.failed[0].0.ends_with("b"));
    assert!(outcome.failed[0].1.contains("simulated"));

    let left: Vec<_> = store
        .list(Category::Results)
        .unwrap()
        .into_iter()
        .map(|f| f.name)
        .collect();
    assert_eq!(left, vec!["b"]);
}

#[test]
fn delete_all_leaves_other_categories_alone() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    store.save(Category::Results, "r.txt", "r").unwrap();
    store.save(Category::Exports, "e.html", "e").unwrap();

    let outcome = store.delete_all(Category::Results).unwrap();
    assert!(outcome.is_success());
    assert!(store.list(Category::Results).unwrap().is_empty());
    assert_eq!(store.list(Category::Exports).unwrap().len(), 1);
}

#[test]
fn delete_single_file() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    store.save(Category::Results, "r.txt", "r").unwrap();
    store.delete(Category::Results, "r.txt").unwrap();
    assert!(matches!(
        store.delete(Category::Results, "r.txt"),
        Err(StoreError::DeleteFailed { .. })
    ));
}

#[test]
fn backup_archives_results_and_exports() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    store.save(Category::Results, "results_x.txt", "report").unwrap();
    store.save(Category::Exports, "html_exports_x.html", "<html>").unwrap();
    store.save(Category::Exports, "html_exports_x.json", "{}").unwrap();

    let path = store.backup().unwrap();
    let name = path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("backup_") && name.ends_with(".zip"), "{name}");
    assert_eq!(name.len(), "backup_YYYYMMDD_HHMMSS.zip".len());
    assert_eq!(path.parent().unwrap(), store.dir(Category::Backups));

    let archive = zip::ZipArchive::new(File::open(&path).unwrap()).unwrap();
    let mut names: Vec<_> = archive.file_names().map(str::to_string).collect();
    names.sort();
    assert_eq!(
        names,
        vec![
            "HTML_Exports/html_exports_x.html",
            "HTML_Exports/html_exports_x.json",
            "Results/results_x.txt",
        ]
    );
}

#[test]
fn stale_files_only_include_old_results_and_exports() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    let old_result = store.save(Category::Results, "old.txt", "x").unwrap();
    store.save(Category::Results, "new.txt", "x").unwrap();
    let old_export = store.save(Category::Exports, "old.json", "x").unwrap();
    let old_backup = store.dir(Category::Backups).join("old.zip");
    fs::write(&old_backup, "x").unwrap();

    let long_ago = FileTime::from_unix_time(1_000_000_000, 0);
    for path in [&old_result, &old_export, &old_backup] {
        filetime::set_file_mtime(path, long_ago).unwrap();
    }

    let cutoff = SystemTime::now() - Duration::from_secs(30 * 24 * 60 * 60);
    let stale = store.stale_files(cutoff).unwrap();
    let mut names: Vec<_> = stale.iter().map(|f| f.name.as_str()).collect();
    names.sort();
    assert_eq!(names, vec!["old.json", "old.txt"]);

    let outcome = store.remove_files(&stale);
    assert!(outcome.is_success());
    assert!(!old_result.exists());
    assert!(old_backup.exists());
}
