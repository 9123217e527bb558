// File store: the three fixed directories (results, exports, backups) and
// every filesystem operation the menus need on them.

use chrono::{Local, NaiveDateTime};
use rand::Rng;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::config::Config;

const SUFFIX_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const PREFIX_LEN: usize = 20;
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Results,
    Exports,
    Backups,
}

impl Category {
    /// Leading part of every generated filename in this category.
    pub fn prefix(&self) -> &'static str {
        match self {
            Category::Results => "results",
            Category::Exports => "html_exports",
            Category::Backups => "backups",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Results => "search results",
            Category::Exports => "exports",
            Category::Backups => "backups",
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("could not create directory {}: {source}", path.display())]
    CreateDirFailed { path: PathBuf, source: io::Error },

    #[error("could not write {}: {source}", path.display())]
    WriteFailed { path: PathBuf, source: io::Error },

    #[error("could not read {}: {source}", path.display())]
    ReadFailed { path: PathBuf, source: io::Error },

    #[error("could not list {}: {source}", path.display())]
    ListFailed { path: PathBuf, source: io::Error },

    #[error("could not delete {}: {source}", path.display())]
    DeleteFailed { path: PathBuf, source: io::Error },

    #[error("could not create archive {}: {detail}", path.display())]
    ArchiveFailed { path: PathBuf, detail: String },
}

/// A regular file found in one of the store directories.
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub name: String,
    pub path: PathBuf,
    pub size: u64,
    pub modified: Option<SystemTime>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirUsage {
    pub files: usize,
    pub bytes: u64,
}

/// Per-item result of a best-effort bulk operation. Failures are keyed by a
/// printable name for the item (a file path, or the URL of a failed export).
#[derive(Debug, Default)]
pub struct BulkOutcome {
    pub succeeded: Vec<PathBuf>,
    pub failed: Vec<(String, String)>,
}

impl BulkOutcome {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn merge(mut self, other: BulkOutcome) -> BulkOutcome {
        self.succeeded.extend(other.succeeded);
        self.failed.extend(other.failed);
        self
    }
}

#[derive(Debug, Clone)]
pub struct FileStore {
    results: PathBuf,
    exports: PathBuf,
    backups: PathBuf,
}

impl FileStore {
    pub fn new(config: &Config) -> Self {
        FileStore {
            results: config.results_path(),
            exports: config.exports_path(),
            backups: config.backups_path(),
        }
    }

    pub fn dir(&self, category: Category) -> &Path {
        match category {
            Category::Results => &self.results,
            Category::Exports => &self.exports,
            Category::Backups => &self.backups,
        }
    }

    /// Create all three directories, including missing parents. Safe to call
    /// any number of times.
    pub fn ensure_dirs(&self) -> Result<(), StoreError> {
        for dir in [&self.results, &self.exports, &self.backups] {
            fs::create_dir_all(dir).map_err(|source| StoreError::CreateDirFailed {
                path: dir.clone(),
                source,
            })?;
        }
        Ok(())
    }

    /// `{category}_{urlprefix}_{YYYYMMDD_HHMMSS}_{rand4}.{ext}` for now.
    pub fn generate_filename(&self, base: &str, ext: &str, category: Category) -> String {
        filename_at(
            base,
            ext,
            category,
            Local::now().naive_local(),
            &mut rand::thread_rng(),
        )
    }

    /// Write UTF-8 `content` as `name` inside the category directory.
    /// Only the target directory is created; the other categories are left
    /// alone.
    pub fn save(&self, category: Category, name: &str, content: &str) -> Result<PathBuf, StoreError> {
        let dir = self.dir(category);
        let path = dir.join(name);
        fs::create_dir_all(dir)
            .and_then(|()| fs::write(&path, content))
            .map_err(|source| {
                warn!(path = %path.display(), error = %source, "write failed");
                StoreError::WriteFailed {
                    path: path.clone(),
                    source,
                }
            })?;
        info!(path = %path.display(), bytes = content.len(), "saved file");
        Ok(path)
    }

    pub fn read(&self, category: Category, name: &str) -> Result<String, StoreError> {
        let path = self.dir(category).join(name);
        fs::read_to_string(&path).map_err(|source| StoreError::ReadFailed { path, source })
    }

    /// Regular files in the category directory, sorted by name. A missing
    /// directory lists as empty.
    pub fn list(&self, category: Category) -> Result<Vec<StoredFile>, StoreError> {
        let dir = self.dir(category);
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StoreError::ListFailed {
                    path: dir.to_path_buf(),
                    source,
                })
            }
        };

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| StoreError::ListFailed {
                path: dir.to_path_buf(),
                source,
            })?;
            let meta = match entry.metadata() {
                Ok(meta) => meta,
                Err(e) => {
                    debug!(path = %entry.path().display(), error = %e, "skipping unreadable entry");
                    continue;
                }
            };
            if !meta.is_file() {
                continue;
            }
            files.push(StoredFile {
                name: entry.file_name().to_string_lossy().into_owned(),
                path: entry.path(),
                size: meta.len(),
                modified: meta.modified().ok(),
            });
        }
        files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(files)
    }

    pub fn usage(&self, category: Category) -> Result<DirUsage, StoreError> {
        let files = self.list(category)?;
        Ok(DirUsage {
            files: files.len(),
            bytes: files.iter().map(|f| f.size).sum(),
        })
    }

    pub fn delete(&self, category: Category, name: &str) -> Result<(), StoreError> {
        let path = self.dir(category).join(name);
        fs::remove_file(&path).map_err(|source| StoreError::DeleteFailed {
            path: path.clone(),
            source,
        })?;
        info!(path = %path.display(), "deleted file");
        Ok(())
    }

    /// Remove every regular file in the category directory. One failed
    /// removal does not stop the others and nothing is rolled back.
    pub fn delete_all(&self, category: Category) -> Result<BulkOutcome, StoreError> {
        self.delete_all_with(category, |path| fs::remove_file(path))
    }

    /// `delete_all` with a caller-supplied removal function.
    pub fn delete_all_with<F>(&self, category: Category, remove: F) -> Result<BulkOutcome, StoreError>
    where
        F: FnMut(&Path) -> io::Result<()>,
    {
        let files = self.list(category)?;
        Ok(remove_each(&files, remove))
    }

    /// Results and exports last modified before `cutoff`.
    pub fn stale_files(&self, cutoff: SystemTime) -> Result<Vec<StoredFile>, StoreError> {
        let mut stale = Vec::new();
        for category in [Category::Results, Category::Exports] {
            stale.extend(
                self.list(category)?
                    .into_iter()
                    .filter(|f| f.modified.map(|m| m < cutoff).unwrap_or(false)),
            );
        }
        Ok(stale)
    }

    pub fn remove_files(&self, files: &[StoredFile]) -> BulkOutcome {
        remove_each(files, |path| fs::remove_file(path))
    }

    /// Zip the results and export directories into `backup_<timestamp>.zip`
    /// under the backup directory. Entries keep their directory name, e.g.
    /// `Results/results_x.txt`.
    pub fn backup(&self) -> Result<PathBuf, StoreError> {
        self.ensure_dirs()?;
        let name = format!("backup_{}.zip", Local::now().format(TIMESTAMP_FORMAT));
        let path = self.backups.join(name);
        archive_into(&path, &[self.results.as_path(), self.exports.as_path()])?;
        info!(path = %path.display(), "backup created");
        Ok(path)
    }
}

/// Write the archive at `path`. A partly written archive is removed again.
fn archive_into(path: &Path, sources: &[&Path]) -> Result<(), StoreError> {
    write_archive(path, sources).map_err(|e| {
        warn!(path = %path.display(), error = %e, "backup failed");
        if let Err(rm) = fs::remove_file(path) {
            if rm.kind() != io::ErrorKind::NotFound {
                warn!(path = %path.display(), error = %rm, "could not remove partial archive");
            }
        }
        StoreError::ArchiveFailed {
            path: path.to_path_buf(),
            detail: e.to_string(),
        }
    })
}

fn remove_each<F>(files: &[StoredFile], mut remove: F) -> BulkOutcome
where
    F: FnMut(&Path) -> io::Result<()>,
{
    let mut outcome = BulkOutcome::default();
    for file in files {
        match remove(&file.path) {
            Ok(()) => {
                debug!(path = %file.path.display(), "deleted");
                outcome.succeeded.push(file.path.clone());
            }
            Err(e) => {
                warn!(path = %file.path.display(), error = %e, "delete failed");
                outcome
                    .failed
                    .push((file.path.display().to_string(), e.to_string()));
            }
        }
    }
    outcome
}

fn write_archive(path: &Path, sources: &[&Path]) -> zip::result::ZipResult<()> {
    let mut zip = ZipWriter::new(File::create(path)?);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    for &source in sources {
        let base = source.parent().unwrap_or(source);
        for entry in WalkDir::new(source).sort_by_file_name() {
            let entry = entry.map_err(io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry.path().strip_prefix(base).unwrap_or(entry.path());
            let name = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            zip.start_file(name, options)?;
            zip.write_all(&fs::read(entry.path())?)?;
        }
    }
    zip.finish()?;
    Ok(())
}

/// Strip the scheme, turn separators and other unsafe characters into `_`,
/// keep the first 20 characters.
pub fn sanitize_url_prefix(base: &str) -> String {
    let stripped = base
        .strip_prefix("https://")
        .or_else(|| base.strip_prefix("http://"))
        .unwrap_or(base);
    stripped
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .take(PREFIX_LEN)
        .collect()
}

/// Filename for a given instant and random source.
pub fn filename_at<R: Rng>(
    base: &str,
    ext: &str,
    category: Category,
    now: NaiveDateTime,
    rng: &mut R,
) -> String {
    let suffix: String = (0..4)
        .map(|_| SUFFIX_CHARSET[rng.gen_range(0..SUFFIX_CHARSET.len())] as char)
        .collect();
    format!(
        "{}_{}_{}_{}.{}",
        category.prefix(),
        sanitize_url_prefix(base),
        now.format(TIMESTAMP_FORMAT),
        suffix,
        ext
    )
}
