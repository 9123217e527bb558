// UI layer: the numbered text menus and the flows behind each option.
// Every menu is a loop that reads one line, dispatches, and repeats until the
// user picks "back" (0). Domain errors are printed and the loop goes on; only
// terminal I/O errors (interrupt, end of input) leave `run`.

pub mod terminal;

use anyhow::Result;
use chrono::{DateTime, Local};
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};
use tracing::{debug, warn};

use crate::api::{ApiClient, Probe};
use crate::config::Config;
use crate::history::SessionHistory;
use crate::model::{normalize_url, HistoryEntry, QueryResult};
use crate::report::decoration::{Decoration, RandomDecoration};
use crate::report::{text, ExportFormat};
use crate::store::{BulkOutcome, Category, FileStore, StoredFile};
use terminal::{Terminal, Tone};

const MB: f64 = 1024.0 * 1024.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MainAction {
    Search,
    History,
    ManageResults,
    BulkExport,
    Tools,
    Exit,
}

impl MainAction {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(MainAction::Search),
            "2" => Some(MainAction::History),
            "3" => Some(MainAction::ManageResults),
            "4" => Some(MainAction::BulkExport),
            "5" => Some(MainAction::Tools),
            "0" => Some(MainAction::Exit),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryAction {
    View,
    ExportHtml,
    ExportJson,
    Back,
}

impl HistoryAction {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(HistoryAction::View),
            "2" => Some(HistoryAction::ExportHtml),
            "3" => Some(HistoryAction::ExportJson),
            "0" => Some(HistoryAction::Back),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManageAction {
    List,
    View,
    Clear,
    Backup,
    BulkExport,
    Delete,
    Back,
}

impl ManageAction {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(ManageAction::List),
            "2" => Some(ManageAction::View),
            "3" => Some(ManageAction::Clear),
            "4" => Some(ManageAction::Backup),
            "5" => Some(ManageAction::BulkExport),
            "6" => Some(ManageAction::Delete),
            "0" => Some(ManageAction::Back),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolAction {
    CheckApi,
    Stats,
    Cleanup,
    Back,
}

impl ToolAction {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(ToolAction::CheckApi),
            "2" => Some(ToolAction::Stats),
            "3" => Some(ToolAction::Cleanup),
            "0" => Some(ToolAction::Back),
            _ => None,
        }
    }
}

/// The interactive program: owns the client, the store, the session history
/// and the terminal it talks through.
pub struct App<T: Terminal> {
    config: Config,
    api: ApiClient,
    store: FileStore,
    history: SessionHistory,
    term: T,
    decoration: Box<dyn Decoration>,
}

impl<T: Terminal> App<T> {
    pub fn new(config: Config, api: ApiClient, term: T) -> Self {
        App {
            store: FileStore::new(&config),
            history: SessionHistory::new(config.history_capacity),
            config,
            api,
            term,
            decoration: Box::new(RandomDecoration),
        }
    }

    /// Replace the decorative status picker.
    pub fn with_decoration(mut self, decoration: Box<dyn Decoration>) -> Self {
        self.decoration = decoration;
        self
    }

    pub fn history(&self) -> &SessionHistory {
        &self.history
    }

    pub fn store(&self) -> &FileStore {
        &self.store
    }

    pub fn terminal(&self) -> &T {
        &self.term
    }

    /// Main menu loop. Returns when the user exits; terminal errors
    /// (including interrupts) are passed up.
    pub fn run(&mut self) -> Result<()> {
        if let Err(e) = self.store.ensure_dirs() {
            warn!(error = %e, "could not prepare storage directories");
            self.term.say(Tone::Error, &format!("Storage unavailable: {}", e));
        }

        loop {
            self.term.clear();
            self.show_menu(
                "MAIN MENU",
                &[
                    ("1", "Search logins"),
                    ("2", "View history"),
                    ("3", "Manage results"),
                    ("4", "Bulk export"),
                    ("5", "Tools"),
                    ("0", "Exit"),
                ],
            );
            let choice = self.term.read_line("Select an option")?;
            match MainAction::parse(&choice) {
                Some(MainAction::Search) => self.search_flow()?,
                Some(MainAction::History) => self.show_history()?,
                Some(MainAction::ManageResults) => self.manage_results()?,
                Some(MainAction::BulkExport) => self.bulk_export()?,
                Some(MainAction::Tools) => self.tools_menu()?,
                Some(MainAction::Exit) => {
                    self.term.say(Tone::Success, "Goodbye!");
                    return Ok(());
                }
                None => self.invalid_option(),
            }
        }
    }

    fn show_menu(&mut self, title: &str, options: &[(&str, &str)]) {
        self.term.say(Tone::Heading, &format!("\n{}\n", title));
        for (key, label) in options {
            self.term.say(Tone::Plain, &format!("  [{}] {}", key, label));
        }
    }

    fn invalid_option(&mut self) {
        self.term.say(Tone::Error, "Invalid option!");
    }

    fn search_flow(&mut self) -> Result<()> {
        self.term.clear();
        let input = self.term.read_line("URL to search")?;
        if input.trim().is_empty() {
            return Ok(());
        }
        let url = normalize_url(&input);

        self.term.begin_activity("Searching...");
        let outcome = self.api.query(&url);
        self.term.end_activity();

        let result = match outcome {
            Ok(result) => result,
            Err(e) => {
                self.term.say(Tone::Error, &format!("Search failed: {}", e));
                return self.term.pause().map_err(Into::into);
            }
        };

        self.history
            .append(HistoryEntry::new(result.clone(), Local::now().naive_local()));

        if result.count_mismatch() {
            self.term.say(
                Tone::Success,
                &format!(
                    "{} accounts reported by the source, {} received",
                    result.total_accounts,
                    result.received()
                ),
            );
        } else {
            self.term.say(
                Tone::Success,
                &format!("{} accounts found!", result.total_accounts),
            );
        }
        self.show_results(&result);

        let prompt = format!(
            "Save results to {}?",
            self.store.dir(Category::Results).display()
        );
        if self.term.confirm(&prompt, true)? {
            self.save_report(&result);
        }
        self.term.pause()?;
        Ok(())
    }

    fn show_results(&mut self, result: &QueryResult) {
        let report = text::render(result, Local::now().naive_local(), self.decoration.as_mut());
        self.term.say(Tone::Plain, &report);
    }

    fn save_report(&mut self, result: &QueryResult) {
        let name = self
            .store
            .generate_filename(&result.url, "txt", Category::Results);
        let content = text::render(result, Local::now().naive_local(), self.decoration.as_mut());
        match self.store.save(Category::Results, &name, &content) {
            Ok(path) => {
                self.term
                    .say(Tone::Success, &format!("Results saved to: {}", path.display()));
            }
            Err(e) => {
                self.term.say(Tone::Error, &format!("Could not save results: {}", e));
            }
        }
    }

    fn export(&mut self, result: &QueryResult, format: ExportFormat) -> Result<PathBuf> {
        let name = self
            .store
            .generate_filename(&result.url, format.extension(), Category::Exports);
        let content = format.render(result, Local::now().naive_local(), self.decoration.as_mut())?;
        Ok(self.store.save(Category::Exports, &name, &content)?)
    }

    fn show_history(&mut self) -> Result<()> {
        self.term.clear();
        if self.history.is_empty() {
            self.term.say(Tone::Warning, "No history available");
            return self.term.pause().map_err(Into::into);
        }

        self.term.say(
            Tone::Heading,
            &format!("{:>3}  {:<8}  {:<30}  {}", "#", "Time", "URL", "Accounts"),
        );
        let rows: Vec<String> = self
            .history
            .list()
            .rev()
            .enumerate()
            .map(|(idx, entry)| {
                format!(
                    "{:>3}  {}  {:<30}  {}",
                    idx + 1,
                    entry.timestamp.format("%H:%M:%S"),
                    shorten(&entry.url, 30),
                    entry.result_count
                )
            })
            .collect();
        for row in rows {
            self.term.say(Tone::Plain, &row);
        }

        let choice = self
            .term
            .read_line("Select a search for actions (#) or Enter to go back")?;
        let selected = choice
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|n| self.history.select(n))
            .cloned();
        if let Some(entry) = selected {
            self.history_actions(&entry)?;
        }
        Ok(())
    }

    fn history_actions(&mut self, entry: &HistoryEntry) -> Result<()> {
        loop {
            self.term.clear();
            self.show_menu(
                &format!("ACTIONS FOR: {}", entry.url),
                &[
                    ("1", "View results"),
                    ("2", "Export to HTML"),
                    ("3", "Export to JSON"),
                    ("0", "Back"),
                ],
            );
            let choice = self.term.read_line("Select an action")?;
            match HistoryAction::parse(&choice) {
                Some(HistoryAction::View) => {
                    self.term
                        .say(Tone::Success, &format!("Results for: {}", entry.url));
                    self.show_results(&entry.data);
                    self.term.pause()?;
                }
                Some(HistoryAction::ExportHtml) => {
                    match self.export(&entry.data, ExportFormat::Html) {
                        Ok(path) => {
                            self.term.say(
                                Tone::Success,
                                &format!("Exported to HTML: {}", path.display()),
                            );
                            if self.term.confirm("Open in browser?", false)? {
                                open_path(&path);
                            }
                        }
                        Err(e) => self
                            .term
                            .say(Tone::Error, &format!("HTML export failed: {}", e)),
                    }
                    self.term.pause()?;
                }
                Some(HistoryAction::ExportJson) => {
                    match self.export(&entry.data, ExportFormat::Json) {
                        Ok(path) => self.term.say(
                            Tone::Success,
                            &format!("Exported to JSON: {}", path.display()),
                        ),
                        Err(e) => self
                            .term
                            .say(Tone::Error, &format!("JSON export failed: {}", e)),
                    }
                    self.term.pause()?;
                }
                Some(HistoryAction::Back) => return Ok(()),
                None => self.invalid_option(),
            }
        }
    }

    fn manage_results(&mut self) -> Result<()> {
        loop {
            self.term.clear();
            self.show_menu(
                "MANAGE RESULTS",
                &[
                    ("1", "List saved results"),
                    ("2", "View a file"),
                    ("3", "Clear results"),
                    ("4", "Create backup"),
                    ("5", "Bulk export"),
                    ("6", "Delete a file"),
                    ("0", "Back"),
                ],
            );
            let choice = self.term.read_line("Select an option")?;
            match ManageAction::parse(&choice) {
                Some(ManageAction::List) => self.list_saved_results()?,
                Some(ManageAction::View) => self.view_saved_file()?,
                Some(ManageAction::Clear) => self.clear_menu()?,
                Some(ManageAction::Backup) => self.create_backup()?,
                Some(ManageAction::BulkExport) => self.bulk_export()?,
                Some(ManageAction::Delete) => self.delete_saved_file()?,
                Some(ManageAction::Back) => return Ok(()),
                None => self.invalid_option(),
            }
        }
    }

    /// Saved result files, or `None` after telling the user there are none.
    fn saved_results(&mut self) -> Result<Option<Vec<StoredFile>>> {
        let files = match self.store.list(Category::Results) {
            Ok(files) => files,
            Err(e) => {
                self.term.say(Tone::Error, &e.to_string());
                self.term.pause()?;
                return Ok(None);
            }
        };
        if files.is_empty() {
            self.term.say(Tone::Warning, "No saved results found");
            self.term.pause()?;
            return Ok(None);
        }
        Ok(Some(files))
    }

    fn list_saved_results(&mut self) -> Result<()> {
        let Some(files) = self.saved_results()? else {
            return Ok(());
        };
        self.term.say(
            Tone::Heading,
            &format!("{:>3}  {:<30}  {:>10}  {}", "#", "File", "Size", "Date"),
        );
        for (idx, file) in files.iter().enumerate() {
            let date = file
                .modified
                .map(|m| DateTime::<Local>::from(m).format("%d/%m %H:%M").to_string())
                .unwrap_or_else(|| "-".into());
            self.term.say(
                Tone::Plain,
                &format!(
                    "{:>3}  {:<30}  {:>7.1} KB  {}",
                    idx + 1,
                    shorten(&file.name, 30),
                    file.size as f64 / 1024.0,
                    date
                ),
            );
        }
        self.term.pause()?;
        Ok(())
    }

    fn pick_saved_file(&mut self, prompt: &str) -> Result<Option<StoredFile>> {
        let Some(files) = self.saved_results()? else {
            return Ok(None);
        };
        self.term.say(Tone::Heading, "AVAILABLE FILES:");
        for (idx, file) in files.iter().enumerate() {
            self.term
                .say(Tone::Plain, &format!("{}. {}", idx + 1, file.name));
        }
        let choice = self.term.read_line(prompt)?;
        Ok(choice
            .trim()
            .parse::<usize>()
            .ok()
            .filter(|n| (1..=files.len()).contains(n))
            .map(|n| files[n - 1].clone()))
    }

    fn view_saved_file(&mut self) -> Result<()> {
        let Some(file) = self.pick_saved_file("Select a file (#) or Enter to go back")? else {
            return Ok(());
        };
        match self.store.read(Category::Results, &file.name) {
            Ok(content) => {
                self.term
                    .say(Tone::Success, &format!("Contents of: {}", file.name));
                self.term.say(Tone::Plain, &content);
            }
            Err(e) => self.term.say(Tone::Error, &format!("Could not read file: {}", e)),
        }
        self.term.pause()?;
        Ok(())
    }

    fn delete_saved_file(&mut self) -> Result<()> {
        let Some(file) = self.pick_saved_file("Select a file to delete (#) or Enter to go back")?
        else {
            return Ok(());
        };
        if !self.term.confirm(&format!("Delete {}?", file.name), false)? {
            self.term.say(Tone::Warning, "Operation cancelled");
            return Ok(());
        }
        match self.store.delete(Category::Results, &file.name) {
            Ok(()) => self.term.say(Tone::Success, &format!("Deleted {}", file.name)),
            Err(e) => self.term.say(Tone::Error, &e.to_string()),
        }
        self.term.pause()?;
        Ok(())
    }

    fn clear_menu(&mut self) -> Result<()> {
        self.term.clear();
        self.show_menu(
            "CLEAR",
            &[
                ("1", "Clear search results"),
                ("2", "Clear exports"),
                ("3", "Clear EVERYTHING"),
                ("0", "Back"),
            ],
        );
        let choice = self.term.read_line("Select what to clear")?;
        let (label, categories) = match choice.trim() {
            "1" => (Category::Results.label(), vec![Category::Results]),
            "2" => (Category::Exports.label(), vec![Category::Exports]),
            "3" => ("results and exports", vec![Category::Results, Category::Exports]),
            "0" => return Ok(()),
            _ => {
                self.invalid_option();
                return Ok(());
            }
        };

        if !self
            .term
            .confirm(&format!("Delete ALL {} files?", label), false)?
        {
            self.term.say(Tone::Warning, "Operation cancelled");
            return Ok(());
        }

        self.term.begin_activity(&format!("Clearing {}...", label));
        let mut outcome = BulkOutcome::default();
        let mut listing_errors = Vec::new();
        for category in categories {
            match self.store.delete_all(category) {
                Ok(o) => outcome = outcome.merge(o),
                Err(e) => listing_errors.push(e.to_string()),
            }
        }
        self.term.end_activity();

        for e in &listing_errors {
            self.term.say(Tone::Error, e);
        }
        self.report_bulk(&outcome, "removed");
        if outcome.is_success() && listing_errors.is_empty() {
            self.term.say(Tone::Success, "Cleanup finished successfully!");
        } else {
            self.term.say(Tone::Error, "Errors occurred during cleanup");
        }
        self.term.pause()?;
        Ok(())
    }

    fn report_bulk(&mut self, outcome: &BulkOutcome, verb: &str) {
        self.term.say(
            Tone::Plain,
            &format!("{} files {}", outcome.succeeded.len(), verb),
        );
        for (item, reason) in &outcome.failed {
            self.term.say(Tone::Error, &format!("  {}: {}", item, reason));
        }
    }

    fn create_backup(&mut self) -> Result<()> {
        self.term.begin_activity("Preparing backup...");
        let outcome = self.store.backup();
        self.term.end_activity();
        match outcome {
            Ok(path) => {
                let size = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
                self.term.say(Tone::Success, "Backup created successfully!");
                self.term
                    .say(Tone::Plain, &format!("Location: {}", path.display()));
                self.term
                    .say(Tone::Plain, &format!("Size: {:.2} MB", size as f64 / MB));
            }
            Err(e) => self
                .term
                .say(Tone::Error, &format!("Backup failed: {}", e)),
        }
        self.term.pause()?;
        Ok(())
    }

    fn bulk_export(&mut self) -> Result<()> {
        if self.history.is_empty() {
            self.term
                .say(Tone::Warning, "No searches in history to export");
            return self.term.pause().map_err(Into::into);
        }

        self.term.clear();
        self.show_menu(
            "BULK EXPORT",
            &[("1", "HTML (for viewing)"), ("2", "JSON (for analysis)"), ("0", "Cancel")],
        );
        let format = match self.term.read_line("Select the export format")?.trim() {
            "1" => ExportFormat::Html,
            "2" => ExportFormat::Json,
            _ => return Ok(()),
        };

        let items: Vec<QueryResult> = self.history.list().map(|e| e.data.clone()).collect();
        self.term.begin_activity("Exporting...");
        let mut outcome = BulkOutcome::default();
        for item in &items {
            match self.export(item, format) {
                Ok(path) => outcome.succeeded.push(path),
                Err(e) => {
                    warn!(url = %item.url, error = %e, "export failed");
                    outcome.failed.push((item.url.clone(), e.to_string()));
                }
            }
        }
        self.term.end_activity();

        if outcome.succeeded.is_empty() {
            self.term.say(Tone::Error, "No file was exported");
            self.report_bulk(&outcome, "exported");
        } else {
            self.term.say(
                Tone::Success,
                &format!(
                    "{} {} files exported successfully!",
                    outcome.succeeded.len(),
                    format.label()
                ),
            );
            for (url, reason) in &outcome.failed {
                self.term.say(Tone::Error, &format!("  {}: {}", url, reason));
            }
            if self.term.confirm("Open the export folder?", false)? {
                let dir = self.store.dir(Category::Exports).to_path_buf();
                open_path(&dir);
            }
        }
        self.term.pause()?;
        Ok(())
    }

    fn tools_menu(&mut self) -> Result<()> {
        loop {
            self.term.clear();
            self.show_menu(
                "TOOLS",
                &[
                    ("1", "Check API connection"),
                    ("2", "System statistics"),
                    ("3", "Clean up old files"),
                    ("0", "Back"),
                ],
            );
            let choice = self.term.read_line("Select a tool")?;
            match ToolAction::parse(&choice) {
                Some(ToolAction::CheckApi) => self.check_api()?,
                Some(ToolAction::Stats) => self.show_stats()?,
                Some(ToolAction::Cleanup) => self.cleanup_old_files()?,
                Some(ToolAction::Back) => return Ok(()),
                None => self.invalid_option(),
            }
        }
    }

    fn check_api(&mut self) -> Result<()> {
        self.term.begin_activity("Testing API connection...");
        let probe = self.api.probe();
        self.term.end_activity();

        let endpoint = format!("Endpoint: {}", self.api.base_url());
        self.term.say(Tone::Heading, "Connection status:");
        self.term.say(Tone::Plain, &endpoint);
        match probe {
            Probe::Online { elapsed } => {
                self.term.say(Tone::Success, "Status: ONLINE");
                self.term.say(Tone::Plain, &format_elapsed(elapsed));
                self.term.say(Tone::Success, "The API is responding normally");
            }
            Probe::Restricted { status, elapsed } => {
                self.term.say(Tone::Warning, "Status: RESTRICTED");
                self.term.say(Tone::Plain, &format_elapsed(elapsed));
                self.term
                    .say(Tone::Warning, &format!("The API returned status {}", status));
            }
            Probe::Offline { error } => {
                self.term.say(Tone::Error, "Status: OFFLINE");
                self.term.say(Tone::Error, &format!("Error: {}", error));
            }
        }
        self.term.pause()?;
        Ok(())
    }

    fn show_stats(&mut self) -> Result<()> {
        self.term.say(Tone::Heading, "System statistics\n");
        let mut total = 0u64;
        for (label, category) in [
            ("Saved results", Category::Results),
            ("Exports", Category::Exports),
            ("Backups", Category::Backups),
        ] {
            match self.store.usage(category) {
                Ok(usage) => {
                    total += usage.bytes;
                    self.term.say(
                        Tone::Plain,
                        &format!(
                            "{:<22} {:>6} files  {:>8.2} MB",
                            label,
                            usage.files,
                            usage.bytes as f64 / MB
                        ),
                    );
                }
                Err(e) => self.term.say(Tone::Error, &format!("{:<22} {}", label, e)),
            }
        }
        self.term.say(
            Tone::Plain,
            &format!("{:<22} {:>21.2} MB", "Total", total as f64 / MB),
        );
        self.term.say(
            Tone::Plain,
            &format!(
                "{:<22} {}/{}",
                "Searches in history",
                self.history.len(),
                self.history.capacity()
            ),
        );
        let last = self
            .history
            .latest()
            .map(|e| e.timestamp.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "N/A".into());
        self.term
            .say(Tone::Plain, &format!("{:<22} {}", "Last search", last));
        self.term.pause()?;
        Ok(())
    }

    fn cleanup_old_files(&mut self) -> Result<()> {
        let days = self.config.stale_after.as_secs() / 86_400;
        let cutoff = SystemTime::now()
            .checked_sub(self.config.stale_after)
            .unwrap_or(SystemTime::UNIX_EPOCH);
        let stale = match self.store.stale_files(cutoff) {
            Ok(stale) => stale,
            Err(e) => {
                self.term.say(Tone::Error, &e.to_string());
                return self.term.pause().map_err(Into::into);
            }
        };

        if stale.is_empty() {
            self.term.say(
                Tone::Success,
                &format!("No files older than {} days to clean up", days),
            );
            return self.term.pause().map_err(Into::into);
        }

        let bytes: u64 = stale.iter().map(|f| f.size).sum();
        self.term.say(
            Tone::Plain,
            &format!("Found {} files older than {} days", stale.len(), days),
        );
        self.term.say(
            Tone::Plain,
            &format!("Space that can be freed: {:.2} MB", bytes as f64 / MB),
        );
        if !self.term.confirm("Remove these files?", false)? {
            self.term.say(Tone::Warning, "Operation cancelled");
            return self.term.pause().map_err(Into::into);
        }

        let outcome = self.store.remove_files(&stale);
        if outcome.is_success() {
            self.term.say(Tone::Success, "Cleanup finished successfully!");
        } else {
            self.term.say(
                Tone::Warning,
                &format!("{} files could not be removed", outcome.failed.len()),
            );
        }
        self.report_bulk(&outcome, "removed");
        self.term.pause()?;
        Ok(())
    }
}

fn format_elapsed(elapsed: Duration) -> String {
    format!("Response time: {:.2} ms", elapsed.as_secs_f64() * 1000.0)
}

fn open_path(path: &std::path::Path) {
    debug!(path = %path.display(), "opening with system handler");
    if let Err(e) = open::that(path) {
        warn!(path = %path.display(), error = %e, "could not open path");
    }
}

/// Shorten to at most `width` characters, ending with `...` when cut.
fn shorten(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let keep: String = text.chars().take(width.saturating_sub(3)).collect();
    format!("{}...", keep)
}
