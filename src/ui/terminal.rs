// Terminal access for the menus. `App` only talks to the `Terminal` trait so
// the same flows can run against a real console or a scripted one.

use crossterm::cursor::MoveTo;
use crossterm::execute;
use crossterm::style::Stylize;
use crossterm::terminal::{Clear, ClearType};
use dialoguer::{Confirm, Input};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::time::Duration;

/// How a line of output should look. Purely presentational.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Plain,
    Heading,
    Success,
    Warning,
    Error,
}

/// Apply the console style for `tone` to `text`.
pub fn paint(tone: Tone, text: &str) -> String {
    match tone {
        Tone::Plain => text.to_string(),
        Tone::Heading => text.cyan().bold().to_string(),
        Tone::Success => text.green().bold().to_string(),
        Tone::Warning => text.yellow().to_string(),
        Tone::Error => text.red().to_string(),
    }
}

pub trait Terminal {
    /// Read one line of input. Empty answers are allowed.
    fn read_line(&mut self, prompt: &str) -> io::Result<String>;

    fn confirm(&mut self, prompt: &str, default: bool) -> io::Result<bool>;

    fn say(&mut self, tone: Tone, text: &str);

    fn pause(&mut self) -> io::Result<()> {
        self.read_line("Press Enter to continue").map(|_| ())
    }

    fn clear(&mut self) {}

    /// Show that something slow is going on until `end_activity`.
    fn begin_activity(&mut self, _message: &str) {}

    fn end_activity(&mut self) {}
}

/// The interactive console: dialoguer prompts, indicatif spinner, crossterm
/// colours.
#[derive(Default)]
pub struct Console {
    spinner: Option<ProgressBar>,
}

impl Console {
    pub fn new() -> Self {
        Console::default()
    }
}

impl Terminal for Console {
    fn read_line(&mut self, prompt: &str) -> io::Result<String> {
        Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
    }

    fn confirm(&mut self, prompt: &str, default: bool) -> io::Result<bool> {
        Confirm::new().with_prompt(prompt).default(default).interact()
    }

    fn say(&mut self, tone: Tone, text: &str) {
        println!("{}", paint(tone, text));
    }

    fn clear(&mut self) {
        let _ = execute!(io::stdout(), Clear(ClearType::All), MoveTo(0, 0));
    }

    fn begin_activity(&mut self, message: &str) {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(80));
        self.spinner = Some(spinner);
    }

    fn end_activity(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }
}
