//! Workspace that talks to the user through the terminal.
//!
//! Notices and opened files go to stdout. Questions are read line by line,
//! either from stdin or from a preset list of answers.

use async_trait::async_trait;
use navigator_core::error::{HostError, Result};
use navigator_core::host::{ConfirmationPrompt, FileNode, FolderNode, Workspace};
use navigator_core::settings::NavigatorSettings;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// Where answers to prompts come from.
pub enum Input {
    Stdin,
    /// Preset answers, consumed in order. Running out counts as cancel.
    Lines(Mutex<VecDeque<String>>),
}

impl Input {
    pub fn lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Input::Lines(Mutex::new(lines.into_iter().map(Into::into).collect()))
    }

    async fn read_line(&self) -> Option<String> {
        match self {
            Input::Stdin => tokio::task::spawn_blocking(|| {
                let mut line = String::new();
                match std::io::stdin().read_line(&mut line) {
                    Ok(0) | Err(_) => None,
                    Ok(_) => Some(line),
                }
            })
            .await
            .ok()
            .flatten()
            .map(|line| line.trim_end_matches(['\r', '\n']).to_string()),
            Input::Lines(lines) => lines.lock().unwrap_or_else(|e| e.into_inner()).pop_front(),
        }
    }
}

pub struct TerminalWorkspace {
    active: Mutex<Option<FileNode>>,
    opened: Mutex<Vec<String>>,
    sort_order: Option<String>,
    settings_path: PathBuf,
    assume_yes: bool,
    input: Input,
}

impl TerminalWorkspace {
    pub fn new(settings_path: PathBuf, sort_order: Option<String>, input: Input) -> Self {
        Self {
            active: Mutex::new(None),
            opened: Mutex::new(Vec::new()),
            sort_order,
            settings_path,
            assume_yes: false,
            input,
        }
    }

    /// Answer every confirmation with yes.
    pub fn assume_yes(mut self, yes: bool) -> Self {
        self.assume_yes = yes;
        self
    }

    fn active(&self) -> MutexGuard<'_, Option<FileNode>> {
        self.active.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_active(&self, file: Option<FileNode>) {
        *self.active() = file;
    }

    /// Paths opened so far.
    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

/// Lines printed by `note-navigator stats`.
///
/// Counters stay hidden until one of them is large enough to be interesting.
pub fn statistics_report(settings: &NavigatorSettings) -> Vec<String> {
    if !settings.statistics_visible() {
        return vec!["Statistics appear once any counter reaches 10.".to_string()];
    }
    let mut lines = settings.statistics_lines();
    if settings.experienced_user() {
        lines.push("Thanks for using note-navigator this much! Feedback is welcome.".to_string());
    }
    lines
}

fn display_folder(folder: &FolderNode) -> &str {
    if folder.is_root() { "/" } else { &folder.path }
}

#[async_trait]
impl Workspace for TerminalWorkspace {
    fn active_file(&self) -> Option<FileNode> {
        self.active().clone()
    }

    async fn open_file(&self, file: &FileNode) -> Result<()> {
        println!("Opened {}", file.path);
        *self.active() = Some(file.clone());
        self.opened
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(file.path.clone());
        Ok(())
    }

    fn notice(&self, message: &str, _duration: Option<Duration>) {
        println!("{}", message);
    }

    async fn confirm(&self, prompt: &ConfirmationPrompt) -> bool {
        println!("{}", prompt.header);
        for section in &prompt.sections {
            println!("{}", section.heading);
            for line in &section.lines {
                println!("  {}", line);
            }
        }
        if self.assume_yes {
            return true;
        }

        println!("Confirm? [y/N]");
        matches!(
            self.input.read_line().await.map(|a| a.trim().to_lowercase()).as_deref(),
            Some("y") | Some("yes")
        )
    }

    async fn pick_folder(&self, candidates: &[FolderNode]) -> Option<FolderNode> {
        println!("Move to folder:");
        for (i, folder) in candidates.iter().enumerate() {
            println!("  {}) {}", i + 1, display_folder(folder));
        }

        let answer = self.input.read_line().await?;
        let answer = answer.trim();
        if let Ok(n) = answer.parse::<usize>() {
            return n.checked_sub(1).and_then(|i| candidates.get(i)).cloned();
        }
        candidates
            .iter()
            .find(|folder| display_folder(folder) == answer)
            .cloned()
    }

    async fn prompt_text(&self, title: &str, initial: &str) -> Option<String> {
        println!("{} [{}]:", title, initial);
        let answer = self.input.read_line().await?;
        if answer.trim().is_empty() {
            None
        } else {
            Some(answer)
        }
    }

    fn explorer_sort_order(&self) -> Option<String> {
        self.sort_order.clone()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    async fn save_settings(&self, settings: &NavigatorSettings) -> Result<()> {
        let json = settings
            .to_json()
            .map_err(|e| HostError::Io(e.to_string()))?;
        tokio::fs::write(&self.settings_path, json).await?;
        Ok(())
    }
}
