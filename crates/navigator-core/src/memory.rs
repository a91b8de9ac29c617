//! In-memory host for testing and embedding.
//!
//! `InMemoryVault` keeps a `VaultTree` behind a lock, publishes events like a
//! real host and can be told to fail specific mutations. `ScriptedWorkspace`
//! answers dialogs from preset values and records everything the core asks
//! the UI to do.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use crate::error::{HostError, Result};
use crate::events::{EventBus, VaultEvent};
use crate::host::{
    ConfirmationPrompt, FileNode, FileStat, FolderNode, LinkCache, TrashOption, TreeEntry, Vault,
    Workspace,
};
use crate::settings::NavigatorSettings;
use crate::tree::VaultTree;

pub struct InMemoryVault {
    tree: RwLock<VaultTree>,
    events: Arc<EventBus>,
    trash_option: TrashOption,
    failing: RwLock<HashSet<String>>,
    trashed: RwLock<Vec<String>>,
}

impl Default for InMemoryVault {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryVault {
    pub fn new() -> Self {
        Self {
            tree: RwLock::new(VaultTree::new()),
            events: Arc::new(EventBus::new()),
            trash_option: TrashOption::default(),
            failing: RwLock::new(HashSet::new()),
            trashed: RwLock::new(Vec::new()),
        }
    }

    pub fn with_trash_option(mut self, option: TrashOption) -> Self {
        self.trash_option = option;
        self
    }

    fn tree(&self) -> RwLockReadGuard<'_, VaultTree> {
        self.tree.read().unwrap_or_else(|e| e.into_inner())
    }

    fn tree_mut(&self) -> RwLockWriteGuard<'_, VaultTree> {
        self.tree.write().unwrap_or_else(|e| e.into_inner())
    }

    pub fn add_folder(&self, path: &str) {
        let _ = self.tree_mut().insert_folder(path);
    }

    /// Add a markdown note; its link cache is parsed from `content`.
    pub fn add_note(&self, path: &str, content: &str) {
        let _ = self
            .tree_mut()
            .insert_file(path, FileStat::default(), Some(LinkCache::from_markdown(content)));
    }

    /// Add a file without link metadata (attachments, or notes the index hasn't seen).
    pub fn add_file(&self, path: &str) {
        let _ = self.tree_mut().insert_file(path, FileStat::default(), None);
    }

    pub fn set_stat(&self, path: &str, ctime: i64, mtime: i64) {
        let _ = self.tree_mut().set_stat(path, FileStat { ctime, mtime, size: 0 });
    }

    /// Make every later trash/rename of `path` fail.
    pub fn fail_on(&self, path: &str) {
        self.failing
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(path.to_string());
    }

    /// Paths trashed so far, in call order.
    pub fn trashed(&self) -> Vec<String> {
        self.trashed.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn exists(&self, path: &str) -> bool {
        self.tree().contains(path)
    }

    fn check_failure(&self, path: &str) -> Result<()> {
        if self
            .failing
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains(path)
        {
            return Err(HostError::Rejected(format!("{} is busy", path)));
        }
        Ok(())
    }
}

#[async_trait]
impl Vault for InMemoryVault {
    fn entry(&self, path: &str) -> Option<TreeEntry> {
        self.tree().entry(path)
    }

    fn children(&self, folder: &FolderNode) -> Vec<TreeEntry> {
        self.tree().children(&folder.path)
    }

    fn markdown_files(&self) -> Vec<FileNode> {
        self.tree().markdown_files()
    }

    fn folders(&self) -> Vec<FolderNode> {
        self.tree().folders()
    }

    fn file_cache(&self, file: &FileNode) -> Option<LinkCache> {
        self.tree().file_cache(&file.path)
    }

    fn resolve_link(&self, link: &str, source_path: &str) -> Option<FileNode> {
        self.tree().resolve_link(link, source_path)
    }

    fn trash_option(&self) -> TrashOption {
        self.trash_option
    }

    fn events(&self) -> Arc<EventBus> {
        Arc::clone(&self.events)
    }

    async fn trash(&self, entry: &TreeEntry) -> Result<()> {
        let path = entry.path().to_string();
        self.check_failure(&path)?;
        self.tree_mut().remove(&path)?;
        self.trashed
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(path.clone());
        self.events.emit(VaultEvent::Deleted { path });
        Ok(())
    }

    async fn rename(&self, entry: &TreeEntry, new_path: &str) -> Result<()> {
        let old_path = entry.path().to_string();
        self.check_failure(&old_path)?;
        self.tree_mut().move_entry(&old_path, new_path)?;
        self.events.emit(VaultEvent::Renamed {
            path: new_path.to_string(),
            old_path,
        });
        Ok(())
    }
}

/// A notice the core asked the UI to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub duration: Option<Duration>,
}

struct Script {
    active: Option<FileNode>,
    confirm: bool,
    folder_choice: Option<String>,
    text_answer: Option<String>,
    sort_order: Option<String>,
    fail_open: bool,
    fail_save: bool,
}

#[derive(Default)]
struct Record {
    opened: Vec<String>,
    notices: Vec<Notice>,
    prompts: Vec<ConfirmationPrompt>,
    picker_candidates: Vec<Vec<String>>,
    sleeps: Vec<Duration>,
    saved: Vec<NavigatorSettings>,
}

pub struct ScriptedWorkspace {
    script: Mutex<Script>,
    record: Mutex<Record>,
}

impl Default for ScriptedWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedWorkspace {
    /// Confirms every dialog, cancels every picker and text prompt.
    pub fn new() -> Self {
        Self {
            script: Mutex::new(Script {
                active: None,
                confirm: true,
                folder_choice: None,
                text_answer: None,
                sort_order: None,
                fail_open: false,
                fail_save: false,
            }),
            record: Mutex::new(Record::default()),
        }
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record(&self) -> MutexGuard<'_, Record> {
        self.record.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_active(&self, file: Option<FileNode>) {
        self.script().active = file;
    }

    pub fn set_confirm(&self, answer: bool) {
        self.script().confirm = answer;
    }

    /// Folder path the picker will choose (None cancels).
    pub fn set_folder_choice(&self, path: Option<&str>) {
        self.script().folder_choice = path.map(str::to_string);
    }

    pub fn set_text_answer(&self, answer: Option<&str>) {
        self.script().text_answer = answer.map(str::to_string);
    }

    pub fn set_sort_order(&self, order: Option<&str>) {
        self.script().sort_order = order.map(str::to_string);
    }

    pub fn fail_open(&self, fail: bool) {
        self.script().fail_open = fail;
    }

    pub fn fail_save(&self, fail: bool) {
        self.script().fail_save = fail;
    }

    pub fn opened(&self) -> Vec<String> {
        self.record().opened.clone()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.record().notices.clone()
    }

    pub fn notice_messages(&self) -> Vec<String> {
        self.record()
            .notices
            .iter()
            .map(|notice| notice.message.clone())
            .collect()
    }

    pub fn prompts(&self) -> Vec<ConfirmationPrompt> {
        self.record().prompts.clone()
    }

    pub fn picker_candidates(&self) -> Vec<Vec<String>> {
        self.record().picker_candidates.clone()
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.record().sleeps.clone()
    }

    /// Settings as of the most recent save.
    pub fn last_saved(&self) -> Option<NavigatorSettings> {
        self.record().saved.last().cloned()
    }
}

#[async_trait]
impl Workspace for ScriptedWorkspace {
    fn active_file(&self) -> Option<FileNode> {
        self.script().active.clone()
    }

    async fn open_file(&self, file: &FileNode) -> Result<()> {
        if self.script().fail_open {
            return Err(HostError::Rejected(format!("cannot open {}", file.path)));
        }
        self.script().active = Some(file.clone());
        self.record().opened.push(file.path.clone());
        Ok(())
    }

    fn notice(&self, message: &str, duration: Option<Duration>) {
        self.record().notices.push(Notice {
            message: message.to_string(),
            duration,
        });
    }

    async fn confirm(&self, prompt: &ConfirmationPrompt) -> bool {
        self.record().prompts.push(prompt.clone());
        self.script().confirm
    }

    async fn pick_folder(&self, candidates: &[FolderNode]) -> Option<FolderNode> {
        self.record()
            .picker_candidates
            .push(candidates.iter().map(|f| f.path.clone()).collect());
        let choice = self.script().folder_choice.clone()?;
        candidates.iter().find(|f| f.path == choice).cloned()
    }

    async fn prompt_text(&self, _title: &str, _initial: &str) -> Option<String> {
        self.script().text_answer.clone()
    }

    fn explorer_sort_order(&self) -> Option<String> {
        self.script().sort_order.clone()
    }

    async fn sleep(&self, duration: Duration) {
        self.record().sleeps.push(duration);
    }

    async fn save_settings(&self, settings: &NavigatorSettings) -> Result<()> {
        if self.script().fail_save {
            return Err(HostError::Io("settings file is read-only".to_string()));
        }
        self.record().saved.push(settings.clone());
        Ok(())
    }
}
