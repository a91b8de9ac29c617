//! Host abstraction: the vault tree, its link metadata, and the workspace UI.
//!
//! The core never owns the file tree. Everything here is either a value
//! snapshot taken from the host (`FileNode`, `FolderNode`) or a trait the host
//! implements:
//! - `Vault` - tree queries, link metadata, trash/rename
//! - `Workspace` - active file, notices, dialogs, timers, settings persistence
//!
//! Implementations:
//! - `InMemoryVault` / `ScriptedWorkspace` (in `memory`) - For testing
//! - `NativeVault` / `TerminalWorkspace` (in navigator-cli) - A vault directory on disk

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use vault_links::LinkSyntax;

use crate::error::Result;
use crate::events::EventBus;
use crate::links::decode_path;
use crate::settings::NavigatorSettings;

/// Extension that marks a file as a note rather than an attachment.
pub const MARKDOWN_EXTENSION: &str = "md";

/// File timestamps and size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileStat {
    /// Creation time in milliseconds since epoch
    pub ctime: i64,
    /// Modification time in milliseconds since epoch
    pub mtime: i64,
    /// File size in bytes
    pub size: u64,
}

/// Snapshot of a file in the vault. Identity is the path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileNode {
    /// Vault-relative path: "notes/Daily.md"
    pub path: String,
    /// File name with extension: "Daily.md"
    pub name: String,
    /// File name without extension: "Daily"
    pub basename: String,
    /// Extension without the dot: "md"
    pub extension: String,
    pub stat: FileStat,
}

impl FileNode {
    pub fn new(path: impl Into<String>, stat: FileStat) -> Self {
        let path = path.into();
        let name = file_name(&path).to_string();
        let (basename, extension) = split_extension(&name);
        Self {
            basename: basename.to_string(),
            extension: extension.to_string(),
            name,
            path,
            stat,
        }
    }

    pub fn is_markdown(&self) -> bool {
        self.extension == MARKDOWN_EXTENSION
    }

    /// Path of the containing folder ("" for the vault root).
    pub fn parent_path(&self) -> &str {
        parent_path(&self.path).unwrap_or("")
    }
}

/// Snapshot of a folder in the vault. The root folder has path "".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FolderNode {
    pub path: String,
    pub name: String,
}

impl FolderNode {
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        let name = file_name(&path).to_string();
        Self { path, name }
    }

    pub fn root() -> Self {
        Self::new("")
    }

    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }
}

/// Either kind of tree entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TreeEntry {
    File(FileNode),
    Folder(FolderNode),
}

/// Entry kind, used in log lines and notices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Folder,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::File => write!(f, "file"),
            EntryKind::Folder => write!(f, "folder"),
        }
    }
}

impl TreeEntry {
    pub fn path(&self) -> &str {
        match self {
            TreeEntry::File(file) => &file.path,
            TreeEntry::Folder(folder) => &folder.path,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            TreeEntry::File(file) => &file.name,
            TreeEntry::Folder(folder) => &folder.name,
        }
    }

    pub fn kind(&self) -> EntryKind {
        match self {
            TreeEntry::File(_) => EntryKind::File,
            TreeEntry::Folder(_) => EntryKind::Folder,
        }
    }

    pub fn as_file(&self) -> Option<&FileNode> {
        match self {
            TreeEntry::File(file) => Some(file),
            TreeEntry::Folder(_) => None,
        }
    }

    pub fn into_file(self) -> Option<FileNode> {
        match self {
            TreeEntry::File(file) => Some(file),
            TreeEntry::Folder(_) => None,
        }
    }

    pub fn into_folder(self) -> Option<FolderNode> {
        match self {
            TreeEntry::Folder(folder) => Some(folder),
            TreeEntry::File(_) => None,
        }
    }
}

/// Cached link metadata for one note, as the host's metadata index records it.
///
/// Entries are unresolved link targets. Markdown-syntax targets are stored
/// percent-decoded, wiki targets as written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkCache {
    pub links: Vec<String>,
    pub embeds: Vec<String>,
}

impl LinkCache {
    /// Build the cache the host would record for a note body.
    pub fn from_markdown(content: &str) -> Self {
        let mut cache = Self::default();
        for link in vault_links::parse_links(content) {
            let target = match link.syntax {
                LinkSyntax::Markdown => decode_path(&link.link),
                LinkSyntax::Wiki => link.link,
            };
            if link.is_embed {
                cache.embeds.push(target);
            } else {
                cache.links.push(target);
            }
        }
        cache
    }
}

/// What the host does with trashed entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrashOption {
    /// Move to the vault's `.trash` folder
    #[default]
    Local,
    /// Move to the operating system trash
    System,
    /// Delete permanently
    None,
}

impl TrashOption {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrashOption::Local => "local",
            TrashOption::System => "system",
            TrashOption::None => "none",
        }
    }

    /// Human-readable label shown in the debug report.
    pub fn label(&self) -> &'static str {
        match self {
            TrashOption::Local => "Move to obsidian trash (.trash folder)",
            TrashOption::System => "Move to system trash",
            TrashOption::None => "Permanently delete",
        }
    }
}

impl FromStr for TrashOption {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "local" => Ok(TrashOption::Local),
            "system" => Ok(TrashOption::System),
            "none" => Ok(TrashOption::None),
            other => Err(format!("unknown trash option: {}", other)),
        }
    }
}

/// One labelled list inside a confirmation dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationSection {
    pub heading: String,
    pub lines: Vec<String>,
}

/// Modal with a header, labelled line lists, and Cancel/Confirm actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationPrompt {
    pub header: String,
    pub sections: Vec<ConfirmationSection>,
}

/// The host's file tree, link index and tree mutations.
///
/// Queries are synchronous views of the host's current state; callers must
/// not assume a snapshot stays valid across an awaited mutation.
#[async_trait]
pub trait Vault: Send + Sync {
    /// Look up a file or folder by path. `""` is the root folder.
    fn entry(&self, path: &str) -> Option<TreeEntry>;

    /// Direct children of a folder, in host order.
    fn children(&self, folder: &FolderNode) -> Vec<TreeEntry>;

    /// Every markdown file in the vault.
    fn markdown_files(&self) -> Vec<FileNode>;

    /// Every folder in the vault, root included.
    fn folders(&self) -> Vec<FolderNode>;

    /// Cached links/embeds for a file, or None when the host has no metadata for it.
    fn file_cache(&self, file: &FileNode) -> Option<LinkCache>;

    /// Resolve a raw link target to a file, in the context of `source_path`.
    fn resolve_link(&self, link: &str, source_path: &str) -> Option<FileNode>;

    /// Current trash disposition (introspection only; `trash` applies it).
    fn trash_option(&self) -> TrashOption;

    /// Bus on which the host publishes tree mutations.
    fn events(&self) -> Arc<EventBus>;

    /// Trash or delete an entry according to the host's trash option.
    async fn trash(&self, entry: &TreeEntry) -> Result<()>;

    /// Rename or move an entry to `new_path`.
    async fn rename(&self, entry: &TreeEntry, new_path: &str) -> Result<()>;

    fn root(&self) -> FolderNode {
        FolderNode::root()
    }

    fn file(&self, path: &str) -> Option<FileNode> {
        self.entry(path).and_then(TreeEntry::into_file)
    }

    fn folder(&self, path: &str) -> Option<FolderNode> {
        self.entry(path).and_then(TreeEntry::into_folder)
    }

    /// Parent folder of a path. None for the root itself.
    fn parent(&self, path: &str) -> Option<FolderNode> {
        parent_path(path).and_then(|parent| self.folder(parent))
    }

    fn child_folders(&self, folder: &FolderNode) -> Vec<FolderNode> {
        self.children(folder)
            .into_iter()
            .filter_map(TreeEntry::into_folder)
            .collect()
    }

    fn child_files(&self, folder: &FolderNode) -> Vec<FileNode> {
        self.children(folder)
            .into_iter()
            .filter_map(TreeEntry::into_file)
            .collect()
    }
}

/// The host's UI and workspace state.
#[async_trait]
pub trait Workspace: Send + Sync {
    /// File open in the active view.
    fn active_file(&self) -> Option<FileNode>;

    /// Open a file in the active view.
    async fn open_file(&self, file: &FileNode) -> Result<()>;

    /// Show a transient notice. `None` uses the host's default duration.
    fn notice(&self, message: &str, duration: Option<Duration>);

    /// Present a confirmation modal. Resolves to true on Confirm.
    async fn confirm(&self, prompt: &ConfirmationPrompt) -> bool;

    /// Let the user pick one of `candidates`. None when cancelled.
    async fn pick_folder(&self, candidates: &[FolderNode]) -> Option<FolderNode>;

    /// Ask for a line of text. None when cancelled.
    async fn prompt_text(&self, title: &str, initial: &str) -> Option<String>;

    /// Raw sort-order value of the file explorer, if the explorer is open.
    fn explorer_sort_order(&self) -> Option<String>;

    /// Deferred continuation. The only timer the core uses.
    async fn sleep(&self, duration: Duration);

    /// Persist plugin settings.
    async fn save_settings(&self, settings: &NavigatorSettings) -> Result<()>;
}

/// Parent path of a vault path. None for the root.
pub fn parent_path(path: &str) -> Option<&str> {
    let path = path.trim_matches('/');
    if path.is_empty() {
        return None;
    }
    match path.rfind('/') {
        Some(pos) => Some(&path[..pos]),
        None => Some(""),
    }
}

/// Last path segment.
pub fn file_name(path: &str) -> &str {
    let path = path.trim_matches('/');
    match path.rfind('/') {
        Some(pos) => &path[pos + 1..],
        None => path,
    }
}

/// Join a folder path and a child name.
pub fn join_path(folder: &str, name: &str) -> String {
    let folder = folder.trim_matches('/');
    if folder.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", folder, name)
    }
}

/// Split a file name at its last dot: "a.b.png" -> ("a.b", "png").
///
/// Dotfiles (".hidden") have no extension.
pub fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(pos) if pos > 0 => (&name[..pos], &name[pos + 1..]),
        _ => (name, ""),
    }
}

/// Resolve `.` and `..` segments. None if the path escapes the vault root.
pub fn normalize_path(path: &str) -> Option<String> {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            other => segments.push(other),
        }
    }
    Some(segments.join("/"))
}
