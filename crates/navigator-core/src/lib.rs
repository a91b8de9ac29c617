//! navigator-core: note navigation and safe deletion for Obsidian-style vaults.
//!
//! This crate provides:
//! - `Vault` and `Workspace` trait abstractions over the host application
//! - Link sets and vault-wide reference counts (`LinkIndex`)
//! - Explorer-compatible file ordering (`sort`)
//! - Orphaned attachment and empty-folder analysis (`OrphanResolver`)
//! - Best-effort cascading deletion (`DeletionExecutor`)
//! - Depth-first next/previous note resolution (`AdjacentFileResolver`)
//! - The plugin command surface (`NoteNavigator`)

pub mod deletion;
pub mod error;
pub mod events;
pub mod host;
pub mod links;
pub mod memory;
pub mod move_watch;
pub mod navigation;
pub mod orphans;
pub mod plugin;
pub mod settings;
pub mod sort;
pub mod tree;

pub use deletion::{notice_duration, DeletionExecutor, DeletionReport};
pub use error::{HostError, NavigatorError};
pub use events::{EventBus, Subscription, VaultEvent};
pub use host::{
    ConfirmationPrompt, ConfirmationSection, EntryKind, FileNode, FileStat, FolderNode, LinkCache,
    TrashOption, TreeEntry, Vault, Workspace,
};
pub use links::{decode_path, LinkIndex};
pub use memory::{InMemoryVault, ScriptedWorkspace};
pub use move_watch::MoveWatch;
pub use navigation::{AdjacentFileResolver, Direction};
pub use orphans::{DeletionClosure, OrphanResolver, OrphanedFolders};
pub use plugin::{Command, DebugReport, NoteNavigator};
pub use settings::{NavigationScope, NavigatorSettings, Statistic};
pub use sort::{sort_config_for, sort_files, ExplorerSortOrder, SortConfig, SortField, SortOrder};
pub use tree::VaultTree;
