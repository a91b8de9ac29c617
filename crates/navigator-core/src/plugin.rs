//! Plugin commands: the entry points a host binds to its command palette.
//!
//! Every command handles its own failures. Errors are logged and turned into
//! notices; nothing propagates back to the host's dispatcher.

use std::sync::Arc;
use std::time::Duration;

use crate::deletion::{DeletionExecutor, DeletionReport};
use crate::error::NavigatorError;
use crate::host::{
    join_path, parent_path, ConfirmationPrompt, ConfirmationSection, FileNode, FolderNode, TreeEntry, Vault,
    Workspace,
};
use crate::move_watch::MoveWatch;
use crate::navigation::{AdjacentFileResolver, Direction};
use crate::orphans::{DeletionClosure, OrphanResolver};
use crate::settings::{NavigationScope, NavigatorSettings};
use crate::sort::{sort_config_for, sort_folders, SortConfig};

pub const NO_ACTIVE_EDITOR: &str = "A file must be open in the active editor.";
pub const NO_ACTIVE_FILE: &str = "A file must be active to navigate.";
pub const NAVIGATE_OR_DELETE_FAILED: &str = "An error occurred while navigating or deleting the file.";
pub const NO_PARENT_FOLDER: &str = "No active file or parent folder found.";
pub const NOTHING_TO_DEBUG: &str = "No active file or folder to debug sorting.";

pub const ATTACHMENTS_HEADING: &str = "The following attachments will also be deleted:";
pub const FOLDERS_HEADING: &str = "The following folders would become empty and will also be deleted:";

/// Delay before trashing the open note, so the host can close its view first.
pub const ACTIVE_FILE_DELETE_DELAY: Duration = Duration::from_millis(200);

/// Fallback explorer order shown in the debug report.
const DEFAULT_SORT_ORDER: &str = "alphabetical";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    DeleteAndNavigate,
    NavigateNext,
    NavigatePrevious,
    DebugSorting,
    MoveAndNavigate,
    RenameParentFolder,
}

impl Command {
    pub const ALL: [Command; 6] = [
        Command::DeleteAndNavigate,
        Command::NavigateNext,
        Command::NavigatePrevious,
        Command::DebugSorting,
        Command::MoveAndNavigate,
        Command::RenameParentFolder,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Command::DeleteAndNavigate => "delete-and-navigate",
            Command::NavigateNext => "navigate-next-file",
            Command::NavigatePrevious => "navigate-previous-file",
            Command::DebugSorting => "navigate-debug-sorting",
            Command::MoveAndNavigate => "move-and-navigate",
            Command::RenameParentFolder => "rename-parent-folder",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::DeleteAndNavigate => "Delete current file and navigate to next note",
            Command::NavigateNext => "Navigate to next file",
            Command::NavigatePrevious => "Navigate to previous file",
            Command::DebugSorting => "Log debugging messages to console",
            Command::MoveAndNavigate => "Move current file and navigate to next note",
            Command::RenameParentFolder => "Rename parent folder of current note",
        }
    }

    pub fn from_id(id: &str) -> Option<Command> {
        Command::ALL.into_iter().find(|command| command.id() == id)
    }
}

/// What the debug command reports about the active folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugReport {
    pub sort_order: String,
    pub trash_label: String,
    pub sorted_paths: Vec<String>,
}

impl DebugReport {
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("Current sort order: {}", self.sort_order),
            format!("Current file deletion method: {}", self.trash_label),
            "Sorted files in the current folder:".to_string(),
        ];
        lines.extend(self.sorted_paths.iter().cloned());
        lines
    }
}

pub struct NoteNavigator<V: Vault + ?Sized, W: Workspace + ?Sized> {
    vault: Arc<V>,
    workspace: Arc<W>,
    settings: NavigatorSettings,
}

impl<V: Vault + ?Sized, W: Workspace + ?Sized> NoteNavigator<V, W> {
    pub fn new(vault: Arc<V>, workspace: Arc<W>, settings: NavigatorSettings) -> Self {
        Self {
            vault,
            workspace,
            settings,
        }
    }

    pub fn settings(&self) -> &NavigatorSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut NavigatorSettings {
        &mut self.settings
    }

    pub fn vault(&self) -> &Arc<V> {
        &self.vault
    }

    pub fn workspace(&self) -> &Arc<W> {
        &self.workspace
    }

    /// Whether `command` can run in the current workspace state.
    pub fn can_run(&self, command: Command) -> bool {
        let Some(file) = self.workspace.active_file() else {
            return false;
        };
        match command {
            Command::DebugSorting => self.vault.parent(&file.path).is_some(),
            Command::RenameParentFolder => self
                .vault
                .parent(&file.path)
                .is_some_and(|folder| !folder.is_root()),
            _ => true,
        }
    }

    pub async fn run(&mut self, command: Command) {
        tracing::debug!("Running command {}", command.id());
        match command {
            Command::DeleteAndNavigate => self.delete_and_navigate().await,
            Command::NavigateNext => {
                self.navigate_file(Direction::Next).await;
            }
            Command::NavigatePrevious => {
                self.navigate_file(Direction::Prev).await;
            }
            Command::DebugSorting => {
                self.debug_report();
            }
            Command::MoveAndNavigate => {
                self.move_and_navigate().await;
            }
            Command::RenameParentFolder => {
                self.rename_parent_folder().await;
            }
        }
    }

    /// Delete the active note (after confirmation), move to the next note,
    /// then clean up its orphaned attachments and emptied folders.
    pub async fn delete_and_navigate(&mut self) {
        let Some(file) = self.workspace.active_file() else {
            self.workspace.notice(NO_ACTIVE_EDITOR, None);
            return;
        };

        if let Err(e) = self.try_delete_and_navigate(&file).await {
            tracing::error!("Error while navigating or deleting {}: {}", file.path, e);
            self.workspace.notice(NAVIGATE_OR_DELETE_FAILED, None);
        }
    }

    async fn try_delete_and_navigate(&mut self, file: &FileNode) -> Result<(), NavigatorError> {
        let closure = self.prepare_for_deletion(file);

        if self.settings.show_confirmation_prompt && !self.confirm_deletion(file, &closure).await {
            tracing::info!("Deletion of {} cancelled", file.path);
            return Ok(());
        }

        if self.settings.navigate_on_delete {
            if let Some(next) = self.adjacent_file(file, Direction::Next, self.settings.navigation_scope) {
                self.workspace.open_file(&next).await?;
                self.settings.record_navigation();
            }
        }

        let entry = TreeEntry::File(file.clone());
        if !self.safe_delete(&entry, "File deleted", ACTIVE_FILE_DELETE_DELAY).await {
            self.persist().await;
            return Ok(());
        }

        let report = self.handle_attachments_and_folders(&closure).await;
        self.settings
            .record_deletion(1, report.attachments.len() as u64, report.folders.len() as u64);
        self.persist().await;
        Ok(())
    }

    /// Open the next or previous note. Returns the opened note.
    pub async fn navigate_file(&mut self, direction: Direction) -> Option<FileNode> {
        let Some(file) = self.workspace.active_file() else {
            self.workspace.notice(NO_ACTIVE_FILE, None);
            return None;
        };

        let Some(target) = self.adjacent_file(&file, direction, self.settings.navigation_scope) else {
            tracing::debug!("No {} file from {}", direction, file.path);
            return None;
        };

        match self.workspace.open_file(&target).await {
            Ok(()) => {
                self.settings.record_navigation();
                self.persist().await;
                Some(target)
            }
            Err(e) => {
                tracing::error!("Could not open {}: {}", target.path, e);
                self.workspace.notice(NAVIGATE_OR_DELETE_FAILED, None);
                None
            }
        }
    }

    /// Move the active note to a picked folder, then open the note that
    /// followed it. Returns the opened note.
    pub async fn move_and_navigate(&mut self) -> Option<FileNode> {
        let Some(file) = self.workspace.active_file() else {
            self.workspace.notice(NO_ACTIVE_EDITOR, None);
            return None;
        };

        let next = self.adjacent_file(&file, Direction::Next, self.settings.navigation_scope)?;
        let watch = MoveWatch::arm(&self.vault.events(), &file.path);

        let current_parent = file.parent_path().to_string();
        let candidates = sort_folders(
            self.vault
                .folders()
                .into_iter()
                .filter(|folder| folder.path != current_parent)
                .collect(),
        );

        let Some(destination) = self.workspace.pick_folder(&candidates).await else {
            tracing::debug!("Move of {} cancelled", file.path);
            return None;
        };

        match self.try_move(&file, &destination, &next, &watch).await {
            Ok(opened) => opened,
            Err(e) => {
                tracing::error!("Error moving {}: {}", file.path, e);
                self.workspace.notice(NAVIGATE_OR_DELETE_FAILED, None);
                None
            }
        }
    }

    async fn try_move(
        &mut self,
        file: &FileNode,
        destination: &FolderNode,
        next: &FileNode,
        watch: &MoveWatch,
    ) -> Result<Option<FileNode>, NavigatorError> {
        let new_path = join_path(&destination.path, &file.name);
        self.vault
            .rename(&TreeEntry::File(file.clone()), &new_path)
            .await?;

        let Some(moved_to) = watch.settle(self.workspace.as_ref()).await else {
            tracing::warn!("Move of {} was not reported by the vault", file.path);
            return Ok(None);
        };
        tracing::info!("Moved {} to {}", file.path, moved_to);

        // The tree changed under us; look the target up again.
        let Some(target) = self.vault.file(&next.path) else {
            tracing::warn!("{} is gone after the move", next.path);
            return Ok(None);
        };

        self.workspace.open_file(&target).await?;
        self.settings.record_navigation();
        self.persist().await;
        Ok(Some(target))
    }

    /// Rename the active note's folder in place. Returns the renamed folder.
    pub async fn rename_parent_folder(&mut self) -> Option<FolderNode> {
        let folder = self
            .workspace
            .active_file()
            .and_then(|file| self.vault.parent(&file.path))
            .filter(|folder| !folder.is_root());
        let Some(folder) = folder else {
            self.workspace.notice(NO_PARENT_FOLDER, None);
            return None;
        };

        let answer = self.workspace.prompt_text("Rename Folder", &folder.name).await?;
        let name = answer.trim();
        if name.is_empty() || name == folder.name {
            return None;
        }
        if name.contains('/') || name.contains('\\') {
            self.workspace
                .notice(&format!("Folder names cannot contain slashes: {}", name), None);
            return None;
        }

        let parent = parent_path(&folder.path).unwrap_or("");
        let new_path = join_path(parent, name);
        match self
            .vault
            .rename(&TreeEntry::Folder(folder.clone()), &new_path)
            .await
        {
            Ok(()) => {
                tracing::info!("Renamed folder {} to {}", folder.path, new_path);
                Some(FolderNode::new(new_path))
            }
            Err(e) => {
                tracing::error!("Error renaming folder {}: {}", folder.path, e);
                self.workspace
                    .notice(&format!("Could not rename folder: {}", e), None);
                None
            }
        }
    }

    /// Log and return the sort order, trash mode and sorted folder contents.
    pub fn debug_report(&self) -> Option<DebugReport> {
        let folder = self
            .workspace
            .active_file()
            .and_then(|file| self.vault.parent(&file.path));
        let Some(folder) = folder else {
            self.workspace.notice(NOTHING_TO_DEBUG, None);
            return None;
        };

        let report = DebugReport {
            sort_order: self
                .workspace
                .explorer_sort_order()
                .unwrap_or_else(|| DEFAULT_SORT_ORDER.to_string()),
            trash_label: self.vault.trash_option().label().to_string(),
            sorted_paths: self
                .sort_files(self.vault.child_files(&folder))
                .into_iter()
                .map(|file| file.path)
                .collect(),
        };
        for line in report.lines() {
            tracing::info!("{}", line);
        }
        Some(report)
    }

    /// Count a visit to the settings page.
    pub async fn view_settings(&mut self) -> &NavigatorSettings {
        self.settings.record_settings_view();
        self.persist().await;
        &self.settings
    }

    pub async fn reset_statistics(&mut self) {
        self.settings.reset_statistics();
        self.persist().await;
    }

    pub fn prepare_for_deletion(&self, file: &FileNode) -> DeletionClosure {
        OrphanResolver::new(self.vault.as_ref(), &self.settings).prepare_for_deletion(file)
    }

    /// The dialog shown before deleting `file`. Sections appear only when
    /// their removal toggle is on and they have entries.
    pub fn confirmation_prompt(&self, file: &FileNode, closure: &DeletionClosure) -> ConfirmationPrompt {
        let mut sections = Vec::new();
        if self.settings.remove_orphan_attachments && !closure.attachments.is_empty() {
            sections.push(ConfirmationSection {
                heading: ATTACHMENTS_HEADING.to_string(),
                lines: closure.attachment_paths(),
            });
        }
        if self.settings.remove_empty_folders && !closure.orphaned_folders.is_empty() {
            sections.push(ConfirmationSection {
                heading: FOLDERS_HEADING.to_string(),
                lines: closure.orphaned_folders.paths(),
            });
        }
        ConfirmationPrompt {
            header: format!("Are you sure you want to delete \"{}\"?", file.name),
            sections,
        }
    }

    pub async fn confirm_deletion(&self, file: &FileNode, closure: &DeletionClosure) -> bool {
        let prompt = self.confirmation_prompt(file, closure);
        self.workspace.confirm(&prompt).await
    }

    pub async fn handle_attachments_and_folders(&self, closure: &DeletionClosure) -> DeletionReport {
        self.executor().execute(closure).await
    }

    pub async fn safe_delete(&self, entry: &TreeEntry, message: &str, delay: Duration) -> bool {
        self.executor().safe_delete(entry, message, delay).await
    }

    pub fn adjacent_file(&self, file: &FileNode, direction: Direction, scope: NavigationScope) -> Option<FileNode> {
        AdjacentFileResolver::new(self.vault.as_ref(), self.sort_config()).adjacent_file(file, direction, scope)
    }

    /// Sort files the way the explorer currently does.
    pub fn sort_files(&self, files: Vec<FileNode>) -> Vec<FileNode> {
        crate::sort::sort_files(files, self.sort_config())
    }

    fn sort_config(&self) -> SortConfig {
        sort_config_for(
            self.workspace.explorer_sort_order().as_deref(),
            self.settings.enable_debug_logging,
        )
    }

    fn executor(&self) -> DeletionExecutor<'_, V, W> {
        DeletionExecutor::new(self.vault.as_ref(), self.workspace.as_ref(), &self.settings)
    }

    async fn persist(&self) {
        if let Err(e) = self.workspace.save_settings(&self.settings).await {
            tracing::error!("Issue persisting settings: {}", e);
        }
    }
}
