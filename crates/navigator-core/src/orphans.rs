//! What-if analysis for deleting a note.
//!
//! Before anything is trashed, `OrphanResolver` works out which attachments
//! only the note references and which folders would be left empty once the
//! note and those attachments are gone. The result is a `DeletionClosure`
//! snapshot that the executor later acts on without re-validating.

use crate::host::{FileNode, FolderNode, Vault};
use crate::links::LinkIndex;
use crate::settings::NavigatorSettings;

/// Folders that would become empty, in discovery order.
///
/// A folder is always discovered after every child folder that made it
/// empty, so iteration order is safe for deletion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrphanedFolders {
    folders: Vec<FolderNode>,
}

impl OrphanedFolders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.folders.iter().any(|folder| folder.path == path)
    }

    /// Returns false if the folder was already present.
    pub fn insert(&mut self, folder: FolderNode) -> bool {
        if self.contains(&folder.path) {
            return false;
        }
        self.folders.push(folder);
        true
    }

    pub fn len(&self) -> usize {
        self.folders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.folders.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FolderNode> {
        self.folders.iter()
    }

    pub fn paths(&self) -> Vec<String> {
        self.folders.iter().map(|folder| folder.path.clone()).collect()
    }
}

/// Everything a deletion would remove besides the note itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletionClosure {
    pub attachments: Vec<FileNode>,
    pub orphaned_folders: OrphanedFolders,
}

impl DeletionClosure {
    pub fn new(attachments: Vec<FileNode>, folders: impl IntoIterator<Item = FolderNode>) -> Self {
        let mut orphaned_folders = OrphanedFolders::new();
        for folder in folders {
            orphaned_folders.insert(folder);
        }
        Self {
            attachments,
            orphaned_folders,
        }
    }

    pub fn attachment_paths(&self) -> Vec<String> {
        self.attachments.iter().map(|file| file.path.clone()).collect()
    }
}

pub struct OrphanResolver<'a, V: Vault + ?Sized> {
    vault: &'a V,
    settings: &'a NavigatorSettings,
}

impl<'a, V: Vault + ?Sized> OrphanResolver<'a, V> {
    pub fn new(vault: &'a V, settings: &'a NavigatorSettings) -> Self {
        Self { vault, settings }
    }

    /// Compute the attachments and folders that deleting `file` would orphan.
    pub fn prepare_for_deletion(&self, file: &FileNode) -> DeletionClosure {
        let attachments = self.orphan_attachments(file);
        let mut orphaned = OrphanedFolders::new();

        if self.settings.remove_orphan_attachments {
            for attachment in &attachments {
                self.check_orphaned_folder(self.vault.parent(&attachment.path), &attachments, &mut orphaned);
            }
        }

        // The note's own folder is checked with the note and its attachments
        // removed, whatever the attachment toggle says.
        let mut deletion_set = Vec::with_capacity(attachments.len() + 1);
        deletion_set.push(file.clone());
        deletion_set.extend(attachments.iter().cloned());
        self.check_orphaned_folder(self.vault.parent(&file.path), &deletion_set, &mut orphaned);

        tracing::debug!(
            "Prepared deletion of {}: {} attachments, {} folders",
            file.path,
            attachments.len(),
            orphaned.len()
        );
        DeletionClosure {
            attachments,
            orphaned_folders: orphaned,
        }
    }

    /// Non-markdown files that only `file` references, sorted by path.
    pub fn orphan_attachments(&self, file: &FileNode) -> Vec<FileNode> {
        if !file.is_markdown() {
            return Vec::new();
        }

        let index = LinkIndex::new(self.vault);
        let links = index.links_of(file);
        if links.is_empty() {
            return Vec::new();
        }

        let counts = index.reference_counts();
        links
            .into_iter()
            .filter(|target| counts.get(target) == Some(&1))
            .filter_map(|target| self.vault.file(&target))
            .filter(|candidate| !candidate.is_markdown())
            .collect()
    }

    /// True if `folder` would hold nothing once `files_to_delete` and the
    /// already-orphaned folders are gone.
    pub fn is_folder_empty_after_deletion(
        &self,
        folder: &FolderNode,
        files_to_delete: &[FileNode],
        orphaned: &OrphanedFolders,
    ) -> bool {
        self.vault.children(folder).iter().all(|child| match child.as_file() {
            Some(file) => files_to_delete.iter().any(|doomed| doomed.path == file.path),
            None => orphaned.contains(child.path()),
        })
    }

    /// Walk upward from `folder`, adding each level that would become empty.
    ///
    /// Stops at the first non-empty or already-orphaned folder, at the vault
    /// root, or after `max_directory_delete_traversal` levels.
    pub fn check_orphaned_folder(
        &self,
        folder: Option<FolderNode>,
        files_to_delete: &[FileNode],
        orphaned: &mut OrphanedFolders,
    ) {
        let mut current = folder;
        let mut depth = self.settings.max_directory_delete_traversal;

        while depth > 0 {
            let Some(folder) = current.take() else {
                break;
            };
            if folder.is_root() || orphaned.contains(&folder.path) {
                break;
            }
            if !self.is_folder_empty_after_deletion(&folder, files_to_delete, orphaned) {
                break;
            }

            tracing::debug!("Folder {} would become empty", folder.path);
            current = self.vault.parent(&folder.path);
            orphaned.insert(folder);
            depth -= 1;
        }
    }
}
