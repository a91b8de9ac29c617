//! Vault backed by a directory on disk.
//!
//! The directory is scanned once into a `VaultTree`; trash and rename go to
//! the filesystem first and are mirrored into the tree afterwards. Hidden
//! entries (`.obsidian`, `.trash`, `.git`, ...) are never part of the vault.

use async_trait::async_trait;
use navigator_core::error::{HostError, Result};
use navigator_core::events::{EventBus, VaultEvent};
use navigator_core::host::{
    join_path, parent_path, split_extension, FileNode, FileStat, FolderNode, LinkCache, TrashOption,
    TreeEntry, Vault, MARKDOWN_EXTENSION,
};
use navigator_core::tree::VaultTree;
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::fs;

/// Folder the `local` trash option moves entries into.
pub const LOCAL_TRASH_DIR: &str = ".trash";

pub struct NativeVault {
    base_path: PathBuf,
    tree: RwLock<VaultTree>,
    events: Arc<EventBus>,
    trash_option: TrashOption,
}

impl NativeVault {
    /// Scan `base_path` into a new vault.
    pub async fn open(base_path: PathBuf, trash_option: TrashOption) -> Result<Self> {
        let metadata = fs::metadata(&base_path).await?;
        if !metadata.is_dir() {
            return Err(HostError::InvalidPath(base_path.display().to_string()));
        }

        let mut tree = VaultTree::new();
        scan_dir(&base_path, "", &mut tree).await?;
        tracing::info!(
            "Scanned {}: {} markdown files, {} folders",
            base_path.display(),
            tree.markdown_files().len(),
            tree.folders().len()
        );

        Ok(Self {
            base_path,
            tree: RwLock::new(tree),
            events: Arc::new(EventBus::new()),
            trash_option,
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn full_path(&self, path: &str) -> PathBuf {
        if path.is_empty() {
            self.base_path.clone()
        } else {
            self.base_path.join(path)
        }
    }

    fn tree(&self) -> RwLockReadGuard<'_, VaultTree> {
        self.tree.read().unwrap_or_else(|e| e.into_inner())
    }

    fn tree_mut(&self) -> RwLockWriteGuard<'_, VaultTree> {
        self.tree.write().unwrap_or_else(|e| e.into_inner())
    }

    async fn move_to_local_trash(&self, full_path: &Path, name: &str) -> Result<()> {
        let trash_dir = self.base_path.join(LOCAL_TRASH_DIR);
        fs::create_dir_all(&trash_dir).await?;
        let target = unique_destination(&trash_dir, name).await;
        fs::rename(full_path, &target).await?;
        Ok(())
    }

    async fn move_to_system_trash(&self, full_path: PathBuf) -> Result<()> {
        tokio::task::spawn_blocking(move || trash::delete(&full_path))
            .await
            .map_err(|e| HostError::Io(e.to_string()))?
            .map_err(|e| HostError::Io(e.to_string()))
    }
}

/// First free `name`, `name 1`, `name 2`, ... inside `dir`.
async fn unique_destination(dir: &Path, name: &str) -> PathBuf {
    let candidate = dir.join(name);
    if !fs::try_exists(&candidate).await.unwrap_or(false) {
        return candidate;
    }

    let (stem, extension) = split_extension(name);
    let mut n = 1u32;
    loop {
        let numbered = if extension.is_empty() {
            format!("{} {}", stem, n)
        } else {
            format!("{} {}.{}", stem, n, extension)
        };
        let candidate = dir.join(numbered);
        if !fs::try_exists(&candidate).await.unwrap_or(false) {
            return candidate;
        }
        n += 1;
    }
}

/// Recursively add the contents of `dir` (vault path `prefix`) to `tree`.
async fn scan_dir(dir: &Path, prefix: &str, tree: &mut VaultTree) -> Result<()> {
    let mut entries = Vec::new();
    let mut read_dir = fs::read_dir(dir).await?;
    while let Some(entry) = read_dir.next_entry().await? {
        entries.push(entry);
    }
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('.') {
            continue;
        }

        let path = join_path(prefix, &name);
        let file_type = entry.file_type().await?;
        if file_type.is_dir() {
            tree.insert_folder(&path)?;
            Box::pin(scan_dir(&entry.path(), &path, tree)).await?;
        } else if file_type.is_file() {
            let metadata = entry.metadata().await?;
            let cache = if split_extension(&name).1 == MARKDOWN_EXTENSION {
                match fs::read_to_string(entry.path()).await {
                    Ok(content) => Some(LinkCache::from_markdown(&content)),
                    Err(e) => {
                        tracing::warn!("Failed to read {}: {}", path, e);
                        None
                    }
                }
            } else {
                None
            };
            tree.insert_file(&path, file_stat(&metadata), cache)?;
        }
    }
    Ok(())
}

fn file_stat(metadata: &Metadata) -> FileStat {
    let millis = |time: std::io::Result<SystemTime>| {
        time.ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_millis() as i64)
    };
    let mtime = millis(metadata.modified()).unwrap_or(0);
    FileStat {
        // Not every filesystem records creation time
        ctime: millis(metadata.created()).unwrap_or(mtime),
        mtime,
        size: metadata.len(),
    }
}

#[async_trait]
impl Vault for NativeVault {
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
        if path.is_empty() {
            return Err(HostError::InvalidPath("cannot trash the vault root".to_string()));
        }
        if !self.tree().contains(&path) {
            return Err(HostError::NotFound(path));
        }

        let full_path = self.full_path(&path);
        match self.trash_option {
            TrashOption::Local => self.move_to_local_trash(&full_path, entry.name()).await?,
            TrashOption::System => self.move_to_system_trash(full_path).await?,
            TrashOption::None => match entry {
                TreeEntry::File(_) => fs::remove_file(&full_path).await?,
                TreeEntry::Folder(_) => fs::remove_dir_all(&full_path).await?,
            },
        }

        self.tree_mut().remove(&path)?;
        tracing::debug!("Trashed {} ({})", path, self.trash_option.as_str());
        self.events.emit(VaultEvent::Deleted { path });
        Ok(())
    }

    async fn rename(&self, entry: &TreeEntry, new_path: &str) -> Result<()> {
        let old_path = entry.path().to_string();
        {
            let tree = self.tree();
            if !tree.contains(&old_path) {
                return Err(HostError::NotFound(old_path));
            }
            if tree.contains(new_path) {
                return Err(HostError::AlreadyExists(new_path.to_string()));
            }
            let parent = parent_path(new_path).unwrap_or("");
            if !matches!(tree.entry(parent), Some(TreeEntry::Folder(_))) {
                return Err(HostError::NotFound(parent.to_string()));
            }
        }

        fs::rename(self.full_path(&old_path), self.full_path(new_path)).await?;
        self.tree_mut().move_entry(&old_path, new_path)?;

        tracing::debug!("Renamed {} to {}", old_path, new_path);
        self.events.emit(VaultEvent::Renamed {
            path: new_path.to_string(),
            old_path,
        });
        Ok(())
    }
}
