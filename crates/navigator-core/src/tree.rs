//! Owned snapshot of a vault's file tree.
//!
//! `VaultTree` is plain data: path-keyed nodes, insertion-ordered children and
//! an optional link cache per file. Hosts keep one behind a lock and answer
//! `Vault` queries from it; it never touches the disk itself.

use std::collections::HashMap;

use crate::error::{HostError, Result};
use crate::host::{
    file_name, join_path, normalize_path, parent_path, FileNode, FileStat, FolderNode, LinkCache,
    TreeEntry, MARKDOWN_EXTENSION,
};

#[derive(Debug, Clone)]
enum Node {
    File {
        stat: FileStat,
        cache: Option<LinkCache>,
    },
    Folder {
        children: Vec<String>,
    },
}

#[derive(Debug, Clone)]
pub struct VaultTree {
    nodes: HashMap<String, Node>,
}

impl Default for VaultTree {
    fn default() -> Self {
        Self::new()
    }
}

impl VaultTree {
    pub fn new() -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(String::new(), Node::Folder { children: Vec::new() });
        Self { nodes }
    }

    pub fn len(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, path: &str) -> bool {
        self.nodes.contains_key(path.trim_matches('/'))
    }

    /// Insert a folder, creating missing ancestors. Existing folders are left alone.
    pub fn insert_folder(&mut self, path: &str) -> Result<()> {
        let path = path.trim_matches('/');
        match self.nodes.get(path) {
            Some(Node::Folder { .. }) => return Ok(()),
            Some(Node::File { .. }) => return Err(HostError::AlreadyExists(path.to_string())),
            None => {}
        }

        let parent = parent_path(path).unwrap_or("").to_string();
        self.insert_folder(&parent)?;
        self.attach(&parent, path);
        self.nodes
            .insert(path.to_string(), Node::Folder { children: Vec::new() });
        Ok(())
    }

    /// Insert or replace a file, creating missing ancestor folders.
    pub fn insert_file(&mut self, path: &str, stat: FileStat, cache: Option<LinkCache>) -> Result<()> {
        let path = path.trim_matches('/');
        if path.is_empty() {
            return Err(HostError::InvalidPath(path.to_string()));
        }
        match self.nodes.get_mut(path) {
            Some(Node::File { stat: s, cache: c }) => {
                *s = stat;
                *c = cache;
                return Ok(());
            }
            Some(Node::Folder { .. }) => return Err(HostError::AlreadyExists(path.to_string())),
            None => {}
        }

        let parent = parent_path(path).unwrap_or("").to_string();
        self.insert_folder(&parent)?;
        self.attach(&parent, path);
        self.nodes.insert(path.to_string(), Node::File { stat, cache });
        Ok(())
    }

    pub fn set_stat(&mut self, path: &str, stat: FileStat) -> Result<()> {
        match self.nodes.get_mut(path) {
            Some(Node::File { stat: s, .. }) => {
                *s = stat;
                Ok(())
            }
            _ => Err(HostError::NotFound(path.to_string())),
        }
    }

    pub fn entry(&self, path: &str) -> Option<TreeEntry> {
        let path = path.trim_matches('/');
        self.nodes.get(path).map(|node| Self::to_entry(path, node))
    }

    /// Direct children of a folder in insertion order. Empty for unknown paths.
    pub fn children(&self, folder: &str) -> Vec<TreeEntry> {
        match self.nodes.get(folder.trim_matches('/')) {
            Some(Node::Folder { children }) => children
                .iter()
                .filter_map(|child| self.entry(child))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// All entries in depth-first pre-order, root excluded.
    pub fn walk(&self) -> Vec<TreeEntry> {
        let mut out = Vec::new();
        self.walk_into("", &mut out);
        out
    }

    fn walk_into(&self, folder: &str, out: &mut Vec<TreeEntry>) {
        for child in self.children(folder) {
            let is_folder = matches!(child, TreeEntry::Folder(_));
            let path = child.path().to_string();
            out.push(child);
            if is_folder {
                self.walk_into(&path, out);
            }
        }
    }

    pub fn markdown_files(&self) -> Vec<FileNode> {
        self.walk()
            .into_iter()
            .filter_map(TreeEntry::into_file)
            .filter(FileNode::is_markdown)
            .collect()
    }

    /// Every folder, root first.
    pub fn folders(&self) -> Vec<FolderNode> {
        std::iter::once(FolderNode::root())
            .chain(self.walk().into_iter().filter_map(TreeEntry::into_folder))
            .collect()
    }

    pub fn file_cache(&self, path: &str) -> Option<LinkCache> {
        match self.nodes.get(path) {
            Some(Node::File { cache, .. }) => cache.clone(),
            _ => None,
        }
    }

    /// Remove an entry and everything under it.
    pub fn remove(&mut self, path: &str) -> Result<()> {
        let path = path.trim_matches('/');
        if path.is_empty() {
            return Err(HostError::InvalidPath("cannot remove the vault root".to_string()));
        }
        let node = self
            .nodes
            .remove(path)
            .ok_or_else(|| HostError::NotFound(path.to_string()))?;

        if let Node::Folder { children } = node {
            for child in children {
                // Children are removed with their parent; ignore already-gone entries
                let _ = self.remove(&child);
            }
        }

        let parent = parent_path(path).unwrap_or("");
        if let Some(Node::Folder { children }) = self.nodes.get_mut(parent) {
            children.retain(|child| child != path);
        }
        Ok(())
    }

    /// Move an entry (and its subtree) to `to`. The destination folder must exist.
    pub fn move_entry(&mut self, from: &str, to: &str) -> Result<()> {
        let from = from.trim_matches('/').to_string();
        let to = normalize_path(to).ok_or_else(|| HostError::InvalidPath(to.to_string()))?;

        if from.is_empty() || to.is_empty() {
            return Err(HostError::InvalidPath("cannot move the vault root".to_string()));
        }
        if !self.nodes.contains_key(&from) {
            return Err(HostError::NotFound(from));
        }
        if from == to {
            return Ok(());
        }
        if self.nodes.contains_key(&to) {
            return Err(HostError::AlreadyExists(to));
        }
        if to.starts_with(&format!("{}/", from)) {
            return Err(HostError::InvalidPath(format!("cannot move {} into itself", from)));
        }
        let new_parent = parent_path(&to).unwrap_or("").to_string();
        if !matches!(self.nodes.get(&new_parent), Some(Node::Folder { .. })) {
            return Err(HostError::NotFound(new_parent));
        }

        // Detach from the old parent
        let old_parent = parent_path(&from).unwrap_or("").to_string();
        if let Some(Node::Folder { children }) = self.nodes.get_mut(&old_parent) {
            children.retain(|child| *child != from);
        }

        let prefix = format!("{}/", from);
        let moved: Vec<String> = self
            .nodes
            .keys()
            .filter(|path| **path == from || path.starts_with(&prefix))
            .cloned()
            .collect();

        for old_path in moved {
            if let Some(mut node) = self.nodes.remove(&old_path) {
                if let Node::Folder { children } = &mut node {
                    for child in children.iter_mut() {
                        *child = rebase(child, &from, &to);
                    }
                }
                self.nodes.insert(rebase(&old_path, &from, &to), node);
            }
        }

        self.attach(&new_parent, &to);
        Ok(())
    }

    /// Resolve a raw link target to a file the way the host's link index does.
    ///
    /// Order: exact path, exact path + `.md`, relative to the source folder,
    /// then by file name anywhere (source folder first, then shortest path).
    pub fn resolve_link(&self, link: &str, source_path: &str) -> Option<FileNode> {
        let link = link.trim().trim_start_matches('/');
        if link.is_empty() {
            return None;
        }
        let with_md = format!("{}.{}", link, MARKDOWN_EXTENSION);

        for candidate in [link, with_md.as_str()] {
            if let Some(TreeEntry::File(file)) = self.entry(candidate) {
                return Some(file);
            }
        }

        let source_folder = parent_path(source_path).unwrap_or("");
        if let Some(relative) = normalize_path(&join_path(source_folder, link)) {
            for candidate in [relative.clone(), format!("{}.{}", relative, MARKDOWN_EXTENSION)] {
                if let Some(TreeEntry::File(file)) = self.entry(&candidate) {
                    return Some(file);
                }
            }
        }

        let suffixes = [format!("/{}", link), format!("/{}", with_md)];
        let mut matches: Vec<&String> = self
            .nodes
            .iter()
            .filter(|(path, node)| {
                matches!(node, Node::File { .. })
                    && (suffixes.iter().any(|suffix| path.ends_with(suffix.as_str()))
                        || file_name(path) == link
                        || file_name(path) == with_md)
            })
            .map(|(path, _)| path)
            .collect();

        matches.sort_by(|a, b| {
            let a_local = parent_path(a) == Some(source_folder);
            let b_local = parent_path(b) == Some(source_folder);
            b_local
                .cmp(&a_local)
                .then_with(|| a.len().cmp(&b.len()))
                .then_with(|| a.cmp(b))
        });

        matches.first().and_then(|path| self.entry(path)).and_then(TreeEntry::into_file)
    }

    fn attach(&mut self, parent: &str, child: &str) {
        if let Some(Node::Folder { children }) = self.nodes.get_mut(parent) {
            if !children.iter().any(|c| c == child) {
                children.push(child.to_string());
            }
        }
    }

    fn to_entry(path: &str, node: &Node) -> TreeEntry {
        match node {
            Node::File { stat, .. } => TreeEntry::File(FileNode::new(path, *stat)),
            Node::Folder { .. } => TreeEntry::Folder(FolderNode::new(path)),
        }
    }
}

fn rebase(path: &str, from: &str, to: &str) -> String {
    if path == from {
        to.to_string()
    } else {
        format!("{}{}", to, &path[from.len()..])
    }
}
