//! Next/previous note resolution.
//!
//! Within a folder, notes follow the explorer's sort order. Across folders the
//! walk is depth-first over alphabetically sorted folders: `Next` descends to
//! the first leaf folder before moving across, `Prev` climbs back through
//! siblings and ancestors. Folder identity is always the path.

use std::fmt;
use std::str::FromStr;

use crate::host::{FileNode, FolderNode, Vault};
use crate::settings::NavigationScope;
use crate::sort::{sort_files, sort_folders, SortConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Prev,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Next => write!(f, "next"),
            Direction::Prev => write!(f, "prev"),
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "next" => Ok(Direction::Next),
            "prev" | "previous" => Ok(Direction::Prev),
            other => Err(format!("unknown direction: {}", other)),
        }
    }
}

pub struct AdjacentFileResolver<'a, V: Vault + ?Sized> {
    vault: &'a V,
    sort: SortConfig,
}

impl<'a, V: Vault + ?Sized> AdjacentFileResolver<'a, V> {
    pub fn new(vault: &'a V, sort: SortConfig) -> Self {
        Self { vault, sort }
    }

    /// The note after (or before) `file`, or None when the walk runs out.
    pub fn adjacent_file(&self, file: &FileNode, direction: Direction, scope: NavigationScope) -> Option<FileNode> {
        let Some(original) = self.vault.parent(&file.path) else {
            tracing::warn!("No parent folder found for {}", file.path);
            return None;
        };

        if let Some(found) = self.adjacent_in_folder(&original, file, direction, false) {
            return Some(found);
        }
        if scope == NavigationScope::ActiveFolder {
            return None;
        }

        let mut targets = self.target_folders(&original, direction);
        let mut current = Some(original);
        // Each folder can be entered from a handful of states; anything past
        // that is a cycle.
        let mut budget = self.vault.folders().len().saturating_mul(4).saturating_add(4);

        while let Some(candidates) = targets.take().filter(|c| !c.is_empty()) {
            if budget == 0 {
                tracing::warn!("Stopped {} navigation from {}: traversal did not converge", direction, file.path);
                return None;
            }
            budget -= 1;

            let sorted = sort_folders(candidates);
            let index = current
                .as_ref()
                .and_then(|c| sorted.iter().position(|f| f.path == c.path));

            let mut target = match direction {
                Direction::Next => sorted.get(index.map_or(0, |i| i + 1)).cloned(),
                Direction::Prev => match index {
                    Some(0) => self.vault.parent(&sorted[0].path),
                    Some(i) => sorted.get(i - 1).cloned(),
                    None => sorted.last().cloned(),
                },
            };

            if direction == Direction::Next {
                target = target.map(|folder| self.first_leaf(folder));
                if target.is_none() {
                    target = current.as_ref().and_then(|c| self.vault.parent(&c.path));
                }
            }

            if direction == Direction::Prev {
                if let (Some(cur), Some(t)) = (current.as_ref(), target.as_ref()) {
                    let parent = self.vault.parent(&cur.path);
                    if parent.as_ref().is_some_and(|p| p.path == t.path) {
                        let grandparent = parent.as_ref().and_then(|p| self.vault.parent(&p.path));
                        if let Some(grandparent) = grandparent {
                            let escalated = self.target_folders(&grandparent, direction);
                            if escalated.is_some() {
                                tracing::debug!("Escalating prev navigation above {}", cur.path);
                                targets = escalated;
                                current = parent;
                                continue;
                            }
                        }
                    }
                }
            }

            if let Some(folder) = target.as_ref() {
                if let Some(found) = self.adjacent_in_folder(folder, file, direction, true) {
                    return Some(found);
                }
            }

            targets = target.as_ref().and_then(|folder| self.target_folders(folder, direction));
            current = target;
        }

        None
    }

    /// Neighbor of `file` among the folder's sorted notes. When `entering` a
    /// new folder, its first (`Next`) or last (`Prev`) note wins outright.
    pub fn adjacent_in_folder(
        &self,
        folder: &FolderNode,
        file: &FileNode,
        direction: Direction,
        entering: bool,
    ) -> Option<FileNode> {
        let notes: Vec<FileNode> = self
            .vault
            .child_files(folder)
            .into_iter()
            .filter(FileNode::is_markdown)
            .collect();
        let notes = sort_files(notes, self.sort);

        if entering && !notes.is_empty() {
            return match direction {
                Direction::Next => notes.first().cloned(),
                Direction::Prev => notes.last().cloned(),
            };
        }

        let index = notes.iter().position(|note| note.path == file.path)?;
        match direction {
            Direction::Next => notes.get(index + 1).cloned(),
            Direction::Prev => index.checked_sub(1).and_then(|i| notes.get(i).cloned()),
        }
    }

    /// Folders the walk may move to next from `folder`.
    ///
    /// `Next` looks at the folder's siblings. `Prev` looks at the folder's own
    /// children, or (for a leaf) its siblings; a leaf that is first among its
    /// siblings jumps to the folder just before its parent.
    pub fn target_folders(&self, folder: &FolderNode, direction: Direction) -> Option<Vec<FolderNode>> {
        let parent = self.vault.parent(&folder.path);

        match direction {
            Direction::Next => parent.map(|p| self.vault.child_folders(&p)),
            Direction::Prev => {
                let Some(parent) = parent else {
                    return Some(self.vault.child_folders(folder));
                };

                let children = self.vault.child_folders(folder);
                if !children.is_empty() {
                    return Some(children);
                }

                let siblings = sort_folders(self.vault.child_folders(&parent));
                let first_sibling = siblings.first().is_some_and(|s| s.path == folder.path);
                if first_sibling {
                    if let Some(grandparent) = self.vault.parent(&parent.path) {
                        let uncles = sort_folders(self.vault.child_folders(&grandparent));
                        let position = uncles.iter().position(|f| f.path == parent.path);
                        if let Some(i) = position.filter(|i| *i > 0) {
                            return Some(vec![uncles[i - 1].clone()]);
                        }
                    }
                }
                Some(siblings)
            }
        }
    }

    /// Follow first child folders down to a leaf.
    fn first_leaf(&self, mut folder: FolderNode) -> FolderNode {
        while let Some(child) = sort_folders(self.vault.child_folders(&folder)).into_iter().next() {
            folder = child;
        }
        folder
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryVault;
    use crate::sort::{SortField, SortOrder};

    fn next_of(vault: &InMemoryVault, path: &str, scope: NavigationScope) -> Option<String> {
        adjacent(vault, path, Direction::Next, scope)
    }

    fn prev_of(vault: &InMemoryVault, path: &str, scope: NavigationScope) -> Option<String> {
        adjacent(vault, path, Direction::Prev, scope)
    }

    fn adjacent(vault: &InMemoryVault, path: &str, direction: Direction, scope: NavigationScope) -> Option<String> {
        let file = vault.file(path).unwrap();
        AdjacentFileResolver::new(vault, SortConfig::default())
            .adjacent_file(&file, direction, scope)
            .map(|f| f.path)
    }

    const VAULT: NavigationScope = NavigationScope::EntireVault;

    #[test]
    fn neighbors_within_a_folder() {
        let vault = InMemoryVault::new();
        vault.add_note("notes/10.md", "");
        vault.add_note("notes/2.md", "");
        vault.add_note("notes/1.md", "");

        assert_eq!(next_of(&vault, "notes/1.md", VAULT).as_deref(), Some("notes/2.md"));
        assert_eq!(next_of(&vault, "notes/2.md", VAULT).as_deref(), Some("notes/10.md"));
        assert_eq!(prev_of(&vault, "notes/10.md", VAULT).as_deref(), Some("notes/2.md"));
    }

    #[test]
    fn attachments_are_skipped() {
        let vault = InMemoryVault::new();
        vault.add_note("a.md", "");
        vault.add_file("b.png");
        vault.add_note("c.md", "");

        assert_eq!(next_of(&vault, "a.md", VAULT).as_deref(), Some("c.md"));
    }

    #[test]
    fn next_descends_to_the_first_leaf() {
        let vault = InMemoryVault::new();
        vault.add_note("A/a1.md", "");
        vault.add_note("B/C/c1.md", "");

        assert_eq!(next_of(&vault, "A/a1.md", VAULT).as_deref(), Some("B/C/c1.md"));
    }

    #[test]
    fn next_descends_through_alphabetically_first_children() {
        let vault = InMemoryVault::new();
        vault.add_note("a/last.md", "");
        vault.add_note("b/zeta/z.md", "");
        vault.add_note("b/Alpha/deep/d.md", "");
        vault.add_note("b/alpha2/x.md", "");

        assert_eq!(next_of(&vault, "a/last.md", VAULT).as_deref(), Some("b/Alpha/deep/d.md"));
    }

    #[test]
    fn next_moves_across_sibling_folders() {
        let vault = InMemoryVault::new();
        vault.add_note("A/a1.md", "");
        vault.add_note("A/a2.md", "");
        vault.add_note("b/b1.md", "");

        assert_eq!(next_of(&vault, "A/a2.md", VAULT).as_deref(), Some("b/b1.md"));
    }

    #[test]
    fn next_climbs_to_parent_after_last_child() {
        let vault = InMemoryVault::new();
        vault.add_note("top.md", "");
        vault.add_note("only/o.md", "");

        assert_eq!(next_of(&vault, "only/o.md", VAULT).as_deref(), Some("top.md"));
    }

    #[test]
    fn prev_moves_to_the_previous_sibling_folder() {
        let vault = InMemoryVault::new();
        vault.add_note("A/a1.md", "");
        vault.add_note("A/a2.md", "");
        vault.add_note("B/b1.md", "");

        assert_eq!(prev_of(&vault, "B/b1.md", VAULT).as_deref(), Some("A/a2.md"));
    }

    #[test]
    fn prev_from_first_leaf_jumps_before_its_parent() {
        let vault = InMemoryVault::new();
        vault.add_note("A/a1.md", "");
        vault.add_note("B/C/c1.md", "");

        assert_eq!(prev_of(&vault, "B/C/c1.md", VAULT).as_deref(), Some("A/a1.md"));
    }

    #[test]
    fn active_folder_scope_stops_at_the_folder_edge() {
        let vault = InMemoryVault::new();
        vault.add_note("A/a1.md", "");
        vault.add_note("A/a2.md", "");
        vault.add_note("B/b1.md", "");

        let scope = NavigationScope::ActiveFolder;
        assert_eq!(next_of(&vault, "A/a1.md", scope).as_deref(), Some("A/a2.md"));
        assert_eq!(next_of(&vault, "A/a2.md", scope), None);
        assert_eq!(prev_of(&vault, "B/b1.md", scope), None);
    }

    #[test]
    fn exhausted_vault_has_no_next() {
        let vault = InMemoryVault::new();
        vault.add_note("a.md", "");
        vault.add_note("b.md", "");

        assert_eq!(next_of(&vault, "b.md", VAULT), None);
        assert_eq!(prev_of(&vault, "a.md", VAULT), None);
    }

    #[test]
    fn folder_order_ignores_case() {
        let vault = InMemoryVault::new();
        vault.add_note("apple/a.md", "");
        vault.add_note("Banana/b.md", "");
        vault.add_note("cherry/c.md", "");

        assert_eq!(next_of(&vault, "apple/a.md", VAULT).as_deref(), Some("Banana/b.md"));
        assert_eq!(next_of(&vault, "Banana/b.md", VAULT).as_deref(), Some("cherry/c.md"));
    }

    #[test]
    fn in_folder_order_follows_sort_config() {
        let vault = InMemoryVault::new();
        vault.add_note("n/old.md", "");
        vault.add_note("n/new.md", "");
        vault.set_stat("n/old.md", 100, 100);
        vault.set_stat("n/new.md", 200, 200);

        let newest_first = SortConfig {
            field: SortField::Created,
            order: SortOrder::Descending,
        };
        let file = vault.file("n/new.md").unwrap();
        let next = AdjacentFileResolver::new(&vault, newest_first).adjacent_file(&file, Direction::Next, VAULT);
        assert_eq!(next.map(|f| f.path).as_deref(), Some("n/old.md"));
    }

    #[test]
    fn direction_parses_both_spellings() {
        assert_eq!("next".parse::<Direction>().unwrap(), Direction::Next);
        assert_eq!("previous".parse::<Direction>().unwrap(), Direction::Prev);
        assert!("up".parse::<Direction>().is_err());
    }
}
