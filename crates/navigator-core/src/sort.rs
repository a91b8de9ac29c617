//! File ordering that mirrors the host's file explorer.

use std::cmp::Ordering;
use std::str::FromStr;

use crate::host::{FileNode, FolderNode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Name,
    Created,
    Modified,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Field and order pair used by `sort_files`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortConfig {
    pub field: SortField,
    pub order: SortOrder,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            field: SortField::Name,
            order: SortOrder::Ascending,
        }
    }
}

/// The six sort orders the host's file explorer offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExplorerSortOrder {
    Alphabetical,
    AlphabeticalReverse,
    ByCreatedTime,
    ByCreatedTimeReverse,
    ByModifiedTime,
    ByModifiedTimeReverse,
}

impl ExplorerSortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExplorerSortOrder::Alphabetical => "alphabetical",
            ExplorerSortOrder::AlphabeticalReverse => "alphabeticalReverse",
            ExplorerSortOrder::ByCreatedTime => "byCreatedTime",
            ExplorerSortOrder::ByCreatedTimeReverse => "byCreatedTimeReverse",
            ExplorerSortOrder::ByModifiedTime => "byModifiedTime",
            ExplorerSortOrder::ByModifiedTimeReverse => "byModifiedTimeReverse",
        }
    }

    /// "By created time" in the explorer lists newest first.
    pub fn sort_config(&self) -> SortConfig {
        use SortField::*;
        use SortOrder::*;
        let (field, order) = match self {
            ExplorerSortOrder::Alphabetical => (Name, Ascending),
            ExplorerSortOrder::AlphabeticalReverse => (Name, Descending),
            ExplorerSortOrder::ByCreatedTime => (Created, Descending),
            ExplorerSortOrder::ByCreatedTimeReverse => (Created, Ascending),
            ExplorerSortOrder::ByModifiedTime => (Modified, Descending),
            ExplorerSortOrder::ByModifiedTimeReverse => (Modified, Ascending),
        };
        SortConfig { field, order }
    }
}

impl FromStr for ExplorerSortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "alphabetical" => Ok(ExplorerSortOrder::Alphabetical),
            "alphabeticalReverse" => Ok(ExplorerSortOrder::AlphabeticalReverse),
            "byCreatedTime" => Ok(ExplorerSortOrder::ByCreatedTime),
            "byCreatedTimeReverse" => Ok(ExplorerSortOrder::ByCreatedTimeReverse),
            "byModifiedTime" => Ok(ExplorerSortOrder::ByModifiedTime),
            "byModifiedTimeReverse" => Ok(ExplorerSortOrder::ByModifiedTimeReverse),
            other => Err(format!("unknown sort order: {}", other)),
        }
    }
}

/// Map the explorer's raw sort-order state to a `SortConfig`.
///
/// Missing or unrecognized values fall back to name/ascending. The fallback
/// is only logged when `warn_on_fallback` is set.
pub fn sort_config_for(raw: Option<&str>, warn_on_fallback: bool) -> SortConfig {
    let Some(raw) = raw else {
        return SortConfig::default();
    };
    match raw.parse::<ExplorerSortOrder>() {
        Ok(order) => order.sort_config(),
        Err(_) => {
            if warn_on_fallback {
                tracing::warn!("Invalid sort order {:?} found. Using default alphabetical sort.", raw);
            }
            SortConfig::default()
        }
    }
}

/// Sort files by `config`. Stable: ties keep their input order.
pub fn sort_files(mut files: Vec<FileNode>, config: SortConfig) -> Vec<FileNode> {
    let compare: fn(&FileNode, &FileNode) -> Ordering = match config.field {
        SortField::Name => compare_file_names,
        SortField::Created => |a, b| a.stat.ctime.cmp(&b.stat.ctime),
        SortField::Modified => |a, b| a.stat.mtime.cmp(&b.stat.mtime),
    };
    match config.order {
        SortOrder::Ascending => files.sort_by(compare),
        SortOrder::Descending => files.sort_by(|a, b| compare(b, a)),
    }
    files
}

/// Folders in case-insensitive name order.
pub fn sort_folders(mut folders: Vec<FolderNode>) -> Vec<FolderNode> {
    folders.sort_by(compare_folder_names);
    folders
}

pub fn compare_folder_names(a: &FolderNode, b: &FolderNode) -> Ordering {
    a.name
        .to_lowercase()
        .cmp(&b.name.to_lowercase())
        .then_with(|| a.name.cmp(&b.name))
}

/// Natural name order: basename, then extension, then name length.
pub fn compare_file_names(a: &FileNode, b: &FileNode) -> Ordering {
    natural_cmp(&a.basename, &b.basename)
        .then_with(|| a.extension.to_lowercase().cmp(&b.extension.to_lowercase()))
        .then_with(|| a.name.len().cmp(&b.name.len()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum CharClass {
    Symbol,
    Digit,
    Letter,
}

fn char_class(c: char) -> CharClass {
    if c.is_ascii_digit() {
        CharClass::Digit
    } else if c.is_alphabetic() {
        CharClass::Letter
    } else {
        CharClass::Symbol
    }
}

/// Case-insensitive natural comparison.
///
/// The class of the first character decides first (symbols, then digits,
/// then letters). After that, digit runs compare by numeric value.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let first = |s: &str| s.chars().next().map(char_class);
    first(a)
        .cmp(&first(b))
        .then_with(|| alphanumeric_sort::compare_str(a.to_lowercase(), b.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::FileStat;

    fn files(names: &[&str]) -> Vec<FileNode> {
        names
            .iter()
            .map(|name| FileNode::new(*name, FileStat::default()))
            .collect()
    }

    fn names(files: &[FileNode]) -> Vec<&str> {
        files.iter().map(|f| f.name.as_str()).collect()
    }

    fn stamped(name: &str, ctime: i64, mtime: i64) -> FileNode {
        FileNode::new(name, FileStat { ctime, mtime, size: 0 })
    }

    #[test]
    fn empty_input_sorts_to_empty() {
        assert!(sort_files(Vec::new(), SortConfig::default()).is_empty());
    }

    #[test]
    fn numbers_sort_by_value() {
        let sorted = sort_files(files(&["2.md", "10.md", "1.md"]), SortConfig::default());
        assert_eq!(names(&sorted), vec!["1.md", "2.md", "10.md"]);

        let sorted = sort_files(files(&["file10.md", "file2.md", "File1.md"]), SortConfig::default());
        assert_eq!(names(&sorted), vec!["File1.md", "file2.md", "file10.md"]);
    }

    #[test]
    fn symbols_before_digits_before_letters() {
        let sorted = sort_files(files(&["b.md", "2.md", "!a.md"]), SortConfig::default());
        assert_eq!(names(&sorted), vec!["!a.md", "2.md", "b.md"]);
    }

    #[test]
    fn ties_break_on_extension() {
        let sorted = sort_files(files(&["note.txt", "Note.md", "img_10.md", "img_2.md"]), SortConfig::default());
        assert_eq!(names(&sorted), vec!["img_2.md", "img_10.md", "Note.md", "note.txt"]);
    }

    #[test]
    fn descending_name_order() {
        let config = SortConfig {
            field: SortField::Name,
            order: SortOrder::Descending,
        };
        let sorted = sort_files(files(&["a.md", "c.md", "b.md"]), config);
        assert_eq!(names(&sorted), vec!["c.md", "b.md", "a.md"]);
    }

    #[test]
    fn timestamp_sort_is_stable_on_ties() {
        let input = vec![stamped("x.md", 5, 1), stamped("y.md", 3, 1), stamped("z.md", 5, 1)];
        let config = SortConfig {
            field: SortField::Created,
            order: SortOrder::Descending,
        };
        let sorted = sort_files(input.clone(), config);
        assert_eq!(names(&sorted), vec!["x.md", "z.md", "y.md"]);

        let config = SortConfig {
            field: SortField::Modified,
            order: SortOrder::Ascending,
        };
        let sorted = sort_files(input, config);
        assert_eq!(names(&sorted), vec!["x.md", "y.md", "z.md"]);
    }

    #[test]
    fn explorer_orders_map_to_configs() {
        assert_eq!(sort_config_for(Some("alphabetical"), false), SortConfig::default());
        assert_eq!(
            sort_config_for(Some("byCreatedTime"), false),
            SortConfig {
                field: SortField::Created,
                order: SortOrder::Descending
            }
        );
        assert_eq!(
            sort_config_for(Some("byModifiedTimeReverse"), false),
            SortConfig {
                field: SortField::Modified,
                order: SortOrder::Ascending
            }
        );
    }

    #[test]
    fn unknown_or_missing_order_falls_back_to_name_ascending() {
        assert_eq!(sort_config_for(None, true), SortConfig::default());
        assert_eq!(sort_config_for(Some("bySize"), true), SortConfig::default());
    }

    #[test]
    fn folders_sort_case_insensitively() {
        let folders = vec![FolderNode::new("b"), FolderNode::new("A"), FolderNode::new("a")];
        let sorted: Vec<String> = sort_folders(folders).into_iter().map(|f| f.name).collect();
        assert_eq!(sorted, vec!["A", "a", "b"]);
    }

    #[test]
    fn long_digit_runs_do_not_overflow() {
        assert_eq!(
            natural_cmp("v99999999999999999999999", "v100000000000000000000000"),
            Ordering::Less
        );
    }
}
