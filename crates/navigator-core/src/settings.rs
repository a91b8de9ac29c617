//! Plugin settings and usage statistics.
//!
//! Stored by the host as a flat JSON record with camelCase keys. Every field
//! has a default so older or partial records still load.

use serde::{Deserialize, Serialize};

use crate::error::NavigatorError;

/// Where navigation may go once the current folder is exhausted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NavigationScope {
    #[default]
    EntireVault,
    ActiveFolder,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NavigatorSettings {
    pub navigate_on_delete: bool,
    pub navigation_scope: NavigationScope,
    pub remove_empty_folders: bool,
    pub remove_orphan_attachments: bool,
    pub show_confirmation_prompt: bool,
    pub show_delete_notice: bool,
    /// How many ancestor levels an emptied folder may cascade through
    pub max_directory_delete_traversal: u32,
    pub enable_debug_logging: bool,

    pub number_of_deleted_attachments: u64,
    pub number_of_deleted_files: u64,
    pub number_of_deleted_folders: u64,
    pub number_of_files_navigated: u64,
    pub number_of_setting_views: u64,
}

impl Default for NavigatorSettings {
    fn default() -> Self {
        Self {
            navigate_on_delete: true,
            navigation_scope: NavigationScope::EntireVault,
            remove_empty_folders: true,
            remove_orphan_attachments: true,
            show_confirmation_prompt: true,
            show_delete_notice: true,
            max_directory_delete_traversal: 5,
            enable_debug_logging: false,
            number_of_deleted_attachments: 0,
            number_of_deleted_files: 0,
            number_of_deleted_folders: 0,
            number_of_files_navigated: 0,
            number_of_setting_views: 0,
        }
    }
}

/// Usage counters shown on the settings page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Statistic {
    DeletedAttachments,
    DeletedFiles,
    DeletedFolders,
    FilesNavigated,
    SettingViews,
}

impl Statistic {
    pub const ALL: [Statistic; 5] = [
        Statistic::DeletedAttachments,
        Statistic::DeletedFiles,
        Statistic::DeletedFolders,
        Statistic::FilesNavigated,
        Statistic::SettingViews,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Statistic::DeletedAttachments => "Deleted attachments",
            Statistic::DeletedFiles => "Deleted files",
            Statistic::DeletedFolders => "Deleted folders",
            Statistic::FilesNavigated => "Files navigated",
            Statistic::SettingViews => "Setting views",
        }
    }
}

/// Counters become visible once any reaches this value.
const STATISTICS_VISIBLE_AT: u64 = 10;
/// Past this, the settings page shows the feedback links.
const EXPERIENCED_USER_ABOVE: u64 = 100;

impl NavigatorSettings {
    pub fn from_json(json: &str) -> Result<Self, NavigatorError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, NavigatorError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn statistic(&self, statistic: Statistic) -> u64 {
        match statistic {
            Statistic::DeletedAttachments => self.number_of_deleted_attachments,
            Statistic::DeletedFiles => self.number_of_deleted_files,
            Statistic::DeletedFolders => self.number_of_deleted_folders,
            Statistic::FilesNavigated => self.number_of_files_navigated,
            Statistic::SettingViews => self.number_of_setting_views,
        }
    }

    pub fn statistics(&self) -> Vec<(Statistic, u64)> {
        Statistic::ALL
            .iter()
            .map(|stat| (*stat, self.statistic(*stat)))
            .collect()
    }

    /// "Deleted files: 12" style lines.
    pub fn statistics_lines(&self) -> Vec<String> {
        self.statistics()
            .into_iter()
            .map(|(stat, value)| format!("{}: {}", stat.label(), value))
            .collect()
    }

    pub fn statistics_visible(&self) -> bool {
        self.statistics()
            .iter()
            .any(|(_, value)| *value >= STATISTICS_VISIBLE_AT)
    }

    pub fn experienced_user(&self) -> bool {
        self.statistics()
            .iter()
            .any(|(_, value)| *value > EXPERIENCED_USER_ABOVE)
    }

    pub fn reset_statistics(&mut self) {
        self.number_of_deleted_attachments = 0;
        self.number_of_deleted_files = 0;
        self.number_of_deleted_folders = 0;
        self.number_of_files_navigated = 0;
        self.number_of_setting_views = 0;
    }

    pub fn record_deletion(&mut self, files: u64, attachments: u64, folders: u64) {
        self.number_of_deleted_files += files;
        self.number_of_deleted_attachments += attachments;
        self.number_of_deleted_folders += folders;
    }

    pub fn record_navigation(&mut self) {
        self.number_of_files_navigated += 1;
    }

    pub fn record_settings_view(&mut self) {
        self.number_of_setting_views += 1;
    }
}
