//! Best-effort removal of a prepared deletion closure.
//!
//! Items are trashed one at a time through the host. A failure is logged and
//! reported for that item only; the rest of the batch still runs.

use std::time::Duration;

use crate::error::{HostError, Result};
use crate::host::{TreeEntry, Vault, Workspace};
use crate::orphans::DeletionClosure;
use crate::settings::NavigatorSettings;

const NOTICE_BASE_MS: u64 = 3000;
const NOTICE_PER_ITEM_MS: u64 = 200;
const NOTICE_MAX_MS: u64 = 10_000;

/// How long the deletion summary stays on screen for `items` entries.
pub fn notice_duration(items: usize) -> Duration {
    let ms = NOTICE_BASE_MS.saturating_add(NOTICE_PER_ITEM_MS.saturating_mul(items as u64));
    Duration::from_millis(ms.min(NOTICE_MAX_MS))
}

/// Paths actually removed by one `execute` call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletionReport {
    pub attachments: Vec<String>,
    pub folders: Vec<String>,
    /// Items the host refused to remove. Not part of `len`.
    pub failed: Vec<String>,
}

impl DeletionReport {
    pub fn len(&self) -> usize {
        self.attachments.len() + self.folders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Notice text: a count line followed by one bullet per removed path.
    pub fn summary(&self) -> String {
        let mut text = format!(
            "Deleted {} (attachments: {}, folders: {}):",
            plural(self.len(), "item"),
            self.attachments.len(),
            self.folders.len()
        );
        for path in self.attachments.iter().chain(self.folders.iter()) {
            text.push_str("\n• ");
            text.push_str(path);
        }
        text
    }
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("1 {}", noun)
    } else {
        format!("{} {}s", count, noun)
    }
}

pub struct DeletionExecutor<'a, V: Vault + ?Sized, W: Workspace + ?Sized> {
    vault: &'a V,
    workspace: &'a W,
    settings: &'a NavigatorSettings,
}

impl<'a, V: Vault + ?Sized, W: Workspace + ?Sized> DeletionExecutor<'a, V, W> {
    pub fn new(vault: &'a V, workspace: &'a W, settings: &'a NavigatorSettings) -> Self {
        Self {
            vault,
            workspace,
            settings,
        }
    }

    /// Remove the closure's attachments and folders as the toggles allow,
    /// then show one summary notice.
    pub async fn execute(&self, closure: &DeletionClosure) -> DeletionReport {
        let mut report = DeletionReport::default();

        if self.settings.remove_orphan_attachments {
            for attachment in &closure.attachments {
                if self.delete_isolated(TreeEntry::File(attachment.clone())).await {
                    report.attachments.push(attachment.path.clone());
                } else {
                    report.failed.push(attachment.path.clone());
                }
            }
        }

        if self.settings.remove_empty_folders {
            for folder in closure.orphaned_folders.iter() {
                let prefix = format!("{}/", folder.path);
                if let Some(kept) = report.failed.iter().find(|path| path.starts_with(&prefix)) {
                    tracing::warn!("Deleting folder {} although {} could not be deleted", folder.path, kept);
                }
                if self.delete_isolated(TreeEntry::Folder(folder.clone())).await {
                    report.folders.push(folder.path.clone());
                } else {
                    report.failed.push(folder.path.clone());
                }
            }
        }

        if !report.is_empty() {
            tracing::info!(
                "Removed {} attachments and {} folders",
                report.attachments.len(),
                report.folders.len()
            );
            if self.settings.show_delete_notice {
                self.workspace
                    .notice(&report.summary(), Some(notice_duration(report.len())));
            }
        }
        report
    }

    /// Wait `delay` (if non-zero), then delete `entry` with a notice.
    ///
    /// Returns whether the entry was deleted. Failures are logged and shown.
    pub async fn safe_delete(&self, entry: &TreeEntry, message: &str, delay: Duration) -> bool {
        if !delay.is_zero() {
            self.workspace.sleep(delay).await;
        }
        match self.delete_with_notice(entry, message).await {
            Ok(()) => true,
            Err(e) => {
                self.report_failure(entry, &e);
                false
            }
        }
    }

    /// Delete and, if notices are enabled, show "`message`: `name`".
    pub async fn delete_with_notice(&self, entry: &TreeEntry, message: &str) -> Result<()> {
        self.delete_without_notice(entry).await?;
        if self.settings.show_delete_notice {
            self.workspace
                .notice(&format!("{}: {}", message, entry.name()), None);
        }
        Ok(())
    }

    pub async fn delete_without_notice(&self, entry: &TreeEntry) -> Result<()> {
        self.vault.trash(entry).await?;
        tracing::debug!("Deleted {} {} ({})", entry.kind(), entry.path(), self.vault.trash_option().as_str());
        Ok(())
    }

    async fn delete_isolated(&self, entry: TreeEntry) -> bool {
        match self.delete_without_notice(&entry).await {
            Ok(()) => true,
            Err(e) => {
                self.report_failure(&entry, &e);
                false
            }
        }
    }

    fn report_failure(&self, entry: &TreeEntry, error: &HostError) {
        let kind = entry.kind();
        tracing::error!("Error deleting {} {}: {}", kind, entry.path(), error);
        self.workspace.notice(
            &format!("An error occurred while deleting {}. Check the console for details.", kind),
            None,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::FolderNode;
    use crate::memory::{InMemoryVault, ScriptedWorkspace};

    fn setup() -> (InMemoryVault, ScriptedWorkspace) {
        let vault = InMemoryVault::new();
        vault.add_file("assets/a.png");
        vault.add_file("assets/b.png");
        vault.add_folder("empty/inner");
        (vault, ScriptedWorkspace::new())
    }

    fn closure(vault: &InMemoryVault) -> DeletionClosure {
        DeletionClosure::new(
            vec![vault.file("assets/a.png").unwrap(), vault.file("assets/b.png").unwrap()],
            vec![FolderNode::new("empty/inner"), FolderNode::new("empty")],
        )
    }

    #[test]
    fn notice_duration_scales_and_caps() {
        assert_eq!(notice_duration(0), Duration::from_millis(3000));
        assert_eq!(notice_duration(1), Duration::from_millis(3200));
        assert_eq!(notice_duration(10), Duration::from_millis(5000));
        assert_eq!(notice_duration(35), Duration::from_millis(10_000));
        assert_eq!(notice_duration(500), Duration::from_millis(10_000));
    }

    #[test]
    fn summary_lists_every_path() {
        let report = DeletionReport {
            attachments: vec!["a.png".to_string()],
            folders: vec!["old".to_string()],
            failed: vec!["stuck.png".to_string()],
        };
        assert_eq!(
            report.summary(),
            "Deleted 2 items (attachments: 1, folders: 1):\n• a.png\n• old"
        );
    }

    #[tokio::test]
    async fn execute_deletes_everything_and_shows_one_summary() {
        let (vault, workspace) = setup();
        let settings = NavigatorSettings::default();
        let executor = DeletionExecutor::new(&vault, &workspace, &settings);

        let report = executor.execute(&closure(&vault)).await;

        assert_eq!(report.attachments, vec!["assets/a.png", "assets/b.png"]);
        assert_eq!(report.folders, vec!["empty/inner", "empty"]);
        assert_eq!(
            vault.trashed(),
            vec!["assets/a.png", "assets/b.png", "empty/inner", "empty"]
        );

        let notices = workspace.notices();
        assert_eq!(notices.len(), 1);
        assert!(notices[0].message.starts_with("Deleted 4 items"));
        assert_eq!(notices[0].duration, Some(Duration::from_millis(3800)));
    }

    #[tokio::test]
    async fn one_failure_does_not_stop_the_batch() {
        let (vault, workspace) = setup();
        vault.fail_on("assets/a.png");
        let settings = NavigatorSettings::default();
        let executor = DeletionExecutor::new(&vault, &workspace, &settings);

        let report = executor.execute(&closure(&vault)).await;

        assert_eq!(report.attachments, vec!["assets/b.png"]);
        assert_eq!(report.folders.len(), 2);
        assert_eq!(report.failed, vec!["assets/a.png"]);
        assert!(vault.exists("assets/a.png"));
        assert_eq!(
            workspace.notice_messages()[0],
            "An error occurred while deleting file. Check the console for details."
        );
    }

    #[tokio::test]
    async fn folder_holding_a_failed_attachment_is_still_trashed() {
        let vault = InMemoryVault::new();
        vault.add_file("assets/a.png");
        vault.fail_on("assets/a.png");
        let workspace = ScriptedWorkspace::new();
        let settings = NavigatorSettings::default();
        let closure = DeletionClosure::new(
            vec![vault.file("assets/a.png").unwrap()],
            vec![FolderNode::new("assets")],
        );

        let report = DeletionExecutor::new(&vault, &workspace, &settings)
            .execute(&closure)
            .await;

        assert!(report.attachments.is_empty());
        assert_eq!(report.folders, vec!["assets"]);
        assert_eq!(report.failed, vec!["assets/a.png"]);
        assert_eq!(vault.trashed(), vec!["assets"]);
    }

    #[tokio::test]
    async fn toggles_limit_what_is_deleted() {
        let (vault, workspace) = setup();
        let settings = NavigatorSettings {
            remove_orphan_attachments: false,
            ..NavigatorSettings::default()
        };
        let report = DeletionExecutor::new(&vault, &workspace, &settings)
            .execute(&closure(&vault))
            .await;
        assert!(report.attachments.is_empty());
        assert_eq!(report.folders.len(), 2);

        let (vault, workspace) = setup();
        let settings = NavigatorSettings {
            remove_empty_folders: false,
            ..NavigatorSettings::default()
        };
        let report = DeletionExecutor::new(&vault, &workspace, &settings)
            .execute(&closure(&vault))
            .await;
        assert_eq!(report.attachments.len(), 2);
        assert!(report.folders.is_empty());
        assert!(vault.exists("empty/inner"));
    }

    #[tokio::test]
    async fn disabled_notices_suppress_success_messages_only() {
        let (vault, workspace) = setup();
        vault.fail_on("empty");
        let settings = NavigatorSettings {
            show_delete_notice: false,
            ..NavigatorSettings::default()
        };
        let executor = DeletionExecutor::new(&vault, &workspace, &settings);

        executor.execute(&closure(&vault)).await;
        let entry = vault.entry("assets").unwrap();
        assert!(executor.safe_delete(&entry, "Folder deleted", Duration::ZERO).await);

        assert_eq!(
            workspace.notice_messages(),
            vec!["An error occurred while deleting folder. Check the console for details."]
        );
    }

    #[tokio::test]
    async fn safe_delete_waits_then_notifies() {
        let vault = InMemoryVault::new();
        vault.add_note("n.md", "");
        let workspace = ScriptedWorkspace::new();
        let settings = NavigatorSettings::default();
        let executor = DeletionExecutor::new(&vault, &workspace, &settings);

        let entry = vault.entry("n.md").unwrap();
        assert!(executor.safe_delete(&entry, "File deleted", Duration::from_millis(200)).await);

        assert_eq!(workspace.sleeps(), vec![Duration::from_millis(200)]);
        assert_eq!(workspace.notice_messages(), vec!["File deleted: n.md"]);
        assert!(!vault.exists("n.md"));
    }

    #[tokio::test]
    async fn safe_delete_reports_failure() {
        let vault = InMemoryVault::new();
        vault.add_note("n.md", "");
        vault.fail_on("n.md");
        let workspace = ScriptedWorkspace::new();
        let settings = NavigatorSettings::default();
        let executor = DeletionExecutor::new(&vault, &workspace, &settings);

        let entry = vault.entry("n.md").unwrap();
        assert!(!executor.safe_delete(&entry, "File deleted", Duration::ZERO).await);
        assert!(workspace.sleeps().is_empty());
        assert_eq!(
            workspace.notice_messages(),
            vec!["An error occurred while deleting file. Check the console for details."]
        );
    }
}
