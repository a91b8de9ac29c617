use navigator_cli::{load_settings, Input, NativeVault, TerminalWorkspace};
use navigator_core::host::{TrashOption, Vault};
use navigator_core::navigation::Direction;
use navigator_core::plugin::{Command, NoteNavigator};
use navigator_core::settings::NavigatorSettings;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

fn write(root: &Path, path: &str, content: &str) {
    let full = root.join(path);
    std::fs::create_dir_all(full.parent().unwrap()).unwrap();
    std::fs::write(full, content).unwrap();
}

async fn navigator(
    dir: &TempDir,
    trash: TrashOption,
    active: &str,
    input: Input,
) -> NoteNavigator<NativeVault, TerminalWorkspace> {
    let vault = NativeVault::open(dir.path().to_path_buf(), trash).await.unwrap();
    let workspace = TerminalWorkspace::new(dir.path().join("settings.json"), None, input);
    workspace.set_active(vault.file(active));
    NoteNavigator::new(Arc::new(vault), Arc::new(workspace), NavigatorSettings::default())
}

#[tokio::test]
async fn delete_moves_note_attachment_and_emptied_folder_to_local_trash() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "project/note.md", "![[project/img/diagram.png]]");
    write(dir.path(), "project/img/diagram.png", "png");
    write(dir.path(), "zeta/z.md", "last");

    let mut nav = navigator(&dir, TrashOption::Local, "project/note.md", Input::lines(["y"])).await;
    nav.run(Command::DeleteAndNavigate).await;

    assert!(!dir.path().join("project").exists());
    assert!(dir.path().join(".trash/note.md").exists());
    assert!(dir.path().join(".trash/diagram.png").exists());
    assert!(dir.path().join("zeta/z.md").exists());
    assert_eq!(nav.workspace().opened(), vec!["zeta/z.md"]);

    let saved = load_settings(&dir.path().join("settings.json")).await.unwrap();
    assert_eq!(saved.number_of_deleted_files, 1);
    assert_eq!(saved.number_of_deleted_attachments, 1);
    assert_eq!(saved.number_of_deleted_folders, 2);
    assert_eq!(saved.number_of_files_navigated, 1);
}

#[tokio::test]
async fn declined_confirmation_keeps_everything() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "notes/n.md", "![[pic.png]]");
    write(dir.path(), "notes/pic.png", "png");

    let mut nav = navigator(&dir, TrashOption::Local, "notes/n.md", Input::lines(["n"])).await;
    nav.run(Command::DeleteAndNavigate).await;

    assert!(dir.path().join("notes/n.md").exists());
    assert!(dir.path().join("notes/pic.png").exists());
    assert!(!dir.path().join(".trash").exists());
}

#[tokio::test]
async fn shared_attachment_survives_permanent_delete() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "one.md", "![[shared.png]]");
    write(dir.path(), "two.md", "![[shared.png]]");
    write(dir.path(), "shared.png", "png");

    let mut nav = navigator(&dir, TrashOption::None, "one.md", Input::lines(["yes"])).await;
    nav.run(Command::DeleteAndNavigate).await;

    assert!(!dir.path().join("one.md").exists());
    assert!(dir.path().join("shared.png").exists());
    assert!(!dir.path().join(".trash").exists());
    assert_eq!(nav.workspace().opened(), vec!["two.md"]);
}

#[tokio::test]
async fn navigates_across_folders_and_skips_hidden_ones() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "A/a1.md", "");
    write(dir.path(), "A/a2.md", "");
    write(dir.path(), "B/b1.md", "");
    write(dir.path(), ".obsidian/workspace.md", "");

    let mut nav = navigator(&dir, TrashOption::Local, "A/a2.md", Input::lines(Vec::<String>::new())).await;

    let next = nav.navigate_file(Direction::Next).await.unwrap();
    assert_eq!(next.path, "B/b1.md");

    let prev = nav.navigate_file(Direction::Prev).await.unwrap();
    assert_eq!(prev.path, "A/a2.md");
    assert_eq!(nav.settings().number_of_files_navigated, 2);
}

#[tokio::test]
async fn move_relocates_note_and_opens_the_following_one() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "inbox/a.md", "");
    write(dir.path(), "inbox/b.md", "");
    write(dir.path(), "archive/old.md", "");

    let mut nav = navigator(&dir, TrashOption::Local, "inbox/a.md", Input::lines(["archive"])).await;
    let opened = nav.move_and_navigate().await.unwrap();

    assert_eq!(opened.path, "inbox/b.md");
    assert!(dir.path().join("archive/a.md").exists());
    assert!(!dir.path().join("inbox/a.md").exists());
    assert!(nav.vault().file("archive/a.md").is_some());
}

#[tokio::test]
async fn renames_parent_folder_on_disk() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "drafts/post.md", "");

    let mut nav = navigator(&dir, TrashOption::Local, "drafts/post.md", Input::lines(["  published "])).await;
    let renamed = nav.rename_parent_folder().await.unwrap();

    assert_eq!(renamed.path, "published");
    assert!(dir.path().join("published/post.md").exists());
    assert!(!dir.path().join("drafts").exists());
}

#[tokio::test]
async fn rename_is_unavailable_for_root_notes() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "top.md", "");

    let nav = navigator(&dir, TrashOption::Local, "top.md", Input::lines(Vec::<String>::new())).await;

    assert!(!nav.can_run(Command::RenameParentFolder));
    assert!(nav.can_run(Command::NavigateNext));
}
