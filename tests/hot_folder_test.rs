//! End-to-end runs of the watch loop with the polling notifier.

#![cfg(unix)]

use std::path::{Path, PathBuf};
use std::time::Duration;

use hotspud::watcher::HotFolder;
use hotspud::{CommandSpec, Dispatcher, MatchRule, NotifierMode, PathRegistry};
use tempfile::TempDir;
use tokio::sync::oneshot;

fn registry(root: &Path) -> PathRegistry {
    PathRegistry::new(
        root.join("in"),
        root.join("proc"),
        root.join("out"),
        root.join("fail"),
    )
    .unwrap()
}

fn hot_folder(root: &Path, command: &str, rule: MatchRule) -> HotFolder {
    HotFolder::builder()
        .dispatcher(Dispatcher::new(
            registry(root),
            CommandSpec::new(command, Some(Duration::from_secs(5))).unwrap(),
        ))
        .rule(rule)
        .mode(NotifierMode::Poll)
        .period(Duration::from_millis(100))
        .settle_ms(0)
        .build()
        .unwrap()
}

async fn wait_for(path: &Path, limit: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + limit;
    while tokio::time::Instant::now() < deadline {
        if path.exists() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    path.exists()
}

/// Run the loop while `scenario` executes, then shut it down.
async fn with_running<F, Fut>(hot_folder: HotFolder, scenario: F)
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = ()>,
{
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let run = hot_folder.run_until(async {
        let _ = stop_rx.await;
    });
    let drive = async move {
        scenario().await;
        let _ = stop_tx.send(());
    };

    let (result, ()) = tokio::join!(run, drive);
    result.unwrap();
}

fn drop_file(root: &Path, name: &str) -> PathBuf {
    let path = root.join("in").join(name);
    std::fs::write(&path, b"payload").unwrap();
    path
}

#[tokio::test]
async fn test_dropped_file_reaches_output() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().to_path_buf();
    let hot_folder = hot_folder(&root, "", MatchRule::default());

    with_running(hot_folder, || async {
        drop_file(&root, "d.bin");
        assert!(wait_for(&root.join("out").join("d.bin"), Duration::from_secs(5)).await);
    })
    .await;

    assert!(!root.join("in").join("d.bin").exists());
}

#[tokio::test]
async fn test_failing_command_quarantines_item() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().to_path_buf();
    let hot_folder = hot_folder(&root, "/bin/false", MatchRule::default());

    with_running(hot_folder, || async {
        drop_file(&root, "b.txt");
        assert!(wait_for(&root.join("fail").join("b.txt"), Duration::from_secs(5)).await);
    })
    .await;

    assert!(!root.join("out").join("b.txt").exists());
    assert!(!root.join("proc").join("b.txt").exists());
}

#[tokio::test]
async fn test_pattern_filters_items() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().to_path_buf();
    let rule = MatchRule {
        patterns: vec![r".*\.csv".to_string()],
        ignore_patterns: vec![r".*skip.*".to_string()],
        ..MatchRule::default()
    };
    let hot_folder = hot_folder(&root, "/bin/true", rule);

    with_running(hot_folder, || async {
        drop_file(&root, "notes.txt");
        drop_file(&root, "skip-me.csv");
        drop_file(&root, "a.csv");
        assert!(wait_for(&root.join("out").join("a.csv"), Duration::from_secs(5)).await);
        // Give the rejected items a few more poll cycles to prove they stay
        tokio::time::sleep(Duration::from_millis(400)).await;
    })
    .await;

    assert!(root.join("in").join("notes.txt").exists());
    assert!(root.join("in").join("skip-me.csv").exists());
}

#[tokio::test]
async fn test_ignored_directories_stay_in_place() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().to_path_buf();
    let rule = MatchRule {
        ignore_directories: true,
        ..MatchRule::default()
    };
    let hot_folder = hot_folder(&root, "", rule);

    with_running(hot_folder, || async {
        std::fs::create_dir(root.join("in").join("batch")).unwrap();
        drop_file(&root, "single");
        assert!(wait_for(&root.join("out").join("single"), Duration::from_secs(5)).await);
        tokio::time::sleep(Duration::from_millis(400)).await;
    })
    .await;

    assert!(root.join("in").join("batch").is_dir());
    assert!(!root.join("out").join("batch").exists());
}

#[tokio::test]
async fn test_stops_on_shutdown_signal() {
    let temp = TempDir::new().unwrap();
    let hot_folder = hot_folder(temp.path(), "", MatchRule::default());

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        hot_folder.run_until(std::future::ready(())),
    )
    .await;

    assert!(matches!(result, Ok(Ok(()))));
}
