use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("daybook-{nanos}-{name}"))
}

fn seeded_store(name: &str) -> PathBuf {
    let store_dir = temp_dir(name);
    std::fs::create_dir_all(&store_dir).unwrap();
    let tasks = serde_json::json!([
        { "id": 1, "text": "Buy milk", "completed": true },
        { "id": 2, "text": "Fix <b>bug</b> & ship", "completed": false }
    ]);
    std::fs::write(
        store_dir.join("todos.json"),
        serde_json::to_string(&tasks).unwrap(),
    )
    .unwrap();
    store_dir
}

fn daybook(store_dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_daybook"));
    cmd.env("DAYBOOK_STORE_DIR", store_dir)
        .env("DAYBOOK_CONFIG_PATH", store_dir.join("missing-config.json"))
        .env("DAYBOOK_DISABLE_NOTIFICATIONS", "1");
    cmd
}

#[test]
fn export_prints_numbered_plain_text() {
    let store_dir = seeded_store("export-plain");
    let output = daybook(&store_dir)
        .arg("export")
        .output()
        .expect("failed to run export");

    std::fs::remove_dir_all(&store_dir).ok();
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "1. Buy milk (Completed)\n2. Fix <b>bug</b> & ship\n"
    );
}

#[test]
fn export_html_escapes_task_text() {
    let store_dir = seeded_store("export-html");
    let output = daybook(&store_dir)
        .args(["export", "--html", "--json"])
        .output()
        .expect("failed to run export");

    std::fs::remove_dir_all(&store_dir).ok();
    assert!(output.status.success());
    let printed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(printed["format"], "html");
    assert_eq!(
        printed["content"],
        "<ol>\n  <li>Buy milk (Completed)</li>\n  <li>Fix &lt;b&gt;bug&lt;/b&gt; &amp; ship</li>\n</ol>"
    );
}
