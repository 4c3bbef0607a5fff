#![cfg(unix)]

use async_trait::async_trait;
use axum::body::{Body, to_bytes};
use axum::http::{Request as HttpRequest, StatusCode};
use serde_json::{Value, json};
use std::fs;
use std::io;
use std::os::unix::fs::symlink;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tower::ServiceExt;

use webroot_linker::AppConfig;
use webroot_linker::config::LinkSettings;
use webroot_linker::probe::NativeProber;
use webroot_linker::process::{CommandOutput, ProcessRunner, SystemRunner};
use webroot_linker::protocol::{handle_request, parse_request};
use webroot_linker::script::{ElevationScript, ScriptFlavor};
use webroot_linker::server::{AppState, router};

/// Runs elevated scripts in-process, as if the operator accepted every prompt
#[derive(Default)]
struct AcceptingRunner {
    opened: Mutex<Vec<String>>,
}

#[async_trait]
impl ProcessRunner for AcceptingRunner {
    async fn launch_elevated(&self, script: ElevationScript) -> io::Result<()> {
        tokio::process::Command::new("/bin/sh")
            .arg(script.path())
            .output()
            .await?;
        Ok(())
    }

    async fn run(&self, program: &str, args: &[String]) -> io::Result<CommandOutput> {
        SystemRunner::new("true").run(program, args).await
    }

    async fn spawn_detached(&self, program: &str, args: &[String]) -> io::Result<()> {
        self.opened
            .lock()
            .unwrap()
            .push(format!("{} {}", program, args.join(" ")));
        Ok(())
    }
}

struct Harness {
    dir: TempDir,
    web_root: PathBuf,
    repos: PathBuf,
    scripts: PathBuf,
    runner: Arc<AcceptingRunner>,
    state: AppState,
}

impl Harness {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let web_root = dir.path().join("htdocs");
        let repos = dir.path().join("repos");
        let scripts = dir.path().join("scripts");
        for path in [&web_root, &repos, &scripts] {
            fs::create_dir(path).unwrap();
        }

        let mut config = AppConfig::default();
        config.paths.web_root = web_root.to_string_lossy().to_string();
        config.paths.repos_root = repos.to_string_lossy().to_string();
        config.paths.script_dir = scripts.to_string_lossy().to_string();
        config.server.public_base_url = "http://localhost".to_string();
        config.links = LinkSettings::immediate();

        let runner = Arc::new(AcceptingRunner::default());
        let state = AppState::with_collaborators(
            config,
            Arc::new(NativeProber),
            runner.clone(),
            ScriptFlavor::Shell,
        );

        Self {
            dir,
            web_root,
            repos,
            scripts,
            runner,
            state,
        }
    }

    async fn call(&self, body: Value) -> Value {
        let request = parse_request(&body.to_string()).unwrap();
        handle_request(&self.state, request).await
    }

    fn project(&self, name: &str) -> PathBuf {
        let path = self.repos.join(name);
        fs::create_dir_all(&path).unwrap();
        path
    }
}

fn path_str(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

#[tokio::test]
async fn create_check_list_and_remove_a_link() {
    let h = Harness::new();
    let project = h.project("projectA");

    let created = h
        .call(json!({"action": "create_symlink", "source": path_str(&project), "name": "projectA"}))
        .await;
    assert_eq!(created["success"], true, "{}", created);
    assert_eq!(created["auto_executed"], true);
    assert_eq!(
        fs::read_link(h.web_root.join("projectA")).unwrap(),
        project
    );

    let checked = h.call(json!({"action": "check_symlink", "name": "projectA"})).await;
    assert_eq!(checked["exists"], true);
    assert_eq!(checked["is_symlink"], true);
    assert_eq!(checked["message"], "Symlink found and ready to use");

    let links = h.call(json!({"action": "get_symlinks"})).await;
    assert_eq!(
        links,
        json!([{
            "name": "projectA",
            "target": path_str(&project),
            "url": "http://localhost/projectA"
        }])
    );

    let removed = h.call(json!({"action": "remove_symlink", "name": "projectA"})).await;
    assert_eq!(removed, json!({"success": true, "message": "Symlink removed"}));
    assert!(fs::symlink_metadata(h.web_root.join("projectA")).is_err());
    assert!(project.is_dir());

    let checked = h.call(json!({"action": "check_symlink", "name": "projectA"})).await;
    assert_eq!(checked["exists"], false);
    assert_eq!(checked["message"], "Symlink/directory not found");
}

#[tokio::test]
async fn create_over_a_plain_folder_is_rejected_without_a_script() {
    let h = Harness::new();
    let project = h.project("projectA");
    fs::create_dir(h.web_root.join("projectA")).unwrap();

    let created = h
        .call(json!({"action": "create_symlink", "source": path_str(&project), "name": "projectA"}))
        .await;

    assert_eq!(
        created,
        json!({"success": false, "message": "A link with this name already exists"})
    );
    assert_eq!(fs::read_dir(&h.scripts).unwrap().count(), 0);

    let checked = h.call(json!({"action": "check_symlink", "name": "projectA"})).await;
    assert_eq!(checked["exists"], false);
    assert_eq!(checked["is_normal_dir"], true);
}

#[tokio::test]
async fn removing_an_absent_name_fails_without_a_script() {
    let h = Harness::new();

    let removed = h.call(json!({"action": "remove_symlink", "name": "ghost"})).await;

    assert_eq!(removed["success"], false);
    assert!(removed["message"].as_str().unwrap().starts_with("Symlink not found"));
    assert!(removed.get("batch_path").is_none());
    assert_eq!(fs::read_dir(&h.scripts).unwrap().count(), 0);
}

#[tokio::test]
async fn create_with_missing_source_is_rejected() {
    let h = Harness::new();

    let created = h
        .call(json!({"action": "create_symlink", "source": path_str(&h.repos.join("nope")), "name": "nope"}))
        .await;

    assert_eq!(created["success"], false);
    assert!(created["message"].as_str().unwrap().starts_with("Source folder not found"));
}

#[tokio::test]
async fn manual_scripts_are_written_for_the_operator() {
    let h = Harness::new();
    let project = h.project("projectB");

    let create = h
        .call(json!({"action": "create_symlink_batch", "source": path_str(&project), "name": "projectB"}))
        .await;
    assert_eq!(create["success"], true);
    let create_path = PathBuf::from(create["batch_path"].as_str().unwrap());
    assert!(create_path.starts_with(&h.scripts));
    assert!(create_path.exists());
    assert!(create["command"].as_str().unwrap().starts_with("/bin/sh '"));

    let remove = h.call(json!({"action": "create_remove_batch", "name": "projectB"})).await;
    assert_eq!(remove["success"], true);
    assert_ne!(remove["batch_path"], create["batch_path"]);

    let invalid = h.call(json!({"action": "create_remove_batch", "name": "../etc"})).await;
    assert_eq!(invalid["success"], false);
}

#[tokio::test]
async fn htdocs_folders_list_links_before_folders() {
    let h = Harness::new();
    let project = h.project("shop");
    fs::create_dir(h.web_root.join("Blog")).unwrap();
    symlink(&project, h.web_root.join("shop")).unwrap();

    let folders = h.call(json!({"action": "get_htdocs_folders"})).await;
    let names: Vec<_> = folders
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["name"].as_str().unwrap().to_string())
        .collect();

    assert_eq!(names, vec!["shop", "Blog"]);
    assert_eq!(folders[0]["type"], "symlink");
    assert_eq!(folders[1]["type"], "folder");
    assert_eq!(folders[1]["size"], "0 items");
}

#[tokio::test]
async fn file_service_round_trip() {
    let h = Harness::new();
    let base = path_str(&h.repos);

    let made = h
        .call(json!({"action": "create_directory", "path": base, "name": "site"}))
        .await;
    assert_eq!(made, json!({"success": true, "message": "Directory created successfully"}));

    let site = h.repos.join("site");
    let created = h
        .call(json!({"action": "create_file", "path": path_str(&site), "name": "notes", "content": "hi"}))
        .await;
    assert_eq!(created["message"], "File created successfully: notes.txt");

    let notes = site.join("notes.txt");
    let read = h.call(json!({"action": "read_file", "path": path_str(&notes)})).await;
    assert_eq!(read["success"], true);
    assert_eq!(read["content"], "hi");
    assert_eq!(read["extension"], "txt");

    let saved = h
        .call(json!({"action": "save_file", "path": path_str(&notes), "content": "bye"}))
        .await;
    assert_eq!(saved["success"], true);
    assert_eq!(fs::read_to_string(&notes).unwrap(), "bye");
    assert_eq!(fs::read_to_string(site.join("notes.txt.bak")).unwrap(), "hi");

    let renamed_path = site.join("readme.md");
    let renamed = h
        .call(json!({"action": "rename_file", "old_path": path_str(&notes), "new_path": path_str(&renamed_path)}))
        .await;
    assert_eq!(renamed["new_name"], "readme.md");
    assert!(renamed_path.exists());

    let listing = h.call(json!({"action": "list_directory"})).await;
    assert_eq!(listing["current_path"], base);
    assert_eq!(listing["item_count"], 1);
    assert_eq!(listing["items"][0]["is_dir"], true);

    let deleted = h.call(json!({"action": "delete_item", "path": path_str(&site)})).await;
    assert_eq!(deleted, json!({"success": true, "message": "Directory deleted"}));
    assert!(!site.exists());
}

#[tokio::test]
async fn listing_a_missing_directory_uses_the_error_shape() {
    let h = Harness::new();
    let missing = h.dir.path().join("missing");

    let listing = h
        .call(json!({"action": "list_directory", "path": path_str(&missing)}))
        .await;

    assert!(listing["error"].as_str().unwrap().starts_with("Directory not found"));
}

#[tokio::test]
async fn repos_folder_actions() {
    let h = Harness::new();
    fs::remove_dir(&h.repos).unwrap();

    let before = h.call(json!({"action": "check_repos_exists"})).await;
    assert_eq!(before, json!({"exists": false, "path": path_str(&h.repos)}));

    let created = h.call(json!({"action": "create_repos_folder"})).await;
    assert_eq!(created["success"], true);
    assert!(h.repos.is_dir());

    let again = h.call(json!({"action": "create_repos_folder"})).await;
    assert_eq!(again["message"], "Repos folder already exists");
}

#[tokio::test]
async fn open_explorer_launches_the_file_browser_detached() {
    let h = Harness::new();

    let opened = h
        .call(json!({"action": "open_explorer", "path": path_str(&h.repos)}))
        .await;

    assert_eq!(opened, json!({"success": true, "message": "Folder opened"}));
    let launched = h.runner.opened.lock().unwrap();
    assert_eq!(launched.len(), 1);
    assert!(launched[0].ends_with(&path_str(&h.repos)));
}

#[tokio::test]
async fn http_api_dispatches_actions_and_rejects_bad_bodies() {
    let h = Harness::new();
    let app = router(h.state.clone());

    let response = app
        .clone()
        .oneshot(
            HttpRequest::post("/api")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"action":"check_repos_exists"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value =
        serde_json::from_slice(&to_bytes(response.into_body(), usize::MAX).await.unwrap()).unwrap();
    assert_eq!(body["exists"], true);

    let response = app
        .clone()
        .oneshot(
            HttpRequest::post("/api")
                .body(Body::from(r#"{"action":"reboot"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value =
        serde_json::from_slice(&to_bytes(response.into_body(), usize::MAX).await.unwrap()).unwrap();
    assert_eq!(body["success"], false);

    let response = app
        .oneshot(HttpRequest::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
