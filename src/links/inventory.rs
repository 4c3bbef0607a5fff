//! Web-root inventory: which entries are links, and what every folder is

use log::warn;
use serde::Serialize;
use std::io;
use std::path::Path;

use crate::links::LinkManager;
use crate::probe::LinkState;

const TARGET_NOT_AVAILABLE: &str = "N/A";

/// One link in the web root
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LinkEntry {
    pub name: String,
    pub target: String,
    pub url: String,
}

/// One folder (plain or linked) in the web root
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct WebRootFolder {
    pub name: String,
    pub path: String,
    pub url: String,
    pub is_symlink: bool,
    pub target: String,
    pub has_index: bool,
    #[serde(rename = "type")]
    pub kind: String,
    pub size: String,
}

impl LinkManager {
    /// Every symlink/junction directly inside the web root, sorted by name
    pub async fn list_links(&self) -> io::Result<Vec<LinkEntry>> {
        let mut links = Vec::new();
        for name in self.web_root_names().await? {
            let path = self.web_root().join(&name);
            if let LinkState::Symlink { target } = self.prober().probe(&path).await {
                links.push(LinkEntry {
                    url: self.url_for(&name),
                    target: target
                        .map(|t| t.to_string_lossy().to_string())
                        .unwrap_or_else(|| TARGET_NOT_AVAILABLE.to_string()),
                    name,
                });
            }
        }
        Ok(links)
    }

    /// Every entry of the web root that resolves to a directory, links first
    pub async fn web_root_folders(&self) -> io::Result<Vec<WebRootFolder>> {
        let mut folders = Vec::new();
        for name in self.web_root_names().await? {
            let path = self.web_root().join(&name);
            // Dangling links and plain files are skipped
            let is_dir = tokio::fs::metadata(&path)
                .await
                .map(|meta| meta.is_dir())
                .unwrap_or(false);
            if !is_dir {
                continue;
            }

            let state = self.prober().probe(&path).await;
            let is_symlink = state.is_link();
            let target = state
                .target()
                .map(|t| t.to_string_lossy().to_string())
                .unwrap_or_default();
            let size = if is_symlink {
                "Symlink".to_string()
            } else {
                format!("{} items", count_entries(&path).await)
            };

            folders.push(WebRootFolder {
                url: self.url_for(&name),
                path: path.to_string_lossy().to_string(),
                is_symlink,
                target,
                has_index: has_index(&path).await,
                kind: if is_symlink { "symlink" } else { "folder" }.to_string(),
                size,
                name,
            });
        }

        folders.sort_by(|a, b| {
            b.is_symlink
                .cmp(&a.is_symlink)
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        });
        Ok(folders)
    }

    async fn web_root_names(&self) -> io::Result<Vec<String>> {
        let mut entries = tokio::fs::read_dir(self.web_root()).await.map_err(|e| {
            warn!("Could not read web root {}: {}", self.web_root().display(), e);
            e
        })?;

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            names.push(entry.file_name().to_string_lossy().to_string());
        }
        names.sort();
        Ok(names)
    }
}

async fn has_index(dir: &Path) -> bool {
    for index in ["index.php", "index.html"] {
        if tokio::fs::try_exists(dir.join(index)).await.unwrap_or(false) {
            return true;
        }
    }
    false
}

async fn count_entries(dir: &Path) -> usize {
    let Ok(mut entries) = tokio::fs::read_dir(dir).await else {
        return 0;
    };
    let mut count = 0;
    while let Ok(Some(_)) = entries.next_entry().await {
        count += 1;
    }
    count
}
