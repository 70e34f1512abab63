// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
//! The currently selected organization.
//!
//! The slug survives restarts in a small JSON file, and every view that
//! scopes its queries by organization holds a receiver to hear about
//! switches. Dropping the receiver is all it takes to stop listening.
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info, warn};

pub const DEFAULT_ORGANIZATION_SLUG: &str = "demo-org";
const SELECTION_FILE_NAME: &str = "organization.json";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
struct PersistedSelection {
    organization_slug: String,
}

pub struct OrganizationStore {
    path: PathBuf,
    // Held while writing so the file always ends up with the latest switch.
    persisted: Mutex<PersistedSelection>,
    sender: watch::Sender<String>,
}

impl OrganizationStore {
    /// Reads the saved selection from `data_dir`, falling back to the demo
    /// organization when there is none or it cannot be read.
    pub fn load(data_dir: &Path) -> Self {
        let path = data_dir.join(SELECTION_FILE_NAME);
        let selection = load_selection(&path).unwrap_or_else(|e| {
            warn!(
                "Could not load organization selection from {}, using '{}': {:#}",
                path.display(),
                DEFAULT_ORGANIZATION_SLUG,
                e
            );
            PersistedSelection {
                organization_slug: DEFAULT_ORGANIZATION_SLUG.to_string(),
            }
        });
        info!("Current organization: {}", selection.organization_slug);

        let (sender, _) = watch::channel(selection.organization_slug.clone());
        Self {
            path,
            persisted: Mutex::new(selection),
            sender,
        }
    }

    pub fn current(&self) -> String {
        self.sender.borrow().clone()
    }

    /// Switches organization. Subscribers are only woken when the slug
    /// actually changes. A failed write is logged and otherwise ignored.
    pub fn set(&self, slug: &str) {
        let mut persisted = self.persisted.lock();

        let changed = self.sender.send_if_modified(|current| {
            if current == slug {
                return false;
            }
            *current = slug.to_string();
            true
        });
        if !changed {
            debug!("Organization '{}' already selected.", slug);
            return;
        }

        persisted.organization_slug = slug.to_string();
        if let Err(e) = save_selection(&self.path, &persisted) {
            tracing::error!("Error saving organization selection: {:#}", e);
        }
        info!("Switched to organization '{}'.", slug);
    }

    /// A receiver that observes every switch made after this call.
    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

fn load_selection(path: &Path) -> Result<PersistedSelection> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let selection: PersistedSelection =
        serde_json::from_str(&data).context("Failed to parse organization selection")?;
    if selection.organization_slug.is_empty() {
        anyhow::bail!("Saved organization slug is empty");
    }
    Ok(selection)
}

fn save_selection(path: &Path, selection: &PersistedSelection) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let data = serde_json::to_string_pretty(selection)?;
    fs::write(path, data).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_to_demo_org_without_saved_file() {
        let dir = tempdir().unwrap();
        let store = OrganizationStore::load(dir.path());
        assert_eq!(store.current(), DEFAULT_ORGANIZATION_SLUG);
    }

    #[test]
    fn test_selection_survives_reload() {
        let dir = tempdir().unwrap();
        let store = OrganizationStore::load(dir.path());
        store.set("acme");

        let reloaded = OrganizationStore::load(dir.path());
        assert_eq!(reloaded.current(), "acme");
    }

    #[test]
    fn test_corrupt_file_falls_back_to_default() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(SELECTION_FILE_NAME), "not json").unwrap();

        let store = OrganizationStore::load(dir.path());
        assert_eq!(store.current(), DEFAULT_ORGANIZATION_SLUG);
    }

    #[test]
    fn test_subscribers_see_changes_only() {
        let dir = tempdir().unwrap();
        let store = OrganizationStore::load(dir.path());
        let mut receiver = store.subscribe();

        store.set(DEFAULT_ORGANIZATION_SLUG);
        assert!(!receiver.has_changed().unwrap());

        store.set("acme");
        assert!(receiver.has_changed().unwrap());
        assert_eq!(*receiver.borrow_and_update(), "acme");
    }

    #[test]
    fn test_dropping_receiver_unsubscribes() {
        let dir = tempdir().unwrap();
        let store = OrganizationStore::load(dir.path());
        let receiver = store.subscribe();
        assert_eq!(store.subscriber_count(), 1);

        drop(receiver);
        assert_eq!(store.subscriber_count(), 0);
        // Switching with nobody listening still works and persists.
        store.set("acme");
        assert_eq!(store.current(), "acme");
    }
}
