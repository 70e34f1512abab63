// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use std::env;
use std::path::PathBuf;

const DEFAULT_API_URL: &str = "http://localhost:8000";
const DEFAULT_WS_URL: &str = "ws://localhost:8000";
// Same place the persisted selection has always lived.
const DEFAULT_DATA_DIR: &str = "database";

/// Where the remote API lives and where client-local state is kept.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub api_url: String,
    pub ws_url: String,
    pub data_dir: PathBuf,
    /// Organization to switch to at start-up, replacing the saved one.
    pub organization_slug: Option<String>,
    /// Project whose board is printed and then followed live.
    pub watch_project: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            ws_url: DEFAULT_WS_URL.to_string(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            organization_slug: None,
            watch_project: None,
        }
    }
}

impl ClientConfig {
    /// Reads `API_URL`, `WS_URL`, `DATA_DIR`, `ORGANIZATION_SLUG` and
    /// `WATCH_PROJECT`, after loading a `.env` file if there is one. Unset
    /// or empty variables keep their defaults.
    pub fn from_env() -> Self {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!("Loaded environment from {}", path.display());
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();
        Self {
            api_url: lookup("API_URL").unwrap_or(defaults.api_url),
            ws_url: lookup("WS_URL").unwrap_or(defaults.ws_url),
            data_dir: lookup("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            organization_slug: lookup("ORGANIZATION_SLUG"),
            watch_project: lookup("WATCH_PROJECT"),
        }
    }

    pub fn graphql_url(&self) -> String {
        format!("{}/graphql/", self.api_url.trim_end_matches('/'))
    }

    pub fn subscriptions_url(&self) -> String {
        format!("{}/graphql/", self.ws_url.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_point_at_local_api() {
        let config = ClientConfig::from_lookup(|_| None);
        assert_eq!(config.graphql_url(), "http://localhost:8000/graphql/");
        assert_eq!(config.subscriptions_url(), "ws://localhost:8000/graphql/");
        assert_eq!(config.data_dir, PathBuf::from("database"));
        assert_eq!(config.organization_slug, None);
        assert_eq!(config.watch_project, None);
    }

    #[test]
    fn test_environment_overrides() {
        let config = ClientConfig::from_lookup(|key| match key {
            "API_URL" => Some("https://api.example.com/".to_string()),
            "DATA_DIR" => Some("/tmp/board".to_string()),
            _ => None,
        });
        assert_eq!(config.graphql_url(), "https://api.example.com/graphql/");
        assert_eq!(config.ws_url, "ws://localhost:8000");
        assert_eq!(config.data_dir, PathBuf::from("/tmp/board"));
    }

    #[test]
    fn test_start_up_selection_comes_from_environment() {
        let config = ClientConfig::from_lookup(|key| match key {
            "ORGANIZATION_SLUG" => Some("acme".to_string()),
            "WATCH_PROJECT" => Some("p1".to_string()),
            "DATA_DIR" => Some("  ".to_string()),
            _ => None,
        });
        assert_eq!(config.organization_slug.as_deref(), Some("acme"));
        assert_eq!(config.watch_project.as_deref(), Some("p1"));
        // Blank values count as unset.
        assert_eq!(config.data_dir, PathBuf::from("database"));
    }
}
