//! Configuration with layered resolution using figment.
//!
//! Resolution order (highest priority last):
//! 1. User config: `~/.config/catalog-guard/config.toml` (XDG) or platform config dir
//! 2. Project config: `.catalog-guard.toml`
//! 3. Environment variables: `CATALOG_GUARD_*` (nested keys split on `__`)
//!
//! # Intended Usage
//!
//! **Global config** (`~/.config/catalog-guard/config.toml`):
//! ```toml
//! [api]
//! base_url = "https://catalog.example.com/api"
//! token = "..."
//! request_timeout_secs = 30
//!
//! [guard]
//! scanner_timeout_ms = 10000
//! conflict_markers = ["constraint", "foreign key", "is referenced by", "still in use"]
//! ```
//!
//! **Project config** (`.catalog-guard.toml`), adding or replacing an entity type:
//! ```toml
//! [entity_types.service-status]
//! noun = "service status"
//! delete_resource = "/catalog/service-status"
//! key_fields = ["status_name"]
//!
//! [[entity_types.service-status.scanners]]
//! resource = "/catalog/services"
//! fields = ["id_service_status"]
//! label = "Service"
//! name = "{service_code} - {service_name}"
//! id_field = "id_service"
//! ```
//!
//! Entity types from config replace built-in entries of the same name.

use std::collections::BTreeMap;
use std::ops::Deref;
use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::scanners::EntityTypeSpec;

/// Project config file name, looked up in the working directory.
pub const PROJECT_CONFIG_FILE: &str = ".catalog-guard.toml";

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "CATALOG_GUARD_";

/// Boxed wrapper for figment::Error to reduce Result size on the stack.
#[derive(Debug)]
pub struct ConfigError(Box<figment::Error>);

impl Deref for ConfigError {
    type Target = figment::Error;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self(Box::new(err))
    }
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub guard: GuardConfig,
    /// Entity types added to or replacing the built-in registry.
    #[serde(default)]
    pub entity_types: BTreeMap<String, EntityTypeSpec>,
}

/// Catalog backend connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL every resource path is appended to.
    /// Example: `https://catalog.example.com/api`
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Optional bearer token sent with every request.
    #[serde(default)]
    pub token: Option<String>,
    /// Per-request timeout for HTTP calls.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Usage guard behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardConfig {
    /// Upper bound for one scanner's fetch. A scanner that exceeds it counts
    /// as failed and contributes no records.
    #[serde(default = "default_scanner_timeout_ms")]
    pub scanner_timeout_ms: u64,
    /// Case-insensitive substrings of a delete error's detail that mark an
    /// integrity violation. HTTP 409 always does.
    #[serde(default = "default_conflict_markers")]
    pub conflict_markers: Vec<String>,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            scanner_timeout_ms: default_scanner_timeout_ms(),
            conflict_markers: default_conflict_markers(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_scanner_timeout_ms() -> u64 {
    10_000
}

/// Markers the catalog backend uses in integrity-violation details.
pub fn default_conflict_markers() -> Vec<String> {
    ["constraint", "foreign key", "is referenced by", "still in use"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Config {
    /// Load config with layered resolution (user → project → env).
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::user_config_path(), Path::new(PROJECT_CONFIG_FILE))
    }

    /// Load config from explicit user and project files, then env.
    ///
    /// Missing files are skipped.
    pub fn load_from(user_config: &Path, project_config: &Path) -> Result<Self, ConfigError> {
        Figment::from(Serialized::defaults(Config::default()))
            // Layer 1: User config (lowest priority)
            .merge(Toml::file(user_config))
            // Layer 2: Project config
            .merge(Toml::file(project_config))
            // Layer 3: Environment variables (highest priority)
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(ConfigError::from)
    }

    /// User config path: ~/.config/catalog-guard/config.toml (XDG) or platform config dir.
    pub fn user_config_path() -> PathBuf {
        // Prefer XDG config location (~/.config) on all platforms
        if let Some(home) = dirs::home_dir() {
            let xdg_path = home
                .join(".config")
                .join("catalog-guard")
                .join("config.toml");
            if xdg_path.exists() {
                return xdg_path;
            }
        }
        // Fall back to platform-specific config dir
        dirs::config_dir()
            .map(|p| p.join("catalog-guard").join("config.toml"))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    #[serial]
    fn test_defaults_when_no_files() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("none.toml"), &dir.path().join("x.toml"))
            .unwrap();

        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert_eq!(config.api.request_timeout_secs, 30);
        assert_eq!(config.guard.scanner_timeout_ms, 10_000);
        assert!(config.guard.conflict_markers.contains(&"constraint".to_string()));
        assert!(config.entity_types.is_empty());
    }

    #[test]
    #[serial]
    fn test_project_overrides_user() {
        let dir = tempfile::tempdir().unwrap();
        let user = write_file(
            dir.path(),
            "user.toml",
            "[api]\nbase_url = \"https://user.example\"\ntoken = \"abc\"\n",
        );
        let project = write_file(
            dir.path(),
            "project.toml",
            "[api]\nbase_url = \"https://project.example\"\n\n[guard]\nscanner_timeout_ms = 250\n",
        );

        let config = Config::load_from(&user, &project).unwrap();
        assert_eq!(config.api.base_url, "https://project.example");
        assert_eq!(config.api.token.as_deref(), Some("abc"));
        assert_eq!(config.guard.scanner_timeout_ms, 250);
    }

    #[test]
    #[serial]
    fn test_env_overrides_files() {
        let dir = tempfile::tempdir().unwrap();
        let project = write_file(
            dir.path(),
            "project.toml",
            "[api]\nbase_url = \"https://project.example\"\n",
        );

        std::env::set_var("CATALOG_GUARD_API__BASE_URL", "https://env.example");
        let config = Config::load_from(&dir.path().join("none.toml"), &project);
        std::env::remove_var("CATALOG_GUARD_API__BASE_URL");

        assert_eq!(config.unwrap().api.base_url, "https://env.example");
    }

    #[test]
    #[serial]
    fn test_entity_type_section() {
        let dir = tempfile::tempdir().unwrap();
        let project = write_file(
            dir.path(),
            "project.toml",
            r#"
[entity_types.service-status]
noun = "service status"
delete_resource = "/catalog/service-status"
key_fields = ["status_name"]

[[entity_types.service-status.scanners]]
resource = "/catalog/services"
fields = ["id_service_status"]
label = "Service"
name = "{service_code} - {service_name}"
id_field = "id_service"
"#,
        );

        let config = Config::load_from(&dir.path().join("none.toml"), &project).unwrap();
        let spec = &config.entity_types["service-status"];
        assert_eq!(spec.noun, "service status");
        assert_eq!(spec.scanners.len(), 1);
        assert_eq!(spec.scanners[0].fields, vec!["id_service_status"]);
    }
}
