//! Directory configuration module.
//!
//! Configuration is layered: stock defaults, then an optional TOML file,
//! then environment variables. The merged result is validated once.
//!
//! ## Configuration Options
//!
//! ```toml
//! photos_bucket = "staff-photos"   # Required (or PHOTOS_BUCKET)
//! data_dir = "data"                # STAFFDIR_DATA_DIR
//!
//! [database]
//! backend = "sql"                  # "sql" or "kv" (DATABASE_BACKEND)
//! db_name = "employees"            # DATABASE_DB_NAME
//!
//! [photos]
//! canvas = [120, 160]              # Output frame, width x height
//! key_bytes = 8                    # Random bytes in a photo key (1-64)
//! key_prefix = "employee_pic/"
//! url_expiry_secs = 3600
//! base_url = "http://localhost:8000/photos"   # PHOTOS_BASE_URL
//! # signing_secret = "..."         # PHOTOS_SIGNING_SECRET
//!
//! [instance]
//! # identity_document = "/run/instance-identity.json"  # INSTANCE_IDENTITY_DOCUMENT
//! stress_cpus = 8
//!
//! [processing]
//! max_threads = 4                  # Omit for auto = CPU cores
//! ```
//!
//! Unknown keys are rejected to catch typos early. Environment lookup is
//! passed in as a closure, so callers decide where variables come from.

use crate::imaging::{CanvasError, CanvasSpec};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Directory configuration.
///
/// Everything except `photos_bucket` has a usable default.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DirectoryConfig {
    /// Object store bucket for employee photos.
    pub photos_bucket: String,
    /// Root for the record store file and the object store buckets.
    pub data_dir: PathBuf,
    pub database: DatabaseConfig,
    pub photos: PhotosConfig,
    pub instance: InstanceConfig,
    pub processing: ProcessingConfig,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            photos_bucket: String::new(),
            data_dir: PathBuf::from("data"),
            database: DatabaseConfig::default(),
            photos: PhotosConfig::default(),
            instance: InstanceConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl DirectoryConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.photos_bucket.trim().is_empty() {
            return Err(ConfigError::Validation(
                "photos_bucket is required (set it in the config file or PHOTOS_BUCKET)".into(),
            ));
        }
        self.photos
            .canvas_spec()
            .map_err(|e| ConfigError::Validation(format!("photos.canvas: {e}")))?;
        if !(1..=64).contains(&self.photos.key_bytes) {
            return Err(ConfigError::Validation(
                "photos.key_bytes must be 1-64".into(),
            ));
        }
        if self.photos.url_expiry_secs == 0 {
            return Err(ConfigError::Validation(
                "photos.url_expiry_secs must be positive".into(),
            ));
        }
        if self.database.db_name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "database.db_name must not be empty".into(),
            ));
        }
        if self.instance.stress_cpus == 0 {
            return Err(ConfigError::Validation(
                "instance.stress_cpus must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

/// Which [`RecordStore`](crate::store::RecordStore) backend to open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    #[default]
    Sql,
    Kv,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    pub backend: DatabaseBackend,
    /// File stem of the record store inside `data_dir`.
    pub db_name: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: DatabaseBackend::Sql,
            db_name: "employees".to_string(),
        }
    }
}

/// Photo normalization and storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PhotosConfig {
    /// Output frame as `[width, height]`.
    pub canvas: [u32; 2],
    /// Number of random bytes hex-encoded into each photo key.
    pub key_bytes: usize,
    pub key_prefix: String,
    pub url_expiry_secs: u64,
    /// Public prefix that signed URLs are built on.
    pub base_url: String,
    /// HMAC key for signed URLs. Without it no URL can be issued.
    pub signing_secret: Option<String>,
}

impl Default for PhotosConfig {
    fn default() -> Self {
        let canvas = CanvasSpec::default();
        Self {
            canvas: [canvas.width(), canvas.height()],
            key_bytes: 8,
            key_prefix: "employee_pic/".to_string(),
            url_expiry_secs: 3600,
            base_url: "http://localhost:8000/photos".to_string(),
            signing_secret: None,
        }
    }
}

impl PhotosConfig {
    pub fn canvas_spec(&self) -> Result<CanvasSpec, CanvasError> {
        CanvasSpec::new(self.canvas[0], self.canvas[1])
    }

    pub fn url_expiry(&self) -> Duration {
        Duration::from_secs(self.url_expiry_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InstanceConfig {
    /// JSON instance identity document. When absent the fallback identity
    /// is used.
    pub identity_document: Option<PathBuf>,
    /// Workers passed to `stress --cpu`.
    pub stress_cpus: u32,
}

impl Default for InstanceConfig {
    fn default() -> Self {
        Self {
            identity_document: None,
            stress_cpus: 8,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel normalization workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_threads: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_threads
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Environment variables and the config key each one overrides.
pub const ENV_OVERRIDES: &[(&str, &[&str])] = &[
    ("PHOTOS_BUCKET", &["photos_bucket"]),
    ("STAFFDIR_DATA_DIR", &["data_dir"]),
    ("DATABASE_BACKEND", &["database", "backend"]),
    ("DATABASE_DB_NAME", &["database", "db_name"]),
    ("PHOTOS_BASE_URL", &["photos", "base_url"]),
    ("PHOTOS_SIGNING_SECRET", &["photos", "signing_secret"]),
    ("INSTANCE_IDENTITY_DOCUMENT", &["instance", "identity_document"]),
];

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(DirectoryConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Build a TOML overlay from environment variables.
///
/// Unset and empty variables contribute nothing.
pub fn env_overlay(env: impl Fn(&str) -> Option<String>) -> toml::Value {
    let mut root = toml::Table::new();
    for (var, path) in ENV_OVERRIDES {
        let Some(value) = env(var).filter(|v| !v.is_empty()) else {
            continue;
        };
        let value = toml::Value::String(value);
        match path {
            [key] => {
                root.insert(key.to_string(), value);
            }
            [section, key] => {
                let entry = root
                    .entry(section.to_string())
                    .or_insert_with(|| toml::Value::Table(toml::Table::new()));
                if let toml::Value::Table(table) = entry {
                    table.insert(key.to_string(), value);
                }
            }
            _ => {}
        }
    }
    toml::Value::Table(root)
}

/// Load and validate configuration.
///
/// `path`, when given, must name a readable TOML file. `env` resolves
/// environment variable names; pass `|k| std::env::var(k).ok()` for the
/// process environment.
pub fn load_config(
    path: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<DirectoryConfig, ConfigError> {
    let mut merged = stock_defaults_value()?;
    if let Some(path) = path {
        let content = fs::read_to_string(path)?;
        let file: toml::Value = toml::from_str(&content)?;
        merged = merge_toml(merged, file);
    }
    merged = merge_toml(merged, env_overlay(env));
    let config: DirectoryConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock config file with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Staff Directory Configuration
# =============================
# All settings except photos_bucket are optional. Values shown are the
# defaults. Environment variables (in brackets) override this file.
# Unknown keys will cause an error.

# Object store bucket for employee photos. Required. [PHOTOS_BUCKET]
photos_bucket = "staff-photos"

# Where the record store and photo buckets live. [STAFFDIR_DATA_DIR]
data_dir = "data"

# ---------------------------------------------------------------------------
# Record store
# ---------------------------------------------------------------------------
[database]
# "sql" (SQLite, integer ids) or "kv" (JSON document, UUID ids).
# [DATABASE_BACKEND]
backend = "sql"

# File name stem inside data_dir. [DATABASE_DB_NAME]
db_name = "employees"

# ---------------------------------------------------------------------------
# Photos
# ---------------------------------------------------------------------------
[photos]
# Every stored photo is exactly this size, [width, height], transparent
# where the photo does not reach.
canvas = [120, 160]

# Random bytes per photo key. Keys look like employee_pic/<hex>.png
key_bytes = 8
key_prefix = "employee_pic/"

# Lifetime of signed photo URLs.
url_expiry_secs = 3600

# Prefix for signed URLs. [PHOTOS_BASE_URL]
base_url = "http://localhost:8000/photos"

# HMAC key for signed URLs. Without it photos are stored but never shown.
# [PHOTOS_SIGNING_SECRET]
# signing_secret = "change-me"

# ---------------------------------------------------------------------------
# Instance
# ---------------------------------------------------------------------------
[instance]
# JSON identity document with instanceId and availabilityZone.
# [INSTANCE_IDENTITY_DOCUMENT]
# identity_document = "/run/instance-identity.json"

# Workers for `staffdir stress`.
stress_cpus = 8

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel workers for `staffdir normalize`.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_threads = 4
"##
}
