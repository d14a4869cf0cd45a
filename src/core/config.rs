//! Configuration system: TOML file + env var overrides + smart defaults.

#![allow(missing_docs)]

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::errors::{MonError, Result};
use crate::panels::registry::PanelRegistry;

/// Full clustermon configuration model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Config {
    pub connection: ConnectionConfig,
    pub dashboard: DashboardConfig,
    pub output: OutputConfig,
    /// User-defined named layouts: name -> layout spec string.
    pub layouts: BTreeMap<String, String>,
    pub paths: PathsConfig,
}

/// How to reach the cluster's management endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ConnectionConfig {
    pub url: String,
    pub username: Option<String>,
    pub request_timeout_secs: u64,
    pub curl_binary: PathBuf,
    pub insecure_tls: bool,
}

/// Live dashboard defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DashboardConfig {
    pub refresh_interval_secs: u64,
    pub padding: bool,
    /// End the dashboard on the first fetch failure instead of degrading.
    pub strict: bool,
    pub height_adjust: usize,
    pub default_layout: String,
    /// A refresh slower than this shows "Retrieving data..." on the next cycle.
    pub slow_refresh_threshold_ms: u64,
}

/// Table output defaults shared by the dashboard and one-shot commands.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OutputConfig {
    pub color: bool,
    /// 0 disables column truncation.
    pub max_column_width: usize,
    pub wide: bool,
    pub bytes_unit: BytesUnit,
}

/// Unit used when rendering memory and storage sizes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BytesUnit {
    Bytes,
    Kb,
    #[default]
    Mb,
    Gb,
    Tb,
}

/// Filesystem locations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PathsConfig {
    pub config_file: PathBuf,
    pub jsonl_log: PathBuf,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:30000/management/coherence/cluster".to_string(),
            username: None,
            request_timeout_secs: 30,
            curl_binary: PathBuf::from("curl"),
            insecure_tls: false,
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: 5,
            padding: true,
            strict: false,
            height_adjust: 0,
            default_layout: "default".to_string(),
            slow_refresh_threshold_ms: 1_000,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            color: true,
            max_column_width: 0,
            wide: false,
            bytes_unit: BytesUnit::Mb,
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        let home_dir = env::var_os("HOME").map_or_else(
            || {
                eprintln!(
                    "[MON-CONFIG] WARNING: HOME not set, falling back to /tmp for data paths"
                );
                PathBuf::from("/tmp")
            },
            PathBuf::from,
        );
        let cfg = home_dir.join(".config").join("clustermon");
        let data = home_dir.join(".local").join("share").join("clustermon");
        Self {
            config_file: cfg.join("config.toml"),
            jsonl_log: data.join("activity.jsonl"),
        }
    }
}

impl DashboardConfig {
    #[must_use]
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    #[must_use]
    pub fn slow_refresh_threshold(&self) -> Duration {
        Duration::from_millis(self.slow_refresh_threshold_ms)
    }
}

impl Config {
    /// Default configuration path.
    #[must_use]
    pub fn default_path() -> PathBuf {
        PathsConfig::default().config_file
    }

    /// Load config from default or explicit path, then apply env overrides.
    ///
    /// Missing config file is not an error when loading from default path; defaults are used.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path_buf = path.map_or_else(Self::default_path, Path::to_path_buf);
        let is_explicit_path = path.is_some();

        let mut cfg = if path_buf.exists() {
            let raw = fs::read_to_string(&path_buf).map_err(|source| MonError::Io {
                path: path_buf.clone(),
                source,
            })?;
            let parsed: Self = toml::from_str(&raw)?;
            parsed
        } else if is_explicit_path {
            return Err(MonError::MissingConfig { path: path_buf });
        } else {
            Self::default()
        };

        cfg.paths.config_file = path_buf;
        cfg.apply_env_overrides_from(env_var)?;
        cfg.normalize();
        cfg.validate()?;
        Ok(cfg)
    }

    /// Write the config back to `path` as TOML, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|source| MonError::io(parent, source))?;
        }
        let raw = toml::to_string_pretty(self)?;
        fs::write(path, raw).map_err(|source| MonError::io(path, source))
    }

    /// Deterministic hash of the effective config for the activity log.
    pub fn stable_hash(&self) -> Result<String> {
        let canonical = serde_json::to_string(self)?;
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in canonical.as_bytes() {
            hash ^= u64::from(*byte);
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
        Ok(format!("{hash:016x}"))
    }

    /// Store a named layout after resolving it against `registry`.
    pub fn add_layout(&mut self, name: &str, spec: &str, registry: &PanelRegistry) -> Result<()> {
        validate_layout_name(name, registry)?;
        let mut scoped = registry.clone();
        scoped.add_named_layouts(&self.layouts)?;
        scoped.resolve_layout(spec)?;
        self.layouts.insert(name.to_string(), spec.trim().to_string());
        Ok(())
    }

    /// Remove a user layout, returning whether it existed.
    pub fn remove_layout(&mut self, name: &str) -> bool {
        self.layouts.remove(name).is_some()
    }

    fn apply_env_overrides_from<F>(&mut self, mut lookup: F) -> Result<()>
    where
        F: FnMut(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("CLUSTERMON_URL") {
            self.connection.url = raw;
        }
        if let Some(raw) = lookup("CLUSTERMON_USERNAME") {
            self.connection.username = Some(raw);
        }
        set_u64(
            &mut lookup,
            "CLUSTERMON_REQUEST_TIMEOUT_SECS",
            &mut self.connection.request_timeout_secs,
        )?;
        set_bool(
            &mut lookup,
            "CLUSTERMON_INSECURE_TLS",
            &mut self.connection.insecure_tls,
        )?;
        set_u64(
            &mut lookup,
            "CLUSTERMON_REFRESH_SECS",
            &mut self.dashboard.refresh_interval_secs,
        )?;
        set_bool(
            &mut lookup,
            "CLUSTERMON_STRICT",
            &mut self.dashboard.strict,
        )?;
        set_bool(&mut lookup, "CLUSTERMON_PADDING", &mut self.dashboard.padding)?;
        if let Some(raw) = lookup("CLUSTERMON_LAYOUT") {
            self.dashboard.default_layout = raw;
        }
        set_bool(&mut lookup, "CLUSTERMON_COLOR", &mut self.output.color)?;
        // Honour the de-facto NO_COLOR convention.
        if lookup("NO_COLOR").is_some() {
            self.output.color = false;
        }
        if let Some(raw) = lookup("CLUSTERMON_MAX_COLUMN_WIDTH") {
            self.output.max_column_width = parse_env::<usize>("CLUSTERMON_MAX_COLUMN_WIDTH", &raw)?;
        }
        if let Some(raw) = lookup("CLUSTERMON_JSONL_LOG") {
            self.paths.jsonl_log = PathBuf::from(raw);
        }
        Ok(())
    }

    fn normalize(&mut self) {
        let url = self.connection.url.trim();
        self.connection.url = url.strip_suffix('/').unwrap_or(url).to_string();
        self.layouts = std::mem::take(&mut self.layouts)
            .into_iter()
            .map(|(name, spec)| (name.trim().to_string(), spec.trim().to_string()))
            .collect();
    }

    fn validate(&self) -> Result<()> {
        if self.connection.url.is_empty() {
            return Err(MonError::InvalidConfig {
                details: "connection.url must not be empty".to_string(),
            });
        }
        if self.connection.request_timeout_secs == 0 {
            return Err(MonError::InvalidConfig {
                details: "connection.request_timeout_secs must be > 0".to_string(),
            });
        }
        if self.dashboard.refresh_interval_secs == 0 {
            return Err(MonError::InvalidConfig {
                details: "dashboard.refresh_interval_secs must be >= 1".to_string(),
            });
        }
        if self.output.max_column_width != 0 && self.output.max_column_width < 10 {
            return Err(MonError::InvalidConfig {
                details: format!(
                    "output.max_column_width must be 0 or >= 10, got {}",
                    self.output.max_column_width
                ),
            });
        }
        let registry = PanelRegistry::builtin();
        for name in self.layouts.keys() {
            validate_layout_name(name, &registry)?;
        }
        Ok(())
    }
}

fn validate_layout_name(name: &str, registry: &PanelRegistry) -> Result<()> {
    if name.is_empty() || name.contains([',', ':']) || name.contains(char::is_whitespace) {
        return Err(MonError::InvalidConfig {
            details: format!("layout name {name:?} must be non-empty without ',', ':' or spaces"),
        });
    }
    if registry.panel(name).is_some() {
        return Err(MonError::InvalidConfig {
            details: format!("layout name {name:?} collides with a panel name"),
        });
    }
    if registry.is_builtin_layout(name) {
        return Err(MonError::InvalidConfig {
            details: format!("layout name {name:?} is reserved for a built-in layout"),
        });
    }
    Ok(())
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|raw| !raw.trim().is_empty())
}

fn parse_env<T>(name: &str, raw: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|error| MonError::ConfigParse {
        context: "env",
        details: format!("{name}={raw:?}: {error}"),
    })
}

fn set_u64<F>(lookup: &mut F, name: &str, slot: &mut u64) -> Result<()>
where
    F: FnMut(&str) -> Option<String>,
{
    if let Some(raw) = lookup(name) {
        *slot = parse_env(name, &raw)?;
    }
    Ok(())
}

fn set_bool<F>(lookup: &mut F, name: &str, slot: &mut bool) -> Result<()>
where
    F: FnMut(&str) -> Option<String>,
{
    if let Some(raw) = lookup(name) {
        *slot = parse_env(name, &raw)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Config, MonError};
    use crate::panels::registry::PanelRegistry;
    use std::collections::HashMap;
    use std::path::Path;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(name, value)| ((*name).to_string(), (*value).to_string()))
            .collect()
    }

    #[test]
    fn default_config_is_valid() {
        let cfg = Config::default();
        assert!(cfg.validate().is_ok());
        assert!(!cfg.dashboard.strict, "dashboard degrades unless asked otherwise");
    }

    #[test]
    fn zero_refresh_interval_rejected() {
        let mut cfg = Config::default();
        cfg.dashboard.refresh_interval_secs = 0;
        let err = cfg.validate().expect_err("expected refresh validation error");
        assert!(err.to_string().contains("refresh_interval_secs"));
    }

    #[test]
    fn narrow_column_cap_rejected() {
        let mut cfg = Config::default();
        cfg.output.max_column_width = 5;
        let err = cfg.validate().expect_err("expected width validation error");
        assert!(err.to_string().contains("max_column_width"));
    }

    #[test]
    fn layout_named_after_panel_rejected() {
        let mut cfg = Config::default();
        cfg.layouts
            .insert("members".to_string(), "caches".to_string());
        let err = cfg.validate().expect_err("expected collision error");
        assert!(err.to_string().contains("collides"));
    }

    #[test]
    fn env_overrides_apply() {
        let mut cfg = Config::default();
        let overrides = vars(&[
            ("CLUSTERMON_REFRESH_SECS", "15"),
            ("CLUSTERMON_STRICT", "true"),
            ("CLUSTERMON_URL", "http://grid:30000/management/coherence/cluster/"),
            ("NO_COLOR", "1"),
        ]);
        cfg.apply_env_overrides_from(|name| overrides.get(name).cloned())
            .expect("env overrides should parse");
        cfg.normalize();

        assert_eq!(cfg.dashboard.refresh_interval_secs, 15);
        assert!(cfg.dashboard.strict);
        assert!(!cfg.output.color);
        assert_eq!(
            cfg.connection.url,
            "http://grid:30000/management/coherence/cluster"
        );
    }

    #[test]
    fn env_invalid_number_rejected() {
        let mut cfg = Config::default();
        let overrides = vars(&[("CLUSTERMON_REFRESH_SECS", "soon")]);
        let err = cfg
            .apply_env_overrides_from(|name| overrides.get(name).cloned())
            .expect_err("invalid number should fail");
        match err {
            MonError::ConfigParse { context, details } => {
                assert_eq!(context, "env");
                assert!(details.contains("CLUSTERMON_REFRESH_SECS"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn add_layout_validates_panels() {
        let registry = PanelRegistry::builtin();
        let mut cfg = Config::default();
        cfg.add_layout("mine", "members,caches:services", &registry)
            .expect("valid layout");
        assert_eq!(
            cfg.layouts.get("mine").map(String::as_str),
            Some("members,caches:services")
        );

        let err = cfg
            .add_layout("broken", "members,zzz", &registry)
            .expect_err("unknown panel");
        assert!(matches!(err, MonError::UnknownPanel { ref panel } if panel == "zzz"));
        assert!(cfg.remove_layout("mine"));
        assert!(!cfg.remove_layout("mine"));
    }

    #[test]
    fn add_layout_rejects_builtin_name() {
        let registry = PanelRegistry::builtin();
        let mut cfg = Config::default();
        let err = cfg
            .add_layout("default", "members", &registry)
            .expect_err("reserved name");
        assert!(err.to_string().contains("reserved"));
    }

    #[test]
    fn stable_hash_changes_when_config_changes() {
        let before = Config::default().stable_hash().expect("hash");
        let mut modified = Config::default();
        modified.dashboard.refresh_interval_secs += 1;
        let after = modified.stable_hash().expect("hash");
        assert_ne!(before, after);
    }

    #[test]
    fn load_returns_error_for_explicit_missing_path() {
        let err = Config::load(Some(Path::new("/definitely/not/here.toml")))
            .expect_err("missing explicit path");
        assert_eq!(err.code(), "MON-1002");
    }

    #[test]
    fn save_then_load_preserves_layouts() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.toml");
        let mut cfg = Config::default();
        cfg.layouts
            .insert("ops".to_string(), "members:caches".to_string());
        cfg.save(&path).expect("save");

        let loaded = Config::load(Some(&path)).expect("load");
        assert_eq!(loaded.layouts, cfg.layouts);
        assert_eq!(loaded.paths.config_file, path);
    }
}
