// Application configuration: loads config/atlas.toml, seeding it from
// defaults/ on first run.

use std::io::Write;
use std::path::{Path, PathBuf};

use atlas_core::BalanceConfig;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error(transparent)]
    Validation(#[from] atlas_core::config::ConfigError),

    #[error("no atlas.toml to seed from: {path} is missing")]
    NoDefaults { path: PathBuf },

    #[error("could not seed atlas config at {path}: {source}")]
    Seed {
        path: PathBuf,
        source: std::io::Error,
    },
}

const CONFIG_FILE: &str = "atlas.toml";

// ---------------------------------------------------------------------------
// atlas.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub balance: BalanceConfig,
    pub storage: StorageConfig,
    pub run: RunConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Root of the file repository, relative to the working directory.
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            data_dir: PathBuf::from("data"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub tournament_id: Option<String>,
    pub evidence_enabled: bool,
    pub evidence_timeout_ms: u64,
    /// Fixed evaluation time as an RFC 3339 string; the wall clock when absent.
    pub as_of: Option<DateTime<Utc>>,
    /// Start from the previously saved assignment instead of a fresh draft.
    pub rebalance: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            tournament_id: None,
            evidence_enabled: false,
            evidence_timeout_ms: 2000,
            as_of: None,
            rebalance: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

fn config_path(base_dir: &Path) -> PathBuf {
    base_dir.join("config").join(CONFIG_FILE)
}

/// Load and validate `config/atlas.toml` under `base_dir`.
pub fn load_config_from(base_dir: &Path) -> Result<AppConfig, ConfigError> {
    let path = config_path(base_dir);
    let text = read_file(&path)?;
    let config: AppConfig =
        toml::from_str(&text).map_err(|source| ConfigError::ParseError { path, source })?;
    validate(&config)?;
    Ok(config)
}

/// Write `config/atlas.toml` from the shipped `defaults/atlas.toml` unless an
/// operator copy already exists. Returns the path written, if any.
pub fn seed_config(base_dir: &Path) -> Result<Option<PathBuf>, ConfigError> {
    let target = config_path(base_dir);
    if target.is_file() {
        return Ok(None);
    }
    let shipped = base_dir.join("defaults").join(CONFIG_FILE);
    if !shipped.is_file() {
        return Err(ConfigError::NoDefaults { path: shipped });
    }

    let seed_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source: std::io::Error| ConfigError::Seed { path, source }
    };
    let contents = std::fs::read(&shipped).map_err(seed_err(&shipped))?;
    if let Some(dir) = target.parent() {
        std::fs::create_dir_all(dir).map_err(seed_err(dir))?;
    }
    // create_new: a concurrent run that seeded first wins.
    let mut file = match std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&target)
    {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => return Ok(None),
        Err(source) => return Err(ConfigError::Seed { path: target, source }),
    };
    file.write_all(&contents).map_err(seed_err(&target))?;
    info!("Seeded {} from {}", target.display(), shipped.display());
    Ok(Some(target))
}

/// Load config relative to the current working directory, seeding it first.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    seed_config(&cwd)?;
    load_config_from(&cwd)
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

fn validate(config: &AppConfig) -> Result<(), ConfigError> {
    config.balance.validate()?;
    if config.run.evidence_timeout_ms == 0 {
        return Err(atlas_core::config::ConfigError::ValidationError {
            field: "run.evidence_timeout_ms".into(),
            message: "must be greater than 0".into(),
        }
        .into());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_core::config::WeightingMode;
    use std::fs;

    /// Returns the atlas-app crate root whether tests run from the crate or
    /// the workspace root.
    fn project_root() -> PathBuf {
        let cwd = std::env::current_dir().unwrap();
        if cwd.join("defaults").exists() {
            cwd
        } else if cwd.join("crates/atlas-app/defaults").exists() {
            cwd.join("crates/atlas-app")
        } else {
            panic!("Cannot locate defaults/ directory from CWD {:?}", cwd);
        }
    }

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("atlas_config_test_{name}_{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(dir.join("config")).unwrap();
        dir
    }

    #[test]
    fn shipped_defaults_load() {
        let root = scratch("shipped");
        fs::copy(
            project_root().join("defaults/atlas.toml"),
            root.join("config/atlas.toml"),
        )
        .unwrap();
        let config = load_config_from(&root).expect("defaults should load");

        assert_eq!(config.balance.teams.count, 2);
        assert_eq!(config.balance.teams.capacity, 5);
        assert_eq!(config.balance.thresholds.elite, 400);
        assert_eq!(config.balance.weighting.mode, WeightingMode::EvidenceBased);
        assert_eq!(config.balance.orchestrator.confidence_threshold, 75);
        assert_eq!(config.storage.data_dir, PathBuf::from("data"));
        assert!(!config.run.evidence_enabled);
        assert_eq!(config.run.evidence_timeout_ms, 2000);
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let root = scratch("partial");
        fs::write(
            root.join("config/atlas.toml"),
            "[balance.teams]\ncount = 4\n\n[run]\ntournament_id = \"spring-cup\"\nas_of = \"2026-06-01T00:00:00Z\"\n",
        )
        .unwrap();
        let config = load_config_from(&root).unwrap();

        assert_eq!(config.balance.teams.count, 4);
        assert_eq!(config.balance.teams.capacity, 5);
        assert_eq!(config.run.tournament_id.as_deref(), Some("spring-cup"));
        assert_eq!(
            config.run.as_of.map(|t| t.to_rfc3339()).as_deref(),
            Some("2026-06-01T00:00:00+00:00")
        );
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn missing_file_is_reported_with_path() {
        let root = scratch("missing");
        match load_config_from(&root) {
            Err(ConfigError::FileNotFound { path }) => assert!(path.ends_with("atlas.toml")),
            other => panic!("expected FileNotFound, got {other:?}"),
        }
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let root = scratch("malformed");
        fs::write(root.join("config/atlas.toml"), "[balance.teams\ncount = ").unwrap();
        assert!(matches!(
            load_config_from(&root),
            Err(ConfigError::ParseError { .. })
        ));
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn invalid_values_fail_validation() {
        let root = scratch("invalid");
        fs::write(root.join("config/atlas.toml"), "[run]\nevidence_timeout_ms = 0\n").unwrap();
        match load_config_from(&root) {
            Err(ConfigError::Validation(atlas_core::config::ConfigError::ValidationError {
                field,
                ..
            })) => assert_eq!(field, "run.evidence_timeout_ms"),
            other => panic!("expected validation error, got {other:?}"),
        }
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn seeding_writes_once_and_keeps_operator_edits() {
        let root = std::env::temp_dir().join(format!("atlas_config_test_seed_{}", std::process::id()));
        let _ = fs::remove_dir_all(&root);
        fs::create_dir_all(root.join("defaults")).unwrap();
        fs::write(root.join("defaults/atlas.toml"), "[run]\nrebalance = true\n").unwrap();

        let written = seed_config(&root).unwrap();
        assert_eq!(written, Some(root.join("config/atlas.toml")));
        assert!(load_config_from(&root).unwrap().run.rebalance);

        fs::write(root.join("config/atlas.toml"), "# operator edited\n").unwrap();
        assert_eq!(seed_config(&root).unwrap(), None);
        assert_eq!(
            fs::read_to_string(root.join("config/atlas.toml")).unwrap(),
            "# operator edited\n"
        );
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn seeding_without_shipped_defaults_fails() {
        let root = std::env::temp_dir().join(format!("atlas_config_test_empty_{}", std::process::id()));
        let _ = fs::remove_dir_all(&root);
        fs::create_dir_all(&root).unwrap();
        match seed_config(&root) {
            Err(ConfigError::NoDefaults { path }) => assert!(path.ends_with("defaults/atlas.toml")),
            other => panic!("expected NoDefaults, got {other:?}"),
        }
        let _ = fs::remove_dir_all(&root);
    }
}
