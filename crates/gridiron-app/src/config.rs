// Configuration loading and parsing (league.toml).

use gridiron_core::league::{LeagueSettings, Position};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use thiserror::Error;

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

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub league: LeagueConfig,
    /// Constants handed to the league core.
    pub settings: LeagueSettings,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// league.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire league.toml file.
#[derive(Debug, Clone, Deserialize)]
struct LeagueFile {
    league: LeagueConfig,
    #[serde(default)]
    cap: CapSection,
    /// Position abbreviation to roster target, e.g. `QB = 3`.
    #[serde(default)]
    depth: HashMap<String, usize>,
    #[serde(default)]
    schedule: ScheduleSection,
    #[serde(default)]
    logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeagueConfig {
    pub name: String,
    /// First season. Defaults to the current calendar year.
    #[serde(default)]
    pub base_year: Option<i32>,
    /// RNG seed. Defaults to the current time.
    #[serde(default)]
    pub seed: Option<u64>,
    pub seasons: u32,
    /// Where to write the JSON snapshot of the final league, if anywhere.
    #[serde(default)]
    pub snapshot_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct CapSection {
    base: f64,
    max_rollover: f64,
    guaranteed_pct_default: f64,
    free_agent_discount: f64,
    min_salary: f64,
}

impl Default for CapSection {
    fn default() -> Self {
        let d = LeagueSettings::default();
        CapSection {
            base: d.salary_cap_base,
            max_rollover: d.max_rollover,
            guaranteed_pct_default: d.guaranteed_pct_default,
            free_agent_discount: d.free_agent_discount,
            min_salary: d.min_salary,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct ScheduleSection {
    attempts: u32,
}

impl Default for ScheduleSection {
    fn default() -> Self {
        ScheduleSection {
            attempts: LeagueSettings::default().schedule_attempts,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log to stderr instead of `logs/gridiron.log`.
    pub log_to_stderr: bool,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/league.toml` relative to
/// `base_dir`.
///
/// This is the lower-level loading primitive that does not auto-copy defaults.
/// Prefer `load_config()` which handles default initialization automatically.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let league_path = base_dir.join("config").join("league.toml");
    let text = read_file(&league_path)?;
    let file: LeagueFile = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: league_path.clone(),
        source: e,
    })?;

    let settings = build_settings(&file)?;
    let config = Config {
        league: file.league,
        settings,
        logging: file.logging,
    };

    validate(&config)?;

    Ok(config)
}

/// Ensure all config files exist by copying missing ones from `defaults/`.
/// Returns the list of files that were copied. Skips `.example` files.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        if !config_dir.exists() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "neither defaults/ nor config/ directory found in {}",
                    base_dir.display()
                ),
            });
        }
        return Ok(vec![]);
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    let mut copied = Vec::new();

    let entries = std::fs::read_dir(&defaults_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to read defaults directory: {e}"),
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to read defaults entry: {e}"),
        })?;
        let path = entry.path();

        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name() else {
            continue;
        };
        if file_name.to_str().is_some_and(|n| n.ends_with(".example")) {
            continue;
        }
        let target = config_dir.join(file_name);

        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
        {
            Ok(mut dest) => {
                let content = std::fs::read(&path).map_err(|e| ConfigError::DefaultsCopyError {
                    message: format!("failed to read {}: {e}", path.display()),
                })?;
                std::io::Write::write_all(&mut dest, &content).map_err(|e| {
                    ConfigError::DefaultsCopyError {
                        message: format!("failed to write {}: {e}", target.display()),
                    }
                })?;
                copied.push(target);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
            Err(e) => {
                return Err(ConfigError::DefaultsCopyError {
                    message: format!("failed to create {}: {e}", target.display()),
                });
            }
        }
    }

    Ok(copied)
}

/// Directory holding `defaults/` and `config/`: the working directory when
/// it has either, otherwise this crate's own directory.
pub fn config_root() -> Result<PathBuf, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    if cwd.join("defaults").exists() || cwd.join("config").exists() {
        return Ok(cwd);
    }
    Ok(PathBuf::from(env!("CARGO_MANIFEST_DIR")))
}

/// Convenience wrapper: ensures default config files are copied, then loads.
pub fn load_config() -> Result<Config, ConfigError> {
    let root = config_root()?;
    ensure_config_files(&root)?;
    load_config_from(&root)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

fn build_settings(file: &LeagueFile) -> Result<LeagueSettings, ConfigError> {
    let mut settings = LeagueSettings {
        salary_cap_base: file.cap.base,
        max_rollover: file.cap.max_rollover,
        guaranteed_pct_default: file.cap.guaranteed_pct_default,
        free_agent_discount: file.cap.free_agent_discount,
        min_salary: file.cap.min_salary,
        schedule_attempts: file.schedule.attempts,
        ..LeagueSettings::default()
    };

    let mut depth = BTreeMap::new();
    for (key, &count) in &file.depth {
        let pos = Position::from_str_pos(key).ok_or_else(|| ConfigError::ValidationError {
            field: format!("depth.{key}"),
            message: "unknown position".into(),
        })?;
        depth.insert(pos, count);
    }
    settings.depth_needs.extend(depth);

    Ok(settings)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.league.name.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "league.name".into(),
            message: "must not be empty".into(),
        });
    }

    if config.league.seasons == 0 {
        return Err(ConfigError::ValidationError {
            field: "league.seasons".into(),
            message: "must be greater than 0".into(),
        });
    }

    let s = &config.settings;
    if s.salary_cap_base <= 0.0 {
        return Err(ConfigError::ValidationError {
            field: "cap.base".into(),
            message: format!("must be > 0, got {}", s.salary_cap_base),
        });
    }

    let non_negative: &[(&str, f64)] = &[
        ("cap.max_rollover", s.max_rollover),
        ("cap.min_salary", s.min_salary),
    ];
    for (name, val) in non_negative {
        if *val < 0.0 {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: format!("must be >= 0, got {val}"),
            });
        }
    }

    let fractions: &[(&str, f64)] = &[
        ("cap.guaranteed_pct_default", s.guaranteed_pct_default),
        ("cap.free_agent_discount", s.free_agent_discount),
    ];
    for (name, val) in fractions {
        if !(0.0..=1.0).contains(val) {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: format!("must be between 0.0 and 1.0 inclusive, got {val}"),
            });
        }
    }

    for (pos, count) in &s.depth_needs {
        if *count == 0 {
            return Err(ConfigError::ValidationError {
                field: format!("depth.{}", pos.display_str()),
                message: "must be > 0".into(),
            });
        }
    }

    if s.schedule_attempts == 0 {
        return Err(ConfigError::ValidationError {
            field: "schedule.attempts".into(),
            message: "must be > 0".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
