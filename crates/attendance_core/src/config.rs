//! Runtime configuration, loaded with `confique`.
//!
//! Resolution order, highest first:
//! 1. Environment variables (`ATTENDANCE_BACKEND`, `ATTENDANCE_DATA_DIR`, ...).
//! 2. The TOML file passed to [`AttendanceConfig::load`], when it exists.
//! 3. Compiled defaults.
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `backend` | `sqlite` | `sqlite`, `memory` or `json` |
//! | `data_dir` | `attendance-data` | Directory for the database or JSON files |
//! | `allow_duplicate_daily_attendance` | `true` | `false` replaces a student's same-day records |
//! | `log_level` | build default | `trace`, `debug`, `info`, `warn`, `error` |
//! | `log_dir` | unset | Rolling log directory; logging is off when unset |

use crate::service::attendance_service::DailyAttendancePolicy;
use confique::Config;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const CONFIG_FILE_NAME: &str = "attendance.toml";
pub const SQLITE_FILE_NAME: &str = "attendance.sqlite3";

/// Which persistence backend the facade opens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Sqlite,
    Memory,
    Json,
}

impl StoreBackend {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sqlite => "sqlite",
            Self::Memory => "memory",
            Self::Json => "json",
        }
    }
}

impl Display for StoreBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "memory" => Ok(Self::Memory),
            "json" => Ok(Self::Json),
            other => Err(format!(
                "unsupported backend `{other}`; expected sqlite|memory|json"
            )),
        }
    }
}

// Parsed from a plain string so env values, TOML and defaults share one path.
impl<'de> Deserialize<'de> for StoreBackend {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AttendanceConfig {
    /// Storage backend.
    #[config(env = "ATTENDANCE_BACKEND", default = "sqlite")]
    pub backend: StoreBackend,

    /// Directory holding `attendance.sqlite3` or the JSON collections.
    #[config(env = "ATTENDANCE_DATA_DIR", default = "attendance-data")]
    pub data_dir: PathBuf,

    /// When false, marking attendance replaces the student's records for
    /// that day instead of appending another one.
    #[config(env = "ATTENDANCE_ALLOW_DUPLICATE_DAILY", default = true)]
    pub allow_duplicate_daily_attendance: bool,

    #[config(env = "ATTENDANCE_LOG_LEVEL")]
    pub log_level: Option<String>,

    #[config(env = "ATTENDANCE_LOG_DIR")]
    pub log_dir: Option<PathBuf>,
}

impl Default for AttendanceConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Sqlite,
            data_dir: PathBuf::from("attendance-data"),
            allow_duplicate_daily_attendance: true,
            log_level: None,
            log_dir: None,
        }
    }
}

impl AttendanceConfig {
    /// Loads environment overrides on top of an optional TOML file.
    ///
    /// A missing file is not an error; defaults apply.
    pub fn load(file: Option<&Path>) -> Result<Self, confique::Error> {
        let mut builder = Self::builder().env();
        if let Some(path) = file {
            builder = builder.file(path);
        }
        builder.load()
    }

    pub fn sqlite_path(&self) -> PathBuf {
        self.data_dir.join(SQLITE_FILE_NAME)
    }

    pub fn daily_policy(&self) -> DailyAttendancePolicy {
        if self.allow_duplicate_daily_attendance {
            DailyAttendancePolicy::Append
        } else {
            DailyAttendancePolicy::ReplaceExisting
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_uses_sqlite_and_append() {
        let config = AttendanceConfig::default();
        assert_eq!(config.backend, StoreBackend::Sqlite);
        assert_eq!(config.daily_policy(), DailyAttendancePolicy::Append);
        assert_eq!(
            config.sqlite_path(),
            PathBuf::from("attendance-data").join("attendance.sqlite3")
        );
    }

    #[test]
    fn disallowing_duplicates_selects_replace_policy() {
        let config = AttendanceConfig {
            allow_duplicate_daily_attendance: false,
            ..Default::default()
        };
        assert_eq!(config.daily_policy(), DailyAttendancePolicy::ReplaceExisting);
    }

    #[test]
    fn backend_parses_case_insensitively() {
        assert_eq!("JSON".parse::<StoreBackend>().unwrap(), StoreBackend::Json);
        assert_eq!(" memory ".parse::<StoreBackend>().unwrap(), StoreBackend::Memory);
        assert!("mongo".parse::<StoreBackend>().is_err());
    }

    #[test]
    fn load_reads_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(
            &path,
            "backend = \"json\"\ndata_dir = \"/var/lib/attendance\"\nallow_duplicate_daily_attendance = false\n",
        )
        .unwrap();

        let config = AttendanceConfig::load(Some(&path)).unwrap();
        assert_eq!(config.backend, StoreBackend::Json);
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/attendance"));
        assert!(!config.allow_duplicate_daily_attendance);
    }
}
