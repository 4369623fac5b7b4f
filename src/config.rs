//! Project Configuration
//!
//! The fully-resolved answers for one generation run, loaded from a replay
//! file so runs are reproducible without interactive prompts.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// A replay file: the answers for a run under a required top-level key.
///
/// A file without the `answers` key is rejected at parse time rather than
/// silently treated as an empty configuration.
#[derive(Debug, Deserialize)]
struct ReplayFile {
    answers: ProjectConfig,
}

/// All parameters of one exam project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub quiz_number: u32,
    pub exam_code: String,
    pub exam_name: String,
    /// ISO date (`YYYY-MM-DD`); templates localize it for display.
    pub exam_date: String,
    #[serde(default)]
    pub course_name: String,
    #[serde(default)]
    pub instructor_name: String,
    #[serde(default)]
    pub term_name: String,
    #[serde(default)]
    pub site_id: String,
    #[serde(default = "default_number_copies")]
    pub number_copies: u32,
    #[serde(default)]
    pub use_nyu_fonts: bool,
    #[serde(default)]
    pub has_versions: bool,
    #[serde(default)]
    pub versions_csv: String,
    #[serde(default)]
    pub versions_with_solutions: String,
    #[serde(default)]
    pub version_randomization_groups: String,
    #[serde(default)]
    pub bundle_name: String,
    #[serde(default)]
    pub install_dir: String,
}

fn default_number_copies() -> u32 {
    45
}

impl ProjectConfig {
    /// Load a configuration from a replay JSON file.
    pub fn from_replay_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let replay: ReplayFile =
            serde_json::from_str(&contents).map_err(|e| ConfigError::Parse {
                path: path.to_path_buf(),
                source: e,
            })?;
        Ok(replay.answers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_answers() -> &'static str {
        r#"{
            "answers": {
                "quiz_number": 1,
                "exam_code": "q01",
                "exam_name": "Quiz 1",
                "exam_date": "2025-10-31"
            }
        }"#
    }

    #[test]
    fn loads_replay_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("replay.json");
        fs::write(&path, minimal_answers()).unwrap();

        let config = ProjectConfig::from_replay_file(&path).unwrap();
        assert_eq!(config.exam_code, "q01");
        assert_eq!(config.number_copies, 45);
        assert!(!config.has_versions);
        assert_eq!(config.versions_csv, "");
    }

    #[test]
    fn replay_without_answers_key_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("replay.json");
        fs::write(&path, "{}").unwrap();

        let err = ProjectConfig::from_replay_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = ProjectConfig::from_replay_file(Path::new("/nonexistent/replay.json"))
            .unwrap_err();
        assert!(err.to_string().contains("/nonexistent/replay.json"));
    }
}
