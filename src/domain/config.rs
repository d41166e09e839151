use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::table::RenderStrategy;

/// Configuration for the review table and its collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// How the table view is refreshed after each mutation.
    pub render_strategy: RenderStrategy,

    /// Directory that saved payloads and CSV exports are written to.
    pub output_dir: PathBuf,

    /// Whether CSV exports begin with a UTF-8 byte order mark.
    ///
    /// Spreadsheet applications use the mark to detect the encoding.
    pub csv_bom: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            render_strategy: RenderStrategy::default(),
            output_dir: default_output_dir(),
            csv_bom: true,
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Loads the configuration, falling back to defaults when the file is
    /// missing or invalid.
    #[must_use]
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            tracing::debug!("Failed to load config: {e}");
            Self::default()
        })
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write config file: {e}"))
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

const fn default_csv_bom() -> bool {
    true
}

/// The serialized versions of the configuration.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default)]
        render_strategy: RenderStrategy,

        #[serde(default = "default_output_dir")]
        output_dir: PathBuf,

        #[serde(default = "default_csv_bom")]
        csv_bom: bool,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                render_strategy,
                output_dir,
                csv_bom,
            } => Self {
                render_strategy,
                output_dir,
                csv_bom,
            },
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            render_strategy: config.render_strategy,
            output_dir: config.output_dir,
            csv_bom: config.csv_bom,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn load_reads_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            b"_version = \"1\"\nrender_strategy = \"reconcile\"\noutput_dir = \"out\"\ncsv_bom = false\n",
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.render_strategy, RenderStrategy::Reconcile);
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert!(!config.csv_bom);
    }

    #[test]
    fn load_missing_file_returns_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing.toml");

        let error = Config::load(&missing).unwrap_err();
        assert!(error.starts_with("Failed to read config file:"));
        assert_eq!(Config::load_or_default(&missing), Config::default());
    }

    #[test]
    fn load_invalid_toml_returns_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"_version = \"1\"\nrender_strategy = \"sometimes\"\n")
            .unwrap();

        let error = Config::load(file.path()).unwrap_err();
        assert!(error.starts_with("Failed to parse config file:"));
    }

    #[test]
    fn empty_file_returns_default() {
        let expected = Config::default();
        let actual: Config = toml::from_str(r#"_version = "1""#).unwrap();
        assert_eq!(actual, expected);
    }

    #[test]
    fn save_then_load_preserves_settings() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("req-review.toml");
        let config = Config {
            render_strategy: RenderStrategy::Reconcile,
            output_dir: PathBuf::from("exports"),
            csv_bom: false,
        };

        config.save(&path).unwrap();

        assert_eq!(Config::load(&path).unwrap(), config);
    }
}
