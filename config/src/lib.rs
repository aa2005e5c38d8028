//! Configuration for the transcript viewer.
//!
//! Settings come from `$TRANSCRIPT_HOME/config.toml`, with `-c key=value`
//! overrides applied on the parsed TOML tree before it is deserialized.

mod error;
mod home;
mod overrides;

use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

pub use error::ConfigError;
pub use error::Result;
pub use home::TRANSCRIPT_HOME_ENV_VAR;
pub use home::find_transcript_home;
pub use overrides::apply_override;
pub use overrides::parse_overrides;

pub const CONFIG_TOML_FILE: &str = "config.toml";
const LOG_DIR_NAME: &str = "log";
const DEV_DATA_DIR_NAME: &str = "dev_data";

/// On-disk shape of `config.toml`. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ConfigToml {
    pub display_raw_markdown: bool,
    pub dev_data: DevDataToml,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DevDataToml {
    pub enabled: bool,
    /// Directory for the JSONL tables. Relative paths resolve against the
    /// transcript home.
    pub dir: Option<PathBuf>,
}

impl Default for DevDataToml {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: None,
        }
    }
}

/// Resolved configuration handed to the UI.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub transcript_home: PathBuf,
    pub ui: UiConfig,
    /// `None` when dev-data logging is disabled.
    pub dev_data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UiConfig {
    /// Show message bodies as literal markdown source instead of rendering it.
    pub display_raw_markdown: bool,
}

impl Config {
    pub fn log_dir(&self) -> PathBuf {
        self.transcript_home.join(LOG_DIR_NAME)
    }

    fn from_toml(transcript_home: PathBuf, toml: ConfigToml) -> Self {
        let dev_data_dir = toml.dev_data.enabled.then(|| match toml.dev_data.dir {
            Some(dir) if dir.is_absolute() => dir,
            Some(dir) => transcript_home.join(dir),
            None => transcript_home.join(DEV_DATA_DIR_NAME),
        });
        Self {
            ui: UiConfig {
                display_raw_markdown: toml.display_raw_markdown,
            },
            dev_data_dir,
            transcript_home,
        }
    }
}

/// Loads `config.toml` from `transcript_home` and applies `overrides`.
///
/// A missing file is not an error and yields the defaults.
pub fn load_config(
    transcript_home: &Path,
    overrides: Vec<(String, toml::Value)>,
) -> Result<Config> {
    let path = transcript_home.join(CONFIG_TOML_FILE);
    let mut root = read_config_value(&path)?;
    for (key, value) in overrides {
        tracing::debug!(key = %key, "applying config override");
        apply_override(&mut root, &key, value);
    }
    let toml =
        ConfigToml::deserialize(root).map_err(|source| ConfigError::Parse { path, source })?;
    Ok(Config::from_toml(transcript_home.to_path_buf(), toml))
}

fn read_config_value(path: &Path) -> Result<toml::Value> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("no config at {}, using defaults", path.display());
            return Ok(toml::Value::Table(toml::Table::new()));
        }
        Err(source) => return Err(ConfigError::io("read config.toml", source)),
    };
    toml::from_str::<toml::Table>(&contents)
        .map(toml::Value::Table)
        .map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let home = TempDir::new().expect("temp home");

        let config = load_config(home.path(), Vec::new()).expect("config");

        assert_eq!(config.ui, UiConfig::default());
        assert_eq!(config.dev_data_dir, Some(home.path().join("dev_data")));
        assert_eq!(config.log_dir(), home.path().join("log"));
    }

    #[test]
    fn reads_file_and_applies_overrides_last() {
        let home = TempDir::new().expect("temp home");
        std::fs::write(
            home.path().join(CONFIG_TOML_FILE),
            "display_raw_markdown = true\n[dev_data]\ndir = \"telemetry\"\n",
        )
        .expect("write config");

        let overrides =
            parse_overrides(&["display_raw_markdown=false".to_string()]).expect("overrides");
        let config = load_config(home.path(), overrides).expect("config");

        assert!(!config.ui.display_raw_markdown);
        assert_eq!(config.dev_data_dir, Some(home.path().join("telemetry")));
    }

    #[test]
    fn dev_data_can_be_disabled() {
        let home = TempDir::new().expect("temp home");
        let overrides =
            parse_overrides(&["dev_data.enabled=false".to_string()]).expect("overrides");

        let config = load_config(home.path(), overrides).expect("config");

        assert_eq!(config.dev_data_dir, None);
    }

    #[test]
    fn type_mismatch_reports_config_path() {
        let home = TempDir::new().expect("temp home");
        std::fs::write(
            home.path().join(CONFIG_TOML_FILE),
            "display_raw_markdown = \"yes\"\n",
        )
        .expect("write config");

        let err = load_config(home.path(), Vec::new()).expect_err("bad type");
        assert!(
            err.to_string().contains(CONFIG_TOML_FILE),
            "unexpected error: {err}"
        );
    }
}
