use std::path::PathBuf;

use crate::error::ConfigError;
use crate::error::Result;

pub const TRANSCRIPT_HOME_ENV_VAR: &str = "TRANSCRIPT_HOME";
const DEFAULT_HOME_DIR_NAME: &str = ".transcript";

/// Resolves the directory holding `config.toml`, logs and dev data.
///
/// `TRANSCRIPT_HOME` wins when set and must name an existing directory.
/// Otherwise `~/.transcript` is returned without checking that it exists.
pub fn find_transcript_home() -> Result<PathBuf> {
    let from_env = std::env::var(TRANSCRIPT_HOME_ENV_VAR)
        .ok()
        .filter(|val| !val.is_empty());
    resolve_home(from_env.as_deref())
}

fn resolve_home(from_env: Option<&str>) -> Result<PathBuf> {
    let Some(val) = from_env else {
        return dirs::home_dir()
            .map(|home| home.join(DEFAULT_HOME_DIR_NAME))
            .ok_or(ConfigError::NoHomeDir);
    };

    let path = PathBuf::from(val);
    match std::fs::metadata(&path) {
        Ok(metadata) if metadata.is_dir() => path
            .canonicalize()
            .map_err(|source| ConfigError::io("canonicalize TRANSCRIPT_HOME", source)),
        Ok(_) => Err(ConfigError::InvalidHome {
            path,
            reason: "that path is not a directory",
        }),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Err(ConfigError::InvalidHome {
            path,
            reason: "that path does not exist",
        }),
        Err(source) => Err(ConfigError::io("read TRANSCRIPT_HOME", source)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn missing_env_path_is_rejected() {
        let temp = TempDir::new().expect("temp dir");
        let missing = temp.path().join("nope");

        let err = resolve_home(missing.to_str()).expect_err("missing home");
        assert!(
            err.to_string().contains("does not exist"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn file_env_path_is_rejected() {
        let temp = TempDir::new().expect("temp dir");
        let file = temp.path().join("home.txt");
        std::fs::write(&file, "x").expect("write");

        let err = resolve_home(file.to_str()).expect_err("file home");
        assert!(
            err.to_string().contains("not a directory"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn env_directory_is_canonicalized() {
        let temp = TempDir::new().expect("temp dir");

        let resolved = resolve_home(temp.path().to_str()).expect("home");
        assert_eq!(resolved, temp.path().canonicalize().expect("canonicalize"));
    }

    #[test]
    fn default_home_is_under_user_home() {
        let resolved = resolve_home(None).expect("default home");
        let expected = dirs::home_dir().expect("home dir").join(".transcript");
        assert_eq!(resolved, expected);
    }
}
