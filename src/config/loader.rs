// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and validate it.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Resolve the effective configuration for a run.
///
/// - An explicitly requested file must exist.
/// - Otherwise `Wsrun.toml` in `base_dir` is used when present, and the
///   built-in defaults when it is not.
pub fn resolve_config(explicit: Option<&Path>, base_dir: &Path) -> Result<ConfigFile> {
    if let Some(path) = explicit {
        return load_and_validate(path);
    }

    let candidate = base_dir.join(default_config_path());
    if candidate.is_file() {
        debug!(path = %candidate.display(), "loading config file");
        load_and_validate(&candidate)
    } else {
        debug!("no config file found; using built-in defaults");
        Ok(ConfigFile::default())
    }
}

/// Name of the config file looked up in the working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Wsrun.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::WsrunError;
    use crate::types::ExecutionMode;
    use std::time::Duration;

    #[test]
    fn missing_default_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = resolve_config(None, dir.path()).unwrap();
        assert_eq!(cfg.mode, ExecutionMode::Sequential);
    }

    #[test]
    fn default_file_in_base_dir_is_picked_up() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("Wsrun.toml"),
            "[run]\nmode = \"parallel\"\nstagger = \"2s\"\n",
        )
        .unwrap();

        let cfg = resolve_config(None, dir.path()).unwrap();
        assert_eq!(cfg.mode, ExecutionMode::Parallel);
        assert_eq!(cfg.stagger, Duration::from_secs(2));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = resolve_config(Some(&dir.path().join("nope.toml")), dir.path());
        assert!(matches!(result, Err(WsrunError::IoError(_))));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Wsrun.toml");
        fs::write(&path, "[run]\nretries = 3\n").unwrap();

        assert!(matches!(
            load_and_validate(&path),
            Err(WsrunError::TomlError(_))
        ));
    }
}
