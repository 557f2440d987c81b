// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile, SCRIPT_PLACEHOLDER};
use crate::errors::{Result, WsrunError};
use crate::types::parse_duration;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::WsrunError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_workspace_section(&raw)?;
        let stagger = parse_duration(&raw.run.stagger).map_err(|e| {
            WsrunError::ConfigError(format!("[run].stagger is invalid: {e}"))
        })?;

        Ok(ConfigFile::new_unchecked(
            raw.workspace,
            raw.run.mode,
            stagger,
            raw.run.prefix_output,
        ))
    }
}

fn validate_workspace_section(cfg: &RawConfigFile) -> Result<()> {
    ensure_command("info_command", &cfg.workspace.info_command)?;
    ensure_command("script_command", &cfg.workspace.script_command)?;

    if !cfg
        .workspace
        .script_command
        .iter()
        .any(|arg| arg.contains(SCRIPT_PLACEHOLDER))
    {
        return Err(WsrunError::ConfigError(format!(
            "[workspace].script_command must reference the script via {SCRIPT_PLACEHOLDER}"
        )));
    }

    if cfg.workspace.manifest.trim().is_empty() {
        return Err(WsrunError::ConfigError(
            "[workspace].manifest must not be empty".to_string(),
        ));
    }

    Ok(())
}

fn ensure_command(key: &str, command: &[String]) -> Result<()> {
    match command.first() {
        Some(program) if !program.trim().is_empty() => Ok(()),
        _ => Err(WsrunError::ConfigError(format!(
            "[workspace].{key} must name a program to run"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn defaults_are_valid() {
        let cfg = ConfigFile::try_from(RawConfigFile::default()).unwrap();
        assert_eq!(cfg.stagger, Duration::ZERO);
        assert_eq!(cfg.workspace.info_command[0], "yarn");
    }

    #[test]
    fn empty_info_command_is_rejected() {
        let mut raw = RawConfigFile::default();
        raw.workspace.info_command.clear();

        match ConfigFile::try_from(raw) {
            Err(WsrunError::ConfigError(msg)) => assert!(msg.contains("info_command")),
            other => panic!("expected ConfigError, got {other:?}"),
        }
    }

    #[test]
    fn script_command_without_placeholder_is_rejected() {
        let mut raw = RawConfigFile::default();
        raw.workspace.script_command = vec!["npm".into(), "run".into(), "build".into()];

        match ConfigFile::try_from(raw) {
            Err(WsrunError::ConfigError(msg)) => assert!(msg.contains("{script}")),
            other => panic!("expected ConfigError, got {other:?}"),
        }
    }

    #[test]
    fn bad_stagger_is_rejected() {
        let mut raw = RawConfigFile::default();
        raw.run.stagger = "soon".into();

        assert!(matches!(
            ConfigFile::try_from(raw),
            Err(WsrunError::ConfigError(_))
        ));
    }
}
