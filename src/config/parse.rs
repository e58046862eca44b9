//! Settings file parsing and discovery

use crate::config::types::Settings;
use crate::error::{ConfigError, ConfigResult, TaskmarkError};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

/// Settings file names to search for
const CONFIG_FILE_NAMES: &[&str] = &["taskmark.yml", "taskmark.yaml"];

/// File name inside the user's config directory
const USER_CONFIG_FILE: &str = "config.yml";

/// Find a settings file by searching `start_dir` and its parents
pub fn find_config_file_from(start_dir: PathBuf) -> Option<PathBuf> {
    let mut current_dir = start_dir;

    loop {
        for file_name in CONFIG_FILE_NAMES {
            let config_path = current_dir.join(file_name);
            if config_path.is_file() {
                return Some(config_path);
            }
        }

        match current_dir.parent() {
            Some(parent) => current_dir = parent.to_path_buf(),
            None => return None,
        }
    }
}

/// Location of the per-user settings file
pub fn user_config_file() -> Option<PathBuf> {
    ProjectDirs::from("", "", "taskmark").map(|dirs| dirs.config_dir().join(USER_CONFIG_FILE))
}

/// Parse a settings file; a relative `base-dir` is resolved against its directory
pub fn parse_settings_file(path: &Path) -> Result<Settings, TaskmarkError> {
    let contents = fs::read_to_string(path).map_err(|e| {
        ConfigError::Invalid(format!("Failed to read {}: {}", path.display(), e))
    })?;

    let mut settings = parse_settings(&contents)?;

    if let Some(base_dir) = settings.base_dir.take() {
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        settings.base_dir = Some(dir.join(base_dir));
    }

    Ok(settings)
}

/// Parse settings from a string
pub fn parse_settings(yaml: &str) -> Result<Settings, TaskmarkError> {
    if yaml.trim().is_empty() {
        return Ok(Settings::default());
    }
    Ok(serde_yaml::from_str(yaml)?)
}

/// Load the layered settings for a script
///
/// The user file is read first, then either `explicit` or the nearest
/// project file above `script_dir`.
pub fn load_settings(explicit: Option<&Path>, script_dir: &Path) -> Result<Settings, TaskmarkError> {
    let mut settings = Settings::default();

    if let Some(user_file) = user_config_file().filter(|p| p.is_file()) {
        settings = settings.merge(parse_settings_file(&user_file)?);
    }

    let project_file = match explicit {
        Some(path) if !path.is_file() => {
            return Err(ConfigError::Invalid(format!(
                "Settings file {} does not exist",
                path.display()
            ))
            .into())
        }
        Some(path) => Some(path.to_path_buf()),
        None => find_config_file_from(script_dir.to_path_buf()),
    };

    if let Some(path) = project_file {
        settings = settings.merge(parse_settings_file(&path)?);
    }

    Ok(settings)
}

/// Interpreter override from an environment value such as `bash -eu -c`
pub fn interpreter_from_env(value: &str) -> ConfigResult<Vec<String>> {
    shlex::split(value)
        .filter(|words| !words.is_empty())
        .ok_or_else(|| ConfigError::Invalid(format!("Invalid interpreter '{}'", value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_parse_empty_settings() {
        assert_eq!(parse_settings("").unwrap(), Settings::default());
        assert_eq!(parse_settings("\n  \n").unwrap(), Settings::default());
    }

    #[test]
    fn test_find_config_in_current_dir() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("taskmark.yml");
        fs::write(&config_path, "dry-run: true\n").unwrap();

        let found = find_config_file_from(temp_dir.path().to_path_buf());
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_find_config_in_parent_dir() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("taskmark.yaml");
        let sub_dir = temp_dir.path().join("subdir");

        fs::create_dir(&sub_dir).unwrap();
        fs::write(&config_path, "ask: true\n").unwrap();

        let found = find_config_file_from(sub_dir);
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_base_dir_relative_to_settings_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("taskmark.yml");
        fs::write(&config_path, "base-dir: work\n").unwrap();

        let settings = parse_settings_file(&config_path).unwrap();
        assert_eq!(settings.base_dir, Some(temp_dir.path().join("work")));
    }

    #[test]
    fn test_explicit_settings_file_must_exist() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.yml");
        let result = load_settings(Some(&missing), temp_dir.path());
        assert!(matches!(
            result,
            Err(TaskmarkError::Config(ConfigError::Invalid(_)))
        ));
    }

    #[test]
    fn test_invalid_yaml() {
        let result = parse_settings("dry-run: [not a bool");
        assert!(matches!(result, Err(TaskmarkError::Yaml(_))));
    }

    #[test]
    fn test_interpreter_from_env() {
        assert_eq!(
            interpreter_from_env("bash -eu -c").unwrap(),
            vec!["bash", "-eu", "-c"]
        );
        assert!(interpreter_from_env("  ").is_err());
        assert!(interpreter_from_env("'unclosed").is_err());
    }
}
