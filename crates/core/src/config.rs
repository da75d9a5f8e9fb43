use crate::session::PausePolicy;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_STORY_PAGES: u32 = 50;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub launcher: LauncherConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LauncherConfig {
    pub interpreter: String,
    pub version_args: Vec<String>,
    pub runner_script: String,
    pub system_module: String,
    pub generator_module: String,
    pub stories_dir: PathBuf,
    pub story_extension: String,
    pub default_pages: u32,
    pub pause_on_exit: PausePolicy,
    pub suppress_console_window: bool,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            interpreter: "node".to_string(),
            version_args: vec!["--version".to_string()],
            runner_script: "run_story.js".to_string(),
            system_module: "StorySystem.js".to_string(),
            generator_module: "StoryGenerator.js".to_string(),
            stories_dir: PathBuf::from("stories"),
            story_extension: "json".to_string(),
            default_pages: DEFAULT_STORY_PAGES,
            pause_on_exit: PausePolicy::Auto,
            suppress_console_window: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub config_dir: PathBuf,
    pub config_path: PathBuf,
}

pub fn app_paths() -> Result<AppPaths> {
    let proj = ProjectDirs::from("com", "storyrun", "storyrun")
        .context("could not determine the OS config directory")?;
    let config_dir = proj.config_dir().to_path_buf();
    Ok(AppPaths {
        config_path: config_dir.join("config.toml"),
        config_dir,
    })
}

/// Path given on the command line wins over the OS default location.
pub fn resolve_config_path(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => Ok(app_paths()?.config_path),
    }
}

pub fn load_config(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(AppConfig::default());
    }

    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;

    let config = toml::from_str::<AppConfig>(&raw)
        .with_context(|| format!("failed to parse config file: {}", path.display()))?;
    Ok(config)
}

pub fn save_config(path: &Path, config: &AppConfig) -> Result<()> {
    if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create config directory: {}", dir.display()))?;
    }
    let body = toml::to_string_pretty(config).context("failed to serialize config")?;
    fs::write(path, body)
        .with_context(|| format!("failed to write config file: {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{load_config, save_config, AppConfig, DEFAULT_STORY_PAGES};
    use crate::session::PausePolicy;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let temp = tempdir().expect("tempdir");
        let config = load_config(&temp.path().join("absent.toml")).expect("load");
        assert_eq!(config.launcher.interpreter, "node");
        assert_eq!(config.launcher.default_pages, DEFAULT_STORY_PAGES);
        assert_eq!(config.launcher.pause_on_exit, PausePolicy::Auto);
    }

    #[test]
    fn partial_file_fills_remaining_fields() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            "[launcher]\ninterpreter = \"deno\"\npause_on_exit = \"never\"\n",
        )
        .expect("write config");

        let config = load_config(&path).expect("load");
        assert_eq!(config.launcher.interpreter, "deno");
        assert_eq!(config.launcher.pause_on_exit, PausePolicy::Never);
        assert_eq!(config.launcher.runner_script, "run_story.js");
    }

    #[test]
    fn save_then_load_preserves_values() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("nested").join("config.toml");
        let mut config = AppConfig::default();
        config.launcher.default_pages = 12;

        save_config(&path, &config).expect("save");
        let loaded = load_config(&path).expect("load");
        assert_eq!(loaded.launcher.default_pages, 12);
    }

    #[test]
    fn broken_file_reports_path() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(&path, "[launcher\n").expect("write config");

        let err = load_config(&path).expect_err("parse should fail");
        assert!(err.to_string().contains("failed to parse config file"));
    }
}
