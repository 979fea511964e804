use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs::try_exists;

use crate::editor::DEFAULT_HISTORY_LIMIT;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub theme: Theme,
    pub editor: EditorConfig,
    pub upload: UploadConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    #[serde(default)]
    pub accent_color: Option<String>,
    #[serde(default)]
    pub status_background: Option<String>,
    #[serde(default)]
    pub preview_foreground: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorConfig {
    pub history_limit: usize,
    pub tab_size: usize,
    /// Run the preview through the HTML sanitizer before display.
    pub sanitize_preview: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Simulated upload latency.
    pub delay_ms: u64,
    pub max_bytes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub demo_password: String,
    pub temple_id: String,
    pub temple_name: String,
    /// Reject sign-ins with a blank username. Off by default: any name is
    /// accepted with the demo password.
    #[serde(default)]
    pub require_username: bool,
}

pub const DEFAULT_UPLOAD_DELAY_MS: u64 = 1000;
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: Theme {
                name: String::from("dark"),
                accent_color: Some(String::from("#D4A373")),
                status_background: Some(String::from("#3E2C23")),
                preview_foreground: Some(String::from("#E9EDC9")),
            },
            editor: EditorConfig {
                history_limit: DEFAULT_HISTORY_LIMIT,
                tab_size: 4,
                sanitize_preview: true,
            },
            upload: UploadConfig {
                delay_ms: DEFAULT_UPLOAD_DELAY_MS,
                max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            },
            auth: AuthConfig {
                demo_password: String::from("temple"),
                temple_id: String::from("123"),
                temple_name: String::from("해인사"),
                require_username: false,
            },
        }
    }
}

impl Config {
    pub async fn load() -> Result<Self> {
        if let Some(config_path) = Self::config_path() {
            if try_exists(&config_path).await? {
                match tokio::fs::read_to_string(&config_path).await {
                    Ok(content) => {
                        if content.trim().is_empty() {
                            log::warn!("Config file is empty, creating new one");
                            let default_config = Self::default();
                            let _ = default_config.save().await;
                            return Ok(default_config);
                        }

                        match serde_json::from_str::<Self>(&content) {
                            Ok(mut config) => {
                                config.validate();
                                log::info!(
                                    "Successfully loaded config from: {}",
                                    config_path.display()
                                );
                                return Ok(config);
                            }
                            Err(json_err) => {
                                log::error!("Failed to parse config file: {}", json_err);

                                let backup_path = config_path.with_extension("bak");
                                if let Err(e) = tokio::fs::copy(&config_path, &backup_path).await {
                                    log::warn!("Failed to backup broken config: {}", e);
                                } else {
                                    log::info!(
                                        "Backed up broken config to: {}",
                                        backup_path.display()
                                    );
                                }

                                let default_config = Self::default();
                                let _ = default_config.save().await;
                                return Ok(default_config);
                            }
                        }
                    }
                    Err(io_err) => {
                        log::error!("Failed to read config file: {}", io_err);
                    }
                }
            } else {
                log::info!("Config file does not exist, creating default");
            }
        }

        let default_config = Self::default();
        let _ = default_config.save().await;
        Ok(default_config)
    }

    pub async fn save(&self) -> Result<()> {
        let Some(config_path) = Self::config_path() else {
            return Ok(());
        };

        let mut config_to_save = self.clone();
        config_to_save.validate();

        if let Some(parent) = config_path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                anyhow::anyhow!(
                    "설정 디렉터리를 만들 수 없습니다: {} - {}",
                    parent.display(),
                    e
                )
            })?;
        }

        let content = serde_json::to_string_pretty(&config_to_save)
            .map_err(|e| anyhow::anyhow!("설정을 직렬화할 수 없습니다: {}", e))?;
        tokio::fs::write(&config_path, content).await.map_err(|e| {
            anyhow::anyhow!(
                "설정 파일을 쓸 수 없습니다: {} - {}",
                config_path.display(),
                e
            )
        })?;
        log::info!("Successfully saved config to: {}", config_path.display());
        Ok(())
    }

    /// Replace out-of-range values with defaults. Returns whether anything changed.
    pub fn validate(&mut self) -> bool {
        let defaults = Self::default();
        let mut has_issues = false;

        if self.editor.history_limit == 0 || self.editor.history_limit > 10_000 {
            log::warn!(
                "Invalid history limit: {}, using default",
                self.editor.history_limit
            );
            self.editor.history_limit = defaults.editor.history_limit;
            has_issues = true;
        }

        if self.editor.tab_size == 0 || self.editor.tab_size > 16 {
            log::warn!("Invalid tab size: {}, using default", self.editor.tab_size);
            self.editor.tab_size = defaults.editor.tab_size;
            has_issues = true;
        }

        if self.upload.delay_ms > 60_000 {
            log::warn!("Upload delay {}ms too long, using default", self.upload.delay_ms);
            self.upload.delay_ms = defaults.upload.delay_ms;
            has_issues = true;
        }

        if self.upload.max_bytes == 0 {
            log::warn!("Upload size limit of zero, using default");
            self.upload.max_bytes = defaults.upload.max_bytes;
            has_issues = true;
        }

        if self.auth.demo_password.is_empty() {
            log::warn!("Empty demo password, using default");
            self.auth.demo_password = defaults.auth.demo_password;
            has_issues = true;
        }

        if self.theme.name.is_empty() {
            log::warn!("Empty theme name, using default");
            self.theme.name = defaults.theme.name;
            has_issues = true;
        }

        if has_issues {
            log::info!("Configuration validation completed with corrections");
        }
        has_issues
    }

    fn config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("TEMPLEDESK_CONFIG_PATH") {
            return Some(PathBuf::from(path));
        }

        if let Ok(dir) = std::env::var("TEMPLEDESK_CONFIG_DIR") {
            return Some(PathBuf::from(dir).join("config.json"));
        }

        ProjectDirs::from("com", "templedesk", "templedesk")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{env_lock, EnvGuard};
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.theme.name, "dark");
        assert_eq!(config.editor.history_limit, 100);
        assert!(config.editor.sanitize_preview);
        assert_eq!(config.upload.delay_ms, 1000);
        assert_eq!(config.upload.max_bytes, 10 * 1024 * 1024);
        assert_eq!(config.auth.demo_password, "temple");
        assert_eq!(config.auth.temple_name, "해인사");
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        assert!(json.contains("\"upload\""));
        assert!(json.contains("\"auth\""));

        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.upload.delay_ms, config.upload.delay_ms);
        assert_eq!(parsed.theme.accent_color, config.theme.accent_color);
    }

    #[test]
    fn test_validate_fixes_invalid_values() {
        let mut config = Config::default();
        config.editor.history_limit = 0;
        config.upload.max_bytes = 0;
        config.auth.demo_password.clear();

        assert!(config.validate());
        assert_eq!(config.editor.history_limit, 100);
        assert_eq!(config.upload.max_bytes, DEFAULT_MAX_UPLOAD_BYTES);
        assert_eq!(config.auth.demo_password, "temple");
        assert!(!config.validate());
    }

    #[tokio::test]
    async fn test_config_load_default() {
        let _lock = env_lock().lock().await;
        let temp_dir = TempDir::new().unwrap();
        let _env = EnvGuard::set("TEMPLEDESK_CONFIG_DIR", temp_dir.path());
        let _path = EnvGuard::unset("TEMPLEDESK_CONFIG_PATH");

        let config = Config::load().await.unwrap();
        assert_eq!(config.auth.demo_password, "temple");
        assert!(temp_dir.path().join("config.json").exists());
    }

    #[tokio::test]
    async fn test_broken_config_is_backed_up() {
        let _lock = env_lock().lock().await;
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("custom.json");
        std::fs::write(&path, "{ not json").unwrap();
        let _env = EnvGuard::set("TEMPLEDESK_CONFIG_PATH", &path);

        let config = Config::load().await.unwrap();
        assert_eq!(config.theme.name, "dark");
        assert!(path.with_extension("bak").exists());
    }
}
