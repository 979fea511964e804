//! 로그인 세션을 JSON 파일로 저장하고 복원하는 모듈.
//!
//! The store is created once and handed to the app; nothing else reads the
//! session file.

use anyhow::Result;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::fs::try_exists;

use crate::auth::Session;

const SESSION_FILE: &str = "session.json";

pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new() -> Result<Self> {
        Ok(Self::at(Self::data_dir()?))
    }

    /// Store rooted at `dir`.
    pub fn at(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(SESSION_FILE),
        }
    }

    fn data_dir() -> Result<PathBuf> {
        if let Ok(dir) = std::env::var("TEMPLEDESK_DATA_DIR") {
            return Ok(PathBuf::from(dir));
        }
        let dirs = directories::ProjectDirs::from("com", "templedesk", "templedesk")
            .ok_or_else(|| anyhow::anyhow!("데이터 디렉터리를 찾을 수 없습니다"))?;
        Ok(dirs.data_dir().to_path_buf())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The saved session, if any. A corrupt file is removed and treated as absent.
    pub async fn load(&self) -> Result<Option<Session>> {
        if !try_exists(&self.path).await? {
            return Ok(None);
        }

        let json = fs::read_to_string(&self.path).await?;
        match serde_json::from_str::<Session>(&json) {
            Ok(session) => {
                log::info!("Restored session for '{}'", session.user.username);
                Ok(Some(session))
            }
            Err(e) => {
                log::error!("Failed to parse stored session: {}", e);
                if let Err(e) = fs::remove_file(&self.path).await {
                    log::warn!("Failed to remove broken session file: {}", e);
                }
                Ok(None)
            }
        }
    }

    pub async fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(session)?;
        fs::write(&self.path, json).await?;
        log::debug!("Saved session to {}", self.path.display());
        Ok(())
    }

    /// Forget the saved session. Succeeds when there is none.
    pub async fn clear(&self) -> Result<()> {
        if try_exists(&self.path).await? {
            fs::remove_file(&self.path).await?;
            log::info!("Cleared stored session");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Authenticator, Credentials, DemoAuthenticator};
    use crate::config::Config;
    use crate::test_support::{env_lock, EnvGuard};
    use tempfile::TempDir;

    fn session() -> Session {
        DemoAuthenticator::new(&Config::default().auth)
            .authenticate(&Credentials::new("monk", "temple"))
            .unwrap()
    }

    #[tokio::test]
    async fn test_save_load_and_clear() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::at(dir.path());

        assert!(store.load().await.unwrap().is_none());

        let session = session();
        store.save(&session).await.unwrap();
        let loaded = store.load().await.unwrap().expect("session should load");
        assert_eq!(loaded, session);

        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_corrupt_session_is_discarded() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::at(dir.path());
        std::fs::write(store.path(), "{\"user\": 42").unwrap();

        assert!(store.load().await.unwrap().is_none());
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_data_dir_from_env() {
        let _lock = env_lock().lock().await;
        let dir = TempDir::new().unwrap();
        let _env = EnvGuard::set("TEMPLEDESK_DATA_DIR", dir.path());

        let store = SessionStore::new().unwrap();
        assert_eq!(store.path(), dir.path().join("session.json"));
    }
}
