//! Credential checking and the signed-in session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::config::AuthConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Editor,
    Viewer,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Admin => "admin",
            Role::Editor => "editor",
            Role::Viewer => "viewer",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TempleMembership {
    pub id: String,
    pub name: String,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub temple: TempleMembership,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user: User,
    pub signed_in_at: DateTime<Utc>,
}

impl Session {
    pub fn can_edit(&self) -> bool {
        matches!(self.user.temple.role, Role::Admin | Role::Editor)
    }
}

pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

// Keep the password out of logs and panics.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("사용자 이름을 입력해주세요.")]
    EmptyUsername,
    #[error("사용자 이름 또는 비밀번호가 올바르지 않습니다.")]
    InvalidCredentials,
}

pub trait Authenticator {
    fn authenticate(&self, credentials: &Credentials) -> Result<Session, AuthError>;
}

/// Accepts any username together with one shared password.
pub struct DemoAuthenticator {
    password: String,
    temple_id: String,
    temple_name: String,
    require_username: bool,
}

impl DemoAuthenticator {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            password: config.demo_password.clone(),
            temple_id: config.temple_id.clone(),
            temple_name: config.temple_name.clone(),
            require_username: config.require_username,
        }
    }
}

impl Authenticator for DemoAuthenticator {
    fn authenticate(&self, credentials: &Credentials) -> Result<Session, AuthError> {
        let username = credentials.username.trim();
        if self.require_username && username.is_empty() {
            return Err(AuthError::EmptyUsername);
        }
        if credentials.password != self.password {
            log::info!("Rejected sign-in for '{}'", username);
            return Err(AuthError::InvalidCredentials);
        }

        log::info!("Signed in '{}'", username);
        Ok(Session {
            user: User {
                id: String::from("1"),
                username: username.to_string(),
                temple: TempleMembership {
                    id: self.temple_id.clone(),
                    name: self.temple_name.clone(),
                    role: Role::Admin,
                },
            },
            signed_in_at: Utc::now(),
        })
    }
}
