// Templedesk library exports

pub mod app;
pub mod auth;
pub mod command_processor;
pub mod config;
pub mod content;
pub mod content_editor;
pub mod editor;
pub mod image_upload;
pub mod notifications;
pub mod session_store;
pub mod temple_page;
pub mod templestay;
pub mod ui;

#[cfg(test)]
mod test_support;

pub use app::{App, Mode, Saved};
pub use auth::{AuthError, Authenticator, DemoAuthenticator, Session};
pub use config::Config;
pub use content_editor::{ContentEditor, EditorTab};
pub use editor::Editor;
pub use image_upload::{ImageUploader, SelectedFile, UploadOutcome};
pub use session_store::SessionStore;
