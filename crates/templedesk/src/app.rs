use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tagmark::TagKind;

use crate::auth::{Authenticator, DemoAuthenticator, Session};
use crate::command_processor::CommandProcessor;
use crate::config::Config;
use crate::content::{Board, Event, Notice, Notification, Popup};
use crate::content_editor::{ContentEditor, EditorTab};
use crate::notifications::ToastQueue;
use crate::session_store::SessionStore;
use crate::temple_page::{TemplePage, TempleSection};
use crate::templestay::{self, Reservation, TemplestayProgram};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Insert,
    Command,
    Help,
}

/// What a save stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Saved {
    /// The free page body, with its length in chars.
    Page(usize),
    Section(TempleSection),
}

impl Saved {
    pub fn message(&self) -> String {
        match self {
            Saved::Page(chars) => format!("저장되었습니다 ({}자)", chars),
            Saved::Section(_) => "내용이 저장되었습니다.".to_string(),
        }
    }
}

pub struct App {
    pub content: ContentEditor,
    pub config: Config,
    pub toasts: ToastQueue,
    pub mode: Mode,
    pub command_buffer: String,
    pub session: Option<Session>,
    pub session_store: SessionStore,
    pub authenticator: Box<dyn Authenticator + Send + Sync>,
    /// Content as of the last save.
    pub committed: String,
    pub notices: Board<Notice>,
    pub events: Board<Event>,
    pub popups: Board<Popup>,
    pub sent_notifications: Vec<Notification>,
    pub temple: TemplePage,
    pub programs: Board<TemplestayProgram>,
    pub reservations: Board<Reservation>,
    /// First buffer line shown in the edit pane.
    pub scroll_offset: usize,
    should_quit: bool,
}

impl App {
    pub async fn new() -> Result<Self> {
        let config = Config::load().await?;
        let session_store = SessionStore::new()?;
        let session = match session_store.load().await {
            Ok(session) => session,
            Err(e) => {
                log::warn!("Failed to restore session: {}", e);
                None
            }
        };
        Ok(Self::with(config, session_store, session, ""))
    }

    /// Build an app from already-loaded parts.
    pub fn with(
        config: Config,
        session_store: SessionStore,
        session: Option<Session>,
        initial: &str,
    ) -> Self {
        let authenticator = Box::new(DemoAuthenticator::new(&config.auth));
        let mut content = ContentEditor::new(initial, &config);
        content.editor_mut().focus();
        Self {
            content,
            config,
            toasts: ToastQueue::new(),
            mode: Mode::Insert,
            command_buffer: String::new(),
            session,
            session_store,
            authenticator,
            committed: initial.to_string(),
            notices: Board::new(),
            events: Board::new(),
            popups: Board::new(),
            sent_notifications: Vec::new(),
            temple: TemplePage::new(),
            programs: templestay::seeded_programs(),
            reservations: templestay::seeded_reservations(),
            scroll_offset: 0,
            should_quit: false,
        }
    }

    /// Replace the buffer with `content` as the page's stored value.
    pub fn load_content(&mut self, content: &str) {
        self.content.editor_mut().load(content);
        self.content.editor_mut().focus();
        self.committed = content.to_string();
    }

    pub fn is_modified(&self) -> bool {
        self.content.is_modified()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn update_status(&mut self) {
        self.toasts.prune();
    }

    pub async fn handle_key_event(&mut self, key: KeyEvent) -> Result<()> {
        match self.mode {
            Mode::Insert => self.handle_insert_key(key),
            Mode::Normal => self.handle_normal_key(key),
            Mode::Command => self.handle_command_key(key).await?,
            Mode::Help => self.mode = Mode::Normal,
        }
        Ok(())
    }

    fn handle_insert_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            self.handle_shortcut(key.code);
            return;
        }

        let extend = key.modifiers.contains(KeyModifiers::SHIFT);
        match key.code {
            KeyCode::Esc => self.mode = Mode::Normal,
            KeyCode::Left => self.content.editor_mut().move_cursor_left(extend),
            KeyCode::Right => self.content.editor_mut().move_cursor_right(extend),
            KeyCode::Up => self.content.editor_mut().move_cursor_up(extend),
            KeyCode::Down => self.content.editor_mut().move_cursor_down(extend),
            KeyCode::Home => self.content.editor_mut().move_to_line_start(),
            KeyCode::End => self.content.editor_mut().move_to_line_end(),
            KeyCode::Backspace => {
                self.back_to_edit();
                self.content.editor_mut().delete_char_backward();
            }
            KeyCode::Delete => {
                self.back_to_edit();
                self.content.editor_mut().delete_char_forward();
            }
            KeyCode::Enter => {
                self.back_to_edit();
                self.content.editor_mut().insert_newline();
            }
            KeyCode::Tab => {
                self.back_to_edit();
                let indent = " ".repeat(self.config.editor.tab_size);
                self.content.editor_mut().insert_at_caret(&indent);
            }
            KeyCode::Char(c) => {
                self.back_to_edit();
                self.content.editor_mut().insert_char(c);
            }
            _ => {}
        }
    }

    fn handle_shortcut(&mut self, code: KeyCode) {
        let tag = match code {
            KeyCode::Char('b') => Some(TagKind::Bold),
            KeyCode::Char('t') => Some(TagKind::Italic),
            KeyCode::Char('l') => Some(TagKind::List),
            KeyCode::Char('k') => Some(TagKind::Link),
            KeyCode::Char('g') => Some(TagKind::Image),
            KeyCode::Char('f') => Some(TagKind::File),
            _ => None,
        };
        if let Some(kind) = tag {
            self.content.apply_tag(kind);
            return;
        }

        match code {
            KeyCode::Char('s') => match self.save() {
                Ok(saved) => self.toasts.success(saved.message()),
                Err(e) => self.toasts.error(e.to_string()),
            },
            KeyCode::Char('p') => self.toggle_preview(),
            KeyCode::Char('z') => self.undo(),
            KeyCode::Char('y') => self.redo(),
            KeyCode::Char('a') => self.content.editor_mut().select_all(),
            _ => {}
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char(':') => {
                self.command_buffer.clear();
                self.mode = Mode::Command;
            }
            KeyCode::Char('i') => {
                self.back_to_edit();
                self.mode = Mode::Insert;
            }
            KeyCode::Char('p') => self.toggle_preview(),
            KeyCode::Char('e') => self.content.set_tab(EditorTab::Edit),
            KeyCode::Char('u') => self.undo(),
            KeyCode::Char('q') => {
                if self.is_modified() {
                    self.toasts
                        .warning("저장하지 않은 변경 사항이 있습니다 (:q! 로 강제 종료)");
                } else {
                    self.quit();
                }
            }
            KeyCode::Char('?') => self.mode = Mode::Help,
            KeyCode::Char('h') | KeyCode::Left => self.content.editor_mut().move_cursor_left(false),
            KeyCode::Char('l') | KeyCode::Right => {
                self.content.editor_mut().move_cursor_right(false)
            }
            KeyCode::Char('k') | KeyCode::Up => self.content.editor_mut().move_cursor_up(false),
            KeyCode::Char('j') | KeyCode::Down => self.content.editor_mut().move_cursor_down(false),
            KeyCode::Char('0') | KeyCode::Home => self.content.editor_mut().move_to_line_start(),
            KeyCode::Char('$') | KeyCode::End => self.content.editor_mut().move_to_line_end(),
            _ => {}
        }
    }

    async fn handle_command_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Esc => {
                self.command_buffer.clear();
                self.mode = Mode::Normal;
            }
            KeyCode::Enter => {
                let command = std::mem::take(&mut self.command_buffer);
                self.mode = Mode::Normal;
                match CommandProcessor::new().execute(&command, self).await {
                    Ok(message) if message.is_empty() => {}
                    Ok(message) => self.toasts.info(message),
                    Err(e) => self.toasts.error(e.to_string()),
                }
            }
            KeyCode::Backspace => {
                if self.command_buffer.pop().is_none() {
                    self.mode = Mode::Normal;
                }
            }
            KeyCode::Char(c) => self.command_buffer.push(c),
            _ => {}
        }
        Ok(())
    }

    /// Commit the buffer. Requires an editor session.
    ///
    /// With a temple section open the buffer goes into that section, the
    /// section closes and the page body comes back into the editor.
    /// Otherwise the buffer becomes the page body.
    pub fn save(&mut self) -> Result<Saved> {
        match &self.session {
            Some(session) if session.can_edit() => {}
            Some(_) => return Err(anyhow::anyhow!("편집 권한이 없습니다")),
            None => return Err(anyhow::anyhow!("로그인이 필요합니다 (:login <사용자> <비밀번호>)")),
        }

        if self.temple.editing().is_some() {
            let mut text = String::new();
            self.content.save(|saved| text = saved);
            if let Some(section) = self.temple.commit(text) {
                self.reopen_page_body();
                return Ok(Saved::Section(section));
            }
        }

        let committed = &mut self.committed;
        self.content.save(|text| *committed = text);
        let chars = self.committed.chars().count();
        log::info!("Committed {} chars", chars);
        Ok(Saved::Page(chars))
    }

    /// Load a temple section into the editor. Refused while the buffer has
    /// unsaved changes.
    pub fn open_section(&mut self, section: TempleSection) -> Result<()> {
        if self.is_modified() {
            return Err(anyhow::anyhow!("저장하지 않은 변경 사항이 있습니다"));
        }
        let text = self.temple.begin_edit(section).to_string();
        self.replace_buffer(&text);
        Ok(())
    }

    /// Drop the open section without saving and return to the page body.
    pub fn close_section(&mut self) -> Option<TempleSection> {
        let section = self.temple.editing()?;
        self.temple.cancel_edit();
        self.reopen_page_body();
        Some(section)
    }

    fn reopen_page_body(&mut self) {
        let body = self.committed.clone();
        self.replace_buffer(&body);
    }

    fn replace_buffer(&mut self, text: &str) {
        self.content.editor_mut().load(text);
        self.content.editor_mut().focus();
        self.content.set_tab(EditorTab::Edit);
        self.scroll_offset = 0;
    }

    pub fn toggle_preview(&mut self) {
        match self.content.tab() {
            EditorTab::Edit => {
                self.content.preview();
            }
            EditorTab::Preview => self.content.set_tab(EditorTab::Edit),
        }
    }

    pub fn undo(&mut self) {
        if !self.content.editor_mut().undo() {
            self.toasts.info("더 이상 되돌릴 수 없습니다");
        }
    }

    pub fn redo(&mut self) {
        if !self.content.editor_mut().redo() {
            self.toasts.info("다시 실행할 내용이 없습니다");
        }
    }

    fn back_to_edit(&mut self) {
        if self.content.tab() == EditorTab::Preview {
            self.content.set_tab(EditorTab::Edit);
        }
    }
}
