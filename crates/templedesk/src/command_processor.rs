use anyhow::Result;
use chrono::Local;
use std::path::PathBuf;
use tagmark::TagKind;

use crate::app::App;
use crate::auth::Credentials;
use crate::content::{
    parse_date, parse_time, Event, EventKind, Notice, NoticeCategory, Notification, Popup, Upsert,
};
use crate::content_editor::EditorTab;
use crate::image_upload::{SelectedFile, UploadOutcome};
use crate::temple_page::{TempleSection, INFO_CARDS};
use crate::templestay::{ProgramStatus, ReservationStatus};

pub struct CommandProcessor;

impl Default for CommandProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandProcessor {
    pub fn new() -> Self {
        Self
    }

    /// Run one `:` command against `app`, returning the status text to show.
    pub async fn execute(&self, command: &str, app: &mut App) -> Result<String> {
        let cmd = command.trim();
        let (name, rest) = match cmd.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (cmd, ""),
        };

        match name {
            "" => Ok(String::new()),
            "w" | "save" => Ok(app.save()?.message()),
            "q" => {
                if app.is_modified() {
                    Ok("저장하지 않은 변경 사항이 있습니다 (:q! 로 강제 종료)".to_string())
                } else {
                    app.quit();
                    Ok(String::new())
                }
            }
            "q!" => {
                app.quit();
                Ok(String::new())
            }
            "wq" => {
                app.save()?;
                app.quit();
                Ok(String::new())
            }
            "preview" | "p" => {
                app.content.preview();
                Ok(String::new())
            }
            "edit" | "e" => {
                app.content.set_tab(EditorTab::Edit);
                Ok(String::new())
            }
            "undo" | "u" => {
                app.undo();
                Ok(String::new())
            }
            "redo" => {
                app.redo();
                Ok(String::new())
            }
            "attach" => self.attach(rest, app).await,
            "login" => self.login(rest, app).await,
            "logout" => {
                app.session_store.clear().await?;
                match app.session.take() {
                    Some(session) => {
                        log::info!("Signed out '{}'", session.user.username);
                        Ok("로그아웃되었습니다".to_string())
                    }
                    None => Ok("로그인되어 있지 않습니다".to_string()),
                }
            }
            "whoami" => Ok(match &app.session {
                Some(session) => format!(
                    "{} ({}, {})",
                    session.user.username, session.user.temple.name, session.user.temple.role
                ),
                None => "로그인되어 있지 않습니다".to_string(),
            }),
            "notice" => self.post_notice(rest, NoticeCategory::Notice, app),
            "faq" => self.post_notice(rest, NoticeCategory::Faq, app),
            "event" => self.post_event(rest, EventKind::Event, app),
            "dharma" => self.post_event(rest, EventKind::Dharma, app),
            "popup" => {
                self.author(app)?;
                let id = app.popups.next_id();
                self.store_popup(id, rest, app)
            }
            "popup-edit" => {
                self.author(app)?;
                let (id, args) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                if app.popups.get(id).is_none() {
                    return Err(anyhow::anyhow!("팝업을 찾을 수 없습니다: {}", id));
                }
                self.store_popup(id.to_string(), args.trim(), app)
            }
            "popup-toggle" => match app.popups.toggle_active(rest) {
                Some(true) => Ok(format!("팝업 {} 활성화", rest)),
                Some(false) => Ok(format!("팝업 {} 비활성화", rest)),
                None => Err(anyhow::anyhow!("팝업을 찾을 수 없습니다: {}", rest)),
            },
            "notice-remove" => {
                self.author(app)?;
                removed(app.notices.remove(rest), "게시글", rest)
            }
            "event-remove" => {
                self.author(app)?;
                removed(app.events.remove(rest), "일정", rest)
            }
            "popup-remove" => {
                self.author(app)?;
                removed(app.popups.remove(rest), "팝업", rest)
            }
            "notify" => self.send_notification(rest, app),
            "section" => self.section(rest, app),
            "info" => Ok(INFO_CARDS
                .iter()
                .map(|(title, lines)| format!("{}: {}", title, lines.join(", ")))
                .collect::<Vec<_>>()
                .join(" | ")),
            "programs" => Ok(app
                .programs
                .iter()
                .map(|program| {
                    let status = match program.status {
                        ProgramStatus::Active => "운영",
                        ProgramStatus::Inactive => "중단",
                    };
                    format!(
                        "{} {} ({}, {}, {}명, {})",
                        program.id,
                        program.name,
                        program.duration,
                        program.price,
                        program.capacity,
                        status
                    )
                })
                .collect::<Vec<_>>()
                .join(" | ")),
            "program-toggle" => {
                self.author(app)?;
                match app.programs.toggle_status(rest) {
                    Some(ProgramStatus::Active) => Ok(format!("프로그램 {} 운영", rest)),
                    Some(ProgramStatus::Inactive) => Ok(format!("프로그램 {} 운영 중단", rest)),
                    None => Err(anyhow::anyhow!("프로그램을 찾을 수 없습니다: {}", rest)),
                }
            }
            "reservations" => Ok([
                ReservationStatus::Confirmed,
                ReservationStatus::Pending,
                ReservationStatus::Cancelled,
            ]
            .iter()
            .map(|&status| format!("{} {}건", status.label(), app.reservations.count_with(status)))
            .collect::<Vec<_>>()
            .join(", ")),
            "reservation" => self.set_reservation(rest, app),
            "help" | "h" => {
                app.mode = crate::app::Mode::Help;
                Ok(String::new())
            }
            other => match TagKind::from_name(other) {
                Some(kind) => {
                    app.content.apply_tag(kind);
                    Ok(String::new())
                }
                None => Err(anyhow::anyhow!("알 수 없는 명령입니다: {}", other)),
            },
        }
    }

    async fn attach(&self, path: &str, app: &mut App) -> Result<String> {
        if path.is_empty() {
            return Err(anyhow::anyhow!("사용법: attach <경로>"));
        }
        let file = SelectedFile::from_path(&PathBuf::from(path)).await?;
        let name = file.name.clone();
        match app.content.attach_file(file).await {
            UploadOutcome::Uploaded(_) => Ok(format!("이미지를 첨부했습니다: {}", name)),
            UploadOutcome::Rejected(reason) => Err(reason.into()),
        }
    }

    async fn login(&self, args: &str, app: &mut App) -> Result<String> {
        let (username, password) = args
            .split_once(char::is_whitespace)
            .map(|(user, pass)| (user, pass.trim()))
            .unwrap_or((args, ""));
        let session = app
            .authenticator
            .authenticate(&Credentials::new(username, password))?;
        app.session_store.save(&session).await?;
        let message = format!(
            "{}님 환영합니다 ({})",
            session.user.username, session.user.temple.name
        );
        app.session = Some(session);
        Ok(message)
    }

    fn author(&self, app: &App) -> Result<String> {
        match &app.session {
            Some(session) if session.can_edit() => Ok(session.user.username.clone()),
            Some(_) => Err(anyhow::anyhow!("편집 권한이 없습니다")),
            None => Err(anyhow::anyhow!("로그인이 필요합니다 (:login <사용자> <비밀번호>)")),
        }
    }

    fn post_notice(&self, title: &str, category: NoticeCategory, app: &mut App) -> Result<String> {
        let author = self.author(app)?;
        let notice = Notice {
            id: app.notices.next_id(),
            title: title.to_string(),
            content: app.committed.clone(),
            date: Local::now().date_naive(),
            author,
            views: 0,
            category,
        };
        let id = notice.id.clone();
        app.notices.upsert(notice)?;
        Ok(format!("게시글 {}을(를) 등록했습니다", id))
    }

    /// `event <YYYY-MM-DD> <HH:MM|-> <title>`
    fn post_event(&self, args: &str, kind: EventKind, app: &mut App) -> Result<String> {
        self.author(app)?;
        let mut parts = args.splitn(3, char::is_whitespace);
        let date = parse_date(parts.next().unwrap_or(""))?;
        let time = match parts.next().unwrap_or("") {
            "-" => None,
            value => parse_time(value)?,
        };
        let event = Event {
            id: app.events.next_id(),
            title: parts.next().unwrap_or("").trim().to_string(),
            date,
            time,
            description: app.committed.clone(),
            image_url: None,
            kind,
        };
        let id = event.id.clone();
        app.events.upsert(event)?;
        Ok(format!("일정 {}을(를) 등록했습니다", id))
    }

    /// `<start> <end> <title>` stored under `id`. An edited popup keeps its
    /// `active` flag.
    fn store_popup(&self, id: String, args: &str, app: &mut App) -> Result<String> {
        let mut parts = args.splitn(3, char::is_whitespace);
        let start_date = parse_date(parts.next().unwrap_or(""))?;
        let end_date = parse_date(parts.next().unwrap_or(""))?;
        let active = app.popups.get(&id).map_or(true, |existing| existing.active);
        let popup = Popup {
            title: parts.next().unwrap_or("").trim().to_string(),
            content: app.committed.clone(),
            start_date,
            end_date,
            active,
            ..Popup::draft(id.clone(), Local::now().date_naive())
        };
        match app.popups.upsert(popup)? {
            Upsert::Created => Ok(format!("팝업 {}을(를) 등록했습니다", id)),
            Upsert::Updated => Ok(format!("팝업 {}을(를) 수정했습니다", id)),
        }
    }

    fn send_notification(&self, title: &str, app: &mut App) -> Result<String> {
        self.author(app)?;
        let notification = Notification {
            title: title.to_string(),
            content: app.committed.clone(),
            audience: Default::default(),
        };
        notification.validate()?;
        log::info!("Sent notification '{}'", notification.title);
        app.sent_notifications.push(notification);
        Ok("알림을 발송했습니다".to_string())
    }

    /// `section` lists, `section <key>` opens, `section close` discards.
    fn section(&self, arg: &str, app: &mut App) -> Result<String> {
        match arg {
            "" => {
                let listed: Vec<String> = TempleSection::ALL
                    .iter()
                    .map(|section| format!("{} ({})", section.key(), section.title()))
                    .collect();
                Ok(match app.temple.editing() {
                    Some(section) => format!("{} 편집 중 | {}", section.title(), listed.join(", ")),
                    None => listed.join(", "),
                })
            }
            "close" => match app.close_section() {
                Some(section) => Ok(format!("{} 편집을 취소했습니다", section.title())),
                None => Ok("편집 중인 항목이 없습니다".to_string()),
            },
            key => {
                let section = TempleSection::from_key(key)
                    .ok_or_else(|| anyhow::anyhow!("알 수 없는 항목입니다: {}", key))?;
                app.open_section(section)?;
                Ok(format!("{} 편집", section.title()))
            }
        }
    }

    /// `reservation <id> <confirm|pending|cancel>`
    fn set_reservation(&self, args: &str, app: &mut App) -> Result<String> {
        self.author(app)?;
        let (id, status) = args.split_once(char::is_whitespace).unwrap_or((args, ""));
        let status = ReservationStatus::from_name(status.trim())
            .ok_or_else(|| anyhow::anyhow!("사용법: reservation <id> <confirm|pending|cancel>"))?;
        match app.reservations.set_status(id, status) {
            Some(status) => Ok(format!("예약 {}: {}", id, status.label())),
            None => Err(anyhow::anyhow!("예약을 찾을 수 없습니다: {}", id)),
        }
    }
}

fn removed<T>(item: Option<T>, label: &str, id: &str) -> Result<String> {
    match item {
        Some(_) => Ok(format!("{} {}을(를) 삭제했습니다", label, id)),
        None => Err(anyhow::anyhow!("{}을(를) 찾을 수 없습니다: {}", label, id)),
    }
}
