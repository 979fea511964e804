//! In-memory content boards: notices, events, popups and push notifications.
//!
//! Bodies are raw tagged text edited with the content editor. Nothing here is
//! persisted; the boards are the authoritative copy while the app runs.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("모든 필수 항목을 입력해주세요: {0}")]
    MissingField(&'static str),
    #[error("날짜 형식이 올바르지 않습니다: {0}")]
    InvalidDate(String),
    #[error("시간 형식이 올바르지 않습니다: {0}")]
    InvalidTime(String),
    #[error("종료일은 시작일 이후여야 합니다.")]
    EndBeforeStart,
}

pub(crate) fn require(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(())
    }
}

/// Parse a `YYYY-MM-DD` form value. Blank input means "not set".
pub fn parse_date(input: &str) -> Result<Option<NaiveDate>, ValidationError> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| ValidationError::InvalidDate(input.to_string()))
}

/// Parse an `HH:MM` form value. Blank input means "not set".
pub fn parse_time(input: &str) -> Result<Option<NaiveTime>, ValidationError> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    NaiveTime::parse_from_str(input, "%H:%M")
        .map(Some)
        .map_err(|_| ValidationError::InvalidTime(input.to_string()))
}

pub trait Record {
    fn id(&self) -> &str;
    fn validate(&self) -> Result<(), ValidationError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeCategory {
    Notice,
    Faq,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub id: String,
    pub title: String,
    pub content: String,
    pub date: NaiveDate,
    pub author: String,
    pub views: u32,
    pub category: NoticeCategory,
}

impl Record for Notice {
    fn id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require(&self.title, "title")?;
        require(&self.content, "content")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Event,
    Dharma,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub description: String,
    pub image_url: Option<String>,
    pub kind: EventKind,
}

impl Record for Event {
    fn id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require(&self.title, "title")?;
        if self.date.is_none() {
            return Err(ValidationError::MissingField("date"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Popup {
    pub id: String,
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub show_once: bool,
    pub active: bool,
}

impl Popup {
    /// A blank active popup running for a week from `today`.
    pub fn draft(id: impl Into<String>, today: NaiveDate) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            content: String::new(),
            image_url: None,
            start_date: Some(today),
            end_date: today.checked_add_days(chrono::Days::new(7)),
            show_once: false,
            active: true,
        }
    }

    pub fn is_visible_on(&self, date: NaiveDate) -> bool {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => self.active && start <= date && date <= end,
            _ => false,
        }
    }
}

impl Record for Popup {
    fn id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require(&self.title, "title")?;
        require(&self.content, "content")?;
        let start = self
            .start_date
            .ok_or(ValidationError::MissingField("start_date"))?;
        let end = self
            .end_date
            .ok_or(ValidationError::MissingField("end_date"))?;
        if end < start {
            return Err(ValidationError::EndBeforeStart);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Audience {
    #[default]
    All,
    Donors,
    Volunteers,
    Visitors,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub content: String,
    pub audience: Audience,
}

impl Notification {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require(&self.title, "title")?;
        require(&self.content, "content")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Created,
    Updated,
}

/// Ordered collection of records keyed by id.
#[derive(Debug, Clone)]
pub struct Board<T> {
    items: Vec<T>,
}

impl<T: Record> Board<T> {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Validate and store `item`, replacing any record with the same id.
    pub fn upsert(&mut self, item: T) -> Result<Upsert, ValidationError> {
        item.validate()?;
        match self.items.iter().position(|existing| existing.id() == item.id()) {
            Some(index) => {
                self.items[index] = item;
                Ok(Upsert::Updated)
            }
            None => {
                self.items.push(item);
                Ok(Upsert::Created)
            }
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<T> {
        let index = self.items.iter().position(|item| item.id() == id)?;
        Some(self.items.remove(index))
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut T> {
        self.items.iter_mut().find(|item| item.id() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// One past the largest numeric id, so ids stay unique after removals.
    pub fn next_id(&self) -> String {
        let max = self
            .items
            .iter()
            .filter_map(|item| item.id().parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        (max + 1).to_string()
    }
}

impl<T: Record> Default for Board<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl Board<Notice> {
    pub fn in_category(&self, category: NoticeCategory) -> impl Iterator<Item = &Notice> {
        self.items.iter().filter(move |notice| notice.category == category)
    }
}

impl Board<Popup> {
    /// Flip `active`; returns the new value.
    pub fn toggle_active(&mut self, id: &str) -> Option<bool> {
        let popup = self.get_mut(id)?;
        popup.active = !popup.active;
        Some(popup.active)
    }

    pub fn visible_on(&self, date: NaiveDate) -> impl Iterator<Item = &Popup> {
        self.items.iter().filter(move |popup| popup.is_visible_on(date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        parse_date(s).unwrap().unwrap()
    }

    fn popup(id: &str) -> Popup {
        Popup {
            title: "봉축법요식 안내".into(),
            content: "[bold]초대합니다[/bold]".into(),
            ..Popup::draft(id, date("2024-05-15"))
        }
    }

    fn notice(id: &str, category: NoticeCategory) -> Notice {
        Notice {
            id: id.into(),
            title: "법회 일정".into(),
            content: "7월 법회".into(),
            date: date("2024-05-28"),
            author: "총무".into(),
            views: 0,
            category,
        }
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("").unwrap(), None);
        assert_eq!(
            parse_date("2024-06-01").unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 1)
        );
        assert_eq!(
            parse_date("06/01/2024"),
            Err(ValidationError::InvalidDate("06/01/2024".into()))
        );
    }

    #[test]
    fn test_parse_time() {
        assert_eq!(parse_time("09:30").unwrap(), NaiveTime::from_hms_opt(9, 30, 0));
        assert!(parse_time("9h").is_err());
    }

    #[test]
    fn test_popup_draft_runs_a_week() {
        let draft = Popup::draft("p1", date("2024-05-15"));
        assert_eq!(draft.end_date, Some(date("2024-05-22")));
        assert!(draft.active);
    }

    #[test]
    fn test_popup_requires_fields() {
        let mut p = popup("p1");
        p.title.clear();
        assert_eq!(p.validate(), Err(ValidationError::MissingField("title")));

        let mut p = popup("p1");
        p.end_date = None;
        assert_eq!(p.validate(), Err(ValidationError::MissingField("end_date")));
    }

    #[test]
    fn test_popup_end_before_start() {
        let mut p = popup("p1");
        p.end_date = Some(date("2024-05-01"));
        assert_eq!(p.validate(), Err(ValidationError::EndBeforeStart));
    }

    #[test]
    fn test_popup_same_day_is_valid() {
        let mut p = popup("p1");
        p.end_date = p.start_date;
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_board_upsert_and_remove() {
        let mut board = Board::new();
        assert_eq!(board.upsert(popup("p1")), Ok(Upsert::Created));

        let mut edited = popup("p1");
        edited.title = "수정됨".into();
        assert_eq!(board.upsert(edited), Ok(Upsert::Updated));
        assert_eq!(board.len(), 1);
        assert_eq!(board.get("p1").unwrap().title, "수정됨");

        assert!(board.remove("p1").is_some());
        assert!(board.remove("p1").is_none());
        assert!(board.is_empty());
    }

    #[test]
    fn test_next_id_skips_removed_ids() {
        let mut board = Board::new();
        assert_eq!(board.next_id(), "1");
        board.upsert(popup("1")).unwrap();
        board.upsert(popup("2")).unwrap();
        board.upsert(popup("draft")).unwrap();
        board.remove("1");
        assert_eq!(board.len(), 2);
        assert_eq!(board.next_id(), "3");
    }

    #[test]
    fn test_invalid_record_is_not_stored() {
        let mut board = Board::new();
        let mut p = popup("p1");
        p.content = "   ".into();
        assert!(board.upsert(p).is_err());
        assert!(board.is_empty());
    }

    #[test]
    fn test_toggle_and_visibility() {
        let mut board = Board::new();
        board.upsert(popup("p1")).unwrap();

        assert_eq!(board.visible_on(date("2024-05-20")).count(), 1);
        assert_eq!(board.visible_on(date("2024-06-20")).count(), 0);

        assert_eq!(board.toggle_active("p1"), Some(false));
        assert_eq!(board.visible_on(date("2024-05-20")).count(), 0);
        assert_eq!(board.toggle_active("missing"), None);
    }

    #[test]
    fn test_event_requires_title_and_date() {
        let mut event = Event {
            id: "e1".into(),
            title: "우란분재".into(),
            date: None,
            time: parse_time("09:30").unwrap(),
            description: String::new(),
            image_url: None,
            kind: EventKind::Event,
        };
        assert_eq!(event.validate(), Err(ValidationError::MissingField("date")));
        event.date = Some(date("2024-08-11"));
        assert!(event.validate().is_ok());
    }

    #[test]
    fn test_notices_by_category() {
        let mut board = Board::new();
        board.upsert(notice("n1", NoticeCategory::Notice)).unwrap();
        board.upsert(notice("n2", NoticeCategory::Faq)).unwrap();
        board.upsert(notice("n3", NoticeCategory::Faq)).unwrap();
        assert_eq!(board.in_category(NoticeCategory::Faq).count(), 2);
    }

    #[test]
    fn test_notification_needs_title_and_content() {
        let notification = Notification {
            title: "알림".into(),
            content: " ".into(),
            audience: Audience::default(),
        };
        assert_eq!(
            notification.validate(),
            Err(ValidationError::MissingField("content"))
        );
    }
}
