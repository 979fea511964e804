//! The temple introduction page: three keyed text sections, one of which may
//! be open in the content editor at a time.

const TEMPLE_INFO: &str = "\
해인사는 경상남도 합천군 가야면에 위치한 대한불교 조계종 제12교구 본사입니다. 팔만대장경을 보관하고 있는 장경판전은 유네스코 세계문화유산으로 등재되어 있습니다.

802년(애장왕 3년)에 순응과 이정이라는 두 스님이 창건했다고 전해지며, '해인(海印)'이라는 이름은 화엄경에 나오는 '해인삼매(海印三昧)'에서 유래했습니다.

해인사는 한국의 삼보사찰(三寶寺刹) 중 법보사찰(法寶寺刹)로, 팔만대장경판과 장경판전을 중심으로 한 건축물과 불교 문화재를 간직하고 있습니다.";

const ABBOT_MESSAGE: &str = "\
불자 여러분, 안녕하십니까?
해인사 주지 스님 법명입니다.

부처님의 가르침 아래 평화로운 일상을 보내고 계시길 기원합니다.
해인사는 천 년이 넘는 역사 속에서 부처님의 지혜를 전해온 성지입니다.

저희 해인사는 팔만대장경의 정신을 이어받아, 모든 중생의 번뇌를 없애고 지혜의 등불을 밝히는 수행도량이 되고자 합니다.

불자 여러분들의 많은 관심과 신심을 부탁드리며, 인연 있는 모든 분들이 해인사에서 부처님의 가르침을 만나고 마음의 평화를 찾으시길 기원합니다.

감사합니다.";

const MONKS: &str = "\
[bold]주지스님[/bold]
법명 스님 - 해인사 주지
약력: 동국대학교 불교학과 졸업, 조계종 종정 비서실장 역임

[bold]부주지스님[/bold]
법상 스님 - 해인사 부주지
약력: 중앙승가대학교 졸업, 해인사 수련원장 역임

[bold]강원 원장[/bold]
법현 스님 - 해인사 강원 원장
약력: 동국대학교 불교학과 박사, 불교학 전문

[bold]행정실장[/bold]
법안 스님 - 해인사 행정실장
약력: 중앙승가대학교 불교학과 졸업, 조계종 총무원 근무 경력";

/// Fixed facts shown beside the sections. Not editable.
pub const INFO_CARDS: &[(&str, &[&str])] = &[
    (
        "운영 시간",
        &[
            "전시/관람: 09:00 - 18:00",
            "법회: 매일 오전 5시, 오후 7시",
            "템플스테이: 연중무휴",
        ],
    ),
    (
        "문화재 현황",
        &["국보: 4점", "보물: 12점", "유네스코 세계유산: 1점"],
    ),
    (
        "입장료",
        &["성인: 5,000원", "청소년/군인: 3,000원", "어린이: 1,000원"],
    ),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TempleSection {
    TempleInfo,
    AbbotMessage,
    Monks,
}

impl TempleSection {
    pub const ALL: [TempleSection; 3] = [
        TempleSection::TempleInfo,
        TempleSection::AbbotMessage,
        TempleSection::Monks,
    ];

    pub fn key(self) -> &'static str {
        match self {
            TempleSection::TempleInfo => "templeInfo",
            TempleSection::AbbotMessage => "abbotMessage",
            TempleSection::Monks => "monks",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            TempleSection::TempleInfo => "사찰 소개",
            TempleSection::AbbotMessage => "주지스님 인사말",
            TempleSection::Monks => "스님 소개",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|section| section.key() == key)
    }

    fn index(self) -> usize {
        match self {
            TempleSection::TempleInfo => 0,
            TempleSection::AbbotMessage => 1,
            TempleSection::Monks => 2,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TemplePage {
    contents: [String; 3],
    editing: Option<TempleSection>,
}

impl Default for TemplePage {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplePage {
    pub fn new() -> Self {
        Self {
            contents: [
                TEMPLE_INFO.to_string(),
                ABBOT_MESSAGE.to_string(),
                MONKS.to_string(),
            ],
            editing: None,
        }
    }

    pub fn content(&self, section: TempleSection) -> &str {
        &self.contents[section.index()]
    }

    /// Section currently open in the editor, if any.
    pub fn editing(&self) -> Option<TempleSection> {
        self.editing
    }

    /// Open `section` for editing and return its stored text.
    pub fn begin_edit(&mut self, section: TempleSection) -> &str {
        self.editing = Some(section);
        self.content(section)
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Store `content` under the section being edited and close it.
    ///
    /// Returns `None` and changes nothing when no section is open.
    pub fn commit(&mut self, content: String) -> Option<TempleSection> {
        let section = self.editing.take()?;
        self.contents[section.index()] = content;
        log::info!("Saved temple section '{}'", section.key());
        Some(section)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_keys_round_trip() {
        for section in TempleSection::ALL {
            assert_eq!(TempleSection::from_key(section.key()), Some(section));
        }
        assert_eq!(TempleSection::from_key("history"), None);
        assert_eq!(TempleSection::Monks.title(), "스님 소개");
    }

    #[test]
    fn test_seeded_contents() {
        let page = TemplePage::new();
        assert!(page.content(TempleSection::TempleInfo).starts_with("해인사는"));
        assert!(page.content(TempleSection::AbbotMessage).ends_with("감사합니다."));
        assert!(page.content(TempleSection::Monks).contains("법상 스님"));
        assert_eq!(page.editing(), None);
    }

    #[test]
    fn test_commit_stores_only_the_open_section() {
        let mut page = TemplePage::new();
        assert_eq!(page.commit("무시됨".into()), None);

        let original = page.begin_edit(TempleSection::AbbotMessage).to_string();
        assert!(original.contains("주지 스님"));
        assert_eq!(
            page.commit("[bold]새 인사말[/bold]".into()),
            Some(TempleSection::AbbotMessage)
        );
        assert_eq!(page.content(TempleSection::AbbotMessage), "[bold]새 인사말[/bold]");
        assert!(page.content(TempleSection::TempleInfo).starts_with("해인사는"));
        assert_eq!(page.editing(), None);
    }

    #[test]
    fn test_cancel_edit_keeps_content() {
        let mut page = TemplePage::new();
        page.begin_edit(TempleSection::Monks);
        page.cancel_edit();
        assert_eq!(page.commit("x".into()), None);
        assert!(page.content(TempleSection::Monks).contains("주지스님"));
    }

    #[test]
    fn test_info_cards() {
        let titles: Vec<&str> = INFO_CARDS.iter().map(|(title, _)| *title).collect();
        assert_eq!(titles, ["운영 시간", "문화재 현황", "입장료"]);
        assert!(INFO_CARDS[2].1.contains(&"성인: 5,000원"));
    }
}
