//! The closed tag vocabulary and the single substitution rule behind each kind.

use lazy_static::lazy_static;
use regex::Regex;
use std::borrow::Cow;
use std::fmt;

lazy_static! {
    static ref BOLD: Regex =
        Regex::new(r"\[bold\](.*?)\[/bold\]").expect("Invalid BOLD regex pattern");
    static ref ITALIC: Regex =
        Regex::new(r"\[italic\](.*?)\[/italic\]").expect("Invalid ITALIC regex pattern");
    static ref LIST: Regex =
        Regex::new(r"\[list\](.*?)\[/list\]").expect("Invalid LIST regex pattern");
    static ref LINK: Regex =
        Regex::new(r"\[link=(.*?)\](.*?)\[/link\]").expect("Invalid LINK regex pattern");
    static ref IMAGE: Regex =
        Regex::new(r"\[image=(.*?)\](.*?)\[/image\]").expect("Invalid IMAGE regex pattern");
    static ref FILE: Regex =
        Regex::new(r"\[file=(.*?)\](.*?)\[/file\]").expect("Invalid FILE regex pattern");
}

const BOLD_HTML: &str = "<strong>${1}</strong>";
const ITALIC_HTML: &str = "<em>${1}</em>";
const LIST_HTML: &str = "<ul><li>${1}</li></ul>";
const LINK_HTML: &str = r#"<a href="${1}" target="_blank">${2}</a>"#;
const IMAGE_HTML: &str =
    r#"<img src="${1}" alt="${2}" class="my-2 rounded-md max-w-full h-auto" />"#;
const FILE_HTML: &str = concat!(
    r#"<a href="${1}" target="_blank" class="flex items-center gap-2">"#,
    r#"<svg xmlns="http://www.w3.org/2000/svg" width="16" height="16" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2" stroke-linecap="round" stroke-linejoin="round">"#,
    r#"<path d="M14.5 2H6a2 2 0 0 0-2 2v16a2 2 0 0 0 2 2h12a2 2 0 0 0 2-2V7.5L14.5 2z"></path>"#,
    r#"<polyline points="14 2 14 8 20 8"></polyline></svg>${2}</a>"#,
);

/// Classes emitted on rendered `<img>` elements.
pub const IMAGE_CLASSES: &[&str] = &["my-2", "rounded-md", "max-w-full", "h-auto"];
/// Classes emitted on rendered file links.
pub const FILE_LINK_CLASSES: &[&str] = &["flex", "items-center", "gap-2"];

/// A kind of bracket tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagKind {
    Bold,
    Italic,
    List,
    Link,
    Image,
    File,
}

impl TagKind {
    /// Every kind, in the order rules are applied when rendering.
    pub const ALL: [TagKind; 6] = [
        TagKind::Bold,
        TagKind::Italic,
        TagKind::List,
        TagKind::Link,
        TagKind::Image,
        TagKind::File,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TagKind::Bold => "bold",
            TagKind::Italic => "italic",
            TagKind::List => "list",
            TagKind::Link => "link",
            TagKind::Image => "image",
            TagKind::File => "file",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Whether the opening tag carries a `=value` (a URL).
    pub fn takes_value(self) -> bool {
        matches!(self, TagKind::Link | TagKind::Image | TagKind::File)
    }

    pub fn open_tag(self, value: Option<&str>) -> String {
        match value {
            Some(value) if self.takes_value() => format!("[{}={}]", self.name(), value),
            _ => format!("[{}]", self.name()),
        }
    }

    pub fn close_tag(self) -> String {
        format!("[/{}]", self.name())
    }

    /// `open + body + close`.
    pub fn wrap(self, value: Option<&str>, body: &str) -> String {
        format!("{}{}{}", self.open_tag(value), body, self.close_tag())
    }

    /// Sample URL and label used by the toolbar for valued kinds.
    pub fn sample(self) -> Option<(&'static str, &'static str)> {
        match self {
            TagKind::Link => Some(("https://example.com", "링크 텍스트")),
            TagKind::Image => Some(("https://example.com/image.jpg", "이미지 설명")),
            TagKind::File => Some(("https://example.com/document.pdf", "파일 이름")),
            _ => None,
        }
    }

    /// Fragment the toolbar inserts for this kind.
    ///
    /// Plain kinds get an empty pair; valued kinds get a complete tag with a
    /// sample URL and label meant to be edited by hand.
    pub fn placeholder(self) -> String {
        match self.sample() {
            Some((url, label)) => self.wrap(Some(url), label),
            None => self.wrap(None, ""),
        }
    }

    fn pattern(self) -> &'static Regex {
        match self {
            TagKind::Bold => &BOLD,
            TagKind::Italic => &ITALIC,
            TagKind::List => &LIST,
            TagKind::Link => &LINK,
            TagKind::Image => &IMAGE,
            TagKind::File => &FILE,
        }
    }

    fn template(self) -> &'static str {
        match self {
            TagKind::Bold => BOLD_HTML,
            TagKind::Italic => ITALIC_HTML,
            TagKind::List => LIST_HTML,
            TagKind::Link => LINK_HTML,
            TagKind::Image => IMAGE_HTML,
            TagKind::File => FILE_HTML,
        }
    }

    /// Apply this kind's rule to every well-formed pair in `input`.
    ///
    /// Matching is non-greedy and line-bound; text without a complete pair is
    /// returned borrowed.
    pub fn substitute(self, input: &str) -> Cow<'_, str> {
        self.pattern().replace_all(input, self.template())
    }
}

impl fmt::Display for TagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for kind in TagKind::ALL {
            assert_eq!(TagKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(TagKind::from_name("underline"), None);
    }

    #[test]
    fn test_plain_placeholder_is_empty_pair() {
        assert_eq!(TagKind::Bold.placeholder(), "[bold][/bold]");
        assert_eq!(TagKind::List.placeholder(), "[list][/list]");
    }

    #[test]
    fn test_valued_placeholder_has_sample() {
        assert_eq!(
            TagKind::Link.placeholder(),
            "[link=https://example.com]링크 텍스트[/link]"
        );
        assert_eq!(
            TagKind::File.placeholder(),
            "[file=https://example.com/document.pdf]파일 이름[/file]"
        );
    }

    #[test]
    fn test_open_tag_ignores_value_for_plain_kinds() {
        assert_eq!(TagKind::Italic.open_tag(Some("x")), "[italic]");
        assert_eq!(TagKind::Image.open_tag(Some("a.png")), "[image=a.png]");
    }

    #[test]
    fn test_substitute_borrows_when_nothing_matches() {
        let input = "no tags here";
        assert!(matches!(TagKind::Bold.substitute(input), Cow::Borrowed(_)));
    }

    #[test]
    fn test_substitute_is_non_greedy() {
        let out = TagKind::Bold.substitute("[bold]a[/bold] and [bold]b[/bold]");
        assert_eq!(out, "<strong>a</strong> and <strong>b</strong>");
    }

    #[test]
    fn test_kinds_do_not_consume_each_other() {
        let out = TagKind::Bold.substitute("[italic]x[/italic]");
        assert_eq!(out, "[italic]x[/italic]");
    }
}
