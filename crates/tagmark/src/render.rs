use std::borrow::Cow;

use crate::sanitize::sanitize_preview;
use crate::tags::TagKind;

pub const LINE_BREAK: &str = "<br />";

/// Render raw tagged text to HTML.
///
/// Each tag rule runs once, in [`TagKind::ALL`] order, then every `\n`
/// becomes a line break. Unterminated or unknown tags are left as they are.
pub fn render(raw: &str) -> String {
    let mut html = raw.to_owned();
    for kind in TagKind::ALL {
        if let Cow::Owned(replaced) = kind.substitute(&html) {
            html = replaced;
        }
    }
    convert_line_breaks(&html)
}

/// [`render`] followed by the preview sanitizer.
///
/// The sanitizer serializes void elements as `<br>`, so line breaks are put
/// back into the [`LINE_BREAK`] form.
pub fn render_sanitized(raw: &str) -> String {
    sanitize_preview(&render(raw)).replace(SERIALIZED_BREAK, LINE_BREAK)
}

const SERIALIZED_BREAK: &str = "<br>";

pub fn convert_line_breaks(html: &str) -> String {
    html.replace('\n', LINE_BREAK)
}
