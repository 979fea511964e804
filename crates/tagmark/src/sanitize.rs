use std::borrow::Cow;

use ammonia::Builder;

use crate::tags::{FILE_LINK_CLASSES, IMAGE_CLASSES};

/// Sanitize rendered markup for display, keeping what the tag vocabulary emits.
///
/// Links may open in a new tab, the file-link icon keeps its inline SVG, and
/// the fixed image and file-link classes survive. `data:` URLs are only kept
/// as image sources of `data:image/*` type. Scripts, event handlers and
/// `javascript:` URLs are removed.
pub fn sanitize_preview(html: &str) -> String {
    preview_sanitizer().clean(html).to_string()
}

/// Sanitize with ammonia's defaults only.
pub fn sanitize_html(html: &str) -> String {
    Builder::default().clean(html).to_string()
}

const SVG_ATTRIBUTES: &[&str] = &[
    "xmlns",
    "width",
    "height",
    "viewBox",
    "fill",
    "stroke",
    "stroke-width",
    "stroke-linecap",
    "stroke-linejoin",
];

fn preview_sanitizer() -> Builder<'static> {
    let mut builder = Builder::default();
    builder
        .add_tags(&["svg", "path", "polyline"])
        .add_tag_attributes("svg", SVG_ATTRIBUTES)
        .add_tag_attributes("path", &["d"])
        .add_tag_attributes("polyline", &["points"])
        .add_tag_attributes("a", &["target"])
        .add_allowed_classes("img", IMAGE_CLASSES)
        .add_allowed_classes("a", FILE_LINK_CLASSES)
        // The scheme list applies to every URL attribute, so the filter
        // narrows `data:` back down to inline images.
        .add_url_schemes(&["data"])
        .attribute_filter(keep_image_data_urls);
    builder
}

fn keep_image_data_urls<'u>(element: &str, attribute: &str, value: &'u str) -> Option<Cow<'u, str>> {
    if !has_prefix(value.trim_start(), "data:") {
        return Some(Cow::Borrowed(value));
    }
    let image_source = element == "img" && attribute == "src";
    if image_source && has_prefix(value.trim_start(), "data:image/") {
        Some(Cow::Borrowed(value))
    } else {
        None
    }
}

fn has_prefix(value: &str, prefix: &str) -> bool {
    value
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}
