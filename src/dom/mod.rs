use wasm_bindgen::JsCast;
use web_sys::{CssStyleDeclaration, Element, HtmlElement, HtmlTextAreaElement};

use crate::components::hooks::use_random::use_random_id_for;

/// Parse a CSS pixel length like `"160px"` (or a bare number).
pub(crate) fn parse_px(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let digits = trimmed.strip_suffix("px").unwrap_or(trimmed).trim();
    let value: f64 = digits.parse().ok()?;
    value.is_finite().then_some(value)
}

pub(crate) fn computed_style(el: &Element) -> Option<CssStyleDeclaration> {
    web_sys::window()?.get_computed_style(el).ok().flatten()
}

pub(crate) fn computed_px(el: &Element, prop: &str) -> Option<f64> {
    let style = computed_style(el)?;
    let raw = style.get_property_value(prop).ok()?;
    parse_px(&raw)
}

pub(crate) fn vertical_padding(el: &Element) -> f64 {
    computed_px(el, "padding-top").unwrap_or(0.0) + computed_px(el, "padding-bottom").unwrap_or(0.0)
}

/// A numeric `data-*` attribute, if present and parseable.
pub(crate) fn data_f64(el: &Element, name: &str) -> Option<f64> {
    el.get_attribute(name).as_deref().and_then(|v| v.trim().parse().ok())
}

pub(crate) fn set_data_f64(el: &Element, name: &str, value: f64) {
    let _ = el.set_attribute(name, &format!("{value}"));
}

/// Content length as the DOM reports it (UTF-16 code units).
pub(crate) fn char_count(textarea: &HtmlTextAreaElement) -> u32 {
    textarea.value().encode_utf16().count() as u32
}

/// The height a note box naturally wants for its current content.
///
/// Clears any inline height so `scroll_height` reflects the wrapped content,
/// then restores the previous inline height. The restore happens even when
/// the element had no inline height (the property is removed again).
pub(crate) fn natural_content_height(textarea: &HtmlTextAreaElement) -> f64 {
    let style = textarea.style();
    let prev = style.get_property_value("height").ok().filter(|h| !h.is_empty());

    let _ = style.set_property("height", "auto");
    let measured = textarea.scroll_height() as f64;

    match prev {
        Some(h) => {
            let _ = style.set_property("height", &h);
        }
        None => {
            let _ = style.remove_property("height");
        }
    }

    measured
}

/// First-render minimum for a note box: the larger of its rendered height,
/// its computed `min-height`, and the configured floor.
pub(crate) fn note_box_default_height(textarea: &HtmlTextAreaElement, floor: f64) -> f64 {
    let el: &Element = textarea.as_ref();
    let rendered = el.get_bounding_client_rect().height();
    let min_height = computed_px(el, "min-height").unwrap_or(0.0);
    rendered.max(min_height).max(floor)
}

/// First-observed minimum for a panel.
pub(crate) fn container_default_height(panel: &Element) -> f64 {
    let rendered = panel.get_bounding_client_rect().height();
    let min_height = computed_px(panel, "min-height").unwrap_or(0.0);
    rendered.max(min_height)
}

/// The element's DOM id, assigning a generated one when it has none.
pub(crate) fn element_key(el: &Element) -> String {
    let current = el.id();
    if !current.is_empty() {
        return current;
    }
    let id = use_random_id_for("note");
    el.set_id(&id);
    id
}

/// Whether `el` is the document's focused element.
pub(crate) fn is_focused(el: &Element) -> bool {
    web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.active_element())
        .map(|active| {
            let node: &web_sys::Node = el.as_ref();
            active.is_same_node(Some(node))
        })
        .unwrap_or(false)
}

pub(crate) fn as_html(el: &Element) -> Option<&HtmlElement> {
    el.dyn_ref::<HtmlElement>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_px() {
        assert_eq!(parse_px("160px"), Some(160.0));
        assert_eq!(parse_px(" 12.5px "), Some(12.5));
        assert_eq!(parse_px("42"), Some(42.0));
        assert_eq!(parse_px("auto"), None);
        assert_eq!(parse_px(""), None);
        assert_eq!(parse_px("NaNpx"), None);
    }
}
