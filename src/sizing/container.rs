use web_sys::{Element, HtmlTextAreaElement};

use crate::config::SheetConfig;
use crate::dom;
use crate::sizing::{ContainerBehavior, SizingPolicy};

pub(crate) const DATA_BASE_MIN_HEIGHT: &str = "data-base-min-height";
pub(crate) const DATA_CONTENT_MIN_HEIGHT: &str = "data-content-min-height";

/// Ancestors eligible to absorb a note box's growth, nearest wins.
pub(crate) const PANEL_SELECTOR: &str = ".notes-subsection, .actions-notes-section, .section";

/// Regions whose panels always stay content-driven.
const FLEXIBLE_REGION_SELECTOR: &str = "#notes-column, #journal-region";

/// `panel = ceil(textarea + header + padding + gap)`.
pub(crate) fn panel_height(textarea_height: f64, header: f64, padding: f64, gap: f64) -> f64 {
    (textarea_height + header + padding + gap).ceil()
}

/// Grow the fitted textarea's enclosing panel so it visually contains it.
///
/// Missing ancestor panels short-circuit as a no-op.
pub(crate) fn propagate(
    textarea: &HtmlTextAreaElement,
    applied: f64,
    policy: &SizingPolicy,
    config: &SheetConfig,
) {
    let el: &Element = textarea.as_ref();
    let Ok(Some(panel)) = el.closest(PANEL_SELECTOR) else {
        return;
    };

    let header = header_height(&panel);
    let padding = dom::vertical_padding(&panel);
    let wanted = panel_height(applied, header, padding, config.panel_gap);
    let target = wanted.max(baseline_min(&panel));

    let Some(panel_html) = dom::as_html(&panel) else {
        return;
    };
    let style = panel_html.style();
    let _ = style.set_property("min-height", &format!("{target}px"));

    if is_flexible(&panel, textarea, policy) {
        // Content-driven panels keep growing organically past the minimum.
        let _ = style.set_property("height", "auto");
    } else {
        let _ = style.set_property("height", &format!("{target}px"));
    }

    record_content_min(&panel, target);
}

/// A panel's first-observed minimum. Measured exactly once; later passes
/// reuse the cache and never lower it.
fn baseline_min(panel: &Element) -> f64 {
    if let Some(cached) = dom::data_f64(panel, DATA_BASE_MIN_HEIGHT) {
        return cached;
    }
    let measured = dom::container_default_height(panel);
    dom::set_data_f64(panel, DATA_BASE_MIN_HEIGHT, measured);
    measured
}

/// Largest content height this panel has ever needed.
fn record_content_min(panel: &Element, candidate: f64) {
    let current = dom::data_f64(panel, DATA_CONTENT_MIN_HEIGHT).unwrap_or(0.0);
    if candidate > current {
        dom::set_data_f64(panel, DATA_CONTENT_MIN_HEIGHT, candidate);
    }
}

fn is_flexible(panel: &Element, textarea: &HtmlTextAreaElement, policy: &SizingPolicy) -> bool {
    match policy.container {
        ContainerBehavior::Flexible => true,
        ContainerBehavior::Fixed => false,
        ContainerBehavior::Auto => {
            panel.class_list().contains("notes-subsection")
                || in_flexible_region(panel)
                || policy
                    .row_align_field
                    .as_deref()
                    .is_some_and(|name| textarea.name() == name)
        }
    }
}

fn in_flexible_region(panel: &Element) -> bool {
    matches!(panel.closest(FLEXIBLE_REGION_SELECTOR), Ok(Some(_)))
}

pub(crate) fn header_height(panel: &Element) -> f64 {
    panel
        .query_selector(":scope > .section-header, :scope > header, :scope > h2, :scope > h3")
        .ok()
        .flatten()
        .map(|h| h.get_bounding_client_rect().height())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panel_height_rounds_up() {
        assert_eq!(panel_height(160.0, 24.0, 16.0, 12.0), 212.0);
        assert_eq!(panel_height(160.4, 24.0, 16.0, 12.0), 213.0);
    }

    #[test]
    fn test_panel_height_with_no_header() {
        assert_eq!(panel_height(200.0, 0.0, 0.0, 12.0), 212.0);
    }
}
