use web_sys::Element;

use crate::config::SheetConfig;
use crate::dom;
use crate::sizing::container::{header_height, PANEL_SELECTOR};

/// Height the row-aligned textarea should take: the tallest sibling panel
/// minus the host panel's own chrome, floored at the content minimum.
pub(crate) fn aligned_height(tallest: f64, header: f64, padding: f64, content_min: f64) -> f64 {
    (tallest - header - padding).max(content_min)
}

/// Two panels share a visual row when their tops are within the tolerance.
pub(crate) fn same_row(own_top: f64, sibling_top: f64, tolerance: f64) -> bool {
    (sibling_top - own_top).abs() <= tolerance
}

/// Target for the designated textarea when its panel shares a row with
/// sibling panels. `None` when the panel stands alone (the caller keeps the
/// content-derived target).
pub(crate) fn row_aligned_target(
    textarea_el: &Element,
    content_min: f64,
    config: &SheetConfig,
) -> Option<f64> {
    let panel = textarea_el.closest(PANEL_SELECTOR).ok().flatten()?;
    let parent = panel.parent_element()?;

    let own_top = panel.get_bounding_client_rect().top();
    let panel_node: &web_sys::Node = panel.as_ref();

    let mut tallest: Option<f64> = None;
    let children = parent.children();
    for i in 0..children.length() {
        let Some(sibling) = children.item(i) else { continue };
        if sibling.is_same_node(Some(panel_node)) {
            continue;
        }
        let rect = sibling.get_bounding_client_rect();
        if same_row(own_top, rect.top(), config.row_top_tolerance) {
            tallest = Some(tallest.unwrap_or(0.0).max(rect.height()));
        }
    }

    let tallest = tallest?;
    let header = header_height(&panel);
    let padding = dom::vertical_padding(&panel);
    Some(aligned_height(tallest, header, padding, content_min))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aligns_to_tallest_sibling() {
        // Siblings at 100, 140, 220; host chrome is a 24px header + 16px padding.
        let tallest = [100.0f64, 140.0, 220.0]
            .into_iter()
            .fold(0.0f64, f64::max);
        assert_eq!(aligned_height(tallest, 24.0, 16.0, 120.0), 180.0);
    }

    #[test]
    fn test_never_below_content_minimum() {
        assert_eq!(aligned_height(100.0, 24.0, 16.0, 160.0), 160.0);
    }

    #[test]
    fn test_same_row_tolerance() {
        assert!(same_row(100.0, 104.0, 8.0));
        assert!(same_row(100.0, 92.0, 8.0));
        assert!(!same_row(100.0, 112.0, 8.0));
    }
}
