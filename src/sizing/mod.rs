pub(crate) mod container;
pub(crate) mod row_align;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlTextAreaElement};

use crate::config::SheetConfig;
use crate::dom;

/// Dataset attribute names are a stable boundary with the markup; other
/// scripts on the page read them between passes.
pub(crate) const DATA_NOTE_BASE_HEIGHT: &str = "data-note-base-height";
pub(crate) const DATA_CHAR_COUNT: &str = "data-char-count";
pub(crate) const DATA_LAST_HEIGHT: &str = "data-last-height";
pub(crate) const DATA_READY: &str = "data-ready";
pub(crate) const DATA_SUPPRESS_FOCUS: &str = "data-suppress-focus";

/// The one textarea that aligns to its visual row instead of its own content.
pub(crate) const ROW_ALIGNED_FIELD: &str = "training";

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum BaselineSource {
    /// Measure the rendered height once and cache it on the element.
    Rendered,
    /// Use an explicit minimum, still floored at the configured note minimum.
    Fixed(f64),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ContainerBehavior {
    /// Decide per panel: notes subsections, flexible regions and the host of
    /// the row-aligned field stay content-driven, everything else is fixed.
    Auto,
    Flexible,
    Fixed,
}

/// One sizing code path for every note box; what used to be special-cased
/// per field is plain policy data.
#[derive(Clone, Debug)]
pub(crate) struct SizingPolicy {
    pub baseline: BaselineSource,
    pub container: ContainerBehavior,
    /// `name` of the textarea that stretches to its row, if any.
    pub row_align_field: Option<String>,
}

impl Default for SizingPolicy {
    fn default() -> Self {
        Self {
            baseline: BaselineSource::Rendered,
            container: ContainerBehavior::Auto,
            row_align_field: Some(ROW_ALIGNED_FIELD.to_string()),
        }
    }
}

/// `target = max(baseline, content + padding)`.
pub(crate) fn target_height(baseline: f64, content: f64, padding: f64) -> f64 {
    baseline.max(content + padding)
}

/// Sizes note boxes and propagates the result to their panels.
///
/// Responsibilities:
/// - per-element baseline cache (measured once, never lowered)
/// - fit pass + one deferred settle pass per element (cancel-and-replace)
/// - container propagation and special row alignment
///
/// Non-responsibilities:
/// - event wiring (registry) and flex-row equalization (rowsync)
#[derive(Clone)]
pub(crate) struct NoteBoxSizer {
    policy: SizingPolicy,
    config: SheetConfig,

    /// Pending settle passes, keyed by element id.
    settle_frames: Arc<Mutex<HashMap<String, i32>>>,
}

impl NoteBoxSizer {
    pub fn new(policy: SizingPolicy, config: SheetConfig) -> Self {
        Self {
            policy,
            config,
            settle_frames: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Full sizing pass: fit now, then settle on the next animation frame.
    ///
    /// The deferred pass corrects for reflow that lands after this call
    /// (font loading, re-wrapping after a bulk delete). At most one is in
    /// flight per element; scheduling again replaces the pending one.
    pub fn fit(&self, textarea: &HtmlTextAreaElement) {
        self.fit_once(textarea);
        self.schedule_settle_pass(textarea);
    }

    /// Single synchronous pass, no deferred follow-up.
    pub fn fit_once(&self, textarea: &HtmlTextAreaElement) {
        let el: &Element = textarea.as_ref();

        let baseline = self.baseline_of(textarea);
        let content = dom::natural_content_height(textarea);
        let padding = dom::vertical_padding(el);
        let mut target = target_height(baseline, content, padding);

        if self.is_row_aligned(textarea) {
            if let Some(aligned) = row_align::row_aligned_target(el, target, &self.config) {
                target = aligned;
            }
        }

        apply_height(textarea, target);
        dom::set_data_f64(el, DATA_LAST_HEIGHT, target);
        let _ = el.set_attribute(DATA_CHAR_COUNT, &dom::char_count(textarea).to_string());

        container::propagate(textarea, target, &self.policy, &self.config);
    }

    /// Re-fit every registered note box (window resize, breakpoint change).
    pub fn refit_all(&self) {
        let Some(doc) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        let Ok(list) = doc.query_selector_all(&format!("textarea[{DATA_READY}]")) else {
            return;
        };
        for i in 0..list.length() {
            let Some(node) = list.item(i) else { continue };
            let Ok(textarea) = node.dyn_into::<HtmlTextAreaElement>() else {
                continue;
            };
            self.fit(&textarea);
        }
    }

    fn is_row_aligned(&self, textarea: &HtmlTextAreaElement) -> bool {
        self.policy
            .row_align_field
            .as_deref()
            .is_some_and(|name| textarea.name() == name)
    }

    /// Cached per-element minimum; measured on first access, never lowered.
    fn baseline_of(&self, textarea: &HtmlTextAreaElement) -> f64 {
        let el: &Element = textarea.as_ref();
        if let Some(cached) = dom::data_f64(el, DATA_NOTE_BASE_HEIGHT) {
            return cached;
        }

        let measured = match self.policy.baseline {
            BaselineSource::Rendered => {
                dom::note_box_default_height(textarea, self.config.note_min_height)
            }
            BaselineSource::Fixed(px) => px.max(self.config.note_min_height),
        };
        dom::set_data_f64(el, DATA_NOTE_BASE_HEIGHT, measured);
        measured
    }

    fn schedule_settle_pass(&self, textarea: &HtmlTextAreaElement) {
        let Some(win) = web_sys::window() else {
            return;
        };

        let el: &Element = textarea.as_ref();
        let key = dom::element_key(el);

        if let Ok(mut map) = self.settle_frames.lock() {
            if let Some(handle) = map.remove(&key) {
                let _ = win.cancel_animation_frame(handle);
            }
        }

        let sizer = self.clone();
        let target = textarea.clone();
        let key_for_cb = key.clone();
        let cb = wasm_bindgen::closure::Closure::once_into_js(move || {
            if let Ok(mut map) = sizer.settle_frames.lock() {
                map.remove(&key_for_cb);
            }
            sizer.fit_once(&target);
        });

        let handle = win
            .request_animation_frame(cb.as_ref().unchecked_ref())
            .unwrap_or(0);

        if let Ok(mut map) = self.settle_frames.lock() {
            map.insert(key, handle);
        }
    }
}

fn apply_height(textarea: &HtmlTextAreaElement, target: f64) {
    let style = textarea.style();
    let _ = style.set_property("height", &format!("{}px", target.ceil()));
    let _ = style.set_property("overflow-y", "hidden");

    // Keep the viewport pinned to the top, except while the user is mid-edit
    // with an active selection.
    if !editing_with_selection(textarea) {
        textarea.set_scroll_top(0);
    }
}

fn editing_with_selection(textarea: &HtmlTextAreaElement) -> bool {
    let el: &Element = textarea.as_ref();
    if !dom::is_focused(el) {
        return false;
    }

    let start = textarea.selection_start().ok().flatten();
    let end = textarea.selection_end().ok().flatten();
    matches!((start, end), (Some(s), Some(e)) if s != e)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_never_below_baseline() {
        for content in [0.0, 1.0, 80.0, 159.0, 500.0] {
            assert!(target_height(160.0, content, 0.0) >= 160.0);
        }
        assert_eq!(target_height(160.0, 0.0, 0.0), 160.0);
    }

    #[test]
    fn test_target_follows_content_above_baseline() {
        assert_eq!(target_height(160.0, 300.0, 12.0), 312.0);
        assert_eq!(target_height(160.0, 150.0, 4.0), 160.0);
    }

    #[test]
    fn test_target_is_idempotent_for_unchanged_inputs() {
        let first = target_height(160.0, 240.0, 8.0);
        let second = target_height(160.0, 240.0, 8.0);
        assert_eq!(first, second);
    }

    #[test]
    fn test_default_policy_names_training_field() {
        let policy = SizingPolicy::default();
        assert_eq!(policy.row_align_field.as_deref(), Some("training"));
        assert_eq!(policy.container, ContainerBehavior::Auto);
    }
}
