use std::cell::RefCell;
use std::rc::Rc;

use leptos::ev;
use leptos::prelude::*;
use leptos_dom::helpers::{window_event_listener, WindowListenerHandle};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlElement, PointerEvent, ResizeObserver};

use crate::config::SheetConfig;
use crate::dom;
use crate::sizing::container::DATA_BASE_MIN_HEIGHT;

pub(crate) const DATA_BASE_HEIGHT: &str = "data-base-height";
pub(crate) const DATA_MANUAL_HEIGHT: &str = "data-manual-height";
const DATA_ROW_READY: &str = "data-row-sync";

const SECTION_SELECTOR: &str = ":scope > .section";

/// `base = max(tallest natural content height, cached container minimum)`.
pub(crate) fn compute_base(tallest_natural: f64, cached_min: f64) -> f64 {
    tallest_natural.max(cached_min)
}

/// Row target: base, raised by the manual override, then by the live drag
/// height while a drag is running, or by the tallest sibling otherwise.
pub(crate) fn desired_row_height(
    base: f64,
    manual: Option<f64>,
    live: Option<f64>,
    tallest: Option<f64>,
) -> f64 {
    let mut desired = base;
    if let Some(m) = manual {
        desired = desired.max(m);
    }
    match live {
        Some(l) => desired = desired.max(l),
        None => {
            if let Some(t) = tallest {
                desired = desired.max(t);
            }
        }
    }
    desired
}

/// Sub-epsilon writes are skipped so observer callbacks cannot feed back
/// into an endless relayout loop.
pub(crate) fn should_write(current: f64, desired: f64, epsilon: f64) -> bool {
    (desired - current).abs() >= epsilon
}

pub(crate) fn within_grip(bottom_edge: f64, pointer_y: f64, grip: f64) -> bool {
    (bottom_edge - pointer_y).abs() <= grip
}

/// `next = max(base, start + delta)`.
pub(crate) fn drag_height(base: f64, start_height: f64, delta_y: f64) -> f64 {
    (start_height + delta_y).max(base)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct DragSession {
    pub start_height: f64,
    pub start_y: f64,
}

/// Equalizes the heights of `.section` siblings inside one `.flex-wrap` row.
///
/// Responsibilities:
/// - base-height recalculation and uniform application (desktop only)
/// - manual drag-resize with a per-frame sync loop that stops with the drag
/// - resize observation (native handles, content reflow, window resizes)
///
/// The container is addressed by id so the controller stays cheap to clone
/// into event closures; every pass re-resolves live DOM state.
#[derive(Clone)]
pub(crate) struct RowSyncController {
    config: SheetConfig,
    container_id: String,

    drag: RwSignal<Option<DragSession>>,
    loop_running: RwSignal<bool>,

    /// Keep the window listeners alive for the life of the row.
    _move_handle: StoredValue<Option<WindowListenerHandle>>,
    _up_handle: StoredValue<Option<WindowListenerHandle>>,
    _resize_handle: StoredValue<Option<WindowListenerHandle>>,
}

impl RowSyncController {
    /// Attach row synchronization to a `.flex-wrap` container. Idempotent:
    /// an already-wired container returns `None`.
    pub fn install(container: &HtmlElement, config: SheetConfig) -> Option<Self> {
        let el: &Element = container.as_ref();
        if el.has_attribute(DATA_ROW_READY) {
            return None;
        }
        let _ = el.set_attribute(DATA_ROW_READY, "1");

        let ctrl = Self {
            config,
            container_id: dom::element_key(el),
            drag: RwSignal::new(None),
            loop_running: RwSignal::new(false),
            _move_handle: StoredValue::new(None),
            _up_handle: StoredValue::new(None),
            _resize_handle: StoredValue::new(None),
        };

        ctrl.wire_pointer_events();
        ctrl.observe_resizes();
        ctrl.wire_window_resize();

        ctrl.recalc_base();
        ctrl.sync_heights();

        Some(ctrl)
    }

    fn container(&self) -> Option<HtmlElement> {
        let doc = web_sys::window()?.document()?;
        let el = doc.get_element_by_id(&self.container_id)?;
        dom::as_html(&el).cloned()
    }

    fn sections(&self) -> Vec<HtmlElement> {
        let Some(container) = self.container() else {
            return Vec::new();
        };
        let el: &Element = container.as_ref();
        let Ok(list) = el.query_selector_all(SECTION_SELECTOR) else {
            return Vec::new();
        };

        let mut out = Vec::with_capacity(list.length() as usize);
        for i in 0..list.length() {
            let Some(node) = list.item(i) else { continue };
            if let Ok(section) = node.dyn_into::<HtmlElement>() {
                out.push(section);
            }
        }
        out
    }

    fn is_desktop(&self) -> bool {
        web_sys::window()
            .and_then(|w| w.inner_width().ok())
            .and_then(|v| v.as_f64())
            .map(|w| w >= self.config.desktop_breakpoint)
            .unwrap_or(false)
    }

    /// Recompute the row's base height and apply it as every section's
    /// minimum, raising (never lowering) sections currently below it.
    pub fn recalc_base(&self) {
        if !self.is_desktop() {
            return;
        }
        let Some(container) = self.container() else {
            return;
        };
        let sections = self.sections();
        if sections.is_empty() {
            return;
        }

        let tallest_natural = sections
            .iter()
            .map(natural_section_height)
            .fold(0.0f64, f64::max);

        let cel: &Element = container.as_ref();
        let base = compute_base(tallest_natural, container_base_min(cel));
        dom::set_data_f64(cel, DATA_BASE_HEIGHT, base);

        for section in &sections {
            let style = section.style();
            let _ = style.set_property("min-height", &format!("{base}px"));
            let current = section.get_bounding_client_rect().height();
            if current + self.config.sync_epsilon < base {
                let _ = style.set_property("height", &format!("{base}px"));
            }
        }
    }

    /// Apply one uniform height to every section in the row.
    pub fn sync_heights(&self) {
        if !self.is_desktop() {
            return;
        }
        let Some(container) = self.container() else {
            return;
        };
        let sections = self.sections();
        if sections.is_empty() {
            return;
        }

        let cel: &Element = container.as_ref();
        let base = dom::data_f64(cel, DATA_BASE_HEIGHT).unwrap_or(0.0);
        let manual = dom::data_f64(cel, DATA_MANUAL_HEIGHT);

        let dragging = self.drag.get_untracked().is_some();
        let live = if dragging { manual } else { None };
        let tallest = if dragging {
            None
        } else {
            Some(
                sections
                    .iter()
                    .map(|s| s.get_bounding_client_rect().height())
                    .fold(0.0f64, f64::max),
            )
        };

        let desired = desired_row_height(base, manual, live, tallest);

        for section in &sections {
            let current = section.get_bounding_client_rect().height();
            if !should_write(current, desired, self.config.sync_epsilon) {
                continue;
            }
            let _ = section.style().set_property("height", &format!("{desired}px"));
        }
    }

    fn wire_pointer_events(&self) {
        for section in self.sections() {
            let ctrl = self.clone();
            let target = section.clone();
            let cb = Closure::<dyn FnMut(PointerEvent)>::new(move |ev: PointerEvent| {
                ctrl.on_pointer_down(&target, &ev);
            });
            let el: &Element = section.as_ref();
            let _ = el.add_event_listener_with_callback("pointerdown", cb.as_ref().unchecked_ref());
            // Sections live as long as the row does.
            cb.forget();
        }

        let ctrl = self.clone();
        let move_handle = window_event_listener(ev::pointermove, move |ev: PointerEvent| {
            ctrl.on_pointer_move(&ev);
        });
        self._move_handle.set_value(Some(move_handle));

        let ctrl = self.clone();
        let up_handle = window_event_listener(ev::pointerup, move |_ev: PointerEvent| {
            ctrl.end_drag();
        });
        self._up_handle.set_value(Some(up_handle));
    }

    fn on_pointer_down(&self, section: &HtmlElement, ev: &PointerEvent) {
        if !self.is_desktop() {
            return;
        }

        let rect = section.get_bounding_client_rect();
        let y = ev.client_y() as f64;
        if !within_grip(rect.bottom(), y, self.config.resize_grip) {
            return;
        }

        let Some(container) = self.container() else {
            return;
        };
        let start_height = container.get_bounding_client_rect().height();
        self.drag.set(Some(DragSession {
            start_height,
            start_y: y,
        }));
        self.start_drag_loop();
    }

    fn on_pointer_move(&self, ev: &PointerEvent) {
        let Some(session) = self.drag.get_untracked() else {
            return;
        };
        let Some(container) = self.container() else {
            return;
        };

        let cel: &Element = container.as_ref();
        let base = dom::data_f64(cel, DATA_BASE_HEIGHT).unwrap_or(0.0);
        let next = drag_height(base, session.start_height, ev.client_y() as f64 - session.start_y);
        dom::set_data_f64(cel, DATA_MANUAL_HEIGHT, next);
    }

    fn end_drag(&self) {
        if self.drag.get_untracked().is_none() {
            return;
        }
        self.drag.set(None);

        // Settle once more so the released height sticks as the row floor.
        self.recalc_base();
        self.sync_heights();
    }

    /// Per-frame sync while a drag is running. The loop re-schedules itself
    /// only while the session is live and drops its own callback when the
    /// drag ends.
    fn start_drag_loop(&self) {
        if self.loop_running.get_untracked() {
            return;
        }
        self.loop_running.set(true);

        let ctrl = self.clone();
        let slot: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
        let kickoff = Rc::clone(&slot);

        *kickoff.borrow_mut() = Some(Closure::new(move || {
            if ctrl.drag.get_untracked().is_none() {
                ctrl.loop_running.set(false);
                let _ = slot.borrow_mut().take();
                return;
            }

            ctrl.sync_heights();

            if let Some(win) = web_sys::window() {
                if let Some(cb) = slot.borrow().as_ref() {
                    let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
                }
            }
        }));

        if let Some(win) = web_sys::window() {
            if let Some(cb) = kickoff.borrow().as_ref() {
                let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
            }
        }
    }

    /// Re-run the row when browser-native resizes change geometry (textarea
    /// resize handles, content reflow).
    fn observe_resizes(&self) {
        let ctrl = self.clone();
        let cb = Closure::<dyn FnMut()>::new(move || {
            ctrl.recalc_base();
            ctrl.sync_heights();
        });

        let Ok(observer) = ResizeObserver::new(cb.as_ref().unchecked_ref()) else {
            return;
        };
        if let Some(container) = self.container() {
            observer.observe(container.as_ref());
        }
        for section in self.sections() {
            observer.observe(section.as_ref());
        }

        // Row observation lives for the page lifetime.
        cb.forget();
        std::mem::forget(observer);
    }

    fn wire_window_resize(&self) {
        let ctrl = self.clone();
        let handle = window_event_listener(ev::resize, move |_| {
            ctrl.recalc_base();
            ctrl.sync_heights();
        });
        self._resize_handle.set_value(Some(handle));
    }
}

/// Natural content height of a section: scroll extent with any explicit
/// height cleared, restored afterwards.
fn natural_section_height(section: &HtmlElement) -> f64 {
    let style = section.style();
    let prev = style.get_property_value("height").ok().filter(|v| !v.is_empty());

    let _ = style.remove_property("height");
    let natural = (section.scroll_height() as f64).max(section.get_bounding_client_rect().height());

    if let Some(h) = prev {
        let _ = style.set_property("height", &h);
    }
    natural
}

/// Cached first-observed minimum for the row container.
fn container_base_min(container: &Element) -> f64 {
    if let Some(cached) = dom::data_f64(container, DATA_BASE_MIN_HEIGHT) {
        return cached;
    }
    let measured = dom::container_default_height(container);
    dom::set_data_f64(container, DATA_BASE_MIN_HEIGHT, measured);
    measured
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_is_tallest_natural_height() {
        let tallest = [80.0f64, 120.0, 95.0].into_iter().fold(0.0f64, f64::max);
        assert_eq!(compute_base(tallest, 0.0), 120.0);
        assert_eq!(compute_base(tallest, 150.0), 150.0);
    }

    #[test]
    fn test_sync_applies_base_to_all_sections() {
        let desired = desired_row_height(120.0, None, None, Some(120.0));
        assert_eq!(desired, 120.0);
        for current in [80.0, 120.0, 95.0] {
            let wants_write = should_write(current, desired, 1.0);
            assert_eq!(wants_write, current != 120.0);
        }
    }

    #[test]
    fn test_manual_height_beats_smaller_base() {
        // Base recalculation must not silently override a larger manual height.
        assert_eq!(desired_row_height(120.0, Some(170.0), None, Some(120.0)), 170.0);
    }

    #[test]
    fn test_live_drag_height_replaces_tallest_sibling() {
        // Mid-drag the row can shrink toward base even while siblings are tall.
        assert_eq!(desired_row_height(100.0, Some(130.0), Some(130.0), None), 130.0);
        assert_eq!(desired_row_height(100.0, Some(105.0), Some(105.0), None), 105.0);
    }

    #[test]
    fn test_drag_height_follows_pointer_and_floors_at_base() {
        assert_eq!(drag_height(120.0, 120.0, 50.0), 170.0);
        assert_eq!(drag_height(120.0, 120.0, -80.0), 120.0);
    }

    #[test]
    fn test_epsilon_skips_sub_unit_writes() {
        assert!(!should_write(120.4, 120.0, 1.0));
        assert!(should_write(118.0, 120.0, 1.0));
    }

    #[test]
    fn test_grip_zone() {
        assert!(within_grip(300.0, 290.0, 14.0));
        assert!(within_grip(300.0, 310.0, 14.0));
        assert!(!within_grip(300.0, 280.0, 14.0));
    }
}
