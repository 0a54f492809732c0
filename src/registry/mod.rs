use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlTextAreaElement, MutationObserver, MutationObserverInit};

use crate::popup::{self, PopupController};
use crate::sizing::{NoteBoxSizer, DATA_READY, DATA_SUPPRESS_FOCUS};

/// Note boxes eligible for auto-sizing, as the markup classes them.
pub(crate) const NOTE_BOX_SELECTOR: &str = "textarea.basic, textarea.notes, textarea.table-notes";

/// Events that re-run the sizing pass for a field.
const SIZING_EVENTS: [&str; 6] = ["input", "paste", "cut", "keyup", "change", "blur"];

/// Wire the sizing behavior to one note box. Idempotent: an element already
/// carrying the ready marker is skipped.
///
/// This is the primary attachment path — form-building components call it on
/// mount. The document watcher below funnels foreign markup through the same
/// function.
pub(crate) fn register_note_box(
    textarea: &HtmlTextAreaElement,
    sizer: &NoteBoxSizer,
    popup: &PopupController,
) {
    let el: &Element = textarea.as_ref();
    if el.has_attribute(DATA_READY) {
        return;
    }
    let _ = el.set_attribute(DATA_READY, "1");

    popup::adopt_legacy_markup(textarea, popup);

    for event in SIZING_EVENTS {
        let sizer = sizer.clone();
        let target = textarea.clone();
        let cb = Closure::<dyn FnMut(web_sys::Event)>::new(move |_ev: web_sys::Event| {
            sizer.fit(&target);
        });
        let _ = el.add_event_listener_with_callback(event, cb.as_ref().unchecked_ref());
        cb.forget();
    }

    // Focus honors the popup's one-shot suppression marker so closing the
    // editor does not immediately re-run the pass it just ran.
    {
        let sizer = sizer.clone();
        let target = textarea.clone();
        let cb = Closure::<dyn FnMut(web_sys::Event)>::new(move |_ev: web_sys::Event| {
            let el: &Element = target.as_ref();
            if el.has_attribute(DATA_SUPPRESS_FOCUS) {
                let _ = el.remove_attribute(DATA_SUPPRESS_FOCUS);
                return;
            }
            sizer.fit(&target);
        });
        let _ = el.add_event_listener_with_callback("focus", cb.as_ref().unchecked_ref());
        cb.forget();
    }

    sizer.fit(textarea);
}

/// Attach sizing to every note box in the document that is not wired yet.
pub(crate) fn rescan(sizer: &NoteBoxSizer, popup: &PopupController) {
    let Some(doc) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    let Ok(list) = doc.query_selector_all(NOTE_BOX_SELECTOR) else {
        return;
    };

    for i in 0..list.length() {
        let Some(node) = list.item(i) else { continue };
        let Ok(textarea) = node.dyn_into::<HtmlTextAreaElement>() else {
            continue;
        };
        register_note_box(&textarea, sizer, popup);
    }
}

/// Watch the whole document for inserted note boxes (markup created outside
/// the component tree). However many mutation batches land in a burst, at
/// most one rescan runs per animation frame.
pub(crate) fn install_document_watcher(sizer: NoteBoxSizer, popup: PopupController) {
    let Some(win) = web_sys::window() else {
        return;
    };
    let Some(doc) = win.document() else {
        return;
    };
    let Some(root) = doc.document_element() else {
        return;
    };

    let pending = Rc::new(Cell::new(false));

    let cb = Closure::<dyn FnMut()>::new({
        let pending = Rc::clone(&pending);
        move || {
            if pending.get() {
                return;
            }
            pending.set(true);

            let pending = Rc::clone(&pending);
            let sizer = sizer.clone();
            let popup = popup.clone();
            let frame = Closure::once_into_js(move || {
                pending.set(false);
                rescan(&sizer, &popup);
            });
            if let Some(win) = web_sys::window() {
                let _ = win.request_animation_frame(frame.as_ref().unchecked_ref());
            }
        }
    });

    let Ok(observer) = MutationObserver::new(cb.as_ref().unchecked_ref()) else {
        return;
    };
    let init = MutationObserverInit::new();
    init.set_child_list(true);
    init.set_subtree(true);
    let _ = observer.observe_with_options(&root, &init);

    // The watcher lives for the app lifetime.
    cb.forget();
    std::mem::forget(observer);
}
