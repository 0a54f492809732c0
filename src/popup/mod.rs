use leptos::ev;
use leptos::prelude::*;
use leptos_dom::helpers::{window_event_listener, WindowListenerHandle};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Element, HtmlElement, HtmlTextAreaElement, KeyboardEvent};

use crate::dom;
use crate::sizing::{NoteBoxSizer, DATA_SUPPRESS_FOCUS};

pub(crate) const POPUP_ID: &str = "notes-popup";
pub(crate) const POPUP_TITLE_ID: &str = "notes-popup-title";
pub(crate) const POPUP_EDITOR_ID: &str = "notes-popup-editor";

pub(crate) const DATA_POPUP_ID: &str = "data-popup-id";
pub(crate) const DATA_POPUP_TITLE: &str = "data-popup-title";

const FOCUSABLE_SELECTOR: &str =
    "textarea, input, select, button, a[href], [tabindex]:not([tabindex='-1'])";

/// Extract `(id, title)` from a legacy inline `showNotesPopup('<id>', '<title>')`
/// handler attribute. Anything malformed is rejected.
pub(crate) fn parse_legacy_popup_attr(raw: &str) -> Option<(String, String)> {
    let start = raw.find("showNotesPopup(")?;
    let rest = &raw[start + "showNotesPopup(".len()..];

    let (id, rest) = single_quoted(rest)?;
    let rest = rest.trim_start().strip_prefix(',')?;
    let (title, _) = single_quoted(rest)?;

    Some((id, title))
}

fn single_quoted(input: &str) -> Option<(String, &str)> {
    let s = input.trim_start().strip_prefix('\'')?;
    let end = s.find('\'')?;
    Some((s[..end].to_string(), &s[end + 1..]))
}

/// The modal notes editor. closed → open → closed.
///
/// Responsibilities:
/// - source tracking and text round-trip into the popup editor field
/// - the focus trap: one document keydown handler, Tab/Shift+Tab cycling,
///   Escape closing; the handler is removed before any replacement
/// - the legacy window globals other sheet scripts read
///
/// Only one popup exists; opening while open replaces the source.
#[derive(Clone)]
pub(crate) struct PopupController {
    sizer: NoteBoxSizer,

    active: RwSignal<bool>,
    source_id: RwSignal<Option<String>>,

    key_handle: StoredValue<Option<WindowListenerHandle>>,
}

impl PopupController {
    pub fn new(sizer: NoteBoxSizer) -> Self {
        Self {
            sizer,
            active: RwSignal::new(false),
            source_id: RwSignal::new(None),
            key_handle: StoredValue::new(None),
        }
    }

    #[allow(dead_code)]
    pub(crate) fn is_open(&self) -> bool {
        self.active.get_untracked()
    }

    #[allow(dead_code)]
    pub(crate) fn has_key_handler(&self) -> bool {
        self.key_handle.with_value(|slot| slot.is_some())
    }

    /// Open the editor over `source`, copying its text in.
    pub fn open(&self, source: &HtmlTextAreaElement) {
        let el: &Element = source.as_ref();
        let key = dom::element_key(el);

        // Legacy collaborators read these to know which field the edit
        // applies to.
        set_window_value("currentNotesField", &JsValue::from_str(&key));
        set_window_value("currentNotesElement", source.as_ref());

        self.source_id.set(Some(key));
        set_popup_title(
            &el.get_attribute(DATA_POPUP_TITLE)
                .unwrap_or_else(|| "Notes".to_string()),
        );

        if let Some(editor) = editor_field() {
            editor.set_value(&source.value());
        }

        self.active.set(true);
        show_popup_element(true);
        call_window_fn("showPopup", POPUP_ID);

        self.install_key_handler();
        self.focus_editor_soon();
    }

    /// Close the editor, write the text back and return focus to the source.
    pub fn close(&self) {
        self.remove_key_handler();
        if !self.active.get_untracked() {
            return;
        }
        self.active.set(false);

        show_popup_element(false);
        call_window_fn("closePopup", POPUP_ID);

        if let Some(source) = self.take_source() {
            if let Some(editor) = editor_field() {
                source.set_value(&editor.value());
            }

            // Refocusing must not re-trigger the focus sizing pass; the
            // marker is consumed by the field's focus handler.
            let el: &Element = source.as_ref();
            let _ = el.set_attribute(DATA_SUPPRESS_FOCUS, "1");
            let _ = source.focus();

            // The edited text may need a different height.
            self.sizer.fit(&source);
        }

        set_window_value("currentNotesField", &JsValue::NULL);
        set_window_value("currentNotesElement", &JsValue::NULL);
    }

    fn take_source(&self) -> Option<HtmlTextAreaElement> {
        let id = self.source_id.get_untracked()?;
        self.source_id.set(None);

        let doc = web_sys::window()?.document()?;
        doc.get_element_by_id(&id)?.dyn_into().ok()
    }

    fn install_key_handler(&self) {
        // Exactly one handler at a time: drop any previous one first.
        self.remove_key_handler();

        let ctrl = self.clone();
        let handle = window_event_listener(ev::keydown, move |ev: KeyboardEvent| {
            ctrl.on_keydown(&ev);
        });
        self.key_handle.set_value(Some(handle));
    }

    fn remove_key_handler(&self) {
        self.key_handle.update_value(|slot| {
            if let Some(handle) = slot.take() {
                handle.remove();
            }
        });
    }

    fn on_keydown(&self, ev: &KeyboardEvent) {
        if !self.active.get_untracked() {
            return;
        }
        match ev.key().as_str() {
            "Escape" => {
                ev.prevent_default();
                self.close();
            }
            "Tab" => self.cycle_focus(ev),
            _ => {}
        }
    }

    /// Keep keyboard focus inside the popup while it is open.
    fn cycle_focus(&self, ev: &KeyboardEvent) {
        let Some(doc) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        let Some(popup) = doc.get_element_by_id(POPUP_ID) else {
            return;
        };
        let Ok(list) = popup.query_selector_all(FOCUSABLE_SELECTOR) else {
            return;
        };

        let mut focusables: Vec<HtmlElement> = Vec::new();
        for i in 0..list.length() {
            let Some(node) = list.item(i) else { continue };
            if let Ok(el) = node.dyn_into::<HtmlElement>() {
                focusables.push(el);
            }
        }
        if focusables.is_empty() {
            return;
        }
        ev.prevent_default();

        let active = doc.active_element();
        let idx = active.as_ref().and_then(|a| {
            focusables.iter().position(|f| {
                let node: &web_sys::Node = f.as_ref();
                a.is_same_node(Some(node))
            })
        });

        let len = focusables.len();
        let next = if ev.shift_key() {
            match idx {
                None | Some(0) => len - 1,
                Some(i) => i - 1,
            }
        } else {
            match idx {
                None => 0,
                Some(i) => (i + 1) % len,
            }
        };
        let _ = focusables[next].focus();
    }

    fn focus_editor_soon(&self) {
        let Some(win) = web_sys::window() else {
            return;
        };

        let ctrl = self.clone();
        let cb = Closure::once_into_js(move || {
            if !ctrl.active.get_untracked() {
                return;
            }
            if let Some(editor) = editor_field() {
                let _ = editor.focus();
            }
        });
        let _ = win
            .set_timeout_with_callback_and_timeout_and_arguments_0(cb.as_ref().unchecked_ref(), 0);
    }
}

/// Take over a legacy `onclick="showNotesPopup('<id>', '<title>')"` wiring:
/// keep the id/title as data attributes, drop the inline handler, open the
/// popup on double-click instead.
pub(crate) fn adopt_legacy_markup(textarea: &HtmlTextAreaElement, popup: &PopupController) {
    let el: &Element = textarea.as_ref();
    let Some(raw) = el.get_attribute("onclick") else {
        return;
    };
    let Some((id, title)) = parse_legacy_popup_attr(&raw) else {
        return;
    };

    let _ = el.set_attribute(DATA_POPUP_ID, &id);
    let _ = el.set_attribute(DATA_POPUP_TITLE, &title);
    let _ = el.remove_attribute("onclick");

    let popup = popup.clone();
    let source = textarea.clone();
    let cb = Closure::<dyn FnMut(web_sys::Event)>::new(move |_ev: web_sys::Event| {
        popup.open(&source);
    });
    let _ = el.add_event_listener_with_callback("dblclick", cb.as_ref().unchecked_ref());
    cb.forget();
}

fn editor_field() -> Option<HtmlTextAreaElement> {
    let doc = web_sys::window()?.document()?;
    doc.get_element_by_id(POPUP_EDITOR_ID)?.dyn_into().ok()
}

fn set_popup_title(title: &str) {
    let Some(doc) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    if let Some(el) = doc.get_element_by_id(POPUP_TITLE_ID) {
        el.set_text_content(Some(title));
    }
}

fn show_popup_element(visible: bool) {
    let Some(doc) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    let Some(el) = doc.get_element_by_id(POPUP_ID) else {
        return;
    };
    let Some(html) = dom::as_html(&el) else {
        return;
    };
    let _ = html
        .style()
        .set_property("display", if visible { "flex" } else { "none" });
}

fn set_window_value(name: &str, value: &JsValue) {
    let Some(win) = web_sys::window() else {
        return;
    };
    let _ = js_sys::Reflect::set(win.as_ref(), &JsValue::from_str(name), value);
}

/// Invoke a collaborator-provided window function, if any. Silent no-op
/// when the host page does not define one.
fn call_window_fn(name: &str, arg: &str) {
    let Some(win) = web_sys::window() else {
        return;
    };
    let Ok(value) = js_sys::Reflect::get(win.as_ref(), &JsValue::from_str(name)) else {
        return;
    };
    let Some(f) = value.dyn_ref::<js_sys::Function>() else {
        return;
    };
    let _ = f.call1(win.as_ref(), &JsValue::from_str(arg));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_legacy_attr() {
        let parsed = parse_legacy_popup_attr("showNotesPopup('feats-notes', 'Feats & Traits')");
        assert_eq!(
            parsed,
            Some(("feats-notes".to_string(), "Feats & Traits".to_string()))
        );
    }

    #[test]
    fn test_parse_legacy_attr_with_surrounding_code() {
        let parsed =
            parse_legacy_popup_attr("return showNotesPopup('a', 'b');").expect("should parse");
        assert_eq!(parsed.0, "a");
        assert_eq!(parsed.1, "b");
    }

    #[test]
    fn test_parse_legacy_attr_rejects_malformed() {
        assert_eq!(parse_legacy_popup_attr("showNotesPopup()"), None);
        assert_eq!(parse_legacy_popup_attr("showNotesPopup('only-id')"), None);
        assert_eq!(parse_legacy_popup_attr("somethingElse('a', 'b')"), None);
        assert_eq!(parse_legacy_popup_attr("showNotesPopup('unterminated"), None);
    }
}
