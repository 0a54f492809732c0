mod app;
mod components;
mod config;
mod dom;
mod pages;
mod popup;
mod registry;
mod rowsync;
mod sizing;
mod state;

use leptos::prelude::*;

// Needed for `#[wasm_bindgen(start)]` on the wasm entrypoint.
#[cfg(all(target_arch = "wasm32", not(test)))]
use wasm_bindgen::prelude::wasm_bindgen;

// Only register the WASM start function for normal builds (not for tests),
// otherwise wasm-bindgen-test will end up with multiple entry symbols.
#[cfg_attr(all(target_arch = "wasm32", not(test)), wasm_bindgen(start))]
pub fn main() {
    console_error_panic_hook::set_once();
    mount_to_body(app::App);
}

// WASM-only tests (run with `cargo test --target wasm32-unknown-unknown` + wasm-bindgen-test-runner)
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use crate::config::SheetConfig;
    use crate::popup::{PopupController, DATA_POPUP_ID, DATA_POPUP_TITLE};
    use crate::registry::{register_note_box, rescan};
    use crate::sizing::{
        NoteBoxSizer, SizingPolicy, DATA_LAST_HEIGHT, DATA_NOTE_BASE_HEIGHT, DATA_READY,
    };
    use wasm_bindgen::JsCast;
    use wasm_bindgen_test::*;
    use web_sys::HtmlTextAreaElement;

    wasm_bindgen_test_configure!(run_in_browser);

    fn document() -> web_sys::Document {
        web_sys::window().expect("window").document().expect("document")
    }

    fn insert_markup(html: &str) {
        document()
            .body()
            .expect("body")
            .insert_adjacent_html("beforeend", html)
            .expect("should insert fixture markup");
    }

    fn textarea(id: &str) -> HtmlTextAreaElement {
        document()
            .get_element_by_id(id)
            .expect("fixture element")
            .dyn_into()
            .expect("should be a textarea")
    }

    fn controllers() -> (NoteBoxSizer, PopupController) {
        let sizer = NoteBoxSizer::new(SizingPolicy::default(), SheetConfig::default());
        let popup = PopupController::new(sizer.clone());
        (sizer, popup)
    }

    #[wasm_bindgen_test]
    fn test_fit_floors_at_baseline_and_is_idempotent() {
        insert_markup(r#"<textarea id="wt-fit" class="notes"></textarea>"#);
        let (sizer, _popup) = controllers();
        let ta = textarea("wt-fit");

        sizer.fit_once(&ta);

        let el: &web_sys::Element = ta.as_ref();
        let base: f64 = el
            .get_attribute(DATA_NOTE_BASE_HEIGHT)
            .expect("baseline cached")
            .parse()
            .expect("numeric baseline");
        assert!(base >= 160.0);

        let first = el.get_attribute(DATA_LAST_HEIGHT).expect("height recorded");
        let applied: f64 = first.parse().expect("numeric height");
        assert!(applied >= base);

        // Unchanged content: the second pass applies the same height and
        // never lowers the cached baseline.
        sizer.fit_once(&ta);
        assert_eq!(el.get_attribute(DATA_LAST_HEIGHT).as_ref(), Some(&first));
        let base_again: f64 = el
            .get_attribute(DATA_NOTE_BASE_HEIGHT)
            .expect("baseline still cached")
            .parse()
            .expect("numeric baseline");
        assert_eq!(base_again, base);
    }

    #[wasm_bindgen_test]
    fn test_popup_round_trip() {
        insert_markup(
            r#"
            <textarea id="wt-src" class="notes" data-popup-title="Background">abc</textarea>
            <div id="notes-popup" style="display:none">
              <h3 id="notes-popup-title"></h3>
              <textarea id="notes-popup-editor"></textarea>
              <button id="wt-done">Done</button>
            </div>
            "#,
        );
        let (_sizer, popup) = controllers();
        let src = textarea("wt-src");

        popup.open(&src);
        assert!(popup.is_open());
        assert!(popup.has_key_handler());
        assert_eq!(textarea("notes-popup-editor").value(), "abc");
        let title = document()
            .get_element_by_id("notes-popup-title")
            .and_then(|el| el.text_content());
        assert_eq!(title.as_deref(), Some("Background"));

        // Re-opening replaces the handler, it never stacks.
        popup.open(&src);
        assert!(popup.has_key_handler());

        popup.close();
        assert!(!popup.is_open());
        assert!(!popup.has_key_handler());

        let refocused = document()
            .active_element()
            .map(|a| {
                let node: &web_sys::Node = src.as_ref();
                a.is_same_node(Some(node))
            })
            .unwrap_or(false);
        assert!(refocused, "closing must return focus to the source field");
    }

    #[wasm_bindgen_test]
    fn test_register_note_box_is_idempotent() {
        insert_markup(r#"<textarea id="wt-reg" class="basic">hello</textarea>"#);
        let (sizer, popup) = controllers();
        let ta = textarea("wt-reg");

        register_note_box(&ta, &sizer, &popup);
        let el: &web_sys::Element = ta.as_ref();
        assert!(el.has_attribute(DATA_READY));
        let base = el.get_attribute(DATA_NOTE_BASE_HEIGHT);
        assert!(base.is_some());

        register_note_box(&ta, &sizer, &popup);
        assert_eq!(el.get_attribute(DATA_NOTE_BASE_HEIGHT), base);
    }

    #[wasm_bindgen_test]
    fn test_rescan_attaches_inserted_fields_exactly_once() {
        insert_markup(r#"<textarea id="wt-dyn" class="table-notes"></textarea>"#);
        let (sizer, popup) = controllers();

        rescan(&sizer, &popup);
        let ta = textarea("wt-dyn");
        let el: &web_sys::Element = ta.as_ref();
        assert!(el.has_attribute(DATA_READY));
        let last = el.get_attribute(DATA_LAST_HEIGHT);

        // A second burst in the same frame rescans without re-attaching.
        rescan(&sizer, &popup);
        assert_eq!(el.get_attribute(DATA_LAST_HEIGHT), last);
    }

    #[wasm_bindgen_test]
    fn test_legacy_popup_markup_is_adopted() {
        insert_markup(
            r#"<textarea id="wt-legacy" class="notes"
                 onclick="showNotesPopup('journal', 'Journal')"></textarea>"#,
        );
        let (sizer, popup) = controllers();

        rescan(&sizer, &popup);
        let ta = textarea("wt-legacy");
        let el: &web_sys::Element = ta.as_ref();
        assert_eq!(el.get_attribute(DATA_POPUP_ID).as_deref(), Some("journal"));
        assert_eq!(el.get_attribute(DATA_POPUP_TITLE).as_deref(), Some("Journal"));
        assert!(!el.has_attribute("onclick"));
    }
}
