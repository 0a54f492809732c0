use leptos::html;
use leptos::prelude::*;
use tw_merge::tw_merge;

use crate::components::ui::button::{Button, ButtonSize, ButtonVariant};
use crate::registry::register_note_box;
use crate::state::AppContext;

/// Which note-box class the markup gets; the sizing layer selects on these.
#[derive(Clone, Copy, Default, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "kebab-case")]
pub enum NoteBoxKind {
    Basic,
    #[default]
    Notes,
    TableNotes,
}

/// An auto-growing textarea wired to the sizing engine on mount.
///
/// With a `popup_title`, the field also offers the modal notes editor.
#[component]
pub fn NoteBox(
    #[prop(into)] name: String,
    #[prop(optional, into)] class: String,
    #[prop(optional, into)] placeholder: String,
    #[prop(into, optional)] popup_title: Option<String>,
    #[prop(default = NoteBoxKind::default())] kind: NoteBoxKind,
) -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let sizer = app_state.0.sizer.clone();
    let popup = app_state.0.popup.clone();

    let node_ref: NodeRef<html::Textarea> = NodeRef::new();

    {
        let sizer = sizer.clone();
        let popup = popup.clone();
        Effect::new(move |_| {
            let Some(el) = node_ref.get() else {
                return;
            };
            register_note_box(&el, &sizer, &popup);
        });
    }

    let merged_class = tw_merge!(
        "w-full resize-none rounded-md border bg-transparent px-3 py-2 text-sm outline-none focus-visible:ring-2 focus-visible:ring-ring",
        kind.to_string(),
        class
    );

    let expand_button = popup_title.is_some().then(|| {
        let popup = popup.clone();
        view! {
            <div class="flex justify-end">
                <Button
                    variant=ButtonVariant::Ghost
                    size=ButtonSize::Sm
                    on:click=move |_| {
                        if let Some(el) = node_ref.get_untracked() {
                            popup.open(&el);
                        }
                    }
                >
                    "Expand"
                </Button>
            </div>
        }
    });

    view! {
        <div class="relative flex min-h-0 flex-1 flex-col gap-1">
            <textarea
                class=merged_class
                name=name
                placeholder=placeholder
                data-popup-title=popup_title
                node_ref=node_ref
            ></textarea>
            {expand_button}
        </div>
    }
}
