use icons::X;
use leptos::prelude::*;

use crate::components::ui::button::{Button, ButtonSize, ButtonVariant};
use crate::popup::{POPUP_EDITOR_ID, POPUP_ID, POPUP_TITLE_ID};
use crate::state::AppContext;

/// Modal notes editor markup. Hidden until the controller shows it; all
/// open/close/trap behavior lives on `PopupController`.
#[component]
pub fn NotesPopup() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let popup = app_state.0.popup.clone();

    let close = {
        let popup = popup.clone();
        move |_ev: web_sys::MouseEvent| popup.close()
    };

    view! {
        <div
            id=POPUP_ID
            class="fixed left-1/2 top-1/2 z-50 w-full max-w-lg -translate-x-1/2 -translate-y-1/2 flex-col gap-3 rounded-2xl border bg-background p-6 shadow-lg"
            style="display: none;"
        >
            <div class="flex items-center justify-between gap-2">
                <h3 id=POPUP_TITLE_ID class="text-lg font-semibold leading-none"></h3>
                <button
                    type="button"
                    class="rounded-sm p-1 outline-none focus:ring-2 focus:ring-ring"
                    aria-label="Close notes editor"
                    on:click=close.clone()
                >
                    <X />
                </button>
            </div>

            <textarea
                id=POPUP_EDITOR_ID
                class="min-h-[240px] w-full resize-y rounded-md border bg-transparent px-3 py-2 text-sm outline-none focus-visible:ring-2 focus-visible:ring-ring"
            ></textarea>

            <footer class="flex justify-end gap-2">
                <Button variant=ButtonVariant::Outline size=ButtonSize::Sm on:click=close>
                    "Done"
                </Button>
            </footer>
        </div>
    }
}
