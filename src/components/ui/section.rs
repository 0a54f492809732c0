use leptos::html;
use leptos::prelude::*;
use leptos_ui::clx;
use tw_merge::*;

use crate::rowsync::RowSyncController;
use crate::state::AppContext;

mod components {
    use super::*;
    clx! {SheetSection, section, "section flex min-w-0 flex-1 flex-col gap-2 rounded-lg border bg-card p-4 text-card-foreground shadow-sm"}
    clx! {SectionHeader, header, "section-header flex items-center justify-between gap-2"}
    clx! {SectionTitle, h3, "text-sm font-semibold leading-none tracking-tight"}
    clx! {NotesSubsection, section, "section notes-subsection flex min-w-0 flex-1 flex-col gap-2 rounded-lg border bg-card p-4 shadow-sm"}
    clx! {ActionsNotesSection, section, "section actions-notes-section flex flex-col gap-2 rounded-lg border bg-card p-4 shadow-sm"}
}

pub use components::*;

/* ========================================================== */
/*                     ✨ COMPONENTS ✨                       */
/* ========================================================== */

/// A row of sibling panels with equalized heights (desktop viewports).
///
/// Mounting wires a [`RowSyncController`] to the container; the controller
/// is idempotent, so re-renders are harmless.
#[component]
pub fn FlexRow(children: Children, #[prop(optional, into)] class: String) -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let config = app_state.0.config.clone();

    let node_ref: NodeRef<html::Div> = NodeRef::new();

    Effect::new(move |_| {
        let Some(el) = node_ref.get() else {
            return;
        };
        let el: web_sys::HtmlElement = el.into();
        let _ = RowSyncController::install(&el, config.clone());
    });

    let merged_class = tw_merge!("flex-wrap flex flex-row items-stretch gap-3", class);

    view! {
        <div class=merged_class node_ref=node_ref>
            {children()}
        </div>
    }
}
