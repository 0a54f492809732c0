use crate::pages::SheetPage;
use crate::registry;
use crate::state::{AppContext, AppState};
use leptos::prelude::*;
use leptos_router::components::{Route, Router, Routes};
use leptos_router::path;

#[component]
pub fn App() -> impl IntoView {
    let state = AppState::new();
    provide_context(AppContext(state.clone()));

    // Fields created outside the component tree still get the sizing
    // behavior: adopt what is already present, then watch for insertions.
    registry::rescan(&state.sizer, &state.popup);
    registry::install_document_watcher(state.sizer.clone(), state.popup.clone());

    // IMPORTANT:
    // - Leptos CSR requires the `csr` feature on `leptos`.
    // - router hooks require a <Router> context.
    view! {
        <Router>
            <Routes fallback=|| view! { <div class="px-4 py-8 text-xs text-muted-foreground">"Not found"</div> }>
                <Route path=path!("") view=SheetPage />
            </Routes>
        </Router>
    }
}
