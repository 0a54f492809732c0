use crate::config::SheetConfig;
use crate::popup::PopupController;
use crate::sizing::{NoteBoxSizer, SizingPolicy};

/// Long-lived pieces shared across the sheet: the parsed config and the
/// behavior controllers. Created once at app start.
#[derive(Clone)]
pub(crate) struct AppState {
    pub config: SheetConfig,
    pub sizer: NoteBoxSizer,
    pub popup: PopupController,
}

impl AppState {
    pub fn new() -> Self {
        let config = SheetConfig::load();
        let sizer = NoteBoxSizer::new(SizingPolicy::default(), config.clone());
        let popup = PopupController::new(sizer.clone());

        Self {
            config,
            sizer,
            popup,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone)]
pub(crate) struct AppContext(pub AppState);
