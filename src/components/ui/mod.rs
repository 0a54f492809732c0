pub mod button;
pub mod note_box;
pub mod popup;
pub mod section;

// Re-export component symbols so callers can `use crate::components::ui::Button` etc.
pub use button::*;
pub use note_box::*;
pub use popup::*;
pub use section::*;
