//! egui panels. Panels render state and report user intents back as
//! action values; side effects stay in the app layer.

pub mod chat_panel;
pub mod editor_panel;
pub mod status_bar;

pub use chat_panel::ChatAction;
pub use editor_panel::EditorAction;
