pub mod mode;
pub mod panel;
pub mod app;
pub mod ui_state;
pub mod background;
pub mod navigation;
pub mod notify;
pub mod preview;
pub mod upload;

pub use ui_state::UiState;
