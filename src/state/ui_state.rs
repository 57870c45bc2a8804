//! UI-related state that changes during rendering.

/// Layout facts and input flags updated while drawing
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// Visible height for viewer (updated during rendering)
    pub viewer_height: usize,
    /// Whether the current text input field has its content selected
    /// (typing will replace all content). Set on Tab into a field with content.
    pub input_selected: bool,
}
