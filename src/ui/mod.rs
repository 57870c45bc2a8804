//! UI components

pub mod dialog;
mod dialog_helpers;
pub mod panel;
pub mod spinner;
pub mod status;
pub mod theme;
pub mod viewer;

pub use dialog::{BucketSelector, MkdirDialog, SearchDialog, SimpleConfirmDialog, UploadPromptDialog};
pub use panel::PanelWidget;
pub use spinner::{SpinnerDialog, UploadProgressDialog};
pub use status::{Breadcrumb, KeyBar, StatusBar};
pub use theme::Theme;
pub use theme::ThemeConfig;
pub use viewer::FileViewer;
