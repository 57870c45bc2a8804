//! Dialog mode handlers

mod bucket;
mod confirm;
mod prompt;

pub use bucket::handle_bucket_selector_mode;
pub use confirm::{handle_simple_confirm_mode, handle_uploading_mode};
pub use prompt::{handle_mkdir_mode, handle_search_mode, handle_upload_prompt_mode};
