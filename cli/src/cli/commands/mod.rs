//! Command implementations.

pub mod draft;
pub mod system;

pub use draft::{handle_check, handle_clear, handle_save, handle_show, SaveRequest};
pub use system::{handle_completions, handle_doctor};
