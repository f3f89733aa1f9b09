pub mod demo;
pub mod form_field;
pub mod form_view;
pub mod keybindings;
pub mod terminal_guard;

pub use form_view::{StackedFormView, ViewHit};
pub use terminal_guard::TerminalGuard;
