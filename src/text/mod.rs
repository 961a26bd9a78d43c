pub mod handlers;
pub mod slot;

pub use handlers::{RecvTextState, SendTextState};
pub use slot::TextSlot;
