pub mod handlers;
pub mod storage;

pub use handlers::{DirState, SendFileState};
pub use storage::{store_upload, StoredUpload};
