pub mod config;
pub mod logging;

pub mod classify;
pub mod error_log;
pub mod handler;
pub mod retry;
pub mod storage;

pub use classify::{classify, to_user_message, ErrorKind, NormalizedError};
pub use handler::{ErrorHandler, HandledError};
