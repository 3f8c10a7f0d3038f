// ABOUTME: Configuration for the injected I/O handle

pub use crate::io_handle::IoHandleConfig;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
