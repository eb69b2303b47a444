//! Claude Desktop config handling: locate, load, merge, save.

pub mod merge;
pub mod paths;

pub use merge::{apply, is_configured, load, remove, save, ServerEntry};
pub use paths::claude_config_path;
