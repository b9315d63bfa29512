//! Configuration loading
//!
//! Loads [`ClientConfig`](confluence_domain::ClientConfig) from environment
//! variables or JSON/TOML files.

pub mod loader;

// Re-export commonly used items
pub use loader::{load, load_from_env, load_from_file, probe_config_paths};
