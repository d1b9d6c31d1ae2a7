//! Configuration system for Recipebook.
//!
//! Provides TOML-based configuration with:
//! - `[server]`, `[database]` and `[session]` sections, all optional
//! - Config file layering (user config dir + project-local overrides)
//!
//! Command-line flags override file values; that layer lives in the binary.

pub mod discovery;
pub mod error;
pub mod types;

pub use discovery::{
    LoadedConfig, load_config, load_config_file, load_config_with_options,
    user_config_dir, user_config_path,
};
pub use error::{ConfigError, Result};
pub use types::*;
