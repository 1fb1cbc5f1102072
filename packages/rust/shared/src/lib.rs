//! Shared types, error model, and configuration for copymark.
//!
//! This crate is the foundation depended on by all other copymark crates.
//! It provides:
//! - [`CopymarkError`]: the unified error type
//! - Domain types ([`CopyTargetType`], [`CopyTargetMeta`], [`CopyTargetBuckets`])
//! - Configuration ([`AppConfig`], [`TargetsConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, RenderConfig, TargetConfig, TargetsConfig, config_dir, config_file_path,
    init_config, init_config_in, load_config, load_config_from,
};
pub use error::{CopymarkError, Result};
pub use types::{CopyTargetBuckets, CopyTargetId, CopyTargetMeta, CopyTargetMode, CopyTargetType};
