//! Configuration system.
//!
//! Hierarchical configuration with the following precedence (highest
//! to lowest):
//!
//! 1. Programmatic overrides (via [`ConfigBuilder::with_config`])
//! 2. Environment variables (`INNKEEP_*`)
//! 3. User config (`{data_dir}/config.yaml`)
//! 4. Built-in defaults
//!
//! # Examples
//!
//! ```
//! use innkeep::config::ConfigBuilder;
//!
//! let config = ConfigBuilder::new()
//!     .skip_files()
//!     .skip_env()
//!     .build()
//!     .unwrap();
//! assert_eq!(config.hold_ttl_minutes, 30);
//! ```

pub mod builder;
pub mod environment;
pub mod loader;
pub mod schema;

pub use builder::ConfigBuilder;
pub use environment::EnvironmentConfig;
pub use loader::ConfigLoader;
pub use schema::{Config, OutputFormat, ResolvedConfig, RetentionConfig};
