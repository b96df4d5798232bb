//! Core utilities for the expense tracker build tools
//!
//! This crate provides shared functionality used by the descriptor tooling:
//!
//! - **Error handling**: Coded errors with context and recovery suggestions
//! - **Configuration**: TOML-based tool configuration with validation
//! - **Validation**: Diagnostic collection (errors and warnings)
//!
//! # Example
//!
//! ```rust,no_run
//! use expense_tracker_core::config::Config;
//!
//! let config = Config::load(None).expect("invalid configuration");
//! println!("descriptor: {}", config.schema.general.descriptor);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod validation;

pub use error::{Error, ErrorCode, Result, ResultExt};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{Config, ConfigSchema};
    pub use crate::error::{exit_codes, Error, ErrorCode, Result, ResultExt};
    pub use crate::validation::{ValidationError, ValidationResult, Validator};
}
