//! CLI utilities for the expense tracker build tools
//!
//! Provides shared terminal output:
//! - Status messages
//! - Diagnostic listings
//! - Aligned key/value summaries

#![warn(missing_docs)]

pub mod output;
