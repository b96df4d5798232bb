//! Tool configuration loading and schema definitions
//!
//! Platform defaults, signing registry entries and release policy shared by
//! every command.

mod loader;
mod schema;

pub use loader::Config;
pub use schema::*;
