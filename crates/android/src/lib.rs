//! Android build descriptor tooling for the expense tracker
//!
//! This crate provides:
//! - The build descriptor model (`build.gradle.kts` as data)
//! - A Gradle Kotlin DSL loader
//! - Resolution of `flutter.*` placeholders against platform defaults
//! - Descriptor validation and release checks
//!
//! # Example
//!
//! ```rust
//! use expense_tracker_android::{parse_descriptor, PlatformDefaults, SigningRegistry};
//!
//! let descriptor = parse_descriptor(r#"
//! android {
//!     compileSdk = flutter.compileSdkVersion
//!     defaultConfig {
//!         applicationId = "org.co.per.expensetracker"
//!         minSdk = flutter.minSdkVersion
//!         targetSdk = 34
//!         versionCode = 2
//!     }
//! }
//! "#).unwrap();
//!
//! let resolved = descriptor
//!     .resolve(&PlatformDefaults::flutter(35, 21, 35, "26.5.11845579"))
//!     .unwrap();
//! assert!(resolved.validate(&SigningRegistry::new()).is_ok());
//! ```

#![warn(missing_docs)]

pub mod descriptor;
pub mod error;
pub mod gradle;
pub mod platform;
pub mod release;
pub mod signing;

pub use descriptor::{BuildDescriptor, BuildType, Dependency, SdkVersions, Setting};
pub use error::{
    ConfigurationError, DescriptorError, ReleaseError, Result, UnresolvedReferenceError,
};
pub use gradle::{load_descriptor, parse_descriptor};
pub use platform::{PlatformDefaults, PlatformValue};
pub use release::{check_release, check_release_after, ReleasePolicy};
pub use signing::{SigningEntry, SigningRegistry};
