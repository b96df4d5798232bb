//! Configuration schema definitions

use crate::validation::{ValidationResult, Validator};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Root configuration schema
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigSchema {
    /// `[general]`
    #[serde(default)]
    pub general: GeneralConfig,

    /// `[platform]`
    #[serde(default)]
    pub platform: PlatformConfig,

    /// Signing configurations keyed by name (`[signing.upload]`)
    #[serde(default)]
    pub signing: BTreeMap<String, SigningConfig>,

    /// `[release]`
    #[serde(default)]
    pub release: ReleaseConfig,

    /// `[logging]`
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Log levels accepted by `[logging] level`
pub const LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

impl ConfigSchema {
    /// Check value ranges and names before the configuration is used
    pub fn validate(&self) -> ValidationResult {
        let mut validator = Validator::new()
            .required("general.descriptor", &self.general.descriptor)
            .range(
                "platform.compile_sdk_version",
                self.platform.compile_sdk_version,
                1,
                100,
            )
            .range(
                "platform.min_sdk_version",
                self.platform.min_sdk_version,
                1,
                100,
            )
            .range(
                "platform.target_sdk_version",
                self.platform.target_sdk_version,
                1,
                100,
            )
            .required("platform.ndk_version", &self.platform.ndk_version)
            .one_of("logging.level", &self.logging.level, LOG_LEVELS)
            .warn_if(
                "release.allow_debug_signing",
                self.release.allow_debug_signing,
                "Release builds may be signed with the debug key",
            );

        if let Some(code) = self.platform.version_code {
            validator = validator.range("platform.version_code", code, 1, 2_100_000_000);
        }

        for name in self.signing.keys() {
            validator = validator.pattern(
                &format!("signing.{}", name),
                name,
                r"^[A-Za-z][A-Za-z0-9_-]*$",
                "a signing config name",
            );
        }

        validator.validate()
    }
}

/// General project configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Path of the Android application build descriptor
    #[serde(default = "default_descriptor")]
    pub descriptor: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            descriptor: default_descriptor(),
        }
    }
}

fn default_descriptor() -> String {
    "android/app/build.gradle.kts".to_string()
}

/// Values the Flutter Gradle plugin exposes as `flutter.*`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// `flutter.compileSdkVersion`
    #[serde(default = "default_compile_sdk")]
    pub compile_sdk_version: u32,

    /// `flutter.minSdkVersion`
    #[serde(default = "default_min_sdk")]
    pub min_sdk_version: u32,

    /// `flutter.targetSdkVersion`
    #[serde(default = "default_target_sdk")]
    pub target_sdk_version: u32,

    /// `flutter.ndkVersion`
    #[serde(default = "default_ndk_version")]
    pub ndk_version: String,

    /// Build number from `pubspec.yaml`, when known
    #[serde(default)]
    pub version_code: Option<i64>,

    /// Build name from `pubspec.yaml`, when known
    #[serde(default)]
    pub version_name: Option<String>,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            compile_sdk_version: default_compile_sdk(),
            min_sdk_version: default_min_sdk(),
            target_sdk_version: default_target_sdk(),
            ndk_version: default_ndk_version(),
            version_code: None,
            version_name: None,
        }
    }
}

fn default_compile_sdk() -> u32 {
    35
}

fn default_min_sdk() -> u32 {
    21
}

fn default_target_sdk() -> u32 {
    35
}

fn default_ndk_version() -> String {
    "26.5.11845579".to_string()
}

/// A named signing credential set
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SigningConfig {
    /// Keystore path, `~` and `$VARS` are expanded
    #[serde(default)]
    pub store_file: Option<String>,

    /// Key alias inside the keystore
    #[serde(default)]
    pub key_alias: Option<String>,

    /// Not suitable for distribution
    #[serde(default)]
    pub placeholder: bool,
}

/// Distribution policy
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ReleaseConfig {
    /// Accept release builds signed with a placeholder (debug) key
    #[serde(default)]
    pub allow_debug_signing: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default log level when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}
