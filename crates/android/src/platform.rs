//! Platform-provided defaults
//!
//! The Flutter Gradle plugin exposes SDK levels and the app version as
//! `flutter.*` properties. They are injected here instead of being looked
//! up from a global, so resolution stays a pure function.

use crate::error::UnresolvedReferenceError;
use expense_tracker_core::config::PlatformConfig;
use std::collections::BTreeMap;

/// Compile SDK level chosen by the Flutter plugin
pub const COMPILE_SDK_VERSION: &str = "flutter.compileSdkVersion";
/// Minimum SDK level chosen by the Flutter plugin
pub const MIN_SDK_VERSION: &str = "flutter.minSdkVersion";
/// Target SDK level chosen by the Flutter plugin
pub const TARGET_SDK_VERSION: &str = "flutter.targetSdkVersion";
/// NDK version pinned by the Flutter plugin
pub const NDK_VERSION: &str = "flutter.ndkVersion";
/// Build number from `pubspec.yaml`
pub const VERSION_CODE: &str = "flutter.versionCode";
/// Build name from `pubspec.yaml`
pub const VERSION_NAME: &str = "flutter.versionName";

/// A value a reference can resolve to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformValue {
    /// API levels and version codes
    Integer(i64),
    /// NDK versions and version names
    Text(String),
}

/// Values available to `resolve`, keyed by reference path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlatformDefaults {
    values: BTreeMap<String, PlatformValue>,
}

impl PlatformDefaults {
    /// No values; every reference fails to resolve
    pub fn new() -> Self {
        Self::default()
    }

    /// The SDK and NDK values the Flutter plugin always provides
    pub fn flutter(compile_sdk: u32, min_sdk: u32, target_sdk: u32, ndk_version: impl Into<String>) -> Self {
        Self::new()
            .with_value(COMPILE_SDK_VERSION, PlatformValue::Integer(compile_sdk.into()))
            .with_value(MIN_SDK_VERSION, PlatformValue::Integer(min_sdk.into()))
            .with_value(TARGET_SDK_VERSION, PlatformValue::Integer(target_sdk.into()))
            .with_value(NDK_VERSION, PlatformValue::Text(ndk_version.into()))
    }

    /// Flutter values from the `[platform]` configuration section
    pub fn from_config(config: &PlatformConfig) -> Self {
        let mut defaults = Self::flutter(
            config.compile_sdk_version,
            config.min_sdk_version,
            config.target_sdk_version,
            config.ndk_version.clone(),
        );
        if let Some(code) = config.version_code {
            defaults = defaults.with_value(VERSION_CODE, PlatformValue::Integer(code));
        }
        if let Some(name) = &config.version_name {
            defaults = defaults.with_value(VERSION_NAME, PlatformValue::Text(name.clone()));
        }
        defaults
    }

    /// Add or replace the value for `reference`
    pub fn with_value(mut self, reference: impl Into<String>, value: PlatformValue) -> Self {
        self.values.insert(reference.into(), value);
        self
    }

    /// Raw value for `reference`
    pub fn get(&self, reference: &str) -> Option<&PlatformValue> {
        self.values.get(reference)
    }

    /// An API level; fails when missing, textual or out of range
    pub fn level(&self, field: &'static str, reference: &str) -> Result<u32, UnresolvedReferenceError> {
        let value = self.integer(field, reference)?;
        u32::try_from(value).map_err(|_| unresolved(field, reference))
    }

    /// An integer value; `field` names the descriptor setting for the error
    pub fn integer(&self, field: &'static str, reference: &str) -> Result<i64, UnresolvedReferenceError> {
        match self.get(reference) {
            Some(PlatformValue::Integer(v)) => {
                tracing::debug!(field, reference, value = v, "Resolved platform reference");
                Ok(*v)
            }
            _ => Err(unresolved(field, reference)),
        }
    }

    /// A textual value; `field` names the descriptor setting for the error
    pub fn text(&self, field: &'static str, reference: &str) -> Result<String, UnresolvedReferenceError> {
        match self.get(reference) {
            Some(PlatformValue::Text(v)) => {
                tracing::debug!(field, reference, value = %v, "Resolved platform reference");
                Ok(v.clone())
            }
            _ => Err(unresolved(field, reference)),
        }
    }
}

fn unresolved(field: &'static str, reference: &str) -> UnresolvedReferenceError {
    UnresolvedReferenceError {
        field,
        reference: reference.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flutter_defaults() {
        let defaults = PlatformDefaults::flutter(35, 21, 34, "26.5.11845579");
        assert_eq!(defaults.level("android.compileSdk", COMPILE_SDK_VERSION), Ok(35));
        assert_eq!(defaults.level("defaultConfig.minSdk", MIN_SDK_VERSION), Ok(21));
        assert_eq!(
            defaults.text("android.ndkVersion", NDK_VERSION).as_deref(),
            Ok("26.5.11845579")
        );
        assert!(defaults.get(VERSION_CODE).is_none());
    }

    #[test]
    fn test_from_config_includes_version() {
        let config = PlatformConfig {
            version_code: Some(4),
            version_name: Some("1.2.0".to_string()),
            ..PlatformConfig::default()
        };
        let defaults = PlatformDefaults::from_config(&config);
        assert_eq!(defaults.integer("defaultConfig.versionCode", VERSION_CODE), Ok(4));
        assert_eq!(
            defaults.get(VERSION_NAME),
            Some(&PlatformValue::Text("1.2.0".to_string()))
        );
    }

    #[test]
    fn test_level_rejects_text_and_negative() {
        let defaults = PlatformDefaults::new()
            .with_value("custom.level", PlatformValue::Integer(-1))
            .with_value("custom.text", PlatformValue::Text("34".to_string()));

        let err = defaults.level("android.compileSdk", "custom.level").unwrap_err();
        assert_eq!(err.reference, "custom.level");
        assert!(defaults.level("android.compileSdk", "custom.text").is_err());
        assert!(defaults.level("android.compileSdk", "missing").is_err());
    }
}
