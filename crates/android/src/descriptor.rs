//! Android application build descriptor
//!
//! The in-memory form of `android/app/build.gradle.kts`: plugin chain,
//! SDK levels, application identity, compile options, build types and
//! dependency coordinates. A descriptor is an immutable value; [`resolve`]
//! produces a new, fully concrete descriptor and [`validate`] only reads.
//!
//! [`resolve`]: BuildDescriptor::resolve
//! [`validate`]: BuildDescriptor::validate

use crate::error::{ConfigurationError, UnresolvedReferenceError};
use crate::platform::PlatformDefaults;
use crate::signing::SigningRegistry;
use expense_tracker_core::validation::{ValidationError, ValidationResult};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Android application Gradle plugin
pub const ANDROID_APPLICATION_PLUGIN: &str = "com.android.application";

/// Kotlin Android plugin, under its short and fully qualified ids
pub const KOTLIN_ANDROID_PLUGINS: &[&str] = &["kotlin-android", "org.jetbrains.kotlin.android"];

/// Flutter Gradle plugin
pub const FLUTTER_PLUGIN: &str = "dev.flutter.flutter-gradle-plugin";

/// Dependency configuration that supplies the desugaring runtime
pub const DESUGARING_CONFIGURATION: &str = "coreLibraryDesugaring";

static APPLICATION_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z][a-zA-Z0-9_]*(\.[a-zA-Z][a-zA-Z0-9_]*)+$").expect("valid regex")
});

/// A setting that is either written out or inherited from the platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Setting<T> {
    /// Written out in the descriptor
    Value(T),
    /// Dotted property path, e.g. `flutter.minSdkVersion`
    Reference(String),
}

impl<T> Setting<T> {
    /// The concrete value, if any
    pub fn value(&self) -> Option<&T> {
        match self {
            Setting::Value(v) => Some(v),
            Setting::Reference(_) => None,
        }
    }

    /// The platform reference, if any
    pub fn reference(&self) -> Option<&str> {
        match self {
            Setting::Value(_) => None,
            Setting::Reference(r) => Some(r),
        }
    }

    /// True for [`Setting::Value`]
    pub fn is_concrete(&self) -> bool {
        matches!(self, Setting::Value(_))
    }
}

impl<T: fmt::Display> fmt::Display for Setting<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Setting::Value(v) => write!(f, "{}", v),
            Setting::Reference(r) => write!(f, "{}", r),
        }
    }
}

/// API levels by role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SdkVersions {
    /// `android.compileSdk`
    pub compile: Setting<u32>,
    /// `defaultConfig.minSdk`
    pub min: Setting<u32>,
    /// `defaultConfig.targetSdk`
    pub target: Setting<u32>,
}

/// `android.compileOptions`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileOptions {
    /// Java language level of the sources
    pub source_compatibility: Option<u32>,
    /// Java language level of the bytecode
    pub target_compatibility: Option<u32>,
    /// `isCoreLibraryDesugaringEnabled`
    pub core_library_desugaring: bool,
}

/// A build variant such as `debug` or `release`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildType {
    /// Variant name
    pub name: String,
    /// Name of the signing config the variant is signed with
    pub signing_config: Option<String>,
    /// `isMinifyEnabled`
    pub minify_enabled: Option<bool>,
}

impl BuildType {
    /// An unsigned build type
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            signing_config: None,
            minify_enabled: None,
        }
    }
}

/// An external library, `group:name[:version[:classifier]]` in a configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    /// Gradle configuration, e.g. `implementation`
    pub configuration: String,
    /// Maven group id
    pub group: String,
    /// Maven artifact id
    pub name: String,
    /// Requested version
    pub version: Option<String>,
    /// Artifact classifier, e.g. `natives-linux`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifier: Option<String>,
}

impl Dependency {
    /// Parse a `group:name[:version[:classifier]][@ext]` notation
    ///
    /// The artifact extension is dropped; it does not change the coordinate.
    pub fn parse(configuration: impl Into<String>, notation: &str) -> Option<Self> {
        let notation = notation.split_once('@').map_or(notation, |(n, _)| n);
        let mut parts = notation.split(':');
        let group = parts.next().filter(|s| !s.is_empty())?;
        let name = parts.next().filter(|s| !s.is_empty())?;
        let version = parts.next().filter(|s| !s.is_empty()).map(String::from);
        let classifier = parts.next().filter(|s| !s.is_empty()).map(String::from);
        if parts.next().is_some() {
            return None;
        }
        Some(Self {
            configuration: configuration.into(),
            group: group.to_string(),
            name: name.to_string(),
            version,
            classifier,
        })
    }

    /// Identity used for uniqueness: `group:name`
    pub fn coordinate(&self) -> String {
        format!("{}:{}", self.group, self.name)
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group, self.name)?;
        if let Some(version) = &self.version {
            write!(f, ":{}", version)?;
        }
        if let Some(classifier) = &self.classifier {
            write!(f, ":{}", classifier)?;
        }
        Ok(())
    }
}

/// Everything the app module's `build.gradle.kts` declares
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildDescriptor {
    /// Plugin ids in application order
    pub plugins: Vec<String>,
    /// `android.namespace`
    pub namespace: Option<String>,
    /// `defaultConfig.applicationId`
    pub application_id: String,
    /// SDK levels
    pub sdk: SdkVersions,
    /// `android.ndkVersion`
    pub ndk_version: Option<Setting<String>>,
    /// `defaultConfig.versionCode`
    pub version_code: Setting<i64>,
    /// `defaultConfig.versionName`
    pub version_name: Option<Setting<String>>,
    /// `android.compileOptions`
    pub compile_options: CompileOptions,
    /// Kotlin `jvmToolchain(n)`
    pub jvm_toolchain: Option<u32>,
    /// Kotlin `kotlinOptions.jvmTarget`
    pub jvm_target: Option<u32>,
    /// `android.buildTypes` in declaration order
    pub build_types: Vec<BuildType>,
    /// Signing configs declared inline under `signingConfigs { }`
    pub signing_configs: Vec<String>,
    /// `flutter { source = ... }`
    pub flutter_source: Option<String>,
    /// `dependencies { }` entries in declaration order
    pub dependencies: Vec<Dependency>,
}

impl BuildDescriptor {
    /// A minimal descriptor with concrete SDK levels and version code
    pub fn new(application_id: impl Into<String>, min: u32, target: u32, compile: u32) -> Self {
        Self {
            plugins: Vec::new(),
            namespace: None,
            application_id: application_id.into(),
            sdk: SdkVersions {
                compile: Setting::Value(compile),
                min: Setting::Value(min),
                target: Setting::Value(target),
            },
            ndk_version: None,
            version_code: Setting::Value(1),
            version_name: None,
            compile_options: CompileOptions::default(),
            jvm_toolchain: None,
            jvm_target: None,
            build_types: Vec::new(),
            signing_configs: Vec::new(),
            flutter_source: None,
            dependencies: Vec::new(),
        }
    }

    /// Build type by name
    pub fn build_type(&self, name: &str) -> Option<&BuildType> {
        self.build_types.iter().find(|bt| bt.name == name)
    }

    /// Signing config the `release` build type points at
    pub fn signing_config_ref(&self) -> Option<&str> {
        self.build_type("release")
            .and_then(|bt| bt.signing_config.as_deref())
    }

    /// True when no setting is still a platform reference
    pub fn is_concrete(&self) -> bool {
        self.sdk.compile.is_concrete()
            && self.sdk.min.is_concrete()
            && self.sdk.target.is_concrete()
            && self.version_code.is_concrete()
            && self.ndk_version.as_ref().is_none_or(Setting::is_concrete)
            && self.version_name.as_ref().is_none_or(Setting::is_concrete)
    }

    /// Replace every platform reference with the value `defaults` supplies
    ///
    /// Concrete settings are kept as they are, so resolving an already
    /// resolved descriptor returns an equal descriptor.
    pub fn resolve(
        &self,
        defaults: &PlatformDefaults,
    ) -> Result<BuildDescriptor, UnresolvedReferenceError> {
        let mut resolved = self.clone();

        resolved.sdk.compile = resolve_level(&self.sdk.compile, "android.compileSdk", defaults)?;
        resolved.sdk.min = resolve_level(&self.sdk.min, "defaultConfig.minSdk", defaults)?;
        resolved.sdk.target = resolve_level(&self.sdk.target, "defaultConfig.targetSdk", defaults)?;

        resolved.version_code = match &self.version_code {
            Setting::Reference(r) => {
                Setting::Value(defaults.integer("defaultConfig.versionCode", r)?)
            }
            concrete => concrete.clone(),
        };

        if let Some(Setting::Reference(r)) = &self.ndk_version {
            resolved.ndk_version = Some(Setting::Value(defaults.text("android.ndkVersion", r)?));
        }
        if let Some(Setting::Reference(r)) = &self.version_name {
            resolved.version_name =
                Some(Setting::Value(defaults.text("defaultConfig.versionName", r)?));
        }

        Ok(resolved)
    }

    /// Check the descriptor, failing with the first configuration error
    ///
    /// On success the returned result carries the non-fatal warnings.
    pub fn validate(&self, registry: &SigningRegistry) -> Result<ValidationResult, ConfigurationError> {
        if let Some(err) = self.configuration_errors(registry).into_iter().next() {
            return Err(err);
        }
        let mut result = ValidationResult::new();
        for warning in self.warnings(registry) {
            result.add_warning(warning);
        }
        Ok(result)
    }

    /// Every finding, errors and warnings, as diagnostics
    pub fn diagnose(&self, registry: &SigningRegistry) -> ValidationResult {
        let mut result = ValidationResult::new();
        for err in self.configuration_errors(registry) {
            result.add_error(ValidationError::new(err.field(), err.code(), err.to_string()));
        }
        for warning in self.warnings(registry) {
            result.add_warning(warning);
        }
        result
    }

    /// All configuration errors, in check order
    pub fn configuration_errors(&self, registry: &SigningRegistry) -> Vec<ConfigurationError> {
        let mut errors = Vec::new();

        if !APPLICATION_ID.is_match(&self.application_id) {
            errors.push(ConfigurationError::MalformedApplicationId(
                self.application_id.clone(),
            ));
        }

        self.check_sdk_ordering(&mut errors);

        if let Setting::Value(code) = self.version_code {
            if code < 1 {
                errors.push(ConfigurationError::NonPositiveVersionCode(code));
            }
        }

        for build_type in &self.build_types {
            if let Some(name) = &build_type.signing_config {
                if !registry.contains(name) && !self.signing_configs.contains(name) {
                    errors.push(ConfigurationError::UnknownSigningConfig {
                        build_type: build_type.name.clone(),
                        signing_config: name.clone(),
                    });
                }
            }
        }

        let mut seen: BTreeMap<String, &Dependency> = BTreeMap::new();
        for dependency in &self.dependencies {
            if let Some(first) = seen.insert(dependency.coordinate(), dependency) {
                errors.push(ConfigurationError::DuplicateDependencyCoordinate {
                    coordinate: dependency.coordinate(),
                    first: first.to_string(),
                    second: dependency.to_string(),
                });
            }
        }

        self.check_plugin_order(&mut errors);
        self.check_language_level(&mut errors);

        if self.compile_options.core_library_desugaring
            && !self
                .dependencies
                .iter()
                .any(|d| d.configuration == DESUGARING_CONFIGURATION)
        {
            errors.push(ConfigurationError::MissingDesugaringLibrary);
        }

        errors
    }

    fn check_sdk_ordering(&self, errors: &mut Vec<ConfigurationError>) {
        let min = ("defaultConfig.minSdk", self.sdk.min.value());
        let target = ("defaultConfig.targetSdk", self.sdk.target.value());
        let compile = ("android.compileSdk", self.sdk.compile.value());

        let mut pairs = vec![(min, target), (target, compile)];
        // With targetSdk inherited, min and compile are still comparable.
        if target.1.is_none() {
            pairs.push((min, compile));
        }

        for ((lower_field, lower), (upper_field, upper)) in pairs {
            if let (Some(&lower), Some(&upper)) = (lower, upper) {
                if lower > upper {
                    errors.push(ConfigurationError::InvalidVersionOrdering {
                        lower_field,
                        lower,
                        upper_field,
                        upper,
                    });
                }
            }
        }
    }

    fn check_plugin_order(&self, errors: &mut Vec<ConfigurationError>) {
        let Some(flutter) = self.plugins.iter().position(|p| p == FLUTTER_PLUGIN) else {
            return;
        };
        for plugin in &self.plugins[flutter + 1..] {
            if plugin == ANDROID_APPLICATION_PLUGIN || KOTLIN_ANDROID_PLUGINS.contains(&plugin.as_str()) {
                errors.push(ConfigurationError::PluginOrder {
                    plugin: FLUTTER_PLUGIN.to_string(),
                    required_before: plugin.clone(),
                });
            }
        }
    }

    fn check_language_level(&self, errors: &mut Vec<ConfigurationError>) {
        let levels = [
            ("compileOptions.sourceCompatibility", self.compile_options.source_compatibility),
            ("compileOptions.targetCompatibility", self.compile_options.target_compatibility),
            ("kotlin.jvmToolchain", self.jvm_toolchain),
            ("kotlinOptions.jvmTarget", self.jvm_target),
        ];
        let mut declared = levels
            .into_iter()
            .filter_map(|(field, level)| level.map(|l| (field, l)));
        let Some((_, expected)) = declared.next() else {
            return;
        };
        for (field, found) in declared {
            if found != expected {
                errors.push(ConfigurationError::LanguageLevelMismatch {
                    field,
                    expected,
                    found,
                });
            }
        }
    }

    fn warnings(&self, registry: &SigningRegistry) -> Vec<ValidationError> {
        let mut warnings = Vec::new();

        if self.application_id.starts_with("com.example.") {
            warnings.push(
                ValidationError::new(
                    "defaultConfig.applicationId",
                    "TEMPLATE_APPLICATION_ID",
                    "applicationId uses the com.example template prefix and cannot be published",
                )
                .with_actual(&self.application_id),
            );
        }

        if let Some(namespace) = self.namespace.as_deref().filter(|n| n.starts_with("com.example.")) {
            warnings.push(
                ValidationError::new(
                    "android.namespace",
                    "TEMPLATE_NAMESPACE",
                    "namespace still uses the com.example template prefix",
                )
                .with_actual(namespace),
            );
        }

        if let Some(Setting::Value(name)) = &self.version_name {
            if semver::Version::parse(name).is_err() {
                warnings.push(
                    ValidationError::new(
                        "defaultConfig.versionName",
                        "NON_SEMVER_VERSION_NAME",
                        "versionName is not a semantic version",
                    )
                    .with_expected("MAJOR.MINOR.PATCH")
                    .with_actual(name),
                );
            }
        }

        // Placeholder keys are expected on the debug variant.
        for build_type in self.build_types.iter().filter(|bt| bt.name != "debug") {
            let Some(name) = build_type.signing_config.as_deref() else {
                continue;
            };
            if registry.get(name).is_some_and(|entry| entry.placeholder) {
                warnings.push(
                    ValidationError::new(
                        format!("buildTypes.{}.signingConfig", build_type.name),
                        "PLACEHOLDER_SIGNING",
                        format!(
                            "'{}' is signed with placeholder credentials '{}', not suitable for distribution",
                            build_type.name, name
                        ),
                    )
                    .with_actual(name),
                );
            }
        }

        warnings
    }
}

fn resolve_level(
    setting: &Setting<u32>,
    field: &'static str,
    defaults: &PlatformDefaults,
) -> Result<Setting<u32>, UnresolvedReferenceError> {
    match setting {
        Setting::Reference(r) => Ok(Setting::Value(defaults.level(field, r)?)),
        concrete => Ok(concrete.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn flutter_defaults() -> PlatformDefaults {
        PlatformDefaults::flutter(35, 21, 35, "26.5.11845579")
    }

    #[test]
    fn test_expense_tracker_descriptor_is_valid() {
        let descriptor = BuildDescriptor::new("org.co.per.expensetracker", 21, 34, 34);
        assert!(descriptor.validate(&SigningRegistry::new()).is_ok());
    }

    #[test]
    fn test_min_above_target_fails() {
        let descriptor = BuildDescriptor::new("org.co.per.expensetracker", 35, 34, 34);
        let err = descriptor.validate(&SigningRegistry::new()).unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::InvalidVersionOrdering { lower: 35, upper: 34, .. }
        ));
    }

    #[test]
    fn test_target_above_compile_fails() {
        let descriptor = BuildDescriptor::new("org.co.per.expensetracker", 21, 35, 34);
        let err = descriptor.validate(&SigningRegistry::new()).unwrap_err();
        assert_eq!(err.field(), "defaultConfig.targetSdk");
    }

    #[test]
    fn test_ordering_skips_references() {
        let mut descriptor = BuildDescriptor::new("org.co.per.expensetracker", 21, 34, 34);
        descriptor.sdk.target = Setting::Reference("flutter.targetSdkVersion".to_string());
        descriptor.sdk.min = Setting::Value(30);
        descriptor.sdk.compile = Setting::Value(29);
        let err = descriptor.validate(&SigningRegistry::new()).unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::InvalidVersionOrdering { upper_field: "android.compileSdk", .. }
        ));
    }

    #[test]
    fn test_unknown_signing_config() {
        let mut descriptor = BuildDescriptor::new("org.co.per.expensetracker", 21, 34, 34);
        let mut release = BuildType::new("release");
        release.signing_config = Some("release".to_string());
        descriptor.build_types.push(release);

        let err = descriptor.validate(&SigningRegistry::new()).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::UnknownSigningConfig {
                build_type: "release".to_string(),
                signing_config: "release".to_string(),
            }
        );
    }

    #[test]
    fn test_inline_signing_config_is_known() {
        let mut descriptor = BuildDescriptor::new("org.co.per.expensetracker", 21, 34, 34);
        descriptor.signing_configs.push("upload".to_string());
        let mut release = BuildType::new("release");
        release.signing_config = Some("upload".to_string());
        descriptor.build_types.push(release);

        assert!(descriptor.validate(&SigningRegistry::new()).is_ok());
    }

    #[test]
    fn test_debug_signing_warns() {
        let mut descriptor = BuildDescriptor::new("org.co.per.expensetracker", 21, 34, 34);
        let mut release = BuildType::new("release");
        release.signing_config = Some("debug".to_string());
        descriptor.build_types.push(release);

        let result = descriptor.validate(&SigningRegistry::new()).unwrap();
        assert_eq!(result.warnings().len(), 1);
        assert_eq!(result.warnings()[0].code, "PLACEHOLDER_SIGNING");
        assert_eq!(descriptor.signing_config_ref(), Some("debug"));
    }

    #[test]
    fn test_debug_build_type_signed_with_debug_key_does_not_warn() {
        let mut descriptor = BuildDescriptor::new("org.co.per.expensetracker", 21, 34, 34);
        let mut debug = BuildType::new("debug");
        debug.signing_config = Some("debug".to_string());
        descriptor.build_types.push(debug);

        let result = descriptor.validate(&SigningRegistry::new()).unwrap();
        assert!(result.warnings().is_empty());
    }

    #[test]
    fn test_malformed_application_id() {
        for id in ["", "expensetracker", "org..tracker", "1org.tracker", "org.co-per.app"] {
            let descriptor = BuildDescriptor::new(id, 21, 34, 34);
            let err = descriptor.validate(&SigningRegistry::new()).unwrap_err();
            assert_eq!(err, ConfigurationError::MalformedApplicationId(id.to_string()));
        }
    }

    #[test]
    fn test_non_positive_version_code() {
        let mut descriptor = BuildDescriptor::new("org.co.per.expensetracker", 21, 34, 34);
        descriptor.version_code = Setting::Value(0);
        let err = descriptor.validate(&SigningRegistry::new()).unwrap_err();
        assert_eq!(err, ConfigurationError::NonPositiveVersionCode(0));
    }

    #[test]
    fn test_duplicate_dependency_coordinate() {
        let mut descriptor = BuildDescriptor::new("org.co.per.expensetracker", 21, 34, 34);
        descriptor.dependencies = vec![
            Dependency::parse("implementation", "org.jetbrains.kotlin:kotlin-stdlib:2.1.0").unwrap(),
            Dependency::parse("implementation", "org.jetbrains.kotlin:kotlin-stdlib:1.9.0").unwrap(),
        ];
        let err = descriptor.validate(&SigningRegistry::new()).unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::DuplicateDependencyCoordinate { ref coordinate, .. }
                if coordinate == "org.jetbrains.kotlin:kotlin-stdlib"
        ));
    }

    #[test]
    fn test_flutter_plugin_before_android_fails() {
        let mut descriptor = BuildDescriptor::new("org.co.per.expensetracker", 21, 34, 34);
        descriptor.plugins = vec![
            FLUTTER_PLUGIN.to_string(),
            ANDROID_APPLICATION_PLUGIN.to_string(),
        ];
        let err = descriptor.validate(&SigningRegistry::new()).unwrap_err();
        assert_eq!(err.code(), "PLUGIN_ORDER");
    }

    #[test]
    fn test_language_level_mismatch() {
        let mut descriptor = BuildDescriptor::new("org.co.per.expensetracker", 21, 34, 34);
        descriptor.compile_options.source_compatibility = Some(17);
        descriptor.compile_options.target_compatibility = Some(17);
        descriptor.jvm_toolchain = Some(11);
        let err = descriptor.validate(&SigningRegistry::new()).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::LanguageLevelMismatch {
                field: "kotlin.jvmToolchain",
                expected: 17,
                found: 11,
            }
        );
    }

    #[test]
    fn test_desugaring_requires_library() {
        let mut descriptor = BuildDescriptor::new("org.co.per.expensetracker", 21, 34, 34);
        descriptor.compile_options.core_library_desugaring = true;
        assert_eq!(
            descriptor.validate(&SigningRegistry::new()).unwrap_err(),
            ConfigurationError::MissingDesugaringLibrary
        );

        descriptor.dependencies.push(
            Dependency::parse(DESUGARING_CONFIGURATION, "com.android.tools:desugar_jdk_libs:2.1.5")
                .unwrap(),
        );
        assert!(descriptor.validate(&SigningRegistry::new()).is_ok());
    }

    #[test]
    fn test_diagnose_collects_every_error() {
        let mut descriptor = BuildDescriptor::new("tracker", 35, 34, 34);
        descriptor.version_code = Setting::Value(-3);
        descriptor.version_name = Some(Setting::Value("one".to_string()));

        let result = descriptor.diagnose(&SigningRegistry::new());
        let codes: Vec<&str> = result.errors().iter().map(|e| e.code.as_str()).collect();
        assert_eq!(
            codes,
            [
                "MALFORMED_APPLICATION_ID",
                "INVALID_VERSION_ORDERING",
                "NON_POSITIVE_VERSION_CODE"
            ]
        );
        assert_eq!(result.warnings()[0].code, "NON_SEMVER_VERSION_NAME");
    }

    #[test]
    fn test_template_prefix_warnings() {
        let mut descriptor = BuildDescriptor::new("com.example.tracker", 21, 34, 34);
        descriptor.namespace = Some("com.example.personal_expense_tracker_app_new".to_string());
        let result = descriptor.validate(&SigningRegistry::new()).unwrap();
        let codes: Vec<&str> = result.warnings().iter().map(|w| w.code.as_str()).collect();
        assert_eq!(codes, ["TEMPLATE_APPLICATION_ID", "TEMPLATE_NAMESPACE"]);
    }

    #[test]
    fn test_resolve_replaces_references() {
        let mut descriptor = BuildDescriptor::new("org.co.per.expensetracker", 21, 34, 34);
        descriptor.sdk.compile = Setting::Reference("flutter.compileSdkVersion".to_string());
        descriptor.sdk.min = Setting::Reference("flutter.minSdkVersion".to_string());
        descriptor.ndk_version = Some(Setting::Reference("flutter.ndkVersion".to_string()));
        assert!(!descriptor.is_concrete());

        let resolved = descriptor.resolve(&flutter_defaults()).unwrap();
        assert!(resolved.is_concrete());
        assert_eq!(resolved.sdk.compile, Setting::Value(35));
        assert_eq!(resolved.sdk.min, Setting::Value(21));
        assert_eq!(resolved.sdk.target, Setting::Value(34));
        assert_eq!(
            resolved.ndk_version,
            Some(Setting::Value("26.5.11845579".to_string()))
        );
    }

    #[test]
    fn test_resolve_unknown_reference() {
        let mut descriptor = BuildDescriptor::new("org.co.per.expensetracker", 21, 34, 34);
        descriptor.version_code = Setting::Reference("flutter.versionCode".to_string());
        let err = descriptor.resolve(&flutter_defaults()).unwrap_err();
        assert_eq!(err.field, "defaultConfig.versionCode");
        assert_eq!(err.reference, "flutter.versionCode");
    }

    #[test]
    fn test_resolve_type_mismatch_is_unresolved() {
        let mut descriptor = BuildDescriptor::new("org.co.per.expensetracker", 21, 34, 34);
        descriptor.sdk.min = Setting::Reference("flutter.ndkVersion".to_string());
        assert!(descriptor.resolve(&flutter_defaults()).is_err());
    }

    #[test]
    fn test_dependency_parse() {
        let dep = Dependency::parse("implementation", "androidx.core:core-ktx").unwrap();
        assert_eq!(dep.coordinate(), "androidx.core:core-ktx");
        assert_eq!(dep.version, None);
        assert!(Dependency::parse("implementation", "nocolon").is_none());
        assert!(Dependency::parse("implementation", "a:b:c:d:e").is_none());
    }

    #[test]
    fn test_dependency_parse_classifier_and_extension() {
        let dep = Dependency::parse("implementation", "org.lwjgl:lwjgl:3.3.1:natives-linux").unwrap();
        assert_eq!(dep.coordinate(), "org.lwjgl:lwjgl");
        assert_eq!(dep.version.as_deref(), Some("3.3.1"));
        assert_eq!(dep.classifier.as_deref(), Some("natives-linux"));
        assert_eq!(dep.to_string(), "org.lwjgl:lwjgl:3.3.1:natives-linux");

        let aar = Dependency::parse("implementation", "com.example:widget:1.0@aar").unwrap();
        assert_eq!(aar.version.as_deref(), Some("1.0"));
        assert_eq!(aar.classifier, None);
    }

    fn sdk_setting() -> impl Strategy<Value = Setting<u32>> {
        prop_oneof![
            (1u32..=40).prop_map(Setting::Value),
            prop_oneof![
                Just("flutter.compileSdkVersion"),
                Just("flutter.minSdkVersion"),
                Just("flutter.targetSdkVersion"),
            ]
            .prop_map(|r| Setting::Reference(r.to_string())),
        ]
    }

    proptest! {
        #[test]
        fn prop_resolve_is_idempotent(
            compile in sdk_setting(),
            min in sdk_setting(),
            target in sdk_setting(),
        ) {
            let mut descriptor = BuildDescriptor::new("org.co.per.expensetracker", 1, 1, 1);
            descriptor.sdk = SdkVersions { compile, min, target };
            let defaults = PlatformDefaults::flutter(35, 21, 34, "26.5.11845579");

            let once = descriptor.resolve(&defaults).unwrap();
            let twice = once.resolve(&defaults).unwrap();
            prop_assert!(once.is_concrete());
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_valid_resolved_descriptor_orders_sdk_levels(
            compile in sdk_setting(),
            min in sdk_setting(),
            target in sdk_setting(),
        ) {
            let mut descriptor = BuildDescriptor::new("org.co.per.expensetracker", 1, 1, 1);
            descriptor.sdk = SdkVersions { compile, min, target };
            let defaults = PlatformDefaults::flutter(35, 21, 34, "26.5.11845579");

            let resolved = descriptor.resolve(&defaults).unwrap();
            if resolved.validate(&SigningRegistry::new()).is_ok() {
                let min = *resolved.sdk.min.value().unwrap();
                let target = *resolved.sdk.target.value().unwrap();
                let compile = *resolved.sdk.compile.value().unwrap();
                prop_assert!(min <= target && target <= compile);
            }
        }

        #[test]
        fn prop_duplicate_coordinate_always_fails(
            first in "[0-9]\\.[0-9]\\.[0-9]",
            second in "[0-9]\\.[0-9]\\.[0-9]",
        ) {
            let mut descriptor = BuildDescriptor::new("org.co.per.expensetracker", 21, 34, 34);
            descriptor.dependencies = vec![
                Dependency::parse("implementation", &format!("androidx.core:core-ktx:{}", first)).unwrap(),
                Dependency::parse("api", &format!("androidx.core:core-ktx:{}", second)).unwrap(),
            ];
            let result = descriptor.validate(&SigningRegistry::new());
            let is_duplicate = matches!(
                result,
                Err(ConfigurationError::DuplicateDependencyCoordinate { .. })
            );
            prop_assert!(is_duplicate);
        }
    }
}
