//! Descriptor errors
//!
//! Domain failures stay typed here and are mapped onto the core coded
//! [`Error`] at the CLI boundary.

use expense_tracker_core::error::{Error, ErrorCode};
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, DescriptorError>;

/// An inconsistent or malformed descriptor field
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("Malformed applicationId '{0}': expected a reverse-domain name such as org.example.app")]
    /// Holds the offending id
    MalformedApplicationId(String),

    #[error("Invalid SDK version ordering: {lower_field} = {lower} must not exceed {upper_field} = {upper}")]
    /// An SDK level above the level it must not exceed
    InvalidVersionOrdering {
        /// Setting that should be lower or equal
        lower_field: &'static str,
        /// Its value
        lower: u32,
        /// Setting that should be higher or equal
        upper_field: &'static str,
        /// Its value
        upper: u32,
    },

    #[error("versionCode must be a positive integer, found {0}")]
    /// Holds the declared version code
    NonPositiveVersionCode(i64),

    #[error("Build type '{build_type}' references unknown signing config '{signing_config}'")]
    /// A build type points at a signing config nobody declares
    UnknownSigningConfig {
        /// Build type name
        build_type: String,
        /// Referenced signing config
        signing_config: String,
    },

    #[error("Dependency '{coordinate}' is declared more than once ({first} and {second})")]
    /// The same `group:name` declared twice
    DuplicateDependencyCoordinate {
        /// `group:name`
        coordinate: String,
        /// First declaration
        first: String,
        /// Second declaration
        second: String,
    },

    #[error("Plugin '{plugin}' must be applied after '{required_before}'")]
    /// A plugin applied before one it depends on
    PluginOrder {
        /// Plugin applied too early
        plugin: String,
        /// Plugin it must follow
        required_before: String,
    },

    #[error("Language level mismatch: {field} = {found}, expected {expected}")]
    /// Java/Kotlin language levels disagree
    LanguageLevelMismatch {
        /// Setting that disagrees
        field: &'static str,
        /// Level of the first declared setting
        expected: u32,
        /// Level of this setting
        found: u32,
    },

    #[error("Core library desugaring is enabled but no coreLibraryDesugaring dependency is declared")]
    /// Desugaring on without the runtime library
    MissingDesugaringLibrary,
}

impl ConfigurationError {
    /// Descriptor field the error points at
    pub fn field(&self) -> &str {
        match self {
            Self::MalformedApplicationId(_) => "defaultConfig.applicationId",
            Self::InvalidVersionOrdering { lower_field, .. } => lower_field,
            Self::NonPositiveVersionCode(_) => "defaultConfig.versionCode",
            Self::UnknownSigningConfig { .. } => "buildTypes.signingConfig",
            Self::DuplicateDependencyCoordinate { .. } => "dependencies",
            Self::PluginOrder { .. } => "plugins",
            Self::LanguageLevelMismatch { field, .. } => field,
            Self::MissingDesugaringLibrary => "compileOptions.isCoreLibraryDesugaringEnabled",
        }
    }

    /// Stable diagnostic code
    pub fn code(&self) -> &'static str {
        match self {
            Self::MalformedApplicationId(_) => "MALFORMED_APPLICATION_ID",
            Self::InvalidVersionOrdering { .. } => "INVALID_VERSION_ORDERING",
            Self::NonPositiveVersionCode(_) => "NON_POSITIVE_VERSION_CODE",
            Self::UnknownSigningConfig { .. } => "UNKNOWN_SIGNING_CONFIG",
            Self::DuplicateDependencyCoordinate { .. } => "DUPLICATE_DEPENDENCY_COORDINATE",
            Self::PluginOrder { .. } => "PLUGIN_ORDER",
            Self::LanguageLevelMismatch { .. } => "LANGUAGE_LEVEL_MISMATCH",
            Self::MissingDesugaringLibrary => "MISSING_DESUGARING_LIBRARY",
        }
    }
}

/// A placeholder the platform defaults cannot supply
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unresolved reference '{reference}' for {field}")]
pub struct UnresolvedReferenceError {
    /// Descriptor setting holding the reference
    pub field: &'static str,
    /// The reference, e.g. `flutter.minSdkVersion`
    pub reference: String,
}

/// Reasons a descriptor is not accepted for distribution
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReleaseError {
    #[error("versionCode {current} must be greater than the previous release's {previous}")]
    /// The version code did not move forward
    VersionCodeNotIncreased {
        /// Version code of the previous release
        previous: i64,
        /// Version code of this descriptor
        current: i64,
    },

    #[error("Build type '{build_type}' is signed with placeholder credentials '{signing_config}'")]
    /// The release is signed with a placeholder key
    PlaceholderSigning {
        /// Build type name
        build_type: String,
        /// Placeholder signing config
        signing_config: String,
    },

    #[error("Build type 'release' has no signing config")]
    /// No signing config on the `release` build type
    UnsignedRelease,

    #[error("Descriptor still contains an unresolved reference: {0}")]
    /// Holds the reference still in place
    Unresolved(String),
}

/// Any failure while loading or checking a descriptor
#[derive(Error, Debug)]
pub enum DescriptorError {
    /// The file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The Kotlin DSL could not be understood
    #[error("Parse error at line {line}: {message}")]
    Parse {
        /// 1-based source line
        line: usize,
        /// What was wrong
        message: String,
    },

    /// A setting the descriptor cannot do without
    #[error("Missing required setting {0}")]
    MissingField(&'static str),

    /// See [`ConfigurationError`]
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// See [`UnresolvedReferenceError`]
    #[error(transparent)]
    Unresolved(#[from] UnresolvedReferenceError),

    /// See [`ReleaseError`]
    #[error(transparent)]
    Release(#[from] ReleaseError),
}

impl From<DescriptorError> for Error {
    fn from(err: DescriptorError) -> Self {
        let (code, suggestion) = match &err {
            DescriptorError::Io(io) if io.kind() == std::io::ErrorKind::NotFound => (
                ErrorCode::FileNotFound,
                "Pass --descriptor or set [general] descriptor in the configuration",
            ),
            DescriptorError::Io(_) => (ErrorCode::IoError, "Check file permissions"),
            DescriptorError::Parse { .. } | DescriptorError::MissingField(_) => (
                ErrorCode::DescriptorParse,
                "Fix the build.gradle.kts syntax and re-run",
            ),
            DescriptorError::Configuration(_) => (
                ErrorCode::ConstraintViolation,
                "Correct the offending field in build.gradle.kts",
            ),
            DescriptorError::Unresolved(_) => (
                ErrorCode::UnresolvedReference,
                "Add the missing value to the [platform] section of the configuration",
            ),
            DescriptorError::Release(_) => (
                ErrorCode::ReleaseRejected,
                "Bump versionCode and sign the release build type with distribution credentials",
            ),
        };
        Error::new(code, err.to_string())
            .with_suggestion(suggestion)
            .with_source(err)
    }
}
