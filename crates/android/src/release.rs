//! Distribution checks for a new release

use crate::descriptor::{BuildDescriptor, Setting};
use crate::error::ReleaseError;
use crate::signing::SigningRegistry;
use expense_tracker_core::config::ReleaseConfig;

/// What a release may get away with
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReleasePolicy {
    /// Accept a `release` build type signed with placeholder credentials
    pub allow_debug_signing: bool,
}

impl From<&ReleaseConfig> for ReleasePolicy {
    fn from(config: &ReleaseConfig) -> Self {
        Self {
            allow_debug_signing: config.allow_debug_signing,
        }
    }
}

/// Check that `descriptor` may be published after a release with `previous_version_code`
///
/// The descriptor must already be resolved.
pub fn check_release(
    previous_version_code: i64,
    descriptor: &BuildDescriptor,
    registry: &SigningRegistry,
    policy: ReleasePolicy,
) -> Result<(), ReleaseError> {
    let current = match &descriptor.version_code {
        Setting::Value(code) => *code,
        Setting::Reference(r) => return Err(ReleaseError::Unresolved(r.clone())),
    };
    if current <= previous_version_code {
        return Err(ReleaseError::VersionCodeNotIncreased {
            previous: previous_version_code,
            current,
        });
    }

    // An undeclared release build type is the implicit, unsigned one.
    let Some(signing_config) = descriptor.signing_config_ref() else {
        return Err(ReleaseError::UnsignedRelease);
    };
    if !policy.allow_debug_signing
        && registry
            .get(signing_config)
            .is_some_and(|entry| entry.placeholder)
    {
        return Err(ReleaseError::PlaceholderSigning {
            build_type: "release".to_string(),
            signing_config: signing_config.to_string(),
        });
    }

    tracing::debug!(previous = previous_version_code, current, signing_config, "Release accepted");
    Ok(())
}

/// Same as [`check_release`] with the previous version code taken from a resolved descriptor
pub fn check_release_after(
    previous: &BuildDescriptor,
    descriptor: &BuildDescriptor,
    registry: &SigningRegistry,
    policy: ReleasePolicy,
) -> Result<(), ReleaseError> {
    let previous_version_code = match &previous.version_code {
        Setting::Value(code) => *code,
        Setting::Reference(r) => return Err(ReleaseError::Unresolved(r.clone())),
    };
    check_release(previous_version_code, descriptor, registry, policy)
}
