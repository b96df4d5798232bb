//! Signing credential registry
//!
//! Build types refer to signing configurations by name. The registry is
//! the lookup side of that reference: it always knows `debug`, the Android
//! debug keystore, which is flagged as a placeholder.

use expense_tracker_core::config::SigningConfig;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Name of the signing config Gradle creates for the debug key
pub const DEBUG_SIGNING_CONFIG: &str = "debug";

const DEBUG_KEYSTORE: &str = "~/.android/debug.keystore";

/// Credentials a signing config name stands for
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SigningEntry {
    /// Name build types refer to
    pub name: String,
    /// Keystore path, expanded
    pub store_file: Option<PathBuf>,
    /// Key alias inside the keystore
    pub key_alias: Option<String>,
    /// Not suitable for distribution
    pub placeholder: bool,
}

impl SigningEntry {
    /// A distribution entry with no keystore details
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            store_file: None,
            key_alias: None,
            placeholder: false,
        }
    }

    /// The Android debug key
    pub fn debug() -> Self {
        Self {
            name: DEBUG_SIGNING_CONFIG.to_string(),
            store_file: Some(PathBuf::from(shellexpand::tilde(DEBUG_KEYSTORE).into_owned())),
            key_alias: Some("androiddebugkey".to_string()),
            placeholder: true,
        }
    }
}

/// Signing configs known outside the descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningRegistry {
    entries: BTreeMap<String, SigningEntry>,
}

impl Default for SigningRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SigningRegistry {
    /// A registry holding only the debug placeholder
    pub fn new() -> Self {
        Self::empty().with_entry(SigningEntry::debug())
    }

    /// A registry without even the debug key
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Debug placeholder plus every `[signing.<name>]` table
    pub fn from_config(configs: &BTreeMap<String, SigningConfig>) -> Self {
        configs
            .iter()
            .fold(Self::new(), |registry, (name, config)| {
                registry.with_entry(SigningEntry {
                    name: name.clone(),
                    store_file: config.store_file.as_deref().map(expand_store_file),
                    key_alias: config.key_alias.clone(),
                    placeholder: config.placeholder,
                })
            })
    }

    /// Add or replace an entry by name
    pub fn with_entry(mut self, entry: SigningEntry) -> Self {
        self.entries.insert(entry.name.clone(), entry);
        self
    }

    /// Entry by name
    pub fn get(&self, name: &str) -> Option<&SigningEntry> {
        self.entries.get(name)
    }

    /// True when `name` is registered
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

fn expand_store_file(raw: &str) -> PathBuf {
    match shellexpand::full(raw) {
        Ok(expanded) => PathBuf::from(expanded.into_owned()),
        Err(e) => {
            tracing::warn!(store_file = raw, error = %e, "Could not expand keystore path");
            PathBuf::from(raw)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_registry_has_debug_placeholder() {
        let registry = SigningRegistry::new();
        let debug = registry.get(DEBUG_SIGNING_CONFIG).unwrap();
        assert!(debug.placeholder);
        assert!(debug
            .store_file
            .as_ref()
            .unwrap()
            .ends_with(".android/debug.keystore"));
        assert!(!registry.contains("release"));
    }

    #[test]
    fn test_from_config() {
        let mut configs = BTreeMap::new();
        configs.insert(
            "upload".to_string(),
            SigningConfig {
                store_file: Some("/keys/upload.jks".to_string()),
                key_alias: Some("upload".to_string()),
                placeholder: false,
            },
        );

        let registry = SigningRegistry::from_config(&configs);
        let names: Vec<&str> = registry.names().collect();
        assert_eq!(names, ["debug", "upload"]);

        let upload = registry.get("upload").unwrap();
        assert_eq!(upload.store_file, Some(PathBuf::from("/keys/upload.jks")));
        assert!(!upload.placeholder);
    }

    #[test]
    fn test_config_can_override_debug() {
        let mut configs = BTreeMap::new();
        configs.insert("debug".to_string(), SigningConfig::default());

        let registry = SigningRegistry::from_config(&configs);
        assert!(!registry.get("debug").unwrap().placeholder);
    }

    #[test]
    fn test_unexpandable_store_file_is_kept() {
        let mut configs = BTreeMap::new();
        configs.insert(
            "upload".to_string(),
            SigningConfig {
                store_file: Some("$EXPENSE_TRACKER_UNSET_KEYSTORE_VAR/upload.jks".to_string()),
                ..SigningConfig::default()
            },
        );

        let registry = SigningRegistry::from_config(&configs);
        assert_eq!(
            registry.get("upload").unwrap().store_file,
            Some(PathBuf::from("$EXPENSE_TRACKER_UNSET_KEYSTORE_VAR/upload.jks"))
        );
    }
}
