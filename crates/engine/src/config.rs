//! Typed access to the persisted configuration object. The raw map is
//! loaded whole, mutated in memory and saved back whole, so concurrent
//! administrative updates never interleave at the key level.

use std::collections::BTreeMap;

use opencatalog_core::{
    locale::{Locale, LocaleSet},
    policy::{FacetSettings, OwnershipPolicy, OwnershipSource},
};
use opencatalog_storage::Store;

use crate::error::EngineError;

pub const K_IS_MULTILANG_ACTIVE: &str = "isMultilangActive";
pub const K_INPUT_LANGUAGE_LIST: &str = "inputLanguageList";

pub const K_ASSIGNED_USER_ATTRIBUTE_OWNERSHIP: &str = "assignedUserAttributeOwnership";
pub const K_OWNER_USER_ATTRIBUTE_OWNERSHIP: &str = "ownerUserAttributeOwnership";
pub const K_TEAMS_ATTRIBUTE_OWNERSHIP: &str = "teamsAttributeOwnership";
pub const K_ASSIGNED_USER_PRODUCT_OWNERSHIP: &str = "assignedUserProductOwnership";
pub const K_OWNER_USER_PRODUCT_OWNERSHIP: &str = "ownerUserProductOwnership";
pub const K_TEAMS_PRODUCT_OWNERSHIP: &str = "teamsProductOwnership";

/// The six ownership-source settings, attribute level then product level.
pub const OWNERSHIP_KEYS: [&str; 6] = [
    K_ASSIGNED_USER_ATTRIBUTE_OWNERSHIP,
    K_OWNER_USER_ATTRIBUTE_OWNERSHIP,
    K_TEAMS_ATTRIBUTE_OWNERSHIP,
    K_ASSIGNED_USER_PRODUCT_OWNERSHIP,
    K_OWNER_USER_PRODUCT_OWNERSHIP,
    K_TEAMS_PRODUCT_OWNERSHIP,
];

/// Transient per-facet override markers submitted alongside an ownership
/// settings change. Consumed by reconciliation, never persisted.
pub const OVERRIDE_KEYS: [&str; 6] = [
    "overrideAttributeAssignedUser",
    "overrideAttributeOwnerUser",
    "overrideAttributeTeams",
    "overrideProductAssignedUser",
    "overrideProductOwnerUser",
    "overrideProductTeams",
];

#[derive(Debug, Clone, Default)]
pub struct Config {
    values: BTreeMap<String, serde_json::Value>,
}

impl Config {
    pub fn load(store: &dyn Store) -> Result<Self, EngineError> {
        Ok(Self {
            values: store.load_config()?,
        })
    }

    pub fn save(&self, store: &mut dyn Store) -> Result<(), EngineError> {
        store.save_config(&self.values)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.values.get(key)
    }

    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn set(&mut self, key: &str, value: serde_json::Value) {
        self.values.insert(key.to_string(), value);
    }

    pub fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }

    /// Multilingual state: active flag plus the ordered active locale list.
    /// Missing keys read as "multilang off, no locales".
    pub fn locale_set(&self) -> Result<LocaleSet, EngineError> {
        let is_multilang_active = self
            .get(K_IS_MULTILANG_ACTIVE)
            .and_then(|v| v.as_bool())
            .unwrap_or(false);

        let mut input_language_list = Vec::new();
        if let Some(raw) = self.get(K_INPUT_LANGUAGE_LIST).and_then(|v| v.as_array()) {
            for entry in raw {
                let code = entry.as_str().ok_or_else(|| {
                    EngineError::Config(format!("{K_INPUT_LANGUAGE_LIST}: non-string entry"))
                })?;
                input_language_list.push(Locale::parse(code)?);
            }
        }

        Ok(LocaleSet {
            is_multilang_active,
            input_language_list,
        })
    }

    /// The six-setting ownership policy. Missing keys read as `notInherit`.
    pub fn ownership_policy(&self) -> Result<OwnershipPolicy, EngineError> {
        let source = |key: &str| -> Result<OwnershipSource, EngineError> {
            match self.get(key).and_then(|v| v.as_str()) {
                Some(s) => Ok(OwnershipSource::parse(s)?),
                None => Ok(OwnershipSource::NotInherit),
            }
        };

        Ok(OwnershipPolicy {
            attribute: FacetSettings {
                assigned_user: source(K_ASSIGNED_USER_ATTRIBUTE_OWNERSHIP)?,
                owner_user: source(K_OWNER_USER_ATTRIBUTE_OWNERSHIP)?,
                teams: source(K_TEAMS_ATTRIBUTE_OWNERSHIP)?,
            },
            product: FacetSettings {
                assigned_user: source(K_ASSIGNED_USER_PRODUCT_OWNERSHIP)?,
                owner_user: source(K_OWNER_USER_PRODUCT_OWNERSHIP)?,
                teams: source(K_TEAMS_PRODUCT_OWNERSHIP)?,
            },
        })
    }
}
