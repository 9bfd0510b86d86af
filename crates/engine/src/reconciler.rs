//! Administrative settings reconciliation. An update to the multilingual or
//! ownership configuration is applied to the config object, channel locale
//! lists are pruned to match, and a single ownership recompute job is
//! dispatched when any ownership source moved away from `notInherit`.

use std::collections::BTreeMap;

use opencatalog_core::{ids::JobId, locale::Locale};
use opencatalog_storage::Store;

use crate::config::{Config, OVERRIDE_KEYS, OWNERSHIP_KEYS};
use crate::dispatch::{JobDispatcher, JobType, NORMAL_PRIORITY};
use crate::error::EngineError;
use crate::language::{Language, MSG_UPDATING_OWNERSHIP};
use crate::ownership::run_ownership_recompute;

/// One administrative settings submission, keyed by config key.
#[derive(Debug, Clone, Default)]
pub struct SettingsUpdate {
    pub entries: BTreeMap<String, serde_json::Value>,
}

impl SettingsUpdate {
    pub fn set(mut self, key: &str, value: serde_json::Value) -> Self {
        self.entries.insert(key.to_string(), value);
        self
    }
}

/// Pre-update multilingual state, captured before the update is applied.
/// Request-scoped: each reconciliation captures its own context.
#[derive(Debug, Clone)]
pub struct ReconcileContext {
    pub was_multilang_active: bool,
    pub old_locales: Vec<Locale>,
}

impl ReconcileContext {
    pub fn capture(config: &Config) -> Result<Self, EngineError> {
        let locales = config.locale_set()?;
        Ok(Self {
            was_multilang_active: locales.is_multilang_active,
            old_locales: locales.input_language_list,
        })
    }
}

#[derive(Debug, Default)]
pub struct ReconcileOutcome {
    /// Ownership recompute job, when one was dispatched.
    pub dispatched: Option<JobId>,
    /// Dispatch failure, reported without failing the settings save.
    pub dispatch_error: Option<String>,
    /// Channels whose locale list was trimmed.
    pub pruned_channels: usize,
}

pub struct PolicyChangeReconciler<'a> {
    store: &'a mut dyn Store,
    config: &'a mut Config,
    language: &'a dyn Language,
}

impl<'a> PolicyChangeReconciler<'a> {
    pub fn new(
        store: &'a mut dyn Store,
        config: &'a mut Config,
        language: &'a dyn Language,
    ) -> Self {
        Self {
            store,
            config,
            language,
        }
    }

    pub fn reconcile(
        &mut self,
        dispatcher: &mut dyn JobDispatcher,
        context: ReconcileContext,
        update: SettingsUpdate,
    ) -> Result<ReconcileOutcome, EngineError> {
        let mut outcome = ReconcileOutcome::default();

        for (key, value) in &update.entries {
            self.config.set(key, value.clone());
        }
        let new_locales = self.config.locale_set()?;

        // Channel locale lists only ever shrink here. Whenever multilang ends
        // up off they are cleared outright, even if it was already off, so a
        // stale list can never survive. Per-locale pruning compares against
        // the previous active list, which only means something when multilang
        // was on before.
        if !new_locales.is_multilang_active {
            outcome.pruned_channels = self
                .store
                .all_channels()?
                .iter()
                .filter(|c| !c.locales.is_empty())
                .count();
            self.store.clear_all_channel_locales()?;
        } else if context.was_multilang_active {
            let removed: Vec<&Locale> = context
                .old_locales
                .iter()
                .filter(|l| !new_locales.contains(l))
                .collect();
            if !removed.is_empty() {
                for channel in self.store.all_channels()? {
                    let retained: Vec<Locale> = channel
                        .locales
                        .iter()
                        .filter(|l| !removed.contains(l))
                        .cloned()
                        .collect();
                    if retained.len() != channel.locales.len() {
                        self.store.set_channel_locales(channel.id, &retained)?;
                        outcome.pruned_channels += 1;
                    }
                }
            }
        }

        let wants_recompute = OWNERSHIP_KEYS.iter().any(|key| {
            update
                .entries
                .get(*key)
                .and_then(|v| v.as_str())
                .is_some_and(|s| s != "notInherit")
        });
        if wants_recompute {
            let policy = self.config.ownership_policy()?;
            let payload = serde_json::to_value(policy)
                .map_err(|e| EngineError::Config(format!("ownership payload: {e}")))?;
            let description = self.language.translate(MSG_UPDATING_OWNERSHIP);
            match dispatcher.dispatch(
                self.store,
                &description,
                JobType::OwnershipRecompute,
                &payload,
                NORMAL_PRIORITY,
            ) {
                Ok(id) => outcome.dispatched = Some(id),
                Err(e) => {
                    tracing::warn!(error = %e, "ownership recompute dispatch failed");
                    outcome.dispatch_error = Some(e.to_string());
                }
            }
        }

        for key in OVERRIDE_KEYS {
            self.config.remove(key);
        }
        self.config.save(self.store)?;

        tracing::debug!(
            pruned = outcome.pruned_channels,
            dispatched = outcome.dispatched.is_some(),
            "settings reconciled"
        );
        Ok(outcome)
    }
}

/// Execute one queued ownership recompute job against the current config.
/// Jobs are independent and idempotent, so replaying or reordering them
/// converges on the latest policy.
pub fn run_recompute_job(store: &mut dyn Store, config: &Config) -> Result<usize, EngineError> {
    let policy = config.ownership_policy()?;
    let locales = config.locale_set()?;
    run_ownership_recompute(store, &policy.attribute, &locales)
}
