//! The attribute-value save pipeline. One submission runs validation, the
//! server-side conflict check, normalization, uniqueness and multilingual
//! sync inside a single immediate transaction; ownership inheritance and the
//! parent product's timestamp propagation follow after commit.

use std::time::{SystemTime, UNIX_EPOCH};

use opencatalog_core::{
    attribute::Attribute,
    boundary::{SaveRequest, WriteBoundary, WriteError},
    codec::derive_locale_values,
    entities::Product,
    field_value::FieldValue,
    fields,
    ids::{AttributeId, ChannelId, FamilyAttributeId, ProductId},
    locale::{Locale, LocaleSet},
    record::{AttributeValueRecord, Scope},
};
use opencatalog_storage::{SqliteStore, Store, StorageError};

use crate::config::Config;
use crate::language::{
    Language, MSG_CONFLICT_DETECTED, MSG_FAMILY_ATTRIBUTE_FROZEN, MSG_NO_SUCH_CHANNEL,
    MSG_PRODUCT_AND_ATTRIBUTE_EMPTY,
};
use crate::ownership;
use crate::uniqueness::check_unique;

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

fn internal(e: StorageError) -> WriteError {
    WriteError::Internal(e.to_string())
}

pub struct AttributeValueWriter<'a> {
    store: &'a mut SqliteStore,
    config: &'a Config,
    language: &'a dyn Language,
}

struct CommittedSave {
    record: AttributeValueRecord,
    before: Option<AttributeValueRecord>,
    attribute: Attribute,
    product: Product,
    locales: LocaleSet,
}

impl<'a> AttributeValueWriter<'a> {
    pub fn new(store: &'a mut SqliteStore, config: &'a Config, language: &'a dyn Language) -> Self {
        Self {
            store,
            config,
            language,
        }
    }

    fn exec_batch(&self, sql: &str) -> Result<(), WriteError> {
        self.store
            .conn()
            .execute_batch(sql)
            .map_err(|e| internal(StorageError::Sqlite(e)))
    }

    fn validation(&self, key: &str) -> WriteError {
        WriteError::Validation(self.language.translate(key))
    }

    fn resolve_target(
        &self,
        request: &SaveRequest,
    ) -> Result<(AttributeValueRecord, Option<AttributeValueRecord>), WriteError> {
        match request.record_id {
            Some(id) => {
                let stored = self
                    .store
                    .get_attribute_value(id)
                    .map_err(internal)?
                    .filter(|r| !r.deleted)
                    .ok_or_else(|| WriteError::NotFound(id.to_string()))?;
                Ok((stored.clone(), Some(stored)))
            }
            None => {
                let product_id = request
                    .attrs
                    .get(fields::K_PRODUCT_ID)
                    .and_then(FieldValue::as_ref_uuid)
                    .ok_or_else(|| self.validation(MSG_PRODUCT_AND_ATTRIBUTE_EMPTY))?;
                let attribute_id = request
                    .attrs
                    .get(fields::K_ATTRIBUTE_ID)
                    .and_then(FieldValue::as_ref_uuid)
                    .ok_or_else(|| self.validation(MSG_PRODUCT_AND_ATTRIBUTE_EMPTY))?;
                Ok((
                    AttributeValueRecord::new(
                        ProductId::from_uuid(product_id),
                        AttributeId::from_uuid(attribute_id),
                    ),
                    None,
                ))
            }
        }
    }

    /// Divergence between the submitted baseline and stored state, checked
    /// per guarded field against the stored record's current values.
    fn check_conflicts(
        &self,
        request: &SaveRequest,
        stored: &AttributeValueRecord,
    ) -> Result<(), WriteError> {
        let previous = match &request.previous_values {
            Some(p) if !request.bypass_conflict_check => p,
            _ => return Ok(()),
        };

        let diverged: Vec<String> = previous
            .iter()
            .filter(|(key, prev)| &stored.projected_value(key) != *prev)
            .map(|(key, _)| key.clone())
            .collect();
        if diverged.is_empty() {
            return Ok(());
        }

        tracing::debug!(record = %stored.id, fields = ?diverged, "save conflict detected");
        Err(WriteError::Conflict {
            description: self.language.translate(MSG_CONFLICT_DETECTED),
            fields: diverged,
        })
    }

    fn apply_attrs(
        &self,
        record: &mut AttributeValueRecord,
        request: &SaveRequest,
        is_new: bool,
    ) -> Result<(), WriteError> {
        let family_frozen =
            record.product_family_attribute_id.is_some() && !request.allow_override_restrictions;

        for (key, value) in &request.attrs {
            match key.as_str() {
                fields::K_ID | fields::K_PRODUCT_ID => {}
                fields::K_ATTRIBUTE_ID => {
                    let submitted = value.as_ref_uuid();
                    if !is_new && submitted != Some(*record.attribute_id.as_uuid()) {
                        if family_frozen {
                            return Err(self.validation(MSG_FAMILY_ATTRIBUTE_FROZEN));
                        }
                        return Err(WriteError::Validation(
                            "attribute reference cannot be changed".to_string(),
                        ));
                    }
                }
                fields::K_SCOPE => {
                    let raw = value.as_text().ok_or_else(|| {
                        WriteError::Validation("scope must be a string".to_string())
                    })?;
                    let scope =
                        Scope::parse(raw).map_err(|e| WriteError::Validation(e.to_string()))?;
                    if scope != record.scope && family_frozen && !is_new {
                        return Err(self.validation(MSG_FAMILY_ATTRIBUTE_FROZEN));
                    }
                    record.scope = scope;
                }
                fields::K_CHANNEL_ID => {
                    let channel_id = match value {
                        FieldValue::Null => None,
                        FieldValue::Ref(uuid) => Some(ChannelId::from_uuid(*uuid)),
                        _ => {
                            return Err(WriteError::Validation(
                                "channelId must be a reference".to_string(),
                            ));
                        }
                    };
                    if channel_id != record.channel_id && family_frozen && !is_new {
                        return Err(self.validation(MSG_FAMILY_ATTRIBUTE_FROZEN));
                    }
                    record.channel_id = channel_id;
                }
                fields::K_LOCALE => {
                    let submitted = match value {
                        FieldValue::Null => None,
                        FieldValue::Text(code) => Some(
                            Locale::parse(code)
                                .map_err(|e| WriteError::Validation(e.to_string()))?,
                        ),
                        _ => {
                            return Err(WriteError::Validation(
                                "locale must be a string".to_string(),
                            ));
                        }
                    };
                    if is_new {
                        record.locale = submitted;
                    } else if submitted != record.locale {
                        return Err(WriteError::Validation(
                            "locale cannot be changed".to_string(),
                        ));
                    }
                }
                fields::K_IS_REQUIRED => {
                    let required = value.as_boolean().ok_or_else(|| {
                        WriteError::Validation("isRequired must be a boolean".to_string())
                    })?;
                    if required != record.is_required && family_frozen && !is_new {
                        return Err(self.validation(MSG_FAMILY_ATTRIBUTE_FROZEN));
                    }
                    record.is_required = required;
                }
                fields::K_PRODUCT_FAMILY_ATTRIBUTE_ID => {
                    record.product_family_attribute_id = match value {
                        FieldValue::Null => None,
                        FieldValue::Ref(uuid) => Some(FamilyAttributeId::from_uuid(*uuid)),
                        _ => {
                            return Err(WriteError::Validation(
                                "productFamilyAttributeId must be a reference".to_string(),
                            ));
                        }
                    };
                }
                _ => record.set_field(key, value.clone()),
            }
        }

        // Global records never carry a channel; custom (non-family) records
        // are always required from the moment they are created.
        if record.scope == Scope::Global {
            record.channel_id = None;
        }
        if is_new && record.product_family_attribute_id.is_none() {
            record.is_required = true;
        }
        Ok(())
    }

    fn check_channel_membership(
        &self,
        record: &AttributeValueRecord,
        product: &Product,
        allow_override: bool,
    ) -> Result<(), WriteError> {
        if record.scope != Scope::Channel {
            return Ok(());
        }
        let channel_id = record.channel_id.ok_or_else(|| {
            WriteError::Validation("channelId is required for Channel scope".to_string())
        })?;
        if !allow_override && !product.channel_ids.contains(&channel_id) {
            return Err(self.validation(MSG_NO_SUCH_CHANNEL));
        }
        Ok(())
    }

    fn save_in_tx(&mut self, request: &SaveRequest) -> Result<CommittedSave, WriteError> {
        let (mut record, before) = self.resolve_target(request)?;
        let is_new = before.is_none();

        let attribute = self
            .store
            .get_attribute(record.attribute_id)
            .map_err(internal)?
            .ok_or_else(|| WriteError::NotFound(record.attribute_id.to_string()))?;
        let product = self
            .store
            .get_product(record.product_id)
            .map_err(internal)?
            .ok_or_else(|| WriteError::NotFound(record.product_id.to_string()))?;

        if let Some(stored) = &before {
            self.check_conflicts(request, stored)?;
        }

        self.apply_attrs(&mut record, request, is_new)?;
        self.check_channel_membership(&record, &product, request.allow_override_restrictions)?;

        if let Some(stored) = &before {
            let mut unchanged = record.clone();
            unchanged.modified_at = stored.modified_at;
            if &unchanged == stored {
                return Err(WriteError::StaleResource);
            }
        }

        check_unique(self.store, self.language, &attribute, &record)?;

        let locales = self
            .config
            .locale_set()
            .map_err(|e| WriteError::Internal(e.to_string()))?;
        // Locale fields are only re-derived when the main value itself moved;
        // an edit that touches a locale field directly must survive the save.
        let value_changed = match &before {
            Some(stored) => record.field(fields::K_VALUE) != stored.field(fields::K_VALUE),
            None => true,
        };
        if value_changed
            && locales.is_multilang_active
            && attribute.is_multilang_enum()
            && record.locale.is_none()
        {
            let value = record
                .field(fields::K_VALUE)
                .cloned()
                .unwrap_or(FieldValue::Null);
            for (key, derived) in derive_locale_values(&attribute, &value) {
                record.set_field(&key, derived);
            }
        }

        record.modified_at = now_ms();
        self.store.upsert_attribute_value(&record).map_err(internal)?;

        Ok(CommittedSave {
            record,
            before,
            attribute,
            product,
            locales,
        })
    }

    /// Ownership inheritance and parent-product timestamp propagation, both
    /// after the main transaction so a failure here never unwinds the saved
    /// value.
    fn after_save(&mut self, saved: &mut CommittedSave) -> Result<(), WriteError> {
        if let Some(before) = &saved.before {
            let facets = ownership::eligible_facets(before, &saved.record, &saved.locales);
            if !facets.is_empty() {
                let policy = self
                    .config
                    .ownership_policy()
                    .map_err(|e| WriteError::Internal(e.to_string()))?;
                let mut touched = false;
                for facet in facets {
                    touched |= ownership::apply_facet(
                        &mut saved.record,
                        facet,
                        &policy.attribute,
                        &saved.attribute,
                        &saved.product,
                    );
                }
                if touched {
                    self.store
                        .upsert_attribute_value(&saved.record)
                        .map_err(internal)?;
                }
            }
        }

        self.store
            .set_product_modified_at(saved.product.id, saved.record.modified_at)
            .map_err(internal)?;
        Ok(())
    }
}

impl WriteBoundary for AttributeValueWriter<'_> {
    fn submit(&mut self, request: SaveRequest) -> Result<AttributeValueRecord, WriteError> {
        self.exec_batch("BEGIN IMMEDIATE")?;

        let result = self.save_in_tx(&request);

        let mut saved = match result {
            Ok(saved) => {
                self.exec_batch("COMMIT")?;
                saved
            }
            Err(e) => {
                let _ = self.exec_batch("ROLLBACK");
                return Err(e);
            }
        };

        self.after_save(&mut saved)?;
        tracing::debug!(record = %saved.record.id, new = saved.before.is_none(), "attribute value saved");
        Ok(saved.record)
    }
}
