use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::field_value::FieldValue;
use crate::fields::{self, Facet};
use crate::ids::{AttributeId, AttributeValueId, ChannelId, FamilyAttributeId, ProductId};
use crate::locale::Locale;

/// Whether a record applies catalog-wide or to one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scope {
    Global,
    Channel,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Global => "Global",
            Self::Channel => "Channel",
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "Global" => Ok(Self::Global),
            "Channel" => Ok(Self::Channel),
            _ => Err(CoreError::InvalidScope(s.to_string())),
        }
    }
}

/// One per-product, per-attribute value record.
///
/// Identity and uniqueness-relevant columns are typed; everything else
/// (the value, derived locale variants, ownership fields, inherit flags)
/// lives in the generic field bag, keyed by wire field name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeValueRecord {
    pub id: AttributeValueId,
    pub product_id: ProductId,
    pub attribute_id: AttributeId,
    pub scope: Scope,
    pub channel_id: Option<ChannelId>,
    /// Set when this record is a per-locale variant of a base record.
    pub locale: Option<Locale>,
    pub product_family_attribute_id: Option<FamilyAttributeId>,
    pub is_required: bool,
    pub deleted: bool,
    pub modified_at: i64,
    pub fields: BTreeMap<String, FieldValue>,
}

impl AttributeValueRecord {
    pub fn new(product_id: ProductId, attribute_id: AttributeId) -> Self {
        Self {
            id: AttributeValueId::new(),
            product_id,
            attribute_id,
            scope: Scope::Global,
            channel_id: None,
            locale: None,
            product_family_attribute_id: None,
            is_required: false,
            deleted: false,
            modified_at: 0,
            fields: BTreeMap::new(),
        }
    }

    pub fn field(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    pub fn set_field(&mut self, key: &str, value: FieldValue) {
        self.fields.insert(key.to_string(), value);
    }

    pub fn bool_field(&self, key: &str) -> bool {
        self.fields
            .get(key)
            .and_then(FieldValue::as_boolean)
            .unwrap_or(false)
    }

    pub fn is_locale_variant(&self) -> bool {
        self.locale.is_some()
    }

    /// Typed lookup for a facet's locale-suffixed inherit override flag.
    /// Only meaningful on locale variants; false on base records.
    pub fn locale_inherit_override(&self, facet: Facet) -> bool {
        match &self.locale {
            Some(locale) => self.bool_field(&facet.inherit_flag_for(Some(locale))),
            None => false,
        }
    }

    /// Value of any field by wire name, typed columns included. Missing bag
    /// entries read as `Null`, which is what a conflict comparison against
    /// an unset field should see.
    pub fn projected_value(&self, key: &str) -> FieldValue {
        match key {
            fields::K_ID => FieldValue::Ref(*self.id.as_uuid()),
            fields::K_PRODUCT_ID => FieldValue::Ref(*self.product_id.as_uuid()),
            fields::K_ATTRIBUTE_ID => FieldValue::Ref(*self.attribute_id.as_uuid()),
            fields::K_SCOPE => FieldValue::Text(self.scope.as_str().to_string()),
            fields::K_CHANNEL_ID => match self.channel_id {
                Some(id) => FieldValue::Ref(*id.as_uuid()),
                None => FieldValue::Null,
            },
            fields::K_LOCALE => match &self.locale {
                Some(l) => FieldValue::Text(l.code().to_string()),
                None => FieldValue::Null,
            },
            fields::K_IS_REQUIRED => FieldValue::Boolean(self.is_required),
            fields::K_PRODUCT_FAMILY_ATTRIBUTE_ID => match self.product_family_attribute_id {
                Some(id) => FieldValue::Ref(*id.as_uuid()),
                None => FieldValue::Null,
            },
            _ => self.fields.get(key).cloned().unwrap_or(FieldValue::Null),
        }
    }

    /// Full field map as the client sees it: typed columns projected to
    /// wire names plus the field bag. Used to (re)build save baselines.
    pub fn snapshot_fields(&self) -> BTreeMap<String, FieldValue> {
        let mut out = self.fields.clone();
        for key in [
            fields::K_ID,
            fields::K_PRODUCT_ID,
            fields::K_ATTRIBUTE_ID,
            fields::K_SCOPE,
            fields::K_CHANNEL_ID,
            fields::K_LOCALE,
            fields::K_IS_REQUIRED,
            fields::K_PRODUCT_FAMILY_ATTRIBUTE_ID,
        ] {
            out.insert(key.to_string(), self.projected_value(key));
        }
        out
    }
}
