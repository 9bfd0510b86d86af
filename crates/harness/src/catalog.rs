use std::collections::BTreeMap;

use opencatalog_core::{
    attribute::{Attribute, AttributeType},
    boundary::{SaveRequest, WriteError},
    entities::{Channel, Product},
    field_value::FieldValue,
    fields,
    ids::*,
    locale::Locale,
    record::AttributeValueRecord,
};
use opencatalog_engine::{
    config::{K_INPUT_LANGUAGE_LIST, K_IS_MULTILANG_ACTIVE},
    AttributeValueWriter, Config, DefaultLanguage,
};
use opencatalog_storage::{SqliteStore, Store};

/// An in-memory catalog with a config object and the default language,
/// plus seeding helpers for the entities the save pipeline touches.
pub struct TestCatalog {
    pub store: SqliteStore,
    pub config: Config,
    pub language: DefaultLanguage,
}

impl TestCatalog {
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self {
            store: SqliteStore::open_in_memory()?,
            config: Config::default(),
            language: DefaultLanguage,
        })
    }

    pub fn writer(&mut self) -> AttributeValueWriter<'_> {
        AttributeValueWriter::new(&mut self.store, &self.config, &self.language)
    }

    pub fn save(&mut self, request: SaveRequest) -> Result<AttributeValueRecord, WriteError> {
        use opencatalog_core::boundary::WriteBoundary;
        self.writer().submit(request)
    }

    pub fn enable_multilang(
        &mut self,
        locales: &[&str],
    ) -> Result<(), Box<dyn std::error::Error>> {
        self.config.set(K_IS_MULTILANG_ACTIVE, serde_json::json!(true));
        self.config
            .set(K_INPUT_LANGUAGE_LIST, serde_json::json!(locales));
        self.config.save(&mut self.store)?;
        Ok(())
    }

    pub fn add_product(
        &mut self,
        name: &str,
        channel_ids: &[ChannelId],
    ) -> Result<ProductId, Box<dyn std::error::Error>> {
        let product = Product {
            id: ProductId::new(),
            name: name.to_string(),
            assigned_user: None,
            owner_user: None,
            teams: Vec::new(),
            channel_ids: channel_ids.to_vec(),
            modified_at: 0,
        };
        self.store.insert_product(&product)?;
        Ok(product.id)
    }

    pub fn add_channel(
        &mut self,
        name: &str,
        locales: &[&str],
    ) -> Result<ChannelId, Box<dyn std::error::Error>> {
        let mut parsed = Vec::new();
        for code in locales {
            parsed.push(Locale::parse(code)?);
        }
        let channel = Channel {
            id: ChannelId::new(),
            name: name.to_string(),
            locales: parsed,
        };
        self.store.insert_channel(&channel)?;
        Ok(channel.id)
    }

    /// A plain single-language attribute.
    pub fn add_attribute(&mut self, name: &str) -> Result<AttributeId, Box<dyn std::error::Error>> {
        let attribute = Attribute {
            id: AttributeId::new(),
            name: name.to_string(),
            attr_type: AttributeType::Other,
            is_multilang: false,
            type_value: Vec::new(),
            option_labels: BTreeMap::new(),
            assigned_user: None,
            owner_user: None,
            teams: Vec::new(),
        };
        self.store.insert_attribute(&attribute)?;
        Ok(attribute.id)
    }

    /// A multilingual enum or multi-enum attribute with per-locale option
    /// labels, index-aligned with `options`.
    pub fn add_enum_attribute(
        &mut self,
        name: &str,
        attr_type: AttributeType,
        options: &[&str],
        labels: &[(&str, &[&str])],
    ) -> Result<AttributeId, Box<dyn std::error::Error>> {
        let mut option_labels = BTreeMap::new();
        for (code, locale_labels) in labels {
            option_labels.insert(
                Locale::parse(code)?,
                locale_labels.iter().map(|l| l.to_string()).collect(),
            );
        }
        let attribute = Attribute {
            id: AttributeId::new(),
            name: name.to_string(),
            attr_type,
            is_multilang: true,
            type_value: options.iter().map(|o| o.to_string()).collect(),
            option_labels,
            assigned_user: None,
            owner_user: None,
            teams: Vec::new(),
        };
        self.store.insert_attribute(&attribute)?;
        Ok(attribute.id)
    }

    /// Create attrs referencing a product and attribute, plus a value.
    pub fn create_attrs(
        product_id: ProductId,
        attribute_id: AttributeId,
        value: FieldValue,
    ) -> BTreeMap<String, FieldValue> {
        let mut attrs = BTreeMap::new();
        attrs.insert(
            fields::K_PRODUCT_ID.to_string(),
            FieldValue::Ref(*product_id.as_uuid()),
        );
        attrs.insert(
            fields::K_ATTRIBUTE_ID.to_string(),
            FieldValue::Ref(*attribute_id.as_uuid()),
        );
        attrs.insert(fields::K_VALUE.to_string(), value);
        attrs
    }
}
