use std::collections::BTreeMap;

use opencatalog_core::{
    attribute::Attribute,
    entities::{Channel, Product},
    ids::*,
    locale::Locale,
    record::AttributeValueRecord,
};

use crate::error::StorageError;

/// A queued asynchronous work item, as persisted for an external job runner.
#[derive(Debug, Clone)]
pub struct JobRecord {
    pub id: JobId,
    pub description: String,
    pub job_type: String,
    pub payload: serde_json::Value,
    pub priority: i64,
    pub created_at: i64,
}

pub trait Store {
    // Products
    fn insert_product(&mut self, product: &Product) -> Result<(), StorageError>;

    fn get_product(&self, id: ProductId) -> Result<Option<Product>, StorageError>;

    fn set_product_modified_at(
        &mut self,
        id: ProductId,
        modified_at: i64,
    ) -> Result<(), StorageError>;

    // Attributes
    fn insert_attribute(&mut self, attribute: &Attribute) -> Result<(), StorageError>;

    fn get_attribute(&self, id: AttributeId) -> Result<Option<Attribute>, StorageError>;

    // Channels
    fn insert_channel(&mut self, channel: &Channel) -> Result<(), StorageError>;

    fn get_channel(&self, id: ChannelId) -> Result<Option<Channel>, StorageError>;

    fn all_channels(&self) -> Result<Vec<Channel>, StorageError>;

    fn set_channel_locales(
        &mut self,
        id: ChannelId,
        locales: &[Locale],
    ) -> Result<(), StorageError>;

    fn clear_all_channel_locales(&mut self) -> Result<(), StorageError>;

    // Attribute values
    fn upsert_attribute_value(
        &mut self,
        record: &AttributeValueRecord,
    ) -> Result<(), StorageError>;

    fn get_attribute_value(
        &self,
        id: AttributeValueId,
    ) -> Result<Option<AttributeValueRecord>, StorageError>;

    /// Another live record with the same `(product, attribute, scope[, channel])`
    /// identity, excluding the candidate itself.
    fn find_copy(
        &self,
        record: &AttributeValueRecord,
    ) -> Result<Option<AttributeValueId>, StorageError>;

    fn live_attribute_values(&self) -> Result<Vec<AttributeValueRecord>, StorageError>;

    /// Explicit cascade removal for a deleted family attribute. Returns the
    /// number of records removed.
    fn remove_by_family_attribute(
        &mut self,
        id: FamilyAttributeId,
    ) -> Result<usize, StorageError>;

    // Configuration (whole-object atomic persistence)
    fn load_config(&self) -> Result<BTreeMap<String, serde_json::Value>, StorageError>;

    fn save_config(
        &mut self,
        values: &BTreeMap<String, serde_json::Value>,
    ) -> Result<(), StorageError>;

    // Job queue
    fn enqueue_job(
        &mut self,
        description: &str,
        job_type: &str,
        payload: &serde_json::Value,
        priority: i64,
    ) -> Result<JobId, StorageError>;

    fn list_jobs(&self) -> Result<Vec<JobRecord>, StorageError>;
}
