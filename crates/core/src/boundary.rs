//! The logical write boundary between the client save session and the
//! server-side writer. Errors are transport-shaped: a `Conflict` maps to an
//! HTTP 409 with a reason string, `StaleResource` to a 304.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::field_value::FieldValue;
use crate::ids::AttributeValueId;
use crate::record::AttributeValueRecord;

/// A conditioned write: only the changed fields, each optionally guarded by
/// its last-known previous value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveRequest {
    /// `None` creates a new record; attrs must then carry the references.
    pub record_id: Option<AttributeValueId>,
    pub attrs: BTreeMap<String, FieldValue>,
    /// Pre-edit values of the changed fields, for the server-side conflict
    /// check. `None` (or bypass) skips the check.
    pub previous_values: Option<BTreeMap<String, FieldValue>>,
    /// Explicit last-write-wins override after an acknowledged conflict.
    pub bypass_conflict_check: bool,
    /// Lifts family-linked field freezing and channel-membership validation.
    pub allow_override_restrictions: bool,
}

impl SaveRequest {
    pub fn create(attrs: BTreeMap<String, FieldValue>) -> Self {
        Self {
            record_id: None,
            attrs,
            previous_values: None,
            bypass_conflict_check: false,
            allow_override_restrictions: false,
        }
    }

    pub fn update(record_id: AttributeValueId, attrs: BTreeMap<String, FieldValue>) -> Self {
        Self {
            record_id: Some(record_id),
            attrs,
            previous_values: None,
            bypass_conflict_check: false,
            allow_override_restrictions: false,
        }
    }
}

#[derive(Debug, Clone, Error, Serialize, Deserialize)]
pub enum WriteError {
    /// Missing reference, frozen-field mutation, channel-membership
    /// violation. Always blocks the write.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Another live record already occupies the uniqueness key.
    #[error("{message}")]
    Duplicate {
        attribute: String,
        channel: Option<String>,
        message: String,
    },

    /// Stored state diverged from the client's baseline. Recoverable via
    /// explicit operator override.
    #[error("conflict: {description}")]
    Conflict {
        description: String,
        fields: Vec<String>,
    },

    /// The submission would not change anything.
    #[error("resource not modified")]
    StaleResource,

    /// Record to update does not exist (or was removed).
    #[error("record not found: {0}")]
    NotFound(String),

    /// Server-side failure unrelated to the submitted data.
    #[error("internal error: {0}")]
    Internal(String),
}

pub trait WriteBoundary {
    fn submit(&mut self, request: SaveRequest) -> Result<AttributeValueRecord, WriteError>;
}
