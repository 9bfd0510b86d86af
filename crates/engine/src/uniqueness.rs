//! Uniqueness enforcement for the `(product, attribute, scope[, channel])`
//! identity, evaluated against live records only.

use opencatalog_core::{
    attribute::Attribute,
    boundary::WriteError,
    record::{AttributeValueRecord, Scope},
};
use opencatalog_storage::Store;

use crate::language::{Language, MSG_ATTRIBUTE_VALUE_EXISTS};

/// Reject the candidate when another live record already occupies its
/// identity. Soft-deleted records never count; the candidate's own row is
/// excluded so re-saving in place always passes.
pub fn check_unique(
    store: &dyn Store,
    language: &dyn Language,
    attribute: &Attribute,
    candidate: &AttributeValueRecord,
) -> Result<(), WriteError> {
    let copy = store
        .find_copy(candidate)
        .map_err(|e| WriteError::Internal(e.to_string()))?;
    if copy.is_none() {
        return Ok(());
    }

    let channel = if candidate.scope == Scope::Channel {
        match candidate.channel_id {
            Some(id) => store
                .get_channel(id)
                .map_err(|e| WriteError::Internal(e.to_string()))?
                .map(|c| c.name),
            None => None,
        }
    } else {
        None
    };

    let mut message = language
        .translate(MSG_ATTRIBUTE_VALUE_EXISTS)
        .replace("{attribute}", &attribute.name);
    if let Some(name) = &channel {
        message = format!("{message} ({name})");
    }

    Err(WriteError::Duplicate {
        attribute: attribute.name.clone(),
        channel,
        message,
    })
}
