//! User-facing message catalog. Write-path errors carry translated text so
//! the client can surface them directly.

pub trait Language {
    /// Resolve a message key; unknown keys fall back to the key itself.
    fn translate(&self, key: &str) -> String;
}

pub const MSG_PRODUCT_AND_ATTRIBUTE_EMPTY: &str = "productAndAttributeCannotBeEmpty";
pub const MSG_FAMILY_ATTRIBUTE_FROZEN: &str = "attributeInheritedFromProductFamilyCannotBeChanged";
pub const MSG_ATTRIBUTE_VALUE_EXISTS: &str = "productAttributeAlreadyExists";
pub const MSG_NO_SUCH_CHANNEL: &str = "noSuchChannelInProduct";
pub const MSG_UPDATING_OWNERSHIP: &str = "updatingOwnershipInformation";
pub const MSG_NOT_MODIFIED: &str = "notModified";
pub const MSG_CONFLICT_DETECTED: &str = "editConflict";

/// Built-in English catalog.
pub struct DefaultLanguage;

impl Language for DefaultLanguage {
    fn translate(&self, key: &str) -> String {
        match key {
            MSG_PRODUCT_AND_ATTRIBUTE_EMPTY => "Product and Attribute cannot be empty",
            MSG_FAMILY_ATTRIBUTE_FROZEN => {
                "Attribute inherited from the product family cannot be changed"
            }
            MSG_ATTRIBUTE_VALUE_EXISTS => "Attribute value '{attribute}' already exists",
            MSG_NO_SUCH_CHANNEL => "Product is not associated with this channel",
            MSG_UPDATING_OWNERSHIP => "Updating ownership information",
            MSG_NOT_MODIFIED => "Nothing was changed",
            MSG_CONFLICT_DETECTED => "The record was changed while you were editing it",
            _ => key,
        }
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_key_falls_back_to_key() {
        assert_eq!(DefaultLanguage.translate("someUnknownKey"), "someUnknownKey");
    }
}
