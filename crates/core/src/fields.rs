//! Well-known field keys of an attribute-value record, and the typed
//! ownership facets. Keys match the wire names the client submits.

use serde::{Deserialize, Serialize};

use crate::locale::Locale;

pub const K_ID: &str = "id";
pub const K_PRODUCT_ID: &str = "productId";
pub const K_ATTRIBUTE_ID: &str = "attributeId";
pub const K_SCOPE: &str = "scope";
pub const K_CHANNEL_ID: &str = "channelId";
pub const K_LOCALE: &str = "locale";
pub const K_IS_REQUIRED: &str = "isRequired";
pub const K_PRODUCT_FAMILY_ATTRIBUTE_ID: &str = "productFamilyAttributeId";
pub const K_VALUE: &str = "value";
pub const K_ASSIGNED_USER_ID: &str = "assignedUserId";
pub const K_OWNER_USER_ID: &str = "ownerUserId";
pub const K_TEAMS_IDS: &str = "teamsIds";

/// One ownership dimension of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Facet {
    AssignedUser,
    OwnerUser,
    Teams,
}

impl Facet {
    pub const ALL: [Facet; 3] = [Facet::AssignedUser, Facet::OwnerUser, Facet::Teams];

    /// Field key holding the facet's value on a record.
    pub fn value_key(&self) -> &'static str {
        match self {
            Facet::AssignedUser => K_ASSIGNED_USER_ID,
            Facet::OwnerUser => K_OWNER_USER_ID,
            Facet::Teams => K_TEAMS_IDS,
        }
    }

    /// Base inherit flag for the facet.
    pub fn inherit_flag(&self) -> &'static str {
        match self {
            Facet::AssignedUser => "isInheritAssignedUser",
            Facet::OwnerUser => "isInheritOwnerUser",
            Facet::Teams => "isInheritTeams",
        }
    }

    /// Typed lookup for the inherit flag key, locale-qualified when the
    /// record is a locale variant.
    pub fn inherit_flag_for(&self, locale: Option<&Locale>) -> String {
        match locale {
            Some(l) => l.variant_key(self.inherit_flag()),
            None => self.inherit_flag().to_string(),
        }
    }
}
