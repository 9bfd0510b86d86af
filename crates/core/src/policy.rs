//! Global ownership-inheritance policy: one source setting per facet and
//! entity level, mutated only through administrative configuration updates.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::fields::Facet;

/// Where an ownership facet inherits its value from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OwnershipSource {
    #[default]
    #[serde(rename = "notInherit")]
    NotInherit,
    #[serde(rename = "fromAttribute")]
    FromAttribute,
    #[serde(rename = "fromProduct")]
    FromProduct,
}

impl OwnershipSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotInherit => "notInherit",
            Self::FromAttribute => "fromAttribute",
            Self::FromProduct => "fromProduct",
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "notInherit" => Ok(Self::NotInherit),
            "fromAttribute" => Ok(Self::FromAttribute),
            "fromProduct" => Ok(Self::FromProduct),
            _ => Err(CoreError::InvalidData(format!(
                "unknown ownership source: {s}"
            ))),
        }
    }
}

/// Per-facet source settings for one entity level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetSettings {
    #[serde(rename = "assignedUser")]
    pub assigned_user: OwnershipSource,
    #[serde(rename = "ownerUser")]
    pub owner_user: OwnershipSource,
    pub teams: OwnershipSource,
}

impl FacetSettings {
    pub fn source_for(&self, facet: Facet) -> OwnershipSource {
        match facet {
            Facet::AssignedUser => self.assigned_user,
            Facet::OwnerUser => self.owner_user,
            Facet::Teams => self.teams,
        }
    }
}

/// The six-setting policy: `{assignedUser, ownerUser, teams}` crossed with
/// attribute-level and product-level. Attribute-value inheritance reads the
/// attribute-level settings; both halves travel in recompute job payloads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipPolicy {
    pub attribute: FacetSettings,
    pub product: FacetSettings,
}

impl OwnershipPolicy {
    pub fn inherits_anything(&self) -> bool {
        Facet::ALL.iter().any(|f| {
            self.attribute.source_for(*f) != OwnershipSource::NotInherit
                || self.product.source_for(*f) != OwnershipSource::NotInherit
        })
    }
}
