use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::ids::{AttributeId, TeamId, UserId};
use crate::locale::Locale;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeType {
    Enum,
    MultiEnum,
    Other,
}

impl AttributeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enum => "enum",
            Self::MultiEnum => "multiEnum",
            Self::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "enum" => Ok(Self::Enum),
            "multiEnum" => Ok(Self::MultiEnum),
            "other" => Ok(Self::Other),
            _ => Err(CoreError::InvalidData(format!("unknown attribute type: {s}"))),
        }
    }
}

/// An attribute definition. Read-only as far as the save pipeline is
/// concerned: option tables and ownership fields are inputs, never outputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attribute {
    pub id: AttributeId,
    pub name: String,
    pub attr_type: AttributeType,
    pub is_multilang: bool,
    /// Canonical option keys, in order. Option indexes into the per-locale
    /// tables are positions in this list.
    pub type_value: Vec<String>,
    /// Per-locale option label table: index-aligned with `type_value`.
    pub option_labels: BTreeMap<Locale, Vec<String>>,
    pub assigned_user: Option<UserId>,
    pub owner_user: Option<UserId>,
    pub teams: Vec<TeamId>,
}

impl Attribute {
    pub fn is_multilang_enum(&self) -> bool {
        self.is_multilang
            && matches!(self.attr_type, AttributeType::Enum | AttributeType::MultiEnum)
    }
}
