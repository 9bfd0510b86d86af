pub mod attribute;
pub mod boundary;
pub mod codec;
pub mod entities;
pub mod error;
pub mod field_value;
pub mod fields;
pub mod ids;
pub mod locale;
pub mod policy;
pub mod record;

pub use attribute::{Attribute, AttributeType};
pub use boundary::{SaveRequest, WriteBoundary, WriteError};
pub use entities::{Channel, Product};
pub use error::CoreError;
pub use field_value::FieldValue;
pub use fields::Facet;
pub use ids::*;
pub use locale::{Locale, LocaleSet};
pub use policy::{FacetSettings, OwnershipPolicy, OwnershipSource};
pub use record::{AttributeValueRecord, Scope};
