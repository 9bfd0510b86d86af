//! Multilingual derivation of locale-qualified value fields from an enum or
//! multi-enum attribute's per-locale option tables.

use std::collections::BTreeMap;

use crate::attribute::{Attribute, AttributeType};
use crate::field_value::FieldValue;
use crate::fields::K_VALUE;

/// Derive every locale-qualified value field for `value` against the
/// attribute's option tables.
///
/// Enum: the value's index in `type_value` selects the per-locale label; a
/// stale or custom value that has no index falls back to the raw value.
/// Multi-enum: element-wise mapping, order preserved, `Null` for elements
/// without an index or beyond the end of a locale's table.
///
/// Pure: same inputs always yield the same map, nothing else is touched.
pub fn derive_locale_values(
    attribute: &Attribute,
    value: &FieldValue,
) -> BTreeMap<String, FieldValue> {
    let mut out = BTreeMap::new();
    if !attribute.is_multilang_enum() {
        return out;
    }

    match attribute.attr_type {
        AttributeType::Enum => {
            let index = value
                .as_text()
                .and_then(|v| attribute.type_value.iter().position(|k| k == v));
            for (locale, labels) in &attribute.option_labels {
                let derived = match index.and_then(|i| labels.get(i)) {
                    Some(label) => FieldValue::Text(label.clone()),
                    None => value.clone(),
                };
                out.insert(locale.variant_key(K_VALUE), derived);
            }
        }
        AttributeType::MultiEnum => {
            let elements = value.as_list().unwrap_or(&[]);
            let indexes: Vec<Option<usize>> = elements
                .iter()
                .map(|e| {
                    e.as_text()
                        .and_then(|v| attribute.type_value.iter().position(|k| k == v))
                })
                .collect();
            for (locale, labels) in &attribute.option_labels {
                let mapped: Vec<FieldValue> = indexes
                    .iter()
                    .map(|idx| match idx.and_then(|i| labels.get(i)) {
                        Some(label) => FieldValue::Text(label.clone()),
                        None => FieldValue::Null,
                    })
                    .collect();
                out.insert(locale.variant_key(K_VALUE), FieldValue::List(mapped));
            }
        }
        AttributeType::Other => {}
    }

    out
}
