//! Ownership inheritance: copying assigned user, owner user and teams from
//! the attribute definition or the parent product onto a value record,
//! governed by the attribute-level half of the ownership policy.

use opencatalog_core::{
    attribute::Attribute,
    entities::Product,
    field_value::FieldValue,
    fields::Facet,
    locale::LocaleSet,
    policy::{FacetSettings, OwnershipSource},
    record::AttributeValueRecord,
};
use opencatalog_storage::Store;

use crate::error::EngineError;

/// Facets whose inherit flag fired on this save.
///
/// Every record inherits when the base flag transitioned to true in this
/// very update; a flag that was already true does not re-fire. A locale
/// variant is additionally eligible through its locale-suffixed flag as
/// currently set, while multilingual mode is active and its locale is in
/// the active list.
pub fn eligible_facets(
    before: &AttributeValueRecord,
    after: &AttributeValueRecord,
    locales: &LocaleSet,
) -> Vec<Facet> {
    let mut out = Vec::new();
    for facet in Facet::ALL {
        let transitioned =
            after.bool_field(facet.inherit_flag()) && !before.bool_field(facet.inherit_flag());
        let locale_override = match &after.locale {
            Some(locale) => {
                locales.is_multilang_active
                    && locales.contains(locale)
                    && after.locale_inherit_override(facet)
            }
            None => false,
        };
        if transitioned || locale_override {
            out.push(facet);
        }
    }
    out
}

fn user_field(user: Option<opencatalog_core::ids::UserId>) -> FieldValue {
    match user {
        Some(id) => FieldValue::Ref(*id.as_uuid()),
        None => FieldValue::Null,
    }
}

fn teams_field(teams: &[opencatalog_core::ids::TeamId]) -> FieldValue {
    FieldValue::List(teams.iter().map(|t| FieldValue::Ref(*t.as_uuid())).collect())
}

/// Copy one facet's value from the configured source onto the record.
/// `notInherit` leaves the record untouched even when the flag fired.
pub fn apply_facet(
    record: &mut AttributeValueRecord,
    facet: Facet,
    settings: &FacetSettings,
    attribute: &Attribute,
    product: &Product,
) -> bool {
    let inherited = match settings.source_for(facet) {
        OwnershipSource::NotInherit => return false,
        OwnershipSource::FromAttribute => match facet {
            Facet::AssignedUser => user_field(attribute.assigned_user),
            Facet::OwnerUser => user_field(attribute.owner_user),
            Facet::Teams => teams_field(&attribute.teams),
        },
        OwnershipSource::FromProduct => match facet {
            Facet::AssignedUser => user_field(product.assigned_user),
            Facet::OwnerUser => user_field(product.owner_user),
            Facet::Teams => teams_field(&product.teams),
        },
    };

    let key = facet.value_key();
    if record.field(key) == Some(&inherited) {
        return false;
    }
    record.set_field(key, inherited);
    true
}

/// Full recompute over every live record, run by the background job after an
/// ownership policy change. Eligibility here is flag-currently-true, so the
/// pass is idempotent; records whose sources resolve to the already-stored
/// value are skipped.
pub fn run_ownership_recompute(
    store: &mut dyn Store,
    settings: &FacetSettings,
    locales: &LocaleSet,
) -> Result<usize, EngineError> {
    let records = store.live_attribute_values()?;
    let mut changed = 0usize;

    for mut record in records {
        let facets: Vec<Facet> = Facet::ALL
            .into_iter()
            .filter(|facet| {
                let locale_override = match &record.locale {
                    Some(locale) => {
                        locales.is_multilang_active
                            && locales.contains(locale)
                            && record.locale_inherit_override(*facet)
                    }
                    None => false,
                };
                record.bool_field(facet.inherit_flag()) || locale_override
            })
            .collect();
        if facets.is_empty() {
            continue;
        }

        let attribute = match store.get_attribute(record.attribute_id)? {
            Some(a) => a,
            None => continue,
        };
        let product = match store.get_product(record.product_id)? {
            Some(p) => p,
            None => continue,
        };

        let mut touched = false;
        for facet in facets {
            touched |= apply_facet(&mut record, facet, settings, &attribute, &product);
        }
        if touched {
            store.upsert_attribute_value(&record)?;
            changed += 1;
        }
    }

    tracing::debug!(changed, "ownership recompute finished");
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencatalog_core::ids::{AttributeId, ProductId, TeamId, UserId};
    use opencatalog_core::locale::Locale;

    fn base_record() -> AttributeValueRecord {
        AttributeValueRecord::new(ProductId::new(), AttributeId::new())
    }

    fn locale_set(active: bool, codes: &[&str]) -> LocaleSet {
        LocaleSet {
            is_multilang_active: active,
            input_language_list: codes.iter().map(|c| Locale::parse(c).unwrap()).collect(),
        }
    }

    #[test]
    fn base_flag_fires_only_on_transition_to_true() {
        let locales = locale_set(false, &[]);
        let before = base_record();
        let mut after = before.clone();
        after.set_field("isInheritTeams", FieldValue::Boolean(true));

        assert_eq!(eligible_facets(&before, &after, &locales), vec![Facet::Teams]);

        // Already true before: does not re-fire.
        let before = after.clone();
        assert!(eligible_facets(&before, &after, &locales).is_empty());
    }

    #[test]
    fn variant_base_flag_transition_fires_like_any_record() {
        let mut before = base_record();
        before.locale = Some(Locale::parse("de_DE").unwrap());
        let mut after = before.clone();
        after.set_field("isInheritOwnerUser", FieldValue::Boolean(true));

        // The base flag does not depend on the locale set at all.
        let multilang_off = locale_set(false, &[]);
        assert_eq!(
            eligible_facets(&before, &after, &multilang_off),
            vec![Facet::OwnerUser]
        );

        let before = after.clone();
        assert!(eligible_facets(&before, &after, &multilang_off).is_empty());
    }

    #[test]
    fn locale_variant_needs_active_locale() {
        let before = base_record();
        let mut after = before.clone();
        after.locale = Some(Locale::parse("de_DE").unwrap());
        after.set_field("isInheritOwnerUserDeDe", FieldValue::Boolean(true));

        let active = locale_set(true, &["en_US", "de_DE"]);
        assert_eq!(
            eligible_facets(&before, &after, &active),
            vec![Facet::OwnerUser]
        );

        let inactive = locale_set(true, &["en_US"]);
        assert!(eligible_facets(&before, &after, &inactive).is_empty());

        let multilang_off = locale_set(false, &["de_DE"]);
        assert!(eligible_facets(&before, &after, &multilang_off).is_empty());
    }

    #[test]
    fn apply_facet_copies_from_configured_source() {
        let owner = UserId::new();
        let team = TeamId::new();
        let attribute = Attribute {
            id: AttributeId::new(),
            name: "size".to_string(),
            attr_type: opencatalog_core::attribute::AttributeType::Other,
            is_multilang: false,
            type_value: Vec::new(),
            option_labels: Default::default(),
            assigned_user: None,
            owner_user: Some(owner),
            teams: Vec::new(),
        };
        let product = Product {
            id: ProductId::new(),
            name: "chair".to_string(),
            assigned_user: None,
            owner_user: None,
            teams: vec![team],
            channel_ids: Vec::new(),
            modified_at: 0,
        };
        let settings = FacetSettings {
            assigned_user: OwnershipSource::NotInherit,
            owner_user: OwnershipSource::FromAttribute,
            teams: OwnershipSource::FromProduct,
        };

        let mut record = base_record();
        assert!(apply_facet(&mut record, Facet::OwnerUser, &settings, &attribute, &product));
        assert_eq!(
            record.field("ownerUserId"),
            Some(&FieldValue::Ref(*owner.as_uuid()))
        );

        assert!(apply_facet(&mut record, Facet::Teams, &settings, &attribute, &product));
        assert_eq!(
            record.field("teamsIds"),
            Some(&FieldValue::List(vec![FieldValue::Ref(*team.as_uuid())]))
        );

        // notInherit leaves the record alone.
        assert!(!apply_facet(&mut record, Facet::AssignedUser, &settings, &attribute, &product));
        assert!(record.field("assignedUserId").is_none());

        // Re-applying the same source is a no-op.
        assert!(!apply_facet(&mut record, Facet::OwnerUser, &settings, &attribute, &product));
    }
}
