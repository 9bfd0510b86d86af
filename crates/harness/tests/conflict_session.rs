use opencatalog_client::{SaveSession, SaveSignal, SessionError, SessionState, SubPanel};
use opencatalog_core::{
    boundary::{SaveRequest, WriteBoundary, WriteError},
    field_value::FieldValue,
    fields,
    ids::UserId,
    record::AttributeValueRecord,
};
use opencatalog_harness::TestCatalog;
use std::collections::BTreeMap;

/// Forwards to the real writer while keeping every submitted request for
/// inspection.
struct RecordingBoundary<'a> {
    catalog: &'a mut TestCatalog,
    requests: Vec<SaveRequest>,
}

impl<'a> RecordingBoundary<'a> {
    fn new(catalog: &'a mut TestCatalog) -> Self {
        Self {
            catalog,
            requests: Vec::new(),
        }
    }
}

impl WriteBoundary for RecordingBoundary<'_> {
    fn submit(&mut self, request: SaveRequest) -> Result<AttributeValueRecord, WriteError> {
        self.requests.push(request.clone());
        self.catalog.save(request)
    }
}

fn seed_record(
    catalog: &mut TestCatalog,
) -> Result<AttributeValueRecord, Box<dyn std::error::Error>> {
    let product_id = catalog.add_product("Chair", &[])?;
    let attribute_id = catalog.add_attribute("height")?;
    let attrs = TestCatalog::create_attrs(product_id, attribute_id, FieldValue::Integer(95));
    Ok(catalog.save(SaveRequest::create(attrs))?)
}

#[test]
fn diff_submits_only_changed_fields() -> Result<(), Box<dyn std::error::Error>> {
    let mut catalog = TestCatalog::new()?;
    let record = seed_record(&mut catalog)?;

    let mut session = SaveSession::for_record(&record);
    let mut current = session.baseline().clone();
    current.insert(fields::K_VALUE.to_string(), FieldValue::Integer(100));

    let mut boundary = RecordingBoundary::new(&mut catalog);
    let signal = session.save(&current, &[], &mut boundary)?;
    assert!(matches!(signal, SaveSignal::Saved(_)));

    let request = &boundary.requests[0];
    assert_eq!(request.attrs.len(), 1);
    assert_eq!(
        request.attrs.get(fields::K_VALUE),
        Some(&FieldValue::Integer(100))
    );
    let previous = request.previous_values.as_ref().unwrap();
    assert_eq!(
        previous.get(fields::K_VALUE),
        Some(&FieldValue::Integer(95))
    );
    Ok(())
}

#[test]
fn conflict_round_trip_with_override() -> Result<(), Box<dyn std::error::Error>> {
    let mut catalog = TestCatalog::new()?;
    let record = seed_record(&mut catalog)?;
    let mut session = SaveSession::for_record(&record);

    // Someone else lands an edit after our baseline was taken.
    let mut attrs = BTreeMap::new();
    attrs.insert(fields::K_VALUE.to_string(), FieldValue::Integer(200));
    catalog.save(SaveRequest::update(record.id, attrs))?;

    let mut current = session.baseline().clone();
    current.insert(fields::K_VALUE.to_string(), FieldValue::Integer(100));

    let mut boundary = RecordingBoundary::new(&mut catalog);
    let signal = session.save(&current, &[], &mut boundary)?;
    match signal {
        SaveSignal::ConflictPending { fields, .. } => {
            assert_eq!(fields, vec!["value".to_string()])
        }
        other => panic!("expected conflict, got {other:?}"),
    }
    assert_eq!(session.state(), SessionState::Conflicted);

    // A second plain save is refused while the conflict is pending.
    assert!(matches!(
        session.save(&current, &[], &mut boundary),
        Err(SessionError::InvalidState(_))
    ));

    let signal = session.confirm_override(&mut boundary)?;
    let saved = match signal {
        SaveSignal::Saved(record) => record,
        other => panic!("expected save, got {other:?}"),
    };
    assert_eq!(
        saved.field(fields::K_VALUE),
        Some(&FieldValue::Integer(100))
    );

    let resubmitted = boundary.requests.last().unwrap();
    assert!(resubmitted.bypass_conflict_check);
    assert!(resubmitted.previous_values.is_none());
    Ok(())
}

#[test]
fn cancel_keeps_the_baseline() -> Result<(), Box<dyn std::error::Error>> {
    let mut catalog = TestCatalog::new()?;
    let record = seed_record(&mut catalog)?;
    let mut session = SaveSession::for_record(&record);

    let mut attrs = BTreeMap::new();
    attrs.insert(fields::K_VALUE.to_string(), FieldValue::Integer(200));
    catalog.save(SaveRequest::update(record.id, attrs))?;

    let baseline_before = session.baseline().clone();
    let mut current = baseline_before.clone();
    current.insert(fields::K_VALUE.to_string(), FieldValue::Integer(100));

    let mut boundary = RecordingBoundary::new(&mut catalog);
    let signal = session.save(&current, &[], &mut boundary)?;
    assert!(matches!(signal, SaveSignal::ConflictPending { .. }));

    session.cancel();
    assert_eq!(session.state(), SessionState::Idle);
    assert_eq!(session.baseline(), &baseline_before);
    assert!(matches!(
        session.confirm_override(&mut boundary),
        Err(SessionError::InvalidState(_))
    ));
    Ok(())
}

#[test]
fn disjoint_field_edits_do_not_conflict() -> Result<(), Box<dyn std::error::Error>> {
    let mut catalog = TestCatalog::new()?;
    let record = seed_record(&mut catalog)?;
    let mut session = SaveSession::for_record(&record);

    // The other editor touches a different field.
    let mut attrs = BTreeMap::new();
    attrs.insert("note".to_string(), FieldValue::Text("checked".into()));
    catalog.save(SaveRequest::update(record.id, attrs))?;

    let mut current = session.baseline().clone();
    current.insert(fields::K_VALUE.to_string(), FieldValue::Integer(100));

    let mut boundary = RecordingBoundary::new(&mut catalog);
    let signal = session.save(&current, &[], &mut boundary)?;
    let saved = match signal {
        SaveSignal::Saved(record) => record,
        other => panic!("expected save, got {other:?}"),
    };
    assert_eq!(
        saved.field(fields::K_VALUE),
        Some(&FieldValue::Integer(100))
    );
    assert_eq!(
        saved.field("note"),
        Some(&FieldValue::Text("checked".into()))
    );
    Ok(())
}

#[test]
fn unchanged_save_reports_not_modified() -> Result<(), Box<dyn std::error::Error>> {
    let mut catalog = TestCatalog::new()?;
    let record = seed_record(&mut catalog)?;
    let mut session = SaveSession::for_record(&record);

    let current = session.baseline().clone();
    let mut boundary = RecordingBoundary::new(&mut catalog);
    let signal = session.save(&current, &[], &mut boundary)?;
    assert!(matches!(signal, SaveSignal::NotModified));
    assert_eq!(session.state(), SessionState::Idle);

    // No round trip happened at all.
    assert!(boundary.requests.is_empty());
    Ok(())
}

#[test]
fn empty_required_field_blocks_the_save() -> Result<(), Box<dyn std::error::Error>> {
    let mut catalog = TestCatalog::new()?;
    let record = seed_record(&mut catalog)?;
    let mut session =
        SaveSession::for_record(&record).with_required_fields(&[fields::K_VALUE]);

    let mut current = session.baseline().clone();
    current.insert(fields::K_VALUE.to_string(), FieldValue::Null);

    let mut boundary = RecordingBoundary::new(&mut catalog);
    let err = session.save(&current, &[], &mut boundary).unwrap_err();
    match err {
        SessionError::MissingField(field) => assert_eq!(field, "value"),
        other => panic!("expected missing field, got {other:?}"),
    }
    assert!(boundary.requests.is_empty());
    Ok(())
}

#[test]
fn not_persisted_fields_are_stripped() -> Result<(), Box<dyn std::error::Error>> {
    let mut catalog = TestCatalog::new()?;
    let record = seed_record(&mut catalog)?;
    let mut session =
        SaveSession::for_record(&record).with_not_persisted(&["displayLabel"]);

    let mut current = session.baseline().clone();
    current.insert("displayLabel".to_string(), FieldValue::Text("95 cm".into()));
    current.insert(fields::K_VALUE.to_string(), FieldValue::Integer(100));

    let mut boundary = RecordingBoundary::new(&mut catalog);
    session.save(&current, &[], &mut boundary)?;

    let request = &boundary.requests[0];
    assert!(!request.attrs.contains_key("displayLabel"));
    assert!(request.attrs.contains_key(fields::K_VALUE));
    Ok(())
}

struct OwnershipPanel {
    assigned: UserId,
}

impl SubPanel for OwnershipPanel {
    fn collect(&self) -> BTreeMap<String, FieldValue> {
        let mut out = BTreeMap::new();
        out.insert(
            fields::K_ASSIGNED_USER_ID.to_string(),
            FieldValue::Ref(*self.assigned.as_uuid()),
        );
        out
    }
}

#[test]
fn panel_values_are_persisted_but_not_guarded() -> Result<(), Box<dyn std::error::Error>> {
    let mut catalog = TestCatalog::new()?;
    let record = seed_record(&mut catalog)?;
    let mut session = SaveSession::for_record(&record);
    let panel = OwnershipPanel {
        assigned: UserId::new(),
    };

    let mut current = session.baseline().clone();
    current.insert(fields::K_VALUE.to_string(), FieldValue::Integer(100));

    let mut boundary = RecordingBoundary::new(&mut catalog);
    let signal = session.save(&current, &[&panel], &mut boundary)?;
    let saved = match signal {
        SaveSignal::Saved(record) => record,
        other => panic!("expected save, got {other:?}"),
    };
    assert_eq!(
        saved.field(fields::K_ASSIGNED_USER_ID),
        Some(&FieldValue::Ref(*panel.assigned.as_uuid()))
    );

    let request = &boundary.requests[0];
    assert!(request.attrs.contains_key(fields::K_ASSIGNED_USER_ID));
    let previous = request.previous_values.as_ref().unwrap();
    assert!(!previous.contains_key(fields::K_ASSIGNED_USER_ID));
    Ok(())
}
