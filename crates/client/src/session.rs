//! The conflict-aware save session: diff against an immutable baseline,
//! submit a conditioned write, and walk the conflict-confirmation round when
//! the server reports divergence.
//!
//! The baseline snapshot is never mutated while a save is in flight. It is
//! swapped wholesale for the server's returned record on success, so a
//! cancelled or failed round leaves the session exactly where it started.

use std::collections::BTreeMap;

use opencatalog_core::{
    boundary::{SaveRequest, WriteBoundary, WriteError},
    field_value::FieldValue,
    ids::AttributeValueId,
    record::AttributeValueRecord,
};

use crate::error::SessionError;

/// An auxiliary edit surface whose values ride along with the main form
/// submission but never participate in the baseline diff or conflict check.
pub trait SubPanel {
    fn collect(&self) -> BTreeMap<String, FieldValue>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    /// A conflict came back; awaiting explicit confirmation or cancel.
    Conflicted,
}

#[derive(Debug)]
pub enum SaveSignal {
    Saved(AttributeValueRecord),
    /// The submission would not have changed anything.
    NotModified,
    /// The server refused: stored state diverged from the baseline.
    ConflictPending {
        description: String,
        fields: Vec<String>,
    },
}

pub struct SaveSession {
    record_id: Option<AttributeValueId>,
    baseline: BTreeMap<String, FieldValue>,
    required_fields: Vec<String>,
    not_persisted: Vec<String>,
    state: SessionState,
    pending: Option<SaveRequest>,
}

impl SaveSession {
    /// Session over an existing record; the baseline is the record's full
    /// field map as last seen from the server.
    pub fn for_record(record: &AttributeValueRecord) -> Self {
        Self {
            record_id: Some(record.id),
            baseline: record.snapshot_fields(),
            required_fields: Vec::new(),
            not_persisted: Vec::new(),
            state: SessionState::Idle,
            pending: None,
        }
    }

    /// Session for a record that does not exist yet. Every submitted field
    /// counts as changed; no conflict check applies to a create.
    pub fn for_new_record() -> Self {
        Self {
            record_id: None,
            baseline: BTreeMap::new(),
            required_fields: Vec::new(),
            not_persisted: Vec::new(),
            state: SessionState::Idle,
            pending: None,
        }
    }

    pub fn with_required_fields(mut self, fields: &[&str]) -> Self {
        self.required_fields = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    /// Fields stripped from every submission (display-only projections).
    pub fn with_not_persisted(mut self, fields: &[&str]) -> Self {
        self.not_persisted = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn baseline(&self) -> &BTreeMap<String, FieldValue> {
        &self.baseline
    }

    fn baseline_value(&self, key: &str) -> FieldValue {
        self.baseline.get(key).cloned().unwrap_or(FieldValue::Null)
    }

    /// Drive one full save round: validate, diff, submit, interpret.
    ///
    /// Panel values are merged in after the diff and the previous-value
    /// baseline are computed, so they are persisted but never guarded.
    pub fn save(
        &mut self,
        current: &BTreeMap<String, FieldValue>,
        panels: &[&dyn SubPanel],
        boundary: &mut dyn WriteBoundary,
    ) -> Result<SaveSignal, SessionError> {
        if self.state != SessionState::Idle {
            return Err(SessionError::InvalidState(
                "a conflicted save is awaiting confirmation".to_string(),
            ));
        }

        for field in &self.required_fields {
            let empty = current.get(field).is_none_or(FieldValue::is_empty);
            if empty {
                return Err(SessionError::MissingField(field.clone()));
            }
        }

        let mut attrs: BTreeMap<String, FieldValue> = current
            .iter()
            .filter(|(key, value)| {
                !self.not_persisted.contains(key) && **value != self.baseline_value(key)
            })
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        let previous_values: BTreeMap<String, FieldValue> = attrs
            .keys()
            .map(|key| (key.clone(), self.baseline_value(key)))
            .collect();

        let mut panel_changed = false;
        for panel in panels {
            for (key, value) in panel.collect() {
                attrs.insert(key, value);
                panel_changed = true;
            }
        }

        // Nothing to say: skip the round trip entirely.
        if attrs.is_empty() && !panel_changed && self.record_id.is_some() {
            tracing::debug!("save skipped, nothing changed");
            return Ok(SaveSignal::NotModified);
        }

        let request = match self.record_id {
            Some(id) => {
                let mut request = SaveRequest::update(id, attrs);
                request.previous_values = Some(previous_values);
                request
            }
            None => SaveRequest::create(attrs),
        };

        self.submit(request, boundary)
    }

    /// Explicit last-write-wins resubmission of the conflicted save.
    pub fn confirm_override(
        &mut self,
        boundary: &mut dyn WriteBoundary,
    ) -> Result<SaveSignal, SessionError> {
        if self.state != SessionState::Conflicted {
            return Err(SessionError::InvalidState(
                "no conflicted save to confirm".to_string(),
            ));
        }
        let mut request = match self.pending.take() {
            Some(r) => r,
            None => {
                self.state = SessionState::Idle;
                return Err(SessionError::InvalidState(
                    "no conflicted save to confirm".to_string(),
                ));
            }
        };
        self.state = SessionState::Idle;
        request.previous_values = None;
        request.bypass_conflict_check = true;
        self.submit(request, boundary)
    }

    /// Abandon the conflicted save. The baseline is untouched, so the next
    /// save diffs against the same pre-edit state.
    pub fn cancel(&mut self) {
        self.pending = None;
        self.state = SessionState::Idle;
    }

    fn submit(
        &mut self,
        request: SaveRequest,
        boundary: &mut dyn WriteBoundary,
    ) -> Result<SaveSignal, SessionError> {
        match boundary.submit(request.clone()) {
            Ok(record) => {
                self.baseline = record.snapshot_fields();
                self.record_id = Some(record.id);
                Ok(SaveSignal::Saved(record))
            }
            Err(WriteError::StaleResource) => {
                tracing::debug!("save skipped, nothing changed");
                Ok(SaveSignal::NotModified)
            }
            Err(WriteError::Conflict {
                description,
                fields,
            }) => {
                self.pending = Some(request);
                self.state = SessionState::Conflicted;
                tracing::warn!(?fields, "save conflicted, awaiting confirmation");
                Ok(SaveSignal::ConflictPending {
                    description,
                    fields,
                })
            }
            Err(other) => Err(SessionError::Rejected(other)),
        }
    }
}
