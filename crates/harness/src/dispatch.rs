use opencatalog_core::ids::JobId;
use opencatalog_engine::{DispatchError, JobDispatcher, JobType};
use opencatalog_storage::Store;

/// Records every dispatch without touching the store.
#[derive(Default)]
pub struct RecordingDispatcher {
    pub calls: Vec<RecordedJob>,
}

pub struct RecordedJob {
    pub description: String,
    pub job_type: JobType,
    pub payload: serde_json::Value,
    pub priority: i64,
}

impl JobDispatcher for RecordingDispatcher {
    fn dispatch(
        &mut self,
        _store: &mut dyn Store,
        description: &str,
        job_type: JobType,
        payload: &serde_json::Value,
        priority: i64,
    ) -> Result<JobId, DispatchError> {
        self.calls.push(RecordedJob {
            description: description.to_string(),
            job_type,
            payload: payload.clone(),
            priority,
        });
        Ok(JobId::new())
    }
}

/// Always refuses, for exercising the non-fatal dispatch failure path.
pub struct FailingDispatcher;

impl JobDispatcher for FailingDispatcher {
    fn dispatch(
        &mut self,
        _store: &mut dyn Store,
        _description: &str,
        _job_type: JobType,
        _payload: &serde_json::Value,
        _priority: i64,
    ) -> Result<JobId, DispatchError> {
        Err(DispatchError::Rejected("queue unavailable".to_string()))
    }
}
