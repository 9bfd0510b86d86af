//! Job dispatch seam between administrative updates and the background
//! queue. The production dispatcher writes into the store's job queue; tests
//! substitute recording or failing dispatchers.

use opencatalog_core::ids::JobId;
use opencatalog_storage::Store;

use crate::error::DispatchError;

/// Priority for routine maintenance jobs.
pub const NORMAL_PRIORITY: i64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobType {
    OwnershipRecompute,
}

impl JobType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OwnershipRecompute => "ownershipRecompute",
        }
    }
}

pub trait JobDispatcher {
    fn dispatch(
        &mut self,
        store: &mut dyn Store,
        description: &str,
        job_type: JobType,
        payload: &serde_json::Value,
        priority: i64,
    ) -> Result<JobId, DispatchError>;
}

/// Enqueues into the store-backed job queue for an external runner.
pub struct QueueDispatcher;

impl JobDispatcher for QueueDispatcher {
    fn dispatch(
        &mut self,
        store: &mut dyn Store,
        description: &str,
        job_type: JobType,
        payload: &serde_json::Value,
        priority: i64,
    ) -> Result<JobId, DispatchError> {
        let id = store.enqueue_job(description, job_type.as_str(), payload, priority)?;
        tracing::debug!(job = %id, job_type = job_type.as_str(), "job enqueued");
        Ok(id)
    }
}
