pub mod config;
pub mod dispatch;
pub mod error;
pub mod language;
pub mod ownership;
pub mod reconciler;
pub mod uniqueness;
pub mod writer;

pub use config::Config;
pub use dispatch::{JobDispatcher, JobType, QueueDispatcher, NORMAL_PRIORITY};
pub use error::{DispatchError, EngineError};
pub use language::{DefaultLanguage, Language};
pub use reconciler::{
    PolicyChangeReconciler, ReconcileContext, ReconcileOutcome, SettingsUpdate,
};
pub use writer::AttributeValueWriter;
