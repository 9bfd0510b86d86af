pub mod catalog;
pub mod dispatch;

pub use catalog::TestCatalog;
pub use dispatch::{FailingDispatcher, RecordingDispatcher};
