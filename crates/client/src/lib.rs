pub mod error;
pub mod session;

pub use error::SessionError;
pub use session::{SaveSession, SaveSignal, SessionState, SubPanel};
