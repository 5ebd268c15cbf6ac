//! Worker tasks that back the runtime orchestration.
//!
//! The session worker is the only writer into the scoring store; handles talk
//! to it over a bounded command channel.

mod session;

pub use session::{Command, SessionWorker};
