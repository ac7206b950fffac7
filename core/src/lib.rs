//! Outline document engine: an ordered list of indented lines with an active
//! pointer, a stash of quick captures and a focus timer that records how long
//! each line was worked on.

pub mod models;
pub mod notify;
pub mod session;
pub mod store;
pub mod timer;

pub use models::Line;
pub use notify::Change;
pub use session::Session;
pub use store::OutlineStore;
pub use timer::{Accrual, Clock, FocusTimer, ManualClock, SystemClock, TimerState};
