//! Session lifecycle: the synchronous state owner and the async controller
//! that runs it.

pub mod controller;
pub mod core;
pub mod state;

pub use controller::SessionController;
pub use self::core::{SessionCore, TickOutcome, CALIBRATING_MESSAGE, POWER_ON_MESSAGE};
pub use state::{SessionId, SessionSnapshot, SessionState};
