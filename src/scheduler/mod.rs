//! Status polling scheduler module.
//!
//! Runs the fetch, check, notify and sleep cycle against the review API.

mod runner;
mod state;

pub use runner::{FAILURE_PREFIX, StatusPoller};
pub use state::LoopState;
