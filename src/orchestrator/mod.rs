//! Application-level orchestration utilities.
//!
//! This module owns the stopwatch lifecycle (the controller task and its refresh
//! ticker) and the processing done once a session ends, such as exports. UI/CLI
//! layers call into this module to keep responsibilities separated.

mod controller;
mod post_process;

pub(crate) use controller::{run_controller, UiCommand};
pub(crate) use post_process::process_session_end;
