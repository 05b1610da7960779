//! Glue between the media service and a status bar process.
//!
//! The bar reads JSON lines from stdout. Click handlers reach the running
//! instance through the control socket (`mediabar ctl`) or its stdin.

mod control;
mod input;
mod output;

pub use control::{ControlError, ControlServer, send_command};
pub use input::{BarCommand, UnknownCommand};
pub use output::WaybarOutput;
