//! Terminal host for the polling capability.
//!
//! `raw` turns crossterm events into per-frame batches; `terminal` folds
//! those batches into an [`InputPoller`](crate::poll::InputPoller).

pub mod raw;
pub mod terminal;

// Public re-exports for convenience. Modules outside this crate should prefer importing
// from `crate::host` rather than reaching into submodules.
pub use raw::{RawInputCollector, RawInputEvent};
pub use terminal::{TerminalPoller, VirtualAxis, MOUSE_WHEEL_AXIS};
