//! # rebind - Rebindable Input Actions
//!
//! Application code asks about logical actions ("Jump", "MoveX") instead of
//! physical keys. Each action resolves through the active binding profile to a
//! digital control or a named analog axis, and bindings can be changed or
//! profiles switched while the program runs.
//!
//! ## Features
//!
//! - **Binding Profiles**: Named sets of action-to-control mappings, switchable at runtime
//! - **Live Reconciliation**: Spec edits are folded into resolved bindings each frame
//! - **Polling Capability**: Hardware access goes through the [`InputPoller`] trait
//! - **Terminal Host**: crossterm-backed poller with virtual axes and a demo loop
//!
//! ## Architecture
//!
//! - [`error`] - Centralized error types and handling
//! - [`poll`] - Physical controls and the polling capability
//! - [`binding`] - Binding declarations and resolved bindings
//! - [`profile`] - Profiles and reconciliation
//! - [`manager`] - Profile ownership and active-profile routing
//! - [`config`] - Host configuration
//! - [`host`] - Terminal implementation of the polling capability
//! - [`app`] - Demo frame loop and view

// Core modules
pub mod error;
pub mod poll;

// Binding model
pub mod binding;
pub mod manager;
pub mod profile;

// Terminal front end
pub mod app;
pub mod config;
pub mod host;

// Re-export commonly used types for convenience
pub use error::{BindError, Result};

// Public API surface for external usage
pub use app::Application;
pub use binding::{BindKind, BindSource, Binding, BindingSpec};
pub use manager::Manager;
pub use poll::{AxisSampling, DigitalState, FrameInput, InputPoller, PhysicalControl};
pub use profile::{Profile, ReconcileReport};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
