//! Logical-to-physical bindings.
//!
//! A [`BindingSpec`] is the declared wish ("Jump is Space"); a [`Binding`] is
//! the live object resolved from it, which can be re-pointed at another
//! physical control without losing its identity.

use crate::poll::{AxisSampling, InputPoller, PhysicalControl};

/// Semantics of a logical action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindKind {
    /// Binary pressed/released
    Digital,
    /// Continuous scalar
    Analog,
}

/// Physical side of a binding. The variant fixes the [`BindKind`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BindSource {
    /// Digital control, `None` when the action is declared but unbound
    Digital(Option<PhysicalControl>),
    /// Named host axis, empty when unbound
    Analog(String),
}

impl BindSource {
    pub fn kind(&self) -> BindKind {
        match self {
            BindSource::Digital(_) => BindKind::Digital,
            BindSource::Analog(_) => BindKind::Analog,
        }
    }
}

/// Declarative request for one logical-to-physical mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingSpec {
    pub handle: String,
    pub source: BindSource,
}

impl BindingSpec {
    pub fn digital(handle: impl Into<String>, control: impl Into<PhysicalControl>) -> Self {
        Self {
            handle: handle.into(),
            source: BindSource::Digital(Some(control.into())),
        }
    }

    /// Declare a digital action with no control assigned yet.
    pub fn unbound(handle: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            source: BindSource::Digital(None),
        }
    }

    pub fn analog(handle: impl Into<String>, axis: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            source: BindSource::Analog(axis.into()),
        }
    }

    pub fn kind(&self) -> BindKind {
        self.source.kind()
    }
}

/// Resolved, pollable binding.
///
/// All queries are total: a wrong kind, a missing physical target, a disabled
/// binding or a failing host axis all answer with `false` / `0.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    handle: String,
    target: BindSource,
    enabled: bool,
}

impl Binding {
    pub fn new(handle: impl Into<String>, target: BindSource) -> Self {
        Self {
            handle: handle.into(),
            target,
            enabled: true,
        }
    }

    pub fn from_spec(spec: &BindingSpec) -> Self {
        Self::new(spec.handle.clone(), spec.source.clone())
    }

    pub fn handle(&self) -> &str {
        &self.handle
    }

    pub fn kind(&self) -> BindKind {
        self.target.kind()
    }

    pub fn target(&self) -> &BindSource {
        &self.target
    }

    /// Assigned digital control, `None` for analog or unbound bindings.
    pub fn physical_control(&self) -> Option<PhysicalControl> {
        match self.target {
            BindSource::Digital(control) => control,
            BindSource::Analog(_) => None,
        }
    }

    /// Assigned axis name, `None` for digital bindings or an empty axis.
    pub fn axis_name(&self) -> Option<&str> {
        match &self.target {
            BindSource::Analog(axis) if !axis.is_empty() => Some(axis),
            _ => None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Point a digital binding at another control. Ignored on analog bindings.
    pub fn set_physical_control(&mut self, control: impl Into<PhysicalControl>) {
        if let BindSource::Digital(current) = &mut self.target {
            *current = Some(control.into());
        }
    }

    /// Point an analog binding at another axis. Ignored on digital bindings.
    pub fn set_axis(&mut self, axis: impl Into<String>) {
        if let BindSource::Analog(current) = &mut self.target {
            *current = axis.into();
        }
    }

    /// Detach the physical target while keeping the binding alive.
    pub fn unbind(&mut self) {
        match &mut self.target {
            BindSource::Digital(control) => *control = None,
            BindSource::Analog(axis) => axis.clear(),
        }
    }

    fn active_control(&self) -> Option<PhysicalControl> {
        if !self.enabled {
            return None;
        }
        self.physical_control()
    }

    /// Held this frame.
    pub fn is_pressed(&self, poller: &dyn InputPoller) -> bool {
        self.active_control()
            .map(|control| poller.poll_digital(control).is_held())
            .unwrap_or(false)
    }

    /// Went down this frame.
    pub fn is_pressed_down(&self, poller: &dyn InputPoller) -> bool {
        self.active_control()
            .map(|control| poller.poll_digital(control).just_pressed)
            .unwrap_or(false)
    }

    /// Went up this frame.
    pub fn is_released(&self, poller: &dyn InputPoller) -> bool {
        self.active_control()
            .map(|control| poller.poll_digital(control).just_released)
            .unwrap_or(false)
    }

    pub fn axis_value(&self, poller: &dyn InputPoller) -> f32 {
        self.sample_axis(poller, AxisSampling::Smoothed)
    }

    pub fn axis_raw_value(&self, poller: &dyn InputPoller) -> f32 {
        self.sample_axis(poller, AxisSampling::Raw)
    }

    fn sample_axis(&self, poller: &dyn InputPoller, sampling: AxisSampling) -> f32 {
        if !self.enabled {
            return 0.0;
        }
        let Some(axis) = self.axis_name() else {
            return 0.0;
        };
        match poller.poll_analog(axis, sampling) {
            Ok(value) => value,
            Err(err) => {
                log::trace!("axis read for '{}' failed: {}", self.handle, err);
                0.0
            }
        }
    }
}
