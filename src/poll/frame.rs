//! Host-agnostic frame snapshot with edge detection.
//!
//! The host records press/release transitions as they arrive and calls
//! [`FrameInput::begin_frame`] once per frame before recording; queries made
//! after recording see the edges of exactly that frame.

use crate::error::{BindError, Result};
use crate::poll::{AxisSampling, DigitalState, InputPoller, PhysicalControl};
use std::collections::{HashMap, HashSet};

/// Sampled value of one named axis.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct AxisValue {
    smoothed: f32,
    raw: f32,
}

/// Per-frame input snapshot implementing [`InputPoller`].
#[derive(Debug, Default)]
pub struct FrameInput {
    held: HashSet<PhysicalControl>,
    pressed_this_frame: HashSet<PhysicalControl>,
    released_this_frame: HashSet<PhysicalControl>,
    axes: HashMap<String, AxisValue>,
    frame: u64,
}

impl FrameInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new frame: edges from the previous frame are dropped, levels persist.
    pub fn begin_frame(&mut self) {
        self.pressed_this_frame.clear();
        self.released_this_frame.clear();
        self.frame = self.frame.wrapping_add(1);
    }

    /// Number of frames begun so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Record a press. Repeats while already held produce no new edge.
    pub fn press(&mut self, control: impl Into<PhysicalControl>) {
        let control = control.into();
        if self.held.insert(control) {
            self.pressed_this_frame.insert(control);
        }
    }

    /// Record a release. Releasing a control that is not held is ignored.
    pub fn release(&mut self, control: impl Into<PhysicalControl>) {
        let control = control.into();
        if self.held.remove(&control) {
            self.released_this_frame.insert(control);
        }
    }

    /// Release every held control (focus loss, terminal resize...).
    pub fn release_all(&mut self) {
        for control in self.held.drain() {
            self.released_this_frame.insert(control);
        }
    }

    pub fn is_held(&self, control: impl Into<PhysicalControl>) -> bool {
        self.held.contains(&control.into())
    }

    pub fn held_controls(&self) -> impl Iterator<Item = &PhysicalControl> {
        self.held.iter()
    }

    /// Register an axis at rest so polling it succeeds with 0.0.
    pub fn register_axis(&mut self, name: impl Into<String>) {
        self.axes.entry(name.into()).or_default();
    }

    pub fn unregister_axis(&mut self, name: &str) -> bool {
        self.axes.remove(name).is_some()
    }

    /// Set both samplings of an axis, registering it if needed.
    pub fn set_axis(&mut self, name: impl Into<String>, smoothed: f32, raw: f32) {
        self.axes
            .insert(name.into(), AxisValue { smoothed, raw });
    }

    /// Set an axis whose smoothed and raw samples are identical (sticks, triggers).
    pub fn set_axis_value(&mut self, name: impl Into<String>, value: f32) {
        self.set_axis(name, value, value);
    }

    pub fn has_axis(&self, name: &str) -> bool {
        self.axes.contains_key(name)
    }
}

impl InputPoller for FrameInput {
    fn poll_digital(&self, control: PhysicalControl) -> DigitalState {
        DigitalState {
            pressed: self.held.contains(&control),
            just_pressed: self.pressed_this_frame.contains(&control),
            just_released: self.released_this_frame.contains(&control),
        }
    }

    fn poll_analog(&self, axis: &str, sampling: AxisSampling) -> Result<f32> {
        let value = self
            .axes
            .get(axis)
            .ok_or_else(|| BindError::axis_not_registered(axis))?;
        Ok(match sampling {
            AxisSampling::Smoothed => value.smoothed,
            AxisSampling::Raw => value.raw,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::KeyCode;

    const SPACE: PhysicalControl = PhysicalControl::Key(KeyCode::Char(' '));

    #[test]
    fn press_then_hold_across_frames() {
        let mut input = FrameInput::new();
        input.begin_frame();
        input.press(SPACE);
        assert_eq!(input.poll_digital(SPACE), DigitalState::JUST_PRESSED);

        input.begin_frame();
        input.press(SPACE);
        assert_eq!(input.poll_digital(SPACE), DigitalState::HELD);

        input.begin_frame();
        input.release(SPACE);
        assert_eq!(input.poll_digital(SPACE), DigitalState::JUST_RELEASED);

        input.begin_frame();
        assert_eq!(input.poll_digital(SPACE), DigitalState::IDLE);
    }

    #[test]
    fn tap_inside_one_frame_reports_both_edges() {
        let mut input = FrameInput::new();
        input.begin_frame();
        input.press(SPACE);
        input.release(SPACE);

        let state = input.poll_digital(SPACE);
        assert!(state.just_pressed);
        assert!(state.just_released);
        assert!(!state.pressed);
        assert!(state.is_held());
    }

    #[test]
    fn release_without_press_is_ignored() {
        let mut input = FrameInput::new();
        input.begin_frame();
        input.release(KeyCode::Enter);
        assert_eq!(
            input.poll_digital(PhysicalControl::Key(KeyCode::Enter)),
            DigitalState::IDLE
        );
    }

    #[test]
    fn release_all_emits_release_edges() {
        let mut input = FrameInput::new();
        input.begin_frame();
        input.press(KeyCode::Up);
        input.press(KeyCode::Down);
        input.begin_frame();
        input.release_all();

        assert_eq!(
            input.poll_digital(PhysicalControl::Key(KeyCode::Up)),
            DigitalState::JUST_RELEASED
        );
        assert_eq!(input.held_controls().count(), 0);
        assert_eq!(input.frame(), 2);
    }

    #[test]
    fn axes_must_be_registered() {
        let mut input = FrameInput::new();
        assert!(matches!(
            input.poll_analog("Horizontal", AxisSampling::Raw),
            Err(BindError::AxisNotRegistered { .. })
        ));

        input.register_axis("Horizontal");
        assert_eq!(
            input.poll_analog("Horizontal", AxisSampling::Raw).unwrap(),
            0.0
        );

        input.set_axis("Horizontal", 0.25, 1.0);
        assert_eq!(
            input
                .poll_analog("Horizontal", AxisSampling::Smoothed)
                .unwrap(),
            0.25
        );
        assert_eq!(
            input.poll_analog("Horizontal", AxisSampling::Raw).unwrap(),
            1.0
        );

        assert!(input.unregister_axis("Horizontal"));
        assert!(!input.has_axis("Horizontal"));
    }
}
