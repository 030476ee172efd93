//! Terminal-backed implementation of the polling capability.
//!
//! Terminals differ in what they report: with keyboard enhancement enabled
//! every press, repeat and release arrives; without it only presses do. In
//! the latter case a fresh press counts as held for `repeat_delay`, long
//! enough for the keyboard's autorepeat to start, and after the first repeat
//! until `hold_timeout` passes without another one. Analog input is synthesized from key pairs as virtual
//! axes, plus a `MouseWheel` axis carrying this frame's wheel ticks.

use crate::config::{AxisConfig, Config};
use crate::error::Result;
use crate::host::raw::RawInputEvent;
use crate::poll::{AxisSampling, DigitalState, FrameInput, InputPoller, PhysicalControl};
use ratatui::crossterm::event::KeyEventKind;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Axis fed by the mouse wheel, in ticks per frame.
pub const MOUSE_WHEEL_AXIS: &str = "MouseWheel";

/// Move `current` toward `target` by at most `max_delta`.
fn move_towards(current: f32, target: f32, max_delta: f32) -> f32 {
    let diff = target - current;
    if diff.abs() <= max_delta {
        target
    } else {
        current + diff.signum() * max_delta
    }
}

/// Analog axis driven by a positive and a negative control.
#[derive(Debug, Clone, PartialEq)]
pub struct VirtualAxis {
    name: String,
    positive: PhysicalControl,
    negative: PhysicalControl,
    sensitivity: f32,
    gravity: f32,
    snap: bool,
    value: f32,
}

impl VirtualAxis {
    pub fn from_config(config: &AxisConfig) -> Result<Self> {
        let (positive, negative) = config.controls()?;
        Ok(Self {
            name: config.name.clone(),
            positive,
            negative,
            sensitivity: config.sensitivity,
            gravity: config.gravity,
            snap: config.snap,
            value: 0.0,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    /// -1, 0 or 1 from the held controls. Both held cancel out.
    pub fn raw(&self, input: &FrameInput) -> f32 {
        let positive = input.poll_digital(self.positive).is_held();
        let negative = input.poll_digital(self.negative).is_held();
        match (positive, negative) {
            (true, false) => 1.0,
            (false, true) => -1.0,
            _ => 0.0,
        }
    }

    /// Advance the smoothed value by `dt` toward `raw`.
    pub fn step(&mut self, raw: f32, dt: Duration) -> f32 {
        let dt = dt.as_secs_f32();
        if raw == 0.0 {
            self.value = move_towards(self.value, 0.0, self.gravity * dt);
        } else {
            if self.snap && self.value != 0.0 && self.value.signum() != raw.signum() {
                self.value = 0.0;
            }
            self.value = move_towards(self.value, raw, self.sensitivity * dt);
        }
        self.value
    }
}

/// Synthetic hold for a key on a terminal without release events.
#[derive(Debug, Clone, Copy)]
struct KeyHold {
    last_seen: Instant,
    repeating: bool,
}

/// [`InputPoller`] fed from crossterm events, one frame at a time.
#[derive(Debug)]
pub struct TerminalPoller {
    input: FrameInput,
    axes: Vec<VirtualAxis>,
    hold_timeout: Duration,
    repeat_delay: Duration,
    release_events: bool,
    holds: HashMap<PhysicalControl, KeyHold>,
    wheel: i32,
}

impl TerminalPoller {
    pub fn new(config: &Config) -> Result<Self> {
        let axes = config
            .axes
            .iter()
            .map(VirtualAxis::from_config)
            .collect::<Result<Vec<_>>>()?;

        let mut input = FrameInput::new();
        for axis in &axes {
            input.register_axis(axis.name());
        }
        input.register_axis(MOUSE_WHEEL_AXIS);

        Ok(Self {
            input,
            axes,
            hold_timeout: config.hold_timeout(),
            repeat_delay: config.repeat_delay(),
            release_events: false,
            holds: HashMap::new(),
            wheel: 0,
        })
    }

    /// Declare whether the terminal reports key releases. When it does, keys
    /// are held until their release arrives and the hold timeout is unused.
    pub fn set_release_events(&mut self, enabled: bool) {
        self.release_events = enabled;
        if enabled {
            self.holds.clear();
        }
    }

    pub fn release_events(&self) -> bool {
        self.release_events
    }

    pub fn input(&self) -> &FrameInput {
        &self.input
    }

    pub fn axes(&self) -> &[VirtualAxis] {
        &self.axes
    }

    pub fn begin_frame(&mut self) {
        self.input.begin_frame();
        self.wheel = 0;
    }

    /// Record one raw event observed at `now`.
    pub fn apply(&mut self, event: RawInputEvent, now: Instant) {
        match event {
            RawInputEvent::Key { code, kind } => {
                let control = PhysicalControl::Key(code);
                match kind {
                    KeyEventKind::Press | KeyEventKind::Repeat => {
                        self.input.press(control);
                        if !self.release_events {
                            // A press for a key already held is its autorepeat.
                            let repeating = self.holds.contains_key(&control);
                            self.holds.insert(
                                control,
                                KeyHold {
                                    last_seen: now,
                                    repeating,
                                },
                            );
                        }
                    }
                    KeyEventKind::Release => {
                        self.input.release(control);
                        self.holds.remove(&control);
                    }
                }
            }
            RawInputEvent::MouseDown(button) => self.input.press(button),
            RawInputEvent::MouseUp(button) => self.input.release(button),
            RawInputEvent::Scroll(ticks) => self.wheel = self.wheel.saturating_add(ticks),
            RawInputEvent::FocusLost => {
                self.input.release_all();
                self.holds.clear();
            }
            RawInputEvent::Resize { .. } | RawInputEvent::Interrupt => {}
        }
    }

    /// Expire stale key holds and resample every axis. Call after the frame's
    /// events are applied and before any query.
    pub fn end_frame(&mut self, now: Instant, dt: Duration) {
        let expired: Vec<PhysicalControl> = self
            .holds
            .iter()
            .filter(|(_, hold)| {
                let timeout = if hold.repeating {
                    self.hold_timeout
                } else {
                    self.repeat_delay
                };
                now.saturating_duration_since(hold.last_seen) >= timeout
            })
            .map(|(control, _)| *control)
            .collect();
        for control in expired {
            self.holds.remove(&control);
            self.input.release(control);
        }

        for axis in &mut self.axes {
            let raw = axis.raw(&self.input);
            let smoothed = axis.step(raw, dt);
            self.input.set_axis(axis.name.clone(), smoothed, raw);
        }
        self.input
            .set_axis_value(MOUSE_WHEEL_AXIS, self.wheel as f32);
    }
}

impl InputPoller for TerminalPoller {
    fn poll_digital(&self, control: PhysicalControl) -> DigitalState {
        self.input.poll_digital(control)
    }

    fn poll_analog(&self, axis: &str, sampling: AxisSampling) -> Result<f32> {
        self.input.poll_analog(axis, sampling)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::{KeyCode, MouseButton};

    const FRAME: Duration = Duration::from_millis(100);

    fn press(code: KeyCode) -> RawInputEvent {
        RawInputEvent::Key {
            code,
            kind: KeyEventKind::Press,
        }
    }

    fn release(code: KeyCode) -> RawInputEvent {
        RawInputEvent::Key {
            code,
            kind: KeyEventKind::Release,
        }
    }

    fn poller() -> TerminalPoller {
        TerminalPoller::new(&Config::default()).expect("default config is valid")
    }

    fn frame(poller: &mut TerminalPoller, events: Vec<RawInputEvent>, now: Instant) {
        poller.begin_frame();
        for event in events {
            poller.apply(event, now);
        }
        poller.end_frame(now, FRAME);
    }

    #[test]
    fn key_without_release_expires_after_repeat_delay() {
        let mut poller = poller();
        let start = Instant::now();
        let space = PhysicalControl::Key(KeyCode::Char(' '));

        frame(&mut poller, vec![press(KeyCode::Char(' '))], start);
        assert_eq!(poller.poll_digital(space), DigitalState::JUST_PRESSED);

        frame(&mut poller, vec![], start + Duration::from_millis(50));
        assert_eq!(poller.poll_digital(space), DigitalState::HELD);

        // Still inside the window for the first autorepeat.
        frame(&mut poller, vec![], start + Duration::from_millis(400));
        assert_eq!(poller.poll_digital(space), DigitalState::HELD);

        frame(&mut poller, vec![], start + Duration::from_millis(800));
        assert_eq!(poller.poll_digital(space), DigitalState::JUST_RELEASED);
    }

    #[test]
    fn slow_autorepeat_start_is_one_hold() {
        let mut poller = poller();
        let start = Instant::now();
        let space = PhysicalControl::Key(KeyCode::Char(' '));
        let tick = Duration::from_millis(16);

        let mut press_edges = 0;
        let mut release_edges = 0;
        for i in 0..60u32 {
            let elapsed = tick * i;
            let ms = elapsed.as_millis();
            let repeat = ms >= 496 && (ms - 496) % 32 == 0;
            let events = if i == 0 || repeat {
                vec![press(KeyCode::Char(' '))]
            } else {
                vec![]
            };
            frame(&mut poller, events, start + elapsed);

            let state = poller.poll_digital(space);
            press_edges += state.just_pressed as u32;
            release_edges += state.just_released as u32;
        }
        assert_eq!(press_edges, 1);
        assert_eq!(release_edges, 0);
        assert!(poller.poll_digital(space).is_held());

        // Once repeating, the short timeout applies.
        let last = start + tick * 59;
        frame(&mut poller, vec![], last + Duration::from_millis(200));
        assert_eq!(poller.poll_digital(space), DigitalState::JUST_RELEASED);
    }

    #[test]
    fn repeated_presses_extend_the_hold() {
        let mut poller = poller();
        let start = Instant::now();
        let key = PhysicalControl::Key(KeyCode::Char('j'));

        frame(&mut poller, vec![press(KeyCode::Char('j'))], start);
        frame(
            &mut poller,
            vec![press(KeyCode::Char('j'))],
            start + Duration::from_millis(100),
        );
        frame(&mut poller, vec![], start + Duration::from_millis(180));
        assert_eq!(poller.poll_digital(key), DigitalState::HELD);
    }

    #[test]
    fn release_events_disable_the_timeout() {
        let mut poller = poller();
        poller.set_release_events(true);
        assert!(poller.release_events());
        let start = Instant::now();
        let key = PhysicalControl::Key(KeyCode::Enter);

        frame(&mut poller, vec![press(KeyCode::Enter)], start);
        frame(&mut poller, vec![], start + Duration::from_secs(5));
        assert_eq!(poller.poll_digital(key), DigitalState::HELD);

        frame(
            &mut poller,
            vec![release(KeyCode::Enter)],
            start + Duration::from_secs(6),
        );
        assert_eq!(poller.poll_digital(key), DigitalState::JUST_RELEASED);
    }

    #[test]
    fn virtual_axis_smooths_and_reports_raw() {
        let mut poller = poller();
        poller.set_release_events(true);
        let start = Instant::now();

        // Default sensitivity is 3 units/s; one 100ms frame moves 0.3.
        frame(&mut poller, vec![press(KeyCode::Right)], start);
        let smoothed = poller
            .poll_analog("Horizontal", AxisSampling::Smoothed)
            .unwrap();
        assert!((smoothed - 0.3).abs() < 1e-4);
        assert_eq!(
            poller.poll_analog("Horizontal", AxisSampling::Raw).unwrap(),
            1.0
        );

        for i in 1..10 {
            frame(&mut poller, vec![], start + FRAME * i);
        }
        assert_eq!(
            poller
                .poll_analog("Horizontal", AxisSampling::Smoothed)
                .unwrap(),
            1.0
        );

        frame(&mut poller, vec![release(KeyCode::Right)], start + FRAME * 10);
        assert_eq!(
            poller.poll_analog("Horizontal", AxisSampling::Raw).unwrap(),
            0.0
        );
        let falling = poller
            .poll_analog("Horizontal", AxisSampling::Smoothed)
            .unwrap();
        assert!((falling - 0.7).abs() < 1e-4);
    }

    #[test]
    fn snap_zeroes_on_reversal() {
        let config = AxisConfig::new("Steer", "d", "a");
        let mut axis = VirtualAxis::from_config(&config).unwrap();
        axis.step(1.0, Duration::from_secs(1));
        assert_eq!(axis.value(), 1.0);

        let after = axis.step(-1.0, Duration::from_millis(100));
        assert!((after + 0.3).abs() < 1e-4);
    }

    #[test]
    fn wheel_axis_holds_only_this_frame() {
        let mut poller = poller();
        let start = Instant::now();
        frame(&mut poller, vec![RawInputEvent::Scroll(3)], start);
        assert_eq!(
            poller.poll_analog(MOUSE_WHEEL_AXIS, AxisSampling::Raw).unwrap(),
            3.0
        );
        frame(&mut poller, vec![], start + FRAME);
        assert_eq!(
            poller.poll_analog(MOUSE_WHEEL_AXIS, AxisSampling::Raw).unwrap(),
            0.0
        );
    }

    #[test]
    fn mouse_buttons_and_focus_loss() {
        let mut poller = poller();
        let start = Instant::now();
        let left = PhysicalControl::Mouse(MouseButton::Left);

        frame(&mut poller, vec![RawInputEvent::MouseDown(MouseButton::Left)], start);
        assert!(poller.poll_digital(left).just_pressed);

        frame(&mut poller, vec![], start + Duration::from_secs(1));
        assert_eq!(poller.poll_digital(left), DigitalState::HELD);

        frame(&mut poller, vec![RawInputEvent::FocusLost], start + Duration::from_secs(2));
        assert_eq!(poller.poll_digital(left), DigitalState::JUST_RELEASED);
    }

    #[test]
    fn unknown_axis_is_an_error() {
        let poller = poller();
        assert!(poller.poll_analog("Throttle", AxisSampling::Raw).is_err());
    }
}
