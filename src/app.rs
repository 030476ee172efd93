//! Demo frame loop
//!
//! Wires the terminal host, the profile manager and the view together. Each
//! frame drains input, advances the poller, lets the manager reconcile the
//! active profile and then reacts to a handful of built-in actions.

pub mod view;

pub use view::{ActionRow, FrameSnapshot, TerminalView, Theme};

use crate::binding::BindingSpec;
use crate::config::Config;
use crate::error::Result;
use crate::host::{RawInputCollector, RawInputEvent, TerminalPoller, MOUSE_WHEEL_AXIS};
use crate::manager::Manager;
use crate::poll::PhysicalControl;
use crate::profile::{Profile, ReconcileReport};
use ratatui::crossterm::event::{KeyCode, MouseButton};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::time::MissedTickBehavior;

pub const ACTION_JUMP: &str = "Jump";
pub const ACTION_FIRE: &str = "Fire";
pub const ACTION_MOVE_X: &str = "MoveX";
pub const ACTION_MOVE_Y: &str = "MoveY";
pub const ACTION_SCROLL: &str = "Scroll";
pub const ACTION_CLICK: &str = "Click";
pub const ACTION_NEXT_PROFILE: &str = "NextProfile";
pub const ACTION_REBIND: &str = "Rebind";
pub const ACTION_TOGGLE_FIRE: &str = "ToggleFire";
pub const ACTION_QUIT: &str = "Quit";

const JUMP_PRIMARY: KeyCode = KeyCode::Char(' ');
const JUMP_ALTERNATE: KeyCode = KeyCode::Char('x');

/// The two profiles the demo ships with: arrow keys and vim keys.
pub fn default_profiles() -> Vec<Profile> {
    let shared = |fire: KeyCode, quit: KeyCode, move_x: &str, move_y: &str| {
        vec![
            BindingSpec::digital(ACTION_JUMP, JUMP_PRIMARY),
            BindingSpec::digital(ACTION_FIRE, fire),
            BindingSpec::analog(ACTION_MOVE_X, move_x),
            BindingSpec::analog(ACTION_MOVE_Y, move_y),
            BindingSpec::analog(ACTION_SCROLL, MOUSE_WHEEL_AXIS),
            BindingSpec::digital(ACTION_CLICK, MouseButton::Left),
            BindingSpec::digital(ACTION_NEXT_PROFILE, KeyCode::Tab),
            BindingSpec::digital(ACTION_REBIND, KeyCode::Char('r')),
            BindingSpec::digital(ACTION_TOGGLE_FIRE, KeyCode::Char('t')),
            BindingSpec::digital(ACTION_QUIT, quit),
        ]
    };

    vec![
        Profile::with_specs(
            "Arrows",
            shared(KeyCode::Enter, KeyCode::Esc, "Horizontal", "Vertical"),
        ),
        Profile::with_specs(
            "Vim",
            shared(KeyCode::Char('f'), KeyCode::Char('q'), "VimHorizontal", "VimVertical"),
        ),
    ]
}

/// Demo application state, independent of any terminal session.
pub struct Application {
    manager: Manager,
    poller: TerminalPoller,
    collector: RawInputCollector,
    config: Config,
    running: bool,
    frames: u64,
    status: Option<String>,
    /// Fire specs taken out of a profile by ToggleFire, keyed by profile name
    parked_fire: HashMap<String, BindingSpec>,
}

impl Application {
    pub fn new(config: Config, profiles: Vec<Profile>) -> Result<Self> {
        config.validate()?;
        let poller = TerminalPoller::new(&config)?;

        let mut manager = Manager::with_profiles(profiles);
        manager.initialize_all();

        Ok(Self {
            manager,
            poller,
            collector: RawInputCollector::new(),
            config,
            running: true,
            frames: 0,
            status: None,
            parked_fire: HashMap::new(),
        })
    }

    pub fn manager(&self) -> &Manager {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut Manager {
        &mut self.manager
    }

    pub fn poller(&self) -> &TerminalPoller {
        &self.poller
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Advance one frame with the events observed at `now`.
    pub fn step(&mut self, events: Vec<RawInputEvent>, now: Instant, dt: Duration) -> ReconcileReport {
        self.poller.begin_frame();
        for event in events {
            if event == RawInputEvent::Interrupt {
                log::info!("Interrupted");
                self.running = false;
            }
            self.poller.apply(event, now);
        }
        self.poller.end_frame(now, dt);

        let report = self.manager.tick();
        if !report.is_empty() {
            log::debug!(
                "Reconciled bindings: removed {:?}, added {:?}",
                report.removed,
                report.added
            );
        }

        self.handle_actions();
        self.frames += 1;
        report
    }

    fn pressed(&self, action: &str) -> bool {
        self.manager.get_button_down(&self.poller, action)
    }

    fn handle_actions(&mut self) {
        if self.pressed(ACTION_QUIT) {
            self.running = false;
            return;
        }

        if self.pressed(ACTION_NEXT_PROFILE) {
            let count = self.manager.profiles().len();
            if count > 0 {
                let next = self.manager.active_index().map_or(0, |index| (index + 1) % count);
                if self.manager.set_active_profile(next) {
                    self.status = Some(format!("Switched to {}", self.manager.profiles()[next].name()));
                }
            }
        }

        if self.pressed(ACTION_REBIND) {
            self.toggle_jump_key();
        }

        if self.pressed(ACTION_TOGGLE_FIRE) {
            self.toggle_fire_spec();
        }
    }

    /// Rebind Jump in place; the binding keeps its identity.
    fn toggle_jump_key(&mut self) {
        let Some(binding) = self
            .manager
            .get_active_profile_mut()
            .and_then(|profile| profile.binding_mut(ACTION_JUMP))
        else {
            return;
        };

        let next = if binding.physical_control() == Some(PhysicalControl::Key(JUMP_PRIMARY)) {
            JUMP_ALTERNATE
        } else {
            JUMP_PRIMARY
        };
        binding.set_physical_control(next);
        self.status = Some(format!("Jump rebound to {}", PhysicalControl::Key(next)));
    }

    /// Remove or restore the Fire spec. The binding follows on the next tick.
    fn toggle_fire_spec(&mut self) {
        let Some(profile) = self.manager.get_active_profile_mut() else {
            return;
        };
        let name = profile.name().to_string();

        if let Some(spec) = profile.remove_spec(ACTION_FIRE) {
            self.parked_fire.insert(name, spec);
            self.status = Some("Fire removed".to_string());
        } else if let Some(spec) = self.parked_fire.remove(&name) {
            profile.push_spec(spec);
            self.status = Some("Fire restored".to_string());
        }
    }

    /// State of the current frame for rendering.
    pub fn snapshot(&self) -> FrameSnapshot {
        let mut snapshot = FrameSnapshot::capture(&self.manager, &self.poller, self.frames);
        snapshot.status = self.status.clone();
        snapshot.release_events = self.poller.release_events();
        snapshot
    }

    /// Run the interactive loop until Quit or Ctrl+C.
    pub async fn run(&mut self) -> Result<()> {
        let mut view = TerminalView::new();
        let release_events = view.initialize()?;
        self.poller.set_release_events(release_events);
        log::info!(
            "Frame loop started at {}ms per frame, key releases {}",
            self.config.tick_ms,
            if release_events { "reported" } else { "simulated" }
        );

        let mut interval = tokio::time::interval(self.config.tick());
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut last = Instant::now();

        while self.running {
            interval.tick().await;
            let now = Instant::now();
            let dt = now.saturating_duration_since(last);
            last = now;

            let events = self.collector.drain()?;
            self.step(events, now, dt);
            view.render(&self.snapshot())?;
        }

        view.cleanup()?;
        log::info!("Frame loop stopped after {} frames", self.frames);
        Ok(())
    }
}
