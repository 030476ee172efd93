//! Profile ownership and active-profile selection.
//!
//! The manager is the polling surface handed to application code. Every
//! query is forwarded to the active profile; with no valid active profile
//! (empty list, negative or out-of-range index) queries quietly answer with
//! inert values.

use crate::poll::InputPoller;
use crate::profile::{Profile, ReconcileReport};
use log::{info, warn};

/// Owns the profiles and routes queries to the active one.
#[derive(Debug, Clone, Default)]
pub struct Manager {
    profiles: Vec<Profile>,
    active_profile_index: isize,
    // Set once an invalid index has been reported so tick() does not warn every frame.
    invalid_index_reported: bool,
}

impl Manager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Manager over `profiles` with the first one active.
    pub fn with_profiles(profiles: impl IntoIterator<Item = Profile>) -> Self {
        Self {
            profiles: profiles.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Resolve bindings for every profile. Run once before the first frame.
    pub fn initialize_all(&mut self) {
        for profile in &mut self.profiles {
            profile.initialize();
        }
    }

    /// Per-frame upkeep: reconcile the active profile only.
    pub fn tick(&mut self) -> ReconcileReport {
        match self.active_index() {
            Some(index) => {
                self.invalid_index_reported = false;
                self.profiles[index].reconcile()
            }
            None => {
                if !self.invalid_index_reported {
                    warn!(
                        "Active profile index {} is invalid for {} profiles; input queries return defaults",
                        self.active_profile_index,
                        self.profiles.len()
                    );
                    self.invalid_index_reported = true;
                }
                ReconcileReport::default()
            }
        }
    }

    /// Position of the active profile, or `None` when the index is out of range.
    pub fn active_index(&self) -> Option<usize> {
        usize::try_from(self.active_profile_index)
            .ok()
            .filter(|&index| index < self.profiles.len())
    }

    pub fn is_active_index_valid(&self) -> bool {
        self.active_index().is_some()
    }

    /// Raw selected index, which may be out of range.
    pub fn active_profile_index(&self) -> isize {
        self.active_profile_index
    }

    /// Store an index without validating or reconciling it.
    pub fn set_active_index(&mut self, index: isize) {
        self.active_profile_index = index;
    }

    /// Switch to the profile at `index` and reconcile it before returning, so
    /// spec edits made while it was inactive are visible to the next query.
    /// Out-of-range indices leave the selection unchanged.
    pub fn set_active_profile(&mut self, index: usize) -> bool {
        let Some(profile) = self.profiles.get_mut(index) else {
            warn!(
                "Cannot switch to profile {}: only {} profiles",
                index,
                self.profiles.len()
            );
            return false;
        };
        profile.reconcile();
        info!("Active input profile is now '{}'", profile.name());
        self.active_profile_index = index as isize;
        self.invalid_index_reported = false;
        true
    }

    /// Switch to the first profile named `name`.
    pub fn select_profile(&mut self, name: &str) -> bool {
        match self.profiles.iter().position(|profile| profile.name() == name) {
            Some(index) => self.set_active_profile(index),
            None => {
                warn!("No input profile named '{}'", name);
                false
            }
        }
    }

    /// Append a profile and return its index. Its bindings are resolved by
    /// reconciliation once it becomes active.
    pub fn add_profile(&mut self, profile: Profile) -> usize {
        self.profiles.push(profile);
        self.profiles.len() - 1
    }

    pub fn profiles(&self) -> &[Profile] {
        &self.profiles
    }

    pub fn profiles_mut(&mut self) -> &mut Vec<Profile> {
        &mut self.profiles
    }

    pub fn profile(&self, name: &str) -> Option<&Profile> {
        self.profiles.iter().find(|profile| profile.name() == name)
    }

    pub fn profile_mut(&mut self, name: &str) -> Option<&mut Profile> {
        self.profiles
            .iter_mut()
            .find(|profile| profile.name() == name)
    }

    pub fn get_active_profile(&self) -> Option<&Profile> {
        self.active_index().map(|index| &self.profiles[index])
    }

    pub fn get_active_profile_mut(&mut self) -> Option<&mut Profile> {
        let index = self.active_index()?;
        Some(&mut self.profiles[index])
    }

    pub fn is_axis(&self, handle: &str) -> bool {
        self.get_active_profile()
            .map(|profile| profile.is_axis(handle))
            .unwrap_or(false)
    }

    pub fn get_button(&self, poller: &dyn InputPoller, handle: &str) -> bool {
        self.get_active_profile()
            .map(|profile| profile.get_button(poller, handle))
            .unwrap_or(false)
    }

    pub fn get_button_down(&self, poller: &dyn InputPoller, handle: &str) -> bool {
        self.get_active_profile()
            .map(|profile| profile.get_button_down(poller, handle))
            .unwrap_or(false)
    }

    pub fn get_button_up(&self, poller: &dyn InputPoller, handle: &str) -> bool {
        self.get_active_profile()
            .map(|profile| profile.get_button_up(poller, handle))
            .unwrap_or(false)
    }

    pub fn get_axis(&self, poller: &dyn InputPoller, handle: &str) -> f32 {
        self.get_active_profile()
            .map(|profile| profile.get_axis(poller, handle))
            .unwrap_or(0.0)
    }

    pub fn get_axis_raw(&self, poller: &dyn InputPoller, handle: &str) -> f32 {
        self.get_active_profile()
            .map(|profile| profile.get_axis_raw(poller, handle))
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::BindingSpec;
    use crate::poll::{FrameInput, PhysicalControl};
    use ratatui::crossterm::event::KeyCode;

    fn two_profiles() -> Manager {
        let mut manager = Manager::with_profiles([
            Profile::with_specs(
                "Arrows",
                [BindingSpec::digital("Jump", KeyCode::Up)],
            ),
            Profile::with_specs(
                "Vim",
                [BindingSpec::digital("Jump", KeyCode::Char('k'))],
            ),
        ]);
        manager.initialize_all();
        manager
    }

    fn pressing(code: KeyCode) -> FrameInput {
        let mut input = FrameInput::new();
        input.begin_frame();
        input.press(code);
        input.set_axis_value("Horizontal", 1.0);
        input
    }

    fn assert_inert(manager: &Manager, input: &FrameInput) {
        assert!(!manager.get_button(input, "Jump"));
        assert!(!manager.get_button_down(input, "Jump"));
        assert!(!manager.get_button_up(input, "Jump"));
        assert_eq!(manager.get_axis(input, "Jump"), 0.0);
        assert_eq!(manager.get_axis_raw(input, "Jump"), 0.0);
        assert!(!manager.is_axis("Jump"));
        assert!(manager.get_active_profile().is_none());
    }

    #[test]
    fn forwards_to_active_profile() {
        let mut manager = two_profiles();
        let input = pressing(KeyCode::Char('k'));
        assert!(!manager.get_button(&input, "Jump"));

        assert!(manager.set_active_profile(1));
        assert_eq!(manager.get_active_profile().unwrap().name(), "Vim");
        assert!(manager.get_button(&input, "Jump"));
        assert!(manager.get_button_down(&input, "Jump"));
    }

    #[test]
    fn empty_manager_degrades() {
        let mut manager = Manager::new();
        manager.initialize_all();
        assert!(manager.tick().is_empty());
        assert_inert(&manager, &pressing(KeyCode::Up));
    }

    #[test]
    fn out_of_range_indices_degrade() {
        let mut manager = two_profiles();
        let input = pressing(KeyCode::Up);

        manager.set_active_index(-1);
        assert!(manager.tick().is_empty());
        assert_inert(&manager, &input);

        manager.set_active_index(manager.profiles().len() as isize);
        assert!(manager.tick().is_empty());
        assert_inert(&manager, &input);

        manager.set_active_index(0);
        assert!(manager.get_button(&input, "Jump"));
    }

    #[test]
    fn set_active_profile_rejects_bad_index() {
        let mut manager = two_profiles();
        assert!(!manager.set_active_profile(5));
        assert_eq!(manager.active_profile_index(), 0);
    }

    #[test]
    fn switching_reconciles_the_new_profile() {
        let mut manager = two_profiles();
        manager
            .profile_mut("Vim")
            .unwrap()
            .push_spec(BindingSpec::digital("Fire", KeyCode::Char('f')));

        // Inactive profiles are left alone by tick.
        manager.tick();
        assert!(!manager.profile("Vim").unwrap().has_binding("Fire"));

        assert!(manager.select_profile("Vim"));
        let input = pressing(KeyCode::Char('f'));
        assert!(manager.get_button(&input, "Fire"));
        assert!(!manager.select_profile("Gamepad"));
    }

    #[test]
    fn tick_reconciles_active_profile() {
        let mut manager = two_profiles();
        manager
            .get_active_profile_mut()
            .unwrap()
            .push_spec(BindingSpec::analog("Move", "Horizontal"));

        let report = manager.tick();
        assert_eq!(report.added, vec!["Move"]);

        let input = pressing(KeyCode::Up);
        assert!(manager.is_axis("Move"));
        assert_eq!(manager.get_axis(&input, "Move"), 1.0);
    }

    #[test]
    fn added_profile_resolves_when_selected() {
        let mut manager = two_profiles();
        let index = manager.add_profile(Profile::with_specs(
            "Pad",
            [BindingSpec::digital("Jump", PhysicalControl::Button(0))],
        ));
        assert_eq!(index, 2);
        assert!(manager.set_active_profile(index));

        let mut input = FrameInput::new();
        input.begin_frame();
        input.press(PhysicalControl::Button(0));
        assert!(manager.get_button(&input, "Jump"));
    }
}
