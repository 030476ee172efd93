//! Named binding profiles.
//!
//! A profile keeps two sets in step: the declared `specs`, which callers may
//! edit at any time, and the resolved `bindings` keyed by handle. After
//! reconciliation every spec handle has exactly one binding and no binding
//! outlives its spec.

use crate::binding::{BindKind, Binding, BindingSpec};
use crate::poll::InputPoller;
use log::{debug, warn};
use std::collections::{HashMap, HashSet};

/// Handles touched by one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Bindings dropped because their spec is gone
    pub removed: Vec<String>,
    /// Bindings created for specs that had none
    pub added: Vec<String>,
}

impl ReconcileReport {
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty()
    }
}

/// One switchable set of bindings.
#[derive(Debug, Clone)]
pub struct Profile {
    name: String,
    specs: Vec<BindingSpec>,
    bindings: HashMap<String, Binding>,
    enabled: bool,
}

impl Profile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            specs: Vec::new(),
            bindings: HashMap::new(),
            enabled: true,
        }
    }

    /// Build a profile from declared specs. Bindings are not resolved until
    /// [`Profile::initialize`] runs.
    pub fn with_specs(name: impl Into<String>, specs: impl IntoIterator<Item = BindingSpec>) -> Self {
        let mut profile = Self::new(name);
        profile.specs.extend(specs);
        profile
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn specs(&self) -> &[BindingSpec] {
        &self.specs
    }

    /// Direct access to the declared specs. Additions and removals are picked
    /// up by the next [`Profile::reconcile`].
    pub fn specs_mut(&mut self) -> &mut Vec<BindingSpec> {
        &mut self.specs
    }

    pub fn push_spec(&mut self, spec: BindingSpec) {
        self.specs.push(spec);
    }

    /// Remove the first spec with this handle. Its binding goes away on the
    /// next reconciliation. If a later duplicate of the handle remains, the
    /// binding is re-resolved from it right away.
    pub fn remove_spec(&mut self, handle: &str) -> Option<BindingSpec> {
        let index = self.specs.iter().position(|spec| spec.handle == handle)?;
        let removed = self.specs.remove(index);

        if let Some(next) = self.specs.iter().find(|spec| spec.handle == handle) {
            if let Some(binding) = self.bindings.get_mut(handle) {
                debug!(
                    "Binding '{}' in profile '{}' now follows its next declaration",
                    handle, self.name
                );
                *binding = Binding::from_spec(next);
            }
        }
        Some(removed)
    }

    /// Resolve a fresh binding for every spec, discarding any existing ones.
    pub fn initialize(&mut self) {
        self.bindings.clear();
        for spec in &self.specs {
            if self.bindings.contains_key(&spec.handle) {
                warn!(
                    "Profile '{}' declares handle '{}' more than once; keeping the first",
                    self.name, spec.handle
                );
                continue;
            }
            self.bindings
                .insert(spec.handle.clone(), Binding::from_spec(spec));
        }
        debug!(
            "Initialized profile '{}' with {} bindings",
            self.name,
            self.bindings.len()
        );
    }

    /// Per-frame sync. Only diffs when the number of distinct spec handles
    /// and the binding count disagree, and does nothing while the profile is
    /// disabled.
    pub fn reconcile(&mut self) -> ReconcileReport {
        if !self.enabled || self.bindings.len() == self.specs.len() {
            return ReconcileReport::default();
        }
        // Counts only differ here when specs were edited or handles repeat.
        let distinct = self.distinct_handle_count();
        if distinct == self.bindings.len() {
            return ReconcileReport::default();
        }
        debug!(
            "Profile '{}' has {} spec handles but {} bindings; syncing",
            self.name,
            distinct,
            self.bindings.len()
        );
        self.sync_bindings()
    }

    fn distinct_handle_count(&self) -> usize {
        self.specs
            .iter()
            .map(|spec| spec.handle.as_str())
            .collect::<HashSet<_>>()
            .len()
    }

    /// Full by-handle diff regardless of counts. Needed after replacing a spec
    /// in place with one of a different handle.
    pub fn reconcile_full(&mut self) -> ReconcileReport {
        if !self.enabled {
            return ReconcileReport::default();
        }
        self.sync_bindings()
    }

    fn sync_bindings(&mut self) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        let wanted: HashSet<&str> = self.specs.iter().map(|spec| spec.handle.as_str()).collect();

        self.bindings.retain(|handle, _| {
            let keep = wanted.contains(handle.as_str());
            if !keep {
                report.removed.push(handle.clone());
            }
            keep
        });
        report.removed.sort();

        for spec in &self.specs {
            if !self.bindings.contains_key(&spec.handle) {
                self.bindings
                    .insert(spec.handle.clone(), Binding::from_spec(spec));
                report.added.push(spec.handle.clone());
            }
        }

        for handle in &report.removed {
            warn!(
                "Binding '{}' has no spec in profile '{}'; removed",
                handle, self.name
            );
        }
        for handle in &report.added {
            warn!(
                "Created binding '{}' for new spec in profile '{}'",
                handle, self.name
            );
        }
        report
    }

    /// True when every spec handle resolves to a binding and nothing else does.
    pub fn is_synced(&self) -> bool {
        let wanted: HashSet<&str> = self.specs.iter().map(|spec| spec.handle.as_str()).collect();
        wanted.len() == self.bindings.len()
            && wanted.iter().all(|handle| self.bindings.contains_key(*handle))
    }

    pub fn has_binding(&self, handle: &str) -> bool {
        self.bindings.contains_key(handle)
    }

    pub fn binding(&self, handle: &str) -> Option<&Binding> {
        self.bindings.get(handle)
    }

    /// Mutable access for rebinding at runtime.
    pub fn binding_mut(&mut self, handle: &str) -> Option<&mut Binding> {
        self.bindings.get_mut(handle)
    }

    /// Bindings of the declared specs, in declaration order. Bindings whose
    /// spec was removed are skipped until reconciliation drops them.
    pub fn bindings(&self) -> impl Iterator<Item = &Binding> {
        let mut seen = HashSet::new();
        self.specs
            .iter()
            .filter(move |spec| seen.insert(spec.handle.as_str()))
            .filter_map(|spec| self.bindings.get(&spec.handle))
    }

    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    fn lookup(&self, handle: &str, query: &str) -> Option<&Binding> {
        if !self.enabled {
            warn!(
                "{} for '{}' ignored: profile '{}' is disabled",
                query, handle, self.name
            );
            return None;
        }
        let binding = self.bindings.get(handle);
        if binding.is_none() {
            warn!(
                "{} for '{}' ignored: no such binding in profile '{}'",
                query, handle, self.name
            );
        }
        binding
    }

    /// Whether `handle` should be polled as an axis.
    pub fn is_axis(&self, handle: &str) -> bool {
        self.lookup(handle, "is_axis")
            .map(|binding| binding.kind() != BindKind::Digital)
            .unwrap_or(false)
    }

    pub fn get_button(&self, poller: &dyn InputPoller, handle: &str) -> bool {
        self.lookup(handle, "get_button")
            .map(|binding| binding.is_pressed(poller))
            .unwrap_or(false)
    }

    pub fn get_button_down(&self, poller: &dyn InputPoller, handle: &str) -> bool {
        self.lookup(handle, "get_button_down")
            .map(|binding| binding.is_pressed_down(poller))
            .unwrap_or(false)
    }

    pub fn get_button_up(&self, poller: &dyn InputPoller, handle: &str) -> bool {
        self.lookup(handle, "get_button_up")
            .map(|binding| binding.is_released(poller))
            .unwrap_or(false)
    }

    pub fn get_axis(&self, poller: &dyn InputPoller, handle: &str) -> f32 {
        self.lookup(handle, "get_axis")
            .map(|binding| binding.axis_value(poller))
            .unwrap_or(0.0)
    }

    pub fn get_axis_raw(&self, poller: &dyn InputPoller, handle: &str) -> f32 {
        self.lookup(handle, "get_axis_raw")
            .map(|binding| binding.axis_raw_value(poller))
            .unwrap_or(0.0)
    }
}
