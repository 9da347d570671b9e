//! Location-keyed profile registry
//!
//! One [`ProfileMap`] per statistic kind. Lookups go through the section's
//! span equality, so the engine may hand back a structurally equal but
//! freshly built descriptor and still receive the profile created first.

use crate::profiles::{
    BranchProfile, CallsiteProbe, Counter, InvocationProfile, Profile, ProfileKind,
};
use crate::source::SourceSection;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// Section -> profile map with get-or-create-once semantics
#[derive(Debug)]
pub struct ProfileMap<P> {
    entries: RefCell<HashMap<SourceSection, Rc<P>>>,
}

impl<P: Profile> ProfileMap<P> {
    pub fn new() -> Self {
        Self {
            entries: RefCell::new(HashMap::new()),
        }
    }

    /// Return the profile for `section`, building it with `factory` on first use.
    ///
    /// The stored key keeps the descriptor seen first; later equal
    /// descriptors never replace it.
    pub fn get_or_create<F>(&self, section: &SourceSection, factory: F) -> Rc<P>
    where
        F: FnOnce(&SourceSection) -> P,
    {
        let mut entries = self.entries.borrow_mut();
        let profile = entries
            .entry(section.clone())
            .or_insert_with(|| Rc::new(factory(section)));
        Rc::clone(profile)
    }

    pub fn get(&self, section: &SourceSection) -> Option<Rc<P>> {
        self.entries.borrow().get(section).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Registered sections (the first-seen descriptor of each span)
    pub fn sections(&self) -> Vec<SourceSection> {
        self.entries.borrow().keys().cloned().collect()
    }

    /// Export of the profile registered for `section`, if any
    pub fn export(&self, section: &SourceSection) -> Option<serde_json::Value> {
        self.entries.borrow().get(section).map(|p| p.to_json())
    }
}

impl<P: Profile> Default for ProfileMap<P> {
    fn default() -> Self {
        Self::new()
    }
}

/// The five statistic maps of one session
#[derive(Debug)]
pub struct ProfileRegistry {
    invocations: ProfileMap<InvocationProfile>,
    callsites: ProfileMap<CallsiteProbe>,
    instantiations: ProfileMap<Counter>,
    field_accesses: ProfileMap<Counter>,
    branches: ProfileMap<BranchProfile>,
}

impl ProfileRegistry {
    pub fn new() -> Self {
        Self {
            invocations: ProfileMap::new(),
            callsites: ProfileMap::new(),
            instantiations: ProfileMap::new(),
            field_accesses: ProfileMap::new(),
            branches: ProfileMap::new(),
        }
    }

    pub fn invocations(&self) -> &ProfileMap<InvocationProfile> {
        &self.invocations
    }

    pub fn callsites(&self) -> &ProfileMap<CallsiteProbe> {
        &self.callsites
    }

    pub fn instantiations(&self) -> &ProfileMap<Counter> {
        &self.instantiations
    }

    pub fn field_accesses(&self) -> &ProfileMap<Counter> {
        &self.field_accesses
    }

    pub fn branches(&self) -> &ProfileMap<BranchProfile> {
        &self.branches
    }

    /// Total number of profiles across all kinds
    pub fn profile_count(&self) -> usize {
        self.invocations.len()
            + self.callsites.len()
            + self.instantiations.len()
            + self.field_accesses.len()
            + self.branches.len()
    }

    /// Union of the sections of all five maps, each span once.
    ///
    /// Maps are visited in [`ProfileKind::ALL`] order and the first
    /// descriptor seen for a span wins.
    pub fn all_sections(&self) -> Vec<SourceSection> {
        let mut seen = HashSet::new();
        let mut sections = Vec::new();
        for kind in ProfileKind::ALL {
            for section in self.sections_of(kind) {
                if seen.insert(section.clone()) {
                    sections.push(section);
                }
            }
        }
        sections
    }

    /// Exports of every profile registered for `section`, keyed by kind
    pub fn data_for(&self, section: &SourceSection) -> serde_json::Map<String, serde_json::Value> {
        let mut data = serde_json::Map::new();
        for kind in ProfileKind::ALL {
            if let Some(value) = self.export_of(kind, section) {
                data.insert(kind.data_key().to_string(), value);
            }
        }
        data
    }

    fn sections_of(&self, kind: ProfileKind) -> Vec<SourceSection> {
        match kind {
            ProfileKind::MethodInvocation => self.invocations.sections(),
            ProfileKind::MethodCallsite => self.callsites.sections(),
            ProfileKind::Instantiation => self.instantiations.sections(),
            ProfileKind::FieldAccess => self.field_accesses.sections(),
            ProfileKind::ControlFlow => self.branches.sections(),
        }
    }

    fn export_of(&self, kind: ProfileKind, section: &SourceSection) -> Option<serde_json::Value> {
        match kind {
            ProfileKind::MethodInvocation => self.invocations.export(section),
            ProfileKind::MethodCallsite => self.callsites.export(section),
            ProfileKind::Instantiation => self.instantiations.export(section),
            ProfileKind::FieldAccess => self.field_accesses.export(section),
            ProfileKind::ControlFlow => self.branches.export(section),
        }
    }
}

impl Default for ProfileRegistry {
    fn default() -> Self {
        Self::new()
    }
}
