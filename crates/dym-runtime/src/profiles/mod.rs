//! Per-location statistic objects
//!
//! Every profile is bound to one [`SourceSection`] when it is created and
//! mutated in place through shared references (`Cell`), so event nodes can
//! hold an `Rc` to it for the rest of the run.

pub mod branch;
pub mod callsite;
pub mod counter;
pub mod invocation;

pub use branch::BranchProfile;
pub use callsite::CallsiteProbe;
pub use counter::Counter;
pub use invocation::InvocationProfile;

use crate::source::SourceSection;

/// Common surface of all profile kinds
pub trait Profile {
    /// The section this profile was created for
    fn section(&self) -> &SourceSection;

    /// Export for the `data` object of a report section
    fn to_json(&self) -> serde_json::Value;
}

/// Profiles that only count hits
pub trait Counting: Profile {
    fn increment(&self);
    fn value(&self) -> u64;
}

/// The statistic kinds kept by the registry, one map each
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProfileKind {
    MethodInvocation,
    MethodCallsite,
    Instantiation,
    FieldAccess,
    ControlFlow,
}

impl ProfileKind {
    pub const ALL: [ProfileKind; 5] = [
        ProfileKind::MethodInvocation,
        ProfileKind::MethodCallsite,
        ProfileKind::Instantiation,
        ProfileKind::FieldAccess,
        ProfileKind::ControlFlow,
    ];

    /// Key under which this kind's export is nested in a section's `data`
    pub const fn data_key(self) -> &'static str {
        match self {
            ProfileKind::MethodInvocation => "methodInvocationProfile",
            ProfileKind::MethodCallsite => "methodCallsite",
            ProfileKind::Instantiation => "instantiationCount",
            ProfileKind::FieldAccess => "fieldAccessCount",
            ProfileKind::ControlFlow => "branchProfile",
        }
    }
}
