use super::Profile;
use crate::source::SourceSection;
use serde_json::json;
use std::cell::Cell;

/// How often a callable root began executing
#[derive(Debug)]
pub struct InvocationProfile {
    section: SourceSection,
    invocations: Cell<u64>,
}

impl InvocationProfile {
    pub fn new(section: &SourceSection) -> Self {
        Self {
            section: section.clone(),
            invocations: Cell::new(0),
        }
    }

    pub fn record_invocation(&self) {
        self.invocations.set(self.invocations.get() + 1);
    }

    pub fn invocation_count(&self) -> u64 {
        self.invocations.get()
    }
}

impl Profile for InvocationProfile {
    fn section(&self) -> &SourceSection {
        &self.section
    }

    fn to_json(&self) -> serde_json::Value {
        json!({ "invocationCount": self.invocation_count() })
    }
}
