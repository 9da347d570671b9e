//! Outcome distribution of a control-flow condition

use super::Profile;
use crate::source::SourceSection;
use serde_json::json;
use std::cell::Cell;

/// True/false counts of one condition expression
#[derive(Debug)]
pub struct BranchProfile {
    section: SourceSection,
    true_count: Cell<u64>,
    false_count: Cell<u64>,
}

impl BranchProfile {
    pub fn new(section: &SourceSection) -> Self {
        Self {
            section: section.clone(),
            true_count: Cell::new(0),
            false_count: Cell::new(0),
        }
    }

    /// Record one evaluation of the condition
    pub fn record_outcome(&self, taken: bool) {
        let slot = if taken {
            &self.true_count
        } else {
            &self.false_count
        };
        slot.set(slot.get() + 1);
    }

    pub fn true_count(&self) -> u64 {
        self.true_count.get()
    }

    pub fn false_count(&self) -> u64 {
        self.false_count.get()
    }

    /// Total evaluations
    pub fn total(&self) -> u64 {
        self.true_count() + self.false_count()
    }
}

impl Profile for BranchProfile {
    fn section(&self) -> &SourceSection {
        &self.section
    }

    fn to_json(&self) -> serde_json::Value {
        json!({
            "trueCount": self.true_count(),
            "falseCount": self.false_count(),
            "totalCount": self.total(),
        })
    }
}
