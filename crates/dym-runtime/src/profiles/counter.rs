use super::{Counting, Profile};
use crate::source::SourceSection;
use serde_json::json;
use std::cell::Cell;

/// Monotonic hit counter for one section
#[derive(Debug)]
pub struct Counter {
    section: SourceSection,
    count: Cell<u64>,
}

impl Counter {
    pub fn new(section: &SourceSection) -> Self {
        Self {
            section: section.clone(),
            count: Cell::new(0),
        }
    }
}

impl Profile for Counter {
    fn section(&self) -> &SourceSection {
        &self.section
    }

    fn to_json(&self) -> serde_json::Value {
        json!({ "count": self.count.get() })
    }
}

impl Counting for Counter {
    fn increment(&self) {
        self.count.set(self.count.get() + 1);
    }

    fn value(&self) -> u64 {
        self.count.get()
    }
}
