use super::{Counter, Counting, Profile};
use crate::source::SourceSection;

/// Call attempts issued from one call expression.
///
/// Counts exactly like [`Counter`] but is its own type, so call-site tallies
/// live in their own registry map and report key.
#[derive(Debug)]
pub struct CallsiteProbe {
    counter: Counter,
}

impl CallsiteProbe {
    pub fn new(section: &SourceSection) -> Self {
        Self {
            counter: Counter::new(section),
        }
    }
}

impl Profile for CallsiteProbe {
    fn section(&self) -> &SourceSection {
        self.counter.section()
    }

    fn to_json(&self) -> serde_json::Value {
        self.counter.to_json()
    }
}

impl Counting for CallsiteProbe {
    fn increment(&self) {
        self.counter.increment();
    }

    fn value(&self) -> u64 {
        self.counter.value()
    }
}
