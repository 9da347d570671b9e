//! Contract between the metrics tool and the execution engine.
//!
//! The engine owns the syntax tree. The tool registers factories against tag
//! filters; whenever the engine prepares a tree node whose section matches a
//! filter it calls the factory once for that node and then drives the
//! returned [`ExecutionEventNode`] inline with execution.

use crate::source::{SourceSection, Tag};
use std::any::Any;

/// Hooks invoked synchronously by the engine around one tree node.
pub trait ExecutionEventNode {
    /// Before the node executes
    fn on_enter(&self) {}

    /// After the node produced a value
    fn on_return_value(&self, _result: &dyn Any) {}

    /// After the node exited by raising
    fn on_return_exceptional(&self) {}
}

/// Information handed to a factory for the node being instrumented
#[derive(Debug, Clone)]
pub struct EventContext {
    section: SourceSection,
}

impl EventContext {
    pub fn new(section: SourceSection) -> Self {
        Self { section }
    }

    pub fn instrumented_section(&self) -> &SourceSection {
        &self.section
    }
}

/// Builds the event node for one instrumented tree node
pub type EventNodeFactory = Box<dyn Fn(&EventContext) -> Box<dyn ExecutionEventNode>>;

/// Selects sections carrying at least one of a set of tags
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceSectionFilter {
    tags: Vec<Tag>,
}

impl SourceSectionFilter {
    pub fn builder() -> SourceSectionFilterBuilder {
        SourceSectionFilterBuilder::default()
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    /// An empty filter matches nothing
    pub fn matches(&self, section: &SourceSection) -> bool {
        section.tags().iter().any(|tag| self.tags.contains(tag))
    }
}

#[derive(Debug, Default)]
pub struct SourceSectionFilterBuilder {
    tags: Vec<Tag>,
}

impl SourceSectionFilterBuilder {
    /// Match sections carrying any of `tags`
    pub fn tag_is(mut self, tags: &[Tag]) -> Self {
        for tag in tags {
            if !self.tags.contains(tag) {
                self.tags.push(*tag);
            }
        }
        self
    }

    pub fn build(self) -> SourceSectionFilter {
        SourceSectionFilter { tags: self.tags }
    }
}

/// The engine side of the protocol.
pub trait Instrumenter {
    /// Call `factory` for every tree node whose section matches `filter`
    fn attach_factory(&mut self, filter: SourceSectionFilter, factory: EventNodeFactory);
}
