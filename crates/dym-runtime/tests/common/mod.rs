//! Shared test utilities
//!
//! `ScriptedEngine` stands in for the interpreter: tests instrument tree
//! nodes by section and then replay execution events against them.

#![allow(dead_code)]

use dym_runtime::{
    EventContext, EventNodeFactory, ExecutionEventNode, Instrumenter, Source, SourceSection,
    SourceSectionFilter, Tag,
};
use std::any::Any;

/// Handle of one instrumented tree node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeId(usize);

/// Raised by a scripted body to unwind through enclosing roots
#[derive(Debug)]
pub struct Thrown;

#[derive(Default)]
pub struct ScriptedEngine {
    bindings: Vec<(SourceSectionFilter, EventNodeFactory)>,
    nodes: Vec<Vec<Box<dyn ExecutionEventNode>>>,
}

impl Instrumenter for ScriptedEngine {
    fn attach_factory(&mut self, filter: SourceSectionFilter, factory: EventNodeFactory) {
        self.bindings.push((filter, factory));
    }
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    /// Prepare a tree node for `section`, creating one event node per
    /// matching binding. Every call models a distinct tree node, even for an
    /// equal section.
    pub fn instrument(&mut self, section: &SourceSection) -> NodeId {
        let context = EventContext::new(section.clone());
        let attached = self
            .bindings
            .iter()
            .filter(|(filter, _)| filter.matches(section))
            .map(|(_, factory)| factory(&context))
            .collect();
        self.nodes.push(attached);
        NodeId(self.nodes.len() - 1)
    }

    /// Number of event nodes attached to a tree node
    pub fn attached(&self, node: NodeId) -> usize {
        self.nodes[node.0].len()
    }

    pub fn enter(&self, node: NodeId) {
        for n in &self.nodes[node.0] {
            n.on_enter();
        }
    }

    pub fn return_value(&self, node: NodeId, value: &dyn Any) {
        for n in &self.nodes[node.0] {
            n.on_return_value(value);
        }
    }

    pub fn return_exceptional(&self, node: NodeId) {
        for n in &self.nodes[node.0] {
            n.on_return_exceptional();
        }
    }

    /// Execute a leaf node producing `value`
    pub fn execute(&self, node: NodeId, value: &dyn Any) {
        self.enter(node);
        self.return_value(node, value);
    }

    /// Execute a node with a body; an `Err` from the body exits exceptionally
    pub fn call<F>(&self, node: NodeId, body: F) -> Result<(), Thrown>
    where
        F: FnOnce(&Self) -> Result<(), Thrown>,
    {
        self.enter(node);
        match body(self) {
            Ok(()) => {
                self.return_value(node, &());
                Ok(())
            }
            Err(thrown) => {
                self.return_exceptional(node);
                Err(thrown)
            }
        }
    }
}

pub const PROGRAM: &str = "\
Counter = (
  run: n = (
    | list |
    list:: Array new: n.
    (n > 0) ifTrue: [ self log: list ].
    ^ list size
  )
)
";

pub fn program_source() -> Source {
    Source::new("/work/Counter.ns", "application/x-newspeak", PROGRAM)
}

/// Section covering the first occurrence of `snippet` in the program
pub fn section_of(source: &Source, snippet: &str, tags: &[Tag]) -> SourceSection {
    let byte_index = source
        .text()
        .find(snippet)
        .unwrap_or_else(|| panic!("snippet {:?} not in source", snippet));
    let char_index = source.text()[..byte_index].chars().count();
    source
        .section(char_index, snippet.chars().count(), snippet)
        .with_tags(tags)
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
