//! Event nodes wired onto instrumented tree nodes
//!
//! Each node holds the profile obtained from the registry when it was
//! created and updates it from the engine's hooks.

use crate::instrument::ExecutionEventNode;
use crate::profiles::{BranchProfile, Counting, InvocationProfile, Profile};
use crate::session::MetricsSession;
use std::any::Any;
use std::rc::Rc;

/// Counts every entry into the node
#[derive(Debug)]
pub struct CountingNode<C> {
    counter: Rc<C>,
}

impl<C: Counting> CountingNode<C> {
    pub fn new(counter: Rc<C>) -> Self {
        Self { counter }
    }
}

impl<C: Counting> ExecutionEventNode for CountingNode<C> {
    fn on_enter(&self) {
        self.counter.increment();
    }
}

/// Wraps a callable root: tracks depth and counts invocations
#[derive(Debug)]
pub struct InvocationProfilingNode {
    session: Rc<MetricsSession>,
    profile: Rc<InvocationProfile>,
}

impl InvocationProfilingNode {
    pub fn new(session: Rc<MetricsSession>, profile: Rc<InvocationProfile>) -> Self {
        Self { session, profile }
    }
}

impl ExecutionEventNode for InvocationProfilingNode {
    fn on_enter(&self) {
        self.session.enter_method();
        self.profile.record_invocation();
    }

    fn on_return_value(&self, _result: &dyn Any) {
        self.session.leave_method();
    }

    fn on_return_exceptional(&self) {
        self.session.leave_method();
    }
}

/// Records the boolean outcome of a condition
#[derive(Debug)]
pub struct ControlFlowProfileNode {
    profile: Rc<BranchProfile>,
}

impl ControlFlowProfileNode {
    pub fn new(profile: Rc<BranchProfile>) -> Self {
        Self { profile }
    }
}

impl ExecutionEventNode for ControlFlowProfileNode {
    fn on_return_value(&self, result: &dyn Any) {
        match result.downcast_ref::<bool>() {
            Some(&taken) => self.profile.record_outcome(taken),
            None => log::trace!(
                "non-boolean condition result ignored at {}",
                self.profile.section()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiles::{CallsiteProbe, Counter};
    use crate::source::{Source, SourceSection};

    fn section() -> SourceSection {
        Source::new("n.ns", "text/plain", "a b c").section(0, 1, "a")
    }

    #[test]
    fn test_counting_node_counts_entries() {
        let counter = Rc::new(Counter::new(&section()));
        let node = CountingNode::new(Rc::clone(&counter));
        node.on_enter();
        node.on_return_value(&());
        node.on_enter();
        node.on_return_exceptional();
        assert_eq!(counter.value(), 2);
    }

    #[test]
    fn test_counting_node_with_callsite_probe() {
        let probe = Rc::new(CallsiteProbe::new(&section()));
        let node = CountingNode::new(Rc::clone(&probe));
        node.on_enter();
        assert_eq!(probe.value(), 1);
    }

    #[test]
    fn test_invocation_node_balances_depth() {
        let session = Rc::new(MetricsSession::new());
        let profile = Rc::new(InvocationProfile::new(&section()));
        let node = InvocationProfilingNode::new(Rc::clone(&session), Rc::clone(&profile));

        node.on_enter();
        assert_eq!(session.stack_depth(), 1);
        node.on_enter();
        assert_eq!(session.stack_depth(), 2);
        node.on_return_exceptional();
        node.on_return_value(&7_i32);

        assert_eq!(session.stack_depth(), 0);
        assert_eq!(session.max_stack_depth(), 2);
        assert_eq!(profile.invocation_count(), 2);
    }

    #[test]
    fn test_control_flow_node_records_booleans_only() {
        let profile = Rc::new(BranchProfile::new(&section()));
        let node = ControlFlowProfileNode::new(Rc::clone(&profile));

        node.on_enter();
        node.on_return_value(&true);
        node.on_return_value(&false);
        node.on_return_value(&"yes");
        node.on_return_exceptional();

        assert_eq!(profile.true_count(), 1);
        assert_eq!(profile.false_count(), 1);
    }
}
