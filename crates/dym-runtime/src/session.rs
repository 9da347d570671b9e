//! Per-run tool state
//!
//! Everything the probes mutate lives here: the profile registry and the
//! call stack depth tracker. A session is created when the tool activates,
//! shared (`Rc`) with the factories and event nodes, and read once more
//! when the report is written.

use crate::depth::CallStackDepth;
use crate::registry::ProfileRegistry;

#[derive(Debug, Default)]
pub struct MetricsSession {
    registry: ProfileRegistry,
    depth: CallStackDepth,
}

impl MetricsSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registry(&self) -> &ProfileRegistry {
        &self.registry
    }

    /// Called by the invocation node before a root body runs
    pub fn enter_method(&self) {
        self.depth.enter();
    }

    /// Called by the invocation node after a root body returned or raised
    pub fn leave_method(&self) {
        self.depth.leave();
    }

    pub fn stack_depth(&self) -> usize {
        self.depth.current()
    }

    pub fn max_stack_depth(&self) -> usize {
        self.depth.max()
    }
}
