//! Dynamic Metrics - execution profiling for interpreted programs
//!
//! This library attaches probes to tagged locations of a program's syntax
//! tree while an external engine runs it, and reports the collected
//! statistics per location when the run ends:
//! - Invocation counts of callable roots, with call stack depth
//! - Call attempts at unqualified call sites
//! - Object and array instantiations
//! - Field reads
//! - Outcomes of control-flow conditions
//!
//! # Quick start
//!
//! ```no_run
//! use dym_runtime::{DynamicMetrics, Env, Instrumenter};
//!
//! fn run(engine: &mut dyn Instrumenter) {
//!     let env = Env::current().unwrap();
//!     let tool = DynamicMetrics::from_environment(&env).unwrap();
//!     tool.on_create(&env, engine);
//!     // ... the engine executes the program, driving the event nodes ...
//!     tool.on_dispose(&env);
//! }
//! ```

/// Dynamic metrics runtime version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod depth;
pub mod error;
pub mod instrument;
pub mod metrics;
pub mod nodes;
pub mod profiles;
pub mod registry;
pub mod report;
pub mod session;
pub mod source;

pub use depth::CallStackDepth;
pub use error::{MetricsError, MetricsResult};
pub use instrument::{
    EventContext, EventNodeFactory, ExecutionEventNode, Instrumenter, SourceSectionFilter,
};
pub use metrics::{DynamicMetrics, Env, RuntimeMode, ID};
pub use profiles::{
    BranchProfile, CallsiteProbe, Counter, Counting, InvocationProfile, Profile, ProfileKind,
};
pub use registry::{ProfileMap, ProfileRegistry};
pub use report::{MetricsReport, ReportOptions, SectionEntry, SourceEntry};
pub use session::MetricsSession;
pub use source::{Source, SourceSection, Tag};

/// Install a stderr logger for the `log` macros used by this crate
#[cfg(feature = "debug")]
pub fn init_logging() {
    let _ = env_logger::builder()
        .format_timestamp(None)
        .format_module_path(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smoke() {
        assert_eq!(VERSION, "0.1.0");
        assert_eq!(ID, "dym-dynamic-metrics");
    }
}
