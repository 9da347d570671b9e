//! The dynamic metrics tool
//!
//! [`DynamicMetrics`] attaches probes to five syntactic categories when it is
//! activated and writes the report when the engine disposes it.
//!
//! Designed for single-threaded use in interpreted mode only: the session is
//! shared through `Rc` and mutated through `Cell`, and an optimizing runtime
//! would change how often the probed nodes run.

use crate::error::{MetricsError, MetricsResult};
use crate::instrument::{EventContext, ExecutionEventNode, Instrumenter, SourceSectionFilter};
use crate::nodes::{ControlFlowProfileNode, CountingNode, InvocationProfilingNode};
use crate::profiles::{BranchProfile, CallsiteProbe, Counter, InvocationProfile};
use crate::report::{MetricsReport, ReportOptions};
use crate::session::MetricsSession;
use crate::source::Tag;
use dym_config::{ConfigLoader, MetricsConfig};
use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Registration id of the tool
pub const ID: &str = "dym-dynamic-metrics";

/// How the host executes the program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RuntimeMode {
    /// Plain tree-walking interpretation
    #[default]
    Interpreted,
    /// A compiling/optimizing runtime that may bypass probes
    Optimizing,
}

/// What the tool knows about its host
#[derive(Debug, Clone)]
pub struct Env {
    working_dir: PathBuf,
    runtime: RuntimeMode,
}

impl Env {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
            runtime: RuntimeMode::Interpreted,
        }
    }

    /// Environment of the current process
    pub fn current() -> MetricsResult<Self> {
        let cwd = std::env::current_dir().map_err(MetricsError::WorkingDirectory)?;
        Ok(Self::new(cwd))
    }

    pub fn with_runtime(mut self, runtime: RuntimeMode) -> Self {
        self.runtime = runtime;
        self
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn runtime(&self) -> RuntimeMode {
        self.runtime
    }
}

/// Probe attachment and reporting for one run
pub struct DynamicMetrics {
    session: Rc<MetricsSession>,
    config: MetricsConfig,
    disposed: Cell<bool>,
}

impl DynamicMetrics {
    /// Tool with the default configuration (`<cwd>/dynamic-metrics.json`)
    pub fn new() -> Self {
        Self::with_config(MetricsConfig::default())
    }

    pub fn with_config(config: MetricsConfig) -> Self {
        Self {
            session: Rc::new(MetricsSession::new()),
            config,
            disposed: Cell::new(false),
        }
    }

    /// Tool configured from `dym.toml` and `DYM_*` variables, searched from
    /// the host's working directory
    pub fn from_environment(env: &Env) -> MetricsResult<Self> {
        let config = ConfigLoader::new().load_from_directory(env.working_dir())?;
        if let Some(file) = &config.config_file {
            log::debug!("loaded configuration from {}", file.display());
        }
        Ok(Self::with_config(config.metrics))
    }

    pub fn session(&self) -> &Rc<MetricsSession> {
        &self.session
    }

    pub fn config(&self) -> &MetricsConfig {
        &self.config
    }

    /// Activation: subscribe to the instrumented categories.
    pub fn on_create(&self, env: &Env, instrumenter: &mut dyn Instrumenter) {
        debug_assert!(
            env.runtime() == RuntimeMode::Interpreted,
            "To get metrics for the lexical, unoptimized behavior, run this tool in interpreted mode"
        );

        let session = Rc::clone(&self.session);
        instrumenter.attach_factory(
            filter(&[Tag::Root]),
            Box::new(move |context: &EventContext| -> Box<dyn ExecutionEventNode> {
                let section = context.instrumented_section();
                log::trace!("instrumenting root {}", section);
                let profile = session
                    .registry()
                    .invocations()
                    .get_or_create(section, InvocationProfile::new);
                Box::new(InvocationProfilingNode::new(Rc::clone(&session), profile))
            }),
        );

        let session = Rc::clone(&self.session);
        instrumenter.attach_factory(
            filter(&[Tag::UnspecifiedInvoke]),
            Box::new(move |context: &EventContext| -> Box<dyn ExecutionEventNode> {
                let probe = session
                    .registry()
                    .callsites()
                    .get_or_create(context.instrumented_section(), CallsiteProbe::new);
                Box::new(CountingNode::new(probe))
            }),
        );

        let session = Rc::clone(&self.session);
        instrumenter.attach_factory(
            filter(&[Tag::NewObject, Tag::NewArray]),
            Box::new(move |context: &EventContext| -> Box<dyn ExecutionEventNode> {
                let counter = session
                    .registry()
                    .instantiations()
                    .get_or_create(context.instrumented_section(), Counter::new);
                Box::new(CountingNode::new(counter))
            }),
        );

        // TODO: count FIELD_WRITE sites in a second field-access map
        let session = Rc::clone(&self.session);
        instrumenter.attach_factory(
            filter(&[Tag::FieldRead]),
            Box::new(move |context: &EventContext| -> Box<dyn ExecutionEventNode> {
                let counter = session
                    .registry()
                    .field_accesses()
                    .get_or_create(context.instrumented_section(), Counter::new);
                Box::new(CountingNode::new(counter))
            }),
        );

        let session = Rc::clone(&self.session);
        instrumenter.attach_factory(
            filter(&[Tag::ControlFlowCondition]),
            Box::new(move |context: &EventContext| -> Box<dyn ExecutionEventNode> {
                let profile = session
                    .registry()
                    .branches()
                    .get_or_create(context.instrumented_section(), BranchProfile::new);
                Box::new(ControlFlowProfileNode::new(profile))
            }),
        );

        log::debug!("{} attached to the instrumenter", ID);
    }

    /// Called by the invocation node before a root body runs
    pub fn enter_method(&self) {
        self.session.enter_method();
    }

    /// Called by the invocation node after a root body returned or raised
    pub fn leave_method(&self) {
        self.session.leave_method();
    }

    pub fn max_stack_depth(&self) -> usize {
        self.session.max_stack_depth()
    }

    /// Build the report document without writing it
    pub fn report(&self) -> MetricsReport {
        let options = ReportOptions {
            include_source_text: self.config.include_source_text(),
        };
        MetricsReport::build(&self.session, &options)
    }

    /// Where the report goes for this host
    pub fn output_path(&self, env: &Env) -> PathBuf {
        self.config.output_path(env.working_dir())
    }

    /// Build and write the report, returning the path written
    pub fn write_report(&self, env: &Env) -> MetricsResult<PathBuf> {
        let path = self.output_path(env);
        let report = self.report();
        eprintln!("[DynamicMetrics] Create output file: {}", path.display());
        report.write_to(&path, self.config.pretty())?;
        log::info!("{}", report.format_summary());
        Ok(path)
    }

    /// Shutdown: write the report once. Failures are logged, never raised.
    pub fn on_dispose(&self, env: &Env) {
        if self.disposed.replace(true) {
            log::warn!("{} disposed twice; report already written", ID);
            return;
        }

        if let Err(e) = self.write_report(env) {
            log::error!("[DynamicMetrics] {}", e);
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }
}

impl Default for DynamicMetrics {
    fn default() -> Self {
        Self::new()
    }
}

fn filter(tags: &[Tag]) -> SourceSectionFilter {
    SourceSectionFilter::builder().tag_is(tags).build()
}
