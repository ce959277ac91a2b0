//! Trampoline driver.
//!
//! The driver owns the only loop in the runtime. Each iteration forces one
//! pending computation against its continuation; thrown errors come back as
//! data and are turned into `unwind` on the continuation they carry, so the
//! native stack stays flat regardless of program length.

use crate::config::RunConfig;
use crate::continuation::MetaCont;
use crate::control::Control;
use crate::debug_state::{DebugState, TraceEvent};
use crate::error::VMError;
use crate::step::{Step, Thrown};
use crate::value::{downcast, Value};

pub struct Trampoline {
    max_steps: Option<u64>,
    debug: DebugState,
}

impl Trampoline {
    pub fn new(config: RunConfig) -> Self {
        Trampoline {
            max_steps: config.max_steps,
            debug: DebugState::new(config.debug, config.trace),
        }
    }

    /// Run `program` to completion under the identity continuation.
    ///
    /// Step counters and trace events are reset at the start of each run.
    pub fn run<A: 'static>(&mut self, program: Control<A>) -> Result<A, VMError> {
        self.debug.reset();
        let step = Step::Computation(program.into_node(), MetaCont::identity());
        self.drive(step).and_then(downcast)
    }

    /// Steps forced by the last run.
    pub fn step_count(&self) -> u64 {
        self.debug.step_counter
    }

    pub fn trace_events(&self) -> &[TraceEvent] {
        self.debug.trace_events()
    }

    pub(crate) fn drive(&mut self, mut step: Step) -> Result<Value, VMError> {
        loop {
            let (node, cont) = match step {
                Step::Value(value) => return Ok(value),
                Step::Abort(error) => return Err(error),
                Step::Computation(node, cont) => (node, cont),
            };

            if let Some(limit) = self.max_steps {
                if self.debug.step_counter >= limit {
                    log::debug!("step limit {limit} reached");
                    return Err(VMError::step_limit_exceeded(limit));
                }
            }
            self.debug.advance_step();

            let kind = node.kind();
            let depth = cont.depth();
            self.debug.debug_step_entry(kind, &cont);

            step = match node.apply(cont) {
                Ok(next) => next,
                Err(Thrown { error, cont }) => cont.unwind(error),
            };

            self.debug.record_trace(kind, depth, &step);
            self.debug.debug_step_exit(&step);
        }
    }
}

impl Default for Trampoline {
    fn default() -> Self {
        Self::new(RunConfig::default())
    }
}
