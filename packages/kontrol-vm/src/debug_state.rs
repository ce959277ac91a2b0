//! Debug and trace state for a trampoline run.

use crate::config::{DebugConfig, DebugLevel};
use crate::continuation::MetaCont;
use crate::step::Step;

/// One forced step, as recorded when tracing is on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEvent {
    pub step: u64,
    /// Control variant forced at this step.
    pub node: &'static str,
    /// Continuation layers at entry.
    pub depth: usize,
    /// Kind of the resulting step: `Value`, `Abort` or `Computation`.
    pub result: &'static str,
}

#[derive(Debug, Clone)]
pub(crate) struct DebugState {
    pub(crate) config: DebugConfig,
    pub(crate) step_counter: u64,
    pub(crate) trace_enabled: bool,
    pub(crate) trace_events: Vec<TraceEvent>,
}

impl DebugState {
    pub(crate) fn new(config: DebugConfig, trace_enabled: bool) -> Self {
        Self {
            config,
            step_counter: 0,
            trace_enabled,
            trace_events: Vec::new(),
        }
    }

    pub(crate) fn is_enabled(&self) -> bool {
        self.config.is_enabled()
    }

    pub(crate) fn reset(&mut self) {
        self.step_counter = 0;
        self.trace_events.clear();
    }

    pub(crate) fn trace_events(&self) -> &[TraceEvent] {
        &self.trace_events
    }

    pub(crate) fn advance_step(&mut self) {
        self.step_counter += 1;
    }

    pub(crate) fn record_trace(&mut self, node: &'static str, depth: usize, result: &Step) {
        if !self.trace_enabled {
            return;
        }
        self.trace_events.push(TraceEvent {
            step: self.step_counter,
            node,
            depth,
            result: result.kind(),
        });
    }

    pub(crate) fn debug_step_entry(&self, node: &'static str, cont: &MetaCont) {
        if !self.is_enabled() {
            return;
        }
        log::debug!(
            "[step {}] node={} depth={} frames={}",
            self.step_counter,
            node,
            cont.depth(),
            cont.frame_count()
        );

        if self.config.level == DebugLevel::Trace && self.config.show_frames {
            for (i, kind) in cont.layer_kinds().iter().enumerate() {
                log::debug!("  layer[{}]: {}", i, kind);
            }
        }
    }

    pub(crate) fn debug_step_exit(&self, result: &Step) {
        if self.config.level != DebugLevel::Trace {
            return;
        }
        match result {
            Step::Abort(e) => log::debug!("[step {}] -> Abort: {}", self.step_counter, e),
            other => log::debug!("[step {}] -> {}", self.step_counter, other.kind()),
        }
    }
}
