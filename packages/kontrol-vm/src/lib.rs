//! kontrol-vm: algebraic effects as multi-prompt, one-shot delimited
//! continuations, run on a stack-safe trampoline.
//!
//! # Architecture
//!
//! - **Typed surface, erased machine**: `Control<A>` describes a program;
//!   payloads are boxed and downcast at typed boundaries
//! - **Reified continuation**: `MetaCont` is a flat stack of frames and
//!   delimiters, split at a prompt to capture and appended to resume
//! - **Two error channels**: `failure` aborts unconditionally; `raise` and
//!   throwing producers unwind to the innermost matching catch frame
//! - **Open delimiters**: any component can mint prompt, state and catch
//!   markers and install them around a program
//!
//! ```
//! use kontrol_vm::{ContMarker, Control};
//!
//! let marker = ContMarker::<i32>::fresh();
//! let program = Control::delimit_cont(marker, |m| {
//!     Control::<i32>::use_cont(m, |k| k.resume(5)).map(|x| x * 2)
//! });
//! assert_eq!(program.run().unwrap(), 10);
//! ```

mod vm_logging;

pub mod capture;
pub mod catch;
pub mod config;
pub mod continuation;
pub mod control;
mod debug_state;
pub mod driver;
pub mod error;
mod frame;
pub mod handler;
pub mod ids;
pub mod marker;
pub mod state;
mod step;
mod value;

// Re-exports for convenience
pub use capture::Resume;
pub use catch::Catch;
pub use config::{DebugConfig, DebugLevel, RunConfig};
pub use continuation::MetaCont;
pub use control::Control;
pub use debug_state::TraceEvent;
pub use driver::Trampoline;
pub use error::{Throwable, VMError};
pub use handler::Handler;
pub use ids::{ContId, FieldId, Marker};
pub use marker::{CatchMarker, ContMarker, StateMarker, StateScope};
pub use state::{Commit, Field, HandlerState, StateCells, Stateful};
