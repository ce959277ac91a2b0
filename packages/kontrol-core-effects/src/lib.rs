//! kontrol-core-effects: everyday effects written against the public
//! `kontrol-vm` surface.
//!
//! - [`State`]: get/put/modify over a scoped state cell
//! - [`Exc`]: early exit with a typed error
//! - [`Emit`]: an append-only output stream
//!
//! Each effect is an ordinary [`kontrol_vm::Handler`]; nothing here reaches
//! into the runtime's internals.

pub mod emit;
pub mod error;
pub mod exception;
pub mod state;

pub use emit::{collect, Emit, Emitted};
pub use error::EffectError;
pub use exception::{try_run, Exc};
pub use state::{run_state, State};
