//! Estado agregado de una ejecución nocturna.

mod result;
mod state;

pub use result::{RunResult, Verdict};
pub use state::RunState;
