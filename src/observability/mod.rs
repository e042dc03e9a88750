//! Crash reports and solver context.
//!
//! ```ignore
//! use servicemap::observability::{install_panic_hook, set_phase, set_solver, SolverPhase};
//!
//! install_panic_hook();
//! let _solver = set_solver("ahca");
//! let _phase = set_phase(SolverPhase::CandidateEvaluation);
//! // a panic here reports solver, phase and candidate progress
//! ```

pub mod context;
pub mod panic_hook;

pub use context::{
    get_current_context, get_progress, increment_evaluated, reset_context, reset_progress,
    set_cluster_count, set_phase, set_progress, set_solver, ContextGuard, SolverContext,
    SolverPhase,
};
pub use panic_hook::install_panic_hook;
