//! Thread-local solver context for crash reports.
//!
//! Each thread records which solver and phase it is in, and global atomic
//! counters track how many candidates of the current batch were evaluated.
//! Rayon workers start with an empty context; the panic hook still reports
//! the global progress for them.

use std::cell::RefCell;
use std::sync::atomic::{AtomicUsize, Ordering};

static CANDIDATES_EVALUATED: AtomicUsize = AtomicUsize::new(0);
static CANDIDATES_TOTAL: AtomicUsize = AtomicUsize::new(0);

thread_local! {
    static CURRENT_CONTEXT: RefCell<SolverContext> = const { RefCell::new(SolverContext::new()) };
}

/// What the current thread was doing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SolverContext {
    pub phase: Option<SolverPhase>,
    /// `ahca`, `moeca`, `evaluate`
    pub solver: Option<&'static str>,
    /// Cluster count of the state being worked on
    pub cluster_count: Option<usize>,
}

impl SolverContext {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            phase: None,
            solver: None,
            cluster_count: None,
        }
    }
}

/// Major stages of a solving run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverPhase {
    GraphLoading,
    InitialEvaluation,
    CandidateEvaluation,
    PopulationEvaluation,
    ResultExtraction,
    Persistence,
}

impl std::fmt::Display for SolverPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GraphLoading => write!(f, "graph_loading"),
            Self::InitialEvaluation => write!(f, "initial_evaluation"),
            Self::CandidateEvaluation => write!(f, "candidate_evaluation"),
            Self::PopulationEvaluation => write!(f, "population_evaluation"),
            Self::ResultExtraction => write!(f, "result_extraction"),
            Self::Persistence => write!(f, "persistence"),
        }
    }
}

/// Restores the previous context when dropped.
pub struct ContextGuard {
    previous: SolverContext,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        CURRENT_CONTEXT.with(|ctx| {
            *ctx.borrow_mut() = self.previous.clone();
        });
    }
}

fn update_context(apply: impl FnOnce(&mut SolverContext)) -> ContextGuard {
    CURRENT_CONTEXT.with(|ctx| {
        let previous = ctx.borrow().clone();
        apply(&mut ctx.borrow_mut());
        ContextGuard { previous }
    })
}

#[must_use]
pub fn set_phase(phase: SolverPhase) -> ContextGuard {
    update_context(|ctx| ctx.phase = Some(phase))
}

#[must_use]
pub fn set_solver(solver: &'static str) -> ContextGuard {
    update_context(|ctx| ctx.solver = Some(solver))
}

/// Record the cluster count without a guard; it changes every AHCA step.
pub fn set_cluster_count(count: usize) {
    CURRENT_CONTEXT.with(|ctx| {
        ctx.borrow_mut().cluster_count = Some(count);
    });
}

/// Start a new batch of `total` candidate evaluations.
pub fn set_progress(evaluated: usize, total: usize) {
    CANDIDATES_EVALUATED.store(evaluated, Ordering::Relaxed);
    CANDIDATES_TOTAL.store(total, Ordering::Relaxed);
}

/// Safe to call from rayon workers.
pub fn increment_evaluated() {
    CANDIDATES_EVALUATED.fetch_add(1, Ordering::Relaxed);
}

#[must_use]
pub fn get_current_context() -> SolverContext {
    CURRENT_CONTEXT.with(|ctx| ctx.borrow().clone())
}

/// `(evaluated, total)` of the current batch.
#[must_use]
pub fn get_progress() -> (usize, usize) {
    (
        CANDIDATES_EVALUATED.load(Ordering::Relaxed),
        CANDIDATES_TOTAL.load(Ordering::Relaxed),
    )
}

pub fn reset_progress() {
    set_progress(0, 0);
}

pub fn reset_context() {
    CURRENT_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = SolverContext::new();
    });
}
