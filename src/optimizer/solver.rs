//! Solver seam
//!
//! [`MilpSolver`] is the only place a concrete MILP backend is touched. The
//! default [`GoodLpSolver`] translates a [`MilpModel`] into `good_lp` and
//! solves it with the pure-Rust `microlp` backend.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use super::model::{MilpModel, VarId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolveStatus {
    Optimal,
    Infeasible,
    Unbounded,
}

/// Raw solver output. `values` is indexed by [`VarId`] and is empty unless
/// the status is `Optimal`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    pub status: SolveStatus,
    pub values: Vec<f64>,
    pub objective_value: f64,
}

impl Solution {
    pub fn optimal(values: Vec<f64>, objective_value: f64) -> Self {
        Self {
            status: SolveStatus::Optimal,
            values,
            objective_value,
        }
    }

    pub fn without_values(status: SolveStatus) -> Self {
        Self {
            status,
            values: Vec::new(),
            objective_value: f64::NAN,
        }
    }

    pub fn value(&self, var: VarId) -> f64 {
        self.values[var.index()]
    }
}

#[derive(Debug, Error)]
pub enum SolverError {
    #[error("Solver did not finish within {limit:?}")]
    Timeout { limit: Duration },
    #[error("Solver backend failed: {0}")]
    Backend(String),
    #[error("Solver worker exited without a result")]
    WorkerLost,
    #[error("MILP solving requires the 'optimization' feature")]
    Unavailable,
}

#[cfg_attr(test, mockall::automock)]
pub trait MilpSolver: Send + Sync {
    /// Short backend tag recorded on settlement plans
    fn name(&self) -> &'static str;

    /// Solve `model` to optimality. With a deadline the solver must either
    /// finish in time or fail with [`SolverError::Timeout`].
    fn solve(&self, model: &MilpModel, deadline: Option<Duration>) -> Result<Solution, SolverError>;
}

/// `good_lp` adapter running the `microlp` branch-and-bound backend
#[derive(Debug, Clone, Copy, Default)]
pub struct GoodLpSolver;

impl GoodLpSolver {
    #[cfg(feature = "optimization")]
    fn solve_blocking(model: &MilpModel) -> Result<Solution, SolverError> {
        use good_lp::solvers::microlp::microlp;
        use good_lp::{
            variable, Expression, ProblemVariables, ResolutionError, Solution as _, SolverModel,
            Variable,
        };

        use super::model::{ConstraintOp, VarKind};

        if model.variables().is_empty() {
            return Ok(Solution::optimal(Vec::new(), 0.0));
        }

        let mut problem = ProblemVariables::new();
        let handles: Vec<Variable> = model
            .variables()
            .iter()
            .map(|def| {
                let mut var = variable().name(def.name.clone());
                match def.kind {
                    VarKind::Binary => var = var.binary(),
                    VarKind::Continuous => {
                        if def.lower.is_finite() {
                            var = var.min(def.lower);
                        }
                        if def.upper.is_finite() {
                            var = var.max(def.upper);
                        }
                    }
                }
                problem.add(var)
            })
            .collect();

        let mut objective = Expression::with_capacity(model.objective().len());
        for &(var, coef) in model.objective() {
            objective.add_mul(coef, handles[var.index()]);
        }

        let mut lp = problem.minimise(objective).using(microlp);
        for constraint in model.constraints() {
            let mut lhs = Expression::with_capacity(constraint.terms.len());
            for &(var, coef) in &constraint.terms {
                lhs.add_mul(coef, handles[var.index()]);
            }
            lp = lp.with(match constraint.op {
                ConstraintOp::Eq => lhs.eq(constraint.rhs),
                ConstraintOp::Le => lhs.leq(constraint.rhs),
                ConstraintOp::Ge => lhs.geq(constraint.rhs),
            });
        }

        match lp.solve() {
            Ok(solved) => {
                let values: Vec<f64> = handles.iter().map(|&h| solved.value(h)).collect();
                let objective_value = model.objective_value(&values);
                Ok(Solution::optimal(values, objective_value))
            }
            Err(ResolutionError::Infeasible) => Ok(Solution::without_values(SolveStatus::Infeasible)),
            Err(ResolutionError::Unbounded) => Ok(Solution::without_values(SolveStatus::Unbounded)),
            Err(other) => Err(SolverError::Backend(other.to_string())),
        }
    }

    #[cfg(not(feature = "optimization"))]
    fn solve_blocking(_model: &MilpModel) -> Result<Solution, SolverError> {
        Err(SolverError::Unavailable)
    }
}

impl MilpSolver for GoodLpSolver {
    fn name(&self) -> &'static str {
        "good_lp-microlp"
    }

    fn solve(&self, model: &MilpModel, deadline: Option<Duration>) -> Result<Solution, SolverError> {
        let started = Instant::now();
        let Some(limit) = deadline else {
            let result = Self::solve_blocking(model);
            debug!(model = model.name(), elapsed_ms = started.elapsed().as_millis() as u64, "solve finished");
            return result;
        };

        // The worker is detached on timeout; its late result is dropped with
        // the channel.
        let (tx, rx) = mpsc::channel();
        let owned = model.clone();
        thread::Builder::new()
            .name("milp-solve".into())
            .spawn(move || {
                let _ = tx.send(Self::solve_blocking(&owned));
            })
            .map_err(|e| SolverError::Backend(format!("failed to spawn solver thread: {e}")))?;

        match rx.recv_timeout(limit) {
            Ok(result) => {
                debug!(model = model.name(), elapsed_ms = started.elapsed().as_millis() as u64, "solve finished");
                result
            }
            Err(RecvTimeoutError::Timeout) => {
                warn!(model = model.name(), ?limit, "solver deadline exceeded");
                Err(SolverError::Timeout { limit })
            }
            Err(RecvTimeoutError::Disconnected) => Err(SolverError::WorkerLost),
        }
    }
}
