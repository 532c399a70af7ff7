use std::time::Duration;

use thiserror::Error;

use crate::optimizer::{SchemeKind, SolverError};

/// Settlement pipeline errors
#[derive(Debug, Error)]
pub enum SettlementError {
    #[error("Balances must sum to zero (found {total}, tolerance {epsilon})")]
    InfeasibleInput { total: f64, epsilon: f64 },

    #[error("Balance of {label} is not a finite number: {value}")]
    InvalidBalance { label: String, value: f64 },

    #[error("Participant {label} has id {id} but sits at position {position}")]
    ParticipantOutOfOrder {
        label: String,
        id: usize,
        position: usize,
    },

    #[error("Got {labels} participant labels for {balances} balances")]
    LabelMismatch { labels: usize, balances: usize },

    #[error("Solver reported the {scheme} model infeasible (big-M = {big_m})")]
    ModelInfeasible { scheme: SchemeKind, big_m: f64 },

    #[error("Solver reported the {scheme} model unbounded")]
    ModelUnbounded { scheme: SchemeKind },

    #[error("Solver exceeded its time limit of {limit:?}")]
    SolverTimeout { limit: Duration },

    #[error("Decoded payments leave {participant} at {actual} instead of {expected}")]
    ConservationMismatch {
        participant: String,
        expected: f64,
        actual: f64,
    },

    #[error(transparent)]
    Solver(SolverError),
}

impl From<SolverError> for SettlementError {
    fn from(err: SolverError) -> Self {
        match err {
            SolverError::Timeout { limit } => SettlementError::SolverTimeout { limit },
            other => SettlementError::Solver(other),
        }
    }
}
