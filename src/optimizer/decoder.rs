use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::builder::SettlementModel;
use super::solver::{SolveStatus, Solution, SolverError};
use crate::domain::{BalanceStore, Payment};
use crate::error::SettlementError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecodeOptions {
    /// Allowed distance of an indicator from 0 or 1 before it is flagged
    pub binary_tolerance: f64,
    /// Amounts at or below this magnitude count as zero
    pub value_tolerance: f64,
    /// Allowed per-participant residual after replaying the payments
    pub conservation_tolerance: f64,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            binary_tolerance: 1e-6,
            value_tolerance: 1e-6,
            conservation_tolerance: 1e-4,
        }
    }
}

/// Non-fatal numeric irregularities found while reading a solution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ToleranceWarning {
    FractionalIndicator { variable: String, value: f64 },
    /// Amount left on a pair whose indicator rounds to 0
    StrayAmount { variable: String, value: f64 },
    /// Indicator set on a pair that carries no money
    EmptyTransaction { variable: String, value: f64 },
    ConstraintResidual { constraint: String },
    CountMismatch {
        objective_value: f64,
        redundancy_factor: u32,
        decoded: usize,
    },
}

impl fmt::Display for ToleranceWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToleranceWarning::FractionalIndicator { variable, value } => {
                write!(f, "indicator {variable} is not binary: {value}")
            }
            ToleranceWarning::StrayAmount { variable, value } => {
                write!(f, "{variable} = {value} on an inactive pair")
            }
            ToleranceWarning::EmptyTransaction { variable, value } => {
                write!(f, "{variable} = {value} on an active pair")
            }
            ToleranceWarning::ConstraintResidual { constraint } => {
                write!(f, "constraint {constraint} violated beyond tolerance")
            }
            ToleranceWarning::CountMismatch {
                objective_value,
                redundancy_factor,
                decoded,
            } => write!(
                f,
                "objective {objective_value} / {redundancy_factor} disagrees with {decoded} decoded payments"
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedSettlement {
    pub payments: Vec<Payment>,
    /// Objective corrected by the scheme's redundancy factor
    pub transaction_count: usize,
    pub objective_value: f64,
    pub warnings: Vec<ToleranceWarning>,
}

/// Turns solver values back into directed payments.
///
/// Decoding is a pure function of its inputs: the same solution always yields
/// the same payments in pair enumeration order.
#[derive(Debug, Clone, Default)]
pub struct ResultDecoder {
    options: DecodeOptions,
}

impl ResultDecoder {
    pub fn new(options: DecodeOptions) -> Self {
        Self { options }
    }

    pub fn decode(
        &self,
        store: &BalanceStore,
        built: &SettlementModel,
        solution: &Solution,
    ) -> Result<DecodedSettlement, SettlementError> {
        match solution.status {
            SolveStatus::Optimal => {}
            SolveStatus::Infeasible => {
                return Err(SettlementError::ModelInfeasible {
                    scheme: built.scheme,
                    big_m: built.big_m,
                })
            }
            SolveStatus::Unbounded => {
                return Err(SettlementError::ModelUnbounded {
                    scheme: built.scheme,
                })
            }
        }
        if solution.values.len() != built.model.variables().len() {
            return Err(SolverError::Backend(format!(
                "solution has {} values for {} variables",
                solution.values.len(),
                built.model.variables().len()
            ))
            .into());
        }

        let opts = &self.options;
        let scheme = built.scheme.scheme();
        let mut warnings = Vec::new();
        let mut payments = Vec::new();

        for pv in &built.pairs {
            let active = solution.value(pv.active);
            let amount = solution.value(pv.amount);
            let rounded = active.round();
            if (active - rounded).abs() > opts.binary_tolerance {
                warnings.push(ToleranceWarning::FractionalIndicator {
                    variable: built.model.variable(pv.active).name.clone(),
                    value: active,
                });
            }

            if rounded < 1.0 {
                if amount.abs() > opts.value_tolerance {
                    warnings.push(ToleranceWarning::StrayAmount {
                        variable: built.model.variable(pv.amount).name.clone(),
                        value: amount,
                    });
                }
                continue;
            }
            if amount.abs() <= opts.value_tolerance {
                warnings.push(ToleranceWarning::EmptyTransaction {
                    variable: built.model.variable(pv.amount).name.clone(),
                    value: amount,
                });
                continue;
            }
            if let Some(payment) = scheme.decode_sign(pv.pair, amount) {
                payments.push(payment);
            }
        }

        let residual_tolerance = opts.value_tolerance * (1.0 + built.big_m);
        for name in built.model.violations(&solution.values, residual_tolerance) {
            warnings.push(ToleranceWarning::ConstraintResidual {
                constraint: name.to_string(),
            });
        }

        let redundancy_factor = scheme.redundancy_factor();
        let transaction_count =
            (solution.objective_value / f64::from(redundancy_factor)).round().max(0.0) as usize;
        if transaction_count != payments.len() {
            warnings.push(ToleranceWarning::CountMismatch {
                objective_value: solution.objective_value,
                redundancy_factor,
                decoded: payments.len(),
            });
        }

        for warning in &warnings {
            warn!(scheme = %built.scheme, "{warning}");
        }

        self.check_conservation(store, &payments)?;

        Ok(DecodedSettlement {
            payments,
            transaction_count,
            objective_value: solution.objective_value,
            warnings,
        })
    }

    /// Replays `payments` and requires every participant to end at its balance.
    pub fn check_conservation(
        &self,
        store: &BalanceStore,
        payments: &[Payment],
    ) -> Result<(), SettlementError> {
        let mut net = vec![0.0_f64; store.len()];
        for payment in payments {
            net[payment.payer.index()] -= payment.amount;
            net[payment.payee.index()] += payment.amount;
        }

        for participant in store.participants() {
            let actual = net[participant.id.index()];
            if (actual - participant.balance).abs() > self.options.conservation_tolerance {
                return Err(SettlementError::ConservationMismatch {
                    participant: participant.label.clone(),
                    expected: participant.balance,
                    actual,
                });
            }
        }
        Ok(())
    }
}
