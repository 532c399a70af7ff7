use tracing::debug;

use super::{Participant, ParticipantId};
use crate::config::LedgerConfig;
use crate::error::SettlementError;

/// Default tolerance for the zero-sum check, in currency units
pub const DEFAULT_EPSILON: f64 = 1e-6;

/// Validated set of participant balances.
///
/// Construction enforces the zero-sum invariant, so every store handed to the
/// model builder describes a feasible settlement. Balances within `epsilon`
/// of zero are stored as zero and the residue accepted by the zero-sum check
/// is taken off the largest balance, so the stored balances sum to zero.
#[derive(Debug, Clone)]
pub struct BalanceStore {
    participants: Vec<Participant>,
    big_m: f64,
}

impl BalanceStore {
    /// `participants[k].id` must be `ParticipantId(k)`.
    pub fn new(mut participants: Vec<Participant>, epsilon: f64) -> Result<Self, SettlementError> {
        if let Some((position, bad)) = participants
            .iter()
            .enumerate()
            .find(|(position, p)| p.id.index() != *position)
        {
            return Err(SettlementError::ParticipantOutOfOrder {
                label: bad.label.clone(),
                id: bad.id.index(),
                position,
            });
        }

        if let Some(bad) = participants.iter().find(|p| !p.balance.is_finite()) {
            return Err(SettlementError::InvalidBalance {
                label: bad.label.clone(),
                value: bad.balance,
            });
        }

        let total: f64 = participants.iter().map(|p| p.balance).sum();
        if total.abs() > epsilon {
            return Err(SettlementError::InfeasibleInput { total, epsilon });
        }
        absorb_residue(&mut participants, epsilon);

        let big_m = participants
            .iter()
            .filter(|p| p.is_winner())
            .map(|p| p.balance)
            .sum();

        debug!(participants = participants.len(), big_m, residue = total, "balance store ready");

        Ok(Self {
            participants,
            big_m,
        })
    }

    /// Build from plain balances, labelling participants P1..PN.
    pub fn from_balances(balances: &[f64], epsilon: f64) -> Result<Self, SettlementError> {
        let participants = balances
            .iter()
            .enumerate()
            .map(|(idx, &balance)| {
                let id = ParticipantId(idx);
                Participant {
                    id,
                    label: id.default_label(),
                    balance,
                }
            })
            .collect();
        Self::new(participants, epsilon)
    }

    pub fn from_config(config: &LedgerConfig) -> Result<Self, SettlementError> {
        if !config.labels.is_empty() && config.labels.len() != config.balances.len() {
            return Err(SettlementError::LabelMismatch {
                labels: config.labels.len(),
                balances: config.balances.len(),
            });
        }

        let participants = config
            .balances
            .iter()
            .enumerate()
            .map(|(idx, &balance)| {
                let id = ParticipantId(idx);
                let label = config
                    .labels
                    .get(idx)
                    .cloned()
                    .unwrap_or_else(|| id.default_label());
                Participant { id, label, balance }
            })
            .collect();
        Self::new(participants, config.epsilon)
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = ParticipantId> + Clone + '_ {
        self.participants.iter().map(|p| p.id)
    }

    pub fn balance(&self, id: ParticipantId) -> f64 {
        self.participants[id.index()].balance
    }

    pub fn label(&self, id: ParticipantId) -> &str {
        &self.participants[id.index()].label
    }

    /// Participants with a negative balance, in ledger order
    pub fn losers(&self) -> impl Iterator<Item = ParticipantId> + '_ {
        self.participants.iter().filter(|p| p.is_loser()).map(|p| p.id)
    }

    /// Participants with a positive balance, in ledger order
    pub fn winners(&self) -> impl Iterator<Item = ParticipantId> + '_ {
        self.participants.iter().filter(|p| p.is_winner()).map(|p| p.id)
    }

    /// Sum of positive balances. No single transfer can exceed it.
    pub fn big_m(&self) -> f64 {
        self.big_m
    }
}

/// Zeroes dust balances and folds the remaining sum into the largest balance.
/// Each extra round zeroes at least one more participant.
fn absorb_residue(participants: &mut [Participant], epsilon: f64) {
    loop {
        for p in participants.iter_mut().filter(|p| p.balance.abs() <= epsilon) {
            p.balance = 0.0;
        }

        let residue: f64 = participants.iter().map(|p| p.balance).sum();
        if let Some(largest) = participants
            .iter_mut()
            .max_by(|a, b| a.balance.abs().total_cmp(&b.balance.abs()))
        {
            largest.balance -= residue;
        }

        if !participants
            .iter()
            .any(|p| p.balance != 0.0 && p.balance.abs() <= epsilon)
        {
            break;
        }
    }
}
