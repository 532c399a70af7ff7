use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{DecodeOptions, SchemeKind, ToleranceWarning};
use crate::domain::{Participant, ParticipantId, Payment};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SettlementOptions {
    pub scheme: SchemeKind,
    /// Passed through to the solver; `None` waits indefinitely
    pub time_limit: Option<Duration>,
    pub decode: DecodeOptions,
}

/// Result of one settlement run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementPlan {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub scheme: SchemeKind,
    pub participants: Vec<Participant>,
    pub big_m: f64,
    pub objective_value: f64,
    pub transaction_count: usize,
    pub payments: Vec<Payment>,
    pub warnings: Vec<ToleranceWarning>,
    pub optimizer_version: String,
}

impl SettlementPlan {
    pub fn label(&self, id: ParticipantId) -> &str {
        &self.participants[id.index()].label
    }

    /// Sum of all payment amounts
    pub fn total_transferred(&self) -> f64 {
        self.payments.iter().map(|p| p.amount).sum()
    }
}
