use std::fmt;

use serde::{Deserialize, Serialize};

/// Zero-based position of a participant in the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ParticipantId(pub usize);

impl ParticipantId {
    pub fn index(self) -> usize {
        self.0
    }

    /// Label used when no explicit name is configured: P1..PN
    pub fn default_label(self) -> String {
        format!("P{}", self.0 + 1)
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0 + 1)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub label: String,
    /// Negative: owes money. Positive: is owed money.
    pub balance: f64,
}

impl Participant {
    pub fn is_loser(&self) -> bool {
        self.balance < 0.0
    }

    pub fn is_winner(&self) -> bool {
        self.balance > 0.0
    }
}

/// One transfer of the settlement plan. `amount` is the exact solver value;
/// display rounding happens in the report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub payer: ParticipantId,
    pub payee: ParticipantId,
    pub amount: f64,
}
