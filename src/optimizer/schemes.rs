//! Index schemes
//!
//! A scheme decides which `(payer, payee)` pairs receive variables, how those
//! variables enter each participant's balance row, and how a solved value is
//! turned back into a directed payment:
//! - Full: every ordered pair, mirrored variables tied by antisymmetry
//! - Directional: only loser -> winner pairs, amounts non-negative
//! - Triangular: one signed variable per unordered pair
//!
//! Throughout, `x[i,j]` is the net amount `i` pays `j`, and each balance row
//! reads `sum(outflow) - sum(inflow) = -balance`.

use itertools::{iproduct, Itertools};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::domain::{BalanceStore, ParticipantId, Payment};

/// Ordered participant pair indexing one `x`/`u` variable couple
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pair {
    pub i: ParticipantId,
    pub j: ParticipantId,
}

impl Pair {
    pub fn new(i: ParticipantId, j: ParticipantId) -> Self {
        Self { i, j }
    }

    pub fn mirrored(self) -> Self {
        Self {
            i: self.j,
            j: self.i,
        }
    }

    pub fn is_self_loop(self) -> bool {
        self.i == self.j
    }
}

/// Pairs entering one participant's balance row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BalanceTerms {
    /// Coefficient +1
    pub outflow: Vec<Pair>,
    /// Coefficient -1
    pub inflow: Vec<Pair>,
}

impl BalanceTerms {
    pub fn is_empty(&self) -> bool {
        self.outflow.is_empty() && self.inflow.is_empty()
    }
}

/// Extra equalities a scheme needs between its own variables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairRelation {
    /// `x[a] + x[b] = 0`
    Antisymmetric(Pair, Pair),
    /// `x[p] = 0`
    SelfLoop(Pair),
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum SchemeKind {
    Full,
    #[default]
    Directional,
    Triangular,
}

impl SchemeKind {
    pub fn scheme(self) -> Box<dyn IndexScheme> {
        match self {
            SchemeKind::Full => Box::new(FullScheme),
            SchemeKind::Directional => Box::new(DirectionalScheme),
            SchemeKind::Triangular => Box::new(TriangularScheme),
        }
    }
}

pub trait IndexScheme: Send + Sync {
    fn kind(&self) -> SchemeKind;

    /// Pairs that get variables, in a deterministic order
    fn enumerate_pairs(&self, store: &BalanceStore) -> Vec<Pair>;

    fn balance_terms(&self, store: &BalanceStore, participant: ParticipantId) -> BalanceTerms;

    /// Direction and magnitude of a solved `x` value, or `None` when the pair
    /// only mirrors a payment reported through another pair.
    fn decode_sign(&self, pair: Pair, value: f64) -> Option<Payment>;

    /// How many variable couples carry one real payment
    fn redundancy_factor(&self) -> u32 {
        1
    }

    fn amount_lower_bound(&self) -> f64 {
        f64::NEG_INFINITY
    }

    fn pair_relations(&self, _pairs: &[Pair]) -> Vec<PairRelation> {
        Vec::new()
    }
}

fn signed_payment(pair: Pair, value: f64) -> Option<Payment> {
    if value > 0.0 {
        Some(Payment {
            payer: pair.i,
            payee: pair.j,
            amount: value,
        })
    } else if value < 0.0 {
        Some(Payment {
            payer: pair.j,
            payee: pair.i,
            amount: -value,
        })
    } else {
        None
    }
}

/// All N² ordered pairs including the diagonal.
///
/// Every payment shows up twice (`x[i,j] = -x[j,i]`, both indicators set), so
/// the optimal objective is exactly twice the payment count.
///
/// The mirrored indicators make branch-and-bound scale badly: with the
/// `microlp` backend an eight-party ledger can run past a minute, where
/// [`DirectionalScheme`] finishes in milliseconds. Keep this scheme for small
/// ledgers or cross-checks.
#[derive(Debug, Clone, Copy, Default)]
pub struct FullScheme;

impl IndexScheme for FullScheme {
    fn kind(&self) -> SchemeKind {
        SchemeKind::Full
    }

    fn enumerate_pairs(&self, store: &BalanceStore) -> Vec<Pair> {
        iproduct!(store.ids(), store.ids())
            .map(|(i, j)| Pair::new(i, j))
            .collect()
    }

    fn balance_terms(&self, store: &BalanceStore, participant: ParticipantId) -> BalanceTerms {
        BalanceTerms {
            outflow: store.ids().map(|j| Pair::new(participant, j)).collect(),
            inflow: Vec::new(),
        }
    }

    fn decode_sign(&self, pair: Pair, value: f64) -> Option<Payment> {
        // the negative twin of each payment is dropped
        if pair.is_self_loop() || value <= 0.0 {
            return None;
        }
        Some(Payment {
            payer: pair.i,
            payee: pair.j,
            amount: value,
        })
    }

    fn redundancy_factor(&self) -> u32 {
        2
    }

    fn pair_relations(&self, pairs: &[Pair]) -> Vec<PairRelation> {
        let mut relations = Vec::with_capacity(pairs.len());
        for &pair in pairs {
            if pair.is_self_loop() {
                relations.push(PairRelation::SelfLoop(pair));
            } else if pair.i < pair.j {
                relations.push(PairRelation::Antisymmetric(pair, pair.mirrored()));
            }
        }
        relations
    }
}

/// Only loser -> winner pairs. Direction is fixed by the index set, so the
/// amounts are non-negative and no linking constraints are needed.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectionalScheme;

impl IndexScheme for DirectionalScheme {
    fn kind(&self) -> SchemeKind {
        SchemeKind::Directional
    }

    fn enumerate_pairs(&self, store: &BalanceStore) -> Vec<Pair> {
        let winners: Vec<ParticipantId> = store.winners().collect();
        store
            .losers()
            .flat_map(|loser| winners.iter().map(move |&winner| Pair::new(loser, winner)))
            .collect()
    }

    fn balance_terms(&self, store: &BalanceStore, participant: ParticipantId) -> BalanceTerms {
        let balance = store.balance(participant);
        if balance < 0.0 {
            BalanceTerms {
                outflow: store.winners().map(|w| Pair::new(participant, w)).collect(),
                inflow: Vec::new(),
            }
        } else if balance > 0.0 {
            BalanceTerms {
                outflow: Vec::new(),
                inflow: store.losers().map(|l| Pair::new(l, participant)).collect(),
            }
        } else {
            BalanceTerms::default()
        }
    }

    fn decode_sign(&self, pair: Pair, value: f64) -> Option<Payment> {
        signed_payment(pair, value)
    }

    fn amount_lower_bound(&self) -> f64 {
        0.0
    }
}

/// One signed variable per unordered pair `(i, j)` with `j > i`.
/// Positive: `i` pays `j`. Negative: `j` pays `i`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TriangularScheme;

impl IndexScheme for TriangularScheme {
    fn kind(&self) -> SchemeKind {
        SchemeKind::Triangular
    }

    fn enumerate_pairs(&self, store: &BalanceStore) -> Vec<Pair> {
        store
            .ids()
            .tuple_combinations()
            .map(|(i, j)| Pair::new(i, j))
            .collect()
    }

    fn balance_terms(&self, store: &BalanceStore, participant: ParticipantId) -> BalanceTerms {
        BalanceTerms {
            outflow: store
                .ids()
                .filter(|&j| j > participant)
                .map(|j| Pair::new(participant, j))
                .collect(),
            inflow: store
                .ids()
                .filter(|&k| k < participant)
                .map(|k| Pair::new(k, participant))
                .collect(),
        }
    }

    fn decode_sign(&self, pair: Pair, value: f64) -> Option<Payment> {
        signed_payment(pair, value)
    }
}
