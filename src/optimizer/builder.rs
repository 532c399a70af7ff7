//! MILP formulation of the minimum-transaction settlement
//!
//! Per scheme pair `(i, j)`:
//! - `x[i,j]` continuous payment amount, `u[i,j]` binary "payment exists"
//! - `x[i,j] - M * u[i,j] <= 0` and `x[i,j] + M * u[i,j] >= 0`
//!
//! Objective: minimise `sum(u)`. Balance rows are written over bare `x`; the
//! big-M pair already forces `x = 0` whenever `u = 0`, so no product term
//! `u * x` is needed and the model stays linear.

use std::collections::HashMap;

use tracing::debug;

use super::model::{ConstraintOp, MilpModel, VarId};
use super::schemes::{IndexScheme, Pair, PairRelation, SchemeKind};
use crate::domain::BalanceStore;

/// Variable couple created for one scheme pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairVars {
    pub pair: Pair,
    pub amount: VarId,
    pub active: VarId,
}

/// Built model plus the bookkeeping the decoder needs to read it back
#[derive(Debug, Clone)]
pub struct SettlementModel {
    pub model: MilpModel,
    pub pairs: Vec<PairVars>,
    pub scheme: SchemeKind,
    pub big_m: f64,
}

impl SettlementModel {
    pub fn pair_count(&self) -> usize {
        self.pairs.len()
    }
}

pub struct ModelBuilder<'a> {
    store: &'a BalanceStore,
    scheme: &'a dyn IndexScheme,
}

impl<'a> ModelBuilder<'a> {
    pub fn new(store: &'a BalanceStore, scheme: &'a dyn IndexScheme) -> Self {
        Self { store, scheme }
    }

    fn pair_label(&self, pair: Pair) -> String {
        format!("{},{}", self.store.label(pair.i), self.store.label(pair.j))
    }

    pub fn build(&self) -> SettlementModel {
        let kind = self.scheme.kind();
        let big_m = self.store.big_m();
        let mut model = MilpModel::new(format!("debts-{kind}"));

        let pairs = self.scheme.enumerate_pairs(self.store);
        let lower = self.scheme.amount_lower_bound();

        let mut vars = Vec::with_capacity(pairs.len());
        let mut by_pair: HashMap<Pair, PairVars> = HashMap::with_capacity(pairs.len());
        for &pair in &pairs {
            let label = self.pair_label(pair);
            let amount = model.add_continuous(format!("x[{label}]"), lower, f64::INFINITY);
            let active = model.add_binary(format!("u[{label}]"));
            model.add_objective_term(active, 1.0);

            let pv = PairVars {
                pair,
                amount,
                active,
            };
            vars.push(pv);
            by_pair.insert(pair, pv);
        }

        for participant in self.store.ids() {
            let terms = self.scheme.balance_terms(self.store, participant);
            if terms.is_empty() {
                continue;
            }
            let row = terms
                .outflow
                .iter()
                .map(|p| (by_pair[p].amount, 1.0))
                .chain(terms.inflow.iter().map(|p| (by_pair[p].amount, -1.0)))
                .collect();
            model.add_constraint(
                format!("balance[{}]", self.store.label(participant)),
                row,
                ConstraintOp::Eq,
                -self.store.balance(participant),
            );
        }

        for pv in &vars {
            let label = self.pair_label(pv.pair);
            model.add_constraint(
                format!("big_m_upper[{label}]"),
                vec![(pv.amount, 1.0), (pv.active, -big_m)],
                ConstraintOp::Le,
                0.0,
            );
            model.add_constraint(
                format!("big_m_lower[{label}]"),
                vec![(pv.amount, 1.0), (pv.active, big_m)],
                ConstraintOp::Ge,
                0.0,
            );
        }

        for relation in self.scheme.pair_relations(&pairs) {
            match relation {
                PairRelation::Antisymmetric(a, b) => model.add_constraint(
                    format!("antisymmetry[{}]", self.pair_label(a)),
                    vec![(by_pair[&a].amount, 1.0), (by_pair[&b].amount, 1.0)],
                    ConstraintOp::Eq,
                    0.0,
                ),
                PairRelation::SelfLoop(p) => model.add_constraint(
                    format!("self_loop[{}]", self.store.label(p.i)),
                    vec![(by_pair[&p].amount, 1.0)],
                    ConstraintOp::Eq,
                    0.0,
                ),
            }
        }

        debug!(
            scheme = %kind,
            variables = model.variables().len(),
            binaries = model.binary_count(),
            constraints = model.constraints().len(),
            big_m,
            "settlement model built"
        );

        SettlementModel {
            model,
            pairs: vars,
            scheme: kind,
            big_m,
        }
    }
}
