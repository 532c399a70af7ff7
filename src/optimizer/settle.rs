use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    GoodLpSolver, MilpSolver, ModelBuilder, ResultDecoder, SettlementOptions, SettlementPlan,
};
use crate::config::LedgerConfig;
use crate::domain::BalanceStore;
use crate::error::SettlementError;

/// Balance store -> model builder -> solver -> decoder
pub struct DebtSettler {
    pub solver: Box<dyn MilpSolver>,
    pub options: SettlementOptions,
}

impl Default for DebtSettler {
    fn default() -> Self {
        Self::new(Box::new(GoodLpSolver), SettlementOptions::default())
    }
}

impl DebtSettler {
    pub fn new(solver: Box<dyn MilpSolver>, options: SettlementOptions) -> Self {
        Self { solver, options }
    }

    /// Validates the ledger before any model is built or solved.
    pub fn settle_ledger(&self, ledger: &LedgerConfig) -> Result<SettlementPlan, SettlementError> {
        let store = BalanceStore::from_config(ledger)?;
        self.settle(&store)
    }

    #[instrument(skip_all, fields(scheme = %self.options.scheme, participants = store.len()))]
    pub fn settle(&self, store: &BalanceStore) -> Result<SettlementPlan, SettlementError> {
        let scheme = self.options.scheme.scheme();
        let built = ModelBuilder::new(store, scheme.as_ref()).build();

        let solution = self.solver.solve(&built.model, self.options.time_limit)?;

        let decoded = ResultDecoder::new(self.options.decode).decode(store, &built, &solution)?;

        info!(
            transactions = decoded.transaction_count,
            objective = decoded.objective_value,
            warnings = decoded.warnings.len(),
            "settlement solved"
        );

        Ok(SettlementPlan {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            scheme: built.scheme,
            participants: store.participants().to_vec(),
            big_m: built.big_m,
            objective_value: decoded.objective_value,
            transaction_count: decoded.transaction_count,
            payments: decoded.payments,
            warnings: decoded.warnings,
            optimizer_version: format!("{}-milp-v1/{}", built.scheme, self.solver.name()),
        })
    }
}
