//! Minimum-transaction debt settlement.
//!
//! Balances are validated into a [`domain::BalanceStore`], formulated as a
//! mixed-integer linear program under one of three index schemes, solved
//! through the [`optimizer::MilpSolver`] seam and decoded into a
//! [`optimizer::SettlementPlan`].

pub mod config;
pub mod domain;
pub mod error;
pub mod optimizer;
pub mod report;
pub mod telemetry;

pub use error::SettlementError;
