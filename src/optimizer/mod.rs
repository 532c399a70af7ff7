//! Minimum-transaction settlement optimizer
//!
//! - `schemes`: which payer/payee pairs get variables
//! - `builder`: MILP formulation over a balance store
//! - `solver`: backend seam and the good_lp adapter
//! - `decoder`: solver values back to payments
//! - `settle`: the end-to-end pipeline

pub mod builder;
pub mod decoder;
pub mod model;
pub mod schemes;
pub mod settle;
pub mod solver;
pub mod types;

pub use builder::*;
pub use decoder::*;
pub use model::*;
pub use schemes::*;
pub use settle::*;
pub use solver::*;
pub use types::*;
