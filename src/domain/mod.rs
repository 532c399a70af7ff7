pub mod ledger;
pub mod types;

pub use ledger::*;
pub use types::*;
