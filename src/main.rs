use anyhow::Result;
use debt_settle::{config, optimizer::DebtSettler, optimizer::GoodLpSolver, report, telemetry};
use config::Config;
use telemetry::init_tracing;
use tracing::{info, warn};

fn main() -> Result<()> {
    init_tracing();

    let cfg = match std::env::args().nth(1) {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let settler = DebtSettler::new(Box::new(GoodLpSolver), cfg.settlement_options());
    info!(
        scheme = %cfg.optimizer.scheme,
        participants = cfg.ledger.balances.len(),
        "starting debt settlement"
    );

    let plan = settler.settle_ledger(&cfg.ledger)?;
    if !plan.warnings.is_empty() {
        warn!(count = plan.warnings.len(), "solution carried numeric tolerance warnings");
    }

    print!(
        "{}",
        report::render(&plan, cfg.report.format, &cfg.amount_display())?
    );
    Ok(())
}
