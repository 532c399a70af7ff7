//! Human-readable and JSON renderings of a settlement plan

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::optimizer::SettlementPlan;

pub const BANNER: &str = "***************** Solution *****************";

/// Slack absorbing solver noise such as `99.999999999` before truncation
const TRUNCATE_SLACK: f64 = 1e-7;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Rounding {
    /// Half away from zero
    #[default]
    Nearest,
    /// Toward zero, dropping sub-unit precision
    Truncate,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

/// Display precision for payment amounts. Amounts stay exact in the plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AmountDisplay {
    pub rounding: Rounding,
    pub decimals: u32,
}

impl AmountDisplay {
    pub fn apply(&self, amount: f64) -> f64 {
        let scale = 10_f64.powi(self.decimals as i32);
        let scaled = amount * scale;
        let shown = match self.rounding {
            Rounding::Nearest => scaled.round(),
            Rounding::Truncate => (scaled + TRUNCATE_SLACK.copysign(scaled)).trunc(),
        };
        shown / scale
    }

    pub fn format(&self, amount: f64) -> String {
        format!("{:.*}", self.decimals as usize, self.apply(amount))
    }
}

pub fn render_text(plan: &SettlementPlan, display: &AmountDisplay) -> String {
    let payments = plan.payments.iter().map(|payment| {
        format!(
            "{} owes {} to {}\n",
            plan.label(payment.payer),
            display.format(payment.amount),
            plan.label(payment.payee)
        )
    });

    [
        format!("{BANNER}\n"),
        format!("Total number of payments: {}\n", plan.transaction_count),
    ]
    .into_iter()
    .chain(payments)
    .collect()
}

pub fn render_json(plan: &SettlementPlan) -> serde_json::Result<String> {
    serde_json::to_string_pretty(plan)
}

pub fn render(
    plan: &SettlementPlan,
    format: ReportFormat,
    display: &AmountDisplay,
) -> serde_json::Result<String> {
    match format {
        ReportFormat::Text => Ok(render_text(plan, display)),
        ReportFormat::Json => render_json(plan),
    }
}
