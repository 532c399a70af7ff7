use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use figment::{providers::{Env, Format, Toml}, Figment};
use serde::Deserialize;
use validator::Validate;

use crate::domain::DEFAULT_EPSILON;
use crate::optimizer::{DecodeOptions, SchemeKind, SettlementOptions};
use crate::report::{AmountDisplay, ReportFormat, Rounding};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Config {
    #[validate(nested)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub optimizer: OptimizerConfig,
    #[serde(default)]
    #[validate(nested)]
    pub decoder: DecoderConfig,
    #[serde(default)]
    #[validate(nested)]
    pub report: ReportConfig,
}

/// Immutable input of one settlement run
#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct LedgerConfig {
    /// Optional names; empty means P1..PN
    #[serde(default)]
    pub labels: Vec<String>,
    #[validate(length(min = 1))]
    pub balances: Vec<f64>,
    #[serde(default = "default_epsilon")]
    #[validate(range(min = 0.0))]
    pub epsilon: f64,
}

fn default_epsilon() -> f64 {
    DEFAULT_EPSILON
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OptimizerConfig {
    #[serde(default)]
    pub scheme: SchemeKind,
    pub time_limit_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(default)]
pub struct DecoderConfig {
    #[validate(range(min = 0.0, max = 0.5))]
    pub binary_tolerance: f64,
    #[validate(range(min = 0.0))]
    pub value_tolerance: f64,
    #[validate(range(min = 0.0))]
    pub conservation_tolerance: f64,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        let defaults = DecodeOptions::default();
        Self {
            binary_tolerance: defaults.binary_tolerance,
            value_tolerance: defaults.value_tolerance,
            conservation_tolerance: defaults.conservation_tolerance,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ReportConfig {
    #[serde(default)]
    pub format: ReportFormat,
    #[serde(default)]
    pub rounding: Rounding,
    #[serde(default)]
    #[validate(range(max = 6))]
    pub decimals: u32,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from("config/default.toml")
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let figment = Figment::new()
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("SETTLE__").split("__"));
        let cfg: Self = figment.extract()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn settlement_options(&self) -> SettlementOptions {
        SettlementOptions {
            scheme: self.optimizer.scheme,
            time_limit: self.optimizer.time_limit_seconds.map(Duration::from_secs),
            decode: DecodeOptions {
                binary_tolerance: self.decoder.binary_tolerance,
                value_tolerance: self.decoder.value_tolerance,
                conservation_tolerance: self.decoder.conservation_tolerance,
            },
        }
    }

    pub fn amount_display(&self) -> AmountDisplay {
        AmountDisplay {
            rounding: self.report.rounding,
            decimals: self.report.decimals,
        }
    }
}
