use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::time::SettlementClock;
use crate::transaction::CASH_TICKER;

/// Money-market and sweep vehicles that stand in for cash at Fidelity
pub const DEFAULT_CORE_HOLDINGS: &[&str] =
    &["FCASH", "SPAXX", "FDRXX", "FZFXX", "SPRXX", "FZDXX", "FDIC"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IngestConfig {
    /// Label stamped on every transaction's `source`
    pub source: String,
    /// IANA zone of the exchange calendar
    pub timezone: String,
    /// Local time-of-day ("HH:MM") used as the settlement anchor
    pub market_close: String,
    pub cash_ticker: String,
    /// Tickers treated as cash equivalents rather than securities
    pub core_holdings: Vec<String>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            source: "fidelity.com".to_string(),
            timezone: "America/New_York".to_string(),
            market_close: "16:00".to_string(),
            cash_ticker: CASH_TICKER.to_string(),
            core_holdings: DEFAULT_CORE_HOLDINGS.iter().map(|t| t.to_string()).collect(),
        }
    }
}

impl IngestConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: IngestConfig = toml::from_str(s).context("parse ingest config")?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject settings that would otherwise fail in the middle of a parse.
    pub fn validate(&self) -> Result<()> {
        self.clock()?;
        if self.cash_ticker.trim().is_empty() {
            anyhow::bail!("cash_ticker must not be empty");
        }
        if let Some(blank) = self.core_holdings.iter().position(|t| t.trim().is_empty()) {
            anyhow::bail!("core_holdings[{blank}] is empty");
        }
        Ok(())
    }

    pub fn clock(&self) -> Result<SettlementClock> {
        SettlementClock::new(&self.timezone, &self.market_close)
            .with_context(|| format!("settlement clock {} {}", self.timezone, self.market_close))
    }

    pub fn is_core_holding(&self, ticker: &str) -> bool {
        let ticker = ticker.trim();
        self.core_holdings
            .iter()
            .any(|core| core.trim().eq_ignore_ascii_case(ticker))
    }
}

/// Load the ingest config from `path`, falling back to defaults when the
/// file does not exist.
pub fn load_config(path: impl AsRef<Path>) -> Result<IngestConfig> {
    let p = path.as_ref();
    if !p.exists() {
        return Ok(IngestConfig::default());
    }
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    IngestConfig::from_toml_str(&s).with_context(|| format!("load {}", p.display()))
}
