//! # Configuration State
//!
//! The loaded [`TillConfig`], plus the presentation helpers the commands
//! and the CLI share.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`TILL_*`)
//! 2. Config file (`till.toml`)
//! 3. Defaults
//!
//! ## Thread Safety
//! Configuration is read-only after initialization, so no mutex needed.

use std::time::Duration;
use till_client::TillConfig;
use till_core::Money;

#[derive(Debug, Clone, Default)]
pub struct ConfigState {
    config: TillConfig,
}

impl ConfigState {
    pub fn new(config: TillConfig) -> Self {
        ConfigState { config }
    }

    pub fn config(&self) -> &TillConfig {
        &self.config
    }

    /// Store name (printed on receipts).
    pub fn store_name(&self) -> &str {
        &self.config.store.name
    }

    /// Upper bound for a single collaborator call.
    pub fn request_timeout(&self) -> Duration {
        self.config.timeout()
    }

    /// Formats an amount with the configured currency, e.g. `Ksh 12.50`.
    pub fn format_money(&self, amount: Money) -> String {
        amount.format_with(self.config.currency())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_money_uses_configured_currency() {
        let mut config = TillConfig::default();
        assert_eq!(
            ConfigState::new(config.clone()).format_money(Money::from_cents(1250)),
            "Ksh 12.50"
        );

        config.store.currency = "$".to_string();
        assert_eq!(ConfigState::new(config).format_money(Money::from_cents(1250)), "$12.50");
    }
}
