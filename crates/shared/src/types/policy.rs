//! Engine policy knobs.
//!
//! Policies are injected explicitly wherever the engine needs them; nothing
//! in the core reads global state. Tax policy is consumed when a document is
//! created and captured on the row, so later policy changes never rewrite
//! history.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Tunable behavior passed into the engine at call time.
#[derive(Debug, Clone, Deserialize)]
pub struct PolicyConfig {
    /// Tax rate applied to document subtotals, in percent (e.g. `10` = 10%).
    #[serde(default = "default_tax_rate")]
    pub tax_rate: Decimal,
    /// When true, new documents start in `pending` and require approval
    /// before they can be realized.
    #[serde(default)]
    pub require_approval: bool,
    /// On-hand quantity at or below which a product/warehouse pair is
    /// considered low on stock.
    #[serde(default = "default_low_stock_threshold")]
    pub low_stock_threshold: Decimal,
}

fn default_tax_rate() -> Decimal {
    Decimal::ZERO
}

fn default_low_stock_threshold() -> Decimal {
    Decimal::TEN
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            tax_rate: default_tax_rate(),
            require_approval: false,
            low_stock_threshold: default_low_stock_threshold(),
        }
    }
}

impl PolicyConfig {
    /// Returns a copy with the given tax rate, keeping other knobs.
    #[must_use]
    pub fn with_tax_rate(mut self, rate: Decimal) -> Self {
        self.tax_rate = rate;
        self
    }

    /// Returns a copy with approval required, keeping other knobs.
    #[must_use]
    pub const fn with_approval_required(mut self) -> Self {
        self.require_approval = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_defaults() {
        let policy = PolicyConfig::default();
        assert_eq!(policy.tax_rate, Decimal::ZERO);
        assert!(!policy.require_approval);
        assert_eq!(policy.low_stock_threshold, dec!(10));
    }

    #[test]
    fn test_builders() {
        let policy = PolicyConfig::default()
            .with_tax_rate(dec!(11))
            .with_approval_required();
        assert_eq!(policy.tax_rate, dec!(11));
        assert!(policy.require_approval);
    }
}
