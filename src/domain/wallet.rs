use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{HubError, Result};

pub const CURRENCY: &str = "USDC";
pub const NETWORK: &str = "ARC";

/// Singleton wallet view; only a confirmed transfer moves the balance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletState {
    pub balance: Decimal,
    pub currency: String,
    pub network: String,
    pub address: String,
    pub connection_live: bool,
}

impl WalletState {
    pub fn new(address: impl Into<String>, balance: Decimal, connection_live: bool) -> Self {
        Self {
            balance,
            currency: CURRENCY.to_string(),
            network: NETWORK.to_string(),
            address: address.into(),
            connection_live,
        }
    }

    pub fn can_cover(&self, amount: Decimal) -> bool {
        amount >= Decimal::ZERO && amount <= self.balance
    }

    /// Debit the balance, refusing anything that would take it below zero.
    ///
    /// On rejection the balance is left untouched.
    pub fn debit(&mut self, amount: Decimal) -> Result<Decimal> {
        if amount < Decimal::ZERO {
            return Err(HubError::Validation(format!(
                "debit amount must not be negative: {}",
                amount
            )));
        }
        if !self.can_cover(amount) {
            return Err(HubError::InsufficientBalance {
                requested: amount,
                available: self.balance,
            });
        }
        self.balance -= amount;
        Ok(self.balance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_debit_within_balance() {
        let mut wallet = WalletState::new("0xabc", dec!(5420.50), false);
        assert_eq!(wallet.debit(dec!(50)).unwrap(), dec!(5370.50));
        assert_eq!(wallet.balance, dec!(5370.50));
    }

    #[test]
    fn test_debit_entire_balance() {
        let mut wallet = WalletState::new("0xabc", dec!(10), false);
        assert_eq!(wallet.debit(dec!(10)).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_overdraft_leaves_balance_unchanged() {
        let mut wallet = WalletState::new("0xabc", dec!(5420.50), false);
        let err = wallet.debit(dec!(10000)).unwrap_err();
        assert!(matches!(err, HubError::InsufficientBalance { .. }));
        assert_eq!(wallet.balance, dec!(5420.50));
    }

    #[test]
    fn test_negative_debit_rejected() {
        let mut wallet = WalletState::new("0xabc", dec!(1), false);
        assert!(wallet.debit(dec!(-1)).is_err());
        assert_eq!(wallet.balance, dec!(1));
    }
}
