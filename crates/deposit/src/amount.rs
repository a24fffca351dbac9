//! Conversion of human-denominated amounts into base units.
//!
//! Amounts arrive as `f64` ETH values. The shortest decimal string that
//! round-trips to the same `f64` is taken as the exact decimal value, shifted
//! by the unit's decimals and truncated toward zero. Anything below one base
//! unit is dropped.

use alloy_primitives::{utils::format_ether, U256};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Decimals of ETH: 1 ETH = 10^18 wei.
pub const ETHER_DECIMALS: usize = 18;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AmountError {
    #[error("Amount is not a number: {0:?}")]
    Invalid(String),

    #[error("Amount must be finite, got {0}")]
    NotFinite(f64),

    #[error("Amount must not be negative, got {0}")]
    Negative(f64),

    #[error("Amount {0} does not fit in 256 bits of base units")]
    Overflow(f64),
}

/// Convert `amount` (major units) into base units with `decimals` decimals.
pub fn to_base_units(amount: f64, decimals: usize) -> Result<U256, AmountError> {
    if !amount.is_finite() {
        return Err(AmountError::NotFinite(amount));
    }

    if amount < 0.0 {
        return Err(AmountError::Negative(amount));
    }

    // `Display` for f64 never uses exponent notation; `abs` folds -0.0 into "0".
    let repr = amount.abs().to_string();
    let (whole, fraction) = repr.split_once('.').unwrap_or((repr.as_str(), ""));

    let kept = &fraction[..fraction.len().min(decimals)];
    let mut digits = String::with_capacity(whole.len() + decimals);
    digits.push_str(whole);
    digits.push_str(kept);
    digits.extend(std::iter::repeat_n('0', decimals - kept.len()));

    U256::from_str_radix(&digits, 10).map_err(|_| AmountError::Overflow(amount))
}

/// Convert an ETH amount into wei.
pub fn ether_to_wei(amount: f64) -> Result<U256, AmountError> {
    to_base_units(amount, ETHER_DECIMALS)
}

/// A validated deposit amount.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Amount {
    ether: f64,
    wei: U256,
}

impl Amount {
    pub fn from_ether(ether: f64) -> Result<Self, AmountError> {
        let wei = ether_to_wei(ether)?;
        Ok(Self { ether, wei })
    }

    /// The amount exactly as supplied.
    pub const fn ether(&self) -> f64 {
        self.ether
    }

    /// The amount in wei.
    pub const fn wei(&self) -> U256 {
        self.wei
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ether: f64 = s
            .trim()
            .parse()
            .map_err(|_| AmountError::Invalid(s.to_string()))?;
        Self::from_ether(ether)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ETH", format_ether(self.wei))
    }
}
