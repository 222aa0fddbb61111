//! Display-unit scaling.
//!
//! The chain only ever stores the smallest unit (wei). These helpers convert
//! to and from the 18-decimal display unit and have no other role.

use crate::entities::U256;
use crate::errors::TypeError;

/// Decimal places of the display unit.
pub const ETHER_DECIMALS: usize = 18;

/// Smallest units per display unit (10^18).
pub fn wei_per_ether() -> U256 {
    U256::exp10(ETHER_DECIMALS)
}

/// Whole display units to smallest units. `None` on overflow.
pub fn ether_to_wei(ether: U256) -> Option<U256> {
    ether.checked_mul(wei_per_ether())
}

/// Smallest units to whole display units, rounding down.
pub fn wei_to_ether(wei: U256) -> U256 {
    wei / wei_per_ether()
}

/// Render smallest units as a decimal display amount, e.g. `1.5`.
pub fn format_ether(wei: U256) -> String {
    let (whole, frac) = wei.div_mod(wei_per_ether());
    if frac.is_zero() {
        return whole.to_string();
    }
    let frac = format!("{:0>width$}", frac.to_string(), width = ETHER_DECIMALS);
    format!("{}.{}", whole, frac.trim_end_matches('0'))
}

/// Parse a decimal display amount (up to 18 fractional digits) into smallest units.
pub fn parse_ether(amount: &str) -> Result<U256, TypeError> {
    let invalid = || TypeError::InvalidAmount(amount.to_string());
    let (whole, frac) = match amount.split_once('.') {
        Some((w, f)) => (w, f),
        None => (amount, ""),
    };
    if frac.len() > ETHER_DECIMALS || (whole.is_empty() && frac.is_empty()) {
        return Err(invalid());
    }
    let whole = if whole.is_empty() {
        U256::zero()
    } else {
        U256::from_dec_str(whole).map_err(|_| invalid())?
    };
    let frac = if frac.is_empty() {
        U256::zero()
    } else {
        let padded = format!("{:0<width$}", frac, width = ETHER_DECIMALS);
        U256::from_dec_str(&padded).map_err(|_| invalid())?
    };
    ether_to_wei(whole)
        .and_then(|w| w.checked_add(frac))
        .ok_or_else(invalid)
}
