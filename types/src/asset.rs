//! Token amounts as the settlement ledger understands them.
//!
//! An asset is a signed fixed-point integer tagged with a symbol. The symbol
//! carries the decimal precision, so `10000` raw units of a precision-4
//! symbol print as `1.0000 LUME`.

use crate::error::ValueError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Token symbol: precision plus a 1–7 letter uppercase code.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol {
    precision: u8,
    code: String,
}

impl Symbol {
    /// Highest precision whose scale still fits in an `i64`.
    pub const MAX_PRECISION: u8 = 18;

    pub fn new(precision: u8, code: impl Into<String>) -> Result<Self, ValueError> {
        let code = code.into();
        let symbol = Self { precision, code };
        if !symbol.is_valid() {
            return Err(ValueError::Symbol(symbol.to_string()));
        }
        Ok(symbol)
    }

    /// The contract's own token.
    pub fn lume() -> Self {
        Self {
            precision: 4,
            code: "LUME".to_string(),
        }
    }

    pub fn precision(&self) -> u8 {
        self.precision
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn is_valid(&self) -> bool {
        self.precision <= Self::MAX_PRECISION
            && (1..=7).contains(&self.code.len())
            && self.code.bytes().all(|b| b.is_ascii_uppercase())
    }

    fn scale(&self) -> u64 {
        10u64.pow(self.precision as u32)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.precision, self.code)
    }
}

/// A quantity of a token.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Asset {
    amount: i64,
    symbol: Symbol,
}

impl Asset {
    /// Largest magnitude the settlement ledger accepts.
    pub const MAX_AMOUNT: i64 = (1 << 62) - 1;

    pub fn new(amount: i64, symbol: Symbol) -> Self {
        Self { amount, symbol }
    }

    /// `amount` raw units of LUME.
    pub fn lume(amount: i64) -> Self {
        Self::new(amount, Symbol::lume())
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn is_valid(&self) -> bool {
        self.amount.unsigned_abs() <= Self::MAX_AMOUNT as u64 && self.symbol.is_valid()
    }

    /// Valid and strictly greater than zero; required for any price or fee.
    pub fn is_positive(&self) -> bool {
        self.is_valid() && self.amount > 0
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.amount < 0 { "-" } else { "" };
        let magnitude = self.amount.unsigned_abs();
        let precision = self.symbol.precision as usize;
        if precision == 0 {
            return write!(f, "{sign}{magnitude} {}", self.symbol.code);
        }
        let scale = self.symbol.scale();
        write!(
            f,
            "{sign}{}.{:0width$} {}",
            magnitude / scale,
            magnitude % scale,
            self.symbol.code,
            width = precision
        )
    }
}

impl FromStr for Asset {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = |reason| ValueError::Asset {
            input: s.to_string(),
            reason,
        };
        let (number, code) = s
            .trim()
            .split_once(' ')
            .ok_or_else(|| err("expected '<amount> <SYMBOL>'"))?;
        let (negative, digits) = match number.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, number),
        };
        let (whole, frac) = digits.split_once('.').unwrap_or((digits, ""));
        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return Err(err("malformed integer part"));
        }
        if number.contains('.') && frac.is_empty() {
            return Err(err("empty fractional part"));
        }
        if !frac.bytes().all(|b| b.is_ascii_digit()) {
            return Err(err("malformed fractional part"));
        }
        let precision = u8::try_from(frac.len()).map_err(|_| err("precision too high"))?;
        let symbol = Symbol::new(precision, code.trim()).map_err(|_| err("invalid symbol"))?;

        let whole: u64 = whole.parse().map_err(|_| err("amount out of range"))?;
        let frac: u64 = if frac.is_empty() {
            0
        } else {
            frac.parse().map_err(|_| err("amount out of range"))?
        };
        let magnitude = whole
            .checked_mul(symbol.scale())
            .and_then(|w| w.checked_add(frac))
            .filter(|m| *m <= Self::MAX_AMOUNT as u64)
            .ok_or_else(|| err("amount out of range"))?;
        let amount = if negative {
            -(magnitude as i64)
        } else {
            magnitude as i64
        };
        Ok(Self { amount, symbol })
    }
}

impl TryFrom<String> for Asset {
    type Error = ValueError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Asset> for String {
    fn from(asset: Asset) -> Self {
        asset.to_string()
    }
}
