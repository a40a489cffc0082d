use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::StatementError;

/// RSBU line identifier: statement form (1 = balance sheet, 2 = income statement) plus code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LineKey {
    pub form: u8,
    pub code: u16,
}

impl LineKey {
    pub const fn new(form: u8, code: u16) -> Self {
        Self { form, code }
    }

    pub const fn balance(code: u16) -> Self {
        Self::new(1, code)
    }

    pub const fn income(code: u16) -> Self {
        Self::new(2, code)
    }
}

impl fmt::Display for LineKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "F{}.{:04}", self.form, self.code)
    }
}

impl FromStr for LineKey {
    type Err = StatementError;

    /// Accepts `F1.1200`, `Ф1.1200` and the space-separated `Ф1 1200` variant.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || StatementError::InvalidLineKey(raw.to_string());

        let trimmed = raw.trim();
        let rest = trimmed
            .strip_prefix('F')
            .or_else(|| trimmed.strip_prefix('f'))
            .or_else(|| trimmed.strip_prefix('Ф'))
            .or_else(|| trimmed.strip_prefix('ф'))
            .ok_or_else(invalid)?
            .trim_start();

        let (form, code) = rest.split_once(['.', ' ']).ok_or_else(invalid)?;
        let form: u8 = form.trim().parse().map_err(|_| invalid())?;
        let code = code.trim();
        if code.len() != 4 || !code.chars().all(|ch| ch.is_ascii_digit()) {
            return Err(invalid());
        }
        let code: u16 = code.parse().map_err(|_| invalid())?;

        if form == 0 {
            return Err(invalid());
        }

        Ok(Self { form, code })
    }
}

impl TryFrom<String> for LineKey {
    type Error = StatementError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<LineKey> for String {
    fn from(value: LineKey) -> Self {
        value.to_string()
    }
}

// Balance sheet (form 1).
pub const FIXED_ASSETS: LineKey = LineKey::balance(1150);
pub const LONG_TERM_INVESTMENTS: LineKey = LineKey::balance(1170);
pub const CURRENT_ASSETS: LineKey = LineKey::balance(1200);
pub const INVENTORY: LineKey = LineKey::balance(1210);
pub const RECEIVABLES: LineKey = LineKey::balance(1230);
pub const SHORT_TERM_INVESTMENTS: LineKey = LineKey::balance(1240);
pub const CASH: LineKey = LineKey::balance(1250);
pub const EQUITY: LineKey = LineKey::balance(1300);
pub const LONG_TERM_DEBT: LineKey = LineKey::balance(1410);
pub const CURRENT_LIABILITIES: LineKey = LineKey::balance(1500);
pub const SHORT_TERM_DEBT: LineKey = LineKey::balance(1510);
pub const CREDITORS: LineKey = LineKey::balance(1520);
pub const TOTAL_ASSETS: LineKey = LineKey::balance(1600);
pub const TOTAL_LIABILITIES: LineKey = LineKey::balance(1700);

// Income statement (form 2).
pub const REVENUE: LineKey = LineKey::income(2110);
pub const SALES_PROFIT: LineKey = LineKey::income(2200);
pub const INTEREST_PAID: LineKey = LineKey::income(2330);
